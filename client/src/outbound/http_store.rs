//! Reqwest-backed resource store adapter.
//!
//! This adapter owns transport details only: URL assembly, JSON encoding and
//! decoding, timeout, and HTTP status mapping. No query parameters are ever
//! sent; the engine stays correct against an endpoint that always returns
//! the full collection, so any server-side filter would be an optimisation
//! it must not depend on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{ResourceStore, StoreError};
use crate::domain::records::{
    Course, CourseBody, Department, Enrollment, NewDepartment, NewEnrollment, NewUser,
};
use crate::domain::reference::CanonicalId;
use crate::domain::User;

/// Request timeout applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USERS: &str = "users";
const DEPARTMENTS: &str = "departments";
const COURSES: &str = "courses";
const ENROLLMENTS: &str = "enrollments";

/// HTTP adapter over the four remote CRUD collections.
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, collection: &str, id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| StoreError::Decode {
                message: "base url cannot carry path segments".to_owned(),
            })?;
            segments.pop_if_empty().push(collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        let url = self.endpoint(collection, None)?;
        debug!(%url, "fetching collection");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn post_json<B, T>(&self, collection: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(collection, None)?;
        debug!(%url, "creating record");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn put_json<B, T>(&self, collection: &str, id: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(collection, Some(id))?;
        debug!(%url, "replacing record");
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(collection, Some(id))?;
        debug!(%url, "deleting record");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), body.as_ref()));
        }
        Ok(())
    }
}

/// Render a canonical id into a path segment; unresolved ids are a caller
/// bug and never leave the process.
fn path_id(id: &CanonicalId) -> Result<&str, StoreError> {
    id.as_str().ok_or_else(|| StoreError::Decode {
        message: "cannot address a record by an unresolved identifier".to_owned(),
    })
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    StoreError::Transport {
        message: error.to_string(),
    }
}

fn map_status_error(status: u16, body: &[u8]) -> StoreError {
    StoreError::Status {
        status,
        message: String::from_utf8_lossy(body).trim().to_owned(),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status.as_u16(), body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|error| StoreError::Decode {
        message: error.to_string(),
    })
}

#[async_trait]
impl ResourceStore for HttpStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.fetch_list(USERS).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        self.fetch_list(DEPARTMENTS).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.fetch_list(COURSES).await
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, StoreError> {
        self.fetch_list(ENROLLMENTS).await
    }

    async fn create_user(&self, draft: &NewUser) -> Result<User, StoreError> {
        self.post_json(USERS, draft).await
    }

    async fn create_department(&self, draft: &NewDepartment) -> Result<Department, StoreError> {
        self.post_json(DEPARTMENTS, draft).await
    }

    async fn create_course(&self, body: &CourseBody) -> Result<Course, StoreError> {
        self.post_json(COURSES, body).await
    }

    async fn replace_course(
        &self,
        id: &CanonicalId,
        body: &CourseBody,
    ) -> Result<Course, StoreError> {
        self.put_json(COURSES, path_id(id)?, body).await
    }

    async fn delete_course(&self, id: &CanonicalId) -> Result<(), StoreError> {
        self.delete_record(COURSES, path_id(id)?).await
    }

    async fn create_enrollment(&self, draft: &NewEnrollment) -> Result<Enrollment, StoreError> {
        self.post_json(ENROLLMENTS, draft).await
    }

    async fn delete_enrollment(&self, id: &CanonicalId) -> Result<(), StoreError> {
        self.delete_record(ENROLLMENTS, path_id(id)?).await
    }
}
