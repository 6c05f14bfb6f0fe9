//! Port abstraction over the remote resource store.
//!
//! The engine only ever sees four CRUD collections behind this trait.
//! Production backs it with the reqwest adapter in
//! [`crate::outbound::HttpStore`]; tests use [`mockall`] expectations or the
//! deterministic [`InMemoryStore`] below. Correctness never depends on
//! server-side filtering: every list call may return the full collection.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::identity::User;
use super::records::{
    Course, CourseBody, Department, Enrollment, NewDepartment, NewEnrollment, NewUser,
};
use super::reference::{CanonicalId, RawRef};

/// Errors raised by resource store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never completed: connect, timeout, or TLS failure.
    #[error("resource store transport failed: {message}")]
    Transport { message: String },
    /// The store answered with a non-success status.
    #[error("resource store returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body could not be decoded, or an identifier could not be
    /// rendered into a request path.
    #[error("resource store payload invalid: {message}")]
    Decode { message: String },
}

/// Async CRUD access to the four remote collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, StoreError>;

    async fn create_user(&self, draft: &NewUser) -> Result<User, StoreError>;
    async fn create_department(&self, draft: &NewDepartment) -> Result<Department, StoreError>;
    async fn create_course(&self, body: &CourseBody) -> Result<Course, StoreError>;
    /// Full replacement of the identified course.
    async fn replace_course(&self, id: &CanonicalId, body: &CourseBody)
        -> Result<Course, StoreError>;
    async fn delete_course(&self, id: &CanonicalId) -> Result<(), StoreError>;
    async fn create_enrollment(&self, draft: &NewEnrollment) -> Result<Enrollment, StoreError>;
    async fn delete_enrollment(&self, id: &CanonicalId) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: Vec<User>,
    departments: Vec<Department>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    next_id: i64,
}

/// Deterministic in-memory [`ResourceStore`] for tests and demos.
///
/// Behaves like the live store in the ways that matter to the engine:
/// records get fresh numeric ids, deleting a course does not cascade to its
/// enrollments, and deleting a missing record answers with a 404-shaped
/// [`StoreError::Status`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given collections.
    pub fn seeded(
        users: Vec<User>,
        departments: Vec<Department>,
        courses: Vec<Course>,
        enrollments: Vec<Enrollment>,
    ) -> Self {
        let next_id = 1 + highest_numeric_id(&users, &departments, &courses, &enrollments);
        Self {
            state: Mutex::new(InMemoryState {
                users,
                departments,
                courses,
                enrollments,
                next_id,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_id(state: &mut InMemoryState) -> RawRef {
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        RawRef::Number(id)
    }
}

fn highest_numeric_id(
    users: &[User],
    departments: &[Department],
    courses: &[Course],
    enrollments: &[Enrollment],
) -> i64 {
    let numeric = |id: &CanonicalId| id.as_str().and_then(|s| s.parse::<i64>().ok());
    users
        .iter()
        .filter_map(|u| numeric(&u.canonical_id()))
        .chain(departments.iter().filter_map(|d| numeric(&d.canonical_id())))
        .chain(courses.iter().filter_map(|c| numeric(&c.canonical_id())))
        .chain(enrollments.iter().filter_map(|e| numeric(&e.canonical_id())))
        .max()
        .unwrap_or(0)
}

fn missing(kind: &str, id: &CanonicalId) -> StoreError {
    StoreError::Status {
        status: 404,
        message: format!("{kind} {id} not found"),
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.clone())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        Ok(self.lock().departments.clone())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.lock().courses.clone())
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self.lock().enrollments.clone())
    }

    async fn create_user(&self, draft: &NewUser) -> Result<User, StoreError> {
        let mut state = self.lock();
        let user = User {
            id: Self::fresh_id(&mut state),
            name: draft.name.clone(),
            email: draft.email.clone(),
            password: Some(draft.password.clone()),
            role: draft.role,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn create_department(&self, draft: &NewDepartment) -> Result<Department, StoreError> {
        let mut state = self.lock();
        let department = Department {
            id: Self::fresh_id(&mut state),
            name: draft.name.clone(),
        };
        state.departments.push(department.clone());
        Ok(department)
    }

    async fn create_course(&self, body: &CourseBody) -> Result<Course, StoreError> {
        let mut state = self.lock();
        let course = Course {
            id: Self::fresh_id(&mut state),
            name: body.name.clone(),
            code: body.code.clone(),
            credit: body.credit,
            capacity: Some(body.capacity),
            enrolled: Some(body.enrolled),
            owner_name: Some(body.teacher_name.clone()),
            department: Some(body.department.clone()),
            department_id: None,
        };
        state.courses.push(course.clone());
        Ok(course)
    }

    async fn replace_course(
        &self,
        id: &CanonicalId,
        body: &CourseBody,
    ) -> Result<Course, StoreError> {
        let mut state = self.lock();
        let course = state
            .courses
            .iter_mut()
            .find(|c| c.canonical_id().matches(id))
            .ok_or_else(|| missing("course", id))?;
        course.name = body.name.clone();
        course.code = body.code.clone();
        course.credit = body.credit;
        course.capacity = Some(body.capacity);
        course.enrolled = Some(body.enrolled);
        course.owner_name = Some(body.teacher_name.clone());
        course.department = Some(body.department.clone());
        course.department_id = None;
        Ok(course.clone())
    }

    async fn delete_course(&self, id: &CanonicalId) -> Result<(), StoreError> {
        let mut state = self.lock();
        let before = state.courses.len();
        state.courses.retain(|c| !c.canonical_id().matches(id));
        if state.courses.len() == before {
            return Err(missing("course", id));
        }
        // No cascade: enrollments pointing at the course are left dangling,
        // exactly as the live backend leaves them.
        Ok(())
    }

    async fn create_enrollment(&self, draft: &NewEnrollment) -> Result<Enrollment, StoreError> {
        let mut state = self.lock();
        let enrollment = Enrollment {
            id: Self::fresh_id(&mut state),
            student_id: None,
            user_id: Some(draft.user_id.clone()),
            student: None,
            course_id: Some(draft.course_id.clone()),
            course: None,
            enroll_date: Some(draft.enroll_date),
        };
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn delete_enrollment(&self, id: &CanonicalId) -> Result<(), StoreError> {
        let mut state = self.lock();
        let before = state.enrollments.len();
        state.enrollments.retain(|e| !e.canonical_id().matches(id));
        if state.enrollments.len() == before {
            return Err(missing("enrollment", id));
        }
        Ok(())
    }
}
