//! Session identity and role dispatch.
//!
//! The signed-in [`User`] is resolved once at login and passed explicitly
//! into every operation that needs it; nothing in the crate holds ambient
//! "current user" state. Role is immutable for the session.

use serde::{Deserialize, Serialize};

use super::reference::{CanonicalId, RawRef};

/// Account role as stored by the remote backend.
///
/// The backend stores instructors under the legacy `"admin"` value; newer
/// data may spell it `"instructor"` or `"teacher"`, so both are accepted on
/// input while `"admin"` is kept as the serialised form for compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// A learner who browses the catalog and enrols in courses.
    #[serde(rename = "student")]
    Student,
    /// An instructor who owns and manages courses and departments.
    #[serde(rename = "admin", alias = "instructor", alias = "teacher")]
    Instructor,
}

/// A user record from the remote `users` collection.
///
/// Doubles as the session identity after login. `password` is only present
/// because the backend stores it in plain sight on the user record; it is
/// compared at login and never otherwise consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Record identifier; numeric or string depending on how it was created.
    pub id: RawRef,
    /// Display name. Also the ownership key for courses (a known-weak,
    /// denormalised link inherited from the backend data model).
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
}

impl User {
    /// Canonical form of this user's identifier.
    pub fn canonical_id(&self) -> CanonicalId {
        self.id.canonical()
    }
}

/// Which projection a signed-in identity sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Catalog plus own enrollments.
    Student,
    /// Owned courses with rosters, plus course/department management.
    Instructor,
}

/// Trivial role dispatch; evaluated once at login, never mid-session.
pub fn select_view(identity: &User) -> ViewKind {
    match identity.role {
        Role::Instructor => ViewKind::Instructor,
        Role::Student => ViewKind::Student,
    }
}
