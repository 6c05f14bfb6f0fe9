//! Immutable per-reload snapshot of the four remote collections.
//!
//! A snapshot is fetched whole, never patched: after every mutation the
//! coordinator replaces the previous snapshot with a freshly fetched one.
//! Readers therefore always see either the old state or the new state, never
//! a partially updated mixture, without any record-level locking.

use super::identity::User;
use super::records::{Course, Department, Enrollment};
use super::reference::CanonicalId;

/// One fetched copy of all four collections, in remote order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub departments: Vec<Department>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
}

impl Snapshot {
    /// Look up a course by canonical identifier.
    pub fn course_by_id(&self, id: &CanonicalId) -> Option<&Course> {
        self.courses.iter().find(|c| c.canonical_id().matches(id))
    }

    /// Look up a department by canonical identifier.
    pub fn department_by_id(&self, id: &CanonicalId) -> Option<&Department> {
        self.departments
            .iter()
            .find(|d| d.canonical_id().matches(id))
    }

    /// Look up an enrollment by canonical identifier.
    pub fn enrollment_by_id(&self, id: &CanonicalId) -> Option<&Enrollment> {
        self.enrollments
            .iter()
            .find(|e| e.canonical_id().matches(id))
    }

    /// Look up a user by canonical identifier.
    pub fn user_by_id(&self, id: &CanonicalId) -> Option<&User> {
        self.users.iter().find(|u| u.canonical_id().matches(id))
    }
}
