//! Reconciliation and consistency engine.
//!
//! Data flows one direction per action: mutation request → constraint
//! validator → mutation coordinator → remote store → full collection
//! refetch → identifier normaliser → join engine → new view. No partial or
//! delta updates are attempted; every mutation is followed by a full reload
//! of the collections, trading bandwidth for correctness simplicity.

pub mod auth;
pub mod constraints;
pub mod error;
pub mod identity;
pub mod ports;
pub mod records;
pub mod reference;
pub mod registrar;
pub mod snapshot;
pub mod views;

pub use self::auth::{login, register, Credentials};
pub use self::constraints::{Denial, CREDIT_CAP, DEFAULT_CAPACITY};
pub use self::error::Error;
pub use self::identity::{select_view, Role, User, ViewKind};
pub use self::ports::{InMemoryStore, ResourceStore, StoreError};
pub use self::records::{
    Course, CourseBody, CourseDraft, Department, Enrollment, NewDepartment, NewEnrollment,
    NewUser,
};
pub use self::reference::{normalize, normalize_chain, CanonicalId, RawRef};
pub use self::registrar::{MutationTarget, RegistrarService};
pub use self::snapshot::Snapshot;
pub use self::views::{
    build_instructor_view, build_student_view, CatalogEntry, CourseWithRoster,
    EnrichedEnrollment, InstructorView, RosterMember, StudentView,
};

#[cfg(test)]
mod constraints_tests;
#[cfg(test)]
mod test_fixtures;
