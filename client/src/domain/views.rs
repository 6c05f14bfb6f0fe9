//! Relational join engine: role-scoped projections over one snapshot.
//!
//! The four collections are joined here and nowhere else. Both student
//! projections, the annotated catalog and the `mine` list, are computed
//! from a single membership predicate so they can never disagree about
//! whether a course is held. Dangling references are filtered, not raised:
//! the backend performs no cascade deletes, so an enrollment whose course is
//! gone is expected data, not an error.
//!
//! Ordering: remote collection order is preserved throughout. The backend
//! guarantees no order, so imposing one here would only hide that fact from
//! callers; anyone needing determinism sorts explicitly.

use super::identity::User;
use super::records::{Course, Department, Enrollment};
use super::reference::CanonicalId;
use super::snapshot::Snapshot;

/// One of the student's enrollments with its course and department resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEnrollment {
    pub enrollment: Enrollment,
    pub course: Course,
    /// Resolved department, when the course's reference still resolves.
    pub department: Option<Department>,
}

/// A catalog row: every course, annotated for the signed-in student.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub course: Course,
    pub department: Option<Department>,
    /// Whether the student already holds this course. Derived from the same
    /// membership predicate that builds [`StudentView::mine`].
    pub enrolled: bool,
    /// The matching enrollment's id, for the cancel affordance.
    pub enrollment_id: Option<CanonicalId>,
}

/// Student projection: full catalog plus the student's own enrollments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentView {
    pub catalog: Vec<CatalogEntry>,
    pub mine: Vec<EnrichedEnrollment>,
}

impl StudentView {
    /// Summed credit of the resolved enrollments in `mine`.
    ///
    /// This is the figure the credit-cap check consumes; deriving it from
    /// the same join keeps the cap and the rendered list in lockstep.
    pub fn total_credit(&self) -> u32 {
        self.mine
            .iter()
            .fold(0, |total, e| total.saturating_add(e.course.credit))
    }
}

/// A roster row on an instructor's course.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterMember {
    pub enrollment_id: CanonicalId,
    /// Resolved student record; `None` when the enrollment's student
    /// reference dangles.
    pub student: Option<User>,
}

impl RosterMember {
    /// Display name, with a placeholder for unresolved students so one bad
    /// row never takes down the whole roster.
    pub fn display_name(&self) -> &str {
        self.student
            .as_ref()
            .map_or("(unknown student)", |s| s.name.as_str())
    }
}

/// An owned course with its resolved roster.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseWithRoster {
    pub course: Course,
    pub department: Option<Department>,
    pub roster: Vec<RosterMember>,
}

/// Instructor projection: owned courses with rosters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstructorView {
    pub owned: Vec<CourseWithRoster>,
}

/// Build the student projection for `identity` from one snapshot.
///
/// `mine` keeps only enrollments whose normalised student reference matches
/// the identity and whose course still resolves; the catalog annotation is
/// then computed from `mine` membership, never from a second data source.
pub fn build_student_view(identity: &User, snapshot: &Snapshot) -> StudentView {
    let me = identity.canonical_id();

    let mine: Vec<EnrichedEnrollment> = snapshot
        .enrollments
        .iter()
        .filter(|e| e.student_ref().matches(&me))
        .filter_map(|e| {
            let course = snapshot.course_by_id(&e.course_ref())?;
            let department = snapshot.department_by_id(&course.department_ref());
            Some(EnrichedEnrollment {
                enrollment: e.clone(),
                course: course.clone(),
                department: department.cloned(),
            })
        })
        .collect();

    let catalog = snapshot
        .courses
        .iter()
        .map(|course| {
            let course_id = course.canonical_id();
            let held = mine
                .iter()
                .find(|m| m.course.canonical_id().matches(&course_id));
            CatalogEntry {
                department: snapshot
                    .department_by_id(&course.department_ref())
                    .cloned(),
                enrolled: held.is_some(),
                enrollment_id: held.map(|m| m.enrollment.canonical_id()),
                course: course.clone(),
            }
        })
        .collect();

    StudentView { catalog, mine }
}

/// Build the instructor projection for `identity` from one snapshot.
///
/// Ownership is matched by display name, faithfully preserving the backend's
/// weak link. Roster members with dangling student references become
/// placeholders rather than failing the roster.
pub fn build_instructor_view(identity: &User, snapshot: &Snapshot) -> InstructorView {
    let owned = snapshot
        .courses
        .iter()
        .filter(|c| c.owner_name.as_deref() == Some(identity.name.as_str()))
        .map(|course| {
            let course_id = course.canonical_id();
            let roster = snapshot
                .enrollments
                .iter()
                .filter(|e| e.course_ref().matches(&course_id))
                .map(|e| RosterMember {
                    enrollment_id: e.canonical_id(),
                    student: snapshot.user_by_id(&e.student_ref()).cloned(),
                })
                .collect();
            CourseWithRoster {
                department: snapshot
                    .department_by_id(&course.department_ref())
                    .cloned(),
                roster,
                course: course.clone(),
            }
        })
        .collect();

    InstructorView { owned }
}
