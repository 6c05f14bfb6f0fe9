//! Stateless constraint predicates run before any mutation is issued.
//!
//! The backend enforces none of these rules, so every predicate is checked
//! client-side, against the current snapshot, before a network call is
//! spent. Predicates never panic: each returns pass or a [`Denial`] whose
//! `Display` text is the human-readable reason.

use thiserror::Error;

use super::identity::{Role, User};
use super::records::{Course, CourseDraft, Enrollment};
use super::views::EnrichedEnrollment;

/// Maximum summed course credit a student may hold at once.
pub const CREDIT_CAP: u32 = 20;

/// Default seat capacity applied to newly created courses.
pub const DEFAULT_CAPACITY: u32 = 30;

/// A failed constraint check, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("already enrolled in course {course}")]
    DuplicateEnrollment { course: String },
    #[error("credit cap exceeded: {current} held + {requested} requested is over {cap}")]
    CreditCapExceeded {
        current: u32,
        requested: u32,
        cap: u32,
    },
    #[error("course {course} belongs to another instructor")]
    NotOwner { course: String },
    #[error("this enrollment belongs to another student")]
    NotEnrollee,
    #[error("only instructors may manage courses and departments")]
    NotInstructor,
    #[error("name must not be empty")]
    EmptyName,
    #[error("credit must be a positive integer")]
    NonPositiveCredit,
    #[error("course {course} is not in the current snapshot")]
    UnknownCourse { course: String },
    #[error("enrollment {enrollment} is not in the current snapshot")]
    UnknownEnrollment { enrollment: String },
    #[error("department {department} is not in the current snapshot")]
    UnknownDepartment { department: String },
}

/// May the student enrol in `course`, given their resolved enrollments?
///
/// `mine` must come from [`super::views::build_student_view`] so the credit
/// total here and the rendered list can never diverge. Duplicate enrollment
/// is checked before the cap. The cap admits a total of exactly
/// [`CREDIT_CAP`] and rejects anything above it.
pub fn can_enroll(course: &Course, mine: &[EnrichedEnrollment]) -> Result<(), Denial> {
    let course_id = course.canonical_id();
    if mine
        .iter()
        .any(|m| m.course.canonical_id().matches(&course_id))
    {
        return Err(Denial::DuplicateEnrollment {
            course: course.name.clone(),
        });
    }

    // Credits come off the wire unvalidated; a saturated total still sits
    // above the cap, so absurd values deny rather than wrap around.
    let current = mine
        .iter()
        .fold(0u32, |total, m| total.saturating_add(m.course.credit));
    if current.saturating_add(course.credit) > CREDIT_CAP {
        return Err(Denial::CreditCapExceeded {
            current,
            requested: course.credit,
            cap: CREDIT_CAP,
        });
    }
    Ok(())
}

/// May the identity edit or delete `course`?
///
/// Ownership is a display-name match against `teacherName`, deliberately as
/// weak as the backend's data model, not silently strengthened.
pub fn can_mutate_course(identity: &User, course: &Course) -> Result<(), Denial> {
    if identity.role != Role::Instructor
        || course.owner_name.as_deref() != Some(identity.name.as_str())
    {
        return Err(Denial::NotOwner {
            course: course.name.clone(),
        });
    }
    Ok(())
}

/// May the identity cancel `enrollment`? The enrolled student may; so may
/// any instructor.
pub fn can_unenroll(identity: &User, enrollment: &Enrollment) -> Result<(), Denial> {
    if identity.role == Role::Instructor {
        return Ok(());
    }
    if enrollment.student_ref().matches(&identity.canonical_id()) {
        return Ok(());
    }
    Err(Denial::NotEnrollee)
}

/// May the identity create courses or departments at all?
pub fn can_author(identity: &User) -> Result<(), Denial> {
    if identity.role != Role::Instructor {
        return Err(Denial::NotInstructor);
    }
    Ok(())
}

/// Field-level checks on a course draft before it becomes a wire body.
pub fn check_course_draft(draft: &CourseDraft) -> Result<(), Denial> {
    if draft.name.trim().is_empty() || draft.code.trim().is_empty() {
        return Err(Denial::EmptyName);
    }
    if draft.credit == 0 {
        return Err(Denial::NonPositiveCredit);
    }
    Ok(())
}

/// A department needs a non-empty name; nothing else.
pub fn check_department_name(name: &str) -> Result<(), Denial> {
    if name.trim().is_empty() {
        return Err(Denial::EmptyName);
    }
    Ok(())
}
