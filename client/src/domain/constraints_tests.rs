//! Constraint predicate coverage, including the exact-cap boundary.

use rstest::rstest;

use super::constraints::{
    can_author, can_enroll, can_mutate_course, can_unenroll, check_course_draft,
    check_department_name, Denial, CREDIT_CAP,
};
use super::records::CourseDraft;
use super::reference::CanonicalId;
use super::snapshot::Snapshot;
use super::test_fixtures::{course, department, enrollment, instructor, student};
use super::views::build_student_view;

/// Build the resolved `mine` list for a student holding the given credits.
fn mine_with_credits(credits: &[u32]) -> Vec<super::views::EnrichedEnrollment> {
    let learner = student(1, "Ayşe Yılmaz");
    let courses = credits
        .iter()
        .enumerate()
        .map(|(i, &credit)| course(100 + i as i64, &format!("Course {i}"), credit, 10, "Hoca"))
        .collect();
    let enrollments = credits
        .iter()
        .enumerate()
        .map(|(i, _)| enrollment(200 + i as i64, 1, 100 + i as i64))
        .collect();
    let snapshot = Snapshot {
        users: vec![learner.clone()],
        departments: vec![department(10, "Math")],
        courses,
        enrollments,
    };
    build_student_view(&learner, &snapshot).mine
}

#[rstest]
#[case::over_cap(&[6, 6, 6], 3, false)] // 18 + 3 = 21 > 20
#[case::exactly_at_cap(&[6, 6, 6], 2, true)] // 18 + 2 = 20, allowed
#[case::far_below_cap(&[3], 3, true)]
#[case::single_course_over(&[], 21, false)]
fn credit_cap_admits_exactly_twenty(
    #[case] held: &[u32],
    #[case] requested: u32,
    #[case] admitted: bool,
) {
    let mine = mine_with_credits(held);
    let next = course(999, "Next", requested, 10, "Hoca");

    let outcome = can_enroll(&next, &mine);
    if admitted {
        assert_eq!(outcome, Ok(()));
    } else {
        let current: u32 = held.iter().sum();
        assert_eq!(
            outcome,
            Err(Denial::CreditCapExceeded {
                current,
                requested,
                cap: CREDIT_CAP,
            })
        );
    }
}

#[test]
fn absurd_wire_credits_saturate_and_still_deny() {
    // A hostile or corrupt record must not wrap the running total back
    // under the cap.
    let mine = mine_with_credits(&[u32::MAX, 6]);
    let next = course(999, "Next", 21, 10, "Hoca");

    assert_eq!(
        can_enroll(&next, &mine),
        Err(Denial::CreditCapExceeded {
            current: u32::MAX,
            requested: 21,
            cap: CREDIT_CAP,
        })
    );
}

#[test]
fn duplicate_enrollment_is_denied_before_the_cap() {
    let mine = mine_with_credits(&[3]);
    // Same id as the first held course; huge credit would also breach the
    // cap, but the duplicate reason must win.
    let held_again = course(100, "Course 0", 25, 10, "Hoca");

    assert_eq!(
        can_enroll(&held_again, &mine),
        Err(Denial::DuplicateEnrollment {
            course: "Course 0".to_owned(),
        })
    );
}

#[test]
fn cap_total_is_the_view_total() {
    let mine = mine_with_credits(&[6, 6, 6]);
    let total: u32 = mine.iter().map(|m| m.course.credit).sum();
    assert_eq!(total, 18);
}

#[test]
fn owner_may_mutate_their_course() {
    let owner = instructor(3, "Deniz Hoca");
    let owned = course(20, "Algebra", 3, 10, "Deniz Hoca");
    assert_eq!(can_mutate_course(&owner, &owned), Ok(()));
}

#[test]
fn another_instructor_is_not_owner() {
    let rival = instructor(4, "Başka Hoca");
    let owned = course(20, "Algebra", 3, 10, "Deniz Hoca");
    assert_eq!(
        can_mutate_course(&rival, &owned),
        Err(Denial::NotOwner {
            course: "Algebra".to_owned(),
        })
    );
}

#[test]
fn a_student_with_the_owners_name_is_not_owner() {
    let impostor = student(5, "Deniz Hoca");
    let owned = course(20, "Algebra", 3, 10, "Deniz Hoca");
    assert!(can_mutate_course(&impostor, &owned).is_err());
}

#[test]
fn unenroll_allows_the_enrollee_and_any_instructor() {
    let own = enrollment(30, 1, 20);
    assert_eq!(can_unenroll(&student(1, "Ayşe Yılmaz"), &own), Ok(()));
    assert_eq!(can_unenroll(&instructor(3, "Deniz Hoca"), &own), Ok(()));
    assert_eq!(
        can_unenroll(&student(2, "Mehmet Demir"), &own),
        Err(Denial::NotEnrollee)
    );
}

#[test]
fn authoring_requires_the_instructor_role() {
    assert_eq!(can_author(&instructor(3, "Deniz Hoca")), Ok(()));
    assert_eq!(
        can_author(&student(1, "Ayşe Yılmaz")),
        Err(Denial::NotInstructor)
    );
}

#[rstest]
#[case("", "ALG1", 3, Denial::EmptyName)]
#[case("Algebra", "  ", 3, Denial::EmptyName)]
#[case("Algebra", "ALG1", 0, Denial::NonPositiveCredit)]
fn malformed_course_drafts_are_denied(
    #[case] name: &str,
    #[case] code: &str,
    #[case] credit: u32,
    #[case] expected: Denial,
) {
    let draft = CourseDraft {
        name: name.to_owned(),
        code: code.to_owned(),
        credit,
        department_id: CanonicalId::resolved("10"),
    };
    assert_eq!(check_course_draft(&draft), Err(expected));
}

#[test]
fn department_name_must_not_be_blank() {
    assert_eq!(check_department_name("  "), Err(Denial::EmptyName));
    assert_eq!(check_department_name("Math"), Ok(()));
}
