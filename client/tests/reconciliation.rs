//! End-to-end reconciliation flows against the deterministic in-memory
//! store: every mutation goes validate → write → full refetch, and the
//! resulting views must stay coherent.

use std::sync::Arc;

use campus_client::domain::{
    login, register, select_view, CourseDraft, Credentials, Denial, Error, InMemoryStore,
    NewUser, RegistrarService, ResourceStore, Role, ViewKind,
};

const INSTRUCTOR_NAME: &str = "Deniz Hoca";

async fn signed_up_campus() -> (Arc<InMemoryStore>, RegistrarService) {
    let store = Arc::new(InMemoryStore::new());
    register(
        store.as_ref(),
        &NewUser {
            name: "Ayşe Yılmaz".to_owned(),
            email: "ayse@example.edu".to_owned(),
            password: "sifre123".to_owned(),
            role: Role::Student,
        },
    )
    .await
    .expect("register student");
    register(
        store.as_ref(),
        &NewUser {
            name: INSTRUCTOR_NAME.to_owned(),
            email: "deniz@example.edu".to_owned(),
            password: "hoca123".to_owned(),
            role: Role::Instructor,
        },
    )
    .await
    .expect("register instructor");

    let service = RegistrarService::new(Arc::clone(&store) as Arc<dyn ResourceStore>);
    service.refresh().await.expect("initial refresh");
    (store, service)
}

async fn sign_in(
    store: &InMemoryStore,
    email: &str,
    password: &str,
    role: Role,
) -> campus_client::User {
    login(
        store,
        &Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
            role,
        },
    )
    .await
    .expect("login")
}

#[tokio::test]
async fn created_department_name_resolves_in_the_catalog() {
    let (store, service) = signed_up_campus().await;
    let teacher = sign_in(&store, "deniz@example.edu", "hoca123", Role::Instructor).await;
    assert_eq!(select_view(&teacher), ViewKind::Instructor);

    let math = service
        .create_department(&teacher, "Math")
        .await
        .expect("create department");
    service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Algebra".to_owned(),
                code: "alg1".to_owned(),
                credit: 3,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("create course");

    let learner = sign_in(&store, "AYSE@example.edu", "sifre123", Role::Student).await;
    let view = service.student_view(&learner);
    assert_eq!(view.catalog.len(), 1);
    let entry = &view.catalog[0];
    assert_eq!(entry.course.code, "ALG1");
    // The catalog must show the resolved department name, not a raw id.
    assert_eq!(entry.department.as_ref().map(|d| d.name.as_str()), Some("Math"));
    assert!(!entry.enrolled);
}

#[tokio::test]
async fn enroll_then_unenroll_restores_the_pre_enrollment_view() {
    let (store, service) = signed_up_campus().await;
    let teacher = sign_in(&store, "deniz@example.edu", "hoca123", Role::Instructor).await;
    let math = service
        .create_department(&teacher, "Math")
        .await
        .expect("department");
    let course = service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Algebra".to_owned(),
                code: "ALG1".to_owned(),
                credit: 3,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("course");

    let learner = sign_in(&store, "ayse@example.edu", "sifre123", Role::Student).await;
    let before = service.student_view(&learner);
    assert!(before.mine.is_empty());

    let enrollment = service
        .enroll(&learner, &course.canonical_id())
        .await
        .expect("enroll");
    let during = service.student_view(&learner);
    assert_eq!(during.mine.len(), 1);
    assert_eq!(during.total_credit(), 3);
    assert!(during.catalog[0].enrolled);

    service
        .unenroll(&learner, &enrollment.canonical_id())
        .await
        .expect("unenroll");
    let after = service.student_view(&learner);
    assert_eq!(after.mine, before.mine);
    assert_eq!(after.total_credit(), 0);
    assert!(!after.catalog[0].enrolled);
}

#[tokio::test]
async fn enrolling_up_to_the_cap_is_allowed_and_over_it_is_not() {
    let (store, service) = signed_up_campus().await;
    let teacher = sign_in(&store, "deniz@example.edu", "hoca123", Role::Instructor).await;
    let math = service
        .create_department(&teacher, "Math")
        .await
        .expect("department");

    let mut course_ids = Vec::new();
    for (name, credit) in [("Analysis", 6), ("Algebra", 6), ("Geometry", 6)] {
        let course = service
            .create_course(
                &teacher,
                &CourseDraft {
                    name: name.to_owned(),
                    code: name[..3].to_owned(),
                    credit,
                    department_id: math.canonical_id(),
                },
            )
            .await
            .expect("course");
        course_ids.push(course.canonical_id());
    }
    let heavy = service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Topology".to_owned(),
                code: "TOP".to_owned(),
                credit: 3,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("course");
    let light = service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Seminar".to_owned(),
                code: "SEM".to_owned(),
                credit: 2,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("course");

    let learner = sign_in(&store, "ayse@example.edu", "sifre123", Role::Student).await;
    for id in &course_ids {
        service.enroll(&learner, id).await.expect("enroll");
    }
    assert_eq!(service.student_view(&learner).total_credit(), 18);

    // 18 + 3 = 21 > 20: denied without reaching the store.
    let denied = service.enroll(&learner, &heavy.canonical_id()).await;
    assert!(matches!(
        denied,
        Err(Error::Validation(Denial::CreditCapExceeded {
            current: 18,
            requested: 3,
            cap: 20,
        }))
    ));

    // 18 + 2 = 20: exactly at the cap, allowed.
    service
        .enroll(&learner, &light.canonical_id())
        .await
        .expect("enroll at cap");
    assert_eq!(service.student_view(&learner).total_credit(), 20);
}

#[tokio::test]
async fn deleting_a_course_orphans_its_enrollments_out_of_every_view() {
    let (store, service) = signed_up_campus().await;
    let teacher = sign_in(&store, "deniz@example.edu", "hoca123", Role::Instructor).await;
    let math = service
        .create_department(&teacher, "Math")
        .await
        .expect("department");
    let course = service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Algebra".to_owned(),
                code: "ALG1".to_owned(),
                credit: 3,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("course");

    let learner = sign_in(&store, "ayse@example.edu", "sifre123", Role::Student).await;
    service
        .enroll(&learner, &course.canonical_id())
        .await
        .expect("enroll");

    service
        .delete_course(&teacher, &course.canonical_id())
        .await
        .expect("delete course");

    // The enrollment record still exists server-side (no cascade), but it
    // dangles, so it vanishes from the student view and every roster
    // instead of crashing anything.
    let snapshot = service.snapshot();
    assert_eq!(snapshot.enrollments.len(), 1);
    let view = service.student_view(&learner);
    assert!(view.mine.is_empty());
    assert_eq!(view.total_credit(), 0);
    let roster_view = service.instructor_view(&teacher);
    assert!(roster_view.owned.is_empty());
}

#[tokio::test]
async fn instructor_roster_follows_enrollments() {
    let (store, service) = signed_up_campus().await;
    let teacher = sign_in(&store, "deniz@example.edu", "hoca123", Role::Instructor).await;
    let math = service
        .create_department(&teacher, "Math")
        .await
        .expect("department");
    let course = service
        .create_course(
            &teacher,
            &CourseDraft {
                name: "Algebra".to_owned(),
                code: "ALG1".to_owned(),
                credit: 3,
                department_id: math.canonical_id(),
            },
        )
        .await
        .expect("course");

    let learner = sign_in(&store, "ayse@example.edu", "sifre123", Role::Student).await;
    service
        .enroll(&learner, &course.canonical_id())
        .await
        .expect("enroll");

    let view = service.instructor_view(&teacher);
    assert_eq!(view.owned.len(), 1);
    let roster: Vec<&str> = view.owned[0]
        .roster
        .iter()
        .map(|m| m.display_name())
        .collect();
    assert_eq!(roster, vec!["Ayşe Yılmaz"]);
}

#[tokio::test]
async fn login_rejects_wrong_role_wrong_password_and_unknown_email() {
    let (store, _service) = signed_up_campus().await;

    for (email, password, role) in [
        ("ayse@example.edu", "sifre123", Role::Instructor),
        ("ayse@example.edu", "yanlis", Role::Student),
        ("kimse@example.edu", "sifre123", Role::Student),
    ] {
        let outcome = login(
            store.as_ref(),
            &Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
                role,
            },
        )
        .await;
        assert!(matches!(outcome, Err(Error::Unauthorized)));
    }
}
