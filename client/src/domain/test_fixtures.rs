//! Shared record builders for domain tests.

use chrono::NaiveDate;

use super::identity::{Role, User};
use super::records::{Course, Department, Enrollment};
use super::reference::RawRef;

pub fn student(id: i64, name: &str) -> User {
    User {
        id: RawRef::Number(id),
        name: name.to_owned(),
        email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
        password: Some("sifre123".to_owned()),
        role: Role::Student,
    }
}

pub fn instructor(id: i64, name: &str) -> User {
    User {
        role: Role::Instructor,
        ..student(id, name)
    }
}

pub fn department(id: i64, name: &str) -> Department {
    Department {
        id: RawRef::Number(id),
        name: name.to_owned(),
    }
}

pub fn course(id: i64, name: &str, credit: u32, department_id: i64, owner: &str) -> Course {
    Course {
        id: RawRef::Number(id),
        name: name.to_owned(),
        code: name.to_uppercase().replace(' ', ""),
        credit,
        capacity: Some(30),
        enrolled: Some(0),
        owner_name: Some(owner.to_owned()),
        department: Some(RawRef::Number(department_id).into_nested()),
        department_id: None,
    }
}

/// Enrollment in the flat `userId`/`courseId` dialect.
pub fn enrollment(id: i64, student_id: i64, course_id: i64) -> Enrollment {
    Enrollment {
        id: RawRef::Number(id),
        student_id: None,
        user_id: Some(RawRef::Number(student_id)),
        student: None,
        course_id: Some(RawRef::Number(course_id)),
        course: None,
        enroll_date: NaiveDate::from_ymd_opt(2026, 2, 10),
    }
}

/// Enrollment in the nested-object dialect with string identifiers.
pub fn nested_enrollment(id: i64, student_id: i64, course_id: i64) -> Enrollment {
    Enrollment {
        id: RawRef::Number(id),
        student_id: None,
        user_id: None,
        student: Some(RawRef::Text(student_id.to_string()).into_nested()),
        course_id: None,
        course: Some(RawRef::Text(course_id.to_string()).into_nested()),
        enroll_date: None,
    }
}
