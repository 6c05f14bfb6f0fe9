//! Wire records for the department, course, and enrollment collections.
//!
//! These types mirror what the remote store actually serves, including its
//! inconsistencies: foreign keys appear flat or nested, field names drift
//! between records, and several fields are simply missing on older rows.
//! Accessor methods funnel every reference through the normaliser so no
//! caller ever compares raw values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Role;
use super::reference::{normalize_chain, CanonicalId, RawRef};

/// A department record. Leaf entity with no foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: RawRef,
    pub name: String,
}

impl Department {
    pub fn canonical_id(&self) -> CanonicalId {
        self.id.canonical()
    }
}

/// A course record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: RawRef,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub credit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled: Option<u32>,
    /// Ownership link: the display name of the owning instructor. A
    /// denormalised non-foreign-key match; two instructors sharing a name
    /// alias to the same course set (backend limitation, preserved as-is).
    #[serde(default, rename = "teacherName", skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Department reference in nested form, `{"id": ...}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<RawRef>,
    /// Department reference in flat form; consulted when `department` is
    /// absent or carries no id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<RawRef>,
}

impl Course {
    pub fn canonical_id(&self) -> CanonicalId {
        self.id.canonical()
    }

    /// Resolved department reference, whichever dialect the record uses.
    pub fn department_ref(&self) -> CanonicalId {
        normalize_chain([self.department.as_ref(), self.department_id.as_ref()])
    }
}

/// An enrollment record linking a student to a course.
///
/// The student and course references each come in several dialects; the
/// accessor chains mirror the fallback order the views rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: RawRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RawRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RawRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<RawRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<RawRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<RawRef>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub enroll_date: Option<NaiveDate>,
}

/// `enrollDate` arrives either as a bare date or as a full ISO-8601
/// datetime (the browser client writes `new Date().toISOString()`). Only
/// the calendar date is meaningful here.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    text.parse::<NaiveDate>()
        .or_else(|_| text.parse::<DateTime<Utc>>().map(|stamp| stamp.date_naive()))
        .map(Some)
        .map_err(serde::de::Error::custom)
}

impl Enrollment {
    pub fn canonical_id(&self) -> CanonicalId {
        self.id.canonical()
    }

    /// Student reference: `studentId`, then `userId`, then nested `student`.
    pub fn student_ref(&self) -> CanonicalId {
        normalize_chain([
            self.student_id.as_ref(),
            self.user_id.as_ref(),
            self.student.as_ref(),
        ])
    }

    /// Course reference: `courseId`, then nested `course`.
    pub fn course_ref(&self) -> CanonicalId {
        normalize_chain([self.course_id.as_ref(), self.course.as_ref()])
    }
}

/// Registration payload for `POST /users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Payload for `POST /departments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDepartment {
    pub name: String,
}

/// Payload for `POST /enrollments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrollment {
    pub user_id: RawRef,
    pub course_id: RawRef,
    pub enroll_date: NaiveDate,
}

/// Caller-facing course draft: what an instructor types into the form.
/// The coordinator resolves the department and fills in the ownership and
/// capacity fields before anything reaches the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub code: String,
    pub credit: u32,
    pub department_id: CanonicalId,
}

/// Full course body sent on `POST /courses` and `PUT /courses/<id>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseBody {
    pub name: String,
    pub code: String,
    pub credit: u32,
    #[serde(rename = "teacherName")]
    pub teacher_name: String,
    pub capacity: u32,
    pub enrolled: u32,
    /// Department foreign key in the nested shape the backend expects.
    pub department: RawRef,
}
