//! Mutation coordinator: validate, mutate, resynchronise.
//!
//! [`RegistrarService`] owns the pessimistic consistency policy around the
//! remote store. Every mutation runs the same strictly sequential pipeline:
//! claim the in-flight marker for its target, validate against the current
//! snapshot, issue exactly one write, then refetch all four collections and
//! swap the snapshot wholesale. The marker is held until the reload
//! finishes, so a second mutation against the same target is rejected (the
//! one concurrency hazard in this system) while mutations against distinct
//! targets proceed freely.
//!
//! The signed-in identity is an explicit argument on every call; the service
//! holds no ambient user state.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, warn};

use super::constraints::{self, Denial, DEFAULT_CAPACITY};
use super::error::Error;
use super::identity::User;
use super::ports::{ResourceStore, StoreError};
use super::records::{Course, CourseBody, CourseDraft, Department, Enrollment, NewDepartment, NewEnrollment};
use super::reference::CanonicalId;
use super::snapshot::Snapshot;
use super::views::{self, InstructorView, StudentView};

/// The record (or pending record) a mutation acts on. Keys the in-flight
/// set; rapid repeated triggers against one target collapse to one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationTarget {
    Course(CanonicalId),
    Enrollment(CanonicalId),
    NewCourse,
    NewDepartment,
}

impl fmt::Display for MutationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course(id) => write!(f, "course {id}"),
            Self::Enrollment(id) => write!(f, "enrollment {id}"),
            Self::NewCourse => f.write_str("course creation"),
            Self::NewDepartment => f.write_str("department creation"),
        }
    }
}

/// Releases the in-flight marker when the mutation finishes, successfully
/// or not.
struct InFlightGuard<'a> {
    registry: &'a Mutex<HashSet<MutationTarget>>,
    target: MutationTarget,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock_in_flight(self.registry).remove(&self.target);
    }
}

fn lock_in_flight(
    registry: &Mutex<HashSet<MutationTarget>>,
) -> MutexGuard<'_, HashSet<MutationTarget>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates mutations against the remote store and keeps the local
/// snapshot consistent afterwards.
pub struct RegistrarService {
    store: Arc<dyn ResourceStore>,
    snapshot: RwLock<Arc<Snapshot>>,
    in_flight: Mutex<HashSet<MutationTarget>>,
}

impl RegistrarService {
    /// Create a service over the given store with an empty snapshot. Call
    /// [`Self::refresh`] before computing views.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The current snapshot. Cheap: clones an `Arc`, never the data.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(
            &self
                .snapshot
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Student projection over the current snapshot.
    pub fn student_view(&self, identity: &User) -> StudentView {
        views::build_student_view(identity, &self.snapshot())
    }

    /// Instructor projection over the current snapshot.
    pub fn instructor_view(&self, identity: &User) -> InstructorView {
        views::build_instructor_view(identity, &self.snapshot())
    }

    /// Fetch all four collections and replace the snapshot wholesale.
    ///
    /// # Errors
    /// [`Error::ReloadFailed`] when any collection fetch fails; the previous
    /// snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, Error> {
        self.reload()
            .await
            .map_err(|source| Error::ReloadFailed { source })
    }

    async fn reload(&self) -> Result<Arc<Snapshot>, StoreError> {
        let (users, departments, courses, enrollments) = tokio::try_join!(
            self.store.list_users(),
            self.store.list_departments(),
            self.store.list_courses(),
            self.store.list_enrollments(),
        )?;
        let next = Arc::new(Snapshot {
            users,
            departments,
            courses,
            enrollments,
        });
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        debug!(
            users = next.users.len(),
            departments = next.departments.len(),
            courses = next.courses.len(),
            enrollments = next.enrollments.len(),
            "snapshot replaced"
        );
        Ok(next)
    }

    /// Claim the in-flight marker for `target`, synchronously. A claimed
    /// target rejects further mutations until the guard drops.
    fn claim(&self, target: MutationTarget) -> Result<InFlightGuard<'_>, Error> {
        let mut outstanding = lock_in_flight(&self.in_flight);
        if !outstanding.insert(target.clone()) {
            debug!(%target, "mutation rejected: target already in flight");
            return Err(Error::MutationPending { target });
        }
        Ok(InFlightGuard {
            registry: &self.in_flight,
            target,
        })
    }

    async fn resync(&self) -> Result<(), Error> {
        self.reload().await.map(|_| ()).map_err(|source| {
            warn!(error = %source, "reload after mutation failed; keeping last known-good snapshot");
            Error::ReloadFailed { source }
        })
    }

    /// Enrol `identity` in the course identified by `course_id`.
    ///
    /// # Errors
    /// [`Error::Validation`] on an unknown course, a duplicate enrollment,
    /// or a credit-cap breach; [`Error::MutationPending`] while another
    /// mutation on the course is outstanding; store failures per [`Error`].
    pub async fn enroll(
        &self,
        identity: &User,
        course_id: &CanonicalId,
    ) -> Result<Enrollment, Error> {
        let _guard = self.claim(MutationTarget::Course(course_id.clone()))?;
        let snapshot = self.snapshot();
        let course = snapshot
            .course_by_id(course_id)
            .ok_or_else(|| Denial::UnknownCourse {
                course: course_id.to_string(),
            })?;
        let view = views::build_student_view(identity, &snapshot);
        constraints::can_enroll(course, &view.mine)?;

        let draft = NewEnrollment {
            user_id: identity.id.clone(),
            course_id: course.id.clone(),
            enroll_date: Utc::now().date_naive(),
        };
        let created = self
            .store
            .create_enrollment(&draft)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await?;
        Ok(created)
    }

    /// Cancel the enrollment identified by `enrollment_id`.
    ///
    /// # Errors
    /// [`Error::Validation`] when the enrollment is unknown or belongs to
    /// another student; [`Error::MutationPending`] while a cancel for the
    /// same enrollment is outstanding; store failures per [`Error`].
    pub async fn unenroll(
        &self,
        identity: &User,
        enrollment_id: &CanonicalId,
    ) -> Result<(), Error> {
        let _guard = self.claim(MutationTarget::Enrollment(enrollment_id.clone()))?;
        let snapshot = self.snapshot();
        let enrollment =
            snapshot
                .enrollment_by_id(enrollment_id)
                .ok_or_else(|| Denial::UnknownEnrollment {
                    enrollment: enrollment_id.to_string(),
                })?;
        constraints::can_unenroll(identity, enrollment)?;

        self.store
            .delete_enrollment(enrollment_id)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await
    }

    /// Create a course owned by `identity` in the drafted department.
    ///
    /// # Errors
    /// [`Error::Validation`] unless the identity is an instructor, the draft
    /// is well-formed, and the department resolves; store failures per
    /// [`Error`].
    pub async fn create_course(
        &self,
        identity: &User,
        draft: &CourseDraft,
    ) -> Result<Course, Error> {
        let _guard = self.claim(MutationTarget::NewCourse)?;
        constraints::can_author(identity)?;
        constraints::check_course_draft(draft)?;
        let snapshot = self.snapshot();
        let department = snapshot
            .department_by_id(&draft.department_id)
            .ok_or_else(|| Denial::UnknownDepartment {
                department: draft.department_id.to_string(),
            })?;

        let body = CourseBody {
            name: draft.name.clone(),
            code: draft.code.to_uppercase(),
            credit: draft.credit,
            teacher_name: identity.name.clone(),
            capacity: DEFAULT_CAPACITY,
            enrolled: 0,
            department: department.id.clone().into_nested(),
        };
        let created = self
            .store
            .create_course(&body)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await?;
        Ok(created)
    }

    /// Replace the drafted fields of an owned course, preserving its stored
    /// owner, capacity, and enrolled count.
    ///
    /// # Errors
    /// [`Error::Validation`] unless `identity` owns the course and the draft
    /// is well-formed; [`Error::MutationPending`] while another mutation on
    /// the course is outstanding; store failures per [`Error`].
    pub async fn update_course(
        &self,
        identity: &User,
        course_id: &CanonicalId,
        draft: &CourseDraft,
    ) -> Result<Course, Error> {
        let _guard = self.claim(MutationTarget::Course(course_id.clone()))?;
        let snapshot = self.snapshot();
        let course = snapshot
            .course_by_id(course_id)
            .ok_or_else(|| Denial::UnknownCourse {
                course: course_id.to_string(),
            })?;
        constraints::can_mutate_course(identity, course)?;
        constraints::check_course_draft(draft)?;
        let department = snapshot
            .department_by_id(&draft.department_id)
            .ok_or_else(|| Denial::UnknownDepartment {
                department: draft.department_id.to_string(),
            })?;

        let body = CourseBody {
            name: draft.name.clone(),
            code: draft.code.to_uppercase(),
            credit: draft.credit,
            teacher_name: course
                .owner_name
                .clone()
                .unwrap_or_else(|| identity.name.clone()),
            capacity: course.capacity.unwrap_or(DEFAULT_CAPACITY),
            enrolled: course.enrolled.unwrap_or(0),
            department: department.id.clone().into_nested(),
        };
        let updated = self
            .store
            .replace_course(course_id, &body)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await?;
        Ok(updated)
    }

    /// Delete an owned course. Its enrollments are left dangling server-side
    /// and disappear from every view on the next join.
    ///
    /// # Errors
    /// [`Error::Validation`] unless `identity` owns the course;
    /// [`Error::MutationPending`] while another mutation on the course is
    /// outstanding; store failures per [`Error`].
    pub async fn delete_course(
        &self,
        identity: &User,
        course_id: &CanonicalId,
    ) -> Result<(), Error> {
        let _guard = self.claim(MutationTarget::Course(course_id.clone()))?;
        let snapshot = self.snapshot();
        let course = snapshot
            .course_by_id(course_id)
            .ok_or_else(|| Denial::UnknownCourse {
                course: course_id.to_string(),
            })?;
        constraints::can_mutate_course(identity, course)?;

        self.store
            .delete_course(course_id)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await
    }

    /// Create a department.
    ///
    /// # Errors
    /// [`Error::Validation`] unless `identity` is an instructor and `name`
    /// is non-empty; store failures per [`Error`].
    pub async fn create_department(
        &self,
        identity: &User,
        name: &str,
    ) -> Result<Department, Error> {
        let _guard = self.claim(MutationTarget::NewDepartment)?;
        constraints::can_author(identity)?;
        constraints::check_department_name(name)?;

        let draft = NewDepartment {
            name: name.trim().to_owned(),
        };
        let created = self
            .store
            .create_department(&draft)
            .await
            .map_err(|source| Error::RemoteMutationFailed { source })?;
        self.resync().await?;
        Ok(created)
    }
}
