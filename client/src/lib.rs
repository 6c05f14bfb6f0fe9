//! Client-side reconciliation engine for the campus registration API.
//!
//! The remote backend stores four independent, denormalised collections
//! (users, departments, courses, enrollments) and enforces none of the
//! business rules between them. This crate joins those collections into
//! coherent per-role views, validates every mutation client-side (credit
//! cap, duplicate enrollment, ownership), and resynchronises local state by
//! refetching all four collections after each write.
//!
//! Typical flow: [`domain::login`] yields the session identity, a
//! [`domain::RegistrarService`] over an [`outbound::HttpStore`] loads the
//! first snapshot via `refresh`, and [`domain::select_view`] decides whether
//! to compute the student or instructor projection.

pub mod domain;
pub mod outbound;

pub use domain::{
    login, register, select_view, CanonicalId, Credentials, Error, RegistrarService, Role,
    Snapshot, User, ViewKind,
};
pub use outbound::HttpStore;
