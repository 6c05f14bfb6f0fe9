//! Engine error taxonomy.
//!
//! Every failure is terminal for its attempt: nothing here is retried
//! automatically, and a failed reload never provokes a fabricated optimistic
//! update. Dangling references are not errors at all; the join engine
//! filters them silently.

use thiserror::Error;

use super::constraints::Denial;
use super::ports::StoreError;
use super::registrar::MutationTarget;

/// Failures surfaced by the engine to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A constraint predicate failed before any network call. Recoverable:
    /// the user corrects input and retries.
    #[error("validation failed: {0}")]
    Validation(#[from] Denial),
    /// A mutation against the same target is still outstanding; the new
    /// request is rejected, not queued.
    #[error("a mutation is already in flight for {target}")]
    MutationPending { target: MutationTarget },
    /// The write request failed. Local state stays at the last known-good
    /// snapshot; no partial mutation is assumed applied.
    #[error("remote mutation failed")]
    RemoteMutationFailed {
        #[source]
        source: StoreError,
    },
    /// A collection fetch failed, either the post-write resynchronisation
    /// or an explicit refresh. State is only as fresh as the last successful
    /// reload.
    #[error("collection reload failed")]
    ReloadFailed {
        #[source]
        source: StoreError,
    },
    /// No account matched the supplied credentials.
    #[error("no account matches the supplied credentials")]
    Unauthorized,
}
