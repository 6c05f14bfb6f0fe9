//! Outbound adapters for the remote resource store.

mod http_store;

pub use http_store::{HttpStore, DEFAULT_TIMEOUT};
