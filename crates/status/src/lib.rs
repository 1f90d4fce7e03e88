//! Version-control status for editing sessions.
//!
//! This crate holds the pieces of the status pipeline that carry no session
//! state:
//! * [`LineDelta`] as reported by a provider poll
//! * [`ChangeSummary`] and its compact label (`"+3"`, `"-2+3"`, `"binary"`)
//! * [`CommitLinkBuilder`] for callback deep links into the provider
//! * [`StatusProvider`] / [`StatusLocator`] seams implemented by providers

mod delta;
mod error;
mod link;
mod provider;
mod summary;

pub use delta::LineDelta;
pub use error::{DeepLinkError, StatusError};
pub use link::{COMMIT_URL_VALUE, CommitLinkBuilder, DEFAULT_CALLBACK_URL, DEFAULT_PROVIDER_SCHEME};
pub use provider::{StatusLocator, StatusProvider};
pub use summary::ChangeSummary;

/// A convenient type alias for `Result` with `E` = [`StatusError`].
pub type Result<T, E = StatusError> = std::result::Result<T, E>;
