//! Editing session coordinator.
//!
//! A session owns one open document and serializes everything that touches
//! it through a single task:
//! * edit notifications and the debounce timer that coalesces them
//! * flushes of in-memory text into the [`DocumentStore`]
//! * autosave and close, always flush-before-close
//! * lazy discovery and polling of a [`textor_status::StatusProvider`]
//!
//! Callers drive a session through a [`SessionHandle`] and observe it either
//! through the [`SessionUi`] seam or by subscribing to [`SessionEvent`]s.

pub mod config;
mod coordinator;
mod debounce;
mod error;
pub mod store;
mod tally;
mod task;
mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CommitLinkConfig, SessionConfig};
pub use coordinator::{
	EditNotifier, ProviderState, SessionBuilder, SessionEvent, SessionEventReceiver, SessionHandle, SessionPhase, SessionSnapshot,
};
pub use debounce::DebounceTimer;
pub use error::{ConfigError, SessionError, StoreError};
pub use store::{DocumentStore, FsDocumentStore, Location, MemoryProbe, MemoryStore};
pub use tally::{ReviewPrompter, ReviewTally};
pub use ui::SessionUi;

/// A convenient type alias for `Result` with `E` = [`SessionError`].
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
