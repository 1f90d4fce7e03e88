//! Error types for editing sessions.

use std::path::PathBuf;
use std::sync::Arc;

use textor_status::{DeepLinkError, StatusError};
use thiserror::Error;

use crate::coordinator::SessionPhase;

/// Errors reported by a [`crate::DocumentStore`].
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StoreError {
	/// Reading or writing the backing file failed.
	#[error("I/O error on {location}: {error}")]
	Io {
		location: String,
		#[source]
		error: Arc<std::io::Error>,
	},

	/// The backing content is not valid UTF-8 text.
	#[error("{0} is not UTF-8 text")]
	NotText(String),

	/// An operation needed an open document.
	#[error("document is not open")]
	NotOpen,

	/// The store declined the operation.
	#[error("store rejected operation: {0}")]
	Rejected(String),
}

impl StoreError {
	pub fn io(location: impl Into<String>, error: std::io::Error) -> Self {
		Self::Io {
			location: location.into(),
			error: Arc::new(error),
		}
	}
}

/// Errors surfaced by an editing session.
///
/// Only [`SessionError::OpenFailed`] ends the session; everything else is
/// recoverable.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SessionError {
	/// The document could not be opened. The session is unusable.
	#[error("document {location} could not be opened: {source}")]
	OpenFailed {
		location: String,
		#[source]
		source: StoreError,
	},

	/// Autosave failed. Unsaved state is kept for the next attempt.
	#[error("autosave failed: {0}")]
	SaveFailed(#[source] StoreError),

	/// Polling the status provider failed.
	#[error(transparent)]
	StatusFetchFailed(StatusError),

	/// The commit link could not be composed.
	#[error(transparent)]
	DeepLinkEncodingFailed(#[from] DeepLinkError),

	/// The provider could not produce a deep link.
	#[error("commit link unavailable: {0}")]
	DeepLinkQueryFailed(#[source] StatusError),

	/// The operation is not valid in the current lifecycle phase.
	#[error("{op} is not valid while the session is {phase}")]
	InvalidState { op: &'static str, phase: SessionPhase },

	/// The session task has finished.
	#[error("session ended")]
	SessionEnded,
}

/// Errors that can occur when loading session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid value for {field}: {reason}")]
	Invalid { field: &'static str, reason: String },
}
