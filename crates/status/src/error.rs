//! Error types for status providers and deep links.

use thiserror::Error;

/// Errors reported by a status provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatusError {
	/// The provider could not compute line counts.
	#[error("status fetch failed: {0}")]
	Fetch(String),

	/// The provider could not produce a deep link.
	#[error("deep link query failed: {0}")]
	DeepLink(String),

	/// The provider backend is gone or unreachable.
	#[error("status provider unavailable: {0}")]
	Unavailable(String),
}

/// Errors building a commit callback link.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeepLinkError {
	/// The composed callback link is not a valid URL.
	#[error("cannot encode commit link for {target}: {reason}")]
	Encoding {
		/// The remote URL that was being embedded.
		target: String,
		/// Why the composed link was rejected.
		reason: String,
	},
}
