//! Backing document stores.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::StoreError;

mod fs;
mod memory;

pub use fs::FsDocumentStore;
pub use memory::{MemoryProbe, MemoryStore};

/// Opaque identifier of a persistent document (a path or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
	pub fn new(location: impl Into<String>) -> Self {
		Self(location.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Location {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for Location {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&Path> for Location {
	fn from(value: &Path) -> Self {
		Self(value.to_string_lossy().into_owned())
	}
}

impl AsRef<str> for Location {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A persistent text document owned by one session.
///
/// The session writes `text` during flushes and bumps the change count when
/// the flushed text differs from the previous flush. `autosave` and `close`
/// persist the text when the change count advanced since the last save.
#[async_trait]
pub trait DocumentStore: Send + 'static {
	/// Opens the document, returning its current content.
	async fn open(&mut self, location: &Location) -> Result<String, StoreError>;

	/// Model text as of the last flush.
	fn text(&self) -> String;

	fn set_text(&mut self, text: String);

	/// Records that the model text changed since it was last persisted.
	fn mark_changed(&mut self);

	fn change_count(&self) -> u64;

	async fn autosave(&mut self) -> Result<(), StoreError>;

	async fn close(&mut self) -> Result<(), StoreError>;
}

