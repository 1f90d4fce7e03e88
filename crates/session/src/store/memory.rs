use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{DocumentStore, Location};
use crate::StoreError;

#[derive(Debug, Default)]
struct MemoryDocument {
	persisted: String,
	text: String,
	change_count: u64,
	saved_count: u64,
	autosaves: usize,
	is_open: bool,
	text_at_close: Option<String>,
	fail_open: Option<String>,
	failing_saves: usize,
}

/// In-memory document store.
///
/// Persisted content lives behind a shared lock so a [`MemoryProbe`] can
/// inspect it after the store has moved into a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	doc: Arc<Mutex<MemoryDocument>>,
}

/// Read-only view into a [`MemoryStore`] plus failure injection.
#[derive(Debug, Clone)]
pub struct MemoryProbe {
	doc: Arc<Mutex<MemoryDocument>>,
}

impl MemoryStore {
	/// Creates a store whose persisted content is `content`.
	pub fn new(content: impl Into<String>) -> Self {
		let doc = MemoryDocument {
			persisted: content.into(),
			..MemoryDocument::default()
		};
		Self {
			doc: Arc::new(Mutex::new(doc)),
		}
	}

	pub fn probe(&self) -> MemoryProbe {
		MemoryProbe {
			doc: Arc::clone(&self.doc),
		}
	}
}

impl MemoryProbe {
	pub fn persisted(&self) -> String {
		self.doc.lock().persisted.clone()
	}

	pub fn text(&self) -> String {
		self.doc.lock().text.clone()
	}

	pub fn change_count(&self) -> u64 {
		self.doc.lock().change_count
	}

	/// Number of autosave calls, failed ones included.
	pub fn autosaves(&self) -> usize {
		self.doc.lock().autosaves
	}

	pub fn is_open(&self) -> bool {
		self.doc.lock().is_open
	}

	/// Model text observed when `close` was called.
	pub fn text_at_close(&self) -> Option<String> {
		self.doc.lock().text_at_close.clone()
	}

	/// Makes the next `open` fail with `reason`.
	pub fn fail_open(&self, reason: impl Into<String>) {
		self.doc.lock().fail_open = Some(reason.into());
	}

	/// Makes the next `count` autosaves fail.
	pub fn fail_saves(&self, count: usize) {
		self.doc.lock().failing_saves = count;
	}
}

impl MemoryDocument {
	fn persist(&mut self) {
		if self.change_count != self.saved_count {
			self.persisted.clone_from(&self.text);
			self.saved_count = self.change_count;
		}
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn open(&mut self, _location: &Location) -> Result<String, StoreError> {
		let mut doc = self.doc.lock();
		if let Some(reason) = doc.fail_open.take() {
			return Err(StoreError::Rejected(reason));
		}
		doc.text = doc.persisted.clone();
		doc.is_open = true;
		Ok(doc.text.clone())
	}

	fn text(&self) -> String {
		self.doc.lock().text.clone()
	}

	fn set_text(&mut self, text: String) {
		self.doc.lock().text = text;
	}

	fn mark_changed(&mut self) {
		let mut doc = self.doc.lock();
		doc.change_count = doc.change_count.wrapping_add(1);
	}

	fn change_count(&self) -> u64 {
		self.doc.lock().change_count
	}

	async fn autosave(&mut self) -> Result<(), StoreError> {
		let mut doc = self.doc.lock();
		doc.autosaves = doc.autosaves.wrapping_add(1);
		if !doc.is_open {
			return Err(StoreError::NotOpen);
		}
		if doc.failing_saves > 0 {
			doc.failing_saves -= 1;
			return Err(StoreError::Rejected("injected save failure".to_string()));
		}
		doc.persist();
		Ok(())
	}

	async fn close(&mut self) -> Result<(), StoreError> {
		let mut doc = self.doc.lock();
		doc.text_at_close = Some(doc.text.clone());
		doc.persist();
		doc.is_open = false;
		Ok(())
	}
}
