//! Scripted collaborators for session tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use textor_status::{LineDelta, StatusError, StatusLocator, StatusProvider};
use url::Url;

use crate::{ReviewPrompter, SessionError, SessionUi};

/// Provider answering polls from a script; the last answer repeats.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
	polls: Mutex<VecDeque<Result<LineDelta, StatusError>>>,
	link: Mutex<Option<Result<Option<Url>, StatusError>>>,
	pub(crate) fetches: AtomicUsize,
}

impl ScriptedProvider {
	pub(crate) fn with_polls(polls: impl IntoIterator<Item = Result<LineDelta, StatusError>>) -> Arc<Self> {
		Arc::new(Self {
			polls: Mutex::new(polls.into_iter().collect()),
			..Self::default()
		})
	}

	pub(crate) fn set_link(&self, link: Result<Option<Url>, StatusError>) {
		*self.link.lock() = Some(link);
	}

	pub(crate) fn fetches(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl StatusProvider for ScriptedProvider {
	async fn fetch_status(&self) -> Result<LineDelta, StatusError> {
		self.fetches.fetch_add(1, Ordering::SeqCst);
		let mut polls = self.polls.lock();
		if polls.len() > 1 {
			return polls.pop_front().unwrap_or(Ok(LineDelta::default()));
		}
		polls.front().cloned().unwrap_or(Ok(LineDelta::default()))
	}

	async fn determine_deep_link(&self) -> Result<Option<Url>, StatusError> {
		self.link.lock().clone().unwrap_or(Ok(None))
	}
}

/// Locator returning a fixed provider (or none) and counting lookups.
pub(crate) struct ScriptedLocator {
	provider: Option<Arc<ScriptedProvider>>,
	pub(crate) discoveries: AtomicUsize,
}

impl ScriptedLocator {
	pub(crate) fn found(provider: Arc<ScriptedProvider>) -> Arc<Self> {
		Arc::new(Self {
			provider: Some(provider),
			discoveries: AtomicUsize::new(0),
		})
	}

	pub(crate) fn absent() -> Arc<Self> {
		Arc::new(Self {
			provider: None,
			discoveries: AtomicUsize::new(0),
		})
	}

	pub(crate) fn discoveries(&self) -> usize {
		self.discoveries.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl StatusLocator for ScriptedLocator {
	async fn discover(&self, _location: &str) -> Option<Arc<dyn StatusProvider>> {
		self.discoveries.fetch_add(1, Ordering::SeqCst);
		self.provider.clone().map(|p| p as Arc<dyn StatusProvider>)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCall {
	Label(String, bool),
	Open(String),
	Error(String),
}

#[derive(Default)]
pub(crate) struct RecordingUi {
	calls: Mutex<Vec<UiCall>>,
}

impl RecordingUi {
	pub(crate) fn calls(&self) -> Vec<UiCall> {
		self.calls.lock().clone()
	}

	pub(crate) fn last_label(&self) -> Option<(String, bool)> {
		self.calls.lock().iter().rev().find_map(|call| match call {
			UiCall::Label(text, enabled) => Some((text.clone(), *enabled)),
			_ => None,
		})
	}
}

impl SessionUi for RecordingUi {
	fn set_status_label(&self, text: &str, enabled: bool) {
		self.calls.lock().push(UiCall::Label(text.to_string(), enabled));
	}

	fn open_external_url(&self, url: &Url) {
		self.calls.lock().push(UiCall::Open(url.to_string()));
	}

	fn show_error(&self, error: &SessionError) {
		self.calls.lock().push(UiCall::Error(error.to_string()));
	}
}

#[derive(Default)]
pub(crate) struct CountingPrompter(pub(crate) AtomicUsize);

impl ReviewPrompter for CountingPrompter {
	fn request_review(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}
