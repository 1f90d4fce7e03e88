//! Editing session coordinator.
//!
//! [`SessionBuilder::open`] spawns one coordinator task per document. The
//! task owns the store, the in-memory text, the debounce timer and the
//! cached status provider; every mutation runs as a non-overlapping step of
//! that task.
//!
//! # Lifecycle
//!
//! `Closed → Opening → Open → Closing → Closed`. A failed open goes straight
//! back to `Closed` and no handle is returned. Closing always flushes before
//! the store is closed, whether triggered by [`SessionHandle::close`] or by
//! dropping the handle.

use std::fmt;
use std::sync::Arc;

use textor_status::{ChangeSummary, StatusLocator};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::SessionConfig;
use crate::store::{DocumentStore, Location};
use crate::tally::{ReviewPrompter, ReviewTally};
use crate::ui::SessionUi;
use crate::{Result, SessionError};

mod actor;

use actor::SessionActor;

/// Capacity of the session event broadcast buffer.
const EVENT_BUFFER: usize = 64;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
	Closed,
	Opening,
	Open,
	Closing,
}

impl fmt::Display for SessionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Closed => "closed",
			Self::Opening => "opening",
			Self::Open => "open",
			Self::Closing => "closing",
		})
	}
}

/// Resolution state of the session's status provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
	/// Discovery has not run yet.
	Unresolved,
	/// Discovery found nothing; not retried this session.
	Absent,
	Available,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
	pub phase: SessionPhase,
	pub location: Location,
	/// In-memory text differs from the last flush.
	pub dirty: bool,
	/// A flushed change has not been autosaved yet.
	pub unsaved: bool,
	/// The last autosave failed.
	pub save_failed: bool,
	pub debounce_pending: bool,
	pub change_count: u64,
	pub provider: ProviderState,
	/// Last published summary.
	pub summary: Option<ChangeSummary>,
}

/// Observable session transitions.
#[derive(Debug, Clone)]
pub enum SessionEvent {
	Opened { location: Location },
	/// Text was written to the store; `change_count` is the store's count.
	Flushed { change_count: u64 },
	Saved { change_count: u64 },
	SaveFailed(SessionError),
	StatusPublished(ChangeSummary),
	CommitLinkOpened(Url),
	Closed,
}

/// Receiver for [`SessionEvent`]s.
pub type SessionEventReceiver = broadcast::Receiver<SessionEvent>;

pub(crate) enum Command {
	TextChanged(String),
	EditingEnded(oneshot::Sender<Result<bool>>),
	RefreshStatus(oneshot::Sender<Result<ChangeSummary>>),
	CommitLink(oneshot::Sender<Result<Option<Url>>>),
	Snapshot(oneshot::Sender<Result<SessionSnapshot>>),
	Close(oneshot::Sender<Result<()>>),
}

impl Command {
	pub(crate) const fn op(&self) -> &'static str {
		match self {
			Self::TextChanged(_) => "text_changed",
			Self::EditingEnded(_) => "editing_ended",
			Self::RefreshStatus(_) => "refresh_status",
			Self::CommitLink(_) => "request_commit_link",
			Self::Snapshot(_) => "snapshot",
			Self::Close(_) => "close",
		}
	}

	/// Answers a command that arrived after the session left `Open`.
	pub(crate) fn reject(self, phase: SessionPhase) {
		let err = SessionError::InvalidState { op: self.op(), phase };
		match self {
			Self::TextChanged(_) => {}
			Self::EditingEnded(reply) => {
				let _ = reply.send(Err(err));
			}
			Self::RefreshStatus(reply) => {
				let _ = reply.send(Err(err));
			}
			Self::CommitLink(reply) => {
				let _ = reply.send(Err(err));
			}
			Self::Snapshot(reply) => {
				let _ = reply.send(Err(err));
			}
			Self::Close(reply) => {
				let _ = reply.send(Err(err));
			}
		}
	}
}

/// Collaborators and settings for a session about to open.
pub struct SessionBuilder {
	store: Box<dyn DocumentStore>,
	ui: Arc<dyn SessionUi>,
	locator: Option<Arc<dyn StatusLocator>>,
	config: SessionConfig,
	tally: Arc<ReviewTally>,
	prompter: Arc<dyn ReviewPrompter>,
	events: broadcast::Sender<SessionEvent>,
}

impl SessionBuilder {
	pub fn new(store: impl DocumentStore) -> Self {
		let (events, _) = broadcast::channel(EVENT_BUFFER);
		Self {
			store: Box::new(store),
			ui: Arc::new(()),
			locator: None,
			config: SessionConfig::default(),
			tally: ReviewTally::global(),
			prompter: Arc::new(()),
			events,
		}
	}

	#[must_use]
	pub fn ui(mut self, ui: Arc<dyn SessionUi>) -> Self {
		self.ui = ui;
		self
	}

	/// Sets the status locator. Without one, every session resolves to
	/// [`ChangeSummary::NoProvider`].
	#[must_use]
	pub fn locator(mut self, locator: Arc<dyn StatusLocator>) -> Self {
		self.locator = Some(locator);
		self
	}

	#[must_use]
	pub fn config(mut self, config: SessionConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the process-wide close tally.
	#[must_use]
	pub fn tally(mut self, tally: Arc<ReviewTally>) -> Self {
		self.tally = tally;
		self
	}

	#[must_use]
	pub fn prompter(mut self, prompter: Arc<dyn ReviewPrompter>) -> Self {
		self.prompter = prompter;
		self
	}

	/// Subscribes before opening so no event is missed.
	pub fn subscribe(&self) -> SessionEventReceiver {
		self.events.subscribe()
	}

	/// Opens the document and starts the session task.
	///
	/// Resolves once the store has opened. Status discovery runs afterwards on
	/// the session task, ahead of any command sent through the handle.
	pub async fn open(self, location: impl Into<Location>) -> Result<SessionHandle> {
		let location = location.into();
		let (tx, rx) = mpsc::unbounded_channel();
		let (opened_tx, opened_rx) = oneshot::channel();
		let cancel = CancellationToken::new();
		let events = self.events.clone();

		let actor = SessionActor::new(location.clone(), self);
		let task = crate::task::spawn_session(location.as_str(), actor.run(rx, cancel.clone(), opened_tx));

		match opened_rx.await {
			Ok(Ok(())) => Ok(SessionHandle {
				location,
				tx,
				events,
				cancel,
				task: Some(task),
			}),
			Ok(Err(err)) => {
				let _ = task.await;
				Err(err)
			}
			Err(_) => Err(SessionError::SessionEnded),
		}
	}
}

/// Cloneable, non-blocking edit notification port.
#[derive(Clone)]
pub struct EditNotifier {
	tx: mpsc::UnboundedSender<Command>,
}

impl EditNotifier {
	/// Reports the full current text after an edit.
	pub fn text_changed(&self, text: impl Into<String>) -> Result<()> {
		self.tx.send(Command::TextChanged(text.into())).map_err(|_| SessionError::SessionEnded)
	}
}

/// Owning handle for one open session.
///
/// Dropping the handle cancels the session, which still flushes and closes
/// the document before the task exits.
pub struct SessionHandle {
	location: Location,
	tx: mpsc::UnboundedSender<Command>,
	events: broadcast::Sender<SessionEvent>,
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}

impl Drop for SessionHandle {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl SessionHandle {
	pub fn location(&self) -> &Location {
		&self.location
	}

	pub fn subscribe(&self) -> SessionEventReceiver {
		self.events.subscribe()
	}

	pub fn notifier(&self) -> EditNotifier {
		EditNotifier { tx: self.tx.clone() }
	}

	/// Reports the full current text after an edit. Never blocks.
	pub fn text_changed(&self, text: impl Into<String>) -> Result<()> {
		self.tx.send(Command::TextChanged(text.into())).map_err(|_| SessionError::SessionEnded)
	}

	/// Flushes immediately. Returns true if the store text changed.
	pub async fn editing_ended(&self) -> Result<bool> {
		self.request(Command::EditingEnded).await
	}

	/// Re-polls the status provider, discovering it first if needed.
	pub async fn refresh_status(&self) -> Result<ChangeSummary> {
		self.request(Command::RefreshStatus).await
	}

	/// Builds the commit link and hands it to the UI for opening.
	///
	/// `Ok(None)` when no provider is cached or the provider has nothing to
	/// link to.
	pub async fn request_commit_link(&self) -> Result<Option<Url>> {
		self.request(Command::CommitLink).await
	}

	pub async fn snapshot(&self) -> Result<SessionSnapshot> {
		self.request(Command::Snapshot).await
	}

	/// Flushes, closes the store and waits for the session task to finish.
	pub async fn close(mut self) -> Result<()> {
		let result = self.request(Command::Close).await;
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
		result
	}

	async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command) -> Result<T> {
		let (reply, rx) = oneshot::channel();
		self.tx.send(make(reply)).map_err(|_| SessionError::SessionEnded)?;
		rx.await.unwrap_or(Err(SessionError::SessionEnded))
	}
}
