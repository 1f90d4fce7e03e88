use std::sync::Arc;

use textor_status::{ChangeSummary, CommitLinkBuilder, StatusLocator, StatusProvider};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{Command, ProviderState, SessionBuilder, SessionEvent, SessionPhase, SessionSnapshot};
use crate::config::SessionConfig;
use crate::debounce::DebounceTimer;
use crate::store::{DocumentStore, Location};
use crate::tally::{ReviewPrompter, ReviewTally};
use crate::ui::SessionUi;
use crate::{Result, SessionError};

/// Cached provider resolution. Owned by the session, resolved at most once.
enum ProviderSlot {
	Unresolved,
	Absent,
	Resolved(Arc<dyn StatusProvider>),
}

enum Step {
	Command(Command),
	Debounce,
	/// Every handle and notifier is gone, or the session was cancelled.
	Abandoned,
}

/// Continuation directive after one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
	Continue,
	Stop,
}

pub(super) struct SessionActor {
	location: Location,
	store: Box<dyn DocumentStore>,
	ui: Arc<dyn SessionUi>,
	locator: Option<Arc<dyn StatusLocator>>,
	provider: ProviderSlot,
	links: CommitLinkBuilder,
	config: SessionConfig,
	tally: Arc<ReviewTally>,
	prompter: Arc<dyn ReviewPrompter>,
	events: broadcast::Sender<SessionEvent>,
	phase: SessionPhase,
	text: String,
	/// Text as of the last flush; always equal to the store's model text.
	flushed: String,
	unsaved: bool,
	save_failed: bool,
	summary: Option<ChangeSummary>,
	debounce: DebounceTimer,
}

impl SessionActor {
	pub(super) fn new(location: Location, builder: SessionBuilder) -> Self {
		let SessionBuilder {
			store,
			ui,
			locator,
			config,
			tally,
			prompter,
			events,
		} = builder;

		Self {
			location,
			store,
			ui,
			locator,
			provider: ProviderSlot::Unresolved,
			links: config.commit_link.builder(),
			debounce: DebounceTimer::new(config.debounce()),
			config,
			tally,
			prompter,
			events,
			phase: SessionPhase::Closed,
			text: String::new(),
			flushed: String::new(),
			unsaved: false,
			save_failed: false,
			summary: None,
		}
	}

	pub(super) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken, opened: oneshot::Sender<Result<()>>) {
		let result = self.open().await;
		let failed = result.is_err();
		let _ = opened.send(result);
		if failed {
			return;
		}
		self.refresh_status().await;

		loop {
			let step = tokio::select! {
				biased;
				_ = cancel.cancelled() => Step::Abandoned,
				cmd = rx.recv() => match cmd {
					Some(cmd) => Step::Command(cmd),
					None => Step::Abandoned,
				},
				_ = self.debounce.fired() => Step::Debounce,
			};

			match step {
				Step::Command(cmd) => {
					if self.handle(cmd).await == Flow::Stop {
						break;
					}
				}
				Step::Debounce => self.on_debounce_fired().await,
				Step::Abandoned => {
					// Edits already queued still belong in the document.
					while let Ok(cmd) = rx.try_recv() {
						match cmd {
							Command::TextChanged(text) => self.text = text,
							other => other.reject(SessionPhase::Closing),
						}
					}
					debug!(location = %self.location, "session.abandoned");
					self.close().await;
					break;
				}
			}
		}

		rx.close();
		while let Ok(cmd) = rx.try_recv() {
			debug!(op = cmd.op(), "session.command.after_close");
			cmd.reject(self.phase);
		}
	}

	async fn handle(&mut self, cmd: Command) -> Flow {
		match cmd {
			Command::TextChanged(text) => self.on_text_changed(text),
			Command::EditingEnded(reply) => {
				let changed = self.flush();
				if self.save_failed && !self.debounce.is_pending() {
					// Retry the failed autosave on the regular schedule.
					self.debounce.arm();
				}
				let _ = reply.send(Ok(changed));
			}
			Command::RefreshStatus(reply) => {
				let summary = self.refresh_status().await;
				let _ = reply.send(Ok(summary));
			}
			Command::CommitLink(reply) => {
				let result = self.request_commit_link().await;
				let _ = reply.send(result);
			}
			Command::Snapshot(reply) => {
				let _ = reply.send(Ok(self.snapshot()));
			}
			Command::Close(reply) => {
				self.close().await;
				let _ = reply.send(Ok(()));
				return Flow::Stop;
			}
		}
		Flow::Continue
	}

	async fn open(&mut self) -> Result<()> {
		self.phase = SessionPhase::Opening;
		match self.store.open(&self.location).await {
			Ok(content) => {
				debug!(location = %self.location, bytes = content.len(), "session.open");
				self.text.clone_from(&content);
				self.flushed = content;
				self.phase = SessionPhase::Open;
				self.emit(SessionEvent::Opened {
					location: self.location.clone(),
				});
				Ok(())
			}
			Err(source) => {
				warn!(location = %self.location, error = %source, "session.open_failed");
				self.phase = SessionPhase::Closed;
				Err(SessionError::OpenFailed {
					location: self.location.to_string(),
					source,
				})
			}
		}
	}

	fn on_text_changed(&mut self, text: String) {
		self.text = text;
		let autosave_enabled = matches!(self.provider, ProviderSlot::Resolved(_)) || self.config.autosave_without_provider;
		if autosave_enabled {
			let replaced = self.debounce.arm();
			debug!(replaced, window_ms = self.debounce.window().as_millis() as u64, "session.debounce.arm");
		}
	}

	/// Copies the in-memory text into the store.
	///
	/// Bumps the store change count only when the text differs from the last
	/// flush. Returns true if it did.
	fn flush(&mut self) -> bool {
		debug_assert_eq!(self.store.text(), self.flushed, "store text diverged from the last flush");
		if self.text == self.flushed {
			return false;
		}
		self.store.set_text(self.text.clone());
		self.store.mark_changed();
		self.flushed.clone_from(&self.text);
		self.unsaved = true;

		let change_count = self.store.change_count();
		debug!(location = %self.location, change_count, bytes = self.text.len(), "session.flush");
		self.emit(SessionEvent::Flushed { change_count });
		true
	}

	async fn on_debounce_fired(&mut self) {
		if self.text == self.flushed && !self.unsaved {
			return;
		}
		self.flush();
		if self.unsaved {
			self.autosave().await;
		}
		self.refresh_status().await;
	}

	async fn autosave(&mut self) {
		let change_count = self.store.change_count();
		match self.store.autosave().await {
			Ok(()) => {
				debug!(location = %self.location, change_count, "session.autosave");
				self.unsaved = false;
				self.save_failed = false;
				self.emit(SessionEvent::Saved { change_count });
			}
			Err(source) => {
				warn!(location = %self.location, change_count, error = %source, "session.autosave_failed");
				self.save_failed = true;
				self.emit(SessionEvent::SaveFailed(SessionError::SaveFailed(source)));
			}
		}
	}

	async fn resolve_provider(&mut self) -> Option<Arc<dyn StatusProvider>> {
		match &self.provider {
			ProviderSlot::Resolved(provider) => return Some(Arc::clone(provider)),
			ProviderSlot::Absent => return None,
			ProviderSlot::Unresolved => {}
		}

		let found = match &self.locator {
			Some(locator) => locator.discover(self.location.as_str()).await,
			None => None,
		};
		match found {
			Some(provider) => {
				debug!(location = %self.location, "status.discover");
				self.provider = ProviderSlot::Resolved(Arc::clone(&provider));
				Some(provider)
			}
			None => {
				debug!(location = %self.location, "status.discover.absent");
				self.provider = ProviderSlot::Absent;
				None
			}
		}
	}

	async fn refresh_status(&mut self) -> ChangeSummary {
		let Some(provider) = self.resolve_provider().await else {
			return self.publish(ChangeSummary::NoProvider);
		};

		let poll = provider.fetch_status().await;
		if let Err(err) = &poll {
			let err = SessionError::StatusFetchFailed(err.clone());
			warn!(location = %self.location, error = %err, "status.fetch_failed");
		}
		self.publish(ChangeSummary::from_poll(&poll))
	}

	fn publish(&mut self, summary: ChangeSummary) -> ChangeSummary {
		self.ui.set_status_label(&summary.label(), summary.is_enabled());
		self.summary = Some(summary);
		self.emit(SessionEvent::StatusPublished(summary));
		summary
	}

	async fn request_commit_link(&mut self) -> Result<Option<Url>> {
		let ProviderSlot::Resolved(provider) = &self.provider else {
			return Ok(None);
		};

		let target = match provider.determine_deep_link().await {
			Ok(Some(target)) => target,
			Ok(None) => return Ok(None),
			Err(source) => {
				let err = SessionError::DeepLinkQueryFailed(source);
				warn!(location = %self.location, error = %err, "status.deep_link_failed");
				self.ui.show_error(&err);
				return Err(err);
			}
		};

		let link = self.links.build(&target).map_err(|err| {
			warn!(location = %self.location, scheme = self.links.scheme(), error = %err, "status.deep_link_encoding_failed");
			SessionError::from(err)
		})?;
		self.ui.open_external_url(&link);
		self.emit(SessionEvent::CommitLinkOpened(link.clone()));
		Ok(Some(link))
	}

	/// Flush, then close the store. The store's result does not affect the
	/// transition.
	async fn close(&mut self) {
		self.phase = SessionPhase::Closing;
		self.debounce.cancel();
		self.flush();
		if let Err(err) = self.store.close().await {
			warn!(location = %self.location, error = %err, "session.close_failed");
		}
		self.phase = SessionPhase::Closed;
		self.tally.record_close(self.config.review_prompt_after, &*self.prompter);
		debug!(location = %self.location, "session.close");
		self.emit(SessionEvent::Closed);
	}

	fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			phase: self.phase,
			location: self.location.clone(),
			dirty: self.text != self.flushed,
			unsaved: self.unsaved,
			save_failed: self.save_failed,
			debounce_pending: self.debounce.is_pending(),
			change_count: self.store.change_count(),
			provider: match self.provider {
				ProviderSlot::Unresolved => ProviderState::Unresolved,
				ProviderSlot::Absent => ProviderState::Absent,
				ProviderSlot::Resolved(_) => ProviderState::Available,
			},
			summary: self.summary,
		}
	}

	fn emit(&self, event: SessionEvent) {
		let _ = self.events.send(event);
	}
}
