use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Single-slot debounce timer.
///
/// Arming replaces any pending fire, so a burst of triggers closer together
/// than the window produces exactly one fire, one window after the last
/// trigger.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
	window: Duration,
	deadline: Option<Instant>,
}

impl DebounceTimer {
	pub fn new(window: Duration) -> Self {
		Self { window, deadline: None }
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// Arms the timer one window from now. Returns true if a pending fire was
	/// replaced.
	pub fn arm(&mut self) -> bool {
		self.deadline.replace(Instant::now() + self.window).is_some()
	}

	/// Drops the pending fire. Returns true if one was pending.
	pub fn cancel(&mut self) -> bool {
		self.deadline.take().is_some()
	}

	pub fn is_pending(&self) -> bool {
		self.deadline.is_some()
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Resolves when the pending fire is due, clearing the slot.
	///
	/// Never resolves while disarmed. Cancel-safe: dropping the future before
	/// it resolves leaves the pending fire in place.
	pub async fn fired(&mut self) {
		let Some(deadline) = self.deadline else {
			return std::future::pending().await;
		};
		sleep_until(deadline).await;
		self.deadline = None;
	}
}
