use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Side effect raised once enough sessions have closed.
pub trait ReviewPrompter: Send + Sync + 'static {
	fn request_review(&self);
}

/// Never prompts.
impl ReviewPrompter for () {
	fn request_review(&self) {}
}

/// Process-wide tally of closed sessions driving a one-time review prompt.
///
/// Sessions share [`ReviewTally::global`] unless a builder injects its own
/// tally.
#[derive(Debug, Default)]
pub struct ReviewTally {
	closes: AtomicU32,
	asked: AtomicBool,
}

impl ReviewTally {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn global() -> Arc<Self> {
		static GLOBAL: OnceLock<Arc<ReviewTally>> = OnceLock::new();
		Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
	}

	/// Clears the close count and re-enables the prompt.
	pub fn reset(&self) {
		self.closes.store(0, Ordering::Release);
		self.asked.store(false, Ordering::Release);
	}

	pub fn closes(&self) -> u32 {
		self.closes.load(Ordering::Acquire)
	}

	pub fn has_prompted(&self) -> bool {
		self.asked.load(Ordering::Acquire)
	}

	/// Counts one session close and prompts when `threshold` is reached.
	///
	/// Returns true if this call raised the prompt. A zero threshold never
	/// prompts.
	pub fn record_close(&self, threshold: u32, prompter: &dyn ReviewPrompter) -> bool {
		let closes = self.closes.fetch_add(1, Ordering::AcqRel).saturating_add(1);
		if threshold == 0 || closes < threshold {
			return false;
		}
		if self.asked.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			return false;
		}
		tracing::debug!(closes, threshold, "session.review.prompt");
		prompter.request_review();
		true
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	#[derive(Default)]
	struct CountingPrompter(AtomicUsize);

	impl ReviewPrompter for CountingPrompter {
		fn request_review(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[test]
	fn prompts_once_at_threshold() {
		let tally = ReviewTally::new();
		let prompter = CountingPrompter::default();
		let raised: Vec<bool> = (0..6).map(|_| tally.record_close(4, &prompter)).collect();
		assert_eq!(raised, [false, false, false, true, false, false]);
		assert_eq!(prompter.0.load(Ordering::SeqCst), 1);
		assert_eq!(tally.closes(), 6);
		assert!(tally.has_prompted());
	}

	#[test]
	fn reset_rearms_prompt() {
		let tally = ReviewTally::new();
		let prompter = CountingPrompter::default();
		assert!(tally.record_close(1, &prompter));
		tally.reset();
		assert_eq!(tally.closes(), 0);
		assert!(!tally.has_prompted());
		assert!(tally.record_close(1, &prompter));
		assert_eq!(prompter.0.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn zero_threshold_never_prompts() {
		let tally = ReviewTally::new();
		for _ in 0..10 {
			assert!(!tally.record_close(0, &()));
		}
		assert!(!tally.has_prompted());
	}

	#[test]
	fn global_is_shared() {
		assert!(Arc::ptr_eq(&ReviewTally::global(), &ReviewTally::global()));
	}
}
