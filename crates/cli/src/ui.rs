use parking_lot::Mutex;
use textor_session::{SessionError, SessionUi};
use url::Url;

/// Terminal stand-in for the editor chrome.
///
/// Keeps the most recent status label and prints links and errors.
#[derive(Debug, Default)]
pub struct TerminalUi {
	label: Mutex<Option<(String, bool)>>,
}

impl TerminalUi {
	/// Last label published, with its enabled flag.
	pub fn label(&self) -> Option<(String, bool)> {
		self.label.lock().clone()
	}
}

impl SessionUi for TerminalUi {
	fn set_status_label(&self, label: &str, enabled: bool) {
		tracing::debug!(label, enabled, "ui.status_label");
		*self.label.lock() = Some((label.to_string(), enabled));
	}

	fn open_external_url(&self, url: &Url) {
		println!("{url}");
	}

	fn show_error(&self, error: &SessionError) {
		eprintln!("textor: {error}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_last_label() {
		let ui = TerminalUi::default();
		assert_eq!(ui.label(), None);
		ui.set_status_label("+2", true);
		ui.set_status_label("", false);
		assert_eq!(ui.label(), Some((String::new(), false)));
	}
}
