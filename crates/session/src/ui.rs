use url::Url;

use crate::SessionError;

/// Publish surface for session output.
///
/// Calls arrive on the session task; implementations hand them to the UI
/// thread and return promptly.
pub trait SessionUi: Send + Sync + 'static {
	/// Updates the change-summary control.
	fn set_status_label(&self, text: &str, enabled: bool);

	/// Asks the OS to open `url` in whichever application owns its scheme.
	fn open_external_url(&self, url: &Url);

	fn show_error(&self, error: &SessionError);
}

/// Discards all output.
impl SessionUi for () {
	fn set_status_label(&self, _text: &str, _enabled: bool) {}

	fn open_external_url(&self, _url: &Url) {}

	fn show_error(&self, _error: &SessionError) {}
}
