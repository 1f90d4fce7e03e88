//! Commit deep links into the status provider.
//!
//! The provider hands back a plain remote URL; the editor wraps it in an
//! x-callback-url so the provider can return control when the commit view
//! is dismissed:
//!
//! ```text
//! <scheme>://x-callback-url/commit?url=<escaped>&x-cancel=<cancel>&x-success=<success>
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::DeepLinkError;

/// Characters escaped when embedding a URL as a query value.
///
/// Everything outside the RFC 3986 unreserved set is escaped, `&` included,
/// so the embedded URL can never start another outer query parameter.
pub const COMMIT_URL_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Default provider scheme receiving commit links.
pub const DEFAULT_PROVIDER_SCHEME: &str = "working-copy";

/// Default callback URL for both cancel and success.
pub const DEFAULT_CALLBACK_URL: &str = "textor://";

/// Builds commit callback links for one provider scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLinkBuilder {
	scheme: String,
	cancel_url: String,
	success_url: String,
}

impl Default for CommitLinkBuilder {
	fn default() -> Self {
		Self::new(DEFAULT_PROVIDER_SCHEME, DEFAULT_CALLBACK_URL, DEFAULT_CALLBACK_URL)
	}
}

impl CommitLinkBuilder {
	pub fn new(scheme: impl Into<String>, cancel_url: impl Into<String>, success_url: impl Into<String>) -> Self {
		Self {
			scheme: scheme.into(),
			cancel_url: cancel_url.into(),
			success_url: success_url.into(),
		}
	}

	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	/// Percent-encodes `target` for use as the `url` query value.
	pub fn escape(target: &Url) -> String {
		utf8_percent_encode(target.as_str(), COMMIT_URL_VALUE).to_string()
	}

	/// Wraps `target` in a commit callback link.
	///
	/// Fails when the composed link is not a URL with the configured scheme.
	pub fn build(&self, target: &Url) -> Result<Url, DeepLinkError> {
		let escaped = Self::escape(target);
		let raw = format!(
			"{}://x-callback-url/commit?url={escaped}&x-cancel={}&x-success={}",
			self.scheme, self.cancel_url, self.success_url
		);

		let link = Url::parse(&raw).map_err(|err| DeepLinkError::Encoding {
			target: target.to_string(),
			reason: err.to_string(),
		})?;

		if !link.scheme().eq_ignore_ascii_case(&self.scheme) || link.fragment().is_some() {
			tracing::debug!(scheme = %self.scheme, link = %link, "status.link.rejected");
			return Err(DeepLinkError::Encoding {
				target: target.to_string(),
				reason: format!("composed link does not round-trip: {link}"),
			});
		}

		Ok(link)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn escapes_reserved_characters_and_ampersand() {
		let target = Url::parse("https://example.com/a?b=1&c=2").unwrap();
		assert_eq!(CommitLinkBuilder::escape(&target), "https%3A%2F%2Fexample.com%2Fa%3Fb%3D1%26c%3D2");
	}

	#[test]
	fn builds_callback_link() {
		let target = Url::parse("https://example.com/a?b=1&c=2").unwrap();
		let link = CommitLinkBuilder::default().build(&target).unwrap();
		assert_eq!(
			link.as_str(),
			"working-copy://x-callback-url/commit?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1%26c%3D2&x-cancel=textor://&x-success=textor://"
		);
	}

	#[test]
	fn embedded_url_adds_no_outer_parameters() {
		let target = Url::parse("https://host/x?url=evil&x-success=evil://").unwrap();
		let link = CommitLinkBuilder::default().build(&target).unwrap();
		let keys: Vec<String> = link.query_pairs().map(|(k, _)| k.into_owned()).collect();
		assert_eq!(keys, ["url", "x-cancel", "x-success"]);

		let (_, embedded) = link.query_pairs().next().unwrap();
		assert_eq!(embedded, target.as_str());
	}

	#[test]
	fn unreserved_characters_pass_through() {
		let target = Url::parse("https://a-b.example/c_d~e").unwrap();
		assert_eq!(CommitLinkBuilder::escape(&target), "https%3A%2F%2Fa-b.example%2Fc_d~e");
	}

	#[test]
	fn custom_scheme_and_callbacks() {
		let builder = CommitLinkBuilder::new("git-app", "editor://cancel", "editor://done");
		let target = Url::parse("ssh://git@host/repo.git").unwrap();
		let link = builder.build(&target).unwrap();
		assert_eq!(
			link.as_str(),
			"git-app://x-callback-url/commit?url=ssh%3A%2F%2Fgit%40host%2Frepo.git&x-cancel=editor://cancel&x-success=editor://done"
		);
	}

	#[test]
	fn invalid_scheme_fails_without_link() {
		let builder = CommitLinkBuilder::new("not a scheme", DEFAULT_CALLBACK_URL, DEFAULT_CALLBACK_URL);
		let target = Url::parse("https://example.com/").unwrap();
		assert!(matches!(builder.build(&target), Err(DeepLinkError::Encoding { .. })));
	}

	#[test]
	fn fragment_in_callback_is_rejected() {
		let builder = CommitLinkBuilder::new(DEFAULT_PROVIDER_SCHEME, "textor://#cancel", DEFAULT_CALLBACK_URL);
		let target = Url::parse("https://example.com/").unwrap();
		assert!(builder.build(&target).is_err());
	}
}
