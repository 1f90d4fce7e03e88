//! Session configuration.
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! debounce_ms = 1000
//! autosave_without_provider = false
//! review_prompt_after = 4
//!
//! [commit_link]
//! scheme = "working-copy"
//! cancel_url = "textor://"
//! success_url = "textor://"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use textor_status::{CommitLinkBuilder, DEFAULT_CALLBACK_URL, DEFAULT_PROVIDER_SCHEME};
use url::Url;

use crate::ConfigError;

/// Default quiet period before a debounced autosave fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Default number of session closes before asking for a review.
pub const DEFAULT_REVIEW_PROMPT_AFTER: u32 = 4;

/// Tunables for one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
	/// Debounce window in milliseconds.
	pub debounce_ms: u64,
	/// Arm the debounce timer even when no status provider was found.
	pub autosave_without_provider: bool,
	/// Session closes before the review prompt is requested. Zero disables it.
	pub review_prompt_after: u32,
	pub commit_link: CommitLinkConfig,
}

/// Callback link settings for the commit action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommitLinkConfig {
	/// Scheme of the provider application receiving the link.
	pub scheme: String,
	pub cancel_url: String,
	pub success_url: String,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
			autosave_without_provider: false,
			review_prompt_after: DEFAULT_REVIEW_PROMPT_AFTER,
			commit_link: CommitLinkConfig::default(),
		}
	}
}

impl Default for CommitLinkConfig {
	fn default() -> Self {
		Self {
			scheme: DEFAULT_PROVIDER_SCHEME.to_string(),
			cancel_url: DEFAULT_CALLBACK_URL.to_string(),
			success_url: DEFAULT_CALLBACK_URL.to_string(),
		}
	}
}

impl SessionConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&input)
	}

	/// Like [`Self::load`], but a missing file yields the defaults.
	pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
		match Self::load(path) {
			Err(ConfigError::Io { error, .. }) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
			other => other,
		}
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.debounce_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "debounce_ms",
				reason: "must be greater than zero".to_string(),
			});
		}
		self.commit_link.validate()
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Serializes the effective configuration back to TOML.
	pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
		toml::to_string_pretty(self)
	}
}

impl CommitLinkConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		let scheme_ok = self.scheme.starts_with(|c: char| c.is_ascii_alphabetic())
			&& self.scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
		if !scheme_ok {
			return Err(ConfigError::Invalid {
				field: "commit_link.scheme",
				reason: format!("{:?} is not a URL scheme", self.scheme),
			});
		}

		for (field, value) in [("commit_link.cancel_url", &self.cancel_url), ("commit_link.success_url", &self.success_url)] {
			let url = Url::parse(value).map_err(|err| ConfigError::Invalid {
				field,
				reason: format!("{value:?}: {err}"),
			})?;
			if url.fragment().is_some() || value.contains('&') {
				return Err(ConfigError::Invalid {
					field,
					reason: format!("{value:?} would break the callback query"),
				});
			}
		}
		Ok(())
	}

	pub fn builder(&self) -> CommitLinkBuilder {
		CommitLinkBuilder::new(&self.scheme, &self.cancel_url, &self.success_url)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = SessionConfig::from_toml("").unwrap();
		assert_eq!(config, SessionConfig::default());
		assert_eq!(config.debounce(), DEFAULT_DEBOUNCE);
		assert_eq!(config.commit_link.scheme, "working-copy");
	}

	#[test]
	fn partial_document_overrides_keys() {
		let config = SessionConfig::from_toml(
			r#"
debounce_ms = 250
[commit_link]
scheme = "git-app"
"#,
		)
		.unwrap();
		assert_eq!(config.debounce(), Duration::from_millis(250));
		assert_eq!(config.commit_link.scheme, "git-app");
		assert_eq!(config.commit_link.cancel_url, "textor://");
		assert_eq!(config.review_prompt_after, DEFAULT_REVIEW_PROMPT_AFTER);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(SessionConfig::from_toml("debounce = 3"), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn zero_debounce_is_rejected() {
		let err = SessionConfig::from_toml("debounce_ms = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { field: "debounce_ms", .. }));
	}

	#[test]
	fn bad_scheme_is_rejected() {
		let err = SessionConfig::from_toml("[commit_link]\nscheme = \"two words\"").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { field: "commit_link.scheme", .. }));
	}

	#[test]
	fn callback_with_ampersand_is_rejected() {
		let err = SessionConfig::from_toml("[commit_link]\nsuccess_url = \"textor://x?a=1&b=2\"").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { field: "commit_link.success_url", .. }));
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let config = SessionConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
		assert_eq!(config, SessionConfig::default());
	}

	#[test]
	fn loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "review_prompt_after = 0").unwrap();
		let config = SessionConfig::load(file.path()).unwrap();
		assert_eq!(config.review_prompt_after, 0);
	}

	#[test]
	fn effective_config_round_trips_through_toml() {
		let config = SessionConfig::default();
		let rendered = config.to_toml().unwrap();
		assert_eq!(SessionConfig::from_toml(&rendered).unwrap(), config);
	}
}
