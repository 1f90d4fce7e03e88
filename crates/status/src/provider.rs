use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{LineDelta, StatusError};

/// An external version-control status capability for one document.
#[async_trait]
pub trait StatusProvider: Send + Sync + 'static {
	/// Polls line counts for the document against the provider's base.
	async fn fetch_status(&self) -> Result<LineDelta, StatusError>;

	/// Queries the remote URL the commit view should open.
	///
	/// `Ok(None)` means there is nothing to link to.
	async fn determine_deep_link(&self) -> Result<Option<Url>, StatusError>;
}

/// Resolves the status provider backing a document location.
///
/// Returning `None` is the normal outcome for documents outside a
/// provider-backed location, or when the provider is missing or outdated.
#[async_trait]
pub trait StatusLocator: Send + Sync + 'static {
	async fn discover(&self, location: &str) -> Option<Arc<dyn StatusProvider>>;
}

