//! Git-backed status provider.
//!
//! Discovery asks git for the work tree containing the file. Polls run
//! `git diff --numstat HEAD` for that one path; the deep link is the
//! `origin` remote when it is an absolute URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use textor_status::{LineDelta, StatusError, StatusLocator, StatusProvider};
use tokio::process::Command;
use tracing::debug;
use url::Url;

/// Finds the git work tree of a document.
#[derive(Debug, Default)]
pub struct GitLocator;

#[async_trait]
impl StatusLocator for GitLocator {
	async fn discover(&self, location: &str) -> Option<Arc<dyn StatusProvider>> {
		let file = std::path::absolute(location).ok()?;
		let dir = file.parent()?;
		let output = git(dir, &["rev-parse", "--show-toplevel"]).await.ok()?;
		if !output.status.success() {
			debug!(location, "status.git.not_a_work_tree");
			return None;
		}
		let top = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
		debug!(location, work_tree = %top.display(), "status.git.discover");
		Some(Arc::new(GitStatusProvider { top, file }))
	}
}

/// Status of one file inside a git work tree.
#[derive(Debug)]
pub struct GitStatusProvider {
	top: PathBuf,
	file: PathBuf,
}

#[async_trait]
impl StatusProvider for GitStatusProvider {
	async fn fetch_status(&self) -> Result<LineDelta, StatusError> {
		let file = self.file.to_string_lossy();
		let output = git(&self.top, &["diff", "--numstat", "HEAD", "--", &file]).await?;
		if !output.status.success() {
			return Err(StatusError::Fetch(String::from_utf8_lossy(&output.stderr).trim().to_string()));
		}
		parse_numstat(&String::from_utf8_lossy(&output.stdout))
	}

	async fn determine_deep_link(&self) -> Result<Option<Url>, StatusError> {
		let output = git(&self.top, &["remote", "get-url", "origin"]).await?;
		if !output.status.success() {
			return Ok(None);
		}
		let remote = String::from_utf8_lossy(&output.stdout).trim().to_string();
		match Url::parse(&remote) {
			Ok(url) => Ok(Some(url)),
			Err(err) => {
				debug!(remote, error = %err, "status.git.remote_not_a_url");
				Ok(None)
			}
		}
	}
}

async fn git(dir: &Path, args: &[&str]) -> Result<std::process::Output, StatusError> {
	Command::new("git")
		.arg("-C")
		.arg(dir)
		.args(args)
		.kill_on_drop(true)
		.output()
		.await
		.map_err(|err| StatusError::Unavailable(format!("git: {err}")))
}

/// Parses `git diff --numstat` output for a single path.
///
/// Binary files report `-` for both counts. No output means unmodified.
pub fn parse_numstat(output: &str) -> Result<LineDelta, StatusError> {
	let Some(line) = output.lines().find(|line| !line.trim().is_empty()) else {
		return Ok(LineDelta::default());
	};

	let mut fields = line.split('\t');
	let (Some(added), Some(deleted)) = (fields.next(), fields.next()) else {
		return Err(StatusError::Fetch(format!("unexpected numstat line: {line:?}")));
	};
	if added == "-" && deleted == "-" {
		return Ok(LineDelta::binary());
	}

	let count = |field: &str| {
		field
			.parse::<u64>()
			.map_err(|_| StatusError::Fetch(format!("unexpected numstat count {field:?}")))
	};
	Ok(LineDelta::new(count(added)?, count(deleted)?))
}
