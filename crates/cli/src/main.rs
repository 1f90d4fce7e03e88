//! textor command-line entry point.

mod cli;
mod git;
mod ui;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use textor_session::{FsDocumentStore, SessionBuilder, SessionConfig, SessionEvent, SessionHandle};
use textor_status::ChangeSummary;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::git::GitLocator;
use crate::ui::TerminalUi;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let level = if cli.verbose { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
		.with_writer(std::io::stderr)
		.init();

	let config = match cli.config_path() {
		Some(path) => SessionConfig::load_or_default(&path).with_context(|| format!("loading {}", path.display()))?,
		None => SessionConfig::default(),
	};

	match cli.command {
		Command::Config => {
			print!("{}", config.to_toml()?);
		}
		Command::Status { file } => {
			let (handle, _ui) = open(&file, config).await?;
			let summary = handle.refresh_status().await?;
			handle.close().await?;
			print_summary(summary);
		}
		Command::Link { file } => {
			let (handle, _ui) = open(&file, config).await?;
			let link = handle.request_commit_link().await;
			handle.close().await?;
			if link?.is_none() {
				anyhow::bail!("no commit target for {}", file.display());
			}
		}
		Command::Append { file, text } => {
			let content = tokio::fs::read_to_string(&file)
				.await
				.with_context(|| format!("reading {}", file.display()))?;
			let (handle, ui) = open(&file, config).await?;
			let mut edited = content;
			if !edited.is_empty() && !edited.ends_with('\n') {
				edited.push('\n');
			}
			edited.push_str(&text);
			edited.push('\n');

			let mut events = handle.subscribe();
			handle.text_changed(edited)?;
			handle.editing_ended().await?;

			// The pending autosave refreshes status once it lands on disk.
			let snapshot = handle.snapshot().await?;
			let mut summary = snapshot.summary.unwrap_or(ChangeSummary::NoProvider);
			if snapshot.debounce_pending {
				loop {
					match events.recv().await {
						Ok(SessionEvent::StatusPublished(published)) => {
							summary = published;
							break;
						}
						Ok(_) | Err(RecvError::Lagged(_)) => {}
						Err(RecvError::Closed) => break,
					}
				}
			}
			handle.close().await?;
			tracing::debug!(label = ?ui.label(), "append.done");
			print_summary(summary);
		}
	}

	Ok(())
}

async fn open(file: &Path, config: SessionConfig) -> Result<(SessionHandle, Arc<TerminalUi>)> {
	let ui = Arc::new(TerminalUi::default());
	let handle = SessionBuilder::new(FsDocumentStore::new())
		.ui(ui.clone())
		.locator(Arc::new(GitLocator))
		.config(config)
		.open(file)
		.await?;
	Ok((handle, ui))
}

fn print_summary(summary: ChangeSummary) {
	match summary {
		ChangeSummary::NoProvider => println!("not tracked"),
		ChangeSummary::Error => println!("status unavailable"),
		ChangeSummary::Unmodified => println!("unmodified"),
		other => println!("{other}"),
	}
}
