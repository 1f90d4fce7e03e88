//! CLI schema for the textor binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "textor")]
#[command(about = "Edit text files with debounced autosave and git change summaries")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Session configuration file (defaults to the user config dir)
	#[arg(short, long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Print the change summary for a file
	Status {
		file: PathBuf,
	},
	/// Print the commit deep link for a file
	Link {
		file: PathBuf,
	},
	/// Append a line to a file through an editing session
	Append {
		file: PathBuf,
		/// Line to append (a trailing newline is added)
		text: String,
	},
	/// Print the effective session configuration
	Config,
}

impl Cli {
	/// Returns the configuration path to load.
	pub fn config_path(&self) -> Option<PathBuf> {
		self.config.clone().or_else(|| dirs::config_dir().map(|dir| dir.join("textor").join("session.toml")))
	}
}
