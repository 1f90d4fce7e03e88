use std::fmt;

use crate::{LineDelta, StatusError};

/// Compact change summary published to the status control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSummary {
	/// No status provider covers the document.
	NoProvider,
	/// The last poll failed.
	Error,
	/// The file is current.
	Unmodified,
	/// A non-text file was modified.
	Binary,
	LinesDeleted(u64),
	LinesAdded(u64),
	LinesModified { added: u64, deleted: u64 },
}

impl ChangeSummary {
	/// Classifies one poll outcome.
	///
	/// An error wins over any counts; the binary sentinel wins over
	/// `deleted`.
	pub fn from_poll(poll: &Result<LineDelta, StatusError>) -> Self {
		match poll {
			Ok(delta) => Self::from_delta(*delta),
			Err(_) => Self::Error,
		}
	}

	pub const fn from_delta(delta: LineDelta) -> Self {
		match (delta.added, delta.deleted) {
			(LineDelta::BINARY, _) => Self::Binary,
			(0, 0) => Self::Unmodified,
			(0, deleted) => Self::LinesDeleted(deleted),
			(added, 0) => Self::LinesAdded(added),
			(added, deleted) => Self::LinesModified { added, deleted },
		}
	}

	/// Label text for the status control. Empty means "nothing to show".
	pub fn label(&self) -> String {
		self.to_string()
	}

	/// Whether the status control should accept taps.
	pub const fn is_enabled(&self) -> bool {
		!matches!(self, Self::NoProvider | Self::Error | Self::Unmodified)
	}
}

impl fmt::Display for ChangeSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoProvider | Self::Error | Self::Unmodified => Ok(()),
			Self::Binary => f.write_str("binary"),
			Self::LinesDeleted(deleted) => write!(f, "-{deleted}"),
			Self::LinesAdded(added) => write!(f, "+{added}"),
			// Deletions render before additions.
			Self::LinesModified { added, deleted } => write!(f, "-{deleted}+{added}"),
		}
	}
}
