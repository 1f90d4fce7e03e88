/// Line counts reported by one status poll.
///
/// `added` doubles as a binary marker: [`LineDelta::BINARY`] means the file
/// is not text and `deleted` carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineDelta {
	pub added: u64,
	pub deleted: u64,
}

impl LineDelta {
	/// Sentinel stored in `added` for binary files. Never a real line count.
	pub const BINARY: u64 = u64::MAX;

	pub const fn new(added: u64, deleted: u64) -> Self {
		Self { added, deleted }
	}

	/// Delta for a modified binary file.
	pub const fn binary() -> Self {
		Self {
			added: Self::BINARY,
			deleted: 0,
		}
	}

	pub const fn is_binary(&self) -> bool {
		self.added == Self::BINARY
	}

	/// Returns true when neither side reports a change.
	pub const fn is_unmodified(&self) -> bool {
		self.added == 0 && self.deleted == 0
	}
}
