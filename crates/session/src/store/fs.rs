use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DocumentStore, Location};
use crate::StoreError;

/// Document store backed by a UTF-8 file on disk.
///
/// The location is resolved through symlinks when opened. Saves stage the
/// text in a temporary file next to the target, copy the target's
/// permissions onto it and rename it into place, so a failed save never
/// truncates the previous content.
#[derive(Debug, Default)]
pub struct FsDocumentStore {
	path: Option<PathBuf>,
	text: String,
	change_count: u64,
	saved_count: u64,
}

impl FsDocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolved path of the open document.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	async fn persist(&mut self) -> Result<(), StoreError> {
		let Some(path) = self.path.clone() else {
			return Err(StoreError::NotOpen);
		};
		if self.change_count == self.saved_count {
			return Ok(());
		}

		let location = path.display().to_string();
		let text = self.text.clone();
		let bytes = text.len();
		tokio::task::spawn_blocking(move || replace_contents(&path, text.as_bytes()))
			.await
			.map_err(|err| StoreError::io(&location, io::Error::other(err)))?
			.map_err(|err| StoreError::io(&location, err))?;

		tracing::trace!(path = %location, bytes, change_count = self.change_count, "store.fs.persist");
		self.saved_count = self.change_count;
		Ok(())
	}
}

/// Replaces the file at `path` with `bytes`, keeping its permissions.
///
/// The staging file is removed on every error path when it drops.
fn replace_contents(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
	let mut staging = tempfile::Builder::new().prefix(".textor-save").tempfile_in(dir)?;
	staging.write_all(bytes)?;
	staging.as_file().sync_all()?;

	match std::fs::metadata(path) {
		Ok(meta) => staging.as_file().set_permissions(meta.permissions())?,
		Err(err) if err.kind() == io::ErrorKind::NotFound => {}
		Err(err) => return Err(err),
	}

	staging.persist(path).map_err(|err| err.error)?;
	Ok(())
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
	async fn open(&mut self, location: &Location) -> Result<String, StoreError> {
		let path = tokio::fs::canonicalize(location.as_str())
			.await
			.map_err(|err| StoreError::io(location.as_str(), err))?;
		let bytes = tokio::fs::read(&path).await.map_err(|err| StoreError::io(location.as_str(), err))?;
		let text = String::from_utf8(bytes).map_err(|_| StoreError::NotText(location.to_string()))?;

		self.path = Some(path);
		self.text.clone_from(&text);
		self.change_count = 0;
		self.saved_count = 0;
		Ok(text)
	}

	fn text(&self) -> String {
		self.text.clone()
	}

	fn set_text(&mut self, text: String) {
		self.text = text;
	}

	fn mark_changed(&mut self) {
		self.change_count = self.change_count.wrapping_add(1);
	}

	fn change_count(&self) -> u64 {
		self.change_count
	}

	async fn autosave(&mut self) -> Result<(), StoreError> {
		self.persist().await
	}

	async fn close(&mut self) -> Result<(), StoreError> {
		let result = self.persist().await;
		self.path = None;
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn open_reads_file_content() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("note.txt");
		std::fs::write(&path, "hello\n").unwrap();

		let mut store = FsDocumentStore::new();
		let text = store.open(&Location::from(path.as_path())).await.unwrap();
		assert_eq!(text, "hello\n");
		assert_eq!(store.path(), Some(std::fs::canonicalize(&path).unwrap().as_path()));
	}

	#[tokio::test]
	async fn open_missing_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = FsDocumentStore::new();
		let err = store.open(&Location::from(dir.path().join("nope.txt").as_path())).await.unwrap_err();
		assert!(matches!(err, StoreError::Io { .. }));
	}

	#[tokio::test]
	async fn open_binary_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("blob.bin");
		std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
		let mut store = FsDocumentStore::new();
		assert!(matches!(store.open(&Location::from(path.as_path())).await, Err(StoreError::NotText(_))));
	}

	#[tokio::test]
	async fn autosave_writes_only_after_change() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("note.txt");
		std::fs::write(&path, "one").unwrap();

		let mut store = FsDocumentStore::new();
		store.open(&Location::from(path.as_path())).await.unwrap();

		store.set_text("two".to_string());
		store.autosave().await.unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "one", "unchanged count must not write");

		store.mark_changed();
		store.autosave().await.unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
	}

	#[tokio::test]
	async fn close_persists_and_releases() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("note.txt");
		std::fs::write(&path, "one").unwrap();

		let mut store = FsDocumentStore::new();
		store.open(&Location::from(path.as_path())).await.unwrap();
		store.set_text("closing".to_string());
		store.mark_changed();
		store.close().await.unwrap();

		assert_eq!(std::fs::read_to_string(&path).unwrap(), "closing");
		assert!(store.path().is_none());
		assert!(matches!(store.autosave().await, Err(StoreError::NotOpen)));
	}

	#[tokio::test]
	async fn failed_save_leaves_no_staging_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("note.txt");
		std::fs::write(&path, "one").unwrap();

		let mut store = FsDocumentStore::new();
		store.open(&Location::from(path.as_path())).await.unwrap();
		std::fs::remove_file(&path).unwrap();
		std::fs::create_dir(&path).unwrap();
		store.set_text("two".to_string());
		store.mark_changed();

		assert!(matches!(store.autosave().await, Err(StoreError::Io { .. })));
		let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|entry| entry.unwrap().file_name()).collect();
		assert_eq!(names, vec![std::ffi::OsString::from("note.txt")]);
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn save_through_symlink_updates_target_and_keeps_mode() {
		use std::os::unix::fs::{PermissionsExt, symlink};

		let dir = tempfile::tempdir().unwrap();
		let target = dir.path().join("script.sh");
		let link = dir.path().join("link.sh");
		std::fs::write(&target, "#!/bin/sh\n").unwrap();
		std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();
		symlink(&target, &link).unwrap();

		let mut store = FsDocumentStore::new();
		store.open(&Location::from(link.as_path())).await.unwrap();
		store.set_text("#!/bin/sh\necho hi\n".to_string());
		store.mark_changed();
		store.autosave().await.unwrap();

		assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
		assert_eq!(std::fs::read_to_string(&target).unwrap(), "#!/bin/sh\necho hi\n");
		assert_eq!(std::fs::metadata(&target).unwrap().permissions().mode() & 0o777, 0o755);
	}
}
