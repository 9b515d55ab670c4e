//! Temporary fixture directories.

use std::path::{Path, PathBuf};

use rstest::fixture;
use tempfile::TempDir;

/// A temporary directory holding fixture files and a schema script.
///
/// Removed when dropped.
///
/// # Example
///
/// ```
/// use seedbed_test::FixtureDir;
///
/// let dir = FixtureDir::new();
/// dir.write_yaml("users", "- id: 1\n  name: admin\n");
/// assert!(dir.path().join("users.yml").exists());
/// ```
#[derive(Debug)]
pub struct FixtureDir {
	dir: TempDir,
}

impl FixtureDir {
	/// Creates an empty directory.
	pub fn new() -> Self {
		Self {
			dir: TempDir::new().expect("Failed to create temporary fixture directory"),
		}
	}

	/// Directory path.
	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	/// Writes `content` to `name` inside the directory and returns its path.
	pub fn write(&self, name: &str, content: &str) -> PathBuf {
		let path = self.dir.path().join(name);
		std::fs::write(&path, content)
			.unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
		path
	}

	/// Writes `<table>.yml`.
	pub fn write_yaml(&self, table: &str, content: &str) -> PathBuf {
		self.write(&format!("{}.yml", table), content)
	}

	/// Writes `<table>.json` from a JSON value.
	pub fn write_json(&self, table: &str, records: &serde_json::Value) -> PathBuf {
		let content = serde_json::to_string_pretty(records).expect("Failed to serialize fixture");
		self.write(&format!("{}.json", table), &content)
	}

	/// Writes `schema.sql` and returns its path.
	pub fn write_schema(&self, sql: &str) -> PathBuf {
		self.write("schema.sql", sql)
	}

	/// Removes a file from the directory.
	pub fn remove(&self, name: &str) {
		let path = self.dir.path().join(name);
		std::fs::remove_file(&path)
			.unwrap_or_else(|e| panic!("Failed to remove {}: {}", path.display(), e));
	}
}

impl Default for FixtureDir {
	fn default() -> Self {
		Self::new()
	}
}

/// Fixture providing an empty [`FixtureDir`].
#[fixture]
pub fn fixture_dir() -> FixtureDir {
	FixtureDir::new()
}
