//! Fixture file discovery.
//!
//! [`FixtureSource`] is the seam between the importer and the file system:
//! listing a directory and reading a file are the only I/O the parse phase
//! performs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::FixtureFormat;
use crate::error::{FixtureError, FixtureResult};

/// Where fixture files come from.
#[async_trait]
pub trait FixtureSource: Send + Sync {
	/// Lists the entries of `dir` that are not directories.
	async fn list(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>>;

	/// Reads a whole file.
	async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// [`FixtureSource`] backed by the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFixtureSource;

#[async_trait]
impl FixtureSource for FsFixtureSource {
	async fn list(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
		let mut entries = tokio::fs::read_dir(dir).await?;
		let mut files = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			if entry.file_type().await?.is_dir() {
				continue;
			}
			files.push(entry.path());
		}
		Ok(files)
	}

	async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
		tokio::fs::read(path).await
	}
}

/// A discovered fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixtureFile {
	/// Path of the file.
	pub path: PathBuf,
	/// Target table, the file name without its extension.
	pub table: String,
	/// Format, from the extension.
	pub format: FixtureFormat,
}

impl FixtureFile {
	/// Recognizes a fixture file by its extension.
	///
	/// Returns `None` for unrecognized extensions and for names that are
	/// nothing but an extension.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed_fixtures::fixtures::{FixtureFile, FixtureFormat};
	/// let file = FixtureFile::from_path("fixtures/users.yml").unwrap();
	/// assert_eq!(file.table, "users");
	/// assert_eq!(file.format, FixtureFormat::Yaml);
	/// assert!(FixtureFile::from_path("fixtures/README.md").is_none());
	/// ```
	pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
		let path = path.into();
		let format = FixtureFormat::from_path(&path)?;
		let table = path.file_stem()?.to_str()?.to_string();
		if table.is_empty() || table.starts_with('.') {
			return None;
		}
		Some(Self {
			path,
			table,
			format,
		})
	}

	/// File name for logs and errors.
	pub fn file_name(&self) -> String {
		self.path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| self.path.display().to_string())
	}
}

/// Lists the fixture files of `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`FixtureError::DirectoryUnreadable`] if the directory cannot be
/// listed and [`FixtureError::DuplicateTable`] if two files resolve to the
/// same table (`users.yml` next to `users.json`).
pub async fn discover(source: &dyn FixtureSource, dir: &Path) -> FixtureResult<Vec<FixtureFile>> {
	let entries = source
		.list(dir)
		.await
		.map_err(|source| FixtureError::DirectoryUnreadable {
			path: dir.display().to_string(),
			source,
		})?;

	let mut files: Vec<FixtureFile> = entries
		.into_iter()
		.filter_map(|path| FixtureFile::from_path(path))
		.collect();
	files.sort_by(|a, b| a.path.cmp(&b.path));

	let mut seen: HashMap<&str, &FixtureFile> = HashMap::with_capacity(files.len());
	for file in &files {
		if let Some(previous) = seen.insert(file.table.as_str(), file) {
			return Err(FixtureError::DuplicateTable {
				table: file.table.clone(),
				first: previous.file_name(),
				second: file.file_name(),
			});
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use tempfile::TempDir;

	#[rstest]
	#[case("users.yml", Some("users"))]
	#[case("order_items.yaml", Some("order_items"))]
	#[case("posts.json", Some("posts"))]
	#[case("schema.sql", None)]
	#[case(".yml", None)]
	#[case("noext", None)]
	fn test_fixture_file_from_path(#[case] name: &str, #[case] table: Option<&str>) {
		let file = FixtureFile::from_path(Path::new("/fixtures").join(name));
		assert_eq!(file.as_ref().map(|f| f.table.as_str()), table);
	}

	#[rstest]
	#[tokio::test]
	async fn test_discover_filters_and_skips_directories() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("users.yml"), "- id: 1\n").unwrap();
		std::fs::write(dir.path().join("posts.json"), "[]").unwrap();
		std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
		std::fs::create_dir(dir.path().join("nested.yml")).unwrap();

		let files = discover(&FsFixtureSource, dir.path()).await.unwrap();

		let tables: Vec<&str> = files.iter().map(|f| f.table.as_str()).collect();
		assert_eq!(tables, vec!["posts", "users"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_discover_empty_directory() {
		let dir = TempDir::new().unwrap();
		let files = discover(&FsFixtureSource, dir.path()).await.unwrap();
		assert!(files.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_discover_missing_directory() {
		let result = discover(&FsFixtureSource, Path::new("/nonexistent/seedbed/fixtures")).await;
		assert!(matches!(
			result,
			Err(FixtureError::DirectoryUnreadable { .. })
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_discover_rejects_duplicate_tables() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("users.json"), "[]").unwrap();
		std::fs::write(dir.path().join("users.yml"), "").unwrap();

		let result = discover(&FsFixtureSource, dir.path()).await;

		match result {
			Err(FixtureError::DuplicateTable {
				table,
				first,
				second,
			}) => {
				assert_eq!(table, "users");
				assert_eq!(first, "users.json");
				assert_eq!(second, "users.yml");
			}
			other => panic!("Expected DuplicateTable, got {:?}", other),
		}
	}
}
