//! Parsed-fixture cache.
//!
//! Once a directory has been parsed in full, its batches are kept for the
//! lifetime of the cache and every later import of the same directory path
//! reuses them without touching the file system. Entries are never evicted
//! and never invalidated when a file changes on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::TableBatch;

static SHARED_CACHE: Lazy<Arc<ImportCache>> = Lazy::new(|| Arc::new(ImportCache::new()));

#[derive(Debug, Default)]
struct CacheState {
	/// Directories parsed in full, with their tables in load order.
	directories: HashMap<PathBuf, Vec<String>>,
	/// Batches published so far, per directory.
	batches: HashMap<PathBuf, HashMap<String, Arc<TableBatch>>>,
	/// Every table of every completed directory, first-seen order.
	loaded_tables: IndexSet<String>,
}

/// Cache of parsed table batches keyed by source directory.
///
/// All reads and writes go through one lock; each critical section is a
/// handful of map operations.
#[derive(Debug, Default)]
pub struct ImportCache {
	state: Mutex<CacheState>,
}

impl ImportCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Process-wide cache, for callers that want one parse per directory per
	/// process regardless of how many fixturers they build.
	pub fn shared() -> Arc<Self> {
		Arc::clone(&SHARED_CACHE)
	}

	/// Returns the batches of `dir` if it was parsed in full before.
	pub fn try_reuse(&self, dir: &Path) -> Option<Vec<Arc<TableBatch>>> {
		let state = self.state.lock();
		let tables = state.directories.get(dir)?;
		let batches = state.batches.get(dir);
		Some(
			tables
				.iter()
				.filter_map(|table| batches.and_then(|b| b.get(table)).cloned())
				.collect(),
		)
	}

	/// Publishes the batch of one table of `dir`.
	pub fn store(&self, dir: &Path, batch: TableBatch) -> Arc<TableBatch> {
		let batch = Arc::new(batch);
		let mut state = self.state.lock();
		state
			.batches
			.entry(dir.to_path_buf())
			.or_default()
			.insert(batch.table().to_string(), Arc::clone(&batch));
		batch
	}

	/// Marks `dir` as parsed in full with the given tables.
	pub fn complete(&self, dir: &Path, tables: Vec<String>) {
		let mut state = self.state.lock();
		state.loaded_tables.extend(tables.iter().cloned());
		state.directories.insert(dir.to_path_buf(), tables);
	}

	/// Returns true once `dir` has been marked complete.
	pub fn is_complete(&self, dir: &Path) -> bool {
		self.state.lock().directories.contains_key(dir)
	}

	/// Tables of every completed directory.
	pub fn loaded_tables(&self) -> Vec<String> {
		self.state.lock().loaded_tables.iter().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::FixtureRecord;
	use rstest::rstest;

	fn batch(table: &str) -> TableBatch {
		TableBatch::from_records(table, Vec::<FixtureRecord>::new())
	}

	#[rstest]
	fn test_incomplete_directory_is_not_reused() {
		let cache = ImportCache::new();
		let dir = Path::new("/fixtures");

		cache.store(dir, batch("users"));

		assert!(cache.try_reuse(dir).is_none());
		assert!(!cache.is_complete(dir));
		assert!(cache.loaded_tables().is_empty());
	}

	#[rstest]
	fn test_completed_directory_is_reused_in_table_order() {
		let cache = ImportCache::new();
		let dir = Path::new("/fixtures");

		cache.store(dir, batch("users"));
		cache.store(dir, batch("posts"));
		cache.complete(dir, vec!["posts".to_string(), "users".to_string()]);

		let reused = cache.try_reuse(dir).unwrap();
		let tables: Vec<&str> = reused.iter().map(|b| b.table()).collect();
		assert_eq!(tables, vec!["posts", "users"]);
	}

	#[rstest]
	fn test_directories_are_kept_apart() {
		let cache = ImportCache::new();
		let first = Path::new("/fixtures/a");
		let second = Path::new("/fixtures/b");

		cache.store(first, batch("users"));
		cache.complete(first, vec!["users".to_string()]);
		cache.store(second, batch("posts"));
		cache.complete(second, vec!["posts".to_string()]);

		assert_eq!(cache.try_reuse(first).unwrap().len(), 1);
		assert_eq!(cache.try_reuse(second).unwrap()[0].table(), "posts");
		assert_eq!(cache.loaded_tables(), vec!["users", "posts"]);
	}

	#[rstest]
	fn test_loaded_tables_are_deduplicated() {
		let cache = ImportCache::new();
		cache.complete(Path::new("/a"), vec!["users".to_string()]);
		cache.complete(Path::new("/b"), vec!["users".to_string(), "tags".to_string()]);

		assert_eq!(cache.loaded_tables(), vec!["users", "tags"]);
	}

	#[rstest]
	fn test_shared_cache_is_one_instance() {
		assert!(Arc::ptr_eq(&ImportCache::shared(), &ImportCache::shared()));
	}
}
