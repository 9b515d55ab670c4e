//! Concurrent fixture parsing.
//!
//! [`FixtureImporter::prepare`] turns a fixture directory into one
//! [`TableBatch`] per table. Every file is parsed on its own task; the
//! importer waits for all of them before it records the directory in the
//! [`ImportCache`], so a table is never cleared without its batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use seedbed_conf::ErrorPolicy;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{
	FixtureFile, FixtureParser, FixtureSource, FsFixtureSource, ImportCache, TableBatch, discover,
};
use crate::error::{FixtureError, FixtureResult};

/// Batches ready to be loaded for one directory.
#[derive(Debug, Clone)]
pub struct ParsedFixtures {
	/// Directory the batches came from.
	pub directory: PathBuf,
	/// One batch per table, ordered by file path.
	pub batches: Vec<Arc<TableBatch>>,
	/// True when the batches were taken from the cache without any file I/O.
	pub reused: bool,
	/// Files that could not be read or parsed and contributed no rows.
	pub skipped_files: Vec<String>,
}

impl ParsedFixtures {
	/// Total number of rows across all batches.
	pub fn row_count(&self) -> usize {
		self.batches.iter().map(|b| b.len()).sum()
	}
}

/// Outcome of one parse task.
#[derive(Debug)]
struct ParsedFile {
	batch: Arc<TableBatch>,
	skipped: Option<String>,
}

/// Parses fixture directories into cached table batches.
#[derive(Clone)]
pub struct FixtureImporter {
	source: Arc<dyn FixtureSource>,
	cache: Arc<ImportCache>,
	policy: ErrorPolicy,
	parser: FixtureParser,
}

impl FixtureImporter {
	/// Creates an importer reading from the local file system.
	pub fn new(cache: Arc<ImportCache>) -> Self {
		Self {
			source: Arc::new(FsFixtureSource),
			cache,
			policy: ErrorPolicy::default(),
			parser: FixtureParser::new(),
		}
	}

	/// Replaces the file source.
	pub fn with_source(mut self, source: Arc<dyn FixtureSource>) -> Self {
		self.source = source;
		self
	}

	/// Sets how unreadable or malformed files are treated.
	pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// The cache this importer publishes into.
	pub fn cache(&self) -> &Arc<ImportCache> {
		&self.cache
	}

	/// Returns the batches for `dir`, parsing it if it has not been parsed
	/// in full through this importer's cache before.
	///
	/// # Errors
	///
	/// Fails if the directory cannot be listed, if two files target the same
	/// table, or if a parse task is lost. In strict mode an unreadable or
	/// malformed file fails the call as well; in lenient mode it is logged
	/// and its table gets an empty batch.
	pub async fn prepare(&self, dir: &Path) -> FixtureResult<ParsedFixtures> {
		if let Some(batches) = self.cache.try_reuse(dir) {
			debug!(directory = %dir.display(), tables = batches.len(), "Reusing parsed fixtures");
			return Ok(ParsedFixtures {
				directory: dir.to_path_buf(),
				batches,
				reused: true,
				skipped_files: Vec::new(),
			});
		}

		let files = discover(self.source.as_ref(), dir).await?;
		info!(directory = %dir.display(), files = files.len(), "Parsing fixtures");

		let mut tasks = JoinSet::new();
		for file in &files {
			let file = file.clone();
			let source = Arc::clone(&self.source);
			let cache = Arc::clone(&self.cache);
			let directory = dir.to_path_buf();
			let parser = self.parser;
			let policy = self.policy;
			tasks.spawn(async move {
				parse_file(source.as_ref(), parser, policy, &file)
					.await
					.map(|(batch, skipped)| ParsedFile {
						batch: cache.store(&directory, batch),
						skipped,
					})
			});
		}

		let launched = files.len();
		let mut completed = 0usize;
		let mut parsed: HashMap<String, Arc<TableBatch>> = HashMap::with_capacity(launched);
		let mut skipped_files = Vec::new();
		while let Some(joined) = tasks.join_next().await {
			let outcome = joined.map_err(|e| FixtureError::TaskFailed(e.to_string()))??;
			completed += 1;
			if let Some(file) = outcome.skipped {
				skipped_files.push(file);
			}
			parsed.insert(outcome.batch.table().to_string(), outcome.batch);
		}
		if completed != launched {
			return Err(FixtureError::TaskFailed(format!(
				"{} of {} parse tasks completed",
				completed, launched
			)));
		}

		let mut batches = Vec::with_capacity(launched);
		for file in &files {
			let batch = parsed.remove(&file.table).ok_or_else(|| {
				FixtureError::TaskFailed(format!("no batch produced for {}", file.file_name()))
			})?;
			batches.push(batch);
		}
		skipped_files.sort();

		let tables = batches.iter().map(|b| b.table().to_string()).collect();
		self.cache.complete(dir, tables);

		Ok(ParsedFixtures {
			directory: dir.to_path_buf(),
			batches,
			reused: false,
			skipped_files,
		})
	}
}

impl std::fmt::Debug for FixtureImporter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixtureImporter")
			.field("cache", &self.cache)
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}

/// Reads and parses one file. Returns the batch and, when the file was
/// skipped under the lenient policy, its name.
async fn parse_file(
	source: &dyn FixtureSource,
	parser: FixtureParser,
	policy: ErrorPolicy,
	file: &FixtureFile,
) -> FixtureResult<(TableBatch, Option<String>)> {
	let name = file.file_name();

	let records = match source.read(&file.path).await {
		Ok(content) => parser.parse_slice(&name, &content, file.format),
		Err(source) => Err(FixtureError::FileUnreadable {
			path: file.path.display().to_string(),
			source,
		}),
	};

	match records {
		Ok(records) => {
			let batch = TableBatch::from_records(file.table.clone(), records);
			debug!(
				file = %name,
				table = %file.table,
				format = %file.format,
				rows = batch.len(),
				columns = batch.columns().len(),
				"Parsed fixture"
			);
			Ok((batch, None))
		}
		Err(error) if !policy.is_strict() => {
			warn!(
				file = %name,
				table = %file.table,
				format = %file.format,
				error = %error,
				"Skipping fixture"
			);
			Ok((TableBatch::new(file.table.clone()), Some(name)))
		}
		Err(error) => Err(error),
	}
}
