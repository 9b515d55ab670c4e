//! Flat-file snapshots.
//!
//! A snapshot is one `<table>.csv` per table in a per-suite directory,
//! written by the server with `SELECT ... INTO OUTFILE` and read back with
//! `LOAD DATA INFILE`. The files live on the database server's file system,
//! so the snapshot directory must be shared with the server.

use std::path::{Path, PathBuf};

use sqlx::Connection;
use sqlx::mysql::{MySqlConnection, MySqlPool};
use tracing::{debug, info};

use crate::database::{ForeignKeyChecksOff, quote_ident};
use crate::error::{FixtureError, FixtureResult};
use crate::loader::clear_statement;
use seedbed_conf::TableClearMode;

const CSV_EXTENSION: &str = "csv";
const FIELD_OPTIONS: &str =
	"FIELDS TERMINATED BY ',' OPTIONALLY ENCLOSED BY '\"' ESCAPED BY '\\\\' LINES TERMINATED BY '\\n'";

/// Result of an export or import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
	/// Snapshot directory.
	pub directory: PathBuf,
	/// Tables written or restored, in order.
	pub tables: Vec<String>,
	/// One file per table, aligned with `tables`.
	pub files: Vec<PathBuf>,
}

/// Quotes a string literal for MySQL.
fn quote_literal(value: &str) -> String {
	format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Path of the snapshot file for `table`.
pub fn table_file(dir: &Path, table: &str) -> PathBuf {
	dir.join(format!("{}.{}", table, CSV_EXTENSION))
}

/// `SELECT ... INTO OUTFILE` for one table.
pub fn export_statement(table: &str, file: &Path) -> String {
	format!(
		"SELECT * FROM {} INTO OUTFILE {} {}",
		quote_ident(table),
		quote_literal(&file.to_string_lossy()),
		FIELD_OPTIONS
	)
}

/// `LOAD DATA INFILE` for one table.
pub fn import_statement(table: &str, file: &Path) -> String {
	format!(
		"LOAD DATA INFILE {} INTO TABLE {} {}",
		quote_literal(&file.to_string_lossy()),
		quote_ident(table),
		FIELD_OPTIONS
	)
}

/// Removes `dir` if present and creates it empty and writable by everyone,
/// since the server process writes into it.
pub async fn prepare_directory(dir: &Path) -> FixtureResult<()> {
	match tokio::fs::remove_dir_all(dir).await {
		Ok(()) => {}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => return Err(FixtureError::SnapshotError(format!("cannot remove {}: {}", dir.display(), e))),
	}
	tokio::fs::create_dir_all(dir).await?;

	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o777)).await?;
	}
	Ok(())
}

/// Lists snapshot files in `dir` as `(table, path)`, sorted by table.
pub async fn snapshot_files(dir: &Path) -> FixtureResult<Vec<(String, PathBuf)>> {
	let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
		FixtureError::SnapshotError(format!("cannot read snapshot {}: {}", dir.display(), e))
	})?;

	let mut files = Vec::new();
	while let Some(entry) = entries.next_entry().await? {
		let path = entry.path();
		if path.extension().and_then(|e| e.to_str()) != Some(CSV_EXTENSION) {
			continue;
		}
		if let Some(table) = path.file_stem().and_then(|s| s.to_str()) {
			files.push((table.to_string(), path.clone()));
		}
	}
	files.sort();
	Ok(files)
}

/// Base tables of `database`, sorted by name.
async fn list_tables(pool: &MySqlPool, database: &str) -> FixtureResult<Vec<String>> {
	let tables = sqlx::query_scalar::<_, String>(
		"SELECT CAST(table_name AS CHAR) FROM information_schema.tables \
		 WHERE table_schema = ? AND table_type = 'BASE TABLE' ORDER BY table_name",
	)
	.bind(database)
	.fetch_all(pool)
	.await?;
	Ok(tables)
}

/// Writes every base table of `database` into `dir`, which is recreated.
pub async fn export_tables(pool: &MySqlPool, database: &str, dir: &Path) -> FixtureResult<SnapshotReport> {
	info!(directory = %dir.display(), "Exporting snapshot");
	prepare_directory(dir).await?;

	let mut report = SnapshotReport {
		directory: dir.to_path_buf(),
		..Default::default()
	};
	for table in list_tables(pool, database).await? {
		let file = table_file(dir, &table);
		sqlx::raw_sql(&export_statement(&table, &file))
			.execute(pool)
			.await?;
		debug!(table = %table, file = %file.display(), "Exported table");
		report.tables.push(table);
		report.files.push(file);
	}
	Ok(report)
}

/// Replaces the contents of every table that has a file in `dir`, inside
/// one transaction with foreign key checks off.
pub async fn import_tables(pool: &MySqlPool, dir: &Path) -> FixtureResult<SnapshotReport> {
	info!(directory = %dir.display(), "Importing snapshot");
	let files = snapshot_files(dir).await?;

	let mut guard = ForeignKeyChecksOff::acquire(pool).await?;
	let outcome = load_files(guard.connection(), &files).await;
	guard.finish(outcome).await?;

	let (tables, files) = files.into_iter().unzip();
	Ok(SnapshotReport {
		directory: dir.to_path_buf(),
		tables,
		files,
	})
}

async fn load_files(conn: &mut MySqlConnection, files: &[(String, PathBuf)]) -> FixtureResult<()> {
	let mut tx = conn.begin().await?;
	for (table, file) in files {
		sqlx::raw_sql(&clear_statement(table, TableClearMode::Delete))
			.execute(&mut *tx)
			.await?;
		sqlx::raw_sql(&import_statement(table, file))
			.execute(&mut *tx)
			.await?;
		debug!(table = %table, "Imported table");
	}
	tx.commit().await?;
	Ok(())
}
