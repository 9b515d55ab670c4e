//! Schema loading.

use std::path::Path;

use sqlx::Connection;
use sqlx::mysql::{MySqlConnection, MySqlPool};
use tracing::{debug, info};

use crate::database::ForeignKeyChecksOff;
use crate::error::{FixtureError, FixtureResult};

/// Splits a schema script on `;` into trimmed statements, dropping empty
/// pieces and pieces that hold only `--` or `#` comments.
///
/// A `;` inside a string literal or comment also splits; schema files are
/// expected not to contain one.
///
/// # Example
///
/// ```
/// # use seedbed_fixtures::schema::split_statements;
/// let sql = "CREATE TABLE a (id INT);\n\n-- trailing note\n;CREATE TABLE b (id INT);";
/// assert_eq!(
///     split_statements(sql),
///     vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]
/// );
/// ```
pub fn split_statements(script: &str) -> Vec<&str> {
	script
		.split(';')
		.map(str::trim)
		.filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
		.collect()
}

fn is_comment_only(stmt: &str) -> bool {
	stmt.lines()
		.map(str::trim)
		.all(|line| line.is_empty() || line.starts_with("--") || line.starts_with('#'))
}

/// Executes the statements of the schema file at `path` inside one
/// transaction with foreign key checks off. Returns the number of
/// statements executed.
///
/// MySQL commits implicitly around most DDL, so the transaction only keeps
/// non-DDL statements of the script atomic.
pub async fn load_schema(pool: &MySqlPool, path: &Path) -> FixtureResult<usize> {
	info!(path = %path.display(), "Loading database schema");
	let script = tokio::fs::read_to_string(path)
		.await
		.map_err(|source| FixtureError::FileUnreadable {
			path: path.display().to_string(),
			source,
		})?;
	let statements = split_statements(&script);

	let mut guard = ForeignKeyChecksOff::acquire(pool).await?;
	let outcome = execute_all(guard.connection(), &statements).await;
	guard.finish(outcome).await
}

async fn execute_all(conn: &mut MySqlConnection, statements: &[&str]) -> FixtureResult<usize> {
	let mut tx = conn.begin().await?;
	for (idx, stmt) in statements.iter().enumerate() {
		debug!(index = idx, "Executing schema statement");
		sqlx::raw_sql(stmt).execute(&mut *tx).await?;
	}
	tx.commit().await?;
	Ok(statements.len())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_split_skips_blank_pieces() {
		let sql = "CREATE TABLE users (id INT);;\n  ;\nINSERT INTO users VALUES (1);\n";
		assert_eq!(
			split_statements(sql),
			vec!["CREATE TABLE users (id INT)", "INSERT INTO users VALUES (1)"]
		);
	}

	#[rstest]
	fn test_split_keeps_statements_with_leading_comments() {
		let sql = "-- users\nCREATE TABLE users (id INT);\n# done\n";
		assert_eq!(
			split_statements(sql),
			vec!["-- users\nCREATE TABLE users (id INT)"]
		);
	}

	#[rstest]
	#[case("")]
	#[case(";;;")]
	#[case("-- only a comment\n")]
	fn test_split_nothing_to_run(#[case] sql: &str) {
		assert!(split_statements(sql).is_empty());
	}
}
