//! Error types for the fixture engine.

use thiserror::Error;

use seedbed_conf::SettingsError;

/// Errors that can occur while preparing a test database.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// The fixture directory could not be listed.
	#[error("Cannot list fixture directory {path}: {source}")]
	DirectoryUnreadable {
		/// Directory that was listed.
		path: String,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// A fixture file could not be read.
	#[error("Cannot read fixture {path}: {source}")]
	FileUnreadable {
		/// File that was read.
		path: String,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// Fixture content is malformed.
	#[error("Parse error in {file}: {message}")]
	ParseError {
		/// File (or label) the content came from.
		file: String,
		/// Decoder message.
		message: String,
	},

	/// Connection, statement or transaction failure.
	#[error("Database error: {0}")]
	DatabaseError(#[from] sqlx::Error),

	/// A single row insert failed.
	#[error("Insert into {table} failed: {message}")]
	StatementError {
		/// Target table.
		table: String,
		/// Driver or builder message.
		message: String,
	},

	/// Invalid configuration value.
	#[error("Configuration error: {0}")]
	ConfigError(String),

	/// Settings could not be read or failed validation.
	#[error(transparent)]
	SettingsError(#[from] SettingsError),

	/// Two fixture files resolve to the same table.
	#[error("Fixture files {first} and {second} both target table {table}")]
	DuplicateTable {
		/// Table name both files resolve to.
		table: String,
		/// First file.
		first: String,
		/// Second file.
		second: String,
	},

	/// A parse task panicked or never reported back.
	#[error("Fixture task failed: {0}")]
	TaskFailed(String),

	/// Flat-file snapshot failure.
	#[error("Snapshot error: {0}")]
	SnapshotError(String),
}

impl FixtureError {
	/// Builds a [`FixtureError::ParseError`] for a file label.
	pub(crate) fn parse(file: impl Into<String>, message: impl std::fmt::Display) -> Self {
		Self::ParseError {
			file: file.into(),
			message: message.to_string(),
		}
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_duplicate_table_message() {
		let error = FixtureError::DuplicateTable {
			table: "users".to_string(),
			first: "users.yml".to_string(),
			second: "users.json".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Fixture files users.yml and users.json both target table users"
		);
	}

	#[rstest]
	fn test_io_error_from() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
		let error: FixtureError = io_error.into();
		assert!(matches!(error, FixtureError::IoError(_)));
	}

	#[rstest]
	fn test_parse_helper() {
		let error = FixtureError::parse("users.yml", "did not find expected key");
		assert_eq!(
			error.to_string(),
			"Parse error in users.yml: did not find expected key"
		);
	}

	#[rstest]
	fn test_sqlx_error_from() {
		let error: FixtureError = sqlx::Error::RowNotFound.into();
		assert!(matches!(error, FixtureError::DatabaseError(_)));
	}
}
