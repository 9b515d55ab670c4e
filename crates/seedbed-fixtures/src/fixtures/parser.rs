//! Fixture parsing functionality.
//!
//! Turns the bytes of one fixture file into records. A document may be a list
//! of mappings, a single mapping (one record) or empty (no records).

use super::{FixtureFormat, FixtureRecord};
use crate::error::{FixtureError, FixtureResult};

/// Parser for fixture content.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses fixture content in the given format.
	///
	/// `file` only labels errors.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::ParseError`] for malformed content or a document
	/// that is neither a list of mappings nor a single mapping.
	pub fn parse_slice(
		&self,
		file: &str,
		content: &[u8],
		format: FixtureFormat,
	) -> FixtureResult<Vec<FixtureRecord>> {
		let text = std::str::from_utf8(content).map_err(|e| FixtureError::parse(file, e))?;
		if text.trim().is_empty() {
			return Ok(Vec::new());
		}

		match format {
			FixtureFormat::Yaml => self.parse_yaml(file, text),
			FixtureFormat::Json => self.parse_json(file, text),
		}
	}

	/// Parses YAML fixture content.
	fn parse_yaml(&self, file: &str, content: &str) -> FixtureResult<Vec<FixtureRecord>> {
		let value: serde_yaml::Value =
			serde_yaml::from_str(content).map_err(|e| FixtureError::parse(file, e))?;

		match value {
			serde_yaml::Value::Null => Ok(Vec::new()),
			serde_yaml::Value::Sequence(seq) => {
				let mut records = Vec::with_capacity(seq.len());
				for (idx, item) in seq.into_iter().enumerate() {
					let record: FixtureRecord = serde_yaml::from_value(item).map_err(|e| {
						FixtureError::parse(file, format!("invalid record at index {}: {}", idx, e))
					})?;
					records.push(record);
				}
				Ok(records)
			}
			serde_yaml::Value::Mapping(_) => {
				let record: FixtureRecord =
					serde_yaml::from_value(value).map_err(|e| FixtureError::parse(file, e))?;
				Ok(vec![record])
			}
			_ => Err(FixtureError::parse(file, "expected a sequence of mappings")),
		}
	}

	/// Parses JSON fixture content.
	fn parse_json(&self, file: &str, content: &str) -> FixtureResult<Vec<FixtureRecord>> {
		let value: serde_json::Value =
			serde_json::from_str(content).map_err(|e| FixtureError::parse(file, e))?;

		match value {
			serde_json::Value::Null => Ok(Vec::new()),
			serde_json::Value::Array(arr) => {
				let mut records = Vec::with_capacity(arr.len());
				for (idx, item) in arr.into_iter().enumerate() {
					let record: FixtureRecord = serde_json::from_value(item).map_err(|e| {
						FixtureError::parse(file, format!("invalid record at index {}: {}", idx, e))
					})?;
					records.push(record);
				}
				Ok(records)
			}
			serde_json::Value::Object(_) => {
				let record: FixtureRecord =
					serde_json::from_value(value).map_err(|e| FixtureError::parse(file, e))?;
				Ok(vec![record])
			}
			_ => Err(FixtureError::parse(file, "expected an array of objects")),
		}
	}
}
