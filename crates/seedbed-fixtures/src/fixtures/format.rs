//! Fixture values and file formats.
//!
//! A fixture file holds the rows of one table as a list of mappings from
//! column name to value:
//!
//! ```yaml
//! - id: 1
//!   name: admin
//!   created_at: 2020-01-01 00:00:00
//! - id: 2
//!   name: guest
//!   note: optional columns may be left out
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One fixture entry: column name to value, in the order written.
pub type FixtureRecord = IndexMap<String, FixtureValue>;

/// A dynamically typed fixture value.
///
/// Timestamps are plain strings in fixtures and are passed to the database
/// as such. Nested sequences and mappings are kept as JSON and bound as their
/// JSON text, which suits JSON columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureValue {
	/// Explicit null.
	Null,
	/// Boolean.
	Bool(bool),
	/// Integer.
	Int(i64),
	/// Integer above `i64::MAX`, for unsigned columns.
	UInt(u64),
	/// Floating point number.
	Float(f64),
	/// String, including timestamp-like strings.
	String(String),
	/// Nested sequence or mapping.
	Structured(serde_json::Value),
}

impl FixtureValue {
	/// Returns true for [`FixtureValue::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Converts the value into its SeaQuery counterpart.
	pub fn to_sea_value(&self) -> sea_query::Value {
		match self {
			// BigInt(None) is the generic NULL
			Self::Null => sea_query::Value::BigInt(None),
			Self::Bool(b) => sea_query::Value::Bool(Some(*b)),
			Self::Int(i) => sea_query::Value::BigInt(Some(*i)),
			Self::UInt(u) => sea_query::Value::BigUnsigned(Some(*u)),
			Self::Float(f) => sea_query::Value::Double(Some(*f)),
			Self::String(s) => sea_query::Value::from(s.clone()),
			Self::Structured(v) => sea_query::Value::from(v.to_string()),
		}
	}
}

impl From<&str> for FixtureValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for FixtureValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<i64> for FixtureValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<u64> for FixtureValue {
	fn from(value: u64) -> Self {
		i64::try_from(value).map_or(Self::UInt(value), Self::Int)
	}
}

impl From<bool> for FixtureValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for FixtureValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

/// File formats a fixture may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// `.yml` or `.yaml`.
	#[default]
	Yaml,
	/// `.json`.
	Json,
}

impl FixtureFormat {
	/// Maps a file extension to a format, ignoring case.
	///
	/// ```
	/// # use seedbed_fixtures::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("YML"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("json"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("csv"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") {
			Some(Self::Yaml)
		} else if ext.eq_ignore_ascii_case("json") {
			Some(Self::Json)
		} else {
			None
		}
	}

	/// Format of a fixture file, judged by its extension.
	pub fn from_path(path: &Path) -> Option<Self> {
		Self::from_extension(path.extension()?.to_str()?)
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Yaml => "YAML",
			Self::Json => "JSON",
		})
	}
}
