//! Typed lookups of `SEEDBED_*` style environment variables.

use std::env;
use std::path::PathBuf;

/// Reads environment variables, optionally under a common prefix.
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Prepended to every key, e.g. `"SEEDBED_"`.
	pub prefix: Option<String>,
}

impl Env {
	/// Reader without a prefix.
	pub fn new() -> Self {
		Self::default()
	}

	/// Prepends `prefix` to every key.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	fn full_key(&self, key: &str) -> String {
		self.prefix
			.as_deref()
			.map_or_else(|| key.to_string(), |prefix| format!("{prefix}{key}"))
	}

	fn raw(&self, key: &str) -> Result<(String, Option<String>), EnvError> {
		let name = self.full_key(key);
		validate_env_var_name(&name)?;
		let value = env::var(&name).ok();
		Ok((name, value))
	}

	/// Parses the variable with `parse`, falling back to `default` when unset.
	fn typed<T>(
		&self,
		key: &str,
		default: Option<T>,
		parse: impl FnOnce(&str) -> Result<T, String>,
	) -> Result<T, EnvError> {
		let (name, value) = self.raw(key)?;
		match value {
			Some(raw) => parse(&raw).map_err(|error| EnvError::ParseError {
				value_len: raw.len(),
				key: name,
				error,
			}),
			None => default.ok_or(EnvError::MissingVariable(name)),
		}
	}

	/// Required string.
	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.typed(key, None, |raw| Ok(raw.to_string()))
	}

	/// Optional string; an empty value reads as unset.
	pub fn opt_str(&self, key: &str) -> Result<Option<String>, EnvError> {
		let (_, value) = self.raw(key)?;
		Ok(value.filter(|v| !v.is_empty()))
	}

	/// Boolean, see [`parse_bool`].
	pub fn bool_with_default(&self, key: &str, default: Option<bool>) -> Result<bool, EnvError> {
		self.typed(key, default, parse_bool)
	}

	/// Integer; surrounding whitespace is ignored.
	pub fn int_with_default(&self, key: &str, default: Option<i64>) -> Result<i64, EnvError> {
		self.typed(key, default, |raw| {
			raw.trim().parse::<i64>().map_err(|e| e.to_string())
		})
	}

	/// File system path.
	pub fn path_with_default(
		&self,
		key: &str,
		default: Option<PathBuf>,
	) -> Result<PathBuf, EnvError> {
		self.typed(key, default, |raw| Ok(PathBuf::from(raw)))
	}
}

/// Parses a boolean flag.
///
/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "yes" | "on" | "1" => Ok(true),
		"false" | "no" | "off" | "0" => Ok(false),
		_ => Err("expected true/false, yes/no, on/off or 1/0".to_string()),
	}
}

/// Rejects variable names the platform cannot hold: empty names, names with
/// control characters and names containing `=`.
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	let reason = if name.is_empty() {
		Some("name is empty".to_string())
	} else if let Some(pos) = name.find(char::is_control) {
		Some(format!("control character at byte {}", pos))
	} else if name.contains('=') {
		Some("name contains '='".to_string())
	} else {
		None
	};

	match reason {
		Some(reason) => Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason,
		}),
		None => Ok(()),
	}
}

/// Environment lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	/// Required variable is unset.
	#[error("environment variable {0} is not set")]
	MissingVariable(String),

	/// Variable is set but does not parse. Only the value's length is kept.
	#[error("cannot parse environment variable {key} ({value_len} bytes): {error}")]
	ParseError {
		/// Full variable name.
		key: String,
		/// Length of the rejected value.
		value_len: usize,
		/// Parser message.
		error: String,
	},

	/// Variable name is unusable.
	#[error("invalid environment variable name {name:?}: {reason}")]
	InvalidVariableName {
		/// Offending name.
		name: String,
		/// What is wrong with it.
		reason: String,
	},
}
