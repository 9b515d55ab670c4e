//! Testing infrastructure for seedbed.
//!
//! - [`FixtureDir`] - temporary directory of fixture and schema files
//! - [`mysql`] - MySQL server container fixture (feature `testcontainers`)

#![warn(missing_docs)]

pub mod dir;
#[cfg(feature = "testcontainers")]
pub mod mysql;

pub use dir::{FixtureDir, fixture_dir};
#[cfg(feature = "testcontainers")]
pub use mysql::{MySqlServer, mysql_server};

#[cfg(test)]
mod tests {
	use crate::{FixtureDir, dir, fixture_dir};
	use rstest::rstest;

	#[rstest]
	fn test_crate_root_fixture_is_injectable(fixture_dir: FixtureDir) {
		assert!(fixture_dir.path().is_dir());
	}

	#[rstest]
	fn test_module_and_fixture_names_coexist() {
		let from_module = dir::FixtureDir::new();
		let from_fixture = fixture_dir::default();
		assert_ne!(from_module.path(), from_fixture.path());
	}
}
