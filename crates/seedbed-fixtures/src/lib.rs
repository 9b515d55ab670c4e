//! Fixture import engine for MySQL test databases.
//!
//! Prepares an isolated, repeatable database for a test suite: the database
//! is dropped and created, the schema file is executed, and one fixture
//! file per table is parsed and inserted in a single transaction.
//!
//! # Quick Start
//!
//! A fixture directory holds one file per table (`fixtures/users.yml`):
//!
//! ```yaml
//! - id: 1
//!   name: admin
//! - id: 2
//!   name: guest
//!   note: columns a row leaves out get their schema default
//! ```
//!
//! ```no_run
//! use seedbed_fixtures::prelude::*;
//!
//! # async fn example() -> FixtureResult<()> {
//! let settings = FixturerSettings::from_env()?;
//! let mut fixturer = Fixturer::with_cache(settings, ImportCache::shared())?;
//! fixturer.recreate_database_with_schema_and_fixtures().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`FixtureImporter`](fixtures::FixtureImporter) - Discovers and parses a
//!   fixture directory concurrently into [`TableBatch`](fixtures::TableBatch)es
//! - [`ImportCache`](fixtures::ImportCache) - Keeps parsed batches per
//!   directory; a directory is parsed at most once per cache
//! - [`TransactionalLoader`](loader::TransactionalLoader) - Clears and seeds
//!   tables in one transaction with foreign key checks off
//! - [`schema`] and [`snapshot`] - Schema script execution and CSV snapshots
//! - [`Fixturer`] - Ties the above to one configured database
//!
//! Nothing here installs a `tracing` subscriber; events are emitted under
//! this crate's target for the caller to collect.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod database;
pub mod error;
pub mod fixturer;
pub mod fixtures;
pub mod loader;
pub mod prelude;
pub mod schema;
pub mod snapshot;

pub use error::{FixtureError, FixtureResult};
pub use fixturer::{Fixturer, ImportReport};
pub use fixtures::{FixtureFormat, FixtureImporter, FixtureRecord, FixtureValue, ImportCache, TableBatch};
pub use snapshot::SnapshotReport;
