//! Fixture discovery, parsing and caching.
//!
//! Fixture files live in one directory, one file per table, named after the
//! table (`users.yml` seeds `users`). They are parsed concurrently into
//! [`TableBatch`]es that the loader turns into insert statements.

mod batch;
mod cache;
mod discovery;
mod format;
mod importer;
mod parser;

pub use batch::{BatchRow, TableBatch};
pub use cache::ImportCache;
pub use discovery::{FixtureFile, FixtureSource, FsFixtureSource, discover};
pub use format::{FixtureFormat, FixtureRecord, FixtureValue};
pub use importer::{FixtureImporter, ParsedFixtures};
pub use parser::FixtureParser;
