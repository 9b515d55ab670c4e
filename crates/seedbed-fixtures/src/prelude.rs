//! Convenience re-exports for common usage.

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Fixture types
pub use crate::fixtures::{
	FixtureFile, FixtureFormat, FixtureImporter, FixtureParser, FixtureRecord, FixtureSource,
	FixtureValue, FsFixtureSource, ImportCache, ParsedFixtures, TableBatch,
};

// Loading
pub use crate::fixturer::{Fixturer, ImportReport};
pub use crate::loader::{LoadReport, TransactionalLoader};
pub use crate::snapshot::SnapshotReport;

// Settings
pub use seedbed_conf::{ErrorPolicy, FixturerSettings, TableClearMode};
