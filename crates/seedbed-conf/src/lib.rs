//! Settings for the seedbed fixture tooling.
//!
//! Settings are either built fluently or read from `SEEDBED_*` environment
//! variables:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `SEEDBED_SERVER_URL` | server URL without a database segment | required |
//! | `SEEDBED_DATABASE` | target database name | required |
//! | `SEEDBED_DATABASE_PARAMS` | extra connection parameters | none |
//! | `SEEDBED_SCHEMA_PATH` | schema SQL file | `schema.sql` |
//! | `SEEDBED_FIXTURES_DIR` | fixture directory | `fixtures` |
//! | `SEEDBED_RECREATE_DATABASE` | drop and recreate before seeding | `true` |
//! | `SEEDBED_SNAPSHOT_DIR` | flat-file snapshot base directory | `<tmp>/seedbed` |
//! | `SEEDBED_PARALLELISM` | connection pool size | `20` |
//! | `SEEDBED_STRICT` | fail on malformed fixtures and bad rows | `false` |
//! | `SEEDBED_TRUNCATE` | clear tables with `TRUNCATE` | `false` |

#![warn(missing_docs)]

pub mod env;
pub mod settings;

pub use env::{Env, EnvError, parse_bool};
pub use settings::{
	DEFAULT_PARALLELISM, ENV_PREFIX, ErrorPolicy, FixturerSettings, SettingsError, TableClearMode,
};
