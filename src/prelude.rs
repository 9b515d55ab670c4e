//! Convenience re-exports for common usage.

pub use seedbed_fixtures::prelude::*;
