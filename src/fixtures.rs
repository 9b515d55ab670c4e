//! Fixture import engine.
//!
//! See [`seedbed_fixtures`] for the parse, cache and load pipeline.

pub use seedbed_fixtures::*;
