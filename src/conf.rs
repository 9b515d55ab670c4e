//! Settings and environment loading. The `SEEDBED_*` variables are listed
//! in [`seedbed_conf`].

pub use seedbed_conf::*;
