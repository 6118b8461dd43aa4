//! Earth→Moon transfer engine.
//!
//! The physics lives in the workspace crates; this library stitches them together so that
//! front-ends (the CLI, an HTTP service) depend on a single crate.

pub use lunar_config as config;
pub use lunar_core as primitives;
pub use lunar_export as export;
pub use lunar_impulsive as impulsive;
pub use lunar_orbits as orbits;
pub use lunar_propulsion as propulsion;
pub use lunar_transfer as transfer;

pub use lunar_transfer::{
    EngineError, ErrorKind, TrajectoryEngine, TrajectoryRecord, TransferRequest, TransferType,
    compute_transfer, parse_launch_date,
};

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
