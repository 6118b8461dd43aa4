//! Transfer façade crate consolidating the trajectory engine and exposing supporting crates.

pub mod engine;

pub use facade::*;
pub use lunar_impulsive as impulsive;
pub use lunar_orbits as orbits;
pub use lunar_propulsion as propulsion;

mod facade;
