//! Core units, constants, and shared primitives for the lunar transfer workspace.

pub mod elements;
pub mod units;
pub mod vector;

pub use elements::OrbitalElements;
pub use units::UnitError;
pub use vector::Vector3;

/// Physical constants and default Earth-Moon geometry (km, km^3/s^2, s).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Earth gravitational parameter (km^3/s^2).
    pub const MU_EARTH: f64 = 398_600.4418;
    /// Moon gravitational parameter (km^3/s^2).
    pub const MU_MOON: f64 = 4_902.7779;
    /// Mean Earth radius (km).
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;
    /// Mean lunar radius (km).
    pub const MOON_RADIUS_KM: f64 = 1_737.0;
    /// Mean Earth-Moon distance (km).
    pub const EARTH_MOON_DISTANCE_KM: f64 = 384_400.0;
    /// Default low Earth parking-orbit altitude (km).
    pub const EARTH_PARKING_ALTITUDE_KM: f64 = 200.0;
    /// Default low lunar orbit altitude (km).
    pub const MOON_PARKING_ALTITUDE_KM: f64 = 100.0;
    /// Chemical-propulsion specific impulse used when no vehicle is configured (s).
    pub const SPECIFIC_IMPULSE_S: f64 = 450.0;
    /// Spacecraft dry mass used when no vehicle is configured (kg).
    pub const SPACECRAFT_DRY_MASS_KG: f64 = 5_000.0;
    /// Thrust-to-weight ratio used when no vehicle is configured.
    pub const THRUST_TO_WEIGHT: f64 = 0.3;

    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Round to a fixed number of decimal places for presentation.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
