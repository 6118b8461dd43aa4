//! Unit conversion at the caller boundary.
//!
//! Callers speak hours and km/s; the solvers work in seconds and m/s where the physics demands it.
//! Every conversion that crosses that boundary is validated here, so no downstream computation sees
//! a negative duration, a NaN velocity or an implausible mission profile.

use thiserror::Error;

use crate::constants::SECONDS_PER_HOUR;

/// Shortest mission duration accepted by the engine (hours, 6 minutes).
pub const MIN_MISSION_HOURS: f64 = 0.1;
/// Longest mission duration accepted by the engine (hours, one year).
pub const MAX_MISSION_HOURS: f64 = 8_760.0;
/// Upper bound on total delta-v for chemical propulsion (km/s).
pub const MAX_DELTA_V_KM_S: f64 = 20.0;

const METERS_PER_KM: f64 = 1_000.0;

/// Rejected scalar input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn invalid(message: impl Into<String>) -> UnitError {
    UnitError::InvalidInput(message.into())
}

fn duration_guard(value: f64) -> Result<(), UnitError> {
    if !value.is_finite() {
        return Err(invalid("time must be finite"));
    }
    if value < 0.0 {
        return Err(invalid("time cannot be negative"));
    }
    Ok(())
}

/// Convert a caller-facing duration in hours to seconds.
pub fn hours_to_seconds(hours: f64) -> Result<f64, UnitError> {
    duration_guard(hours)?;
    Ok(hours * SECONDS_PER_HOUR)
}

/// Convert an internal duration in seconds back to hours.
pub fn seconds_to_hours(seconds: f64) -> Result<f64, UnitError> {
    duration_guard(seconds)?;
    Ok(seconds / SECONDS_PER_HOUR)
}

/// Convert kilometres per second to metres per second.
pub fn km_per_sec_to_m_per_sec(km_s: f64) -> Result<f64, UnitError> {
    if !km_s.is_finite() {
        return Err(invalid("velocity must be finite"));
    }
    Ok(km_s * METERS_PER_KM)
}

/// Convert metres per second to kilometres per second.
pub fn m_per_sec_to_km_per_sec(m_s: f64) -> Result<f64, UnitError> {
    if !m_s.is_finite() {
        return Err(invalid("velocity must be finite"));
    }
    Ok(m_s / METERS_PER_KM)
}

/// Reject mission durations outside `[0.1 h, 8760 h]`.
pub fn validate_mission_time(hours: f64) -> Result<(), UnitError> {
    if !hours.is_finite() {
        return Err(invalid("mission time must be finite"));
    }
    if hours < MIN_MISSION_HOURS {
        return Err(invalid(format!(
            "mission time too short: {hours} h (minimum 6 minutes)"
        )));
    }
    if hours > MAX_MISSION_HOURS {
        return Err(invalid(format!(
            "mission time too long: {hours} h (maximum 1 year)"
        )));
    }
    Ok(())
}

/// Reject delta-v values that are negative or beyond chemical-propulsion plausibility.
pub fn validate_delta_v(delta_v_km_s: f64) -> Result<(), UnitError> {
    if !delta_v_km_s.is_finite() {
        return Err(invalid("delta-v must be finite"));
    }
    if delta_v_km_s < 0.0 {
        return Err(invalid("delta-v cannot be negative"));
    }
    if delta_v_km_s > MAX_DELTA_V_KM_S {
        return Err(invalid(format!(
            "delta-v {delta_v_km_s:.3} km/s exceeds chemical propulsion limits (>20 km/s)"
        )));
    }
    Ok(())
}

/// Require a strictly positive, finite physical quantity.
pub fn require_positive(name: &str, value: f64) -> Result<f64, UnitError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be positive and finite, got {value}")))
    }
}
