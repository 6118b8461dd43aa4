//! Earth→Moon trajectory engine: validates a request, dispatches to a transfer model, sizes the
//! propellant load and assembles an immutable trajectory record.

pub mod error;
pub mod points;
pub mod trade;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lunar_config::EngineConfig;
use lunar_core::units::{hours_to_seconds, validate_mission_time};
use lunar_core::{OrbitalElements, Vector3, round_to};
use lunar_impulsive::transfers::{BiEllipticResult, TransferResult, hohmann};
use lunar_impulsive::{Direction, LambertSolution, lambert_solve};
use lunar_orbits::{
    EarthMoonSystem, PatchedConicDetails, earth_moon_bi_elliptic, earth_moon_transfer,
};
use lunar_propulsion::{FuelPlan, Vehicle, plan_fuel};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::error::{EngineError, ErrorKind};

pub const RISK_HIGH_DELTA_V: &str = "High delta-V requirement increases fuel load and complexity";
pub const RISK_LONG_FLIGHT: &str = "Extended flight time increases exposure to space weather";
pub const RISK_LAMBERT_TIMING: &str = "Lambert solution may require precise timing and navigation";
pub const RISK_SOLAR_ACTIVITY: &str = "Monitor solar activity during launch window";
pub const RISK_DEBRIS: &str = "Debris avoidance maneuvers may be required";

/// Total delta-v above which the high-delta-v advisory is raised (km/s).
pub const HIGH_DELTA_V_KM_S: f64 = 4.0;
/// Flight time above which the space-weather advisory is raised (hours).
pub const LONG_FLIGHT_HOURS: f64 = 120.0;

/// Transfer strategy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    Hohmann,
    Lambert,
    BiElliptic,
    /// Record tag for externally designed trajectories; not computed by the engine.
    Custom,
}

impl TransferType {
    pub const ALL: [TransferType; 4] = [
        TransferType::Hohmann,
        TransferType::Lambert,
        TransferType::BiElliptic,
        TransferType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransferType::Hohmann => "hohmann",
            TransferType::Lambert => "lambert",
            TransferType::BiElliptic => "bi_elliptic",
            TransferType::Custom => "custom",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            TransferType::Hohmann => "Hohmann",
            TransferType::Lambert => "Lambert",
            TransferType::BiElliptic => "Bi-elliptic",
            TransferType::Custom => "Custom",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        TransferType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown transfer type '{s}'")))
    }
}

/// Validated caller request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub mission_id: String,
    pub name: String,
    pub launch_date: DateTime<Utc>,
    pub transfer_type: TransferType,
    pub flight_time_hours: f64,
}

impl TransferRequest {
    /// Request with a mission id and name derived from the launch date and strategy.
    pub fn new(
        launch_date: DateTime<Utc>,
        transfer_type: TransferType,
        flight_time_hours: f64,
    ) -> Self {
        Self {
            mission_id: format!(
                "LTE-{}-{}",
                launch_date.format("%Y%m%d"),
                transfer_type.as_str()
            ),
            name: format!("Earth-Moon {} Transfer", transfer_type.display_name()),
            launch_date,
            transfer_type,
            flight_time_hours,
        }
    }
}

/// Parse a launch date given as an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_launch_date(input: &str) -> Result<DateTime<Utc>, EngineError> {
    let trimmed = input.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| EngineError::InvalidInput(format!("invalid launch date '{input}'")))
}

/// Model outputs attached to a record. Only the models that ran are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hohmann_transfer: Option<TransferResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bi_elliptic_transfer: Option<BiEllipticResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambert_solution: Option<LambertSolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patched_conic: Option<PatchedConicDetails>,
    pub fuel_optimization: FuelPlan,
}

/// Result of one engine invocation. Created fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryRecord {
    pub mission_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub transfer_type: TransferType,
    pub launch_window: DateTime<Utc>,
    pub total_delta_v: f64,
    pub flight_time: f64,
    pub fuel_mass: f64,
    pub efficiency: f64,
    pub trajectory_points: Vec<Vector3>,
    pub orbital_elements: Vec<OrbitalElements>,
    pub risk_factors: Vec<String>,
    pub calculations: Calculations,
    pub is_active: bool,
}

// Unrounded output of a single transfer model.
struct ModelOutcome {
    total_delta_v: f64,
    flight_time_hours: f64,
    points: Vec<Vector3>,
    orbital_elements: Vec<OrbitalElements>,
    hohmann: Option<TransferResult>,
    bi_elliptic: Option<BiEllipticResult>,
    lambert: Option<LambertSolution>,
    patched_conic: Option<PatchedConicDetails>,
}

/// Stateless trajectory engine. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryEngine {
    system: EarthMoonSystem,
    vehicle: Vehicle,
    trajectory_samples: usize,
    bi_elliptic_apoapsis_factor: f64,
}

impl Default for TrajectoryEngine {
    fn default() -> Self {
        Self::from_parts(&EngineConfig::default())
    }
}

impl TrajectoryEngine {
    /// Build an engine from a configuration, validating it first.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let engine = Self::from_parts(config);
        engine.system.validate()?;
        Ok(engine)
    }

    fn from_parts(config: &EngineConfig) -> Self {
        Self {
            system: EarthMoonSystem {
                mu_earth_km3_s2: config.earth.mu_km3_s2,
                mu_moon_km3_s2: config.moon.mu_km3_s2,
                earth_radius_km: config.earth.radius_km,
                moon_radius_km: config.moon.radius_km,
                earth_parking_altitude_km: config.earth.default_parking_altitude_km,
                moon_parking_altitude_km: config.moon.default_parking_altitude_km,
                earth_moon_distance_km: config.earth_moon_distance_km,
            },
            vehicle: crate::vehicle::from_config(&config.vehicle),
            trajectory_samples: config.trajectory_samples,
            bi_elliptic_apoapsis_factor: config.bi_elliptic_apoapsis_factor,
        }
    }

    pub fn system(&self) -> &EarthMoonSystem {
        &self.system
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Compute the trajectory record for `request`. Any failure aborts with no partial result.
    pub fn compute_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TrajectoryRecord, EngineError> {
        validate_mission_time(request.flight_time_hours)?;

        let outcome = match request.transfer_type {
            TransferType::Hohmann => self.hohmann_model()?,
            TransferType::BiElliptic => self.bi_elliptic_model()?,
            TransferType::Lambert => self.lambert_model(request.flight_time_hours)?,
            TransferType::Custom => {
                return Err(EngineError::InvalidInput(
                    "custom trajectories cannot be computed by the engine".to_string(),
                ));
            }
        };

        let fuel = plan_fuel(&self.vehicle, outcome.total_delta_v)?;
        let efficiency = efficiency(self.ideal_delta_v()?, outcome.total_delta_v);
        let risks = risk_factors(
            request.transfer_type,
            outcome.total_delta_v,
            outcome.flight_time_hours,
        );

        debug!(
            mission_id = %request.mission_id,
            transfer_type = %request.transfer_type,
            total_delta_v = outcome.total_delta_v,
            flight_time_hours = outcome.flight_time_hours,
            "trajectory computed"
        );

        Ok(TrajectoryRecord {
            mission_id: request.mission_id.clone(),
            name: request.name.clone(),
            transfer_type: request.transfer_type,
            launch_window: request.launch_date,
            total_delta_v: round_to(outcome.total_delta_v, 3),
            flight_time: round_to(outcome.flight_time_hours, 1),
            fuel_mass: fuel.propellant_mass_kg.round(),
            efficiency: round_to(efficiency, 1),
            trajectory_points: outcome.points,
            orbital_elements: outcome.orbital_elements,
            risk_factors: risks,
            calculations: Calculations {
                hohmann_transfer: outcome.hohmann,
                bi_elliptic_transfer: outcome.bi_elliptic,
                lambert_solution: outcome.lambert,
                patched_conic: outcome.patched_conic,
                fuel_optimization: fuel.rounded(),
            },
            is_active: false,
        })
    }

    /// Delta-v of the ideal two-impulse Hohmann transfer from the parking orbit to the Moon's
    /// distance; the efficiency baseline.
    pub fn ideal_delta_v(&self) -> Result<f64, EngineError> {
        let ideal = hohmann(
            self.system.earth_parking_radius_km(),
            self.system.earth_moon_distance_km,
            self.system.mu_earth_km3_s2,
        )?;
        Ok(ideal.total_delta_v_km_s())
    }

    fn hohmann_model(&self) -> Result<ModelOutcome, EngineError> {
        let transfer = earth_moon_transfer(&self.system)?;
        Ok(ModelOutcome {
            total_delta_v: transfer.total_delta_v_km_s(),
            flight_time_hours: transfer.transfer_time_hours(),
            points: points::patched_conic_points(&self.system, self.trajectory_samples),
            orbital_elements: transfer.orbital_elements,
            hohmann: Some(transfer.hohmann),
            bi_elliptic: None,
            lambert: None,
            patched_conic: Some(transfer.details),
        })
    }

    fn bi_elliptic_model(&self) -> Result<ModelOutcome, EngineError> {
        let transfer = earth_moon_bi_elliptic(&self.system, self.bi_elliptic_apoapsis_factor)?;
        Ok(ModelOutcome {
            total_delta_v: transfer.total_delta_v_km_s(),
            flight_time_hours: transfer.transfer_time_hours(),
            points: points::bi_elliptic_points(&transfer.bi_elliptic, self.trajectory_samples),
            orbital_elements: transfer.orbital_elements,
            hohmann: None,
            bi_elliptic: Some(transfer.bi_elliptic),
            lambert: None,
            patched_conic: Some(transfer.details),
        })
    }

    fn lambert_model(&self, flight_time_hours: f64) -> Result<ModelOutcome, EngineError> {
        let mu = self.system.mu_earth_km3_s2;
        let r1 = Vector3::new(self.system.earth_parking_radius_km(), 0.0, 0.0);
        let r2 = Vector3::new(self.system.earth_moon_distance_km, 0.0, 0.0);
        let tof = hours_to_seconds(flight_time_hours)?;

        let solution = lambert_solve(r1, r2, tof, mu, Direction::Prograde, 0)?;
        let departure_dv =
            (solution.velocity_departure.norm() - self.system.earth_parking_speed_km_s()).abs();
        let arrival_dv =
            (solution.velocity_arrival.norm() - self.system.moon_parking_speed_km_s()).abs();

        Ok(ModelOutcome {
            total_delta_v: departure_dv + arrival_dv,
            flight_time_hours,
            points: points::lambert_points(&solution, r1, self.trajectory_samples),
            orbital_elements: vec![OrbitalElements::from_state(
                r1,
                solution.velocity_departure,
                mu,
            )],
            hohmann: None,
            bi_elliptic: None,
            lambert: Some(solution),
            patched_conic: None,
        })
    }
}

/// Compute a transfer with the default Earth-Moon configuration.
pub fn compute_transfer(request: &TransferRequest) -> Result<TrajectoryRecord, EngineError> {
    TrajectoryEngine::default().compute_transfer(request)
}

/// Advisory strings for a computed transfer, in rule-table order.
pub fn risk_factors(
    transfer_type: TransferType,
    total_delta_v_km_s: f64,
    flight_time_hours: f64,
) -> Vec<String> {
    let mut risks = Vec::new();
    if total_delta_v_km_s > HIGH_DELTA_V_KM_S {
        risks.push(RISK_HIGH_DELTA_V.to_string());
    }
    if flight_time_hours > LONG_FLIGHT_HOURS {
        risks.push(RISK_LONG_FLIGHT.to_string());
    }
    if transfer_type == TransferType::Lambert {
        risks.push(RISK_LAMBERT_TIMING.to_string());
    }
    risks.push(RISK_SOLAR_ACTIVITY.to_string());
    risks.push(RISK_DEBRIS.to_string());
    risks
}

/// Ideal-to-actual delta-v ratio as a percentage, clamped to `[0, 100]`.
pub fn efficiency(ideal_delta_v_km_s: f64, actual_delta_v_km_s: f64) -> f64 {
    if actual_delta_v_km_s <= 0.0 {
        return 100.0;
    }
    (ideal_delta_v_km_s / actual_delta_v_km_s * 100.0).clamp(0.0, 100.0)
}
