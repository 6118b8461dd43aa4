//! Vehicle mass properties and propellant budgeting for impulsive chemical burns.

use lunar_core::constants::{G0, SPACECRAFT_DRY_MASS_KG, SPECIFIC_IMPULSE_S, THRUST_TO_WEIGHT};
use lunar_core::round_to;
use lunar_core::units::{UnitError, km_per_sec_to_m_per_sec, require_positive, validate_delta_v};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Highest thrust-to-weight ratio accepted for a chemical stage.
pub const MAX_THRUST_TO_WEIGHT: f64 = 2.0;
/// Ceiling on the finite-burn gravity-loss multiplier.
pub const MAX_GRAVITY_LOSS_FACTOR: f64 = 1.2;

const GRAVITY_LOSS_THRUST_TO_WEIGHT: f64 = 0.5;
const GRAVITY_LOSS_MIN_BURN_S: f64 = 60.0;
const GRAVITY_LOSS_REFERENCE_BURN_S: f64 = 600.0;
const HIGH_PROPELLANT_RATIO: f64 = 10.0;
const LONG_BURN_S: f64 = 3_600.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error("thrust-to-weight ratio must lie in (0, 2], got {0}")]
    InvalidThrustToWeight(f64),
    #[error("invalid mass ratio {0}")]
    InvalidMassRatio(f64),
    #[error("negative propellant mass {0} kg")]
    NegativePropellant(f64),
}

/// Basic vehicle definition used to size the propellant load of a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    pub dry_mass_kg: f64,
    pub isp_seconds: f64,
    pub thrust_to_weight: f64,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            name: "Lunar Transfer Vehicle".to_string(),
            dry_mass_kg: SPACECRAFT_DRY_MASS_KG,
            isp_seconds: SPECIFIC_IMPULSE_S,
            thrust_to_weight: THRUST_TO_WEIGHT,
        }
    }
}

/// Propellant budget for one delta-v requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelPlan {
    #[serde(rename = "massRatio")]
    pub mass_ratio: f64,
    #[serde(rename = "propellantMass")]
    pub propellant_mass_kg: f64,
    #[serde(rename = "specificImpulse")]
    pub specific_impulse_s: f64,
    #[serde(rename = "burnTime")]
    pub burn_time_s: f64,
    #[serde(rename = "dryMass")]
    pub dry_mass_kg: f64,
}

impl FuelPlan {
    /// Convenience accessor for total initial mass.
    pub fn initial_mass_kg(&self) -> f64 {
        self.dry_mass_kg + self.propellant_mass_kg
    }

    /// Presentation copy: mass ratio to 4 dp, propellant and burn time to 0.1.
    pub fn rounded(&self) -> FuelPlan {
        FuelPlan {
            mass_ratio: round_to(self.mass_ratio, 4),
            propellant_mass_kg: round_to(self.propellant_mass_kg, 1),
            burn_time_s: round_to(self.burn_time_s, 1),
            ..*self
        }
    }
}

/// Tsiolkovsky propellant budget with a finite-burn duration estimate.
///
/// `delta_v_km_s` passes through the chemical-propulsion guard (≤ 20 km/s). The burn duration
/// assumes constant thrust `F = T/W·m₀·g₀`; stages with T/W above 0.5 get a heuristic
/// gravity-loss stretch (at most 1.2×) rather than an integrated ascent.
pub fn calculate(
    delta_v_km_s: f64,
    dry_mass_kg: f64,
    isp_s: f64,
    thrust_to_weight: f64,
) -> Result<FuelPlan, FuelError> {
    validate_delta_v(delta_v_km_s)?;
    require_positive("dry mass", dry_mass_kg)?;
    require_positive("specific impulse", isp_s)?;
    if !(thrust_to_weight.is_finite()
        && thrust_to_weight > 0.0
        && thrust_to_weight <= MAX_THRUST_TO_WEIGHT)
    {
        return Err(FuelError::InvalidThrustToWeight(thrust_to_weight));
    }

    let delta_v_m_s = km_per_sec_to_m_per_sec(delta_v_km_s)?;
    let exhaust_velocity = isp_s * G0;
    let mass_ratio = (delta_v_m_s / exhaust_velocity).exp();
    if !mass_ratio.is_finite() || mass_ratio < 1.0 {
        return Err(FuelError::InvalidMassRatio(mass_ratio));
    }

    let propellant = dry_mass_kg * (mass_ratio - 1.0);
    if propellant < 0.0 {
        return Err(FuelError::NegativePropellant(propellant));
    }

    let initial_mass = dry_mass_kg + propellant;
    let thrust_n = thrust_to_weight * initial_mass * G0;
    let mass_flow = thrust_n / exhaust_velocity;
    let mut burn_time = propellant / mass_flow;
    if thrust_to_weight > GRAVITY_LOSS_THRUST_TO_WEIGHT {
        burn_time *= (1.0 + gravity_loss(burn_time, thrust_to_weight)).min(MAX_GRAVITY_LOSS_FACTOR);
    }

    if propellant > HIGH_PROPELLANT_RATIO * dry_mass_kg {
        warn!(
            propellant_kg = propellant,
            dry_mass_kg, "propellant load exceeds ten times the dry mass"
        );
    }
    if burn_time > LONG_BURN_S {
        warn!(burn_time_s = burn_time, "burn longer than one hour");
    }

    Ok(FuelPlan {
        mass_ratio,
        propellant_mass_kg: propellant,
        specific_impulse_s: isp_s,
        burn_time_s: burn_time,
        dry_mass_kg,
    })
}

/// Fractional gravity loss for a burn of `burn_time_s` at the given thrust-to-weight ratio.
pub fn gravity_loss(burn_time_s: f64, thrust_to_weight: f64) -> f64 {
    if burn_time_s < GRAVITY_LOSS_MIN_BURN_S {
        return 0.0;
    }
    let duration_factor = (burn_time_s / GRAVITY_LOSS_REFERENCE_BURN_S).min(1.0);
    0.05 * duration_factor * (1.0 / thrust_to_weight).max(0.1)
}

/// Propellant budget for `vehicle` delivering `delta_v_km_s`.
pub fn plan_fuel(vehicle: &Vehicle, delta_v_km_s: f64) -> Result<FuelPlan, FuelError> {
    calculate(
        delta_v_km_s,
        vehicle.dry_mass_kg,
        vehicle.isp_seconds,
        vehicle.thrust_to_weight,
    )
}
