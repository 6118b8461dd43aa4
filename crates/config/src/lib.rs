//! Configuration models and loaders for the lunar transfer engine.

use std::fs::{self, File};
use std::path::Path;

use lunar_core::constants::{
    EARTH_MOON_DISTANCE_KM, EARTH_PARKING_ALTITUDE_KM, EARTH_RADIUS_KM, MOON_PARKING_ALTITUDE_KM,
    MOON_RADIUS_KM, MU_EARTH, MU_MOON, SPACECRAFT_DRY_MASS_KG, SPECIFIC_IMPULSE_S,
    THRUST_TO_WEIGHT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest trajectory points a record may request.
pub const MIN_TRAJECTORY_SAMPLES: usize = 5;

/// Gravitating body entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    pub default_parking_altitude_km: f64,
}

impl BodyConfig {
    pub fn parking_radius_km(&self) -> f64 {
        self.radius_km + self.default_parking_altitude_km
    }
}

/// Vehicle entry used for propellant budgeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub name: String,
    pub dry_mass_kg: f64,
    pub isp_seconds: f64,
    pub thrust_to_weight: f64,
}

/// Full engine configuration. Missing keys fall back to the built-in Earth-Moon defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub earth_moon_distance_km: f64,
    pub trajectory_samples: usize,
    pub bi_elliptic_apoapsis_factor: f64,
    pub earth: BodyConfig,
    pub moon: BodyConfig,
    pub vehicle: VehicleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            earth: BodyConfig {
                name: "Earth".to_string(),
                mu_km3_s2: MU_EARTH,
                radius_km: EARTH_RADIUS_KM,
                default_parking_altitude_km: EARTH_PARKING_ALTITUDE_KM,
            },
            moon: BodyConfig {
                name: "Moon".to_string(),
                mu_km3_s2: MU_MOON,
                radius_km: MOON_RADIUS_KM,
                default_parking_altitude_km: MOON_PARKING_ALTITUDE_KM,
            },
            earth_moon_distance_km: EARTH_MOON_DISTANCE_KM,
            vehicle: VehicleConfig {
                name: "Lunar Transfer Vehicle".to_string(),
                dry_mass_kg: SPACECRAFT_DRY_MASS_KG,
                isp_seconds: SPECIFIC_IMPULSE_S,
                thrust_to_weight: THRUST_TO_WEIGHT,
            },
            trajectory_samples: 100,
            bi_elliptic_apoapsis_factor: 2.5,
        }
    }
}

impl EngineConfig {
    /// Reject non-physical values before the engine sees them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for body in [&self.earth, &self.moon] {
            positive(&format!("{}.mu_km3_s2", body.name), body.mu_km3_s2)?;
            positive(&format!("{}.radius_km", body.name), body.radius_km)?;
            positive(
                &format!("{}.default_parking_altitude_km", body.name),
                body.default_parking_altitude_km,
            )?;
        }
        positive("earth_moon_distance_km", self.earth_moon_distance_km)?;
        positive("vehicle.dry_mass_kg", self.vehicle.dry_mass_kg)?;
        positive("vehicle.isp_seconds", self.vehicle.isp_seconds)?;
        positive("vehicle.thrust_to_weight", self.vehicle.thrust_to_weight)?;
        if self.trajectory_samples < MIN_TRAJECTORY_SAMPLES {
            return Err(ConfigError::Invalid(format!(
                "trajectory_samples must be at least {MIN_TRAJECTORY_SAMPLES}, got {}",
                self.trajectory_samples
            )));
        }
        if !(self.bi_elliptic_apoapsis_factor.is_finite() && self.bi_elliptic_apoapsis_factor > 1.0)
        {
            return Err(ConfigError::Invalid(format!(
                "bi_elliptic_apoapsis_factor must exceed 1, got {}",
                self.bi_elliptic_apoapsis_factor
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Errors that can occur while loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to serialise TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load and validate an engine configuration (YAML, or TOML for `.toml` files).
pub fn load_engine_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = load_document(path)?;
    config.validate()?;
    Ok(config)
}

/// Write an engine configuration as YAML, or TOML for `.toml` files.
pub fn save_engine_config<P: AsRef<Path>>(
    path: P,
    config: &EngineConfig,
) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if is_toml(path) {
        fs::write(path, toml::to_string_pretty(config)?)?;
    } else {
        serde_yaml::to_writer(File::create(path)?, config)?;
    }
    Ok(())
}

fn load_document<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
