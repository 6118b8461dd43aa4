//! Re-exported APIs for consumers of the transfer crate.

pub use crate::engine::error::{EngineError, ErrorKind};
pub use crate::engine::trade::{
    SafetyAssessment, SkippedAlternative, TradeOption, TradeStudy, TradeWeights, assess_safety,
};
pub use crate::engine::{
    Calculations, TrajectoryEngine, TrajectoryRecord, TransferRequest, TransferType,
    compute_transfer, parse_launch_date,
};
pub use lunar_propulsion::{FuelPlan, Vehicle};

pub mod vehicle {
    use lunar_config::VehicleConfig;
    use lunar_propulsion::Vehicle;

    /// Convert a `VehicleConfig` into runtime `Vehicle` representation.
    pub fn from_config(config: &VehicleConfig) -> Vehicle {
        Vehicle {
            name: config.name.clone(),
            dry_mass_kg: config.dry_mass_kg,
            isp_seconds: config.isp_seconds,
            thrust_to_weight: config.thrust_to_weight,
        }
    }
}
