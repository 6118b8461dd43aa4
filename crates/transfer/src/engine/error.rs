use lunar_config::ConfigError;
use lunar_core::UnitError;
use lunar_impulsive::LambertError;
use lunar_propulsion::FuelError;
use thiserror::Error;

/// Top-level engine error aggregating every crate's failure modes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error("Lambert solve failed: {0}")]
    Lambert(#[from] LambertError),
    #[error("fuel optimisation failed: {0}")]
    Fuel(#[from] FuelError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Coarse classification used by callers to map failures onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    DegenerateGeometry,
    ImpossibleGeometry,
    TimeTooShort,
    DidNotConverge,
    InvalidOrbit,
    SingularSolution,
    NotImplemented,
    InvalidMassRatio,
    NegativePropellant,
}

impl ErrorKind {
    /// True when the request itself was at fault (HTTP 400); false for numerical failures.
    ///
    /// `InvalidOrbit` counts as the caller's: a Lambert flight time faster than the parabolic
    /// transfer has no elliptic solution.
    pub fn is_caller_error(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidInput
                | ErrorKind::DegenerateGeometry
                | ErrorKind::ImpossibleGeometry
                | ErrorKind::TimeTooShort
                | ErrorKind::InvalidOrbit
                | ErrorKind::NotImplemented
        )
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Unit(_) | EngineError::Config(_) | EngineError::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            EngineError::Lambert(err) => match err {
                LambertError::InvalidInput(_) => ErrorKind::InvalidInput,
                LambertError::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
                LambertError::ImpossibleGeometry { .. } => ErrorKind::ImpossibleGeometry,
                LambertError::TimeTooShort { .. } => ErrorKind::TimeTooShort,
                LambertError::DidNotConverge { .. } => ErrorKind::DidNotConverge,
                LambertError::InvalidOrbit { .. } => ErrorKind::InvalidOrbit,
                LambertError::SingularSolution { .. } => ErrorKind::SingularSolution,
                LambertError::NotImplemented(_) => ErrorKind::NotImplemented,
            },
            EngineError::Fuel(err) => match err {
                FuelError::Unit(_) | FuelError::InvalidThrustToWeight(_) => {
                    ErrorKind::InvalidInput
                }
                FuelError::InvalidMassRatio(_) => ErrorKind::InvalidMassRatio,
                FuelError::NegativePropellant(_) => ErrorKind::NegativePropellant,
            },
        }
    }
}
