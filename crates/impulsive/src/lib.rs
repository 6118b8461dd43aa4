//! Impulsive transfer utilities: Lambert solver and classical transfer approximations.

pub mod lambert;
pub mod transfers;

pub use lambert::{
    Direction, LagrangeCoefficients, LambertError, LambertSolution, solve as lambert_solve,
};
pub use transfers::{BiEllipticResult, TransferResult};
