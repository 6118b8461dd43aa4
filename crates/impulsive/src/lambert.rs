//! Single-revolution Lambert solver following Izzo's formulation.
//!
//! The boundary-value problem is reduced to a single universal variable `x` on the normalised
//! time-of-flight curve `T(x, λ)`, solved with a Householder (third-order) iteration.
//! Velocities are recovered through Lagrange coefficients expressed in the eccentric-anomaly
//! difference of the transfer ellipse.
//!
//! Reference: D. Izzo, "Revisiting Lambert's problem", Celestial Mechanics and Dynamical
//! Astronomy 121 (2015).

use std::f64::consts::TAU;

use lunar_core::Vector3;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Convergence threshold on the normalised time residual, relative to `max(T, 1)`.
pub const TOLERANCE: f64 = 1e-14;
/// Iteration budget for the Householder root finder.
pub const MAX_ITERATIONS: usize = 30;
/// Central-difference step used for the second derivative of the time equation.
pub const SECOND_DERIVATIVE_STEP: f64 = 1e-8;
/// Largest change of `x` allowed in one iteration.
pub const MAX_STEP: f64 = 0.5;
/// Lower bound of the universal variable (exclusive; the time equation is singular there).
pub const X_MIN: f64 = -1.0;
/// Upper bound of the universal variable.
pub const X_MAX: f64 = 50.0;

// Residual accepted once the iterate stops moving at floating-point resolution.
const STALLED_TOLERANCE: f64 = 1e-11;
const MIN_MAGNITUDE_KM: f64 = 1e-6;
// |g| below this fraction of the flight time is rounding noise.
const SINGULAR_G: f64 = 1e-15;
// |r1 × r2| / (|r1||r2|) below which the positions are treated as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-12;
const DETERMINANT_TOLERANCE: f64 = 1e-10;
// sqrt(0.6) .. sqrt(1.4): near-parabolic window evaluated with Battin's series.
const BATTIN_LOWER: f64 = 0.774_596_669_241_483_4;
const BATTIN_UPPER: f64 = 1.183_215_956_619_923_2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LambertError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("degenerate Lambert geometry: {0}")]
    DegenerateGeometry(String),
    #[error("impossible Lambert geometry: |lambda| = {lambda:.6} >= 1")]
    ImpossibleGeometry { lambda: f64 },
    #[error(
        "time of flight too short: normalised {given:.6e} below the minimum {minimum:.6e}"
    )]
    TimeTooShort { minimum: f64, given: f64 },
    #[error("Izzo solver did not converge after {iterations} iterations (residual {residual:.3e})")]
    DidNotConverge { iterations: usize, residual: f64 },
    #[error("invalid transfer orbit: semi-major axis {semi_major_axis_km:.3} km")]
    InvalidOrbit { semi_major_axis_km: f64 },
    #[error("singular Lambert solution: g coefficient {g:.3e} too small")]
    SingularSolution { g: f64 },
    #[error("{0} not implemented")]
    NotImplemented(String),
}

/// Sense of motion along the transfer arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Prograde,
    Retrograde,
}

/// Lagrange coefficients mapping the departure state onto the arrival state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LagrangeCoefficients {
    pub f: f64,
    pub g: f64,
    pub f_dot: f64,
    pub g_dot: f64,
}

impl LagrangeCoefficients {
    /// `f·ġ − ḟ·g`, identically one for an exact two-body solution.
    pub fn determinant(&self) -> f64 {
        self.f * self.g_dot - self.f_dot * self.g
    }
}

/// Departure and arrival velocities of a solved transfer, plus the conic that connects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LambertSolution {
    pub velocity_departure: Vector3,
    pub velocity_arrival: Vector3,
    pub solution_type: Direction,
    pub iterations: usize,
    pub x: f64,
    pub lambda: f64,
    pub semi_major_axis: f64,
    pub delta_eccentric_anomaly: f64,
    pub mu_km3_s2: f64,
    pub lagrange: LagrangeCoefficients,
}

impl LambertSolution {
    /// Positions along the solved conic from `r1` (inclusive) to the arrival point (inclusive),
    /// evenly spaced in eccentric anomaly.
    pub fn arc_points(&self, r1: Vector3, samples: usize) -> Vec<Vector3> {
        let samples = samples.max(1);
        let r1_mag = r1.norm();
        let a = self.semi_major_axis;
        let sqrt_mu = self.mu_km3_s2.sqrt();
        let sigma = r1.dot(&self.velocity_departure) / sqrt_mu;

        (0..=samples)
            .map(|i| {
                let de = self.delta_eccentric_anomaly * i as f64 / samples as f64;
                let one_minus_cos = 2.0 * (0.5 * de).sin().powi(2);
                let f = 1.0 - a / r1_mag * one_minus_cos;
                let g = a * sigma / sqrt_mu * one_minus_cos
                    + r1_mag * (a / self.mu_km3_s2).sqrt() * de.sin();
                r1 * f + self.velocity_departure * g
            })
            .collect()
    }
}

/// Solve Lambert's problem for a single revolution.
///
/// Inputs:
/// - `r1`, `r2`: departure and arrival positions (km)
/// - `time_of_flight_s`: transfer duration (s)
/// - `mu_km3_s2`: gravitational parameter of the central body (km^3/s^2)
/// - `direction`: prograde keeps the short-way angle, retrograde takes `2π − Δν`
/// - `revolutions`: must be zero; multi-revolution transfers are not supported
pub fn solve(
    r1: Vector3,
    r2: Vector3,
    time_of_flight_s: f64,
    mu_km3_s2: f64,
    direction: Direction,
    revolutions: u32,
) -> Result<LambertSolution, LambertError> {
    let r1_mag = r1.norm();
    let r2_mag = r2.norm();
    if !(r1_mag >= MIN_MAGNITUDE_KM && r2_mag >= MIN_MAGNITUDE_KM) {
        return Err(LambertError::DegenerateGeometry(
            "position magnitudes too small".to_string(),
        ));
    }
    if !(time_of_flight_s.is_finite() && time_of_flight_s > 0.0) {
        return Err(LambertError::InvalidInput(format!(
            "time of flight must be positive, got {time_of_flight_s}"
        )));
    }
    if !(mu_km3_s2.is_finite() && mu_km3_s2 > 0.0) {
        return Err(LambertError::InvalidInput(format!(
            "gravitational parameter must be positive, got {mu_km3_s2}"
        )));
    }
    if revolutions > 0 {
        return Err(LambertError::NotImplemented(
            "multi-revolution Lambert transfer".to_string(),
        ));
    }

    let chord = (r2 - r1).norm();
    if chord < MIN_MAGNITUDE_KM {
        return Err(LambertError::DegenerateGeometry(
            "positions too close".to_string(),
        ));
    }
    let s = 0.5 * (r1_mag + r2_mag + chord);

    let mut transfer_angle = r1.cross(&r2).norm().atan2(r1.dot(&r2));
    if direction == Direction::Retrograde {
        transfer_angle = TAU - transfer_angle;
    }

    let lambda = (r1_mag * r2_mag).sqrt() * (0.5 * transfer_angle).cos() / s;
    if lambda.abs() >= 1.0 {
        return Err(LambertError::ImpossibleGeometry { lambda });
    }

    let t_nondim = (2.0 * mu_km3_s2 / s.powi(3)).sqrt() * time_of_flight_s;
    let t_min = minimum_energy_time(lambda);
    if t_nondim < t_min {
        return Err(LambertError::TimeTooShort {
            minimum: t_min,
            given: t_nondim,
        });
    }

    let (x, iterations) = householder(lambda, t_nondim)?;

    let a = s / (2.0 * (1.0 - x * x));
    if !(a.is_finite() && a > 0.0) {
        return Err(LambertError::InvalidOrbit {
            semi_major_axis_km: a,
        });
    }

    // ψ is half the eccentric-anomaly difference of the transfer ellipse.
    let y = compute_y(x, lambda);
    let psi = (x * y + lambda * (1.0 - x * x)).clamp(-1.0, 1.0).acos();
    let delta_e = 2.0 * psi;
    let lagrange = lagrange_coefficients(a, delta_e, r1_mag, r2_mag, time_of_flight_s, mu_km3_s2);

    // Opposite positions leave the transfer plane undefined.
    let half_turn = r1.dot(&r2) < 0.0
        && r1.cross(&r2).norm() <= COLLINEAR_TOLERANCE * r1_mag * r2_mag;
    if half_turn
        || !lagrange.g.is_finite()
        || lagrange.g.abs() < SINGULAR_G * time_of_flight_s.max(1.0)
    {
        return Err(LambertError::SingularSolution { g: lagrange.g });
    }

    let drift = (lagrange.determinant() - 1.0).abs();
    if drift > DETERMINANT_TOLERANCE {
        warn!(drift, "Lagrange coefficient determinant drifted from unity");
    }

    let velocity_departure = (r2 - r1 * lagrange.f) * (1.0 / lagrange.g);
    let velocity_arrival = r1 * lagrange.f_dot + velocity_departure * lagrange.g_dot;

    debug!(
        lambda,
        x,
        iterations,
        semi_major_axis_km = a,
        "lambert transfer solved"
    );

    Ok(LambertSolution {
        velocity_departure,
        velocity_arrival,
        solution_type: direction,
        iterations,
        x,
        lambda,
        semi_major_axis: a,
        delta_eccentric_anomaly: delta_e,
        mu_km3_s2,
        lagrange,
    })
}

/// Lower bound on the normalised single-revolution time of flight for a given `λ`.
pub fn minimum_energy_time(lambda: f64) -> f64 {
    (1.0 - lambda.powi(3)) / 3.0
}

/// Normalised time of flight `T(x, λ)` for a single revolution.
pub fn normalized_time_of_flight(x: f64, lambda: f64) -> f64 {
    time_of_flight(x, compute_y(x, lambda), lambda)
}

fn householder(lambda: f64, target: f64) -> Result<(f64, usize), LambertError> {
    let mut x = initial_guess(lambda, target);
    let mut residual = f64::INFINITY;
    let scale = target.max(1.0);

    for iteration in 0..MAX_ITERATIONS {
        let y = compute_y(x, lambda);
        let t = time_of_flight(x, y, lambda);
        residual = t - target;
        if residual.abs() < TOLERANCE * scale {
            return Ok((x, iteration));
        }

        let dt = time_derivative(x, y, t, lambda);
        let d2t = time_second_derivative(x, lambda);
        let denominator = dt - residual * d2t / (2.0 * dt);
        if !denominator.is_finite() || denominator.abs() < 1e-15 {
            return Err(LambertError::DidNotConverge {
                iterations: iteration,
                residual,
            });
        }

        let step = (-residual / denominator).clamp(-MAX_STEP, MAX_STEP);
        let mut next = (x + step).min(X_MAX);
        if next <= X_MIN {
            next = 0.5 * (x + X_MIN);
        }

        let stalled = (next - x).abs() <= f64::EPSILON * x.abs().max(1.0);
        if stalled && residual.abs() < STALLED_TOLERANCE * scale {
            return Ok((next, iteration + 1));
        }
        x = next;
    }

    Err(LambertError::DidNotConverge {
        iterations: MAX_ITERATIONS,
        residual,
    })
}

// Izzo's single-revolution seed, interpolated between T(x = 0) and the parabolic T(x = 1).
fn initial_guess(lambda: f64, t: f64) -> f64 {
    let t0 = lambda.acos() + lambda * (1.0 - lambda * lambda).sqrt();
    let t1 = 2.0 / 3.0 * (1.0 - lambda.powi(3));
    let x0 = if t >= t0 {
        (t0 / t).powf(2.0 / 3.0) - 1.0
    } else if t < t1 {
        2.5 * t1 / t * (t1 - t) / (1.0 - lambda.powi(5)) + 1.0
    } else {
        (t0 / t).powf((t1 / t0).log2()) - 1.0
    };
    x0.min(X_MAX)
}

fn compute_y(x: f64, lambda: f64) -> f64 {
    (1.0 - lambda * lambda * (1.0 - x * x)).sqrt()
}

fn compute_psi(x: f64, y: f64, lambda: f64) -> f64 {
    if x < 1.0 {
        (x * y + lambda * (1.0 - x * x)).clamp(-1.0, 1.0).acos()
    } else if x > 1.0 {
        ((y - x * lambda) * (x * x - 1.0).sqrt()).asinh()
    } else {
        0.0
    }
}

fn time_of_flight(x: f64, y: f64, lambda: f64) -> f64 {
    if x > BATTIN_LOWER && x < BATTIN_UPPER {
        let eta = y - lambda * x;
        let s1 = 0.5 * (1.0 - lambda - x * eta);
        let q = 4.0 / 3.0 * hypergeometric_2f1b(s1);
        0.5 * (eta.powi(3) * q + 4.0 * lambda * eta)
    } else {
        let psi = compute_psi(x, y, lambda);
        let one_minus_x2 = 1.0 - x * x;
        (psi / one_minus_x2.abs().sqrt() - x + lambda * y) / one_minus_x2
    }
}

fn time_derivative(x: f64, y: f64, t: f64, lambda: f64) -> f64 {
    (3.0 * t * x - 2.0 + 2.0 * lambda.powi(3) * x / y) / (1.0 - x * x)
}

fn time_second_derivative(x: f64, lambda: f64) -> f64 {
    let derivative_at = |xi: f64| {
        let yi = compute_y(xi, lambda);
        let ti = time_of_flight(xi, yi, lambda);
        time_derivative(xi, yi, ti, lambda)
    };
    let h = SECOND_DERIVATIVE_STEP;
    (derivative_at(x + h) - derivative_at(x - h)) / (2.0 * h)
}

/// Gauss hypergeometric function ₂F₁(3, 1; 5/2; z) by direct series summation.
fn hypergeometric_2f1b(z: f64) -> f64 {
    if z >= 1.0 {
        return f64::INFINITY;
    }
    let mut sum = 1.0;
    let mut term = 1.0;
    for i in 0..1_000 {
        let k = i as f64;
        term *= (3.0 + k) * (1.0 + k) / (2.5 + k) * z / (k + 1.0);
        let next = sum + term;
        if next == sum {
            break;
        }
        sum = next;
    }
    sum
}

fn lagrange_coefficients(
    a: f64,
    delta_e: f64,
    r1_mag: f64,
    r2_mag: f64,
    time_of_flight_s: f64,
    mu_km3_s2: f64,
) -> LagrangeCoefficients {
    let one_minus_cos = 2.0 * (0.5 * delta_e).sin().powi(2);
    let f = 1.0 - a / r1_mag * one_minus_cos;
    let g_dot = 1.0 - a / r2_mag * one_minus_cos;
    let g = time_of_flight_s - (a.powi(3) / mu_km3_s2).sqrt() * e_minus_sin_e(delta_e);
    let f_dot = -(mu_km3_s2 * a).sqrt() * delta_e.sin() / (r1_mag * r2_mag);
    LagrangeCoefficients { f, g, f_dot, g_dot }
}

// E − sin E without cancellation for small arcs.
fn e_minus_sin_e(e: f64) -> f64 {
    if e.abs() >= 0.5 {
        return e - e.sin();
    }
    let e2 = e * e;
    let mut term = e * e2 / 6.0;
    let mut sum = term;
    let mut k = 1.0;
    while term.abs() > f64::EPSILON * sum.abs() {
        term *= -e2 / ((2.0 * k + 2.0) * (2.0 * k + 3.0));
        sum += term;
        k += 1.0;
    }
    sum
}
