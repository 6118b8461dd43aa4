//! Closed-form impulsive transfers between circular, coplanar orbits.
//!
//! Both estimators return burn magnitudes in km/s and the conic arcs flown between burns, so the
//! Earth-Moon models can attach the transfer ellipses to a trajectory record.

use std::f64::consts::PI;

use lunar_core::OrbitalElements;
use lunar_core::units::{UnitError, require_positive, seconds_to_hours};
use serde::Serialize;

/// Two-burn Hohmann transfer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    /// Departure burn magnitude (km/s).
    #[serde(rename = "deltaV1")]
    pub delta_v1_km_s: f64,
    /// Circularisation burn magnitude (km/s).
    #[serde(rename = "deltaV2")]
    pub delta_v2_km_s: f64,
    pub transfer_time_hours: f64,
    pub transfer_orbit: OrbitalElements,
}

impl TransferResult {
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.delta_v1_km_s + self.delta_v2_km_s
    }
}

/// Three-burn transfer through an intermediate apoapsis `rb`.
///
/// Burns are signed along the local velocity: a negative `dv3` is a retrograde capture burn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiEllipticResult {
    pub rb_km: f64,
    pub dv1_km_s: f64,
    pub dv2_km_s: f64,
    pub dv3_km_s: f64,
    pub dv_total_km_s: f64,
    pub tof_seconds: f64,
    pub first_orbit: OrbitalElements,
    pub second_orbit: OrbitalElements,
}

/// Speed on a conic with semi-major axis `a` at radius `r`.
fn vis_viva(mu: f64, r: f64, a: f64) -> f64 {
    (mu * (2.0 / r - 1.0 / a)).sqrt()
}

/// Time to fly half of the ellipse joining radii `ra` and `rb`.
fn half_period(mu: f64, ra: f64, rb: f64) -> f64 {
    let a = 0.5 * (ra + rb);
    PI * (a.powi(3) / mu).sqrt()
}

/// Hohmann transfer from a circular orbit of radius `r1_km` to one of radius `r2_km`.
///
/// Works inward as well as outward; the burns are reported as magnitudes.
pub fn hohmann(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> Result<TransferResult, UnitError> {
    let r1 = require_positive("initial radius", r1_km)?;
    let r2 = require_positive("target radius", r2_km)?;
    let mu = require_positive("gravitational parameter", mu_km3_s2)?;

    let a = 0.5 * (r1 + r2);
    let departure = vis_viva(mu, r1, a) - vis_viva(mu, r1, r1);
    let arrival = vis_viva(mu, r2, r2) - vis_viva(mu, r2, a);

    Ok(TransferResult {
        delta_v1_km_s: departure.abs(),
        delta_v2_km_s: arrival.abs(),
        transfer_time_hours: seconds_to_hours(half_period(mu, r1, r2))?,
        transfer_orbit: OrbitalElements::planar_ellipse(r1, r2),
    })
}

/// Bi-elliptic transfer for a caller-chosen intermediate apoapsis `rb_km`.
///
/// `rb_km` is not optimised. Above a radius ratio of about 11.94 a large enough `rb` beats the
/// Hohmann transfer; below it the extra burn always costs more.
pub fn bi_elliptic(
    r1_km: f64,
    r2_km: f64,
    rb_km: f64,
    mu_km3_s2: f64,
) -> Result<BiEllipticResult, UnitError> {
    let r1 = require_positive("initial radius", r1_km)?;
    let r2 = require_positive("target radius", r2_km)?;
    let rb = require_positive("intermediate apoapsis", rb_km)?;
    let mu = require_positive("gravitational parameter", mu_km3_s2)?;

    let a_out = 0.5 * (r1 + rb);
    let a_in = 0.5 * (rb + r2);

    let dv1 = vis_viva(mu, r1, a_out) - vis_viva(mu, r1, r1);
    let dv2 = vis_viva(mu, rb, a_in) - vis_viva(mu, rb, a_out);
    let dv3 = vis_viva(mu, r2, r2) - vis_viva(mu, r2, a_in);

    Ok(BiEllipticResult {
        rb_km: rb,
        dv1_km_s: dv1,
        dv2_km_s: dv2,
        dv3_km_s: dv3,
        dv_total_km_s: dv1.abs() + dv2.abs() + dv3.abs(),
        tof_seconds: half_period(mu, r1, rb) + half_period(mu, rb, r2),
        first_orbit: OrbitalElements::planar_ellipse(r1, rb),
        second_orbit: OrbitalElements::planar_ellipse(rb, r2),
    })
}
