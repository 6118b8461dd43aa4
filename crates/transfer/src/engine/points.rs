//! Trajectory point generation for display.
//!
//! Patched-conic points are illustrative only: the Earth phase follows the translunar ellipse
//! up to the SOI boundary, the lunar phase is a straight approach with a small lateral bow. None
//! of these points feed back into the physics.

use std::f64::consts::PI;

use lunar_core::Vector3;
use lunar_core::OrbitalElements;
use lunar_impulsive::{BiEllipticResult, LambertSolution};
use lunar_orbits::EarthMoonSystem;

/// Share of samples spent on the Earth phase of a patched-conic trajectory.
pub const EARTH_PHASE_FRACTION: f64 = 0.8;
/// Lateral bow of the lunar approach as a fraction of the SOI radius.
pub const LUNAR_APPROACH_BOW: f64 = 0.1;

/// Patched-conic display points: `samples + 1` positions from the parking orbit to the Moon.
pub fn patched_conic_points(system: &EarthMoonSystem, samples: usize) -> Vec<Vector3> {
    let samples = samples.max(2);
    let earth_segments =
        ((samples as f64 * EARTH_PHASE_FRACTION).round() as usize).clamp(1, samples - 1);
    let lunar_segments = samples - earth_segments;

    let r_park = system.earth_parking_radius_km();
    let r_boundary = system.soi_boundary_radius_km();
    let distance = system.earth_moon_distance_km;
    let r_soi = system.sphere_of_influence_km();

    // Ellipse with perigee at the parking orbit and apogee at the SOI boundary.
    let eccentricity = (r_boundary - r_park) / (r_boundary + r_park);
    let semi_latus = r_park * (1.0 + eccentricity);

    let mut points = Vec::with_capacity(samples + 1);
    for k in 0..=earth_segments {
        let theta = PI * k as f64 / earth_segments as f64;
        let r = semi_latus / (1.0 + eccentricity * theta.cos());
        points.push(Vector3::new(r * theta.cos(), r * theta.sin(), 0.0));
    }

    // Apogee lies on the -x axis; approach the Moon along it.
    for k in 1..=lunar_segments {
        let t = k as f64 / lunar_segments as f64;
        let along = r_boundary + t * (distance - r_boundary);
        let lateral = (t * PI).sin() * r_soi * LUNAR_APPROACH_BOW;
        points.push(Vector3::new(-along, lateral, 0.0));
    }
    points
}

/// Bi-elliptic display points: `samples + 1` positions over both transfer ellipses.
///
/// Both ellipses have their perigee on +x and share the apoapsis `rb` on -x; the second half
/// ends at the Moon's distance back on +x.
pub fn bi_elliptic_points(route: &BiEllipticResult, samples: usize) -> Vec<Vector3> {
    let samples = samples.max(2);
    let first_segments = samples / 2;
    let second_segments = samples - first_segments;

    let mut points = Vec::with_capacity(samples + 1);
    points.extend(ellipse_arc(&route.first_orbit, 0.0, PI, first_segments, true));
    points.extend(ellipse_arc(&route.second_orbit, PI, 2.0 * PI, second_segments, false));
    points
}

// Positions at true anomalies evenly spaced over [from, to] on a perigee-on-+x ellipse.
fn ellipse_arc(
    orbit: &OrbitalElements,
    from: f64,
    to: f64,
    segments: usize,
    include_start: bool,
) -> impl Iterator<Item = Vector3> + '_ {
    let first = if include_start { 0 } else { 1 };
    (first..=segments).map(move |k| {
        let theta = from + (to - from) * k as f64 / segments as f64;
        let r = orbit.semi_latus_rectum() / (1.0 + orbit.eccentricity * theta.cos());
        Vector3::new(r * theta.cos(), r * theta.sin(), 0.0)
    })
}

/// Points along the solved Lambert conic.
pub fn lambert_points(solution: &LambertSolution, r1: Vector3, samples: usize) -> Vec<Vector3> {
    solution.arc_points(r1, samples)
}
