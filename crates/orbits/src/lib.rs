//! Two-body speed and timing helpers, and the patched-conic Earth-Moon model.

pub mod earth_moon;

pub use earth_moon::{
    EarthMoonBiElliptic, EarthMoonSystem, EarthMoonTransfer, PatchedConicDetails,
    earth_moon_bi_elliptic, earth_moon_transfer,
};

/// Circular orbital speed at radius `r_km`.
pub fn circular_speed(mu_km3_s2: f64, r_km: f64) -> f64 {
    (mu_km3_s2 / r_km).sqrt()
}

/// Speed at radius `r_km` on a conic of specific energy `energy_km2_s2` (vis-viva).
pub fn vis_viva_speed(mu_km3_s2: f64, r_km: f64, energy_km2_s2: f64) -> f64 {
    (2.0 * (energy_km2_s2 + mu_km3_s2 / r_km)).max(0.0).sqrt()
}

/// Laplace sphere-of-influence radius of a secondary at `distance_km` from its primary.
pub fn sphere_of_influence(distance_km: f64, mu_secondary: f64, mu_primary: f64) -> f64 {
    distance_km * (mu_secondary / mu_primary).powf(0.4)
}

/// Hyperbola-to-circle burn at `parking_radius_km` for an approach with excess speed `vinf_km_s`.
pub fn capture_delta_v(mu_km3_s2: f64, parking_radius_km: f64, vinf_km_s: f64) -> f64 {
    let periapsis_speed = (vinf_km_s * vinf_km_s + 2.0 * mu_km3_s2 / parking_radius_km).sqrt();
    (periapsis_speed - circular_speed(mu_km3_s2, parking_radius_km)).max(0.0)
}

/// Radial and transverse speed at radius `r_km` on the outbound half of an ellipse, from its
/// shape alone (`r = p / (1 + e cos ν)`).
pub fn ellipse_speed_components(
    mu_km3_s2: f64,
    semi_latus_rectum_km: f64,
    eccentricity: f64,
    r_km: f64,
) -> (f64, f64) {
    let h_over_p = (mu_km3_s2 / semi_latus_rectum_km).sqrt();
    let cos_nu = if eccentricity > f64::EPSILON {
        ((semi_latus_rectum_km / r_km - 1.0) / eccentricity).clamp(-1.0, 1.0)
    } else {
        1.0
    };
    let sin_nu = (1.0 - cos_nu * cos_nu).max(0.0).sqrt();
    let radial = h_over_p * eccentricity * sin_nu;
    let transverse = (mu_km3_s2 * semi_latus_rectum_km).sqrt() / r_km;
    (radial, transverse)
}

/// Time of flight (s) from periapsis to radius `r_km` on an ellipse, via Kepler's equation.
pub fn elliptic_time_from_periapsis(
    mu_km3_s2: f64,
    semi_major_axis_km: f64,
    eccentricity: f64,
    r_km: f64,
) -> f64 {
    if eccentricity <= f64::EPSILON {
        return 0.0;
    }
    let cos_e = ((1.0 - r_km / semi_major_axis_km) / eccentricity).clamp(-1.0, 1.0);
    let ecc_anomaly = cos_e.acos();
    let mean_anomaly = ecc_anomaly - eccentricity * ecc_anomaly.sin();
    mean_anomaly * (semi_major_axis_km.powi(3) / mu_km3_s2).sqrt()
}

/// Time of flight (s) between radius `r_km` and periapsis `periapsis_km` on the hyperbola
/// defined by the excess speed `vinf_km_s`.
///
/// Falls back to Barker's equation for the parabolic limit `v∞ → 0`.
pub fn hyperbolic_time_from_periapsis(
    mu_km3_s2: f64,
    periapsis_km: f64,
    vinf_km_s: f64,
    r_km: f64,
) -> f64 {
    if r_km <= periapsis_km {
        return 0.0;
    }
    let v2 = vinf_km_s * vinf_km_s;
    if vinf_km_s < 1e-6 {
        let p = 2.0 * periapsis_km;
        let d = (r_km / periapsis_km - 1.0).sqrt();
        return 0.5 * (p.powi(3) / mu_km3_s2).sqrt() * (d + d.powi(3) / 3.0);
    }
    let a_abs = mu_km3_s2 / v2;
    let eccentricity = 1.0 + periapsis_km * v2 / mu_km3_s2;
    let cosh_f = (1.0 + r_km * v2 / mu_km3_s2) / eccentricity;
    let f = (cosh_f + (cosh_f * cosh_f - 1.0).max(0.0).sqrt()).ln();
    let mean_anomaly = eccentricity * f.sinh() - f;
    mean_anomaly * (a_abs.powi(3) / mu_km3_s2).sqrt()
}
