use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::vector::Vector3;

/// Classical elements of one conic arc. Angles in radians; the planar model leaves them at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub right_ascension: f64,
    pub arg_of_perigee: f64,
    pub true_anomaly: f64,
}

impl OrbitalElements {
    /// Coplanar ellipse with the given periapsis and apoapsis radii (km).
    pub fn planar_ellipse(periapsis_km: f64, apoapsis_km: f64) -> Self {
        let (lo, hi) = if periapsis_km <= apoapsis_km {
            (periapsis_km, apoapsis_km)
        } else {
            (apoapsis_km, periapsis_km)
        };
        Self {
            semi_major_axis: 0.5 * (lo + hi),
            eccentricity: (hi - lo) / (hi + lo),
            ..Self::default()
        }
    }

    /// Osculating elements of the state `(r, v)` about a body with parameter `mu`.
    ///
    /// Angles that are undefined (equatorial or rectilinear orbits) are reported as zero.
    pub fn from_state(r: Vector3, v: Vector3, mu_km3_s2: f64) -> Self {
        let r_mag = r.norm();
        let v_mag = v.norm();
        let h = r.cross(&v);
        let h_mag = h.norm();

        let energy = 0.5 * v_mag * v_mag - mu_km3_s2 / r_mag;
        let semi_major_axis = -mu_km3_s2 / (2.0 * energy);
        let e_vec = (r * (v_mag * v_mag - mu_km3_s2 / r_mag) - v * r.dot(&v)) * (1.0 / mu_km3_s2);
        let eccentricity = e_vec.norm();

        let tiny = 1e-12 * r_mag.max(1.0) * v_mag.max(1.0);
        let inclination = if h_mag > tiny {
            (h.z / h_mag).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        let node = Vector3::new(-h.y, h.x, 0.0);
        let node_mag = node.norm();
        let right_ascension = if node_mag > tiny {
            node.y.atan2(node.x).rem_euclid(TAU)
        } else {
            0.0
        };
        let arg_of_perigee = if eccentricity > 1e-12 {
            if node_mag > tiny {
                let cos_w = node.dot(&e_vec) / (node_mag * eccentricity);
                let w = cos_w.clamp(-1.0, 1.0).acos();
                if e_vec.z < 0.0 { TAU - w } else { w }
            } else {
                e_vec.y.atan2(e_vec.x).rem_euclid(TAU)
            }
        } else {
            0.0
        };
        let true_anomaly = if eccentricity > 1e-12 {
            let cos_nu = e_vec.dot(&r) / (eccentricity * r_mag);
            let nu = cos_nu.clamp(-1.0, 1.0).acos();
            if r.dot(&v) < 0.0 { TAU - nu } else { nu }
        } else {
            0.0
        };

        Self {
            semi_major_axis,
            eccentricity,
            inclination,
            right_ascension,
            arg_of_perigee,
            true_anomaly,
        }
    }

    /// Semi-latus rectum `a(1 - e²)`.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Orbital period (s) for a bound orbit about a body with gravitational parameter `mu`.
    pub fn period_seconds(&self, mu_km3_s2: f64) -> Option<f64> {
        (self.semi_major_axis > 0.0 && self.eccentricity < 1.0).then(|| {
            2.0 * PI * (self.semi_major_axis.powi(3) / mu_km3_s2).sqrt()
        })
    }
}
