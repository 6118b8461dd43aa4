//! Patched-conic Earth→Moon transfers.
//!
//! The Earth leg is a translunar ellipse from the parking orbit; it is patched onto a lunar
//! hyperbola at the boundary of the Moon's sphere of influence, where the excess speed `v∞` is
//! the mismatch between the spacecraft velocity and the Moon's circular velocity. Capture is a
//! two-burn sequence: hyperbola → ellipse with apoapsis at the SOI radius → circular orbit.

use lunar_core::OrbitalElements;
use lunar_core::constants::{
    EARTH_MOON_DISTANCE_KM, EARTH_PARKING_ALTITUDE_KM, EARTH_RADIUS_KM, MOON_PARKING_ALTITUDE_KM,
    MOON_RADIUS_KM, MU_EARTH, MU_MOON,
};
use lunar_core::units::{UnitError, require_positive, seconds_to_hours};
use lunar_impulsive::transfers::{BiEllipticResult, TransferResult, bi_elliptic};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    capture_delta_v, circular_speed, elliptic_time_from_periapsis, ellipse_speed_components,
    hyperbolic_time_from_periapsis, sphere_of_influence, vis_viva_speed,
};

/// Relative tolerance on the specific-energy balance between the two ends of the Earth leg.
pub const ENERGY_BALANCE_TOLERANCE: f64 = 1e-6;
/// Intermediate apoapsis of the bi-elliptic route, as a multiple of the Earth-Moon distance.
pub const DEFAULT_BI_ELLIPTIC_FACTOR: f64 = 2.5;

/// Two-body parameters of the Earth-Moon pair and the parking orbits at either end.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthMoonSystem {
    pub mu_earth_km3_s2: f64,
    pub mu_moon_km3_s2: f64,
    pub earth_radius_km: f64,
    pub moon_radius_km: f64,
    pub earth_parking_altitude_km: f64,
    pub moon_parking_altitude_km: f64,
    pub earth_moon_distance_km: f64,
}

impl Default for EarthMoonSystem {
    fn default() -> Self {
        Self {
            mu_earth_km3_s2: MU_EARTH,
            mu_moon_km3_s2: MU_MOON,
            earth_radius_km: EARTH_RADIUS_KM,
            moon_radius_km: MOON_RADIUS_KM,
            earth_parking_altitude_km: EARTH_PARKING_ALTITUDE_KM,
            moon_parking_altitude_km: MOON_PARKING_ALTITUDE_KM,
            earth_moon_distance_km: EARTH_MOON_DISTANCE_KM,
        }
    }
}

impl EarthMoonSystem {
    pub fn earth_parking_radius_km(&self) -> f64 {
        self.earth_radius_km + self.earth_parking_altitude_km
    }

    pub fn moon_parking_radius_km(&self) -> f64 {
        self.moon_radius_km + self.moon_parking_altitude_km
    }

    /// Lunar sphere of influence `D·(μ_moon/μ_earth)^(2/5)`.
    pub fn sphere_of_influence_km(&self) -> f64 {
        sphere_of_influence(
            self.earth_moon_distance_km,
            self.mu_moon_km3_s2,
            self.mu_earth_km3_s2,
        )
    }

    /// Geocentric radius at which the Earth leg meets the lunar SOI.
    pub fn soi_boundary_radius_km(&self) -> f64 {
        self.earth_moon_distance_km - self.sphere_of_influence_km()
    }

    /// Moon's circular orbital speed about the Earth.
    pub fn moon_orbital_speed_km_s(&self) -> f64 {
        circular_speed(self.mu_earth_km3_s2, self.earth_moon_distance_km)
    }

    /// Circular speed in the Earth parking orbit.
    pub fn earth_parking_speed_km_s(&self) -> f64 {
        circular_speed(self.mu_earth_km3_s2, self.earth_parking_radius_km())
    }

    /// Circular speed in the lunar parking orbit.
    pub fn moon_parking_speed_km_s(&self) -> f64 {
        circular_speed(self.mu_moon_km3_s2, self.moon_parking_radius_km())
    }

    pub fn validate(&self) -> Result<(), UnitError> {
        require_positive("Earth gravitational parameter", self.mu_earth_km3_s2)?;
        require_positive("Moon gravitational parameter", self.mu_moon_km3_s2)?;
        require_positive("Earth radius", self.earth_radius_km)?;
        require_positive("Moon radius", self.moon_radius_km)?;
        require_positive("Earth parking altitude", self.earth_parking_altitude_km)?;
        require_positive("Moon parking altitude", self.moon_parking_altitude_km)?;
        require_positive("Earth-Moon distance", self.earth_moon_distance_km)?;
        if self.earth_parking_radius_km() >= self.soi_boundary_radius_km() {
            return Err(UnitError::InvalidInput(format!(
                "Earth parking radius {:.1} km lies outside the lunar SOI boundary {:.1} km",
                self.earth_parking_radius_km(),
                self.soi_boundary_radius_km()
            )));
        }
        if self.moon_parking_radius_km() >= self.sphere_of_influence_km() {
            return Err(UnitError::InvalidInput(format!(
                "lunar parking radius {:.1} km exceeds the sphere of influence {:.1} km",
                self.moon_parking_radius_km(),
                self.sphere_of_influence_km()
            )));
        }
        Ok(())
    }
}

/// Burn-by-burn breakdown of a patched-conic transfer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchedConicDetails {
    pub sphere_of_influence_km: f64,
    pub soi_boundary_radius_km: f64,
    pub departure_speed_km_s: f64,
    pub soi_arrival_speed_km_s: f64,
    pub v_infinity_km_s: f64,
    pub earth_escape_delta_v: f64,
    /// Apoapsis burn of the bi-elliptic route; zero for the direct route.
    pub midcourse_delta_v: f64,
    pub lunar_capture_delta_v: f64,
    pub lunar_insertion_delta_v: f64,
    pub total_delta_v: f64,
    pub earth_leg_hours: f64,
    pub lunar_leg_hours: f64,
    pub total_time_hours: f64,
    pub energy_balance_check: bool,
    pub energy_relative_error: f64,
}

/// Direct translunar transfer (Hohmann-like Earth leg plus lunar capture).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthMoonTransfer {
    /// Two-impulse summary: departure burn and the combined lunar capture/insertion.
    pub hohmann: TransferResult,
    pub details: PatchedConicDetails,
    pub orbital_elements: Vec<OrbitalElements>,
}

impl EarthMoonTransfer {
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.details.total_delta_v
    }

    pub fn transfer_time_hours(&self) -> f64 {
        self.details.total_time_hours
    }
}

/// Bi-elliptic Earth leg through an intermediate apoapsis beyond the Moon, plus lunar capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthMoonBiElliptic {
    pub bi_elliptic: BiEllipticResult,
    pub details: PatchedConicDetails,
    pub orbital_elements: Vec<OrbitalElements>,
}

impl EarthMoonBiElliptic {
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.details.total_delta_v
    }

    pub fn transfer_time_hours(&self) -> f64 {
        self.details.total_time_hours
    }
}

struct LunarCapture {
    capture_delta_v: f64,
    insertion_delta_v: f64,
    time_s: f64,
    orbit: OrbitalElements,
}

fn lunar_capture(system: &EarthMoonSystem, v_infinity: f64) -> LunarCapture {
    let mu = system.mu_moon_km3_s2;
    let r_mp = system.moon_parking_radius_km();
    let r_soi = system.sphere_of_influence_km();

    let total = capture_delta_v(mu, r_mp, v_infinity);
    let v_capture_orbit = (mu * (2.0 / r_mp - 2.0 / (r_soi + r_mp))).sqrt();
    let insertion = v_capture_orbit - system.moon_parking_speed_km_s();

    LunarCapture {
        capture_delta_v: total - insertion,
        insertion_delta_v: insertion,
        time_s: hyperbolic_time_from_periapsis(mu, r_mp, v_infinity, r_soi),
        orbit: OrbitalElements::planar_ellipse(r_mp, r_soi),
    }
}

/// Compare the specific energy of two states on the same leg.
///
/// Returns whether the relative mismatch is within [`ENERGY_BALANCE_TOLERANCE`], and the mismatch.
/// A failing balance is logged; callers report it rather than abort.
pub fn energy_balance(mu: f64, r_a: f64, v_a: f64, r_b: f64, v_b: f64) -> (bool, f64) {
    let e_a = 0.5 * v_a * v_a - mu / r_a;
    let e_b = 0.5 * v_b * v_b - mu / r_b;
    let relative = (e_a - e_b).abs() / e_a.abs();
    let ok = relative < ENERGY_BALANCE_TOLERANCE;
    if !ok {
        warn!(relative, "patched-conic energy balance check failed");
    }
    (ok, relative)
}

/// Direct patched-conic transfer from the Earth parking orbit into the lunar parking orbit.
pub fn earth_moon_transfer(system: &EarthMoonSystem) -> Result<EarthMoonTransfer, UnitError> {
    system.validate()?;
    let mu = system.mu_earth_km3_s2;
    let r_park = system.earth_parking_radius_km();
    let distance = system.earth_moon_distance_km;
    let r_soi = system.sphere_of_influence_km();
    let r_b = system.soi_boundary_radius_km();

    // Translunar ellipse: perigee at the parking orbit, apogee at the Moon's distance.
    let escape_orbit = OrbitalElements::planar_ellipse(r_park, distance);
    let energy = -mu / (r_park + distance);
    let v_departure = vis_viva_speed(mu, r_park, energy);
    let escape_dv = v_departure - system.earth_parking_speed_km_s();

    // Boundary state from the ellipse geometry, independent of the departure energy.
    let (v_radial, v_transverse) = ellipse_speed_components(
        mu,
        escape_orbit.semi_latus_rectum(),
        escape_orbit.eccentricity,
        r_b,
    );
    let v_boundary = v_radial.hypot(v_transverse);
    let v_infinity = v_radial.hypot(system.moon_orbital_speed_km_s() - v_transverse);

    let capture = lunar_capture(system, v_infinity);
    let earth_leg_s = elliptic_time_from_periapsis(
        mu,
        escape_orbit.semi_major_axis,
        escape_orbit.eccentricity,
        r_b,
    );
    let (energy_ok, energy_error) = energy_balance(mu, r_park, v_departure, r_b, v_boundary);

    let earth_leg_hours = seconds_to_hours(earth_leg_s)?;
    let lunar_leg_hours = seconds_to_hours(capture.time_s)?;
    let total_dv = escape_dv + capture.capture_delta_v + capture.insertion_delta_v;
    let total_hours = earth_leg_hours + lunar_leg_hours;

    debug!(
        total_dv,
        total_hours, v_infinity, "patched-conic Earth-Moon transfer"
    );

    Ok(EarthMoonTransfer {
        hohmann: TransferResult {
            delta_v1_km_s: escape_dv,
            delta_v2_km_s: capture.capture_delta_v + capture.insertion_delta_v,
            transfer_time_hours: total_hours,
            transfer_orbit: escape_orbit,
        },
        details: PatchedConicDetails {
            sphere_of_influence_km: r_soi,
            soi_boundary_radius_km: r_b,
            departure_speed_km_s: v_departure,
            soi_arrival_speed_km_s: v_boundary,
            v_infinity_km_s: v_infinity,
            earth_escape_delta_v: escape_dv,
            midcourse_delta_v: 0.0,
            lunar_capture_delta_v: capture.capture_delta_v,
            lunar_insertion_delta_v: capture.insertion_delta_v,
            total_delta_v: total_dv,
            earth_leg_hours,
            lunar_leg_hours,
            total_time_hours: total_hours,
            energy_balance_check: energy_ok,
            energy_relative_error: energy_error,
        },
        orbital_elements: vec![escape_orbit, capture.orbit],
    })
}

/// Bi-elliptic route with intermediate apoapsis `apoapsis_factor · D`, followed by lunar capture.
///
/// The Moon is met at the perigee of the second ellipse; `v∞` is the mismatch between the
/// spacecraft and the Moon's circular velocity there.
pub fn earth_moon_bi_elliptic(
    system: &EarthMoonSystem,
    apoapsis_factor: f64,
) -> Result<EarthMoonBiElliptic, UnitError> {
    system.validate()?;
    if !(apoapsis_factor.is_finite() && apoapsis_factor > 1.0) {
        return Err(UnitError::InvalidInput(format!(
            "bi-elliptic apoapsis factor must exceed 1, got {apoapsis_factor}"
        )));
    }
    let mu = system.mu_earth_km3_s2;
    let r_park = system.earth_parking_radius_km();
    let distance = system.earth_moon_distance_km;
    let rb = apoapsis_factor * distance;

    let route = bi_elliptic(r_park, distance, rb, mu)?;
    let v_infinity = route.dv3_km_s.abs();
    let capture = lunar_capture(system, v_infinity);

    // Escape ellipse: perigee speed after the first burn against the apoapsis speed h / rb.
    let v_departure = system.earth_parking_speed_km_s() + route.dv1_km_s;
    let v_apoapsis = r_park * v_departure / rb;
    let (energy_ok, energy_error) = energy_balance(mu, r_park, v_departure, rb, v_apoapsis);

    // Second ellipse: apoapsis rb, perigee at the Moon's distance.
    let a2 = route.second_orbit.semi_major_axis;
    let v_arrival = vis_viva_speed(mu, distance, -mu / (2.0 * a2));

    let earth_leg_hours = seconds_to_hours(route.tof_seconds)?;
    let lunar_leg_hours = seconds_to_hours(capture.time_s)?;
    let escape_dv = route.dv1_km_s.abs();
    let midcourse_dv = route.dv2_km_s.abs();
    let total_dv = escape_dv + midcourse_dv + capture.capture_delta_v + capture.insertion_delta_v;
    let total_hours = earth_leg_hours + lunar_leg_hours;

    debug!(
        rb_km = rb,
        total_dv, total_hours, "bi-elliptic Earth-Moon transfer"
    );

    Ok(EarthMoonBiElliptic {
        details: PatchedConicDetails {
            sphere_of_influence_km: system.sphere_of_influence_km(),
            soi_boundary_radius_km: system.soi_boundary_radius_km(),
            departure_speed_km_s: v_departure,
            soi_arrival_speed_km_s: v_arrival,
            v_infinity_km_s: v_infinity,
            earth_escape_delta_v: escape_dv,
            midcourse_delta_v: midcourse_dv,
            lunar_capture_delta_v: capture.capture_delta_v,
            lunar_insertion_delta_v: capture.insertion_delta_v,
            total_delta_v: total_dv,
            earth_leg_hours,
            lunar_leg_hours,
            total_time_hours: total_hours,
            energy_balance_check: energy_ok,
            energy_relative_error: energy_error,
        },
        orbital_elements: vec![route.first_orbit, route.second_orbit, capture.orbit],
        bi_elliptic: route,
    })
}
