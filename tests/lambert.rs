use approx::assert_relative_eq;
use lunar_transfer_engine::impulsive::lambert::{
    self, Direction, LambertError, MAX_ITERATIONS, minimum_energy_time,
};
use lunar_transfer_engine::primitives::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MU_EARTH: f64 = 398_600.4418; // km^3 / s^2

fn specific_energy(r: Vector3, v: Vector3) -> f64 {
    0.5 * v.dot(&v) - MU_EARTH / r.norm()
}

fn geometry(r1: Vector3, r2: Vector3, direction: Direction) -> (f64, f64) {
    let s = 0.5 * (r1.norm() + r2.norm() + (r2 - r1).norm());
    let mut dnu = r1.cross(&r2).norm().atan2(r1.dot(&r2));
    if direction == Direction::Retrograde {
        dnu = std::f64::consts::TAU - dnu;
    }
    let lambda = (r1.norm() * r2.norm()).sqrt() * (0.5 * dnu).cos() / s;
    (s, lambda)
}

fn random_position(rng: &mut StdRng) -> Vector3 {
    let radius = rng.gen_range(6_600.0..60_000.0);
    let theta = rng.gen_range(0.0..std::f64::consts::TAU);
    let z = rng.gen_range(-0.5..0.5);
    Vector3::new(radius * theta.cos(), radius * theta.sin(), radius * z)
}

#[test]
fn lambert_quarter_orbit_matches_circular_velocity() {
    let radius = 7_000.0;
    let r1 = Vector3::new(radius, 0.0, 0.0);
    let r2 = Vector3::new(0.0, radius, 0.0);
    let tof = std::f64::consts::FRAC_PI_2 * (radius.powi(3) / MU_EARTH).sqrt();

    let solution =
        lambert::solve(r1, r2, tof, MU_EARTH, Direction::Prograde, 0).expect("lambert solve");
    let circular = (MU_EARTH / radius).sqrt();

    assert_relative_eq!(solution.velocity_departure.y, circular, max_relative = 1e-9);
    assert!(solution.velocity_departure.x.abs() < 1e-9);
    assert_relative_eq!(solution.velocity_arrival.x, -circular, max_relative = 1e-9);
    assert_relative_eq!(solution.semi_major_axis, radius, max_relative = 1e-9);
    assert_eq!(solution.solution_type, Direction::Prograde);
}

#[test]
fn retrograde_quarter_orbit_goes_the_long_way_round() {
    let radius = 7_000.0;
    let r1 = Vector3::new(radius, 0.0, 0.0);
    let r2 = Vector3::new(0.0, radius, 0.0);
    let tof = 1.5 * std::f64::consts::PI * (radius.powi(3) / MU_EARTH).sqrt();

    let solution =
        lambert::solve(r1, r2, tof, MU_EARTH, Direction::Retrograde, 0).expect("lambert solve");
    let circular = (MU_EARTH / radius).sqrt();

    assert_relative_eq!(solution.velocity_departure.y, -circular, max_relative = 1e-8);
    assert_eq!(solution.solution_type, Direction::Retrograde);
}

#[test]
fn sampled_elliptic_problems_converge_with_unit_determinant() {
    let mut rng = StdRng::seed_from_u64(0x1a3b_e7);
    for _ in 0..500 {
        let r1 = random_position(&mut rng);
        let r2 = random_position(&mut rng);
        let direction = if rng.gen_bool(0.3) {
            Direction::Retrograde
        } else {
            Direction::Prograde
        };

        // Normalised times beyond the parabolic value T(x = 1) are elliptic.
        let (s, lambda) = geometry(r1, r2, direction);
        let t_parabolic = 2.0 / 3.0 * (1.0 - lambda.powi(3));
        let t_nondim = t_parabolic * rng.gen_range(1.05..6.0);
        let tof = t_nondim / (2.0 * MU_EARTH / s.powi(3)).sqrt();

        let solution = lambert::solve(r1, r2, tof, MU_EARTH, direction, 0)
            .unwrap_or_else(|err| panic!("solve failed for {r1:?} -> {r2:?}: {err}"));

        assert!(solution.iterations <= MAX_ITERATIONS);
        assert!(
            (solution.lagrange.determinant() - 1.0).abs() < 1e-8,
            "determinant drift {}",
            solution.lagrange.determinant() - 1.0
        );

        let e1 = specific_energy(r1, solution.velocity_departure);
        let e2 = specific_energy(r2, solution.velocity_arrival);
        assert!(
            ((e1 - e2) / e1).abs() < 1e-6,
            "energy mismatch {e1} vs {e2}"
        );

        let arrival = *solution.arc_points(r1, 16).last().expect("arc points");
        assert!((arrival - r2).norm() / r2.norm() < 1e-6);
    }
}

#[test]
fn long_elliptic_transfers_converge_within_budget() {
    let mut rng = StdRng::seed_from_u64(0x30d4);
    for _ in 0..500 {
        let r1 = random_position(&mut rng);
        let r2 = random_position(&mut rng);
        let direction = if rng.gen_bool(0.3) {
            Direction::Retrograde
        } else {
            Direction::Prograde
        };

        // From just past the parabolic time out to a 30-day coast.
        let (s, lambda) = geometry(r1, r2, direction);
        let time_scale = (2.0 * MU_EARTH / s.powi(3)).sqrt();
        let parabolic_s = 2.0 / 3.0 * (1.0 - lambda.powi(3)) / time_scale;
        let tof = rng.gen_range(1.05 * parabolic_s..30.0 * 86_400.0);

        let solution = lambert::solve(r1, r2, tof, MU_EARTH, direction, 0)
            .unwrap_or_else(|err| panic!("solve failed for tof {tof} s: {err}"));

        assert!(solution.iterations <= MAX_ITERATIONS);
        assert!((solution.lagrange.determinant() - 1.0).abs() < 1e-8);
        let e1 = specific_energy(r1, solution.velocity_departure);
        let e2 = specific_energy(r2, solution.velocity_arrival);
        assert!(((e1 - e2) / e1).abs() < 1e-6, "energy mismatch {e1} vs {e2}");
    }
}

#[test]
fn opposite_positions_have_no_unique_plane() {
    let r1 = Vector3::new(7_000.0, 0.0, 0.0);
    let half_period = std::f64::consts::PI * (8_000.0f64.powi(3) / MU_EARTH).sqrt();

    for r2 in [Vector3::new(-9_000.0, 0.0, 0.0), Vector3::new(-7_000.0, 0.0, 0.0)] {
        for direction in [Direction::Prograde, Direction::Retrograde] {
            let err = lambert::solve(r1, r2, 1.3 * half_period, MU_EARTH, direction, 0)
                .expect_err("half-turn transfer");
            assert!(matches!(err, LambertError::SingularSolution { .. }), "{err}");
        }
    }
}

#[test]
fn times_below_minimum_raise_time_too_short() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let r1 = random_position(&mut rng);
        let r2 = random_position(&mut rng);
        let (s, lambda) = geometry(r1, r2, Direction::Prograde);
        let t_nondim = minimum_energy_time(lambda) * rng.gen_range(0.01..0.99);
        let tof = t_nondim / (2.0 * MU_EARTH / s.powi(3)).sqrt();

        let err = lambert::solve(r1, r2, tof, MU_EARTH, Direction::Prograde, 0)
            .expect_err("time below minimum must fail");
        assert!(matches!(err, LambertError::TimeTooShort { .. }), "{err}");
    }
}

#[test]
fn hyperbolic_transfers_are_rejected() {
    let r1 = Vector3::new(6_571.0, 0.0, 0.0);
    let r2 = Vector3::new(384_400.0, 0.0, 0.0);
    // Faster than the parabolic flight time (~49.4 h) but above the single-revolution minimum.
    let err = lambert::solve(r1, r2, 40.0 * 3_600.0, MU_EARTH, Direction::Prograde, 0)
        .expect_err("hyperbolic transfer");
    assert!(matches!(err, LambertError::InvalidOrbit { .. }), "{err}");
}

#[test]
fn rectilinear_earth_moon_transfer_solves() {
    let r1 = Vector3::new(6_571.0, 0.0, 0.0);
    let r2 = Vector3::new(384_400.0, 0.0, 0.0);
    let solution = lambert::solve(r1, r2, 72.0 * 3_600.0, MU_EARTH, Direction::Prograde, 0)
        .expect("collinear transfer");

    assert!(solution.x > 0.0 && solution.x < 1.0);
    assert!(solution.velocity_departure.y.abs() < 1e-9);
    let points = solution.arc_points(r1, 50);
    assert_eq!(points.len(), 51);
    assert_relative_eq!(points[0].x, r1.x, max_relative = 1e-12);
    assert_relative_eq!(points[50].x, r2.x, max_relative = 1e-6);
}

#[test]
fn identical_positions_are_degenerate() {
    let r = Vector3::new(7_000.0, 1_000.0, 0.0);
    let err = lambert::solve(r, r, 3_600.0, MU_EARTH, Direction::Prograde, 0).unwrap_err();
    assert!(matches!(err, LambertError::DegenerateGeometry(_)));

    let err = lambert::solve(Vector3::ZERO, r, 3_600.0, MU_EARTH, Direction::Prograde, 0)
        .unwrap_err();
    assert!(matches!(err, LambertError::DegenerateGeometry(_)));
}

#[test]
fn invalid_inputs_and_multi_revolution_are_rejected() {
    let r1 = Vector3::new(7_000.0, 0.0, 0.0);
    let r2 = Vector3::new(0.0, 8_000.0, 0.0);

    let err = lambert::solve(r1, r2, 0.0, MU_EARTH, Direction::Prograde, 0).unwrap_err();
    assert!(matches!(err, LambertError::InvalidInput(_)));
    let err = lambert::solve(r1, r2, f64::NAN, MU_EARTH, Direction::Prograde, 0).unwrap_err();
    assert!(matches!(err, LambertError::InvalidInput(_)));
    let err = lambert::solve(r1, r2, 3_600.0, -1.0, Direction::Prograde, 0).unwrap_err();
    assert!(matches!(err, LambertError::InvalidInput(_)));
    let err = lambert::solve(r1, r2, 3_600.0, MU_EARTH, Direction::Prograde, 1).unwrap_err();
    assert!(matches!(err, LambertError::NotImplemented(_)));
}

#[test]
fn solution_serialises_with_camel_case_fields() {
    let r1 = Vector3::new(7_000.0, 0.0, 0.0);
    let r2 = Vector3::new(0.0, 7_000.0, 0.0);
    let tof = std::f64::consts::FRAC_PI_2 * (7_000.0f64.powi(3) / MU_EARTH).sqrt();
    let solution = lambert::solve(r1, r2, tof, MU_EARTH, Direction::Prograde, 0).unwrap();

    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["solutionType"], "prograde");
    assert!(json["velocityDeparture"]["y"].is_number());
    assert!(json["lagrange"]["fDot"].is_number());
    assert!(json["semiMajorAxis"].is_number());
}
