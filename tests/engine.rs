use approx::assert_abs_diff_eq;
use chrono::{Datelike, TimeZone, Timelike, Utc};
use lunar_transfer_engine::config::EngineConfig;
use lunar_transfer_engine::transfer::engine::{
    RISK_DEBRIS, RISK_HIGH_DELTA_V, RISK_LAMBERT_TIMING, RISK_LONG_FLIGHT, RISK_SOLAR_ACTIVITY,
    efficiency, risk_factors,
};
use lunar_transfer_engine::transfer::{TradeWeights, assess_safety};
use lunar_transfer_engine::{
    ErrorKind, TrajectoryEngine, TransferRequest, TransferType, compute_transfer,
    parse_launch_date,
};

const MU_EARTH: f64 = 398_600.4418;
const MU_MOON: f64 = 4_902.7779;

fn request(kind: TransferType, hours: f64) -> TransferRequest {
    let launch = parse_launch_date("2025-01-01").expect("launch date");
    TransferRequest::new(launch, kind, hours)
}

#[test]
fn hohmann_scenario_stays_in_patched_conic_envelope() {
    let record = compute_transfer(&request(TransferType::Hohmann, 72.0)).expect("hohmann");

    assert!(
        (3.5..=4.5).contains(&record.total_delta_v),
        "total dv = {}",
        record.total_delta_v
    );
    assert!(record.risk_factors.iter().any(|r| r == RISK_SOLAR_ACTIVITY));
    assert!(record.risk_factors.iter().any(|r| r == RISK_DEBRIS));
    // Flight time comes from the model, not the request
    assert!((70.0..80.0).contains(&record.flight_time));
    assert!(!record.is_active);
    assert_eq!(record.transfer_type, TransferType::Hohmann);
    assert!(record.calculations.hohmann_transfer.is_some());
    assert!(record.calculations.patched_conic.is_some());
    assert!(record.calculations.lambert_solution.is_none());
    assert_eq!(record.trajectory_points.len(), 101);
    assert_eq!(record.orbital_elements.len(), 2);
    assert!(record.efficiency > 90.0 && record.efficiency <= 100.0);
}

#[test]
fn lambert_scenario_reproduces_reported_delta_v() {
    let engine = TrajectoryEngine::default();
    let record = engine
        .compute_transfer(&request(TransferType::Lambert, 50.0))
        .expect("lambert");
    let solution = record
        .calculations
        .lambert_solution
        .as_ref()
        .expect("lambert solution attached");

    let r_park = engine.system().earth_parking_radius_km();
    let r_moon_orbit = engine.system().moon_parking_radius_km();
    let dv = (solution.velocity_departure.norm() - (MU_EARTH / r_park).sqrt()).abs()
        + (solution.velocity_arrival.norm() - (MU_MOON / r_moon_orbit).sqrt()).abs();

    assert_abs_diff_eq!(record.total_delta_v, dv, epsilon = 5e-4);
    assert_eq!(record.flight_time, 50.0);
    assert!(record.risk_factors.iter().any(|r| r == RISK_LAMBERT_TIMING));
    assert_eq!(record.efficiency, 100.0);

    let first = record.trajectory_points.first().expect("points");
    let last = record.trajectory_points.last().expect("points");
    assert_abs_diff_eq!(first.x, r_park, epsilon = 1e-6);
    assert_abs_diff_eq!(last.x, engine.system().earth_moon_distance_km, epsilon = 1e-3);
}

#[test]
fn bi_elliptic_is_a_distinct_strategy() {
    let hohmann = compute_transfer(&request(TransferType::Hohmann, 72.0)).unwrap();
    let bi = compute_transfer(&request(TransferType::BiElliptic, 72.0)).unwrap();

    assert!(bi.total_delta_v > hohmann.total_delta_v);
    assert!(bi.flight_time > 240.0);
    assert!(bi.risk_factors.iter().any(|r| r == RISK_LONG_FLIGHT));
    assert!(bi.calculations.bi_elliptic_transfer.is_some());
    assert_eq!(bi.orbital_elements.len(), 3);
}

#[test]
fn bi_elliptic_points_follow_the_intermediate_apoapsis() {
    let engine = TrajectoryEngine::default();
    let record = engine
        .compute_transfer(&request(TransferType::BiElliptic, 72.0))
        .unwrap();
    let distance = engine.system().earth_moon_distance_km;
    let points = &record.trajectory_points;

    assert_eq!(points.len(), 101);
    assert_abs_diff_eq!(points[0].x, engine.system().earth_parking_radius_km(), epsilon = 1e-6);
    let farthest = points.iter().map(|p| p.norm()).fold(0.0, f64::max);
    assert_abs_diff_eq!(farthest, 2.5 * distance, epsilon = 1.0);
    let last = points.last().unwrap();
    assert_abs_diff_eq!(last.norm(), distance, epsilon = 1e-3);
    assert!(last.x > 0.0);
}

#[test]
fn record_values_are_rounded_for_presentation() {
    let record = compute_transfer(&request(TransferType::Hohmann, 72.0)).unwrap();
    assert_eq!(record.total_delta_v, (record.total_delta_v * 1e3).round() / 1e3);
    assert_eq!(record.flight_time, (record.flight_time * 10.0).round() / 10.0);
    assert_eq!(record.fuel_mass, record.fuel_mass.round());
    assert_eq!(record.efficiency, (record.efficiency * 10.0).round() / 10.0);
    let fuel = record.calculations.fuel_optimization;
    assert_eq!(fuel.mass_ratio, (fuel.mass_ratio * 1e4).round() / 1e4);
}

#[test]
fn custom_and_invalid_requests_fail_as_caller_errors() {
    let err = compute_transfer(&request(TransferType::Custom, 72.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    for hours in [0.09, 8_761.0, f64::NAN] {
        let err = compute_transfer(&request(TransferType::Hohmann, hours)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "hours = {hours}");
        assert!(err.kind().is_caller_error());
    }
}

#[test]
fn too_fast_lambert_transfer_is_rejected_as_caller_error() {
    // Below ~49.4 h the rectilinear Earth-Moon solution is hyperbolic
    let err = compute_transfer(&request(TransferType::Lambert, 40.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOrbit);
    assert!(err.kind().is_caller_error());
    assert!(!ErrorKind::DidNotConverge.is_caller_error());
    assert!(!ErrorKind::SingularSolution.is_caller_error());

    let err = compute_transfer(&request(TransferType::Lambert, 1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimeTooShort);
    assert!(err.kind().is_caller_error());
}

#[test]
fn launch_dates_parse_from_dates_and_timestamps() {
    let date = parse_launch_date("2025-01-01").unwrap();
    assert_eq!(date, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

    let stamp = parse_launch_date("2025-03-15T10:30:00+02:00").unwrap();
    assert_eq!(stamp.day(), 15);
    assert_eq!(stamp.hour(), 8);

    for bad in ["2025-02-30", "tomorrow", "", "2025-13-01"] {
        let err = parse_launch_date(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{bad}");
    }
}

#[test]
fn transfer_types_parse_exhaustively() {
    for kind in TransferType::ALL {
        assert_eq!(kind.as_str().parse::<TransferType>().unwrap(), kind);
    }
    assert_eq!("Bi_Elliptic".parse::<TransferType>().unwrap(), TransferType::BiElliptic);
    assert!("gravity_assist".parse::<TransferType>().is_err());
}

#[test]
fn risk_table_and_efficiency_rules() {
    let risks = risk_factors(TransferType::Lambert, 4.5, 130.0);
    assert_eq!(
        risks,
        vec![
            RISK_HIGH_DELTA_V,
            RISK_LONG_FLIGHT,
            RISK_LAMBERT_TIMING,
            RISK_SOLAR_ACTIVITY,
            RISK_DEBRIS,
        ]
    );
    assert_eq!(risk_factors(TransferType::Hohmann, 3.9, 72.0).len(), 2);

    assert_eq!(efficiency(4.0, 3.0), 100.0);
    assert_abs_diff_eq!(efficiency(3.0, 4.0), 75.0, epsilon = 1e-12);
}

#[test]
fn record_serialises_with_camel_case_fields() {
    let record = compute_transfer(&request(TransferType::Hohmann, 72.0)).unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["type"], "hohmann");
    assert_eq!(json["isActive"], false);
    assert_eq!(json["launchWindow"], "2025-01-01T00:00:00Z");
    assert!(json["totalDeltaV"].is_number());
    assert!(json["calculations"]["fuelOptimization"]["massRatio"].is_number());
    assert!(json["calculations"]["patchedConic"]["energyBalanceCheck"].as_bool().unwrap());
    assert!(json["calculations"].get("lambertSolution").is_none());
    assert!(json["orbitalElements"][0]["semiMajorAxis"].is_number());
}

#[test]
fn engine_follows_configuration() {
    let mut config = EngineConfig::default();
    config.trajectory_samples = 40;
    config.vehicle.dry_mass_kg = 10_000.0;
    let engine = TrajectoryEngine::new(&config).expect("engine");

    let baseline = compute_transfer(&request(TransferType::Hohmann, 72.0)).unwrap();
    let record = engine
        .compute_transfer(&request(TransferType::Hohmann, 72.0))
        .unwrap();
    assert_eq!(record.trajectory_points.len(), 41);
    assert_abs_diff_eq!(record.fuel_mass, 2.0 * baseline.fuel_mass, epsilon = 2.0);

    config.vehicle.isp_seconds = -5.0;
    let err = TrajectoryEngine::new(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn trade_study_ranks_every_strategy() {
    let engine = TrajectoryEngine::default();
    let launch = parse_launch_date("2025-06-01").unwrap();
    let study = engine
        .trade_study(launch, 72.0, &TradeWeights::default())
        .expect("trade study");

    assert_eq!(study.alternatives.len(), 3);
    assert!(study.skipped.is_empty());
    let scores: Vec<f64> = study.alternatives.iter().map(|o| o.score).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_ne!(study.best().unwrap().transfer_type, TransferType::BiElliptic);
    assert!(study.best_efficiency.unwrap() > 98.0);
    assert_eq!(study.shortest_flight_time, Some(72.0));
}

#[test]
fn trade_study_records_failed_alternatives() {
    let engine = TrajectoryEngine::default();
    let launch = parse_launch_date("2025-06-01").unwrap();
    let study = engine
        .trade_study(launch, 30.0, &TradeWeights::default())
        .expect("trade study");

    assert_eq!(study.alternatives.len(), 2);
    assert_eq!(study.skipped.len(), 1);
    assert_eq!(study.skipped[0].transfer_type, TransferType::Lambert);

    let zero = TradeWeights {
        fuel: 0.0,
        time: 0.0,
        safety: 0.0,
    };
    assert!(engine.trade_study(launch, 72.0, &zero).is_err());
}

#[test]
fn safety_assessment_penalises_slow_inefficient_transfers() {
    let mut record = compute_transfer(&request(TransferType::Hohmann, 72.0)).unwrap();
    let safe = assess_safety(&record);
    assert!(safe.is_valid);
    assert_eq!(safe.safety_score, 100.0);
    assert!(safe.issues.is_empty());

    record.flight_time = 300.0;
    record.efficiency = 40.0;
    let unsafe_record = assess_safety(&record);
    assert_eq!(unsafe_record.safety_score, 55.0);
    assert!(unsafe_record.is_valid);
    assert_eq!(unsafe_record.issues.len(), 2);

    record.total_delta_v = 25.0;
    let rejected = assess_safety(&record);
    assert_eq!(rejected.safety_score, 25.0);
    assert!(!rejected.is_valid);
}

#[test]
fn engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TrajectoryEngine>();

    let engine = std::sync::Arc::new(TrajectoryEngine::default());
    let handles: Vec<_> = [50.0, 60.0, 72.0]
        .into_iter()
        .map(|hours| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                engine
                    .compute_transfer(&request(TransferType::Lambert, hours))
                    .map(|record| record.total_delta_v)
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
}
