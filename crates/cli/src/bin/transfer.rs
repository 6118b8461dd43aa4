use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use clap::Parser;
use lunar_transfer_engine::config::{EngineConfig, load_engine_config};
use lunar_transfer_engine::export::{points, record};
use lunar_transfer_engine::transfer::{TradeStudy, TradeWeights};
use lunar_transfer_engine::{
    TrajectoryEngine, TrajectoryRecord, TransferRequest, TransferType, parse_launch_date,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Flight times accepted from the command line (hours).
const MIN_FLIGHT_HOURS: f64 = 1.0;
const MAX_FLIGHT_HOURS: f64 = 720.0;

/// Compute an Earth→Moon transfer and print its summary.
#[derive(Parser, Debug)]
#[command(author, version, about = "Earth-Moon transfer calculator (patched conic / Lambert)")]
struct Cli {
    /// Launch date (RFC 3339 timestamp or YYYY-MM-DD, UTC)
    #[arg(long)]
    launch_date: String,

    /// Transfer strategy: hohmann, lambert or bi_elliptic
    #[arg(long, default_value = "hohmann")]
    transfer_type: String,

    /// Requested flight time in hours (used by the Lambert strategy)
    #[arg(long, default_value_t = 72.0)]
    flight_time: f64,

    /// Engine configuration (YAML, or TOML with a .toml extension)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mission identifier recorded in the output
    #[arg(long)]
    mission_id: Option<String>,

    /// Mission name recorded in the output
    #[arg(long)]
    name: Option<String>,

    /// Write the full trajectory record as JSON (use '-' for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write trajectory points as CSV (use '-' for stdout)
    #[arg(long)]
    points_csv: Option<PathBuf>,

    /// Compare every strategy instead of computing a single transfer
    #[arg(long, default_value_t = false)]
    compare: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    ensure!(
        (MIN_FLIGHT_HOURS..=MAX_FLIGHT_HOURS).contains(&cli.flight_time),
        "flight time must be between {MIN_FLIGHT_HOURS} and {MAX_FLIGHT_HOURS} hours, got {}",
        cli.flight_time
    );

    let config = match &cli.config {
        Some(path) => load_engine_config(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = TrajectoryEngine::new(&config)?;
    let launch_date = parse_launch_date(&cli.launch_date)?;

    if cli.compare {
        let study = engine.trade_study(launch_date, cli.flight_time, &TradeWeights::default())?;
        print_trade_study(&study);
        if let Some(path) = &cli.json {
            record::write_json(path, &study)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "trade study written");
        }
        return Ok(());
    }

    let transfer_type: TransferType = cli.transfer_type.parse()?;
    let mut request = TransferRequest::new(launch_date, transfer_type, cli.flight_time);
    if let Some(id) = cli.mission_id {
        request.mission_id = id;
    }
    if let Some(name) = cli.name {
        request.name = name;
    }

    let trajectory = engine.compute_transfer(&request)?;
    let stdout_taken = [&cli.json, &cli.points_csv]
        .into_iter()
        .flatten()
        .any(|path| path == Path::new("-"));
    if !stdout_taken {
        print_summary(&trajectory);
    }

    if let Some(path) = &cli.json {
        record::write_json(path, &trajectory)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "trajectory record written");
    }
    if let Some(path) = &cli.points_csv {
        points::write_csv(path, &trajectory.trajectory_points)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(
            path = %path.display(),
            points = trajectory.trajectory_points.len(),
            "trajectory points written"
        );
    }

    Ok(())
}

fn print_summary(record: &TrajectoryRecord) {
    let fuel = &record.calculations.fuel_optimization;
    println!("=== Earth-Moon Transfer ===");
    println!("Mission        : {} ({})", record.mission_id, record.name);
    println!("Transfer type  : {}", record.transfer_type);
    println!("Launch window  : {}", record.launch_window.to_rfc3339());
    println!("Total Δv       : {:.3} km/s", record.total_delta_v);
    println!("Flight time    : {:.1} h", record.flight_time);
    println!(
        "Fuel mass      : {:.0} kg (mass ratio {:.4}, burn {:.1} s)",
        record.fuel_mass, fuel.mass_ratio, fuel.burn_time_s
    );
    println!("Efficiency     : {:.1} %", record.efficiency);
    println!("Risk factors   :");
    for risk in &record.risk_factors {
        println!("  - {risk}");
    }
}

fn print_trade_study(study: &TradeStudy) {
    println!("=== Trade Study ===");
    println!(
        "{:<4} {:<12} {:>7} {:>9} {:>9} {:>7} {:>7}",
        "rank", "type", "score", "Δv km/s", "time h", "eff %", "safety"
    );
    for (rank, option) in study.alternatives.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:>7.3} {:>9.3} {:>9.1} {:>7.1} {:>7.0}",
            rank + 1,
            option.transfer_type.as_str(),
            option.score,
            option.record.total_delta_v,
            option.record.flight_time,
            option.record.efficiency,
            option.safety.safety_score
        );
    }
    for skipped in &study.skipped {
        println!("skipped {:<12} {}", skipped.transfer_type.as_str(), skipped.reason);
    }
    if let Some(best) = study.best() {
        println!("Best option    : {}", best.transfer_type);
    }
}
