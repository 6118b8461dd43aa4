//! Safety scoring and multi-objective comparison of the computable transfer strategies.

use chrono::{DateTime, Utc};
use lunar_core::units::validate_mission_time;
use serde::Serialize;
use tracing::warn;

use super::{EngineError, TrajectoryEngine, TrajectoryRecord, TransferRequest, TransferType};

/// Flight time at which the time objective scores zero (one week).
pub const TIME_HORIZON_HOURS: f64 = 168.0;
/// Minimum safety score for a trajectory to be considered valid.
pub const MIN_SAFE_SCORE: f64 = 50.0;

const EXCESSIVE_DELTA_V_KM_S: f64 = 20.0;
const EXTENDED_TRANSFER_HOURS: f64 = 240.0;
const LOW_EFFICIENCY: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAssessment {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub safety_score: f64,
}

/// Score a computed trajectory from 100 downwards.
pub fn assess_safety(record: &TrajectoryRecord) -> SafetyAssessment {
    let mut score = 100.0;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if record.total_delta_v > EXCESSIVE_DELTA_V_KM_S {
        issues.push("Excessive delta-V requirement".to_string());
        recommendations.push("Consider a gravity assist or a lower-energy transfer".to_string());
        score -= 30.0;
    }
    if record.flight_time > EXTENDED_TRANSFER_HOURS {
        issues.push("Extended transfer time increases risk".to_string());
        recommendations.push("Optimise the trajectory for a shorter flight time".to_string());
        score -= 20.0;
    }
    if record.efficiency < LOW_EFFICIENCY {
        issues.push("Low fuel efficiency".to_string());
        recommendations.push("Consider an alternative transfer strategy".to_string());
        score -= 25.0;
    }

    SafetyAssessment {
        is_valid: score >= MIN_SAFE_SCORE,
        issues,
        recommendations,
        safety_score: score,
    }
}

/// Relative weights of the fuel, time and safety objectives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeWeights {
    pub fuel: f64,
    pub time: f64,
    pub safety: f64,
}

impl Default for TradeWeights {
    fn default() -> Self {
        Self {
            fuel: 0.4,
            time: 0.3,
            safety: 0.3,
        }
    }
}

impl TradeWeights {
    pub fn validate(&self) -> Result<(), EngineError> {
        let weights = [self.fuel, self.time, self.safety];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::InvalidInput(
                "trade weights must be finite and non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(EngineError::InvalidInput(
                "trade weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Weighted score of one trajectory; higher is better.
    pub fn score(&self, record: &TrajectoryRecord, safety: &SafetyAssessment) -> f64 {
        let time_score = (1.0 - record.flight_time / TIME_HORIZON_HOURS).max(0.0);
        self.fuel * record.efficiency / 100.0
            + self.time * time_score
            + self.safety * safety.safety_score / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOption {
    pub transfer_type: TransferType,
    pub score: f64,
    pub safety: SafetyAssessment,
    pub record: TrajectoryRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAlternative {
    pub transfer_type: TransferType,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStudy {
    /// Alternatives sorted by descending score.
    pub alternatives: Vec<TradeOption>,
    pub skipped: Vec<SkippedAlternative>,
    pub best_efficiency: Option<f64>,
    pub shortest_flight_time: Option<f64>,
}

impl TradeStudy {
    pub fn best(&self) -> Option<&TradeOption> {
        self.alternatives.first()
    }
}

impl TrajectoryEngine {
    /// Evaluate every computable strategy for one launch and rank them by weighted score.
    ///
    /// `flight_time_hours` only drives the Lambert alternative; the patched-conic models fix
    /// their own durations. Strategies that fail are reported as skipped, not as errors.
    pub fn trade_study(
        &self,
        launch_date: DateTime<Utc>,
        flight_time_hours: f64,
        weights: &TradeWeights,
    ) -> Result<TradeStudy, EngineError> {
        weights.validate()?;
        validate_mission_time(flight_time_hours)?;

        let mut alternatives = Vec::new();
        let mut skipped = Vec::new();
        for transfer_type in [
            TransferType::Hohmann,
            TransferType::BiElliptic,
            TransferType::Lambert,
        ] {
            let request = TransferRequest::new(launch_date, transfer_type, flight_time_hours);
            match self.compute_transfer(&request) {
                Ok(record) => {
                    let safety = assess_safety(&record);
                    let score = weights.score(&record, &safety);
                    alternatives.push(TradeOption {
                        transfer_type,
                        score,
                        safety,
                        record,
                    });
                }
                Err(err) => {
                    warn!(%transfer_type, error = %err, "trade study alternative skipped");
                    skipped.push(SkippedAlternative {
                        transfer_type,
                        reason: err.to_string(),
                    });
                }
            }
        }

        alternatives.sort_by(|a, b| b.score.total_cmp(&a.score));
        let best_efficiency = alternatives
            .iter()
            .map(|option| option.record.efficiency)
            .reduce(f64::max);
        let shortest_flight_time = alternatives
            .iter()
            .map(|option| option.record.flight_time)
            .reduce(f64::min);

        Ok(TradeStudy {
            alternatives,
            skipped,
            best_efficiency,
            shortest_flight_time,
        })
    }
}
