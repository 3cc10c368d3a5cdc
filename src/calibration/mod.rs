//! # Calibration Harness
//!
//! Mean-absolute-error of predicted domain scores against recorded truth,
//! and ranking of candidate configuration patches by that error.
//!
//! ```text
//! cases ─► evaluate(config) ─► CalibrationReport { per case, per domain, overall }
//! cases + base + [patch…] ─► rank_candidates ─► [CandidateScore] (best first)
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::analyze_with;
use crate::calendar::PillarSource;
use crate::config::{EngineConfig, merge_json};
use crate::model::{Chart, Gender};
use crate::projector::Domain;
use crate::Result;

/// One (chart, domain, truth) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCase {
    pub id: String,
    pub chart: Chart,
    pub domain: Domain,
    pub truth: f64,
}

impl CalibrationCase {
    pub fn new(id: impl Into<String>, chart: Chart, domain: Domain, truth: f64) -> Self {
        let id = id.into();
        let chart = chart.with_case_id(id.clone());
        Self { id, chart, domain, truth }
    }

    /// Build a case for a target year through a calendar source.
    pub fn from_source(
        id: impl Into<String>,
        source: &dyn PillarSource,
        birth: NaiveDateTime,
        gender: Gender,
        year: i32,
        domain: Domain,
        truth: f64,
    ) -> Result<Self> {
        let chart = source.chart_for_year(birth, gender, year)?;
        Ok(Self::new(id, chart, domain, truth))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseError {
    pub id: String,
    pub domain: Domain,
    pub predicted: f64,
    pub truth: f64,
    /// `|predicted − truth|`.
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub cases: Vec<CaseError>,
    /// Overall MAE; 0 for an empty case set.
    pub mae: f64,
    pub per_domain: BTreeMap<Domain, f64>,
}

impl CalibrationReport {
    /// The `n` cases with the largest error, worst first.
    pub fn worst(&self, n: usize) -> Vec<&CaseError> {
        let mut sorted: Vec<&CaseError> = self.cases.iter().collect();
        sorted.sort_by(|a, b| b.error.total_cmp(&a.error));
        sorted.truncate(n);
        sorted
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn evaluate(cases: &[CalibrationCase], config: &EngineConfig) -> Result<CalibrationReport> {
    let mut errors = Vec::with_capacity(cases.len());
    for case in cases {
        let analysis = analyze_with(&case.chart, config)?;
        let predicted = analysis.score(case.domain).score;
        errors.push(CaseError {
            id: case.id.clone(),
            domain: case.domain,
            predicted,
            truth: case.truth,
            error: (predicted - case.truth).abs(),
        });
    }

    let per_domain = Domain::ALL
        .into_iter()
        .filter(|d| errors.iter().any(|e| e.domain == *d))
        .map(|d| (d, mean(errors.iter().filter(|e| e.domain == d).map(|e| e.error))))
        .collect();
    let mae = mean(errors.iter().map(|e| e.error));
    tracing::debug!(cases = errors.len(), mae, "calibration evaluated");

    Ok(CalibrationReport { cases: errors, mae, per_domain })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position of the patch in the input.
    pub index: usize,
    pub mae: f64,
    pub config: EngineConfig,
}

/// Deep-merge each patch onto `base`, evaluate, and sort by MAE.
///
/// Ties keep input order. A patch that produces an invalid configuration
/// fails the whole ranking.
pub fn rank_candidates(
    cases: &[CalibrationCase],
    base: &EngineConfig,
    patches: &[Value],
) -> Result<Vec<CandidateScore>> {
    let base_value = serde_json::to_value(base)?;
    let mut ranked = Vec::with_capacity(patches.len());
    for (index, patch) in patches.iter().enumerate() {
        let mut merged = base_value.clone();
        merge_json(&mut merged, patch);
        let config: EngineConfig = serde_json::from_value(merged)?;
        config.validate()?;
        let report = evaluate(cases, &config)?;
        ranked.push(CandidateScore { index, mae: report.mae, config });
    }
    ranked.sort_by(|a, b| a.mae.total_cmp(&b.mae));
    Ok(ranked)
}
