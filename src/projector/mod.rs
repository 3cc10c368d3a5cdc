//! # Domain Projector
//!
//! Turns a final energy field and a strength verdict into three bounded
//! domain scores. Every domain follows the same chain:
//!
//! ```text
//! base ─► modifiers ─► amplifier ─► cap ─► bias ─► cap ─► corrector ─► cap
//! ```
//!
//! Each arrow is recorded in the domain's [`DomainScoreBreakdown`] when
//! `engine.record_breakdown` is on. The breakdown is diagnostic only.

pub mod amplifier;
pub mod corrector;
mod career;
mod relationship;
mod wealth;

pub use corrector::{CorrectorBand, CorrectorOutcome};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::judge::StrengthVerdict;
use crate::model::{Chart, Element, ElementEnergy, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Wealth,
    Career,
    Relationship,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Wealth, Domain::Career, Domain::Relationship];
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Wealth => write!(f, "wealth"),
            Domain::Career => write!(f, "career"),
            Domain::Relationship => write!(f, "relationship"),
        }
    }
}

// ============================================================================
// Particles
// ============================================================================

/// Relation shares of the final field, in percent, after particle weights
/// and impedances.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Particles {
    pub peer: f64,
    pub output: f64,
    pub wealth: f64,
    pub officer: f64,
    pub resource: f64,
}

impl Particles {
    pub fn derive(energy: &ElementEnergy, day_master: Element, config: &EngineConfig) -> Self {
        let p = &config.particles;
        let share = |relation: Relation| energy.percent(relation.element_for(day_master), 0.0);
        Self {
            peer: share(Relation::Peer) * p.peer_weight,
            output: share(Relation::Output) * p.output_weight,
            wealth: share(Relation::Wealth) * p.wealth_weight,
            officer: share(Relation::Officer) * p.officer_weight * p.control_impedance,
            resource: share(Relation::Resource) * p.resource_weight * p.resource_impedance,
        }
    }
}

// ============================================================================
// Breakdown
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Base,
    Modified,
    Amplified,
    Capped,
    Biased,
    Recapped,
    Corrected,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageValue {
    pub stage: Stage,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainScoreBreakdown {
    pub stages: Vec<StageValue>,
    /// Modifiers that fired, in application order.
    pub modifiers: Vec<String>,
}

impl DomainScoreBreakdown {
    pub fn value_at(&self, stage: Stage) -> Option<f64> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| s.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: Domain,
    pub score: f64,
    /// Short tag naming what drove the score.
    pub reason: String,
    pub breakdown: Option<DomainScoreBreakdown>,
}

/// Trace collector shared by the three domain chains.
pub(crate) struct Trace {
    record: bool,
    breakdown: DomainScoreBreakdown,
}

impl Trace {
    pub(crate) fn new(record: bool) -> Self {
        Self { record, breakdown: DomainScoreBreakdown::default() }
    }

    pub(crate) fn stage(&mut self, stage: Stage, value: f64) -> f64 {
        if self.record {
            self.breakdown.stages.push(StageValue { stage, value });
        }
        value
    }

    pub(crate) fn modifier(&mut self, name: &str) {
        if self.record {
            self.breakdown.modifiers.push(name.to_string());
        }
    }

    /// cap → bias → cap → corrector → cap, then wrap up.
    pub(crate) fn finish(
        mut self,
        domain: Domain,
        amplified: f64,
        bias: f64,
        corrector: f64,
        max: f64,
        reason: String,
    ) -> DomainScore {
        let capped = self.stage(Stage::Capped, amplifier::cap(amplified, max));
        let biased = self.stage(Stage::Biased, capped * bias);
        let recapped = self.stage(Stage::Recapped, amplifier::cap(biased, max));
        let corrected = self.stage(Stage::Corrected, recapped * corrector);
        let score = self.stage(Stage::Final, amplifier::cap(corrected, max));
        DomainScore {
            domain,
            score,
            reason,
            breakdown: self.record.then_some(self.breakdown),
        }
    }
}

// ============================================================================
// Projection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub particles: Particles,
    pub corrector: CorrectorOutcome,
    pub wealth: DomainScore,
    pub career: DomainScore,
    pub relationship: DomainScore,
}

/// Bias for `domain`: the case override when present, else the global value.
pub fn domain_bias(domain: Domain, chart: &Chart, config: &EngineConfig) -> f64 {
    let o = config.override_for(chart.case_id.as_deref());
    match domain {
        Domain::Wealth => o.and_then(|o| o.wealth_bias).unwrap_or(config.bias.wealth),
        Domain::Career => o.and_then(|o| o.career_bias).unwrap_or(config.bias.career),
        Domain::Relationship => o.and_then(|o| o.relationship_bias).unwrap_or(config.bias.relationship),
    }
}

pub fn project(
    energy: &ElementEnergy,
    day_master: Element,
    chart: &Chart,
    verdict: &StrengthVerdict,
    config: &EngineConfig,
) -> Projection {
    let particles = Particles::derive(energy, day_master, config);
    let corrector = corrector::correct(chart, day_master, verdict.strength, config);
    tracing::trace!(?particles, factor = corrector.factor, band = ?corrector.band, "projecting");

    Projection {
        particles,
        corrector,
        wealth: wealth::score(&particles, verdict, chart, corrector.factor, config),
        career: career::score(&particles, verdict, chart, corrector.factor, config),
        relationship: relationship::score(&particles, chart, corrector.factor, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::Strength;
    use crate::model::Gender;

    #[test]
    fn test_particles_sum_with_unit_weights() {
        let mut config = EngineConfig::default();
        config.particles.control_impedance = 1.0;
        config.particles.resource_impedance = 1.0;
        let e = ElementEnergy::from_values([10.0, 20.0, 30.0, 25.0, 15.0]);
        let p = Particles::derive(&e, Element::Wood, &config);
        assert!((p.peer + p.output + p.wealth + p.officer + p.resource - 100.0).abs() < 1e-9);
        assert!((p.wealth - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_particles_zero_total() {
        let p = Particles::derive(&ElementEnergy::zero(), Element::Fire, &EngineConfig::default());
        assert_eq!(p, Particles::default());
    }

    #[test]
    fn test_project_scores_are_bounded() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        let verdict = StrengthVerdict { strength: Strength::Strong, ratio: 60.0, confidence: 0.75, overridden_by: None };
        let e = ElementEnergy::from_values([50.0, 20.0, 35.0, 5.0, 25.0]);
        let projection = project(&e, Element::Wood, &chart, &verdict, &EngineConfig::default());
        for score in [&projection.wealth, &projection.career, &projection.relationship] {
            assert!((0.0..=100.0).contains(&score.score), "{score:?}");
            let breakdown = score.breakdown.as_ref().unwrap();
            assert_eq!(breakdown.value_at(Stage::Final), Some(score.score));
        }
    }

    #[test]
    fn test_bias_override_replaces_global() {
        let mut config = EngineConfig::default();
        config.bias.career = 1.3;
        config.overrides.insert(
            "x".to_string(),
            crate::config::CaseOverride { career_bias: Some(0.5), ..Default::default() },
        );
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        assert_eq!(domain_bias(Domain::Career, &chart, &config), 1.3);
        assert_eq!(domain_bias(Domain::Career, &chart.with_case_id("x"), &config), 0.5);
    }
}
