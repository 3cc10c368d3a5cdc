//! # Engine Configuration
//!
//! One typed, nested parameter set. Every section carries
//! `#[serde(default)]`, so a partial JSON document fills the gaps with the
//! documented defaults; unknown keys are rejected so typos surface early.
//!
//! ```json
//! {
//!   "engine": { "path": "graph", "max_score": 100 },
//!   "pillar_weights": { "month": 2.0 },
//!   "corrector": { "excluded_cases": ["case-17"] },
//!   "overrides": { "case-42": { "corrector_factor": 1.1 } }
//! }
//! ```

mod store;

pub use store::{ConfigStore, merge_json};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::lexicon::HiddenRole;
use crate::model::PillarSlot;
use crate::strategy::ComputationPath;
use crate::{Error, Result};

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub pillar_weights: PillarWeights,
    pub hidden_stems: HiddenStemWeights,
    pub rooting: RootingConfig,
    pub interactions: InteractionConfig,
    pub coupling: CouplingConfig,
    pub graph: GraphConfig,
    pub strength: StrengthConfig,
    pub particles: ParticleConfig,
    pub wealth: WealthConfig,
    pub career: CareerConfig,
    pub relationship: RelationshipConfig,
    pub bias: BiasConfig,
    pub corrector: CorrectorConfig,
    /// Per-case tuning overrides keyed by `Chart::case_id`.
    pub overrides: HashMap<String, CaseOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub path: ComputationPath,
    /// Upper bound of every domain score.
    pub max_score: f64,
    /// Energy of one stem at weight 1.0.
    pub base_score: f64,
    /// Keep the per-stage trace on each `DomainScore`.
    pub record_breakdown: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            path: ComputationPath::Layered,
            max_score: 100.0,
            base_score: 10.0,
            record_breakdown: true,
        }
    }
}

// ============================================================================
// Energy initialization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PillarWeights {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub luck: f64,
    pub annual: f64,
}

impl Default for PillarWeights {
    fn default() -> Self {
        Self {
            year: 1.0,
            month: 1.8,
            day: 1.2,
            hour: 0.9,
            luck: 0.8,
            annual: 0.6,
        }
    }
}

impl PillarWeights {
    pub fn weight(&self, slot: PillarSlot) -> f64 {
        match slot {
            PillarSlot::Year => self.year,
            PillarSlot::Month => self.month,
            PillarSlot::Day => self.day,
            PillarSlot::Hour => self.hour,
            PillarSlot::Luck => self.luck,
            PillarSlot::Annual => self.annual,
        }
    }
}

/// Hidden-stem weights for the initializer and shell-core ratios for the
/// graph's branch nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HiddenStemWeights {
    pub main: f64,
    pub middle: f64,
    pub remnant: f64,
    /// Shell-core ratios for a branch with one hidden stem.
    pub single_ratio: f64,
    /// Shell-core ratios for a branch with two hidden stems.
    pub double_ratios: [f64; 2],
    /// Shell-core ratios for a branch with three hidden stems.
    pub triple_ratios: [f64; 3],
}

impl Default for HiddenStemWeights {
    fn default() -> Self {
        Self {
            main: 10.0,
            middle: 7.0,
            remnant: 3.0,
            single_ratio: 1.0,
            double_ratios: [0.7, 0.3],
            triple_ratios: [0.6, 0.3, 0.1],
        }
    }
}

impl HiddenStemWeights {
    pub fn weight(&self, role: HiddenRole) -> f64 {
        match role {
            HiddenRole::Main => self.main,
            HiddenRole::Middle => self.middle,
            HiddenRole::Remnant => self.remnant,
        }
    }

    /// Shell-core ratio of the `position`-th hidden stem in a branch
    /// holding `count` of them.
    pub fn shell_ratio(&self, count: usize, position: usize) -> f64 {
        match count {
            1 => self.single_ratio,
            2 => self.double_ratios.get(position).copied().unwrap_or(0.0),
            _ => self.triple_ratios.get(position).copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootingConfig {
    /// Multiplier for a stem rooted in any natal branch.
    pub root_bonus: f64,
    /// Multiplier for a stem rooted in its own pillar's branch.
    pub same_pillar_bonus: f64,
    /// Graph only: multiplier for a stem that is the main qi of a chart branch.
    pub exposure_bonus: f64,
}

impl Default for RootingConfig {
    fn default() -> Self {
        Self {
            root_bonus: 1.2,
            same_pillar_bonus: 1.5,
            exposure_bonus: 1.1,
        }
    }
}

// ============================================================================
// Interaction + coupling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    pub combination_bonus: f64,
    pub combination_cost: f64,
    pub binding_factor: f64,
    pub trine_bonus: f64,
    pub assembly_bonus: f64,
    pub six_combination_bonus: f64,
    pub clash_penalty: f64,
    pub punishment_penalty: f64,
    pub harm_penalty: f64,
    pub vault_open_threshold: f64,
    pub vault_open_multiplier: f64,
    pub vault_sealed_penalty: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            combination_bonus: 8.0,
            combination_cost: 4.0,
            binding_factor: 0.9,
            trine_bonus: 1.5,
            assembly_bonus: 1.4,
            six_combination_bonus: 6.0,
            clash_penalty: 5.0,
            punishment_penalty: 4.0,
            harm_penalty: 3.0,
            vault_open_threshold: 30.0,
            vault_open_multiplier: 1.3,
            vault_sealed_penalty: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CouplingConfig {
    pub enabled: bool,
    pub chain_gain: f64,
    pub resonance_boost: f64,
    pub cancellation_damping: f64,
    pub min_retention: f64,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chain_gain: 1.05,
            resonance_boost: 0.1,
            cancellation_damping: 0.5,
            min_retention: 0.1,
        }
    }
}

// ============================================================================
// Graph propagation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub generation_efficiency: f64,
    pub control_impact: f64,
    pub moisture_boost: f64,
    pub combination_weight: f64,
    pub clash_weight: f64,
    pub decay_adjacent: f64,
    pub decay_distant: f64,
    pub self_retention: f64,
    pub damping: f64,
    pub rounds: usize,
    pub output_drain_rate: f64,
    pub entropy_decay: f64,
    /// Suppression is skipped above this initial day-master share.
    pub dominance_skip: f64,
    pub officer_stress_ratio: f64,
    pub officer_stress_penalty: f64,
    pub wealth_burden_ratio: f64,
    pub wealth_burden_penalty: f64,
    pub output_drain_ratio: f64,
    pub output_drain_penalty: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            generation_efficiency: 0.2,
            control_impact: 0.15,
            moisture_boost: 0.1,
            combination_weight: 0.2,
            clash_weight: 0.3,
            decay_adjacent: 0.9,
            decay_distant: 0.6,
            self_retention: 1.0,
            damping: 0.5,
            rounds: 10,
            output_drain_rate: 0.05,
            entropy_decay: 0.02,
            dominance_skip: 0.8,
            officer_stress_ratio: 1.2,
            officer_stress_penalty: 0.15,
            wealth_burden_ratio: 1.5,
            wealth_burden_penalty: 0.1,
            output_drain_ratio: 1.2,
            output_drain_penalty: 0.1,
        }
    }
}

// ============================================================================
// Strength judge
// ============================================================================

/// All ratios and shares in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrengthConfig {
    pub strong_threshold: f64,
    pub weak_threshold: f64,
    pub very_strong_band: f64,
    pub strong_band: f64,
    pub balanced_band: f64,
    pub weak_band: f64,
    pub protected_resource_min: f64,
    pub protected_output_min: f64,
    pub protected_output_max: f64,
    pub resource_month_moderate: f64,
    pub special_element_share: f64,
    pub special_self_ratio: f64,
    pub fallback_ratio: f64,
    pub confidence_span: f64,
    pub override_confidence: f64,
    pub special_confidence: f64,
}

impl Default for StrengthConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 55.0,
            weak_threshold: 40.0,
            very_strong_band: 70.0,
            strong_band: 55.0,
            balanced_band: 40.0,
            weak_band: 20.0,
            protected_resource_min: 25.0,
            protected_output_min: 5.0,
            protected_output_max: 25.0,
            resource_month_moderate: 30.0,
            special_element_share: 65.0,
            special_self_ratio: 80.0,
            fallback_ratio: 50.0,
            confidence_span: 20.0,
            override_confidence: 0.7,
            special_confidence: 0.95,
        }
    }
}

// ============================================================================
// Domain projection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleConfig {
    pub peer_weight: f64,
    pub output_weight: f64,
    pub wealth_weight: f64,
    pub officer_weight: f64,
    pub resource_weight: f64,
    pub control_impedance: f64,
    pub resource_impedance: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            peer_weight: 1.0,
            output_weight: 1.0,
            wealth_weight: 1.0,
            officer_weight: 1.0,
            resource_weight: 1.0,
            control_impedance: 0.9,
            resource_impedance: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WealthConfig {
    pub wealth_weight: f64,
    pub body_weight: f64,
    pub weak_body_penalty: f64,
    pub robbery_threshold: f64,
    pub robbery_penalty: f64,
    pub capture_min: f64,
    pub capture_bonus: f64,
    pub low_cut: f64,
    pub high_cut: f64,
    pub low_exponent: f64,
    pub mid_exponent: f64,
    pub high_exponent: f64,
}

impl Default for WealthConfig {
    fn default() -> Self {
        Self {
            wealth_weight: 1.0,
            body_weight: 0.3,
            weak_body_penalty: 0.8,
            robbery_threshold: 35.0,
            robbery_penalty: 0.85,
            capture_min: 15.0,
            capture_bonus: 1.15,
            low_cut: 30.0,
            high_cut: 60.0,
            low_exponent: 1.1,
            mid_exponent: 0.95,
            high_exponent: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CareerConfig {
    /// Share of resource added to officer on the bureaucratic path.
    pub resource_share: f64,
    /// Multiplier on output for the talent path.
    pub talent_multiplier: f64,
    pub strong_body_multiplier: f64,
    pub exponent: f64,
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self {
            resource_share: 0.3,
            talent_multiplier: 1.2,
            strong_body_multiplier: 1.1,
            exponent: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationshipConfig {
    pub spouse_weight: f64,
    pub body_weight: f64,
    pub weak_spouse_threshold: f64,
    pub weak_spouse_penalty: f64,
    pub robs_wife_threshold: f64,
    pub robs_wife_penalty: f64,
    pub hurts_husband_threshold: f64,
    pub hurts_husband_penalty: f64,
    pub exponent: f64,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            spouse_weight: 1.0,
            body_weight: 0.2,
            weak_spouse_threshold: 10.0,
            weak_spouse_penalty: 0.8,
            robs_wife_threshold: 35.0,
            robs_wife_penalty: 0.8,
            hurts_husband_threshold: 30.0,
            hurts_husband_penalty: 0.8,
            exponent: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BiasConfig {
    pub wealth: f64,
    pub career: f64,
    pub relationship: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            wealth: 1.0,
            career: 1.0,
            relationship: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrectorConfig {
    pub base_factor: f64,
    pub luck_weight: f64,
    pub annual_weight: f64,
    pub favorable_min: f64,
    pub neutral_min: f64,
    pub favorable_multiplier: f64,
    pub neutral_multiplier: f64,
    pub unfavorable_multiplier: f64,
    /// Case ids for which the corrector is skipped (factor 1.0).
    pub excluded_cases: Vec<String>,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            base_factor: 1.0,
            luck_weight: 0.4,
            annual_weight: 0.6,
            favorable_min: 0.6,
            neutral_min: 0.3,
            favorable_multiplier: 1.15,
            neutral_multiplier: 1.0,
            unfavorable_multiplier: 0.85,
            excluded_cases: Vec::new(),
        }
    }
}

/// Per-case calibration override. Absent fields leave the global value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaseOverride {
    pub corrector_factor: Option<f64>,
    pub wealth_bias: Option<f64>,
    pub career_bias: Option<f64>,
    pub relationship_bias: Option<f64>,
}

// ============================================================================
// Loading + validation
// ============================================================================

impl EngineConfig {
    /// Parse a (possibly partial) JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override for `case_id`, if any.
    pub fn override_for(&self, case_id: Option<&str>) -> Option<&CaseOverride> {
        case_id.and_then(|id| self.overrides.get(id))
    }

    /// Validate every section; all problems are reported at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let mut non_negative = |name: &str, value: f64| {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name}: must be a finite non-negative number, got {value}"));
            }
        };

        non_negative("engine.base_score", self.engine.base_score);
        let w = &self.pillar_weights;
        for (name, value) in [
            ("pillar_weights.year", w.year),
            ("pillar_weights.month", w.month),
            ("pillar_weights.day", w.day),
            ("pillar_weights.hour", w.hour),
            ("pillar_weights.luck", w.luck),
            ("pillar_weights.annual", w.annual),
        ] {
            non_negative(name, value);
        }
        let h = &self.hidden_stems;
        non_negative("hidden_stems.main", h.main);
        non_negative("hidden_stems.middle", h.middle);
        non_negative("hidden_stems.remnant", h.remnant);
        non_negative("hidden_stems.single_ratio", h.single_ratio);
        for value in h.double_ratios {
            non_negative("hidden_stems.double_ratios", value);
        }
        for value in h.triple_ratios {
            non_negative("hidden_stems.triple_ratios", value);
        }
        non_negative("rooting.root_bonus", self.rooting.root_bonus);
        non_negative("rooting.same_pillar_bonus", self.rooting.same_pillar_bonus);
        non_negative("rooting.exposure_bonus", self.rooting.exposure_bonus);
        let i = &self.interactions;
        for (name, value) in [
            ("interactions.combination_bonus", i.combination_bonus),
            ("interactions.combination_cost", i.combination_cost),
            ("interactions.binding_factor", i.binding_factor),
            ("interactions.trine_bonus", i.trine_bonus),
            ("interactions.assembly_bonus", i.assembly_bonus),
            ("interactions.six_combination_bonus", i.six_combination_bonus),
            ("interactions.clash_penalty", i.clash_penalty),
            ("interactions.punishment_penalty", i.punishment_penalty),
            ("interactions.harm_penalty", i.harm_penalty),
            ("interactions.vault_open_threshold", i.vault_open_threshold),
            ("interactions.vault_open_multiplier", i.vault_open_multiplier),
            ("interactions.vault_sealed_penalty", i.vault_sealed_penalty),
        ] {
            non_negative(name, value);
        }
        let c = &self.coupling;
        non_negative("coupling.chain_gain", c.chain_gain);
        non_negative("coupling.resonance_boost", c.resonance_boost);
        non_negative("coupling.cancellation_damping", c.cancellation_damping);
        let g = &self.graph;
        for (name, value) in [
            ("graph.generation_efficiency", g.generation_efficiency),
            ("graph.control_impact", g.control_impact),
            ("graph.moisture_boost", g.moisture_boost),
            ("graph.combination_weight", g.combination_weight),
            ("graph.clash_weight", g.clash_weight),
            ("graph.decay_adjacent", g.decay_adjacent),
            ("graph.decay_distant", g.decay_distant),
            ("graph.self_retention", g.self_retention),
            ("graph.output_drain_rate", g.output_drain_rate),
            ("graph.officer_stress_ratio", g.officer_stress_ratio),
            ("graph.wealth_burden_ratio", g.wealth_burden_ratio),
            ("graph.output_drain_ratio", g.output_drain_ratio),
        ] {
            non_negative(name, value);
        }
        let st = &self.strength;
        for (name, value) in [
            ("strength.strong_threshold", st.strong_threshold),
            ("strength.weak_threshold", st.weak_threshold),
            ("strength.very_strong_band", st.very_strong_band),
            ("strength.strong_band", st.strong_band),
            ("strength.balanced_band", st.balanced_band),
            ("strength.weak_band", st.weak_band),
            ("strength.protected_resource_min", st.protected_resource_min),
            ("strength.protected_output_min", st.protected_output_min),
            ("strength.protected_output_max", st.protected_output_max),
            ("strength.resource_month_moderate", st.resource_month_moderate),
            ("strength.special_element_share", st.special_element_share),
            ("strength.special_self_ratio", st.special_self_ratio),
            ("strength.fallback_ratio", st.fallback_ratio),
        ] {
            non_negative(name, value);
        }
        let p = &self.particles;
        for (name, value) in [
            ("particles.peer_weight", p.peer_weight),
            ("particles.output_weight", p.output_weight),
            ("particles.wealth_weight", p.wealth_weight),
            ("particles.officer_weight", p.officer_weight),
            ("particles.resource_weight", p.resource_weight),
            ("particles.control_impedance", p.control_impedance),
            ("particles.resource_impedance", p.resource_impedance),
        ] {
            non_negative(name, value);
        }
        let wl = &self.wealth;
        for (name, value) in [
            ("wealth.wealth_weight", wl.wealth_weight),
            ("wealth.body_weight", wl.body_weight),
            ("wealth.weak_body_penalty", wl.weak_body_penalty),
            ("wealth.robbery_threshold", wl.robbery_threshold),
            ("wealth.robbery_penalty", wl.robbery_penalty),
            ("wealth.capture_min", wl.capture_min),
            ("wealth.capture_bonus", wl.capture_bonus),
            ("wealth.low_cut", wl.low_cut),
            ("wealth.high_cut", wl.high_cut),
        ] {
            non_negative(name, value);
        }
        let cr = &self.career;
        non_negative("career.resource_share", cr.resource_share);
        non_negative("career.talent_multiplier", cr.talent_multiplier);
        non_negative("career.strong_body_multiplier", cr.strong_body_multiplier);
        let r = &self.relationship;
        for (name, value) in [
            ("relationship.spouse_weight", r.spouse_weight),
            ("relationship.body_weight", r.body_weight),
            ("relationship.weak_spouse_threshold", r.weak_spouse_threshold),
            ("relationship.weak_spouse_penalty", r.weak_spouse_penalty),
            ("relationship.robs_wife_threshold", r.robs_wife_threshold),
            ("relationship.robs_wife_penalty", r.robs_wife_penalty),
            ("relationship.hurts_husband_threshold", r.hurts_husband_threshold),
            ("relationship.hurts_husband_penalty", r.hurts_husband_penalty),
        ] {
            non_negative(name, value);
        }
        non_negative("bias.wealth", self.bias.wealth);
        non_negative("bias.career", self.bias.career);
        non_negative("bias.relationship", self.bias.relationship);
        let k = &self.corrector;
        for (name, value) in [
            ("corrector.base_factor", k.base_factor),
            ("corrector.luck_weight", k.luck_weight),
            ("corrector.annual_weight", k.annual_weight),
            ("corrector.favorable_min", k.favorable_min),
            ("corrector.neutral_min", k.neutral_min),
            ("corrector.favorable_multiplier", k.favorable_multiplier),
            ("corrector.neutral_multiplier", k.neutral_multiplier),
            ("corrector.unfavorable_multiplier", k.unfavorable_multiplier),
        ] {
            non_negative(name, value);
        }
        for (id, o) in &self.overrides {
            for value in [o.corrector_factor, o.wealth_bias, o.career_bias, o.relationship_bias]
                .into_iter()
                .flatten()
            {
                non_negative(&format!("overrides.{id}"), value);
            }
        }

        if !(self.engine.max_score > 0.0 && self.engine.max_score.is_finite()) {
            errors.push(format!("engine.max_score: must be > 0, got {}", self.engine.max_score));
        }
        if !(0.0..=1.0).contains(&self.graph.damping) {
            errors.push(format!("graph.damping: must be in [0, 1], got {}", self.graph.damping));
        }
        if !(0.0..1.0).contains(&self.graph.entropy_decay) {
            errors.push(format!("graph.entropy_decay: must be in [0, 1), got {}", self.graph.entropy_decay));
        }
        for (name, value) in [
            ("graph.dominance_skip", self.graph.dominance_skip),
            ("graph.officer_stress_penalty", self.graph.officer_stress_penalty),
            ("graph.wealth_burden_penalty", self.graph.wealth_burden_penalty),
            ("graph.output_drain_penalty", self.graph.output_drain_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{name}: must be in [0, 1], got {value}"));
            }
        }
        if self.graph.rounds == 0 || self.graph.rounds > 1_000 {
            errors.push(format!("graph.rounds: must be in 1..=1000, got {}", self.graph.rounds));
        }
        if !(self.coupling.min_retention > 0.0 && self.coupling.min_retention <= 1.0) {
            errors.push(format!("coupling.min_retention: must be in (0, 1], got {}", self.coupling.min_retention));
        }
        let s = &self.strength;
        if s.weak_threshold > s.strong_threshold {
            errors.push(format!(
                "strength: weak_threshold ({}) must not exceed strong_threshold ({})",
                s.weak_threshold, s.strong_threshold
            ));
        }
        if !(s.weak_band <= s.balanced_band && s.balanced_band <= s.strong_band && s.strong_band <= s.very_strong_band) {
            errors.push("strength: bands must satisfy weak <= balanced <= strong <= very_strong".to_string());
        }
        if s.confidence_span <= 0.0 {
            errors.push(format!("strength.confidence_span: must be > 0, got {}", s.confidence_span));
        }
        for (name, value) in [
            ("wealth.low_exponent", self.wealth.low_exponent),
            ("wealth.mid_exponent", self.wealth.mid_exponent),
            ("wealth.high_exponent", self.wealth.high_exponent),
            ("career.exponent", self.career.exponent),
            ("relationship.exponent", self.relationship.exponent),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(format!("{name}: must be > 0, got {value}"));
            }
        }
        if self.wealth.low_cut > self.wealth.high_cut {
            errors.push("wealth: low_cut must not exceed high_cut".to_string());
        }
        if self.corrector.neutral_min > self.corrector.favorable_min {
            errors.push("corrector: neutral_min must not exceed favorable_min".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{ "pillar_weights": { "month": 2.5 } }"#).unwrap();
        assert_eq!(config.pillar_weights.month, 2.5);
        assert_eq!(config.pillar_weights.year, 1.0);
        assert_eq!(config.graph.rounds, 10);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_json(r#"{ "pillar_weights": { "monht": 2.5 } }"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EngineConfig::default();
        config.overrides.insert(
            "case-1".to_string(),
            CaseOverride { corrector_factor: Some(1.2), ..Default::default() },
        );
        let parsed = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = EngineConfig::default();
        config.graph.damping = 1.5;
        config.pillar_weights.month = -1.0;
        config.engine.max_score = 0.0;
        let Err(Error::Config(message)) = config.validate() else {
            panic!("expected config error");
        };
        assert!(message.contains("graph.damping"));
        assert!(message.contains("pillar_weights.month"));
        assert!(message.contains("engine.max_score"));
    }

    #[test]
    fn test_negative_shell_ratio_rejected() {
        let err = EngineConfig::from_json(r#"{ "hidden_stems": { "double_ratios": [-1.0, 0.3] } }"#).unwrap_err();
        let Error::Config(message) = err else {
            panic!("expected config error");
        };
        assert!(message.contains("hidden_stems.double_ratios"));
    }

    #[test]
    fn test_every_section_is_checked() {
        let mut config = EngineConfig::default();
        config.graph.clash_weight = -0.3;
        config.graph.officer_stress_penalty = 1.5;
        config.particles.officer_weight = -1.0;
        config.wealth.robbery_penalty = f64::NAN;
        config.career.talent_multiplier = -1.2;
        config.relationship.robs_wife_penalty = -0.8;
        config.coupling.chain_gain = -1.05;
        config.corrector.annual_weight = -0.6;
        let Err(Error::Config(message)) = config.validate() else {
            panic!("expected config error");
        };
        for name in [
            "graph.clash_weight",
            "graph.officer_stress_penalty",
            "particles.officer_weight",
            "wealth.robbery_penalty",
            "career.talent_multiplier",
            "relationship.robs_wife_penalty",
            "coupling.chain_gain",
            "corrector.annual_weight",
        ] {
            assert!(message.contains(name), "{name} missing from {message}");
        }
    }

    #[test]
    fn test_shell_ratios() {
        let h = HiddenStemWeights::default();
        assert_eq!(h.shell_ratio(1, 0), 1.0);
        assert_eq!(h.shell_ratio(2, 1), 0.3);
        assert_eq!(h.shell_ratio(3, 2), 0.1);
    }
}
