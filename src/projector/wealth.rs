//! Wealth chain: segmented amplification.

use super::amplifier::{amplify, segment_exponent};
use super::{Domain, DomainScore, Particles, Stage, Trace, domain_bias};
use crate::config::EngineConfig;
use crate::judge::StrengthVerdict;
use crate::model::Chart;

pub(super) fn score(
    particles: &Particles,
    verdict: &StrengthVerdict,
    chart: &Chart,
    corrector: f64,
    config: &EngineConfig,
) -> DomainScore {
    let w = &config.wealth;
    let max = config.engine.max_score;
    let mut trace = Trace::new(config.engine.record_breakdown);
    let mut reason = "wealth_flow";

    let mut value = trace.stage(Stage::Base, particles.wealth * w.wealth_weight + particles.peer * w.body_weight);

    if verdict.strength.is_weak() {
        value *= w.weak_body_penalty;
        trace.modifier("weak_body");
        reason = "weak_body";
    }
    if particles.peer > w.robbery_threshold {
        value *= w.robbery_penalty;
        trace.modifier("robbery");
        reason = "robbed_by_peers";
    }
    if verdict.strength.is_strong() && particles.wealth >= w.capture_min {
        value *= w.capture_bonus;
        trace.modifier("capture");
        reason = "wealth_capture";
    }
    let value = trace.stage(Stage::Modified, value);

    let exponent = segment_exponent(
        value,
        w.low_cut,
        w.high_cut,
        [w.low_exponent, w.mid_exponent, w.high_exponent],
    );
    let amplified = trace.stage(Stage::Amplified, amplify(value, max, exponent));

    let bias = domain_bias(Domain::Wealth, chart, config);
    trace.finish(Domain::Wealth, amplified, bias, corrector, max, reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::Strength;
    use crate::model::Gender;

    fn chart() -> Chart {
        Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap()
    }

    fn verdict(strength: Strength) -> StrengthVerdict {
        StrengthVerdict { strength, ratio: 50.0, confidence: 0.5, overridden_by: None }
    }

    #[test]
    fn test_capture_for_strong_body() {
        let p = Particles { peer: 20.0, output: 10.0, wealth: 30.0, officer: 10.0, resource: 30.0 };
        let score = score(&p, &verdict(Strength::Strong), &chart(), 1.0, &EngineConfig::default());
        assert_eq!(score.reason, "wealth_capture");
        let b = score.breakdown.unwrap();
        assert!((b.value_at(Stage::Base).unwrap() - 36.0).abs() < 1e-9);
        assert!((b.value_at(Stage::Modified).unwrap() - 36.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_weak_body_scores_lower() {
        let p = Particles { peer: 10.0, output: 10.0, wealth: 40.0, officer: 20.0, resource: 20.0 };
        let config = EngineConfig::default();
        let weak = score(&p, &verdict(Strength::Weak), &chart(), 1.0, &config);
        let balanced = score(&p, &verdict(Strength::Balanced), &chart(), 1.0, &config);
        assert_eq!(weak.reason, "weak_body");
        assert!(weak.score < balanced.score);
    }

    #[test]
    fn test_robbery() {
        let p = Particles { peer: 50.0, output: 5.0, wealth: 10.0, officer: 5.0, resource: 30.0 };
        let score = score(&p, &verdict(Strength::Balanced), &chart(), 1.0, &EngineConfig::default());
        assert_eq!(score.reason, "robbed_by_peers");
    }

    #[test]
    fn test_no_breakdown_when_disabled() {
        let mut config = EngineConfig::default();
        config.engine.record_breakdown = false;
        let p = Particles::default();
        let score = score(&p, &verdict(Strength::Balanced), &chart(), 1.0, &config);
        assert!(score.breakdown.is_none());
        assert_eq!(score.score, 0.0);
    }
}
