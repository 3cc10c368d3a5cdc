//! Relationship chain. The spouse particle is wealth for men and officer
//! for women.

use super::amplifier::amplify;
use super::{Domain, DomainScore, Particles, Stage, Trace, domain_bias};
use crate::config::EngineConfig;
use crate::model::{Chart, Gender};

pub(super) fn score(
    particles: &Particles,
    chart: &Chart,
    corrector: f64,
    config: &EngineConfig,
) -> DomainScore {
    let r = &config.relationship;
    let max = config.engine.max_score;
    let mut trace = Trace::new(config.engine.record_breakdown);
    let mut reason = "spouse_supported";

    let spouse = match chart.gender {
        Gender::Male => particles.wealth,
        Gender::Female => particles.officer,
    };
    let mut value = trace.stage(Stage::Base, spouse * r.spouse_weight + particles.peer * r.body_weight);

    if spouse < r.weak_spouse_threshold {
        value *= r.weak_spouse_penalty;
        trace.modifier("weak_spouse");
        reason = "weak_spouse";
    }
    match chart.gender {
        Gender::Male if particles.peer > r.robs_wife_threshold => {
            value *= r.robs_wife_penalty;
            trace.modifier("robs_wife");
            reason = "robs_wife";
        }
        Gender::Female if particles.output > r.hurts_husband_threshold => {
            value *= r.hurts_husband_penalty;
            trace.modifier("hurts_husband");
            reason = "hurts_husband";
        }
        _ => {}
    }
    let value = trace.stage(Stage::Modified, value);
    let amplified = trace.stage(Stage::Amplified, amplify(value, max, r.exponent));

    let bias = domain_bias(Domain::Relationship, chart, config);
    trace.finish(Domain::Relationship, amplified, bias, corrector, max, reason.to_string())
}
