//! Career chain: the stronger of the bureaucratic and talent paths.

use super::amplifier::amplify;
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
    let c = &config.career;
    let max = config.engine.max_score;
    let mut trace = Trace::new(config.engine.record_breakdown);

    let bureaucratic = particles.officer + c.resource_share * particles.resource;
    let talent = c.talent_multiplier * particles.output;
    // ties go to the bureaucratic path
    let (base, reason) = if talent > bureaucratic { (talent, "talent") } else { (bureaucratic, "bureaucratic") };
    let mut value = trace.stage(Stage::Base, base);

    if verdict.strength.is_strong() {
        value *= c.strong_body_multiplier;
        trace.modifier("strong_body");
    }
    let value = trace.stage(Stage::Modified, value);
    let amplified = trace.stage(Stage::Amplified, amplify(value, max, c.exponent));

    let bias = domain_bias(Domain::Career, chart, config);
    trace.finish(Domain::Career, amplified, bias, corrector, max, reason.to_string())
}
