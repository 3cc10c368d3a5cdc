//! Coupling resolver: chain amplification, resonance and force
//! cancellation on the day-master element. Gated by `coupling.enabled`.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::{Chart, Element, ElementEnergy, PillarSlot};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CouplingReport {
    pub energy: ElementEnergy,
    /// 0 (no chain), 2 (month → day) or 3 (year → month → day).
    pub chain_length: u32,
    /// Non-day stems generating the day master.
    pub resonance_count: u32,
    /// Retention applied by force cancellation, 1.0 when not triggered.
    pub cancellation: f64,
}

/// Generation chain ending at the day stem.
pub fn chain_length(chart: &Chart) -> u32 {
    let dm = chart.day_master_element();
    let month = chart.month.stem.element();
    if month.generates() != dm {
        return 0;
    }
    if chart.year.stem.element().generates() == month { 3 } else { 2 }
}

pub fn resonance_count(chart: &Chart) -> u32 {
    let dm = chart.day_master_element();
    [chart.year, chart.month, chart.hour]
        .iter()
        .filter(|p| p.stem.element().generates() == dm)
        .count() as u32
}

/// Pillar-weighted (support, control) over the non-day natal stems.
pub fn support_and_control(chart: &Chart, config: &EngineConfig) -> (f64, f64) {
    let dm = chart.day_master_element();
    let mut support = 0.0;
    let mut control = 0.0;
    for (slot, pillar) in chart.natal() {
        if slot == PillarSlot::Day {
            continue;
        }
        let weight = config.pillar_weights.weight(slot);
        let element = pillar.stem.element();
        if element == dm || element.generates() == dm {
            support += weight;
        } else if element.controls() == dm {
            control += weight;
        }
    }
    (support, control)
}

pub fn resolve(chart: &Chart, energy: ElementEnergy, config: &EngineConfig) -> CouplingReport {
    let mut report = CouplingReport { energy, chain_length: 0, resonance_count: 0, cancellation: 1.0 };
    let c = &config.coupling;
    if !c.enabled {
        return report;
    }
    let dm: Element = chart.day_master_element();

    report.chain_length = chain_length(chart);
    if report.chain_length > 0 {
        report.energy.scale(dm, c.chain_gain.powi(report.chain_length as i32));
    }

    report.resonance_count = resonance_count(chart);
    if report.resonance_count >= 2 {
        report.energy.scale(dm, 1.0 + (report.resonance_count - 1) as f64 * c.resonance_boost);
    }

    let (support, control) = support_and_control(chart, config);
    if control > 0.0 {
        let ratio = (support - control * c.cancellation_damping) / (support + control);
        // a negative ratio keeps the retention floor; small positive ratios apply as is
        report.cancellation = if ratio < 0.0 { c.min_retention } else { ratio.min(1.0) };
        report.energy.scale(dm, report.cancellation);
    }

    if report.chain_length > 0 || report.resonance_count >= 2 || report.cancellation < 1.0 {
        tracing::debug!(
            chain = report.chain_length,
            resonance = report.resonance_count,
            cancellation = report.cancellation,
            "coupling applied to {dm}"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn chart(pillars: [&str; 4]) -> Chart {
        let dm = pillars[2].chars().next().unwrap();
        Chart::parse(pillars, dm, Gender::Female).unwrap()
    }

    #[test]
    fn test_chain_of_three() {
        // water → wood → fire
        let c = chart(["壬子", "甲寅", "丙午", "丙午"]);
        assert_eq!(chain_length(&c), 3);
        let report = resolve(&c, ElementEnergy::from_values([0.0, 10.0, 0.0, 0.0, 0.0]), &EngineConfig::default());
        // the year stem of a three-link chain always controls the day master
        let retention = (2.7 - 1.0 * 0.5) / (2.7 + 1.0);
        assert!((report.cancellation - retention).abs() < 1e-9);
        assert!((report.energy.get(Element::Fire) - 10.0 * 1.05f64.powi(3) * retention).abs() < 1e-9);
    }

    #[test]
    fn test_chain_of_two() {
        let c = chart(["庚子", "甲寅", "丙午", "丙午"]);
        assert_eq!(chain_length(&c), 2);
    }

    #[test]
    fn test_resonance() {
        // year and hour wood both feed a fire day master
        let c = chart(["甲子", "庚子", "丙午", "乙未"]);
        assert_eq!(resonance_count(&c), 2);
    }

    #[test]
    fn test_cancellation_floors_at_retention() {
        // all three non-day stems are water controlling a fire day master
        let c = chart(["壬子", "壬子", "丙午", "癸亥"]);
        let report = resolve(&c, ElementEnergy::from_values([0.0, 10.0, 0.0, 0.0, 0.0]), &EngineConfig::default());
        assert_eq!(report.cancellation, 0.1);
        assert!((report.energy.get(Element::Fire) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_positive_ratio_is_not_floored() {
        // year 甲 supports (1.0), month 庚 controls (1.8), hour 丙 is neither
        let c = chart(["甲子", "庚子", "甲子", "丙子"]);
        let config = EngineConfig::default();
        assert_eq!(support_and_control(&c, &config), (1.0, 1.8));

        let report = resolve(&c, ElementEnergy::from_values([10.0, 0.0, 0.0, 0.0, 0.0]), &config);
        let ratio = (1.0 - 1.8 * 0.5) / (1.0 + 1.8);
        assert!(ratio < config.coupling.min_retention);
        assert!((report.cancellation - ratio).abs() < 1e-12);
        assert!((report.energy.get(Element::Wood) - 10.0 * ratio).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_is_identity() {
        let mut config = EngineConfig::default();
        config.coupling.enabled = false;
        let c = chart(["壬子", "甲寅", "丙午", "丙午"]);
        let energy = ElementEnergy::from_values([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(resolve(&c, energy, &config).energy, energy);
    }
}
