//! End-to-end scenarios on reference charts.
//!
//! Each test runs the public surface: `Chart::parse` → `Engine::analyze`
//! (or a single pipeline stage) under default or minimally patched config.

use pretty_assertions::assert_eq;

use pillar_engine::config::CaseOverride;
use pillar_engine::judge::Strength;
use pillar_engine::pipeline::{self, InteractionKind, interaction};
use pillar_engine::projector::{CorrectorBand, Stage};
use pillar_engine::{Chart, Element, ElementEnergy, Engine, EngineConfig, Gender};

fn reference_chart() -> Chart {
    Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// A. Wood day master, no metal symbols
// ============================================================================

#[test]
fn test_scenario_a_wood_beats_metal() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let analysis = engine.analyze(&reference_chart()).unwrap();

    assert!(analysis.final_energy.get(Element::Wood) > analysis.final_energy.get(Element::Metal));
    assert!(analysis.raw_energy.get(Element::Wood) > analysis.raw_energy.get(Element::Metal));
}

#[test]
fn test_scenario_a_recorded_baseline() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let analysis = engine.analyze(&reference_chart()).unwrap();

    let expected = ElementEnergy::from_values([51.9, 19.2, 36.6, 5.4, 25.3]);
    for (element, value) in expected.iter() {
        assert!(close(analysis.final_energy.get(element), value), "{element}: {}", analysis.final_energy);
    }
    assert_eq!(analysis.events.len(), 1);
    assert_eq!(analysis.events[0].kind, InteractionKind::SixCombination);

    assert_eq!(analysis.verdict.strength, Strength::Strong);
    assert!(close(analysis.verdict.ratio, 77.2 / 138.4 * 100.0));
    assert!((analysis.verdict.confidence - 0.539).abs() < 1e-3);
    assert_eq!(analysis.verdict.overridden_by, None);
}

#[test]
fn test_scenario_a_is_reproducible() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let first = engine.analyze(&reference_chart()).unwrap();
    let second = engine.analyze(&reference_chart()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// B. Metal day master in an earth month
// ============================================================================

#[test]
fn test_scenario_b_earth_formula() {
    let mut config = EngineConfig::default();
    // isolate the documented formula from rooting bonuses
    config.rooting.root_bonus = 1.0;
    config.rooting.same_pillar_bonus = 1.0;

    let chart = Chart::parse(["戊子", "己未", "庚午", "丙子"], '庚', Gender::Female).unwrap();
    let raw = pipeline::initialize(&chart, &config);

    let base = config.engine.base_score;
    let w = &config.pillar_weights;
    let h = &config.hidden_stems;
    // 戊 year stem + 己 month stem + 己 main in 未 + 己 middle in 午
    let expected = base * w.year + base * w.month + h.main * w.month + h.middle * w.day;
    assert!(close(raw.energy.get(Element::Earth), expected));
    assert!(close(expected, 54.4));
}

// ============================================================================
// C. Sealed water vault
// ============================================================================

#[test]
fn test_scenario_c_sealed_vault() {
    let config = EngineConfig::default();
    let chart = Chart::parse(["甲午", "丙午", "戊辰", "丁巳"], '戊', Gender::Male).unwrap();

    let raw = pipeline::initialize(&chart, &config);
    let water_before = raw.energy.get(Element::Water);
    assert!(water_before < config.interactions.vault_open_threshold);

    let report = interaction::resolve(&chart, raw.energy, &config.interactions);
    let last = report.events.last().unwrap();
    assert_eq!(last.kind, InteractionKind::VaultSealed);
    assert_eq!(last.element, Element::Water);
    assert_eq!(report.energy.get(Element::Water), (water_before - 5.0).max(0.0));
}

#[test]
fn test_scenario_c_vault_pass_in_isolation() {
    let config = EngineConfig::default();
    let chart = Chart::parse(["甲午", "丙午", "戊辰", "丁巳"], '戊', Gender::Male).unwrap();

    let mut energy = ElementEnergy::from_values([10.0, 40.0, 30.0, 5.0, 12.0]);
    let mut events = Vec::new();
    interaction::vault(&chart, &mut energy, &config.interactions, &mut events);

    assert_eq!(energy.get(Element::Water), 7.0);
    assert_eq!(events.len(), 1);
    assert!(close(events[0].delta, -5.0));
}

// ============================================================================
// D. Corrector without transient pillars
// ============================================================================

#[test]
fn test_scenario_d_unfavorable_without_transients() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let analysis = engine.analyze(&reference_chart()).unwrap();

    assert_eq!(analysis.corrector.band, CorrectorBand::Unfavorable);
    assert!(close(analysis.corrector.factor, 0.85));

    let breakdown = analysis.wealth.breakdown.as_ref().unwrap();
    let recapped = breakdown.value_at(Stage::Recapped).unwrap();
    let corrected = breakdown.value_at(Stage::Corrected).unwrap();
    assert!(close(corrected, recapped * 0.85));
}

#[test]
fn test_scenario_d_case_override_multiplies() {
    let mut config = EngineConfig::default();
    config.overrides.insert(
        "case-d".to_string(),
        CaseOverride { corrector_factor: Some(1.2), ..Default::default() },
    );
    let engine = Engine::new(config).unwrap();
    let analysis = engine.analyze(&reference_chart().with_case_id("case-d")).unwrap();

    assert!(analysis.corrector.overridden);
    assert!(close(analysis.corrector.factor, 1.0 * 0.85 * 1.2));
}
