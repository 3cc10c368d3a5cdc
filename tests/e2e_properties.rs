//! Property tests over randomly generated charts.
//!
//! Charts are drawn from the full 10 × 12 alphabet, with and without
//! transient pillars, on both computation paths.

use proptest::prelude::*;

use pillar_engine::judge::self_ratio;
use pillar_engine::{
    Branch, Chart, ComputationPath, Element, ElementEnergy, EngineConfig, Gender, Pillar, Stem, analyze_with,
};
use pillar_engine::config::StrengthConfig;

fn pillar() -> impl Strategy<Value = Pillar> {
    (0usize..10, 0usize..12).prop_map(|(s, b)| Pillar::new(Stem::ALL[s], Branch::ALL[b]))
}

fn chart() -> impl Strategy<Value = Chart> {
    (
        [pillar(), pillar(), pillar(), pillar()],
        proptest::option::of(pillar()),
        proptest::option::of(pillar()),
        any::<bool>(),
    )
        .prop_map(|(natal, luck, annual, male)| {
            let gender = if male { Gender::Male } else { Gender::Female };
            let mut chart = Chart::new(natal, gender);
            chart.luck = luck;
            chart.annual = annual;
            chart
        })
}

fn path() -> impl Strategy<Value = ComputationPath> {
    prop_oneof![Just(ComputationPath::Layered), Just(ComputationPath::Graph)]
}

fn config_for(path: ComputationPath) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.engine.path = path;
    config
}

fn energy() -> impl Strategy<Value = ElementEnergy> {
    proptest::array::uniform5(0.0f64..200.0).prop_map(ElementEnergy::from_values)
}

proptest! {
    // ========================================================================
    // 1. Idempotence
    // ========================================================================

    #[test]
    fn prop_identical_inputs_identical_output(chart in chart(), path in path()) {
        let config = config_for(path);
        let first = analyze_with(&chart, &config).unwrap();
        let second = analyze_with(&chart, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    // ========================================================================
    // 2. Non-negativity
    // ========================================================================

    #[test]
    fn prop_energies_never_negative(chart in chart(), path in path()) {
        let analysis = analyze_with(&chart, &config_for(path)).unwrap();
        prop_assert!(analysis.raw_energy.is_non_negative());
        prop_assert!(analysis.final_energy.is_non_negative());
        if let Some(graph) = &analysis.graph {
            for node in &graph.nodes {
                prop_assert!(node.energy.is_finite() && node.energy >= 0.0);
            }
        }
        if let Some(coupling) = &analysis.coupling {
            prop_assert!(coupling.energy.is_non_negative());
        }
    }

    // ========================================================================
    // 3. Score bounds
    // ========================================================================

    #[test]
    fn prop_scores_within_bounds(chart in chart(), path in path(), max in 1.0f64..500.0) {
        let mut config = config_for(path);
        config.engine.max_score = max;
        let analysis = analyze_with(&chart, &config).unwrap();
        for score in [&analysis.wealth, &analysis.career, &analysis.relationship] {
            prop_assert!(score.score.is_finite());
            prop_assert!((0.0..=max).contains(&score.score), "{:?}", score);
        }
        prop_assert!((0.5..=1.0).contains(&analysis.verdict.confidence));
    }

    #[test]
    fn prop_identical_pillars_stay_bounded(p in pillar(), path in path(), transients in any::<bool>()) {
        let mut chart = Chart::new([p; 4], Gender::Male);
        if transients {
            chart.luck = Some(p);
            chart.annual = Some(p);
        }
        let analysis = analyze_with(&chart, &config_for(path)).unwrap();
        for score in [&analysis.wealth, &analysis.career, &analysis.relationship] {
            prop_assert!((0.0..=100.0).contains(&score.score));
        }
    }

    // ========================================================================
    // 4. Monotonicity of the ratio score in the day-master element
    // ========================================================================

    #[test]
    fn prop_ratio_monotone_in_day_master(
        field in energy(),
        dm in 0usize..5,
        delta in 0.0f64..100.0,
    ) {
        let config = StrengthConfig::default();
        let dm = Element::ALL[dm];
        let mut raised = field;
        raised.add(dm, delta);
        prop_assert!(self_ratio(&raised, dm, &config) + 1e-9 >= self_ratio(&field, dm, &config));
    }
}
