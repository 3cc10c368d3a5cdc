//! The result of analysing one chart.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::graph::GraphOutcome;
use crate::judge::StrengthVerdict;
use crate::model::{Chart, ElementEnergy};
use crate::pipeline::{CouplingReport, InteractionEvent, RootedStem};
use crate::projector::{self, CorrectorOutcome, Domain, DomainScore, Particles};
use crate::strategy::ComputationPath;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub path: ComputationPath,
    /// Initializer output, before interactions.
    pub raw_energy: ElementEnergy,
    pub rooted: Vec<RootedStem>,
    /// Field the verdict and domain scores are computed from.
    pub final_energy: ElementEnergy,
    pub events: Vec<InteractionEvent>,
    pub coupling: Option<CouplingReport>,
    pub graph: Option<GraphOutcome>,
    pub verdict: StrengthVerdict,
    pub particles: Particles,
    pub corrector: CorrectorOutcome,
    pub wealth: DomainScore,
    pub career: DomainScore,
    pub relationship: DomainScore,
}

impl Analysis {
    pub fn score(&self, domain: Domain) -> &DomainScore {
        match domain {
            Domain::Wealth => &self.wealth,
            Domain::Career => &self.career,
            Domain::Relationship => &self.relationship,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Analyze `chart` against an explicit configuration snapshot.
///
/// Pure: no I/O, no shared state; identical inputs give identical output.
pub fn analyze_with(chart: &Chart, config: &EngineConfig) -> Result<Analysis> {
    let path = config.engine.path;
    let outcome = path.run(chart, config)?;
    let projection = projector::project(&outcome.energy, outcome.day_master, chart, &outcome.verdict, config);

    tracing::debug!(
        %chart,
        %path,
        strength = %outcome.verdict.strength,
        wealth = projection.wealth.score,
        career = projection.career.score,
        relationship = projection.relationship.score,
        "chart analyzed"
    );

    Ok(Analysis {
        path,
        raw_energy: outcome.raw.energy,
        rooted: outcome.raw.rooted,
        final_energy: outcome.energy,
        events: outcome.events,
        coupling: outcome.coupling,
        graph: outcome.graph,
        verdict: outcome.verdict,
        particles: projection.particles,
        corrector: projection.corrector,
        wealth: projection.wealth,
        career: projection.career,
        relationship: projection.relationship,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Gender};
    use crate::judge::Strength;

    #[test]
    fn test_reference_chart_layered() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        let analysis = analyze_with(&chart, &EngineConfig::default()).unwrap();
        assert_eq!(analysis.path, ComputationPath::Layered);
        assert!((analysis.final_energy.get(Element::Earth) - 36.6).abs() < 1e-9);
        assert_eq!(analysis.verdict.strength, Strength::Strong);
        assert!((analysis.verdict.ratio - 77.2 / 138.4 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_graph_path_selected_by_config() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        let mut config = EngineConfig::default();
        config.engine.path = ComputationPath::Graph;
        let analysis = analyze_with(&chart, &config).unwrap();
        assert_eq!(analysis.path, ComputationPath::Graph);
        assert!(analysis.graph.is_some());
        assert!(analysis.events.is_empty());
    }

    #[test]
    fn test_serializes_to_json() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        let json = analyze_with(&chart, &EngineConfig::default()).unwrap().to_json().unwrap();
        assert!(json.contains("\"verdict\""));
        assert!(json.contains("\"wealth\""));
    }
}
