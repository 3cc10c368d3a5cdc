//! # Computation Paths
//!
//! One enum selects how the final energy field and the verdict are
//! produced. Everything downstream (projector, breakdown) is shared.
//!
//! | Path | Energy | Verdict |
//! |------|--------|---------|
//! | `Layered` | initializer → interactions → coupling | five bands + upgrades |
//! | `Graph` | node graph, damped propagation, suppression | two thresholds |

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::graph::{GraphEngine, GraphOutcome};
use crate::judge::{self, StrengthVerdict};
use crate::model::{Chart, Element, ElementEnergy};
use crate::pipeline::{self, CouplingReport, InteractionEvent, RawEnergy};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationPath {
    #[default]
    Layered,
    Graph,
}

impl std::fmt::Display for ComputationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputationPath::Layered => write!(f, "layered"),
            ComputationPath::Graph => write!(f, "graph"),
        }
    }
}

/// Everything a path produces before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    pub path: ComputationPath,
    /// Initializer output; shared by both paths for reporting.
    pub raw: RawEnergy,
    pub energy: ElementEnergy,
    /// Day-master element the projector should use.
    pub day_master: Element,
    pub verdict: StrengthVerdict,
    /// Layered only.
    pub events: Vec<InteractionEvent>,
    /// Layered only.
    pub coupling: Option<CouplingReport>,
    /// Graph only.
    pub graph: Option<GraphOutcome>,
}

impl ComputationPath {
    pub fn run(self, chart: &Chart, config: &EngineConfig) -> Result<PathOutcome> {
        match self {
            ComputationPath::Layered => Ok(layered(chart, config)),
            ComputationPath::Graph => graph(chart, config),
        }
    }
}

fn layered(chart: &Chart, config: &EngineConfig) -> PathOutcome {
    let outcome = pipeline::run(chart, config);
    let energy = outcome.coupling.energy;
    let verdict = judge::judge_by_bands(&energy, chart, &config.strength);
    PathOutcome {
        path: ComputationPath::Layered,
        raw: outcome.raw,
        energy,
        day_master: chart.day_master_element(),
        verdict,
        events: outcome.interactions.events,
        coupling: Some(outcome.coupling),
        graph: None,
    }
}

fn graph(chart: &Chart, config: &EngineConfig) -> Result<PathOutcome> {
    let raw = pipeline::initialize(chart, config);
    let outcome = GraphEngine::run(chart, config)?;
    let verdict = judge::judge_by_ratio(&outcome.energy, outcome.day_master_element, &config.strength);
    Ok(PathOutcome {
        path: ComputationPath::Graph,
        raw,
        energy: outcome.energy,
        day_master: outcome.day_master_element,
        verdict,
        events: Vec::new(),
        coupling: None,
        graph: Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    #[test]
    fn test_default_is_layered() {
        assert_eq!(ComputationPath::default(), ComputationPath::Layered);
        assert_eq!(serde_json::to_string(&ComputationPath::Graph).unwrap(), "\"graph\"");
    }

    #[test]
    fn test_paths_fill_their_own_diagnostics() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male).unwrap();
        let config = EngineConfig::default();
        let layered = ComputationPath::Layered.run(&chart, &config).unwrap();
        assert!(layered.coupling.is_some() && layered.graph.is_none());
        let graph = ComputationPath::Graph.run(&chart, &config).unwrap();
        assert!(graph.graph.is_some() && graph.coupling.is_none());
        assert_eq!(layered.raw, graph.raw);
    }
}
