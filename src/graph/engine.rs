//! The staged engine.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::matrix::AdjacencyMatrix;
use super::node::{self, GraphNode};
use super::GraphStage;
use crate::config::EngineConfig;
use crate::judge::is_special_pattern;
use crate::model::{Chart, Element, ElementEnergy, clamp_energy};
use crate::{Error, Result};

/// Which stress-yield rules fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuppressionReport {
    /// Day master already dominant or special pattern: nothing applied.
    pub skipped: bool,
    pub officer_stress: bool,
    pub wealth_burden: bool,
    pub output_drain: bool,
    /// Product of the applied penalties.
    pub multiplier: f64,
}

impl SuppressionReport {
    fn skipped() -> Self {
        Self { skipped: true, officer_stress: false, wealth_burden: false, output_drain: false, multiplier: 1.0 }
    }
}

/// Result of a full graph run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphOutcome {
    /// Per-element energy before propagation.
    pub initial: ElementEnergy,
    /// Per-element energy after suppression.
    pub energy: ElementEnergy,
    /// Day-master element after any transformation.
    pub day_master_element: Element,
    pub suppression: SuppressionReport,
    pub nodes: Vec<GraphNode>,
}

pub struct GraphEngine<'a> {
    chart: &'a Chart,
    config: &'a EngineConfig,
    stage: GraphStage,
    nodes: SmallVec<[GraphNode; 12]>,
    matrix: AdjacencyMatrix,
    /// Per-element field at build time; drain and suppression never touch it.
    initial: ElementEnergy,
    suppression: SuppressionReport,
}

impl<'a> GraphEngine<'a> {
    pub fn new(chart: &'a Chart, config: &'a EngineConfig) -> Self {
        Self {
            chart,
            config,
            stage: GraphStage::Uninitialized,
            nodes: SmallVec::new(),
            matrix: AdjacencyMatrix::zeros(0),
            initial: ElementEnergy::zero(),
            suppression: SuppressionReport::skipped(),
        }
    }

    /// Run every stage in order.
    pub fn run(chart: &Chart, config: &EngineConfig) -> Result<GraphOutcome> {
        let mut engine = GraphEngine::new(chart, config);
        engine.build_nodes()?;
        engine.build_matrix()?;
        engine.propagate()?;
        engine.suppress()?;
        engine.score()
    }

    pub fn stage(&self) -> GraphStage {
        self.stage
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    fn require(&self, operation: &'static str, expected: GraphStage) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(Error::StatePrecondition { operation, expected, actual: self.stage })
        }
    }

    fn day_master_element(&self) -> Element {
        self.nodes
            .iter()
            .find(|n| n.is_day_master)
            .map(|n| n.element)
            .unwrap_or_else(|| self.chart.day_master_element())
    }

    fn field(&self, value: impl Fn(&GraphNode) -> f64) -> ElementEnergy {
        let mut field = ElementEnergy::zero();
        for node in &self.nodes {
            node.spread_into(&mut field, value(node));
        }
        field
    }

    // ========================================================================
    // Stages
    // ========================================================================

    pub fn build_nodes(&mut self) -> Result<()> {
        self.require("build_nodes", GraphStage::Uninitialized)?;
        self.nodes = node::build(self.chart, self.config);
        self.initial = self.field(|node| node.initial_energy);
        self.stage = GraphStage::NodesBuilt;
        tracing::trace!(nodes = self.nodes.len(), "graph nodes built");
        Ok(())
    }

    pub fn build_matrix(&mut self) -> Result<()> {
        self.require("build_matrix", GraphStage::NodesBuilt)?;
        self.matrix = AdjacencyMatrix::build(&self.nodes, &self.config.graph);
        self.stage = GraphStage::MatrixBuilt;
        Ok(())
    }

    /// Damped propagation with output drain and entropy decay per round.
    pub fn propagate(&mut self) -> Result<()> {
        self.require("propagate", GraphStage::MatrixBuilt)?;
        let g = &self.config.graph;
        let n = self.nodes.len();
        let dm = self.day_master_element();
        let output = dm.generates();

        let initial: Vec<f64> = self.nodes.iter().map(|node| node.initial_energy).collect();
        let mut current: Vec<f64> = self.nodes.iter().map(|node| node.energy).collect();

        for _ in 0..g.rounds {
            let flowed = self.matrix.apply(&current);
            for i in 0..n {
                current[i] = g.damping * flowed[i] + (1.0 - g.damping) * initial[i];
            }
            for d in 0..n {
                if self.nodes[d].share_of(dm) == 0.0 {
                    continue;
                }
                let outflow: f64 = (0..n)
                    .filter(|&o| self.nodes[o].element == output)
                    .map(|o| self.matrix.weight(o, d).max(0.0))
                    .sum();
                let retained = (1.0 - g.output_drain_rate * outflow).max(0.0);
                current[d] *= self.nodes[d].scale_element(dm, retained);
            }
            for value in current.iter_mut() {
                *value = clamp_energy(*value * (1.0 - g.entropy_decay));
            }
        }

        for (node, value) in self.nodes.iter_mut().zip(current) {
            node.energy = value;
        }
        self.stage = GraphStage::Propagated;
        Ok(())
    }

    /// Stress-yield correction measured on initial energies. Only the
    /// day-master part of each node shrinks.
    pub fn suppress(&mut self) -> Result<()> {
        self.require("suppress", GraphStage::Propagated)?;
        let g = &self.config.graph;
        let dm = self.day_master_element();
        let initial = self.initial;

        let dominant = initial.share(dm, 0.0) > g.dominance_skip;
        if dominant || is_special_pattern(&initial, dm, &self.config.strength) {
            self.suppression = SuppressionReport::skipped();
            self.stage = GraphStage::Suppressed;
            tracing::trace!(dominant, "suppression skipped");
            return Ok(());
        }

        let camp = initial.get(dm) + initial.get(dm.generated_by());
        let exceeds = |value: f64, ratio: f64| if camp > 0.0 { value / camp > ratio } else { value > 0.0 };

        let mut report = SuppressionReport {
            skipped: false,
            officer_stress: exceeds(initial.get(dm.controlled_by()), g.officer_stress_ratio),
            wealth_burden: exceeds(initial.get(dm.controls()), g.wealth_burden_ratio),
            output_drain: exceeds(initial.get(dm.generates()), g.output_drain_ratio),
            multiplier: 1.0,
        };
        if report.officer_stress {
            report.multiplier *= 1.0 - g.officer_stress_penalty;
        }
        if report.wealth_burden {
            report.multiplier *= 1.0 - g.wealth_burden_penalty;
        }
        if report.output_drain {
            report.multiplier *= 1.0 - g.output_drain_penalty;
        }

        for node in self.nodes.iter_mut() {
            let factor = node.scale_element(dm, report.multiplier);
            node.energy = clamp_energy(node.energy * factor);
        }
        self.suppression = report;
        self.stage = GraphStage::Suppressed;
        Ok(())
    }

    pub fn score(&mut self) -> Result<GraphOutcome> {
        self.require("score", GraphStage::Suppressed)?;
        let outcome = GraphOutcome {
            initial: self.initial,
            energy: self.field(|node| node.energy),
            day_master_element: self.day_master_element(),
            suppression: self.suppression,
            nodes: self.nodes.to_vec(),
        };
        self.stage = GraphStage::Scored;
        tracing::debug!(energy = %outcome.energy, "graph scored");
        Ok(outcome)
    }
}
