//! Signed adjacency matrix.

use serde::{Deserialize, Serialize};

use super::node::{GraphNode, NodeSymbol};
use crate::config::GraphConfig;
use crate::lexicon::{five_combination, is_clash, six_combination};
use crate::model::Element;

/// Row-major `n × n` weights; `weight(to, from)` is the influence of node
/// `from` on node `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    n: usize,
    weights: Vec<f64>,
}

impl AdjacencyMatrix {
    pub fn zeros(n: usize) -> Self {
        Self { n, weights: vec![0.0; n * n] }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn weight(&self, to: usize, from: usize) -> f64 {
        self.weights[to * self.n + from]
    }

    pub fn set(&mut self, to: usize, from: usize, value: f64) {
        self.weights[to * self.n + from] = value;
    }

    /// `M · v`.
    pub fn apply(&self, v: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|to| (0..self.n).map(|from| self.weight(to, from) * v[from]).sum())
            .collect()
    }

    pub(crate) fn build(nodes: &[GraphNode], config: &GraphConfig) -> Self {
        let n = nodes.len();
        let mut matrix = Self::zeros(n);
        let has_water = nodes.iter().any(|node| node.element == Element::Water);

        for (from, a) in nodes.iter().enumerate() {
            for (to, b) in nodes.iter().enumerate() {
                if from == to {
                    matrix.set(to, from, config.self_retention);
                    continue;
                }
                let mut w = 0.0;
                if a.element.generates() == b.element {
                    w += config.generation_efficiency;
                    if has_water && a.element == Element::Earth && b.element == Element::Metal {
                        w += config.moisture_boost;
                    }
                }
                if a.element.controls() == b.element {
                    w -= config.control_impact;
                }
                match (a.symbol, b.symbol) {
                    (NodeSymbol::Stem(x), NodeSymbol::Stem(y)) if five_combination(x, y).is_some() => {
                        w += config.combination_weight;
                    }
                    (NodeSymbol::Branch(x), NodeSymbol::Branch(y)) => {
                        if six_combination(x, y).is_some() {
                            w += config.combination_weight;
                        }
                        if is_clash(x, y) {
                            w -= config.clash_weight;
                        }
                    }
                    _ => {}
                }
                matrix.set(to, from, w * decay(a, b, config));
            }
        }
        matrix
    }
}

fn decay(a: &GraphNode, b: &GraphNode, config: &GraphConfig) -> f64 {
    match a.slot.distance(b.slot) {
        0 => 1.0,
        1 => config.decay_adjacent,
        _ => config.decay_distant,
    }
}
