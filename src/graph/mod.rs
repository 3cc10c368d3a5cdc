//! # Graph Propagation Engine
//!
//! A ≤ 12-node model of the chart: one node per stem and branch character,
//! a signed adjacency matrix, damped iterative propagation and a final
//! stress-yield correction.
//!
//! ## Stages
//!
//! ```text
//! Uninitialized ─build_nodes─► NodesBuilt ─build_matrix─► MatrixBuilt
//!      ─propagate─► Propagated ─suppress─► Suppressed ─score─► Scored
//! ```
//!
//! Calling an operation from the wrong stage returns
//! `Error::StatePrecondition`; nothing is mutated.

mod engine;
mod matrix;
mod node;

pub use engine::{GraphEngine, GraphOutcome, SuppressionReport};
pub use matrix::AdjacencyMatrix;
pub use node::{GraphNode, NodeId, NodeSymbol};

use serde::{Deserialize, Serialize};

/// Lifecycle of a [`GraphEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStage {
    Uninitialized,
    NodesBuilt,
    MatrixBuilt,
    Propagated,
    Suppressed,
    Scored,
}

impl std::fmt::Display for GraphStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GraphStage::Uninitialized => "uninitialized",
            GraphStage::NodesBuilt => "nodes_built",
            GraphStage::MatrixBuilt => "matrix_built",
            GraphStage::Propagated => "propagated",
            GraphStage::Suppressed => "suppressed",
            GraphStage::Scored => "scored",
        };
        f.write_str(name)
    }
}
