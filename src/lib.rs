//! # pillar-engine — Deterministic Four-Pillar Scoring
//!
//! Converts a symbolic four-pillar chart into element energies, a strength
//! verdict and three domain scores (wealth, career, relationship).
//!
//! ## Design Principles
//!
//! 1. **Snapshot-first**: every analysis reads one immutable `EngineConfig`
//! 2. **Clean DTOs**: `Chart`, `Pillar`, `ElementEnergy` cross all boundaries
//! 3. **Pure stages**: initializer → interactions → coupling → judge → projector
//! 4. **One dispatch point**: `ComputationPath` selects layered or graph energy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pillar_engine::{Chart, Engine, EngineConfig, Gender};
//!
//! # fn example() -> pillar_engine::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//!
//! let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Male)?
//!     .with_annual_str("丙午")?;
//!
//! let analysis = engine.analyze(&chart)?;
//! println!("{} wealth={:.1}", analysis.verdict.strength, analysis.wealth.score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Computation Paths
//!
//! | Path | Config value | Description |
//! |------|--------------|-------------|
//! | Layered | `"layered"` (default) | initializer → interactions → coupling, band judge |
//! | Graph | `"graph"` | ≤12-node damped propagation, ratio judge |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod lexicon;
pub mod config;
pub mod pipeline;
pub mod graph;
pub mod judge;
pub mod projector;
pub mod strategy;
pub mod analysis;
pub mod calibration;
pub mod calendar;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Element, Relation, Stem, Branch, Polarity,
    Pillar, PillarSlot, Chart, Gender, ElementEnergy,
};

// ============================================================================
// Re-exports: Configuration
// ============================================================================

pub use config::{EngineConfig, ConfigStore, CaseOverride, merge_json};

// ============================================================================
// Re-exports: Engine surface
// ============================================================================

pub use analysis::{Analysis, analyze_with};
pub use graph::{GraphEngine, GraphStage, GraphOutcome};
pub use judge::{Strength, StrengthVerdict};
pub use projector::{Domain, DomainScore, DomainScoreBreakdown};
pub use strategy::ComputationPath;

// ============================================================================
// Re-exports: Calendar seam and calibration
// ============================================================================

pub use calendar::{PillarSource, FixedPillars, TransientPillars};
pub use calibration::{CalibrationCase, CalibrationReport, CandidateScore, evaluate, rank_candidates};

use std::sync::Arc;

// ============================================================================
// Top-level Engine handle
// ============================================================================

/// The primary entry point. An `Engine` owns a configuration store and
/// runs analyses against a snapshot taken at the start of every call.
#[derive(Clone)]
pub struct Engine {
    store: ConfigStore,
}

impl Engine {
    /// Create an engine over an in-memory configuration store.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self { store: ConfigStore::in_memory(config)? })
    }

    /// Create an engine over an existing store (e.g. a file-backed one).
    pub fn with_store(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Analyze a chart with the current configuration snapshot.
    ///
    /// The snapshot is taken once; a concurrent `save()` on the store is
    /// never observed mid-run.
    pub fn analyze(&self, chart: &Chart) -> Result<Analysis> {
        let snapshot = self.store.snapshot();
        analyze_with(chart, &snapshot)
    }

    /// The snapshot the next `analyze()` call would use.
    pub fn config(&self) -> Arc<EngineConfig> {
        self.store.snapshot()
    }

    /// Access the underlying store (for saving partial updates).
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid pillar '{input}': {reason}")]
    InvalidPillar { input: String, reason: String },

    #[error("Unknown {alphabet} symbol '{symbol}'")]
    UnknownSymbol { symbol: char, alphabet: &'static str },

    #[error("Day master '{given}' does not match day pillar stem '{expected}'")]
    DayMasterMismatch { given: char, expected: char },

    #[error("Graph stage error: {operation} requires {expected}, engine is at {actual}")]
    StatePrecondition {
        operation: &'static str,
        expected: GraphStage,
        actual: GraphStage,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
