//! # Layered Pipeline
//!
//! The direct energy path: each stage takes the previous stage's
//! `ElementEnergy` by value and returns a new one plus a report.
//!
//! ```text
//! Chart ──► initializer ──► interaction ──► coupling ──► ElementEnergy
//!              RawEnergy      events          CouplingReport
//! ```

pub mod initializer;
pub mod interaction;
pub mod coupling;

pub use initializer::{RawEnergy, RootedStem, initialize};
pub use interaction::{InteractionEvent, InteractionKind, InteractionReport};
pub use coupling::CouplingReport;

use crate::config::EngineConfig;
use crate::model::Chart;

/// Output of the full layered pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredOutcome {
    pub raw: RawEnergy,
    pub interactions: InteractionReport,
    pub coupling: CouplingReport,
}

/// Run initializer → interaction → coupling.
pub fn run(chart: &Chart, config: &EngineConfig) -> LayeredOutcome {
    let raw = initialize(chart, config);
    tracing::trace!(energy = %raw.energy, rooted = raw.rooted.len(), "initialized");

    let interactions = interaction::resolve(chart, raw.energy, &config.interactions);
    tracing::trace!(energy = %interactions.energy, events = interactions.events.len(), "interactions resolved");

    let coupling = coupling::resolve(chart, interactions.energy, config);
    tracing::trace!(energy = %coupling.energy, "coupling resolved");

    LayeredOutcome { raw, interactions, coupling }
}
