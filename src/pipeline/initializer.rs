//! Energy initializer: symbols → raw per-element energy.
//!
//! - every stem except the day master adds `base_score × slot weight`
//! - every branch adds `slot weight × hidden weight` per hidden stem
//! - rooted natal stems earn `original × (bonus − 1)` on top

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::lexicon::{contains_hidden, hidden_stems};
use crate::model::{Chart, ElementEnergy, PillarSlot, Stem};

/// A stem that found itself among the natal hidden stems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootedStem {
    pub slot: PillarSlot,
    pub stem: Stem,
    /// Rooted in its own pillar's branch.
    pub same_pillar: bool,
    /// Energy added by the root.
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEnergy {
    pub energy: ElementEnergy,
    pub rooted: Vec<RootedStem>,
}

pub fn initialize(chart: &Chart, config: &EngineConfig) -> RawEnergy {
    let base = config.engine.base_score;
    let weights = &config.pillar_weights;
    let mut energy = ElementEnergy::zero();
    let mut rooted = Vec::new();

    for (slot, pillar) in chart.pillars() {
        let weight = weights.weight(slot);

        if slot != PillarSlot::Day {
            let original = base * weight;
            energy.add(pillar.stem.element(), original);

            if !slot.is_transient() {
                let same_pillar = contains_hidden(pillar.branch, pillar.stem);
                let any_root = same_pillar
                    || chart.natal().iter().any(|(_, p)| contains_hidden(p.branch, pillar.stem));
                if any_root {
                    let multiplier = if same_pillar {
                        config.rooting.same_pillar_bonus
                    } else {
                        config.rooting.root_bonus
                    };
                    let bonus = original * (multiplier - 1.0);
                    energy.add(pillar.stem.element(), bonus);
                    rooted.push(RootedStem { slot, stem: pillar.stem, same_pillar, bonus });
                }
            }
        }

        for hidden in hidden_stems(pillar.branch) {
            energy.add(hidden.stem.element(), weight * config.hidden_stems.weight(hidden.role));
        }
    }

    RawEnergy { energy, rooted }
}
