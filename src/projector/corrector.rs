//! Transient-period corrector.
//!
//! Scores how well the luck and annual pillars carry the elements the
//! verdict favours, then maps the weighted match onto three bands.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::judge::Strength;
use crate::model::{Chart, Element, Pillar, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectorBand {
    Favorable,
    Neutral,
    Unfavorable,
    /// Case id on the exclusion list.
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectorOutcome {
    /// Weighted match in [0, 1].
    pub matched: f64,
    pub band: CorrectorBand,
    pub factor: f64,
    /// A per-case `corrector_factor` was applied.
    pub overridden: bool,
}

/// Relations the verdict benefits from.
pub fn favorable_relations(strength: Strength) -> &'static [Relation] {
    match strength {
        Strength::VeryStrong | Strength::Strong | Strength::Follower => {
            &[Relation::Output, Relation::Wealth, Relation::Officer]
        }
        Strength::Balanced => &[Relation::Output, Relation::Wealth],
        Strength::Weak | Strength::SpecialStrong => &[Relation::Peer, Relation::Resource],
    }
}

/// 0.5 per favourable symbol (stem, branch) of `pillar`.
pub fn pillar_match(pillar: Pillar, day_master: Element, favorable: &[Relation]) -> f64 {
    let hit = |element: Element| favorable.contains(&Relation::of(element, day_master));
    let mut score = 0.0;
    if hit(pillar.stem.element()) {
        score += 0.5;
    }
    if hit(pillar.branch.element()) {
        score += 0.5;
    }
    score
}

pub fn correct(chart: &Chart, day_master: Element, strength: Strength, config: &EngineConfig) -> CorrectorOutcome {
    let c = &config.corrector;
    if let Some(id) = chart.case_id.as_deref() {
        if c.excluded_cases.iter().any(|excluded| excluded == id) {
            return CorrectorOutcome { matched: 0.0, band: CorrectorBand::Excluded, factor: 1.0, overridden: false };
        }
    }

    let favorable = favorable_relations(strength);
    let of = |pillar: Option<Pillar>| pillar.map_or(0.0, |p| pillar_match(p, day_master, favorable));
    let matched = c.luck_weight * of(chart.luck) + c.annual_weight * of(chart.annual);

    let (band, multiplier) = if matched >= c.favorable_min {
        (CorrectorBand::Favorable, c.favorable_multiplier)
    } else if matched >= c.neutral_min {
        (CorrectorBand::Neutral, c.neutral_multiplier)
    } else {
        (CorrectorBand::Unfavorable, c.unfavorable_multiplier)
    };
    let mut factor = c.base_factor * multiplier;

    let override_factor = config.override_for(chart.case_id.as_deref()).and_then(|o| o.corrector_factor);
    if let Some(extra) = override_factor {
        factor *= extra;
    }

    CorrectorOutcome { matched, band, factor, overridden: override_factor.is_some() }
}
