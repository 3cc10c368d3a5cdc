//! # Strength Judge
//!
//! Classifies the day master from a per-element energy field.
//!
//! | Path | Used by | Output |
//! |------|---------|--------|
//! | [`judge_by_ratio`] | graph engine | Strong / Balanced / Weak |
//! | [`judge_by_bands`] | layered pipeline | VeryStrong … Follower, with upgrades |
//!
//! Both paths first run [`is_special_pattern`]; a match yields
//! `SpecialStrong` regardless of the ratio.

use serde::{Deserialize, Serialize};

use crate::config::StrengthConfig;
use crate::model::{Chart, Element, ElementEnergy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryStrong,
    Strong,
    Balanced,
    Weak,
    Follower,
    /// One element overwhelms the chart and it is the day master's camp.
    SpecialStrong,
}

impl Strength {
    pub fn is_strong(self) -> bool {
        matches!(self, Strength::VeryStrong | Strength::Strong)
    }

    pub fn is_weak(self) -> bool {
        matches!(self, Strength::Weak | Strength::Follower)
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strength::VeryStrong => "very_strong",
            Strength::Strong => "strong",
            Strength::Balanced => "balanced",
            Strength::Weak => "weak",
            Strength::Follower => "follower",
            Strength::SpecialStrong => "special_strong",
        };
        f.write_str(name)
    }
}

/// Rule that upgraded a band verdict to `Strong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthOverride {
    /// Month branch shares the day master's element.
    MonthElement,
    /// Resource month with healthy resource and moderate output.
    ProtectedWeak,
    /// Resource month with resource share above the moderate band.
    ResourceMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthVerdict {
    pub strength: Strength,
    /// Self ratio in percent.
    pub ratio: f64,
    /// In [0.5, 1.0].
    pub confidence: f64,
    pub overridden_by: Option<StrengthOverride>,
}

/// `(self + resource) / total × 100`, or `fallback_ratio` for an empty field.
pub fn self_ratio(energy: &ElementEnergy, day_master: Element, config: &StrengthConfig) -> f64 {
    let total = energy.total();
    if total <= 0.0 {
        return config.fallback_ratio;
    }
    (energy.get(day_master) + energy.get(day_master.generated_by())) / total * 100.0
}

pub fn is_special_pattern(energy: &ElementEnergy, day_master: Element, config: &StrengthConfig) -> bool {
    if energy.total() <= 0.0 {
        return false;
    }
    let (dominant, _) = energy.dominant();
    energy.percent(dominant, 0.0) > config.special_element_share
        && self_ratio(energy, day_master, config) > config.special_self_ratio
}

fn confidence(ratio: f64, edges: &[f64], config: &StrengthConfig) -> f64 {
    let distance = edges.iter().map(|edge| (ratio - edge).abs()).fold(f64::INFINITY, f64::min);
    if !distance.is_finite() {
        return 0.5;
    }
    (0.5 + distance / config.confidence_span).clamp(0.5, 1.0)
}

fn special(ratio: f64, config: &StrengthConfig) -> StrengthVerdict {
    StrengthVerdict {
        strength: Strength::SpecialStrong,
        ratio,
        confidence: config.special_confidence,
        overridden_by: None,
    }
}

/// Two-threshold classification used by the graph path.
pub fn judge_by_ratio(energy: &ElementEnergy, day_master: Element, config: &StrengthConfig) -> StrengthVerdict {
    let ratio = self_ratio(energy, day_master, config);
    if is_special_pattern(energy, day_master, config) {
        return special(ratio, config);
    }
    let strength = if ratio >= config.strong_threshold {
        Strength::Strong
    } else if ratio >= config.weak_threshold {
        Strength::Balanced
    } else {
        Strength::Weak
    };
    StrengthVerdict {
        strength,
        ratio,
        confidence: confidence(ratio, &[config.weak_threshold, config.strong_threshold], config),
        overridden_by: None,
    }
}

/// Five-band classification with upgrade rules, used by the layered path.
pub fn judge_by_bands(energy: &ElementEnergy, chart: &Chart, config: &StrengthConfig) -> StrengthVerdict {
    let dm = chart.day_master_element();
    let ratio = self_ratio(energy, dm, config);
    if is_special_pattern(energy, dm, config) {
        return special(ratio, config);
    }

    let band = if ratio >= config.very_strong_band {
        Strength::VeryStrong
    } else if ratio >= config.strong_band {
        Strength::Strong
    } else if ratio >= config.balanced_band {
        Strength::Balanced
    } else if ratio >= config.weak_band {
        Strength::Weak
    } else {
        Strength::Follower
    };
    let edges = [config.weak_band, config.balanced_band, config.strong_band, config.very_strong_band];

    if !band.is_strong() {
        if let Some(rule) = upgrade_rule(energy, chart, config) {
            return StrengthVerdict {
                strength: Strength::Strong,
                ratio,
                confidence: config.override_confidence,
                overridden_by: Some(rule),
            };
        }
    }

    StrengthVerdict {
        strength: band,
        ratio,
        confidence: confidence(ratio, &edges, config),
        overridden_by: None,
    }
}

fn upgrade_rule(energy: &ElementEnergy, chart: &Chart, config: &StrengthConfig) -> Option<StrengthOverride> {
    let dm = chart.day_master_element();
    let month = chart.month.branch.element();
    if month == dm {
        return Some(StrengthOverride::MonthElement);
    }
    if month != dm.generated_by() {
        return None;
    }
    let resource = energy.percent(dm.generated_by(), 0.0);
    let output = energy.percent(dm.generates(), 0.0);
    if resource >= config.protected_resource_min
        && (config.protected_output_min..=config.protected_output_max).contains(&output)
    {
        return Some(StrengthOverride::ProtectedWeak);
    }
    if resource > config.resource_month_moderate {
        return Some(StrengthOverride::ResourceMonth);
    }
    None
}
