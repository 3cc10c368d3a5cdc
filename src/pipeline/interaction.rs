//! Interaction resolver.
//!
//! Fixed-order passes over the energy field. Each pass is public so a single
//! rule can be exercised in isolation:
//!
//! | # | Pass | Scope | Effect |
//! |---|------|-------|--------|
//! | a | [`five_combinations`] | adjacent natal stems | transform bonus / binding |
//! | b | [`triads`] | all branches | × trine / assembly bonus |
//! | c | [`six_combinations`] | branch pairs | + bonus |
//! | d | [`clashes`] | branch pairs | − penalty on both |
//! | e | [`punishments`] | branch pairs | − penalty on both |
//! | f | [`harms`] | branch pairs | − penalty on both |
//! | g | [`vault`] | day branch | × open or − sealed |

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::config::InteractionConfig;
use crate::lexicon::{
    self, ASSEMBLIES, TRINES, TriadKind, five_combination, transformation_supported, vault_element,
};
use crate::model::{Branch, Chart, Element, ElementEnergy, PillarSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    CombinationTransformed,
    CombinationBound,
    Trine,
    Assembly,
    SixCombination,
    Clash,
    Punishment,
    Harm,
    VaultOpen,
    VaultSealed,
}

/// One applied rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub slots: SmallVec<[PillarSlot; 3]>,
    /// The element the rule is about (target, triad or vault element).
    pub element: Element,
    /// Change in total energy caused by the rule.
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractionReport {
    pub energy: ElementEnergy,
    pub events: Vec<InteractionEvent>,
}

/// Run every pass in order.
pub fn resolve(chart: &Chart, energy: ElementEnergy, config: &InteractionConfig) -> InteractionReport {
    let mut energy = energy;
    let mut events = Vec::new();

    five_combinations(chart, &mut energy, config, &mut events);
    triads(chart, &mut energy, config, &mut events);
    six_combinations(chart, &mut energy, config, &mut events);
    clashes(chart, &mut energy, config, &mut events);
    punishments(chart, &mut energy, config, &mut events);
    harms(chart, &mut energy, config, &mut events);
    vault(chart, &mut energy, config, &mut events);

    InteractionReport { energy, events }
}

fn record(
    events: &mut Vec<InteractionEvent>,
    kind: InteractionKind,
    slots: SmallVec<[PillarSlot; 3]>,
    element: Element,
    before: f64,
    energy: &ElementEnergy,
) {
    events.push(InteractionEvent { kind, slots, element, delta: energy.total() - before });
}

// ============================================================================
// (a) Stem five-combinations
// ============================================================================

pub fn five_combinations(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    let natal = chart.natal();
    let mut used = [false; 4];

    for i in 0..3 {
        let j = i + 1;
        if used[i] || used[j] {
            continue;
        }
        let (slot_a, a) = natal[i];
        let (slot_b, b) = natal[j];
        let Some(target) = five_combination(a.stem, b.stem) else {
            continue;
        };
        used[i] = true;
        used[j] = true;

        let before = energy.total();
        let (ea, eb) = (a.stem.element(), b.stem.element());
        if transformation_supported(target, chart.month.branch) {
            energy.add(target, config.combination_bonus);
            energy.subtract(ea, config.combination_cost);
            energy.subtract(eb, config.combination_cost);
            record(events, InteractionKind::CombinationTransformed, smallvec![slot_a, slot_b], target, before, energy);
        } else {
            energy.scale(ea, config.binding_factor);
            energy.scale(eb, config.binding_factor);
            record(events, InteractionKind::CombinationBound, smallvec![slot_a, slot_b], target, before, energy);
        }
    }
}

// ============================================================================
// (b) Trines and directional assemblies
// ============================================================================

pub fn triads(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    let pillars = chart.pillars();
    let present: SmallVec<[Branch; 6]> = pillars.iter().map(|(_, p)| p.branch).collect();

    for triad in TRINES.iter().chain(ASSEMBLIES.iter()) {
        if !triad.is_complete(&present) {
            continue;
        }
        let (kind, bonus) = match triad.kind {
            TriadKind::Trine => (InteractionKind::Trine, config.trine_bonus),
            TriadKind::Assembly => (InteractionKind::Assembly, config.assembly_bonus),
        };
        let slots = triad
            .branches
            .iter()
            .filter_map(|b| pillars.iter().find(|(_, p)| p.branch == *b).map(|(s, _)| *s))
            .collect();
        let before = energy.total();
        energy.scale(triad.element, bonus);
        record(events, kind, slots, triad.element, before, energy);
    }
}

// ============================================================================
// (c)–(f) Branch pairs
// ============================================================================

/// Every unordered pair of chart branches, natal first.
fn branch_pairs(chart: &Chart) -> Vec<((PillarSlot, Branch), (PillarSlot, Branch))> {
    let branches: SmallVec<[(PillarSlot, Branch); 6]> =
        chart.pillars().iter().map(|(s, p)| (*s, p.branch)).collect();
    let mut pairs = Vec::new();
    for i in 0..branches.len() {
        for j in (i + 1)..branches.len() {
            pairs.push((branches[i], branches[j]));
        }
    }
    pairs
}

pub fn six_combinations(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    for ((sa, a), (sb, b)) in branch_pairs(chart) {
        if let Some(element) = lexicon::six_combination(a, b) {
            let before = energy.total();
            energy.add(element, config.six_combination_bonus);
            record(events, InteractionKind::SixCombination, smallvec![sa, sb], element, before, energy);
        }
    }
}

fn pair_penalty(
    chart: &Chart,
    energy: &mut ElementEnergy,
    events: &mut Vec<InteractionEvent>,
    kind: InteractionKind,
    penalty: f64,
    matches: fn(Branch, Branch) -> bool,
) {
    for ((sa, a), (sb, b)) in branch_pairs(chart) {
        if matches(a, b) {
            let before = energy.total();
            energy.subtract(a.element(), penalty);
            energy.subtract(b.element(), penalty);
            record(events, kind, smallvec![sa, sb], a.element(), before, energy);
        }
    }
}

pub fn clashes(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    pair_penalty(chart, energy, events, InteractionKind::Clash, config.clash_penalty, lexicon::is_clash);
}

pub fn punishments(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    pair_penalty(
        chart,
        energy,
        events,
        InteractionKind::Punishment,
        config.punishment_penalty,
        lexicon::is_punishment,
    );
}

pub fn harms(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    pair_penalty(chart, energy, events, InteractionKind::Harm, config.harm_penalty, lexicon::is_harm);
}

// ============================================================================
// (g) Vault physics
// ============================================================================

/// Open or seal the day branch's vault.
pub fn vault(
    chart: &Chart,
    energy: &mut ElementEnergy,
    config: &InteractionConfig,
    events: &mut Vec<InteractionEvent>,
) {
    let Some(stored) = vault_element(chart.day.branch) else {
        return;
    };
    let before = energy.total();
    if energy.get(stored) > config.vault_open_threshold {
        energy.scale(stored, config.vault_open_multiplier);
        record(events, InteractionKind::VaultOpen, smallvec![PillarSlot::Day], stored, before, energy);
    } else {
        energy.subtract(stored, config.vault_sealed_penalty);
        record(events, InteractionKind::VaultSealed, smallvec![PillarSlot::Day], stored, before, energy);
    }
}
