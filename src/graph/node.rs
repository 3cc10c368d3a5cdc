//! Graph nodes and their construction from a chart.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::EngineConfig;
use crate::lexicon::{contains_hidden, five_combination, hidden_stems, main_qi, transformation_supported};
use crate::model::{Branch, Chart, Element, ElementEnergy, PillarSlot, Stem, clamp_energy};

/// Index into the engine's node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSymbol {
    Stem(Stem),
    Branch(Branch),
}

impl NodeSymbol {
    pub fn as_char(self) -> char {
        match self {
            NodeSymbol::Stem(s) => s.as_char(),
            NodeSymbol::Branch(b) => b.as_char(),
        }
    }

    pub fn is_stem(self) -> bool {
        matches!(self, NodeSymbol::Stem(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub symbol: NodeSymbol,
    pub element: Element,
    pub slot: PillarSlot,
    pub initial_energy: f64,
    pub energy: f64,
    /// Stem found among the natal hidden stems.
    pub rooted: bool,
    /// Stem found in its own pillar's branch.
    pub same_pillar_root: bool,
    /// Stem is the main qi of some chart branch.
    pub exposed: bool,
    /// Branch nodes: share of the node's energy per hidden element (sums to 1).
    /// Shifts away from the day-master element as drain and suppression apply.
    pub hidden: SmallVec<[(Element, f64); 3]>,
    /// Element before the stem-transformation rule, when it fired.
    pub transformed_from: Option<Element>,
    pub is_day_master: bool,
}

impl GraphNode {
    /// Fraction of this node's energy carried by `element`.
    pub fn share_of(&self, element: Element) -> f64 {
        if self.hidden.is_empty() {
            if self.element == element { 1.0 } else { 0.0 }
        } else {
            self.hidden.iter().filter(|(e, _)| *e == element).map(|(_, s)| s).sum()
        }
    }

    /// Scale only the `element` part of this node by `factor` and return the
    /// resulting factor on the node total. Branch shares are renormalised so
    /// the other elements keep their absolute energy.
    pub(crate) fn scale_element(&mut self, element: Element, factor: f64) -> f64 {
        let share = self.share_of(element);
        if share == 0.0 {
            return 1.0;
        }
        if self.hidden.is_empty() {
            return factor;
        }
        let total = 1.0 - share + share * factor;
        if total <= 0.0 {
            return 0.0;
        }
        for (e, s) in self.hidden.iter_mut() {
            *s = if *e == element { *s * factor / total } else { *s / total };
        }
        total
    }

    /// Spread `value` over elements: stems keep their own element, branches
    /// split by their hidden distribution.
    pub fn spread_into(&self, field: &mut ElementEnergy, value: f64) {
        if self.hidden.is_empty() {
            field.add(self.element, value);
        } else {
            for (element, share) in &self.hidden {
                field.add(*element, value * share);
            }
        }
    }
}

pub(crate) fn build(chart: &Chart, config: &EngineConfig) -> SmallVec<[GraphNode; 12]> {
    let base = config.engine.base_score;
    let pillars = chart.pillars();
    let natal = chart.natal();
    let mut nodes: SmallVec<[GraphNode; 12]> = SmallVec::new();

    for (slot, pillar) in pillars.iter().copied() {
        let weight = config.pillar_weights.weight(slot);

        // stem node
        let stem = pillar.stem;
        let (rooted, same_pillar_root) = if slot.is_transient() {
            (false, false)
        } else {
            let same = contains_hidden(pillar.branch, stem);
            (same || natal.iter().any(|(_, p)| contains_hidden(p.branch, stem)), same)
        };
        let exposed = pillars.iter().any(|(_, p)| main_qi(p.branch) == stem);
        let rooting = if same_pillar_root {
            config.rooting.same_pillar_bonus
        } else if rooted {
            config.rooting.root_bonus
        } else {
            1.0
        };
        let exposure = if exposed { config.rooting.exposure_bonus } else { 1.0 };
        let energy = clamp_energy(base * weight * rooting * exposure);
        nodes.push(GraphNode {
            id: NodeId(nodes.len()),
            symbol: NodeSymbol::Stem(stem),
            element: stem.element(),
            slot,
            initial_energy: energy,
            energy,
            rooted,
            same_pillar_root,
            exposed,
            hidden: SmallVec::new(),
            transformed_from: None,
            is_day_master: slot == PillarSlot::Day,
        });

        // branch node (shell-core): each hidden stem contributes its ratio
        // times its role weight
        let contained = hidden_stems(pillar.branch);
        let parts: SmallVec<[(Element, f64); 3]> = contained
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let ratio = config.hidden_stems.shell_ratio(contained.len(), i);
                (h.stem.element(), clamp_energy(ratio * config.hidden_stems.weight(h.role)))
            })
            .collect();
        let weighted_sum: f64 = parts.iter().map(|(_, part)| part).sum();
        let mut hidden: SmallVec<[(Element, f64); 3]> = SmallVec::new();
        for (element, part) in parts {
            let share = if weighted_sum > 0.0 { part / weighted_sum } else { 0.0 };
            match hidden.iter_mut().find(|(e, _)| *e == element) {
                Some((_, s)) => *s += share,
                None => hidden.push((element, share)),
            }
        }
        let energy = clamp_energy(weight * weighted_sum);
        nodes.push(GraphNode {
            id: NodeId(nodes.len()),
            symbol: NodeSymbol::Branch(pillar.branch),
            element: pillar.branch.element(),
            slot,
            initial_energy: energy,
            energy,
            rooted: false,
            same_pillar_root: false,
            exposed: false,
            hidden,
            transformed_from: None,
            is_day_master: false,
        });
    }

    transform_day_master(chart, &mut nodes);
    nodes
}

/// Day master five-combining with the month or hour stem under a supporting
/// month branch: both stems take the target element. Fires at most once.
fn transform_day_master(chart: &Chart, nodes: &mut [GraphNode]) {
    let dm_stem = chart.day_master();
    for partner_slot in [PillarSlot::Month, PillarSlot::Hour] {
        let Some(partner) = chart.pillar(partner_slot) else {
            continue;
        };
        let Some(target) = five_combination(dm_stem, partner.stem) else {
            continue;
        };
        if !transformation_supported(target, chart.month.branch) {
            continue;
        }
        for node in nodes.iter_mut() {
            if node.symbol.is_stem() && (node.is_day_master || node.slot == partner_slot) {
                node.transformed_from = Some(node.element);
                node.element = target;
            }
        }
        tracing::debug!(partner = %partner_slot, %target, "day master transformed");
        return;
    }
}
