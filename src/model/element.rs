//! The five elements, their two cycles, and the relation particles
//! derived from an element's offset against the day master.

use serde::{Deserialize, Serialize};

/// One of the five elements.
///
/// Declaration order follows the generation cycle, so cyclic offsets on
/// `index()` give both cycles:
///
/// ```text
/// generation: Wood → Fire → Earth → Metal → Water → Wood   (+1)
/// control:    Wood → Earth → Water → Fire → Metal → Wood   (+2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn offset(self, by: usize) -> Element {
        Element::ALL[(self.index() + by) % 5]
    }

    /// The element this one feeds.
    pub fn generates(self) -> Element {
        self.offset(1)
    }

    /// The element that feeds this one.
    pub fn generated_by(self) -> Element {
        self.offset(4)
    }

    /// The element this one restrains.
    pub fn controls(self) -> Element {
        self.offset(2)
    }

    /// The element that restrains this one.
    pub fn controlled_by(self) -> Element {
        self.offset(3)
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Relation particles
// ============================================================================

/// Relation of an element to the day master's element.
///
/// - **Peer**: same element (self and companions)
/// - **Output**: the element the day master generates
/// - **Wealth**: the element the day master controls
/// - **Officer**: the element that controls the day master
/// - **Resource**: the element that generates the day master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Peer,
    Output,
    Wealth,
    Officer,
    Resource,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Peer,
        Relation::Output,
        Relation::Wealth,
        Relation::Officer,
        Relation::Resource,
    ];

    /// Classify `element` relative to `day_master`.
    pub fn of(element: Element, day_master: Element) -> Relation {
        match (element.index() + 5 - day_master.index()) % 5 {
            0 => Relation::Peer,
            1 => Relation::Output,
            2 => Relation::Wealth,
            3 => Relation::Officer,
            _ => Relation::Resource,
        }
    }

    /// The element holding this relation for `day_master`.
    pub fn element_for(self, day_master: Element) -> Element {
        match self {
            Relation::Peer => day_master,
            Relation::Output => day_master.generates(),
            Relation::Wealth => day_master.controls(),
            Relation::Officer => day_master.controlled_by(),
            Relation::Resource => day_master.generated_by(),
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Peer => write!(f, "peer"),
            Relation::Output => write!(f, "output"),
            Relation::Wealth => write!(f, "wealth"),
            Relation::Officer => write!(f, "officer"),
            Relation::Resource => write!(f, "resource"),
        }
    }
}
