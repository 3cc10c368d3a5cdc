//! # Chart Model
//!
//! Clean DTOs that define a four-pillar chart and its element field.
//! These types cross every boundary: initializer ↔ graph ↔ judge ↔ projector.
//!
//! Design rule: NO configuration, NO rule tables, NO scoring here.
//! This module is pure data — no I/O, no state.

pub mod element;
pub mod symbol;
pub mod pillar;
pub mod energy;

pub use element::{Element, Relation};
pub use symbol::{Stem, Branch, Polarity};
pub use pillar::{Pillar, PillarSlot, Chart, Gender};
pub use energy::{ElementEnergy, clamp_energy};
