//! Per-element energy field.
//!
//! The scalar field every stage mutates. Values are clamped at zero on
//! every write, and non-finite inputs collapse to zero.

use serde::{Deserialize, Serialize};

use super::Element;

/// Clamp a single energy value: negatives, NaN and infinities become 0.
pub fn clamp_energy(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Energy per element, indexed by `Element::index()`.
///
/// Serialized as a five-number array in cycle order; deserialized values go
/// through the same clamp as every other write.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 5]", into = "[f64; 5]")]
pub struct ElementEnergy {
    values: [f64; 5],
}

impl ElementEnergy {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_values(values: [f64; 5]) -> Self {
        Self { values: values.map(clamp_energy) }
    }

    pub fn get(&self, element: Element) -> f64 {
        self.values[element.index()]
    }

    pub fn set(&mut self, element: Element, value: f64) {
        self.values[element.index()] = clamp_energy(value);
    }

    pub fn add(&mut self, element: Element, delta: f64) {
        self.set(element, self.get(element) + delta);
    }

    /// Subtract, floored at zero.
    pub fn subtract(&mut self, element: Element, amount: f64) {
        self.add(element, -amount);
    }

    pub fn scale(&mut self, element: Element, factor: f64) {
        self.set(element, self.get(element) * factor);
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Fraction of the total held by `element`, or `fallback` when the
    /// field is empty.
    pub fn share(&self, element: Element, fallback: f64) -> f64 {
        let total = self.total();
        if total > 0.0 { self.get(element) / total } else { fallback }
    }

    /// `share` expressed in percent.
    pub fn percent(&self, element: Element, fallback: f64) -> f64 {
        let total = self.total();
        if total > 0.0 { self.get(element) / total * 100.0 } else { fallback }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        Element::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    /// The strongest element; ties resolve to the earlier element in cycle order.
    pub fn dominant(&self) -> (Element, f64) {
        self.iter().fold((Element::Wood, f64::MIN), |best, cur| {
            if cur.1 > best.1 { cur } else { best }
        })
    }

    pub fn is_non_negative(&self) -> bool {
        self.values.iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl From<[f64; 5]> for ElementEnergy {
    fn from(values: [f64; 5]) -> Self {
        Self::from_values(values)
    }
}

impl From<ElementEnergy> for [f64; 5] {
    fn from(energy: ElementEnergy) -> Self {
        energy.values
    }
}

impl std::ops::Index<Element> for ElementEnergy {
    type Output = f64;

    fn index(&self, element: Element) -> &f64 {
        &self.values[element.index()]
    }
}

impl std::fmt::Display for ElementEnergy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(e, v)| format!("{e}={v:.2}")).collect();
        write!(f, "{}", parts.join(" "))
    }
}
