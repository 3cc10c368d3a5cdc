//! Pillars, slots and the chart that groups them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Branch, Element, Stem};
use crate::{Error, Result};

/// One stem × branch pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Parse a two-character pillar such as `"甲子"`.
    ///
    /// Fails on anything that is not exactly one stem followed by one branch.
    pub fn parse(input: &str) -> Result<Self> {
        let mut chars = input.chars();
        let (Some(s), Some(b), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(Error::InvalidPillar {
                input: input.to_string(),
                reason: format!("expected 2 characters, got {}", input.chars().count()),
            });
        };
        Ok(Self {
            stem: Stem::try_from(s)?,
            branch: Branch::try_from(b)?,
        })
    }
}

impl std::str::FromStr for Pillar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pillar::parse(s)
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Position of a pillar in the chart.
///
/// `Luck` and `Annual` are transient overlays on top of the four natal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarSlot {
    Year,
    Month,
    Day,
    Hour,
    Luck,
    Annual,
}

impl PillarSlot {
    pub const NATAL: [PillarSlot; 4] = [
        PillarSlot::Year,
        PillarSlot::Month,
        PillarSlot::Day,
        PillarSlot::Hour,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_transient(self) -> bool {
        matches!(self, PillarSlot::Luck | PillarSlot::Annual)
    }

    /// Pillar distance used by the graph's decay.
    ///
    /// Natal slots are ordered year..hour; a transient slot overlays the
    /// whole chart and sits at distance 1 from every other slot.
    pub fn distance(self, other: PillarSlot) -> usize {
        if self == other {
            0
        } else if self.is_transient() || other.is_transient() {
            1
        } else {
            self.index().abs_diff(other.index())
        }
    }
}

impl std::fmt::Display for PillarSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PillarSlot::Year => "year",
            PillarSlot::Month => "month",
            PillarSlot::Day => "day",
            PillarSlot::Hour => "hour",
            PillarSlot::Luck => "luck",
            PillarSlot::Annual => "annual",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

// ============================================================================
// Chart
// ============================================================================

/// Four natal pillars plus optional transient overlays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    /// Multi-year luck period overlay.
    pub luck: Option<Pillar>,
    /// Single-year overlay.
    pub annual: Option<Pillar>,
    pub gender: Gender,
    /// Identifier used to look up per-case overrides.
    pub case_id: Option<String>,
}

impl Chart {
    pub fn new(natal: [Pillar; 4], gender: Gender) -> Self {
        let [year, month, day, hour] = natal;
        Self {
            year,
            month,
            day,
            hour,
            luck: None,
            annual: None,
            gender,
            case_id: None,
        }
    }

    /// Parse four natal pillar strings and check the day master against
    /// the day pillar's stem.
    pub fn parse(pillars: [&str; 4], day_master: char, gender: Gender) -> Result<Self> {
        let [year, month, day, hour] = pillars;
        let natal = [
            Pillar::parse(year)?,
            Pillar::parse(month)?,
            Pillar::parse(day)?,
            Pillar::parse(hour)?,
        ];
        let expected = natal[2].stem.as_char();
        if day_master != expected {
            return Err(Error::DayMasterMismatch { given: day_master, expected });
        }
        Ok(Self::new(natal, gender))
    }

    pub fn with_luck(mut self, pillar: Pillar) -> Self {
        self.luck = Some(pillar);
        self
    }

    pub fn with_annual(mut self, pillar: Pillar) -> Self {
        self.annual = Some(pillar);
        self
    }

    pub fn with_luck_str(self, pillar: &str) -> Result<Self> {
        Ok(self.with_luck(Pillar::parse(pillar)?))
    }

    pub fn with_annual_str(self, pillar: &str) -> Result<Self> {
        Ok(self.with_annual(Pillar::parse(pillar)?))
    }

    pub fn with_case_id(mut self, id: impl Into<String>) -> Self {
        self.case_id = Some(id.into());
        self
    }

    pub fn day_master(&self) -> Stem {
        self.day.stem
    }

    pub fn day_master_element(&self) -> Element {
        self.day.stem.element()
    }

    pub fn pillar(&self, slot: PillarSlot) -> Option<Pillar> {
        match slot {
            PillarSlot::Year => Some(self.year),
            PillarSlot::Month => Some(self.month),
            PillarSlot::Day => Some(self.day),
            PillarSlot::Hour => Some(self.hour),
            PillarSlot::Luck => self.luck,
            PillarSlot::Annual => self.annual,
        }
    }

    /// The four natal pillars in slot order.
    pub fn natal(&self) -> [(PillarSlot, Pillar); 4] {
        [
            (PillarSlot::Year, self.year),
            (PillarSlot::Month, self.month),
            (PillarSlot::Day, self.day),
            (PillarSlot::Hour, self.hour),
        ]
    }

    /// Natal pillars followed by whichever transient pillars are present.
    pub fn pillars(&self) -> SmallVec<[(PillarSlot, Pillar); 6]> {
        let mut all: SmallVec<[(PillarSlot, Pillar); 6]> = SmallVec::from_slice(&self.natal());
        if let Some(luck) = self.luck {
            all.push((PillarSlot::Luck, luck));
        }
        if let Some(annual) = self.annual {
            all.push((PillarSlot::Annual, annual));
        }
        all
    }

    pub fn has_transients(&self) -> bool {
        self.luck.is_some() || self.annual.is_some()
    }
}

impl std::fmt::Display for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)?;
        if let Some(luck) = self.luck {
            write!(f, " | luck {luck}")?;
        }
        if let Some(annual) = self.annual {
            write!(f, " | annual {annual}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pillar() {
        let p = Pillar::parse("甲子").unwrap();
        assert_eq!(p.stem, Stem::Jia);
        assert_eq!(p.branch, Branch::Zi);
        assert_eq!(p.to_string(), "甲子");
    }

    #[test]
    fn test_parse_pillar_wrong_length() {
        for bad in ["", "甲", "甲子丑"] {
            assert!(matches!(Pillar::parse(bad), Err(Error::InvalidPillar { .. })), "{bad}");
        }
    }

    #[test]
    fn test_parse_pillar_unknown_symbols() {
        assert!(matches!(
            Pillar::parse("子甲"),
            Err(Error::UnknownSymbol { symbol: '子', alphabet: "stem" })
        ));
        assert!(matches!(
            Pillar::parse("甲x"),
            Err(Error::UnknownSymbol { symbol: 'x', alphabet: "branch" })
        ));
    }

    #[test]
    fn test_chart_day_master_mismatch() {
        let err = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '乙', Gender::Male).unwrap_err();
        assert!(matches!(err, Error::DayMasterMismatch { given: '乙', expected: '甲' }));
    }

    #[test]
    fn test_chart_pillars_include_transients() {
        let chart = Chart::parse(["甲子", "乙丑", "甲寅", "丙辰"], '甲', Gender::Female)
            .unwrap()
            .with_luck_str("丁卯")
            .unwrap();
        let slots: Vec<_> = chart.pillars().iter().map(|(s, _)| *s).collect();
        assert_eq!(
            slots,
            vec![PillarSlot::Year, PillarSlot::Month, PillarSlot::Day, PillarSlot::Hour, PillarSlot::Luck]
        );
        assert_eq!(chart.day_master_element(), Element::Wood);
    }

    #[test]
    fn test_slot_distance() {
        assert_eq!(PillarSlot::Year.distance(PillarSlot::Year), 0);
        assert_eq!(PillarSlot::Year.distance(PillarSlot::Month), 1);
        assert_eq!(PillarSlot::Year.distance(PillarSlot::Hour), 3);
        assert_eq!(PillarSlot::Annual.distance(PillarSlot::Year), 1);
        assert_eq!(PillarSlot::Luck.distance(PillarSlot::Annual), 1);
    }
}
