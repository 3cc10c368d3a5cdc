//! Calendar seam.
//!
//! Converting a birth moment into pillars needs solar-term tables that live
//! outside this crate. [`PillarSource`] is the boundary; [`FixedPillars`]
//! replays recorded pillars for tests and calibration runs.

use chrono::NaiveDateTime;
use hashbrown::HashMap;

use crate::model::{Branch, Chart, Gender, Pillar, Stem};
use crate::{Error, Result};

/// Transient overlays for one target year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransientPillars {
    pub luck: Option<Pillar>,
    pub annual: Option<Pillar>,
}

impl TransientPillars {
    /// `chart` with these overlays; absent overlays leave the chart's own.
    pub fn apply(self, mut chart: Chart) -> Chart {
        if let Some(luck) = self.luck {
            chart.luck = Some(luck);
        }
        if let Some(annual) = self.annual {
            chart.annual = Some(annual);
        }
        chart
    }
}

pub trait PillarSource {
    /// Natal chart for a birth moment.
    fn natal(&self, birth: NaiveDateTime, gender: Gender) -> Result<Chart>;

    /// Luck and annual pillars in effect for `chart` during `year`.
    fn transient(&self, chart: &Chart, year: i32) -> Result<TransientPillars>;

    /// Natal chart with the overlays for `year` applied.
    fn chart_for_year(&self, birth: NaiveDateTime, gender: Gender, year: i32) -> Result<Chart> {
        let chart = self.natal(birth, gender)?;
        let transient = self.transient(&chart, year)?;
        Ok(transient.apply(chart))
    }
}

/// Nominal sexagenary pillar of a calendar year (1984 = 甲子).
///
/// Uses the civil year; the solar-term year boundary is the calendar
/// service's concern.
pub fn year_pillar(year: i32) -> Pillar {
    let offset = (year - 1984).rem_euclid(60) as usize;
    Pillar::new(Stem::ALL[offset % 10], Branch::ALL[offset % 12])
}

/// A luck period: `pillar` applies to years `start..start + 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuckPeriod {
    pub start: i32,
    pub pillar: Pillar,
}

/// Table-backed [`PillarSource`].
#[derive(Debug, Clone, Default)]
pub struct FixedPillars {
    natal: HashMap<NaiveDateTime, [Pillar; 4]>,
    luck: HashMap<NaiveDateTime, Vec<LuckPeriod>>,
}

impl FixedPillars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, birth: NaiveDateTime, natal: [Pillar; 4]) -> &mut Self {
        self.natal.insert(birth, natal);
        self
    }

    pub fn insert_luck(&mut self, birth: NaiveDateTime, periods: Vec<LuckPeriod>) -> &mut Self {
        self.luck.insert(birth, periods);
        self
    }

    fn birth_of(&self, chart: &Chart) -> Option<NaiveDateTime> {
        let natal = [chart.year, chart.month, chart.day, chart.hour];
        self.natal.iter().find(|(_, p)| **p == natal).map(|(birth, _)| *birth)
    }
}

impl PillarSource for FixedPillars {
    fn natal(&self, birth: NaiveDateTime, gender: Gender) -> Result<Chart> {
        let natal = self
            .natal
            .get(&birth)
            .ok_or_else(|| Error::NotFound(format!("no pillars recorded for {birth}")))?;
        Ok(Chart::new(*natal, gender))
    }

    fn transient(&self, chart: &Chart, year: i32) -> Result<TransientPillars> {
        let luck = self
            .birth_of(chart)
            .and_then(|birth| self.luck.get(&birth))
            .and_then(|periods| {
                periods
                    .iter()
                    .find(|p| (p.start..p.start + 10).contains(&year))
                    .map(|p| p.pillar)
            });
        Ok(TransientPillars { luck, annual: Some(year_pillar(year)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn birth() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1990, 3, 14).unwrap().and_hms_opt(8, 30, 0).unwrap()
    }

    fn natal() -> [Pillar; 4] {
        ["庚午", "己卯", "甲寅", "戊辰"].map(|p| Pillar::parse(p).unwrap())
    }

    #[test]
    fn test_year_pillar() {
        assert_eq!(year_pillar(1984).to_string(), "甲子");
        assert_eq!(year_pillar(2026).to_string(), "丙午");
        assert_eq!(year_pillar(1983).to_string(), "癸亥");
    }

    #[test]
    fn test_fixed_source_replays() {
        let mut source = FixedPillars::new();
        source.insert(birth(), natal()).insert_luck(
            birth(),
            vec![LuckPeriod { start: 2020, pillar: Pillar::parse("壬午").unwrap() }],
        );
        let chart = source.chart_for_year(birth(), Gender::Female, 2026).unwrap();
        assert_eq!(chart.day.to_string(), "甲寅");
        assert_eq!(chart.luck.map(|p| p.to_string()).as_deref(), Some("壬午"));
        assert_eq!(chart.annual.map(|p| p.to_string()).as_deref(), Some("丙午"));

        let outside = source.chart_for_year(birth(), Gender::Female, 2035).unwrap();
        assert!(outside.luck.is_none());
    }

    #[test]
    fn test_missing_birth_is_not_found() {
        let source = FixedPillars::new();
        assert!(matches!(source.natal(birth(), Gender::Male), Err(Error::NotFound(_))));
    }
}
