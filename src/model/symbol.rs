//! Stem and branch alphabets.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::{Error, Result};

/// Yang (odd position) or Yin (even position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

// ============================================================================
// Stems
// ============================================================================

/// One of the ten stems (甲乙丙丁戊己庚辛壬癸).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

const STEM_CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia, Stem::Yi, Stem::Bing, Stem::Ding, Stem::Wu,
        Stem::Ji, Stem::Geng, Stem::Xin, Stem::Ren, Stem::Gui,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_char(c: char) -> Option<Stem> {
        STEM_CHARS.iter().position(|&s| s == c).map(|i| Stem::ALL[i])
    }

    pub fn as_char(self) -> char {
        STEM_CHARS[self.index()]
    }

    /// Stems come in element pairs: 甲乙 wood, 丙丁 fire, 戊己 earth, 庚辛 metal, 壬癸 water.
    pub fn element(self) -> Element {
        Element::ALL[self.index() / 2]
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 { Polarity::Yang } else { Polarity::Yin }
    }
}

impl TryFrom<char> for Stem {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Stem::from_char(c).ok_or(Error::UnknownSymbol { symbol: c, alphabet: "stem" })
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// Branches
// ============================================================================

/// One of the twelve branches (子丑寅卯辰巳午未申酉戌亥).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

const BRANCH_CHARS: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

const BRANCH_ELEMENTS: [Element; 12] = [
    Element::Water, // 子
    Element::Earth, // 丑
    Element::Wood,  // 寅
    Element::Wood,  // 卯
    Element::Earth, // 辰
    Element::Fire,  // 巳
    Element::Fire,  // 午
    Element::Earth, // 未
    Element::Metal, // 申
    Element::Metal, // 酉
    Element::Earth, // 戌
    Element::Water, // 亥
];

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi, Branch::Chou, Branch::Yin, Branch::Mao,
        Branch::Chen, Branch::Si, Branch::Wu, Branch::Wei,
        Branch::Shen, Branch::You, Branch::Xu, Branch::Hai,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_char(c: char) -> Option<Branch> {
        BRANCH_CHARS.iter().position(|&b| b == c).map(|i| Branch::ALL[i])
    }

    pub fn as_char(self) -> char {
        BRANCH_CHARS[self.index()]
    }

    pub fn element(self) -> Element {
        BRANCH_ELEMENTS[self.index()]
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 { Polarity::Yang } else { Polarity::Yin }
    }
}

impl TryFrom<char> for Branch {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Branch::from_char(c).ok_or(Error::UnknownSymbol { symbol: c, alphabet: "branch" })
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
