//! # Element Lexicon
//!
//! Static rule tables over the stem and branch alphabets:
//!
//! | Table | Members |
//! |-------|---------|
//! | Hidden stems | 1–3 contained stems per branch (main / middle / remnant) |
//! | Five-combinations | 甲己 乙庚 丙辛 丁壬 戊癸 with target element + month condition |
//! | Six-combinations | 子丑 寅亥 卯戌 辰酉 巳申 午未 |
//! | Trines / assemblies | 申子辰 亥卯未 寅午戌 巳酉丑 / 寅卯辰 巳午未 申酉戌 亥子丑 |
//! | Clashes, punishments, harms | pairwise branch tables |
//! | Vaults | 辰 water, 戌 fire, 丑 metal, 未 wood |
//!
//! Pure lookups — no configuration and no energy values live here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{Branch, Element, Stem};

// ============================================================================
// Hidden stems
// ============================================================================

/// Position of a hidden stem inside its branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenRole {
    Main,
    Middle,
    Remnant,
}

impl HiddenRole {
    const ORDER: [HiddenRole; 3] = [HiddenRole::Main, HiddenRole::Middle, HiddenRole::Remnant];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiddenStem {
    pub stem: Stem,
    pub role: HiddenRole,
}

pub type HiddenStems = SmallVec<[HiddenStem; 3]>;

const HIDDEN_TABLE: [&[Stem]; 12] = [
    &[Stem::Gui],                       // 子
    &[Stem::Ji, Stem::Gui, Stem::Xin],  // 丑
    &[Stem::Jia, Stem::Bing, Stem::Wu], // 寅
    &[Stem::Yi],                        // 卯
    &[Stem::Wu, Stem::Yi, Stem::Gui],   // 辰
    &[Stem::Bing, Stem::Wu, Stem::Geng], // 巳
    &[Stem::Ding, Stem::Ji],            // 午
    &[Stem::Ji, Stem::Ding, Stem::Yi],  // 未
    &[Stem::Geng, Stem::Ren, Stem::Wu], // 申
    &[Stem::Xin],                       // 酉
    &[Stem::Wu, Stem::Xin, Stem::Ding], // 戌
    &[Stem::Ren, Stem::Jia],            // 亥
];

/// Hidden stems of `branch`, main qi first.
pub fn hidden_stems(branch: Branch) -> HiddenStems {
    HIDDEN_TABLE[branch.index()]
        .iter()
        .zip(HiddenRole::ORDER)
        .map(|(&stem, role)| HiddenStem { stem, role })
        .collect()
}

/// The main hidden stem of `branch`.
pub fn main_qi(branch: Branch) -> Stem {
    HIDDEN_TABLE[branch.index()][0]
}

pub fn contains_hidden(branch: Branch, stem: Stem) -> bool {
    HIDDEN_TABLE[branch.index()].contains(&stem)
}

// ============================================================================
// Stem five-combinations
// ============================================================================

const FIVE_COMBINATIONS: [(Stem, Stem, Element); 5] = [
    (Stem::Jia, Stem::Ji, Element::Earth),
    (Stem::Yi, Stem::Geng, Element::Metal),
    (Stem::Bing, Stem::Xin, Element::Water),
    (Stem::Ding, Stem::Ren, Element::Wood),
    (Stem::Wu, Stem::Gui, Element::Fire),
];

/// Month branches under which a five-combination actually transforms.
const TRANSFORM_CONDITIONS: [(Element, [Branch; 4]); 5] = [
    (Element::Earth, [Branch::Chen, Branch::Xu, Branch::Chou, Branch::Wei]),
    (Element::Metal, [Branch::Shen, Branch::You, Branch::Si, Branch::Chou]),
    (Element::Water, [Branch::Hai, Branch::Zi, Branch::Shen, Branch::Chen]),
    (Element::Wood, [Branch::Yin, Branch::Mao, Branch::Hai, Branch::Wei]),
    (Element::Fire, [Branch::Si, Branch::Wu, Branch::Yin, Branch::Xu]),
];

/// Target element if `a` and `b` form a five-combination (order-insensitive).
pub fn five_combination(a: Stem, b: Stem) -> Option<Element> {
    FIVE_COMBINATIONS
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, target)| *target)
}

/// Whether the month branch supports transformation into `target`.
pub fn transformation_supported(target: Element, month_branch: Branch) -> bool {
    TRANSFORM_CONDITIONS
        .iter()
        .any(|(element, branches)| *element == target && branches.contains(&month_branch))
}

// ============================================================================
// Branch pair tables
// ============================================================================

const SIX_COMBINATIONS: [(Branch, Branch, Element); 6] = [
    (Branch::Zi, Branch::Chou, Element::Earth),
    (Branch::Yin, Branch::Hai, Element::Wood),
    (Branch::Mao, Branch::Xu, Element::Fire),
    (Branch::Chen, Branch::You, Element::Metal),
    (Branch::Si, Branch::Shen, Element::Water),
    (Branch::Wu, Branch::Wei, Element::Earth),
];

const CLASHES: [(Branch, Branch); 6] = [
    (Branch::Zi, Branch::Wu),
    (Branch::Chou, Branch::Wei),
    (Branch::Yin, Branch::Shen),
    (Branch::Mao, Branch::You),
    (Branch::Chen, Branch::Xu),
    (Branch::Si, Branch::Hai),
];

const PUNISHMENTS: [(Branch, Branch); 11] = [
    (Branch::Yin, Branch::Si),
    (Branch::Si, Branch::Shen),
    (Branch::Shen, Branch::Yin),
    (Branch::Chou, Branch::Xu),
    (Branch::Xu, Branch::Wei),
    (Branch::Wei, Branch::Chou),
    (Branch::Zi, Branch::Mao),
    // self-punishment
    (Branch::Chen, Branch::Chen),
    (Branch::Wu, Branch::Wu),
    (Branch::You, Branch::You),
    (Branch::Hai, Branch::Hai),
];

const HARMS: [(Branch, Branch); 6] = [
    (Branch::Zi, Branch::Wei),
    (Branch::Chou, Branch::Wu),
    (Branch::Yin, Branch::Si),
    (Branch::Mao, Branch::Chen),
    (Branch::Shen, Branch::Hai),
    (Branch::You, Branch::Xu),
];

fn pair_matches(table: &[(Branch, Branch)], a: Branch, b: Branch) -> bool {
    table.iter().any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

/// Result element if `a` and `b` form a six-combination.
pub fn six_combination(a: Branch, b: Branch) -> Option<Element> {
    SIX_COMBINATIONS
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, element)| *element)
}

pub fn is_clash(a: Branch, b: Branch) -> bool {
    pair_matches(&CLASHES, a, b)
}

pub fn is_punishment(a: Branch, b: Branch) -> bool {
    pair_matches(&PUNISHMENTS, a, b)
}

pub fn is_harm(a: Branch, b: Branch) -> bool {
    pair_matches(&HARMS, a, b)
}

// ============================================================================
// Triads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriadKind {
    /// 三合 — birth / peak / tomb of an element.
    Trine,
    /// 三会 — the three branches of one season.
    Assembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triad {
    pub branches: [Branch; 3],
    pub element: Element,
    pub kind: TriadKind,
}

impl Triad {
    /// All three branches appear in `present`.
    pub fn is_complete(&self, present: &[Branch]) -> bool {
        self.branches.iter().all(|b| present.contains(b))
    }
}

pub const TRINES: [Triad; 4] = [
    Triad { branches: [Branch::Shen, Branch::Zi, Branch::Chen], element: Element::Water, kind: TriadKind::Trine },
    Triad { branches: [Branch::Hai, Branch::Mao, Branch::Wei], element: Element::Wood, kind: TriadKind::Trine },
    Triad { branches: [Branch::Yin, Branch::Wu, Branch::Xu], element: Element::Fire, kind: TriadKind::Trine },
    Triad { branches: [Branch::Si, Branch::You, Branch::Chou], element: Element::Metal, kind: TriadKind::Trine },
];

pub const ASSEMBLIES: [Triad; 4] = [
    Triad { branches: [Branch::Yin, Branch::Mao, Branch::Chen], element: Element::Wood, kind: TriadKind::Assembly },
    Triad { branches: [Branch::Si, Branch::Wu, Branch::Wei], element: Element::Fire, kind: TriadKind::Assembly },
    Triad { branches: [Branch::Shen, Branch::You, Branch::Xu], element: Element::Metal, kind: TriadKind::Assembly },
    Triad { branches: [Branch::Hai, Branch::Zi, Branch::Chou], element: Element::Water, kind: TriadKind::Assembly },
];

// ============================================================================
// Vaults
// ============================================================================

/// Element stored by a vault branch, if `branch` is one.
pub fn vault_element(branch: Branch) -> Option<Element> {
    match branch {
        Branch::Chen => Some(Element::Water),
        Branch::Xu => Some(Element::Fire),
        Branch::Chou => Some(Element::Metal),
        Branch::Wei => Some(Element::Wood),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_stems_main_matches_branch_element() {
        for branch in Branch::ALL {
            assert_eq!(main_qi(branch).element(), branch.element(), "{branch}");
            let hidden = hidden_stems(branch);
            assert!(!hidden.is_empty() && hidden.len() <= 3);
            assert_eq!(hidden[0].role, HiddenRole::Main);
        }
    }

    #[test]
    fn test_hidden_stem_roles() {
        let wei = hidden_stems(Branch::Wei);
        assert_eq!(wei.len(), 3);
        assert_eq!(wei[1], HiddenStem { stem: Stem::Ding, role: HiddenRole::Middle });
        assert_eq!(wei[2], HiddenStem { stem: Stem::Yi, role: HiddenRole::Remnant });
        assert_eq!(hidden_stems(Branch::Wu).len(), 2);
        assert_eq!(hidden_stems(Branch::Zi).len(), 1);
    }

    #[test]
    fn test_five_combination_is_symmetric() {
        assert_eq!(five_combination(Stem::Jia, Stem::Ji), Some(Element::Earth));
        assert_eq!(five_combination(Stem::Ji, Stem::Jia), Some(Element::Earth));
        assert_eq!(five_combination(Stem::Gui, Stem::Wu), Some(Element::Fire));
        assert_eq!(five_combination(Stem::Jia, Stem::Yi), None);
    }

    #[test]
    fn test_transformation_conditions() {
        assert!(transformation_supported(Element::Earth, Branch::Wei));
        assert!(transformation_supported(Element::Water, Branch::Zi));
        assert!(!transformation_supported(Element::Water, Branch::Wu));
    }

    #[test]
    fn test_branch_pairs() {
        assert_eq!(six_combination(Branch::Chou, Branch::Zi), Some(Element::Earth));
        assert!(is_clash(Branch::Wu, Branch::Zi));
        assert!(!is_clash(Branch::Zi, Branch::Chou));
        assert!(is_punishment(Branch::Wu, Branch::Wu));
        assert!(!is_punishment(Branch::Zi, Branch::Zi));
        assert!(is_harm(Branch::Xu, Branch::You));
    }

    #[test]
    fn test_triad_completion() {
        let present = [Branch::Zi, Branch::Shen, Branch::Chen, Branch::Wu];
        assert!(TRINES[0].is_complete(&present));
        assert!(!TRINES[1].is_complete(&present));
    }

    #[test]
    fn test_vaults() {
        assert_eq!(vault_element(Branch::Chen), Some(Element::Water));
        assert_eq!(vault_element(Branch::Zi), None);
    }
}
