use gua_types::{Element, Hexagram};

use super::clamp01;
use crate::mix::rotl32;
use crate::rng::Xorshift32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigram {
    pub name: &'static str,
    pub element: Element,
}

/// Trigrams in index order 1..=8 (stored at 0..8).
pub static TRIGRAMS: [Trigram; 8] = [
    Trigram { name: "乾", element: Element::Metal },
    Trigram { name: "兑", element: Element::Metal },
    Trigram { name: "离", element: Element::Fire },
    Trigram { name: "震", element: Element::Wood },
    Trigram { name: "巽", element: Element::Wood },
    Trigram { name: "坎", element: Element::Water },
    Trigram { name: "艮", element: Element::Earth },
    Trigram { name: "坤", element: Element::Earth },
];

pub const HEXAGRAM_NAMES: [&str; 64] = [
    "乾为天", "坤为地", "水雷屯", "山水蒙", "水天需", "天水讼", "地水师", "水地比",
    "风天小畜", "天泽履", "地天泰", "天地否", "天火同人", "火天大有", "地山谦", "雷地豫",
    "泽雷随", "山风蛊", "地泽临", "风地观", "火雷噬嗑", "山火贲", "山地剥", "地雷复",
    "天雷无妄", "山天大畜", "山雷颐", "泽风大过", "坎为水", "离为火", "泽山咸", "雷风恒",
    "天山遁", "雷天大壮", "火地晋", "地火明夷", "风火家人", "火泽睽", "水山蹇", "雷水解",
    "山泽损", "风雷益", "泽天夬", "天风姤", "泽地萃", "地风升", "泽水困", "水风井",
    "泽火革", "火风鼎", "震为雷", "艮为山", "风山渐", "雷泽归妹", "雷火丰", "火山旅",
    "巽为风", "兑为泽", "风水涣", "水泽节", "风泽中孚", "雷山小过", "水火既济", "火水未济",
];

const HARMONIOUS: [&str; 6] = ["乾为天", "坤为地", "地天泰", "风天小畜", "风雷益", "水火既济"];
const INHARMONIOUS: [&str; 5] = ["天地否", "泽天夬", "泽水困", "水山蹇", "火水未济"];

/// Trigram by its single-character name.
#[must_use]
pub fn trigram(name: &str) -> Option<&'static Trigram> {
    TRIGRAMS.iter().find(|t| t.name == name)
}

/// Name for trigram indexes `upper`, `lower` in `1..=8`; `None` outside that range.
#[must_use]
pub fn hexagram_name(upper: u8, lower: u8) -> Option<&'static str> {
    if !(1..=8).contains(&upper) || !(1..=8).contains(&lower) {
        return None;
    }
    let key = usize::from(upper - 1) * 8 + usize::from(lower - 1);
    HEXAGRAM_NAMES.get(key).copied()
}

/// Cast a hexagram. Draws exactly one value from `rng` for the changing line.
///
/// Returns the hexagram and the base integer it was chosen from.
pub fn cast_hexagram(
    time_seed: u32,
    question_hash: u32,
    entropy: u32,
    rng: &mut Xorshift32,
) -> (Hexagram, u32) {
    let base = time_seed
        .wrapping_add(rotl32(question_hash, 5))
        .wrapping_add(rotl32(entropy, 9));
    let upper = (base % 8) as u8 + 1;
    let lower = (((base >> 3) + question_hash % 37) % 8) as u8 + 1;
    let changing_line = 1 + (rng.next_f64() * 6.0).floor() as u8;

    let name = hexagram_name(upper, lower).unwrap_or("火水未济");
    let hexagram = Hexagram {
        upper: TRIGRAMS[usize::from(upper - 1)].name.to_string(),
        lower: TRIGRAMS[usize::from(lower - 1)].name.to_string(),
        name: name.to_string(),
        changing_line: changing_line.min(6),
    };
    (hexagram, base)
}

fn harmony_of(name: &str) -> f64 {
    if HARMONIOUS.iter().any(|h| name.contains(h)) {
        1.0
    } else if INHARMONIOUS.iter().any(|h| name.contains(h)) {
        0.18
    } else {
        0.6
    }
}

/// Omen peaks when the changing line sits near the middle of the hexagram.
#[must_use]
pub fn score_iching(hexagram: &Hexagram) -> f64 {
    let agitation = clamp01((3.5 - f64::from(hexagram.changing_line)).abs() / 3.5);
    let omen = clamp01(1.0 - agitation * 0.55);
    clamp01(omen * 0.64 + harmony_of(&hexagram.name) * 0.36)
}
