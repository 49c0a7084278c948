use gua_types::{Element, Elements, Pillars};

use super::clamp01;

const STEM_WEIGHT: f64 = 1.35;
const BRANCH_WEIGHT: f64 = 1.0;

#[must_use]
pub fn stem_element(c: char) -> Option<Element> {
    match c {
        '甲' | '乙' => Some(Element::Wood),
        '丙' | '丁' => Some(Element::Fire),
        '戊' | '己' => Some(Element::Earth),
        '庚' | '辛' => Some(Element::Metal),
        '壬' | '癸' => Some(Element::Water),
        _ => None,
    }
}

#[must_use]
pub fn branch_element(c: char) -> Option<Element> {
    match c {
        '子' | '亥' => Some(Element::Water),
        '丑' | '辰' | '未' | '戌' => Some(Element::Earth),
        '寅' | '卯' => Some(Element::Wood),
        '巳' | '午' => Some(Element::Fire),
        '申' | '酉' => Some(Element::Metal),
        _ => None,
    }
}

/// Element energies from every stem and branch character across the pillars,
/// normalized to sum to 1. Characters that are neither are ignored.
#[must_use]
pub fn elements_from_pillars(pillars: &Pillars) -> Elements {
    let mut raw = Elements::default();
    for c in pillars.chars() {
        if let Some(element) = stem_element(c) {
            raw.add(element, STEM_WEIGHT);
        }
        if let Some(element) = branch_element(c) {
            raw.add(element, BRANCH_WEIGHT);
        }
    }
    raw.normalized()
}

/// Balance against a uniform spread, blended with a weighted flow sum.
#[must_use]
pub fn score_time(elements: &Elements) -> f64 {
    let deviation: f64 = elements.as_array().iter().map(|v| (v - 0.2).abs()).sum();
    let balance = 1.0 - deviation / 2.0;
    let flow = clamp01(
        elements.wood * 0.9
            + elements.fire * 1.05
            + elements.earth * 0.85
            + elements.metal * 1.0
            + elements.water * 0.95,
    );
    clamp01(balance * 0.62 + flow * 0.38)
}
