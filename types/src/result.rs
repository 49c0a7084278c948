use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Elements;

/// One of the eight fixed verdict phrases: four score bands, two phrasings each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verdict {
    GreatGoodSwift,
    GreatGoodRide,
    GoodAct,
    GoodSteady,
    FlatWait,
    FlatWatch,
    IllStill,
    IllGuarded,
}

#[derive(Debug, Error)]
#[error("unknown verdict phrase: {0}")]
pub struct UnknownVerdict(pub String);

impl Verdict {
    pub const ALL: [Verdict; 8] = [
        Verdict::GreatGoodSwift,
        Verdict::GreatGoodRide,
        Verdict::GoodAct,
        Verdict::GoodSteady,
        Verdict::FlatWait,
        Verdict::FlatWatch,
        Verdict::IllStill,
        Verdict::IllGuarded,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GreatGoodSwift => "大吉，宜速战",
            Self::GreatGoodRide => "大吉，乘势行",
            Self::GoodAct => "吉，宜主动",
            Self::GoodSteady => "吉，稳中进",
            Self::FlatWait => "平，待时机",
            Self::FlatWatch => "平，宜观望",
            Self::IllStill => "凶，宜守静",
            Self::IllGuarded => "凶，慎言行",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Verdict {
    type Error = UnknownVerdict;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_str() == value)
            .ok_or(UnknownVerdict(value))
    }
}

impl From<Verdict> for String {
    fn from(value: Verdict) -> Self {
        value.as_str().to_string()
    }
}

/// The four stem-branch pillars (四柱) of a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillars {
    pub year: String,
    pub month: String,
    pub day: String,
    pub time: String,
}

impl Pillars {
    #[must_use]
    pub fn as_array(&self) -> [&str; 4] {
        [&self.year, &self.month, &self.day, &self.time]
    }

    /// Every character of all four pillars, year first.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.as_array().into_iter().flat_map(str::chars)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hexagram {
    pub upper: String,
    pub lower: String,
    pub name: String,
    /// Always in `1..=6`.
    pub changing_line: u8,
}

/// Intermediate values carried out of the computation for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carry {
    pub seed: u32,
    pub pillars: Pillars,
    pub elements: Elements,
    pub hexagram: Hexagram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivinationResult {
    pub verdict: Verdict,
    /// Integer in `0..=100`.
    pub score: u8,
    pub poem: String,
    pub carry: Carry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_phrases_are_distinct() {
        let mut phrases: Vec<_> = Verdict::ALL.iter().map(|v| v.as_str()).collect();
        phrases.sort_unstable();
        phrases.dedup();
        assert_eq!(phrases.len(), 8);
    }

    #[test]
    fn verdict_serializes_as_phrase() {
        let json = serde_json::to_string(&Verdict::GoodSteady).unwrap();
        assert_eq!(json, "\"吉，稳中进\"");
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Verdict::GoodSteady);
    }

    #[test]
    fn unknown_verdict_rejected() {
        assert!(serde_json::from_str::<Verdict>("\"大凶\"").is_err());
    }

    #[test]
    fn pillar_chars_in_order() {
        let p = Pillars {
            year: "甲辰".into(),
            month: "丙寅".into(),
            day: "戊午".into(),
            time: "丁巳".into(),
        };
        let s: String = p.chars().collect();
        assert_eq!(s, "甲辰丙寅戊午丁巳");
    }

    #[test]
    fn hexagram_uses_camel_case() {
        let h = Hexagram {
            upper: "乾".into(),
            lower: "坤".into(),
            name: "天地否".into(),
            changing_line: 3,
        };
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["changingLine"], 3);
    }
}
