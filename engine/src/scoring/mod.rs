//! Domain sub-scorers.
//!
//! Each scorer is a pure function from derived features to a value in `[0, 1]`.

mod entropy;
mod iching;
mod numerology;
mod text;
mod time;

pub use entropy::score_entropy;
pub use iching::{
    HEXAGRAM_NAMES, TRIGRAMS, Trigram, cast_hexagram, hexagram_name, score_iching, trigram,
};
pub use numerology::{Numerology, score_numerology};
pub use text::{TextNumbers, pseudo_stroke, score_text};
pub use time::{branch_element, elements_from_pillars, score_time, stem_element};

use serde::Serialize;

/// The five domain scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainScores {
    pub time: f64,
    pub text: f64,
    pub iching: f64,
    pub numerology: f64,
    pub entropy: f64,
}

pub(crate) fn clamp01(n: f64) -> f64 {
    if n < 0.0 {
        0.0
    } else if n > 1.0 {
        1.0
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }
}
