//! Fusion of the domain scores and the factor aggregate into one 0..=100 score.

use serde::Serialize;

use gua_types::Weights;

use crate::scoring::{DomainScores, clamp01};

const SIGMOID_SLOPE: f64 = 6.2;
const SQUASHED_SHARE: f64 = 0.92;
const JITTER_SPAN: f64 = 0.06;

/// Weighted linear sum of the domain scores (weights normalized to sum to 1),
/// sharpened by a logistic curve and blended back with the raw sum.
#[must_use]
pub fn combine_scores(scores: &DomainScores, weights: &Weights) -> f64 {
    let w = weights.normalized();
    let linear = scores.time * w.time
        + scores.text * w.text
        + scores.iching * w.iching
        + scores.numerology * w.numerology
        + scores.entropy * w.entropy;
    let squashed = 1.0 / (1.0 + (-SIGMOID_SLOPE * (linear - 0.5)).exp());
    clamp01(squashed * SQUASHED_SHARE + linear * (1.0 - SQUASHED_SHARE))
}

/// Weight of the factor aggregate in the final blend.
#[must_use]
pub fn factor_gate(radiation: f64, entropy_score: f64, draw: f64) -> f64 {
    clamp01(0.25 + radiation * 0.28 + entropy_score * 0.22 + draw * 0.14)
}

/// `round(clamp01(combined + (jitter - 0.5) * 0.06) * 100)`.
#[must_use]
pub fn remap_to_100(combined: f64, jitter: f64) -> u8 {
    let shaped = clamp01(clamp01(combined) + (jitter - 0.5) * JITTER_SPAN);
    (shaped * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fusion {
    pub base: f64,
    pub gate: f64,
    pub combined: f64,
    pub score: u8,
}

/// Full fusion step. `gate_draw` and `jitter_draw` are the next two values of
/// the main stream, in that order.
#[must_use]
pub fn fuse(
    scores: &DomainScores,
    weights: &Weights,
    factor_score: f64,
    radiation: f64,
    gate_draw: f64,
    jitter_draw: f64,
) -> Fusion {
    let base = combine_scores(scores, weights);
    let gate = factor_gate(radiation, scores.entropy, gate_draw);
    let combined = base * (1.0 - gate) + clamp01(factor_score) * gate;
    Fusion {
        base,
        gate,
        combined,
        score: remap_to_100(combined, jitter_draw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(v: f64) -> DomainScores {
        DomainScores {
            time: v,
            text: v,
            iching: v,
            numerology: v,
            entropy: v,
        }
    }

    #[test]
    fn midpoint_is_fixed() {
        let c = combine_scores(&flat(0.5), &Weights::default());
        assert!((c - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_weights_fall_back_to_unit_divisor() {
        let c = combine_scores(&flat(0.9), &Weights::zero());
        // linear = 0, so only the sigmoid term remains.
        let expected = 0.92 / (1.0 + (6.2f64 * 0.5).exp());
        assert!((c - expected).abs() < 1e-12);
    }

    #[test]
    fn monotonic_in_each_score() {
        let weights = Weights::default();
        let base = flat(0.4);
        let mut bumped = base;
        bumped.iching = 0.8;
        assert!(combine_scores(&bumped, &weights) > combine_scores(&base, &weights));
    }

    #[test]
    fn raising_a_high_scores_weight_raises_the_result() {
        let mut scores = flat(0.4);
        scores.text = 0.95;
        let low = combine_scores(&scores, &Weights::default());
        let heavy = Weights {
            text: 0.9,
            ..Weights::default()
        };
        assert!(combine_scores(&scores, &heavy) > low);
    }

    #[test]
    fn iching_weight_moves_toward_iching_score() {
        let mut scores = flat(0.5);
        let mut prev_hi = None;
        let mut prev_lo = None;
        for w in [0.0, 0.1, 0.3, 0.6, 1.2] {
            let weights = Weights {
                iching: w,
                ..Weights::default()
            };
            scores.iching = 0.9;
            let hi = combine_scores(&scores, &weights);
            scores.iching = 0.1;
            let lo = combine_scores(&scores, &weights);
            if let (Some(ph), Some(pl)) = (prev_hi, prev_lo) {
                assert!(hi > ph);
                assert!(lo < pl);
            }
            prev_hi = Some(hi);
            prev_lo = Some(lo);
        }
    }

    #[test]
    fn gate_bounds() {
        assert!((factor_gate(0.0, 0.0, 0.0) - 0.25).abs() < 1e-12);
        assert!((factor_gate(1.0, 1.0, 1.0) - 0.89).abs() < 1e-12);
    }

    #[test]
    fn remap_edges() {
        assert_eq!(remap_to_100(0.5, 0.5), 50);
        assert_eq!(remap_to_100(1.0, 0.99), 100);
        assert_eq!(remap_to_100(0.0, 0.0), 0);
        assert_eq!(remap_to_100(0.5, 0.0), 47);
    }

    #[test]
    fn fuse_blends_factor_by_gate() {
        let f = fuse(&flat(0.5), &Weights::default(), 1.0, 0.0, 0.0, 0.5);
        // entropy score 0.5 -> gate = 0.25 + 0.11
        assert!((f.gate - 0.36).abs() < 1e-12);
        assert!((f.combined - (0.5 * 0.64 + 0.36)).abs() < 1e-12);
        assert_eq!(f.score, 68);
    }
}
