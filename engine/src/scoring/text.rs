use super::clamp01;

/// Numeric features of a (normalized) question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNumbers {
    /// Character count, at least 1.
    pub length: u32,
    pub unicode_sum: u32,
    pub pseudo_strokes: u32,
    pub chaos: u32,
}

impl TextNumbers {
    #[must_use]
    pub fn of(question: &str) -> Self {
        let mut count = 0u32;
        let mut unicode_sum = 0u32;
        let mut pseudo_strokes = 0u32;
        let mut chaos = 0u32;
        for ch in question.chars() {
            let cp = u32::from(ch);
            let strokes = pseudo_stroke(cp);
            unicode_sum = unicode_sum.wrapping_add(cp);
            pseudo_strokes += strokes;
            chaos = chaos.wrapping_add((cp ^ strokes).wrapping_mul(2_654_435_761));
            count += 1;
        }
        Self {
            length: count.max(1),
            unicode_sum,
            pseudo_strokes,
            chaos,
        }
    }
}

/// A stand-in stroke count in `5..=27`, hashed from the code point.
#[must_use]
pub fn pseudo_stroke(code_point: u32) -> u32 {
    let a = (code_point >> 3) ^ code_point.wrapping_mul(1_315_423_911);
    let b = a ^ (a >> 11) ^ (a << 7);
    5 + b % 23
}

#[must_use]
pub fn score_text(nums: &TextNumbers) -> f64 {
    let density = clamp01(f64::from(nums.pseudo_strokes) / (f64::from(nums.length) * 22.0));
    let focus = clamp01(1.0 - (f64::from(nums.unicode_sum % 97) / 97.0 - 0.5).abs() * 1.9);
    // Signed remainder: folds with the top bit set land below zero and clamp away.
    let folded = (nums.chaos ^ (nums.chaos >> 13)) as i32;
    let omen = clamp01(f64::from(folded % 1000) / 1000.0);
    clamp01(density * 0.44 + focus * 0.36 + omen * 0.2)
}
