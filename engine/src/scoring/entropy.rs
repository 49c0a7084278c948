use super::clamp01;

/// Tent function over `entropy mod 100000`, peaking at the midpoint and
/// remapped into `[0.35, 1]`.
#[must_use]
pub fn score_entropy(entropy: u32) -> f64 {
    let n = f64::from(entropy % 100_000) / 100_000.0;
    let curve = 1.0 - (n - 0.5).abs() * 1.6;
    clamp01(0.35 + curve * 0.65)
}
