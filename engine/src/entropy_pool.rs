//! Accumulates pointer movement into a 32-bit entropy value.

use crate::mix::fold32;

pub const DEFAULT_ENTROPY_SEED: u32 = 0x1234_5678;

const MAX_SPEED: f64 = 4095.0;

#[derive(Debug, Clone, Copy)]
struct LastSample {
    t_ms: f64,
    x: i32,
    y: i32,
}

/// Folds pointer samples into a running seed.
///
/// The first sample contributes its position; every later one contributes the
/// elapsed time, speed, and low bits of the displacement since the previous
/// sample.
#[derive(Debug, Clone)]
pub struct EntropyPool {
    seed: u32,
    last: Option<LastSample>,
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::with_seed(DEFAULT_ENTROPY_SEED)
    }
}

impl EntropyPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self { seed, last: None }
    }

    /// Record a pointer position at `now_ms` (any monotonic millisecond clock).
    pub fn observe(&mut self, x: i32, y: i32, now_ms: f64) {
        let Some(last) = self.last else {
            self.last = Some(LastSample { t_ms: now_ms, x, y });
            self.seed = fold32(self.seed, (x.wrapping_shl(16) ^ y) as u32);
            return;
        };

        let dt = (now_ms - last.t_ms).floor().max(1.0) as u32;
        let dx = x.wrapping_sub(last.x);
        let dy = y.wrapping_sub(last.y);
        self.last = Some(LastSample { t_ms: now_ms, x, y });

        let speed = (f64::from(dx).hypot(f64::from(dy)) * 64.0)
            .floor()
            .min(MAX_SPEED) as u32;
        let sample = ((dt & 0xfff) << 20)
            ^ ((speed & 0xfff) << 8)
            ^ (((dx & 0xf) as u32) << 4)
            ^ (dy & 0xf) as u32;
        self.seed = fold32(self.seed, sample);
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub fn has_samples(&self) -> bool {
        self.last.is_some()
    }
}
