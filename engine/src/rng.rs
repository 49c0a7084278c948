//! Deterministic xorshift32 streams.
//!
//! Every concern that needs randomness gets its own stream, keyed by mixing
//! the base seed with a fixed [`StreamTag`]. Streams are never shared, so
//! changing how many numbers one stage draws leaves every other stage's
//! numbers untouched.

use crate::mix::mix32;

/// Identifies an independent random stream derived from a base seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamTag(u32);

impl StreamTag {
    pub const TRACE: StreamTag = StreamTag(0x7472_6163); // "trac"
    pub const ENVIRONMENT: StreamTag = StreamTag(0x656e_7669); // "envi"
    pub const BLEND: StreamTag = StreamTag(0x626c_6e64); // "blnd"
    pub const TIDAL: StreamTag = StreamTag(0x7469_6465); // "tide"
    pub const GEOMAGNETIC: StreamTag = StreamTag(0x6765_6f6d); // "geom"
    pub const THERMAL: StreamTag = StreamTag(0x7468_726d); // "thrm"
    pub const KINETICS: StreamTag = StreamTag(0x6b69_6e65); // "kine"
    pub const INFORMATION: StreamTag = StreamTag(0x696e_666f); // "info"
    pub const CHAOS: StreamTag = StreamTag(0x6368_616f); // "chao"
    pub const QUANTUM: StreamTag = StreamTag(0x7175_616e); // "quan"
    pub const EPIDEMIC: StreamTag = StreamTag(0x6570_6964); // "epid"
    pub const AVALANCHE: StreamTag = StreamTag(0x6176_616c); // "aval"

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// xorshift32 (13/17/5) producing floats in `[0, 1)`.
///
/// A zero state is a fixed point and yields `0.0` forever; seeds reaching
/// here come out of [`mix32`], which makes that vanishingly rare.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// A fresh stream for one concern, independent of all other tags.
    #[must_use]
    pub const fn stream(base_seed: u32, tag: StreamTag) -> Self {
        Self::new(mix32(base_seed, tag.value(), 0))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next float in `[0, 1)`. The scale factor keeps `u32::MAX` strictly below 1.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) * 0.999_999_999
    }

    /// Uniform integer in `lo..=hi`.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi);
        let span = f64::from(hi - lo + 1);
        lo + (self.next_f64() * span).floor() as u32
    }

    /// Centered noise in `[-amplitude, amplitude)`.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * amplitude
    }
}
