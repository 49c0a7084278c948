//! 32-bit hashing and mixing primitives.
//!
//! Everything here works on `u32` with wrapping arithmetic. The exact bit
//! patterns matter: seeds, stage streams, and trace hashes all derive from
//! these functions, so changing a constant changes every downstream value.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the Unicode code points of `input` (not its UTF-8 bytes).
#[must_use]
pub fn fnv1a32(input: &str) -> u32 {
    input.chars().fold(FNV_OFFSET, |hash, ch| {
        (hash ^ u32::from(ch)).wrapping_mul(FNV_PRIME)
    })
}

#[must_use]
pub const fn rotl32(x: u32, r: u32) -> u32 {
    x.rotate_left(r)
}

/// Two-round multiply-xor-shift finalizer.
#[must_use]
pub const fn avalanche32(x: u32) -> u32 {
    let x = (x ^ (x >> 16)).wrapping_mul(0x7feb_352d);
    let x = (x ^ (x >> 15)).wrapping_mul(0x846c_a68b);
    x ^ (x >> 16)
}

/// Combine up to three integers into one well-distributed seed.
///
/// Pass `0` for `c` when only two inputs are needed.
#[must_use]
pub const fn mix32(a: u32, b: u32, c: u32) -> u32 {
    avalanche32(a ^ rotl32(b, 11) ^ rotl32(c, 7))
}

/// Unrotated two-input fold, used for accumulating pointer samples.
#[must_use]
pub const fn fold32(seed: u32, n: u32) -> u32 {
    avalanche32(seed ^ n)
}

/// Sum of the decimal digits of `n`.
#[must_use]
pub fn sum_digits(mut n: u64) -> u64 {
    let mut acc = 0;
    while n > 0 {
        acc += n % 10;
        n /= 10;
    }
    acc
}

/// Repeated digit sum until a single digit remains.
#[must_use]
pub fn digital_root(n: u64) -> u64 {
    let mut x = n;
    while x >= 10 {
        x = sum_digits(x);
    }
    x
}
