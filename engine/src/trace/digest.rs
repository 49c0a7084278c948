use sha2::{Digest, Sha256};
use std::fmt::Write;

use gua_types::{Fingerprint, TraceData, TraceKind, TracePhase};

use super::GROUP_DIGEST_KEY;
use crate::mix::{fnv1a32, mix32};

/// `prev` of the first event.
pub const GENESIS_HASH: &str = "0000000000000000";

pub(crate) const ACCUMULATOR_SEED: u32 = 0;
const FOLD_SALT: u32 = 0x9e37_79b9;

/// First 8 bytes of SHA-256, as 16 lowercase hex characters.
pub(crate) fn chain_hash(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    digest[..8].iter().fold(String::with_capacity(16), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

pub(crate) fn fold_hash(acc: u32, hash: &str) -> u32 {
    mix32(acc, fnv1a32(hash), FOLD_SALT)
}

/// Everything an event's hash covers. Back-filled fields (`groupDigest`,
/// `rootDigest`, and the `gd` data key) are excluded.
#[allow(clippy::too_many_arguments)]
pub(crate) fn payload(
    prev: &str,
    t: u64,
    depth: u16,
    kind: TraceKind,
    phase: TracePhase,
    message: &str,
    data: Option<&TraceData>,
    fp: Option<&Fingerprint>,
) -> String {
    let data = data
        .map(|d| d.canonical_without(&[GROUP_DIGEST_KEY]))
        .unwrap_or_default();
    let fp = fp.map(Fingerprint::canonical).unwrap_or_default();
    format!(
        "{prev}|{t}|{depth}|{kind}|{phase}|{message}|{data}|{fp}",
        kind = kind.as_str(),
        phase = phase.as_str(),
    )
}

pub(crate) fn group_digest(start_hash: &str, acc: u32, end_hash: &str) -> String {
    chain_hash(&format!("{start_hash}|{acc:08x}|{end_hash}"))
}

pub(crate) fn root_digest(acc: u32, count: usize, last_hash: &str) -> String {
    chain_hash(&format!("root|{acc:08x}|{count}|{last_hash}"))
}

/// First six characters, for compact display.
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    hash.get(..6).unwrap_or(hash)
}
