use serde::Serialize;
use thiserror::Error;

use gua_types::{TraceEvent, TraceKind, TracePhase};

use super::CHAIN_CHECK_MESSAGE;
use super::digest::{
    ACCUMULATOR_SEED, GENESIS_HASH, chain_hash, fold_hash, group_digest, payload, root_digest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceIntegrityError {
    #[error("trace is empty")]
    Empty,
    #[error("event {index}: prev does not match the preceding hash")]
    BrokenLink { index: usize },
    #[error("event {index}: hash does not match its contents")]
    HashMismatch { index: usize },
    #[error("event {index}: depth {found}, expected {expected}")]
    DepthMismatch {
        index: usize,
        expected: usize,
        found: u16,
    },
    #[error("event {index}: group boundary is unmatched")]
    UnbalancedGroup { index: usize },
    #[error("event {index}: group digest does not match")]
    GroupDigestMismatch { index: usize },
    #[error("no {CHAIN_CHECK_MESSAGE} event in the 裁决 phase")]
    MissingChainCheck,
    #[error("event {index}: root digest missing or wrong")]
    RootDigestMismatch { index: usize },
}

/// Summary of a trace that verified cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub events: usize,
    pub groups: usize,
    pub root: String,
}

struct Frame {
    start_index: usize,
    acc: u32,
}

/// Recompute every hash, group digest, and the root digest of `events`.
pub fn verify_trace(events: &[TraceEvent]) -> Result<ChainReport, TraceIntegrityError> {
    if events.is_empty() {
        return Err(TraceIntegrityError::Empty);
    }

    let mut prev = GENESIS_HASH;
    let mut root_acc = ACCUMULATOR_SEED;
    let mut frames: Vec<Frame> = Vec::new();
    let mut groups = 0;

    for (index, event) in events.iter().enumerate() {
        if event.prev != prev {
            return Err(TraceIntegrityError::BrokenLink { index });
        }
        let expected_hash = chain_hash(&payload(
            &event.prev,
            event.t,
            event.depth,
            event.kind,
            event.phase,
            &event.message,
            event.data.as_ref(),
            event.fp.as_ref(),
        ));
        if event.hash != expected_hash {
            return Err(TraceIntegrityError::HashMismatch { index });
        }

        let closing = if event.kind == TraceKind::GroupEnd {
            Some(
                frames
                    .pop()
                    .ok_or(TraceIntegrityError::UnbalancedGroup { index })?,
            )
        } else {
            None
        };

        let expected_depth = frames.len();
        if usize::from(event.depth) != expected_depth {
            return Err(TraceIntegrityError::DepthMismatch {
                index,
                expected: expected_depth,
                found: event.depth,
            });
        }

        root_acc = fold_hash(root_acc, &event.hash);
        for frame in &mut frames {
            frame.acc = fold_hash(frame.acc, &event.hash);
        }

        if let Some(frame) = closing {
            let start = &events[frame.start_index];
            let digest = group_digest(&start.hash, frame.acc, &event.hash);
            if start.group_digest.as_deref() != Some(digest.as_str()) {
                return Err(TraceIntegrityError::GroupDigestMismatch {
                    index: frame.start_index,
                });
            }
            if event.group_digest.as_deref() != Some(digest.as_str()) {
                return Err(TraceIntegrityError::GroupDigestMismatch { index });
            }
            groups += 1;
        }

        if event.kind == TraceKind::GroupStart {
            frames.push(Frame {
                start_index: index,
                acc: ACCUMULATOR_SEED,
            });
        }
        prev = &event.hash;
    }

    if let Some(frame) = frames.first() {
        return Err(TraceIntegrityError::UnbalancedGroup {
            index: frame.start_index,
        });
    }

    let root = root_digest(root_acc, events.len(), prev);
    if events[0].root_digest.as_deref() != Some(root.as_str()) {
        return Err(TraceIntegrityError::RootDigestMismatch { index: 0 });
    }
    let check_index = events
        .iter()
        .rposition(|e| e.phase == TracePhase::Verdict && e.message == CHAIN_CHECK_MESSAGE)
        .ok_or(TraceIntegrityError::MissingChainCheck)?;
    if events[check_index].root_digest.as_deref() != Some(root.as_str()) {
        return Err(TraceIntegrityError::RootDigestMismatch { index: check_index });
    }

    Ok(ChainReport {
        events: events.len(),
        groups,
        root,
    })
}
