use gua_types::{
    Fingerprint, TraceData, TraceEvent, TraceEventId, TraceKind, TracePhase, TraceValue,
};

use super::digest::{
    ACCUMULATOR_SEED, GENESIS_HASH, chain_hash, fold_hash, group_digest, payload, root_digest,
    short_hash,
};
use super::{CHAIN_CHECK_MESSAGE, GROUP_DIGEST_KEY, TraceSink};
use crate::rng::{StreamTag, Xorshift32};

const EVENT_STEP_MS: (u64, f64) = (80, 221.0);
const GROUP_STEP_MS: (u64, f64) = (160, 361.0);

struct OpenGroup {
    start_index: usize,
    phase: TracePhase,
    message: String,
    acc: u32,
}

/// Builds a hash-chained trace.
///
/// Every event's hash covers its predecessor's hash, so the log is a chain.
/// Each open group folds the hashes of the events recorded inside it; when it
/// closes the fold becomes the group digest written to both boundary events.
/// [`TraceRecorder::finish`] attaches the root digest over the whole run.
pub struct TraceRecorder {
    events: Vec<TraceEvent>,
    open: Vec<OpenGroup>,
    clock_ms: u64,
    next_id: TraceEventId,
    root_acc: u32,
    pacing: Xorshift32,
}

impl TraceRecorder {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            events: Vec::new(),
            open: Vec::new(),
            clock_ms: 0,
            next_id: TraceEventId::new(0),
            root_acc: ACCUMULATOR_SEED,
            pacing: Xorshift32::stream(seed, StreamTag::TRACE),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Close any group left open, then attach the root digest to the first
    /// event and to the last chain check.
    #[must_use]
    pub fn finish(mut self) -> Vec<TraceEvent> {
        while !self.open.is_empty() {
            tracing::warn!(depth = self.open.len(), "closing trace group left open");
            self.group_end(None, None);
        }
        let Some(last_hash) = self.events.last().map(|e| e.hash.clone()) else {
            return self.events;
        };
        let root = root_digest(self.root_acc, self.events.len(), &last_hash);

        if let Some(first) = self.events.first_mut() {
            first.root_digest = Some(root.clone());
        }
        if let Some(check) = self
            .events
            .iter_mut()
            .rev()
            .find(|e| e.phase == TracePhase::Verdict && e.message == CHAIN_CHECK_MESSAGE)
        {
            check.root_digest = Some(root);
        }
        self.events
    }

    fn advance_clock(&mut self, kind: TraceKind) {
        let (base, spread) = match kind {
            TraceKind::Event => EVENT_STEP_MS,
            TraceKind::GroupStart | TraceKind::GroupEnd => GROUP_STEP_MS,
        };
        self.clock_ms += base + (self.pacing.next_f64() * spread).floor() as u64;
    }

    fn push(
        &mut self,
        kind: TraceKind,
        phase: TracePhase,
        message: &str,
        data: Option<TraceData>,
        fp: Option<Fingerprint>,
    ) -> usize {
        self.advance_clock(kind);
        let depth = u16::try_from(self.open.len()).unwrap_or(u16::MAX);
        let prev = self
            .events
            .last()
            .map_or_else(|| GENESIS_HASH.to_string(), |e| e.hash.clone());
        let hash = chain_hash(&payload(
            &prev,
            self.clock_ms,
            depth,
            kind,
            phase,
            message,
            data.as_ref(),
            fp.as_ref(),
        ));

        self.root_acc = fold_hash(self.root_acc, &hash);
        for group in &mut self.open {
            group.acc = fold_hash(group.acc, &hash);
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.events.push(TraceEvent {
            id,
            t: self.clock_ms,
            depth,
            kind,
            phase,
            message: message.to_string(),
            data,
            fp,
            group_digest: None,
            root_digest: None,
            prev,
            hash,
        });
        self.events.len() - 1
    }

    fn mark_group(&mut self, index: usize, digest: &str) {
        let Some(event) = self.events.get_mut(index) else {
            return;
        };
        event.group_digest = Some(digest.to_string());
        event.data.get_or_insert_with(TraceData::new).insert(
            GROUP_DIGEST_KEY,
            TraceValue::Text(short_hash(digest).to_string()),
        );
    }

    fn chain_intact(&self) -> bool {
        let head_ok = self.events.first().is_none_or(|e| e.prev == GENESIS_HASH);
        head_ok && self.events.windows(2).all(|w| w[1].prev == w[0].hash)
    }
}

impl TraceSink for TraceRecorder {
    fn group_start(
        &mut self,
        phase: TracePhase,
        message: &str,
        data: Option<TraceData>,
        fp: Option<Fingerprint>,
    ) {
        let start_index = self.push(TraceKind::GroupStart, phase, message, data, fp);
        self.open.push(OpenGroup {
            start_index,
            phase,
            message: message.to_string(),
            acc: ACCUMULATOR_SEED,
        });
    }

    fn group_end(&mut self, data: Option<TraceData>, fp: Option<Fingerprint>) {
        let Some(group) = self.open.pop() else {
            tracing::warn!("group_end with no open group; ignored");
            return;
        };
        let end_index = self.push(TraceKind::GroupEnd, group.phase, &group.message, data, fp);
        let start_hash = self.events[group.start_index].hash.clone();
        let digest = group_digest(&start_hash, group.acc, &self.events[end_index].hash);
        self.mark_group(group.start_index, &digest);
        self.mark_group(end_index, &digest);
    }

    fn emit(
        &mut self,
        phase: TracePhase,
        message: &str,
        data: Option<TraceData>,
        fp: Option<Fingerprint>,
    ) {
        self.push(TraceKind::Event, phase, message, data, fp);
    }

    fn chain_check(&mut self, phase: TracePhase) {
        let head = self
            .events
            .first()
            .map(|e| short_hash(&e.hash).to_string())
            .unwrap_or_default();
        let tail = self
            .events
            .last()
            .map(|e| short_hash(&e.hash).to_string())
            .unwrap_or_default();
        let count = u32::try_from(self.events.len()).unwrap_or(u32::MAX);
        let data = TraceData::new()
            .text("head", head)
            .text("tail", tail)
            .int("count", count)
            .int("ok", u8::from(self.chain_intact()));
        self.emit(phase, CHAIN_CHECK_MESSAGE, Some(data), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TraceEvent> {
        let mut rec = TraceRecorder::new(42);
        rec.group_start(TracePhase::Time, "时辰排盘", None, None);
        rec.note(TracePhase::Time, "四柱", TraceData::new().text("year", "甲子"));
        rec.group_start(TracePhase::Time, "五行", None, None);
        rec.emit(TracePhase::Time, "统计", None, None);
        rec.group_end(None, None);
        rec.group_end(Some(TraceData::new().num("score", 0.5)), None);
        rec.group_start(TracePhase::Verdict, "裁决定签", None, None);
        rec.chain_check(TracePhase::Verdict);
        rec.group_end(None, None);
        rec.finish()
    }

    #[test]
    fn ids_and_clock_are_monotonic() {
        let events = sample();
        for (i, e) in events.iter().enumerate() {
            assert_eq!(e.id.value() as usize, i);
        }
        for w in events.windows(2) {
            assert!(w[1].t > w[0].t);
        }
    }

    #[test]
    fn chain_links() {
        let events = sample();
        assert_eq!(events[0].prev, GENESIS_HASH);
        for w in events.windows(2) {
            assert_eq!(w[1].prev, w[0].hash);
        }
    }

    #[test]
    fn depths_follow_nesting() {
        let depths: Vec<u16> = sample().iter().map(|e| e.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn group_boundaries_share_digest() {
        let events = sample();
        let outer = events[0].group_digest.clone().unwrap();
        assert_eq!(events[5].group_digest.as_deref(), Some(outer.as_str()));
        let inner = events[2].group_digest.clone().unwrap();
        assert_eq!(events[4].group_digest.as_deref(), Some(inner.as_str()));
        assert_ne!(outer, inner);
        assert_eq!(
            events[0].data.as_ref().unwrap().get_text(GROUP_DIGEST_KEY),
            Some(&outer[..6])
        );
        assert!(events[1].group_digest.is_none());
    }

    #[test]
    fn root_digest_on_first_and_check() {
        let events = sample();
        let root = events[0].root_digest.clone().unwrap();
        let check = events
            .iter()
            .find(|e| e.message == CHAIN_CHECK_MESSAGE)
            .unwrap();
        assert_eq!(check.root_digest.as_deref(), Some(root.as_str()));
        assert_eq!(check.data.as_ref().unwrap().get_number("ok"), Some(1.0));
        assert_eq!(check.data.as_ref().unwrap().get_number("count"), Some(7.0));
    }

    #[test]
    fn same_seed_same_trace() {
        assert_eq!(sample(), sample());
    }

    #[test]
    fn unmatched_end_is_ignored() {
        let mut rec = TraceRecorder::new(1);
        rec.group_end(None, None);
        rec.emit(TracePhase::Text, "x", None, None);
        let events = rec.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].depth, 0);
    }

    #[test]
    fn finish_closes_dangling_groups() {
        let mut rec = TraceRecorder::new(1);
        rec.group_start(TracePhase::Text, "a", None, None);
        rec.group_start(TracePhase::Text, "b", None, None);
        let events = rec.finish();
        assert_eq!(events.len(), 4);
        assert!(events[3].is_group_end());
        assert_eq!(events[3].message, "a");
    }
}
