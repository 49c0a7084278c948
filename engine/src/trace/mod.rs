//! Hash-chained execution trace.
//!
//! The computation reports every step to a [`TraceSink`]. [`NullSink`] drops
//! everything (plain `divine`); [`TraceRecorder`] builds the chained event
//! log returned by `divine_with_trace`. Because the recorder draws its pacing
//! jitter from its own stream, recording never changes computed values.

mod digest;
mod recorder;
mod verify;
mod view;

pub use digest::{GENESIS_HASH, short_hash};
pub use recorder::TraceRecorder;
pub use verify::{ChainReport, TraceIntegrityError, verify_trace};
pub use view::visible_events;

use gua_types::{Fingerprint, TraceData, TracePhase};

/// Message of the event that re-checks the chain before the trace closes.
pub const CHAIN_CHECK_MESSAGE: &str = "签名链校验";

/// Data key carrying the abbreviated group digest on group boundary events.
pub const GROUP_DIGEST_KEY: &str = "gd";

/// Receiver for computation steps.
pub trait TraceSink {
    /// Open a group. Subsequent events nest one level deeper until the
    /// matching [`TraceSink::group_end`].
    fn group_start(
        &mut self,
        phase: TracePhase,
        message: &str,
        data: Option<TraceData>,
        fp: Option<Fingerprint>,
    );

    /// Close the innermost open group. The end event reuses the group's
    /// phase and message.
    fn group_end(&mut self, data: Option<TraceData>, fp: Option<Fingerprint>);

    fn emit(
        &mut self,
        phase: TracePhase,
        message: &str,
        data: Option<TraceData>,
        fp: Option<Fingerprint>,
    );

    /// Re-check the chain recorded so far and emit the result as a
    /// [`CHAIN_CHECK_MESSAGE`] event.
    fn chain_check(&mut self, phase: TracePhase);

    fn note(&mut self, phase: TracePhase, message: &str, data: TraceData) {
        self.emit(phase, message, Some(data), None);
    }
}

/// Discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn group_start(
        &mut self,
        _phase: TracePhase,
        _message: &str,
        _data: Option<TraceData>,
        _fp: Option<Fingerprint>,
    ) {
    }

    fn group_end(&mut self, _data: Option<TraceData>, _fp: Option<Fingerprint>) {}

    fn emit(
        &mut self,
        _phase: TracePhase,
        _message: &str,
        _data: Option<TraceData>,
        _fp: Option<Fingerprint>,
    ) {
    }

    fn chain_check(&mut self, _phase: TracePhase) {}
}
