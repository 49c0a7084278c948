//! Deterministic divination engine.
//!
//! A question, a timestamp, an optional nickname, and a 32-bit entropy value
//! go in; a verdict, a score, a poem, and the intermediate values come out.
//! The same inputs always give the same output. [`divine_with_trace`] also
//! returns a hash-chained trace of every step, which [`verify_trace`] can
//! re-check.

mod calendar;
mod divine;
mod entropy_pool;
mod environment;
pub mod factors;
mod fusion;
pub mod mix;
mod playback;
pub mod rng;
pub mod scoring;
pub mod trace;
mod verdict;

pub use calendar::{BRANCHES, CalendarError, PillarCalendar, STEMS, SexagenaryCalendar};
pub use divine::{
    DivinationError, TracedDivination, divine, divine_with_calendar, divine_with_trace,
    divine_with_trace_and_calendar, time_signature,
};
pub use entropy_pool::{DEFAULT_ENTROPY_SEED, EntropyPool};
pub use environment::Environment;
pub use factors::{FactorAggregate, FactorOutput};
pub use fusion::{Fusion, combine_scores, factor_gate, fuse, remap_to_100};
pub use playback::{DEFAULT_PLAYBACK_MS, MIN_DELAY_MS, REVEAL_PAUSE, playback_delays};
pub use scoring::DomainScores;
pub use trace::{
    CHAIN_CHECK_MESSAGE, ChainReport, NullSink, TraceIntegrityError, TraceRecorder, TraceSink,
    short_hash, verify_trace, visible_events,
};
pub use verdict::{pick_poem, pick_verdict, poem_pool};

pub use gua_types::{
    DivinationConfig, DivinationInput, DivinationResult, Element, TraceEvent, TraceEventId, TraceKind,
    TracePhase, VerdictThresholds, Weights,
};
