//! Replay pacing for a computed trace.

use std::time::Duration;

use gua_types::{TraceEvent, TracePhase};

use crate::mix::fold32;

pub const DEFAULT_PLAYBACK_MS: u64 = 20_000;
pub const MIN_DELAY_MS: i64 = 18;
/// Pause after the last event before the result is revealed.
pub const REVEAL_PAUSE: Duration = Duration::from_millis(260);

fn phase_boost_ms(phase: TracePhase) -> i64 {
    match phase {
        TracePhase::IChing => 180,
        TracePhase::Fusion => 140,
        TracePhase::Verdict => 220,
        _ => 0,
    }
}

/// Delay after showing each event so that the whole trace plays in roughly
/// `total_ms`, lingering on the 易经, 融合, and 裁决 phases.
#[must_use]
pub fn playback_delays(events: &[TraceEvent], entropy: u32, total_ms: u64) -> Vec<Duration> {
    let base = (total_ms / events.len().max(1) as u64) as i64;
    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let jitter = i64::from(fold32(entropy, (i as u32).wrapping_add(31)) % 160) - 80;
            let ms = (base + phase_boost_ms(event.phase) + jitter).max(MIN_DELAY_MS);
            Duration::from_millis(ms as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceRecorder, TraceSink};

    fn events(phases: &[TracePhase]) -> Vec<TraceEvent> {
        let mut rec = TraceRecorder::new(1);
        for phase in phases {
            rec.emit(*phase, "step", None, None);
        }
        rec.finish()
    }

    #[test]
    fn one_delay_per_event() {
        let evs = events(&[TracePhase::Time, TracePhase::Text, TracePhase::Verdict]);
        assert_eq!(playback_delays(&evs, 7, DEFAULT_PLAYBACK_MS).len(), 3);
        assert!(playback_delays(&[], 7, DEFAULT_PLAYBACK_MS).is_empty());
    }

    #[test]
    fn delay_formula() {
        let evs = events(&[TracePhase::Time, TracePhase::IChing]);
        let delays = playback_delays(&evs, 99, 1000);
        for (i, d) in delays.iter().enumerate() {
            let jitter = i64::from(fold32(99, i as u32 + 31) % 160) - 80;
            let boost = if i == 1 { 180 } else { 0 };
            assert_eq!(d.as_millis() as i64, (500 + boost + jitter).max(18));
        }
    }

    #[test]
    fn tiny_budget_hits_the_floor() {
        let evs = events(&[TracePhase::Text; 10]);
        let delays = playback_delays(&evs, 3, 0);
        assert!(delays.iter().all(|d| d.as_millis() >= 18));
        assert!(delays.iter().all(|d| d.as_millis() <= 79));
    }
}
