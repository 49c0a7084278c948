//! Structural properties of recorded traces.

mod common;

use std::collections::HashSet;

use common::{interview_traced, varied_inputs};
use gua_engine::{
    CHAIN_CHECK_MESSAGE, DivinationConfig, TraceEvent, TraceIntegrityError, TraceKind, TracePhase,
    divine_with_trace, playback_delays, short_hash, verify_trace, visible_events,
};

fn all_traces() -> Vec<Vec<TraceEvent>> {
    let config = DivinationConfig::default();
    varied_inputs()
        .into_iter()
        .map(|(input, entropy)| divine_with_trace(&input, entropy, &config).unwrap().trace)
        .collect()
}

#[test]
fn every_link_points_at_its_predecessor() {
    for trace in all_traces() {
        for pair in trace.windows(2) {
            assert_eq!(pair[1].prev, pair[0].hash);
        }
        for (i, event) in trace.iter().enumerate() {
            assert_eq!(event.id.value() as usize, i);
            assert_eq!(event.hash.len(), 16);
        }
    }
}

#[test]
fn groups_pair_up_with_matching_digests() {
    for trace in all_traces() {
        let mut stack: Vec<&TraceEvent> = Vec::new();
        for event in &trace {
            match event.kind {
                TraceKind::GroupStart => stack.push(event),
                TraceKind::GroupEnd => {
                    let start = stack.pop().expect("group_end without start");
                    assert_eq!(start.depth, event.depth);
                    assert_eq!(start.message, event.message);
                    let digest = start.group_digest.as_deref().unwrap();
                    assert!(!digest.is_empty());
                    assert_eq!(event.group_digest.as_deref(), Some(digest));
                }
                TraceKind::Event => {
                    assert_eq!(usize::from(event.depth), stack.len());
                }
            }
        }
        assert!(stack.is_empty());
        assert_eq!(trace.last().unwrap().depth, 0);
    }
}

#[test]
fn root_digest_matches_the_chain_check() {
    for trace in all_traces() {
        let root = trace[0].root_digest.as_deref().unwrap();
        let check = trace
            .iter()
            .rev()
            .find(|e| e.phase == TracePhase::Verdict && e.message == CHAIN_CHECK_MESSAGE)
            .unwrap();
        assert_eq!(check.root_digest.as_deref(), Some(root));
        let data = check.data.as_ref().unwrap();
        assert_eq!(data.get_number("ok"), Some(1.0));
        assert_eq!(data.get_text("head"), Some(short_hash(&trace[0].hash)));
    }
}

#[test]
fn recorded_traces_verify() {
    for trace in all_traces() {
        let report = verify_trace(&trace).unwrap();
        assert_eq!(report.events, trace.len());
        assert_eq!(
            report.groups,
            trace.iter().filter(|e| e.is_group_start()).count()
        );
        assert_eq!(Some(report.root.as_str()), trace[0].root_digest.as_deref());
    }
}

#[test]
fn reference_trace_head_and_shape() {
    let trace = interview_traced().trace;
    assert_eq!(trace.len(), 79);

    assert_eq!(trace[0].t, 402);
    assert_eq!(trace[0].prev, "0000000000000000");
    assert_eq!(trace[0].hash, "03a19a49d6ca1a2d");
    assert_eq!(trace[1].message, "四柱");
    assert_eq!(trace[1].t, 660);
    assert_eq!(trace[1].hash, "116981d3e832822f");

    let check = trace
        .iter()
        .position(|e| e.message == CHAIN_CHECK_MESSAGE)
        .unwrap();
    assert_eq!(check, 77);
    assert_eq!(
        trace[check].data.as_ref().unwrap().get_number("count"),
        Some(77.0)
    );
}

#[test]
fn tampering_is_detected() {
    let mut trace = interview_traced().trace;
    let target = trace
        .iter()
        .position(|e| e.message == "动爻")
        .unwrap();
    if let Some(data) = trace[target].data.as_mut() {
        data.insert("changingLine", gua_types::TraceValue::Number(9.0));
    }
    assert_eq!(
        verify_trace(&trace),
        Err(TraceIntegrityError::HashMismatch { index: target })
    );
}

#[test]
fn top_level_phases_in_order() {
    let trace = interview_traced().trace;
    let top: Vec<(&str, TracePhase)> = trace
        .iter()
        .filter(|e| e.is_group_start() && e.depth == 0)
        .map(|e| (e.message.as_str(), e.phase))
        .collect();
    assert_eq!(
        top,
        vec![
            ("时辰排盘", TracePhase::Time),
            ("字象解析", TracePhase::Text),
            ("起卦", TracePhase::IChing),
            ("数理推演", TracePhase::Numerology),
            ("天机感应", TracePhase::Entropy),
            ("分数融合", TracePhase::Fusion),
            ("裁决定签", TracePhase::Verdict),
        ]
    );
    let phases: Vec<TracePhase> = top.iter().map(|(_, phase)| *phase).collect();
    assert_eq!(phases, TracePhase::ALL);
}

#[test]
fn factor_stages_nest_inside_the_entropy_phase() {
    let trace = interview_traced().trace;
    let stages = trace
        .iter()
        .filter(|e| e.is_group_start() && e.depth == 2 && e.phase == TracePhase::Entropy)
        .count();
    assert_eq!(stages, 9);

    let injection = trace
        .iter()
        .find(|e| e.message == "多学科因子注入")
        .unwrap();
    assert_eq!(injection.depth, 1);
    assert!(injection.fp.is_some());
    assert_eq!(injection.data.as_ref().unwrap().get_text("sig").map(str::len), Some(8));
}

#[test]
fn virtual_clock_advances() {
    let trace = interview_traced().trace;
    for pair in trace.windows(2) {
        let step = pair[1].t - pair[0].t;
        match pair[1].kind {
            TraceKind::Event => assert!((80..=300).contains(&step)),
            _ => assert!((160..=520).contains(&step)),
        }
    }
}

#[test]
fn collapsing_the_entropy_phase_hides_its_contents() {
    let trace = interview_traced().trace;
    let entropy_group = trace
        .iter()
        .find(|e| e.is_group_start() && e.message == "天机感应")
        .unwrap();
    let expanded = visible_events(&trace, &HashSet::new());
    let collapsed = visible_events(&trace, &HashSet::from([entropy_group.id]));

    assert!(expanded.iter().all(|e| !e.is_group_end()));
    assert!(collapsed.len() < expanded.len());
    assert!(collapsed.iter().any(|e| e.id == entropy_group.id));
    assert!(collapsed.iter().all(|e| e.message != "多学科因子注入"));
    assert!(collapsed.iter().any(|e| e.message == "分数融合"));
}

#[test]
fn playback_covers_every_event() {
    let trace = interview_traced().trace;
    let delays = playback_delays(&trace, 0x1234_5678, 20_000);
    assert_eq!(delays.len(), trace.len());
    assert!(delays.iter().all(|d| d.as_millis() >= 18));
}
