//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use gua_engine::{DEFAULT_ENTROPY_SEED, DivinationConfig, DivinationInput, TracedDivination};

pub const INTERVIEW_QUESTION: &str = "这次面试能过吗";

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// The reference scenario: fixed question, 2024-01-01 09:00, default entropy.
pub fn interview_input() -> DivinationInput {
    DivinationInput::new(INTERVIEW_QUESTION, at(2024, 1, 1, 9, 0))
}

pub fn interview_traced() -> TracedDivination {
    gua_engine::divine_with_trace(
        &interview_input(),
        DEFAULT_ENTROPY_SEED,
        &DivinationConfig::default(),
    )
    .unwrap()
}

/// A spread of inputs covering both hemispheres of the calendar, odd hours,
/// empty and long questions, and nicknames.
pub fn varied_inputs() -> Vec<(DivinationInput, u32)> {
    let questions = [
        "",
        "   ",
        INTERVIEW_QUESTION,
        "Should I take the job offer in Shenzhen?",
        "明天的项目评审会顺利吗？还有下周的出差呢",
    ];
    let times = [
        at(1900, 1, 31, 0, 0),
        at(1990, 5, 15, 23, 30),
        at(2024, 2, 4, 16, 20),
        at(2024, 12, 31, 12, 59),
        at(2050, 7, 7, 7, 7),
    ];
    let mut out = Vec::new();
    for (qi, question) in questions.iter().enumerate() {
        for (ti, time) in times.iter().enumerate() {
            let mut input = DivinationInput::new(*question, *time);
            if (qi + ti) % 2 == 0 {
                input = input.with_nickname("阿星");
            }
            let entropy = (qi as u32 * 7 + ti as u32).wrapping_mul(0x9e37_79b9);
            out.push((input, entropy));
        }
    }
    out
}
