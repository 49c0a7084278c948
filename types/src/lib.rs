//! Core domain types for Gua.
//!
//! This crate contains pure value types with no IO and minimal dependencies:
//! the caller-owned input, the tunable config, the result handed back after a
//! divination, and the trace event model consumed by renderers.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod config;
mod elements;
mod ids;
mod result;
mod trace;

pub use config::{ConfigValueError, DivinationConfig, VerdictThresholds, Weights};
pub use elements::{Element, Elements};
pub use ids::TraceEventId;
pub use result::{Carry, DivinationResult, Hexagram, Pillars, UnknownVerdict, Verdict};
pub use trace::{Fingerprint, TraceData, TraceEvent, TraceKind, TracePhase, TraceValue};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum number of characters of a question that take part in a divination.
pub const MAX_QUESTION_CHARS: usize = 120;

/// What the caller asks, and when.
///
/// `datetime` is a wall-clock calendar timestamp with no zone attached; the
/// calendar layer decides how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivinationInput {
    pub question: String,
    pub datetime: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl DivinationInput {
    #[must_use]
    pub fn new(question: impl Into<String>, datetime: NaiveDateTime) -> Self {
        Self {
            question: question.into(),
            datetime,
            nickname: None,
        }
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// The question with whitespace runs collapsed and capped at
    /// [`MAX_QUESTION_CHARS`] characters.
    #[must_use]
    pub fn normalized_question(&self) -> String {
        normalize_question(&self.question)
    }

    #[must_use]
    pub fn nickname_or_empty(&self) -> &str {
        self.nickname.as_deref().unwrap_or("")
    }
}

/// Trim, collapse whitespace runs to a single space, and keep the first
/// [`MAX_QUESTION_CHARS`] characters.
#[must_use]
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_QUESTION_CHARS)
        .collect()
}
