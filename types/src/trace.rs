//! Trace event model.
//!
//! A trace is an ordered, hash-chained list of [`TraceEvent`]s. Events are
//! grouped by `group_start`/`group_end` pairs that nest with stack discipline.
//! Producers live in `gua-engine`; this module only defines the shapes and
//! their canonical string encodings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::TraceEventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    GroupStart,
    GroupEnd,
    Event,
}

impl TraceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GroupStart => "group_start",
            Self::GroupEnd => "group_end",
            Self::Event => "event",
        }
    }
}

/// The seven computation phases a trace event can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TracePhase {
    #[serde(rename = "时间")]
    Time,
    #[serde(rename = "文字")]
    Text,
    #[serde(rename = "易经")]
    IChing,
    #[serde(rename = "数理")]
    Numerology,
    #[serde(rename = "天机")]
    Entropy,
    #[serde(rename = "融合")]
    Fusion,
    #[serde(rename = "裁决")]
    Verdict,
}

impl TracePhase {
    pub const ALL: [TracePhase; 7] = [
        TracePhase::Time,
        TracePhase::Text,
        TracePhase::IChing,
        TracePhase::Numerology,
        TracePhase::Entropy,
        TracePhase::Fusion,
        TracePhase::Verdict,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Time => "时间",
            Self::Text => "文字",
            Self::IChing => "易经",
            Self::Numerology => "数理",
            Self::Entropy => "天机",
            Self::Fusion => "融合",
            Self::Verdict => "裁决",
        }
    }
}

impl fmt::Display for TracePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Key-ordered payload attached to an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceData(BTreeMap<String, TraceValue>);

impl TraceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric entry, rounded to 6 decimal places so that printed
    /// payloads stay short.
    #[must_use]
    pub fn num(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, TraceValue::Number(round6(value)));
        self
    }

    #[must_use]
    pub fn int(mut self, key: impl Into<String>, value: impl Into<i64>) -> Self {
        self.insert(key, TraceValue::Number(value.into() as f64));
        self
    }

    #[must_use]
    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, TraceValue::Text(value.into()));
        self
    }

    /// Render a u32 as 8 lowercase hex digits.
    #[must_use]
    pub fn hex(self, key: impl Into<String>, value: u32) -> Self {
        self.text(key, format!("{value:08x}"))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: TraceValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<TraceValue> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TraceValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(TraceValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(TraceValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TraceValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `k=v` pairs, keys in lexicographic order, joined by `;`.
    /// Keys listed in `skip` are left out.
    #[must_use]
    pub fn canonical_without(&self, skip: &[&str]) -> String {
        self.0
            .iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    #[must_use]
    pub fn canonical(&self) -> String {
        self.canonical_without(&[])
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Eight values in `[0, 1]` summarizing a set of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint([f64; 8]);

impl Fingerprint {
    pub const LEN: usize = 8;

    /// Clamps each value into `[0, 1]`; NaN becomes 0.
    #[must_use]
    pub fn new(values: [f64; 8]) -> Self {
        Self(values.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }))
    }

    #[must_use]
    pub fn values(&self) -> &[f64; 8] {
        &self.0
    }

    /// Values rounded to 4 decimals, comma separated.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|v| format!("{v:.4}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    pub id: TraceEventId,
    /// Virtual milliseconds since the start of the trace.
    pub t: u64,
    pub depth: u16,
    pub kind: TraceKind,
    pub phase: TracePhase,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TraceData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_digest: Option<String>,
    pub prev: String,
    pub hash: String,
}

impl TraceEvent {
    #[must_use]
    pub fn is_group_start(&self) -> bool {
        self.kind == TraceKind::GroupStart
    }

    #[must_use]
    pub fn is_group_end(&self) -> bool {
        self.kind == TraceKind::GroupEnd
    }
}
