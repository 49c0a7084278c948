//! Plain-text rendering of results and traces.

use std::fmt::Write as _;

use gua_engine::{ChainReport, DivinationResult, Element, TraceEvent, TraceKind};
use serde::Serialize;

#[must_use]
pub fn result_text(result: &DivinationResult, entropy: u32) -> String {
    let carry = &result.carry;
    let hexagram = &carry.hexagram;
    let elements = Element::ALL
        .iter()
        .map(|e| format!("{} {:.2}", e.glyph(), carry.elements.get(*e)))
        .collect::<Vec<_>>()
        .join("  ");

    let mut out = String::new();
    let _ = writeln!(out, "签  {} ({})", result.verdict, result.score);
    let _ = writeln!(
        out,
        "卦  {} (上{} 下{}) 动爻 {}",
        hexagram.name, hexagram.upper, hexagram.lower, hexagram.changing_line
    );
    let _ = writeln!(out, "柱  {}", carry.pillars.as_array().join(" "));
    let _ = writeln!(out, "行  {elements}");
    let _ = writeln!(out, "诗  {}", result.poem);
    let _ = writeln!(out, "seed {:08x}  entropy {entropy:08x}", carry.seed);
    out
}

/// One trace line: virtual time, indentation by depth, marker, message, data.
#[must_use]
pub fn event_line(event: &TraceEvent) -> String {
    let marker = match event.kind {
        TraceKind::GroupStart => '▸',
        TraceKind::GroupEnd => '◂',
        TraceKind::Event => '·',
    };
    let mut line = format!(
        "{:>6}ms {}{marker} [{}] {}",
        event.t,
        "  ".repeat(usize::from(event.depth)),
        event.phase,
        event.message
    );
    if let Some(data) = &event.data {
        for (key, value) in data.iter() {
            let _ = write!(line, " {key}={value}");
        }
    }
    let _ = write!(line, "  #{}", gua_engine::short_hash(&event.hash));
    line
}

#[must_use]
pub fn report_text(report: &ChainReport) -> String {
    format!(
        "{} ok: {} events, {} groups, root {}",
        gua_engine::CHAIN_CHECK_MESSAGE,
        report.events,
        report.groups,
        report.root
    )
}

#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub entropy: u32,
    pub result: &'a DivinationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<&'a [TraceEvent]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<&'a ChainReport>,
}
