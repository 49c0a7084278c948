use std::collections::HashSet;

use gua_types::{TraceEvent, TraceEventId, TraceKind};

/// Events to display when the groups whose start ids are in `collapsed` are
/// folded. Group ends are never shown; a folded group shows only its start.
#[must_use]
pub fn visible_events<'a>(
    events: &'a [TraceEvent],
    collapsed: &HashSet<TraceEventId>,
) -> Vec<&'a TraceEvent> {
    let mut shown = Vec::with_capacity(events.len());
    let mut hidden_depth: Option<u16> = None;

    for event in events {
        if let Some(depth) = hidden_depth {
            if event.kind == TraceKind::GroupEnd && event.depth == depth {
                hidden_depth = None;
                continue;
            }
            if event.depth > depth {
                continue;
            }
            hidden_depth = None;
        }

        match event.kind {
            TraceKind::GroupEnd => {}
            TraceKind::GroupStart if collapsed.contains(&event.id) => {
                shown.push(event);
                hidden_depth = Some(event.depth);
            }
            _ => shown.push(event),
        }
    }
    shown
}
