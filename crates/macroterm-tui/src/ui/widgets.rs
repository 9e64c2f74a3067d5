use macroterm_core::view::Pill;
use ratatui::text::{Line, Span};

use super::styles;

/// A signal pill as a single span, padded like a chip.
pub fn pill(pill: &Pill) -> Span<'static> {
    Span::styled(format!(" {} ", pill.text), styles::signal_style(pill.signal))
}

/// A row of pills separated by spaces. Wraps when rendered with `Wrap`.
pub fn pill_line(pills: &[Pill]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pills.len() * 2);
    for (i, p) in pills.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(pill(p));
    }
    Line::from(spans)
}

/// Pills, or a muted placeholder when there are none.
pub fn pill_line_or(pills: &[Pill], empty: &'static str) -> Line<'static> {
    if pills.is_empty() {
        Line::from(Span::styled(empty, styles::muted_style()))
    } else {
        pill_line(pills)
    }
}
