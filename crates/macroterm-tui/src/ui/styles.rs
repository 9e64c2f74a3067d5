use macroterm_core::models::Signal;
use ratatui::style::{Color, Modifier, Style};

// Terminal palette
pub const INK: Color = Color::Rgb(226, 232, 240);
pub const STEEL: Color = Color::Rgb(100, 116, 139);
pub const CYAN: Color = Color::Rgb(56, 189, 248);
pub const GOLD: Color = Color::Rgb(250, 204, 21);
pub const PANEL: Color = Color::Rgb(30, 41, 59);
pub const BAR: Color = Color::Rgb(15, 23, 42);

// Signal colors
pub const GREEN: Color = Color::Rgb(34, 197, 94);
pub const AMBER: Color = Color::Rgb(245, 158, 11);
pub const RED: Color = Color::Rgb(239, 68, 68);
pub const NEUTRAL: Color = Color::Rgb(148, 163, 184);

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(INK)
}

pub fn muted_style() -> Style {
    Style::default().fg(STEEL)
}

/// Numbers and other values the eye should land on.
pub fn highlight_style() -> Style {
    Style::default().fg(GOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(CYAN)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { CYAN } else { STEEL })
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BAR).fg(INK)
}

pub fn help_key_style() -> Style {
    Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}

fn signal_color(signal: Signal) -> Color {
    match signal {
        Signal::Green => GREEN,
        Signal::Amber => AMBER,
        Signal::Red => RED,
        Signal::Neutral => NEUTRAL,
    }
}

/// Pill style: signal color on a dark chip.
pub fn signal_style(signal: Signal) -> Style {
    Style::default()
        .fg(signal_color(signal))
        .bg(PANEL)
        .add_modifier(Modifier::BOLD)
}

pub fn gauge_style() -> Style {
    Style::default().fg(CYAN).bg(PANEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_styles_are_distinct() {
        let colors: Vec<_> = [Signal::Green, Signal::Amber, Signal::Red, Signal::Neutral]
            .into_iter()
            .map(|s| signal_style(s).fg)
            .collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
