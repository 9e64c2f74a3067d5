use macroterm_core::view::GeoView;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::styles;
use crate::ui::widgets::{pill, pill_line_or};

pub fn render(frame: &mut Frame, view: &GeoView, area: Rect) {
    let block = Block::default()
        .title(" Geopolitics & Policy ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let lines = vec![
        Line::from(vec![pill(&view.gpr), Span::raw(" "), pill(&view.epu)]),
        Line::from(""),
        Line::from(Span::styled("Hotspots", styles::muted_style())),
        pill_line_or(&view.hotspots, "No hotspots"),
        Line::from(""),
        Line::from(Span::styled(view.description, styles::muted_style())),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
