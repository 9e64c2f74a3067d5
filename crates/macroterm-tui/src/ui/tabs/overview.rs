use macroterm_core::view::{OverviewView, OVERVIEW_FOOTER};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::ui::styles;
use crate::ui::widgets::{pill, pill_line_or};

/// Number key of the first region tab (1 is the overview)
const FIRST_REGION_KEY: usize = 2;

pub fn render(frame: &mut Frame, view: &OverviewView, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Risk pulse | Geo
            Constraint::Min(4),     // Regions snapshot
            Constraint::Length(3),  // Footer
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_risk_pulse(frame, view, top[0]);
    render_geo_summary(frame, view, top[1]);
    render_regions(frame, view, rows[1]);

    let footer = Paragraph::new(Span::styled(OVERVIEW_FOOTER, styles::muted_style()))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, rows[2]);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}

fn render_risk_pulse(frame: &mut Frame, view: &OverviewView, area: Rect) {
    let block = panel_block("Global Risk Pulse");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Score line
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Drivers heading
            Constraint::Min(1),    // Driver pills
        ])
        .split(inner);

    let score_line = Line::from(vec![
        Span::styled("Risk score  ", styles::muted_style()),
        Span::styled(view.gauge.value.clone(), styles::highlight_style()),
        Span::styled("/100", styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(score_line), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(styles::gauge_style())
        .ratio(view.gauge.width / 100.0)
        .label("");
    frame.render_widget(gauge, chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled("Drivers", styles::muted_style())),
        chunks[3],
    );
    frame.render_widget(
        Paragraph::new(pill_line_or(&view.drivers, "No drivers")).wrap(Wrap { trim: false }),
        chunks[4],
    );
}

fn render_geo_summary(frame: &mut Frame, view: &OverviewView, area: Rect) {
    let block = panel_block("Geo & Policy Risk");

    let mut lines = vec![
        Line::from(vec![
            Span::styled("GPR  ", styles::muted_style()),
            pill(&view.gpr),
        ]),
        Line::from(vec![
            Span::styled("EPU  ", styles::muted_style()),
            pill(&view.epu),
        ]),
        Line::from(""),
        Line::from(Span::styled("Hotspots", styles::muted_style())),
    ];
    lines.push(pill_line_or(&view.hotspots, "No hotspots"));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_regions(frame: &mut Frame, view: &OverviewView, area: Rect) {
    let block = panel_block("Regions snapshot");

    let lines: Vec<Line> = if view.regions.is_empty() {
        vec![Line::from(Span::styled("No regions in snapshot", styles::muted_style()))]
    } else {
        view.regions
            .iter()
            .enumerate()
            .map(|(i, chip)| {
                let key = FIRST_REGION_KEY + i;
                // Only single-digit shortcuts exist
                let shortcut = if key <= 9 {
                    format!("[{}] ", key)
                } else {
                    "    ".to_string()
                };
                Line::from(vec![
                    Span::styled(shortcut, styles::help_key_style()),
                    Span::styled(format!("{:<8}", chip.tab.title()), styles::title_style()),
                    Span::styled(chip.summary.clone(), styles::muted_style()),
                ])
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::tabs::test_support::{contains, draw};
    use macroterm_core::models::Dashboard;
    use macroterm_core::view::overview;

    #[test]
    fn test_overview_renders_score_pills_and_chips() {
        let snapshot = Dashboard::from_slice(
            br#"{
            "risk_state": {"score": 72, "label": "", "drivers": [{"name": "VIX", "value": 21, "signal": "red"}]},
            "regions": [{"id": "US", "verdict": {"cycle": "Late", "inflation": "Sticky"}}],
            "geo": {"gpr": {"value": 1, "signal": "amber"}, "epu": {"value": 2, "signal": "green"},
                    "hotspots": [{"name": "Red Sea", "signal": "red"}]}
        }"#,
        )
        .expect("Failed to parse test snapshot");
        let view = overview(&snapshot);

        let rows = draw(100, 24, |f| render(f, &view, f.area()));
        assert!(contains(&rows, "Global Risk Pulse"));
        assert!(contains(&rows, "72/100"));
        assert!(contains(&rows, " VIX: 21 "));
        assert!(contains(&rows, " Red Sea "));
        assert!(contains(&rows, "[2] US"));
        assert!(contains(&rows, "Late • Sticky"));
    }

    #[test]
    fn test_overview_renders_empty_document() {
        let snapshot = Dashboard::from_slice(b"{}").expect("Failed to parse empty snapshot");
        let view = overview(&snapshot);

        let rows = draw(80, 24, |f| render(f, &view, f.area()));
        assert!(contains(&rows, "50/100"));
        assert!(contains(&rows, "No drivers"));
        assert!(contains(&rows, "No regions in snapshot"));
    }
}
