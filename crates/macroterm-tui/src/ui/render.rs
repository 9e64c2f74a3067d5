use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use macroterm_core::utils::truncate_string;
use macroterm_core::view::{self, Panel};

use crate::app::{App, AppState};

use super::styles;
use super::tabs::{geo, overview, region};
use super::widgets::pill;

/// Tabs past this index have no number shortcut
const MAX_TAB_SHORTCUT: usize = 9;

pub fn render<N>(frame: &mut Frame, app: &App<N>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar<N>(frame: &mut Frame, app: &App<N>, area: Rect) {
    let title = "  MACRO TERMINAL";
    let header = view::header(app.view.snapshot());

    let mut right = vec![
        Span::styled("Last update: ", styles::muted_style()),
        Span::styled(header.last_updated.clone(), styles::list_item_style()),
        Span::raw("  "),
    ];
    if let Some(ref risk) = header.risk {
        right.push(pill(risk));
    }
    if app.view.is_loading() {
        right.push(Span::styled("  refreshing…", styles::highlight_style()));
    }
    right.push(Span::raw("  "));

    let right_width: usize = right.iter().map(|s| s.width()).sum();
    let padding = (area.width as usize).saturating_sub(title.len() + right_width);

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
    ];
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs<N>(frame: &mut Frame, app: &App<N>, area: Rect) {
    let selected = app.view.selected();

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.view.tabs().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = if i < MAX_TAB_SHORTCUT {
            format!("[{}] {}", i + 1, tab.title())
        } else {
            tab.title().to_string()
        };
        spans.push(Span::styled(label, styles::tab_style(tab == selected)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content<N>(frame: &mut Frame, app: &App<N>, area: Rect) {
    let area = match app.view.error() {
        Some(message) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(area);
            let banner = Paragraph::new(Span::styled(format!(" ⚠ {}", message), styles::error_style()))
                .wrap(Wrap { trim: true });
            frame.render_widget(banner, chunks[0]);
            chunks[1]
        }
        None => area,
    };

    let Some(snapshot) = app.view.snapshot() else {
        let text = if app.view.is_loading() {
            " Loading dashboard…"
        } else {
            " No dashboard loaded. Press r to retry."
        };
        frame.render_widget(Paragraph::new(Span::styled(text, styles::muted_style())), area);
        return;
    };

    // A tab that matches nothing renders an empty panel
    match view::panel(snapshot, app.view.selected()) {
        Some(Panel::Overview(v)) => overview::render(frame, &v, area),
        Some(Panel::Region(v)) => region::render(frame, &v, area),
        Some(Panel::Geo(v)) => geo::render(frame, &v, area),
        None => {}
    }
}

fn render_status_bar<N>(frame: &mut Frame, app: &App<N>, area: Rect) {
    let shortcuts = "[r]efresh | [?] help | [q]uit";

    let right_text = if app.offline_ready {
        format!(" offline ready | {} ", shortcuts)
    } else {
        format!(" {} ", shortcuts)
    };

    let width = area.width as usize;
    let room = width.saturating_sub(right_text.chars().count() + 2);

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", truncate_string(msg, room)),
        None => format!(" Updated {} ", view::header(app.view.snapshot()).last_updated),
    };

    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 17, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  MACRO TERMINAL", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-9", "Jump to tab"),
        help_line("←/→ Tab", "Prev/next tab"),
        help_line("o / g", "Overview / Geo"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("r / u", "Reload the dashboard"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{test_app, StaticNetwork, SNAPSHOT};
    use crate::ui::tabs::test_support::{contains, draw};
    use macroterm_core::api::{LoadError, Loaded};
    use macroterm_core::cache::ResponseSource;
    use macroterm_core::models::Dashboard;
    use macroterm_core::state::TabId;

    fn loaded() -> Loaded {
        Loaded {
            dashboard: Dashboard::from_slice(SNAPSHOT.as_bytes()).expect("Failed to parse snapshot"),
            source: ResponseSource::Network,
        }
    }

    #[test]
    fn test_render_before_first_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        app.view.begin_load();

        let rows = draw(100, 30, |f| render(f, &app));
        assert!(contains(&rows, "MACRO TERMINAL"));
        assert!(contains(&rows, "Last update: —"));
        assert!(contains(&rows, "[1] Overview | [2] Geo"));
        assert!(contains(&rows, "Loading dashboard…"));
    }

    #[test]
    fn test_render_loaded_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(loaded()));

        let rows = draw(120, 40, |f| render(f, &app));
        assert!(contains(&rows, "Mon, 01 Jan 2024 00:00:00 GMT"));
        assert!(contains(&rows, " Risk-off • 72 "));
        assert!(contains(&rows, "[1] Overview | [2] US | [3] EA | [4] Geo"));
        assert!(contains(&rows, "72/100"));
    }

    #[test]
    fn test_render_error_banner_keeps_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(loaded()));
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Err(LoadError::from_status(503, "")));

        let rows = draw(120, 40, |f| render(f, &app));
        assert!(contains(&rows, "Failed to load dashboard (HTTP 503)"));
        assert!(contains(&rows, "Global Risk Pulse"));
    }

    #[test]
    fn test_render_region_tab() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(loaded()));
        app.select_tab(TabId::Region("EA".to_string()));

        let rows = draw(120, 40, |f| render(f, &app));
        assert!(contains(&rows, "Euro Area"));
    }

    #[test]
    fn test_render_unknown_tab_shows_no_panel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        let ticket = app.view.begin_load();
        app.view.finish_load(ticket, Ok(loaded()));
        app.select_tab(TabId::from_id("JP"));

        let rows = draw(120, 40, |f| render(f, &app));
        assert!(!contains(&rows, "Global Risk Pulse"));
        assert!(!contains(&rows, "Geopolitics & Policy"));
    }

    #[test]
    fn test_render_help_overlay() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir, StaticNetwork::offline());
        app.toggle_help();

        let rows = draw(100, 30, |f| render(f, &app));
        assert!(contains(&rows, "Reload the dashboard"));
    }
}
