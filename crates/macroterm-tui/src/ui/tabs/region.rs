use macroterm_core::models::Signal;
use macroterm_core::view::{BlockView, RegionView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::styles;

pub fn render(frame: &mut Frame, view: &RegionView, area: Rect) {
    // Heading takes three rows, each block its rows plus header and borders
    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(
        view.blocks
            .iter()
            .map(|b| Constraint::Length(b.rows.len().max(1) as u16 + 3)),
    );
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let heading = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(view.name.clone(), styles::title_style()),
            Span::raw("  "),
            Span::styled(format!(" {} ", view.id), styles::signal_style(Signal::Neutral)),
        ]),
        Line::from(Span::styled(view.verdict.clone(), styles::muted_style())),
    ])
    .block(Block::default().borders(Borders::BOTTOM).border_style(styles::border_style(false)));
    frame.render_widget(heading, chunks[0]);

    if view.blocks.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No indicator blocks", styles::muted_style())),
            chunks[1],
        );
        return;
    }

    for (block, chunk) in view.blocks.iter().zip(chunks.iter().skip(1)) {
        render_block(frame, block, *chunk);
    }
}

fn render_block(frame: &mut Frame, view: &BlockView, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Indicator"),
        Cell::from("Value"),
        Cell::from("Signal"),
    ])
    .style(styles::muted_style());

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.key.clone()).style(styles::list_item_style()),
                Cell::from(row.value.clone()).style(styles::highlight_style()),
                Cell::from(Span::styled(
                    format!(" {} ", row.signal_text),
                    styles::signal_style(row.signal),
                )),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(50),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" {} ", view.title))
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}
