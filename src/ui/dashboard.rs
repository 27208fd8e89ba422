use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::AppState;
use crate::app::nav::{PreviewTab, Tab};
use crate::ui::components::render_rows_table;
use crate::ui::rows::{Counter, counters, last_updated, preview_headers, visible_rows};

pub fn render_dashboard(f: &mut Frame, area: Rect, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1), Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    render_counters(f, chunks[0], app);

    let server = app
        .dashboard
        .data()
        .and_then(|s| s.metadata.as_ref())
        .and_then(|m| m.server.clone())
        .map(|s| format!("  server: {s}"))
        .unwrap_or_default();
    let updated = Paragraph::new(format!("Last updated: {}{server}", last_updated(&app.dashboard)))
        .style(Style::default().fg(app.theme.muted));
    f.render_widget(updated, chunks[1]);

    let tabs: Vec<Span> = PreviewTab::ALL
        .iter()
        .flat_map(|t| {
            let label = if *t == app.preview { format!("[{}]", t.title()) } else { format!(" {} ", t.title()) };
            let style = if *t == app.preview {
                Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text)
            };
            [Span::styled(label, style), Span::raw(" ")]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(tabs)), chunks[2]);

    let rows = visible_rows(app, Tab::Dashboard);
    let headers = preview_headers(app.preview);
    let widths: Vec<Constraint> = headers.iter().map(|_| Constraint::Ratio(1, headers.len() as u32)).collect();
    render_rows_table(
        f,
        chunks[3],
        &app.theme,
        &format!("Recent {}", app.preview.title()),
        headers,
        &widths,
        &rows,
        None,
    );
}

fn render_counters(f: &mut Frame, area: Rect, app: &AppState) {
    let cards = counters(&app.dashboard);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for ((label, counter), rect) in cards.iter().zip(cols.iter()) {
        let color = match counter {
            Counter::Error => app.theme.error,
            Counter::Loading => app.theme.muted,
            Counter::Value(_) => app.theme.title,
        };
        let p = Paragraph::new(Line::from(Span::styled(
            counter.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(*label)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(p, *rect);
    }
}
