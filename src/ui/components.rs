use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::app::keymap::KeyAction;
use crate::app::nav::Tab;
use crate::app::notify::{MessageKind, NoticeKind, ResultMessage};
use crate::app::{AppState, InputMode, Theme};
use crate::ui::rows::{BadgeKind, CellView, PlaceholderKind, TableRow};

/// Bottom line: mode, key hints, or the search prompt.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let tab = app.active_tab();
    let msg = match app.input_mode {
        InputMode::Search => format!("Search {}: {}_   Enter: keep  Esc: clear", tab.title().to_lowercase(), app.filter(tab)),
        InputMode::Modal => "Esc: close".to_string(),
        InputMode::Normal => {
            let hint = |action: KeyAction, label: &str| {
                app.keymap.keys_for(action).first().map(|k| format!("{k}: {label}"))
            };
            let mut hints = vec![hint(KeyAction::NextTab, "next tab"), hint(KeyAction::Refresh, "refresh")];
            match tab {
                Tab::Dashboard => hints.push(hint(KeyAction::NextPreview, "preview")),
                Tab::Users => {
                    hints.push(hint(KeyAction::StartSearch, "search"));
                    hints.push(hint(KeyAction::ResetPassword, "reset password"));
                    hints.push(hint(KeyAction::ToggleStatus, "enable/disable"));
                }
                Tab::Groups => {
                    hints.push(hint(KeyAction::StartSearch, "search"));
                    hints.push(hint(KeyAction::EnterAction, "members"));
                }
                Tab::Computers => hints.push(hint(KeyAction::StartSearch, "search")),
            }
            hints.push(hint(KeyAction::Quit, "quit"));
            let mut msg = hints.into_iter().flatten().collect::<Vec<_>>().join("  ");
            let filter = app.filter(tab);
            if !filter.is_empty() {
                msg.push_str(&format!("  filter:[{filter}]"));
            }
            msg
        }
    };
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Banner in the top-right corner of `area`.
pub fn render_notification(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(notice) = app.notifier.current() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::Success => app.theme.success,
        NoticeKind::Error => app.theme.error,
    };
    let width = (notice.message.chars().count() as u16 + 4).min(area.width);
    let rect = Rect { x: area.x + area.width.saturating_sub(width), y: area.y, width, height: 3.min(area.height) };
    let p = Paragraph::new(notice.message.as_str())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn badge_style(kind: BadgeKind, theme: &Theme) -> Style {
    let color = match kind {
        BadgeKind::Active => theme.active,
        BadgeKind::Disabled => theme.disabled,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn cell<'a>(view: &CellView, theme: &Theme) -> Cell<'a> {
    match view {
        CellView::Text(t) => Cell::from(t.clone()),
        CellView::Badge(kind, t) => Cell::from(Span::styled(t.clone(), badge_style(*kind, theme))),
        CellView::Actions(buttons) => {
            let spans: Vec<Span> = buttons
                .iter()
                .flat_map(|b| [Span::styled(format!("[{}]", b.label), Style::default().fg(theme.info)), Span::raw(" ")])
                .collect();
            Cell::from(Line::from(spans))
        }
    }
}

fn placeholder_style(kind: PlaceholderKind, theme: &Theme) -> Style {
    match kind {
        PlaceholderKind::Loading => Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        PlaceholderKind::Empty => Style::default().fg(theme.muted),
        PlaceholderKind::Error => Style::default().fg(theme.error),
    }
}

/// A bordered table of `rows`, paginated around `selected`. Returns the
/// number of body rows that fit so the caller can page by it.
#[allow(clippy::too_many_arguments)]
pub fn render_rows_table(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    headers: &[&str],
    widths: &[Constraint],
    rows: &[TableRow],
    selected: Option<usize>,
) -> usize {
    let per_page = (area.height.saturating_sub(3) as usize).max(1);
    let sel = selected.unwrap_or(0);
    let start = (sel / per_page) * per_page;
    let end = (start + per_page).min(rows.len());

    let body = rows[start.min(end)..end].iter().enumerate().map(|(i, row)| match row {
        TableRow::Placeholder(kind, text) => Row::new(vec![Cell::from(text.clone())]).style(placeholder_style(*kind, theme)),
        TableRow::Data(cells) => {
            let style = if selected == Some(start + i) {
                Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(cells.iter().map(|c| cell(c, theme)).collect::<Vec<_>>()).style(style)
        }
    });

    let header = Row::new(headers.to_vec()).style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));
    // A lone placeholder spans the whole width.
    let widths: Vec<Constraint> = if rows.len() == 1 && rows[0].is_placeholder() {
        vec![Constraint::Percentage(100)]
    } else {
        widths.to_vec()
    };
    let pages = rows.len().div_ceil(per_page).max(1);
    let title = format!("{title} ({}/{})", start / per_page + 1, pages);
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(Style::default().fg(theme.border)))
        .column_spacing(1);
    f.render_widget(table, area);
    per_page
}

pub fn result_line(message: &ResultMessage, theme: &Theme) -> Line<'static> {
    let color = match message.kind {
        MessageKind::Progress => theme.info,
        MessageKind::Success => theme.success,
        MessageKind::Error => theme.error,
    };
    Line::from(Span::styled(message.text.clone(), Style::default().fg(color)))
}

/// Clear `rect` and draw a titled dialog frame; returns the inner area.
pub fn modal_frame(f: &mut Frame, rect: Rect, title: &str, theme: &Theme) -> Rect {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);
    inner
}
