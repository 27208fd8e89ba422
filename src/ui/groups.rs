use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};

use crate::app::AppState;
use crate::app::modal::GroupMembersView;
use crate::app::nav::Tab;
use crate::ui::components::{modal_frame, render_rows_table, result_line};
use crate::ui::rows::{cn_of, member_rows, visible_rows};

pub fn render_groups_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let rows = visible_rows(app, Tab::Groups);
    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(45),
        Constraint::Length(8),
        Constraint::Min(16),
    ];
    app.rows_per_page = render_rows_table(
        f,
        area,
        &app.theme,
        "Groups",
        &["Group Name", "Description", "Members", "Actions"],
        &widths,
        &rows,
        Some(app.selected_group_index),
    );
}

pub fn render_members_modal(f: &mut Frame, rect: Rect, app: &AppState, view: &GroupMembersView) {
    let inner = modal_frame(f, rect, &format!("Members of {}", view.group), &app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let rows = member_rows(&view.members);
    let selected = view.members.data().filter(|m| !m.is_empty()).map(|_| view.selected);
    render_rows_table(
        f,
        chunks[0],
        &app.theme,
        "Members",
        &["Name", "Distinguished Name"],
        &[Constraint::Percentage(35), Constraint::Percentage(65)],
        &rows,
        selected,
    );

    let mut lines = Vec::new();
    if let Some(dn) = &view.confirm {
        lines.push(Line::styled(
            format!("Remove {} from {}? (y/n)", cn_of(dn), view.group),
            Style::default().fg(app.theme.warning),
        ));
    } else if let Some(result) = &view.result {
        lines.push(result_line(result, &app.theme));
    }
    lines.push(Line::styled(
        "Up/Down: select  d: remove  r: reload  Esc: close",
        Style::default().fg(app.theme.muted),
    ));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
}
