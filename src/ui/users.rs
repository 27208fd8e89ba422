use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::api::model::UserAction;
use crate::app::AppState;
use crate::app::modal::{ResetPasswordForm, ToggleUserForm};
use crate::app::nav::Tab;
use crate::ui::components::{modal_frame, render_rows_table, result_line};
use crate::ui::rows::visible_rows;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let rows = visible_rows(app, Tab::Users);
    let widths = [
        Constraint::Percentage(22),
        Constraint::Percentage(16),
        Constraint::Percentage(26),
        Constraint::Length(10),
        Constraint::Min(26),
    ];
    let per_page = render_rows_table(
        f,
        area,
        &app.theme,
        "Users",
        &["Name", "Username", "Email", "Status", "Actions"],
        &widths,
        &rows,
        Some(app.selected_user_index),
    );
    app.rows_per_page = per_page;
}

pub fn render_reset_modal(f: &mut Frame, rect: Rect, app: &AppState, form: &ResetPasswordForm) {
    let inner = modal_frame(f, rect, &format!("Reset Password: {}", form.username), &app.theme);
    let field = |idx: usize, label: &str, value: String| {
        let marker = if form.focus.is_focused(idx) { "▶" } else { " " };
        let style = if form.focus.is_focused(idx) {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Line::from(vec![Span::styled(format!("{marker} {label:<17}"), style), Span::raw(value)])
    };
    let reveal = if form.password.is_visible() { "hide" } else { "show" };
    let mut lines = vec![
        field(0, "New password:", form.password.display()),
        field(1, "Confirm password:", form.confirm.display()),
        Line::from(""),
        Line::from(Span::styled(
            format!("Tab: next field  Ctrl+R: {reveal} passwords  Enter: reset  Esc: cancel"),
            Style::default().fg(app.theme.muted),
        )),
    ];
    if let Some(result) = &form.result {
        lines.push(Line::from(""));
        lines.push(result_line(result, &app.theme));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

pub fn render_toggle_modal(f: &mut Frame, rect: Rect, app: &AppState, form: &ToggleUserForm) {
    let inner = modal_frame(f, rect, &format!("Change Status: {}", form.username), &app.theme);
    let current = if form.currently_enabled { "Active" } else { "Disabled" };
    let option = |action: UserAction| {
        let chosen = form.action == action;
        let text = format!("{} {}", if chosen { "▶" } else { " " }, action.label());
        let style = if chosen {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Span::styled(text, style)
    };
    let mut lines = vec![
        Line::from(format!("Current status: {current}")),
        Line::from(""),
        Line::from(vec![option(UserAction::Enable), Span::raw("    "), option(UserAction::Disable)]),
        Line::from(""),
        Line::from(Span::styled(
            "Left/Right: choose  Enter: apply  Esc: cancel",
            Style::default().fg(app.theme.muted),
        )),
    ];
    if let Some(result) = &form.result {
        lines.push(Line::from(""));
        lines.push(result_line(result, &app.theme));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
