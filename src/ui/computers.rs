use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};

use crate::app::AppState;
use crate::app::nav::Tab;
use crate::ui::components::render_rows_table;
use crate::ui::rows::visible_rows;

pub fn render_computers_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let rows = visible_rows(app, Tab::Computers);
    app.rows_per_page = render_rows_table(
        f,
        area,
        &app.theme,
        "Computers",
        &["Computer Name", "IP Address", "Status"],
        &[Constraint::Percentage(45), Constraint::Percentage(35), Constraint::Min(10)],
        &rows,
        Some(app.selected_computer_index),
    );
}
