pub mod components;
pub mod computers;
pub mod dashboard;
pub mod groups;
pub mod rows;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::nav::Tab;
use crate::app::{AppState, ModalKind, ModalState};

const TITLE: &str = "AD Dashboard";

/// Header, body, and status-bar regions of the screen.
fn regions(area: Rect) -> (Rect, Rect, Rect) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(area);
    (root[0], root[1], root[2])
}

pub fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    let (header, body, status) = regions(area);

    render_header(f, header, app);
    match app.active_tab() {
        Tab::Dashboard => dashboard::render_dashboard(f, body, app),
        Tab::Users => users::render_users_table(f, body, app),
        Tab::Groups => groups::render_groups_table(f, body, app),
        Tab::Computers => computers::render_computers_table(f, body, app),
    }
    components::render_status_bar(f, status, app);

    if let Some(modal) = app.modal.clone() {
        let rect = modal_rect(modal.kind(), area);
        match &modal {
            ModalState::ResetPassword(form) => users::render_reset_modal(f, rect, app, form),
            ModalState::ToggleUser(form) => users::render_toggle_modal(f, rect, app, form),
            ModalState::GroupMembers(view) => groups::render_members_modal(f, rect, app, view),
        }
    }
    components::render_notification(f, header, app);
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = Vec::new();
    for item in app.nav.items() {
        let style = if app.nav.is_active_item(&item.nav_id) {
            Style::default().fg(app.theme.header_bg).bg(app.theme.header_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.header_fg)
        };
        spans.push(Span::styled(format!(" {} ", item.label), style));
        spans.push(Span::raw(" "));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .title(TITLE)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().bg(app.theme.header_bg));
    f.render_widget(p, area);
}

/// Nav item under `pos`, laid out as in `render_header`.
pub fn nav_item_at(app: &AppState, area: Rect, pos: Position) -> Option<String> {
    let (header, _, _) = regions(area);
    if pos.y != header.y + 1 {
        return None;
    }
    let mut x = header.x + 1;
    for item in app.nav.items() {
        let width = item.label.chars().count() as u16 + 2;
        if pos.x >= x && pos.x < x + width {
            return Some(item.nav_id.clone());
        }
        x += width + 1;
    }
    None
}

/// Page-relative index of the table row under `pos`, if any.
pub fn table_row_at(app: &AppState, area: Rect, pos: Position) -> Option<usize> {
    if app.active_tab() == Tab::Dashboard {
        return None;
    }
    let (_, body, _) = regions(area);
    let first = body.y + 2;
    let last = body.y + body.height.saturating_sub(1);
    let inside_x = pos.x > body.x && pos.x < body.x + body.width.saturating_sub(1);
    (inside_x && pos.y >= first && pos.y < last).then(|| (pos.y - first) as usize)
}

/// Screen rectangle of a dialog; clicks outside it hit the backdrop.
pub fn modal_rect(kind: ModalKind, area: Rect) -> Rect {
    let (width, height) = match kind {
        ModalKind::ResetPassword => (66, 12),
        ModalKind::ToggleUser => (56, 11),
        ModalKind::GroupMembers => (90, 24),
    };
    components::centered_rect(
        width.min(area.width.saturating_sub(4)),
        height.min(area.height.saturating_sub(2)),
        area,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(app: &mut AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn dashboard_renders_loading_state() {
        let mut app = AppState::default();
        app.start(None);
        let text = screen(&mut app, 100, 30);
        assert!(text.contains("Dashboard"));
        assert!(text.contains("Loading data..."));
    }

    #[test]
    fn nav_hit_testing_matches_header_layout() {
        let app = AppState::default();
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(nav_item_at(&app, area, Position::new(2, 1)).as_deref(), Some("dashboard"));
        // " Dashboard " is 11 wide, then a gap, then " Users ".
        assert_eq!(nav_item_at(&app, area, Position::new(14, 1)).as_deref(), Some("users"));
        assert_eq!(nav_item_at(&app, area, Position::new(2, 5)), None);
    }

    #[test]
    fn members_modal_renders_over_groups() {
        let mut app = AppState::default();
        app.activate("groups");
        app.open_group_members("Domain Admins");
        let text = screen(&mut app, 120, 40);
        assert!(text.contains("Members of Domain Admins"));
        assert!(text.contains("Loading members..."));
    }
}
