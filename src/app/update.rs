use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::keymap::KeyAction;
use crate::app::modal::CloseReason;
use crate::app::nav::Tab;
use crate::app::worker::Worker;
use crate::app::{AppState, FetchTarget, InputMode, ModalState, Outcome};
use crate::ui;
use crate::ui::rows::RowAction;

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    worker: &Worker,
    rx: &mut UnboundedReceiver<Outcome>,
) -> Result<()> {
    loop {
        for effect in app.take_effects() {
            worker.dispatch(effect);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key, now),
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    app.handle_click(mouse.column, mouse.row, area, now);
                }
                _ => {}
            }
        }

        let now = Instant::now();
        while let Ok(outcome) = rx.try_recv() {
            app.apply_outcome(outcome, now);
        }
        app.tick(now);

        if app.should_quit {
            tracing::info!("quitting");
            return Ok(());
        }
    }
}

impl AppState {
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::Modal => self.handle_modal_key(key, now),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let Some(action) = self.keymap.resolve(&key) else {
            return;
        };
        let tab = self.active_tab();
        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::NextTab | KeyAction::PrevTab => {
                if let Some(id) = self.nav.neighbour(action == KeyAction::NextTab).map(str::to_string) {
                    self.activate(&id);
                }
            }
            KeyAction::ShowDashboard => self.activate(Tab::Dashboard.nav_id()),
            KeyAction::ShowUsers => self.activate(Tab::Users.nav_id()),
            KeyAction::ShowGroups => self.activate(Tab::Groups.nav_id()),
            KeyAction::ShowComputers => self.activate(Tab::Computers.nav_id()),
            KeyAction::StartSearch => {
                if tab != Tab::Dashboard {
                    self.input_mode = InputMode::Search;
                }
            }
            KeyAction::Refresh => self.request(FetchTarget::for_tab(tab)),
            KeyAction::EnterAction => {
                // Last button is the row's primary action.
                let primary = self.selected_row_actions().pop();
                if let Some(action) = primary {
                    self.run_row_action(action);
                }
            }
            KeyAction::ResetPassword => self.run_selected(|a| matches!(a, RowAction::ResetPassword { .. })),
            KeyAction::ToggleStatus => self.run_selected(|a| matches!(a, RowAction::SetEnabled { .. })),
            KeyAction::NextPreview => {
                if tab == Tab::Dashboard {
                    self.preview = self.preview.next();
                }
            }
            KeyAction::MoveUp => self.move_selection(-1),
            KeyAction::MoveDown => self.move_selection(1),
            KeyAction::PageUp => self.move_selection(-(self.rows_per_page.max(1) as isize)),
            KeyAction::PageDown => self.move_selection(self.rows_per_page.max(1) as isize),
            KeyAction::Ignore => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let tab = self.active_tab();
        match key.code {
            KeyCode::Esc => {
                self.filters.remove(&tab);
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                if let Some(q) = self.filters.get_mut(&tab) {
                    q.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filters.entry(tab).or_default().push(c);
            }
            _ => return,
        }
        self.set_selected_index(tab, 0);
        self.clamp_selection(tab);
    }

    fn handle_modal_key(&mut self, key: KeyEvent, _now: Instant) {
        if key.code == KeyCode::Esc {
            if let Some(ModalState::GroupMembers(view)) = &self.modal {
                if view.confirm.is_some() {
                    self.cancel_member_removal();
                    return;
                }
            }
            self.close_modal(CloseReason::CloseButton);
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(modal) = &mut self.modal else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match modal {
            ModalState::ResetPassword(form) => match key.code {
                KeyCode::Enter => self.submit_reset_password(),
                KeyCode::Char('r') if ctrl => form.toggle_visibility(),
                KeyCode::Tab | KeyCode::Down => form.focus.next(),
                KeyCode::BackTab | KeyCode::Up => form.focus.prev(),
                KeyCode::Backspace => form.focused_field().pop(),
                KeyCode::Char(c) if !ctrl => form.focused_field().push(c),
                _ => {}
            },
            ModalState::ToggleUser(form) => match key.code {
                KeyCode::Enter => self.submit_toggle_user(),
                KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                    let other = form.action.other();
                    self.choose_toggle_action(other);
                }
                _ => {}
            },
            ModalState::GroupMembers(view) if view.confirm.is_some() => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_member_removal(),
                KeyCode::Char('n') => self.cancel_member_removal(),
                _ => {}
            },
            ModalState::GroupMembers(view) => {
                let len = view.members.data().map_or(0, Vec::len);
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => view.selected = view.selected.saturating_sub(1),
                    KeyCode::Down | KeyCode::Char('j') => {
                        view.selected = (view.selected + 1).min(len.saturating_sub(1));
                    }
                    KeyCode::Char('d') | KeyCode::Delete => self.request_member_removal(),
                    KeyCode::Char('r') => {
                        let group = view.group.clone();
                        self.request(FetchTarget::GroupMembers { group });
                    }
                    _ => {}
                }
            }
        }
    }

    /// Mouse click: backdrop closes the dialog; a nav item activates its
    /// panel; a table row becomes the selection.
    pub fn handle_click(&mut self, column: u16, row: u16, area: Rect, _now: Instant) {
        let pos = Position::new(column, row);
        if let Some(modal) = &self.modal {
            if !ui::modal_rect(modal.kind(), area).contains(pos) {
                self.close_modal(CloseReason::Backdrop);
            }
            return;
        }
        if let Some(nav_id) = ui::nav_item_at(self, area, pos) {
            self.activate(&nav_id);
            return;
        }
        let tab = self.active_tab();
        if let Some(offset) = ui::table_row_at(self, area, pos) {
            let page_start = (self.selected_index(tab) / self.rows_per_page.max(1)) * self.rows_per_page.max(1);
            let len = ui::rows::visible_rows(self, tab).len();
            let index = page_start + offset;
            if index < len {
                self.set_selected_index(tab, index);
            }
        }
    }

    fn selected_row_actions(&self) -> Vec<RowAction> {
        let tab = self.active_tab();
        ui::rows::visible_rows(self, tab)
            .get(self.selected_index(tab))
            .map(|row| row.actions().iter().map(|b| b.action.clone()).collect())
            .unwrap_or_default()
    }

    fn run_selected(&mut self, wanted: impl Fn(&RowAction) -> bool) {
        if let Some(action) = self.selected_row_actions().into_iter().find(|a| wanted(a)) {
            self.run_row_action(action);
        }
    }

    pub fn run_row_action(&mut self, action: RowAction) {
        match action {
            RowAction::ResetPassword { username } => self.open_reset_password(&username),
            RowAction::SetEnabled { username, action } => {
                self.open_toggle_user(&username, action == crate::api::model::UserAction::Disable);
            }
            RowAction::ViewMembers { group } => self.open_group_members(&group),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let tab = self.active_tab();
        let len = ui::rows::visible_rows(self, tab).len();
        if len == 0 {
            return;
        }
        let current = self.selected_index(tab) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.set_selected_index(tab, next as usize);
    }
}
