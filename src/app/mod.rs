//! Application state types and entry glue.
//!
//! `AppState` is the single view-model of the dashboard. Everything that talks
//! to the backend goes out as an [`Effect`] and comes back as an [`Outcome`],
//! so the state machine can be driven in tests without a terminal or network.
//!
pub mod actions;
pub mod fetch;
pub mod form;
pub mod keymap;
pub mod modal;
pub mod nav;
pub mod notify;
pub mod panel;
pub mod update;
pub mod worker;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::style::Color;

use crate::api::model::{Computer, DashboardSummary, Group, User};
pub use fetch::{Effect, FetchTarget, Outcome, WriteRequest};
use keymap::Keymap;
pub use modal::{ModalKind, ModalState, PendingClose};
use nav::{Navigator, PreviewTab, Tab};
use notify::Notifier;
use panel::{Panel, RequestToken};

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Delays that shape the UI's feedback loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// How long a dialog stays open after a successful action.
    pub close_delay: Duration,
    pub notice: Duration,
    pub error_notice: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            close_delay: Duration::from_millis(2000),
            notice: Duration::from_millis(3000),
            error_notice: Duration::from_millis(5000),
        }
    }
}

/// Email/password pair used for the session login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub disabled: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            active: Color::Green,
            disabled: Color::Red,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }

    /// Catppuccin Mocha chrome with the dashboard's status colours.
    pub fn mocha() -> Self {
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x7f, 0x84, 0x9c),
            title: Color::Rgb(0xcb, 0xa6, 0xf7),
            border: Color::Rgb(0x58, 0x5b, 0x70),
            header_bg: Color::Rgb(0x31, 0x32, 0x44),
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a),
            active: Color::Rgb(0x28, 0xa7, 0x45),
            disabled: Color::Rgb(0xdc, 0x35, 0x45),
            success: Color::Rgb(0x28, 0xa7, 0x45),
            error: Color::Rgb(0xdc, 0x35, 0x45),
            warning: Color::Rgb(0xff, 0xc1, 0x07),
            info: Color::Rgb(0x00, 0x7b, 0xff),
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut theme = Self::mocha();
        for (key, val) in crate::config::key_values(contents) {
            let Some(color) = Self::parse_color(val) else {
                tracing::warn!(key, val, "ignoring unparsable theme colour");
                continue;
            };
            match key {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "active" => theme.active = color,
                "disabled" => theme.disabled = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                "warning" => theme.warning = color,
                "info" => theme.info = color,
                _ => {}
            }
        }
        theme
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# ad-dashboard theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::White => "#FFFFFF".to_string(),
                _ => "reset".to_string(),
            }
        }

        for (k, v) in [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("active", self.active),
            ("disabled", self.disabled),
            ("success", self.success),
            ("error", self.error),
            ("warning", self.warning),
            ("info", self.info),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        }

        std::fs::write(path, buf)
    }

    /// Load from `path` (or the user config dir); write defaults when neither exists.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = crate::config::config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(err) = t.write_file(path) {
            tracing::warn!(path, %err, "could not write default theme");
        }
        t
    }
}

pub struct AppState {
    pub started_at: Instant,
    pub nav: Navigator,
    pub preview: PreviewTab,
    pub dashboard: Panel<DashboardSummary>,
    pub users: Panel<Vec<User>>,
    pub groups: Panel<Vec<Group>>,
    pub computers: Panel<Vec<Computer>>,
    pub selected_user_index: usize,
    pub selected_group_index: usize,
    pub selected_computer_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    /// Per-tab substring filters.
    pub filters: HashMap<Tab, String>,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub pending_close: Option<PendingClose>,
    /// Latest members-dialog token; reopened dialogs continue from it.
    pub(crate) last_members_token: RequestToken,
    pub notifier: Notifier,
    pub timings: Timings,
    pub should_quit: bool,
    effects: Vec<Effect>,
}

impl AppState {
    pub fn new(theme: Theme, keymap: Keymap, timings: Timings) -> Self {
        Self {
            started_at: Instant::now(),
            nav: Navigator::standard(),
            preview: PreviewTab::default(),
            dashboard: Panel::new(),
            users: Panel::new(),
            groups: Panel::new(),
            computers: Panel::new(),
            selected_user_index: 0,
            selected_group_index: 0,
            selected_computer_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            filters: HashMap::new(),
            theme,
            keymap,
            modal: None,
            pending_close: None,
            last_members_token: RequestToken::default(),
            notifier: Notifier::new(timings.notice, timings.error_notice),
            timings,
            should_quit: false,
            effects: Vec::new(),
        }
    }

    /// Initial page load: log in when credentials are known, otherwise go
    /// straight to the dashboard and users fetches.
    pub fn start(&mut self, credentials: Option<Credentials>) {
        match credentials {
            Some(Credentials { email, password }) => {
                self.effects.push(Effect::Login { email, password });
            }
            None => self.load_initial(),
        }
    }

    pub(crate) fn load_initial(&mut self) {
        self.request(FetchTarget::Dashboard);
        self.request(FetchTarget::Users);
    }

    /// Drain the effects produced since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn active_tab(&self) -> Tab {
        self.nav.active()
    }

    pub fn filter(&self, tab: Tab) -> &str {
        self.filters.get(&tab).map(String::as_str).unwrap_or("")
    }

    pub fn selected_index(&self, tab: Tab) -> usize {
        match tab {
            Tab::Users => self.selected_user_index,
            Tab::Groups => self.selected_group_index,
            Tab::Computers => self.selected_computer_index,
            Tab::Dashboard => 0,
        }
    }

    pub fn set_selected_index(&mut self, tab: Tab, index: usize) {
        match tab {
            Tab::Users => self.selected_user_index = index,
            Tab::Groups => self.selected_group_index = index,
            Tab::Computers => self.selected_computer_index = index,
            Tab::Dashboard => {}
        }
    }

    /// Activate a navigation item and load its panel.
    ///
    /// Switching to another panel always re-fetches it; re-activating the
    /// visible panel only fetches when it has nothing usable to show.
    pub fn activate(&mut self, nav_id: &str) {
        let Some(activation) = self.nav.activate(nav_id) else {
            return;
        };
        let target = FetchTarget::for_tab(activation.tab);
        if activation.changed || self.panel_needs_load(activation.tab) {
            tracing::info!(tab = activation.tab.nav_id(), "loading panel data");
            self.request(target);
        }
    }

    fn panel_needs_load(&self, tab: Tab) -> bool {
        match tab {
            Tab::Dashboard => self.dashboard.needs_load(),
            Tab::Users => self.users.needs_load(),
            Tab::Groups => self.groups.needs_load(),
            Tab::Computers => self.computers.needs_load(),
        }
    }

    /// Advance timers: banner expiry and delayed modal close.
    pub fn tick(&mut self, now: Instant) {
        self.notifier.expire(now);
        self.run_pending_close(now);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Theme::mocha(), Keymap::default(), Timings::default())
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parse_overrides_known_keys() {
        let t = Theme::parse("# c\nerror = #FF0000\nactive=00ff00\nbogus = #123456\ntitle = nope\n");
        assert_eq!(t.error, Color::Rgb(0xff, 0, 0));
        assert_eq!(t.active, Color::Rgb(0, 0xff, 0));
        assert_eq!(format!("{:?}", t.title), format!("{:?}", Theme::mocha().title));
    }

    #[test]
    fn start_without_credentials_loads_dashboard_and_users() {
        let mut app = AppState::default();
        app.start(None);
        let effects = app.take_effects();
        let targets: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch { target, .. } => Some(target.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![FetchTarget::Dashboard, FetchTarget::Users]);
        assert!(app.take_effects().is_empty());
    }

    #[test]
    fn start_with_credentials_logs_in_first() {
        let mut app = AppState::default();
        app.start(Some(Credentials { email: "a@b.c".into(), password: "pw".into() }));
        let effects = app.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Login { .. }));
    }

    #[test]
    fn revisiting_a_tab_refetches_but_reclick_does_not() {
        let mut app = AppState::default();
        app.activate("users");
        assert_eq!(app.take_effects().len(), 1);
        app.activate("users");
        assert!(app.take_effects().is_empty(), "users is loading, no duplicate fetch");
        app.activate("groups");
        app.activate("users");
        let effects = app.take_effects();
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn unknown_nav_id_issues_nothing() {
        let mut app = AppState::default();
        app.activate("reports");
        assert!(app.take_effects().is_empty());
        assert_eq!(app.active_tab(), Tab::Dashboard);
    }
}
