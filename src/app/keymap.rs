//! Keybindings: defaults, `keybinds.conf` parsing, and key-to-action lookup.
//!
//! The file format is one `<Action> = <KeySpec>` per line; the reversed
//! `<KeySpec> = <Action>` form is accepted as well. Entries override the
//! defaults, they never remove them.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press means in normal mode.
///
/// Several keys may share an action (`j` and Down both move down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Activate the next nav item.
    NextTab,
    /// Activate the previous nav item.
    PrevTab,
    /// Jump to the dashboard panel.
    ShowDashboard,
    /// Jump to the users table.
    ShowUsers,
    /// Jump to the groups table.
    ShowGroups,
    /// Jump to the computers table.
    ShowComputers,
    /// Start typing a filter for the visible table.
    StartSearch,
    /// Re-fetch the visible panel.
    Refresh,
    /// Default row action: members for groups, status for users.
    EnterAction,
    /// Open the reset-password dialog for the selected user.
    ResetPassword,
    /// Open the enable/disable dialog for the selected user.
    ToggleStatus,
    /// Cycle the dashboard preview table.
    NextPreview,
    /// Move the selection up one row.
    MoveUp,
    /// Move the selection down one row.
    MoveDown,
    /// Previous page of rows.
    PageUp,
    /// Next page of rows.
    PageDown,
    /// Swallow the key.
    Ignore,
}

/// Config-file names for every action.
const ACTION_NAMES: [(KeyAction, &str); 18] = [
    (KeyAction::Quit, "Quit"),
    (KeyAction::NextTab, "NextTab"),
    (KeyAction::PrevTab, "PrevTab"),
    (KeyAction::ShowDashboard, "ShowDashboard"),
    (KeyAction::ShowUsers, "ShowUsers"),
    (KeyAction::ShowGroups, "ShowGroups"),
    (KeyAction::ShowComputers, "ShowComputers"),
    (KeyAction::StartSearch, "StartSearch"),
    (KeyAction::Refresh, "Refresh"),
    (KeyAction::EnterAction, "EnterAction"),
    (KeyAction::ResetPassword, "ResetPassword"),
    (KeyAction::ToggleStatus, "ToggleStatus"),
    (KeyAction::NextPreview, "NextPreview"),
    (KeyAction::MoveUp, "MoveUp"),
    (KeyAction::MoveDown, "MoveDown"),
    (KeyAction::PageUp, "PageUp"),
    (KeyAction::PageDown, "PageDown"),
    (KeyAction::Ignore, "Ignore"),
];

/// Default bindings in the order they are written to a fresh config.
const DEFAULT_BINDINGS: [(&str, KeyAction); 26] = [
    ("q", KeyAction::Quit),
    ("Ctrl+c", KeyAction::Quit),
    ("Esc", KeyAction::Ignore),
    ("Tab", KeyAction::NextTab),
    ("BackTab", KeyAction::PrevTab),
    ("1", KeyAction::ShowDashboard),
    ("2", KeyAction::ShowUsers),
    ("3", KeyAction::ShowGroups),
    ("4", KeyAction::ShowComputers),
    ("/", KeyAction::StartSearch),
    ("r", KeyAction::Refresh),
    ("Enter", KeyAction::EnterAction),
    ("p", KeyAction::ResetPassword),
    ("e", KeyAction::ToggleStatus),
    ("]", KeyAction::NextPreview),
    ("Up", KeyAction::MoveUp),
    ("Down", KeyAction::MoveDown),
    ("k", KeyAction::MoveUp),
    ("j", KeyAction::MoveDown),
    ("PageUp", KeyAction::PageUp),
    ("PageDown", KeyAction::PageDown),
    ("Left", KeyAction::PageUp),
    ("Right", KeyAction::PageDown),
    ("h", KeyAction::PageUp),
    ("l", KeyAction::PageDown),
    ("Shift+BackTab", KeyAction::PrevTab),
];

/// Lookup table from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Keymap holding only the built-in bindings.
    pub fn new_defaults() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|(spec, action)| parse_key(spec).map(|key| (key, *action)))
            .collect();
        Self { bindings }
    }

    /// Load from `path` (or the user config dir); write defaults when neither exists.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::config::config_file_read_path("keybinds.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(err) = km.write_file(path) {
            tracing::warn!(path, %err, "could not write default keybindings");
        }
        km
    }

    /// Read and parse `path`; `None` when it cannot be read.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Defaults overridden by every recognised line in `contents`.
    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for (lhs, rhs) in crate::config::key_values(contents) {
            let binding = match (parse_action(lhs), parse_key(rhs)) {
                (Some(action), Some(key)) => Some((key, action)),
                _ => parse_key(lhs).zip(parse_action(rhs)),
            };
            match binding {
                Some((key, action)) => {
                    map.bindings.insert(key, action);
                }
                None => tracing::warn!(lhs, rhs, "ignoring unrecognised keybinding"),
            }
        }
        map
    }

    /// Write every binding to `path`, grouped by action, with a commented header.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# ad-dashboard keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Tab, BackTab, Up, Down, PageUp, Delete, /, ]\n");
        let names: Vec<&str> = ACTION_NAMES.iter().map(|(_, n)| *n).collect();
        let _ = writeln!(&mut buf, "# Actions: {}\n", names.join(", "));

        let mut rows: Vec<(String, KeyAction)> = self
            .all_bindings()
            .into_iter()
            .map(|((mods, code), action)| (Self::format_key(mods, code), action))
            .collect();
        rows.sort_by(|a, b| format_action(a.1).cmp(format_action(b.1)).then_with(|| a.0.cmp(&b.0)));
        for (key, action) in rows {
            let _ = writeln!(&mut buf, "{} = {}", format_action(action), key);
        }
        std::fs::write(path, buf)
    }

    /// Action bound to this exact key and modifier combination.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Every binding, in no particular order.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Keys bound to `action`, formatted for the status bar.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((mods, code), _)| Self::format_key(*mods, *code))
            .collect();
        keys.sort();
        keys
    }

    /// Human-readable spec such as "Ctrl+c" or "BackTab".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Backspace => "Backspace".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{base}")
        } else if mods.contains(KeyModifiers::SHIFT) {
            format!("Shift+{base}")
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

/// Parse a spec like `Ctrl+c`, `Shift+BackTab` or `]`.
fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let mut rest = spec.trim();
    let mut mods = KeyModifiers::NONE;
    loop {
        if let Some(after) = rest.strip_prefix("Ctrl+") {
            mods |= KeyModifiers::CONTROL;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("Shift+") {
            mods |= KeyModifiers::SHIFT;
            rest = after;
        } else {
            break;
        }
    }
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Backspace" => Backspace,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let s = s.trim();
    ACTION_NAMES.iter().find(|(_, name)| *name == s).map(|(a, _)| *a)
}

pub fn format_action(a: KeyAction) -> &'static str {
    ACTION_NAMES
        .iter()
        .find(|(action, _)| *action == a)
        .map(|(_, name)| *name)
        .unwrap_or("Ignore")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mods: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_cover_navigation_and_actions() {
        let km = Keymap::default();
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&key(KeyModifiers::CONTROL, KeyCode::Char('c'))), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('3'))), Some(KeyAction::ShowGroups));
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('p'))), Some(KeyAction::ResetPassword));
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('z'))), None);
    }

    #[test]
    fn file_overrides_accept_both_orders() {
        let km = Keymap::parse("# comment\nRefresh = F\nx = Quit\nNonsense = y\n");
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('F'))), Some(KeyAction::Refresh));
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('x'))), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('r'))), Some(KeyAction::Refresh));
    }

    #[test]
    fn key_specs_format_and_parse_alike() {
        for spec in ["Ctrl+c", "Shift+BackTab", "PageDown", "]", "/"] {
            let (mods, code) = parse_key(spec).unwrap();
            assert_eq!(Keymap::format_key(mods, code), spec);
        }
        assert_eq!(parse_key("F12x"), None);
    }

    #[test]
    fn action_names_cover_every_action() {
        for (action, name) in ACTION_NAMES {
            assert_eq!(parse_action(name), Some(action));
            assert_eq!(format_action(action), name);
        }
    }
}
