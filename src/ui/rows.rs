//! Pure table view-models. Every panel renders from the rows built here, so
//! what a table shows can be checked without a terminal.
//!
use chrono::{DateTime, NaiveDateTime};

use crate::api::model::{Computer, DashboardSummary, Group, User, UserAction};
use crate::app::AppState;
use crate::app::nav::{PreviewTab, Tab};
use crate::app::panel::{LoadState, Panel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeKind {
    Active,
    Disabled,
}

/// What a row button does when activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowAction {
    ResetPassword { username: String },
    SetEnabled { username: String, action: UserAction },
    ViewMembers { group: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub action: RowAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Text(String),
    Badge(BadgeKind, String),
    Actions(Vec<ActionButton>),
}

impl CellView {
    pub fn text(&self) -> String {
        match self {
            CellView::Text(t) | CellView::Badge(_, t) => t.clone(),
            CellView::Actions(buttons) => buttons.iter().map(|b| b.label.as_str()).collect::<Vec<_>>().join(" "),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderKind {
    Loading,
    Empty,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableRow {
    /// A single message spanning the table.
    Placeholder(PlaceholderKind, String),
    Data(Vec<CellView>),
}

impl TableRow {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, TableRow::Placeholder(..))
    }

    pub fn actions(&self) -> &[ActionButton] {
        match self {
            TableRow::Data(cells) => cells
                .iter()
                .find_map(|c| match c {
                    CellView::Actions(buttons) => Some(buttons.as_slice()),
                    _ => None,
                })
                .unwrap_or(&[]),
            TableRow::Placeholder(..) => &[],
        }
    }
}

/// Placeholder texts for one entity table.
struct Messages {
    loading: &'static str,
    empty: &'static str,
    error_prefix: &'static str,
}

const USERS: Messages = Messages {
    loading: "Loading users data...",
    empty: "No users found or unable to retrieve user data.",
    error_prefix: "Error loading user data: ",
};

const GROUPS: Messages = Messages {
    loading: "Loading groups data...",
    empty: "No groups found or unable to retrieve group data.",
    error_prefix: "Error loading group data: ",
};

const COMPUTERS: Messages = Messages {
    loading: "Loading computers data...",
    empty: "No computers found or unable to retrieve computer data.",
    error_prefix: "Error loading computer data: ",
};

fn entity_rows<T>(panel: &Panel<Vec<T>>, messages: &Messages, row: impl Fn(&T) -> Vec<CellView>) -> Vec<TableRow> {
    match panel.state() {
        LoadState::NotLoaded | LoadState::Loading => {
            vec![TableRow::Placeholder(PlaceholderKind::Loading, messages.loading.to_string())]
        }
        LoadState::Failed(err) => vec![TableRow::Placeholder(
            PlaceholderKind::Error,
            format!("{}{}", messages.error_prefix, err),
        )],
        LoadState::Loaded(items) if items.is_empty() => {
            vec![TableRow::Placeholder(PlaceholderKind::Empty, messages.empty.to_string())]
        }
        LoadState::Loaded(items) => items.iter().map(|item| TableRow::Data(row(item))).collect(),
    }
}

/// "Active"/"Online" and "Disabled"/"Offline" become badges; anything else stays text.
pub fn status_cell(value: &str) -> CellView {
    match value {
        "Active" | "Online" => CellView::Badge(BadgeKind::Active, value.to_string()),
        "Disabled" | "Offline" => CellView::Badge(BadgeKind::Disabled, value.to_string()),
        other => CellView::Text(other.to_string()),
    }
}

fn text(value: &str) -> CellView {
    CellView::Text(value.to_string())
}

pub fn user_row(user: &User) -> Vec<CellView> {
    let action = user.toggle_action();
    vec![
        CellView::Text(user.display_name()),
        text(&user.account_name),
        text(user.mail.as_deref().unwrap_or("")),
        status_cell(user.status_label()),
        CellView::Actions(vec![
            ActionButton {
                label: "Reset Password".to_string(),
                action: RowAction::ResetPassword { username: user.account_name.clone() },
            },
            ActionButton {
                label: action.label().to_string(),
                action: RowAction::SetEnabled { username: user.account_name.clone(), action },
            },
        ]),
    ]
}

pub fn group_row(group: &Group) -> Vec<CellView> {
    vec![
        text(&group.common_name),
        text(group.description.as_deref().unwrap_or("")),
        CellView::Text(group.member_count().to_string()),
        CellView::Actions(vec![ActionButton {
            label: "View Members".to_string(),
            action: RowAction::ViewMembers { group: group.common_name.clone() },
        }]),
    ]
}

pub fn computer_row(computer: &Computer) -> Vec<CellView> {
    vec![
        text(&computer.name),
        text(&computer.ip_address),
        status_cell(computer.status.as_str()),
    ]
}

pub fn user_rows(panel: &Panel<Vec<User>>) -> Vec<TableRow> {
    entity_rows(panel, &USERS, user_row)
}

pub fn group_rows(panel: &Panel<Vec<Group>>) -> Vec<TableRow> {
    entity_rows(panel, &GROUPS, group_row)
}

pub fn computer_rows(panel: &Panel<Vec<Computer>>) -> Vec<TableRow> {
    entity_rows(panel, &COMPUTERS, computer_row)
}

/// Rows of one dashboard preview table.
pub fn preview_rows(panel: &Panel<DashboardSummary>, tab: PreviewTab) -> Vec<TableRow> {
    let summary = match panel.state() {
        LoadState::NotLoaded | LoadState::Loading => {
            return vec![TableRow::Placeholder(PlaceholderKind::Loading, "Loading data...".to_string())];
        }
        LoadState::Failed(_) => {
            return vec![TableRow::Placeholder(PlaceholderKind::Error, "Failed to load data".to_string())];
        }
        LoadState::Loaded(summary) => summary,
    };
    let rows: Vec<TableRow> = match tab {
        PreviewTab::Users => summary
            .user_details
            .iter()
            .map(|u| TableRow::Data(vec![text(&u.name), text(&u.username), text(&u.email), status_cell(&u.status)]))
            .collect(),
        PreviewTab::Groups => summary
            .group_details
            .iter()
            .map(|g| TableRow::Data(vec![text(&g.name), text(&g.description), text(&g.members)]))
            .collect(),
        PreviewTab::Computers => summary.computer_details.iter().map(|c| TableRow::Data(computer_row(c))).collect(),
    };
    if rows.is_empty() {
        return vec![TableRow::Placeholder(PlaceholderKind::Empty, "No data available".to_string())];
    }
    rows
}

pub fn preview_headers(tab: PreviewTab) -> &'static [&'static str] {
    match tab {
        PreviewTab::Users => &["Name", "Username", "Email", "Status"],
        PreviewTab::Groups => &["Group Name", "Description", "Members"],
        PreviewTab::Computers => &["Computer Name", "IP Address", "Status"],
    }
}

/// Rows of `tab` after its filter is applied; what selection indexes into.
pub fn visible_rows(app: &AppState, tab: Tab) -> Vec<TableRow> {
    let rows = match tab {
        Tab::Dashboard => preview_rows(&app.dashboard, app.preview),
        Tab::Users => user_rows(&app.users),
        Tab::Groups => group_rows(&app.groups),
        Tab::Computers => computer_rows(&app.computers),
    };
    crate::search::filter_rows(rows, app.filter(tab))
}

/// Display name of a fully-qualified directory name: the first `CN=` value,
/// else the whole string.
pub fn cn_of(dn: &str) -> &str {
    let Some(start) = dn.find("CN=") else {
        return dn;
    };
    let rest = &dn[start + 3..];
    let value = rest.split(',').next().unwrap_or(rest);
    if value.is_empty() { dn } else { value }
}

pub fn member_rows(panel: &Panel<Vec<String>>) -> Vec<TableRow> {
    match panel.state() {
        LoadState::NotLoaded | LoadState::Loading => {
            vec![TableRow::Placeholder(PlaceholderKind::Loading, "Loading members...".to_string())]
        }
        LoadState::Failed(err) => vec![TableRow::Placeholder(PlaceholderKind::Error, err.clone())],
        LoadState::Loaded(members) if members.is_empty() => vec![TableRow::Placeholder(
            PlaceholderKind::Empty,
            "No members found in this group.".to_string(),
        )],
        LoadState::Loaded(members) => members
            .iter()
            .map(|dn| TableRow::Data(vec![text(cn_of(dn)), text(dn)]))
            .collect(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Counter {
    Loading,
    Value(u64),
    Error,
}

impl Counter {
    pub fn label(self) -> String {
        match self {
            Counter::Loading => "...".to_string(),
            Counter::Value(v) => v.to_string(),
            Counter::Error => "Error".to_string(),
        }
    }
}

/// Summary cards in display order.
pub fn counters(panel: &Panel<DashboardSummary>) -> [(&'static str, Counter); 4] {
    let pick = |f: fn(&DashboardSummary) -> u64| match panel.state() {
        LoadState::Loaded(summary) => Counter::Value(f(summary)),
        LoadState::Failed(_) => Counter::Error,
        LoadState::NotLoaded | LoadState::Loading => Counter::Loading,
    };
    [
        ("Users", pick(|s| s.user_count)),
        ("Groups", pick(|s| s.group_count)),
        ("Computers", pick(|s| s.computer_count)),
        ("Domain Controllers", pick(|s| s.domain_controller_count)),
    ]
}

/// Last-updated line under the counters.
pub fn last_updated(panel: &Panel<DashboardSummary>) -> String {
    match panel.state() {
        LoadState::NotLoaded | LoadState::Loading => "Loading...".to_string(),
        LoadState::Failed(_) => "Failed to fetch data".to_string(),
        LoadState::Loaded(summary) => summary.timestamp().map(format_timestamp).unwrap_or_else(|| "Never".to_string()),
    }
}

/// Render a backend timestamp as local-style text, or return it unchanged
/// when it is not a recognised ISO-8601 form.
pub fn format_timestamp(raw: &str) -> String {
    const OUT: &str = "%Y-%m-%d %H:%M:%S";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(OUT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::{ComputerStatus, UserPreview};
    use crate::error::ApiError;

    fn loaded<T>(value: T) -> Panel<T> {
        let mut panel = Panel::new();
        let token = panel.begin();
        panel.resolve(token, Ok(value));
        panel
    }

    #[test]
    fn one_row_per_user_or_one_placeholder() {
        let users = vec![
            User { account_name: "jdoe".into(), enabled: true, ..Default::default() },
            User { account_name: "asmith".into(), ..Default::default() },
        ];
        assert_eq!(user_rows(&loaded(users)).len(), 2);

        let empty = user_rows(&loaded(Vec::new()));
        assert_eq!(empty, vec![TableRow::Placeholder(PlaceholderKind::Empty, USERS.empty.to_string())]);
    }

    #[test]
    fn missing_optional_fields_render_empty_cells() {
        let rows = user_rows(&loaded(vec![User { account_name: "jdoe".into(), ..Default::default() }]));
        let TableRow::Data(cells) = &rows[0] else { panic!("expected data row") };
        assert_eq!(cells[0], CellView::Text("jdoe".into()));
        assert_eq!(cells[2], CellView::Text(String::new()));
    }

    #[test]
    fn toggle_button_follows_enabled_flag() {
        let enabled = user_rows(&loaded(vec![User { account_name: "jdoe".into(), enabled: true, ..Default::default() }]));
        let button = &enabled[0].actions()[1];
        assert_eq!(button.label, "Disable");
        assert_eq!(button.action, RowAction::SetEnabled { username: "jdoe".into(), action: UserAction::Disable });

        let disabled = user_rows(&loaded(vec![User { account_name: "jdoe".into(), ..Default::default() }]));
        assert_eq!(disabled[0].actions()[1].label, "Enable");
    }

    #[test]
    fn status_values_map_to_badges() {
        assert_eq!(status_cell("Online"), CellView::Badge(BadgeKind::Active, "Online".into()));
        assert_eq!(status_cell("Disabled"), CellView::Badge(BadgeKind::Disabled, "Disabled".into()));
        assert_eq!(status_cell("Unknown"), CellView::Text("Unknown".into()));
        let c = Computer { name: "WS01".into(), ip_address: String::new(), status: ComputerStatus::Unknown };
        assert_eq!(computer_row(&c)[2], CellView::Text("Unknown".into()));
    }

    #[test]
    fn failure_and_loading_placeholders() {
        let mut panel: Panel<Vec<Group>> = Panel::new();
        let token = panel.begin();
        assert_eq!(group_rows(&panel)[0], TableRow::Placeholder(PlaceholderKind::Loading, "Loading groups data...".into()));
        panel.resolve(token, Err(ApiError::Server { status: 500, message: "LDAP bind failed".into() }));
        assert_eq!(
            group_rows(&panel)[0],
            TableRow::Placeholder(PlaceholderKind::Error, "Error loading group data: LDAP bind failed".into())
        );
    }

    #[test]
    fn dashboard_failure_shows_error_counters() {
        let mut panel: Panel<DashboardSummary> = Panel::new();
        let token = panel.begin();
        panel.resolve(token, Err(ApiError::Domain("LDAP unavailable".into())));
        assert!(counters(&panel).iter().all(|(_, c)| *c == Counter::Error));
        assert_eq!(last_updated(&panel), "Failed to fetch data");
        assert_eq!(
            preview_rows(&panel, PreviewTab::Groups),
            vec![TableRow::Placeholder(PlaceholderKind::Error, "Failed to load data".into())]
        );
    }

    #[test]
    fn preview_rows_and_empty_preview() {
        let summary = DashboardSummary {
            user_count: 3,
            user_details: vec![UserPreview {
                name: "John Doe".into(),
                username: "jdoe".into(),
                email: "jdoe@corp.local".into(),
                status: "Active".into(),
            }],
            ..Default::default()
        };
        let panel = loaded(summary);
        assert_eq!(counters(&panel)[0], ("Users", Counter::Value(3)));
        let rows = preview_rows(&panel, PreviewTab::Users);
        assert_eq!(rows.len(), 1);
        assert!(matches!(&rows[0], TableRow::Data(cells) if cells[3] == CellView::Badge(BadgeKind::Active, "Active".into())));
        assert_eq!(
            preview_rows(&panel, PreviewTab::Computers),
            vec![TableRow::Placeholder(PlaceholderKind::Empty, "No data available".into())]
        );
    }

    #[test]
    fn cn_extraction_falls_back_to_full_name() {
        assert_eq!(cn_of("CN=John Doe,OU=Users,DC=corp,DC=local"), "John Doe");
        assert_eq!(cn_of("uid=jdoe,dc=corp"), "uid=jdoe,dc=corp");
        assert_eq!(cn_of("CN=Solo"), "Solo");
    }

    #[test]
    fn timestamps_format_or_pass_through() {
        assert_eq!(format_timestamp("2024-05-01T13:45:10.123456"), "2024-05-01 13:45:10");
        assert_eq!(format_timestamp("2024-05-01T13:45:10+00:00"), "2024-05-01 13:45:10");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
