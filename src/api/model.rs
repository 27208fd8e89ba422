//! Wire types for the directory REST API.
//!
//! Records are decoded defensively: absent or `null` optional attributes become
//! `None` or an empty string instead of failing the whole response.
//!
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A directory user as returned by `GET /api/ad/users`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "sAMAccountName", default, deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(rename = "cn", default)]
    pub common_name: Option<String>,
    #[serde(rename = "givenName", default)]
    pub given_name: Option<String>,
    #[serde(rename = "sn", default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
}

impl User {
    /// `cn`, else "given surname" when both are present, else the account name.
    pub fn display_name(&self) -> String {
        if let Some(cn) = non_empty(&self.common_name) {
            return cn.to_string();
        }
        match (non_empty(&self.given_name), non_empty(&self.surname)) {
            (Some(given), Some(sn)) => format!("{given} {sn}"),
            _ => self.account_name.clone(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.enabled { "Active" } else { "Disabled" }
    }

    /// The action that flips the current account state.
    pub fn toggle_action(&self) -> UserAction {
        if self.enabled {
            UserAction::Disable
        } else {
            UserAction::Enable
        }
    }
}

/// Enable/disable operations on a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserAction {
    Enable,
    Disable,
}

impl UserAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::Enable => "enable",
            UserAction::Disable => "disable",
        }
    }

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            UserAction::Enable => "Enable",
            UserAction::Disable => "Disable",
        }
    }

    pub fn progressive(self) -> &'static str {
        match self {
            UserAction::Enable => "Enabling",
            UserAction::Disable => "Disabling",
        }
    }

    pub fn past(self) -> &'static str {
        match self {
            UserAction::Enable => "enabled",
            UserAction::Disable => "disabled",
        }
    }

    pub fn other(self) -> Self {
        match self {
            UserAction::Enable => UserAction::Disable,
            UserAction::Disable => UserAction::Enable,
        }
    }
}

/// Body of `PUT /api/ad/user/{name}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserUpdate {
    ResetPassword { password: String },
    Enable,
    Disable,
}

impl From<UserAction> for UserUpdate {
    fn from(action: UserAction) -> Self {
        match action {
            UserAction::Enable => UserUpdate::Enable,
            UserAction::Disable => UserUpdate::Disable,
        }
    }
}

/// `member` may arrive as a list or as a single string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MemberField {
    Many(Vec<String>),
    One(String),
}

/// A directory group as returned by `GET /api/ad/groups`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    #[serde(rename = "cn", default, deserialize_with = "null_as_default")]
    pub common_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "member_count", alias = "memberCount", default)]
    pub explicit_member_count: Option<u64>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
    #[serde(default)]
    pub member: Option<MemberField>,
}

impl Group {
    /// Explicit non-zero count, else the member list length, else a 0/1 presence check.
    pub fn member_count(&self) -> u64 {
        if let Some(n) = self.explicit_member_count.filter(|n| *n > 0) {
            return n;
        }
        if let Some(list) = &self.members {
            return list.len() as u64;
        }
        match &self.member {
            Some(MemberField::Many(list)) => list.len() as u64,
            Some(MemberField::One(dn)) if !dn.is_empty() => 1,
            _ => 0,
        }
    }

    /// Member identifiers in server order.
    pub fn member_list(&self) -> Vec<String> {
        if let Some(list) = &self.members {
            return list.clone();
        }
        match &self.member {
            Some(MemberField::Many(list)) => list.clone(),
            Some(MemberField::One(dn)) if !dn.is_empty() => vec![dn.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ComputerStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl ComputerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComputerStatus::Online => "Online",
            ComputerStatus::Offline => "Offline",
            ComputerStatus::Unknown => "Unknown",
        }
    }
}

impl<'de> Deserialize<'de> for ComputerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match loose_string(deserializer)?.as_str() {
            "Online" => ComputerStatus::Online,
            "Offline" => ComputerStatus::Offline,
            _ => ComputerStatus::Unknown,
        })
    }
}

/// A computer entry from the dashboard summary's `computerDetails`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Computer {
    #[serde(rename = "Computer Name", alias = "name", default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(rename = "IP Address", alias = "ipAddress", default, deserialize_with = "loose_string")]
    pub ip_address: String,
    #[serde(rename = "Status", alias = "status", default)]
    pub status: ComputerStatus,
}

/// Truncated user row shown on the landing view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserPreview {
    #[serde(rename = "Name", default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(rename = "Username", default, deserialize_with = "loose_string")]
    pub username: String,
    #[serde(rename = "Email", default, deserialize_with = "loose_string")]
    pub email: String,
    #[serde(rename = "Status", default, deserialize_with = "loose_string")]
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupPreview {
    #[serde(rename = "Group Name", default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(rename = "Description", default, deserialize_with = "loose_string")]
    pub description: String,
    #[serde(rename = "Members", default, deserialize_with = "loose_string")]
    pub members: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SummaryMetadata {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Payload of `GET /api/dashboard-data`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "users", default, deserialize_with = "null_as_default")]
    pub user_count: u64,
    #[serde(rename = "groups", default, deserialize_with = "null_as_default")]
    pub group_count: u64,
    #[serde(rename = "computers", default, deserialize_with = "null_as_default")]
    pub computer_count: u64,
    #[serde(rename = "domainControllers", default, deserialize_with = "null_as_default")]
    pub domain_controller_count: u64,
    #[serde(rename = "userDetails", default, deserialize_with = "null_as_default")]
    pub user_details: Vec<UserPreview>,
    #[serde(rename = "groupDetails", default, deserialize_with = "null_as_default")]
    pub group_details: Vec<GroupPreview>,
    #[serde(rename = "computerDetails", default, deserialize_with = "null_as_default")]
    pub computer_details: Vec<Computer>,
    #[serde(default)]
    pub metadata: Option<SummaryMetadata>,
}

impl DashboardSummary {
    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.timestamp.as_deref())
    }
}

/// Reply of every mutating endpoint and of `/login` and `/register`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActionReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionReply {
    /// Server message, or `fallback` when absent or empty.
    pub fn message_or(&self, fallback: impl Into<String>) -> String {
        match non_empty(&self.message) {
            Some(m) => m.to_string(),
            None => fallback.into(),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_display_name_fallbacks() {
        let u: User = serde_json::from_str(r#"{"sAMAccountName":"jdoe","cn":"","givenName":"John","sn":"Doe"}"#).unwrap();
        assert_eq!(u.display_name(), "John Doe");

        let u: User = serde_json::from_str(r#"{"sAMAccountName":"jdoe","givenName":"John"}"#).unwrap();
        assert_eq!(u.display_name(), "jdoe");

        let u: User = serde_json::from_str(r#"{"sAMAccountName":"jdoe","cn":"Jane Doe"}"#).unwrap();
        assert_eq!(u.display_name(), "Jane Doe");
    }

    #[test]
    fn user_tolerates_nulls_and_missing_fields() {
        let u: User = serde_json::from_str(r#"{"sAMAccountName":null,"mail":null}"#).unwrap();
        assert_eq!(u.account_name, "");
        assert!(!u.enabled);
        assert_eq!(u.mail, None);
        assert_eq!(u.toggle_action(), UserAction::Enable);
    }

    #[test]
    fn group_member_count_precedence() {
        let g: Group = serde_json::from_str(r#"{"cn":"a","member_count":5,"members":["x"]}"#).unwrap();
        assert_eq!(g.member_count(), 5);

        let g: Group = serde_json::from_str(r#"{"cn":"a","member_count":0,"members":["x","y"]}"#).unwrap();
        assert_eq!(g.member_count(), 2);

        let g: Group = serde_json::from_str(r#"{"cn":"a","member":"CN=x,DC=test"}"#).unwrap();
        assert_eq!(g.member_count(), 1);
        assert_eq!(g.member_list(), vec!["CN=x,DC=test".to_string()]);

        let g: Group = serde_json::from_str(r#"{"cn":"a","member":["p","q","r"]}"#).unwrap();
        assert_eq!(g.member_count(), 3);

        let g: Group = serde_json::from_str(r#"{"cn":"a"}"#).unwrap();
        assert_eq!(g.member_count(), 0);
    }

    #[test]
    fn user_update_wire_shape() {
        let body = serde_json::to_value(UserUpdate::ResetPassword { password: "s3cret".into() }).unwrap();
        assert_eq!(body, serde_json::json!({"action": "reset_password", "password": "s3cret"}));
        let body = serde_json::to_value(UserUpdate::from(UserAction::Disable)).unwrap();
        assert_eq!(body, serde_json::json!({"action": "disable"}));
    }

    #[test]
    fn dashboard_summary_decodes_backend_shape() {
        let raw = r#"{
            "users": 2, "groups": 1, "computers": 1, "domainControllers": 1,
            "userDetails": [{"Name":"Test User 1","Username":"testuser1","Email":"t@test.local","Status":"Active"}],
            "groupDetails": [{"Group Name":"Domain Admins","Description":"Admins","Members":"3"}],
            "computerDetails": [{"Computer Name":"PC-1","IP Address":"pc-1.test.local","Status":"Offline"}],
            "metadata": {"timestamp":"2024-03-01T10:15:00.123456","server":"dc01"}
        }"#;
        let s: DashboardSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(s.user_count, 2);
        assert_eq!(s.domain_controller_count, 1);
        assert_eq!(s.group_details[0].members, "3");
        assert_eq!(s.computer_details[0].status, ComputerStatus::Offline);
        assert_eq!(s.timestamp(), Some("2024-03-01T10:15:00.123456"));
        assert_eq!(s.success, None);
    }

    #[test]
    fn computer_status_unknown_for_unexpected_values() {
        let c: Computer = serde_json::from_str(r#"{"Computer Name":"X","Status":"Sleeping"}"#).unwrap();
        assert_eq!(c.status, ComputerStatus::Unknown);
        assert_eq!(c.ip_address, "");
        let c: Computer = serde_json::from_str(r#"{"name":"Y","ipAddress":"10.0.0.2","status":"Online"}"#).unwrap();
        assert_eq!(c.name, "Y");
        assert_eq!(c.status, ComputerStatus::Online);
    }

    #[test]
    fn preview_members_accepts_numbers() {
        let g: GroupPreview = serde_json::from_str(r#"{"Group Name":"g","Members":15}"#).unwrap();
        assert_eq!(g.members, "15");
        assert_eq!(g.description, "");
    }
}
