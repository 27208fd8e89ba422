//! Fetch-and-render pipeline: effects going out, outcomes coming back.
//!
use std::time::Instant;

use crate::api::model::{ActionReply, Computer, DashboardSummary, Group, User, UserAction};
use crate::app::nav::Tab;
use crate::app::notify::NoticeKind;
use crate::app::panel::RequestToken;
use crate::app::{AppState, ModalState};
use crate::error::ApiError;

/// What a read request is for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    Dashboard,
    Users,
    Groups,
    Computers,
    GroupMembers { group: String },
}

impl FetchTarget {
    pub fn for_tab(tab: Tab) -> Self {
        match tab {
            Tab::Dashboard => FetchTarget::Dashboard,
            Tab::Users => FetchTarget::Users,
            Tab::Groups => FetchTarget::Groups,
            Tab::Computers => FetchTarget::Computers,
        }
    }
}

/// A mutating request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteRequest {
    ResetPassword { username: String, password: String },
    SetEnabled { username: String, action: UserAction },
    RemoveMember { group: String, dn: String },
}

/// Work for the network side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Login { email: String, password: String },
    Fetch { target: FetchTarget, token: RequestToken },
    Write(WriteRequest),
}

/// A completed request, delivered back to the UI thread.
#[derive(Debug)]
pub enum Outcome {
    LoggedIn(Result<ActionReply, ApiError>),
    Dashboard { token: RequestToken, result: Result<DashboardSummary, ApiError> },
    Users { token: RequestToken, result: Result<Vec<User>, ApiError> },
    Groups { token: RequestToken, result: Result<Vec<Group>, ApiError> },
    Computers { token: RequestToken, result: Result<Vec<Computer>, ApiError> },
    GroupMembers { group: String, token: RequestToken, result: Result<Vec<String>, ApiError> },
    Written { request: WriteRequest, result: Result<ActionReply, ApiError> },
}

impl AppState {
    /// Put the target's view into its loading state and queue the GET.
    pub fn request(&mut self, target: FetchTarget) {
        let token = match &target {
            FetchTarget::Dashboard => self.dashboard.begin(),
            FetchTarget::Users => self.users.begin(),
            FetchTarget::Groups => self.groups.begin(),
            FetchTarget::Computers => self.computers.begin(),
            FetchTarget::GroupMembers { group } => match &mut self.modal {
                Some(ModalState::GroupMembers(view)) if view.group == *group => {
                    let token = view.members.begin();
                    self.last_members_token = token;
                    token
                }
                _ => {
                    tracing::debug!(%group, "members modal not open; skipping fetch");
                    return;
                }
            },
        };
        tracing::debug!(?target, token = token.value(), "fetch queued");
        self.push_effect(Effect::Fetch { target, token });
    }

    /// Apply a finished request on the UI thread.
    pub fn apply_outcome(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::LoggedIn(result) => self.apply_login(result, now),
            Outcome::Dashboard { token, result } => {
                if let Err(err) = &result {
                    tracing::error!(%err, "error fetching dashboard data");
                }
                self.dashboard.resolve(token, result);
            }
            Outcome::Users { token, result } => {
                match &result {
                    Ok(users) => tracing::info!(count = users.len(), "received users"),
                    Err(err) => tracing::error!(%err, "error loading users"),
                }
                if self.users.resolve(token, result) {
                    self.clamp_selection(Tab::Users);
                }
            }
            Outcome::Groups { token, result } => {
                match &result {
                    Ok(groups) => tracing::info!(count = groups.len(), "received groups"),
                    Err(err) => tracing::error!(%err, "error loading groups"),
                }
                if self.groups.resolve(token, result) {
                    self.clamp_selection(Tab::Groups);
                }
            }
            Outcome::Computers { token, result } => {
                if let Err(err) = &result {
                    tracing::error!(%err, "error loading computers");
                }
                if self.computers.resolve(token, result) {
                    self.clamp_selection(Tab::Computers);
                }
            }
            Outcome::GroupMembers { group, token, result } => {
                if let Err(err) = &result {
                    tracing::error!(%group, %err, "error loading group members");
                }
                match &mut self.modal {
                    Some(ModalState::GroupMembers(view)) if view.group == group => {
                        if view.members.resolve(token, result) {
                            let len = view.members.data().map_or(0, Vec::len);
                            view.selected = view.selected.min(len.saturating_sub(1));
                        }
                    }
                    _ => tracing::debug!(%group, "members modal closed; dropping response"),
                }
            }
            Outcome::Written { request, result } => self.apply_write_result(request, result, now),
        }
    }

    fn apply_login(&mut self, result: Result<ActionReply, ApiError>, now: Instant) {
        match result {
            Ok(reply) if reply.success => {
                tracing::info!("login successful");
                self.notifier.push(NoticeKind::Success, reply.message_or("Login successful"), now);
            }
            Ok(reply) => {
                let message = reply.message_or("Login failed");
                self.notifier.push(NoticeKind::Error, message, now);
            }
            Err(err) => {
                tracing::error!(%err, "login request failed");
                self.notifier.push(NoticeKind::Error, err.user_message(), now);
            }
        }
        self.load_initial();
    }

    /// Keep the selection inside the filtered row count.
    pub(crate) fn clamp_selection(&mut self, tab: Tab) {
        let len = crate::ui::rows::visible_rows(self, tab).len();
        let idx = self.selected_index(tab).min(len.saturating_sub(1));
        self.set_selected_index(tab, idx);
    }
}
