//! Modal dialogs: reset password, toggle user status, group members.
//!
//! Only one dialog is open at a time. Dialogs close on Esc, on a click outside
//! their frame, or after a successful action once `Timings::close_delay` has
//! passed.
//!
use std::time::Instant;

use crate::api::model::UserAction;
use crate::app::form::{FocusRing, SecretField};
use crate::app::notify::ResultMessage;
use crate::app::panel::Panel;
use crate::app::{AppState, FetchTarget, InputMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    ResetPassword,
    ToggleUser,
    GroupMembers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    Backdrop,
    AutoClose,
}

#[derive(Clone, Debug)]
pub struct ResetPasswordForm {
    pub username: String,
    pub password: SecretField,
    pub confirm: SecretField,
    pub focus: FocusRing,
    pub result: Option<ResultMessage>,
    pub in_flight: bool,
}

impl ResetPasswordForm {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretField::default(),
            confirm: SecretField::default(),
            focus: FocusRing::new(2),
            result: None,
            in_flight: false,
        }
    }

    pub fn focused_field(&mut self) -> &mut SecretField {
        if self.focus.is_focused(0) { &mut self.password } else { &mut self.confirm }
    }

    /// Reveal or mask both password inputs together.
    pub fn toggle_visibility(&mut self) {
        let visible = !self.password.is_visible();
        self.password.set_visible(visible);
        self.confirm.set_visible(visible);
    }
}

#[derive(Clone, Debug)]
pub struct ToggleUserForm {
    pub username: String,
    pub currently_enabled: bool,
    pub action: UserAction,
    pub result: Option<ResultMessage>,
    pub in_flight: bool,
}

#[derive(Clone, Debug)]
pub struct GroupMembersView {
    pub group: String,
    pub members: Panel<Vec<String>>,
    pub selected: usize,
    /// Member awaiting removal confirmation.
    pub confirm: Option<String>,
    /// Member whose removal request is in flight.
    pub removing: Option<String>,
    pub result: Option<ResultMessage>,
}

impl GroupMembersView {
    pub fn selected_member(&self) -> Option<&String> {
        self.members.data().and_then(|m| m.get(self.selected))
    }
}

#[derive(Clone, Debug)]
pub enum ModalState {
    ResetPassword(ResetPasswordForm),
    ToggleUser(ToggleUserForm),
    GroupMembers(GroupMembersView),
}

impl ModalState {
    pub fn kind(&self) -> ModalKind {
        match self {
            ModalState::ResetPassword(_) => ModalKind::ResetPassword,
            ModalState::ToggleUser(_) => ModalKind::ToggleUser,
            ModalState::GroupMembers(_) => ModalKind::GroupMembers,
        }
    }
}

/// A dialog close scheduled after a successful action, plus the lists to
/// reload once it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingClose {
    pub kind: ModalKind,
    pub at: Instant,
    pub refresh: Vec<FetchTarget>,
}

impl AppState {
    fn show_modal(&mut self, modal: ModalState) {
        if let Some(old) = &self.modal {
            tracing::debug!(old = ?old.kind(), new = ?modal.kind(), "replacing open modal");
        }
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn open_reset_password(&mut self, username: &str) {
        self.show_modal(ModalState::ResetPassword(ResetPasswordForm::new(username)));
    }

    /// Open the status dialog preselecting the action that flips `currently_enabled`.
    pub fn open_toggle_user(&mut self, username: &str, currently_enabled: bool) {
        let action = if currently_enabled { UserAction::Disable } else { UserAction::Enable };
        self.show_modal(ModalState::ToggleUser(ToggleUserForm {
            username: username.to_string(),
            currently_enabled,
            action,
            result: None,
            in_flight: false,
        }));
    }

    pub fn open_group_members(&mut self, group: &str) {
        tracing::info!(group, "loading members for group");
        self.show_modal(ModalState::GroupMembers(GroupMembersView {
            group: group.to_string(),
            members: Panel::resume_after(self.last_members_token),
            selected: 0,
            confirm: None,
            removing: None,
            result: None,
        }));
        self.request(FetchTarget::GroupMembers { group: group.to_string() });
    }

    pub fn close_modal(&mut self, reason: CloseReason) {
        if let Some(modal) = self.modal.take() {
            tracing::debug!(kind = ?modal.kind(), ?reason, "closing modal");
        }
        self.input_mode = InputMode::Normal;
    }

    /// Fire a scheduled close when due: close the dialog if it is still the
    /// one that scheduled it, then reload the affected lists.
    pub(crate) fn run_pending_close(&mut self, now: Instant) {
        if !self.pending_close.as_ref().is_some_and(|p| p.at <= now) {
            return;
        }
        let Some(pending) = self.pending_close.take() else {
            return;
        };
        if self.modal.as_ref().map(ModalState::kind) == Some(pending.kind) {
            self.close_modal(CloseReason::AutoClose);
        }
        for target in pending.refresh {
            self.request(target);
        }
    }
}
