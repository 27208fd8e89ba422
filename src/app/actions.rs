//! Mutating actions: reset password, enable/disable, remove group member.
//!
//! Each runs in four steps: validate locally, show an in-progress message,
//! queue the write, then branch on the reply's `success` flag.
//!
use std::time::Instant;

use crate::api::model::{ActionReply, UserAction};
use crate::app::modal::ModalKind;
use crate::app::notify::{NoticeKind, ResultMessage};
use crate::app::{AppState, Effect, FetchTarget, ModalState, PendingClose, WriteRequest};
use crate::error::ApiError;

impl AppState {
    /// Validate and submit the reset-password dialog.
    pub fn submit_reset_password(&mut self) {
        let Some(ModalState::ResetPassword(form)) = &mut self.modal else {
            return;
        };
        if form.in_flight {
            return;
        }
        if form.password.value() != form.confirm.value() {
            form.result = Some(ResultMessage::error("Passwords do not match"));
            return;
        }
        form.result = Some(ResultMessage::progress("Resetting password..."));
        form.in_flight = true;
        let request = WriteRequest::ResetPassword {
            username: form.username.clone(),
            password: form.password.value().to_string(),
        };
        tracing::info!(username = %form.username, "submitting password reset");
        self.push_effect(Effect::Write(request));
    }

    /// Switch the dialog's selected action.
    pub fn choose_toggle_action(&mut self, action: UserAction) {
        if let Some(ModalState::ToggleUser(form)) = &mut self.modal {
            if !form.in_flight {
                form.action = action;
            }
        }
    }

    pub fn submit_toggle_user(&mut self) {
        let Some(ModalState::ToggleUser(form)) = &mut self.modal else {
            return;
        };
        if form.in_flight {
            return;
        }
        let action = form.action;
        form.result = Some(ResultMessage::progress(format!("{} user...", action.progressive())));
        form.in_flight = true;
        let request = WriteRequest::SetEnabled { username: form.username.clone(), action };
        tracing::info!(username = %form.username, action = action.as_str(), "submitting status change");
        self.push_effect(Effect::Write(request));
    }

    /// Ask for confirmation before removing the highlighted member.
    pub fn request_member_removal(&mut self) {
        if let Some(ModalState::GroupMembers(view)) = &mut self.modal {
            if view.removing.is_some() {
                return;
            }
            view.confirm = view.selected_member().cloned();
        }
    }

    pub fn cancel_member_removal(&mut self) {
        if let Some(ModalState::GroupMembers(view)) = &mut self.modal {
            view.confirm = None;
        }
    }

    pub fn confirm_member_removal(&mut self) {
        let Some(ModalState::GroupMembers(view)) = &mut self.modal else {
            return;
        };
        let Some(dn) = view.confirm.take() else {
            return;
        };
        view.result = Some(ResultMessage::progress("Removing..."));
        view.removing = Some(dn.clone());
        let request = WriteRequest::RemoveMember { group: view.group.clone(), dn };
        self.push_effect(Effect::Write(request));
    }

    /// Route a finished write to the dialog that issued it.
    pub(crate) fn apply_write_result(
        &mut self,
        request: WriteRequest,
        result: Result<ActionReply, ApiError>,
        now: Instant,
    ) {
        match request {
            WriteRequest::ResetPassword { username, .. } => self.finish_reset(&username, result, now),
            WriteRequest::SetEnabled { username, action } => self.finish_toggle(&username, action, result, now),
            WriteRequest::RemoveMember { group, dn } => self.finish_removal(&group, &dn, result, now),
        }
    }

    fn finish_reset(&mut self, username: &str, result: Result<ActionReply, ApiError>, now: Instant) {
        let outcome = settle(result, "Password reset successfully", "Failed to reset password");
        let still_open = match &mut self.modal {
            Some(ModalState::ResetPassword(form)) if form.username == username => {
                form.in_flight = false;
                form.result = Some(match &outcome {
                    Ok(message) => {
                        form.password.clear();
                        form.confirm.clear();
                        ResultMessage::success(message.clone())
                    }
                    Err(message) => ResultMessage::error(message.clone()),
                });
                true
            }
            _ => false,
        };
        match outcome {
            Ok(message) => {
                tracing::info!(username, "password reset");
                self.reload_users_after_write(ModalKind::ResetPassword, still_open, message, now);
            }
            Err(message) => {
                tracing::warn!(username, %message, "password reset failed");
                if !still_open {
                    self.notifier.push(NoticeKind::Error, message, now);
                }
            }
        }
    }

    fn finish_toggle(
        &mut self,
        username: &str,
        action: UserAction,
        result: Result<ActionReply, ApiError>,
        now: Instant,
    ) {
        let success = format!("User {} successfully", action.past());
        let failure = format!("Failed to {} user", action.as_str());
        let outcome = settle(result, &success, &failure);
        let still_open = match &mut self.modal {
            Some(ModalState::ToggleUser(form)) if form.username == username => {
                form.in_flight = false;
                form.result = Some(match &outcome {
                    Ok(message) => ResultMessage::success(message.clone()),
                    Err(message) => ResultMessage::error(message.clone()),
                });
                true
            }
            _ => false,
        };
        match outcome {
            Ok(message) => {
                tracing::info!(username, action = action.as_str(), "user status changed");
                self.reload_users_after_write(ModalKind::ToggleUser, still_open, message, now);
            }
            Err(message) => {
                tracing::warn!(username, %message, "status change failed");
                if !still_open {
                    self.notifier.push(NoticeKind::Error, message, now);
                }
            }
        }
    }

    fn finish_removal(&mut self, group: &str, dn: &str, result: Result<ActionReply, ApiError>, now: Instant) {
        let outcome = settle(result, "Member removed from group", "Failed to remove member from group");
        let still_open = match &mut self.modal {
            Some(ModalState::GroupMembers(view)) if view.group == group => {
                if view.removing.as_deref() == Some(dn) {
                    view.removing = None;
                }
                view.result = Some(match &outcome {
                    Ok(message) => ResultMessage::success(message.clone()),
                    Err(message) => ResultMessage::error(message.clone()),
                });
                true
            }
            _ => false,
        };
        match outcome {
            Ok(message) => {
                tracing::info!(group, dn, "member removed");
                self.notifier.push(NoticeKind::Success, message, now);
                if still_open {
                    self.request(FetchTarget::GroupMembers { group: group.to_string() });
                }
                self.request(FetchTarget::Groups);
            }
            Err(message) => {
                tracing::warn!(group, dn, %message, "member removal failed");
                if !still_open {
                    self.notifier.push(NoticeKind::Error, message, now);
                }
            }
        }
    }

    /// A user changed on the server: reload the list with the delayed close,
    /// or right away when the dialog that asked is already gone.
    fn reload_users_after_write(&mut self, kind: ModalKind, still_open: bool, message: String, now: Instant) {
        if still_open {
            self.schedule_close(kind, now);
        } else {
            tracing::debug!(?kind, "dialog gone before reply; reloading users now");
            self.notifier.push(NoticeKind::Success, message, now);
            self.request(FetchTarget::Users);
        }
    }

    fn schedule_close(&mut self, kind: ModalKind, now: Instant) {
        self.pending_close = Some(PendingClose {
            kind,
            at: now + self.timings.close_delay,
            refresh: vec![FetchTarget::Users],
        });
    }
}

/// Collapse a write result into the message to show: `Ok` for a successful
/// reply, `Err` for a domain or transport failure.
fn settle(result: Result<ActionReply, ApiError>, success: &str, failure: &str) -> Result<String, String> {
    match result {
        Ok(reply) if reply.success => Ok(reply.message_or(success)),
        Ok(reply) => Err(reply.message_or(failure)),
        Err(err) => Err(err.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn written(effects: &[Effect]) -> Vec<&WriteRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Write(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    fn type_into(app: &mut AppState, password: &str, confirm: &str) {
        let Some(ModalState::ResetPassword(form)) = &mut app.modal else {
            panic!("reset dialog not open");
        };
        password.chars().for_each(|c| form.password.push(c));
        confirm.chars().for_each(|c| form.confirm.push(c));
    }

    fn result_text(app: &AppState) -> Option<String> {
        match &app.modal {
            Some(ModalState::ResetPassword(f)) => f.result.as_ref().map(|r| r.text.clone()),
            Some(ModalState::ToggleUser(f)) => f.result.as_ref().map(|r| r.text.clone()),
            Some(ModalState::GroupMembers(v)) => v.result.as_ref().map(|r| r.text.clone()),
            None => None,
        }
    }

    #[test]
    fn mismatched_passwords_never_reach_the_network() {
        let mut app = AppState::default();
        app.open_reset_password("jdoe");
        type_into(&mut app, "secret1", "secret2");
        app.submit_reset_password();
        assert!(app.take_effects().is_empty());
        assert_eq!(result_text(&app).as_deref(), Some("Passwords do not match"));
    }

    #[test]
    fn domain_failure_keeps_dialog_open_with_server_text() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_reset_password("jdoe");
        type_into(&mut app, "s3cret", "s3cret");
        app.submit_reset_password();
        let effects = app.take_effects();
        let request = written(&effects)[0].clone();
        assert_eq!(result_text(&app).as_deref(), Some("Resetting password..."));

        app.apply_outcome(
            crate::app::Outcome::Written {
                request,
                result: Ok(ActionReply { success: false, message: Some("X".into()) }),
            },
            now,
        );
        assert_eq!(result_text(&app).as_deref(), Some("X"));
        assert!(app.pending_close.is_none());
        app.tick(now + Duration::from_secs(10));
        assert!(app.modal.is_some());
    }

    #[test]
    fn successful_toggle_closes_and_refetches_users_once() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_toggle_user("jdoe", false);
        app.submit_toggle_user();
        assert_eq!(result_text(&app).as_deref(), Some("Enabling user..."));
        let effects = app.take_effects();
        let request = written(&effects)[0].clone();
        assert_eq!(
            request,
            WriteRequest::SetEnabled { username: "jdoe".into(), action: UserAction::Enable }
        );

        app.apply_outcome(
            crate::app::Outcome::Written { request, result: Ok(ActionReply { success: true, message: None }) },
            now,
        );
        assert_eq!(result_text(&app).as_deref(), Some("User enabled successfully"));
        assert!(app.take_effects().is_empty());

        app.tick(now + Duration::from_millis(2000));
        assert!(app.modal.is_none());
        let effects = app.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(&effects[0], Effect::Fetch { target: FetchTarget::Users, .. }));
    }

    #[test]
    fn transport_failure_is_prefixed() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_toggle_user("jdoe", true);
        app.submit_toggle_user();
        let request = written(&app.take_effects())[0].clone();
        app.apply_outcome(
            crate::app::Outcome::Written {
                request,
                result: Err(ApiError::Transport("Network error: connection refused".into())),
            },
            now,
        );
        assert_eq!(result_text(&app).as_deref(), Some("Error: Network error: connection refused"));
    }

    #[test]
    fn duplicate_submit_is_ignored_while_in_flight() {
        let mut app = AppState::default();
        app.open_toggle_user("jdoe", true);
        app.submit_toggle_user();
        app.submit_toggle_user();
        assert_eq!(written(&app.take_effects()).len(), 1);
    }

    #[test]
    fn member_removal_confirms_then_refetches_members_and_groups() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_group_members("Admins");
        let token = match &app.take_effects()[0] {
            Effect::Fetch { token, .. } => *token,
            other => panic!("unexpected {other:?}"),
        };
        let dn = "CN=John Doe,OU=Users,DC=corp,DC=local".to_string();
        app.apply_outcome(
            crate::app::Outcome::GroupMembers { group: "Admins".into(), token, result: Ok(vec![dn.clone()]) },
            now,
        );

        app.request_member_removal();
        assert!(app.take_effects().is_empty(), "nothing sent before confirmation");
        app.confirm_member_removal();
        let effects = app.take_effects();
        let request = written(&effects)[0].clone();
        assert_eq!(request, WriteRequest::RemoveMember { group: "Admins".into(), dn });
        assert_eq!(result_text(&app).as_deref(), Some("Removing..."));

        app.apply_outcome(
            crate::app::Outcome::Written { request, result: Ok(ActionReply { success: true, message: None }) },
            now,
        );
        assert!(matches!(app.modal, Some(ModalState::GroupMembers(_))));
        assert_eq!(
            app.notifier.current().map(|n| n.message.as_str()),
            Some("Member removed from group")
        );
        let targets: Vec<_> = app
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Fetch { target, .. } => Some(target),
                _ => None,
            })
            .collect();
        assert_eq!(
            targets,
            vec![FetchTarget::GroupMembers { group: "Admins".into() }, FetchTarget::Groups]
        );
    }

    #[test]
    fn cancelled_removal_sends_nothing() {
        let mut app = AppState::default();
        app.open_group_members("Admins");
        app.take_effects();
        app.request_member_removal();
        app.cancel_member_removal();
        app.confirm_member_removal();
        assert!(app.take_effects().is_empty());
    }

    fn users_fetches(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| matches!(e, Effect::Fetch { target: FetchTarget::Users, .. })).count()
    }

    #[test]
    fn toggle_success_after_dialog_closed_still_reloads_users_once() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_toggle_user("jdoe", true);
        app.submit_toggle_user();
        let request = written(&app.take_effects())[0].clone();
        app.close_modal(crate::app::modal::CloseReason::CloseButton);

        app.apply_outcome(
            crate::app::Outcome::Written { request, result: Ok(ActionReply { success: true, message: None }) },
            now,
        );
        assert_eq!(
            app.notifier.current().map(|n| n.message.as_str()),
            Some("User disabled successfully")
        );
        app.tick(now + Duration::from_secs(5));
        assert_eq!(users_fetches(&app.take_effects()), 1);
        assert!(app.pending_close.is_none());
    }

    #[test]
    fn reset_reply_for_previous_user_leaves_new_dialog_alone() {
        let now = Instant::now();
        let mut app = AppState::default();
        app.open_reset_password("jdoe");
        type_into(&mut app, "s3cret", "s3cret");
        app.submit_reset_password();
        let request = written(&app.take_effects())[0].clone();
        app.open_reset_password("asmith");

        app.apply_outcome(
            crate::app::Outcome::Written { request, result: Ok(ActionReply { success: true, message: None }) },
            now,
        );
        assert_eq!(result_text(&app), None);
        assert!(app.pending_close.is_none());
        app.tick(now + Duration::from_secs(5));
        assert!(matches!(&app.modal, Some(ModalState::ResetPassword(f)) if f.username == "asmith"));
        assert_eq!(users_fetches(&app.take_effects()), 1);
    }
}
