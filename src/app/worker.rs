//! Runs effects against the backend on the tokio runtime and reports back
//! over a channel drained by the UI loop.
//!
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::DirectoryApi;
use crate::api::model::UserUpdate;
use crate::app::{Effect, FetchTarget, Outcome, WriteRequest};

pub struct Worker {
    handle: Handle,
    api: Arc<dyn DirectoryApi>,
    tx: UnboundedSender<Outcome>,
}

impl Worker {
    pub fn new(handle: Handle, api: Arc<dyn DirectoryApi>, tx: UnboundedSender<Outcome>) -> Self {
        Self { handle, api, tx }
    }

    /// Spawn the effect; the outcome arrives on the channel when done.
    pub fn dispatch(&self, effect: Effect) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let outcome = execute(api.as_ref(), effect).await;
            if tx.send(outcome).is_err() {
                tracing::debug!("ui loop gone; dropping outcome");
            }
        });
    }
}

pub async fn execute(api: &dyn DirectoryApi, effect: Effect) -> Outcome {
    match effect {
        Effect::Login { email, password } => Outcome::LoggedIn(api.login(&email, &password).await),
        Effect::Fetch { target, token } => match target {
            FetchTarget::Dashboard => Outcome::Dashboard { token, result: api.dashboard().await },
            FetchTarget::Users => Outcome::Users { token, result: api.list_users().await },
            FetchTarget::Groups => Outcome::Groups { token, result: api.list_groups().await },
            FetchTarget::Computers => Outcome::Computers {
                token,
                result: api.dashboard().await.map(|summary| summary.computer_details),
            },
            FetchTarget::GroupMembers { group } => {
                let result = api.group_members(&group).await;
                Outcome::GroupMembers { group, token, result }
            }
        },
        Effect::Write(request) => {
            let result = match &request {
                WriteRequest::ResetPassword { username, password } => {
                    let update = UserUpdate::ResetPassword { password: password.clone() };
                    api.update_user(username, &update).await
                }
                WriteRequest::SetEnabled { username, action } => {
                    api.update_user(username, &UserUpdate::from(*action)).await
                }
                WriteRequest::RemoveMember { group, dn } => api.remove_group_member(group, dn).await,
            };
            Outcome::Written { request, result }
        }
    }
}
