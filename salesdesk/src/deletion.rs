//! Two-step user deletion: an admin marks a signup for deletion, then
//! confirms. Confirmation removes the role row and then the profile row.

use std::fmt;

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::{QueryKey, ViewCache};
use crate::gateway::{Gateway, GatewayError};

pub const DELETE_FALLBACK: &str = "Failed to delete user";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeletionState {
    #[default]
    Idle,
    ConfirmPending {
        user_id: Uuid,
    },
    Deleting {
        user_id: Uuid,
    },
}

/// An illegal workflow transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeletionError {
    #[error("A deletion is already in progress")]
    InProgress,
    #[error("No deletion is awaiting confirmation")]
    NothingPending,
    #[error("No deletion is in progress")]
    NotDeleting,
}

#[derive(Debug, Default, Clone)]
pub struct DeletionWorkflow {
    state: DeletionState,
}

impl DeletionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeletionState {
        self.state
    }

    /// Mark `user_id` for deletion. Replaces an earlier pending target.
    pub fn request(&mut self, user_id: Uuid) -> Result<(), DeletionError> {
        match self.state {
            DeletionState::Deleting { .. } => Err(DeletionError::InProgress),
            _ => {
                self.state = DeletionState::ConfirmPending { user_id };
                Ok(())
            }
        }
    }

    /// Drop the pending target. Cancelling while idle is a no-op.
    pub fn cancel(&mut self) -> Result<(), DeletionError> {
        match self.state {
            DeletionState::Deleting { .. } => Err(DeletionError::InProgress),
            _ => {
                self.state = DeletionState::Idle;
                Ok(())
            }
        }
    }

    /// Confirm the pending target and return it.
    pub fn begin(&mut self) -> Result<Uuid, DeletionError> {
        match self.state {
            DeletionState::ConfirmPending { user_id } => {
                self.state = DeletionState::Deleting { user_id };
                Ok(user_id)
            }
            DeletionState::Deleting { .. } => Err(DeletionError::InProgress),
            DeletionState::Idle => Err(DeletionError::NothingPending),
        }
    }

    /// Return to idle once the delete calls have settled, successfully or not.
    pub fn finish(&mut self) -> Result<(), DeletionError> {
        match self.state {
            DeletionState::Deleting { .. } => {
                self.state = DeletionState::Idle;
                Ok(())
            }
            _ => Err(DeletionError::NotDeleting),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStep {
    Role,
    Profile,
}

impl fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionStep::Role => f.write_str("role"),
            DeletionStep::Profile => f.write_str("profile"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to delete {step} row: {source}")]
pub struct DeletionFailure {
    pub step: DeletionStep,
    #[source]
    pub source: GatewayError,
}

impl DeletionFailure {
    pub fn user_message(&self) -> String {
        let msg = self.source.message();
        if msg.trim().is_empty() {
            DELETE_FALLBACK.to_string()
        } else {
            msg
        }
    }
}

/// Delete the role row, then the profile row, for `user_id`.
///
/// A failed role delete stops before the profile is touched. A failed
/// profile delete leaves the role already gone; nothing is restored. The
/// user's auth identity lives outside the store and is left alone.
pub async fn delete_user(
    gateway: &dyn Gateway,
    cache: &ViewCache,
    user_id: Uuid,
) -> Result<(), DeletionFailure> {
    if let Err(source) = gateway.delete_role(user_id).await {
        tracing::warn!(user_id = %user_id, error = %source, "role delete failed");
        return Err(DeletionFailure {
            step: DeletionStep::Role,
            source,
        });
    }

    let result = gateway.delete_profile(user_id).await;

    // The role row is gone either way.
    cache.invalidate(QueryKey::Signups).await;
    cache.invalidate(QueryKey::TeamLeaders).await;

    match result {
        Ok(()) => {
            tracing::info!(user_id = %user_id, "user deleted");
            Ok(())
        }
        Err(source) => {
            tracing::error!(
                user_id = %user_id,
                error = %source,
                "profile delete failed after role was removed"
            );
            Err(DeletionFailure {
                step: DeletionStep::Profile,
                source,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error(transparent)]
    Workflow(#[from] DeletionError),
    #[error(transparent)]
    Failed(#[from] DeletionFailure),
}

/// Deletion workflows keyed by the admin driving them.
#[derive(Debug, Default)]
pub struct DeletionStore {
    workflows: DashMap<Uuid, DeletionWorkflow>,
}

impl DeletionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, admin_id: Uuid) -> DeletionState {
        self.workflows
            .get(&admin_id)
            .map(|wf| wf.state())
            .unwrap_or_default()
    }

    pub fn request(&self, admin_id: Uuid, user_id: Uuid) -> Result<(), DeletionError> {
        self.workflows
            .entry(admin_id)
            .or_default()
            .request(user_id)
    }

    pub fn cancel(&self, admin_id: Uuid) -> Result<(), DeletionError> {
        match self.workflows.get_mut(&admin_id) {
            Some(mut wf) => wf.cancel(),
            None => Ok(()),
        }
    }

    /// Run the confirmed deletion for `admin_id`'s pending target.
    ///
    /// The workflow returns to idle whether or not the delete succeeded.
    pub async fn confirm(
        &self,
        admin_id: Uuid,
        gateway: &dyn Gateway,
        cache: &ViewCache,
    ) -> Result<Uuid, ConfirmError> {
        let user_id = {
            let mut wf = self
                .workflows
                .get_mut(&admin_id)
                .ok_or(DeletionError::NothingPending)?;
            wf.begin()?
        };

        let result = delete_user(gateway, cache, user_id).await;

        if let Some(mut wf) = self.workflows.get_mut(&admin_id) {
            if let Err(e) = wf.finish() {
                tracing::debug!(admin_id = %admin_id, error = %e, "workflow already settled");
            }
        }

        result?;
        Ok(user_id)
    }
}
