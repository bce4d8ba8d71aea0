//! Role & approval editor: single-field mutations against the gateway, each
//! followed by invalidation of the cached views it affects.

use serde::Serialize;
use uuid::Uuid;

use crate::cache::{QueryKey, ViewCache};
use crate::gateway::{Gateway, GatewayError};

pub const ROLE_FALLBACK: &str = "Failed to update role";
pub const APPROVAL_FALLBACK: &str = "Failed to update approval";
pub const TARGET_FALLBACK: &str = "Failed to set target";

/// A rejected mutation. Nothing was applied locally, so there is nothing to
/// roll back; the caller shows [`MutationError::user_message`].
#[derive(Debug, thiserror::Error)]
#[error("{fallback}: {source}")]
pub struct MutationError {
    #[source]
    pub source: GatewayError,
    fallback: &'static str,
}

impl MutationError {
    fn new(source: GatewayError, fallback: &'static str) -> Self {
        Self { source, fallback }
    }

    /// The gateway's message, or the operation's generic fallback when the
    /// gateway gave none.
    pub fn user_message(&self) -> String {
        let msg = self.source.message();
        if msg.trim().is_empty() {
            self.fallback.to_string()
        } else {
            msg
        }
    }
}

/// Result of a target write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOutcome {
    Persisted,
    /// Accepted but written nowhere: the entity has no backing store yet.
    NotPersisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    TeamLeader,
    DistributionExecutive,
}

/// Which row is in edit mode and its draft value.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSelection<T> {
    editing: Option<(Uuid, T)>,
}

impl<T> Default for EditSelection<T> {
    fn default() -> Self {
        Self { editing: None }
    }
}

impl<T> EditSelection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter edit mode for `id`, seeding the draft with the current value.
    /// Replaces any other row being edited.
    pub fn begin(&mut self, id: Uuid, current: T) {
        self.editing = Some((id, current));
    }

    /// Update the draft; ignored when nothing is being edited.
    pub fn set_draft(&mut self, value: T) {
        if let Some((_, draft)) = self.editing.as_mut() {
            *draft = value;
        }
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }

    pub fn editing_id(&self) -> Option<Uuid> {
        self.editing.as_ref().map(|(id, _)| *id)
    }

    pub fn draft(&self) -> Option<&T> {
        self.editing.as_ref().map(|(_, draft)| draft)
    }

    pub fn is_editing(&self, id: Uuid) -> bool {
        self.editing_id() == Some(id)
    }
}

pub struct Editor<'a> {
    gateway: &'a dyn Gateway,
    cache: &'a ViewCache,
}

impl<'a> Editor<'a> {
    pub fn new(gateway: &'a dyn Gateway, cache: &'a ViewCache) -> Self {
        Self { gateway, cache }
    }

    /// Write `role` for `user_id`. The token goes to the gateway as-is; the
    /// store decides whether it is a legal role.
    pub async fn set_role(&self, user_id: Uuid, role: &str) -> Result<(), MutationError> {
        if let Err(e) = self.gateway.update_role(user_id, role).await {
            tracing::warn!(user_id = %user_id, role, error = %e, "role update failed");
            return Err(MutationError::new(e, ROLE_FALLBACK));
        }

        tracing::info!(user_id = %user_id, role, "role updated");
        self.cache.invalidate(QueryKey::Signups).await;
        Ok(())
    }

    pub async fn set_approval(&self, user_id: Uuid, approved: bool) -> Result<(), MutationError> {
        if let Err(e) = self.gateway.update_approval(user_id, approved).await {
            tracing::warn!(user_id = %user_id, approved, error = %e, "approval update failed");
            return Err(MutationError::new(e, APPROVAL_FALLBACK));
        }

        tracing::info!(user_id = %user_id, approved, "approval updated");
        // Approval shows on both lists.
        self.cache.invalidate(QueryKey::Signups).await;
        self.cache.invalidate(QueryKey::TeamLeaders).await;
        Ok(())
    }

    pub async fn set_team_leader_target(
        &self,
        tl_id: Uuid,
        target: f64,
    ) -> Result<TargetOutcome, MutationError> {
        if let Err(e) = self.gateway.update_team_leader_target(tl_id, target).await {
            tracing::warn!(tl_id = %tl_id, target, error = %e, "team leader target update failed");
            return Err(MutationError::new(e, TARGET_FALLBACK));
        }

        tracing::info!(tl_id = %tl_id, target, "team leader target updated");
        self.cache.invalidate(QueryKey::TeamLeaders).await;
        Ok(TargetOutcome::Persisted)
    }

    /// Always reports [`TargetOutcome::NotPersisted`]: there is no
    /// distribution-executive table to write to.
    pub async fn set_distribution_executive_target(
        &self,
        de_id: Uuid,
        target: f64,
    ) -> TargetOutcome {
        tracing::warn!(
            de_id = %de_id,
            target,
            "distribution executive target accepted but not persisted"
        );
        self.cache.invalidate(QueryKey::DistributionExecutives).await;
        TargetOutcome::NotPersisted
    }

    pub async fn set_target(
        &self,
        kind: TargetKind,
        id: Uuid,
        target: f64,
    ) -> Result<TargetOutcome, MutationError> {
        match kind {
            TargetKind::TeamLeader => self.set_team_leader_target(id, target).await,
            TargetKind::DistributionExecutive => {
                Ok(self.set_distribution_executive_target(id, target).await)
            }
        }
    }

    /// Save the selection's draft role. Clears the selection on success and
    /// leaves it in place on error. Returns `false` when nothing was being
    /// edited.
    pub async fn commit_role(
        &self,
        selection: &mut EditSelection<String>,
    ) -> Result<bool, MutationError> {
        let Some((user_id, role)) = selection.editing.clone() else {
            return Ok(false);
        };
        self.set_role(user_id, &role).await?;
        selection.cancel();
        Ok(true)
    }

    /// Save the selection's draft target. Same selection rules as
    /// [`Editor::commit_role`].
    pub async fn commit_target(
        &self,
        kind: TargetKind,
        selection: &mut EditSelection<f64>,
    ) -> Result<Option<TargetOutcome>, MutationError> {
        let Some((id, target)) = selection.editing else {
            return Ok(None);
        };
        let outcome = self.set_target(kind, id, target).await?;
        selection.cancel();
        Ok(Some(outcome))
    }
}
