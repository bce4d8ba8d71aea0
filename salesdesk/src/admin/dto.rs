use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editor::TargetOutcome;
use crate::role::RoleBadge;

// ---------- requests ----------

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// Raw role token; the store decides whether it is legal.
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetApprovalRequest {
    pub is_approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetTargetRequest {
    pub target: f64,
}

// ---------- responses ----------

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: RoleBadge,
}

#[derive(Debug, Serialize)]
pub struct TargetResponse {
    pub outcome: TargetOutcome,
    pub message: &'static str,
}

impl TargetResponse {
    pub fn team_leader(outcome: TargetOutcome) -> Self {
        Self {
            outcome,
            message: "TL target updated",
        }
    }

    pub fn distribution_executive(outcome: TargetOutcome) -> Self {
        Self {
            outcome,
            message: match outcome {
                TargetOutcome::Persisted => "DE target updated",
                TargetOutcome::NotPersisted => "DE target accepted but not saved",
            },
        }
    }
}
