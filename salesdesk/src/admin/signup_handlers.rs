use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::deletion::DeletionState;
use crate::editor::Editor;
use crate::reader::{self, SignupView};
use crate::role::{Role, RoleBadge};

use super::{
    AdminState, ApiErr,
    dto::{SetApprovalRequest, SetRoleRequest},
    jwt::AdminClaims,
};

pub async fn list_signups(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
) -> Json<Vec<SignupView>> {
    let gateway = state.gateway.as_ref();
    let rows = state.cache.signups(|| reader::signups(gateway)).await;
    Json(rows.as_ref().clone())
}

/// Roles the role editor offers, in display order.
pub async fn role_options(AdminClaims(_): AdminClaims) -> Json<Vec<RoleBadge>> {
    Json(Role::editable().map(RoleBadge::from).collect())
}

pub async fn set_role(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetRoleRequest>,
) -> Result<StatusCode, ApiErr> {
    Editor::new(state.gateway.as_ref(), &state.cache)
        .set_role(id, &body.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_approval(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetApprovalRequest>,
) -> Result<StatusCode, ApiErr> {
    Editor::new(state.gateway.as_ref(), &state.cache)
        .set_approval(id, body.is_approved)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a signup for deletion. Nothing is deleted until the same admin
/// confirms.
pub async fn request_delete(
    AdminClaims(claims): AdminClaims,
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<DeletionState>), ApiErr> {
    // Guard: an admin cannot remove their own account.
    if id == claims.sub {
        return Err(ApiErr::conflict("Cannot delete your own account"));
    }

    state.deletions.request(claims.sub, id)?;
    Ok((StatusCode::ACCEPTED, Json(state.deletions.state(claims.sub))))
}

pub async fn deletion_state(
    AdminClaims(claims): AdminClaims,
    State(state): State<AdminState>,
) -> Json<DeletionState> {
    Json(state.deletions.state(claims.sub))
}

pub async fn confirm_delete(
    AdminClaims(claims): AdminClaims,
    State(state): State<AdminState>,
) -> Result<StatusCode, ApiErr> {
    state
        .deletions
        .confirm(claims.sub, state.gateway.as_ref(), &state.cache)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_delete(
    AdminClaims(claims): AdminClaims,
    State(state): State<AdminState>,
) -> Result<StatusCode, ApiErr> {
    state.deletions.cancel(claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}
