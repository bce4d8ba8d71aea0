use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::editor::Editor;
use crate::reader::{self, DistributionExecutiveView, TeamLeaderView};

use super::{
    AdminState, ApiErr,
    dto::{SetTargetRequest, TargetResponse},
    jwt::AdminClaims,
};

pub async fn list_team_leaders(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
) -> Json<Vec<TeamLeaderView>> {
    let gateway = state.gateway.as_ref();
    let rows = state.cache.team_leaders(|| reader::team_leaders(gateway)).await;
    Json(rows.as_ref().clone())
}

pub async fn set_team_leader_target(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetTargetRequest>,
) -> Result<Json<TargetResponse>, ApiErr> {
    let outcome = Editor::new(state.gateway.as_ref(), &state.cache)
        .set_team_leader_target(id, body.target)
        .await?;
    Ok(Json(TargetResponse::team_leader(outcome)))
}

pub async fn list_distribution_executives(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
) -> Json<Vec<DistributionExecutiveView>> {
    let rows = state
        .cache
        .distribution_executives(|| async { Ok(reader::distribution_executives()) })
        .await;
    Json(rows.as_ref().clone())
}

pub async fn set_distribution_executive_target(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetTargetRequest>,
) -> Json<TargetResponse> {
    let outcome = Editor::new(state.gateway.as_ref(), &state.cache)
        .set_distribution_executive_target(id, body.target)
        .await;
    Json(TargetResponse::distribution_executive(outcome))
}
