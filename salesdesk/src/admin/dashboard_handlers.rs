use axum::{extract::State, response::Json};

use crate::dashboard::{self, DashboardSnapshot};

use super::{AdminState, jwt::AdminClaims};

pub async fn dashboard(
    AdminClaims(_): AdminClaims,
    State(state): State<AdminState>,
) -> Json<DashboardSnapshot> {
    Json(dashboard::snapshot(state.gateway.as_ref()).await)
}
