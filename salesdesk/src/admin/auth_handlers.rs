use axum::{extract::State, response::Json};

use crate::role::Role;

use super::{
    AdminState, ApiErr, dto::MeResponse, gateway_status, jwt::AuthClaims,
};

/// The caller's id and role. Open to any authenticated user so the UI can
/// decide which screens to show; a user without a role row reads as `dsr`.
pub async fn me(
    AuthClaims(claims): AuthClaims,
    State(state): State<AdminState>,
) -> Result<Json<MeResponse>, ApiErr> {
    let stored = state
        .gateway
        .role_of(claims.sub)
        .await
        .map_err(|e| ApiErr::new(gateway_status(&e), e.message()))?;

    Ok(Json(MeResponse {
        id: claims.sub,
        email: claims.email,
        role: Role::from_stored(stored.as_deref()).into(),
    }))
}
