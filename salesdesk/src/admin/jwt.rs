use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

use super::AdminState;

/// Claims of an access token issued by the hosted auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (UUID, stored as string in JWT)
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Unix timestamp expiry
    pub exp: u64,
}

pub fn encode_jwt(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// Validate signature and expiry. The audience is only checked when one is
/// configured.
pub fn decode_jwt(
    token: &str,
    secret: &str,
    audience: Option<&str>,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)?;
    Ok(data.claims)
}

fn extract_bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn claims_from_parts(parts: &Parts, state: &AdminState) -> Result<Claims, (StatusCode, &'static str)> {
    let token = extract_bearer(parts).ok_or((
        StatusCode::UNAUTHORIZED,
        "Missing or invalid Authorization header",
    ))?;

    decode_jwt(token, &state.jwt_secret, state.jwt_audience.as_deref())
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

/// Extractor: validates Bearer token, requires the caller's stored role to be
/// `admin`.
pub struct AdminClaims(pub Claims);

impl<S> FromRequestParts<S> for AdminClaims
where
    S: Send + Sync,
    AdminState: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AdminState::from_ref(state);
        let claims = claims_from_parts(parts, &state)?;

        let role = state.gateway.role_of(claims.sub).await.map_err(|e| {
            tracing::warn!(user_id = %claims.sub, error = %e, "role lookup failed");
            (StatusCode::BAD_GATEWAY, "Failed to look up role")
        })?;

        if role.as_deref() != Some(Role::Admin.as_token()) {
            return Err((StatusCode::FORBIDDEN, "Admin access required"));
        }

        Ok(AdminClaims(claims))
    }
}

/// Extractor: validates Bearer token (any authenticated user).
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
    AdminState: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AdminState::from_ref(state);
        Ok(AuthClaims(claims_from_parts(parts, &state)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-jwt-secret-key-32-chars-pad";

    fn claims(aud: Option<&str>, exp_offset: i64) -> Claims {
        Claims {
            sub: Uuid::now_v7(),
            email: None,
            aud: aud.map(String::from),
            exp: (Utc::now().timestamp() + exp_offset) as u64,
        }
    }

    #[test]
    fn round_trips_without_audience() {
        let c = claims(Some("authenticated"), 3600);
        let token = encode_jwt(&c, SECRET).unwrap();
        assert_eq!(decode_jwt(&token, SECRET, None).unwrap().sub, c.sub);
    }

    #[test]
    fn audience_enforced_when_configured() {
        let token = encode_jwt(&claims(Some("other"), 3600), SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET, Some("authenticated")).is_err());

        let token = encode_jwt(&claims(Some("authenticated"), 3600), SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET, Some("authenticated")).is_ok());
    }

    #[test]
    fn rejects_wrong_secret_and_expired() {
        let token = encode_jwt(&claims(None, 3600), SECRET).unwrap();
        assert!(decode_jwt(&token, "another-secret", None).is_err());

        let token = encode_jwt(&claims(None, -3600), SECRET).unwrap();
        assert!(decode_jwt(&token, SECRET, None).is_err());
    }
}
