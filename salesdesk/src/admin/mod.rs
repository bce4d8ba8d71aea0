use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::response::SetResponseHeaderLayer;

use crate::cache::ViewCache;
use crate::config::Settings;
use crate::deletion::{ConfirmError, DeletionError, DeletionStore};
use crate::editor::MutationError;
use crate::gateway::{Gateway, GatewayError};

pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod dto;
pub mod jwt;
pub mod signup_handlers;
pub mod target_handlers;

// ---------- shared state ----------

#[derive(Clone)]
pub struct AdminState {
    pub gateway: Arc<dyn Gateway>,
    pub cache: Arc<ViewCache>,
    /// Pending and running deletions, one per admin.
    pub deletions: Arc<DeletionStore>,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
}

impl AdminState {
    pub fn new(gateway: Arc<dyn Gateway>, settings: &Settings) -> Self {
        Self {
            gateway,
            cache: ViewCache::new(),
            deletions: Arc::new(DeletionStore::new()),
            jwt_secret: settings.jwt_secret.clone(),
            jwt_audience: settings.jwt_audience.clone(),
        }
    }
}

// ---------- error type ----------

/// A JSON error response: `{"error": "..."}` with an HTTP status.
#[derive(Debug)]
pub struct ApiErr(StatusCode, String);

impl ApiErr {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self(status, msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusCode::CONFLICT, msg.into())
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }
}

/// No matching row is a 404, a store refusal a 422, anything else from the
/// store a 502.
pub fn gateway_status(e: &GatewayError) -> StatusCode {
    match e {
        GatewayError::NoMatchingRow { .. } => StatusCode::NOT_FOUND,
        GatewayError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GatewayError::Db(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<MutationError> for ApiErr {
    fn from(e: MutationError) -> Self {
        Self(gateway_status(&e.source), e.user_message())
    }
}

impl From<DeletionError> for ApiErr {
    fn from(e: DeletionError) -> Self {
        Self::conflict(e.to_string())
    }
}

impl From<ConfirmError> for ApiErr {
    fn from(e: ConfirmError) -> Self {
        match e {
            ConfirmError::Workflow(e) => e.into(),
            ConfirmError::Failed(f) => Self(gateway_status(&f.source), f.user_message()),
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.1 });
        (self.0, Json(body)).into_response()
    }
}

// ---------- router ----------

pub fn admin_router(state: AdminState, settings: &Settings) -> Router {
    let allowed_origins: Vec<HeaderValue> = settings
        .cors_allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new() // no origins allowed = same-origin only
    } else {
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    let mut router = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/api/v1", api_v1());

    if let Some(dir) = &settings.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .with_state(state)
}

fn api_v1() -> Router<AdminState> {
    Router::new()
        .route("/me", get(auth_handlers::me))
        // signups
        .route("/roles", get(signup_handlers::role_options))
        .route("/signups", get(signup_handlers::list_signups))
        .route("/signups/{id}/role", put(signup_handlers::set_role))
        .route("/signups/{id}/approval", put(signup_handlers::set_approval))
        .route("/signups/{id}/delete", post(signup_handlers::request_delete))
        .route(
            "/signups/delete",
            get(signup_handlers::deletion_state).delete(signup_handlers::cancel_delete),
        )
        .route(
            "/signups/delete/confirm",
            post(signup_handlers::confirm_delete),
        )
        // targets
        .route("/team-leaders", get(target_handlers::list_team_leaders))
        .route(
            "/team-leaders/{id}/target",
            put(target_handlers::set_team_leader_target),
        )
        .route(
            "/distribution-executives",
            get(target_handlers::list_distribution_executives),
        )
        .route(
            "/distribution-executives/{id}/target",
            put(target_handlers::set_distribution_executive_target),
        )
        // dashboard
        .route("/dashboard", get(dashboard_handlers::dashboard))
}
