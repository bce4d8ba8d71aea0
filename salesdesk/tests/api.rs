//! End-to-end tests for the admin REST API.
//!
//! Each test builds the full router over a fresh in-memory SQLite store with
//! migrations applied, seeds rows through the entities, and drives requests
//! with bearer tokens signed by the test secret.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use migration::MigratorTrait as _;
use salesdesk::admin::{AdminState, admin_router, jwt};
use salesdesk::config::Settings;
use salesdesk::entity::{dsr, profile, region, sale, stock, team, team_leader, user_role};
use salesdesk::gateway::SeaGateway;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "integration-secret-key-32-chars!";
const AUDIENCE: &str = "authenticated";

struct App {
    db: DatabaseConnection,
    router: Router,
}

impl App {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let settings = Settings::from_lookup(|k| match k {
            "SD_JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "SD_JWT_AUDIENCE" => Some(AUDIENCE.to_string()),
            _ => None,
        });
        let state = AdminState::new(Arc::new(SeaGateway::new(db.clone())), &settings);
        let router = admin_router(state, &settings);
        Self { db, router }
    }

    async fn call(&self, method: Method, uri: &str, caller: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = caller {
            builder = builder.header("Authorization", format!("Bearer {}", token(user, AUDIENCE)));
        }
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn profile(&self, name: &str, age_minutes: i64, region_id: Option<Uuid>) -> Uuid {
        let id = Uuid::now_v7();
        let created = Utc::now().naive_utc() - Duration::minutes(age_minutes);
        profile::ActiveModel {
            id: Set(id),
            full_name: Set(name.to_string()),
            email: Set(format!("{}@example.com", name.to_lowercase())),
            phone: Set(None),
            region_id: Set(region_id),
            is_approved: Set(false),
            created_at: Set(created),
            updated_at: Set(created),
        }
        .insert(&self.db)
        .await
        .unwrap();
        id
    }

    async fn role(&self, user_id: Uuid, role: &str) {
        user_role::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    async fn admin(&self) -> Uuid {
        let id = self.profile("Admin", 1000, None).await;
        self.role(id, "admin").await;
        id
    }

    async fn region(&self, name: &str, code: &str) -> Uuid {
        let id = Uuid::now_v7();
        region::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await
        .unwrap();
        id
    }

    async fn team_leader(&self, user_id: Uuid, region_id: Option<Uuid>) -> Uuid {
        let id = Uuid::now_v7();
        team_leader::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            region_id: Set(region_id),
            monthly_target: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await
        .unwrap();
        id
    }
}

fn token(user_id: Uuid, aud: &str) -> String {
    let claims = jwt::Claims {
        sub: user_id,
        email: Some("caller@example.com".to_string()),
        aud: Some(aud.to_string()),
        exp: (Utc::now().timestamp() as u64) + 3600,
    };
    jwt::encode_jwt(&claims, JWT_SECRET).unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = App::new().await;
    let (status, _) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_audience_is_unauthorized() {
    let app = App::new().await;
    let admin = app.admin().await;

    let req = Request::get("/api/v1/signups")
        .header("Authorization", format!("Bearer {}", token(admin, "anon")))
        .body(Body::empty())
        .unwrap();
    let res = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_works_for_any_authenticated_user() {
    let app = App::new().await;
    let user = app.profile("Juma", 1, None).await;

    let (status, body) = app.call(Method::GET, "/api/v1/me", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.to_string());
    assert_eq!(body["email"], "caller@example.com");
    assert_eq!(body["role"]["role"], "dsr");
    assert_eq!(body["role"]["badge"], "bg-orange/10 text-orange");

    let (status, _) = app.call(Method::GET, "/api/v1/signups", Some(user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signup_management_flow() {
    let app = App::new().await;
    let admin = app.admin().await;
    let arusha = app.region("Arusha", "ARU").await;
    let asha = app.profile("Asha", 5, Some(arusha)).await;
    app.role(asha, "dsr").await;
    let juma = app.profile("Juma", 1, None).await;

    let (status, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![juma.to_string(), asha.to_string(), admin.to_string()]);
    assert_eq!(body[1]["region_name"], "Arusha");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/v1/signups/{asha}/role"),
            Some(admin),
            Some(json!({ "role": "tl" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/v1/signups/{asha}/approval"),
            Some(admin),
            Some(json!({ "is_approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    assert_eq!(body[1]["role"], "tl");
    assert_eq!(body[1]["role_badge"]["label"], "Team Leader");
    assert_eq!(body[1]["is_approved"], true);

    // juma has no role row, so the update matches nothing
    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/signups/{juma}/role"),
            Some(admin),
            Some(json!({ "role": "manager" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("user_roles"));

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/signups/{asha}/role"),
            Some(admin),
            Some(json!({ "role": "owner" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deletion_is_two_step() {
    let app = App::new().await;
    let admin = app.admin().await;
    let asha = app.profile("Asha", 5, None).await;
    app.role(asha, "dsr").await;

    let (status, _) = app
        .call(Method::POST, "/api/v1/signups/delete/confirm", Some(admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(Method::POST, &format!("/api/v1/signups/{asha}/delete"), Some(admin), None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["state"], "confirm_pending");

    let (_, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2, "still listed before confirm");

    let (status, _) = app
        .call(Method::POST, "/api/v1/signups/delete/confirm", Some(admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![admin.to_string()]);
}

#[tokio::test]
async fn rows_written_outside_the_api_show_on_next_list() {
    let app = App::new().await;
    let admin = app.admin().await;

    let (_, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = app.call(Method::GET, "/api/v1/team-leaders", Some(admin), None).await;
    assert_eq!(body, json!([]));

    // signup and team-leader provisioning happen in other services
    let juma = app.profile("Juma", 1, None).await;
    let tl = app.team_leader(juma, None).await;

    let (_, body) = app.call(Method::GET, "/api/v1/signups", Some(admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], juma.to_string());

    let (_, body) = app.call(Method::GET, "/api/v1/team-leaders", Some(admin), None).await;
    assert_eq!(body[0]["id"], tl.to_string());
}

#[tokio::test]
async fn role_options_for_the_editor() {
    let app = App::new().await;
    let admin = app.admin().await;
    let dsr_user = app.profile("Juma", 1, None).await;

    let (status, body) = app.call(Method::GET, "/api/v1/roles", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let tokens: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["role"].as_str().unwrap())
        .collect();
    assert_eq!(tokens, vec!["admin", "manager", "tl", "dsr"]);

    let (status, _) = app.call(Method::GET, "/api/v1/roles", Some(dsr_user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn team_leaders_and_targets() {
    let app = App::new().await;
    let admin = app.admin().await;
    let mwanza = app.region("Mwanza", "MWZ").await;
    let neema = app.profile("Neema", 10, None).await;
    let tl = app.team_leader(neema, Some(mwanza)).await;

    team::ActiveModel {
        id: Set(Uuid::now_v7()),
        tl_id: Set(tl),
        name: Set("Lake Zone".to_string()),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&app.db)
    .await
    .unwrap();
    for _ in 0..3 {
        dsr::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(None),
            tl_id: Set(Some(tl)),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&app.db)
        .await
        .unwrap();
    }

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/team-leaders/{tl}/target"),
            Some(admin),
            Some(json!({ "target": 5000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "persisted");

    let (_, body) = app.call(Method::GET, "/api/v1/team-leaders", Some(admin), None).await;
    assert_eq!(body[0]["full_name"], "Neema");
    assert_eq!(body[0]["region_name"], "Mwanza");
    assert_eq!(body[0]["monthly_target"], 5000.0);
    assert_eq!(body[0]["team_count"], 1);
    assert_eq!(body[0]["dsr_count"], 3);
    assert_eq!(body[0]["sales_count"], 0);

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/distribution-executives/{}/target", Uuid::now_v7()),
            Some(admin),
            Some(json!({ "target": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "not_persisted");

    let (_, body) = app
        .call(Method::GET, "/api/v1/distribution-executives", Some(admin), None)
        .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn dashboard_snapshot() {
    let app = App::new().await;
    let admin = app.admin().await;
    let aru = app.region("Arusha", "ARU").await;
    app.region("Dodoma", "DOD").await;

    for (approved, price) in [(true, Some(100.0)), (false, None), (true, Some(50.0))] {
        sale::ActiveModel {
            id: Set(Uuid::now_v7()),
            tl_id: Set(None),
            region_id: Set(Some(aru)),
            sale_type: Set("direct".to_string()),
            payment_status: Set("paid".to_string()),
            admin_approved: Set(approved),
            sale_price: Set(price),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&app.db)
        .await
        .unwrap();
    }
    for (kind, status) in [("sim", "sold_a"), ("sim", "in_stock"), ("router", "reserved"), ("router", "sold_b")] {
        stock::ActiveModel {
            id: Set(Uuid::now_v7()),
            stock_type: Set(kind.to_string()),
            status: Set(status.to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&app.db)
        .await
        .unwrap();
    }

    let (status, body) = app.call(Method::GET, "/api/v1/dashboard", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let m = &body["metrics"];
    assert_eq!(m["total_sales"], 3);
    assert_eq!(m["total_revenue"], 150.0);
    assert_eq!(m["approved_sales"], 2);
    assert_eq!(m["pending_sales"], 1);
    assert_eq!(m["total_stock"], 4);
    assert_eq!(m["stock_in_hand"], 2);
    assert_eq!(
        body["stock_by_type"],
        json!([{ "name": "sim", "value": 2 }, { "name": "router", "value": 2 }])
    );
    assert_eq!(
        body["sales_by_region"],
        json!([{ "name": "ARU", "sales": 3 }, { "name": "DOD", "sales": 0 }])
    );
}
