//! Fixtures shared by the unit tests: an in-memory store with migrations
//! applied, row seeders, and a gateway wrapper that fails chosen calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use migration::MigratorTrait as _;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::admin::{AdminState, jwt};
use crate::config::Settings;
use crate::entity::{dsr, profile, region, sale, stock, team, team_leader, user_role};
use crate::gateway::{
    CountedTable, Gateway, GatewayError, GatewayResult, SaleRow, SeaGateway, StockRow,
};

pub const JWT_SECRET: &str = "test-jwt-secret-key-32-chars-pad";

pub fn settings() -> Settings {
    Settings::from_lookup(|k| match k {
        "SD_JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
}

pub fn admin_state(gateway: Arc<dyn Gateway>) -> AdminState {
    AdminState::new(gateway, &settings())
}

/// Bearer token for `user_id`, valid for an hour.
pub fn token_for(user_id: Uuid) -> String {
    let claims = jwt::Claims {
        sub: user_id,
        email: None,
        aud: Some("authenticated".to_string()),
        exp: (Utc::now().timestamp() as u64) + 3600,
    };
    jwt::encode_jwt(&claims, JWT_SECRET).unwrap()
}

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

fn minutes_ago(minutes: i64) -> NaiveDateTime {
    Utc::now().naive_utc() - Duration::minutes(minutes)
}

pub async fn profile_exists(db: &DatabaseConnection, id: Uuid) -> bool {
    profile::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .is_some()
}

pub async fn role_exists(db: &DatabaseConnection, user_id: Uuid) -> bool {
    SeaGateway::new(db.clone())
        .role_of(user_id)
        .await
        .unwrap()
        .is_some()
}

/// Seeds rows into a fresh in-memory store.
pub struct Seed {
    db: DatabaseConnection,
}

impl Seed {
    pub async fn new() -> Self {
        Self {
            db: setup_db().await,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn gateway(&self) -> SeaGateway {
        SeaGateway::new(self.db.clone())
    }

    pub async fn region(&self, name: &str, code: &str) -> Uuid {
        let id = Uuid::now_v7();
        region::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
        id
    }

    /// Profile created `age_minutes` ago, email derived from the name.
    pub async fn profile(&self, full_name: &str, age_minutes: i64) -> Uuid {
        self.profile_in(full_name, age_minutes, None).await
    }

    pub async fn profile_in(
        &self,
        full_name: &str,
        age_minutes: i64,
        region_id: Option<Uuid>,
    ) -> Uuid {
        let id = Uuid::now_v7();
        let created = minutes_ago(age_minutes);
        profile::ActiveModel {
            id: Set(id),
            full_name: Set(full_name.to_string()),
            email: Set(format!(
                "{}@example.com",
                full_name.to_lowercase().replace(' ', ".")
            )),
            phone: Set(Some("+255700000000".to_string())),
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

    pub async fn approve(&self, user_id: Uuid) {
        self.gateway()
            .update_approval(user_id, true)
            .await
            .unwrap();
    }

    pub async fn role(&self, user_id: Uuid, role: &str) {
        user_role::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    pub async fn team_leader(
        &self,
        user_id: Uuid,
        region_id: Option<Uuid>,
        age_minutes: i64,
    ) -> Uuid {
        let id = Uuid::now_v7();
        team_leader::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            region_id: Set(region_id),
            monthly_target: Set(None),
            created_at: Set(minutes_ago(age_minutes)),
        }
        .insert(&self.db)
        .await
        .unwrap();
        id
    }

    pub async fn team(&self, tl_id: Uuid, name: &str) {
        team::ActiveModel {
            id: Set(Uuid::now_v7()),
            tl_id: Set(tl_id),
            name: Set(name.to_string()),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    pub async fn dsr(&self, tl_id: Option<Uuid>) {
        dsr::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(None),
            tl_id: Set(tl_id),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    pub async fn sale(
        &self,
        tl_id: Option<Uuid>,
        region_id: Option<Uuid>,
        approved: bool,
        price: Option<f64>,
    ) {
        sale::ActiveModel {
            id: Set(Uuid::now_v7()),
            tl_id: Set(tl_id),
            region_id: Set(region_id),
            sale_type: Set("direct".to_string()),
            payment_status: Set("paid".to_string()),
            admin_approved: Set(approved),
            sale_price: Set(price),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    pub async fn stock(&self, stock_type: &str, status: &str) {
        stock::ActiveModel {
            id: Set(Uuid::now_v7()),
            stock_type: Set(stock_type.to_string()),
            status: Set(status.to_string()),
            created_at: Set(minutes_ago(0)),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }
}

/// Gateway calls that [`FaultyGateway`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ListProfiles,
    ProfilesByIds,
    RolesForUsers,
    RegionsByIds,
    ListRegions,
    ListTeamLeaders,
    Count(CountedTable),
    CountRows,
    ListSales,
    ListStock,
    UpdateRole,
    UpdateTarget,
    DeleteRole,
    DeleteProfile,
}

/// Wraps a real gateway; calls named in `faults` fail with
/// [`GatewayError::Rejected`] instead of reaching the store. Every call is
/// recorded so tests can assert on what ran.
pub struct FaultyGateway {
    inner: SeaGateway,
    faults: HashSet<Fault>,
    calls: Mutex<Vec<&'static str>>,
}

impl FaultyGateway {
    pub fn new(inner: SeaGateway, faults: impl IntoIterator<Item = Fault>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            faults: faults.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, fault: Fault, call: &'static str) -> GatewayResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.faults.contains(&fault) {
            Err(GatewayError::Rejected(format!("injected failure in {call}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Gateway for FaultyGateway {
    async fn list_profiles(&self) -> GatewayResult<Vec<profile::Model>> {
        self.check(Fault::ListProfiles, "list_profiles")?;
        self.inner.list_profiles().await
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<profile::Model>> {
        self.check(Fault::ProfilesByIds, "profiles_by_ids")?;
        self.inner.profiles_by_ids(ids).await
    }

    async fn roles_for_users(&self, user_ids: &[Uuid]) -> GatewayResult<Vec<user_role::Model>> {
        self.check(Fault::RolesForUsers, "roles_for_users")?;
        self.inner.roles_for_users(user_ids).await
    }

    async fn role_of(&self, user_id: Uuid) -> GatewayResult<Option<String>> {
        self.calls.lock().unwrap().push("role_of");
        self.inner.role_of(user_id).await
    }

    async fn list_regions(&self) -> GatewayResult<Vec<region::Model>> {
        self.check(Fault::ListRegions, "list_regions")?;
        self.inner.list_regions().await
    }

    async fn regions_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<region::Model>> {
        self.check(Fault::RegionsByIds, "regions_by_ids")?;
        self.inner.regions_by_ids(ids).await
    }

    async fn list_team_leaders(&self) -> GatewayResult<Vec<team_leader::Model>> {
        self.check(Fault::ListTeamLeaders, "list_team_leaders")?;
        self.inner.list_team_leaders().await
    }

    async fn count_by_team_leader(
        &self,
        table: CountedTable,
        tl_ids: &[Uuid],
    ) -> GatewayResult<HashMap<Uuid, u64>> {
        self.check(Fault::Count(table), "count_by_team_leader")?;
        self.inner.count_by_team_leader(table, tl_ids).await
    }

    async fn count_rows(&self, table: CountedTable) -> GatewayResult<u64> {
        self.check(Fault::CountRows, "count_rows")?;
        self.inner.count_rows(table).await
    }

    async fn list_sales(&self) -> GatewayResult<Vec<SaleRow>> {
        self.check(Fault::ListSales, "list_sales")?;
        self.inner.list_sales().await
    }

    async fn list_stock(&self) -> GatewayResult<Vec<StockRow>> {
        self.check(Fault::ListStock, "list_stock")?;
        self.inner.list_stock().await
    }

    async fn update_role(&self, user_id: Uuid, role: &str) -> GatewayResult<()> {
        self.check(Fault::UpdateRole, "update_role")?;
        self.inner.update_role(user_id, role).await
    }

    async fn update_approval(&self, user_id: Uuid, approved: bool) -> GatewayResult<()> {
        self.calls.lock().unwrap().push("update_approval");
        self.inner.update_approval(user_id, approved).await
    }

    async fn update_team_leader_target(&self, tl_id: Uuid, target: f64) -> GatewayResult<()> {
        self.check(Fault::UpdateTarget, "update_team_leader_target")?;
        self.inner.update_team_leader_target(tl_id, target).await
    }

    async fn delete_role(&self, user_id: Uuid) -> GatewayResult<()> {
        self.check(Fault::DeleteRole, "delete_role")?;
        self.inner.delete_role(user_id).await
    }

    async fn delete_profile(&self, user_id: Uuid) -> GatewayResult<()> {
        self.check(Fault::DeleteProfile, "delete_profile")?;
        self.inner.delete_profile(user_id).await
    }
}
