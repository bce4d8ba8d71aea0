//! Remote data gateway: the hosted store's row API, seen from this service.
//!
//! Every read the admin screens need and every mutation they perform goes
//! through [`Gateway`]. [`SeaGateway`] is the production implementation over
//! a SeaORM connection (hosted Postgres, or SQLite locally).

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::{profile, region, team_leader, user_role};

pub mod sea;

pub use sea::SeaGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Db(#[from] sea_orm::DbErr),
    /// An update-by-filter matched nothing.
    #[error("No {table} row matches id {id}")]
    NoMatchingRow { table: &'static str, id: Uuid },
    /// The store refused the write (constraint violation).
    #[error("{0}")]
    Rejected(String),
}

impl GatewayError {
    /// The message the store reported, as shown to the admin.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Tables that carry a `tl_id` and are counted per team leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountedTable {
    Teams,
    Dsrs,
    Sales,
}

impl CountedTable {
    pub fn table_name(self) -> &'static str {
        match self {
            CountedTable::Teams => "teams",
            CountedTable::Dsrs => "dsrs",
            CountedTable::Sales => "sales",
        }
    }
}

/// Projection of a `sales` row used by the dashboard.
///
/// `sale_price` is the raw payload value: the hosted API may hand back a
/// number, a numeric string or null.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub admin_approved: bool,
    pub sale_price: serde_json::Value,
    pub region_id: Option<Uuid>,
}

/// Projection of a `stock` row used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow {
    pub stock_type: String,
    pub status: String,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    // ---------- reads ----------

    /// All profiles, newest first.
    async fn list_profiles(&self) -> GatewayResult<Vec<profile::Model>>;

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<profile::Model>>;

    async fn roles_for_users(&self, user_ids: &[Uuid]) -> GatewayResult<Vec<user_role::Model>>;

    /// The stored role token for one user, if a role row exists.
    async fn role_of(&self, user_id: Uuid) -> GatewayResult<Option<String>>;

    /// All regions, ordered by name.
    async fn list_regions(&self) -> GatewayResult<Vec<region::Model>>;

    async fn regions_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<region::Model>>;

    /// All team-leader rows, newest first.
    async fn list_team_leaders(&self) -> GatewayResult<Vec<team_leader::Model>>;

    /// Row counts in `table` grouped by `tl_id`, restricted to `tl_ids`.
    /// Team leaders with no rows are absent from the map.
    async fn count_by_team_leader(
        &self,
        table: CountedTable,
        tl_ids: &[Uuid],
    ) -> GatewayResult<HashMap<Uuid, u64>>;

    /// Total row count of `table` (count-only query, no rows transferred).
    async fn count_rows(&self, table: CountedTable) -> GatewayResult<u64>;

    async fn list_sales(&self) -> GatewayResult<Vec<SaleRow>>;

    async fn list_stock(&self) -> GatewayResult<Vec<StockRow>>;

    // ---------- writes ----------

    /// Overwrite the role token for `user_id`. The token is not validated
    /// here; the store enforces its own closed set.
    async fn update_role(&self, user_id: Uuid, role: &str) -> GatewayResult<()>;

    async fn update_approval(&self, user_id: Uuid, approved: bool) -> GatewayResult<()>;

    async fn update_team_leader_target(&self, tl_id: Uuid, target: f64) -> GatewayResult<()>;

    /// Delete-by-filter; deleting nothing is not an error.
    async fn delete_role(&self, user_id: Uuid) -> GatewayResult<()>;

    /// Delete-by-filter; deleting nothing is not an error.
    async fn delete_profile(&self, user_id: Uuid) -> GatewayResult<()>;
}
