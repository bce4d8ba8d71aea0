use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use uuid::Uuid;

use crate::entity::{dsr, profile, region, sale, stock, team, team_leader, user_role};

use super::{CountedTable, Gateway, GatewayError, GatewayResult, SaleRow, StockRow};

/// [`Gateway`] over a SeaORM connection.
#[derive(Clone)]
pub struct SeaGateway {
    db: DatabaseConnection,
}

impl SeaGateway {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct TeamLeaderCount {
    tl_id: Uuid,
    n: i64,
}

#[derive(Debug, FromQueryResult)]
struct SaleProjection {
    admin_approved: bool,
    sale_price: Option<f64>,
    region_id: Option<Uuid>,
}

#[derive(Debug, FromQueryResult)]
struct StockProjection {
    stock_type: String,
    status: String,
}

/// `SELECT tl_id, COUNT(tl_id) FROM <E> WHERE tl_id IN (..) GROUP BY tl_id`
async fn grouped_counts<E>(
    db: &DatabaseConnection,
    tl_col: E::Column,
    tl_ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, DbErr>
where
    E: EntityTrait,
{
    if tl_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find()
        .select_only()
        .column_as(tl_col, "tl_id")
        .column_as(Expr::col(tl_col).count(), "n")
        .filter(tl_col.is_in(tl_ids.iter().copied()))
        .group_by(tl_col)
        .into_model::<TeamLeaderCount>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.tl_id, u64::try_from(r.n).unwrap_or(0)))
        .collect())
}

/// Classify a write failure: constraint violations are the store refusing the
/// value, everything else is a plain DB error.
fn write_err(e: DbErr) -> GatewayError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("check constraint")
        || lower.contains("foreign key")
        || lower.contains("unique")
    {
        GatewayError::Rejected(msg)
    } else {
        GatewayError::Db(e)
    }
}

fn expect_match(rows_affected: u64, table: &'static str, id: Uuid) -> GatewayResult<()> {
    if rows_affected == 0 {
        Err(GatewayError::NoMatchingRow { table, id })
    } else {
        Ok(())
    }
}

#[async_trait]
impl Gateway for SeaGateway {
    async fn list_profiles(&self) -> GatewayResult<Vec<profile::Model>> {
        Ok(profile::Entity::find()
            .order_by_desc(profile::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<profile::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(profile::Entity::find()
            .filter(profile::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?)
    }

    async fn roles_for_users(&self, user_ids: &[Uuid]) -> GatewayResult<Vec<user_role::Model>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(user_role::Entity::find()
            .filter(user_role::Column::UserId.is_in(user_ids.iter().copied()))
            .all(&self.db)
            .await?)
    }

    async fn role_of(&self, user_id: Uuid) -> GatewayResult<Option<String>> {
        Ok(user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .map(|r| r.role))
    }

    async fn list_regions(&self) -> GatewayResult<Vec<region::Model>> {
        Ok(region::Entity::find()
            .order_by_asc(region::Column::Name)
            .all(&self.db)
            .await?)
    }

    async fn regions_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<region::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(region::Entity::find()
            .filter(region::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?)
    }

    async fn list_team_leaders(&self) -> GatewayResult<Vec<team_leader::Model>> {
        Ok(team_leader::Entity::find()
            .order_by_desc(team_leader::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn count_by_team_leader(
        &self,
        table: CountedTable,
        tl_ids: &[Uuid],
    ) -> GatewayResult<HashMap<Uuid, u64>> {
        let counts = match table {
            CountedTable::Teams => {
                grouped_counts::<team::Entity>(&self.db, team::Column::TlId, tl_ids).await?
            }
            CountedTable::Dsrs => {
                grouped_counts::<dsr::Entity>(&self.db, dsr::Column::TlId, tl_ids).await?
            }
            CountedTable::Sales => {
                grouped_counts::<sale::Entity>(&self.db, sale::Column::TlId, tl_ids).await?
            }
        };
        Ok(counts)
    }

    async fn count_rows(&self, table: CountedTable) -> GatewayResult<u64> {
        let n = match table {
            CountedTable::Teams => team::Entity::find().count(&self.db).await?,
            CountedTable::Dsrs => dsr::Entity::find().count(&self.db).await?,
            CountedTable::Sales => sale::Entity::find().count(&self.db).await?,
        };
        Ok(n)
    }

    async fn list_sales(&self) -> GatewayResult<Vec<SaleRow>> {
        let rows = sale::Entity::find()
            .select_only()
            .columns([
                sale::Column::AdminApproved,
                sale::Column::SalePrice,
                sale::Column::RegionId,
            ])
            .into_model::<SaleProjection>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| SaleRow {
                admin_approved: r.admin_approved,
                sale_price: r
                    .sale_price
                    .map(serde_json::Value::from)
                    .unwrap_or(serde_json::Value::Null),
                region_id: r.region_id,
            })
            .collect())
    }

    async fn list_stock(&self) -> GatewayResult<Vec<StockRow>> {
        let rows = stock::Entity::find()
            .select_only()
            .columns([stock::Column::StockType, stock::Column::Status])
            .into_model::<StockProjection>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| StockRow {
                stock_type: r.stock_type,
                status: r.status,
            })
            .collect())
    }

    async fn update_role(&self, user_id: Uuid, role: &str) -> GatewayResult<()> {
        let res = user_role::Entity::update_many()
            .col_expr(user_role::Column::Role, Expr::value(role.to_owned()))
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        expect_match(res.rows_affected, "user_roles", user_id)
    }

    async fn update_approval(&self, user_id: Uuid, approved: bool) -> GatewayResult<()> {
        let res = profile::Entity::update_many()
            .col_expr(profile::Column::IsApproved, Expr::value(approved))
            .col_expr(
                profile::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(profile::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        expect_match(res.rows_affected, "profiles", user_id)
    }

    async fn update_team_leader_target(&self, tl_id: Uuid, target: f64) -> GatewayResult<()> {
        let res = team_leader::Entity::update_many()
            .col_expr(team_leader::Column::MonthlyTarget, Expr::value(target))
            .filter(team_leader::Column::Id.eq(tl_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        expect_match(res.rows_affected, "team_leaders", tl_id)
    }

    async fn delete_role(&self, user_id: Uuid) -> GatewayResult<()> {
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn delete_profile(&self, user_id: Uuid) -> GatewayResult<()> {
        profile::Entity::delete_many()
            .filter(profile::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;
        Ok(())
    }
}
