//! Aggregation reader: list views that join base rows with their owning
//! profile, region and per-row counts.
//!
//! Each list is one base query plus a fixed number of batched lookups issued
//! concurrently, merged in memory. A failed base query is returned as an
//! error; a failed lookup degrades the affected fields to defaults.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{profile, region};
use crate::gateway::{CountedTable, Gateway, GatewayResult};
use crate::role::{Role, RoleBadge};

#[derive(Debug, Clone, Serialize)]
pub struct SignupView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub role_badge: RoleBadge,
    pub region_id: Option<Uuid>,
    pub region_name: String,
    pub created_at: NaiveDateTime,
    pub is_approved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamLeaderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub is_approved: bool,
    pub region_name: String,
    pub monthly_target: Option<f64>,
    pub team_count: u64,
    pub dsr_count: u64,
    pub sales_count: u64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionExecutiveView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub region_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub is_approved: bool,
    pub region_name: String,
    pub target: Option<f64>,
    pub agent_count: u64,
    pub sales_count: u64,
    pub created_at: NaiveDateTime,
}

/// Unwrap a lookup result, logging and substituting the default on failure.
fn or_default<T: Default>(result: GatewayResult<T>, lookup: &'static str) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!(lookup, error = %e, "lookup failed, using defaults");
        T::default()
    })
}

fn region_names(regions: Vec<region::Model>) -> HashMap<Uuid, String> {
    regions.into_iter().map(|r| (r.id, r.name)).collect()
}

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Every profile with its role and region name, newest first.
pub async fn signups(gateway: &dyn Gateway) -> GatewayResult<Vec<SignupView>> {
    let profiles = gateway.list_profiles().await?;

    let user_ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
    let region_ids = unique_ids(profiles.iter().filter_map(|p| p.region_id));

    let (roles, regions) = tokio::join!(
        gateway.roles_for_users(&user_ids),
        gateway.regions_by_ids(&region_ids),
    );

    let roles: HashMap<Uuid, String> = or_default(roles, "user_roles")
        .into_iter()
        .map(|r| (r.user_id, r.role))
        .collect();
    let regions = region_names(or_default(regions, "regions"));

    let mut views: Vec<SignupView> = profiles
        .into_iter()
        .map(|p| {
            let role = Role::from_stored(roles.get(&p.id).map(String::as_str));
            let region_name = p
                .region_id
                .and_then(|id| regions.get(&id).cloned())
                .unwrap_or_default();
            SignupView {
                id: p.id,
                full_name: p.full_name,
                email: p.email,
                phone: p.phone.unwrap_or_default(),
                role,
                role_badge: role.into(),
                region_id: p.region_id,
                region_name,
                created_at: p.created_at,
                is_approved: p.is_approved,
            }
        })
        .collect();

    views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(views)
}

/// Every team leader with profile fields, region and team/DSR/sales counts,
/// newest first.
pub async fn team_leaders(gateway: &dyn Gateway) -> GatewayResult<Vec<TeamLeaderView>> {
    let leaders = gateway.list_team_leaders().await?;

    let tl_ids: Vec<Uuid> = leaders.iter().map(|tl| tl.id).collect();
    let user_ids = unique_ids(leaders.iter().map(|tl| tl.user_id));
    let region_ids = unique_ids(leaders.iter().filter_map(|tl| tl.region_id));

    let (profiles, regions, teams, dsrs, sales) = tokio::join!(
        gateway.profiles_by_ids(&user_ids),
        gateway.regions_by_ids(&region_ids),
        gateway.count_by_team_leader(CountedTable::Teams, &tl_ids),
        gateway.count_by_team_leader(CountedTable::Dsrs, &tl_ids),
        gateway.count_by_team_leader(CountedTable::Sales, &tl_ids),
    );

    let profiles: HashMap<Uuid, profile::Model> = or_default(profiles, "profiles")
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let regions = region_names(or_default(regions, "regions"));
    let teams = or_default(teams, "teams");
    let dsrs = or_default(dsrs, "dsrs");
    let sales = or_default(sales, "sales");

    let mut views: Vec<TeamLeaderView> = leaders
        .into_iter()
        .map(|tl| {
            let profile = profiles.get(&tl.user_id);
            TeamLeaderView {
                id: tl.id,
                user_id: tl.user_id,
                full_name: profile.map(|p| p.full_name.clone()).unwrap_or_default(),
                email: profile.map(|p| p.email.clone()).unwrap_or_default(),
                phone: profile.and_then(|p| p.phone.clone()).unwrap_or_default(),
                is_approved: profile.is_some_and(|p| p.is_approved),
                region_name: tl
                    .region_id
                    .and_then(|id| regions.get(&id).cloned())
                    .unwrap_or_default(),
                monthly_target: tl.monthly_target,
                team_count: teams.get(&tl.id).copied().unwrap_or(0),
                dsr_count: dsrs.get(&tl.id).copied().unwrap_or(0),
                sales_count: sales.get(&tl.id).copied().unwrap_or(0),
                created_at: tl.created_at,
            }
        })
        .collect();

    views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(views)
}

/// Distribution executives. The store has no table for them yet, so the
/// list is always empty.
pub fn distribution_executives() -> Vec<DistributionExecutiveView> {
    tracing::debug!("distribution executive store not provisioned; returning empty list");
    Vec::new()
}
