use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock as AsyncRwLock;

use crate::gateway::GatewayResult;
use crate::reader::{DistributionExecutiveView, SignupView, TeamLeaderView};

/// Cached list queries. A successful mutation invalidates the keys whose data
/// it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Signups,
    TeamLeaders,
    DistributionExecutives,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Signups => "admin-signups",
            QueryKey::TeamLeaders => "team-leaders-full",
            QueryKey::DistributionExecutives => "distribution-executives",
        }
    }
}

type Slot<T> = AsyncRwLock<Option<Arc<Vec<T>>>>;

/// Last successfully loaded view models per [`QueryKey`].
///
/// Reads always go to the store; the slot only holds the most recent
/// successful load. A failed load leaves the slot untouched and the caller
/// gets an empty list for that read only. No version checking: a load that
/// started before an invalidation may store its (older) result after it.
#[derive(Default)]
pub struct ViewCache {
    signups: Slot<SignupView>,
    team_leaders: Slot<TeamLeaderView>,
    distribution_executives: Slot<DistributionExecutiveView>,
}

async fn load_fresh<T, F, Fut>(slot: &Slot<T>, key: QueryKey, load: F) -> Arc<Vec<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = GatewayResult<Vec<T>>>,
{
    match load().await {
        Ok(rows) => {
            let rows = Arc::new(rows);
            tracing::debug!(query = key.as_str(), rows = rows.len(), "view loaded");
            *slot.write().await = Some(rows.clone());
            rows
        }
        Err(e) => {
            tracing::warn!(query = key.as_str(), error = %e, "view load failed, serving empty list");
            Arc::new(Vec::new())
        }
    }
}

impl ViewCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn signups<F, Fut>(&self, load: F) -> Arc<Vec<SignupView>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<Vec<SignupView>>>,
    {
        load_fresh(&self.signups, QueryKey::Signups, load).await
    }

    pub async fn team_leaders<F, Fut>(&self, load: F) -> Arc<Vec<TeamLeaderView>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<Vec<TeamLeaderView>>>,
    {
        load_fresh(&self.team_leaders, QueryKey::TeamLeaders, load).await
    }

    pub async fn distribution_executives<F, Fut>(
        &self,
        load: F,
    ) -> Arc<Vec<DistributionExecutiveView>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<Vec<DistributionExecutiveView>>>,
    {
        load_fresh(
            &self.distribution_executives,
            QueryKey::DistributionExecutives,
            load,
        )
        .await
    }

    pub async fn is_cached(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::Signups => self.signups.read().await.is_some(),
            QueryKey::TeamLeaders => self.team_leaders.read().await.is_some(),
            QueryKey::DistributionExecutives => {
                self.distribution_executives.read().await.is_some()
            }
        }
    }

    /// Drop the stored rows for `key`.
    pub async fn invalidate(&self, key: QueryKey) {
        match key {
            QueryKey::Signups => *self.signups.write().await = None,
            QueryKey::TeamLeaders => *self.team_leaders.write().await = None,
            QueryKey::DistributionExecutives => {
                *self.distribution_executives.write().await = None
            }
        }
        tracing::debug!(query = key.as_str(), "view invalidated");
    }
}
