// Dashboard service - Use case for building one refresh cycle's view
use crate::application::orders_repository::{FetchError, OrdersRepository};
use crate::domain::dashboard::DashboardView;
use crate::domain::snapshot::CycleSnapshot;
use chrono::Local;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn OrdersRepository>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn OrdersRepository>) -> Self {
        Self { repository }
    }

    /// Fetch all three snapshots one after another; the first failure aborts.
    pub async fn fetch_snapshot(&self) -> Result<CycleSnapshot, FetchError> {
        let overview = self.repository.fetch_overview().await?;
        let per_minute = self.repository.fetch_orders_per_minute().await?;
        let popular = self.repository.fetch_popular().await?;

        Ok(CycleSnapshot {
            overview,
            per_minute,
            popular,
        })
    }

    pub async fn get_dashboard(&self) -> Result<DashboardView, FetchError> {
        let snapshot = self.fetch_snapshot().await?;
        tracing::debug!(
            rows = snapshot.per_minute.len(),
            items = snapshot.popular.items.len(),
            categories = snapshot.popular.categories.len(),
            "Fetched cycle snapshot"
        );
        Ok(DashboardView::assemble(&snapshot, Local::now()))
    }
}
