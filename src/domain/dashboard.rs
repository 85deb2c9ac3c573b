// Dashboard domain model - everything one refresh cycle renders
use super::listing::{enrich, PopularityEntry};
use super::metrics::{derive_metrics, DerivedMetric, MetricDisplay};
use super::series::{reshape, SeriesMetric, SeriesView};
use super::snapshot::CycleSnapshot;
use chrono::{DateTime, Local};
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Pizza App Dashboard";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub total_orders: u64,
    pub metrics: Vec<DerivedMetric>,
    pub metric_displays: Vec<MetricDisplay>,
    pub charts: Vec<SeriesView>,
    pub popular_items: Vec<PopularityEntry>,
    pub popular_categories: Vec<PopularityEntry>,
}

impl DashboardView {
    /// Derive, reshape and enrich one cycle's snapshots.
    pub fn assemble(snapshot: &CycleSnapshot, generated_at: DateTime<Local>) -> Self {
        let overview = &snapshot.overview;
        let metrics = derive_metrics(&overview.current, &overview.previous).to_vec();
        let metric_displays = metrics.iter().map(DerivedMetric::display).collect();

        Self {
            title: DASHBOARD_TITLE.to_string(),
            generated_at,
            total_orders: overview.total_orders,
            metrics,
            metric_displays,
            charts: reshape(&snapshot.per_minute, &SeriesMetric::ALL),
            popular_items: enrich(&snapshot.popular.items),
            popular_categories: enrich(&snapshot.popular.categories),
        }
    }

    pub fn last_update_label(&self) -> String {
        format_last_update(&self.generated_at)
    }
}

pub fn format_last_update(at: &DateTime<Local>) -> String {
    at.format("%d %B %Y %H:%M:%S").to_string()
}
