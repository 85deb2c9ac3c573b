// Series reshaper - splits per-minute rows into one chartable series per metric
use super::snapshot::TimeSeriesRow;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Headroom added above the largest value on a chart's y axis.
const DISPLAY_HEADROOM: f64 = 1.1;

/// A column of the per-minute table that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesMetric {
    Orders,
    Revenue,
}

impl SeriesMetric {
    pub const ALL: [SeriesMetric; 2] = [SeriesMetric::Orders, SeriesMetric::Revenue];

    pub fn name(self) -> &'static str {
        match self {
            SeriesMetric::Orders => "orders",
            SeriesMetric::Revenue => "revenue",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SeriesMetric::Orders => "Orders per minute",
            SeriesMetric::Revenue => "Revenue per minute",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SeriesMetric::Orders => "green",
            SeriesMetric::Revenue => "blue",
        }
    }

    fn value(self, row: &TimeSeriesRow) -> f64 {
        match self {
            SeriesMetric::Orders => row.orders as f64,
            SeriesMetric::Revenue => row.revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub metric_name: &'static str,
    pub title: &'static str,
    pub color: &'static str,
    pub points: Vec<SeriesPoint>,
    pub display_max: f64,
}

impl SeriesView {
    fn project(metric: SeriesMetric, rows: &[TimeSeriesRow]) -> Self {
        let points: Vec<SeriesPoint> = rows
            .iter()
            .map(|row| SeriesPoint {
                timestamp: row.timestamp,
                value: metric.value(row),
            })
            .collect();

        Self {
            metric_name: metric.name(),
            title: metric.title(),
            color: metric.color(),
            display_max: display_max(points.iter().map(|p| p.value)),
            points,
        }
    }
}

/// Upper bound of the y axis: largest value plus 10% headroom, 0 for no data.
pub fn display_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    max * DISPLAY_HEADROOM
}

/// One view per requested metric, points in the same order as `rows`.
pub fn reshape(rows: &[TimeSeriesRow], metrics: &[SeriesMetric]) -> Vec<SeriesView> {
    metrics
        .iter()
        .map(|&metric| SeriesView::project(metric, rows))
        .collect()
}
