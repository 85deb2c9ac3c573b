// Metric derivation - order count, revenue and average order value with deltas
use super::format::{format_count, format_decimal};
use super::snapshot::PeriodTotals;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    #[error("average order value is undefined for a period with zero orders")]
    DivisionUndefined,
}

/// Decides how a metric's value and delta are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    OrderCount,
    Revenue,
    AverageOrderValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetric {
    pub label: String,
    pub kind: MetricKind,
    /// NaN when the metric is undefined
    pub value: f64,
    pub delta: f64,
}

/// A metric as the dashboard shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDisplay {
    pub label: String,
    pub value: String,
    pub delta: String,
}

impl DerivedMetric {
    pub fn new(label: impl Into<String>, kind: MetricKind, value: f64, delta: f64) -> Self {
        Self {
            label: label.into(),
            kind,
            value,
            delta,
        }
    }

    pub fn display(&self) -> MetricDisplay {
        let (value, delta) = match self.kind {
            MetricKind::OrderCount => (format_count(self.value), format_count(self.delta)),
            MetricKind::Revenue => (format_decimal(self.value, 2), format_count(self.delta)),
            MetricKind::AverageOrderValue => {
                (format_decimal(self.value, 2), format_decimal(self.delta, 2))
            }
        };
        MetricDisplay {
            label: self.label.clone(),
            value,
            delta,
        }
    }
}

pub fn average_order_value(period: &PeriodTotals) -> Result<f64, DerivationError> {
    if period.orders == 0 {
        return Err(DerivationError::DivisionUndefined);
    }
    Ok(period.total_price / period.orders as f64)
}

/// Derive the three headline metrics for `current` compared against `previous`.
///
/// Deltas are kept unrounded. When either period has no orders the average
/// order value and its delta are both NaN.
pub fn derive_metrics(current: &PeriodTotals, previous: &PeriodTotals) -> [DerivedMetric; 3] {
    let orders = DerivedMetric::new(
        "# of Orders",
        MetricKind::OrderCount,
        current.orders as f64,
        current.orders as f64 - previous.orders as f64,
    );

    let revenue = DerivedMetric::new(
        "Revenue",
        MetricKind::Revenue,
        current.total_price,
        current.total_price - previous.total_price,
    );

    let average = match (average_order_value(current), average_order_value(previous)) {
        (Ok(now), Ok(before)) => {
            DerivedMetric::new("Average order value", MetricKind::AverageOrderValue, now, now - before)
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::debug!(
                current_orders = current.orders,
                previous_orders = previous.orders,
                "{}",
                err
            );
            DerivedMetric::new("Average order value", MetricKind::AverageOrderValue, f64::NAN, f64::NAN)
        }
    };

    [orders, revenue, average]
}
