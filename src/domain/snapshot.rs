// Snapshot models - raw payloads polled from the order service each refresh cycle
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Orders and revenue for one time window reported by `/orders/overview`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub orders: u64,
    pub total_price: f64,
}

impl PeriodTotals {
    pub fn new(orders: u64, total_price: f64) -> Self {
        Self {
            orders,
            total_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSnapshot {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(rename = "currentTimePeriod")]
    pub current: PeriodTotals,
    #[serde(rename = "previousTimePeriod")]
    pub previous: PeriodTotals,
}

impl OverviewSnapshot {
    pub fn new(total_orders: u64, current: PeriodTotals, previous: PeriodTotals) -> Self {
        Self {
            total_orders,
            current,
            previous,
        }
    }
}

/// One row of `/orders/ordersPerMinute`, kept in the order the service sent it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeSeriesRow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub orders: u64,
    pub revenue: f64,
}

impl TimeSeriesRow {
    pub fn new(timestamp: NaiveDateTime, orders: u64, revenue: f64) -> Self {
        Self {
            timestamp,
            orders,
            revenue,
        }
    }
}

/// A product or category row from `/orders/popular`, already ranked by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingRow {
    #[serde(alias = "product", alias = "category")]
    pub name: String,
    // Category rows carry no image column
    #[serde(default, rename = "image")]
    pub image_ref: String,
    pub quantity: f64,
    pub orders: u64,
}

impl ListingRow {
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>, quantity: f64, orders: u64) -> Self {
        Self {
            name: name.into(),
            image_ref: image_ref.into(),
            quantity,
            orders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PopularSnapshot {
    pub items: Vec<ListingRow>,
    pub categories: Vec<ListingRow>,
}

/// Everything fetched during a single refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleSnapshot {
    pub overview: OverviewSnapshot,
    pub per_minute: Vec<TimeSeriesRow>,
    pub popular: PopularSnapshot,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a backend timestamp: `2022-11-21 15:26:00`, or RFC 3339 as a fallback.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_utc()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp '{}'", raw)))
}
