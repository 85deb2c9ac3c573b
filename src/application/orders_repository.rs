// Repository trait for the order service's reporting endpoints
use crate::domain::snapshot::{OverviewSnapshot, PopularSnapshot, TimeSeriesRow};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {endpoint}: {message}")]
    Failure { endpoint: String, message: String },

    #[error("malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },
}

impl FetchError {
    pub fn failure(endpoint: &str, message: impl ToString) -> Self {
        FetchError::Failure {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    pub fn malformed(endpoint: &str, message: impl ToString) -> Self {
        FetchError::MalformedPayload {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Failure { endpoint, .. } | FetchError::MalformedPayload { endpoint, .. } => {
                endpoint
            }
        }
    }
}

#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Order count and revenue for the current and previous window
    async fn fetch_overview(&self) -> Result<OverviewSnapshot, FetchError>;

    /// Orders and revenue per minute, in the order the service reports them
    async fn fetch_orders_per_minute(&self) -> Result<Vec<TimeSeriesRow>, FetchError>;

    /// Most popular items and categories, already ranked
    async fn fetch_popular(&self) -> Result<PopularSnapshot, FetchError>;
}
