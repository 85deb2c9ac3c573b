// Domain layer - snapshot models and the pure derivation pipeline
pub mod dashboard;
pub mod format;
pub mod listing;
pub mod metrics;
pub mod refresh_state;
pub mod series;
pub mod snapshot;
