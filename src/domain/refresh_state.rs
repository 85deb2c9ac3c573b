// Refresh settings that live for the whole dashboard session
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("refresh interval must be at least 1 second, got {value}")]
    InvalidInterval { value: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRefreshState {
    pub auto_refresh_enabled: bool,
    pub interval_seconds: u64,
}

impl Default for DashboardRefreshState {
    fn default() -> Self {
        Self {
            auto_refresh_enabled: true,
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
        }
    }
}

impl DashboardRefreshState {
    pub fn new(auto_refresh_enabled: bool, interval_seconds: i64) -> Result<Self, SettingsError> {
        let mut state = Self {
            auto_refresh_enabled,
            ..Self::default()
        };
        state.set_interval(interval_seconds)?;
        Ok(state)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Update the interval; on error the previous value is kept.
    pub fn set_interval(&mut self, seconds: i64) -> Result<(), SettingsError> {
        if seconds < 1 {
            return Err(SettingsError::InvalidInterval { value: seconds });
        }
        self.interval_seconds = seconds as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = DashboardRefreshState::default();
        assert!(state.auto_refresh_enabled);
        assert_eq!(state.interval_seconds, 30);
        assert_eq!(state.interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_interval_keeps_previous_value() {
        let mut state = DashboardRefreshState::default();
        state.set_interval(5).unwrap();

        assert_eq!(
            state.set_interval(0),
            Err(SettingsError::InvalidInterval { value: 0 })
        );
        assert!(state.set_interval(-10).is_err());
        assert_eq!(state.interval_seconds, 5);
    }

    #[test]
    fn test_new_validates() {
        assert!(DashboardRefreshState::new(false, 0).is_err());
        let state = DashboardRefreshState::new(false, 12).unwrap();
        assert!(!state.auto_refresh_enabled);
        assert_eq!(state.interval_seconds, 12);
    }

    #[test]
    fn test_error_message() {
        let err = SettingsError::InvalidInterval { value: -1 };
        assert_eq!(err.to_string(), "refresh interval must be at least 1 second, got -1");
    }
}
