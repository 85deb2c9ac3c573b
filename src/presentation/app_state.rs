// Application state for HTTP handlers
use crate::application::refresh_controller::RefreshHandle;

#[derive(Clone)]
pub struct AppState {
    pub refresh: RefreshHandle,
}
