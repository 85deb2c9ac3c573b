// Refresh controller - runs refresh cycles on a timer or on demand
use crate::application::dashboard_service::DashboardService;
use crate::domain::dashboard::DashboardView;
use crate::domain::refresh_state::{DashboardRefreshState, SettingsError};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshPhase {
    Idle,
    Running,
}

/// What caused a cycle to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    Startup,
    Schedule,
    Manual,
}

/// The latest output of the refresh loop, as the render boundary sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDashboard {
    /// Last successfully built view; kept when a later cycle fails
    pub view: Option<DashboardView>,
    /// Failure of the most recent cycle, cleared by the next success
    pub notice: Option<String>,
    pub phase: RefreshPhase,
    /// Completed cycles, successful or not
    pub cycle: u64,
    pub last_attempt_at: Option<DateTime<Local>>,
}

impl Default for RenderedDashboard {
    fn default() -> Self {
        Self {
            view: None,
            notice: None,
            phase: RefreshPhase::Idle,
            cycle: 0,
            last_attempt_at: None,
        }
    }
}

/// Session handle: the only place refresh settings are changed.
///
/// The controller stops once every clone of its handle has been dropped.
#[derive(Clone)]
pub struct RefreshHandle {
    settings: Arc<watch::Sender<DashboardRefreshState>>,
    trigger: Arc<Notify>,
    rendered: watch::Receiver<RenderedDashboard>,
}

impl RefreshHandle {
    pub fn settings(&self) -> DashboardRefreshState {
        *self.settings.borrow()
    }

    /// Apply both changes or neither.
    pub fn update_settings(
        &self,
        auto_refresh: Option<bool>,
        interval_seconds: Option<i64>,
    ) -> Result<DashboardRefreshState, SettingsError> {
        let mut next = self.settings();
        if let Some(seconds) = interval_seconds {
            next.set_interval(seconds)?;
        }
        if let Some(enabled) = auto_refresh {
            next.auto_refresh_enabled = enabled;
        }

        let changed = self.settings.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::info!(
                auto_refresh = next.auto_refresh_enabled,
                interval_seconds = next.interval_seconds,
                "Refresh settings updated"
            );
        }
        Ok(next)
    }

    /// Ask for a cycle now. Requests made while a cycle runs are coalesced
    /// into one follow-up cycle.
    pub fn trigger_refresh(&self) {
        self.trigger.notify_one();
    }

    pub fn rendered(&self) -> RenderedDashboard {
        self.rendered.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderedDashboard> {
        self.rendered.clone()
    }
}

pub struct RefreshController {
    service: DashboardService,
    settings: watch::Receiver<DashboardRefreshState>,
    trigger: Arc<Notify>,
    rendered: watch::Sender<RenderedDashboard>,
}

impl RefreshController {
    pub fn new(service: DashboardService, initial: DashboardRefreshState) -> (Self, RefreshHandle) {
        let (settings_tx, settings_rx) = watch::channel(initial);
        let (rendered_tx, rendered_rx) = watch::channel(RenderedDashboard::default());
        let trigger = Arc::new(Notify::new());

        let controller = Self {
            service,
            settings: settings_rx,
            trigger: trigger.clone(),
            rendered: rendered_tx,
        };
        let handle = RefreshHandle {
            settings: Arc::new(settings_tx),
            trigger,
            rendered: rendered_rx,
        };
        (controller, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run one cycle immediately, then one per trigger or elapsed interval.
    pub async fn run(mut self) {
        tracing::info!(settings = ?*self.settings.borrow(), "Refresh controller started");

        let mut trigger = CycleTrigger::Startup;
        loop {
            self.run_cycle(trigger).await;

            match self.wait_for_next_cycle().await {
                Some(next) => trigger = next,
                None => break,
            }
        }

        tracing::info!("Refresh controller stopped");
    }

    /// Fetch, derive and publish one view. A failed cycle leaves the previous
    /// view in place and publishes the failure as a notice.
    pub async fn run_cycle(&mut self, trigger: CycleTrigger) {
        let started = Instant::now();
        self.rendered.send_modify(|r| r.phase = RefreshPhase::Running);
        tracing::debug!(?trigger, "Refresh cycle started");

        let result = self.service.get_dashboard().await;
        let attempted_at = Local::now();

        match result {
            Ok(view) => {
                self.rendered.send_modify(|r| {
                    r.view = Some(view);
                    r.notice = None;
                    r.phase = RefreshPhase::Idle;
                    r.cycle += 1;
                    r.last_attempt_at = Some(attempted_at);
                });
                tracing::info!(
                    ?trigger,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Refresh cycle completed"
                );
            }
            Err(err) => {
                let notice = err.to_string();
                self.rendered.send_modify(|r| {
                    r.notice = Some(notice);
                    r.phase = RefreshPhase::Idle;
                    r.cycle += 1;
                    r.last_attempt_at = Some(attempted_at);
                });
                tracing::warn!(
                    ?trigger,
                    endpoint = err.endpoint(),
                    error = %err,
                    "Refresh cycle failed, keeping previous view"
                );
            }
        }
    }

    /// Idle until a trigger arrives or, with auto refresh on, the interval has
    /// elapsed since going idle. `None` once the session handle is gone.
    ///
    /// An interval too long to represent as an instant never elapses.
    async fn wait_for_next_cycle(&mut self) -> Option<CycleTrigger> {
        let idle_since = Instant::now();

        loop {
            let settings = *self.settings.borrow_and_update();
            let deadline = settings
                .auto_refresh_enabled
                .then(|| idle_since.checked_add(settings.interval()))
                .flatten();

            tokio::select! {
                _ = self.trigger.notified() => return Some(CycleTrigger::Manual),
                _ = sleep_until(deadline) => return Some(CycleTrigger::Schedule),
                changed = self.settings.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::StubRepository;
    use crate::application::orders_repository::{FetchError, OrdersRepository};
    use crate::domain::snapshot::{OverviewSnapshot, PeriodTotals, PopularSnapshot, TimeSeriesRow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Holds the overview fetch open until released, to observe a running cycle.
    struct GatedRepository {
        inner: StubRepository,
        gated: AtomicBool,
        started: Notify,
        release: Notify,
    }

    impl GatedRepository {
        fn new() -> Self {
            Self {
                inner: StubRepository::healthy(),
                gated: AtomicBool::new(true),
                started: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl OrdersRepository for GatedRepository {
        async fn fetch_overview(&self) -> Result<OverviewSnapshot, FetchError> {
            if self.gated.load(Ordering::SeqCst) {
                self.started.notify_one();
                self.release.notified().await;
            }
            self.inner.fetch_overview().await
        }

        async fn fetch_orders_per_minute(&self) -> Result<Vec<TimeSeriesRow>, FetchError> {
            self.inner.fetch_orders_per_minute().await
        }

        async fn fetch_popular(&self) -> Result<PopularSnapshot, FetchError> {
            self.inner.fetch_popular().await
        }
    }

    fn start(
        repository: Arc<dyn OrdersRepository>,
        settings: DashboardRefreshState,
    ) -> (RefreshHandle, JoinHandle<()>) {
        let (controller, handle) = RefreshController::new(DashboardService::new(repository), settings);
        (handle, controller.spawn())
    }

    async fn wait_for_cycle(
        rx: &mut watch::Receiver<RenderedDashboard>,
        cycle: u64,
    ) -> RenderedDashboard {
        rx.wait_for(|r| r.cycle >= cycle).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_runs_at_startup() {
        let (handle, _task) = start(
            Arc::new(StubRepository::healthy()),
            DashboardRefreshState::default(),
        );

        let rendered = wait_for_cycle(&mut handle.subscribe(), 1).await;
        assert_eq!(rendered.phase, RefreshPhase::Idle);
        assert!(rendered.notice.is_none());
        assert_eq!(rendered.view.unwrap().total_orders, 17283);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_waits_for_interval() {
        let repo = Arc::new(StubRepository::healthy());
        let (handle, _task) = start(repo.clone(), DashboardRefreshState::new(true, 30).unwrap());
        let mut rx = handle.subscribe();
        wait_for_cycle(&mut rx, 1).await;

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(handle.rendered().cycle, 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        wait_for_cycle(&mut rx, 2).await;
        assert_eq!(repo.overview_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_during_cycle_finishes_cycle_and_stops() {
        let repo = Arc::new(GatedRepository::new());
        let (handle, _task) = start(repo.clone(), DashboardRefreshState::default());
        let mut rx = handle.subscribe();

        repo.started.notified().await;
        assert_eq!(handle.rendered().phase, RefreshPhase::Running);
        handle.update_settings(Some(false), None).unwrap();
        repo.release.notify_one();

        let rendered = wait_for_cycle(&mut rx, 1).await;
        assert!(rendered.view.is_some());
        assert!(rendered.notice.is_none());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(handle.rendered().cycle, 1);
        assert_eq!(repo.inner.overview_calls.load(Ordering::SeqCst), 1);

        repo.gated.store(false, Ordering::SeqCst);
        handle.trigger_refresh();
        wait_for_cycle(&mut rx, 2).await;
        assert_eq!(repo.inner.overview_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_keeps_previous_view() {
        let repo = Arc::new(StubRepository::healthy());
        let (handle, _task) = start(repo.clone(), DashboardRefreshState::new(true, 10).unwrap());
        let mut rx = handle.subscribe();

        let first = wait_for_cycle(&mut rx, 1).await;
        let first_generated = first.view.unwrap().generated_at;

        repo.fail_overview(FetchError::failure("/orders/overview", "connection refused"));
        let failed = wait_for_cycle(&mut rx, 2).await;
        assert_eq!(failed.view.unwrap().generated_at, first_generated);
        assert!(failed.notice.unwrap().contains("connection refused"));

        *repo.overview.lock().unwrap() = Ok(OverviewSnapshot::new(
            1,
            PeriodTotals::new(1, 10.0),
            PeriodTotals::new(1, 10.0),
        ));
        let recovered = wait_for_cycle(&mut rx, 3).await;
        assert!(recovered.notice.is_none());
        assert_eq!(recovered.view.unwrap().total_orders, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenabling_after_interval_elapsed_runs_at_once() {
        let repo = Arc::new(StubRepository::healthy());
        let (handle, _task) = start(repo.clone(), DashboardRefreshState::new(false, 30).unwrap());
        let mut rx = handle.subscribe();
        wait_for_cycle(&mut rx, 1).await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.rendered().cycle, 1);

        let before = Instant::now();
        handle.update_settings(Some(true), None).unwrap();
        wait_for_cycle(&mut rx, 2).await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_interval_keeps_previous_settings() {
        let (handle, _task) = start(
            Arc::new(StubRepository::healthy()),
            DashboardRefreshState::default(),
        );

        assert!(handle.update_settings(Some(false), Some(0)).is_err());
        assert_eq!(handle.settings(), DashboardRefreshState::default());

        let updated = handle.update_settings(None, Some(5)).unwrap();
        assert_eq!(updated.interval_seconds, 5);
        assert!(updated.auto_refresh_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_triggers_during_cycle_collapse_into_one() {
        let repo = Arc::new(GatedRepository::new());
        let (handle, _task) = start(repo.clone(), DashboardRefreshState::new(false, 30).unwrap());
        let mut rx = handle.subscribe();

        repo.started.notified().await;
        repo.gated.store(false, Ordering::SeqCst);
        handle.trigger_refresh();
        handle.trigger_refresh();
        handle.trigger_refresh();
        repo.release.notify_one();

        let rendered = wait_for_cycle(&mut rx, 2).await;
        assert!(rendered.notice.is_none());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(handle.rendered().cycle, 2);
        assert_eq!(repo.inner.overview_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_keeps_controller_alive() {
        let (handle, task) = start(
            Arc::new(StubRepository::healthy()),
            DashboardRefreshState::default(),
        );
        let mut rx = handle.subscribe();
        wait_for_cycle(&mut rx, 1).await;

        let updated = handle.update_settings(None, Some(i64::MAX)).unwrap();
        assert_eq!(updated.interval_seconds, i64::MAX as u64);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!task.is_finished());
        assert_eq!(handle.rendered().cycle, 1);

        handle.trigger_refresh();
        wait_for_cycle(&mut rx, 2).await;
        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_stops_when_session_ends() {
        let (handle, task) = start(
            Arc::new(StubRepository::healthy()),
            DashboardRefreshState::new(false, 30).unwrap(),
        );
        wait_for_cycle(&mut handle.subscribe(), 1).await;

        drop(handle);
        assert!(tokio::time::timeout(Duration::from_secs(1), task).await.is_ok());
    }
}
