use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use folio_core::viewer::{ViewState, ViewerOptions};

use super::ReportSource;

/// Periodic background task, cancelled on `cancel` or drop.
#[derive(Debug)]
pub struct RefreshTimer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    /// Run `tick` every `period`, first after one full period.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.child_token();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
        });

        Self { token, handle }
    }

    /// Stop the timer. A tick already in progress is abandoned.
    pub fn cancel(&self) {
        self.token.cancel();
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A viewer session: one displayed report, refreshed on a fixed period.
///
/// Selecting a report cancels the previous refresh timer before the next
/// one starts, so at most one refresh cycle is ever running.
pub struct ViewerSession<S: ReportSource> {
    source: Arc<S>,
    state: Arc<Mutex<ViewState>>,
    refresh_interval: Duration,
    timer: Option<RefreshTimer>,
    loads: watch::Sender<u64>,
}

impl<S: ReportSource> ViewerSession<S> {
    pub fn new(source: S, options: ViewerOptions, refresh_interval: Duration) -> Self {
        let (loads, _) = watch::channel(0);
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(ViewState::new(options))),
            refresh_interval,
            timer: None,
            loads,
        }
    }

    /// Load `app_name` now and keep refreshing it until another report is
    /// selected or the session is stopped.
    pub async fn select(&mut self, app_name: &str) {
        self.stop();

        load_report(&*self.source, &self.state, app_name).await;
        self.loads.send_modify(|n| *n += 1);

        let source = self.source.clone();
        let state = self.state.clone();
        let loads = self.loads.clone();
        let app_name = app_name.to_string();

        self.timer = Some(RefreshTimer::spawn(self.refresh_interval, move || {
            let source = source.clone();
            let state = state.clone();
            let loads = loads.clone();
            let app_name = app_name.clone();
            async move {
                tracing::info!("Refreshing report {}", app_name);
                load_report(&*source, &state, &app_name).await;
                loads.send_modify(|n| *n += 1);
            }
        }));
    }

    /// Cancel the refresh timer, if any.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Shared view state; lock it to filter, sort or render.
    pub fn state(&self) -> Arc<Mutex<ViewState>> {
        self.state.clone()
    }

    /// Run `f` against the view state.
    pub async fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state)
    }

    /// Receiver notified after every completed load, initial or refresh.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.loads.subscribe()
    }
}

impl<S: ReportSource> Drop for ViewerSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch a report and its description and apply them to the view. Fetch
/// failures become an error state, never a panic.
async fn load_report<S: ReportSource + ?Sized>(source: &S, state: &Mutex<ViewState>, app_name: &str) {
    let report = source.fetch_report(app_name).await;
    let descriptions = source.fetch_descriptions().await;

    let mut view = state.lock().await;
    match report {
        Ok(html) => view.load(app_name, &html),
        Err(e) => {
            tracing::error!("Failed to load report {}: {}", app_name, e);
            view.fail(app_name, format!("Failed to load {} report", app_name));
        }
    }
    match descriptions {
        Ok(map) => view.set_description(&map),
        Err(e) => tracing::warn!("Failed to load report descriptions: {}", e),
    }
}
