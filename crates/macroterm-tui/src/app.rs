//! Application state for the dashboard TUI.
//!
//! `App` wraps the core `ViewState` with the pieces only the terminal needs:
//! the overlay state, a status message, and the background task channel.
//! Loads and the worker lifecycle run on spawned tasks and report back
//! through an mpsc channel that the event loop drains between frames.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::AbortHandle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use macroterm_core::api::{abort_pair, DashboardClient, LoadError, Loaded};
use macroterm_core::cache::{
    age_display, ActivateOutcome, CacheStorage, HttpNetwork, InstallOutcome, Network,
    OfflineWorker, ResponseSource,
};
use macroterm_core::config::Config;
use macroterm_core::state::{Applied, LoadTicket, TabId, ViewState};

/// Buffer size for the background result channel
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks.
#[derive(Debug)]
pub enum BackgroundResult {
    /// A dashboard load finished, tagged with the ticket it was started with.
    Loaded(LoadTicket, Result<Loaded, LoadError>),
    /// The offline worker finished install and activate.
    WorkerReady(Result<(InstallOutcome, ActivateOutcome)>),
}

pub struct App<N = HttpNetwork> {
    pub state: AppState,
    pub view: ViewState,

    /// Shown in the status bar in place of the last-updated time.
    pub status_message: Option<String>,

    /// True once the app shell has been cached for offline use.
    pub offline_ready: bool,

    client: DashboardClient<N>,
    abort: Option<AbortHandle>,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App<HttpNetwork> {
    /// Create the app with an HTTP transport and on-disk cache from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");

        let storage = CacheStorage::new(&cache_dir)?;
        let network = HttpNetwork::new(config.request_timeout())?;
        let worker = OfflineWorker::new(config.worker_config()?, storage, network);

        Self::with_worker(Arc::new(worker))
    }
}

impl<N: Network> App<N> {
    pub fn with_worker(worker: Arc<OfflineWorker<N>>) -> Result<Self> {
        let client = DashboardClient::new(worker).context("Failed to build dashboard client")?;
        info!(url = %client.url(), "Dashboard client ready");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            state: AppState::Normal,
            view: ViewState::new(),
            status_message: None,
            offline_ready: false,
            client,
            abort: None,
            result_rx: rx,
            result_tx: tx,
        })
    }

    /// Install and then activate the offline worker in the background.
    pub fn start_worker(&self) {
        let worker = Arc::clone(self.client.worker());
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = async {
                let installed = worker.install().await?;
                let activated = worker.activate()?;
                Ok::<_, anyhow::Error>((installed, activated))
            }
            .await;
            Self::send_result(&tx, BackgroundResult::WorkerReady(result)).await;
        });
    }

    /// Start loading the dashboard. Any load still in flight is aborted.
    pub fn load(&mut self) {
        if let Some(previous) = self.abort.take() {
            debug!("Aborting previous dashboard load");
            previous.abort();
        }

        let ticket = self.view.begin_load();
        let (handle, registration) = abort_pair();
        self.abort = Some(handle);
        self.status_message = Some("Loading dashboard...".to_string());

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_dashboard(registration).await;
            Self::send_result(&tx, BackgroundResult::Loaded(ticket, result)).await;
        });
    }

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Loaded(ticket, result) => self.process_load(ticket, result),
            BackgroundResult::WorkerReady(Ok((installed, activated))) => {
                info!(
                    cache = %installed.cache_name,
                    assets = installed.cached,
                    deleted = activated.deleted.len(),
                    "Offline worker active"
                );
                self.offline_ready = true;
            }
            BackgroundResult::WorkerReady(Err(e)) => {
                // Not fatal; online loads still work
                warn!(error = %format!("{:#}", e), "Offline worker install failed");
            }
        }
    }

    fn process_load(&mut self, ticket: LoadTicket, result: Result<Loaded, LoadError>) {
        let cached_at = match &result {
            Ok(Loaded {
                source: ResponseSource::Cache { cached_at },
                ..
            }) => Some(*cached_at),
            _ => None,
        };

        match self.view.finish_load(ticket, result) {
            Applied::Snapshot => {
                self.abort = None;
                self.status_message = cached_at.map(|at| {
                    format!("Offline: showing cached data from {}", age_display(at))
                });
            }
            Applied::Failed => {
                self.abort = None;
                self.status_message = None;
                if let Some(message) = self.view.error() {
                    error!(error = message, "Dashboard load failed");
                }
            }
            Applied::Cancelled => {
                self.abort = None;
                self.status_message = None;
            }
            Applied::Stale => debug!("Dropped result of superseded load"),
        }
    }

    pub fn select_tab(&mut self, tab: TabId) {
        self.view.select_tab(tab);
    }

    /// Select the tab at `index` in the tab bar, if there is one.
    pub fn select_tab_index(&mut self, index: usize) {
        if let Some(tab) = self.view.tabs().into_iter().nth(index) {
            self.view.select_tab(tab);
        }
    }

    pub fn toggle_help(&mut self) {
        self.state = match self.state {
            AppState::ShowingHelp => AppState::Normal,
            _ => AppState::ShowingHelp,
        };
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Abort any in-flight load.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }
}
