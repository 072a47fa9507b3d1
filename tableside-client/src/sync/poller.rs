use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared::models::RequestFilter;
use shared::{ActionPayload, RequestAction, TakeoverChoice};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::cache::FloorCache;
use crate::api::FloorApi;
use crate::config::ClientConfig;
use crate::takeover::{ActResult, TakeoverPrompt};
use crate::ClientResult;

/// What to fetch and how often
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub location_id: i64,
    pub interval: Duration,
    pub filter: RequestFilter,
}

impl SyncOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            location_id: config.location_id,
            interval: config.poll_interval,
            filter: RequestFilter::default(),
        }
    }
}

/// Fixed-interval full re-fetch of the floor state
///
/// ```ignore
/// let sync = Arc::new(PollingSynchronizer::new(client, SyncOptions::from_config(&config)));
/// let handle = sync.spawn();
///
/// match sync.act(request_id, RequestAction::Acknowledge).await? {
///     ActResult::Done(_) => {}
///     ActResult::Confirm(prompt) => {
///         sync.resolve_prompt(&prompt, TakeoverChoice::HandleOnly).await?;
///     }
/// }
///
/// sync.shutdown();
/// handle.await?;
/// ```
#[derive(Debug)]
pub struct PollingSynchronizer<A: FloorApi> {
    api: A,
    options: SyncOptions,
    cache: RwLock<FloorCache>,
    refresh: Notify,
    shutdown: CancellationToken,
}

impl<A: FloorApi> PollingSynchronizer<A> {
    pub fn new(api: A, options: SyncOptions) -> Self {
        Self {
            api,
            options,
            cache: RwLock::new(FloorCache::default()),
            refresh: Notify::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current cache
    pub fn snapshot(&self) -> FloorCache {
        self.cache.read().clone()
    }

    /// Fetch now and replace the cache ("refresh list")
    ///
    /// A failure is recorded on the cache; the previous data stays visible.
    pub async fn refresh_now(&self) -> ClientResult<()> {
        let (requests, assignments) = tokio::join!(
            self.api.list_requests(&self.options.filter),
            self.api.my_assignments(self.options.location_id),
        );

        let now = shared::util::now_millis();
        match requests.and_then(|r| assignments.map(|a| (r, a))) {
            Ok((requests, assignments)) => {
                tracing::debug!(requests = requests.len(), "Floor state refreshed");
                self.cache.write().replace(requests, assignments, now);
                Ok(())
            }
            Err(e) => {
                if e.is_transport() {
                    tracing::warn!(error = %e, "Poll failed, retrying on next tick");
                } else {
                    tracing::error!(error = %e, "Poll failed");
                }
                self.cache.write().record_failure(e.kind(), e.to_string(), now);
                Err(e)
            }
        }
    }

    /// Wake the running loop for an early poll
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Start the polling loop on the tokio runtime
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await })
    }

    /// Poll, then wait for the interval, a refresh request or shutdown
    pub async fn run(&self) {
        tracing::info!(interval = ?self.options.interval, "Polling synchronizer started");
        loop {
            // failures are already recorded on the cache
            let _ = self.refresh_now().await;

            tokio::select! {
                _ = tokio::time::sleep(self.options.interval) => {}
                _ = self.refresh.notified() => {
                    tracing::debug!("Manual refresh");
                }
                _ = self.shutdown.cancelled() => break,
            }
        }
        tracing::info!("Polling synchronizer stopped");
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// First round of an action
    pub async fn act(&self, request_id: i64, action: RequestAction) -> ClientResult<ActResult> {
        self.submit(ActionPayload::new(request_id, action)).await
    }

    /// Second round: the operator answered the takeover prompt
    pub async fn resolve_prompt(
        &self,
        prompt: &TakeoverPrompt,
        choice: TakeoverChoice,
    ) -> ClientResult<ActResult> {
        self.submit(prompt.payload(choice)).await
    }

    async fn submit(&self, payload: ActionPayload) -> ClientResult<ActResult> {
        let outcome = self.api.act(&payload).await?;
        match ActResult::try_from(outcome) {
            Ok(ActResult::Done(request)) => {
                self.cache.write().apply_optimistic(request.clone());
                Ok(ActResult::Done(request))
            }
            Ok(confirm) => Ok(confirm),
            Err(e) => {
                tracing::info!(
                    request_id = payload.request_id,
                    action = payload.action.as_str(),
                    error = %e,
                    "Action rejected"
                );
                if e.kind().requires_refetch() {
                    self.request_refresh();
                }
                Err(e)
            }
        }
    }
}
