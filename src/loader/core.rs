//! The loader itself: public handle plus the worker-loop actor.
//!
//! All queue state lives inside a single worker task. The public handle only
//! sends commands, so `submit` and `clear` are fire-and-forget and the loop
//! mutates the queue without locks. Attempts run as spawned tasks each
//! holding an owned semaphore permit; the permit drop is the one and only
//! slot-release path.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::domain::entities::{LoadRequest, QueueStatus, ResourceSource, TargetId, VisualState};
use crate::domain::errors::LoadError;
use crate::domain::ports::{ContentCachePort, FetchPort};
use crate::infrastructure::{DiskContentCache, HttpFetcher};

use super::config::LoaderConfig;
use super::queue::PendingQueue;

/// Event delivered to the rendering layer when a target changes state.
///
/// Outcomes are tagged with the target rather than applied to a view, so a
/// consumer that dropped the target after a `clear()` simply ignores the
/// event.
#[derive(Debug, Clone)]
pub struct LoadEvent {
    /// The target this event is about.
    pub target: TargetId,
    /// The new state and its payload.
    pub state: LoadState,
}

/// Per-target state transition carried by a [`LoadEvent`].
#[derive(Debug, Clone)]
pub enum LoadState {
    /// An attempt (cache read or network fetch) has started.
    Loading,
    /// A resource was applied.
    Loaded {
        /// The decoded resource.
        resource: Arc<image::DynamicImage>,
        /// Where the bytes came from.
        source: ResourceSource,
    },
    /// All retries exhausted; show the placeholder.
    Failed {
        /// The fixed fallback resource.
        placeholder: Arc<image::DynamicImage>,
    },
}

impl LoadState {
    /// The visual state the rendering layer should now show.
    #[must_use]
    pub const fn visual_state(&self) -> VisualState {
        match self {
            Self::Loading => VisualState::Loading,
            Self::Loaded { .. } => VisualState::Loaded,
            Self::Failed { .. } => VisualState::Error,
        }
    }
}

#[derive(Debug)]
enum LoaderCommand {
    Submit {
        target: TargetId,
        url: String,
        priority: i32,
        retry_count: u32,
    },
    Clear,
    Status {
        reply: oneshot::Sender<QueueStatus>,
    },
}

/// Bounded-concurrency, priority-scheduled, cache-first image loader.
pub struct BoundedImageLoader {
    command_tx: mpsc::UnboundedSender<LoaderCommand>,
    config: LoaderConfig,
}

impl std::fmt::Debug for BoundedImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState {
    command_rx: mpsc::UnboundedReceiver<LoaderCommand>,
    semaphore: Arc<Semaphore>,
    attempts: Arc<AttemptContext>,
    max_concurrent: usize,
}

impl BoundedImageLoader {
    /// Creates a loader over the given cache and fetcher ports. Outcome
    /// events arrive on `event_tx`.
    #[must_use]
    pub fn new(
        config: LoaderConfig,
        cache: Arc<dyn ContentCachePort>,
        fetcher: Arc<dyn FetchPort>,
        event_tx: mpsc::UnboundedSender<LoadEvent>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

        // The attempt context holds only a weak sender: once every handle is
        // dropped the channel closes, queued retries dissolve, and the
        // worker loop ends.
        let attempts = Arc::new(AttemptContext {
            cache,
            fetcher,
            event_tx,
            command_tx: command_tx.downgrade(),
            config: config.clone(),
        });

        let worker_state = WorkerState {
            command_rx,
            semaphore,
            attempts,
            max_concurrent: config.max_concurrent,
        };

        tokio::spawn(Self::run_worker_loop(worker_state));

        Self { command_tx, config }
    }

    /// Creates a loader with the default configuration, the on-disk cache in
    /// its default location, and a real HTTP fetcher.
    ///
    /// # Errors
    /// Returns an error if the cache directory or HTTP client cannot be
    /// created.
    pub async fn with_defaults(
        event_tx: mpsc::UnboundedSender<LoadEvent>,
    ) -> Result<Self, LoadError> {
        let config = LoaderConfig::default();
        let cache = Arc::new(DiskContentCache::default_location(&config.cache_namespace).await?);
        let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout_ms)?);
        Ok(Self::new(config, cache, fetcher, event_tx))
    }

    /// Enqueues a load, or re-prioritizes the pending entry for the same
    /// target. Fire-and-forget; an empty URL is logged and dropped.
    pub fn submit(&self, target: impl Into<TargetId>, source_url: impl Into<String>, priority: i32) {
        let target = target.into();
        let url = source_url.into();
        if url.is_empty() {
            let err = LoadError::invalid_request("empty source URL");
            warn!(target = %target, error = %err, "dropping request");
            return;
        }
        self.send(LoaderCommand::Submit {
            target,
            url,
            priority,
            retry_count: 0,
        });
    }

    /// Drops every pending (not-yet-started) request. In-flight requests run
    /// to completion; their events may still arrive afterwards.
    pub fn clear(&self) {
        self.send(LoaderCommand::Clear);
    }

    /// Returns a snapshot of the queue for diagnostics.
    pub async fn status(&self) -> QueueStatus {
        let (reply, rx) = oneshot::channel();
        self.send(LoaderCommand::Status { reply });
        rx.await.unwrap_or(QueueStatus {
            queued: 0,
            running: 0,
            max_concurrent: self.config.max_concurrent,
        })
    }

    /// Returns true if nothing is queued or running.
    pub async fn is_idle(&self) -> bool {
        let status = self.status().await;
        status.queued == 0 && status.running == 0
    }

    /// The configured concurrency cap.
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    fn send(&self, command: LoaderCommand) {
        if self.command_tx.send(command).is_err() {
            error!("loader worker is gone; command dropped");
        }
    }

    /// Worker loop: applies commands and dispatches pending requests as
    /// slots free up. Work-conserving: whenever a permit and a pending
    /// request exist, the dispatch arm fires.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut pending = PendingQueue::new();

        loop {
            tokio::select! {
                cmd = state.command_rx.recv() => {
                    match cmd {
                        Some(LoaderCommand::Submit { target, url, priority, retry_count }) => {
                            if pending.submit(target, url, priority, retry_count) {
                                debug!(queued = pending.len(), "request enqueued");
                            }
                        }
                        Some(LoaderCommand::Clear) => {
                            let dropped = pending.len();
                            pending.clear();
                            debug!(dropped = dropped, "pending queue cleared");
                        }
                        Some(LoaderCommand::Status { reply }) => {
                            let running =
                                state.max_concurrent - state.semaphore.available_permits();
                            let _ = reply.send(QueueStatus {
                                queued: pending.len(),
                                running,
                                max_concurrent: state.max_concurrent,
                            });
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !pending.is_empty() => {
                    if let Some(request) = pending.pop() {
                        let attempts = state.attempts.clone();
                        tokio::spawn(async move {
                            attempts.run_attempt(request).await;
                            drop(permit);
                        });
                    }
                }
            }
        }
    }
}

/// Shared context for attempt tasks.
struct AttemptContext {
    cache: Arc<dyn ContentCachePort>,
    fetcher: Arc<dyn FetchPort>,
    event_tx: mpsc::UnboundedSender<LoadEvent>,
    command_tx: mpsc::WeakUnboundedSender<LoaderCommand>,
    config: LoaderConfig,
}

impl AttemptContext {
    /// One pass of the cache/fetch/retry state machine. Never fails the
    /// process; every error degrades into a retry or the placeholder.
    async fn run_attempt(&self, request: LoadRequest) {
        if request.is_retry() {
            debug!(target = %request.target, attempt = request.retry_count, "retrying load");
        }
        self.emit(request.target.clone(), LoadState::Loading);

        match self.try_load(&request).await {
            Ok((resource, source)) => {
                debug!(target = %request.target, source = %source, "resource loaded");
                self.emit(request.target, LoadState::Loaded { resource, source });
            }
            Err(err) => self.handle_failure(request, &err),
        }
    }

    /// Cache-first lookup, then network fetch plus best-effort cache write.
    async fn try_load(
        &self,
        request: &LoadRequest,
    ) -> Result<(Arc<image::DynamicImage>, ResourceSource), LoadError> {
        let url = &request.source_url;

        if let Some(bytes) = self.cache.lookup(url).await {
            match decode_resource(bytes).await {
                Ok(resource) => return Ok((resource, ResourceSource::Cache)),
                Err(err) => {
                    warn!(url = %url, error = %err, "cached bytes undecodable, refetching");
                }
            }
        }

        let bytes = self.fetcher.fetch(url).await?;
        let resource = decode_resource(bytes.clone()).await?;

        if !url.starts_with("data:") {
            let cache = self.cache.clone();
            let url = url.clone();
            tokio::spawn(async move {
                if let Err(err) = cache.store(&url, &bytes).await {
                    warn!(url = %url, error = %err, "failed to cache fetched bytes");
                }
            });
        }

        Ok((resource, ResourceSource::Network))
    }

    /// Retry branch. Retries re-enter the front door as delayed submissions,
    /// with the priority lowered so repeat offenders sink below fresher
    /// requests; a `clear()` before dispatch drops them like anything else
    /// pending.
    fn handle_failure(&self, request: LoadRequest, err: &LoadError) {
        if err.is_retryable() && request.retry_count < self.config.max_retries {
            let retry_count = request.retry_count + 1;
            let delay = self.config.backoff_delay(retry_count);
            warn!(
                target = %request.target,
                url = %request.source_url,
                error = %err,
                attempt = retry_count,
                delay = ?delay,
                "attempt failed, retrying"
            );

            let command_tx = self.command_tx.clone();
            let command = LoaderCommand::Submit {
                target: request.target,
                url: request.source_url,
                priority: request.priority.saturating_sub(1),
                retry_count,
            };
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(tx) = command_tx.upgrade() {
                    let _ = tx.send(command);
                }
            });
        } else {
            let exhausted = LoadError::RetriesExhausted {
                attempts: request.retry_count + 1,
            };
            error!(
                target = %request.target,
                url = %request.source_url,
                error = %err,
                "{exhausted}, applying placeholder"
            );
            self.emit(
                request.target,
                LoadState::Failed {
                    placeholder: self.config.placeholder.clone(),
                },
            );
        }
    }

    fn emit(&self, target: TargetId, state: LoadState) {
        // The consumer may have gone away after a re-render; that is fine.
        let _ = self.event_tx.send(LoadEvent { target, state });
    }
}

/// Decodes raw bytes into a displayable resource off the async threads.
async fn decode_resource(bytes: Bytes) -> Result<Arc<image::DynamicImage>, LoadError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| LoadError::decode(format!("decode task panicked: {e}")))?
        .map(Arc::new)
        .map_err(|e| LoadError::decode(e.to_string()))
}
