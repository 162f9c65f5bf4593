use crate::config::FingerprintConfig;
use crate::core::runner::run_probes_with_cancel;
use crate::core::serializer::{serialize, verify};
use crate::core::{PipelineState, ProbeRegistry};
use crate::crypto::digest;
use crate::env::Environment;
use crate::error::{FingerprintError, Result};
use crate::model::{DisplayState, Fingerprint};
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// One fingerprint run: its id, its configuration and a handle to cancel it
#[derive(Clone, Debug)]
pub struct FingerprintRequest {
    id: Uuid,
    config: FingerprintConfig,
    cancel: CancellationToken,
}

impl FingerprintRequest {
    pub fn new(config: FingerprintConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the request to an existing cancellation token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Token that cancels this request when triggered
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// All-or-nothing outcome of a request
#[derive(Debug)]
pub enum FingerprintResponse {
    Ready(Fingerprint),
    Failed(FingerprintError),
    Cancelled,
}

impl FingerprintResponse {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn into_result(self) -> Result<Fingerprint> {
        match self {
            Self::Ready(fingerprint) => Ok(fingerprint),
            Self::Failed(e) => Err(e),
            Self::Cancelled => Err(FingerprintError::Cancelled),
        }
    }
}

/// Orchestrates registry, runner, serializer and hasher
///
/// State changes of the most recent request are published on a watch channel
/// so a UI can show loading, ready and error states without polling.
pub struct FingerprintService {
    registry: Arc<ProbeRegistry>,
    environment: Arc<dyn Environment>,
    cache: OnceCell<Fingerprint>,
    state_tx: watch::Sender<PipelineState>,
}

impl FingerprintService {
    pub fn new(registry: ProbeRegistry, environment: Arc<dyn Environment>) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        Self {
            registry: Arc::new(registry),
            environment,
            cache: OnceCell::new(),
            state_tx,
        }
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    pub fn display_state(&self) -> DisplayState {
        self.state_tx.borrow().display()
    }

    /// Fingerprint published by the first cached run, if any
    pub fn cached(&self) -> Option<&Fingerprint> {
        self.cache.get()
    }

    /// Convenience wrapper: run with `config` and a fresh cancellation token
    pub async fn fingerprint(&self, config: FingerprintConfig) -> Result<Fingerprint> {
        self.request_fingerprint(FingerprintRequest::new(config))
            .await
            .into_result()
    }

    pub async fn request_fingerprint(&self, request: FingerprintRequest) -> FingerprintResponse {
        let span = tracing::info_span!("fingerprint", request_id = %request.id);
        self.respond(&request).instrument(span).await
    }

    async fn respond(&self, request: &FingerprintRequest) -> FingerprintResponse {
        let config = &request.config;

        let outcome = if config.session_cache {
            if let Some(cached) = self.cache_hit(config) {
                tracing::debug!("Serving cached fingerprint {}", cached.tagged());
                self.publish(PipelineState::Ready(cached.clone()));
                return FingerprintResponse::Ready(cached);
            }
            self.run_cached(request).await
        } else {
            self.run(request).await
        };

        match outcome {
            Ok(fingerprint) => FingerprintResponse::Ready(fingerprint),
            Err(FingerprintError::Cancelled) => FingerprintResponse::Cancelled,
            Err(e) => FingerprintResponse::Failed(e),
        }
    }

    /// Run through the cache cell so concurrent first requests share one
    /// collection
    async fn run_cached(&self, request: &FingerprintRequest) -> Result<Fingerprint> {
        if self.cache.initialized() {
            // Filled by a request with another algorithm or layout
            return self.run(request).await;
        }

        let published = self.cache.get_or_try_init(|| self.run(request)).await?;
        if let Some(cached) = self.cache_hit(&request.config) {
            return Ok(cached);
        }

        tracing::debug!(
            "Session cache holds {}, collecting separately",
            published.tagged()
        );
        self.run(request).await
    }

    /// One full pass of the pipeline, publishing every state it reaches
    async fn run(&self, request: &FingerprintRequest) -> Result<Fingerprint> {
        let guard = CancelOnDrop::new(&self.state_tx);
        let mut state = PipelineState::Idle;
        let outcome = self.drive(&mut state, request).await;

        match &outcome {
            Ok(fingerprint) => {
                tracing::info!("Fingerprint ready: {}", fingerprint.tagged());
            }
            Err(FingerprintError::Cancelled) => {
                tracing::info!("Fingerprint request cancelled during {}", state.name());
                self.finish(state.cancel());
            }
            Err(e) => {
                tracing::error!("Fingerprint failed during {}: {}", state.name(), e);
                self.finish(state.fail(e.to_string()));
            }
        }

        guard.disarm();
        outcome
    }

    /// Walk Idle -> Collecting -> Serializing -> Hashing -> Ready
    async fn drive(
        &self,
        state: &mut PipelineState,
        request: &FingerprintRequest,
    ) -> Result<Fingerprint> {
        let config = &request.config;

        self.advance(state, PipelineState::start)?;

        let results =
            run_probes_with_cancel(&self.registry, self.environment.clone(), &request.cancel)
                .await?;
        if request.cancel.is_cancelled() {
            return Err(FingerprintError::Cancelled);
        }
        self.advance(state, |s| s.collected(results, config.layout))?;

        let canonical = {
            let results = state.results().unwrap_or_default();
            verify(&self.registry, results)?;
            serialize(results, config.layout)
        };
        self.advance(state, |s| s.serialized(canonical))?;

        let hex = match state {
            PipelineState::Hashing { canonical, .. } => digest(canonical, config.algorithm_version)?,
            other => {
                return Err(FingerprintError::invalid_state(format!(
                    "Cannot hash from {}",
                    other.name()
                )));
            }
        };
        self.advance(state, |s| s.hashed(hex, config.algorithm_version))?;

        state
            .fingerprint()
            .cloned()
            .ok_or_else(|| FingerprintError::invalid_state("Pipeline ended without a fingerprint"))
    }

    fn advance<F>(&self, state: &mut PipelineState, transition: F) -> Result<()>
    where
        F: FnOnce(PipelineState) -> Result<PipelineState>,
    {
        let next = transition(state.clone())?;
        tracing::trace!("Pipeline {} -> {}", state.name(), next.name());
        *state = next;
        self.publish(state.clone());
        Ok(())
    }

    fn finish(&self, terminal: Result<PipelineState>) {
        match terminal {
            Ok(state) => self.publish(state),
            Err(e) => tracing::warn!("Could not record terminal state: {}", e),
        }
    }

    fn publish(&self, state: PipelineState) {
        self.state_tx.send_replace(state);
    }

    fn cache_hit(&self, config: &FingerprintConfig) -> Option<Fingerprint> {
        self.cache
            .get()
            .filter(|cached| {
                cached.algorithm_version == config.algorithm_version
                    && cached.layout == config.layout
            })
            .cloned()
    }
}

/// Publishes `Cancelled` when a run is dropped before reaching a terminal
/// state, e.g. when the caller times out or an HTTP client disconnects
struct CancelOnDrop<'a> {
    state_tx: &'a watch::Sender<PipelineState>,
    armed: bool,
}

impl<'a> CancelOnDrop<'a> {
    fn new(state_tx: &'a watch::Sender<PipelineState>) -> Self {
        Self {
            state_tx,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state_tx.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            tracing::info!("Fingerprint request dropped during {}", state.name());
            *state = PipelineState::Cancelled;
            true
        });
    }
}
