use crate::core::ProbeRegistry;
use crate::env::Environment;
use crate::error::{FingerprintError, Result};
use crate::model::ProbeResult;
use crate::probe::{Collector, Probe};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Run every probe in `registry` against `env`
///
/// See [`run_probes_with_cancel`].
pub async fn run_probes(
    registry: &ProbeRegistry,
    env: Arc<dyn Environment>,
) -> Result<Vec<ProbeResult>> {
    run_probes_with_cancel(registry, env, &CancellationToken::new()).await
}

/// Run every probe in `registry` against `env`, in two phases:
///
/// 1. Async probes are spawned first so they overlap with everything else;
///    each races its own timeout.
/// 2. Sync probes are evaluated inline in registration order.
///
/// The runner then waits for every async probe to settle. Results are placed
/// by slot index, so the output always follows registration order no matter
/// which probe finished first. Probe failures become sentinel results; the
/// only error returned is [`FingerprintError::Cancelled`].
pub async fn run_probes_with_cancel(
    registry: &ProbeRegistry,
    env: Arc<dyn Environment>,
    cancel: &CancellationToken,
) -> Result<Vec<ProbeResult>> {
    if cancel.is_cancelled() {
        return Err(FingerprintError::Cancelled);
    }

    let probes = registry.probes();
    let mut slots: Vec<Option<ProbeResult>> = vec![None; probes.len()];
    let mut pending = JoinSet::new();

    for (index, probe) in probes.iter().enumerate() {
        if let Some(capability) = probe.required_capability() {
            if !env.supports(capability) {
                tracing::debug!("Probe {} unsupported: no {}", probe.key(), capability);
                slots[index] = Some(ProbeResult::unsupported(probe.key()));
                continue;
            }
        }

        if let Collector::Async { timeout, collect } = probe.collector() {
            let key = probe.key().to_string();
            let timeout = *timeout;
            let collection = AssertUnwindSafe(collect(env.clone())).catch_unwind();

            pending.spawn(async move {
                let result = match tokio::time::timeout(timeout, collection).await {
                    Ok(Ok(outcome)) => settle(&key, outcome),
                    Ok(Err(panic)) => panicked(&key, panic),
                    Err(_) => {
                        tracing::debug!("Probe {} timed out after {:?}", key, timeout);
                        ProbeResult::timeout(key)
                    }
                };
                (index, result)
            });
        }
    }

    for (index, probe) in probes.iter().enumerate() {
        if slots[index].is_none() {
            if let Collector::Sync(collect) = probe.collector() {
                slots[index] = Some(run_sync(probe, collect.as_ref(), env.as_ref()));
            }
        }
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Cancelled with {} probe(s) outstanding", pending.len());
                pending.abort_all();
                return Err(FingerprintError::Cancelled);
            }
            joined = pending.join_next() => match joined {
                Some(Ok((index, result))) => slots[index] = Some(result),
                Some(Err(e)) => tracing::warn!("Probe task failed to join: {}", e),
                None => break,
            },
        }
    }

    Ok(probes
        .iter()
        .zip(slots)
        .map(|(probe, slot)| {
            slot.unwrap_or_else(|| ProbeResult::error(probe.key(), "probe task did not complete"))
        })
        .collect())
}

fn run_sync(
    probe: &Probe,
    collect: &(dyn Fn(&dyn Environment) -> Result<String> + Send + Sync),
    env: &dyn Environment,
) -> ProbeResult {
    match std::panic::catch_unwind(AssertUnwindSafe(|| collect(env))) {
        Ok(outcome) => settle(probe.key(), outcome),
        Err(panic) => panicked(probe.key(), panic),
    }
}

/// Turn a probe's own outcome into its result
fn settle(key: &str, outcome: Result<String>) -> ProbeResult {
    match outcome {
        Ok(value) => ProbeResult::ok(key, value),
        Err(FingerprintError::Unsupported { capability }) => {
            tracing::debug!("Probe {} unsupported: {}", key, capability);
            ProbeResult::unsupported(key)
        }
        Err(e) => {
            tracing::warn!("Probe {} failed: {}", key, e);
            ProbeResult::error(key, e.to_string())
        }
    }
}

fn panicked(key: &str, panic: Box<dyn Any + Send>) -> ProbeResult {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::warn!("Probe {} panicked: {}", key, message);
    ProbeResult::error(key, format!("panicked: {}", message))
}
