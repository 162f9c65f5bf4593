use crate::env::{Capability, Environment};
use crate::error::Result;
use crate::model::StabilityTier;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub type SyncCollect = Arc<dyn Fn(&dyn Environment) -> Result<String> + Send + Sync>;
pub type AsyncCollect =
    Arc<dyn Fn(Arc<dyn Environment>) -> BoxFuture<'static, Result<String>> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeMode {
    Sync,
    Async { timeout: Duration },
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async { timeout } => write!(f, "async ({}ms)", timeout.as_millis()),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Collector {
    Sync(SyncCollect),
    Async {
        timeout: Duration,
        collect: AsyncCollect,
    },
}

/// A single named environment read
///
/// A probe is immutable once built. Collection functions only see the injected
/// [`Environment`] and return their value; they never write anywhere else.
#[derive(Clone)]
pub struct Probe {
    key: String,
    tier: StabilityTier,
    requires: Option<Capability>,
    collector: Collector,
}

impl Probe {
    /// Probe evaluated inline, in registration order
    pub fn sync<F>(key: impl Into<String>, tier: StabilityTier, collect: F) -> Self
    where
        F: Fn(&dyn Environment) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            tier,
            requires: None,
            collector: Collector::Sync(Arc::new(collect)),
        }
    }

    /// Probe run on its own task and abandoned after `timeout`
    pub fn asynchronous<F, Fut>(
        key: impl Into<String>,
        tier: StabilityTier,
        timeout: Duration,
        collect: F,
    ) -> Self
    where
        F: Fn(Arc<dyn Environment>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            key: key.into(),
            tier,
            requires: None,
            collector: Collector::Async {
                timeout,
                collect: Arc::new(move |env| collect(env).boxed()),
            },
        }
    }

    /// Declare the capability the probe needs; when the environment lacks it
    /// the probe is reported unsupported without being run
    pub fn requires(mut self, capability: Capability) -> Self {
        self.requires = Some(capability);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tier(&self) -> StabilityTier {
        self.tier
    }

    pub fn required_capability(&self) -> Option<Capability> {
        self.requires
    }

    pub fn mode(&self) -> ProbeMode {
        match &self.collector {
            Collector::Sync(_) => ProbeMode::Sync,
            Collector::Async { timeout, .. } => ProbeMode::Async { timeout: *timeout },
        }
    }

    pub(crate) fn collector(&self) -> &Collector {
        &self.collector
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("key", &self.key)
            .field("tier", &self.tier)
            .field("requires", &self.requires)
            .field("mode", &self.mode())
            .finish()
    }
}
