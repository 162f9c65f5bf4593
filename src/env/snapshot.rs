use crate::env::traits::{Capability, Environment, Signal};
use crate::error::{FingerprintError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Asynchronous environment operations that a snapshot can delay, hang or fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Canvas,
    IceCandidates,
    SerialNumber,
}

/// Environment replayed from a recorded snapshot
///
/// Loaded from JSON for reproducible runs, and built in code as the test
/// double for the pipeline. Async operations can be slowed down, made to
/// hang forever, or made to fail, to exercise timeouts and completion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotEnvironment {
    pub capabilities: BTreeSet<Capability>,
    pub signals: BTreeMap<Signal, String>,
    pub fonts: BTreeSet<String>,
    /// Rendered canvas bytes, as text
    pub canvas: Option<String>,
    pub ice_candidates: Vec<String>,
    pub serial_number: Option<String>,
    pub delays_ms: BTreeMap<Operation, u64>,
    pub hanging: BTreeSet<Operation>,
    pub failing_signals: BTreeSet<Signal>,
    pub failing_operations: BTreeSet<Operation>,
}

impl SnapshotEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_json(&contents)
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Set a signal and enable the capability it is read through
    pub fn with_signal(mut self, signal: Signal, value: impl Into<String>) -> Self {
        self.capabilities.insert(signal.capability());
        self.signals.insert(signal, value.into());
        self
    }

    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.capabilities.insert(Capability::Fonts);
        self.fonts.insert(family.into());
        self
    }

    pub fn with_canvas(mut self, pixels: impl Into<String>) -> Self {
        self.capabilities.insert(Capability::Canvas);
        self.canvas = Some(pixels.into());
        self
    }

    pub fn with_ice_candidate(mut self, address: impl Into<String>) -> Self {
        self.capabilities.insert(Capability::WebRtc);
        self.ice_candidates.push(address.into());
        self
    }

    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.capabilities.insert(Capability::SerialNumber);
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_delay(mut self, operation: Operation, delay: Duration) -> Self {
        self.delays_ms.insert(operation, delay.as_millis() as u64);
        self
    }

    /// Make an async operation never resolve
    pub fn hang(mut self, operation: Operation) -> Self {
        self.hanging.insert(operation);
        self
    }

    pub fn fail_signal(mut self, signal: Signal) -> Self {
        self.failing_signals.insert(signal);
        self
    }

    pub fn fail_operation(mut self, operation: Operation) -> Self {
        self.failing_operations.insert(operation);
        self
    }

    async fn settle(&self, operation: Operation) -> Result<()> {
        if self.hanging.contains(&operation) {
            std::future::pending::<()>().await;
        }

        if let Some(ms) = self.delays_ms.get(&operation) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        if self.failing_operations.contains(&operation) {
            return Err(FingerprintError::network(format!(
                "{:?} failed in snapshot",
                operation
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Environment for SnapshotEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn signal(&self, signal: Signal) -> Result<Option<String>> {
        if self.failing_signals.contains(&signal) {
            return Err(FingerprintError::network(format!(
                "reading {:?} failed in snapshot",
                signal
            )));
        }
        if !self.supports(signal.capability()) {
            return Err(FingerprintError::unsupported(signal.capability().to_string()));
        }
        Ok(self.signals.get(&signal).cloned())
    }

    fn font_available(&self, family: &str) -> Result<bool> {
        Ok(self.fonts.contains(family))
    }

    async fn render_canvas(&self) -> Result<Vec<u8>> {
        self.settle(Operation::Canvas).await?;
        self.canvas
            .as_ref()
            .map(|pixels| pixels.as_bytes().to_vec())
            .ok_or_else(|| FingerprintError::unsupported(Capability::Canvas.to_string()))
    }

    async fn ice_candidates(&self) -> Result<Vec<String>> {
        self.settle(Operation::IceCandidates).await?;
        Ok(self.ice_candidates.clone())
    }

    async fn serial_number(&self) -> Result<String> {
        self.settle(Operation::SerialNumber).await?;
        self.serial_number
            .clone()
            .ok_or_else(|| FingerprintError::unsupported(Capability::SerialNumber.to_string()))
    }
}
