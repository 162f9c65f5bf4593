use crate::error::{FingerprintError, Result};
use crate::model::{DisplayState, Fingerprint, ProbeResult, SlotLayout};

/// Pipeline state machine for one fingerprint request
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PipelineState {
    /// Request accepted, nothing started
    #[default]
    Idle,

    /// Probes are running; waiting on the fan-in join
    Collecting,

    /// Results are in and being turned into the canonical string
    Serializing {
        results: Vec<ProbeResult>,
        layout: SlotLayout,
    },

    /// Canonical string is built and being digested
    Hashing {
        results: Vec<ProbeResult>,
        layout: SlotLayout,
        canonical: String,
    },

    /// Fingerprint is complete
    Ready(Fingerprint),

    /// A structural error aborted the run
    Failed { reason: String },

    /// The caller gave up before the run finished
    Cancelled,
}

impl PipelineState {
    /// Begin collecting
    pub fn start(self) -> Result<Self> {
        match self {
            Self::Idle => Ok(Self::Collecting),
            other => Err(FingerprintError::invalid_state(format!(
                "Cannot start collection from {}",
                other.name()
            ))),
        }
    }

    /// All probes settled
    pub fn collected(self, results: Vec<ProbeResult>, layout: SlotLayout) -> Result<Self> {
        match self {
            Self::Collecting => Ok(Self::Serializing { results, layout }),
            other => Err(FingerprintError::invalid_state(format!(
                "Cannot accept results from {}",
                other.name()
            ))),
        }
    }

    /// Canonical string built
    pub fn serialized(self, canonical: String) -> Result<Self> {
        match self {
            Self::Serializing { results, layout } => Ok(Self::Hashing {
                results,
                layout,
                canonical,
            }),
            other => Err(FingerprintError::invalid_state(format!(
                "Cannot accept a canonical string from {}",
                other.name()
            ))),
        }
    }

    /// Digest computed; the run is complete
    pub fn hashed(self, digest: String, algorithm_version: u32) -> Result<Self> {
        match self {
            Self::Hashing {
                results,
                layout,
                canonical,
            } => Ok(Self::Ready(Fingerprint {
                canonical,
                digest,
                algorithm_version,
                layout,
                results,
            })),
            other => Err(FingerprintError::invalid_state(format!(
                "Cannot accept a digest from {}",
                other.name()
            ))),
        }
    }

    /// Abort on a structural error
    pub fn fail(self, reason: impl Into<String>) -> Result<Self> {
        if self.is_terminal() {
            return Err(FingerprintError::invalid_state(format!(
                "Cannot fail from {}",
                self.name()
            )));
        }
        Ok(Self::Failed {
            reason: reason.into(),
        })
    }

    /// Abandon the run at the caller's request
    pub fn cancel(self) -> Result<Self> {
        if self.is_terminal() {
            return Err(FingerprintError::invalid_state(format!(
                "Cannot cancel from {}",
                self.name()
            )));
        }
        Ok(Self::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed { .. } | Self::Cancelled)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Results, once collection has finished and until the run is complete
    pub fn results(&self) -> Option<&[ProbeResult]> {
        match self {
            Self::Serializing { results, .. } | Self::Hashing { results, .. } => Some(results),
            Self::Ready(fingerprint) => Some(&fingerprint.results),
            _ => None,
        }
    }

    /// Only a Ready state exposes a fingerprint
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Ready(fingerprint) => Some(fingerprint),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::Serializing { .. } => "serializing",
            Self::Hashing { .. } => "hashing",
            Self::Ready(_) => "ready",
            Self::Failed { .. } => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// UI projection: anything short of a terminal state is loading
    pub fn display(&self) -> DisplayState {
        match self {
            Self::Ready(fingerprint) => DisplayState::Ready {
                digest: fingerprint.digest.clone(),
            },
            Self::Failed { reason } => DisplayState::Error {
                message: reason.clone(),
            },
            Self::Cancelled => DisplayState::Error {
                message: "cancelled".to_string(),
            },
            _ => DisplayState::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<ProbeResult> {
        vec![ProbeResult::ok("p1", "4"), ProbeResult::timeout("p2")]
    }

    #[test]
    fn test_pipeline_lifecycle() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
        let state = PipelineState::Idle.start().unwrap();
        assert_eq!(state.display(), DisplayState::Loading);

        let state = state.collected(results(), SlotLayout::FixedPosition).unwrap();
        assert_eq!(state.results().map(<[ProbeResult]>::len), Some(2));
        assert!(state.fingerprint().is_none());

        let state = state.serialized("p1:4|p2:timeout".to_string()).unwrap();
        let state = state.hashed("abcd0123".to_string(), 1).unwrap();

        assert!(state.is_ready());
        assert!(state.is_terminal());
        let fingerprint = state.fingerprint().unwrap();
        assert_eq!(fingerprint.canonical, "p1:4|p2:timeout");
        assert_eq!(fingerprint.algorithm_version, 1);
        assert_eq!(
            state.display(),
            DisplayState::Ready {
                digest: "abcd0123".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_state_transitions() {
        // Cannot skip collection
        assert!(
            PipelineState::Idle
                .collected(results(), SlotLayout::FixedPosition)
                .is_err()
        );

        // Cannot hash before serializing
        assert!(PipelineState::Collecting.hashed("x".to_string(), 2).is_err());

        // Cannot restart
        assert!(PipelineState::Collecting.start().is_err());
    }

    #[test]
    fn test_failure_from_any_running_state() {
        let state = PipelineState::Collecting.fail("boom").unwrap();
        assert_eq!(
            state.display(),
            DisplayState::Error {
                message: "boom".to_string()
            }
        );
        assert!(state.fingerprint().is_none());

        let serializing = PipelineState::Serializing {
            results: results(),
            layout: SlotLayout::FixedPosition,
        };
        assert!(matches!(
            serializing.fail("bad order").unwrap(),
            PipelineState::Failed { .. }
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(PipelineState::Cancelled.fail("late").is_err());
        assert!(PipelineState::Failed { reason: "x".into() }.cancel().is_err());

        let cancelled = PipelineState::Collecting.cancel().unwrap();
        assert_eq!(cancelled, PipelineState::Cancelled);
        assert!(matches!(cancelled.display(), DisplayState::Error { .. }));
    }
}
