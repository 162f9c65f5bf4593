use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An environment API a probe may depend on
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Navigator,
    Screen,
    Intl,
    WebGl,
    WebGlDebugInfo,
    Fonts,
    Canvas,
    WebRtc,
    SerialNumber,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigator => "navigator",
            Self::Screen => "screen",
            Self::Intl => "intl",
            Self::WebGl => "webgl",
            Self::WebGlDebugInfo => "webgl-debug-info",
            Self::Fonts => "fonts",
            Self::Canvas => "canvas",
            Self::WebRtc => "webrtc",
            Self::SerialNumber => "serial-number",
        };
        f.write_str(name)
    }
}

/// A single synchronous environment read
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    UserAgent,
    Language,
    Platform,
    TimezoneOffset,
    HardwareConcurrency,
    DeviceMemory,
    ColorDepth,
    ScreenWidth,
    ScreenHeight,
    WebGlVendor,
    WebGlRenderer,
    UnmaskedVendor,
    UnmaskedRenderer,
}

impl Signal {
    /// Capability the signal is read through
    pub fn capability(self) -> Capability {
        match self {
            Self::UserAgent
            | Self::Language
            | Self::Platform
            | Self::HardwareConcurrency
            | Self::DeviceMemory => Capability::Navigator,
            Self::TimezoneOffset => Capability::Intl,
            Self::ColorDepth | Self::ScreenWidth | Self::ScreenHeight => Capability::Screen,
            Self::WebGlVendor | Self::WebGlRenderer => Capability::WebGl,
            Self::UnmaskedVendor | Self::UnmaskedRenderer => Capability::WebGlDebugInfo,
        }
    }
}

/// Capability accessor injected into every probe
///
/// Probes read the environment only through this trait, which keeps collection
/// a pure function of the accessor and lets tests substitute a snapshot.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Whether the environment exposes the given API at all
    fn supports(&self, capability: Capability) -> bool;

    /// Read a signal. `Ok(None)` means the API exists but reports no value.
    fn signal(&self, signal: Signal) -> Result<Option<String>>;

    /// Whether a font family renders with its own glyphs
    fn font_available(&self, family: &str) -> Result<bool>;

    /// Render the reference scene and return the raw pixel data
    async fn render_canvas(&self) -> Result<Vec<u8>>;

    /// Gather local ICE candidate addresses
    async fn ice_candidates(&self) -> Result<Vec<String>>;

    /// OS-level hardware serial number
    async fn serial_number(&self) -> Result<String>;
}
