//! Built-in probe catalogue
//!
//! Each constructor returns one [`Probe`]; [`crate::core::ProbeRegistry::standard`]
//! fixes their order.

use crate::client::SerialClient;
use crate::crypto::sha256_from_bytes;
use crate::env::{Capability, Environment, Signal};
use crate::error::{FingerprintError, Result};
use crate::model::StabilityTier;
use crate::probe::Probe;
use std::time::Duration;

/// Font families checked by the `fonts` probe, in output order
pub const FONT_CANDIDATES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier",
    "Verdana",
    "Georgia",
    "Palatino",
    "Garamond",
    "Bookman",
    "Comic Sans MS",
    "Trebuchet MS",
    "Arial Black",
    "Impact",
];

/// Read a signal, treating a missing value as an unsupported API
fn read_signal(env: &dyn Environment, signal: Signal) -> Result<String> {
    env.signal(signal)?
        .ok_or_else(|| FingerprintError::unsupported(format!("{:?}", signal)))
}

fn signal_probe(key: &str, tier: StabilityTier, signal: Signal) -> Probe {
    Probe::sync(key, tier, move |env| read_signal(env, signal)).requires(signal.capability())
}

pub fn user_agent() -> Probe {
    signal_probe("user_agent", StabilityTier::Environmental, Signal::UserAgent)
}

pub fn language() -> Probe {
    signal_probe("language", StabilityTier::Environmental, Signal::Language)
}

pub fn timezone_offset() -> Probe {
    signal_probe(
        "timezone_offset",
        StabilityTier::Environmental,
        Signal::TimezoneOffset,
    )
}

pub fn hardware_concurrency() -> Probe {
    signal_probe(
        "hardware_concurrency",
        StabilityTier::Structural,
        Signal::HardwareConcurrency,
    )
}

pub fn device_memory() -> Probe {
    signal_probe(
        "device_memory",
        StabilityTier::Structural,
        Signal::DeviceMemory,
    )
}

pub fn color_depth() -> Probe {
    signal_probe("color_depth", StabilityTier::Structural, Signal::ColorDepth)
}

pub fn screen_resolution() -> Probe {
    Probe::sync("screen_resolution", StabilityTier::Structural, |env| {
        let width = read_signal(env, Signal::ScreenWidth)?;
        let height = read_signal(env, Signal::ScreenHeight)?;
        Ok(format!("{}x{}", width, height))
    })
    .requires(Capability::Screen)
}

pub fn platform() -> Probe {
    signal_probe("platform", StabilityTier::Structural, Signal::Platform)
}

/// Prefer the unmasked debug-info value, fall back to the masked one
fn webgl_value(env: &dyn Environment, unmasked: Signal, masked: Signal) -> Result<String> {
    if env.supports(Capability::WebGlDebugInfo) {
        if let Some(value) = env.signal(unmasked)? {
            return Ok(value);
        }
    }
    read_signal(env, masked)
}

pub fn webgl_vendor() -> Probe {
    Probe::sync("webgl_vendor", StabilityTier::Structural, |env| {
        webgl_value(env, Signal::UnmaskedVendor, Signal::WebGlVendor)
    })
    .requires(Capability::WebGl)
}

pub fn webgl_renderer() -> Probe {
    Probe::sync("webgl_renderer", StabilityTier::Structural, |env| {
        webgl_value(env, Signal::UnmaskedRenderer, Signal::WebGlRenderer)
    })
    .requires(Capability::WebGl)
}

pub fn fonts() -> Probe {
    Probe::sync("fonts", StabilityTier::HighEntropy, |env| {
        let mut detected = Vec::new();
        for family in FONT_CANDIDATES {
            if env.font_available(family)? {
                detected.push(*family);
            }
        }
        Ok(detected.join(","))
    })
    .requires(Capability::Fonts)
}

/// Digest of the rendered reference scene; the raw pixels are too large for
/// the canonical string
pub fn canvas(timeout: Duration) -> Probe {
    Probe::asynchronous("canvas", StabilityTier::HighEntropy, timeout, |env| async move {
        let pixels = env.render_canvas().await?;
        Ok(sha256_from_bytes(&pixels))
    })
    .requires(Capability::Canvas)
}

/// Sorted, de-duplicated local candidate addresses
pub fn local_addresses(timeout: Duration) -> Probe {
    Probe::asynchronous(
        "local_addresses",
        StabilityTier::HighEntropy,
        timeout,
        |env| async move {
            let mut addresses = env.ice_candidates().await?;
            addresses.sort();
            addresses.dedup();
            Ok(addresses.join(","))
        },
    )
    .requires(Capability::WebRtc)
}

pub fn serial_number(timeout: Duration) -> Probe {
    Probe::asynchronous(
        "serial_number",
        StabilityTier::Structural,
        timeout,
        |env| async move { env.serial_number().await },
    )
    .requires(Capability::SerialNumber)
}

/// Serial number fetched from a remote `/api/uuid` endpoint
pub fn remote_serial_number(client: SerialClient, timeout: Duration) -> Probe {
    Probe::asynchronous(
        "remote_serial_number",
        StabilityTier::Structural,
        timeout,
        move |_env| {
            let client = client.clone();
            async move { Ok(client.fetch().await?.serial_number) }
        },
    )
}
