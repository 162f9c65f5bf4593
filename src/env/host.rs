use crate::device::{
    SerialSource, SystemSerialSource, current_platform, get_local_ip, serial_command,
};
use crate::env::traits::{Capability, Environment, Signal};
use crate::error::{FingerprintError, Result};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;

/// Environment backed by the machine this process runs on
///
/// A host has no screen, WebGL, font or canvas APIs to offer; probes that need
/// them come out as unsupported.
#[derive(Clone)]
pub struct HostEnvironment {
    serial: Arc<dyn SerialSource>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self {
            serial: Arc::new(SystemSerialSource),
        }
    }

    pub fn with_serial_source(serial: Arc<dyn SerialSource>) -> Self {
        Self { serial }
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// `en_US.UTF-8` -> `en-US`
fn locale_to_language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

fn host_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|locale| locale_to_language_tag(&locale))
}

/// Minutes to add to local time to reach UTC, matching the browser's
/// `getTimezoneOffset` sign convention
fn timezone_offset_minutes() -> i32 {
    -(Local::now().offset().local_minus_utc() / 60)
}

#[async_trait]
impl Environment for HostEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Navigator | Capability::Intl | Capability::WebRtc => true,
            Capability::SerialNumber => serial_command(current_platform()).is_some(),
            Capability::Screen
            | Capability::WebGl
            | Capability::WebGlDebugInfo
            | Capability::Fonts
            | Capability::Canvas => false,
        }
    }

    fn signal(&self, signal: Signal) -> Result<Option<String>> {
        let value = match signal {
            Signal::UserAgent => Some(format!(
                "{}/{} ({}; {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            Signal::Language => host_language(),
            Signal::Platform => Some(format!(
                "{}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            Signal::TimezoneOffset => Some(timezone_offset_minutes().to_string()),
            Signal::HardwareConcurrency => Some(std::thread::available_parallelism()?.to_string()),
            Signal::DeviceMemory => None,
            other => {
                return Err(FingerprintError::unsupported(other.capability().to_string()));
            }
        };
        Ok(value)
    }

    fn font_available(&self, _family: &str) -> Result<bool> {
        Err(FingerprintError::unsupported(Capability::Fonts.to_string()))
    }

    async fn render_canvas(&self) -> Result<Vec<u8>> {
        Err(FingerprintError::unsupported(Capability::Canvas.to_string()))
    }

    async fn ice_candidates(&self) -> Result<Vec<String>> {
        Ok(vec![get_local_ip().await?.to_string()])
    }

    async fn serial_number(&self) -> Result<String> {
        Ok(self.serial.read().await?.serial_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_to_language_tag() {
        assert_eq!(locale_to_language_tag("en_US.UTF-8"), Some("en-US".to_string()));
        assert_eq!(locale_to_language_tag("de_DE@euro"), Some("de-DE".to_string()));
        assert_eq!(locale_to_language_tag("fr"), Some("fr".to_string()));
        assert_eq!(locale_to_language_tag("C"), None);
        assert_eq!(locale_to_language_tag("POSIX"), None);
        assert_eq!(locale_to_language_tag(""), None);
    }

    #[test]
    fn test_host_capabilities() {
        let env = HostEnvironment::new();
        assert!(env.supports(Capability::Navigator));
        assert!(!env.supports(Capability::Canvas));
        assert!(!env.supports(Capability::WebGl));
    }

    #[test]
    fn test_host_signals() {
        let env = HostEnvironment::new();

        let platform = env.signal(Signal::Platform).unwrap().unwrap();
        assert!(platform.starts_with(std::env::consts::OS));

        let cores: usize = env
            .signal(Signal::HardwareConcurrency)
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!(cores >= 1);

        assert!(env.signal(Signal::ScreenWidth).is_err());
    }

    struct FixedSerial;

    #[async_trait]
    impl SerialSource for FixedSerial {
        async fn read(&self) -> Result<crate::model::SerialNumber> {
            Ok(crate::model::SerialNumber {
                serial_number: "PF2ABCDE".to_string(),
                platform: "win32".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_serial_number_comes_from_source() {
        let env = HostEnvironment::with_serial_source(Arc::new(FixedSerial));
        assert_eq!(env.serial_number().await.unwrap(), "PF2ABCDE");
    }
}
