use crate::error::{FingerprintError, Result};
use crate::model::SerialNumber;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use tokio::process::Command;

/// Platform name in the form the serial-number endpoint reports it
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    }
}

const WINDOWS_SERIAL_ARGS: &[&str] = &["bios", "get", "serialnumber"];
const MACOS_SERIAL_ARGS: &[&str] = &[
    "-c",
    "system_profiler SPHardwareDataType | grep \"Serial Number\"",
];
// -n so a missing sudoers entry fails instead of prompting
const LINUX_SERIAL_ARGS: &[&str] = &["-n", "dmidecode", "-s", "system-serial-number"];

/// Shell command that prints the hardware serial number on `platform`
pub fn serial_command(platform: &str) -> Option<(&'static str, &'static [&'static str])> {
    match platform {
        "win32" => Some(("wmic", WINDOWS_SERIAL_ARGS)),
        "darwin" => Some(("sh", MACOS_SERIAL_ARGS)),
        "linux" => Some(("sudo", LINUX_SERIAL_ARGS)),
        _ => None,
    }
}

/// Extract the serial number from the command's stdout
pub fn parse_serial_output(platform: &str, stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();

    let serial = match platform {
        // Header line, then the value
        "win32" => trimmed.lines().nth(1).map(str::trim),
        // "Serial Number (system): C02XYZ"
        "darwin" => trimmed.split_once(':').map(|(_, value)| value.trim()),
        _ => Some(trimmed),
    }?;

    if serial.is_empty() {
        None
    } else {
        Some(serial.to_string())
    }
}

/// Run the platform command and return the hardware serial number
pub async fn read_serial_number() -> Result<SerialNumber> {
    let platform = current_platform();
    let (program, args) =
        serial_command(platform).ok_or_else(|| FingerprintError::UnsupportedPlatform {
            platform: platform.to_string(),
        })?;

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("Error executing serial number command: {}", stderr.trim());
        return Err(FingerprintError::command_failed(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let serial_number = parse_serial_output(platform, &stdout)
        .ok_or_else(|| FingerprintError::command_failed("serial number output was empty"))?;

    Ok(SerialNumber {
        serial_number,
        platform: platform.to_string(),
    })
}

/// Source of the hardware serial number, swappable for tests
#[async_trait]
pub trait SerialSource: Send + Sync {
    async fn read(&self) -> Result<SerialNumber>;
}

/// Reads the serial number by shelling out to the platform command
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSerialSource;

#[async_trait]
impl SerialSource for SystemSerialSource {
    async fn read(&self) -> Result<SerialNumber> {
        read_serial_number().await
    }
}

/// Address of the interface that routes to the public internet
///
/// Connecting a UDP socket sends no packets; it only selects a route.
pub async fn get_local_ip() -> Result<Ipv4Addr> {
    let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect("8.8.8.8:80").await?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(addr) => Ok(addr),
        _ => Err(FingerprintError::network("Local IP is not IPv4")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_command_per_platform() {
        assert_eq!(serial_command("win32").map(|(p, _)| p), Some("wmic"));
        assert_eq!(serial_command("darwin").map(|(p, _)| p), Some("sh"));
        assert_eq!(serial_command("linux").map(|(p, _)| p), Some("sudo"));
        assert!(serial_command("freebsd").is_none());
    }

    #[test]
    fn test_parse_windows_output() {
        let stdout = "SerialNumber  \r\nPF2ABCDE  \r\n\r\n";
        assert_eq!(
            parse_serial_output("win32", stdout),
            Some("PF2ABCDE".to_string())
        );
    }

    #[test]
    fn test_parse_macos_output() {
        let stdout = "      Serial Number (system): C02XK1ZZJGH5\n";
        assert_eq!(
            parse_serial_output("darwin", stdout),
            Some("C02XK1ZZJGH5".to_string())
        );
    }

    #[test]
    fn test_parse_linux_output() {
        assert_eq!(
            parse_serial_output("linux", "  VMware-56 4d  \n"),
            Some("VMware-56 4d".to_string())
        );
        assert_eq!(parse_serial_output("linux", "\n"), None);
        assert_eq!(parse_serial_output("win32", "SerialNumber\n"), None);
    }

    #[test]
    fn test_current_platform_is_node_style() {
        let platform = current_platform();
        assert_ne!(platform, "windows");
        assert_ne!(platform, "macos");
    }
}
