//! Host checks and Wi-Fi interface discovery.
//!
//! `networksetup` only exists on macOS, so the binary refuses to start
//! anywhere else. The interface defaults to whatever `networksetup
//! -listallhardwareports` reports for the Wi-Fi port:
//!
//! ```text
//! Hardware Port: Wi-Fi
//! Device: en0
//! Ethernet Address: ...
//! ```
//!
//! Nearby networks are listed with the `airport` utility, whose `-s` output
//! is a fixed-width table.
use std::time::Duration;

use log::{debug, warn};

use crate::candidate::DEFAULT_INTERFACE;
use crate::command::CommandRunner;
use crate::error::WifiBfError;
use crate::trial::NETWORKSETUP;

/// `std::env::consts::OS` value of the only supported host.
pub const SUPPORTED_OS: &str = "macos";

const LIST_PORTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Private-framework scanner shipped with macOS.
pub const AIRPORT: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// One row of an `airport -s` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedNetwork {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
    pub channel: String,
    pub security: String,
}

pub fn check_host(os: &str) -> Result<(), WifiBfError> {
    if os == SUPPORTED_OS {
        Ok(())
    } else {
        Err(WifiBfError::PlatformUnsupported(os.to_string()))
    }
}

pub fn ensure_supported_host() -> Result<(), WifiBfError> {
    check_host(std::env::consts::OS)
}

/// Parse `-listallhardwareports` output for the Wi-Fi device name.
pub fn parse_wifi_device(listing: &str) -> Option<String> {
    let mut in_wifi = false;
    for line in listing.lines() {
        let trimmed = line.trim();
        if let Some(port) = trimmed.strip_prefix("Hardware Port:") {
            let port = port.trim();
            in_wifi = port == "Wi-Fi" || port == "AirPort";
            continue;
        }
        if in_wifi {
            if let Some(dev) = trimmed.strip_prefix("Device:") {
                let dev = dev.trim();
                if !dev.is_empty() {
                    return Some(dev.to_string());
                }
            }
            if trimmed.is_empty() {
                in_wifi = false;
            }
        }
    }
    None
}

/// Detect the Wi-Fi interface, falling back to [`DEFAULT_INTERFACE`].
pub fn detect_wifi_interface<R: CommandRunner>(runner: &R) -> String {
    match runner.run(
        NETWORKSETUP,
        &["-listallhardwareports"],
        Some(LIST_PORTS_TIMEOUT),
    ) {
        Ok(out) => {
            if let Some(dev) = parse_wifi_device(&out.stdout) {
                debug!("detected Wi-Fi interface {}", dev);
                return dev;
            }
            warn!(
                "no Wi-Fi port in hardware listing; falling back to {}",
                DEFAULT_INTERFACE
            );
        }
        Err(e) => warn!("{}; falling back to {}", e, DEFAULT_INTERFACE),
    }
    DEFAULT_INTERFACE.to_string()
}

/// Characters `start..end` of `line`, trimmed. Short lines yield `""`.
fn column(line: &str, start: usize, end: Option<usize>) -> String {
    let chars = line.chars().skip(start);
    let cut: String = match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    };
    cut.trim().to_string()
}

/// Parse an `airport -s` listing. The header row is skipped, as are rows
/// without an SSID. Networks come back strongest signal first.
pub fn parse_airport_scan(listing: &str) -> Vec<ScannedNetwork> {
    let mut networks: Vec<ScannedNetwork> = listing
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let ssid = column(line, 0, Some(33));
            if ssid.is_empty() {
                return None;
            }
            let bssid = column(line, 33, Some(51));
            let security = column(line, 72, None);
            Some(ScannedNetwork {
                ssid,
                bssid: if bssid.is_empty() { "N/A".to_string() } else { bssid },
                rssi: column(line, 51, Some(56)).parse().unwrap_or(0),
                channel: column(line, 56, Some(64)),
                security: if security.is_empty() {
                    "Open".to_string()
                } else {
                    security
                },
            })
        })
        .collect();
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    networks
}

/// Scan for nearby networks with `airport -s`.
pub fn scan_networks<R: CommandRunner>(runner: &R) -> Result<Vec<ScannedNetwork>, WifiBfError> {
    let out = runner
        .run(AIRPORT, &["-s"], Some(SCAN_TIMEOUT))
        .map_err(|e| WifiBfError::Scan(e.to_string()))?;
    if !out.success() {
        return Err(WifiBfError::Scan(format!(
            "airport exited with {:?}: {}",
            out.code,
            out.stderr.trim()
        )));
    }
    let networks = parse_airport_scan(&out.stdout);
    debug!("scan found {} networks", networks.len());
    Ok(networks)
}
