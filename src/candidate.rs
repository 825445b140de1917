//! Candidate and target data model.
//!
//! A [`Candidate`] is one wordlist entry paired with its 1-based position in
//! the file. Positions are assigned to every physical line, blank ones
//! included, so the ordinal printed for an attempt always matches the line
//! number in the wordlist.
//!
//! A [`Target`] names the network to join and the wireless interface used
//! for every trial of a run.
use crate::error::WifiBfError;

/// Interface used when none is configured or detected.
pub const DEFAULT_INTERFACE: &str = "en0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ordinal: usize,
    pub credential: String,
}

impl Candidate {
    /// Build a candidate from a raw wordlist line. Returns `None` when the
    /// line is blank after trimming.
    pub fn from_line(ordinal: usize, line: &str) -> Option<Self> {
        let credential = line.trim();
        if credential.is_empty() {
            return None;
        }
        Some(Self {
            ordinal,
            credential: credential.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub ssid: String,
    pub interface: String,
}

impl Target {
    /// Validate and build a target. The SSID is passed to `networksetup`
    /// exactly as given, since network names may carry spaces; one that is
    /// blank after trimming is rejected, as is an empty interface.
    pub fn new(ssid: &str, interface: &str) -> Result<Self, WifiBfError> {
        if ssid.trim().is_empty() {
            return Err(WifiBfError::InvalidInput("SSID is required".into()));
        }
        let interface = interface.trim();
        if interface.is_empty() {
            return Err(WifiBfError::InvalidInput(
                "network interface is required".into(),
            ));
        }
        Ok(Self {
            ssid: ssid.to_string(),
            interface: interface.to_string(),
        })
    }
}
