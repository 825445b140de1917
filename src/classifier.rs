//! Outcome classification from command output.
//!
//! `networksetup` does not report join failures through its exit code, so
//! the decision is made from text: rejection markers on the join command's
//! stderr, then the status line printed by `-getairportnetwork`. The rules
//! live in [`ClassifierRules`] so they can be swapped without touching the
//! trial runner.
use log::warn;
use regex::Regex;

use crate::outcome::{FailureReason, TrialOutcome};

/// Something the trial runner observed and wants classified.
#[derive(Debug, Clone, Copy)]
pub enum Observation<'a> {
    /// Captured stderr of the join command.
    Join { stderr: &'a str },
    /// Output of the status query, taken after the settle delay.
    Status { ssid: &'a str, output: &'a str },
}

/// Classification of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing conclusive yet; proceed to the next step.
    Continue,
    Decided(TrialOutcome),
}

pub trait OutcomeClassifier {
    fn classify(&self, observation: &Observation<'_>) -> Verdict;

    /// Network name a status output reports, for diagnostics only.
    fn current_network<'a>(&self, _output: &'a str) -> Option<&'a str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRules {
    /// Any of these on the join command's stderr means the credential was
    /// rejected. Matching is case-sensitive.
    pub rejection_markers: Vec<String>,
    /// Prefix of the status line, immediately followed by the current SSID.
    pub status_prefix: String,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rejection_markers: vec!["Failed".to_string(), "incorrect".to_string()],
            status_prefix: "Current Wi-Fi Network: ".to_string(),
        }
    }
}

/// Substring-based classifier driven by [`ClassifierRules`].
///
/// Success is substring containment of `<status_prefix><ssid>` in the status
/// output, so a target `HomeNet` is also satisfied by `HomeNet5G`.
#[derive(Debug, Clone)]
pub struct SubstringClassifier {
    rules: ClassifierRules,
    current: Option<Regex>,
}

impl SubstringClassifier {
    pub fn new(rules: ClassifierRules) -> Self {
        let pattern = format!(r"(?m)^{}(.*)$", regex::escape(&rules.status_prefix));
        let current = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("status line pattern rejected, network names will not be reported: {}", e);
                None
            }
        };
        Self { rules, current }
    }
}

impl Default for SubstringClassifier {
    fn default() -> Self {
        Self::new(ClassifierRules::default())
    }
}

impl OutcomeClassifier for SubstringClassifier {
    fn classify(&self, observation: &Observation<'_>) -> Verdict {
        match observation {
            Observation::Join { stderr } => {
                if self
                    .rules
                    .rejection_markers
                    .iter()
                    .any(|m| !m.is_empty() && stderr.contains(m.as_str()))
                {
                    Verdict::Decided(TrialOutcome::Failure(FailureReason::ExplicitErrorText))
                } else {
                    Verdict::Continue
                }
            }
            Observation::Status { ssid, output } => {
                let expected = format!("{}{}", self.rules.status_prefix, ssid);
                if output.contains(&expected) {
                    Verdict::Decided(TrialOutcome::Success)
                } else {
                    Verdict::Decided(TrialOutcome::Failure(
                        FailureReason::VerificationMismatch,
                    ))
                }
            }
        }
    }

    fn current_network<'a>(&self, output: &'a str) -> Option<&'a str> {
        let re = self.current.as_ref()?;
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_end())
    }
}
