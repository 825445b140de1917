//! Trial runner: one association attempt with one credential.
//!
//! A trial issues `networksetup -setairportnetwork`, inspects its stderr,
//! waits for the settle delay and then asks `networksetup
//! -getairportnetwork` which network the interface is on. Every path ends in
//! a [`TrialOutcome`]; nothing escapes as an error.
//!
//! Trials change the real association state of the interface, so callers must
//! never run two of them against the same interface at once. The driver
//! guarantees this by calling [`TrialRunner::attempt`] sequentially.
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::candidate::Target;
use crate::classifier::{Observation, OutcomeClassifier, SubstringClassifier, Verdict};
use crate::command::{CommandRunner, RunError, SystemCommandRunner};
use crate::outcome::{FailureReason, TrialOutcome};

/// The macOS network configuration tool.
pub const NETWORKSETUP: &str = "networksetup";

pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialConfig {
    /// Upper bound on the join command. Also applied to the status query.
    pub join_timeout: Duration,
    /// Pause between a clean join and the status query.
    pub settle_delay: Duration,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

pub trait TrialRunner {
    /// Attempt to join `target` with `credential`. `ordinal` is only used for
    /// reporting.
    fn attempt(&self, target: &Target, credential: &str, ordinal: usize) -> TrialOutcome;
}

impl<T: TrialRunner + ?Sized> TrialRunner for &T {
    fn attempt(&self, target: &Target, credential: &str, ordinal: usize) -> TrialOutcome {
        (**self).attempt(target, credential, ordinal)
    }
}

/// [`TrialRunner`] backed by `networksetup`.
#[derive(Debug, Clone)]
pub struct NetworksetupTrial<R = SystemCommandRunner, C = SubstringClassifier> {
    runner: R,
    classifier: C,
    config: TrialConfig,
}

impl NetworksetupTrial {
    /// Real command runner, default classifier rules.
    pub fn system(config: TrialConfig) -> Self {
        Self::new(SystemCommandRunner::new(), SubstringClassifier::default(), config)
    }
}

impl<R: CommandRunner, C: OutcomeClassifier> NetworksetupTrial<R, C> {
    pub fn new(runner: R, classifier: C, config: TrialConfig) -> Self {
        Self {
            runner,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    fn join(&self, target: &Target, credential: &str, ordinal: usize) -> Verdict {
        let args = [
            "-setairportnetwork",
            target.interface.as_str(),
            target.ssid.as_str(),
            credential,
        ];
        match self
            .runner
            .run(NETWORKSETUP, &args, Some(self.config.join_timeout))
        {
            Ok(out) => {
                debug!(
                    "[{}] join exited with {:?}, {} bytes on stderr",
                    ordinal,
                    out.code,
                    out.stderr.len()
                );
                self.classifier.classify(&Observation::Join {
                    stderr: &out.stderr,
                })
            }
            Err(RunError::TimedOut { after, .. }) => {
                info!("[{}] join command timed out after {:?}", ordinal, after);
                Verdict::Decided(TrialOutcome::Failure(FailureReason::Timeout))
            }
            Err(e) => {
                warn!("[{}] {}", ordinal, e);
                Verdict::Decided(TrialOutcome::Failure(FailureReason::InvocationError))
            }
        }
    }

    fn verify(&self, target: &Target, ordinal: usize) -> TrialOutcome {
        let args = ["-getairportnetwork", target.interface.as_str()];
        let out = match self
            .runner
            .run(NETWORKSETUP, &args, Some(self.config.join_timeout))
        {
            Ok(out) if out.success() => out,
            Ok(out) => {
                warn!(
                    "[{}] status query exited with {:?}: {}",
                    ordinal,
                    out.code,
                    out.stderr.trim()
                );
                return TrialOutcome::Failure(FailureReason::InvocationError);
            }
            Err(e) => {
                warn!("[{}] {}", ordinal, e);
                return TrialOutcome::Failure(FailureReason::InvocationError);
            }
        };
        let outcome = match self.classifier.classify(&Observation::Status {
            ssid: &target.ssid,
            output: &out.stdout,
        }) {
            Verdict::Decided(outcome) => outcome,
            // A status observation that stays inconclusive is not an association.
            Verdict::Continue => TrialOutcome::Failure(FailureReason::VerificationMismatch),
        };
        if outcome == TrialOutcome::Failure(FailureReason::VerificationMismatch) {
            debug!(
                "[{}] interface is on {:?}",
                ordinal,
                self.classifier.current_network(&out.stdout)
            );
        }
        outcome
    }
}

impl<R: CommandRunner, C: OutcomeClassifier> TrialRunner for NetworksetupTrial<R, C> {
    fn attempt(&self, target: &Target, credential: &str, ordinal: usize) -> TrialOutcome {
        if let Verdict::Decided(outcome) = self.join(target, credential, ordinal) {
            return outcome;
        }
        if !self.config.settle_delay.is_zero() {
            thread::sleep(self.config.settle_delay);
        }
        self.verify(target, ordinal)
    }
}
