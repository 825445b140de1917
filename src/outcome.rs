use std::fmt;

/// Why a trial did not end in association with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The join command printed a rejection marker on stderr.
    ExplicitErrorText,
    /// The join command looked clean but the interface is not on the target.
    VerificationMismatch,
    /// The join command did not finish within the join timeout.
    Timeout,
    /// A command could not be run or its output could not be used.
    InvocationError,
}

impl FailureReason {
    pub const ALL: [FailureReason; 4] = [
        FailureReason::ExplicitErrorText,
        FailureReason::VerificationMismatch,
        FailureReason::Timeout,
        FailureReason::InvocationError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ExplicitErrorText => "explicit-error-text",
            FailureReason::VerificationMismatch => "verification-mismatch",
            FailureReason::Timeout => "timeout",
            FailureReason::InvocationError => "invocation-error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Success,
    Failure(FailureReason),
}

impl TrialOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrialOutcome::Success)
    }
}

impl fmt::Display for TrialOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialOutcome::Success => f.write_str("success"),
            TrialOutcome::Failure(reason) => write!(f, "failure ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_kebab_case_reasons() {
        assert_eq!(TrialOutcome::Success.to_string(), "success");
        assert_eq!(
            TrialOutcome::Failure(FailureReason::VerificationMismatch).to_string(),
            "failure (verification-mismatch)"
        );
        assert!(!TrialOutcome::Failure(FailureReason::Timeout).is_success());
    }
}
