pub mod candidate;
pub mod classifier;
pub mod command;
pub mod driver;
pub mod error;
pub mod events;
pub mod export;
pub mod io;
pub mod outcome;
pub mod platform;
pub mod prompt;
pub mod report;
pub mod style;
pub mod trial;

pub mod prelude {
    pub use crate::candidate::{Candidate, Target};
    pub use crate::classifier::{ClassifierRules, OutcomeClassifier, SubstringClassifier};
    pub use crate::command::{CommandRunner, SystemCommandRunner};
    pub use crate::driver::Driver;
    pub use crate::error::WifiBfError;
    pub use crate::events::{ConsoleSink, Event, EventSink, SseSink, Tally};
    pub use crate::outcome::{FailureReason, TrialOutcome};
    pub use crate::style::Style;
    pub use crate::trial::{NetworksetupTrial, TrialConfig, TrialRunner};
}
