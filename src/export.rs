//! Export helpers for writing run results to CSV and plain text files.
//!
//! - `save_attempts_csv` writes one row per trial: ordinal, credential,
//!   outcome and timestamp.
//! - `save_found_txt` writes `SSID:password` when a credential was found.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::events::{Attempt, Tally};
use crate::outcome::TrialOutcome;

#[derive(Debug, Serialize)]
struct AttemptRow<'a> {
    ordinal: usize,
    credential: &'a str,
    outcome: &'static str,
    reason: &'static str,
    at: String,
}

impl<'a> From<&'a Attempt> for AttemptRow<'a> {
    fn from(a: &'a Attempt) -> Self {
        let (outcome, reason) = match a.outcome {
            TrialOutcome::Success => ("success", ""),
            TrialOutcome::Failure(r) => ("failure", r.as_str()),
        };
        Self {
            ordinal: a.candidate.ordinal,
            credential: &a.candidate.credential,
            outcome,
            reason,
            at: a.at.to_rfc3339(),
        }
    }
}

pub fn save_attempts_csv<P: AsRef<Path>>(tally: &Tally, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for a in &tally.attempts {
        wtr.serialize(AttemptRow::from(a))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Returns `false` without creating a file when nothing was found.
pub fn save_found_txt<P: AsRef<Path>>(tally: &Tally, path: P) -> Result<bool> {
    let (Some(target), Some(found)) = (tally.target.as_ref(), tally.found()) else {
        return Ok(false);
    };
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    writeln!(f, "{}:{}", target.ssid, found.credential)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Target;
    use crate::driver::Driver;
    use crate::outcome::FailureReason;
    use crate::trial::TrialRunner;
    use tempfile::tempdir;

    struct Accept(&'static str);

    impl TrialRunner for Accept {
        fn attempt(&self, _t: &Target, credential: &str, _ordinal: usize) -> TrialOutcome {
            if credential == self.0 {
                TrialOutcome::Success
            } else {
                TrialOutcome::Failure(FailureReason::ExplicitErrorText)
            }
        }
    }

    fn tally_for(words: &str, correct: &'static str) -> Tally {
        let target = Target::new("HomeNet", "en0").unwrap();
        let mut tally = Tally::new();
        Driver::new(Accept(correct))
            .run_str(&target, words, &mut tally)
            .unwrap();
        tally
    }

    #[test]
    fn writes_csv_and_txt() {
        let tally = tally_for("nope\n\nhunter2\n", "hunter2");
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("attempts.csv");
        let txt_path = dir.path().join("found.txt");
        save_attempts_csv(&tally, &csv_path).unwrap();
        assert!(save_found_txt(&tally, &txt_path).unwrap());

        let csv_content = std::fs::read_to_string(csv_path).unwrap();
        let mut rows = csv_content.lines();
        assert_eq!(rows.next(), Some("ordinal,credential,outcome,reason,at"));
        assert!(rows.next().unwrap().starts_with("1,nope,failure,explicit-error-text,"));
        assert!(rows.next().unwrap().starts_with("3,hunter2,success,,"));
        assert_eq!(std::fs::read_to_string(txt_path).unwrap(), "HomeNet:hunter2\n");
    }

    #[test]
    fn nothing_found_writes_no_txt() {
        let tally = tally_for("a\nb\n", "zzz");
        let dir = tempdir().unwrap();
        let txt_path = dir.path().join("found.txt");
        assert!(!save_found_txt(&tally, &txt_path).unwrap());
        assert!(!txt_path.exists());
    }
}
