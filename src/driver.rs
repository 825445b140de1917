//! Wordlist driver: feeds candidates to a [`TrialRunner`] in file order.
//!
//! Every physical line consumes an ordinal before the blank check, so the
//! ordinal reported for a candidate is its line number in the wordlist.
//! Iteration stops at the first [`TrialOutcome::Success`]. File and string
//! sources are counted first so sinks can report progress.
//!
//! Typical usage:
//!
//! ```no_run
//! use wifibf::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let target = Target::new("HomeNet", "en0")?;
//! let driver = Driver::new(NetworksetupTrial::system(TrialConfig::default()));
//! let mut console = ConsoleSink::new(std::io::stdout(), Style::default());
//! if let Some(found) = driver.run(&target, "/path/to/wordlist.txt", &mut console)? {
//!     println!("{} -> {}", found.ordinal, found.credential);
//! }
//! # Ok(())
//! # }
//! ```
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::candidate::{Candidate, Target};
use crate::error::WifiBfError;
use crate::events::{Event, EventSink};
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, LineIter, iter_lines_auto};
use crate::trial::TrialRunner;

pub struct Driver<T> {
    trial: T,
    mmap_threshold_bytes: u64,
}

impl<T: TrialRunner> Driver<T> {
    pub fn new(trial: T) -> Self {
        Self {
            trial,
            mmap_threshold_bytes: DEFAULT_MMAP_THRESHOLD_BYTES,
        }
    }

    /// Override the wordlist size above which it is memory-mapped. Zero
    /// disables mmap.
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold_bytes = bytes;
        self
    }

    pub fn trial(&self) -> &T {
        &self.trial
    }

    /// Run every candidate in `source` against `target`.
    ///
    /// Fails with [`WifiBfError::ResourceUnavailable`] before any trial when
    /// the wordlist is missing or cannot be opened.
    pub fn run<P: AsRef<Path>>(
        &self,
        target: &Target,
        source: P,
        sink: &mut dyn EventSink,
    ) -> Result<Option<Candidate>, WifiBfError> {
        let path = source.as_ref();
        if !path.is_file() {
            return Err(WifiBfError::ResourceUnavailable {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            });
        }
        let total = self.open(path)?.try_fold(0usize, |n, line| {
            let line = line.map_err(|source| WifiBfError::Read {
                line: n + 1,
                source,
            })?;
            Ok::<_, WifiBfError>(n + usize::from(!line.trim().is_empty()))
        })?;
        info!("reading {} candidates from {}", total, path.display());
        self.run_lines(target, self.open(path)?, Some(total), sink)
    }

    fn open(&self, path: &Path) -> Result<LineIter, WifiBfError> {
        iter_lines_auto(path, self.mmap_threshold_bytes).map_err(|e| {
            WifiBfError::ResourceUnavailable {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            }
        })
    }

    /// Run candidates from an in-memory wordlist.
    pub fn run_str(
        &self,
        target: &Target,
        contents: &str,
        sink: &mut dyn EventSink,
    ) -> Result<Option<Candidate>, WifiBfError> {
        let total = contents.lines().filter(|l| !l.trim().is_empty()).count();
        self.run_lines(
            target,
            contents.lines().map(|l| Ok(l.to_string())),
            Some(total),
            sink,
        )
    }

    /// Core loop over any line source. `total` is the number of non-blank
    /// lines, if the caller knows it.
    pub fn run_lines<I>(
        &self,
        target: &Target,
        lines: I,
        total: Option<usize>,
        sink: &mut dyn EventSink,
    ) -> Result<Option<Candidate>, WifiBfError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        sink.emit(&Event::Started { target, total })
            .map_err(WifiBfError::Sink)?;

        let mut attempts = 0usize;
        let mut found = None;
        for (idx, line) in lines.into_iter().enumerate() {
            let ordinal = idx + 1;
            let line = line.map_err(|source| WifiBfError::Read {
                line: ordinal,
                source,
            })?;
            let Some(candidate) = Candidate::from_line(ordinal, &line) else {
                debug!("line {} is blank, skipping", ordinal);
                sink.emit(&Event::Skipped { ordinal })
                    .map_err(WifiBfError::Sink)?;
                continue;
            };

            attempts += 1;
            sink.emit(&Event::Trying {
                candidate: &candidate,
                attempt: attempts,
                total,
            })
            .map_err(WifiBfError::Sink)?;
            let outcome = self
                .trial
                .attempt(target, &candidate.credential, candidate.ordinal);
            sink.emit(&Event::Outcome {
                candidate: &candidate,
                outcome,
            })
            .map_err(WifiBfError::Sink)?;

            if outcome.is_success() {
                info!("credential found at line {}", ordinal);
                found = Some(candidate);
                break;
            }
        }

        sink.emit(&Event::Completed {
            found: found.as_ref(),
            attempts,
        })
        .map_err(WifiBfError::Sink)?;
        Ok(found)
    }
}
