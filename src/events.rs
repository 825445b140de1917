//! Run events and the sinks that consume them.
//!
//! The driver reports progress exclusively through an [`EventSink`]. Sinks
//! render to a terminal ([`ConsoleSink`]), frame lines as server-push events
//! ([`SseSink`]) or keep a record for the final summary ([`Tally`]). Sinks
//! compose as tuples, and `&mut S` is a sink whenever `S` is.
//!
//! A sink error aborts the run: a consumer that has gone away (for example a
//! closed event-stream client) should not leave the loop joining networks
//! on its behalf.
use std::io::{self, Write};

use crate::candidate::{Candidate, Target};
use crate::outcome::{FailureReason, TrialOutcome};
use crate::style::Style;

/// Sentinel sent as the last event of a stream.
pub const END_OF_STREAM: &str = "<end-of-stream>";

#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// `total` is the number of non-blank lines, when known up front.
    Started {
        target: &'a Target,
        total: Option<usize>,
    },
    /// `attempt` counts trials so far, this one included.
    Trying {
        candidate: &'a Candidate,
        attempt: usize,
        total: Option<usize>,
    },
    Skipped { ordinal: usize },
    Outcome {
        candidate: &'a Candidate,
        outcome: TrialOutcome,
    },
    Completed {
        found: Option<&'a Candidate>,
        attempts: usize,
    },
}

impl Event<'_> {
    /// Human-readable lines for this event, styled with `style`.
    pub fn lines(&self, style: &Style) -> Vec<String> {
        match self {
            Event::Started { target, total } => {
                let mut lines = vec![style.info(&format!(
                    "[~] Cracking {} on {}...",
                    target.ssid, target.interface
                ))];
                if let Some(total) = total {
                    lines.push(style.info(&format!("[~] {} candidates in wordlist", total)));
                }
                lines
            }
            Event::Trying {
                candidate,
                attempt,
                total,
            } => {
                let mut line = format!(
                    "Trying password [{}]: {}",
                    candidate.ordinal, candidate.credential
                );
                if let Some(total) = total.filter(|t| *t > 0) {
                    line.push_str(&format!(
                        " ({}/{}, {})",
                        attempt,
                        total,
                        percentage(*attempt, total)
                    ));
                }
                vec![line]
            }
            Event::Skipped { .. } => Vec::new(),
            Event::Outcome {
                candidate,
                outcome: TrialOutcome::Success,
            } => vec![
                style.success("[*] Crack success!"),
                style.success(&format!("[*] password is {}", candidate.credential)),
            ],
            Event::Outcome {
                candidate,
                outcome: TrialOutcome::Failure(reason),
            } => {
                let suffix = match reason {
                    FailureReason::Timeout => " (command timed out)",
                    FailureReason::InvocationError => " (command error)",
                    _ => "",
                };
                vec![style.failure(&format!(
                    "[{}] Crack Failed using {}{}",
                    candidate.ordinal, candidate.credential, suffix
                ))]
            }
            Event::Completed { found: Some(_), .. } => Vec::new(),
            Event::Completed {
                found: None,
                attempts,
            } => vec![style.failure(&format!(
                "[-] Password not found in wordlist ({} attempts)",
                attempts
            ))],
        }
    }
}

/// `done` out of `total` as a percentage with two decimals.
pub fn percentage(done: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (done as f64) / (total as f64) * 100.0)
}

pub trait EventSink {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        (**self).emit(event)
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        self.0.emit(event)?;
        self.1.emit(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &Event<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// Writes styled lines to a terminal or any writer.
pub struct ConsoleSink<W: Write> {
    out: W,
    style: Style,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, style: Style) -> Self {
        Self { out, style }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        for line in event.lines(&self.style) {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }
}

/// Frames every output line as a `data:` event. The stream is closed with
/// [`END_OF_STREAM`] once the run completes.
pub struct SseSink<W: Write> {
    out: W,
}

impl<W: Write> SseSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Send one raw line as an event. Embedded newlines are split so each
    /// event carries a single line.
    pub fn send(&mut self, line: &str) -> io::Result<()> {
        for part in line.split('\n') {
            write!(self.out, "data: {}\n\n", part.trim_end_matches('\r'))?;
        }
        self.out.flush()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.send(END_OF_STREAM)
    }
}

impl<W: Write> EventSink for SseSink<W> {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        for line in event.lines(&Style::plain()) {
            self.send(&line)?;
        }
        if let Event::Completed { .. } = event {
            self.finish()?;
        }
        Ok(())
    }
}

/// One trial as recorded by [`Tally`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub candidate: Candidate,
    pub outcome: TrialOutcome,
    pub at: chrono::DateTime<chrono::Local>,
}

/// Accumulates what happened during a run.
#[derive(Debug, Default, Clone)]
pub struct Tally {
    pub target: Option<Target>,
    pub total: Option<usize>,
    pub attempts: Vec<Attempt>,
    pub skipped: usize,
    pub completed: bool,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(&self) -> Option<&Candidate> {
        self.attempts
            .iter()
            .find(|a| a.outcome.is_success())
            .map(|a| &a.candidate)
    }

    pub fn failures(&self, reason: FailureReason) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == TrialOutcome::Failure(reason))
            .count()
    }

    /// Number of wordlist lines consumed, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.attempts.len() + self.skipped
    }
}

impl EventSink for Tally {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        match event {
            Event::Started { target, total } => {
                self.target = Some((*target).clone());
                self.total = *total;
            }
            Event::Trying { .. } => {}
            Event::Skipped { .. } => self.skipped += 1,
            Event::Outcome { candidate, outcome } => self.attempts.push(Attempt {
                candidate: (*candidate).clone(),
                outcome: *outcome,
                at: chrono::Local::now(),
            }),
            Event::Completed { .. } => self.completed = true,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(ordinal: usize, credential: &str) -> Candidate {
        Candidate {
            ordinal,
            credential: credential.into(),
        }
    }

    #[test]
    fn failure_lines_name_ordinal_and_reason() {
        let c = cand(7, "letmein");
        let lines = Event::Outcome {
            candidate: &c,
            outcome: TrialOutcome::Failure(FailureReason::Timeout),
        }
        .lines(&Style::plain());
        assert_eq!(lines, vec!["[7] Crack Failed using letmein (command timed out)"]);
    }

    #[test]
    fn progress_is_shown_when_total_is_known() {
        let target = Target::new("HomeNet", "en0").unwrap();
        let c = cand(5, "pw");
        let started = Event::Started {
            target: &target,
            total: Some(4),
        }
        .lines(&Style::plain());
        assert_eq!(started[1], "[~] 4 candidates in wordlist");
        let trying = Event::Trying {
            candidate: &c,
            attempt: 3,
            total: Some(4),
        }
        .lines(&Style::plain());
        assert_eq!(trying, vec!["Trying password [5]: pw (3/4, 75.00%)"]);
        assert_eq!(percentage(2, 3), "66.67%");
        assert_eq!(percentage(0, 0), "0.00%");
    }

    #[test]
    fn sse_frames_each_line_and_terminates() {
        let c = cand(3, "correct");
        let mut sink = SseSink::new(Vec::new());
        sink.emit(&Event::Trying {
            candidate: &c,
            attempt: 1,
            total: Some(3),
        })
        .unwrap();
        sink.emit(&Event::Outcome {
            candidate: &c,
            outcome: TrialOutcome::Success,
        })
        .unwrap();
        sink.emit(&Event::Completed {
            found: Some(&c),
            attempts: 1,
        })
        .unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "data: Trying password [3]: correct (1/3, 33.33%)\n\n\
             data: [*] Crack success!\n\n\
             data: [*] password is correct\n\n\
             data: <end-of-stream>\n\n"
        );
    }

    #[test]
    fn tally_counts_and_finds() {
        let target = Target::new("HomeNet", "en0").unwrap();
        let (a, b) = (cand(1, "a"), cand(3, "b"));
        let mut tally = Tally::new();
        tally
            .emit(&Event::Started {
                target: &target,
                total: Some(2),
            })
            .unwrap();
        tally
            .emit(&Event::Outcome {
                candidate: &a,
                outcome: TrialOutcome::Failure(FailureReason::ExplicitErrorText),
            })
            .unwrap();
        tally.emit(&Event::Skipped { ordinal: 2 }).unwrap();
        tally
            .emit(&Event::Outcome {
                candidate: &b,
                outcome: TrialOutcome::Success,
            })
            .unwrap();
        assert_eq!(tally.lines_read(), 3);
        assert_eq!(tally.failures(FailureReason::ExplicitErrorText), 1);
        assert_eq!(tally.found(), Some(&b));
        assert_eq!(tally.target.as_ref().unwrap().ssid, "HomeNet");
        assert_eq!(tally.total, Some(2));
    }

    #[test]
    fn tuple_sinks_fan_out() {
        let c = cand(1, "x");
        let mut console = ConsoleSink::new(Vec::new(), Style::plain());
        let mut tally = Tally::new();
        {
            let mut both = (&mut console, &mut tally);
            both.emit(&Event::Trying {
                candidate: &c,
                attempt: 1,
                total: None,
            })
            .unwrap();
            both.emit(&Event::Skipped { ordinal: 2 }).unwrap();
        }
        assert_eq!(tally.skipped, 1);
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(text, "Trying password [1]: x\n");
    }
}
