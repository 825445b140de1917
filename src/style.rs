//! Terminal styling passed explicitly to renderers.
//!
//! Renderers never consult process-wide color state: each takes a [`Style`]
//! and gets plain text when color is off, which keeps output deterministic
//! for snapshots and for the event stream.
use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    fn apply(&self, s: &str, f: impl FnOnce(ColoredString) -> ColoredString) -> String {
        if self.color {
            f(s.normal()).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn info(&self, s: &str) -> String {
        self.apply(s, |c| c.bold().blue())
    }

    pub fn note(&self, s: &str) -> String {
        self.apply(s, |c| c.bold().cyan())
    }

    pub fn success(&self, s: &str) -> String {
        self.apply(s, |c| c.bold().green())
    }

    pub fn failure(&self, s: &str) -> String {
        self.apply(s, |c| c.bold().red())
    }

    pub fn heading(&self, s: &str) -> String {
        self.apply(s, |c| c.bold().yellow())
    }

    pub fn dim(&self, s: &str) -> String {
        self.apply(s, |c| c.dimmed())
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::colored()
    }
}

/// Printable width of `s`, ignoring ANSI escape sequences.
pub fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}
