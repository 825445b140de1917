use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::Write;
use std::process::Command;
use std::time::Duration;
use tempfile::tempdir;

use wifibf::command::{CommandOutput, CommandRunner, RunError};
use wifibf::prelude::*;

/// Stands in for `networksetup`: accepts exactly one password and remembers
/// whether the last join associated.
struct FakeNetworksetup {
    password: &'static str,
    associated: Cell<bool>,
    joins: RefCell<Vec<String>>,
    status_queries: Cell<usize>,
}

impl FakeNetworksetup {
    fn accepting(password: &'static str) -> Self {
        Self {
            password,
            associated: Cell::new(false),
            joins: RefCell::new(Vec::new()),
            status_queries: Cell::new(0),
        }
    }
}

impl CommandRunner for FakeNetworksetup {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, RunError> {
        assert_eq!(program, "networksetup");
        match args {
            ["-setairportnetwork", "en0", ssid, pw] => {
                self.joins.borrow_mut().push(pw.to_string());
                if *pw == "slow" {
                    return Err(RunError::TimedOut {
                        program: program.into(),
                        after: timeout.unwrap_or_default(),
                    });
                }
                let ok = *pw == self.password;
                self.associated.set(ok);
                Ok(CommandOutput {
                    code: Some(0),
                    stdout: String::new(),
                    stderr: if ok {
                        String::new()
                    } else {
                        format!("Failed to join network {}.\n", ssid)
                    },
                })
            }
            ["-getairportnetwork", "en0"] => {
                self.status_queries.set(self.status_queries.get() + 1);
                let stdout = if self.associated.get() {
                    "Current Wi-Fi Network: HomeNet\n".to_string()
                } else {
                    "You are not associated with an AirPort network.\n".to_string()
                };
                Ok(CommandOutput {
                    code: Some(0),
                    stdout,
                    stderr: String::new(),
                })
            }
            other => panic!("unexpected networksetup call: {:?}", other),
        }
    }
}

fn instant_config() -> TrialConfig {
    TrialConfig {
        join_timeout: Duration::from_secs(10),
        settle_delay: Duration::ZERO,
    }
}

fn write_wordlist(dir: &std::path::Path, words: &[&str]) -> std::path::PathBuf {
    let path = dir.join("words.txt");
    let mut f = fs::File::create(&path).unwrap();
    for w in words {
        writeln!(f, "{}", w).unwrap();
    }
    path
}

#[test]
fn finds_password_and_leaves_the_rest_untried() {
    let tmp = tempdir().unwrap();
    let words = write_wordlist(tmp.path(), &["wrong1", "", "correct", "unused"]);
    let fake = FakeNetworksetup::accepting("correct");
    let driver = Driver::new(NetworksetupTrial::new(
        &fake,
        SubstringClassifier::default(),
        instant_config(),
    ));

    let mut tally = Tally::new();
    let found = driver
        .run(&Target::new("HomeNet", "en0").unwrap(), &words, &mut tally)
        .unwrap()
        .unwrap();

    assert_eq!(found.ordinal, 3);
    assert_eq!(found.credential, "correct");
    assert_eq!(*fake.joins.borrow(), vec!["wrong1", "correct"]);
    // the rejected join never reaches the status query
    assert_eq!(fake.status_queries.get(), 1);
    assert_eq!(tally.skipped, 1);
}

#[test]
fn timeouts_and_rejections_do_not_stop_the_run() {
    let tmp = tempdir().unwrap();
    let words = write_wordlist(tmp.path(), &["a", "slow", "b"]);
    let fake = FakeNetworksetup::accepting("not-in-list");
    let driver = Driver::new(NetworksetupTrial::new(
        &fake,
        SubstringClassifier::default(),
        instant_config(),
    ));

    let mut tally = Tally::new();
    let found = driver
        .run(&Target::new("HomeNet", "en0").unwrap(), &words, &mut tally)
        .unwrap();

    assert!(found.is_none());
    assert_eq!(*fake.joins.borrow(), vec!["a", "slow", "b"]);
    assert_eq!(tally.failures(FailureReason::Timeout), 1);
    assert_eq!(tally.failures(FailureReason::ExplicitErrorText), 2);
    assert_eq!(fake.status_queries.get(), 0);
}

#[test]
fn event_stream_ends_with_sentinel() {
    let fake = FakeNetworksetup::accepting("pw2");
    let driver = Driver::new(NetworksetupTrial::new(
        &fake,
        SubstringClassifier::default(),
        instant_config(),
    ));
    let mut sink = SseSink::new(Vec::new());
    driver
        .run_str(&Target::new("HomeNet", "en0").unwrap(), "pw1\npw2\n", &mut sink)
        .unwrap();
    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert!(out.starts_with("data: [~] Cracking HomeNet on en0...\n\n"));
    assert!(out.contains("data: [~] 2 candidates in wordlist\n\n"));
    assert!(out.contains("data: Trying password [2]: pw2 (2/2, 100.00%)\n\n"));
    assert!(out.contains("data: [1] Crack Failed using pw1\n\n"));
    assert!(out.contains("data: [*] password is pw2\n\n"));
    assert!(out.ends_with("data: <end-of-stream>\n\n"));
}

#[test]
fn version_flag_prints_version() {
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("-v");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_ssid_and_wordlist_flags() {
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--ssid").and(predicate::str::contains("--wordlist")));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.args(["-s", "HomeNet", "-w", "words.txt", "--timeout", "0"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("--timeout"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn scan_is_refused_off_macos() {
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("--scan");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("only macOS is supported"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn refuses_to_run_off_macos() {
    let tmp = tempdir().unwrap();
    let words = write_wordlist(tmp.path(), &["pw"]);
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("-s").arg("HomeNet").arg("-w").arg(&words);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("only macOS is supported"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn refusal_is_framed_in_sse_mode() {
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("-s")
        .arg("HomeNet")
        .arg("-w")
        .arg("words.txt")
        .arg("--format")
        .arg("sse");
    cmd.assert()
        .code(1)
        .stdout(predicate::str::ends_with("data: <end-of-stream>\n\n"));
}

#[cfg(target_os = "macos")]
#[test]
fn missing_wordlist_exits_before_any_trial() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("-s")
        .arg("HomeNet")
        .arg("-i")
        .arg("en0")
        .arg("-w")
        .arg(tmp.path().join("missing.txt"))
        .arg("-q");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Wordlist file not found"));
}

#[cfg(target_os = "macos")]
#[test]
fn event_stream_does_not_prompt_for_missing_ssid() {
    let tmp = tempdir().unwrap();
    let words = write_wordlist(tmp.path(), &["pw"]);
    let mut cmd = Command::cargo_bin("wifibf").unwrap();
    cmd.arg("-w")
        .arg(&words)
        .args(["-i", "en0", "--format", "sse"])
        .write_stdin("HomeNet\n");
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("data: [-] invalid input: SSID is required\n\n"))
        .stdout(predicate::str::contains("[*] SSID:").not());
}
