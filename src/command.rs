//! External command execution.
//!
//! [`CommandRunner`] is the seam between trial logic and the operating
//! system: [`SystemCommandRunner`] spawns real processes, tests substitute a
//! scripted fake so no network state is ever touched.
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

/// How often a running child is polled while a timeout is in force.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished command. Output is decoded lossily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("`{program}` did not finish within {after:?}")]
    TimedOut { program: String, after: Duration },

    #[error("failed to run `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub trait CommandRunner {
    /// Run `program` with `args` to completion, capturing stdout and stderr
    /// separately. With a `timeout`, a child still running at the deadline is
    /// killed and [`RunError::TimedOut`] is returned.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, RunError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, RunError> {
        (**self).run(program, args, timeout)
    }
}

/// Runs commands through `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, RunError> {
        let io_err = |source| RunError::Io {
            program: program.to_string(),
            source,
        };
        debug!("exec {} ({} args)", program, args.len());
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_err)?;

        // Drain both pipes concurrently so a full pipe cannot stall the child
        // while we wait on it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match timeout {
            None => child.wait().map_err(io_err)?,
            Some(limit) => match wait_until(&mut child, limit).map_err(io_err)? {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunError::TimedOut {
                        program: program.to_string(),
                        after: limit,
                    });
                }
            },
        };

        Ok(CommandOutput {
            code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn wait_until(child: &mut Child, limit: Duration) -> io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle.and_then(|h| h.join().ok()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
