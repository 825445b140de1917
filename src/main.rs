//! CLI entrypoint for `wifibf`.
//!
//! Refuses to run anywhere but macOS, resolves the SSID and wordlist from
//! flags or interactive prompts, runs the wordlist driver against the real
//! `networksetup` tool and prints either terminal output or a server-push
//! event stream. A run summary and optional CSV/TXT exports follow.
//! `--scan` lists nearby networks instead of running a wordlist.
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, error, info};
use wifibf::{
    candidate::Target,
    command::SystemCommandRunner,
    driver::Driver,
    error::WifiBfError,
    events::{ConsoleSink, EventSink, SseSink, Tally},
    export::{save_attempts_csv, save_found_txt},
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    platform::{detect_wifi_interface, ensure_supported_host, scan_networks},
    prompt::{require, value_or_ask},
    report::{render_networks, render_summary},
    style::Style,
    trial::{DEFAULT_JOIN_TIMEOUT, DEFAULT_SETTLE_DELAY, NetworksetupTrial, TrialConfig},
};

#[derive(Parser, Debug)]
#[command(
    name = "wifibf",
    version,
    disable_version_flag = true,
    about = "macOS Wi-Fi password tester (networksetup + wordlist)"
)]
struct Args {
    /// SSID of the Wi-Fi network
    #[arg(short = 's', long = "ssid")]
    ssid: Option<String>,

    /// Path to the wordlist file
    #[arg(short = 'w', long = "wordlist")]
    wordlist: Option<PathBuf>,

    /// Wi-Fi interface (detected from networksetup when omitted)
    #[arg(short = 'i', long = "interface")]
    interface: Option<String>,

    /// Seconds to wait for the join command before giving up
    #[arg(
        long = "timeout",
        default_value_t = DEFAULT_JOIN_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Seconds to wait after a join before checking the current network
    #[arg(long = "settle", default_value_t = DEFAULT_SETTLE_DELAY.as_secs())]
    settle_secs: u64,

    /// List nearby networks, strongest first, and exit
    #[arg(long = "scan")]
    scan: bool,

    /// Path to the output directory for CSV/TXT exports
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Output format: terminal text or a server-push event stream
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (--verbose, --verbose --verbose)
    #[arg(long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress banner and summary
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Sse,
}

const ASCII_TITLE: &str = r#"
 __        ___  __ _ ____  _____
 \ \      / (_)/ _(_) __ )|  ___|
  \ \ /\ / /| | |_| |  _ \| |_
   \ V  V / | |  _| | |_) |  _|
    \_/\_/  |_|_| |_|____/|_|
"#;

fn parse_args() -> Args {
    // `-v` prints the version, so it cannot be the verbosity flag.
    let cmd = Args::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    );
    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn exit_code(e: &WifiBfError) -> i32 {
    match e {
        WifiBfError::PlatformUnsupported(_) => 1,
        WifiBfError::InvalidInput(_) | WifiBfError::ResourceUnavailable { .. } => 2,
        WifiBfError::Read { .. } | WifiBfError::Sink(_) | WifiBfError::Scan(_) => 3,
    }
}

fn fail(e: WifiBfError, style: &Style, sse: bool) -> ! {
    error!("{}", e);
    let line = format!("[-] {}", e);
    if sse {
        let mut sink = SseSink::new(io::stdout());
        let _ = sink.send(&line);
        let _ = sink.finish();
    } else {
        eprintln!("{}", style.failure(&line));
    }
    std::process::exit(exit_code(&e));
}

/// Resolve SSID, wordlist and interface. Missing values are prompted for
/// only when `interactive`; the event stream has no one to answer.
fn resolve_target(args: &Args, interactive: bool) -> Result<(Target, PathBuf), WifiBfError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let mut value = |given: Option<String>, label: &str| {
        if interactive {
            value_or_ask(given, label, &mut input, &mut output)
        } else {
            require(given, label)
        }
    };
    let ssid = value(args.ssid.clone(), "SSID")?;
    let wordlist = value(
        args.wordlist
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        "Passwords file",
    )?;
    let wordlist = PathBuf::from(wordlist);
    if !wordlist.is_file() {
        return Err(WifiBfError::ResourceUnavailable {
            path: wordlist,
            reason: "Wordlist file not found".into(),
        });
    }
    let interface = match &args.interface {
        Some(i) => i.clone(),
        None => detect_wifi_interface(&SystemCommandRunner::new()),
    };
    Ok((Target::new(&ssid, &interface)?, wordlist))
}

fn scan(style: &Style, sse: bool) {
    let networks = match scan_networks(&SystemCommandRunner::new()) {
        Ok(n) => n,
        Err(e) => fail(e, style, sse),
    };
    let lines = render_networks(&networks);
    if sse {
        let mut sink = SseSink::new(io::stdout());
        let sent = lines
            .iter()
            .try_for_each(|line| sink.send(line))
            .and_then(|_| sink.finish());
        if let Err(e) = sent {
            error!("{}", WifiBfError::Sink(e));
            std::process::exit(3);
        }
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
}

fn main() {
    let args = parse_args();
    init_logger(args.verbose);
    let style = match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
            Style::colored()
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
            Style::plain()
        }
        ColorChoice::Auto => Style::colored(),
    };
    let sse = args.format == OutputFormat::Sse;
    let chatty = !args.quiet && !sse;

    if let Err(e) = ensure_supported_host() {
        fail(e, &style, sse);
    }

    if args.scan {
        scan(&style, sse);
        return;
    }

    if chatty {
        println!("{}", ASCII_TITLE.bold().green());
        println!(
            "{}",
            style.note(&format!(
                "[+] You are using {} {} ...",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        );
    }

    let (target, wordlist) = match resolve_target(&args, !sse) {
        Ok(v) => v,
        Err(e) => fail(e, &style, sse),
    };

    let config = TrialConfig {
        join_timeout: Duration::from_secs(args.timeout_secs),
        settle_delay: Duration::from_secs(args.settle_secs),
    };
    let trial = NetworksetupTrial::system(config);
    info!(
        "join timeout {:?}, settle delay {:?}",
        trial.config().join_timeout,
        trial.config().settle_delay
    );
    let driver = Driver::new(trial).with_mmap_threshold(args.mmap_threshold);

    let mut tally = Tally::new();
    let result = if sse {
        let mut sink = (SseSink::new(io::stdout()), &mut tally);
        driver.run(&target, &wordlist, &mut sink as &mut dyn EventSink)
    } else {
        let mut sink = (ConsoleSink::new(io::stdout(), style), &mut tally);
        driver.run(&target, &wordlist, &mut sink as &mut dyn EventSink)
    };
    if let Err(e) = result {
        fail(e, &style, sse);
    }

    if chatty {
        println!("{}", render_summary(&tally, &style));
        let _ = io::stdout().flush();
    }

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(4);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let csv = outdir.join(format!("wifibf_attempts_{}.csv", ts));
        let txt = outdir.join(format!("wifibf_found_{}.txt", ts));
        if let Err(e) = save_attempts_csv(&tally, &csv) {
            error!("failed to write {}: {:#}", csv.display(), e);
            std::process::exit(5);
        }
        match save_found_txt(&tally, &txt) {
            Ok(true) => info!("wrote {}", txt.display()),
            Ok(false) => {}
            Err(e) => {
                error!("failed to write {}: {:#}", txt.display(), e);
                std::process::exit(6);
            }
        }
    }
}
