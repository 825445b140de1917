//! Human-readable run summary and scan table for terminal output.
use crate::events::Tally;
use crate::outcome::FailureReason;
use crate::platform::ScannedNetwork;
use crate::style::{Style, visible_len};

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

pub fn render_summary(tally: &Tally, style: &Style) -> String {
    let mut out = String::new();
    out.push_str(&style.note("WifiBF: Wordlist Run Results"));
    out.push('\n');

    let mut lines: Vec<String> = Vec::new();
    match &tally.target {
        Some(t) => {
            lines.push(format!("Target SSID: {}", t.ssid));
            lines.push(format!("Interface: {}", t.interface));
        }
        None => lines.push("Target SSID: (none)".to_string()),
    }
    if let Some(total) = tally.total {
        lines.push(format!("Candidates in wordlist: {}", total));
    }
    lines.push(format!("Lines read: {}", tally.lines_read()));
    lines.push(format!("Blank lines skipped: {}", tally.skipped));
    lines.push(format!("Trials: {}", tally.attempts.len()));
    if !tally.completed {
        lines.push(style.failure("Run aborted before the wordlist was exhausted"));
    }
    out.push_str(&section_header(&style.heading("Trial Statistics")));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&section_header(&style.heading("Failures by Reason")));
    for reason in FailureReason::ALL {
        out.push_str(&format!("  {}: {}\n", reason, tally.failures(reason)));
    }

    out.push_str(&section_header(&style.heading("Result")));
    match tally.found() {
        Some(c) => out.push_str(&format!(
            "{} {} (line {})\n",
            style.success("Password found:"),
            c.credential,
            c.ordinal
        )),
        None => out.push_str(&format!("{}\n", style.dim("(Password not found)"))),
    }
    out
}

/// One line per scanned network under a header row. Plain text, so the
/// same lines can be framed as stream events.
pub fn render_networks(networks: &[ScannedNetwork]) -> Vec<String> {
    if networks.is_empty() {
        return vec!["[-] No networks found".to_string()];
    }
    let row = |ssid: &str, bssid: &str, rssi: &str, channel: &str, security: &str| {
        format!(
            "{:<32} {:<17} {:>5}  {:<8} {}",
            ssid, bssid, rssi, channel, security
        )
        .trim_end()
        .to_string()
    };
    let mut lines = vec![row("SSID", "BSSID", "RSSI", "CHANNEL", "SECURITY")];
    lines.extend(networks.iter().map(|n| {
        row(
            &n.ssid,
            &n.bssid,
            &n.rssi.to_string(),
            &n.channel,
            &n.security,
        )
    }));
    lines
}
