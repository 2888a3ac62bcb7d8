//! Terminal and JSON rendering of the absence report.

use crate::extraction::attendance::AttendanceReport;
use std::io::IsTerminal;

/// Label of the student number header line.
pub const STUDENT_ID_LABEL: &str = "學號";

/// Label of the totals line.
pub const SUMMARY_LABEL: &str = "統計";

/// Shown when the portal does not accept the credentials.
pub const LOGIN_FAILED: &str = "登入失敗";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// One JSON document instead of labeled lines.
    pub json: bool,
    /// Skip the student number header.
    pub quiet: bool,
}

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Never emits escape codes.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// `label：value` with a full-width colon.
fn labeled(s: &Styled, label: &str, value: &str) -> String {
    format!("{}：{value}", s.bold(label))
}

/// Student number header, one block of four lines per record separated by
/// blank lines, then the totals line.
pub fn render_report(
    s: &Styled,
    username: &str,
    report: &AttendanceReport,
    opts: OutputOptions,
) -> String {
    let mut out = String::new();
    if !opts.quiet {
        out.push_str(&labeled(s, STUDENT_ID_LABEL, username));
        out.push_str("\n\n");
    }

    for record in &report.records {
        for (field, value) in record.fields() {
            out.push_str(&labeled(s, field.label(), value));
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str(&labeled(s, SUMMARY_LABEL, &report.summary));
    out.push('\n');
    out
}

/// Report as a JSON value: `{"username", "records": [...], "summary"}`.
pub fn report_json(username: &str, report: &AttendanceReport) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "records": report.records,
        "summary": report.summary,
    })
}

/// Write the report to stdout in the selected format.
pub fn print_report(username: &str, report: &AttendanceReport, opts: OutputOptions) {
    if opts.json {
        print_json(&report_json(username, report));
    } else {
        print!("{}", render_report(&Styled::new(), username, report, opts));
    }
}

/// Tell the user the login was rejected.
pub fn print_login_failed(opts: OutputOptions) {
    if opts.json {
        print_json(&serde_json::json!({
            "error": "login_failed",
            "message": LOGIN_FAILED,
        }));
    } else {
        let s = Styled::new();
        println!("{}", s.red(LOGIN_FAILED));
    }
}

/// Print a fatal error to stderr.
pub fn print_error(err: &anyhow::Error) {
    let s = Styled::new();
    eprintln!("  {} {}", s.fail_sym(), s.dim(&format!("{err:#}")));
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}
