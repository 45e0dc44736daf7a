//! External command execution utilities.
//!
//! Provides a Builder-based API for running external filters with stdin
//! piping and stderr logging. The markup expander is the main client.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Simple command
//! Cmd::new("php").args(["--version"]).run()?;
//!
//! // Text filter: body in via stdin, expanded body out via stdout
//! let html = Cmd::from_slice(&["php", "autop.php"])
//!     .stdin(body)
//!     .run_text()?;
//! ```

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::{ErrorKind, Write},
    process::{Command, Output, Stdio},
    sync::OnceLock,
    thread,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    stdin_data: Option<Vec<u8>>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["./autop.php"]` or `["php", "autop.php"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        Self::new(program).args(iter)
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return output.
    ///
    /// A non-zero exit status is an error.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        // Stdin is fed from a second thread while stdout and stderr drain,
        // so output larger than the pipe buffer cannot stall the child.
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| -> Result<Output> {
            let writer = match (self.stdin_data.as_deref(), stdin) {
                (Some(data), Some(mut stdin)) => {
                    // Dropping the handle closes the pipe so the child sees EOF
                    Some(scope.spawn(move || stdin.write_all(data)))
                }
                _ => None,
            };

            let output = child
                .wait_with_output()
                .with_context(|| format!("Failed to wait for `{name}`"))?;

            match writer.map(|handle| handle.join()) {
                Some(Err(_)) => bail!("stdin writer for `{name}` panicked"),
                // The exit status reports a child that quit without reading
                Some(Ok(Err(err))) if err.kind() != ErrorKind::BrokenPipe => {
                    Err(err).with_context(|| format!("Failed to write stdin to `{name}`"))
                }
                _ => Ok(output),
            }
        })?;

        log_output(&name, &output, filter)?;
        Ok(output)
    }

    /// Execute the command and return stdout as UTF-8 text.
    pub fn run_text(self) -> Result<String> {
        let name = self.program_name();
        let output = self.run()?;
        String::from_utf8(output.stdout)
            .with_context(|| format!("Output of `{name}` is not valid UTF-8"))
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());
    re.replace_all(s, "")
}

/// Log command stderr, returning error on failure.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        bail!(format_error(name, output, filter));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg = filter
        .skip_prefixes
        .iter()
        .fold(stderr.trim(), |s, p| s.trim_start_matches(p).trim_start());

    let mut msg = format!("Command `{name}` failed with {}\n", output.status);
    if !error_msg.is_empty() {
        msg.push_str(error_msg);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("php").args(["autop.php", "--mode", "full"]);

        assert_eq!(cmd.program, OsString::from("php"));
        assert_eq!(cmd.args.len(), 3);
    }

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["php", "autop.php"]);
        assert_eq!(cmd.program, OsString::from("php"));
        assert_eq!(cmd.args, vec![OsString::from("autop.php")]);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").args(["", "a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["PHP Notice:", "PHP Deprecated:"]);
        assert!(filter.should_skip("PHP Notice: undefined index"));
        assert!(filter.should_skip("PHP Deprecated: something"));
        assert!(!filter.should_skip("PHP Fatal error: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[2KPlain text"), "Plain text");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").args(["hello"]).run().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_stdin_pipe() {
        let text = Cmd::new("cat").stdin("<p>größe</p>").run_text().unwrap();
        assert_eq!(text, "<p>größe</p>");
    }

    #[test]
    fn test_stdin_larger_than_pipe_buffer() {
        let body = "<p>legacy body text</p>\n".repeat(16_000);
        assert!(body.len() > 300_000);
        let text = Cmd::new("cat").stdin(&body).run_text().unwrap();
        assert_eq!(text.len(), body.len());
        assert_eq!(text, body);
    }

    #[test]
    fn test_child_ignoring_stdin_reports_exit_status() {
        let body = "x".repeat(300_000);
        let err = Cmd::new("false").stdin(&body).run().unwrap_err();
        assert!(err.to_string().contains("`false` failed"));
    }

    #[test]
    fn test_failing_command_is_error() {
        let err = Cmd::new("false").run().unwrap_err();
        assert!(err.to_string().contains("`false` failed"));
    }

    #[test]
    fn test_missing_program_is_error() {
        assert!(Cmd::new("./definitely-not-here.php").run().is_err());
    }
}
