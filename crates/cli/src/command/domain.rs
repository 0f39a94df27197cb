use std::fmt;
use std::io::Write;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Process exit status. The numeric codes are part of the CLI contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// Finished, but at least one item failed.
    ItemFailures,
    Usage,
    /// Collaborator unreachable or unusable, or the run was aborted.
    Fatal,
}

impl ExitStatus {
    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ItemFailures => 1,
            ExitStatus::Usage => 2,
            ExitStatus::Fatal => 3,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

/// Invalid or missing arguments, detected before any collaborator is contacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UsageError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPayload {
    pub batch: Option<u64>,
    pub post_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePayload {
    Ids(Vec<String>),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPayload {
    pub queries: Vec<String>,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugPayload {
    pub queries: Vec<String>,
}

/// A validated command, ready to be routed to its service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    Index(IndexPayload),
    Delete(DeletePayload),
    Select(SelectPayload),
    Debug(DebugPayload),
    Info,
    Optimize,
}

impl CommandAction {
    pub const fn name(&self) -> &'static str {
        match self {
            CommandAction::Index(_) => "index",
            CommandAction::Delete(_) => "delete",
            CommandAction::Select(_) => "select",
            CommandAction::Debug(_) => "debug",
            CommandAction::Info => "info",
            CommandAction::Optimize => "optimize",
        }
    }
}

/// Final status plus the text of the closing summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: ExitStatus,
    pub summary: String,
}

impl CommandOutcome {
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            status: ExitStatus::Success,
            summary: summary.into(),
        }
    }

    pub fn item_failures(summary: impl Into<String>) -> Self {
        Self {
            status: ExitStatus::ItemFailures,
            summary: summary.into(),
        }
    }

    pub fn fatal(summary: impl Into<String>) -> Self {
        Self {
            status: ExitStatus::Fatal,
            summary: summary.into(),
        }
    }
}

type Sink = Box<dyn Write + Send>;

/// All user-facing output. Records and progress go to stdout; warnings and errors to stderr.
///
/// Write failures (closed pipe) are ignored: output is best effort, the exit code is not.
pub struct Reporter {
    out: Sink,
    err: Sink,
    quiet: bool,
}

impl Reporter {
    pub fn stdio(quiet: bool) -> Self {
        Self::new(
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
            quiet,
        )
    }

    pub fn new(out: Sink, err: Sink, quiet: bool) -> Self {
        Self { out, err, quiet }
    }

    /// Payload output (records, reports). Never suppressed.
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    /// Progress chatter, suppressed by `--quiet`.
    pub fn progress(&mut self, text: &str) {
        if !self.quiet {
            let _ = writeln!(self.out, "{text}");
        }
    }

    /// Informational note on stderr, suppressed by `--quiet`.
    pub fn note(&mut self, text: &str) {
        if !self.quiet {
            let _ = writeln!(self.err, "{text}");
        }
    }

    /// Per-item status on stderr that `--quiet` keeps.
    pub fn notice(&mut self, text: &str) {
        let _ = writeln!(self.err, "{text}");
    }

    pub fn warning(&mut self, text: &str) {
        let _ = writeln!(self.err, "Warning: {text}");
    }

    pub fn error(&mut self, text: &str) {
        let _ = writeln!(self.err, "Error: {text}");
    }

    /// Exactly one closing line per command.
    pub fn finish(&mut self, outcome: &CommandOutcome) {
        if outcome.status.is_success() {
            let _ = writeln!(self.out, "Success: {}", outcome.summary);
        } else {
            self.error(&outcome.summary);
        }
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

/// In-memory sink shared with a [`Reporter`], for inspecting output.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            Err(_) => Err(std::io::Error::other("output buffer poisoned")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl Reporter {
    /// Reporter writing into two in-memory buffers (stdout, stderr).
    pub fn captured(quiet: bool) -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let reporter = Self::new(Box::new(out.clone()), Box::new(err.clone()), quiet);
        (reporter, out, err)
    }
}
