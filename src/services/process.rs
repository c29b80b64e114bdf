//! External Process Runner
//!
//! Spawns an executable with a single command-line argument string, captures
//! stdout and stderr incrementally while the process runs, and waits for
//! exit. An optional deadline kills the child and surfaces a distinct
//! Timeout error.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::utils::error::{AppError, AppResult};

/// Outcome of one external process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcResult {
    /// Process exit code; -1 when the process was terminated by a signal
    pub exit_code: i32,
    /// Everything the process wrote to stdout
    pub stdout: String,
    /// Everything the process wrote to stderr
    pub stderr: String,
}

impl ProcResult {
    /// Whether the process exited cleanly
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }
}

/// One process invocation: program, argument string, working directory
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Executable name or path
    pub program: String,
    /// Full argument string; values with spaces or quotes must already be
    /// quoted (see `split_command_line` for the accepted grammar)
    pub args: String,
    /// Working directory for the child
    pub working_dir: PathBuf,
    /// Optional deadline; None waits indefinitely
    pub timeout: Option<Duration>,
}

impl RunRequest {
    /// Create a request with no deadline
    pub fn new(program: impl Into<String>, args: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: args.into(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Set a deadline after which the child is killed
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Abstraction over process execution so orchestration logic can be tested
/// with fakes that never spawn anything.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the process to completion and return its captured output
    async fn run(&self, request: &RunRequest) -> AppResult<ProcResult>;
}

/// Production runner backed by tokio::process
#[derive(Debug, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Create a new runner instance
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: &RunRequest) -> AppResult<ProcResult> {
        let tokens = split_command_line(&request.args);

        let mut child = Command::new(&request.program)
            .args(&tokens)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::process(format!("Executable not found: {}", request.program))
                } else {
                    AppError::process(format!("Failed to spawn {}: {}", request.program, e))
                }
            })?;

        let stdout_task = child
            .stdout
            .take()
            .map(|out| tokio::spawn(capture_stream(out)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(capture_stream(err)));

        let status = match request.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status
                    .map_err(|e| AppError::process(format!("Failed to wait for {}: {}", request.program, e)))?,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(AppError::timeout(format!(
                        "{} did not exit within {}s",
                        request.program,
                        limit.as_secs()
                    )));
                }
            },
            None => child
                .wait()
                .await
                .map_err(|e| AppError::process(format!("Failed to wait for {}: {}", request.program, e)))?,
        };

        let stdout = match stdout_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        Ok(ProcResult {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

/// Read a child stream line by line as it is produced
async fn capture_stream(stream: impl AsyncRead + Unpin) -> String {
    let mut captured = String::new();
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

/// Split a command-line string into argument tokens.
///
/// Grammar: tokens separated by unquoted whitespace; double quotes group a
/// token; `\"` inside or outside quotes yields a literal quote character.
/// This is the inverse of the quoting applied when the argument string is
/// assembled.
pub fn split_command_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut token_open = false;
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
                token_open = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                token_open = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if token_open {
                    tokens.push(std::mem::take(&mut current));
                    token_open = false;
                }
            }
            c => {
                current.push(c);
                token_open = true;
            }
        }
    }
    if token_open {
        tokens.push(current);
    }
    tokens
}
