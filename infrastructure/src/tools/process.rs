//! Process executor: runs a tool script with a side-channel output file.
//!
//! # Protocol
//!
//! | Variable | Value |
//! |----------|-------|
//! | `LLM_OUTPUT` | Absolute path of a fresh temp file the script writes its result to |
//! | `ROOT_DIR` | Absolute path of the functions directory |
//!
//! The rest of the environment is inherited. The script runs with the
//! functions directory as working directory; stdout and stderr are captured
//! separately. The result is the side-channel content followed by stdout,
//! cut to the configured size.
//!
//! The temp file is created before the script starts and removed on every
//! exit path once the output has been read.

use fnbridge_domain::tool::{
    entities::CommandSpec,
    error::ToolError,
    value_objects::{ToolOutput, ToolResultMetadata},
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tracing::{debug, trace, warn};

/// Environment variable naming the side-channel output file
pub const LLM_OUTPUT_ENV: &str = "LLM_OUTPUT";

/// Environment variable naming the functions directory
pub const ROOT_DIR_ENV: &str = "ROOT_DIR";

/// Appended to output cut at the size limit
pub const TRUNCATION_MARKER: &str = "\n\n[Output truncated]";

/// Default execution timeout (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum output size (1 MB)
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// How often a running script is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Spawn attempts when a just-written script is still busy (ETXTBSY)
const SPAWN_ATTEMPTS: u32 = 4;

/// Runs tool scripts as subprocesses with a timeout and an output cap
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Duration,
    max_output_bytes: usize,
    /// Where side-channel files are created (None = OS temp dir)
    output_dir: Option<PathBuf>,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_MAX_OUTPUT_SIZE,
        )
    }
}

impl ProcessExecutor {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
            output_dir: None,
        }
    }

    /// Create side-channel files in `dir` instead of the OS temp dir
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(super::absolute_path(dir.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Run `spec` for `tool_name` inside `functions_dir`.
    ///
    /// Blocks until the script exits or the timeout expires. On timeout the
    /// script (and its process group on Unix) is killed.
    pub fn execute(
        &self,
        tool_name: &str,
        spec: &CommandSpec,
        functions_dir: &Path,
    ) -> Result<ToolOutput, ToolError> {
        let output_path = self.create_output_file().map_err(|e| ToolError::Spawn {
            tool: tool_name.to_string(),
            message: format!("failed to create output file: {}", e),
        })?;

        let result = self.run(tool_name, spec, functions_dir, &output_path);

        // A leftover temp file does not fail the call
        if let Err(e) = output_path.close() {
            trace!(tool = tool_name, error = %e, "Failed to remove output file");
        }

        result
    }

    fn create_output_file(&self) -> io::Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("llm-output-").suffix(".txt");

        let file = match &self.output_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file.into_temp_path())
    }

    fn run(
        &self,
        tool_name: &str,
        spec: &CommandSpec,
        functions_dir: &Path,
        output_path: &Path,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let functions_dir = super::absolute_path(functions_dir.to_path_buf());

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .current_dir(&functions_dir)
            .env(LLM_OUTPUT_ENV, output_path)
            .env(ROOT_DIR_ENV, &functions_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so a timeout can take down the script's children too
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        // Linux: request kernel to send SIGTERM to the script when we die.
        #[cfg(target_os = "linux")]
        unsafe {
            use std::os::unix::process::CommandExt;
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        debug!(tool = tool_name, command = ?spec.tokens(), "Spawning tool script");

        let mut child = spawn_with_retry(&mut cmd).map_err(|e| ToolError::Spawn {
            tool: tool_name.to_string(),
            message: e.to_string(),
        })?;

        let pipes = CapturedPipes::start(&mut child);

        let status = match wait_until(&mut child, deadline) {
            Ok(status) => status,
            Err(e) => {
                terminate(&mut child);
                return Err(ToolError::Spawn {
                    tool: tool_name.to_string(),
                    message: format!("failed to wait for process: {}", e),
                });
            }
        };

        // A script may exit while a background child still holds the pipes open,
        // so collecting output is bounded by the same deadline.
        let captured = status.and_then(|status| pipes.collect_until(deadline).map(|c| (status, c)));

        let Some((status, captured)) = captured else {
            terminate(&mut child);
            warn!(
                tool = tool_name,
                timeout_secs = self.timeout.as_secs(),
                "Tool timed out"
            );
            return Err(ToolError::Timeout {
                tool: tool_name.to_string(),
                seconds: self.timeout.as_secs(),
            });
        };

        // A script that never wrote its output file is not an error
        let side_channel = std::fs::read(output_path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        let stdout = String::from_utf8_lossy(&captured.stdout);

        let content = if stdout.is_empty() {
            side_channel
        } else {
            format!("{}\n{}", side_channel, stdout).trim().to_string()
        };

        let exit_code = status.code().unwrap_or(-1);
        if !status.success() {
            let stderr = String::from_utf8_lossy(&captured.stderr)
                .trim_end()
                .to_string();
            warn!(tool = tool_name, exit_code, "Tool exited with non-zero status");
            return Err(ToolError::Execution {
                tool: tool_name.to_string(),
                exit_code,
                stderr: (!stderr.is_empty()).then_some(stderr),
            });
        }

        let bytes = content.len();
        let (content, truncated) = truncate_output(content, self.max_output_bytes);
        if truncated {
            debug!(tool = tool_name, bytes, limit = self.max_output_bytes, "Output truncated");
        }

        Ok(ToolOutput {
            content,
            truncated,
            metadata: ToolResultMetadata {
                duration_ms: Some(start.elapsed().as_millis() as u64),
                bytes: Some(bytes),
                exit_code: Some(exit_code),
            },
        })
    }
}

/// Cut `content` to at most `max_bytes` (on a char boundary) and mark it
fn truncate_output(mut content: String, max_bytes: usize) -> (String, bool) {
    if content.len() <= max_bytes {
        return (content, false);
    }

    let mut cut = max_bytes;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    content.truncate(cut);
    content.push_str(TRUNCATION_MARKER);
    (content, true)
}

fn spawn_with_retry(cmd: &mut Command) -> io::Result<Child> {
    let mut attempt = 1;
    loop {
        match cmd.spawn() {
            Err(e) if is_text_file_busy(&e) && attempt < SPAWN_ATTEMPTS => {
                trace!(attempt, "Script busy, retrying spawn");
                attempt += 1;
                thread::sleep(Duration::from_millis(25 * u64::from(attempt)));
            }
            result => return result,
        }
    }
}

#[cfg(unix)]
fn is_text_file_busy(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::ETXTBSY)
}

#[cfg(not(unix))]
fn is_text_file_busy(_e: &io::Error) -> bool {
    false
}

/// Poll the child until it exits or `deadline` passes (`Ok(None)`)
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and everything in its process group, then reap it
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    unsafe {
        libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Reader threads draining stdout/stderr so a chatty script never blocks
/// on a full pipe.
struct CapturedPipes {
    rx: Receiver<(Stream, Vec<u8>)>,
    pending: usize,
}

impl CapturedPipes {
    fn start(child: &mut Child) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut pending = 0;

        if let Some(stdout) = child.stdout.take() {
            spawn_reader(Stream::Stdout, stdout, tx.clone());
            pending += 1;
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(Stream::Stderr, stderr, tx);
            pending += 1;
        }

        Self { rx, pending }
    }

    /// Wait for both streams to hit EOF; `None` if `deadline` passes first
    fn collect_until(self, deadline: Instant) -> Option<Captured> {
        let mut captured = Captured::default();

        for _ in 0..self.pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, bytes)) => captured.stdout = bytes,
                Ok((Stream::Stderr, bytes)) => captured.stderr = bytes,
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Some(captured)
    }
}

fn spawn_reader<R>(stream: Stream, mut pipe: R, tx: Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, buf));
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::{TempDir, tempdir};

    /// Write an executable script into a fresh functions directory
    fn script(body: &str) -> (TempDir, CommandSpec) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        (dir, CommandSpec::new(path))
    }

    fn executor(output_dir: &Path) -> ProcessExecutor {
        ProcessExecutor::new(Duration::from_secs(10), DEFAULT_MAX_OUTPUT_SIZE)
            .with_output_dir(output_dir)
    }

    fn is_empty_dir(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_stdout_only() {
        let (dir, spec) = script("echo hello");
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();

        assert_eq!(output.content, "hello");
        assert!(!output.truncated);
        assert_eq!(output.metadata.exit_code, Some(0));
        assert!(is_empty_dir(out_dir.path()));
    }

    #[test]
    fn test_side_channel_then_stdout() {
        let (dir, spec) = script(r#"printf 'from file' > "$LLM_OUTPUT"; echo from stdout"#);
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();

        assert_eq!(output.content, "from file\nfrom stdout");
    }

    #[test]
    fn test_side_channel_only_is_not_trimmed() {
        let (dir, spec) = script(r#"printf 'result\n' > "$LLM_OUTPUT""#);
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();

        assert_eq!(output.content, "result\n");
    }

    #[test]
    fn test_output_file_removed_by_script_is_not_an_error() {
        let (dir, spec) = script(r#"rm -f "$LLM_OUTPUT"; echo done"#);
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();

        assert_eq!(output.content, "done");
    }

    #[test]
    fn test_environment_and_working_dir() {
        let (dir, spec) = script(r#"echo "$ROOT_DIR"; pwd; test -f "$LLM_OUTPUT" && echo present"#);
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();
        let lines: Vec<_> = output.content.lines().collect();

        let root = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(fs::canonicalize(lines[0]).unwrap(), root);
        assert_eq!(fs::canonicalize(lines[1]).unwrap(), root);
        assert_eq!(lines[2], "present");
    }

    #[test]
    fn test_arguments_passed_as_tokens() {
        let (dir, mut spec) = script(r#"for a in "$@"; do echo "[$a]"; done"#);
        spec.push_option("message", "two words");
        spec.push_flag("loud");
        let out_dir = tempdir().unwrap();

        let output = executor(out_dir.path())
            .execute("t", &spec, dir.path())
            .unwrap();

        assert_eq!(output.content, "[--message]\n[two words]\n[--loud]");
    }

    #[test]
    fn test_non_zero_exit_is_execution_error() {
        let (dir, spec) = script("echo partial; echo 'bad input' >&2; exit 3");
        let out_dir = tempdir().unwrap();

        let err = executor(out_dir.path())
            .execute("failing", &spec, dir.path())
            .unwrap_err();

        assert_eq!(
            err,
            ToolError::Execution {
                tool: "failing".into(),
                exit_code: 3,
                stderr: Some("bad input".into()),
            }
        );
        assert!(is_empty_dir(out_dir.path()));
    }

    #[test]
    fn test_non_zero_exit_without_stderr() {
        let (dir, spec) = script("exit 1");
        let out_dir = tempdir().unwrap();

        let err = executor(out_dir.path())
            .execute("failing", &spec, dir.path())
            .unwrap_err();

        assert!(matches!(err, ToolError::Execution { stderr: None, exit_code: 1, .. }));
    }

    #[test]
    fn test_timeout_kills_script_and_cleans_up() {
        let (dir, spec) = script("sleep 5");
        let out_dir = tempdir().unwrap();
        let executor = ProcessExecutor::new(Duration::from_millis(300), DEFAULT_MAX_OUTPUT_SIZE)
            .with_output_dir(out_dir.path());

        let start = Instant::now();
        let err = executor.execute("sleepy", &spec, dir.path()).unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("sleepy"));
        assert!(is_empty_dir(out_dir.path()));
    }

    #[test]
    fn test_background_child_holding_pipe_times_out() {
        let (dir, spec) = script("sleep 5 &\necho started");
        let out_dir = tempdir().unwrap();
        let executor = ProcessExecutor::new(Duration::from_millis(300), DEFAULT_MAX_OUTPUT_SIZE)
            .with_output_dir(out_dir.path());

        let start = Instant::now();
        let err = executor.execute("bg", &spec, dir.path()).unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_large_output_truncated() {
        let (dir, spec) = script("head -c 2000000 /dev/zero | tr '\\0' 'x'");
        let out_dir = tempdir().unwrap();
        let executor = ProcessExecutor::new(Duration::from_secs(20), 1_048_576)
            .with_output_dir(out_dir.path());

        let output = executor.execute("big", &spec, dir.path()).unwrap();

        assert!(output.truncated);
        assert_eq!(output.metadata.bytes, Some(2_000_000));
        assert_eq!(output.content.len(), 1_048_576 + TRUNCATION_MARKER.len());
        assert!(output.content.ends_with(TRUNCATION_MARKER));
        assert!(output.content[..1_048_576].bytes().all(|b| b == b'x'));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempdir().unwrap();
        let spec = CommandSpec::new(dir.path().join("nope.sh"));

        let err = executor(dir.path())
            .execute("nope", &spec, dir.path())
            .unwrap_err();

        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn test_truncate_output_respects_char_boundary() {
        let (content, truncated) = truncate_output("héllo".to_string(), 2);
        assert!(truncated);
        assert_eq!(content, format!("h{}", TRUNCATION_MARKER));

        let (content, truncated) = truncate_output("short".to_string(), 5);
        assert!(!truncated);
        assert_eq!(content, "short");
    }
}
