use std::io;
use std::path::Path;
use std::process::Stdio;

use anyhow::Context as _;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::RunnerConfig;

const FATHER_FILE: &str = "Father.java";
const MAIN_FILE: &str = "Main.java";
const TRUNCATION_MARKER: &str = "\n[output truncated]";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Compile,
    Run,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    /// Stderr of the failing step, otherwise stdout of the program.
    pub output: String,
    /// Last step that was attempted.
    pub stage: RunStage,
    pub success: bool,
    pub timed_out: bool,
}

enum StepResult {
    Finished {
        success: bool,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// A stream passed the cap and the process was killed. Holds the capped stream.
    OutputLimit(Vec<u8>),
    TimedOut,
    SpawnFailed(String),
}

#[derive(Default)]
struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

/// Each call gets its own temp directory, removed when the call returns.
pub(crate) async fn compile_and_run(
    config: &RunnerConfig,
    father_code: &str,
    main_code: &str,
) -> anyhow::Result<RunOutput> {
    let workspace = tempfile::Builder::new()
        .prefix("questline-run-")
        .tempdir()
        .context("failed to create runner workspace")?;
    let dir = workspace.path();

    tokio::fs::write(dir.join(FATHER_FILE), father_code)
        .await
        .context("failed to write Father.java")?;
    tokio::fs::write(dir.join(MAIN_FILE), main_code)
        .await
        .context("failed to write Main.java")?;

    let compiled = run_step(&config.compile, dir, config).await;
    if let Some(output) = finish_if_failed(compiled, RunStage::Compile, config) {
        return Ok(output);
    }

    let ran = run_step(&config.run, dir, config).await;
    match ran {
        StepResult::Finished {
            success: true,
            stdout,
            ..
        } => Ok(RunOutput {
            output: cap_output(&stdout, config.max_output_bytes, false),
            stage: RunStage::Run,
            success: true,
            timed_out: false,
        }),
        other => finish_if_failed(other, RunStage::Run, config)
            .context("run step reported neither success nor failure"),
    }
}

/// Turn a failed step into the response. `None` means the step succeeded.
fn finish_if_failed(result: StepResult, stage: RunStage, config: &RunnerConfig) -> Option<RunOutput> {
    let (output, timed_out) = match result {
        StepResult::Finished { success: true, .. } => return None,
        StepResult::Finished { stderr, .. } => (cap_output(&stderr, config.max_output_bytes, false), false),
        StepResult::OutputLimit(bytes) => (cap_output(&bytes, config.max_output_bytes, true), false),
        StepResult::TimedOut => (
            format!("execution timed out after {:?}", config.timeout),
            true,
        ),
        StepResult::SpawnFailed(message) => (message, false),
    };

    Some(RunOutput {
        output,
        stage,
        success: false,
        timed_out,
    })
}

async fn run_step(command: &[String], dir: &Path, config: &RunnerConfig) -> StepResult {
    let Some((program, args)) = command.split_first() else {
        return StepResult::SpawnFailed("runner command is empty".to_owned());
    };

    let spawned = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            warn!(?err, program = %program, "Failed to start runner step.");
            return StepResult::SpawnFailed(format!("failed to start `{program}`: {err}"));
        }
    };

    debug!(program = %program, "Started runner step.");
    match tokio::time::timeout(config.timeout, collect(&mut child, config.max_output_bytes)).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(?err, program = %program, "Runner step failed while collecting output.");
            StepResult::SpawnFailed(format!("failed to run `{program}`: {err}"))
        }
        Err(_) => {
            warn!(program = %program, timeout_seconds = config.timeout.as_secs(), "Runner step timed out.");
            StepResult::TimedOut
        }
    }
}

/// Drain both pipes, holding at most `max_bytes` of each. The child is killed
/// as soon as either stream goes past the cap.
async fn collect(child: &mut Child, max_bytes: usize) -> io::Result<StepResult> {
    let stdout = read_capped(child.stdout.take(), max_bytes);
    let stderr = read_capped(child.stderr.take(), max_bytes);
    tokio::pin!(stdout, stderr);

    let mut out: Option<Captured> = None;
    let mut err: Option<Captured> = None;
    let mut killed = false;

    while out.is_none() || err.is_none() {
        tokio::select! {
            captured = &mut stdout, if out.is_none() => out = Some(captured?),
            captured = &mut stderr, if err.is_none() => err = Some(captured?),
        }

        let overflowed = [&out, &err]
            .into_iter()
            .any(|captured| captured.as_ref().is_some_and(|captured| captured.overflowed));
        if overflowed && !killed {
            debug!(max_bytes, "Runner output over the cap; killing step.");
            child.start_kill()?;
            killed = true;
        }
    }

    let status = child.wait().await?;
    let out = out.unwrap_or_default();
    let err = err.unwrap_or_default();

    Ok(if out.overflowed {
        StepResult::OutputLimit(out.bytes)
    } else if err.overflowed {
        StepResult::OutputLimit(err.bytes)
    } else {
        StepResult::Finished {
            success: status.success(),
            stdout: out.bytes,
            stderr: err.bytes,
        }
    })
}

async fn read_capped<R>(reader: Option<R>, max_bytes: usize) -> io::Result<Captured>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(Captured::default());
    };

    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(limit).read_to_end(&mut bytes).await?;

    let overflowed = bytes.len() > max_bytes;
    bytes.truncate(max_bytes);
    Ok(Captured { bytes, overflowed })
}

/// Lossy UTF-8 decode, cut at `max_bytes` on a char boundary. The marker is
/// appended when anything was dropped here or upstream.
fn cap_output(bytes: &[u8], max_bytes: usize, truncated: bool) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= max_bytes {
        let mut text = text.into_owned();
        if truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        return text;
    }

    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &text[..cut], TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RunStage, cap_output, compile_and_run};
    use crate::RunnerConfig;

    fn config(compile: &[&str], run: &[&str]) -> RunnerConfig {
        RunnerConfig {
            compile: compile.iter().map(|part| (*part).to_owned()).collect(),
            run: run.iter().map(|part| (*part).to_owned()).collect(),
            timeout: Duration::from_secs(5),
            max_output_bytes: 1024,
        }
    }

    #[test]
    fn caps_on_char_boundary() {
        assert_eq!(cap_output(b"short", 10, false), "short");
        assert_eq!(cap_output(b"short", 10, true), "short\n[output truncated]");
        let capped = cap_output("héllo".as_bytes(), 2, false);
        assert_eq!(capped, "h\n[output truncated]");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn returns_program_stdout() {
        let config = config(&["cat", "Father.java", "Main.java"], &["cat", "Main.java"]);
        let output = compile_and_run(&config, "class Father {}", "class Main {}")
            .await
            .expect("runs");
        assert!(output.success);
        assert_eq!(output.stage, RunStage::Run);
        assert_eq!(output.output, "class Main {}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn compile_failure_returns_stderr() {
        let config = config(&["sh", "-c", "echo 'Main.java:1: error' >&2; exit 1"], &["true"]);
        let output = compile_and_run(&config, "", "").await.expect("runs");
        assert!(!output.success);
        assert_eq!(output.stage, RunStage::Compile);
        assert_eq!(output.output, "Main.java:1: error\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runtime_failure_returns_stderr() {
        let config = config(&["true"], &["sh", "-c", "echo boom >&2; exit 3"]);
        let output = compile_and_run(&config, "", "").await.expect("runs");
        assert_eq!(output.stage, RunStage::Run);
        assert_eq!(output.output, "boom\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_programs_time_out() {
        let mut config = config(&["true"], &["sleep", "5"]);
        config.timeout = Duration::from_millis(200);
        let output = compile_and_run(&config, "", "").await.expect("runs");
        assert!(output.timed_out);
        assert_eq!(output.stage, RunStage::Run);
        assert!(output.output.contains("timed out"));
    }

    #[tokio::test]
    async fn missing_compiler_is_reported() {
        let config = config(&["questline-no-such-compiler"], &["true"]);
        let output = compile_and_run(&config, "", "").await.expect("runs");
        assert!(!output.success);
        assert!(output.output.contains("failed to start"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn concurrent_runs_do_not_share_files() {
        let config = config(&["true"], &["cat", "Main.java"]);
        let (a, b) = tokio::join!(
            compile_and_run(&config, "", "first"),
            compile_and_run(&config, "", "second"),
        );
        assert_eq!(a.expect("a").output, "first");
        assert_eq!(b.expect("b").output, "second");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn endless_output_is_capped_and_killed() {
        let mut config = config(&["true"], &["yes"]);
        config.timeout = Duration::from_secs(30);
        let started = std::time::Instant::now();

        let output = compile_and_run(&config, "", "").await.expect("runs");

        assert!(!output.timed_out);
        assert!(!output.success);
        assert_eq!(output.stage, RunStage::Run);
        assert!(output.output.ends_with("\n[output truncated]"));
        assert!(output.output.len() <= config.max_output_bytes + "\n[output truncated]".len());
        assert!(started.elapsed() < config.timeout);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn noisy_stderr_is_capped_too() {
        let config = config(&["sh", "-c", "exec head -c 400000 /dev/zero >&2"], &["true"]);
        let output = compile_and_run(&config, "", "").await.expect("runs");

        assert!(!output.success);
        assert_eq!(output.stage, RunStage::Compile);
        assert!(output.output.len() <= config.max_output_bytes + "\n[output truncated]".len());
    }
}
