mod sandbox;

pub use sandbox::{RunOutput, RunStage};

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::info;

use questline_utils::parse::{parse_command_line, parse_flag};

pub const DEFAULT_COMPILE_CMD: &str = "javac Father.java Main.java";
pub const DEFAULT_RUN_CMD: &str = "java Main";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Program and args run first, inside the request's workspace.
    pub compile: Vec<String>,
    /// Program and args run after a successful compile.
    pub run: Vec<String>,
    /// Wall-clock budget for each of the two steps.
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            compile: split_default(DEFAULT_COMPILE_CMD),
            run: split_default(DEFAULT_RUN_CMD),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

fn split_default(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

/// Compiles and runs a two-file Java submission in a throwaway directory.
#[derive(Clone, Debug)]
pub struct RunnerService {
    config: Arc<RunnerConfig>,
}

impl RunnerService {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// `None` unless `RUNNER_ENABLED` is set to a truthy value.
    pub fn from_env_optional() -> anyhow::Result<Option<Self>> {
        let enabled = env::var("RUNNER_ENABLED")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        if !enabled {
            return Ok(None);
        }

        Ok(Some(Self::from_env()?))
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = RunnerConfig::default();

        let compile = match env::var("RUNNER_COMPILE_CMD") {
            Ok(raw) => parse_command_line(&raw).context("RUNNER_COMPILE_CMD is empty")?,
            Err(_) => defaults.compile,
        };
        let run = match env::var("RUNNER_RUN_CMD") {
            Ok(raw) => parse_command_line(&raw).context("RUNNER_RUN_CMD is empty")?,
            Err(_) => defaults.run,
        };
        let timeout = env::var("RUNNER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let max_output_bytes = env::var("RUNNER_MAX_OUTPUT_BYTES")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|bytes| *bytes > 0)
            .unwrap_or(defaults.max_output_bytes);

        let config = RunnerConfig {
            compile,
            run,
            timeout,
            max_output_bytes,
        };
        info!(
            compile = %config.compile.join(" "),
            run = %config.run.join(" "),
            timeout_seconds = config.timeout.as_secs(),
            "Code runner configured."
        );

        Ok(Self::new(config))
    }

    pub async fn compile_and_run(&self, father_code: &str, main_code: &str) -> anyhow::Result<RunOutput> {
        sandbox::compile_and_run(&self.config, father_code, main_code).await
    }
}
