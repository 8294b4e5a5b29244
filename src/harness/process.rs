//! Process launcher
//!
//! Spawns each run as a separate OS process:
//!
//! ```text
//! <program> [base args] --mode run --workers N --samples M --seed S --report <tmp>
//! ```
//!
//! Standard output and standard error are captured. The run must exit with
//! status 0 and print a `Total time:` line within its budget; otherwise its
//! whole process group is killed and any partial output is discarded.
//!
//! The `--report` file is a temporary JSON copy of the run's `RunResult`. It is
//! owned by a `NamedTempFile`, so it is removed on every exit path.

use super::parser::{ReportParser, TotalTimeParser};
use super::{LaunchSpec, RunLauncher, RunSuccess};
use crate::error::PiError;
use crate::output::json::read_run_report;
use crate::stats::RunResult;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Launches runs by spawning a program
pub struct ProcessLauncher {
    program: PathBuf,
    base_args: Vec<String>,
    parser: Box<dyn ReportParser>,
}

impl ProcessLauncher {
    /// Launch runs with `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            parser: Box::new(TotalTimeParser),
        }
    }

    /// Launch runs by re-invoking the current executable
    pub fn current_exe() -> crate::Result<Self> {
        let exe = std::env::current_exe().context("Failed to get current executable path")?;
        Ok(Self::new(exe))
    }

    /// Arguments placed before the run arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the timing parser
    pub fn with_parser(mut self, parser: Box<dyn ReportParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn build_command(&self, spec: &LaunchSpec, report_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .arg("--mode")
            .arg("run")
            .arg("--workers")
            .arg(spec.worker_count.to_string())
            .arg("--samples")
            .arg(spec.total_samples.to_string())
            .arg("--seed")
            .arg(spec.seed.to_string())
            .arg("--report")
            .arg(report_path);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take down the whole run
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

impl RunLauncher for ProcessLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<RunSuccess, PiError> {
        let report_file = tempfile::Builder::new()
            .prefix("piscale-run-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| PiError::RunFailed(format!("failed to create report file: {}", e)))?;

        let mut cmd = self.build_command(spec, report_file.path());
        log::debug!("Spawning {:?}", cmd.as_std());

        let mut child = cmd.spawn().map_err(|e| {
            PiError::RunFailed(format!("failed to spawn {}: {}", self.program.display(), e))
        })?;

        let pid = child.id();
        let mut stdout_task = spawn_reader(child.stdout.take());
        let mut stderr_task = spawn_reader(child.stderr.take());

        // The budget covers the whole exchange: exit, then both pipes drained
        let exchange = async {
            let status = child.wait().await?;
            // Anything the run left behind in its group must not hold the pipes open
            kill_group(pid);
            let stdout = collect(&mut stdout_task).await;
            let stderr = collect(&mut stderr_task).await;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        };

        let outcome = tokio::time::timeout(spec.timeout, exchange).await;
        let (status, stdout, stderr) = match outcome {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                terminate(&mut child, pid).await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(PiError::RunFailed(format!("failed to wait for run: {}", e)));
            }
            Err(_) => {
                log::warn!(
                    "Run with {} worker(s) exceeded {:.0}s, killing process group",
                    spec.worker_count,
                    spec.timeout.as_secs_f64()
                );
                terminate(&mut child, pid).await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(PiError::TimedOut {
                    budget: spec.timeout,
                });
            }
        };

        if !status.success() {
            let stderr = stderr.trim();
            let cause = if stderr.is_empty() {
                format!("{}", status)
            } else {
                format!("{}: {}", status, stderr)
            };
            return Err(PiError::RunFailed(cause));
        }

        let elapsed = self.parser.parse_elapsed(&stdout)?;
        let result = read_report(report_file.path());

        Ok(RunSuccess {
            elapsed,
            result,
            output: stdout,
        })
    }
}

fn spawn_reader<R>(stream: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = String::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_string(&mut buf).await {
                log::debug!("Failed to read run output: {}", e);
            }
        }
        buf
    })
}

async fn collect(task: &mut JoinHandle<String>) -> String {
    task.await.unwrap_or_default()
}

/// SIGKILL the run's whole process group
fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        // A negative pid addresses the whole process group
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
    #[cfg(not(unix))]
    let _ = pid;
}

/// Kill the run's process group, then the child itself, and reap it
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_group(pid);

    if let Err(e) = child.kill().await {
        log::debug!("Failed to kill run process: {}", e);
    }
}

/// Best-effort read of the run's JSON report
fn read_report(path: &Path) -> Option<RunResult> {
    match read_run_report(path) {
        Ok(result) => Some(result),
        Err(e) => {
            log::debug!("No usable run report: {:#}", e);
            None
        }
    }
}
