//! Deploying and starting `lldb-server` inside the app's sandbox
//!
//! The sequence is built as a plain list of adb invocations and then run in
//! order. Each step carries its own failure policy; nothing is retried.

use std::path::Path;

use tracing::{info, warn};

use crate::adb_client::{Adb, AdbError};

/// Shared staging location the binary is pushed to first
pub const LLDB_SERVER_DEVICE_TMP_PATH: &str = "/data/local/tmp/lldb-server";

/// `/data/data/<package>/lldb-server`
pub fn device_server_path(package: &str) -> String {
    format!("/data/data/{}/lldb-server", package)
}

/// `unix-abstract:///data/data/<package>/debug.socket`
pub fn listen_url(package: &str) -> String {
    format!("unix-abstract:///data/data/{}/debug.socket", package)
}

/// What happens when a step exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Tolerated,
    Fatal,
}

/// How a step's stdio is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepIo {
    /// Output discarded
    Quiet,
    /// Output captured and logged
    Captured,
    /// Attached to the terminal; blocks until the remote command exits
    Foreground,
}

/// One adb invocation in the deployment sequence
#[derive(Debug, Clone, PartialEq)]
pub struct DeployStep {
    pub name: &'static str,
    pub args: Vec<String>,
    pub policy: FailurePolicy,
    pub io: StepIo,
}

fn run_as(package: &str, rest: &[&str]) -> Vec<String> {
    ["shell", "run-as", package]
        .iter()
        .chain(rest)
        .map(|s| s.to_string())
        .collect()
}

/// The ordered adb invocations that install and start `lldb-server`
pub fn plan(package: &str, local_server: &Path) -> Vec<DeployStep> {
    let device_path = device_server_path(package);
    let server_cmd = format!(
        "'{} platform --server --listen {}'",
        device_path,
        listen_url(package)
    );

    vec![
        DeployStep {
            name: "push",
            args: vec![
                "push".to_string(),
                local_server.display().to_string(),
                LLDB_SERVER_DEVICE_TMP_PATH.to_string(),
            ],
            policy: FailurePolicy::Tolerated,
            io: StepIo::Quiet,
        },
        DeployStep {
            name: "copy",
            args: run_as(
                package,
                &["cp", "-F", LLDB_SERVER_DEVICE_TMP_PATH, device_path.as_str()],
            ),
            policy: FailurePolicy::Fatal,
            io: StepIo::Captured,
        },
        DeployStep {
            name: "chmod",
            args: run_as(package, &["chmod", "a+x", device_path.as_str()]),
            policy: FailurePolicy::Fatal,
            io: StepIo::Captured,
        },
        DeployStep {
            name: "killall",
            args: run_as(package, &["killall", "lldb-server"]),
            policy: FailurePolicy::Tolerated,
            io: StepIo::Captured,
        },
        DeployStep {
            name: "start",
            args: run_as(package, &["sh", "-c", server_cmd.as_str()]),
            policy: FailurePolicy::Fatal,
            io: StepIo::Foreground,
        },
    ]
}

/// Run one step, applying its failure policy
pub async fn run_step(adb: &Adb, step: &DeployStep) -> Result<(), AdbError> {
    info!("[{}] adb {}", step.name, step.args.join(" "));

    let (exit_code, stderr) = match step.io {
        StepIo::Quiet => (adb.exec_quiet(&step.args).await?, String::new()),
        StepIo::Captured => {
            let result = adb.exec(&step.args).await?;
            if !result.stdout.trim().is_empty() {
                info!("[{}] {}", step.name, result.stdout.trim());
            }
            (result.exit_code, result.stderr)
        }
        StepIo::Foreground => (adb.exec_foreground(&step.args).await?, String::new()),
    };

    if exit_code == 0 {
        return Ok(());
    }

    match step.policy {
        FailurePolicy::Tolerated => {
            warn!("[{}] exited with {}, continuing", step.name, exit_code);
            Ok(())
        }
        FailurePolicy::Fatal => Err(AdbError::ShellFailed(format!(
            "{} step exited with {}: {}",
            step.name,
            exit_code,
            stderr.trim()
        ))),
    }
}

/// Run the whole sequence. Returns once the foreground `lldb-server` exits.
pub async fn deploy_and_start(
    adb: &Adb,
    package: &str,
    local_server: &Path,
) -> Result<(), AdbError> {
    for step in plan(package, local_server) {
        run_step(adb, &step).await?;
    }
    Ok(())
}
