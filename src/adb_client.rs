//! ADB CLI wrapper for Android Debug Bridge operations
//!
//! Wraps the `adb` executable from the resolved SDK for process listing,
//! property queries, file transfer and `run-as` shell commands.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

/// Result of an adb command execution
#[derive(Debug)]
pub struct ExecResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Handle on the `adb` executable, optionally bound to one device
#[derive(Debug, Clone)]
pub struct Adb {
    path: PathBuf,
    serial: Option<String>,
}

impl Adb {
    pub fn new(path: impl Into<PathBuf>, serial: Option<String>) -> Self {
        Self {
            path: path.into(),
            serial,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        if let Some(s) = &self.serial {
            cmd.arg("-s").arg(s);
        }
        cmd
    }

    /// Run adb with the given arguments and capture its output
    pub async fn exec<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<ExecResult, AdbError> {
        let mut cmd = self.command();
        cmd.args(args);

        let output = cmd.output().await.map_err(|e| {
            AdbError::CommandFailed(format!("Failed to run {}: {}", self.path.display(), e))
        })?;

        Ok(ExecResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Run adb with stdout/stderr discarded, returning only the exit code
    pub async fn exec_quiet<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<i32, AdbError> {
        let mut cmd = self.command();
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());

        let status = cmd.status().await.map_err(|e| {
            AdbError::CommandFailed(format!("Failed to run {}: {}", self.path.display(), e))
        })?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Run adb attached to the terminal and wait for it to exit
    pub async fn exec_foreground<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<i32, AdbError> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd.status().await.map_err(|e| {
            AdbError::CommandFailed(format!("Failed to run {}: {}", self.path.display(), e))
        })?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Run a shell command on the device and return its stdout, failing on non-zero exit
    pub async fn shell_output(&self, args: &[&str]) -> Result<String, AdbError> {
        let command = args.join(" ");
        info!("adb shell: {}", command);

        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);

        let result = self.exec(&full).await?;
        if result.success {
            Ok(result.stdout)
        } else {
            Err(AdbError::ShellFailed(format!(
                "`{}` exited with {}: {}",
                command,
                result.exit_code,
                result.stderr.trim()
            )))
        }
    }

    /// Find the pid of `package` in the device's process list
    pub async fn find_package_pid(&self, package: &str) -> Result<Option<u32>, AdbError> {
        let ps_output = self.shell_output(&["ps"]).await?;
        let pid = parse_package_pid(&ps_output, package);
        debug!("pid for {}: {:?}", package, pid);
        Ok(pid)
    }

    /// Read the device's primary CPU ABI property
    pub async fn device_cpu_abi(&self) -> Result<String, AdbError> {
        let out = self
            .shell_output(&["getprop", "ro.product.cpu.abi"])
            .await?;
        Ok(out.trim().to_string())
    }
}

/// Find the first `ps` line whose second column is a pid and that later lists
/// `package` as a whole token.
pub fn parse_package_pid(ps_output: &str, package: &str) -> Option<u32> {
    ps_output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        fields.next()?;
        let pid = fields.next().filter(|f| f.bytes().all(|b| b.is_ascii_digit()))?;
        let pid = pid.parse::<u32>().ok()?;
        fields.any(|field| field == package).then_some(pid)
    })
}

#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    #[error("ADB command failed: {0}")]
    CommandFailed(String),

    #[error("ADB shell command failed: {0}")]
    ShellFailed(String),
}
