//! Rendering and persisting the VS Code launch configuration

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::{LldbError, Result};
use crate::templates::{render, TEMPLATE_ATTACH, TEMPLATE_WAIT_FOR_PROCESS};

/// Values substituted into the launch templates
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchParams {
    pub package: String,
    /// Pid, or instructions for finding it when discovery failed
    pub pid: String,
    pub symbol_dir: String,
    pub build_dir: String,
    pub src_dir: String,
}

impl LaunchParams {
    pub fn from_config(config: &Config, pid: Option<u32>) -> Self {
        Self {
            package: config.package.clone(),
            pid: pid_text(pid, &config.package),
            symbol_dir: config.symbol_dir().display().to_string(),
            build_dir: config.build_dir().display().to_string(),
            src_dir: config.local_engine_src_path.display().to_string(),
        }
    }

    fn vars(&self) -> [(&str, &str); 5] {
        [
            ("PID", self.pid.as_str()),
            ("PACKAGE", self.package.as_str()),
            ("SYMBOL_DIR", self.symbol_dir.as_str()),
            ("BUILD_DIR", self.build_dir.as_str()),
            ("SRC_DIR", self.src_dir.as_str()),
        ]
    }
}

/// The pid as text, or a hint telling the user how to get it
pub fn pid_text(pid: Option<u32>, package: &str) -> String {
    match pid {
        Some(pid) => pid.to_string(),
        None => format!("get pid by execute `adb shell pidof {}` yourself", package),
    }
}

/// Both rendered launch configurations
#[derive(Debug, Clone)]
pub struct LaunchConfigs {
    /// For a process that already loaded `libflutter.so`
    pub attach: String,
    /// For a process that has not loaded `libflutter.so` yet; this one is persisted
    pub wait_for_process: String,
}

impl LaunchConfigs {
    pub fn render(params: &LaunchParams) -> Self {
        let vars = params.vars();
        Self {
            attach: render(TEMPLATE_ATTACH, &vars),
            wait_for_process: render(TEMPLATE_WAIT_FOR_PROCESS, &vars),
        }
    }
}

/// Write `contents` to `path`, creating the parent directory and replacing any existing file
pub async fn write_launch_json(path: &Path, contents: &str) -> Result<()> {
    let wrap = |source: std::io::Error| LldbError::LaunchConfigWrite {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(wrap)?;
    }
    tokio::fs::write(path, contents).await.map_err(wrap)?;

    info!("Wrote launch configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn params(pid: Option<u32>) -> LaunchParams {
        let config = Config {
            local_engine_src_path: PathBuf::from("/engine/src"),
            package: "com.example.app".to_string(),
            ..Config::default()
        };
        LaunchParams::from_config(&config, pid)
    }

    #[test]
    fn test_pid_text() {
        assert_eq!(pid_text(Some(12345), "com.example.app"), "12345");
        assert_eq!(
            pid_text(None, "com.example.app"),
            "get pid by execute `adb shell pidof com.example.app` yourself"
        );
    }

    #[test]
    fn test_params_from_config_defaults() {
        let p = params(Some(7));
        assert_eq!(p.pid, "7");
        assert_eq!(p.symbol_dir, "/engine/src/out/android_debug_unopt");
        assert_eq!(p.build_dir, "/engine/src");
        assert_eq!(p.src_dir, "/engine/src");
    }

    #[test]
    fn test_render_attach() {
        let configs = LaunchConfigs::render(&params(Some(12345)));
        assert!(configs.attach.contains("\"pid\": \"12345\","));
        assert!(configs
            .attach
            .contains("unix-abstract-connect:///data/data/com.example.app/debug.socket"));
        assert!(configs
            .attach
            .contains("\"add-dsym /engine/src/out/android_debug_unopt/libflutter.so\""));
        assert!(configs
            .attach
            .contains("\"settings set target.source-map /engine/src /engine/src\""));
        assert_eq!(configs.attach.matches("12345").count(), 1);
    }

    #[test]
    fn test_render_wait_for_process_exact() {
        let configs = LaunchConfigs::render(&params(Some(12345)));
        let expected = r#"
{
    "version": "0.2.0",
    "configurations": [
        {
            "name": "remote_lldb",
            "type": "lldb",
            "request": "attach",
            "pid": "12345",
            "initCommands": [
                "platform select remote-android",
                "platform connect unix-abstract-connect:///data/data/com.example.app/debug.socket"
            ],
            "preRunCommands": [
                "settings append target.exec-search-paths /engine/src/out/android_debug_unopt"
            ],
            "postRunCommands": [
                "settings set target.source-map /engine/src /engine/src"
            ],
        }
    ]
}
        "#;
        assert_eq!(configs.wait_for_process, expected);
    }

    #[test]
    fn test_render_with_guess_string() {
        let configs = LaunchConfigs::render(&params(None));
        let guess = pid_text(None, "com.example.app");
        assert_eq!(configs.attach.matches(guess.as_str()).count(), 1);
        assert_eq!(configs.wait_for_process.matches(guess.as_str()).count(), 1);
    }

    #[test]
    fn test_package_count_in_rendered_configs() {
        let found = LaunchConfigs::render(&params(Some(12345)));
        assert_eq!(found.attach.matches("com.example.app").count(), 1);
        assert_eq!(found.wait_for_process.matches("com.example.app").count(), 1);

        let missing = LaunchConfigs::render(&params(None));
        assert_eq!(missing.attach.matches("com.example.app").count(), 2);
        assert_eq!(missing.wait_for_process.matches("com.example.app").count(), 2);
    }

    #[test]
    fn test_render_keeps_placeholder_text_in_paths() {
        let config = Config {
            local_engine_src_path: PathBuf::from("/engine/{{SRC_DIR}}"),
            package: "com.example.app".to_string(),
            ..Config::default()
        };
        let configs = LaunchConfigs::render(&LaunchParams::from_config(&config, Some(1)));
        assert!(configs.wait_for_process.contains(
            "\"settings set target.source-map /engine/{{SRC_DIR}} /engine/{{SRC_DIR}}\""
        ));
    }

    #[tokio::test]
    async fn test_write_launch_json_creates_dir_and_overwrites() {
        let src = tempfile::tempdir().unwrap();
        let path = src.path().join(".vscode").join("launch.json");

        write_launch_json(&path, "old").await.unwrap();
        write_launch_json(&path, "new contents").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents");
    }

    #[tokio::test]
    async fn test_write_launch_json_error_names_path() {
        let src = tempfile::tempdir().unwrap();
        let blocker = src.path().join(".vscode");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_launch_json(&blocker.join("launch.json"), "x").await.unwrap_err();
        assert!(matches!(err, LldbError::LaunchConfigWrite { .. }));
        assert!(err.to_string().contains("launch.json"));
    }
}
