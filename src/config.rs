//! Configuration for flutter-lldb

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::error::{LldbError, Result};

/// Placeholder used when no engine source tree is given
pub const DEFAULT_ENGINE_SRC_PATH: &str = "/path/to/engine/src";

/// Default local engine output directory name
pub const DEFAULT_LOCAL_ENGINE: &str = "android_debug_unopt";

/// Environment variable consulted when `--android-sdk` is not usable
pub const ANDROID_HOME_ENV: &str = "ANDROID_HOME";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "flutter-lldb")]
#[command(about = "Start lldb-server on an Android device to debug a Flutter engine process")]
#[command(version)]
pub struct Args {
    /// Android SDK home (overrides ANDROID_HOME env var)
    #[arg(long)]
    pub android_sdk: Option<PathBuf>,

    /// lldb-server executable's ABI (detected from the device when omitted)
    #[arg(long, value_enum)]
    pub abi: Option<Abi>,

    /// Flutter local engine src
    #[arg(long, default_value = DEFAULT_ENGINE_SRC_PATH)]
    pub local_engine_src_path: PathBuf,

    /// Flutter local engine, such as `android_debug_unopt`
    #[arg(long, default_value = DEFAULT_LOCAL_ENGINE)]
    pub local_engine: String,

    /// Engine build dir on the build machine, if different from src
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Engine symbol dir (default: <src>/out/<local-engine>)
    #[arg(long)]
    pub symbol_dir: Option<PathBuf>,

    /// Device serial, passed to adb as `-s <serial>`
    #[arg(long)]
    pub serial: Option<String>,

    /// Print a JSON summary of the session before starting lldb-server
    #[arg(long)]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file path (defaults to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// The application's package name running on the device
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub package: String,
}

/// Android ABIs lldb-server is shipped for
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum Abi {
    #[default]
    #[value(name = "armeabi")]
    #[serde(rename = "armeabi")]
    Armeabi,
    #[value(name = "arm64-v8a")]
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    #[value(name = "x86")]
    #[serde(rename = "x86")]
    X86,
    #[value(name = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Abi {
    pub fn as_str(&self) -> &'static str {
        match self {
            Abi::Armeabi => "armeabi",
            Abi::Arm64V8a => "arm64-v8a",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }

    /// Architecture directory name used by the NDK clang runtime layout
    pub fn ndk_arch(&self) -> &'static str {
        match self {
            Abi::Armeabi => "arm",
            Abi::Arm64V8a => "aarch64",
            Abi::X86 => "i386",
            Abi::X86_64 => "x86_64",
        }
    }

    /// Map a `ro.product.cpu.abi` property value to an ABI
    pub fn from_cpu_abi_prop(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with("arm64") {
            Some(Abi::Arm64V8a)
        } else if value.starts_with("arm") {
            Some(Abi::Armeabi)
        } else if value == "x86_64" {
            Some(Abi::X86_64)
        } else if value == "x86" {
            Some(Abi::X86)
        } else {
            None
        }
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone)]
pub struct Config {
    pub android_sdk: Option<PathBuf>,
    pub abi: Option<Abi>,
    pub local_engine_src_path: PathBuf,
    pub local_engine: String,
    pub build_dir: Option<PathBuf>,
    pub symbol_dir: Option<PathBuf>,
    pub serial: Option<String>,
    pub json: bool,
    pub package: String,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            android_sdk: args.android_sdk.clone(),
            abi: args.abi,
            local_engine_src_path: args.local_engine_src_path.clone(),
            local_engine: args.local_engine.clone(),
            build_dir: args.build_dir.clone(),
            symbol_dir: args.symbol_dir.clone(),
            serial: args.serial.clone(),
            json: args.json,
            package: args.package.clone(),
        }
    }

    /// Whether a real engine source tree was given
    pub fn has_engine_src(&self) -> bool {
        self.local_engine_src_path != Path::new(DEFAULT_ENGINE_SRC_PATH)
    }

    /// `<src>/out/<local-engine>`
    pub fn local_engine_out(&self) -> PathBuf {
        self.local_engine_src_path.join("out").join(&self.local_engine)
    }

    pub fn symbol_dir(&self) -> PathBuf {
        self.symbol_dir.clone().unwrap_or_else(|| self.local_engine_out())
    }

    pub fn build_dir(&self) -> PathBuf {
        self.build_dir
            .clone()
            .unwrap_or_else(|| self.local_engine_src_path.clone())
    }

    pub fn launch_json_path(&self) -> PathBuf {
        self.local_engine_src_path.join(".vscode").join("launch.json")
    }

    /// Resolve the Android SDK home from `--android-sdk` or `ANDROID_HOME`
    pub fn android_home(&self) -> Result<PathBuf> {
        resolve_android_home(self.android_sdk.as_deref(), std::env::var_os(ANDROID_HOME_ENV))
    }

    /// `<sdk>/platform-tools/adb`
    pub fn adb_path(&self) -> Result<PathBuf> {
        Ok(adb_path_in(&self.android_home()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            android_sdk: None,
            abi: None,
            local_engine_src_path: PathBuf::from(DEFAULT_ENGINE_SRC_PATH),
            local_engine: DEFAULT_LOCAL_ENGINE.to_string(),
            build_dir: None,
            symbol_dir: None,
            serial: None,
            json: false,
            package: String::new(),
        }
    }
}

/// Prefer an explicit SDK path that exists on disk, then the env var value.
pub fn resolve_android_home(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    match env_value {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => Err(LldbError::SdkNotFound(format!(
            "You must set environment with ${} or provide the android sdk home with --android-sdk",
            ANDROID_HOME_ENV
        ))),
    }
}

pub fn adb_path_in(android_home: &Path) -> PathBuf {
    android_home.join("platform-tools").join("adb")
}
