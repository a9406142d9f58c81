//! Locating the prebuilt `lldb-server` inside an engine tree's NDK

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::Abi;

/// NDK clang toolchain location, relative to the engine src root
const NDK_LLVM_PREBUILT: &str = "third_party/android_tools/ndk/toolchains/llvm/prebuilt";

/// NDK prebuilt tag for the machine this tool runs on
pub fn host_tag() -> &'static str {
    if cfg!(target_os = "macos") {
        "darwin-x86_64"
    } else if cfg!(target_os = "windows") {
        "windows-x86_64"
    } else {
        "linux-x86_64"
    }
}

/// `<src>/third_party/android_tools/ndk/toolchains/llvm/prebuilt/<host>/lib64/clang`
pub fn clang_dir(engine_src: &Path, host: &str) -> PathBuf {
    engine_src
        .join(NDK_LLVM_PREBUILT)
        .join(host)
        .join("lib64")
        .join("clang")
}

/// Path of the `lldb-server` binary for `abi` under the engine's NDK.
///
/// Uses whatever entry `read_dir` yields first under the clang directory as
/// the clang version. A missing or empty directory is logged and produces a
/// path without a version component, which fails later at push time.
pub fn lldb_server_path(engine_src: &Path, host: &str, abi: Abi) -> PathBuf {
    let clang = clang_dir(engine_src, host);
    let version = first_entry(&clang).unwrap_or_default();
    clang
        .join(version)
        .join("lib")
        .join("linux")
        .join(abi.ndk_arch())
        .join("lldb-server")
}

fn first_entry(dir: &Path) -> Option<String> {
    let mut entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Cannot list {}: {}", dir.display(), e);
            return None;
        }
    };

    match entries.next() {
        Some(Ok(entry)) => {
            let name = entry.file_name().to_string_lossy().to_string();
            debug!("Using clang version directory {}", name);
            Some(name)
        }
        Some(Err(e)) => {
            error!("Cannot read entry in {}: {}", dir.display(), e);
            None
        }
        None => {
            error!("No clang version directory in {}", dir.display());
            None
        }
    }
}
