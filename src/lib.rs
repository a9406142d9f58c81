//! flutter-lldb
//!
//! Starts `lldb-server` inside a Flutter app's sandbox on an Android device
//! and generates the VS Code (CodeLLDB) configuration that attaches to it.

pub mod adb_client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod launch_config;
pub mod session;
pub mod templates;
pub mod toolchain;

pub use config::{Abi, Args, Config};
pub use error::{LldbError, Result};
pub use session::{prepare, run, Session, SessionSummary};
