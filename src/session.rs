//! End-to-end debug session setup
//!
//! Resolves adb, the target pid and the `lldb-server` binary, writes the
//! launch configuration and finally hands the terminal to `lldb-server`.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adb_client::Adb;
use crate::config::{Abi, Config};
use crate::deploy;
use crate::error::Result;
use crate::launch_config::{write_launch_json, LaunchConfigs, LaunchParams};
use crate::toolchain;

/// Everything resolved before deployment starts
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub package: String,
    pub pid: Option<u32>,
    pub abi: Abi,
    pub adb: PathBuf,
    pub serial: Option<String>,
    pub lldb_server: PathBuf,
    pub device_server_path: String,
    pub socket: String,
    pub launch_json: Option<PathBuf>,
}

/// A prepared session, ready to deploy
#[derive(Debug)]
pub struct Session {
    pub adb: Adb,
    pub summary: SessionSummary,
    pub configs: LaunchConfigs,
}

/// Guidance printed when the pid could not be discovered
pub fn pid_not_found_guidance(package: &str) -> String {
    format!(
        "Unable to find pid for package {package} on device\n\
         You can get the application pid by executing one of these commands in a terminal:\n\
         adb shell pidof {package}\n\
         adb shell ps | grep {package} | awk '{{ print $2 }}'\n\
         \n\
         Replace the `pid` in .vscode/launch.json yourself because it could not be found automatically\n"
    )
}

/// Guidance printed when no engine source tree was given
pub fn engine_src_guidance() -> String {
    "Replace the `add-dsym` in the launch configuration yourself because the libflutter.so symbol path is unknown\n\
     Replace the `target.source-map` in the launch configuration yourself because the engine src path is unknown\n\
     \n\
     To generate the configuration automatically, provide the local engine src path with --local-engine-src-path /path/to/engine/src\n\
     and the local engine out dirname with --local-engine android_debug_unopt\n"
        .to_string()
}

/// ABI from the command line, else from the device, else `armeabi`
pub async fn resolve_abi(adb: &Adb, explicit: Option<Abi>) -> Abi {
    if let Some(abi) = explicit {
        return abi;
    }

    match adb.device_cpu_abi().await {
        Ok(prop) => Abi::from_cpu_abi_prop(&prop).unwrap_or_else(|| {
            warn!("Unrecognized device ABI '{}', using {}", prop, Abi::default());
            Abi::default()
        }),
        Err(e) => {
            warn!("Could not query device ABI ({}), using {}", e, Abi::default());
            Abi::default()
        }
    }
}

/// Resolve all inputs, print both launch configurations and persist one.
pub async fn prepare(config: &Config) -> Result<Session> {
    let adb = Adb::new(config.adb_path()?, config.serial.clone());
    info!("Using adb at {}", adb.path().display());

    let abi = resolve_abi(&adb, config.abi).await;
    let lldb_server =
        toolchain::lldb_server_path(&config.local_engine_src_path, toolchain::host_tag(), abi);
    debug!("lldb-server ({}): {}", abi, lldb_server.display());

    let pid = adb.find_package_pid(&config.package).await?;
    if pid.is_none() {
        println!("{}", pid_not_found_guidance(&config.package));
    }

    if !config.has_engine_src() {
        println!("{}", engine_src_guidance());
    }

    let params = LaunchParams::from_config(config, pid);
    let configs = LaunchConfigs::render(&params);

    println!();
    println!("Visual Studio Code launch configuration.");
    println!("This configuration behaves like `attach to debuggable process`.");
    println!(
        "Copy it to .vscode/launch.json if libflutter.so is already loaded into memory:\n{}",
        configs.attach
    );

    println!("Visual Studio Code launch configuration.");
    println!("This configuration behaves like `wait for debuggable process`.");
    println!(
        "Copy it to .vscode/launch.json if libflutter.so is not loaded into memory yet:\n{}",
        configs.wait_for_process
    );

    let launch_json = if config.has_engine_src() {
        let path = config.launch_json_path();
        write_launch_json(&path, &configs.wait_for_process).await?;
        Some(path)
    } else {
        warn!("No engine src path given, not writing .vscode/launch.json");
        None
    };

    let summary = SessionSummary {
        package: config.package.clone(),
        pid,
        abi,
        adb: adb.path().to_path_buf(),
        serial: config.serial.clone(),
        lldb_server,
        device_server_path: deploy::device_server_path(&config.package),
        socket: deploy::listen_url(&config.package),
        launch_json,
    };

    Ok(Session {
        adb,
        summary,
        configs,
    })
}

/// Full run: prepare, optionally print the JSON summary, then deploy and
/// block on the foreground `lldb-server`.
pub async fn run(config: &Config) -> Result<()> {
    let session = prepare(config).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&session.summary)?);
    }

    info!(
        "Starting lldb-server for {} on {}",
        session.summary.package, session.summary.socket
    );
    deploy::deploy_and_start(&session.adb, &config.package, &session.summary.lldb_server).await?;
    Ok(())
}
