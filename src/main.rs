//! flutter-lldb — Main Entry Point

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

use flutter_lldb::{Args, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("Starting flutter-lldb v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command line args: {:?}", args);

    let config = Config::from_args(&args);

    flutter_lldb::run(&config).await.inspect_err(|e| {
        error!("{}", e);
    })?;

    Ok(())
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    if let Some(log_file) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    debug!("Logging initialized with level: {}", args.log_level);
    Ok(())
}
