use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ttyapply::device::{self, DEFAULT_BAUD_RATE, DeviceKind};
use ttyapply::Engine;

#[derive(Parser, Debug)]
#[command(
    name = "ttyapply",
    about = "Write configuration files to a serial console and show what it answers",
    version
)]
struct Args {
    /// Serial port to write to (or output file with --writefile)
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate of the serial port
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Treat PORT as a file and append to it instead
    #[arg(short, long)]
    writefile: bool,

    /// Configuration files to apply, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let kind = if args.writefile {
        DeviceKind::File
    } else {
        DeviceKind::Serial {
            baud_rate: args.baud,
        }
    };
    let dev = device::open(&args.port, kind)
        .await
        .with_context(|| format!("Failed to open device: {}", args.port))?;
    let mut engine = Engine::new(dev);

    let mut failed = 0;
    for path in &args.files {
        if let Err(e) = apply_file(&mut engine, path).await {
            tracing::error!("{e:#}");
            failed += 1;
        }
    }

    engine.close().await.context("Failed to close device")?;

    if failed > 0 {
        bail!("{failed} of {} configuration files failed", args.files.len());
    }
    Ok(())
}

async fn apply_file(engine: &mut Engine, path: &Path) -> Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open configuration file: {}", path.display()))?;
    engine
        .run_script(file)
        .await
        .with_context(|| format!("Failed to apply configuration file: {}", path.display()))
}
