// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! rigctld-dummy: a rigctl daemon backed by an in-memory rig, for
//! exercising clients without radio hardware on the bench.

mod config;
mod rig;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rigctl_server::Server;

use crate::config::DummyConfig;
use crate::rig::DummyRig;

#[derive(Debug, Parser)]
#[command(version, about = "rigctl daemon with an emulated rig")]
struct Cli {
    /// Configuration file.
    #[arg(short = 'C', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit.
    #[arg(long = "print-config")]
    print_config: bool,

    /// Address to listen on.
    #[arg(short = 'l', long = "listen", value_name = "ADDR")]
    listen: Option<IpAddr>,

    /// Port to listen on.
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
}

fn init_logging(log_level: &str) {
    let level = log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", DummyConfig::example_toml());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => DummyConfig::load(path)?,
        None => DummyConfig::default(),
    };
    if let Some(address) = cli.listen {
        config.listen.address = address;
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    config.validate()?;

    init_logging(&config.general.log_level);

    let rig = Arc::new(Mutex::new(DummyRig::new(
        config.rig.freq_hz,
        config.rig.mode,
        config.rig.passband_hz,
    )));
    let handlers = rig::bind_handlers(&rig);

    let addr = SocketAddr::new(config.listen.address, config.listen.port);
    let server = Server::start(addr, handlers).await?;
    info!(
        "emulated rig at {:.0} Hz, {:?}",
        config.rig.freq_hz, config.rig.mode
    );

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, shutting down");
    server.stop().await;

    Ok(())
}
