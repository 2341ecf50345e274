// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::sync::Arc;

use clap::Parser;

mod config;
mod server;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Vehicle telemetry simulator daemon", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(short = 'c', long = "config", alias = "conf", value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Network address to listen on.
    #[arg(short = 'l', long, env = "LISTEN_ADDRESS")]
    listen: Option<String>,
    /// Device identifier.
    #[arg(long = "imei", env = "DEVICE_IMEI")]
    device_imei: Option<String>,
    /// Comma separated list of device identifiers.
    #[arg(long = "imei-list", env = "DEVICE_IMEI_LIST")]
    device_imei_list: Option<String>,
    /// Generate a random identifier if none is configured.
    #[arg(
        long,
        env = "ALLOW_GENERATE_IMEI",
        value_name = "BOOL",
        value_parser = telemetria::util::string_try_into_bool
    )]
    allow_generate_imei: Option<bool>,
    /// Telemetry interval in milliseconds.
    #[arg(long, value_name = "MS")]
    interval: Option<u64>,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut config: config::Config = match &args.config {
        Some(path) => telemetria::from_file(path)?,
        None => config::Config::default(),
    };

    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if args.device_imei.is_some() {
        config.identity.device_imei = args.device_imei;
    }
    if args.device_imei_list.is_some() {
        config.identity.device_imei_list = args.device_imei_list;
    }
    if let Some(allow_generate_imei) = args.allow_generate_imei {
        config.identity.allow_generate_imei = allow_generate_imei;
    }
    if let Some(interval) = args.interval {
        config.telemetry.interval_ms = interval;
    }

    let mut log_config = simplelog::ConfigBuilder::new();
    if args.daemon {
        log_config.set_time_level(LevelFilter::Off);
        log_config.set_thread_level(LevelFilter::Off);
    }

    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("hyper");
    log_config.add_filter_ignore_str("mio");
    log_config.add_filter_ignore_str("tungstenite");

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let color_choice = if args.daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        color_choice,
    )?;

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    log::trace!("{:#?}", config);

    daemonize(&config).await
}

fn resolve_identity(
    config: &config::Config,
) -> anyhow::Result<telemetria::identity::IdentityProvider> {
    let identity = telemetria::identity::IdentityProvider::from_config(
        &config.identity,
        &mut telemetria::rand::thread_rng(),
    )?;

    log::info!(
        "Identity pool: {} configured, initial identifier {}",
        identity.pool().len(),
        identity.initial()
    );

    Ok(identity)
}

async fn daemonize(config: &config::Config) -> anyhow::Result<()> {
    let identity = resolve_identity(config)?;

    let generator = telemetria::simulator::TelemetryGenerator::new(identity);
    let broadcaster = Arc::new(telemetria::service::Broadcaster::new(
        generator,
        config.telemetry.interval(),
    ));

    let runtime = telemetria::RuntimeContext::new().with_shutdown();

    let state = server::ServerState {
        broadcaster,
        semaphore: Arc::new(tokio::sync::Semaphore::new(config.server.max_connections)),
    };

    runtime.spawn_background_task(server::status_report(
        state.clone(),
        config.server.max_connections,
    ));

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;

    log::info!(
        "Telemetry stream available on ws://{}{}",
        config.server.listen,
        telemetria::consts::TELEMETRY_PATH
    );

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(runtime.wait_for_shutdown())
        .await?;

    log::debug!("{} was shutdown gracefully", env!("CARGO_BIN_NAME"));

    Ok(())
}
