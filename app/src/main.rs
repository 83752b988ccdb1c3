mod config;
mod inbound;
mod nats_client;
mod outbound;
mod shutdown;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_nats::jetstream;
use clap::{Parser, Subcommand};
use config::app_config::AppConfig;
use inbound::{
    model::command::CommandMessage,
    nats::{NatsCommandChannel, NatsConsumer},
    serial::SerialLink,
};
use internal::{
    port::{clock::SystemClock, telemetry::TelemetrySinkDrivenPort},
    service::coordinator::Coordinator,
};
use log::{error, info, warn};
use nats_client::NatsClient;
use outbound::{nats_publisher::NatsPublisher, postgres::TelemetryRepository};
use utils::pem::PemUtils;

#[derive(Parser)]
#[command(name = "fermentation-controller", version, about = "Fermentation chamber controller")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the controller against the configured device (default)
    Run,
    /// Publish a command to a running controller
    Send {
        #[arg(long)]
        target_temp: Option<f64>,
        #[arg(long)]
        brew_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    PemUtils::init_provider();
    let cli = Cli::parse();
    let conf = AppConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(conf).await,
        Command::Send { target_temp, brew_id } => send(conf, CommandMessage { target_temp, brew_id }).await,
    }
}

async fn run(conf: AppConfig) -> Result<()> {
    let (frames, setpoint) = SerialLink::open(&conf.serial.port, conf.serial.baud_rate)
        .inspect_err(|e| error!("{e}"))?;

    let client = NatsClient {
        client_config: conf.nats.client,
    }
    .connect()
    .await?;
    let context = jetstream::new(client);
    let consumer = NatsConsumer::new(conf.nats.consumer)
        .create_consumer(&context)
        .await?;
    let commands = NatsCommandChannel::open(&consumer).await?;

    let sink = TelemetryRepository::new(conf.postgres.options());
    match sink.latest().await {
        Ok(Some(latest)) => info!(
            "Last recorded telemetry: brew {} at {} with {} field(s)",
            latest.brew_id,
            latest.timestamp,
            latest.fields.len()
        ),
        Ok(None) => info!("No telemetry recorded yet"),
        Err(e) => warn!("Unable to read latest telemetry: {e:#}"),
    }

    let desired = conf.fermenter.desired_state();
    info!(
        "Starting controller for brew {} with target {}",
        desired.brew_id, desired.target_temp
    );
    let coordinator = Coordinator::new(desired, sink, SystemClock, conf.controller.reconcile_interval());

    tokio::select! {
        outcome = coordinator.run(frames, setpoint, commands) => {
            outcome.inspect_err(|e| error!("Controller stopped: {e}"))?;
        }
        _ = shutdown::shutdown_signal() => info!("Shutting down controller"),
    }
    Ok(())
}

async fn send(conf: AppConfig, message: CommandMessage) -> Result<()> {
    let client = NatsClient {
        client_config: conf.nats.client,
    }
    .connect()
    .await?;
    let publisher = NatsPublisher::new(jetstream::new(client.clone()), conf.nats.publisher);
    publisher.publish(&message).await?;
    client.flush().await.context("Unable to flush NATS connection")?;
    info!("Command sent");
    Ok(())
}
