use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use fl_crypto::HubPublicKey;
use fl_node::{CaptureNode, GeoSampler, NodePlan, Observer, Relay, RtlFmCapture};
use fl_proto::link::{open_serial, DEFAULT_READ_TIMEOUT};
use fl_proto::{LineReader, SharedWriter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fieldlink capture node + relay", long_about = None)]
struct Cli {
    /// Serial device shared by the capture and relay roles.
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: PathBuf,

    /// Hub public key file (hex) used to seal outgoing readings.
    #[arg(long, default_value = "hub-public.hex")]
    hub_key: PathBuf,

    /// Directory for capture artifacts.
    #[arg(long, default_value = "./fm_recordings")]
    out_dir: PathBuf,

    /// Channel plan in MHz, cycled forever.
    #[arg(long, value_delimiter = ',', default_values_t = vec![93.3, 96.5, 107.5, 100.7, 87.0])]
    channels: Vec<f64>,

    /// Seconds to record per channel.
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Run the capture role only, without forwarding traffic.
    #[arg(long)]
    no_relay: bool,

    /// Observe the channel read-only: log envelope previews, transmit
    /// nothing.
    #[arg(long)]
    observe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if cli.observe {
        let (read_half, _write_half) = open_serial(&cli.port).await?;
        let mut observer = Observer::new(LineReader::new(read_half, DEFAULT_READ_TIMEOUT));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { observer.run(shutdown_rx).await });

        tokio::signal::ctrl_c().await?;
        info!("shutdown requested");
        shutdown_tx.send(true).ok();
        task.await.ok();
        return Ok(());
    }

    let hub_key = HubPublicKey::load(&cli.hub_key)?;
    let (read_half, write_half) = open_serial(&cli.port).await?;
    let writer = SharedWriter::new(write_half);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let node = CaptureNode {
        source: fl_node::identity::source_id(),
        hub_key,
        capturer: Arc::new(RtlFmCapture {
            out_dir: cli.out_dir,
        }),
        geo: GeoSampler::default(),
        plan: NodePlan {
            channels: cli.channels,
            capture_duration: Duration::from_secs(cli.duration),
            ..NodePlan::default()
        },
        writer: writer.clone(),
    };
    let node_shutdown = shutdown_rx.clone();
    let node_task = tokio::spawn(async move { node.run(node_shutdown).await });

    let relay_task = if cli.no_relay {
        None
    } else {
        let mut relay = Relay::new(
            LineReader::new(read_half, DEFAULT_READ_TIMEOUT),
            writer.clone(),
        );
        let relay_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move { relay.run(relay_shutdown).await }))
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown_tx.send(true).ok();

    node_task.await.ok();
    if let Some(task) = relay_task {
        task.await.ok();
    }
    Ok(())
}
