use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use fl_crypto::HubKeyPair;
use fl_hub::{spawn_feed, HubIngest};
use fl_proto::link::{open_serial, DEFAULT_READ_TIMEOUT};
use fl_proto::LineReader;
use fl_store::Store;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fieldlink hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the hub key pair and write both hex key files.
    Keygen {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Run ingestion and the dashboard feed.
    Run {
        /// Serial device the hub reads envelopes from.
        #[arg(long, default_value = "/dev/ttyACM0")]
        port: PathBuf,

        /// Hub secret key file (hex).
        #[arg(long, default_value = "hub-secret.hex")]
        secret_key: PathBuf,

        /// SQLite database path.
        #[arg(long, default_value = "./data.db")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen { dir } => keygen_command(dir),
        Commands::Run {
            port,
            secret_key,
            db,
        } => run_command(port, secret_key, db).await,
    }
}

fn keygen_command(dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&dir)?;
    let secret_path = dir.join("hub-secret.hex");
    if secret_path.exists() {
        return Err(anyhow!(
            "hub key already exists at {}",
            secret_path.display()
        ));
    }
    let keys = HubKeyPair::generate();
    keys.save(&secret_path)?;
    keys.public.save(&dir.join("hub-public.hex"))?;
    println!("Hub key pair written to {}", dir.display());
    println!("Public key: {}", keys.public.to_hex());
    println!("Distribute hub-public.hex to capture nodes; hub-secret.hex stays here.");
    Ok(())
}

async fn run_command(port: PathBuf, secret_key: PathBuf, db: PathBuf) -> Result<()> {
    let keys = HubKeyPair::load(&secret_key)?;
    let store = Store::open(&db).await?;
    let (read_half, _write_half) = open_serial(&port).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (feed_task, _snapshots) = spawn_feed(store.clone(), shutdown_rx.clone());

    let mut ingest = HubIngest::new(
        LineReader::new(read_half, DEFAULT_READ_TIMEOUT),
        keys,
        store,
    );
    let ingest_shutdown = shutdown_rx.clone();
    let ingest_task = tokio::spawn(async move { ingest.run(ingest_shutdown).await });

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown_tx.send(true).ok();

    ingest_task.await.ok();
    feed_task.await.ok();
    Ok(())
}
