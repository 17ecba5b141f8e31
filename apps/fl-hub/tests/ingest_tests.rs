//! Hub ingestion loop against hostile and well-formed input.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use uuid::Uuid;

use fl_crypto::{HubKeyPair, HubPublicKey};
use fl_hub::HubIngest;
use fl_proto::{LineReader, TelemetryReading};
use fl_store::Store;

fn scratch_db() -> PathBuf {
    std::env::temp_dir().join(format!("fl-hub-test-{}.db", Uuid::new_v4()))
}

fn cleanup(db_path: &PathBuf) {
    let _ = std::fs::remove_file(db_path);
    let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
    let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
}

fn reading(source: &str) -> TelemetryReading {
    TelemetryReading {
        source: source.into(),
        location: "50.0,23.0".into(),
        message: "Frequency 93.3 MHz captured".into(),
        hash: "abcd1234".into(),
    }
}

fn sealed_line(hub_public: &HubPublicKey, reading: &TelemetryReading) -> String {
    fl_proto::encode(&fl_crypto::seal(hub_public, &reading.to_bytes()).unwrap())
}

/// Feed `input` to an ingestion loop wired to a fresh store; returns the
/// store once the loop has drained the channel.
async fn ingest_all(keys: HubKeyPair, db_path: &PathBuf, input: String) -> Store {
    let store = Store::open(db_path).await.expect("open store");

    let (mut feed, channel) = tokio::io::duplex(64 * 1024);
    feed.write_all(input.as_bytes()).await.unwrap();
    drop(feed); // EOF ends the loop

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut ingest = HubIngest::new(
        LineReader::new(channel, Duration::from_secs(1)),
        keys,
        store.clone(),
    );
    ingest.run(shutdown_rx).await;
    store
}

#[tokio::test]
async fn valid_envelope_persists_device_and_message() {
    let keys = HubKeyPair::generate();
    let hub_public = keys.public.clone();
    let db_path = scratch_db();

    let input = format!("{}\n", sealed_line(&hub_public, &reading("node-a")));
    let store = ingest_all(keys, &db_path, input).await;

    let devices = store.devices_page(1, 10).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].source, "node-a");

    let messages = store.messages_page(1, 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].location, "50.0,23.0");
    assert_eq!(messages[0].filehash, "abcd1234");

    cleanup(&db_path);
}

#[tokio::test]
async fn wrong_key_envelope_yields_zero_records_and_loop_survives() {
    let keys = HubKeyPair::generate();
    let hub_public = keys.public.clone();
    let stranger = HubKeyPair::generate();
    let db_path = scratch_db();

    let input = format!(
        "{}\n{}\n",
        sealed_line(&stranger.public, &reading("node-forged")),
        sealed_line(&hub_public, &reading("node-a")),
    );
    let store = ingest_all(keys, &db_path, input).await;

    // The unopenable envelope left no trace; the valid one that followed
    // was still processed.
    let devices = store.devices_page(1, 10).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].source, "node-a");
    assert_eq!(store.messages_page(1, 10).await.unwrap().len(), 1);

    cleanup(&db_path);
}

#[tokio::test]
async fn junk_lines_yield_zero_records_and_loop_survives() {
    let keys = HubKeyPair::generate();
    let hub_public = keys.public.clone();
    let db_path = scratch_db();

    let input = format!(
        "\nnot json at all\n{{\"nope\":1}}\n{{\"payload\":\"***\"}}\n{}\n",
        sealed_line(&hub_public, &reading("node-a")),
    );
    let store = ingest_all(keys, &db_path, input).await;

    assert_eq!(store.devices_page(1, 10).await.unwrap().len(), 1);
    assert_eq!(store.messages_page(1, 10).await.unwrap().len(), 1);

    cleanup(&db_path);
}

#[tokio::test]
async fn payload_missing_mandatory_fields_is_rejected() {
    let keys = HubKeyPair::generate();
    let hub_public = keys.public.clone();
    let db_path = scratch_db();

    // Well-sealed, well-encoded — but the plaintext lacks `hash`.
    let partial = br#"{"source":"node-a","location":"50.0,23.0","message":"hi"}"#;
    let sealed = fl_crypto::seal(&hub_public, partial).unwrap();
    let input = format!("{}\n", fl_proto::encode(&sealed));
    let store = ingest_all(keys, &db_path, input).await;

    assert!(store.devices_page(1, 10).await.unwrap().is_empty());
    assert!(store.messages_page(1, 10).await.unwrap().is_empty());

    cleanup(&db_path);
}

#[tokio::test]
async fn repeat_source_updates_last_seen_only() {
    let keys = HubKeyPair::generate();
    let hub_public = keys.public.clone();
    let db_path = scratch_db();

    let input = format!(
        "{}\n{}\n",
        sealed_line(&hub_public, &reading("node-a")),
        sealed_line(&hub_public, &reading("node-a")),
    );
    let store = ingest_all(keys, &db_path, input).await;

    let devices = store.devices_page(1, 10).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert!(devices[0].first_seen <= devices[0].last_seen);
    assert_eq!(store.messages_page(1, 10).await.unwrap().len(), 2);

    cleanup(&db_path);
}
