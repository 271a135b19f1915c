// tests/ledger_files.rs
// On-disk formats: the dedup ledger and the scraper's item record.
use tweet_relay::item::JsonFileReader;
use tweet_relay::{DedupLedger, Fingerprint, ItemReader};

#[tokio::test]
async fn ledger_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed.json");

    let mut ledger = DedupLedger::load(&path).await;
    ledger.record_accepted(Fingerprint::of("Accepted"));
    ledger.record_suppressed(Fingerprint::of("gm"));
    ledger.record_suppressed(Fingerprint::of("wen token"));
    ledger.persist().await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["lastAcceptedFingerprint"], Fingerprint::of("accepted").as_str());
    assert_eq!(raw["suppressedFingerprints"].as_array().unwrap().len(), 2);
    assert!(raw["updatedAt"].is_string());

    let reloaded = DedupLedger::load(&path).await;
    assert_eq!(reloaded.state().last_accepted_fingerprint, ledger.state().last_accepted_fingerprint);
    assert_eq!(reloaded.state().suppressed_fingerprints, ledger.state().suppressed_fingerprints);
    assert!(reloaded.is_suppressed(&Fingerprint::of("GM")));
}

#[tokio::test]
async fn corrupt_ledger_loads_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut ledger = DedupLedger::load(&path).await;
    assert!(ledger.last_accepted().is_none());
    assert!(ledger.state().suppressed_fingerprints.is_empty());

    ledger.record_suppressed(Fingerprint::of("meme"));
    ledger.persist().await.unwrap();
    let reloaded = DedupLedger::load(&path).await;
    assert!(reloaded.is_suppressed(&Fingerprint::of("meme")));
}

#[tokio::test]
async fn legacy_ledger_keys_are_understood() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed_tweets.json");
    let last = Fingerprint::of("old post");
    let ignored = Fingerprint::of("gm");
    std::fs::write(
        &path,
        format!(
            r#"{{"last_tweet_hash": "{}", "ignored_hashes": ["{}"]}}"#,
            last.as_str(),
            ignored.as_str()
        ),
    )
    .unwrap();

    let ledger = DedupLedger::load(&path).await;
    assert_eq!(ledger.last_accepted(), Some(&last));
    assert!(ledger.is_suppressed(&ignored));
    assert!(ledger.is_known(&Fingerprint::of("  OLD POST ")));
}

#[tokio::test]
async fn item_reader_handles_current_and_legacy_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latest.json");
    let reader = JsonFileReader::new(&path);

    assert!(reader.read().await.is_none(), "missing file is idle");

    std::fs::write(&path, r#"{"text": "  hello  ", "link": "https://x/1"}"#).unwrap();
    let item = reader.read().await.unwrap();
    assert_eq!(item.text, "hello");
    assert_eq!(item.link, "https://x/1");

    std::fs::write(&path, r#"{"tweet": "legacy", "tweet_link": "https://x/2"}"#).unwrap();
    let item = reader.read().await.unwrap();
    assert_eq!((item.text.as_str(), item.link.as_str()), ("legacy", "https://x/2"));

    std::fs::write(&path, r#"{"text": "no link"}"#).unwrap();
    assert_eq!(reader.read().await.unwrap().link, "");

    for bad in [r#"{"text": "   "}"#, r#"{"link": "https://x/3"}"#, "[1,2", ""] {
        std::fs::write(&path, bad).unwrap();
        assert!(reader.read().await.is_none(), "{bad:?} should read as absent");
    }
}
