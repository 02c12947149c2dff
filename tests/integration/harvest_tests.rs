//! Integration tests for the multi-listing harvest coordinator

use crate::support::{card, test_config, ControlEnd, ScriptedPage, ScriptedSource, ORIGIN};
use listing_harvester::config::parse_config;
use listing_harvester::harvest::Harvester;
use listing_harvester::output::{export_merged, load_statistics, merge_articles};
use listing_harvester::store::{JsonFileStore, ResultStore};
use listing_harvester::url::ListingKey;
use listing_harvester::ConfigError;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn listing(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

#[tokio::test]
async fn test_failed_listing_does_not_stop_run() {
    let dir = TempDir::new().unwrap();
    let listings = vec![
        listing("/culture/"),
        listing("/missing/"),
        listing("/sport/"),
    ];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let config = test_config(50, &refs);

    let source = ScriptedSource::new(vec![
        ScriptedPage::new("/culture/", vec![vec![card("a")], vec![card("b")]]),
        ScriptedPage::new("/sport/", vec![vec![card("c")]]).ending(ControlEnd::Removed),
    ]);

    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    let report = harvester.run(&source, &listings).await;

    assert_eq!(report.harvested, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.records, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, listing("/missing/"));
    assert_eq!(report.visited(), 3);
    assert!(report.finished_at.is_some());

    let store = harvester.store();
    assert!(store.has(&ListingKey::parse("culture").unwrap()).unwrap());
    assert!(store.has(&ListingKey::parse("sport").unwrap()).unwrap());
    assert!(!store.has(&ListingKey::parse("missing").unwrap()).unwrap());
}

#[tokio::test]
async fn test_rerun_skips_harvested_listings() {
    let dir = TempDir::new().unwrap();
    let listings = vec![listing("/culture/"), listing("/sport/")];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let config = test_config(50, &refs);

    let first = ScriptedSource::new(vec![
        ScriptedPage::new("/culture/", vec![vec![card("a")]]),
        ScriptedPage::new("/sport/", vec![vec![card("b")]]),
    ]);
    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    let report = harvester.run(&first, &listings).await;
    assert_eq!(report.harvested, 2);

    let second = ScriptedSource::new(vec![
        ScriptedPage::new("/culture/", vec![vec![card("x")]]),
        ScriptedPage::new("/sport/", vec![vec![card("y")]]),
    ]);
    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    let report = harvester.run(&second, &listings).await;

    assert_eq!(report.harvested, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.records, 0);

    let stored = harvester
        .store()
        .get(&ListingKey::parse("culture").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored[0].title, "Title a");
}

#[tokio::test]
async fn test_max_listings_caps_run() {
    let dir = TempDir::new().unwrap();
    let listings = vec![listing("/a/"), listing("/b/"), listing("/c/")];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let mut config = test_config(50, &refs);
    config.traversal.max_listings = 2;

    let source = ScriptedSource::new(vec![
        ScriptedPage::new("/a/", vec![vec![card("1")]]),
        ScriptedPage::new("/b/", vec![vec![card("2")]]),
        ScriptedPage::new("/c/", vec![vec![card("3")]]),
    ]);

    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    let report = harvester.run(&source, &listings).await;

    assert_eq!(report.harvested, 2);
    assert_eq!(source.opened.load(Ordering::SeqCst), 2);
    assert!(!harvester
        .store()
        .has(&ListingKey::parse("c").unwrap())
        .unwrap());
}

#[tokio::test]
async fn test_stats_and_merge_after_harvest() {
    let dir = TempDir::new().unwrap();
    let listings = vec![listing("/culture/"), listing("/societe/")];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let config = test_config(50, &refs);

    // "shared" is filed under both categories
    let source = ScriptedSource::new(vec![
        ScriptedPage::new("/culture/", vec![vec![card("shared"), card("c1")]]),
        ScriptedPage::new("/societe/", vec![vec![card("s1"), card("shared")]]),
    ]);

    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    harvester.run(&source, &listings).await;

    let stats = load_statistics(harvester.store()).unwrap();
    assert_eq!(stats.listings.len(), 2);
    assert_eq!(stats.total_records, 4);

    let merged = merge_articles(harvester.store()).unwrap();
    let titles: Vec<_> = merged.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Title shared", "Title c1", "Title s1"]);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_listing_times_out_and_run_continues() {
    let dir = TempDir::new().unwrap();
    let listings = vec![listing("/culture/"), listing("/sport/")];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let config = test_config(50, &refs);

    let source = ScriptedSource::new(vec![
        ScriptedPage::new("/culture/", vec![vec![card("a")], vec![card("b")]]).stall_on_click(1),
        ScriptedPage::new("/sport/", vec![vec![card("c")]]),
    ]);

    let mut harvester = Harvester::new(&config, JsonFileStore::new(dir.path())).unwrap();
    let report = harvester.run(&source, &listings).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, listing("/culture/"));
    assert_eq!(
        report.failures[0].message,
        format!("Listing {} timed out after 30s", listing("/culture/"))
    );
    assert_eq!(report.harvested, 1);

    let store = harvester.store();
    assert!(!store.has(&ListingKey::parse("culture").unwrap()).unwrap());
    assert_eq!(store.get(&ListingKey::parse("culture").unwrap()).unwrap(), None);
    assert!(store.has(&ListingKey::parse("sport").unwrap()).unwrap());
}

#[test]
fn test_merged_path_inside_storage_root_rejected() {
    let result = parse_config(&format!(
        r#"
listings = ["{ORIGIN}/culture/"]

[site]
origin = "{ORIGIN}"

[output]
storage-root = "./storage"
merged-path = "./storage/articles.json"
"#
    ));

    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[tokio::test]
async fn test_export_leaves_store_listings_unchanged() {
    let dir = TempDir::new().unwrap();
    let listings = vec![listing("/culture/")];
    let refs: Vec<&str> = listings.iter().map(String::as_str).collect();
    let config = test_config(50, &refs);

    let source = ScriptedSource::new(vec![ScriptedPage::new(
        "/culture/",
        vec![vec![card("a"), card("b")]],
    )]);

    let root = dir.path().join("storage");
    let mut harvester = Harvester::new(&config, JsonFileStore::new(&root)).unwrap();
    harvester.run(&source, &listings).await;

    let written = export_merged(harvester.store(), &dir.path().join("articles.json")).unwrap();
    assert_eq!(written, 2);

    let stats = load_statistics(harvester.store()).unwrap();
    let keys: Vec<_> = stats.listings.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["culture"]);
    assert_eq!(stats.total_records, 2);
}
