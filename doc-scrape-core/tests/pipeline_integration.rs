use std::sync::{Arc, Mutex};

use doc_scrape_core::config::{ExtractConfig, ScrapeConfig, SiteConfig};
use doc_scrape_core::contract::{
    ChangeStatus, HashRecord, MockHashStore, MockObjectStore, MockPageFetcher,
};
use doc_scrape_core::extract::extract_primary_section;
use doc_scrape_core::hash::content_hash;
use doc_scrape_core::pipeline::{render_page, scrape_all, scrape_page};
use doc_scrape_core::ScrapeError;

const PAGE_URL: &str = "https://fragment.dev/docs/ledger-accounts";
const FIXTURE: &str = include_str!("fixtures/ledger_accounts.html");

fn config() -> ScrapeConfig {
    ScrapeConfig::new(SiteConfig {
        base_url: "https://fragment.dev/docs".to_string(),
        output_prefix: "scraped_docs".to_string(),
    })
}

fn fixture_fetcher() -> MockPageFetcher {
    let mut fetcher = MockPageFetcher::new();
    fetcher
        .expect_fetch()
        .returning(|_| Ok(FIXTURE.to_string()));
    fetcher
}

fn fixture_hash() -> String {
    let section = extract_primary_section(FIXTURE, PAGE_URL, &ExtractConfig::default())
        .expect("fixture has a primary section");
    content_hash(&section.html)
}

#[tokio::test]
async fn fixture_page_renders_to_markdown() {
    let page = render_page(&config(), &fixture_fetcher(), PAGE_URL)
        .await
        .expect("fixture should render");
    let md = &page.markdown;

    assert!(md.starts_with("# Ledger Accounts"), "got:\n{md}");
    assert!(md.contains("## Schema"), "got:\n{md}");
    assert!(md.contains("`addLedgerAccount`"), "got:\n{md}");
    assert!(
        md.contains("[Ledger](https://fragment.dev/docs/ledgers)"),
        "got:\n{md}"
    );
    assert!(md.contains("```json"), "got:\n{md}");
    assert!(md.contains(r#""key": "assets-root","#), "got:\n{md}");
    assert!(
        md.contains(
            "| Field | Description |\n| --- | --- |\n| `key` | Unique within the Ledger |\n| `type` | Either asset \\| liability |"
        ),
        "got:\n{md}"
    );
    assert!(md.contains("```bash"), "got:\n{md}");
    assert!(md.contains("npm install @fragment-dev/node-client"), "got:\n{md}");
    assert!(
        md.contains("![Image](https://fragment.dev/images/ledger-accounts.png)"),
        "got:\n{md}"
    );
    assert!(md.contains("[balances](#balances)"), "got:\n{md}");

    assert!(!md.contains("Copy page"), "got:\n{md}");
    assert!(!md.contains("FRAGMENT Docs"), "got:\n{md}");
    assert!(!md.contains('©'), "got:\n{md}");
    assert!(!md.contains("<span"), "got:\n{md}");
    assert!(md.ends_with('\n') && !md.ends_with("\n\n"));
}

#[tokio::test]
async fn new_page_is_uploaded_and_hash_recorded() {
    let uploaded = Arc::new(Mutex::new(Vec::<(String, String)>::new()));
    let sink = uploaded.clone();

    let mut objects = MockObjectStore::new();
    objects
        .expect_put_markdown()
        .times(1)
        .returning(move |key, markdown| {
            sink.lock()
                .unwrap()
                .push((key.to_string(), markdown.to_string()));
            Ok(())
        });

    let expected_hash = fixture_hash();
    let mut hashes = MockHashStore::new();
    hashes.expect_get_hash().returning(|_| Ok(None));
    let hash_for_check = expected_hash.clone();
    hashes
        .expect_put_hash()
        .withf(move |r: &HashRecord| r.url == PAGE_URL && r.hash == hash_for_check)
        .times(1)
        .returning(|_| Ok(()));

    let report = scrape_page(&config(), &fixture_fetcher(), &objects, &hashes, PAGE_URL)
        .await
        .expect("scrape should succeed");

    assert_eq!(report.status, ChangeStatus::New);
    assert_eq!(report.object_key, "scraped_docs/ledger-accounts.md");
    assert_eq!(report.hash, expected_hash);

    let uploaded = uploaded.lock().unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].0, "scraped_docs/ledger-accounts.md");
    assert!(uploaded[0].1.contains("# Ledger Accounts"));
    assert_eq!(report.markdown_bytes, uploaded[0].1.len());
}

#[tokio::test]
async fn unchanged_page_is_still_uploaded_but_hash_untouched() {
    let mut objects = MockObjectStore::new();
    objects
        .expect_put_markdown()
        .times(1)
        .returning(|_, _| Ok(()));

    let stored = fixture_hash();
    let mut hashes = MockHashStore::new();
    hashes.expect_get_hash().returning(move |url| {
        Ok(Some(HashRecord {
            url: url.to_string(),
            hash: stored.clone(),
        }))
    });
    hashes.expect_put_hash().times(0);

    let report = scrape_page(&config(), &fixture_fetcher(), &objects, &hashes, PAGE_URL)
        .await
        .expect("scrape should succeed");
    assert_eq!(report.status, ChangeStatus::Unchanged);
}

#[tokio::test]
async fn page_without_main_content_stores_nothing() {
    let mut fetcher = MockPageFetcher::new();
    fetcher
        .expect_fetch()
        .returning(|_| Ok("<html><body><main>No docs layout</main></body></html>".to_string()));
    let mut objects = MockObjectStore::new();
    objects.expect_put_markdown().times(0);
    let mut hashes = MockHashStore::new();
    hashes.expect_get_hash().times(0);
    hashes.expect_put_hash().times(0);

    let err = scrape_page(&config(), &fetcher, &objects, &hashes, PAGE_URL)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::MissingContainer { .. }), "got: {err}");
}

#[tokio::test]
async fn upload_failure_skips_hash_tracking() {
    let mut objects = MockObjectStore::new();
    objects
        .expect_put_markdown()
        .returning(|_, _| Err("bucket does not exist".into()));
    let mut hashes = MockHashStore::new();
    hashes.expect_get_hash().times(0);
    hashes.expect_put_hash().times(0);

    let err = scrape_page(&config(), &fixture_fetcher(), &objects, &hashes, PAGE_URL)
        .await
        .unwrap_err();
    match err {
        ScrapeError::Upload { key, .. } => assert_eq!(key, "scraped_docs/ledger-accounts.md"),
        other => panic!("expected upload error, got {other}"),
    }
}

#[tokio::test]
async fn batch_run_continues_after_a_failing_url() {
    let mut fetcher = MockPageFetcher::new();
    fetcher.expect_fetch().returning(|url| {
        if url.ends_with("/broken") {
            Err(format!("HTTP 500 Internal Server Error for {url}").into())
        } else {
            Ok(FIXTURE.to_string())
        }
    });
    let mut objects = MockObjectStore::new();
    objects
        .expect_put_markdown()
        .times(2)
        .returning(|_, _| Ok(()));
    let mut hashes = MockHashStore::new();
    hashes.expect_get_hash().returning(|_| Ok(None));
    hashes.expect_put_hash().times(2).returning(|_| Ok(()));

    let urls = vec![
        "https://fragment.dev/docs/ledger-accounts".to_string(),
        "https://fragment.dev/docs/broken".to_string(),
        "https://fragment.dev/docs/api/accounts".to_string(),
    ];
    let report = scrape_all(&config(), &fetcher, &objects, &hashes, &urls).await;

    assert!(!report.is_success());
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, "https://fragment.dev/docs/broken");
    assert_eq!(report.count(ChangeStatus::New), 2);
    assert_eq!(report.pages[1].object_key, "scraped_docs/api-accounts.md");
}
