//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for target web sites and exercise
//! the HTTP fetcher, the crawl engine, publishing and the worker pool
//! end-to-end against a SQLite file.

use serde_json::Value;
use site_harvester::config::{Config, CrawlerConfig, FetcherConfig, StorageConfig, WorkerConfig};
use site_harvester::crawler::{scrape_page, FetchError, HttpPageFetcher, PageFetcher};
use site_harvester::jobs::run_harvester;
use site_harvester::state::SiteStatus;
use site_harvester::storage::{open_storage, SiteStore, SqliteSiteStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the given database
fn create_test_config(db_path: &str, page_limit: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            request_delay_seconds: 0,
            page_timeout_seconds: 5,
            page_limit,
            avoided_extensions: vec![".pdf".to_string(), ".png".to_string()],
        },
        workers: WorkerConfig {
            worker_count: 2,
            poll_interval_seconds: 1,
            batch_size: 5,
        },
        fetcher: FetcherConfig {
            user_agent: "HarvesterTest/1.0".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string(),
        },
    }
}

fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

fn fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(
        HttpPageFetcher::new(&FetcherConfig {
            user_agent: "HarvesterTest/1.0".to_string(),
        })
        .expect("Failed to build fetcher"),
    )
}

/// Waits until no site is pending, scheduled or processing
async fn wait_until_settled(store: &dyn SiteStore) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    loop {
        let sites = store.list_sites().expect("Failed to list sites");
        if sites.iter().all(|s| s.status.is_terminal()) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "Sites did not settle: {:?}",
            sites.iter().map(|s| (s.id, s.status)).collect::<Vec<_>>()
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Runs the harvester until every site is terminal, then shuts it down
async fn harvest(config: &Config, store: Arc<SqliteSiteStore>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = {
        let config = config.clone();
        let store: Arc<dyn SiteStore> = store.clone();
        tokio::spawn(async move { run_harvester(&config, store, fetcher(), shutdown_rx).await })
    };

    wait_until_settled(store.as_ref()).await;

    shutdown_tx.send(true).expect("Harvester already stopped");
    tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .expect("Harvester did not stop")
        .expect("Harvester panicked");
}

fn blob_json(store: &SqliteSiteStore, name: &str) -> Value {
    let bytes = store.get_blob(name).expect("Blob missing");
    serde_json::from_slice(&bytes).expect("Blob is not JSON")
}

#[tokio::test]
async fn test_fetcher_extracts_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            "Home",
            r#"<h1>Hello</h1><script>ignored()</script><a href="/about">About us</a>"#,
        ),
    )
    .await;

    let page = fetcher()
        .fetch(&server.uri(), Duration::from_secs(5))
        .await
        .expect("Fetch failed");

    assert_eq!(page.title, "Home");
    assert_eq!(page.text, "Hello\nAbout us");
    assert_eq!(page.anchors, vec!["/about".to_string()]);
}

#[tokio::test]
async fn test_fetcher_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&format!("{}/missing", server.uri()), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetcher_times_out() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/slow",
        html("Slow", "eventually").set_delay(Duration::from_secs(3)),
    )
    .await;

    let result = fetcher()
        .fetch(&format!("{}/slow", server.uri()), Duration::from_millis(300))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout(_))));
}

#[tokio::test]
async fn test_scrape_page_without_persistence() {
    let server = MockServer::start().await;
    mount_page(&server, "/profile", html("Profile", "<p>Line one</p><p>Line two</p>")).await;

    let page = scrape_page(
        fetcher().as_ref(),
        &format!("{}/profile", server.uri()),
        Duration::from_secs(5),
    )
    .await
    .expect("Scrape failed");

    assert_eq!(page.title, "Profile");
    assert_eq!(page.content, "Line one Line two");

    let missing = scrape_page(
        fetcher().as_ref(),
        &format!("{}/nope", server.uri()),
        Duration::from_secs(5),
    )
    .await;
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_end_to_end_crawl_publishes_document() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    // Root links to /about; the empty anchor adds no text
    mount_page(&server, "/", html("Home", r#"Hello<a href="/about"></a>"#)).await;
    mount_page(&server, "/about", html("About", "World")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).expect("Failed to open storage"));
    let config = create_test_config(db_path.to_str().unwrap(), 5);

    let id = store
        .insert_site("Example/Co", &base_url, r#"{"source": "intake"}"#)
        .unwrap();

    harvest(&config, store.clone()).await;

    let job = store.get_by_id(id).unwrap();
    assert_eq!(job.status, SiteStatus::Done);
    assert_eq!(job.progress, "2/2");

    let doc = blob_json(&store, "Example-Co.json");
    assert_eq!(doc["source"], "intake");
    assert_eq!(
        doc["data"],
        serde_json::json!([
            {"title": "Home", "url": base_url, "content": "Hello"},
            {"title": "About", "url": format!("{}/about", base_url), "content": "World"},
        ])
    );
}

#[tokio::test]
async fn test_crawl_stays_on_site_and_respects_filters() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html(
            "Home",
            &format!(
                r#"<a href="{base}/contact">Contact</a>
                   <a href="/">Home</a>
                   <a href="/brochure.pdf">Brochure</a>
                   <a href="mailto:info@example.com">Mail</a>
                   <a href="http://localhost:{other_port}/elsewhere">Elsewhere</a>"#,
                base = base_url,
                other_port = other.address().port()
            ),
        ),
    )
    .await;
    mount_page(&server, "/contact", html("Contact", "Call us")).await;

    Mock::given(method("GET"))
        .respond_with(html("Other", "Off site"))
        .expect(0)
        .mount(&other)
        .await;
    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).unwrap());
    let config = create_test_config(db_path.to_str().unwrap(), 10);

    let id = store.insert_site("Filtered", &base_url, "{}").unwrap();

    harvest(&config, store.clone()).await;

    assert_eq!(store.get_by_id(id).unwrap().status, SiteStatus::Done);
    let doc = blob_json(&store, "Filtered.json");
    let urls: Vec<&str> = doc["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["url"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec![base_url.clone(), format!("{}/contact", base_url)]);
}

#[tokio::test]
async fn test_page_limit_bounds_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", html("Home", &links)).await;
    for i in 1..=2 {
        mount_page(&server, &format!("/p{}", i), html("P", "page")).await;
    }
    for i in 3..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html("P", "page"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).unwrap());
    let config = create_test_config(db_path.to_str().unwrap(), 3);

    let id = store.insert_site("Limited", &base_url, "{}").unwrap();

    harvest(&config, store.clone()).await;

    let job = store.get_by_id(id).unwrap();
    assert_eq!(job.status, SiteStatus::Done);
    assert_eq!(job.progress, "3/6");
    assert_eq!(
        blob_json(&store, "Limited.json")["data"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn test_duplicate_url_is_not_recrawled() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .respond_with(html("Home", "Hello"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).unwrap());
    let config = create_test_config(db_path.to_str().unwrap(), 5);

    let first = store.insert_site("First", &base_url, "{}").unwrap();
    store.update_status(first, SiteStatus::Done, "1/1").unwrap();
    let second = store.insert_site("Second", &base_url, "{}").unwrap();

    harvest(&config, store.clone()).await;

    assert_eq!(store.get_by_id(first).unwrap().status, SiteStatus::Done);
    assert_eq!(
        store.get_by_id(second).unwrap().status,
        SiteStatus::Duplicate
    );
    assert!(store.get_blob("Second.json").is_err());
}

#[tokio::test]
async fn test_unreachable_site_still_publishes_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).unwrap());
    let config = create_test_config(db_path.to_str().unwrap(), 5);

    let id = store
        .insert_site("Down", &server.uri(), r#"{"duns": "42"}"#)
        .unwrap();

    harvest(&config, store.clone()).await;

    assert_eq!(store.get_by_id(id).unwrap().status, SiteStatus::Done);
    assert_eq!(
        blob_json(&store, "Down.json"),
        serde_json::json!({"duns": "42"})
    );
}

#[tokio::test]
async fn test_many_sites_across_workers() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");
    let store = Arc::new(open_storage(&db_path).unwrap());
    let config = create_test_config(db_path.to_str().unwrap(), 5);

    let mut servers = Vec::new();
    for i in 0..7 {
        let server = MockServer::start().await;
        mount_page(&server, "/", html("Site", &format!("Site {}", i))).await;
        store
            .insert_site(&format!("site-{}", i), &server.uri(), "{}")
            .unwrap();
        servers.push(server);
    }

    harvest(&config, store.clone()).await;

    let counts = store.count_by_status().unwrap();
    assert_eq!(counts.get(&SiteStatus::Done), Some(&7));
    for i in 0..7 {
        let doc = blob_json(&store, &format!("site-{}.json", i));
        assert_eq!(doc["data"][0]["content"], format!("Site {}", i));
    }
}

#[test]
fn test_storage_reopens_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvester.db");

    let id = {
        let store = open_storage(&db_path).unwrap();
        store.insert_site("Persisted", "example.com", "{}").unwrap()
    };

    let store = open_storage(Path::new(&db_path)).unwrap();
    assert_eq!(store.get_by_id(id).unwrap().name, "Persisted");
}
