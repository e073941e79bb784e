//! Integration tests for the collection pipeline
//!
//! These tests use wiremock to stand in for the blog origin (one server for
//! the mobile host and feed, one for the desktop host) and run complete
//! `collect` calls against a SQLite post store in a temporary directory.

use blog_gleaner::config::{
    CollectionConfig, Config, DiscoveryConfig, EndpointConfig, FetcherConfig, PostDelay, StorageConfig,
};
use blog_gleaner::crawler::{BlogTarget, CollectError, CollectHooks, Coordinator, CrawlResult, CrawlWindow};
use blog_gleaner::storage::{
    PersistedRecord, RunRecord, RunStatus, SqliteStorage, Storage, StorageError, StorageResult,
};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records everything a run reports and optionally raises the stop signal
#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<u8>>,
    lines: Mutex<Vec<String>>,
    stop_at_percent: Option<u8>,
    stopped: AtomicBool,
}

impl Recorder {
    fn stopping_at(percent: u8) -> Self {
        Self {
            stop_at_percent: Some(percent),
            ..Self::default()
        }
    }

    fn stopped_from_start() -> Self {
        Self {
            stopped: AtomicBool::new(true),
            ..Self::default()
        }
    }

    fn count_logged(&self, needle: &str) -> usize {
        self.lines.lock().unwrap().iter().filter(|l| l.contains(needle)).count()
    }

    fn progress(&self) -> Vec<u8> {
        self.progress.lock().unwrap().clone()
    }

    fn logged(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl CollectHooks for Recorder {
    fn on_progress(&self, percent: u8) {
        self.progress.lock().unwrap().push(percent);
        if let Some(threshold) = self.stop_at_percent {
            if percent >= threshold && percent < 100 {
                self.stopped.store(true, Ordering::SeqCst);
            }
        }
    }

    fn on_log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn should_stop(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// SQLite store that can be told to fail inserts or run bookkeeping
struct FaultyStore {
    inner: SqliteStorage,
    fail_insert: bool,
    fail_finish: bool,
}

impl FaultyStore {
    fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            fail_insert: false,
            fail_finish: false,
        }
    }
}

fn disk_full() -> StorageError {
    StorageError::Io(std::io::Error::other("disk full"))
}

impl Storage for FaultyStore {
    fn exists_record(&self, blog_name: &str, title: &str, date: NaiveDate) -> StorageResult<bool> {
        self.inner.exists_record(blog_name, title, date)
    }

    fn insert_record(&mut self, record: &PersistedRecord) -> StorageResult<()> {
        if self.fail_insert {
            return Err(disk_full());
        }
        self.inner.insert_record(record)
    }

    fn query_posts(&self, window: &CrawlWindow, keyword: Option<&str>) -> StorageResult<Vec<PersistedRecord>> {
        self.inner.query_posts(window, keyword)
    }

    fn count_posts(&self) -> StorageResult<u64> {
        self.inner.count_posts()
    }

    fn post_date_range(&self) -> StorageResult<Option<(NaiveDate, NaiveDate)>> {
        self.inner.post_date_range()
    }

    fn create_run(&mut self, blog_name: &str, window: &CrawlWindow, config_hash: Option<&str>) -> StorageResult<i64> {
        self.inner.create_run(blog_name, window, config_hash)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus, result: &CrawlResult) -> StorageResult<()> {
        if self.fail_finish {
            return Err(disk_full());
        }
        self.inner.finish_run(run_id, status, result)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.inner.get_run(run_id)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.inner.get_latest_run()
    }

    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        self.inner.list_runs(limit)
    }
}

struct Origin {
    mobile: MockServer,
    desktop: MockServer,
    data_dir: TempDir,
}

impl Origin {
    async fn start() -> Self {
        Self {
            mobile: MockServer::start().await,
            desktop: MockServer::start().await,
            data_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> Config {
        Config {
            fetcher: FetcherConfig {
                min_delay_ms: 0,
                max_delay_ms: 2,
                poll_interval_ms: 1,
                timeout_secs: 5,
                ..FetcherConfig::default()
            },
            endpoints: EndpointConfig {
                desktop_base: self.desktop.uri(),
                mobile_base: self.mobile.uri(),
                feed_base: self.mobile.uri(),
            },
            discovery: DiscoveryConfig {
                max_listing_pages: 2,
            },
            storage: StorageConfig {
                data_dir: self.data_dir.path().to_string_lossy().into_owned(),
                registry_path: self
                    .data_dir
                    .path()
                    .join("data.db")
                    .to_string_lossy()
                    .into_owned(),
            },
            ..Config::default()
        }
    }

    fn target(&self) -> BlogTarget {
        BlogTarget::new("Cooking", format!("{}/cook", self.desktop.uri()))
    }

    fn post_url(&self, log_no: u64) -> String {
        format!("{}/cook/{}", self.mobile.uri(), log_no)
    }

    fn store(&self) -> SqliteStorage {
        SqliteStorage::new(&self.data_dir.path().join("posts_cook.db")).unwrap()
    }
}

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn window(start: &str, end: &str) -> CrawlWindow {
    CrawlWindow::new(day(start), day(end)).unwrap()
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn post_page(title: &str, date: Option<&str>) -> String {
    let meta = date
        .map(|d| format!(r#"<meta property="article:published_time" content="{}T09:00:00+09:00">"#, d))
        .unwrap_or_default();
    format!(
        r#"<html><head>{}</head><body>
        <div class="se_title"><h3>{}</h3></div>
        <div class="se-main-container"><p>Body of {}</p></div>
        </body></html>"#,
        meta, title, title
    )
}

fn anchors_page(links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">post</a>"#, l))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn feed(items: &[(String, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(link, date)| {
            let pub_date = day(date).format("%a, %d %b %Y 09:00:00 +0900");
            format!(
                "<item><title>t</title><link>{}</link><pubDate>{}</pubDate></item>",
                link, pub_date
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Cooking</title>{}</channel></rss>"#,
        items
    )
}

async fn mount_get(server: &MockServer, at: &str, response: ResponseTemplate, expect: Option<u64>) {
    let mock = Mock::given(method("GET")).and(path(at)).respond_with(response);
    let mock = match expect {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

/// Feed with five dated posts, two of which fall outside 2024-01-05..09
async fn mount_feed_blog(origin: &Origin) {
    let dates = [
        (2230000000010, "2024-01-10", Some(0)),
        (2230000000009, "2024-01-09", None),
        (2230000000007, "2024-01-07", None),
        (2230000000005, "2024-01-05", None),
        (2230000000001, "2024-01-01", Some(0)),
    ];

    let items: Vec<(String, &str)> = dates
        .iter()
        .map(|(log_no, date, _)| (origin.post_url(*log_no), *date))
        .collect();
    mount_get(&origin.mobile, "/cook.xml", ResponseTemplate::new(200).set_body_string(feed(&items)), None).await;
    mount_get(&origin.mobile, "/cook", html(anchors_page(&[])), None).await;

    for (log_no, date, expect) in dates {
        mount_get(
            &origin.mobile,
            &format!("/cook/{}", log_no),
            html(post_page(&format!("Post {}", date), Some(date))),
            expect,
        )
        .await;
    }
}

#[tokio::test]
async fn test_feed_run_keeps_window_and_exits_early() {
    let origin = Origin::start().await;
    mount_feed_blog(&origin).await;
    // The mobile homepage answered, so the desktop page is never needed
    mount_get(&origin.desktop, "/cook", html(String::new()), Some(0)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();
    let w = window("2024-01-05", "2024-01-09");

    let result = coordinator
        .collect(&mut store, &origin.target(), &w, &hooks)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.saved, 3);
    assert_eq!(result.duplicates, 0);
    assert!(!result.cancelled);

    let posts = store.query_posts(&window("2000-01-01", "2100-01-01"), None).unwrap();
    let dates: Vec<_> = posts.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![day("2024-01-09"), day("2024-01-07"), day("2024-01-05")]);
    assert!(posts.iter().all(|p| w.contains(p.date)));
    assert!(posts.iter().all(|p| p.blog_name == "Cooking"));
    assert!(hooks.logged("RSS items: 5"));

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.saved, 3);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let origin = Origin::start().await;
    mount_feed_blog(&origin).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();

    coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-05", "2024-01-09"), &hooks)
        .await
        .unwrap();

    let progress = hooks.progress();
    assert_eq!(progress, vec![0, 33, 66, 100]);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_second_run_only_finds_duplicates() {
    let origin = Origin::start().await;
    mount_feed_blog(&origin).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let w = window("2024-01-05", "2024-01-09");

    let first = coordinator
        .collect(&mut store, &origin.target(), &w, &Recorder::default())
        .await
        .unwrap();
    let hooks = Recorder::default();
    let second = coordinator
        .collect(&mut store, &origin.target(), &w, &hooks)
        .await
        .unwrap();

    assert_eq!(first.saved, 3);
    assert_eq!(second.saved, 0);
    assert_eq!(second.duplicates, second.total_candidates);
    assert_eq!(store.count_posts().unwrap(), 3);
    assert!(hooks.logged("Skip duplicate (Same title & date)"));
    assert_eq!(store.list_runs(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_desktop_frame_used_when_mobile_home_fails() {
    let origin = Origin::start().await;

    mount_get(&origin.mobile, "/cook", ResponseTemplate::new(500), Some(1)).await;
    mount_get(
        &origin.desktop,
        "/cook",
        html(r#"<html><body><iframe id="mainFrame" src="/PostList.naver?blogId=cook&amp;from=frame"></iframe></body></html>"#.to_string()),
        Some(1),
    )
    .await;
    mount_get(
        &origin.desktop,
        "/PostList.naver",
        html(anchors_page(&[
            origin.post_url(2230000000002),
            "/cook/2230000000001".to_string(),
        ])),
        Some(1),
    )
    .await;
    // Frame links were found, so the listing fallback stays untouched
    mount_get(&origin.mobile, "/PostList.naver", html(String::new()), Some(0)).await;

    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Second", Some("2024-01-08"))), Some(1)).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("First", Some("2024-01-06"))), Some(1)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.saved, 2);
}

#[tokio::test]
async fn test_listing_pages_used_when_homepage_has_no_links() {
    let origin = Origin::start().await;

    mount_get(&origin.mobile, "/cook", html(anchors_page(&[])), None).await;
    Mock::given(method("GET"))
        .and(path("/PostList.naver"))
        .and(query_param("blogId", "cook"))
        .and(query_param("currentPage", "1"))
        .respond_with(html(anchors_page(&[
            "/cook/2230000000003".to_string(),
            "/someone/2230000000004".to_string(),
        ])))
        .expect(1)
        .mount(&origin.mobile)
        .await;
    Mock::given(method("GET"))
        .and(path("/PostList.naver"))
        .and(query_param("currentPage", "2"))
        .respond_with(html(anchors_page(&["/cook/2230000000003".to_string()])))
        .expect(1)
        .mount(&origin.mobile)
        .await;
    mount_get(&origin.mobile, "/cook/2230000000003", html(post_page("Listed", Some("2024-01-07"))), Some(1)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 1);
    assert_eq!(result.saved, 1);
    assert!(hooks.logged("PostList page 2 collected 1 links so far"));
}

#[tokio::test]
async fn test_stop_after_two_candidates() {
    let origin = Origin::start().await;

    let links: Vec<String> = (1..=5).map(|i| origin.post_url(2230000000000 + i)).collect();
    mount_get(&origin.mobile, "/cook", html(anchors_page(&links)), None).await;
    for i in 1..=5u64 {
        let expect = if i <= 2 { 1 } else { 0 };
        mount_get(
            &origin.mobile,
            &format!("/cook/{}", 2230000000000 + i),
            html(post_page(&format!("Post {}", i), Some("2024-01-07"))),
            Some(expect),
        )
        .await;
    }

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    // Progress 40 is reported right before the third candidate
    let hooks = Recorder::stopping_at(40);
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.total_candidates, 5);
    assert!(result.saved <= 2);
    assert_eq!(result.saved, 2);
    assert_eq!(hooks.progress().last(), Some(&100));
    assert_eq!(
        store.get_latest_run().unwrap().unwrap().status,
        RunStatus::Cancelled
    );
}

#[tokio::test]
async fn test_undated_page_without_hint_is_skipped() {
    let origin = Origin::start().await;

    let links = vec![origin.post_url(2230000000001), origin.post_url(2230000000002)];
    mount_get(&origin.mobile, "/cook", html(anchors_page(&links)), None).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("Dated", Some("2024-01-07"))), None).await;
    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Undated", None)), None).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.saved, 1);
    assert_eq!(result.duplicates, 0);
    assert_eq!(result.skipped, 1);
    assert!(hooks.logged("Skip: date parse failed"));
}

#[tokio::test]
async fn test_feed_hint_used_when_page_has_no_date() {
    let origin = Origin::start().await;

    let link = origin.post_url(2230000000001);
    mount_get(&origin.mobile, "/cook", html(anchors_page(&[])), None).await;
    mount_get(
        &origin.mobile,
        "/cook.xml",
        ResponseTemplate::new(200).set_body_string(feed(&[(link, "2024-01-07")])),
        None,
    )
    .await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("No date on page", None)), None).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await
        .unwrap();

    assert_eq!(result.saved, 1);
    let posts = store.query_posts(&window("2024-01-07", "2024-01-07"), None).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "No date on page");
}

#[tokio::test]
async fn test_unhinted_post_outside_window_is_skipped() {
    let origin = Origin::start().await;

    let links = vec![origin.post_url(2230000000001), origin.post_url(2230000000002)];
    mount_get(&origin.mobile, "/cook", html(anchors_page(&links)), None).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("Inside", Some("2024-01-07"))), None).await;
    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Outside", Some("2023-12-01"))), None).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();
    let w = window("2024-01-01", "2024-01-31");
    let result = coordinator
        .collect(&mut store, &origin.target(), &w, &hooks)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.saved, 1);
    assert_eq!(result.skipped, 1);
    assert!(hooks.logged("Skip: 2023-12-01 out of range"));

    let posts = store.query_posts(&window("2000-01-01", "2100-01-01"), None).unwrap();
    assert!(posts.iter().all(|p| w.contains(p.date)));
}

#[tokio::test]
async fn test_failed_post_fetch_is_skipped() {
    let origin = Origin::start().await;

    let links = vec![origin.post_url(2230000000001), origin.post_url(2230000000002)];
    mount_get(&origin.mobile, "/cook", html(anchors_page(&links)), None).await;
    mount_get(&origin.mobile, "/cook/2230000000001", ResponseTemplate::new(503), Some(1)).await;
    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Fine", Some("2024-01-07"))), Some(1)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.saved, 1);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn test_nothing_retrievable_is_fatal() {
    let origin = Origin::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&origin.mobile)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&origin.desktop)
        .await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await;

    assert!(matches!(result, Err(CollectError::NoPageRetrieved { .. })));
    assert_eq!(store.count_posts().unwrap(), 0);
    assert_eq!(
        store.get_latest_run().unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[tokio::test]
async fn test_collect_entry_point_opens_blog_store() {
    let origin = Origin::start().await;
    mount_feed_blog(&origin).await;
    let config = origin.config();

    let result = blog_gleaner::collect(
        &config,
        &origin.target(),
        &window("2024-01-05", "2024-01-09"),
        &Recorder::default(),
    )
    .await
    .unwrap();

    assert_eq!(result.saved, 3);
    assert!(Path::new(&config.storage.data_dir).join("posts_cook.db").exists());
    assert_eq!(origin.store().count_posts().unwrap(), 3);
}

#[tokio::test]
async fn test_undated_feed_items_are_never_fetched() {
    let origin = Origin::start().await;

    let dated = origin.post_url(2230000000002);
    let undated = origin.post_url(2230000000001);
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Cooking</title>
        <item><link>{}</link><pubDate>Wed, 10 Jan 2024 09:00:00 +0900</pubDate></item>
        <item><link>{}</link></item>
        </channel></rss>"#,
        dated, undated
    );
    mount_get(&origin.mobile, "/cook", html(anchors_page(&[])), None).await;
    mount_get(&origin.mobile, "/cook.xml", ResponseTemplate::new(200).set_body_string(xml), None).await;
    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Dated", Some("2024-01-10"))), Some(1)).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("Undated", Some("2024-01-12"))), Some(0)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 1);
    assert_eq!(result.saved, 1);
}

#[tokio::test]
async fn test_target_without_blog_id_uses_homepage_only() {
    let origin = Origin::start().await;

    mount_get(
        &origin.desktop,
        "/",
        html(anchors_page(&["/cook/2230000000001".to_string()])),
        Some(1),
    )
    .await;
    mount_get(&origin.mobile, "/cook.xml", ResponseTemplate::new(200), Some(0)).await;
    mount_get(&origin.mobile, "/PostList.naver", html(String::new()), Some(0)).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("Home post", Some("2024-01-07"))), Some(1)).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::default();
    let target = BlogTarget::new("Cooking", format!("{}/", origin.desktop.uri()));
    let result = coordinator
        .collect(&mut store, &target, &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();

    assert_eq!(result.total_candidates, 1);
    assert_eq!(result.saved, 1);
    assert!(hooks.logged("No blog id"));
}

#[tokio::test]
async fn test_store_failure_ends_run_with_store_error() {
    let origin = Origin::start().await;
    mount_feed_blog(&origin).await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = FaultyStore::new(origin.store());
    store.fail_insert = true;
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-05", "2024-01-09"), &Recorder::default())
        .await;

    assert!(matches!(result, Err(CollectError::Store(_))));
    assert_eq!(store.count_posts().unwrap(), 0);
    assert_eq!(
        store.get_latest_run().unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[tokio::test]
async fn test_fatal_discovery_survives_run_bookkeeping_failure() {
    let origin = Origin::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&origin.mobile)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&origin.desktop)
        .await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = FaultyStore::new(origin.store());
    store.fail_finish = true;
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &Recorder::default())
        .await;

    assert!(matches!(result, Err(CollectError::NoPageRetrieved { .. })));
}

#[tokio::test]
async fn test_stop_during_discovery_cancels_run() {
    let origin = Origin::start().await;
    Mock::given(method("GET"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&origin.mobile)
        .await;
    Mock::given(method("GET"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&origin.desktop)
        .await;

    let coordinator = Coordinator::new(origin.config()).unwrap();
    let mut store = origin.store();
    let hooks = Recorder::stopped_from_start();
    let result = coordinator
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.total_candidates, 0);
    assert_eq!(hooks.progress(), vec![100]);
    assert_eq!(
        store.get_latest_run().unwrap().unwrap().status,
        RunStatus::Cancelled
    );
}

#[tokio::test]
async fn test_after_fetch_policy_pauses_after_skips() {
    let origin = Origin::start().await;

    let links = vec![origin.post_url(2230000000001), origin.post_url(2230000000002)];
    mount_get(&origin.mobile, "/cook", html(anchors_page(&links)), None).await;
    mount_get(&origin.mobile, "/cook/2230000000001", html(post_page("Inside", Some("2024-01-07"))), None).await;
    mount_get(&origin.mobile, "/cook/2230000000002", html(post_page("Outside", Some("2023-12-01"))), None).await;

    let run = |post_delay: PostDelay| {
        let config = Config {
            collection: CollectionConfig { post_delay },
            ..origin.config()
        };
        let store = origin.data_dir.path().join(format!("posts_{:?}.db", post_delay));
        (Coordinator::new(config).unwrap(), SqliteStorage::new(&store).unwrap())
    };

    let (after_fetch, mut store) = run(PostDelay::AfterFetch);
    let hooks = Recorder::default();
    let result = after_fetch
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();
    assert_eq!(result.saved, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(hooks.count_logged("Sleep"), 2);

    let (after_save, mut store) = run(PostDelay::AfterSave);
    let hooks = Recorder::default();
    after_save
        .collect(&mut store, &origin.target(), &window("2024-01-01", "2024-01-31"), &hooks)
        .await
        .unwrap();
    assert_eq!(hooks.count_logged("Sleep"), 1);
}
