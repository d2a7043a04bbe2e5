//! End-to-end pipeline behavior against in-memory fakes.
//!
//! Covers the properties the pipeline is built around: the dedup guard,
//! session cleanup on every failure path, input rejection before any work,
//! selector fallback in a full run, and the REST status mapping.

use anyhow::{bail, Result};
use async_trait::async_trait;
use prospect_runtime::auth::{self, AuthOutcome};
use prospect_runtime::browser::{BrowserEngine, BrowserSession};
use prospect_runtime::config::{AppConfig, AuthCredentials};
use prospect_runtime::error::PipelineError;
use prospect_runtime::extract::ExtractedProfile;
use prospect_runtime::pipeline::{Outcome, Pipeline};
use prospect_runtime::rest::{router, AppState};
use prospect_runtime::store::{ProfileStore, StoredProfile};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

const LOGIN_URL: &str = "https://site.test/login";
const TARGET: &str = "https://example.com/in/jane";

// ── Fakes ───────────────────────────────────────────────────────

/// Scripted behavior for fake sessions.
#[derive(Debug, Clone, Default)]
struct Script {
    /// The login page shows a login form.
    login_form: bool,
    /// Post-submit navigation never settles.
    auth_hangs: bool,
    /// Navigation to the target page fails.
    navigation_fails: bool,
    /// Selector → text on the target page.
    target_content: HashMap<&'static str, &'static str>,
}

/// Counters shared between an engine and its sessions.
#[derive(Default)]
struct Book {
    launched: AtomicUsize,
    open: AtomicUsize,
}

struct FakeEngine {
    script: Script,
    book: Arc<Book>,
    fail_launch: bool,
}

impl FakeEngine {
    fn new(script: Script) -> Self {
        Self {
            script,
            book: Arc::new(Book::default()),
            fail_launch: false,
        }
    }

    fn failing_launch() -> Self {
        Self {
            script: Script::default(),
            book: Arc::new(Book::default()),
            fail_launch: true,
        }
    }

    fn launched(&self) -> usize {
        self.book.launched.load(Ordering::SeqCst)
    }

    fn open(&self) -> usize {
        self.book.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            bail!("chrome exited immediately");
        }
        self.book.launched.fetch_add(1, Ordering::SeqCst);
        self.book.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            script: self.script.clone(),
            book: Arc::clone(&self.book),
            current_url: String::new(),
        }))
    }

    fn active_sessions(&self) -> usize {
        self.open()
    }
}

struct FakeSession {
    script: Script,
    book: Arc<Book>,
    current_url: String,
}

impl FakeSession {
    fn on_target(&self) -> bool {
        self.current_url == TARGET
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<()> {
        if url == TARGET && self.script.navigation_fails {
            bail!("navigation timed out after 1000ms");
        }
        self.current_url = url.to_string();
        Ok(())
    }

    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()> {
        if self.script.auth_hangs {
            bail!("navigation did not settle within {timeout_ms}ms");
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        if self.current_url == LOGIN_URL {
            return Ok(self.script.login_form && selector == auth::USERNAME_SELECTOR);
        }
        Ok(self.on_target() && self.script.target_content.contains_key(selector))
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        if !self.on_target() {
            return Ok(None);
        }
        Ok(self
            .script
            .target_content
            .get(selector)
            .map(|t| t.to_string()))
    }

    async fn fill(&mut self, _selector: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn click(&mut self, _selector: &str) -> Result<()> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current_url.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.book.open.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<StoredProfile>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_insert: bool,
}

impl MemoryStore {
    fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn touches(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_identifier(&self, target_identifier: &str) -> Result<Option<StoredProfile>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.target_identifier == target_identifier)
            .cloned())
    }

    async fn insert(&self, profile: &ExtractedProfile) -> Result<StoredProfile> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            bail!("store rejected the write");
        }
        let now = chrono::Utc::now();
        let record = StoredProfile {
            id: format!("rec-{}", self.len() + 1),
            target_identifier: profile.target_identifier.clone(),
            name: profile.name.clone(),
            title: profile.title.clone(),
            organization: profile.organization.clone(),
            location: profile.location.clone(),
            summary: profile.summary.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

// ── Harness ─────────────────────────────────────────────────────

fn test_config(with_credentials: bool) -> AppConfig {
    AppConfig {
        login_url: LOGIN_URL.to_string(),
        credentials: with_credentials.then(|| AuthCredentials {
            identifier: "robot@example.com".to_string(),
            secret: "hunter2".to_string(),
        }),
        // No settling needed against fakes.
        settle_ms: 0,
        nav_timeout_ms: 1_000,
        login_timeout_ms: 1_000,
        ..AppConfig::default()
    }
}

fn pipeline(engine: &Arc<FakeEngine>, store: &Arc<MemoryStore>, creds: bool) -> Pipeline {
    Pipeline::new(
        Arc::clone(engine) as Arc<dyn BrowserEngine>,
        Arc::clone(store) as Arc<dyn ProfileStore>,
        test_config(creds),
    )
}

/// Page exposing only the third name locator plus title text.
fn jane_script() -> Script {
    Script {
        login_form: false,
        target_content: HashMap::from([
            (".pv-top-card-section__name", "Jane Doe"),
            (".text-body-medium", "Staff Engineer"),
        ]),
        ..Script::default()
    }
}

// ── Pipeline properties ─────────────────────────────────────────

#[tokio::test]
async fn test_input_rejection_touches_nothing() {
    let engine = Arc::new(FakeEngine::new(jane_script()));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    for bad in ["", "   "] {
        let err = p.run(bad).await.expect_err("empty identifier must fail");
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    assert_eq!(store.touches(), 0, "store must not be consulted");
    assert_eq!(engine.launched(), 0, "no session may be launched");
}

#[tokio::test]
async fn test_end_to_end_fallback_and_defaults() {
    let engine = Arc::new(FakeEngine::new(jane_script()));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    let outcome = p.run(TARGET).await.expect("run should succeed");
    let record = match outcome {
        Outcome::Created { record } => record,
        other => panic!("expected Created, got {other:?}"),
    };

    // Third name locator matched; summary had nothing and fell back to
    // its empty default; the other fields fell back to theirs.
    assert_eq!(record.name, "Jane Doe");
    assert_eq!(record.title, "Staff Engineer");
    assert_eq!(record.summary, "");
    assert_eq!(record.organization, "Unknown Company");
    assert_eq!(record.location, "Unknown Location");

    assert_eq!(store.len(), 1);
    assert_eq!(engine.open(), 0, "session must be closed after success");
}

#[tokio::test]
async fn test_dedup_idempotence() {
    let engine = Arc::new(FakeEngine::new(jane_script()));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    let first = match p.run(TARGET).await.unwrap() {
        Outcome::Created { record } => record,
        other => panic!("expected Created, got {other:?}"),
    };
    assert_eq!(engine.launched(), 1);

    let second = p.run(TARGET).await.unwrap();
    match second {
        Outcome::Conflict { existing } => assert_eq!(existing.id, first.id),
        other => panic!("expected Conflict, got {other:?}"),
    }

    // The second submission performed zero browsing work.
    assert_eq!(engine.launched(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_cleanup_on_launch_failure() {
    let engine = Arc::new(FakeEngine::failing_launch());
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    let err = p.run(TARGET).await.expect_err("launch must fail");
    assert!(matches!(err, PipelineError::SessionLaunch(_)));
    assert_eq!(engine.open(), 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_cleanup_on_authentication_failure() {
    let script = Script {
        login_form: true,
        auth_hangs: true,
        ..Script::default()
    };
    let engine = Arc::new(FakeEngine::new(script));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, true);

    let err = p.run(TARGET).await.expect_err("auth must fail");
    assert!(matches!(err, PipelineError::Authentication(_)));
    assert_eq!(engine.open(), 0, "session leaked after auth failure");
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_cleanup_on_navigation_timeout() {
    let script = Script {
        navigation_fails: true,
        ..Script::default()
    };
    let engine = Arc::new(FakeEngine::new(script));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    let err = p.run(TARGET).await.expect_err("navigation must fail");
    assert!(matches!(err, PipelineError::NavigationTimeout(_)));
    assert_eq!(engine.open(), 0, "session leaked after navigation timeout");
}

#[tokio::test]
async fn test_cleanup_on_persistence_failure() {
    let engine = Arc::new(FakeEngine::new(jane_script()));
    let store = Arc::new(MemoryStore::failing_insert());
    let p = pipeline(&engine, &store, false);

    let err = p.run(TARGET).await.expect_err("persist must fail");
    assert!(matches!(err, PipelineError::Persistence(_)));
    assert_eq!(engine.open(), 0, "session leaked after persistence failure");
    assert_eq!(store.len(), 0, "nothing may be persisted on failure");
}

#[tokio::test]
async fn test_login_form_without_credentials_fails_auth() {
    let script = Script {
        login_form: true,
        ..Script::default()
    };
    let engine = Arc::new(FakeEngine::new(script));
    let store = Arc::new(MemoryStore::default());
    let p = pipeline(&engine, &store, false);

    let err = p.run(TARGET).await.expect_err("must fail without creds");
    assert!(matches!(err, PipelineError::Authentication(_)));
    assert_eq!(engine.open(), 0);
}

// ── Auth heuristic ──────────────────────────────────────────────

#[tokio::test]
async fn test_auth_skipped_when_no_form() {
    let engine = FakeEngine::new(Script::default());
    let mut session = engine.new_session().await.unwrap();

    let outcome = auth::authenticate(session.as_mut(), LOGIN_URL, None, 1_000)
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::AlreadyAuthenticated);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_auth_submits_when_form_present() {
    let script = Script {
        login_form: true,
        ..Script::default()
    };
    let engine = FakeEngine::new(script);
    let mut session = engine.new_session().await.unwrap();

    let creds = AuthCredentials {
        identifier: "robot@example.com".to_string(),
        secret: "hunter2".to_string(),
    };
    let outcome = auth::authenticate(session.as_mut(), LOGIN_URL, Some(&creds), 1_000)
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::LoggedIn);
    session.close().await.unwrap();
}

// ── REST mapping ────────────────────────────────────────────────

mod rest_surface {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app(engine: Arc<FakeEngine>, store: Arc<MemoryStore>) -> axum::Router {
        let state = Arc::new(AppState {
            pipeline: Pipeline::new(
                Arc::clone(&engine) as Arc<dyn BrowserEngine>,
                store as Arc<dyn ProfileStore>,
                test_config(false),
            ),
            engine: engine as Arc<dyn BrowserEngine>,
            started_at: Instant::now(),
        });
        router(state)
    }

    fn scrape_request(identifier: &str) -> Request<Body> {
        let body = serde_json::json!({ "target_identifier": identifier }).to_string();
        Request::builder()
            .method("POST")
            .uri("/api/v1/profiles/scrape")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_identifier_is_400() {
        let app = app(
            Arc::new(FakeEngine::new(jane_script())),
            Arc::new(MemoryStore::default()),
        );
        let response = app.oneshot(scrape_request("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("required"));
    }

    #[tokio::test]
    async fn test_success_is_201_with_record() {
        let app = app(
            Arc::new(FakeEngine::new(jane_script())),
            Arc::new(MemoryStore::default()),
        );
        let response = app.oneshot(scrape_request(TARGET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert!(body["record_id"].as_str().is_some());
        assert_eq!(body["profile"]["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_duplicate_is_409_with_existing_id() {
        let engine = Arc::new(FakeEngine::new(jane_script()));
        let store = Arc::new(MemoryStore::default());
        let app = app(Arc::clone(&engine), Arc::clone(&store));

        let first = app
            .clone()
            .oneshot(scrape_request(TARGET))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_id = body_json(first).await["record_id"]
            .as_str()
            .unwrap()
            .to_string();

        let second = app.oneshot(scrape_request(TARGET)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let body = body_json(second).await;
        assert_eq!(body["existing_record_id"], first_id.as_str());
        assert_eq!(engine.launched(), 1);
    }

    #[tokio::test]
    async fn test_stage_failure_is_500() {
        let script = Script {
            navigation_fails: true,
            ..Script::default()
        };
        let app = app(
            Arc::new(FakeEngine::new(script)),
            Arc::new(MemoryStore::default()),
        );
        let response = app.oneshot(scrape_request(TARGET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("navigation"));
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let app = app(
            Arc::new(FakeEngine::new(jane_script())),
            Arc::new(MemoryStore::default()),
        );

        let health = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let status = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(status.status(), StatusCode::OK);
        let body = body_json(status).await;
        assert_eq!(body["active_sessions"], 0);
        assert_eq!(body["running"], true);
    }
}
