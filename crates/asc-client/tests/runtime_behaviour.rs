//! Integration tests for the client runtime.
//!
//! Drives pagination, retry and completion polling through the public API
//! with a scripted backend. No network access is required; time is paused so
//! backoff and poll intervals elapse instantly.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use asc_client::{
    ApiClient, ApiClientConfig, ClientError, ClientResult, HttpBackend, ListDocument,
    PaginationOptions, RetryError, RetryPolicy, WaitError, aggregate, execute,
};
use asc_core::{ContextError, ExecutionProgress, RequestContext};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::Instant;

// ── Scripted backend ───────────────────────────────────────────────

/// Hands out JSON bodies in order; the last one repeats.
struct ScriptedBackend {
    bodies: Mutex<VecDeque<Value>>,
    calls: AtomicU32,
}

impl ScriptedBackend {
    fn new(bodies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            bodies: Mutex::new(bodies.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        ctx: &RequestContext,
        _url: &url::Url,
    ) -> ClientResult<T> {
        ctx.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = {
            let mut bodies = self.bodies.lock().unwrap();
            if bodies.len() > 1 {
                bodies.pop_front().unwrap()
            } else {
                bodies.front().cloned().unwrap_or(Value::Null)
            }
        };
        Ok(serde_json::from_value(body)?)
    }
}

fn client(backend: ScriptedBackend) -> ApiClient<ScriptedBackend> {
    let config = ApiClientConfig::new().with_base_url("https://api.example/");
    ApiClient::with_backend(&config, backend).unwrap()
}

fn page(ids: &[u32], next: Option<String>) -> Value {
    json!({"data": ids, "links": {"next": next}})
}

fn build_run(progress: &str) -> Value {
    json!({
        "data": {
            "type": "ciBuildRuns",
            "id": "run-7",
            "attributes": {"executionProgress": progress}
        }
    })
}

// ── Pagination ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_n_pages_need_n_minus_one_fetches() {
    let pages = 5u32;
    let fetches = AtomicU32::new(0);

    let first = ListDocument::new(vec![1u32], Some("/p/2".to_string()));
    let all = aggregate(first, &PaginationOptions::default(), |link: String| {
        fetches.fetch_add(1, Ordering::SeqCst);
        let n: u32 = link.trim_start_matches("/p/").parse().unwrap();
        let next = (n < pages).then(|| format!("/p/{}", n + 1));
        async move { Ok::<_, ClientError>(ListDocument::new(vec![n], next)) }
    })
    .await
    .unwrap();

    assert_eq!(all.data, vec![1, 2, 3, 4, 5]);
    assert_eq!(fetches.load(Ordering::SeqCst), pages - 1);
}

#[tokio::test]
async fn test_list_all_through_client() {
    let backend = ScriptedBackend::new([
        page(&[1, 2], Some("https://api.example/v1/things?cursor=b".to_string())),
        page(&[3], Some("/v1/things?cursor=c".to_string())),
        page(&[4], None),
    ]);

    let client = client(backend);
    let all: ListDocument<u32> = client
        .list_all(
            &RequestContext::new(),
            "v1/things",
            Some(2),
            &RetryPolicy::no_retry(),
            &PaginationOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(all.data, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_page_cap_discards_results() {
    let backend = ScriptedBackend::new([
        page(&[1], Some("/v1/things?cursor=2".to_string())),
        page(&[2], Some("/v1/things?cursor=3".to_string())),
        page(&[3], None),
    ]);

    let result: ClientResult<ListDocument<u32>> = client(backend)
        .list_all(
            &RequestContext::new(),
            "v1/things",
            None,
            &RetryPolicy::no_retry(),
            &PaginationOptions::with_max_pages(2),
        )
        .await;

    assert!(matches!(result, Err(ClientError::Pagination(_))));
}

// ── Retry ──────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum OpError {
    Transient,
    Fatal,
    Context(ContextError),
}

impl std::fmt::Display for OpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<ContextError> for OpError {
    fn from(err: ContextError) -> Self {
        Self::Context(err)
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_runs_exactly_max_attempts() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::new(4, Duration::from_millis(100), Duration::from_secs(1));

    let result: Result<(), OpError> = execute(&RequestContext::new(), &policy, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(RetryError::Retryable(OpError::Transient)) }
    })
    .await;

    assert_eq!(result, Err(OpError::Transient));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_error_runs_once() {
    let calls = AtomicU32::new(0);

    let result: Result<(), OpError> = execute(&RequestContext::new(), &RetryPolicy::default(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(RetryError::Permanent(OpError::Fatal)) }
    })
    .await;

    assert_eq!(result, Err(OpError::Fatal));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_returns_promptly() {
    let ctx = RequestContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let policy = RetryPolicy::new(5, Duration::from_secs(10), Duration::from_secs(60));
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), OpError> = execute(&ctx, &policy, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(RetryError::Retryable(OpError::Transient)) }
    })
    .await;

    assert_eq!(result, Err(OpError::Context(ContextError::Cancelled)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < policy.base_delay());
}

// ── Completion polling ─────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_poll_pending_running_complete() {
    let backend = ScriptedBackend::new([
        build_run("PENDING"),
        build_run("RUNNING"),
        build_run("COMPLETE"),
    ]);
    let client = client(backend);

    let status = client
        .wait_for_build_run(
            &RequestContext::new(),
            "run-7",
            Duration::from_secs(30),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();

    assert_eq!(status.execution_progress, ExecutionProgress::Complete);
    assert_eq!(client_calls(&client), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_deadline_reports_last_status() {
    let backend = ScriptedBackend::new([build_run("PENDING"), build_run("RUNNING")]);
    let ctx = RequestContext::with_timeout(Duration::from_secs(45));

    let err = client(backend)
        .wait_for_build_run(&ctx, "run-7", Duration::from_secs(30), &RetryPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WaitError::Interrupted {
            reason: ContextError::DeadlineExceeded,
            ..
        }
    ));
    let message = err.to_string();
    assert!(message.contains("deadline exceeded"));
    assert!(message.contains("RUNNING"));
}

fn client_calls(client: &ApiClient<ScriptedBackend>) -> u32 {
    client.backend().calls.load(Ordering::SeqCst)
}
