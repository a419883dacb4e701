//! Test helpers: a scripted status client and an in-process fake backend.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::fixtures;

use media_job_tracker::models::job::JobId;
use media_job_tracker::models::kind::{SeparationMode, SeparationPayload};
use media_job_tracker::models::status::StatusSnapshot;
use media_job_tracker::services::backend::BackendClient;
use media_job_tracker::services::status_client::{PollError, StatusClient};

/// One scripted response of [`ScriptedClient`].
#[derive(Debug, Clone)]
pub enum Step {
    Processing(u8),
    Success(Vec<&'static str>),
    Failed(Option<&'static str>),
    NotFound,
    /// Transient HTTP failure (503).
    Unavailable,
    /// Never answers.
    Hang,
    /// Answers with the inner step after a delay.
    Slow(Duration, Box<Step>),
}

/// Status client answering from a per-job script.
///
/// Steps are consumed in order; the last step repeats once the script is
/// exhausted. Jobs without a script stay `Processing` at 0 %.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<HashMap<JobId, VecDeque<Step>>>,
    calls: Mutex<HashMap<JobId, usize>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, id: u64, steps: Vec<Step>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(JobId::from(id), steps.into_iter().collect());
    }

    pub fn calls(&self, id: u64) -> usize {
        self.calls.lock().unwrap().get(&JobId::from(id)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn next_step(&self, id: &JobId) -> Step {
        *self.calls.lock().unwrap().entry(id.clone()).or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(id) {
            Some(steps) if steps.len() > 1 => steps.pop_front().unwrap(),
            Some(steps) => steps.front().cloned().unwrap_or(Step::Processing(0)),
            None => Step::Processing(0),
        }
    }
}

async fn answer(mut step: Step) -> Result<StatusSnapshot<SeparationPayload>, PollError> {
    while let Step::Slow(delay, inner) = step {
        tokio::time::sleep(delay).await;
        step = *inner;
    }

    match step {
        Step::Processing(progress) => Ok(StatusSnapshot::processing(progress)),
        Step::Success(urls) => Ok(StatusSnapshot::success(SeparationPayload::from_urls(urls))),
        Step::Failed(message) => Ok(StatusSnapshot {
            error_message: message.map(String::from),
            ..StatusSnapshot::failed("")
        }),
        Step::NotFound => Err(PollError::NotFound),
        Step::Unavailable => Err(PollError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }),
        Step::Hang | Step::Slow(..) => std::future::pending().await,
    }
}

#[async_trait]
impl StatusClient<SeparationMode> for ScriptedClient {
    async fn fetch_status(&self, id: &JobId) -> Result<StatusSnapshot<SeparationPayload>, PollError> {
        let step = self.next_step(id);
        answer(step).await
    }
}

/// Let every runnable task make progress, then advance the paused clock.
pub async fn advance(by: Duration) {
    tokio::time::sleep(by).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Requests the fake backend has seen.
#[derive(Debug, Default)]
pub struct BackendHits {
    pub side_panel: AtomicUsize,
    pub task_status: AtomicUsize,
    pub authorized: AtomicUsize,
}

impl BackendHits {
    pub fn side_panel(&self) -> usize {
        self.side_panel.load(Ordering::SeqCst)
    }

    pub fn task_status(&self) -> usize {
        self.task_status.load(Ordering::SeqCst)
    }
}

fn json(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn count_auth(hits: &BackendHits, headers: &HeaderMap) {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer test-token") {
        hits.authorized.fetch_add(1, Ordering::SeqCst);
    }
}

async fn separation(
    State(hits): State<Arc<BackendHits>>,
    headers: HeaderMap,
    Path(mode): Path<String>,
) -> Response {
    count_auth(&hits, &headers);
    match mode.as_str() {
        "stem6" => json(StatusCode::OK, fixtures::SEPARATION_REJECTED),
        "stem4" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => json(StatusCode::OK, fixtures::SEPARATION_ACCEPTED),
    }
}

async fn task_status(
    State(hits): State<Arc<BackendHits>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    count_auth(&hits, &headers);
    hits.task_status.fetch_add(1, Ordering::SeqCst);
    match id.as_str() {
        "42" | "99" => json(StatusCode::OK, fixtures::TASK_SUCCESS_PAIR),
        "43" => json(StatusCode::OK, fixtures::TASK_SUCCESS_STEMS),
        "44" => json(StatusCode::OK, fixtures::TASK_FAILED),
        "48" => json(StatusCode::OK, fixtures::TASK_SUCCESS_INST_ONLY),
        "45" => json(StatusCode::OK, fixtures::TASK_PROCESSING),
        "46" => json(StatusCode::OK, "not json"),
        "47" => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn media_status(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "501" => json(StatusCode::OK, fixtures::MEDIA_PROCESSING),
        "502" => json(StatusCode::OK, fixtures::MEDIA_DONE),
        "503" => json(StatusCode::OK, fixtures::MEDIA_MISSING),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn side_panel(State(hits): State<Arc<BackendHits>>) -> Response {
    hits.side_panel.fetch_add(1, Ordering::SeqCst);
    // Keep the request open long enough for concurrent callers to pile up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    json(StatusCode::OK, fixtures::SIDE_PANEL)
}

async fn side_panel_unauthorized(State(hits): State<Arc<BackendHits>>) -> Response {
    hits.side_panel.fetch_add(1, Ordering::SeqCst);
    StatusCode::UNAUTHORIZED.into_response()
}

/// In-process stand-in for the gateway.
///
/// Task ids 42 and 99 succeed with a vocal/instrumental pair, 43 with four
/// stems, 48 with only an instrumental, 44 fails, 45 is processing, 46 is
/// malformed, 47 is unavailable and anything else is 404. Separation mode `stem6` is rejected and `stem4`
/// errors.
pub fn fake_backend(hits: Arc<BackendHits>, signed_in: bool) -> Router {
    let panel = if signed_in {
        get(side_panel)
    } else {
        get(side_panel_unauthorized)
    };

    Router::new()
        .route("/api/audio/separation/{mode}", post(separation))
        .route("/api/audio/task/{id}", get(task_status))
        .route("/api/media/status/{id}", get(media_status))
        .route("/api/auth/side/panel", panel)
        .with_state(hits)
}

/// Start a fake backend and return a client for it along with its hit counters.
pub async fn backend(signed_in: bool) -> (BackendClient, Arc<BackendHits>) {
    let hits = Arc::new(BackendHits::default());
    let base_url = serve(fake_backend(hits.clone(), signed_in)).await;
    let client = BackendClient::new(format!("{}/", base_url), Some("test-token".to_string()));
    (client, hits)
}
