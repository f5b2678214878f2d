//! End-to-end tests against an in-process mock backend: REST routes under
//! `/api/v1` plus a `/ws` push endpoint, exercised through the real stores,
//! realtime manager and watcher.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use console::backend::{BackendClient, FileUpload};
use console::errors::ConsoleError;
use console::jobs::{JobStore, JobTextDraft};
use console::matches::MatchStore;
use console::realtime::{EntityKind, RealtimeManager, UpdateEvent, UpdatePayload};
use console::resumes::ResumeStore;
use console::session::Session;
use console::sync::{spawn_watcher, WatchTarget};
use console::types::EntityStatus;

const TOKEN: &str = "test-token";

struct MockBackend {
    resumes: Mutex<Vec<Value>>,
    resume_list_calls: AtomicUsize,
    /// Artificial latency on the resume list, so event bursts land while a
    /// fetch is in flight.
    resume_list_delay: Duration,
    job_posts: AtomicUsize,
    /// When set, POST /matches answers with this error envelope.
    match_rejection: Mutex<Option<(u16, String)>>,
    frames: broadcast::Sender<String>,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        let (frames, _) = broadcast::channel(64);
        Arc::new(MockBackend {
            resumes: Mutex::new(Vec::new()),
            resume_list_calls: AtomicUsize::new(0),
            resume_list_delay: Duration::from_millis(0),
            job_posts: AtomicUsize::new(0),
            match_rejection: Mutex::new(None),
            frames,
        })
    }

    fn with_resume_delay(delay: Duration) -> Arc<Self> {
        let mut backend = MockBackend::new();
        Arc::get_mut(&mut backend).unwrap().resume_list_delay = delay;
        backend
    }

    fn seed_resume(&self, id: &str, status: &str, updated_at: &str) {
        self.resumes.lock().unwrap().push(json!({
            "id": id,
            "filename": format!("{id}.pdf"),
            "mime_type": "application/pdf",
            "status": status,
            "created_at": "2024-03-01T09:00:00Z",
            "updated_at": updated_at,
        }));
    }

    fn set_resume_status(&self, id: &str, status: &str, updated_at: &str) {
        for row in self.resumes.lock().unwrap().iter_mut() {
            if row["id"] == id {
                row["status"] = json!(status);
                row["updated_at"] = json!(updated_at);
            }
        }
    }

    fn push_update(&self, event: &UpdateEvent) {
        let _ = self.frames.send(event.to_frame());
    }
}

async fn list_resumes(State(state): State<Arc<MockBackend>>) -> Json<Value> {
    state.resume_list_calls.fetch_add(1, Ordering::SeqCst);
    if !state.resume_list_delay.is_zero() {
        tokio::time::sleep(state.resume_list_delay).await;
    }
    let rows = state.resumes.lock().unwrap().clone();
    Json(Value::Array(rows))
}

async fn get_resume(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<String>,
) -> Response {
    let row = state
        .resumes
        .lock()
        .unwrap()
        .iter()
        .find(|row| row["id"] == *id)
        .cloned();
    match row {
        Some(row) => Json(json!({
            "id": row["id"],
            "filename": row["filename"],
            "mimeType": row["mime_type"],
            "status": row["status"],
            "parsedData": {
                "sections": {"summary": "A paragraph."},
                "profile": {"name": "Dana", "total_experience_years": 6},
            },
            "skills": [
                {"id": "s-1", "skill": "Rust", "experience_years": 4,
                 "proficiency": 0.8, "created_at": "2024-03-01T09:30:00Z"}
            ],
            "createdAt": row["created_at"],
            "updatedAt": row["updated_at"],
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "resume not found"})),
        )
            .into_response(),
    }
}

async fn upload_resume(
    State(state): State<Arc<MockBackend>>,
    mut multipart: Multipart,
) -> Response {
    let mut has_file = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.unwrap_or_default();
            has_file = !bytes.is_empty();
        }
    }
    if !has_file {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "file is required"})))
            .into_response();
    }
    state.seed_resume("r-new", "queued", "2024-03-01T11:00:00Z");
    Json(json!({"id": "r-new", "status": "queued"})).into_response()
}

async fn delete_resume(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.resumes.lock().unwrap().retain(|row| row["id"] != *id);
    StatusCode::NO_CONTENT
}

async fn list_jobs() -> Json<Value> {
    Json(json!([]))
}

async fn create_job(State(state): State<Arc<MockBackend>>, Json(_body): Json<Value>) -> Json<Value> {
    state.job_posts.fetch_add(1, Ordering::SeqCst);
    Json(json!({"id": "j-new", "status": "queued"}))
}

async fn list_matches() -> Json<Value> {
    Json(json!([]))
}

async fn create_match(State(state): State<Arc<MockBackend>>, Json(_body): Json<Value>) -> Response {
    if let Some((code, message)) = state.match_rejection.lock().unwrap().clone() {
        return (
            StatusCode::from_u16(code).unwrap(),
            Json(json!({"error": message})),
        )
            .into_response();
    }
    Json(json!({"id": "m-new", "status": "queued"})).into_response()
}

async fn usage() -> Json<Value> {
    Json(json!({"annual_limit": 25, "annual_usage_count": 7, "remaining": 18}))
}

async fn ws_handler(State(state): State<Arc<MockBackend>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(socket: WebSocket, state: Arc<MockBackend>) {
    let (mut sink, mut stream) = socket.split();
    // The client authenticates with its first frame, never via the URL.
    let Some(Ok(WsMessage::Text(first))) = stream.next().await else {
        return;
    };
    let auth: Value = serde_json::from_str(&first).unwrap_or(Value::Null);
    if auth["type"] != "auth" || auth["token"] != TOKEN {
        return;
    }
    let mut frames = state.frames.subscribe();
    while let Ok(frame) = frames.recv().await {
        if sink.send(WsMessage::Text(frame)).await.is_err() {
            break;
        }
    }
}

async fn spawn_backend(state: Arc<MockBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/resumes", get(list_resumes).post(upload_resume))
        .route("/api/v1/resumes/:id", get(get_resume).delete(delete_resume))
        .route("/api/v1/jobs", get(list_jobs).post(create_job))
        .route("/api/v1/matches", get(list_matches).post(create_match))
        .route("/api/v1/usage", get(usage))
        .route("/ws", get(ws_handler))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> BackendClient {
    BackendClient::with_base_url(format!("http://{addr}/api/v1"))
}

fn session() -> Session {
    Session::new(TOKEN)
}

#[tokio::test]
async fn resume_list_and_detail_normalize_end_to_end() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "ready", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    let rows = store.list(&session()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "r-1");
    assert_eq!(rows[0].mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(rows[0].status, EntityStatus::Ready);

    let detail = store.detail("r-1", &session()).await.unwrap();
    assert_eq!(detail.skills.len(), 1);
    let parsed = detail.parsed_data.unwrap();
    assert_eq!(
        parsed.profile.unwrap().total_experience_years,
        Some(6.0)
    );
    assert!(parsed.sections.unwrap().contains_key("summary"));

    // Second read is served from cache: list call count stays at 1.
    let _ = store.list(&session()).await.unwrap();
    assert_eq!(backend.resume_list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upload_invalidates_the_list() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "ready", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    let before = store.list(&session()).await.unwrap();
    assert_eq!(before.len(), 1);

    let receipt = store
        .upload(FileUpload::new("cv.pdf", b"%PDF-1.4".to_vec()), &session())
        .await
        .unwrap();
    assert_eq!(receipt.id, "r-new");
    assert_eq!(receipt.status.as_deref(), Some("queued"));

    // Invalidation means the next read refetches and sees the new row.
    let after = store.list(&session()).await.unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.iter().any(|row| row.id == "r-new"));
}

#[tokio::test]
async fn empty_job_text_short_circuits_without_a_request() {
    let backend = MockBackend::new();
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = JobStore::new(client_for(addr), 0.7);

    let err = store
        .create_from_text(JobTextDraft::default(), &session())
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Validation(_)));
    assert!(err.to_string().contains("Provide a job description"));
    assert_eq!(backend.job_posts.load(Ordering::SeqCst), 0);

    // A populated draft does reach the backend.
    let draft = JobTextDraft {
        title: Some("Backend Engineer".to_string()),
        description_text: Some("We need a Rust engineer.".to_string()),
        text: None,
    };
    store.create_from_text(draft, &session()).await.unwrap();
    assert_eq!(backend.job_posts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn quota_rejection_becomes_an_upgrade_prompt() {
    let backend = MockBackend::new();
    *backend.match_rejection.lock().unwrap() = Some((403, "upgrade_required".to_string()));
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = MatchStore::new(client_for(addr));

    let err = store
        .request_match("r-1", "j-1", &session())
        .await
        .unwrap_err();
    assert!(err.is_quota());
    assert!(err.to_string().contains("Upgrade to Pro"));

    // Any other backend message passes through unchanged.
    *backend.match_rejection.lock().unwrap() = Some((400, "job is not ready".to_string()));
    let err = store
        .request_match("r-1", "j-1", &session())
        .await
        .unwrap_err();
    assert!(!err.is_quota());
    assert_eq!(err.to_string(), "job is not ready");
}

#[tokio::test]
async fn deleting_the_selected_resume_clears_it_from_list_and_selection() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "ready", "2024-03-01T10:00:00Z");
    backend.seed_resume("r-2", "ready", "2024-03-01T10:01:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    store.list(&session()).await.unwrap();
    store.select(Some("r-1"));

    store.delete("r-1", &session()).await.unwrap();
    // Selection moved off the deleted id; the cached list dropped it.
    assert_eq!(store.selected_id(), Some("r-2".to_string()));
    assert!(store.cached_detail("r-1").is_none());
    let rows = store.list(&session()).await.unwrap();
    assert!(rows.iter().all(|row| row.id != "r-1"));

    store.delete("r-2", &session()).await.unwrap();
    assert_eq!(store.selected_id(), None);
    let rows = store.list(&session()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn usage_endpoint_maps_to_the_snapshot() {
    let backend = MockBackend::new();
    let addr = spawn_backend(backend).await;
    let service = console::subscription::SubscriptionService::new(
        client_for(addr),
        Arc::new(console::subscription::HttpCheckoutProvider::new(None)),
        "http://localhost:3000",
    );
    let usage = service.usage().await.unwrap();
    assert_eq!(usage.limit, 25);
    assert_eq!(usage.used, 7);
    assert_eq!(usage.remaining, 18);
}

#[tokio::test]
async fn realtime_burst_collapses_into_bounded_refetches() {
    let backend = MockBackend::with_resume_delay(Duration::from_millis(150));
    backend.seed_resume("r-1", "processing", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    let realtime = Arc::new(RealtimeManager::new(
        format!("ws://{addr}/ws"),
        Some(TOKEN.to_string()),
        false,
    ));
    realtime.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(realtime.is_connected());

    let cancel = CancellationToken::new();
    let watcher = spawn_watcher(
        Arc::clone(&store),
        Arc::clone(&realtime),
        session(),
        // Long poll interval so only realtime traffic drives refetches here.
        Duration::from_secs(60),
        cancel.clone(),
    );

    // Let the initial refresh land.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.resume_list_calls.load(Ordering::SeqCst), 1);

    // Flip the backend state and fire a burst of push events while the
    // triggered refetch is still in flight.
    backend.set_resume_status("r-1", "ready", "2024-03-01T10:05:00Z");
    let mut payload = UpdatePayload::for_id("r-1");
    payload.status = Some("ready".to_string());
    payload.updated_at = Some("2024-03-01T10:05:00Z".to_string());
    for _ in 0..5 {
        backend.push_update(&UpdateEvent {
            kind: EntityKind::Resume,
            payload: payload.clone(),
        });
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    let calls = backend.resume_list_calls.load(Ordering::SeqCst);
    // Initial fetch plus at most two for the whole burst.
    assert!((2..=3).contains(&calls), "got {calls} list fetches");

    let rows = store.cached_list().unwrap();
    assert_eq!(rows[0].status, EntityStatus::Ready);

    cancel.cancel();
    realtime.shutdown();
    let _ = watcher.await;
}

#[tokio::test]
async fn polling_resumes_after_a_mutation_while_the_channel_is_down() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "ready", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    // Channel permanently down: polling carries everything.
    let realtime = Arc::new(RealtimeManager::new("ws://127.0.0.1:1/ws", None, false));
    let cancel = CancellationToken::new();
    let watcher = spawn_watcher(
        Arc::clone(&store),
        Arc::clone(&realtime),
        session(),
        Duration::from_millis(200),
        cancel.clone(),
    );

    // Everything terminal: polling goes idle.
    tokio::time::sleep(Duration::from_millis(500)).await;

    // A mutation re-pends the cache without any push event.
    store
        .upload(FileUpload::new("cv.pdf", b"%PDF-1.4".to_vec()), &session())
        .await
        .unwrap();
    let rows = store.list(&session()).await.unwrap();
    assert!(rows
        .iter()
        .any(|row| row.id == "r-new" && row.status == EntityStatus::Queued));

    // The backend finishes processing; only a poll can pick this up.
    backend.set_resume_status("r-new", "ready", "2024-03-01T11:05:00Z");
    tokio::time::sleep(Duration::from_millis(800)).await;

    let rows = store.cached_list().unwrap();
    let row = rows.iter().find(|row| row.id == "r-new").unwrap();
    assert_eq!(row.status, EntityStatus::Ready);

    cancel.cancel();
    let _ = watcher.await;
}

#[tokio::test]
async fn unrelated_event_traffic_does_not_starve_the_poll_timer() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "processing", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    let realtime = Arc::new(RealtimeManager::new(
        format!("ws://{addr}/ws"),
        Some(TOKEN.to_string()),
        false,
    ));
    realtime.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(realtime.is_connected());

    let cancel = CancellationToken::new();
    let watcher = spawn_watcher(
        Arc::clone(&store),
        Arc::clone(&realtime),
        session(),
        Duration::from_millis(300),
        cancel.clone(),
    );

    // Chatter from another family every 50 ms, well under the poll
    // interval. It wakes the watcher but must not reset its countdown.
    let chatter_backend = Arc::clone(&backend);
    let chatter = tokio::spawn(async move {
        let mut payload = UpdatePayload::for_id("j-1");
        payload.status = Some("processing".to_string());
        loop {
            chatter_backend.push_update(&UpdateEvent {
                kind: EntityKind::Job,
                payload: payload.clone(),
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });

    tokio::time::sleep(Duration::from_millis(1200)).await;
    chatter.abort();

    // Initial fetch plus at least one poll for the still-processing row.
    let calls = backend.resume_list_calls.load(Ordering::SeqCst);
    assert!(calls >= 2, "got {calls} list fetches despite a pending row");

    cancel.cancel();
    realtime.shutdown();
    let _ = watcher.await;
}

#[tokio::test]
async fn watcher_polls_while_statuses_are_pending() {
    let backend = MockBackend::new();
    backend.seed_resume("r-1", "processing", "2024-03-01T10:00:00Z");
    let addr = spawn_backend(Arc::clone(&backend)).await;
    let store = ResumeStore::new(client_for(addr));

    // No realtime connection at all: the channel stays down and polling
    // carries the updates.
    let realtime = Arc::new(RealtimeManager::new("ws://127.0.0.1:1/ws", None, false));
    let cancel = CancellationToken::new();
    let watcher = spawn_watcher(
        Arc::clone(&store),
        Arc::clone(&realtime),
        session(),
        Duration::from_millis(200),
        cancel.clone(),
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    backend.set_resume_status("r-1", "ready", "2024-03-01T10:05:00Z");
    tokio::time::sleep(Duration::from_millis(600)).await;

    let rows = store.cached_list().unwrap();
    assert_eq!(rows[0].status, EntityStatus::Ready);

    // All terminal now: polling stops.
    let calls_when_terminal = backend.resume_list_calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(
        backend.resume_list_calls.load(Ordering::SeqCst),
        calls_when_terminal
    );

    cancel.cancel();
    let _ = watcher.await;
}
