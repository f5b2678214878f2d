/// Realtime channel — push notifications about entity changes.
///
/// One process holds one connection. Stores never talk to the socket
/// directly: they subscribe to the broadcast fan-out and receive parsed
/// [`UpdateEvent`]s. Everything here degrades silently; when the channel
/// cannot be kept up, watchers fall back to polling and the process keeps
/// working.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::session::Session;

pub mod events;

pub use events::{EntityKind, EventFrame, UpdateEvent, UpdatePayload};

const MAX_RECONNECT_ATTEMPTS: u32 = 10;
const RECONNECT_DELAY: Duration = Duration::from_millis(500);
const EVENT_BUFFER: usize = 256;

/// Derive the websocket endpoint from the public REST base: drop the
/// `/api/v1` suffix, swap the scheme, append `/ws`.
pub fn websocket_url(api_base_url: &str) -> String {
    let origin = strip_rest_suffix(api_base_url);
    let origin = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        origin.to_string()
    };
    format!("{}/ws", origin.trim_end_matches('/'))
}

fn strip_rest_suffix(base: &str) -> &str {
    let trimmed = base.trim_end_matches('/');
    if trimmed.to_ascii_lowercase().ends_with("/api/v1") {
        &trimmed[..trimmed.len() - "/api/v1".len()]
    } else {
        trimmed
    }
}

enum ConnectionOutcome {
    /// Cancel token fired; do not reconnect.
    Shutdown,
    /// Connection ended. `established` says whether the dial and the auth
    /// frame went through, which resets the retry budget.
    Closed { established: bool },
}

/// Owns the websocket connection task and fans parsed events out to
/// subscribers. Constructed once at startup and shared.
pub struct RealtimeManager {
    ws_url: String,
    token: Option<String>,
    verbose: bool,
    events: broadcast::Sender<UpdateEvent>,
    started: AtomicBool,
    connected: AtomicBool,
    shutdown: CancellationToken,
}

impl RealtimeManager {
    pub fn new(ws_url: impl Into<String>, token: Option<String>, verbose: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        RealtimeManager {
            ws_url: ws_url.into(),
            token,
            verbose,
            events,
            started: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &Config, session: &Session) -> Self {
        Self::new(
            websocket_url(&config.api_base_url),
            session.token().map(str::to_string),
            config.realtime_debug,
        )
    }

    /// Spawn the connection task. Safe to call more than once; only the
    /// first call connects. Without a session token there is nothing to
    /// authenticate with, so the channel stays down and polling carries
    /// all updates.
    pub fn start(self: &Arc<Self>) {
        if self.token.is_none() {
            info!("realtime channel skipped: no session token");
            return;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run().await;
        });
    }

    /// New subscription to the event fan-out. Subscribers only see events
    /// sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.events.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Tear the connection down (logout / process exit).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn run(self: Arc<Self>) {
        let mut attempt: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            match self.connect_once().await {
                ConnectionOutcome::Shutdown => break,
                ConnectionOutcome::Closed { established: true } => attempt = 1,
                ConnectionOutcome::Closed { established: false } => attempt += 1,
            }
            if attempt > MAX_RECONNECT_ATTEMPTS {
                error!(
                    "realtime channel unavailable after {MAX_RECONNECT_ATTEMPTS} attempts; \
                     updates now arrive via polling only"
                );
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                _ = self.shutdown.cancelled() => break,
            }
        }
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn connect_once(&self) -> ConnectionOutcome {
        // Connection id only exists for log correlation.
        let connection_id = Uuid::new_v4();
        debug!(%connection_id, url = %self.ws_url, "realtime connecting");

        let (stream, _response) = tokio::select! {
            result = tokio_tungstenite::connect_async(self.ws_url.as_str()) => match result {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(%connection_id, error = %err, "realtime connect failed");
                    return ConnectionOutcome::Closed { established: false };
                }
            },
            _ = self.shutdown.cancelled() => return ConnectionOutcome::Shutdown,
        };
        let (mut sink, mut source) = stream.split();

        // Credentials ride in the first frame, never in the URL.
        let auth = serde_json::json!({ "type": "auth", "token": self.token });
        if let Err(err) = sink.send(Message::text(auth.to_string())).await {
            warn!(%connection_id, error = %err, "realtime auth send failed");
            return ConnectionOutcome::Closed { established: false };
        }
        self.connected.store(true, Ordering::SeqCst);
        info!(%connection_id, "realtime connected");

        let outcome = loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break ConnectionOutcome::Shutdown;
                }
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if self.verbose {
                            debug!(%connection_id, frame = %text, "realtime frame");
                        }
                        if let Some(event) = UpdateEvent::parse_frame(&text) {
                            // No subscribers is fine; send only fails then.
                            let _ = self.events.send(event);
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        info!(%connection_id, ?reason, "realtime closed by server");
                        break ConnectionOutcome::Closed { established: true };
                    }
                    Some(Ok(_)) => {} // ping/pong/binary: protocol noise
                    Some(Err(err)) => {
                        warn!(%connection_id, error = %err, "realtime stream error");
                        break ConnectionOutcome::Closed { established: true };
                    }
                    None => {
                        info!(%connection_id, "realtime stream ended");
                        break ConnectionOutcome::Closed { established: true };
                    }
                }
            }
        };
        self.connected.store(false, Ordering::SeqCst);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_strips_the_rest_suffix() {
        assert_eq!(
            websocket_url("http://localhost:4000/api/v1"),
            "ws://localhost:4000/ws"
        );
        assert_eq!(
            websocket_url("https://api.example.com/api/v1/"),
            "wss://api.example.com/ws"
        );
    }

    #[test]
    fn websocket_url_suffix_match_is_case_insensitive() {
        assert_eq!(
            websocket_url("https://api.example.com/API/V1"),
            "wss://api.example.com/ws"
        );
    }

    #[test]
    fn websocket_url_keeps_other_paths() {
        assert_eq!(
            websocket_url("http://localhost:4000"),
            "ws://localhost:4000/ws"
        );
        assert_eq!(
            websocket_url("https://gateway.example.com/backend"),
            "wss://gateway.example.com/backend/ws"
        );
    }

    #[tokio::test]
    async fn start_without_token_stays_down() {
        let manager = Arc::new(RealtimeManager::new("ws://localhost:1/ws", None, false));
        manager.start();
        assert!(!manager.is_connected());
        let mut receiver = manager.subscribe();
        assert!(matches!(
            receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
