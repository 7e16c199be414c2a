//! Event stream client with observable connection state.
//!
//! [`StreamClient`] owns at most one live stream session at a time. A
//! session is a spawned task that opens the authenticated GET request,
//! pulls body chunks, and runs them through the decode pipeline
//! (`ChunkDecoder` -> `LineFramer` -> payload decode) before dispatching
//! each event to the registered listeners.
//!
//! Connection state lives in a `tokio::sync::watch` cell so callers can
//! either poll the current [`ConnectionStatus`] or subscribe via
//! [`StreamClient::status_receiver`]. Lifecycle operations never return
//! errors; failures surface through `last_error` on the status cell.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::adapters::ReqwestHttpClient;
use crate::decode::ChunkDecoder;
use crate::frame::{self, EventRecord};
use crate::framing::LineFramer;
use crate::registry::{self, ListenerRegistry};
use crate::traits::{Headers, HttpClient};

/// Lifecycle phase of the stream connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamPhase {
    /// No session has been started yet
    #[default]
    Idle,
    /// A session is opening the transport
    Connecting,
    /// The stream is open and chunks are being consumed
    Open,
    /// The server ended the stream normally
    Closed,
    /// The caller tore the session down via `disconnect`
    Aborted,
    /// The transport failed to open or failed mid-stream
    Errored,
}

/// Observable connection state, published through a watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Current lifecycle phase
    pub phase: StreamPhase,
    /// Whether the stream is currently open
    pub connected: bool,
    /// Message of the most recent stream failure, if any
    pub last_error: Option<String>,
}

/// The active session slot.
///
/// `generation` fences off stale session tasks: every `connect` and every
/// effective `disconnect` bumps it, and a task may only dispatch events or
/// publish status while its own generation is still current.
struct Session {
    generation: u64,
    cancel: Option<watch::Sender<bool>>,
}

struct Shared {
    registry: Mutex<ListenerRegistry>,
    session: Mutex<Session>,
    status_tx: watch::Sender<ConnectionStatus>,
}

impl Shared {
    /// Publish a status update on behalf of a session task.
    ///
    /// Returns false without publishing when the task's generation has been
    /// superseded by a reconnect or disconnect.
    fn set_status(&self, generation: u64, status: ConnectionStatus) -> bool {
        let session = self.session.lock().unwrap();
        if session.generation != generation {
            return false;
        }
        self.status_tx.send_replace(status);
        true
    }

    /// Dispatch one event on behalf of a session task, generation-fenced.
    ///
    /// Listeners run outside both locks, so a callback is free to call back
    /// into the client (including `disconnect`).
    fn dispatch(&self, generation: u64, record: &EventRecord) {
        let listeners = {
            let session = self.session.lock().unwrap();
            if session.generation != generation {
                return;
            }
            self.registry.lock().unwrap().snapshot()
        };
        registry::dispatch(&listeners, record);
    }
}

/// Client for an authenticated, long-lived event stream.
///
/// Cloning is cheap and clones share all state: the listener registry, the
/// session slot, and the status cell.
///
/// # Example
///
/// ```ignore
/// use evsource::StreamClient;
///
/// let client = StreamClient::new();
/// client.add_event_listener("progress", |record| {
///     println!("event: {}", record.payload);
/// });
/// client.connect("https://api.example.com/events", "secret-token");
/// ```
#[derive(Clone)]
pub struct StreamClient {
    http: Arc<dyn HttpClient>,
    shared: Arc<Shared>,
}

impl StreamClient {
    /// Create a client backed by the production reqwest transport.
    pub fn new() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a client backed by an injected transport.
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::default());
        Self {
            http,
            shared: Arc::new(Shared {
                registry: Mutex::new(ListenerRegistry::new()),
                session: Mutex::new(Session {
                    generation: 0,
                    cancel: None,
                }),
                status_tx,
            }),
        }
    }

    /// Open a stream session, replacing any live one.
    ///
    /// The previous session (if any) is cancelled and fenced off before the
    /// new one starts; its in-flight chunks can no longer dispatch events or
    /// publish status. The request is a GET carrying `Authorization: Bearer
    /// <token>`, `Accept: text/event-stream` and `Cache-Control: no-cache`.
    ///
    /// Must be called from within a tokio runtime; the session runs as a
    /// spawned task and this method returns immediately.
    pub fn connect(&self, url: &str, token: &str) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let generation = {
            let mut session = self.shared.session.lock().unwrap();
            if let Some(previous) = session.cancel.take() {
                debug!("replacing live stream session");
                let _ = previous.send(true);
            }
            session.generation += 1;
            session.cancel = Some(cancel_tx);

            let last_error = self.shared.status_tx.borrow().last_error.clone();
            self.shared.status_tx.send_replace(ConnectionStatus {
                phase: StreamPhase::Connecting,
                connected: false,
                last_error,
            });
            session.generation
        };

        info!(url = %url, "connecting event stream");
        let http = Arc::clone(&self.http);
        let shared = Arc::clone(&self.shared);
        let url = url.to_string();
        let headers = auth_headers(token);
        tokio::spawn(async move {
            run_session(http, shared, generation, cancel_rx, url, headers).await;
        });
    }

    /// Tear down the current session.
    ///
    /// Cancels the session task, fences off its in-flight chunks, clears
    /// every registered listener, and publishes `Aborted` with
    /// `last_error` reset. Idempotent: with no session to tear down this is
    /// a pure no-op and the status cell is left untouched.
    pub fn disconnect(&self) {
        let mut session = self.shared.session.lock().unwrap();
        let Some(cancel) = session.cancel.take() else {
            debug!("disconnect with no active session");
            return;
        };
        let _ = cancel.send(true);
        session.generation += 1;
        self.shared.registry.lock().unwrap().clear();
        self.shared.status_tx.send_replace(ConnectionStatus {
            phase: StreamPhase::Aborted,
            connected: false,
            last_error: None,
        });
        drop(session);
        info!("event stream disconnected");
    }

    /// Register a listener under a key, replacing any previous one.
    ///
    /// Every dispatched event goes to every registered listener; the key
    /// only namespaces registration and removal.
    pub fn add_event_listener<F>(&self, key: &str, listener: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.shared
            .registry
            .lock()
            .unwrap()
            .add(key, Arc::new(listener));
    }

    /// Remove the listener registered under a key. Unknown keys are a no-op.
    pub fn remove_event_listener(&self, key: &str) {
        self.shared.registry.lock().unwrap().remove(key);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.registry.lock().unwrap().len()
    }

    /// Current lifecycle phase.
    pub fn connection_state(&self) -> StreamPhase {
        self.shared.status_tx.borrow().phase
    }

    /// Whether the stream is currently open.
    pub fn connected(&self) -> bool {
        self.shared.status_tx.borrow().connected
    }

    /// Message of the most recent stream failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.shared.status_tx.borrow().last_error.clone()
    }

    /// Snapshot of the full connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.shared.status_tx.borrow().clone()
    }

    /// Subscribe to connection status changes.
    pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status_tx.subscribe()
    }
}

impl Default for StreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("status", &*self.shared.status_tx.borrow())
            .finish_non_exhaustive()
    }
}

/// Headers for the outbound stream request.
fn auth_headers(token: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
    headers.insert("Accept".to_string(), "text/event-stream".to_string());
    headers.insert("Cache-Control".to_string(), "no-cache".to_string());
    headers
}

/// One stream session: open the transport, then pull chunks until the
/// stream ends, fails, or the session is cancelled.
///
/// Cancellation is cooperative: the cancel watch is polled ahead of the
/// next chunk, and a cancelled session exits silently; `disconnect` has
/// already published the terminal status. Decoder and framer state is
/// local to the session, so nothing carries over between sessions.
async fn run_session(
    http: Arc<dyn HttpClient>,
    shared: Arc<Shared>,
    generation: u64,
    mut cancel_rx: watch::Receiver<bool>,
    url: String,
    headers: Headers,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel_rx.changed() => {
            debug!("stream session cancelled before open");
            return;
        }
        result = http.get_stream(&url, &headers) => result,
    };

    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) if err.is_cancelled() => {
            debug!("stream session cancelled before open");
            return;
        }
        Err(err) => {
            warn!(error = %err, "event stream failed to open");
            shared.set_status(
                generation,
                ConnectionStatus {
                    phase: StreamPhase::Errored,
                    connected: false,
                    last_error: Some(err.to_string()),
                },
            );
            return;
        }
    };

    if !shared.set_status(
        generation,
        ConnectionStatus {
            phase: StreamPhase::Open,
            connected: true,
            last_error: None,
        },
    ) {
        // Superseded while opening
        return;
    }
    info!("event stream open");

    let mut decoder = ChunkDecoder::new();
    let mut framer = LineFramer::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel_rx.changed() => {
                debug!("stream session cancelled");
                return;
            }
            chunk = stream.next() => chunk,
        };

        match next {
            Some(Ok(chunk)) => {
                let text = decoder.decode(&chunk);
                for line in framer.push(&text) {
                    let Some(data) = frame::payload_of(&line) else {
                        continue;
                    };
                    match frame::decode_payload(data) {
                        Ok(record) => shared.dispatch(generation, &record),
                        Err(err) => {
                            warn!(error = %err, "skipping undecodable event payload");
                        }
                    }
                }
            }
            Some(Err(err)) if err.is_cancelled() => {
                debug!("stream session cancelled");
                return;
            }
            Some(Err(err)) => {
                warn!(error = %err, "event stream failed");
                shared.set_status(
                    generation,
                    ConnectionStatus {
                        phase: StreamPhase::Errored,
                        connected: false,
                        last_error: Some(err.to_string()),
                    },
                );
                return;
            }
            None => {
                if !framer.partial().is_empty() {
                    debug!(
                        len = framer.partial().len(),
                        "discarding unterminated trailing line"
                    );
                }
                shared.set_status(
                    generation,
                    ConnectionStatus {
                        phase: StreamPhase::Closed,
                        connected: false,
                        last_error: None,
                    },
                );
                info!("event stream closed by server");
                return;
            }
        }
    }
}
