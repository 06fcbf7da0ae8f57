//! WebSocket client for the `eventboard-store` server.
//!
//! [`WsStore`] connects lazily: the first request opens the socket, and a
//! request made after the socket dropped opens a fresh one. Each request
//! carries a [`RequestId`]; a background reader task routes every response
//! to the caller waiting on that id, so concurrent requests share one socket.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eventboard_proto::codec;
use eventboard_proto::record::{Record, RecordId, WorkflowStatus};
use eventboard_proto::store::{RequestId, StoreMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::{RecordStore, StoreError, StoreKind};

/// Type alias for the write half of a WebSocket connection.
type WsSender = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;

/// Type alias for the read half of a WebSocket connection.
type WsReader =
    futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>>;

/// Callers waiting for a response, keyed by request id.
type PendingReplies = Arc<parking_lot::Mutex<HashMap<RequestId, oneshot::Sender<StoreMessage>>>>;

/// Default timeout for opening the WebSocket.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Record store reached over WebSocket.
pub struct WsStore {
    /// The store server URL (ws:// or wss://).
    url: String,
    connect_timeout: Duration,
    /// Current connection, if one has been opened.
    conn: Mutex<Option<Arc<Connection>>>,
}

impl WsStore {
    /// Creates a client for `url` without connecting yet.
    #[must_use]
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            conn: Mutex::new(None),
        }
    }

    /// Creates a client and opens the connection immediately.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if the connection attempt times out.
    /// - [`StoreError::Unreachable`] if the server cannot be reached.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let store = Self::new(url, connect_timeout);
        store.connection().await?;
        Ok(store)
    }

    /// Return the store server URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a live connection is currently open.
    pub async fn is_connected(&self) -> bool {
        self.conn
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| c.is_connected())
    }

    /// Returns the live connection, opening a new one if needed.
    async fn connection(&self) -> Result<Arc<Connection>, StoreError> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref()
            && conn.is_connected()
        {
            return Ok(Arc::clone(conn));
        }
        let conn = Arc::new(Connection::open(&self.url, self.connect_timeout).await?);
        *guard = Some(Arc::clone(&conn));
        drop(guard);
        Ok(conn)
    }

    async fn request(&self, msg: StoreMessage) -> Result<StoreMessage, StoreError> {
        let conn = self.connection().await?;
        conn.request(msg).await
    }
}

impl RecordStore for WsStore {
    async fn fetch_records(&self) -> Result<Vec<Record>, StoreError> {
        let request_id = RequestId::new();
        match self.request(StoreMessage::FetchRecords { request_id }).await? {
            StoreMessage::Records { records, .. } => {
                tracing::debug!(%request_id, count = records.len(), "fetched records");
                Ok(records)
            }
            StoreMessage::Rejected { reason, .. } => Err(StoreError::Rejected(reason)),
            other => Err(unexpected_reply(&other)),
        }
    }

    async fn update_status(&self, id: RecordId, status: WorkflowStatus) -> Result<(), StoreError> {
        let request_id = RequestId::new();
        let msg = StoreMessage::UpdateStatus {
            request_id,
            record_id: id,
            status,
        };
        match self.request(msg).await? {
            StoreMessage::StatusUpdated {
                record_id,
                status: stored,
                ..
            } if record_id == id && stored == status => Ok(()),
            StoreMessage::Rejected { reason, .. } => Err(StoreError::Rejected(reason)),
            other => Err(unexpected_reply(&other)),
        }
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }
}

fn unexpected_reply(msg: &StoreMessage) -> StoreError {
    tracing::warn!(?msg, "unexpected store reply");
    StoreError::Protocol("unexpected reply".to_string())
}

/// One open WebSocket plus its reader task.
struct Connection {
    /// Write half of the WebSocket connection (shared for concurrent sends).
    ws_sender: Mutex<WsSender>,
    pending: PendingReplies,
    /// Whether the WebSocket connection is active.
    connected: Arc<AtomicBool>,
    reader_handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    async fn open(url: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let (ws_stream, _response) = tokio::time::timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| {
                tracing::warn!(url, "store WebSocket connect timed out");
                StoreError::Timeout
            })?
            .map_err(|e| {
                tracing::warn!(url, err = %e, "store WebSocket connect failed");
                map_ws_connect_error(url, e)
            })?;

        let (ws_sender, ws_reader) = ws_stream.split();
        let pending = PendingReplies::default();
        let connected = Arc::new(AtomicBool::new(true));
        let reader_handle = tokio::spawn(reader_loop(
            ws_reader,
            Arc::clone(&pending),
            Arc::clone(&connected),
        ));

        tracing::info!(url, "connected to store");
        Ok(Self {
            ws_sender: Mutex::new(ws_sender),
            pending,
            connected,
            reader_handle,
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn request(&self, msg: StoreMessage) -> Result<StoreMessage, StoreError> {
        let request_id = msg
            .request_id()
            .ok_or_else(|| StoreError::Protocol("request without id".to_string()))?;
        let bytes = codec::encode(&msg).map_err(|e| StoreError::Protocol(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request_id, tx);
        let guard = PendingGuard {
            pending: &self.pending,
            request_id,
        };

        let sent = self
            .ws_sender
            .lock()
            .await
            .send(Message::Binary(bytes.into()))
            .await;
        if let Err(e) = sent {
            tracing::warn!(err = %e, %request_id, "store send failed");
            self.connected.store(false, Ordering::Relaxed);
            return Err(StoreError::ConnectionClosed);
        }

        // The reader drops every waiting sender when the socket closes.
        let reply = rx.await.map_err(|_| StoreError::ConnectionClosed);
        drop(guard);
        reply
    }
}

/// Removes a request's entry from the pending map when the request ends,
/// including when the caller gives up and drops the future.
struct PendingGuard<'a> {
    pending: &'a PendingReplies,
    request_id: RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.request_id);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}

/// Background task that reads WebSocket frames and routes replies.
///
/// Malformed frames are logged and skipped. Sets `connected` to `false` and
/// fails every outstanding request when the socket closes or errors out.
async fn reader_loop(mut ws_reader: WsReader, pending: PendingReplies, connected: Arc<AtomicBool>) {
    while let Some(msg_result) = ws_reader.next().await {
        match msg_result {
            Ok(Message::Binary(data)) => match codec::decode(&data) {
                Ok(StoreMessage::Error { reason }) => {
                    tracing::warn!(reason = %reason, "store server error");
                }
                Ok(reply) => {
                    let waiter = reply.request_id().and_then(|id| pending.lock().remove(&id));
                    match waiter {
                        Some(tx) => {
                            // The caller may have timed out and gone away.
                            let _ = tx.send(reply);
                        }
                        None => tracing::debug!(?reply, "reply with no waiting request"),
                    }
                }
                Err(e) => {
                    tracing::warn!(err = %e, "malformed store frame, skipping");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("store WebSocket closed by server");
                break;
            }
            Ok(_) => {
                // Ignore ping/pong/text/raw frames.
            }
            Err(e) => {
                tracing::warn!(err = %e, "store WebSocket read error");
                break;
            }
        }
    }
    connected.store(false, Ordering::Relaxed);
    pending.lock().clear();
    tracing::info!("store reader task exiting");
}

/// Map a `tokio_tungstenite` connection error to a [`StoreError`].
fn map_ws_connect_error(url: &str, err: tokio_tungstenite::tungstenite::Error) -> StoreError {
    use tokio_tungstenite::tungstenite::Error as WsError;
    match err {
        WsError::Io(_) | WsError::Url(_) => StoreError::Unreachable(url.to_string()),
        WsError::Http(response) => {
            StoreError::Protocol(format!("store HTTP error: status {}", response.status()))
        }
        other => StoreError::Protocol(format!("store connection error: {other}")),
    }
}
