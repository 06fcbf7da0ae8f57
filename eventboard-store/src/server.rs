//! Store server core: shared state, WebSocket handler, and request dispatch.
//!
//! Each client connection gets a writer task fed by an unbounded channel.
//! Fetches are handled on their own task, so a delayed status update never
//! holds up a fetch on the same connection. Status updates from one
//! connection go through a single queue and are applied in arrival order:
//! a client that reverts an update it gave up on can rely on the revert
//! landing after the original. Responses echo the request's
//! [`RequestId`](eventboard_proto::store::RequestId).

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use eventboard_proto::codec;
use eventboard_proto::record::{RecordId, WorkflowStatus};
use eventboard_proto::store::{RequestId, StoreMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::records::RecordTable;

/// Errors raised while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind or inspect the listening socket.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was attempted.
        addr: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Fault injection applied to status updates.
#[derive(Debug, Clone, Default)]
pub struct UpdatePolicy {
    /// Probability in `[0, 1]` that an update is rejected.
    pub reject_rate: f64,
    /// Delay applied before answering an update.
    pub latency: Duration,
}

/// Shared server state: the record table and the update policy.
pub struct StoreState {
    /// All records served by this store.
    pub records: RecordTable,
    policy: UpdatePolicy,
}

impl StoreState {
    /// Creates state with the given records and no fault injection.
    #[must_use]
    pub fn new(records: RecordTable) -> Self {
        Self::with_policy(records, UpdatePolicy::default())
    }

    /// Creates state with the given records and update policy.
    #[must_use]
    pub const fn with_policy(records: RecordTable, policy: UpdatePolicy) -> Self {
        Self { records, policy }
    }

    fn should_reject(&self) -> bool {
        let rate = self.policy.reject_rate.clamp(0.0, 1.0);
        rate > 0.0 && rand::random_bool(rate)
    }
}

/// Axum handler upgrading `/ws` requests.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<StoreState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an upgraded WebSocket connection for a single client.
pub async fn handle_socket(socket: WebSocket, state: Arc<StoreState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    tracing::info!("client connected");

    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!("WebSocket write failed");
                break;
            }
        }
    });

    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<UpdateRequest>();
    let update_state = Arc::clone(&state);
    let update_reply_tx = tx.clone();
    tokio::spawn(async move {
        while let Some(req) = update_rx.recv().await {
            let reply = update_status(&update_state, req.request_id, req.record_id, req.status).await;
            send_reply(&update_reply_tx, &reply);
        }
    });

    let reader_state = Arc::clone(&state);
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Binary(data) => route_frame(&data, &reader_state, &tx, &update_tx),
                Message::Close(_) => {
                    tracing::info!("received close frame");
                    break;
                }
                _ => {
                    // Ignore text, ping, pong frames.
                }
            }
        }
    });

    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    tracing::info!("client disconnected");
}

/// A status update waiting in a connection's update queue.
struct UpdateRequest {
    request_id: RequestId,
    record_id: RecordId,
    status: WorkflowStatus,
}

/// Decodes one frame and hands it to the update queue or a fetch task.
fn route_frame(
    data: &[u8],
    state: &Arc<StoreState>,
    tx: &mpsc::UnboundedSender<Message>,
    updates: &mpsc::UnboundedSender<UpdateRequest>,
) {
    let msg = match codec::decode(data) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "failed to decode request");
            send_reply(
                tx,
                &StoreMessage::Error {
                    reason: format!("undecodable request: {e}"),
                },
            );
            return;
        }
    };

    if let StoreMessage::UpdateStatus {
        request_id,
        record_id,
        status,
    } = msg
    {
        let req = UpdateRequest {
            request_id,
            record_id,
            status,
        };
        if updates.send(req).is_err() {
            tracing::debug!(%request_id, "update queue closed, dropping update");
        }
        return;
    }

    let state = Arc::clone(state);
    let tx = tx.clone();
    tokio::spawn(async move {
        if let Some(reply) = handle_request(msg, &state).await {
            send_reply(&tx, &reply);
        }
    });
}

/// Produces the response to one decoded request, if any.
async fn handle_request(msg: StoreMessage, state: &StoreState) -> Option<StoreMessage> {
    match msg {
        StoreMessage::FetchRecords { request_id } => {
            let records = state.records.all().await;
            tracing::debug!(%request_id, count = records.len(), "serving fetch");
            Some(StoreMessage::Records {
                request_id,
                records,
            })
        }
        StoreMessage::UpdateStatus {
            request_id,
            record_id,
            status,
        } => Some(update_status(state, request_id, record_id, status).await),
        other => {
            tracing::warn!(msg = ?other, "unexpected message type from client");
            other.request_id().map(|request_id| StoreMessage::Rejected {
                request_id,
                reason: "not a request".to_string(),
            })
        }
    }
}

async fn update_status(
    state: &StoreState,
    request_id: RequestId,
    record_id: RecordId,
    status: WorkflowStatus,
) -> StoreMessage {
    if !state.policy.latency.is_zero() {
        tokio::time::sleep(state.policy.latency).await;
    }

    if state.should_reject() {
        tracing::info!(%request_id, %record_id, %status, "rejecting update (fault injection)");
        return StoreMessage::Rejected {
            request_id,
            reason: "update rejected by store".to_string(),
        };
    }

    match state.records.set_status(record_id, status).await {
        Ok(()) => {
            tracing::info!(%request_id, %record_id, %status, "status updated");
            StoreMessage::StatusUpdated {
                request_id,
                record_id,
                status,
            }
        }
        Err(e) => {
            tracing::warn!(%request_id, %record_id, error = %e, "status update failed");
            StoreMessage::Rejected {
                request_id,
                reason: e.to_string(),
            }
        }
    }
}

fn send_reply(tx: &mpsc::UnboundedSender<Message>, reply: &StoreMessage) {
    match codec::encode(reply) {
        Ok(bytes) => {
            if tx.send(Message::Binary(bytes.into())).is_err() {
                tracing::debug!("client gone before reply was sent");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to encode reply"),
    }
}

/// Starts the store server with the built-in demo records.
///
/// Binds to `addr` and returns the bound address and a
/// [`tokio::task::JoinHandle`] for the serving task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the TCP listener cannot bind.
pub async fn start_server(
    addr: &str,
) -> Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>), ServerError> {
    let records = RecordTable::new(eventboard_proto::seed::demo_records());
    start_server_with_state(addr, Arc::new(StoreState::new(records))).await
}

/// Starts the store server with a pre-built [`StoreState`].
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the TCP listener cannot bind.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StoreState>,
) -> Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>), ServerError> {
    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let bind_err = |source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    };
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(bind_err)?;
    let bound_addr = listener.local_addr().map_err(bind_err)?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "store server error");
        }
    });

    Ok((bound_addr, handle))
}
