//! Notification channel client
//!
//! Long-lived WebSocket connection delivering backend push notifications to
//! the session that opened it. The client announces the session identifier
//! in a single registration frame and from then on treats the channel
//! purely as a push sink: keepalive frames are dropped, every other text
//! frame replaces the current status. There is no back-pressure and no
//! automatic reconnect; a lost channel stays lost until the caller opens a
//! new one.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use lexctl_common::protocol::{registration_frame, Frame};
use lexctl_common::SessionId;

use crate::error::{ClientError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How many surfaced status lines are retained for inspection.
const RECENT_STATUS_CAP: usize = 64;

/// Lifecycle of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Transport being established; registration not yet sent
    Connecting,
    /// Registered and listening for pushes
    Open,
    /// Transport closed; no further messages will arrive
    Closed,
    /// Transport failed; no further messages will arrive
    Errored,
}

/// Handle to an open notification channel.
///
/// The current status is a single read-mutable value: when pushes arrive
/// faster than an observer reads, only the most recent survives. A bounded
/// ring of recently surfaced statuses is kept alongside for display and
/// diagnostics.
pub struct NotificationChannel {
    session: SessionId,
    status_rx: watch::Receiver<Option<String>>,
    state_rx: watch::Receiver<ChannelState>,
    recent: Arc<RwLock<VecDeque<String>>>,
    reader: JoinHandle<()>,
}

impl NotificationChannel {
    /// Connect to the server's registration endpoint and announce `session`.
    ///
    /// Resolution of the returned future is the registration barrier: the
    /// registration frame has been handed to the transport, so a job
    /// submitted afterwards can be correlated with this channel. Whether a
    /// job submitted *before* that point gets its notifications delivered
    /// depends on the backend; this client does not resolve that race, it
    /// avoids it by letting callers order connect before submit.
    pub async fn connect(ws_url: &str, session: &SessionId) -> Result<NotificationChannel> {
        let (status_tx, status_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);

        let (mut socket, _response) = match connect_async(ws_url).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Notification channel connect to {} failed: {}", ws_url, e);
                state_tx.send_replace(ChannelState::Errored);
                return Err(ClientError::Channel(format!(
                    "connect to {} failed: {}",
                    ws_url, e
                )));
            }
        };

        // Exactly one registration frame per channel lifetime, before
        // anything else goes over the wire.
        if let Err(e) = socket.send(Message::Text(registration_frame(session))).await {
            error!("Notification channel registration failed: {}", e);
            state_tx.send_replace(ChannelState::Errored);
            return Err(ClientError::Channel(format!("registration failed: {}", e)));
        }

        state_tx.send_replace(ChannelState::Open);
        info!("Notification channel open, session {}", session);

        let recent = Arc::new(RwLock::new(VecDeque::with_capacity(RECENT_STATUS_CAP)));
        let reader = tokio::spawn(read_loop(socket, status_tx, state_tx, Arc::clone(&recent)));

        Ok(NotificationChannel {
            session: session.clone(),
            status_rx,
            state_rx,
            recent,
            reader,
        })
    }

    /// Session this channel is registered under.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Latest surfaced status, if any push has arrived yet.
    pub fn current_status(&self) -> Option<String> {
        self.status_rx.borrow().clone()
    }

    /// Watch receiver over the current status (last-write-wins).
    pub fn status_watch(&self) -> watch::Receiver<Option<String>> {
        self.status_rx.clone()
    }

    /// Current channel lifecycle state.
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Watch receiver over the channel lifecycle state.
    pub fn state_watch(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Recently surfaced statuses, oldest first (bounded ring).
    pub async fn recent_statuses(&self) -> Vec<String> {
        self.recent.read().await.iter().cloned().collect()
    }

    /// Stop listening. Pending pushes are dropped; the server notices the
    /// dead socket on its next keepalive sweep.
    pub fn close(self) {
        self.reader.abort();
    }
}

/// Reader task: classify inbound frames, publish status, track lifecycle.
async fn read_loop(
    mut socket: WsStream,
    status_tx: watch::Sender<Option<String>>,
    state_tx: watch::Sender<ChannelState>,
    recent: Arc<RwLock<VecDeque<String>>>,
) {
    while let Some(next) = socket.next().await {
        match next {
            Ok(Message::Text(raw)) => match Frame::classify(&raw) {
                Frame::Keepalive => {
                    // Liveness only; no observable effect.
                    debug!("Notification channel keepalive");
                }
                Frame::Status(text) => {
                    debug!("Notification channel status: {}", text);
                    let mut ring = recent.write().await;
                    if ring.len() == RECENT_STATUS_CAP {
                        ring.pop_front();
                    }
                    ring.push_back(text.clone());
                    drop(ring);
                    status_tx.send_replace(Some(text));
                }
            },
            Ok(Message::Close(frame)) => {
                info!("Notification channel closed by server: {:?}", frame);
                state_tx.send_replace(ChannelState::Closed);
                return;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Transport-level liveness; tungstenite answers pings itself.
            }
            Ok(other) => {
                warn!("Notification channel ignoring non-text frame: {:?}", other);
            }
            Err(e) => {
                error!("Notification channel transport error: {}", e);
                state_tx.send_replace(ChannelState::Errored);
                return;
            }
        }
    }
    info!("Notification channel ended");
    state_tx.send_replace(ChannelState::Closed);
}
