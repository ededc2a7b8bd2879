//! Channel session
//!
//! One session owns one socket bound to one display target. A single task
//! per session awaits socket events and decode completions in turn:
//!
//! ```text
//!            ┌────────────── select! ───────────────┐
//!  ws.next() ──► FrameBuffer::append                 │
//!  settle()  ──► install resource, resume demuxing   │
//!  cancel    ──► teardown                            │
//!            └───────────────────────────────────────┘
//! ```
//!
//! Bytes are always appended as they arrive. Frames are only cut while the
//! renderer is idle, so a slow decoder delays frames without ever stalling
//! the socket.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::state::{ChannelStatus, CloseReason, SessionState};
use crate::client::StreamConfig;
use crate::error::{Error, ProtocolError};
use crate::media::{FrameBuffer, MarkerDemuxer};
use crate::protocol::ChannelId;
use crate::render::{DisplayTarget, FrameDecoder, Renderer, Submit};
use crate::stats::SessionStats;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to a running channel session
pub struct ChannelSession {
    channel: ChannelId,
    state_tx: Arc<watch::Sender<SessionState>>,
    state_rx: watch::Receiver<SessionState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<(Renderer, SessionStats)>>,
    stats: Option<SessionStats>,
}

impl ChannelSession {
    /// Connect to the stream service and start displaying `channel` on
    /// `target`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        channel: ChannelId,
        config: &StreamConfig,
        decoder: Arc<dyn FrameDecoder>,
        target: Arc<dyn DisplayTarget>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::new());
        let state_tx = Arc::new(state_tx);
        let cancel = CancellationToken::new();

        let task = SessionTask {
            channel: channel.clone(),
            url: config.url(),
            max_buffer_size: config.max_buffer_size,
            buffer: FrameBuffer::with_capacity(config.read_buffer_size),
            demuxer: MarkerDemuxer::new(),
            renderer: Renderer::new(decoder, target),
            stats: SessionStats::new(),
            state: Arc::clone(&state_tx),
            cancel: cancel.clone(),
        };

        Self {
            channel,
            state_tx,
            state_rx,
            cancel,
            task: Some(tokio::spawn(task.run())),
            stats: None,
        }
    }

    /// Channel this session displays
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Current status classification
    pub fn status(&self) -> ChannelStatus {
        self.state_rx.borrow().status()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until the session reaches `Closed`, by any path
    pub async fn closed(&self) {
        let mut rx = self.state_rx.clone();
        // Err means the sender is gone, which only happens after close
        let _ = rx.wait_for(|state| state.is_closed()).await;
    }

    /// Statistics, available once the session has been torn down
    pub fn stats(&self) -> Option<&SessionStats> {
        self.stats.as_ref()
    }

    /// Tear down the session.
    ///
    /// Closes the socket if still open, discards any in-flight decode and
    /// releases the displayed resource. Safe to call in any state and any
    /// number of times.
    pub async fn close(&mut self) {
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            match task.await {
                Ok((mut renderer, stats)) => {
                    renderer.release();
                    self.stats = Some(stats);
                }
                Err(e) => {
                    tracing::error!(channel = %self.channel, error = %e, "Session task failed");
                }
            }
        }

        self.state_tx.send_modify(|state| {
            state.close(CloseReason::Requested);
        });
    }
}

impl Drop for ChannelSession {
    fn drop(&mut self) {
        // The task finishes on its own; dropping its renderer releases the
        // displayed resource
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ChannelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSession")
            .field("channel", &self.channel)
            .field("phase", &self.state_rx.borrow().phase)
            .finish()
    }
}

/// State owned by the session task
struct SessionTask {
    channel: ChannelId,
    url: String,
    max_buffer_size: Option<usize>,
    buffer: FrameBuffer,
    demuxer: MarkerDemuxer,
    renderer: Renderer,
    stats: SessionStats,
    state: Arc<watch::Sender<SessionState>>,
    cancel: CancellationToken,
}

impl SessionTask {
    async fn run(mut self) -> (Renderer, SessionStats) {
        let reason = match self.connect().await {
            Ok(mut ws) => {
                let reason = self.stream(&mut ws).await;
                if reason == CloseReason::Requested {
                    if let Err(e) = ws.close(None).await {
                        tracing::debug!(channel = %self.channel, error = %e, "Close handshake failed");
                    }
                }
                reason
            }
            Err(reason) => reason,
        };

        // A decode finishing after teardown must not reach the target
        self.renderer.cancel();

        if !self.buffer.is_empty() {
            tracing::debug!(channel = %self.channel, bytes = self.buffer.len(), "Dropping buffered data");
            self.buffer.clear();
        }

        match &reason {
            CloseReason::RemoteClosed => {
                tracing::info!(channel = %self.channel, "WebSocket connection closed by server");
            }
            reason if reason.is_error() => {
                tracing::error!(channel = %self.channel, reason = ?reason, "WebSocket connection lost");
            }
            _ => {
                tracing::info!(channel = %self.channel, "WebSocket connection closed");
            }
        }

        self.state.send_modify(|state| {
            state.close(reason);
        });
        self.stats.open_duration = self.state.borrow().open_duration();

        (self.renderer, self.stats)
    }

    /// Open the socket and select the channel
    async fn connect(&mut self) -> Result<WsStream, CloseReason> {
        let connected = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CloseReason::Requested),
            result = connect_async(self.url.as_str()) => result,
        };

        let (mut ws, _) =
            connected.map_err(|e| CloseReason::ConnectFailed(Arc::new(Error::from(e))))?;

        self.state.send_modify(|state| {
            state.open();
        });
        tracing::info!(channel = %self.channel, url = %self.url, "WebSocket connection opened");

        let sent = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CloseReason::Requested),
            result = ws.send(Message::Text(self.channel.to_string())) => result,
        };
        sent.map_err(|e| CloseReason::SocketError(Arc::new(Error::from(e))))?;

        Ok(ws)
    }

    /// Pump the socket until it closes or the session is cancelled
    async fn stream(&mut self, ws: &mut WsStream) -> CloseReason {
        loop {
            self.pump_frames();

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return CloseReason::Requested,

                Some(outcome) = self.renderer.settle(), if self.renderer.is_busy() => {
                    self.stats.record_render(&outcome);
                }

                message = ws.next() => match message {
                    Some(Ok(Message::Binary(data))) => {
                        match self.on_binary(&data) {
                            Ok(()) => {}
                            Err(Error::Protocol(e)) => return CloseReason::Protocol(e),
                            Err(e) => return CloseReason::SocketError(Arc::new(e)),
                        }
                    }
                    Some(Ok(Message::Text(_))) => {
                        self.stats.messages_ignored += 1;
                        tracing::warn!(
                            channel = %self.channel,
                            error = %ProtocolError::NonBinaryMessage,
                            "Ignoring message"
                        );
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(channel = %self.channel, frame = ?frame, "Close frame received");
                        return CloseReason::RemoteClosed;
                    }
                    Some(Ok(_)) => {} // Ping/pong are answered by tungstenite
                    Some(Err(e)) => return CloseReason::SocketError(Arc::new(Error::from(e))),
                    None => return CloseReason::RemoteClosed,
                },
            }
        }
    }

    /// Hand buffered frames to the renderer until one is in flight
    fn pump_frames(&mut self) {
        while !self.renderer.is_busy() {
            let Some(frame) = self.demuxer.next_frame(&mut self.buffer) else {
                break;
            };

            if let Submit::Skipped = self.renderer.submit(frame) {
                self.stats.empty_frames += 1;
            }
        }
    }

    fn on_binary(&mut self, data: &[u8]) -> crate::Result<()> {
        self.buffer.append(data);
        self.stats.record_message(data.len(), self.buffer.len());

        tracing::trace!(
            channel = %self.channel,
            bytes = data.len(),
            buffered = self.buffer.len(),
            "Received data"
        );

        // Complete frames waiting behind a busy renderer do not count
        match self.max_buffer_size {
            Some(limit)
                if self.buffer.len() > limit
                    && self.buffer.find_marker(self.demuxer.marker()).is_none() =>
            {
                Err(ProtocolError::BufferOverflow {
                    size: self.buffer.len(),
                    limit,
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}
