//! Session registry implementation

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::entry::SessionEntry;
use crate::client::{probe_service, StreamConfig};
use crate::protocol::ChannelId;
use crate::render::{DataUrlDecoder, DisplayTarget, FrameDecoder};
use crate::session::{ChannelSession, ChannelStatus};

/// Owns every channel session on a page
pub struct SessionRegistry {
    config: StreamConfig,
    entries: Vec<SessionEntry>,
    service_status: watch::Receiver<ChannelStatus>,
    probe_task: Option<JoinHandle<()>>,
}

impl SessionRegistry {
    /// Discover targets and start sessions, rendering frames as data URLs.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<I>(config: StreamConfig, targets: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DisplayTarget>>,
    {
        Self::start_with_decoder(config, targets, Arc::new(DataUrlDecoder))
    }

    /// Discover targets and start sessions with a custom decoder.
    ///
    /// When streaming is disabled the service status is `Error` and no
    /// connection is attempted. Otherwise the liveness probe runs in the
    /// background while one session starts per target that carries a valid
    /// channel descriptor.
    pub fn start_with_decoder<I>(
        config: StreamConfig,
        targets: I,
        decoder: Arc<dyn FrameDecoder>,
    ) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DisplayTarget>>,
    {
        if !config.active {
            tracing::info!("Streaming disabled, no connection attempted");
            let (_, service_status) = watch::channel(ChannelStatus::Error);
            return Self {
                config,
                entries: Vec::new(),
                service_status,
                probe_task: None,
            };
        }

        let (status_tx, service_status) = watch::channel(ChannelStatus::Pending);
        let probe_config = config.clone();
        let probe_task = tokio::spawn(async move {
            let status = if probe_service(&probe_config).await {
                ChannelStatus::Connected
            } else {
                ChannelStatus::Error
            };
            status_tx.send_replace(status);
        });

        let mut entries = Vec::new();
        for target in targets {
            let Some(descriptor) = target.descriptor() else {
                continue;
            };

            let channel = match ChannelId::parse(&descriptor) {
                Ok(channel) => channel,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping display target");
                    continue;
                }
            };

            let session = ChannelSession::spawn(
                channel,
                &config,
                Arc::clone(&decoder),
                Arc::clone(&target),
            );
            entries.push(SessionEntry::new(target, session));
        }

        tracing::info!(
            url = %config.url(),
            sessions = entries.len(),
            "Session registry started"
        );

        Self {
            config,
            entries,
            service_status,
            probe_task: Some(probe_task),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no session was started
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All sessions with their targets
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// First session displaying `channel`
    pub fn session(&self, channel: &ChannelId) -> Option<&ChannelSession> {
        self.entries
            .iter()
            .map(|entry| &entry.session)
            .find(|session| session.channel() == channel)
    }

    /// Status of every session, in discovery order
    pub fn statuses(&self) -> Vec<(ChannelId, ChannelStatus)> {
        self.entries
            .iter()
            .map(|entry| (entry.session.channel().clone(), entry.status()))
            .collect()
    }

    /// Reachability of the stream service, as reported by the probe
    pub fn service_status(&self) -> ChannelStatus {
        *self.service_status.borrow()
    }

    /// Watch the service status
    pub fn watch_service_status(&self) -> watch::Receiver<ChannelStatus> {
        self.service_status.clone()
    }

    /// Close every session and release every displayed resource.
    ///
    /// Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some(probe) = self.probe_task.take() {
            probe.abort();
        }

        join_all(self.entries.iter_mut().map(|entry| entry.session.close())).await;

        tracing::info!(sessions = self.entries.len(), "Session registry shut down");
    }

    /// Run until `shutdown` resolves, then tear everything down
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        shutdown.await;
        tracing::info!("Shutdown signal received");
        self.shutdown().await;
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        if let Some(probe) = self.probe_task.take() {
            probe.abort();
        }
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("config", &self.config)
            .field("entries", &self.entries)
            .finish()
    }
}
