//! Session runtime integration.
//!
//! Spawns a [`Session`](crate::session::Session) on the ambient tokio runtime
//! and hands back the channel ends a driver needs.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::MatchStats;
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::session::{run_session, InboundCommand, SessionConfig};

/// Running session.
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    task: JoinHandle<MatchStats>,
}

impl SessionHandle {
    /// Build the engine described by `config` and start its session loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: &SessionConfig) -> Result<Self> {
        let engine = config.build_engine()?;
        let max_pending = config.max_pending.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let task = tokio::spawn(run_session(
            engine,
            config.layout,
            config.playback_timeout,
            cmd_rx,
            out_tx,
        ));

        Ok(Self {
            cmd_tx,
            out_rx,
            task,
        })
    }

    /// Queue a command, waiting while the inbound channel is full.
    pub async fn send(&self, cmd: impl Into<InboundCommand>) -> Result<()> {
        self.cmd_tx
            .send(cmd.into())
            .await
            .map_err(|_| anyhow::anyhow!("session has stopped"))
    }

    /// Queue a command without waiting. Returns false when the channel is full
    /// or the session has stopped.
    pub fn try_send(&self, cmd: impl Into<InboundCommand>) -> bool {
        self.cmd_tx.try_send(cmd.into()).is_ok()
    }

    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        self.out_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<OutboundMessage> {
        self.out_rx.try_recv().ok()
    }

    /// Ask the session to quit and wait for it. Outbound lines not yet
    /// received are returned alongside the final totals.
    pub async fn shutdown(mut self) -> Result<(MatchStats, Vec<OutboundMessage>)> {
        // The session may already be gone; the join below reports that.
        let _ = self.cmd_tx.send(InboundMessage::Quit.into()).await;
        drop(self.cmd_tx);

        let stats = self.task.await.context("session task failed")?;
        let mut rest = Vec::new();
        while let Some(msg) = self.out_rx.recv().await {
            rest.push(msg);
        }
        Ok((stats, rest))
    }
}
