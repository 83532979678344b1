//! Session loop: drives one [`MatchEngine`] from inbound commands.
//!
//! The loop owns the engine. While the engine is judging, a playback deadline
//! runs alongside the inbound channel; if no `playback_done` arrives before it
//! expires, the latch is released as if playback had finished.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::core::{BoardLayout, ClickResult, EngineConfig, Grid, MatchEngine, MatchStats};
use crate::protocol::{parse_message, ErrorCode, InboundMessage, OutboundBody, OutboundMessage};
use crate::types::{
    CellId, EngineState, Orientation, DEFAULT_BASE_HEIGHT, DEFAULT_BASE_WIDTH,
    DEFAULT_PLAYBACK_TIMEOUT_MS,
};

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub layout: BoardLayout,
    pub seed: u32,
    pub engine: EngineConfig,
    /// `None` waits for `playback_done` indefinitely.
    pub playback_timeout: Option<Duration>,
    /// Capacity of the inbound command channel
    pub max_pending: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            layout: BoardLayout::default(),
            seed: 1,
            engine: EngineConfig::default(),
            playback_timeout: Some(Duration::from_millis(DEFAULT_PLAYBACK_TIMEOUT_MS)),
            max_pending: 32,
        }
    }
}

impl SessionConfig {
    /// Load from environment variables, falling back to defaults for anything
    /// missing or unparsable.
    pub fn from_env() -> Self {
        use std::env;

        let base_width = env::var("TILE_MATCH_BASE_WIDTH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_BASE_WIDTH);
        let base_height = env::var("TILE_MATCH_BASE_HEIGHT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_BASE_HEIGHT);
        let orientation = env::var("TILE_MATCH_ORIENTATION")
            .ok()
            .and_then(|s| Orientation::from_str(s.trim()))
            .unwrap_or_default();

        let seed = env::var("TILE_MATCH_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);

        let await_playback = env::var("TILE_MATCH_AWAIT_PLAYBACK")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let timeout_ms = env::var("TILE_MATCH_PLAYBACK_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_PLAYBACK_TIMEOUT_MS);

        let max_pending = env::var("TILE_MATCH_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(32);

        Self {
            layout: BoardLayout::new(base_width, base_height, orientation),
            seed,
            engine: EngineConfig { await_playback },
            playback_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            max_pending,
        }
    }

    /// Build a seeded engine sized for the configured layout.
    pub fn build_engine(&self) -> Result<MatchEngine> {
        let (width, height) = self.layout.dimensions();
        let grid = Grid::seeded(width, height, self.seed)
            .with_context(|| format!("cannot build a {width}x{height} board"))?;
        Ok(MatchEngine::new(grid, self.engine))
    }
}

/// Command delivered to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCommand {
    Message(InboundMessage),
    /// A line that did not parse; answered with an `invalid_message` error.
    Malformed(String),
}

impl InboundCommand {
    pub fn from_line(line: &str) -> Self {
        match parse_message(line) {
            Ok(msg) => InboundCommand::Message(msg),
            Err(err) => InboundCommand::Malformed(err.to_string()),
        }
    }
}

impl From<InboundMessage> for InboundCommand {
    fn from(msg: InboundMessage) -> Self {
        InboundCommand::Message(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Engine plus the bookkeeping needed to talk to one driver.
pub struct Session {
    engine: MatchEngine,
    layout: BoardLayout,
    playback_timeout: Option<Duration>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    seq: u64,
    playback_deadline: Option<Instant>,
}

impl Session {
    pub fn new(
        engine: MatchEngine,
        layout: BoardLayout,
        playback_timeout: Option<Duration>,
        out_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Self {
        Self {
            engine,
            layout,
            playback_timeout,
            out_tx,
            seq: 0,
            playback_deadline: None,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Process commands until `quit`, channel close, or the driver stops
    /// listening. Returns the final match totals.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<InboundCommand>) -> MatchStats {
        info!(
            width = self.engine.grid().width(),
            height = self.engine.grid().height(),
            "session started"
        );

        loop {
            let next = match self.playback_deadline {
                Some(deadline) => tokio::select! {
                    cmd = cmd_rx.recv() => cmd,
                    _ = sleep_until(deadline) => {
                        warn!("playback acknowledgement timed out, releasing input");
                        self.engine.playback_complete();
                        self.flush_events();
                        continue;
                    }
                },
                None => cmd_rx.recv().await,
            };

            let Some(cmd) = next else {
                debug!("command channel closed");
                break;
            };
            if self.handle(cmd) == Flow::Quit || self.out_tx.is_closed() {
                break;
            }
        }

        let stats = self.engine.stats();
        info!(
            matches = stats.matches,
            misses = stats.misses,
            cells_cleared = stats.cells_cleared,
            "session finished"
        );
        stats
    }

    fn handle(&mut self, cmd: InboundCommand) -> Flow {
        let msg = match cmd {
            InboundCommand::Message(msg) => msg,
            InboundCommand::Malformed(reason) => {
                self.send(OutboundBody::error(ErrorCode::InvalidMessage, reason));
                return Flow::Continue;
            }
        };

        let flow = match msg {
            InboundMessage::Click { id } => {
                let result = self.engine.on_cell_clicked(CellId(id));
                self.report_click(result);
                Flow::Continue
            }
            InboundMessage::ClickAt { x, y } => {
                let result = self.engine.click_at(x, y);
                self.report_click(result);
                Flow::Continue
            }
            InboundMessage::PlaybackDone => {
                if !self.engine.playback_complete() {
                    debug!("playback_done with no judgment pending");
                }
                Flow::Continue
            }
            InboundMessage::Reset => {
                self.engine.reset();
                Flow::Continue
            }
            InboundMessage::Resize { width, height } => {
                match self.engine.rebuild(width, height) {
                    Ok(()) => self.layout.set_dimensions(width, height),
                    Err(err) => self.send_engine_error(&err),
                }
                Flow::Continue
            }
            InboundMessage::Orientation { orientation } => {
                self.change_orientation(&orientation);
                Flow::Continue
            }
            InboundMessage::Snapshot => {
                let body = OutboundBody::snapshot(
                    &self.engine.snapshot(),
                    self.layout.orientation().as_str(),
                );
                self.flush_events();
                self.send(body);
                Flow::Continue
            }
            InboundMessage::Quit => Flow::Quit,
        };

        self.flush_events();
        self.update_deadline();
        flow
    }

    fn report_click(&mut self, result: crate::core::Result<ClickResult>) {
        match result {
            Ok(ClickResult::Ignored(reason)) => {
                self.flush_events();
                self.send(OutboundBody::ignored(reason));
            }
            Ok(_) => {}
            Err(err) => self.send_engine_error(&err),
        }
    }

    fn change_orientation(&mut self, name: &str) {
        let Some(orientation) = Orientation::from_str(name) else {
            self.send(OutboundBody::error(
                ErrorCode::InvalidOrientation,
                format!("unknown orientation '{name}'"),
            ));
            return;
        };
        let Some((width, height)) = self.layout.set_orientation(orientation) else {
            return;
        };
        if let Err(err) = self.engine.rebuild(width, height) {
            self.send_engine_error(&err);
        }
    }

    fn update_deadline(&mut self) {
        if self.engine.state() != EngineState::Judging {
            self.playback_deadline = None;
        } else if self.playback_deadline.is_none() {
            self.playback_deadline = self.playback_timeout.map(|t| Instant::now() + t);
        }
    }

    fn flush_events(&mut self) {
        let bodies: Vec<OutboundBody> = self
            .engine
            .drain_events()
            .map(|event| OutboundBody::from(&event))
            .collect();
        for body in bodies {
            self.send(body);
        }
        if self.engine.state() != EngineState::Judging {
            self.playback_deadline = None;
        }
    }

    fn send_engine_error(&mut self, err: &crate::core::Error) {
        self.flush_events();
        self.send(OutboundBody::error(ErrorCode::from(err), err.to_string()));
    }

    fn send(&mut self, body: OutboundBody) {
        self.seq += 1;
        if self.out_tx.send(OutboundMessage::new(self.seq, body)).is_err() {
            debug!("outbound receiver dropped");
        }
    }
}

/// Run a session to completion on the current task.
pub async fn run_session(
    engine: MatchEngine,
    layout: BoardLayout,
    playback_timeout: Option<Duration>,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) -> MatchStats {
    Session::new(engine, layout, playback_timeout, out_tx)
        .run(cmd_rx)
        .await
}
