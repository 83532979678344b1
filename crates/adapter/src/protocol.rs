//! Protocol message definitions
//!
//! Line-delimited JSON. Every inbound object carries a `type` tag; every
//! outbound object carries `type`, a session-local `seq` and a millisecond `ts`.

use serde::{Deserialize, Serialize};

use crate::core::{EngineEvent, EngineSnapshot, Error as CoreError, IgnoreReason, MatchStats};
use crate::types::{Cell, CellMove, CascadeReport, MatchOutcome};

/// Messages accepted from the driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "click")]
    Click { id: u64 },
    #[serde(rename = "click_at")]
    ClickAt { x: u16, y: u16 },
    #[serde(rename = "playback_done")]
    PlaybackDone,
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "resize")]
    Resize { width: u16, height: u16 },
    #[serde(rename = "orientation")]
    Orientation { orientation: String },
    #[serde(rename = "snapshot")]
    Snapshot,
    #[serde(rename = "quit")]
    Quit,
}

/// Parse one inbound line.
pub fn parse_message(json: &str) -> Result<InboundMessage, serde_json::Error> {
    serde_json::from_str(json.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_message")]
    InvalidMessage,
    #[serde(rename = "invalid_orientation")]
    InvalidOrientation,
    #[serde(rename = "invalid_dimensions")]
    InvalidDimensions,
    #[serde(rename = "out_of_bounds")]
    OutOfBounds,
    #[serde(rename = "unknown_cell")]
    UnknownCell,
}

impl From<&CoreError> for ErrorCode {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::InvalidDimensions { .. } => ErrorCode::InvalidDimensions,
            CoreError::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            CoreError::UnknownCell(_) => ErrorCode::UnknownCell,
        }
    }
}

/// Wire view of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub id: u64,
    pub x: u16,
    pub y: u16,
    pub kind: &'static str,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            id: cell.id.0,
            x: cell.x,
            y: cell.y,
            kind: cell.kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveView {
    pub id: u64,
    pub x: u16,
    pub from_y: u16,
    pub to_y: u16,
}

impl From<&CellMove> for MoveView {
    fn from(mv: &CellMove) -> Self {
        Self {
            id: mv.id.0,
            x: mv.x,
            from_y: mv.from_y,
            to_y: mv.to_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failure")]
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub matches: u32,
    pub misses: u32,
    pub cells_cleared: u32,
}

impl From<MatchStats> for StatsView {
    fn from(stats: MatchStats) -> Self {
        Self {
            matches: stats.matches,
            misses: stats.misses,
            cells_cleared: stats.cells_cleared,
        }
    }
}

/// Payload of an outbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundBody {
    #[serde(rename = "selected")]
    Selected { cell: CellView },
    #[serde(rename = "deselected")]
    Deselected { id: u64 },
    #[serde(rename = "outcome")]
    Outcome {
        result: MatchResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<&'static str>,
        cells: Vec<CellView>,
    },
    #[serde(rename = "cascade")]
    Cascade {
        removed: Vec<CellView>,
        moved: Vec<MoveView>,
        spawned: Vec<CellView>,
    },
    #[serde(rename = "awaiting_playback")]
    AwaitingPlayback,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "rebuilt")]
    Rebuilt { width: u16, height: u16 },
    #[serde(rename = "ignored")]
    Ignored { reason: &'static str },
    #[serde(rename = "snapshot")]
    Snapshot {
        state: &'static str,
        orientation: &'static str,
        width: u16,
        height: u16,
        selection: Vec<u64>,
        cells: Vec<CellView>,
        stats: StatsView,
    },
    #[serde(rename = "error")]
    Error { code: ErrorCode, message: String },
}

impl OutboundBody {
    pub fn ignored(reason: IgnoreReason) -> Self {
        OutboundBody::Ignored {
            reason: reason.as_str(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        OutboundBody::Error {
            code,
            message: message.into(),
        }
    }

    pub fn outcome(outcome: &MatchOutcome) -> Self {
        let result = if outcome.is_success() {
            MatchResult::Success
        } else {
            MatchResult::Failure
        };
        OutboundBody::Outcome {
            result,
            kind: outcome.kind().map(|kind| kind.as_str()),
            cells: outcome.cells().iter().map(CellView::from).collect(),
        }
    }

    pub fn cascade(report: &CascadeReport) -> Self {
        OutboundBody::Cascade {
            removed: report.removed.iter().map(CellView::from).collect(),
            moved: report.moved.iter().map(MoveView::from).collect(),
            spawned: report.spawned.iter().map(CellView::from).collect(),
        }
    }

    pub fn snapshot(snapshot: &EngineSnapshot, orientation: &'static str) -> Self {
        OutboundBody::Snapshot {
            state: snapshot.state.as_str(),
            orientation,
            width: snapshot.grid.width,
            height: snapshot.grid.height,
            selection: snapshot.selection.iter().map(|id| id.0).collect(),
            cells: snapshot.grid.cells.iter().map(CellView::from).collect(),
            stats: snapshot.stats.into(),
        }
    }
}

impl From<&EngineEvent> for OutboundBody {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::Selected(cell) => OutboundBody::Selected { cell: cell.into() },
            EngineEvent::Deselected(id) => OutboundBody::Deselected { id: id.0 },
            EngineEvent::Outcome(outcome) => OutboundBody::outcome(outcome),
            EngineEvent::Cascade(report) => OutboundBody::cascade(report),
            EngineEvent::AwaitingPlayback => OutboundBody::AwaitingPlayback,
            EngineEvent::Ready => OutboundBody::Ready,
            EngineEvent::Rebuilt { width, height } => OutboundBody::Rebuilt {
                width: *width,
                height: *height,
            },
        }
    }
}

/// One outbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub seq: u64,
    pub ts: u64,
    #[serde(flatten)]
    pub body: OutboundBody,
}

impl OutboundMessage {
    pub fn new(seq: u64, body: OutboundBody) -> Self {
        Self {
            seq,
            ts: current_timestamp_ms(),
            body,
        }
    }

    /// Serialize as a single JSON line without the trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
