//! Adapter module - drive a board over a line-delimited JSON protocol
//!
//! The core engine is synchronous and knows nothing about timing. This crate
//! wraps it in a tokio task that reads commands from a channel, writes engine
//! events back out as JSON lines, and enforces the playback timeout.
//!
//! # Message Types
//!
//! ## Driver → Session
//!
//! - **click** `{id}` / **click_at** `{x, y}`: select or deselect a cell
//! - **playback_done**: the renderer finished animating the last judgment
//! - **reset**: clear the selection and release the latch
//! - **resize** `{width, height}` / **orientation** `{orientation}`: rebuild the board
//! - **snapshot**: request the full board state
//! - **quit**: end the session
//!
//! ## Session → Driver
//!
//! - **selected**, **deselected**: selection changes
//! - **outcome**: a judged triple, `result` is `success` or `failure`
//! - **cascade**: removed, moved and spawned cells after a match
//! - **awaiting_playback**, **ready**: the input latch closing and opening
//! - **rebuilt**: the board was reinitialized
//! - **ignored**: a click was dropped (`busy`, `selection_full`, `empty_slot`)
//! - **snapshot**, **error**
//!
//! # Environment Variables
//!
//! - `TILE_MATCH_BASE_WIDTH` / `TILE_MATCH_BASE_HEIGHT`: portrait size (default 8 × 10)
//! - `TILE_MATCH_ORIENTATION`: `portrait` or `landscape`
//! - `TILE_MATCH_SEED`: generator seed (default 1)
//! - `TILE_MATCH_AWAIT_PLAYBACK`: `0` releases the latch immediately after judging
//! - `TILE_MATCH_PLAYBACK_TIMEOUT_MS`: default 1000, `0` waits forever
//! - `TILE_MATCH_MAX_PENDING`: inbound channel capacity (default 32)
//!
//! # Example Protocol Flow
//!
//! ```text
//! -> {"type":"click_at","x":0,"y":0}
//! <- {"seq":1,"ts":1700000000000,"type":"selected","cell":{"id":0,"x":0,"y":0,"kind":"red_star"}}
//! -> {"type":"click_at","x":0,"y":0}
//! <- {"seq":2,"ts":1700000000001,"type":"deselected","id":0}
//! ```

pub mod protocol;
pub mod runtime;
pub mod session;

pub use tile_match_core as core;
pub use tile_match_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::SessionHandle;
pub use session::{run_session, InboundCommand, Session, SessionConfig};
