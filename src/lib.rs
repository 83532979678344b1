//! Tile-matching puzzle board (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` as `tile_match::{core,adapter,types}`.

pub use tile_match_adapter as adapter;
pub use tile_match_core as core;
pub use tile_match_types as types;
