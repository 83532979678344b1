//! Error kinds surfaced by the grid and the selection engine.
//!
//! Ignored clicks (busy engine, full selection) are not errors; they are reported
//! through [`ClickResult::Ignored`](crate::engine::ClickResult::Ignored).

use thiserror::Error;

use crate::types::CellId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A board needs at least one column and one row.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },

    #[error("({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },

    /// The cell is not on the grid; the caller and the grid disagree about board state.
    #[error("cell {0} is not on the board")]
    UnknownCell(CellId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
