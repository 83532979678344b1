//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (grid logic, selection engine, wire protocol).
//!
//! # Board Geometry
//!
//! Boards are `width × height` slots addressed as `(x, y)`:
//!
//! - **x**: column, `0..width`, left to right
//! - **y**: row, `0..height`, top to bottom (row 0 is the top)
//!
//! The default layout is 8 columns by 10 rows in portrait orientation; landscape
//! swaps the two dimensions.
//!
//! # Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CELL_TYPE_COUNT` | 10 | Number of distinct cell kinds |
//! | `MATCH_SIZE` | 3 | Cells per selection judgment |
//! | `DEFAULT_BASE_WIDTH` | 8 | Portrait board width |
//! | `DEFAULT_BASE_HEIGHT` | 10 | Portrait board height |
//! | `DEFAULT_PLAYBACK_TIMEOUT_MS` | 1000 | Post-judgment playback window |
//! | `MAX_CELLS` | 65536 | Upper bound on `width * height` |
//!
//! # Examples
//!
//! ```
//! use tile_match_types::{CellType, Orientation, CELL_TYPE_COUNT};
//!
//! // Parse from string (case-insensitive)
//! let kind = CellType::from_str("blue_diamond").unwrap();
//! assert_eq!(kind, CellType::BlueDiamond);
//! assert_eq!(kind.index(), 1);
//!
//! // Stable indices cover the whole closed set
//! assert_eq!(CellType::ALL.len(), CELL_TYPE_COUNT);
//! assert_eq!(CellType::from_index(9), Some(CellType::GraySpiral));
//!
//! // Orientation swaps the base dimensions
//! assert_eq!(Orientation::Portrait.dimensions(8, 10), (8, 10));
//! assert_eq!(Orientation::Landscape.dimensions(8, 10), (10, 8));
//! ```

use std::fmt;

/// Number of distinct cell kinds (10)
pub const CELL_TYPE_COUNT: usize = 10;

/// Number of cells a selection must hold before it is judged (3)
pub const MATCH_SIZE: usize = 3;

/// Board width in portrait orientation (8 columns)
pub const DEFAULT_BASE_WIDTH: u16 = 8;

/// Board height in portrait orientation (10 rows)
pub const DEFAULT_BASE_HEIGHT: u16 = 10;

/// How long a judged triple may hold the input latch before playback is
/// considered finished without an explicit acknowledgement.
pub const DEFAULT_PLAYBACK_TIMEOUT_MS: u64 = 1000;

/// Largest board a grid will build, counted in slots (`width * height`)
pub const MAX_CELLS: usize = 65_536;


/// The ten cell kinds
///
/// Kinds only carry equality; there is no ordering between them beyond the
/// stable index used for serialization and random generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    RedStar,
    BlueDiamond,
    GreenHeart,
    YellowCircle,
    PurpleTriangle,
    OrangeSquare,
    PinkHexagon,
    CyanPentagon,
    BrownClover,
    GraySpiral,
}

impl CellType {
    /// Every kind, in index order.
    pub const ALL: [CellType; CELL_TYPE_COUNT] = [
        CellType::RedStar,
        CellType::BlueDiamond,
        CellType::GreenHeart,
        CellType::YellowCircle,
        CellType::PurpleTriangle,
        CellType::OrangeSquare,
        CellType::PinkHexagon,
        CellType::CyanPentagon,
        CellType::BrownClover,
        CellType::GraySpiral,
    ];

    /// Stable index in `0..CELL_TYPE_COUNT`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Kind for a stable index, `None` past the end of the set
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse kind from string
    ///
    /// Accepts the snake_case name (case-insensitive) or the decimal index.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_match_types::CellType;
    ///
    /// assert_eq!(CellType::from_str("RED_STAR"), Some(CellType::RedStar));
    /// assert_eq!(CellType::from_str("7"), Some(CellType::CyanPentagon));
    /// assert_eq!(CellType::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    /// Convert to snake_case string for the wire protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::RedStar => "red_star",
            CellType::BlueDiamond => "blue_diamond",
            CellType::GreenHeart => "green_heart",
            CellType::YellowCircle => "yellow_circle",
            CellType::PurpleTriangle => "purple_triangle",
            CellType::OrangeSquare => "orange_square",
            CellType::PinkHexagon => "pink_hexagon",
            CellType::CyanPentagon => "cyan_pentagon",
            CellType::BrownClover => "brown_clover",
            CellType::GraySpiral => "gray_spiral",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a cell, unique for as long as the cell lives on a grid.
///
/// Identities are never reused by the grid that issued them, including across
/// resizes, so a stale id can never alias a newer cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell on the board
///
/// `x`/`y` always mirror the slot the owning grid stores the cell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub id: CellId,
    pub x: u16,
    pub y: u16,
    pub kind: CellType,
}

impl Cell {
    pub fn new(id: CellId, x: u16, y: u16, kind: CellType) -> Self {
        Self { id, x, y, kind }
    }
}

/// Board orientation as reported by the layout collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Logical `(width, height)` for base portrait dimensions.
    ///
    /// Portrait keeps the base dimensions, landscape swaps them.
    pub fn dimensions(&self, base_width: u16, base_height: u16) -> (u16, u16) {
        match self {
            Orientation::Portrait => (base_width, base_height),
            Orientation::Landscape => (base_height, base_width),
        }
    }

    /// Parse orientation from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "portrait" | "p", "landscape" | "l"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "portrait" | "p" => Some(Orientation::Portrait),
            "landscape" | "l" => Some(Orientation::Landscape),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Selection engine state
///
/// - **Idle**: nothing selected, accepting clicks
/// - **Selecting**: one or two cells selected, accepting clicks
/// - **Judging**: a triple has been judged and its playback has not finished; clicks are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Selecting,
    Judging,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Selecting => "selecting",
            EngineState::Judging => "judging",
        }
    }

    /// Whether a click would be considered at all.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, EngineState::Judging)
    }
}

/// Result of judging a full selection
///
/// Cells are recorded as they were at judgment time, in click order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    Success {
        kind: CellType,
        cells: [Cell; MATCH_SIZE],
    },
    Failure {
        cells: [Cell; MATCH_SIZE],
    },
}

impl MatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MatchOutcome::Success { .. })
    }

    pub fn cells(&self) -> &[Cell; MATCH_SIZE] {
        match self {
            MatchOutcome::Success { cells, .. } | MatchOutcome::Failure { cells } => cells,
        }
    }

    /// The matched kind, `None` for a miss
    pub fn kind(&self) -> Option<CellType> {
        match self {
            MatchOutcome::Success { kind, .. } => Some(*kind),
            MatchOutcome::Failure { .. } => None,
        }
    }
}

/// A surviving cell that slid down its column during a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellMove {
    pub id: CellId,
    pub x: u16,
    pub from_y: u16,
    pub to_y: u16,
}

/// Everything a cascade changed, for the rendering collaborator.
///
/// - `removed`: cells taken off the board, with their last coordinates
/// - `moved`: survivors shifted down, grouped by column, bottom-most first
/// - `spawned`: new cells with final coordinates, grouped by column, top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub removed: Vec<Cell>,
    pub moved: Vec<CellMove>,
    pub spawned: Vec<Cell>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.moved.is_empty() && self.spawned.is_empty()
    }

    /// Sorted, de-duplicated columns the cascade touched.
    pub fn columns(&self) -> Vec<u16> {
        let mut cols: Vec<u16> = self.removed.iter().map(|c| c.x).collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }
}
