//! Core board logic module - pure, deterministic, and testable
//!
//! This crate contains the tile-matching rules: the grid that owns every cell and
//! the selection engine that turns clicks into matches and cascades. It has
//! **no dependencies** on rendering, animation timing, or I/O, making it:
//!
//! - **Deterministic**: the same seed produces the same board and the same refills
//! - **Testable**: every rule is reachable through plain method calls
//! - **Portable**: runs under any front end (terminal, GUI, headless driver)
//!
//! # Module Structure
//!
//! - [`grid`]: `width × height` board with removal, column compaction and refill
//! - [`engine`]: selection state machine, triple judgment and the playback latch
//! - [`rng`]: cell type generators (seeded uniform, scripted, closures)
//! - [`layout`]: orientation-dependent board dimensions
//! - [`snapshot`]: owned copies of grid/engine state for observers
//!
//! # Rules
//!
//! - Clicking a cell selects it; clicking it again deselects it
//! - The third distinct selection is judged at once: three equal kinds match
//! - A match removes the three cells; each affected column falls and is refilled
//!   from the top with freshly generated cells
//! - A miss only clears the selection
//! - While a judgment plays back, clicks are dropped
//! - Refills never look ahead, so a cascade can leave a ready-made match behind
//!
//! # Example
//!
//! ```
//! use tile_match_core::{ClickResult, EngineConfig, Grid, MatchEngine};
//! use tile_match_core::rng::CycleTypes;
//! use tile_match_core::types::{CellType, EngineState};
//!
//! let grid = Grid::from_layout(
//!     &[[CellType::RedStar, CellType::RedStar, CellType::RedStar]],
//!     CycleTypes::constant(CellType::GreenHeart),
//! )
//! .unwrap();
//! let mut engine = MatchEngine::new(grid, EngineConfig::default());
//!
//! engine.click_at(0, 0).unwrap();
//! engine.click_at(1, 0).unwrap();
//! let result = engine.click_at(2, 0).unwrap();
//! assert!(matches!(result, ClickResult::Judged(outcome) if outcome.is_success()));
//!
//! // Input stays locked until the renderer reports playback finished.
//! assert_eq!(engine.state(), EngineState::Judging);
//! engine.playback_complete();
//! assert_eq!(engine.state(), EngineState::Idle);
//!
//! // The matched row was refilled from the generator.
//! assert!(engine.grid().iter().all(|cell| cell.kind == CellType::GreenHeart));
//! ```

pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod rng;
pub mod snapshot;

pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use engine::{judge_triple, ClickResult, EngineConfig, EngineEvent, IgnoreReason, MatchEngine};
pub use error::{Error, Result};
pub use grid::Grid;
pub use layout::BoardLayout;
pub use rng::{CycleTypes, SimpleRng, TypeGenerator, UniformTypes};
pub use snapshot::{EngineSnapshot, GridSnapshot, MatchStats};
