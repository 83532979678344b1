//! Selection & match engine - manages the click-driven selection state
//!
//! The engine owns the [`Grid`] it plays on and is the only thing that mutates the
//! selection. Clicks accumulate up to three distinct cells; the third one is judged
//! on the spot:
//!
//! - **Success** (all three kinds equal): the cells are removed and their columns
//!   cascade.
//! - **Failure**: the cells are deselected and the board is left alone.
//!
//! After a judgment the engine stays in [`EngineState::Judging`] until the rendering
//! side calls [`MatchEngine::playback_complete`] (or [`MatchEngine::reset`]). Clicks
//! arriving in that window are dropped, not queued. With
//! [`EngineConfig::await_playback`] turned off the engine returns to `Idle` as soon
//! as the judgment is resolved.
//!
//! Everything the renderer needs is queued as [`EngineEvent`]s and handed out by
//! [`MatchEngine::drain_events`], in emission order.

use arrayvec::ArrayVec;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rng::TypeGenerator;
use crate::snapshot::{EngineSnapshot, MatchStats};
use crate::types::{CascadeReport, Cell, CellId, EngineState, MatchOutcome, MATCH_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineConfig {
    /// Hold the input latch after a judgment until playback is acknowledged.
    pub await_playback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            await_playback: true,
        }
    }
}

/// Why a click did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// A judged triple is still playing back
    Busy,
    /// Three cells are already selected
    SelectionFull,
    /// The clicked slot holds no cell
    EmptySlot,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Busy => "busy",
            IgnoreReason::SelectionFull => "selection_full",
            IgnoreReason::EmptySlot => "empty_slot",
        }
    }
}

/// What a single click did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickResult {
    Ignored(IgnoreReason),
    /// Added to the selection; `count` is the new selection size
    Selected { id: CellId, count: usize },
    /// Clicked again while selected, so removed from the selection
    Deselected { id: CellId, count: usize },
    /// Completed a triple, which was judged
    Judged(MatchOutcome),
}

/// Directive for the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Show the cell as selected
    Selected(Cell),
    /// Show the cell as not selected
    Deselected(CellId),
    /// A triple was judged
    Outcome(MatchOutcome),
    /// Board changes caused by a successful match
    Cascade(CascadeReport),
    /// Input is locked until playback is acknowledged
    AwaitingPlayback,
    /// Input is accepted again after a held judgment
    Ready,
    /// The board was discarded and refilled
    Rebuilt { width: u16, height: u16 },
}

/// The selection state machine, bound to the grid it plays on.
#[derive(Debug)]
pub struct MatchEngine {
    grid: Grid,
    /// Selected cells in click order
    selection: ArrayVec<CellId, MATCH_SIZE>,
    /// Held from judgment until playback completes
    judging: bool,
    config: EngineConfig,
    events: Vec<EngineEvent>,
    stats: MatchStats,
}

impl MatchEngine {
    pub fn new(grid: Grid, config: EngineConfig) -> Self {
        Self {
            grid,
            selection: ArrayVec::new(),
            judging: false,
            config,
            events: Vec::new(),
            stats: MatchStats::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        if self.judging {
            EngineState::Judging
        } else if self.selection.is_empty() {
            EngineState::Idle
        } else {
            EngineState::Selecting
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Selected cells in click order
    pub fn selection(&self) -> &[CellId] {
        &self.selection
    }

    pub fn is_selected(&self, id: CellId) -> bool {
        self.selection.contains(&id)
    }

    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Handle a click on the cell `id`.
    ///
    /// Clicking a selected cell deselects it. The click that completes a triple
    /// judges it immediately. `id` must name a cell currently on the grid.
    pub fn on_cell_clicked(&mut self, id: CellId) -> Result<ClickResult> {
        if self.judging {
            debug!(cell = %id, "judging in progress, ignoring click");
            return Ok(ClickResult::Ignored(IgnoreReason::Busy));
        }

        let Some(cell) = self.grid.find(id).copied() else {
            warn!(cell = %id, "click on a cell that is not on the board");
            return Err(Error::UnknownCell(id));
        };

        if let Some(pos) = self.selection.iter().position(|selected| *selected == id) {
            self.selection.remove(pos);
            self.events.push(EngineEvent::Deselected(id));
            debug!(cell = %id, selected = self.selection.len(), "cell deselected");
            return Ok(ClickResult::Deselected {
                id,
                count: self.selection.len(),
            });
        }

        if self.selection.is_full() {
            return Ok(ClickResult::Ignored(IgnoreReason::SelectionFull));
        }

        self.selection.push(id);
        self.events.push(EngineEvent::Selected(cell));
        debug!(
            cell = %id,
            x = cell.x,
            y = cell.y,
            kind = %cell.kind,
            selected = self.selection.len(),
            "cell selected"
        );

        // `into_inner` only succeeds once the selection is full.
        match self.selection.clone().into_inner() {
            Ok(triple) => self.judge(triple).map(ClickResult::Judged),
            Err(_) => Ok(ClickResult::Selected {
                id,
                count: self.selection.len(),
            }),
        }
    }

    /// Handle a click on the slot at (x, y).
    pub fn click_at(&mut self, x: u16, y: u16) -> Result<ClickResult> {
        if self.judging {
            return Ok(ClickResult::Ignored(IgnoreReason::Busy));
        }
        match self.grid.cell_at(x, y)? {
            Some(cell) => {
                let id = cell.id;
                self.on_cell_clicked(id)
            }
            None => Ok(ClickResult::Ignored(IgnoreReason::EmptySlot)),
        }
    }

    fn judge(&mut self, triple: [CellId; MATCH_SIZE]) -> Result<MatchOutcome> {
        self.judging = true;
        self.selection.clear();

        let cells = match self.resolve(triple) {
            Ok(cells) => cells,
            Err(err) => {
                self.judging = false;
                warn!(error = %err, "selection out of sync with the board");
                return Err(err);
            }
        };

        let outcome = judge_triple(&cells);
        self.events.push(EngineEvent::Outcome(outcome));

        match outcome {
            MatchOutcome::Success { kind, .. } => {
                let report = match self.grid.remove_and_cascade(&triple) {
                    Ok(report) => report,
                    Err(err) => {
                        self.judging = false;
                        return Err(err);
                    }
                };
                info!(kind = %kind, columns = ?report.columns(), "match");
                self.stats.matches += 1;
                self.stats.cells_cleared += report.removed.len() as u32;
                self.events.push(EngineEvent::Cascade(report));
            }
            MatchOutcome::Failure { cells } => {
                info!(kinds = ?cells.map(|c| c.kind), "miss");
                self.stats.misses += 1;
                self.events
                    .extend(triple.iter().map(|id| EngineEvent::Deselected(*id)));
            }
        }

        if self.config.await_playback {
            self.events.push(EngineEvent::AwaitingPlayback);
        } else {
            self.judging = false;
        }

        Ok(outcome)
    }

    fn resolve(&self, triple: [CellId; MATCH_SIZE]) -> Result<[Cell; MATCH_SIZE]> {
        let [a, b, c] = triple.map(|id| self.grid.find(id).copied().ok_or(Error::UnknownCell(id)));
        Ok([a?, b?, c?])
    }

    /// Acknowledge that outcome/cascade playback finished.
    ///
    /// Returns `false` when no judgment was waiting.
    pub fn playback_complete(&mut self) -> bool {
        if !self.judging {
            debug!("playback acknowledgement with nothing pending");
            return false;
        }
        self.judging = false;
        self.events.push(EngineEvent::Ready);
        debug!("playback complete, accepting input");
        true
    }

    /// Drop the selection and release the latch, whatever the current state.
    pub fn reset(&mut self) {
        for id in self.selection.drain(..) {
            self.events.push(EngineEvent::Deselected(id));
        }
        if std::mem::take(&mut self.judging) {
            self.events.push(EngineEvent::Ready);
        }
        debug!("selection reset");
    }

    /// Replace the board with a fresh `width × height` one from `generator`.
    ///
    /// The selection is reset on success; on error nothing changes.
    pub fn resize(
        &mut self,
        width: u16,
        height: u16,
        generator: impl TypeGenerator + 'static,
    ) -> Result<()> {
        self.grid.resize(width, height, generator)?;
        self.after_rebuild();
        Ok(())
    }

    /// Like [`resize`](Self::resize) but keeps the grid's generator.
    pub fn rebuild(&mut self, width: u16, height: u16) -> Result<()> {
        self.grid.rebuild(width, height)?;
        self.after_rebuild();
        Ok(())
    }

    fn after_rebuild(&mut self) {
        self.reset();
        self.events.push(EngineEvent::Rebuilt {
            width: self.grid.width(),
            height: self.grid.height(),
        });
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state(),
            selection: self.selection.to_vec(),
            grid: self.grid.snapshot(),
            stats: self.stats,
        }
    }
}

/// Judge a full selection.
///
/// Pure equality against the first cell's kind; order does not matter.
pub fn judge_triple(cells: &[Cell; MATCH_SIZE]) -> MatchOutcome {
    let kind = cells[0].kind;
    if cells.iter().all(|cell| cell.kind == kind) {
        MatchOutcome::Success {
            kind,
            cells: *cells,
        }
    } else {
        MatchOutcome::Failure { cells: *cells }
    }
}
