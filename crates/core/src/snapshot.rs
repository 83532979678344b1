use crate::types::{Cell, CellId, CellType, EngineState};

/// Owned copy of a grid, detached from the live board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridSnapshot {
    pub width: u16,
    pub height: u16,
    /// Occupied cells in row-major order
    pub cells: Vec<Cell>,
}

impl GridSnapshot {
    pub fn cell_at(&self, x: u16, y: u16) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.x == x && cell.y == y)
    }

    /// Kinds by row, top row first; `None` marks an empty slot.
    pub fn rows(&self) -> Vec<Vec<Option<CellType>>> {
        let mut rows = vec![vec![None; self.width as usize]; self.height as usize];
        for cell in &self.cells {
            rows[cell.y as usize][cell.x as usize] = Some(cell.kind);
        }
        rows
    }
}

/// Running totals kept by the selection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchStats {
    /// Successful triples
    pub matches: u32,
    /// Judged triples that did not match
    pub misses: u32,
    /// Cells removed by cascades
    pub cells_cleared: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineSnapshot {
    pub state: EngineState,
    /// Selected cells in click order
    pub selection: Vec<CellId>,
    pub grid: GridSnapshot,
    pub stats: MatchStats,
}

impl EngineSnapshot {
    pub fn accepts_input(&self) -> bool {
        self.state.accepts_input()
    }
}
