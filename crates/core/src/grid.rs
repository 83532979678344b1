//! Grid module - owns cell placement
//!
//! The grid is a `width × height` board where every slot holds at most one cell.
//! Uses a flat vector in row-major order (`y * width + x`), row 0 at the top.
//!
//! The grid is the only place cells are created, moved or destroyed. Callers refer
//! to cells by [`CellId`] and read them back through [`Grid::find`] or
//! [`Grid::cell_at`].

use std::fmt;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rng::{TypeGenerator, UniformTypes};
use crate::snapshot::GridSnapshot;
use crate::types::{CascadeReport, Cell, CellId, CellMove, CellType, MAX_CELLS};

/// The board - `width` columns x `height` rows, every slot filled between cascades
pub struct Grid {
    width: u16,
    height: u16,
    /// Flat array of slots, row-major order (y * width + x)
    slots: Vec<Option<Cell>>,
    /// Next identity to hand out; never rewound, not even by a resize
    next_id: u64,
    generator: Box<dyn TypeGenerator>,
}

impl Grid {
    /// Create a grid and fill every slot from `generator`.
    ///
    /// Slots are filled row by row from the top-left corner.
    pub fn new(width: u16, height: u16, generator: impl TypeGenerator + 'static) -> Result<Self> {
        check_dimensions(width, height)?;

        let mut grid = Self {
            width,
            height,
            slots: Vec::new(),
            next_id: 0,
            generator: Box::new(generator),
        };
        grid.fill();
        Ok(grid)
    }

    /// Create a grid with the default uniform generator.
    pub fn seeded(width: u16, height: u16, seed: u32) -> Result<Self> {
        Self::new(width, height, UniformTypes::new(seed))
    }

    /// Create a grid from explicit rows (top row first).
    ///
    /// `generator` is only consulted for refills after a cascade. Empty, ragged or
    /// oversized layouts are rejected with [`Error::InvalidDimensions`].
    pub fn from_layout<R>(rows: &[R], generator: impl TypeGenerator + 'static) -> Result<Self>
    where
        R: AsRef<[CellType]>,
    {
        let row_len = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let (Ok(height), Ok(width)) = (u16::try_from(rows.len()), u16::try_from(row_len)) else {
            return Err(Error::InvalidDimensions {
                width: u16::try_from(row_len).unwrap_or(u16::MAX),
                height: u16::try_from(rows.len()).unwrap_or(u16::MAX),
            });
        };
        check_dimensions(width, height)?;
        if rows.iter().any(|row| row.as_ref().len() != width as usize) {
            return Err(Error::InvalidDimensions { width, height });
        }

        let mut grid = Self {
            width,
            height,
            slots: Vec::with_capacity(width as usize * height as usize),
            next_id: 0,
            generator: Box::new(generator),
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, kind) in row.as_ref().iter().enumerate() {
                let id = grid.issue_id();
                grid.slots
                    .push(Some(Cell::new(id, x as u16, y as u16, *kind)));
            }
        }
        Ok(grid)
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    fn check_bounds(&self, x: u16, y: u16) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the cell at position (x, y)
    ///
    /// `Ok(None)` is an empty slot; coordinates off the board are an error.
    pub fn cell_at(&self, x: u16, y: u16) -> Result<Option<&Cell>> {
        self.check_bounds(x, y)?;
        Ok(self.slots[self.index(x, y)].as_ref())
    }

    /// Look up a live cell by identity
    pub fn find(&self, id: CellId) -> Option<&Cell> {
        self.iter().find(|cell| cell.id == id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.find(id).is_some()
    }

    /// Occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.slots.iter().flatten()
    }

    /// Slots of column `x`, top to bottom
    pub fn column(&self, x: u16) -> Result<impl Iterator<Item = Option<&Cell>> + '_> {
        self.check_bounds(x, 0)?;
        Ok((0..self.height).map(move |y| self.slots[self.index(x, y)].as_ref()))
    }

    /// Remove `ids`, let each touched column fall, and refill the gaps from the top.
    ///
    /// Every id is validated before anything changes, so an unknown id leaves the
    /// grid untouched. Repeated ids count once. Columns are handled independently:
    ///
    /// 1. the listed slots are emptied
    /// 2. survivors compact downward keeping their top-to-bottom order
    /// 3. the `k` vacated slots at the top get fresh cells at rows `0..k`
    pub fn remove_and_cascade(&mut self, ids: &[CellId]) -> Result<CascadeReport> {
        let mut targets: Vec<(u16, u16)> = Vec::with_capacity(ids.len());
        for &id in ids {
            let cell = self.find(id).ok_or(Error::UnknownCell(id))?;
            let pos = (cell.x, cell.y);
            if !targets.contains(&pos) {
                targets.push(pos);
            }
        }

        let mut columns: Vec<u16> = targets.iter().map(|&(x, _)| x).collect();
        columns.sort_unstable();
        columns.dedup();

        let mut report = CascadeReport::default();
        for &x in &columns {
            for &(_, y) in targets.iter().filter(|(tx, _)| *tx == x) {
                let idx = self.index(x, y);
                if let Some(cell) = self.slots[idx].take() {
                    report.removed.push(cell);
                }
            }

            let vacancies = self.compact_column(x, &mut report.moved);

            for y in 0..vacancies {
                let cell = self.spawn(x, y);
                report.spawned.push(cell);
            }
        }

        debug!(
            columns = ?columns,
            removed = report.removed.len(),
            moved = report.moved.len(),
            spawned = report.spawned.len(),
            "cascade resolved"
        );
        Ok(report)
    }

    /// Two-pointer compaction of one column, scanning bottom to top.
    ///
    /// Returns the number of empty slots left at the top of the column.
    fn compact_column(&mut self, x: u16, moves: &mut Vec<CellMove>) -> u16 {
        let mut write_y = self.height;

        for read_y in (0..self.height).rev() {
            let src = self.index(x, read_y);
            let Some(mut cell) = self.slots[src].take() else {
                continue;
            };

            write_y -= 1;
            if write_y != read_y {
                moves.push(CellMove {
                    id: cell.id,
                    x,
                    from_y: read_y,
                    to_y: write_y,
                });
                cell.y = write_y;
            }
            let dst = self.index(x, write_y);
            self.slots[dst] = Some(cell);
        }

        write_y
    }

    /// Discard every cell and refill a `width × height` board from `generator`.
    ///
    /// On error the grid keeps its current cells and generator.
    pub fn resize(
        &mut self,
        width: u16,
        height: u16,
        generator: impl TypeGenerator + 'static,
    ) -> Result<()> {
        check_dimensions(width, height)?;
        self.generator = Box::new(generator);
        self.reshape(width, height);
        Ok(())
    }

    /// Like [`resize`](Self::resize) but keeps the installed generator.
    pub fn rebuild(&mut self, width: u16, height: u16) -> Result<()> {
        check_dimensions(width, height)?;
        self.reshape(width, height);
        Ok(())
    }

    fn reshape(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.fill();
        info!(width, height, "board rebuilt");
    }

    fn fill(&mut self) {
        self.slots.clear();
        self.slots
            .resize(self.width as usize * self.height as usize, None);
        for y in 0..self.height {
            for x in 0..self.width {
                self.spawn(x, y);
            }
        }
    }

    fn issue_id(&mut self) -> CellId {
        let id = CellId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a fresh cell at (x, y), overwriting the slot.
    fn spawn(&mut self, x: u16, y: u16) -> Cell {
        let id = self.issue_id();
        let cell = Cell::new(id, x, y, self.generator.next_type());
        let idx = self.index(x, y);
        self.slots[idx] = Some(cell);
        cell
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            cells: self.iter().copied().collect(),
        }
    }
}

fn check_dimensions(width: u16, height: u16) -> Result<()> {
    if width == 0 || height == 0 || width as usize * height as usize > MAX_CELLS {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cells", &self.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
