//! RNG module - cell type generation
//!
//! Every cell placed on a grid gets its kind from a [`TypeGenerator`]. The default
//! generator draws uniformly over the ten kinds from a seeded LCG, so the same
//! seed always produces the same board and the same refills.
//!
//! Closures `FnMut() -> CellType` are generators too, and [`CycleTypes`] replays a
//! fixed script for deterministic boards.

use crate::types::{CellType, CELL_TYPE_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales the full word instead of taking `% max`; the low bits of an LCG
    /// have very short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current state (reseeding with it continues the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Source of kinds for newly created cells.
///
/// `Send` so a grid (and the engine owning it) can move into a session task.
pub trait TypeGenerator: Send {
    fn next_type(&mut self) -> CellType;
}

impl<F> TypeGenerator for F
where
    F: FnMut() -> CellType + Send,
{
    fn next_type(&mut self) -> CellType {
        self()
    }
}

/// Uniform draw over all ten kinds.
#[derive(Debug, Clone)]
pub struct UniformTypes {
    rng: SimpleRng,
}

impl UniformTypes {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Seed that reproduces the remaining sequence
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for UniformTypes {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TypeGenerator for UniformTypes {
    fn next_type(&mut self) -> CellType {
        let index = self.rng.next_range(CELL_TYPE_COUNT as u32) as usize;
        CellType::ALL[index]
    }
}

/// Replays a fixed sequence of kinds, wrapping around at the end.
///
/// An empty script yields [`CellType::RedStar`] forever.
#[derive(Debug, Clone)]
pub struct CycleTypes {
    script: Vec<CellType>,
    next: usize,
}

impl CycleTypes {
    pub fn new(script: impl Into<Vec<CellType>>) -> Self {
        Self {
            script: script.into(),
            next: 0,
        }
    }

    /// Generator that always yields the same kind.
    pub fn constant(kind: CellType) -> Self {
        Self::new(vec![kind])
    }
}

impl TypeGenerator for CycleTypes {
    fn next_type(&mut self) -> CellType {
        if self.script.is_empty() {
            return CellType::RedStar;
        }
        let kind = self.script[self.next % self.script.len()];
        self.next = (self.next + 1) % self.script.len();
        kind
    }
}
