//! Logical board sizing.
//!
//! The layout collaborator only reports an [`Orientation`]; this module turns it
//! into grid dimensions. Portrait uses the base dimensions, landscape swaps them.

use tracing::info;

use crate::types::{Orientation, DEFAULT_BASE_HEIGHT, DEFAULT_BASE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardLayout {
    pub base_width: u16,
    pub base_height: u16,
    orientation: Orientation,
}

impl BoardLayout {
    pub fn new(base_width: u16, base_height: u16, orientation: Orientation) -> Self {
        Self {
            base_width,
            base_height,
            orientation,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Current `(width, height)`
    pub fn dimensions(&self) -> (u16, u16) {
        self.orientation
            .dimensions(self.base_width, self.base_height)
    }

    /// Record a new orientation.
    ///
    /// Returns the new dimensions when the orientation actually changed, `None`
    /// when the board can stay as it is.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Option<(u16, u16)> {
        if orientation == self.orientation {
            return None;
        }
        info!(
            from = self.orientation.as_str(),
            to = orientation.as_str(),
            "orientation changed"
        );
        self.orientation = orientation;
        Some(self.dimensions())
    }

    /// Adopt `(width, height)` as the current dimensions, keeping the orientation.
    ///
    /// The base dimensions are derived so that a later orientation change swaps
    /// from the new size.
    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        let (base_width, base_height) = self.orientation.dimensions(width, height);
        self.base_width = base_width;
        self.base_height = base_height;
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_WIDTH, DEFAULT_BASE_HEIGHT, Orientation::Portrait)
    }
}
