//! Hardware plane slots and tile-buffer configuration.

use embedded_graphics::prelude::Size;

use crate::map::MapError;
use crate::tile::TILE_SIZE;

/// The two background plane slots a map can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    A,
    B,
}

/// Largest tile-buffer edge supported; bounds the scroller's strip storage.
pub const MAX_PLANE_TILES: u32 = 128;

/// Dimensions of a plane's tile buffer and of the visible viewport.
///
/// The tile buffer is a small ring reused toroidally in both axes, so its
/// dimensions must be powers of two. The viewport is given in pixels; one
/// extra tile per axis is streamed so the partially exposed edge tile is
/// present while scrolled mid-tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneConfig {
    /// Tile buffer width in tiles.
    pub width: u32,
    /// Tile buffer height in tiles.
    pub height: u32,
    /// Visible viewport in pixels.
    pub view: Size,
}

impl PlaneConfig {
    pub const fn new(width: u32, height: u32, view: Size) -> PlaneConfig {
        PlaneConfig {
            width,
            height,
            view,
        }
    }

    /// Width of the streamed window in tiles.
    pub fn view_cols(&self) -> u32 {
        self.view.width / TILE_SIZE + 1
    }

    /// Height of the streamed window in tiles.
    pub fn view_rows(&self) -> u32 {
        self.view.height / TILE_SIZE + 1
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if !self.width.is_power_of_two() || !self.height.is_power_of_two() {
            return Err(MapError::PlaneSizeNotPowerOfTwo {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_PLANE_TILES || self.height > MAX_PLANE_TILES {
            return Err(MapError::PlaneTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.view.width == 0
            || self.view.height == 0
            || self.view_cols() > self.width
            || self.view_rows() > self.height
        {
            return Err(MapError::ViewportTooLarge {
                view_width: self.view.width,
                view_height: self.view.height,
            });
        }
        Ok(())
    }
}
