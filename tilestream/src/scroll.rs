//! Incremental viewport scrolling.
//!
//! The plane tile buffer is far smaller than the map and reused as a ring
//! in both axes, so moving the viewport only requires decoding the tile
//! columns and rows that just became visible and writing them at wrapped
//! buffer addresses; everything still resident from the previous window is
//! left untouched. A move of a whole window or more (and the very first
//! move) falls back to redrawing the full window. Per call the work is
//! bounded by the visible window size.

use embedded_graphics::prelude::Point;
use log::debug;

use crate::map::{Map, RectOrder};
use crate::plane::MAX_PLANE_TILES;
use crate::tile::{TileAttr, TILE_SIZE};
use crate::transfer::TransferQueue;

/// Strip decode buffer; plane edges are capped at `MAX_PLANE_TILES`.
const STRIP: usize = MAX_PLANE_TILES as usize;

impl<'a> Map<'a> {
    /// Move the viewport to pixel position `pos`.
    ///
    /// Pushes the newly exposed tiles (with `base_attr` merged) to `queue`
    /// followed by the scroll offset update, then records the new window.
    /// Never waits on the hardware; the queue consumer applies the writes
    /// at the next vertical blank.
    pub fn scroll_to<Q: TransferQueue>(&mut self, queue: &mut Q, pos: Point) {
        self.scroll_to_ex(queue, pos, false)
    }

    /// Like [`Map::scroll_to`] but optionally redraws the whole window
    /// even when the delta is small, e.g. after plane memory was clobbered
    /// by another user.
    pub fn scroll_to_ex<Q: TransferQueue>(&mut self, queue: &mut Q, pos: Point, force_redraw: bool) {
        debug_assert!(pos.x >= 0 && pos.y >= 0);
        let cols = self.view_cols;
        let rows = self.view_rows;
        // The streamed window is one tile wider than the viewport; at the
        // far map edge it is pulled back in so it never decodes outside
        // the map.
        let xt = ((pos.x as u32 / TILE_SIZE) as i32).min(self.width as i32 * 16 - cols);
        let yt = ((pos.y as u32 / TILE_SIZE) as i32).min(self.height as i32 * 16 - rows);

        match self.last {
            Some((last_x, last_y)) if !force_redraw => {
                let dx = xt - last_x;
                let dy = yt - last_y;
                if dx == 0 && dy == 0 {
                    // Window unchanged; only the sub-tile offset moves.
                } else if dx.abs() >= cols || dy.abs() >= rows {
                    debug!("window jumped by ({dx},{dy}) tiles, full redraw");
                    self.redraw_window(queue, xt, yt);
                } else {
                    if dx > 0 {
                        self.push_columns(queue, xt + cols - dx, dx, yt);
                    } else if dx < 0 {
                        self.push_columns(queue, xt, -dx, yt);
                    }
                    // Rows skip the freshly written columns so corner
                    // tiles are emitted exactly once.
                    let (row_x, row_w) = if dx >= 0 {
                        (xt, cols - dx)
                    } else {
                        (xt - dx, cols + dx)
                    };
                    if dy > 0 {
                        self.push_rows(queue, row_x, row_w, yt + rows - dy, dy);
                    } else if dy < 0 {
                        self.push_rows(queue, row_x, row_w, yt, -dy);
                    }
                }
            }
            _ => {
                debug!("full redraw at tile ({xt},{yt})");
                self.redraw_window(queue, xt, yt);
            }
        }

        self.last = Some((xt, yt));
        self.pos = pos;
        queue.set_scroll(self.plane, pos.x, pos.y);
    }

    fn redraw_window<Q: TransferQueue>(&self, queue: &mut Q, xt: i32, yt: i32) {
        let mut strip = [TileAttr::default(); STRIP];
        let w = self.view_cols as usize;
        for row in yt..yt + self.view_rows {
            self.get_tile_rect(xt as u32, row as u32, w as u32, 1, RectOrder::Rows, &mut strip[..w]);
            for (i, attr) in strip[..w].iter().enumerate() {
                let addr = self.plane_addr(xt + i as i32, row);
                queue.push_tile(self.plane, addr, attr.merge(self.base_attr));
            }
        }
    }

    /// Newly exposed columns, each the full height of the new window.
    fn push_columns<Q: TransferQueue>(&self, queue: &mut Q, x: i32, n: i32, yt: i32) {
        let mut strip = [TileAttr::default(); STRIP];
        let h = self.view_rows as usize;
        for col in x..x + n {
            self.get_tile_rect(
                col as u32,
                yt as u32,
                1,
                h as u32,
                RectOrder::Columns,
                &mut strip[..h],
            );
            for (i, attr) in strip[..h].iter().enumerate() {
                let addr = self.plane_addr(col, yt + i as i32);
                queue.push_tile(self.plane, addr, attr.merge(self.base_attr));
            }
        }
    }

    /// Newly exposed rows over the columns the column pass did not cover.
    fn push_rows<Q: TransferQueue>(&self, queue: &mut Q, x: i32, w: i32, y: i32, n: i32) {
        let mut strip = [TileAttr::default(); STRIP];
        let w = w as usize;
        for row in y..y + n {
            self.get_tile_rect(x as u32, row as u32, w as u32, 1, RectOrder::Rows, &mut strip[..w]);
            for (i, attr) in strip[..w].iter().enumerate() {
                let addr = self.plane_addr(x + i as i32, row);
                queue.push_tile(self.plane, addr, attr.merge(self.base_attr));
            }
        }
    }

    /// Toroidal tile-buffer address for a map-space tile coordinate.
    fn plane_addr(&self, x: i32, y: i32) -> u16 {
        let px = x as u32 & self.plane_width_mask;
        let py = y as u32 & self.plane_height_mask;
        (py * self.plane_width + px) as u16
    }
}
