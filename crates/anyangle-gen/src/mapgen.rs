//! Random occupancy maps for benchmarks and randomized tests.
//!
//! Provides two generators:
//! - **Block map**: scatters 2×2 squares and 3-tile bars.
//! - **Tile map**: blocks each tile independently.
//!
//! [`MapGen::fill_corners`] then removes tiles that touch only at a
//! corner, which otherwise leave zero-width diagonal gaps.

use anyangle_core::{BlockGrid, Occupancy, Point};
use rand::{Rng, RngExt};

/// Shapes placed by [`MapGen::random_block_map`], as tile offsets from
/// the anchor.
const SHAPES: [&[(i32, i32)]; 3] = [
    &[(0, 0), (0, 1), (1, 0), (1, 1)],
    &[(0, -1), (0, 0), (0, 1)],
    &[(-1, 0), (0, 0), (1, 0)],
];

/// Map generator operating on a [`BlockGrid`].
pub struct MapGen<R: Rng> {
    pub rng: R,
    pub grid: BlockGrid,
}

impl<R: Rng> MapGen<R> {
    /// A generator over an open grid of `size_x` by `size_y` tiles.
    pub fn new(size_x: i32, size_y: i32, rng: R) -> Self {
        Self::with_grid(BlockGrid::new(size_x, size_y), rng)
    }

    pub fn with_grid(grid: BlockGrid, rng: R) -> Self {
        Self { rng, grid }
    }

    pub fn into_grid(self) -> BlockGrid {
        self.grid
    }

    /// Anchor a random shape at each tile with probability `1/frequency`:
    /// a 2×2 square, a vertical bar or a horizontal bar, each equally
    /// likely. Parts falling outside the grid are dropped.
    ///
    /// Returns the number of shapes placed. A `frequency` of 0 places
    /// nothing.
    pub fn random_block_map(&mut self, frequency: u32) -> usize {
        if frequency == 0 {
            return 0;
        }
        let mut placed = 0;
        for x in 0..self.grid.size_x() {
            for y in 0..self.grid.size_y() {
                if self.rng.random_range(0..frequency) != 0 {
                    continue;
                }
                let shape = SHAPES[self.rng.random_range(0..SHAPES.len())];
                for &(dx, dy) in shape {
                    self.grid.set_blocked(Point::new(x + dx, y + dy), true);
                }
                placed += 1;
            }
        }
        placed
    }

    /// Block each tile independently with probability `1/frequency`,
    /// opening the others. Returns the number of blocked tiles. A
    /// `frequency` of 0 opens the whole grid.
    pub fn random_map(&mut self, frequency: u32) -> usize {
        let tiles = self.grid.tiles();
        for p in tiles {
            let blocked = frequency != 0 && self.rng.random_range(0..frequency) == 0;
            self.grid.set_blocked(p, blocked);
        }
        self.grid.blocked_count()
    }

    /// Repeatedly find two blocked tiles meeting only at a corner, with
    /// both tiles between them open, and block one of those two at
    /// random, until no such pair remains.
    ///
    /// Returns the number of tiles blocked.
    pub fn fill_corners(&mut self) -> usize {
        let mut filled = 0;
        loop {
            let mut changed = false;
            for x in 0..self.grid.size_x() {
                for y in 0..self.grid.size_y() {
                    let p = Point::new(x, y);
                    if !self.grid.is_blocked(p) {
                        continue;
                    }
                    for dx in [1, -1] {
                        let diagonal = Point::new(x + dx, y + 1);
                        if !self.grid.is_valid_tile(diagonal) || !self.grid.is_blocked(diagonal) {
                            continue;
                        }
                        let side = Point::new(x + dx, y);
                        let above = Point::new(x, y + 1);
                        if self.grid.is_blocked(side) || self.grid.is_blocked(above) {
                            continue;
                        }
                        let fill = if self.rng.random_bool(0.5) { side } else { above };
                        self.grid.set_blocked(fill, true);
                        filled += 1;
                        changed = true;
                    }
                }
            }
            if !changed {
                return filled;
            }
        }
    }

    /// Open tile `p`. Returns whether `p` is inside the grid.
    pub fn clear(&mut self, p: Point) -> bool {
        self.grid.set_blocked(p, false)
    }
}
