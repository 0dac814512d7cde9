//! Occupancy grids.
//!
//! An [`Occupancy`] answers one question, whether a tile is blocked, and
//! derives every vertex-level predicate the scanner and the searches need
//! from it. [`BlockGrid`] is the dense in-memory implementation.

use crate::distance::octile;
use crate::geom::{Point, Range};

/// Blocked/unblocked tiles of a `size_x × size_y` map.
///
/// Vertices range over `0..=size_x` by `0..=size_y`. Tiles outside
/// `[0, size_x) × [0, size_y)` count as blocked.
pub trait Occupancy {
    /// Number of tile columns.
    fn size_x(&self) -> i32;

    /// Number of tile rows.
    fn size_y(&self) -> i32;

    /// Whether the tile with bottom-left vertex `tile` is blocked.
    /// Implementations must report out-of-range tiles as blocked.
    fn is_blocked(&self, tile: Point) -> bool;

    #[inline]
    fn is_valid_tile(&self, tile: Point) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.size_x() && tile.y < self.size_y()
    }

    #[inline]
    fn is_valid_vertex(&self, v: Point) -> bool {
        v.x >= 0 && v.y >= 0 && v.x <= self.size_x() && v.y <= self.size_y()
    }

    /// Every vertex, bottom row first.
    #[inline]
    fn vertices(&self) -> Range {
        Range::new(0, 0, self.size_x() + 1, self.size_y() + 1)
    }

    /// The vertex is the bottom-left corner of a blocked tile.
    #[inline]
    fn bottom_left_of_blocked_tile(&self, v: Point) -> bool {
        self.is_blocked(v)
    }

    /// The vertex is the bottom-right corner of a blocked tile.
    #[inline]
    fn bottom_right_of_blocked_tile(&self, v: Point) -> bool {
        self.is_blocked(v.shift(-1, 0))
    }

    /// The vertex is the top-left corner of a blocked tile.
    #[inline]
    fn top_left_of_blocked_tile(&self, v: Point) -> bool {
        self.is_blocked(v.shift(0, -1))
    }

    /// The vertex is the top-right corner of a blocked tile.
    #[inline]
    fn top_right_of_blocked_tile(&self, v: Point) -> bool {
        self.is_blocked(v.shift(-1, -1))
    }

    /// Number of blocked tiles among the four touching `v`.
    fn blocked_around(&self, v: Point) -> usize {
        [
            self.bottom_left_of_blocked_tile(v),
            self.bottom_right_of_blocked_tile(v),
            self.top_left_of_blocked_tile(v),
            self.top_right_of_blocked_tile(v),
        ]
        .into_iter()
        .filter(|&b| b)
        .count()
    }

    #[inline]
    fn octile_distance(&self, a: Point, b: Point) -> f64 {
        octile(a, b)
    }

    /// Whether the straight segment between two vertices avoids every
    /// blocked tile.
    ///
    /// A segment running along a grid line is blocked only where the tiles
    /// on both sides of the line are blocked. A segment passing exactly
    /// through a vertex squeezes between the two diagonal tiles there.
    fn line_of_sight(&self, a: Point, b: Point) -> bool {
        let blocked = |x: i32, y: i32| self.is_blocked(Point::new(x, y));
        let (mut x1, mut y1) = (a.x, a.y);
        let (x2, y2) = (b.x, b.y);
        let mut dx = x2 - x1;
        let mut dy = y2 - y1;
        let (mut sign_x, mut off_x) = (1, 0);
        let (mut sign_y, mut off_y) = (1, 0);
        if dx < 0 {
            dx = -dx;
            sign_x = -1;
            off_x = -1;
        }
        if dy < 0 {
            dy = -dy;
            sign_y = -1;
            off_y = -1;
        }

        let mut f = 0;
        if dx >= dy {
            while x1 != x2 {
                f += dy;
                if f >= dx {
                    if blocked(x1 + off_x, y1 + off_y) {
                        return false;
                    }
                    y1 += sign_y;
                    f -= dx;
                }
                if f != 0 && blocked(x1 + off_x, y1 + off_y) {
                    return false;
                }
                if dy == 0 && blocked(x1 + off_x, y1) && blocked(x1 + off_x, y1 - 1) {
                    return false;
                }
                x1 += sign_x;
            }
        } else {
            while y1 != y2 {
                f += dx;
                if f >= dy {
                    if blocked(x1 + off_x, y1 + off_y) {
                        return false;
                    }
                    x1 += sign_x;
                    f -= dy;
                }
                if f != 0 && blocked(x1 + off_x, y1 + off_y) {
                    return false;
                }
                if dx == 0 && blocked(x1, y1 + off_y) && blocked(x1 - 1, y1 + off_y) {
                    return false;
                }
                y1 += sign_y;
            }
        }
        true
    }

    /// Line of sight to an adjacent vertex, which must itself be valid.
    #[inline]
    fn neighbour_line_of_sight(&self, a: Point, b: Point) -> bool {
        self.is_valid_vertex(b) && self.line_of_sight(a, b)
    }

    #[inline]
    fn vertex_count(&self) -> usize {
        ((self.size_x() + 1) as usize) * ((self.size_y() + 1) as usize)
    }

    /// Linear id of a valid vertex.
    #[inline]
    fn to_index(&self, v: Point) -> usize {
        (v.y * (self.size_x() + 1) + v.x) as usize
    }

    /// Inverse of [`to_index`](Self::to_index).
    #[inline]
    fn to_point(&self, index: usize) -> Point {
        let w = (self.size_x() + 1) as usize;
        Point::new((index % w) as i32, (index / w) as i32)
    }
}

impl<T: Occupancy + ?Sized> Occupancy for &T {
    #[inline]
    fn size_x(&self) -> i32 {
        (**self).size_x()
    }
    #[inline]
    fn size_y(&self) -> i32 {
        (**self).size_y()
    }
    #[inline]
    fn is_blocked(&self, tile: Point) -> bool {
        (**self).is_blocked(tile)
    }
}

// ---------------------------------------------------------------------------
// BlockGrid
// ---------------------------------------------------------------------------

/// Dense occupancy grid, one flag per tile, rows from the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockGrid {
    size_x: i32,
    size_y: i32,
    blocked: Vec<bool>,
}

impl BlockGrid {
    /// An all-open grid of `size_x × size_y` tiles. Negative sizes count
    /// as zero.
    pub fn new(size_x: i32, size_y: i32) -> Self {
        let size_x = size_x.max(0);
        let size_y = size_y.max(0);
        Self {
            size_x,
            size_y,
            blocked: vec![false; (size_x as usize) * (size_y as usize)],
        }
    }

    #[inline]
    fn tile_index(&self, tile: Point) -> Option<usize> {
        if self.is_valid_tile(tile) {
            Some((tile.y * self.size_x + tile.x) as usize)
        } else {
            None
        }
    }

    /// Set the state of a tile. Returns `false`, leaving the grid
    /// untouched, when the tile is out of range.
    pub fn set_blocked(&mut self, tile: Point, blocked: bool) -> bool {
        match self.tile_index(tile) {
            Some(i) => {
                self.blocked[i] = blocked;
                true
            }
            None => false,
        }
    }

    /// Range of valid tiles.
    #[inline]
    pub fn tiles(&self) -> Range {
        Range::new(0, 0, self.size_x, self.size_y)
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// Open every tile.
    pub fn clear(&mut self) {
        self.blocked.fill(false);
    }
}

impl Occupancy for BlockGrid {
    #[inline]
    fn size_x(&self) -> i32 {
        self.size_x
    }

    #[inline]
    fn size_y(&self) -> i32 {
        self.size_y
    }

    #[inline]
    fn is_blocked(&self, tile: Point) -> bool {
        self.tile_index(tile).is_none_or(|i| self.blocked[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(size_x: i32, size_y: i32, blocked: &[(i32, i32)]) -> BlockGrid {
        let mut g = BlockGrid::new(size_x, size_y);
        for &(x, y) in blocked {
            assert!(g.set_blocked(Point::new(x, y), true));
        }
        g
    }

    #[test]
    fn outside_tiles_are_blocked() {
        let g = BlockGrid::new(3, 2);
        assert!(!g.is_blocked(Point::new(0, 0)));
        assert!(!g.is_blocked(Point::new(2, 1)));
        assert!(g.is_blocked(Point::new(3, 0)));
        assert!(g.is_blocked(Point::new(0, 2)));
        assert!(g.is_blocked(Point::new(-1, 0)));
    }

    #[test]
    fn set_blocked_out_of_range_is_reported() {
        let mut g = BlockGrid::new(2, 2);
        assert!(!g.set_blocked(Point::new(2, 0), true));
        assert_eq!(g.blocked_count(), 0);
        assert!(g.set_blocked(Point::new(1, 1), true));
        assert_eq!(g.blocked_count(), 1);
        g.clear();
        assert_eq!(g.blocked_count(), 0);
    }

    #[test]
    fn corner_predicates() {
        let g = grid_with(4, 4, &[(1, 1)]);
        assert!(g.bottom_left_of_blocked_tile(Point::new(1, 1)));
        assert!(g.bottom_right_of_blocked_tile(Point::new(2, 1)));
        assert!(g.top_left_of_blocked_tile(Point::new(1, 2)));
        assert!(g.top_right_of_blocked_tile(Point::new(2, 2)));
        assert!(!g.top_right_of_blocked_tile(Point::new(1, 1)));
        assert_eq!(g.blocked_around(Point::new(2, 2)), 1);
        // Boundary vertices see the outside as blocked.
        assert_eq!(g.blocked_around(Point::new(0, 0)), 3);
    }

    #[test]
    fn index_round_trip() {
        let g = BlockGrid::new(5, 3);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.vertices().iter().count(), g.vertex_count());
        for (i, v) in g.vertices().iter().enumerate() {
            assert_eq!(g.to_index(v), i);
            assert_eq!(g.to_point(i), v);
        }
        assert_eq!(g.to_index(Point::new(2, 1)), 8);
    }

    #[test]
    fn line_of_sight_open_grid() {
        let g = BlockGrid::new(4, 4);
        assert!(g.line_of_sight(Point::new(0, 0), Point::new(4, 4)));
        assert!(g.line_of_sight(Point::new(0, 0), Point::new(4, 1)));
        assert!(g.line_of_sight(Point::new(3, 4), Point::new(0, 0)));
        assert!(g.line_of_sight(Point::new(2, 2), Point::new(2, 2)));
    }

    #[test]
    fn line_of_sight_blocked_by_tile() {
        let g = grid_with(4, 4, &[(1, 1)]);
        assert!(!g.line_of_sight(Point::new(0, 0), Point::new(4, 4)));
        assert!(!g.line_of_sight(Point::new(4, 4), Point::new(0, 0)));
        assert!(!g.line_of_sight(Point::new(0, 1), Point::new(4, 2)));
        assert!(g.line_of_sight(Point::new(0, 0), Point::new(4, 1)));
        assert!(g.line_of_sight(Point::new(0, 2), Point::new(2, 4)));
    }

    #[test]
    fn line_of_sight_along_grid_lines() {
        // A wall on one side of a grid line leaves the line passable.
        let g = grid_with(4, 2, &[(0, 0), (1, 0), (2, 0)]);
        assert!(g.line_of_sight(Point::new(0, 1), Point::new(4, 1)));
        // Walls on both sides close it.
        let g = grid_with(4, 2, &[(1, 0), (1, 1)]);
        assert!(!g.line_of_sight(Point::new(0, 1), Point::new(4, 1)));
        let g = grid_with(2, 4, &[(0, 1), (1, 1)]);
        assert!(!g.line_of_sight(Point::new(1, 0), Point::new(1, 4)));
        assert!(g.line_of_sight(Point::new(0, 0), Point::new(0, 1)));
    }

    #[test]
    fn neighbour_line_of_sight_needs_valid_target() {
        let g = BlockGrid::new(2, 2);
        assert!(g.neighbour_line_of_sight(Point::new(0, 0), Point::new(1, 1)));
        assert!(!g.neighbour_line_of_sight(Point::new(0, 0), Point::new(-1, 0)));
        // Along the outer boundary one side is always outside.
        assert!(g.neighbour_line_of_sight(Point::new(0, 0), Point::new(1, 0)));
    }

    #[test]
    fn occupancy_through_reference() {
        let g = grid_with(3, 3, &[(1, 1)]);
        let r = &g;
        assert!(r.is_blocked(Point::new(1, 1)));
        assert_eq!(r.size_x(), 3);
        assert!(!r.line_of_sight(Point::new(0, 0), Point::new(3, 3)));
    }
}
