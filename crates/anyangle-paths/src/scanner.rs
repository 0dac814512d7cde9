//! Taut line-of-sight successors of a grid vertex.
//!
//! The scanner sweeps rows away from the source, carrying the visible part
//! of each row as an interval with exact [`Fraction`] endpoints. An
//! interval is projected one row further through the source, clipped
//! against the nearest obstacle transitions on that row and split where
//! the row alternates between blocked and open tiles. Interval endpoints
//! that land on a blocking corner become successors. Two horizontal walks
//! cover the source's own row.
//!
//! Obstacle transitions are precomputed per row into two extent tables so
//! that clipping and splitting are table lookups.

use anyangle_core::{Fraction, Occupancy, Point};
use log::{debug, trace};

use crate::trace::{SearchEvent, Trace};

/// Which successors a scan generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanMode {
    /// Every taut successor of a free source vertex.
    Taut,
    /// Successors of a source on an outer corner, seeding each diagonal
    /// half-plane on its own so that the result does not depend on the
    /// direction the corner was reached from.
    ///
    /// The source must touch exactly one blocked tile
    /// (`blocked_around(source) == 1`). Other sources get seeds that cross
    /// their blocked tiles and yield vertices they cannot see.
    TwoWayTaut,
}

/// A pending visible segment `[left, right]` on row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    y: i32,
    left: Fraction,
    right: Fraction,
}

/// Reusable scanning context.
///
/// Holds the extent tables of one grid size plus the interval stack and
/// successor buffer. The grid itself is passed to every call; call
/// [`refresh`](Self::refresh) after changing tiles.
#[derive(Debug, Clone, Default)]
pub struct LineOfSightScanner {
    size_x: i32,
    size_y: i32,
    // (size_y + 2) rows of (size_x + 1) columns. Row `y` describes the
    // tiles of row `y - 1`.
    left_extents: Vec<i32>,
    right_extents: Vec<i32>,
    stack: Vec<Interval>,
    successors: Vec<Point>,
    trace: Trace,
}

impl LineOfSightScanner {
    /// A scanner with extents computed for `grid`.
    pub fn new<G: Occupancy + ?Sized>(grid: &G) -> Self {
        let mut s = Self {
            stack: Vec::with_capacity(16),
            successors: Vec::with_capacity(16),
            ..Self::default()
        };
        s.refresh(grid);
        s
    }

    /// Recompute the extent tables from the tiles of `grid`. Storage is
    /// reallocated only when the grid dimensions changed.
    pub fn refresh<G: Occupancy + ?Sized>(&mut self, grid: &G) {
        let size_x = grid.size_x().max(0);
        let size_y = grid.size_y().max(0);
        let cells = ((size_y + 2) as usize) * ((size_x + 1) as usize);
        if size_x != self.size_x || size_y != self.size_y || self.left_extents.len() != cells {
            debug!("line of sight scanner: allocating extents for {size_x}x{size_y}");
            self.size_x = size_x;
            self.size_y = size_y;
            self.left_extents = vec![0; cells];
            self.right_extents = vec![0; cells];
        }
        let blocked = |x: i32, y: i32| grid.is_blocked(Point::new(x, y));
        let w = (size_x + 1) as usize;
        for y in 0..size_y + 2 {
            let row = y as usize * w;
            let mut last_blocked = true;
            let mut last_x = -1;
            for x in 0..=size_x {
                self.left_extents[row + x as usize] = last_x;
                if blocked(x, y - 1) != last_blocked {
                    last_x = x;
                    last_blocked = !last_blocked;
                }
            }
            last_blocked = true;
            last_x = size_x + 1;
            for x in (0..=size_x).rev() {
                self.right_extents[row + x as usize] = last_x;
                if blocked(x - 1, y - 1) != last_blocked {
                    last_x = x;
                    last_blocked = !last_blocked;
                }
            }
        }
    }

    /// Successors found by the last scan.
    #[inline]
    pub fn successors(&self) -> &[Point] {
        &self.successors
    }

    /// Start recording pushed intervals and emitted successors.
    pub fn start_recording(&mut self) {
        self.trace.set_enabled(true);
    }

    pub fn stop_recording(&mut self) {
        self.trace.set_enabled(false);
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Remove and return the recorded events.
    pub fn take_trace(&mut self) -> Vec<SearchEvent> {
        self.trace.take()
    }

    /// Taut successors of a free vertex.
    pub fn taut_successors<G: Occupancy + ?Sized>(&mut self, grid: &G, source: Point) -> &[Point] {
        self.scan(grid, source, ScanMode::Taut)
    }

    /// Taut successors of an outer-corner vertex, independent of the
    /// direction it was reached from.
    ///
    /// `source` must touch exactly one blocked tile; see
    /// [`ScanMode::TwoWayTaut`].
    pub fn two_way_taut_successors<G: Occupancy + ?Sized>(
        &mut self,
        grid: &G,
        source: Point,
    ) -> &[Point] {
        self.scan(grid, source, ScanMode::TwoWayTaut)
    }

    /// Compute the successors of `source` into the reusable buffer.
    ///
    /// Extents are rebuilt first if `grid` no longer has the dimensions
    /// they were computed for. A source that is not a vertex of `grid` has
    /// no successors.
    pub fn scan<G: Occupancy + ?Sized>(&mut self, grid: &G, source: Point, mode: ScanMode) -> &[Point] {
        self.successors.clear();
        self.stack.clear();
        if grid.size_x() != self.size_x || grid.size_y() != self.size_y || self.left_extents.is_empty() {
            self.refresh(grid);
        }
        if !grid.is_valid_vertex(source) || self.size_x == 0 || self.size_y == 0 {
            return &self.successors;
        }
        match mode {
            ScanMode::Taut => self.seed_taut(grid, source),
            ScanMode::TwoWayTaut => self.seed_two_way(grid, source),
        }
        self.explore(grid, source);
        trace!(
            "scan {source} ({mode:?}): {} successors",
            self.successors.len()
        );
        &self.successors
    }

    // -----------------------------------------------------------------------
    // Extent lookups
    // -----------------------------------------------------------------------

    #[inline]
    fn cell(&self, y: i32, x: i32) -> Option<usize> {
        if y < 0 || y > self.size_y + 1 || x < 0 || x > self.size_x {
            return None;
        }
        Some(y as usize * (self.size_x + 1) as usize + x as usize)
    }

    /// Nearest transition strictly left of `x` in table row `y`.
    #[inline]
    fn left_at(&self, y: i32, x: i32) -> i32 {
        self.cell(y, x).map_or(-1, |i| self.left_extents[i])
    }

    /// Nearest transition strictly right of `x` in table row `y`.
    #[inline]
    fn right_at(&self, y: i32, x: i32) -> i32 {
        self.cell(y, x)
            .map_or(self.size_x + 1, |i| self.right_extents[i])
    }

    fn left_up_extent(&self, x: i32, y: i32) -> i32 {
        if x > self.size_x {
            self.size_x
        } else {
            self.left_at(y + 1, x)
        }
    }

    fn left_down_extent(&self, x: i32, y: i32) -> i32 {
        if x > self.size_x {
            self.size_x
        } else {
            self.left_at(y, x)
        }
    }

    fn left_any_extent(&self, x: i32, y: i32) -> i32 {
        self.left_at(y, x).max(self.left_at(y + 1, x))
    }

    fn right_up_extent(&self, x: i32, y: i32) -> i32 {
        if x < 0 { 0 } else { self.right_at(y + 1, x) }
    }

    fn right_down_extent(&self, x: i32, y: i32) -> i32 {
        if x < 0 { 0 } else { self.right_at(y, x) }
    }

    fn right_any_extent(&self, x: i32, y: i32) -> i32 {
        self.right_at(y, x).min(self.right_at(y + 1, x))
    }

    // -----------------------------------------------------------------------
    // Buffers
    // -----------------------------------------------------------------------

    fn push(&mut self, y: i32, left: Fraction, right: Fraction) {
        debug_assert!(left <= right);
        self.trace.record(SearchEvent::IntervalPushed { row: y, left, right });
        self.stack.push(Interval { y, left, right });
    }

    fn add_successor(&mut self, source: Point, p: Point) {
        self.trace.record(SearchEvent::Successor { from: source, to: p });
        self.successors.push(p);
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    fn seed_taut<G: Occupancy + ?Sized>(&mut self, grid: &G, s: Point) {
        let bl = grid.bottom_left_of_blocked_tile(s);
        let br = grid.bottom_right_of_blocked_tile(s);
        let tl = grid.top_left_of_blocked_tile(s);
        let tr = grid.top_right_of_blocked_tile(s);
        let sx = Fraction::from(s.x);

        if !bl || !br {
            let (left, right): (Fraction, Fraction) = if bl {
                (self.left_up_extent(s.x, s.y).into(), sx)
            } else if br {
                (sx, self.right_up_extent(s.x, s.y).into())
            } else {
                (
                    self.left_up_extent(s.x, s.y).into(),
                    self.right_up_extent(s.x, s.y).into(),
                )
            };
            self.generate_upwards(grid, left, right, s.y);
        }

        if !tl || !tr {
            let (left, right): (Fraction, Fraction) = if tl {
                (self.left_down_extent(s.x, s.y).into(), sx)
            } else if tr {
                (sx, self.right_down_extent(s.x, s.y).into())
            } else {
                (
                    self.left_down_extent(s.x, s.y).into(),
                    self.right_down_extent(s.x, s.y).into(),
                )
            };
            self.generate_downwards(grid, left, right, s.y);
        }

        if !tr || !br {
            self.walk_left(grid, s);
        }
        if !tl || !bl {
            self.walk_right(grid, s);
        }
    }

    fn seed_two_way<G: Occupancy + ?Sized>(&mut self, grid: &G, s: Point) {
        let bl = grid.bottom_left_of_blocked_tile(s);
        let br = grid.bottom_right_of_blocked_tile(s);
        let tl = grid.top_left_of_blocked_tile(s);
        let tr = grid.top_right_of_blocked_tile(s);
        let sx = Fraction::from(s.x);
        // Just off the source, so that a half-plane excludes the source
        // column when the corner tile does not bound it.
        let size_y = i64::from(self.size_y);
        let before = Fraction::new(i64::from(s.x) * size_y - 1, size_y);
        let after = Fraction::new(i64::from(s.x) * size_y + 1, size_y);

        if tr || bl {
            let left = Fraction::from(self.left_up_extent(s.x, s.y));
            let right = if bl { sx } else { before };
            self.generate_upwards(grid, left, right, s.y);
        }
        if br || tl {
            let left = if br { sx } else { after };
            let right = Fraction::from(self.right_up_extent(s.x, s.y));
            self.generate_upwards(grid, left, right, s.y);
        }
        if br || tl {
            let left = Fraction::from(self.left_down_extent(s.x, s.y));
            let right = if tl { sx } else { before };
            self.generate_downwards(grid, left, right, s.y);
        }
        if tr || bl {
            let left = if tr { sx } else { after };
            let right = Fraction::from(self.right_down_extent(s.x, s.y));
            self.generate_downwards(grid, left, right, s.y);
        }

        if tr || br {
            self.walk_left(grid, s);
        }
        if tl || bl {
            self.walk_right(grid, s);
        }
    }

    /// Step left along the source row from transition to transition,
    /// until both tiles left of the line are blocked.
    fn walk_left<G: Occupancy + ?Sized>(&mut self, grid: &G, s: Point) {
        let mut x = s.x;
        loop {
            x = self.left_any_extent(x, s.y);
            let p = Point::new(x, s.y);
            if grid.top_right_of_blocked_tile(p) && grid.bottom_right_of_blocked_tile(p) {
                break;
            }
            if grid.top_left_of_blocked_tile(p) || grid.bottom_left_of_blocked_tile(p) {
                self.add_successor(s, p);
            }
        }
    }

    fn walk_right<G: Occupancy + ?Sized>(&mut self, grid: &G, s: Point) {
        let mut x = s.x;
        loop {
            x = self.right_any_extent(x, s.y);
            let p = Point::new(x, s.y);
            if grid.top_left_of_blocked_tile(p) && grid.bottom_left_of_blocked_tile(p) {
                break;
            }
            if grid.top_right_of_blocked_tile(p) || grid.bottom_right_of_blocked_tile(p) {
                self.add_successor(s, p);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Sweep
    // -----------------------------------------------------------------------

    fn generate_upwards<G: Occupancy + ?Sized>(
        &mut self,
        grid: &G,
        left: Fraction,
        right: Fraction,
        y: i32,
    ) {
        self.split_intervals(grid, y + 2, y + 1, left, right);
    }

    fn generate_downwards<G: Occupancy + ?Sized>(
        &mut self,
        grid: &G,
        left: Fraction,
        right: Fraction,
        y: i32,
    ) {
        self.split_intervals(grid, y - 1, y - 1, left, right);
    }

    /// Push the open runs of table row `check_y` within `[left_bound,
    /// right_bound]` as intervals on row `new_y`. Zero-length intervals are
    /// kept: a run can shrink to the single corner it starts at.
    fn split_intervals<G: Occupancy + ?Sized>(
        &mut self,
        grid: &G,
        check_y: i32,
        new_y: i32,
        left_bound: Fraction,
        right_bound: Fraction,
    ) {
        let tile_y = check_y - 1;
        let blocked = |x: i32| grid.is_blocked(Point::new(x, tile_y));
        let mut left = left_bound;
        let mut left_floor = left.floor() as i32;

        if left.is_whole() && !blocked(left_floor - 1) && blocked(left_floor) {
            self.push(new_y, left, left);
        }

        loop {
            let right = self.right_at(check_y, left_floor);
            if right > self.size_x || right_bound < i64::from(right) {
                break;
            }
            if !blocked(right - 1) {
                self.push(new_y, left, right.into());
            }
            left_floor = right;
            left = right.into();
        }

        if !blocked(left_floor) {
            self.push(new_y, left, right_bound);
        }
    }

    fn explore<G: Occupancy + ?Sized>(&mut self, grid: &G, s: Point) {
        while let Some(iv) = self.stack.pop() {
            let zero_length = iv.left == iv.right;
            let y = iv.y;
            let upwards = y > s.y;
            let x_left = iv.left.numer() as i32;
            let x_right = iv.right.numer() as i32;

            // Endpoints on a blocking corner are successors.
            let mut left_added = false;
            if iv.left.is_whole() {
                let p = Point::new(x_left, y);
                let (near, far) = if upwards {
                    (grid.top_right_of_blocked_tile(p), grid.bottom_right_of_blocked_tile(p))
                } else {
                    (grid.bottom_right_of_blocked_tile(p), grid.top_right_of_blocked_tile(p))
                };
                let emit = if x_left <= s.x { near && !far } else { far };
                if emit {
                    self.add_successor(s, p);
                    left_added = true;
                }
            }
            if iv.right.is_whole() && !(zero_length && left_added) {
                let p = Point::new(x_right, y);
                let (near, far) = if upwards {
                    (grid.top_left_of_blocked_tile(p), grid.bottom_left_of_blocked_tile(p))
                } else {
                    (grid.bottom_left_of_blocked_tile(p), grid.top_left_of_blocked_tile(p))
                };
                let emit = if x_right < s.x { far } else { near && !far };
                if emit {
                    self.add_successor(s, p);
                }
            }

            // Project one row further: (x - sx) * (dy + 1) / dy + sx.
            let dy = i64::from((y - s.y).abs());
            let sx = i64::from(s.x);
            let project = |x: Fraction| (x - sx).mul_div(dy + 1, dy) + sx;

            let mut left_bound = if upwards {
                self.left_up_extent(iv.left.ceil() as i32, y)
            } else {
                self.left_down_extent(iv.left.ceil() as i32, y)
            };
            if iv.left.is_whole() {
                let p = Point::new(x_left, y);
                let corner = if upwards {
                    grid.bottom_right_of_blocked_tile(p)
                } else {
                    grid.top_right_of_blocked_tile(p)
                };
                if corner {
                    left_bound = x_left;
                }
            }
            let mut left = project(iv.left);
            if left < i64::from(left_bound) {
                left = left_bound.into();
            }

            let mut right_bound = if upwards {
                self.right_up_extent(iv.right.floor() as i32, y)
            } else {
                self.right_down_extent(iv.right.floor() as i32, y)
            };
            if iv.right.is_whole() {
                let p = Point::new(x_right, y);
                let corner = if upwards {
                    grid.bottom_left_of_blocked_tile(p)
                } else {
                    grid.top_left_of_blocked_tile(p)
                };
                if corner {
                    right_bound = x_right;
                }
            }
            let mut right = project(iv.right);
            if right > i64::from(right_bound) {
                right = right_bound.into();
            }

            if left <= right {
                if upwards {
                    self.generate_upwards(grid, left, right, y);
                } else {
                    self.generate_downwards(grid, left, right, y);
                }
            }
        }
    }
}
