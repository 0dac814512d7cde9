//! Jump point search over grid vertices, pruned by an ellipse.
//!
//! Given the length of a path already known between start and goal, any
//! shorter path stays inside an ellipse around the two endpoints. Jumps
//! abort as soon as they leave that ellipse, and every indexed vertex a
//! jump passes over gets its heuristic lowered to the distance walked so
//! far, scaled by the approximation ratio.

use anyangle_core::{Occupancy, Point};
use log::{debug, trace};

use crate::config::SearchConfig;
use crate::costmap::CostMap;
use crate::heap::IndexedHeap;
use crate::outcome::{Path, PathOutcome, SearchError};
use crate::trace::{SearchEvent, Trace};
use crate::traits::VisibilityIndex;

/// Counters of the last query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Vertices finalized.
    pub expanded: usize,
    /// Successful relaxations.
    pub relaxed: usize,
    /// Heuristic values that were actually lowered.
    pub heuristic_updates: usize,
}

/// Whether `p` cannot lie on a path within `ellipse` when reached from
/// `parent`, itself at `parent_distance` from the start.
#[inline]
pub(crate) fn outside_ellipse<G: Occupancy + ?Sized>(
    grid: &G,
    ellipse: f64,
    parent_distance: f64,
    parent: Point,
    p: Point,
    goal: Point,
) -> bool {
    parent_distance + grid.octile_distance(p, parent) + grid.octile_distance(p, goal) > ellipse
}

/// Reusable bounded search context: cost map, priority queue and
/// direction buffer for one query at a time.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    config: SearchConfig,
    costs: CostMap,
    queue: IndexedHeap,
    directions: Vec<Point>,
    stats: SearchStats,
    trace: Trace,
}

impl SearchContext {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            directions: Vec::with_capacity(8),
            trace: if config.record_trace {
                Trace::enabled()
            } else {
                Trace::new()
            },
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.trace.set_enabled(config.record_trace);
        self.config = config;
    }

    /// Counters of the last query.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Per-vertex state left by the last query.
    pub fn costs(&self) -> &CostMap {
        &self.costs
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Remove and return the events recorded so far.
    pub fn take_trace(&mut self) -> Vec<SearchEvent> {
        self.trace.take()
    }

    /// Shortest any-angle path from `start` to `goal` among those no
    /// longer than `upper_bound`, refreshing the heuristics of `index` on
    /// the way.
    ///
    /// `upper_bound` is the length of a path already known, typically from
    /// a coarser search; the result is only guaranteed optimal when the
    /// true shortest path fits it. When it does not, the outcome is
    /// [`PathOutcome::NoPathWithinBound`].
    pub fn bounded_jps_path<G, V>(
        &mut self,
        grid: &G,
        start: Point,
        goal: Point,
        upper_bound: f64,
        index: &mut V,
    ) -> Result<PathOutcome, SearchError>
    where
        G: Occupancy + ?Sized,
        V: VisibilityIndex + ?Sized,
    {
        let size = Point::new(grid.size_x(), grid.size_y());
        for vertex in [start, goal] {
            if !grid.is_valid_vertex(vertex) {
                return Err(SearchError::VertexOutOfBounds { vertex, size });
            }
        }
        if !upper_bound.is_finite() || upper_bound < 0.0 {
            return Err(SearchError::InvalidBound(upper_bound));
        }

        let total = grid.vertex_count();
        self.costs.reset(total);
        self.queue.reset(total);
        self.stats = SearchStats::default();

        let mut jumper = Jumper {
            grid,
            index,
            goal,
            ellipse: self.config.ellipse_size(upper_bound),
            ratio: self.config.approximation_ratio,
            heuristic_updates: 0,
        };

        let start_id = grid.to_index(start);
        let goal_id = grid.to_index(goal);
        self.costs.set_distance(start_id, 0.0);
        self.queue.push_or_decrease(start_id, 0.0);

        while let Some((current, dist)) = self.queue.pop_min() {
            if dist == f64::INFINITY {
                break;
            }
            self.costs.set_visited(current);
            self.stats.expanded += 1;
            let p = grid.to_point(current);
            trace!("bounded jps: expand {p} at {dist:.3}");
            self.trace.record(SearchEvent::Visited {
                vertex: p,
                distance: dist,
            });
            if current == goal_id && self.config.stop_at_goal {
                break;
            }

            self.compute_directions(grid, current, p);
            for i in 0..self.directions.len() {
                let dir = self.directions[i];
                if let Some(q) = jumper.jump(dist, p, dir) {
                    self.try_relax(grid, current, p, q);
                }
            }
        }
        self.stats.heuristic_updates = jumper.heuristic_updates;

        let outcome = if self.costs.is_visited(goal_id) {
            let vertices = self
                .costs
                .trace_back(goal_id)
                .into_iter()
                .map(|id| grid.to_point(id))
                .collect();
            PathOutcome::Found(Path::new(vertices, self.costs.distance(goal_id)))
        } else {
            PathOutcome::NoPathWithinBound
        };
        debug!(
            "bounded jps {start} -> {goal} (bound {upper_bound:.3}): {}, {} expanded, {} heuristic updates",
            match &outcome {
                PathOutcome::Found(path) => format!("length {:.3}", path.length()),
                PathOutcome::NoPathWithinBound => "no path within bound".to_string(),
            },
            self.stats.expanded,
            self.stats.heuristic_updates
        );
        Ok(outcome)
    }

    fn try_relax<G: Occupancy + ?Sized>(&mut self, grid: &G, current: usize, p: Point, q: Point) {
        let dest = grid.to_index(q);
        if self.costs.is_visited(dest) {
            return;
        }
        let d = self.costs.distance(current) + grid.octile_distance(p, q);
        if d < self.costs.distance(dest) {
            self.costs.set_distance(dest, d);
            self.costs.set_parent(dest, Some(current));
            self.queue.push_or_decrease(dest, d);
            self.stats.relaxed += 1;
            self.trace.record(SearchEvent::Relaxed {
                from: p,
                to: q,
                distance: d,
            });
        }
    }

    /// Fill the direction buffer with the steps worth jumping along from
    /// `p`: every open step at the start, otherwise the natural and forced
    /// continuations of the arrival direction.
    fn compute_directions<G: Occupancy + ?Sized>(&mut self, grid: &G, current: usize, p: Point) {
        self.directions.clear();
        let blocked = |x: i32, y: i32| grid.is_blocked(Point::new(x, y));
        let (cx, cy) = (p.x, p.y);

        let Some(parent) = self.costs.parent(current) else {
            for d in Point::DIRECTIONS {
                if grid.neighbour_line_of_sight(p, p + d) {
                    self.directions.push(d);
                }
            }
            return;
        };

        let dir = (p - grid.to_point(parent)).signum();
        let (dx, dy) = (dir.x, dir.y);
        // Column/row of the tiles ahead of `p` along each axis.
        let ahead_x = if dx < 0 { cx - 1 } else { cx };
        let ahead_y = if dy < 0 { cy - 1 } else { cy };

        if dx != 0 && dy != 0 {
            if !blocked(ahead_x, ahead_y) {
                self.directions.extend([dir, Point::new(dx, 0), Point::new(0, dy)]);
            } else {
                let behind_x = if dx < 0 { cx } else { cx - 1 };
                let behind_y = if dy < 0 { cy } else { cy - 1 };
                if !blocked(ahead_x, behind_y) {
                    self.directions.push(Point::new(dx, 0));
                }
                if !blocked(behind_x, ahead_y) {
                    self.directions.push(Point::new(0, dy));
                }
            }
        } else if dy == 0 {
            // Arrived horizontally: turn towards the side whose tile behind
            // is blocked.
            let behind_x = if dx > 0 { cx - 1 } else { cx };
            let side = if blocked(behind_x, cy) { 1 } else { -1 };
            self.directions
                .extend([Point::new(dx, side), Point::new(0, side), Point::new(dx, 0)]);
        } else {
            let behind_y = if dy > 0 { cy - 1 } else { cy };
            let side = if blocked(cx, behind_y) { 1 } else { -1 };
            self.directions
                .extend([Point::new(side, dy), Point::new(side, 0), Point::new(0, dy)]);
        }
    }
}

// ---------------------------------------------------------------------------
// Jumps
// ---------------------------------------------------------------------------

/// Walks rays from an expanded vertex inside the ellipse.
struct Jumper<'a, G: ?Sized, V: ?Sized> {
    grid: &'a G,
    index: &'a mut V,
    goal: Point,
    ellipse: f64,
    ratio: f64,
    heuristic_updates: usize,
}

/// The two tiles on either side of the unit edge from `v` towards `d`:
/// first the one above (horizontal) or right (vertical) of it.
#[inline]
fn edge_tiles(v: Point, d: Point) -> (Point, Point) {
    if d.y == 0 {
        let x = if d.x > 0 { v.x } else { v.x - 1 };
        (Point::new(x, v.y), Point::new(x, v.y - 1))
    } else {
        let y = if d.y > 0 { v.y } else { v.y - 1 };
        (Point::new(v.x, y), Point::new(v.x - 1, y))
    }
}

impl<G, V> Jumper<'_, G, V>
where
    G: Occupancy + ?Sized,
    V: VisibilityIndex + ?Sized,
{
    fn jump(&mut self, parent_distance: f64, from: Point, dir: Point) -> Option<Point> {
        if dir.is_diagonal() {
            self.jump_diagonal(parent_distance, from, dir)
        } else {
            self.jump_straight(parent_distance, from, from, dir)
        }
    }

    fn outside(&self, parent_distance: f64, parent: Point, p: Point) -> bool {
        outside_ellipse(self.grid, self.ellipse, parent_distance, parent, p, self.goal)
    }

    fn update_heuristic(&mut self, parent_distance: f64, parent: Point, p: Point) {
        let Some(i) = self.index.index_of(p) else {
            return;
        };
        let value = (self.grid.octile_distance(parent, p) + parent_distance) / self.ratio;
        if self.index.try_update_heuristic(i, value) {
            self.heuristic_updates += 1;
        }
    }

    /// Walk from `p` along the axis step `d`. The jump belongs to
    /// `parent`, which the ellipse test and heuristic refresh measure from.
    fn jump_straight(
        &mut self,
        parent_distance: f64,
        parent: Point,
        mut p: Point,
        d: Point,
    ) -> Option<Point> {
        let grid = self.grid;
        loop {
            let (side_a, side_b) = edge_tiles(p, d);
            p = p + d;
            if self.outside(parent_distance, parent, p) {
                return None;
            }
            self.update_heuristic(parent_distance, parent, p);

            let a_blocked = grid.is_blocked(side_a);
            let b_blocked = grid.is_blocked(side_b);
            if a_blocked && b_blocked {
                return None;
            }
            if p == self.goal {
                return Some(p);
            }
            let (next_a, next_b) = edge_tiles(p, d);
            if a_blocked && !grid.is_blocked(next_a) {
                return Some(p);
            }
            if b_blocked && !grid.is_blocked(next_b) {
                return Some(p);
            }
        }
    }

    /// Walk diagonally from `from`, stopping where a straight walk finds a
    /// jump point.
    fn jump_diagonal(&mut self, parent_distance: f64, from: Point, d: Point) -> Option<Point> {
        let horizontal = Point::new(d.x, 0);
        let vertical = Point::new(0, d.y);
        let (first, second) = if d.x < 0 {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };
        let mut p = from;
        loop {
            p = p + d;
            let crossed = Point::new(
                if d.x > 0 { p.x - 1 } else { p.x },
                if d.y > 0 { p.y - 1 } else { p.y },
            );
            if self.grid.is_blocked(crossed) {
                return None;
            }
            if self.outside(parent_distance, from, p) {
                return None;
            }
            self.update_heuristic(parent_distance, from, p);
            if p == self.goal {
                return Some(p);
            }
            if self.jump_straight(parent_distance, from, p, first).is_some()
                || self.jump_straight(parent_distance, from, p, second).is_some()
            {
                return Some(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::SparseVisibilityIndex;
    use anyangle_core::{BlockGrid, SQRT_2};

    fn grid_with(size_x: i32, size_y: i32, blocked: &[(i32, i32)]) -> BlockGrid {
        let mut g = BlockGrid::new(size_x, size_y);
        for &(x, y) in blocked {
            g.set_blocked(Point::new(x, y), true);
        }
        g
    }

    #[test]
    fn edge_tiles_flank_the_edge() {
        let v = Point::new(2, 2);
        assert_eq!(edge_tiles(v, Point::new(1, 0)), (Point::new(2, 2), Point::new(2, 1)));
        assert_eq!(edge_tiles(v, Point::new(-1, 0)), (Point::new(1, 2), Point::new(1, 1)));
        assert_eq!(edge_tiles(v, Point::new(0, 1)), (Point::new(2, 2), Point::new(1, 2)));
        assert_eq!(edge_tiles(v, Point::new(0, -1)), (Point::new(2, 1), Point::new(1, 1)));
    }

    #[test]
    fn open_diagonal_is_one_jump() {
        let g = BlockGrid::new(3, 3);
        let mut ctx = SearchContext::default();
        let out = ctx
            .bounded_jps_path(&g, Point::new(0, 0), Point::new(3, 3), 3.0 * SQRT_2, &mut ())
            .unwrap();
        let path = out.path().unwrap();
        assert_eq!(path.vertices(), &[Point::new(0, 0), Point::new(3, 3)]);
        assert!((path.length() - 3.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn detour_around_block() {
        let g = grid_with(3, 3, &[(1, 1)]);
        let mut ctx = SearchContext::default();
        let out = ctx
            .bounded_jps_path(&g, Point::new(0, 0), Point::new(3, 3), 5.0, &mut ())
            .unwrap();
        let path = out.path().unwrap();
        let expected = 2.0 + 2.0 * SQRT_2;
        assert!((path.length() - expected).abs() < 1e-9);
        assert!(path.length() > 3.0 * SQRT_2);
        assert!(path.is_valid_on(&g));
        assert!((path.octile_length() - path.length()).abs() < 1e-9);
    }

    #[test]
    fn bound_below_detour_finds_nothing() {
        let g = grid_with(3, 3, &[(1, 1)]);
        let mut ctx = SearchContext::default();
        let out = ctx
            .bounded_jps_path(&g, Point::new(0, 0), Point::new(3, 3), 4.0, &mut ())
            .unwrap();
        assert_eq!(out, PathOutcome::NoPathWithinBound);
        let goal_id = g.to_index(Point::new(3, 3));
        assert!(!ctx.costs().is_visited(goal_id));
    }

    #[test]
    fn start_equals_goal() {
        let g = grid_with(3, 3, &[(1, 1)]);
        let mut ctx = SearchContext::default();
        let out = ctx
            .bounded_jps_path(&g, Point::new(2, 2), Point::new(2, 2), 0.0, &mut ())
            .unwrap();
        let path = out.into_path().unwrap();
        assert_eq!(path.vertices(), &[Point::new(2, 2)]);
        assert_eq!(path.length(), 0.0);
    }

    #[test]
    fn malformed_input() {
        let g = BlockGrid::new(3, 3);
        let mut ctx = SearchContext::default();
        assert_eq!(
            ctx.bounded_jps_path(&g, Point::new(0, 0), Point::new(4, 0), 9.0, &mut ()),
            Err(SearchError::VertexOutOfBounds {
                vertex: Point::new(4, 0),
                size: Point::new(3, 3)
            })
        );
        assert!(matches!(
            ctx.bounded_jps_path(&g, Point::new(0, 0), Point::new(1, 0), f64::NAN, &mut ()),
            Err(SearchError::InvalidBound(_))
        ));
        assert!(matches!(
            ctx.bounded_jps_path(&g, Point::new(0, 0), Point::new(1, 0), -1.0, &mut ()),
            Err(SearchError::InvalidBound(_))
        ));
        assert!(matches!(
            ctx.bounded_jps_path(&g, Point::new(0, 0), Point::new(1, 0), f64::INFINITY, &mut ()),
            Err(SearchError::InvalidBound(_))
        ));
    }

    #[test]
    fn ellipse_prunes_straight_jumps() {
        // With a tight bound, the straight jumps from the start leave the
        // ellipse on their first step.
        let g = BlockGrid::new(3, 3);
        let goal = Point::new(3, 3);
        let ellipse = SearchConfig::default().ellipse_size(3.0 * SQRT_2);
        let start = Point::ZERO;
        assert!(outside_ellipse(&g, ellipse, 0.0, start, Point::new(1, 0), goal));
        assert!(outside_ellipse(&g, ellipse, 0.0, start, Point::new(0, 1), goal));
        assert!(!outside_ellipse(&g, ellipse, 0.0, start, Point::new(1, 1), goal));
        assert!(!outside_ellipse(&g, ellipse, 0.0, start, goal, goal));
    }

    #[test]
    fn ellipse_grows_with_bound() {
        let g = BlockGrid::new(8, 8);
        let goal = Point::new(7, 5);
        let config = SearchConfig::default();
        let parent = Point::new(1, 2);
        for bound in [4.0, 6.5, 9.0, 13.0] {
            let small = config.ellipse_size(bound);
            let large = config.ellipse_size(bound * 1.5);
            for p in anyangle_core::Range::new(0, 0, 9, 9) {
                if !outside_ellipse(&g, small, 1.0, parent, p, goal) {
                    assert!(!outside_ellipse(&g, large, 1.0, parent, p, goal));
                }
            }
        }
    }

    #[test]
    fn heuristics_refreshed_inside_ellipse() {
        let g = grid_with(6, 6, &[(2, 2), (3, 2)]);
        let mut index = SparseVisibilityIndex::from_corners(&g);
        let corner = Point::new(4, 2);
        let id = index.index_of(corner).unwrap();
        assert_eq!(index.heuristic_at(corner), Some(f64::INFINITY));

        let mut ctx = SearchContext::default();
        let out = ctx
            .bounded_jps_path(&g, Point::new(0, 0), Point::new(6, 6), 20.0, &mut index)
            .unwrap();
        assert!(out.is_found());
        assert!(ctx.stats().heuristic_updates > 0);
        let h = index.heuristic(id);
        assert!(h.is_finite());
        // Never below the scaled straight-line distance from the start.
        assert!(h * SearchConfig::default().approximation_ratio + 1e-9 >= g.octile_distance(Point::ZERO, corner));
    }

    #[test]
    fn stop_at_goal_expands_no_more() {
        let g = grid_with(6, 6, &[(2, 2), (3, 2)]);
        let start = Point::new(0, 0);
        let goal = Point::new(6, 6);

        let mut drain = SearchContext::default();
        let full = drain.bounded_jps_path(&g, start, goal, 20.0, &mut ()).unwrap();
        let mut early = SearchContext::new(SearchConfig::default().with_stop_at_goal(true));
        let quick = early.bounded_jps_path(&g, start, goal, 20.0, &mut ()).unwrap();

        assert!(early.stats().expanded <= drain.stats().expanded);
        let (a, b) = (full.path().unwrap(), quick.path().unwrap());
        assert!((a.length() - b.length()).abs() < 1e-9);
    }

    #[test]
    fn trace_records_visits_and_relaxations() {
        let g = grid_with(3, 3, &[(1, 1)]);
        let mut ctx = SearchContext::new(SearchConfig::default().with_record_trace(true));
        ctx.bounded_jps_path(&g, Point::new(0, 0), Point::new(3, 3), 5.0, &mut ())
            .unwrap();
        let events = ctx.take_trace();
        assert!(matches!(
            events.first(),
            Some(SearchEvent::Visited { vertex, distance }) if *vertex == Point::ZERO && *distance == 0.0
        ));
        assert!(events.iter().any(|e| matches!(e, SearchEvent::Relaxed { .. })));
        let visits = events
            .iter()
            .filter(|e| matches!(e, SearchEvent::Visited { .. }))
            .count();
        assert_eq!(visits, ctx.stats().expanded);
    }

    #[test]
    fn context_is_reusable() {
        let blocked = grid_with(3, 3, &[(1, 1)]);
        let open = BlockGrid::new(5, 5);
        let mut ctx = SearchContext::default();
        let a = ctx
            .bounded_jps_path(&blocked, Point::new(0, 0), Point::new(3, 3), 5.0, &mut ())
            .unwrap();
        assert!(a.is_found());
        let b = ctx
            .bounded_jps_path(&open, Point::new(0, 0), Point::new(5, 0), 5.0, &mut ())
            .unwrap();
        assert_eq!(b.path().unwrap().vertices(), &[Point::new(0, 0), Point::new(5, 0)]);
        let c = ctx
            .bounded_jps_path(&blocked, Point::new(0, 0), Point::new(3, 3), 4.0, &mut ())
            .unwrap();
        assert!(!c.is_found());
    }
}
