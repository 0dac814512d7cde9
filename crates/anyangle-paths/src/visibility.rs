//! Reference sparse visibility index.

use std::collections::HashMap;

use anyangle_core::{Occupancy, Point};

use crate::scanner::LineOfSightScanner;
use crate::traits::VisibilityIndex;

/// A set of indexed vertices, each with a heuristic estimate and the
/// indexed vertices it sees tautly.
///
/// Heuristics start at `+∞` and only ever decrease.
#[derive(Debug, Clone, Default)]
pub struct SparseVisibilityIndex {
    ids: HashMap<Point, usize>,
    points: Vec<Point>,
    heuristics: Vec<f64>,
    adjacency: Vec<Vec<usize>>,
}

impl SparseVisibilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every outer convex corner of `grid`: the vertices touching
    /// exactly one blocked tile.
    pub fn from_corners<G: Occupancy + ?Sized>(grid: &G) -> Self {
        let mut index = Self::new();
        for v in grid.vertices() {
            if grid.blocked_around(v) == 1 {
                index.insert(v);
            }
        }
        index
    }

    /// Node id of `p`, adding it when absent.
    pub fn insert(&mut self, p: Point) -> usize {
        if let Some(&id) = self.ids.get(&p) {
            return id;
        }
        let id = self.points.len();
        self.ids.insert(p, id);
        self.points.push(p);
        self.heuristics.push(f64::INFINITY);
        self.adjacency.push(Vec::new());
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertex of node `id`.
    pub fn point(&self, id: usize) -> Point {
        self.points[id]
    }

    /// Heuristic of node `id`.
    pub fn heuristic(&self, id: usize) -> f64 {
        self.heuristics[id]
    }

    /// Heuristic of vertex `p`, or `None` when `p` is not indexed.
    pub fn heuristic_at(&self, p: Point) -> Option<f64> {
        self.ids.get(&p).map(|&id| self.heuristics[id])
    }

    /// Indexed nodes seen tautly from node `id`, as filled by
    /// [`connect`](Self::connect).
    pub fn neighbours(&self, id: usize) -> &[usize] {
        &self.adjacency[id]
    }

    /// Reset every heuristic to `+∞`.
    pub fn reset_heuristics(&mut self) {
        self.heuristics.fill(f64::INFINITY);
    }

    /// Rebuild the adjacency lists from the two-way taut successors of
    /// each node, keeping only successors that are indexed. Nodes that are
    /// not outer corners of `grid` get no edges.
    pub fn connect<G: Occupancy + ?Sized>(&mut self, grid: &G, scanner: &mut LineOfSightScanner) {
        let mut edges = 0;
        for id in 0..self.points.len() {
            let p = self.points[id];
            if grid.blocked_around(p) != 1 {
                self.adjacency[id].clear();
                continue;
            }
            let successors = scanner.two_way_taut_successors(grid, p);
            let adjacent: Vec<usize> = successors
                .iter()
                .filter_map(|p| self.ids.get(p).copied())
                .filter(|&other| other != id)
                .collect();
            edges += adjacent.len();
            self.adjacency[id] = adjacent;
        }
        log::debug!("visibility index: {} nodes, {edges} edges", self.points.len());
    }
}

impl VisibilityIndex for SparseVisibilityIndex {
    #[inline]
    fn index_of(&self, p: Point) -> Option<usize> {
        self.ids.get(&p).copied()
    }

    fn try_update_heuristic(&mut self, index: usize, value: f64) -> bool {
        match self.heuristics.get_mut(index) {
            Some(h) if value < *h => {
                *h = value;
                true
            }
            _ => false,
        }
    }
}
