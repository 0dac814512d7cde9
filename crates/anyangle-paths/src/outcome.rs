//! Results of a path query.

use std::fmt;

use anyangle_core::{Occupancy, Point, octile};

/// An any-angle path: vertices from start to goal inclusive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    vertices: Vec<Point>,
    length: f64,
}

impl Path {
    /// A path through `vertices` with the given finalized length.
    pub(crate) fn new(vertices: Vec<Point>, length: f64) -> Self {
        debug_assert!(!vertices.is_empty());
        Self { vertices, length }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Point> {
        self.vertices
    }

    /// The finalized distance of the goal.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.vertices[0]
    }

    #[inline]
    pub fn goal(&self) -> Point {
        self.vertices[self.vertices.len() - 1]
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`: a path holds at least its start.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }

    /// Sum of the octile lengths of the segments.
    pub fn octile_length(&self) -> f64 {
        self.segments().map(|(a, b)| octile(a, b)).sum()
    }

    /// Whether every segment has line of sight on `grid`.
    pub fn is_valid_on(&self, grid: &impl Occupancy) -> bool {
        self.segments().all(|(a, b)| grid.line_of_sight(a, b))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, " [{:.3}]", self.length)
    }
}

/// What a bounded query found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathOutcome {
    Found(Path),
    /// The goal was not finalized: no path exists whose length fits the
    /// supplied upper bound.
    NoPathWithinBound,
}

impl PathOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(p) => Some(p),
            Self::NoPathWithinBound => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::Found(p) => Some(p),
            Self::NoPathWithinBound => None,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Malformed query input.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// A start or goal that is not a vertex of the grid.
    VertexOutOfBounds { vertex: Point, size: Point },
    /// The upper bound is NaN, infinite or negative.
    InvalidBound(f64),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexOutOfBounds { vertex, size } => write!(
                f,
                "search: vertex {vertex} outside grid of {}x{} tiles",
                size.x, size.y
            ),
            Self::InvalidBound(b) => write!(f, "search: invalid upper bound {b}"),
        }
    }
}

impl std::error::Error for SearchError {}
