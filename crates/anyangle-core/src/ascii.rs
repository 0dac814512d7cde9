//! Text maps: `#` for a blocked tile, `.` for an open one.
//!
//! The first line of the text is the topmost tile row, so a map reads the
//! way it is drawn even though y grows upward.

use std::fmt;
use std::str::FromStr;

use crate::geom::Point;
use crate::grid::{BlockGrid, Occupancy};

const BLOCKED: char = '#';
const OPEN: char = '.';

/// Error returned by [`BlockGrid::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapParseError {
    /// No tiles at all.
    Empty,
    /// A line is not as wide as the first one.
    InconsistentSize { line: usize, expected: usize, found: usize },
    /// A character other than `#` or `.`. `pos` is in text coordinates:
    /// column and line, starting at the top.
    InvalidRune { ch: char, pos: Point },
}

impl fmt::Display for MapParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "map: no tiles"),
            Self::InconsistentSize {
                line,
                expected,
                found,
            } => write!(
                f,
                "map: line {line} has {found} tiles, expected {expected}"
            ),
            Self::InvalidRune { ch, pos } => write!(
                f,
                "map contains invalid rune \u{201c}{ch}\u{201d} at ({}, {})",
                pos.x, pos.y
            ),
        }
    }
}

impl std::error::Error for MapParseError {}

impl BlockGrid {
    /// Parse a text map.
    ///
    /// Surrounding whitespace of the whole text is ignored, as is trailing
    /// whitespace (including `\r`) of each line.
    pub fn parse(s: &str) -> Result<Self, MapParseError> {
        let lines: Vec<&str> = s.trim().lines().map(str::trim_end).collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if width == 0 {
            return Err(MapParseError::Empty);
        }
        let height = lines.len();
        let mut grid = BlockGrid::new(width as i32, height as i32);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapParseError::InconsistentSize {
                    line: row,
                    expected: width,
                    found,
                });
            }
            let y = (height - 1 - row) as i32;
            for (x, ch) in line.chars().enumerate() {
                match ch {
                    BLOCKED => {
                        grid.set_blocked(Point::new(x as i32, y), true);
                    }
                    OPEN => {}
                    _ => {
                        return Err(MapParseError::InvalidRune {
                            ch,
                            pos: Point::new(x as i32, row as i32),
                        });
                    }
                }
            }
        }
        Ok(grid)
    }
}

impl FromStr for BlockGrid {
    type Err = MapParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockGrid {
    /// Renders in the format accepted by [`BlockGrid::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.size_y()).rev() {
            for x in 0..self.size_x() {
                let ch = if self.is_blocked(Point::new(x, y)) {
                    BLOCKED
                } else {
                    OPEN
                };
                write!(f, "{ch}")?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
