use crate::geom::Point;

/// √2, the length of one diagonal step.
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Octile distance: diagonal steps cost √2, axis steps cost 1.
#[inline]
pub fn octile(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    lo as f64 * SQRT_2 + (hi - lo) as f64
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}
