//! Tunables of the bounded search.

/// `√(4 − 2√2)`: the worst-case ratio between an octile path and the
/// Euclidean path it approximates.
pub const APPROXIMATION_RATIO: f64 = 1.082_392_200_292_393_8;

/// Slack added to the ellipse size against rounding in summed distances.
pub const ELLIPSE_BUFFER: f64 = 1e-6;

/// Configuration of a [`SearchContext`](crate::SearchContext).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Factor between the upper bound and the ellipse size, also the
    /// divisor applied to heuristic refreshes.
    pub approximation_ratio: f64,
    /// Added to the ellipse size.
    pub ellipse_buffer: f64,
    /// End the query as soon as the goal is finalized instead of draining
    /// the queue. Draining refreshes the heuristic of every reachable
    /// indexed vertex inside the ellipse.
    pub stop_at_goal: bool,
    /// Record search events into the context's trace.
    pub record_trace: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            approximation_ratio: APPROXIMATION_RATIO,
            ellipse_buffer: ELLIPSE_BUFFER,
            stop_at_goal: false,
            record_trace: false,
        }
    }
}

impl SearchConfig {
    pub fn with_approximation_ratio(mut self, ratio: f64) -> Self {
        self.approximation_ratio = ratio;
        self
    }

    pub fn with_ellipse_buffer(mut self, buffer: f64) -> Self {
        self.ellipse_buffer = buffer;
        self
    }

    pub fn with_stop_at_goal(mut self, stop: bool) -> Self {
        self.stop_at_goal = stop;
        self
    }

    pub fn with_record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// Size of the admissible ellipse for a known path length.
    #[inline]
    pub fn ellipse_size(&self, upper_bound: f64) -> f64 {
        upper_bound * self.approximation_ratio + self.ellipse_buffer
    }
}
