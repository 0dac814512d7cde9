use anyangle_core::Point;

/// Sparse map from vertices to graph nodes carrying a heuristic estimate.
///
/// The bounded search refines the estimates as it walks over indexed
/// vertices.
pub trait VisibilityIndex {
    /// Node id of `p`, or `None` when `p` is not indexed.
    fn index_of(&self, p: Point) -> Option<usize>;

    /// Lower the heuristic of node `index` to `value`. Returns whether the
    /// stored value changed; a value that is not smaller is ignored.
    fn try_update_heuristic(&mut self, index: usize, value: f64) -> bool;
}

/// Indexes nothing.
impl VisibilityIndex for () {
    #[inline]
    fn index_of(&self, _p: Point) -> Option<usize> {
        None
    }

    #[inline]
    fn try_update_heuristic(&mut self, _index: usize, _value: f64) -> bool {
        false
    }
}
