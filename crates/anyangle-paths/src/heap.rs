//! Binary min-heap over vertex ids with decrease-key.

const ABSENT: usize = usize::MAX;

/// A min-heap of ids in `0..len` keyed by `f64`, where each id is present
/// at most once and its key can be lowered in place.
#[derive(Debug, Clone, Default)]
pub struct IndexedHeap {
    heap: Vec<(f64, usize)>,
    pos: Vec<usize>,
}

impl IndexedHeap {
    /// An empty heap accepting ids in `0..len`.
    pub fn new(len: usize) -> Self {
        Self {
            heap: Vec::new(),
            pos: vec![ABSENT; len],
        }
    }

    /// Empty the heap and accept ids in `0..len`.
    pub fn reset(&mut self, len: usize) {
        for &(_, id) in &self.heap {
            self.pos[id] = ABSENT;
        }
        self.heap.clear();
        if len > self.pos.len() {
            self.pos.resize(len, ABSENT);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        self.pos.get(id).is_some_and(|&p| p != ABSENT)
    }

    /// Current key of `id`, if queued.
    pub fn key(&self, id: usize) -> Option<f64> {
        match self.pos.get(id) {
            Some(&p) if p != ABSENT => Some(self.heap[p].0),
            _ => None,
        }
    }

    /// Queue `id` with `key`, or lower its key if already queued.
    /// Returns `false` when `id` was queued with a key that is not larger.
    pub fn push_or_decrease(&mut self, id: usize, key: f64) -> bool {
        let p = self.pos[id];
        if p == ABSENT {
            self.heap.push((key, id));
            let last = self.heap.len() - 1;
            self.pos[id] = last;
            self.sift_up(last);
            return true;
        }
        if key >= self.heap[p].0 {
            return false;
        }
        self.heap[p].0 = key;
        self.sift_up(p);
        true
    }

    /// Smallest key, if any.
    #[inline]
    pub fn peek_min_key(&self) -> Option<f64> {
        self.heap.first().map(|&(k, _)| k)
    }

    /// Remove and return the id with the smallest key.
    pub fn pop_min(&mut self) -> Option<(usize, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (key, id) = self.heap.pop()?;
        self.pos[id] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((id, key))
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.pos[self.heap[a].1] = a;
        self.pos[self.heap[b].1] = b;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].0 >= self.heap[parent].0 {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let l = 2 * i + 1;
            let r = l + 1;
            let mut smallest = i;
            if l < n && self.heap[l].0 < self.heap[smallest].0 {
                smallest = l;
            }
            if r < n && self.heap[r].0 < self.heap[smallest].0 {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_key_order() {
        let mut h = IndexedHeap::new(6);
        for (id, k) in [(0, 5.0), (1, 1.0), (2, 4.0), (3, 2.0), (4, 3.0)] {
            assert!(h.push_or_decrease(id, k));
        }
        assert_eq!(h.len(), 5);
        assert_eq!(h.peek_min_key(), Some(1.0));
        let order: Vec<usize> = std::iter::from_fn(|| h.pop_min().map(|(id, _)| id)).collect();
        assert_eq!(order, vec![1, 3, 4, 2, 0]);
        assert!(h.is_empty());
        assert_eq!(h.pop_min(), None);
    }

    #[test]
    fn decrease_key_moves_entry_up() {
        let mut h = IndexedHeap::new(4);
        h.push_or_decrease(0, 1.0);
        h.push_or_decrease(1, 9.0);
        h.push_or_decrease(2, 5.0);
        assert!(!h.push_or_decrease(1, 10.0));
        assert_eq!(h.key(1), Some(9.0));
        assert!(h.push_or_decrease(1, 0.5));
        assert_eq!(h.pop_min(), Some((1, 0.5)));
        assert_eq!(h.pop_min(), Some((0, 1.0)));
        assert!(!h.contains(1));
        assert!(h.contains(2));
    }

    #[test]
    fn infinite_keys_sort_last() {
        let mut h = IndexedHeap::new(3);
        h.push_or_decrease(0, f64::INFINITY);
        h.push_or_decrease(1, 7.0);
        assert_eq!(h.pop_min(), Some((1, 7.0)));
        assert_eq!(h.peek_min_key(), Some(f64::INFINITY));
    }

    #[test]
    fn reset_empties_and_grows() {
        let mut h = IndexedHeap::new(2);
        h.push_or_decrease(0, 1.0);
        h.push_or_decrease(1, 2.0);
        h.reset(5);
        assert!(h.is_empty());
        assert!(!h.contains(0));
        assert!(h.push_or_decrease(4, 3.0));
        assert_eq!(h.key(4), Some(3.0));
    }
}
