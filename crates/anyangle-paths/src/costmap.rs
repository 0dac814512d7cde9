//! Per-query vertex state: tentative distance, parent and visited flag.

/// Per-vertex search state keyed by linear vertex id.
///
/// Slots carry a generation stamp, so starting a new query is a counter
/// bump rather than a pass over the whole map. A slot whose stamp is stale
/// reads as unvisited with distance `+∞` and no parent.
#[derive(Debug, Clone)]
pub struct CostMap {
    slots: Vec<Slot>,
    len: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    distance: f64,
    parent: Option<usize>,
    visited: bool,
    generation: u32,
}

impl Slot {
    const STALE: Slot = Slot {
        distance: f64::INFINITY,
        parent: None,
        visited: false,
        generation: 0,
    };
}

impl Default for CostMap {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CostMap {
    /// A cost map for `len` vertices, all unreached.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Slot::STALE; len],
            len,
            generation: 1,
        }
    }

    /// Forget every value and resize to `len` vertices. Storage is only
    /// reallocated when `len` exceeds what is already held.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        if len > self.slots.len() {
            self.slots.clear();
            self.slots.resize(len, Slot::STALE);
            self.generation = 1;
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.slots.fill(Slot::STALE);
            self.generation = 1;
        }
    }

    /// Number of vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot(&self, id: usize) -> Slot {
        let s = self.slots[id];
        if s.generation == self.generation {
            s
        } else {
            Slot::STALE
        }
    }

    #[inline]
    fn slot_mut(&mut self, id: usize) -> &mut Slot {
        let generation = self.generation;
        let s = &mut self.slots[id];
        if s.generation != generation {
            *s = Slot {
                generation,
                ..Slot::STALE
            };
        }
        s
    }

    /// Tentative distance of `id`, `+∞` when unreached.
    #[inline]
    pub fn distance(&self, id: usize) -> f64 {
        self.slot(id).distance
    }

    #[inline]
    pub fn set_distance(&mut self, id: usize, distance: f64) {
        self.slot_mut(id).distance = distance;
    }

    #[inline]
    pub fn parent(&self, id: usize) -> Option<usize> {
        self.slot(id).parent
    }

    #[inline]
    pub fn set_parent(&mut self, id: usize, parent: Option<usize>) {
        self.slot_mut(id).parent = parent;
    }

    /// Whether the distance of `id` is final.
    #[inline]
    pub fn is_visited(&self, id: usize) -> bool {
        self.slot(id).visited
    }

    #[inline]
    pub fn set_visited(&mut self, id: usize) {
        self.slot_mut(id).visited = true;
    }

    /// Follow parent links from `id` back to a root, returning the ids
    /// root first.
    pub fn trace_back(&self, id: usize) -> Vec<usize> {
        let mut ids = vec![id];
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            ids.push(p);
            cur = p;
        }
        ids.reverse();
        ids
    }
}
