use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use goap_core::StateKey;

#[derive(Debug, Clone, Copy)]
struct Entry {
    f: f64,
    seq: u64,
    node: usize,
    key: StateKey,
}

impl Entry {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then(self.seq.cmp(&other.seq))
            .then(self.node.cmp(&other.node))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.cmp_key(self)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct Live {
    node: usize,
    g: f64,
    seq: u64,
}

/// Open set keyed by `f`, holding at most one live node per state.
///
/// Ties on `f` go to the earliest insertion. Replacing a state's node with a cheaper one keeps
/// the original insertion slot; the superseded heap entry is skipped lazily on pop.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<Entry>,
    live: HashMap<StateKey, Live>,
    next_seq: u64,
}

impl Frontier {
    /// Whether a node for `key` reached with cost `g` would be accepted.
    pub fn improves(&self, key: &StateKey, g: f64) -> bool {
        self.live.get(key).map_or(true, |live| g < live.g)
    }

    /// Insert `node`, replacing any live node for the same state.
    pub fn insert(&mut self, key: StateKey, node: usize, g: f64, f: f64) {
        let seq = match self.live.get(&key) {
            Some(live) => live.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.live.insert(key, Live { node, g, seq });
        self.heap.push(Entry { f, seq, node, key });
    }

    /// Remove and return the live node with the lowest `f`.
    pub fn pop(&mut self) -> Option<usize> {
        while let Some(entry) = self.heap.pop() {
            let current = self.live.get(&entry.key).map(|live| live.node);
            if current == Some(entry.node) {
                self.live.remove(&entry.key);
                return Some(entry.node);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }
}
