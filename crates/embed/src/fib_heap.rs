//! An arena-backed Fibonacci heap with decrease-key.
//!
//! Nodes live in one flat arena and reference each other by index, so no
//! unsafe pointer surgery is needed and a handle stays a plain index.
//! Sibling lists are circular and doubly linked. The implementation
//! follows the textbook structure [1]: lazy inserts into the root list,
//! consolidation by tree degree on extract-min, and cascading cuts on
//! decrease-key.
//!
//! [1] Cormen, Leiserson, Rivest, Stein:
//! "Introduction to Algorithms", chapter "Fibonacci Heaps"
//!
//! Deleting arbitrary entries is not supported; the shortest-path sweeps
//! in [`crate::shortest_paths`] only ever push, pop the minimum and
//! decrease keys.

/// A handle to a heap entry, valid for the heap that returned it until the
/// entry is popped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Handle(usize);

#[derive(Debug)]
struct Node<V> {
    value: Option<V>,
    key: f64,
    parent: Option<usize>,
    child: Option<usize>,
    left: usize,
    right: usize,
    degree: usize,
    marked: bool,
}

/// A min-heap over `f64` keys with amortized O(1) push and decrease-key
/// and amortized O(log n) pop-min.
#[derive(Debug, Default)]
pub struct FibonacciHeap<V> {
    nodes: Vec<Node<V>>,
    min: Option<usize>,
    len: usize,
}

impl<V> FibonacciHeap<V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            min: None,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            min: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a value under the given key.
    pub fn push(&mut self, key: f64, value: V) -> Handle {
        let index = self.nodes.len();
        self.nodes.push(Node {
            value: Some(value),
            key,
            parent: None,
            child: None,
            left: index,
            right: index,
            degree: 0,
            marked: false,
        });

        self.add_root(index);
        if let Some(min) = self.min {
            if self.nodes[index].key < self.nodes[min].key {
                self.min = Some(index);
            }
        }
        self.len += 1;

        Handle(index)
    }

    /// The key of a live entry.
    pub fn key(&self, handle: Handle) -> f64 {
        self.nodes[handle.0].key
    }

    pub fn peek_min(&self) -> Option<(f64, &V)> {
        let min = self.min?;
        let node = &self.nodes[min];
        node.value.as_ref().map(|value| (node.key, value))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_min(&mut self) -> Option<(f64, V)> {
        let min = self.min?;

        // Promote all children of the minimum to roots.
        if let Some(first_child) = self.nodes[min].child {
            let mut children = Vec::with_capacity(self.nodes[min].degree);
            let mut current = first_child;
            loop {
                children.push(current);
                current = self.nodes[current].right;
                if current == first_child {
                    break;
                }
            }
            for child in children {
                self.nodes[child].parent = None;
                self.nodes[child].marked = false;
                self.add_root(child);
            }
            self.nodes[min].child = None;
            self.nodes[min].degree = 0;
        }

        // Unlink the minimum from the root list.
        let (left, right) = (self.nodes[min].left, self.nodes[min].right);
        if right == min {
            self.min = None;
        } else {
            self.nodes[left].right = right;
            self.nodes[right].left = left;
            self.min = Some(right);
            self.consolidate();
        }

        self.nodes[min].left = min;
        self.nodes[min].right = min;
        self.len -= 1;

        let key = self.nodes[min].key;
        self.nodes[min].value.take().map(|value| (key, value))
    }

    /// Lowers the key of a live entry. Keys can only decrease; a key at or
    /// above the current one is ignored, as is a handle that was already
    /// popped.
    pub fn decrease_key(&mut self, handle: Handle, key: f64) {
        let index = handle.0;
        if self.nodes[index].value.is_none() || key >= self.nodes[index].key {
            return;
        }
        self.nodes[index].key = key;

        if let Some(parent) = self.nodes[index].parent {
            if key < self.nodes[parent].key {
                self.cut(index, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if key < self.nodes[min].key {
                self.min = Some(index);
            }
        }
    }

    /// Splices a detached node into the root list next to the current
    /// minimum. Does not compare keys; callers adjust `min` themselves.
    fn add_root(&mut self, index: usize) {
        self.nodes[index].parent = None;
        match self.min {
            Some(min) => {
                let right = self.nodes[min].right;
                self.nodes[min].right = index;
                self.nodes[index].left = min;
                self.nodes[index].right = right;
                self.nodes[right].left = index;
            }
            None => {
                self.nodes[index].left = index;
                self.nodes[index].right = index;
                self.min = Some(index);
            }
        }
    }

    /// Merges root trees of equal degree until all degrees are distinct,
    /// then rebuilds the root list and locates the new minimum.
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };

        let mut roots = Vec::new();
        let mut current = start;
        loop {
            roots.push(current);
            current = self.nodes[current].right;
            if current == start {
                break;
            }
        }

        // Degrees are bounded by log_phi(len); usize::BITS covers every
        // possible length with room to spare.
        let mut slots: Vec<Option<usize>> = vec![None; usize::BITS as usize * 2];

        for root in roots {
            let mut tree = root;
            loop {
                let degree = self.nodes[tree].degree;
                match slots[degree].take() {
                    None => {
                        slots[degree] = Some(tree);
                        break;
                    }
                    Some(other) => {
                        let (parent, child) = if self.nodes[other].key < self.nodes[tree].key {
                            (other, tree)
                        } else {
                            (tree, other)
                        };
                        self.link(child, parent);
                        tree = parent;
                    }
                }
            }
        }

        self.min = None;
        for slot in slots {
            let Some(root) = slot else {
                continue;
            };
            match self.min {
                None => {
                    self.nodes[root].left = root;
                    self.nodes[root].right = root;
                    self.nodes[root].parent = None;
                    self.min = Some(root);
                }
                Some(min) => {
                    self.add_root(root);
                    if self.nodes[root].key < self.nodes[min].key {
                        self.min = Some(root);
                    }
                }
            }
        }
    }

    /// Attaches `child` under `parent`; both are detached from the root
    /// list conceptually, which [`FibonacciHeap::consolidate`] makes true
    /// by rebuilding it afterwards.
    fn link(&mut self, child: usize, parent: usize) {
        self.nodes[child].parent = Some(parent);
        self.nodes[child].marked = false;

        match self.nodes[parent].child {
            Some(first) => {
                let right = self.nodes[first].right;
                self.nodes[first].right = child;
                self.nodes[child].left = first;
                self.nodes[child].right = right;
                self.nodes[right].left = child;
            }
            None => {
                self.nodes[parent].child = Some(child);
                self.nodes[child].left = child;
                self.nodes[child].right = child;
            }
        }
        self.nodes[parent].degree += 1;
    }

    /// Moves `index` out of `parent`'s child list into the root list.
    fn cut(&mut self, index: usize, parent: usize) {
        let (left, right) = (self.nodes[index].left, self.nodes[index].right);
        if right == index {
            self.nodes[parent].child = None;
        } else {
            self.nodes[left].right = right;
            self.nodes[right].left = left;
            if self.nodes[parent].child == Some(index) {
                self.nodes[parent].child = Some(right);
            }
        }
        self.nodes[parent].degree -= 1;

        self.add_root(index);
        self.nodes[index].marked = false;
    }

    /// Walks up the tree, cutting every already-marked ancestor.
    fn cascading_cut(&mut self, mut index: usize) {
        while let Some(parent) = self.nodes[index].parent {
            if !self.nodes[index].marked {
                self.nodes[index].marked = true;
                break;
            }
            self.cut(index, parent);
            index = parent;
        }
    }
}
