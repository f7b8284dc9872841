//! LRU List Module
//!
//! Intrusive doubly-linked recency list for cache eviction.

// == Node ==
#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Recency order of cache keys with O(1) touch, removal and eviction.
///
/// Nodes live in a slab and are addressed by the slot index returned from
/// [`LruList::push_back`]. The store keeps that index next to each entry.
/// - Head = least recently used (next eviction candidate)
/// - Tail = most recently used
#[derive(Debug, Default)]
pub struct LruList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Back ==
    /// Inserts a key as the most recently used and returns its slot.
    pub fn push_back(&mut self, key: String) -> usize {
        let node = Node {
            key,
            prev: None,
            next: None,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        self.link_back(slot);
        self.len += 1;
        slot
    }

    // == Touch ==
    /// Marks a slot as most recently used.
    pub fn move_to_back(&mut self, slot: usize) {
        if self.tail == Some(slot) || !self.is_live(slot) {
            return;
        }
        self.unlink(slot);
        self.link_back(slot);
    }

    // == Remove ==
    /// Removes a slot and returns its key.
    pub fn remove(&mut self, slot: usize) -> Option<String> {
        if !self.is_live(slot) {
            return None;
        }
        self.unlink(slot);
        self.len -= 1;
        self.free.push(slot);
        self.nodes[slot].take().map(|node| node.key)
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn pop_front(&mut self) -> Option<String> {
        let head = self.head?;
        self.remove(head)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            match self.node(slot) {
                Some(node) => {
                    keys.push(node.key.as_str());
                    cursor = node.next;
                }
                None => break,
            }
        }
        keys
    }

    // == Internal Linking ==
    fn is_live(&self, slot: usize) -> bool {
        matches!(self.nodes.get(slot), Some(Some(_)))
    }

    fn node(&self, slot: usize) -> Option<&Node> {
        self.nodes.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node> {
        self.nodes.get_mut(slot).and_then(Option::as_mut)
    }

    fn unlink(&mut self, slot: usize) {
        let Some(node) = self.node_mut(slot) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.node_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(next_node) = self.node_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn link_back(&mut self, slot: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(slot) {
            node.prev = old_tail;
            node.next = None;
        }

        match old_tail {
            Some(t) => {
                if let Some(tail_node) = self.node_mut(t) {
                    tail_node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}
