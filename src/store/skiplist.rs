//! Arena-backed skiplist
//!
//! Nodes live in a single `Vec` and refer to each other by index, so there are
//! no owning pointers between nodes and removing a node never invalidates the
//! handles of the others. Every node keeps a forward and a backward link for
//! each level it participates in, which makes removal O(levels) without a
//! search.
//!
//! Two reserved indices stand in for missing links:
//! - `NIL` marks "no node" (end of a level, or a vacant free-list tail)
//! - `HEAD` is the before-first sentinel; its forward links are stored in the
//!   list itself and it never holds an element
//!
//! Removed slots are threaded onto a free list and reused by later inserts.
//!
//! # Level assignment
//!
//! Node heights come from a [`LevelPolicy`]. The default [`GeometricLevels`]
//! counts fair coin flips, never answering more than one level above the
//! current height, so the list grows by at most one level per insert.

use super::{Keyed, OrderedStore};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Maximum number of levels a skiplist can grow to
pub const MAX_LEVEL: usize = 32;

const NIL: usize = usize::MAX;
const HEAD: usize = usize::MAX - 1;

/// Chooses how many levels a newly inserted node spans
pub trait LevelPolicy {
    /// Level count for a new node, given the list's current height `top`
    ///
    /// Answers are clamped by the list to `1..=top + 1` and to [`MAX_LEVEL`].
    fn level(&mut self, top: usize) -> usize;
}

/// Geometric level draw with success probability 1/2
#[derive(Clone, Debug)]
pub struct GeometricLevels<R = SmallRng> {
    rng: R,
}

impl GeometricLevels {
    /// Deterministic level source, for reproducible layouts in tests
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> GeometricLevels<R> {
    /// Draw levels from the given random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for GeometricLevels {
    fn default() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl<R: RngCore> LevelPolicy for GeometricLevels<R> {
    fn level(&mut self, top: usize) -> usize {
        let mut level = 1;
        while level <= top && self.rng.gen::<bool>() {
            level += 1;
        }
        level
    }
}

/// Handle to a node in a [`Skiplist`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot backing this handle
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    item: T,
    /// Forward links, one per level
    next: Vec<usize>,
    /// Backward links, one per level; `HEAD` for the first node on a level
    prev: Vec<usize>,
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: usize },
}

/// Sorted skiplist over [`Keyed`] elements
///
/// # Example
///
/// ```
/// use gkstream::store::{GeometricLevels, Keyed, OrderedStore, Skiplist};
///
/// #[derive(Debug, Clone)]
/// struct Tick(u32);
///
/// impl Keyed for Tick {
///     type Key = u32;
///     fn key(&self) -> u32 {
///         self.0
///     }
/// }
///
/// let mut list = Skiplist::with_policy(GeometricLevels::seeded(7));
/// let middle = list.insert(Tick(5));
/// list.insert(Tick(1));
/// list.insert(Tick(9));
///
/// assert_eq!(list.get(list.prev(middle).unwrap()).0, 1);
/// assert_eq!(list.remove(middle).0, 5);
/// assert_eq!(list.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Skiplist<T, L = GeometricLevels> {
    slots: Vec<Slot<T>>,
    /// Forward links of the `HEAD` sentinel
    head: [usize; MAX_LEVEL],
    tail: usize,
    free: usize,
    /// Levels currently in use, at least 1
    height: usize,
    len: usize,
    policy: L,
}

impl<T: Keyed> Skiplist<T> {
    /// Create an empty list with entropy-seeded geometric levels
    pub fn new() -> Self {
        Self::with_policy(GeometricLevels::default())
    }
}

impl<T: Keyed> Default for Skiplist<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed, L: LevelPolicy> Skiplist<T, L> {
    /// Create an empty list using `policy` for node heights
    pub fn with_policy(policy: L) -> Self {
        Self {
            slots: Vec::new(),
            head: [NIL; MAX_LEVEL],
            tail: NIL,
            free: NIL,
            height: 1,
            len: 0,
            policy,
        }
    }

    /// Number of levels currently in use
    pub fn height(&self) -> usize {
        self.height
    }

    fn node(&self, idx: usize) -> &Node<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("skiplist slot {} is not occupied", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("skiplist slot {} is not occupied", idx),
        }
    }

    fn next_at(&self, idx: usize, level: usize) -> usize {
        if idx == HEAD {
            self.head[level]
        } else {
            self.node(idx).next[level]
        }
    }

    fn set_next(&mut self, idx: usize, level: usize, to: usize) {
        if idx == HEAD {
            self.head[level] = to;
        } else {
            self.node_mut(idx).next[level] = to;
        }
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        if self.free == NIL {
            self.slots.push(Slot::Occupied(node));
            return self.slots.len() - 1;
        }
        let idx = self.free;
        self.free = match self.slots[idx] {
            Slot::Vacant { next_free } => next_free,
            Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
        };
        self.slots[idx] = Slot::Occupied(node);
        idx
    }
}

impl<T: Keyed, L: LevelPolicy> OrderedStore<T> for Skiplist<T, L> {
    type Handle = NodeId;

    fn insert(&mut self, item: T) -> NodeId {
        let key = item.key();
        let level = self
            .policy
            .level(self.height)
            .clamp(1, (self.height + 1).min(MAX_LEVEL));
        if level > self.height {
            self.height = level;
        }

        // Rightmost node on each level whose key is <= the new key
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;
        for l in (0..self.height).rev() {
            loop {
                let n = self.next_at(x, l);
                if n != NIL && self.node(n).item.key() <= key {
                    x = n;
                } else {
                    break;
                }
            }
            update[l] = x;
        }

        let next: Vec<usize> = (0..level).map(|l| self.next_at(update[l], l)).collect();
        let prev = update[..level].to_vec();
        let idx = self.alloc(Node { item, next, prev });

        for l in 0..level {
            let succ = self.next_at(update[l], l);
            self.set_next(update[l], l, idx);
            if succ != NIL {
                self.node_mut(succ).prev[l] = idx;
            }
        }

        if self.node(idx).next[0] == NIL {
            self.tail = idx;
        }
        self.len += 1;
        NodeId(idx)
    }

    fn remove(&mut self, handle: NodeId) -> T {
        let idx = handle.0;
        let slot = core::mem::replace(&mut self.slots[idx], Slot::Vacant { next_free: self.free });
        let node = match slot {
            Slot::Occupied(node) => node,
            vacant @ Slot::Vacant { .. } => {
                self.slots[idx] = vacant;
                panic!("skiplist handle {} was already removed", idx);
            }
        };
        self.free = idx;

        for (l, (&p, &n)) in node.prev.iter().zip(node.next.iter()).enumerate() {
            self.set_next(p, l, n);
            if n != NIL {
                self.node_mut(n).prev[l] = p;
            }
        }

        if self.tail == idx {
            self.tail = match node.prev[0] {
                HEAD => NIL,
                p => p,
            };
        }
        while self.height > 1 && self.head[self.height - 1] == NIL {
            self.height -= 1;
        }
        self.len -= 1;
        node.item
    }

    fn first(&self) -> Option<NodeId> {
        match self.head[0] {
            NIL => None,
            idx => Some(NodeId(idx)),
        }
    }

    fn last(&self) -> Option<NodeId> {
        match self.tail {
            NIL => None,
            idx => Some(NodeId(idx)),
        }
    }

    fn next(&self, handle: NodeId) -> Option<NodeId> {
        match self.node(handle.0).next[0] {
            NIL => None,
            idx => Some(NodeId(idx)),
        }
    }

    fn prev(&self, handle: NodeId) -> Option<NodeId> {
        match self.node(handle.0).prev[0] {
            HEAD => None,
            idx => Some(NodeId(idx)),
        }
    }

    fn get(&self, handle: NodeId) -> &T {
        &self.node(handle.0).item
    }

    fn get_mut(&mut self, handle: NodeId) -> &mut T {
        &mut self.node_mut(handle.0).item
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.head = [NIL; MAX_LEVEL];
        self.tail = NIL;
        self.free = NIL;
        self.height = 1;
        self.len = 0;
    }

    fn size_bytes(&self) -> usize {
        let links: usize = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Occupied(node) => node.next.capacity() + node.prev.capacity(),
                Slot::Vacant { .. } => 0,
            })
            .sum();
        core::mem::size_of::<Self>()
            + self.slots.capacity() * core::mem::size_of::<Slot<T>>()
            + links * core::mem::size_of::<usize>()
    }
}
