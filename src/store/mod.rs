//! Ordered storage backing the quantile summaries
//!
//! A summary only needs a handful of operations from its backing structure:
//! ordered insert, removal of an arbitrary element, and neighbour navigation.
//! [`OrderedStore`] captures that contract so the summary algorithms never see
//! how elements are linked together.
//!
//! # Implementations
//!
//! - [`Skiplist`]: arena-backed probabilistic skiplist with a pluggable
//!   [`LevelPolicy`]
//!
//! # Example
//!
//! ```
//! use gkstream::store::{Keyed, OrderedStore, Skiplist};
//!
//! #[derive(Debug, Clone)]
//! struct Reading(i64);
//!
//! impl Keyed for Reading {
//!     type Key = i64;
//!     fn key(&self) -> i64 {
//!         self.0
//!     }
//! }
//!
//! let mut list = Skiplist::new();
//! for v in [30, 10, 20] {
//!     list.insert(Reading(v));
//! }
//! let keys: Vec<i64> = list.iter().map(Keyed::key).collect();
//! assert_eq!(keys, vec![10, 20, 30]);
//! ```

mod skiplist;

pub use skiplist::{GeometricLevels, LevelPolicy, NodeId, Skiplist, MAX_LEVEL};

use core::fmt::Debug;
use core::marker::PhantomData;

/// An element with a totally ordered key
pub trait Keyed {
    /// Ordering key
    type Key: Ord + Copy;

    /// Key used to position the element
    fn key(&self) -> Self::Key;
}

/// Sorted container of [`Keyed`] elements addressed by stable handles
///
/// Elements are kept in ascending key order. Inserting an element whose key
/// equals existing keys places it after all of them, so equal keys keep their
/// insertion order.
///
/// Handles stay valid until the element they point to is removed. Using a
/// handle after removal is a caller bug; implementations may panic.
pub trait OrderedStore<T: Keyed> {
    /// Stable reference to a stored element
    type Handle: Copy + Eq + Debug;

    /// Insert an element after all elements with key `<=` its key
    fn insert(&mut self, item: T) -> Self::Handle;

    /// Unlink an element and hand it back
    fn remove(&mut self, handle: Self::Handle) -> T;

    /// Element with the smallest key
    fn first(&self) -> Option<Self::Handle>;

    /// Element with the largest key
    fn last(&self) -> Option<Self::Handle>;

    /// Successor in key order
    fn next(&self, handle: Self::Handle) -> Option<Self::Handle>;

    /// Predecessor in key order
    fn prev(&self, handle: Self::Handle) -> Option<Self::Handle>;

    /// Borrow an element
    fn get(&self, handle: Self::Handle) -> &T;

    /// Mutably borrow an element
    ///
    /// The caller must not change the element's key.
    fn get_mut(&mut self, handle: Self::Handle) -> &mut T;

    /// Number of stored elements
    fn len(&self) -> usize;

    /// Check if the store holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every element
    fn clear(&mut self);

    /// Memory used by the structure itself, excluding heap owned by elements
    fn size_bytes(&self) -> usize;

    /// Ascending iterator over the stored elements
    fn iter(&self) -> Iter<'_, T, Self>
    where
        Self: Sized,
    {
        Iter {
            store: self,
            cursor: self.first(),
            remaining: self.len(),
            _marker: PhantomData,
        }
    }
}

/// Ascending iterator over an [`OrderedStore`]
pub struct Iter<'a, T: Keyed, S: OrderedStore<T>> {
    store: &'a S,
    cursor: Option<S::Handle>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Keyed + 'a, S: OrderedStore<T>> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let handle = self.cursor?;
        self.cursor = self.store.next(handle);
        self.remaining = self.remaining.saturating_sub(1);
        Some(self.store.get(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Keyed + 'a, S: OrderedStore<T>> ExactSizeIterator for Iter<'a, T, S> {}
