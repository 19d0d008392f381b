#![forbid(unsafe_code)]

//! Per-pass measurement memoization.
//!
//! A single flow measurement or allocation queries the same item for the
//! same constraint many times (every trial line length re-gathers slot
//! sizes, the height-for-width search re-runs the line pass). [`CachedItems`]
//! wraps an item source for the duration of one pass and answers repeated
//! queries from an `FxHashMap`.
//!
//! # Invariants
//!
//! - The cache never outlives the pass that created it; items may change
//!   between passes and are re-measured.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::{FlowItems, Orientation, SizeRequest};

type Key = (usize, Orientation, Option<i32>);

/// Memoizing view over a [`FlowItems`] source.
pub struct CachedItems<'a, I: FlowItems + ?Sized> {
    inner: &'a I,
    cache: RefCell<FxHashMap<Key, SizeRequest>>,
}

impl<'a, I: FlowItems + ?Sized> CachedItems<'a, I> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: &'a I) -> Self {
        Self {
            inner,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Number of distinct queries answered so far.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<I: FlowItems + ?Sized> FlowItems for CachedItems<'_, I> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn measure(&self, index: usize, orientation: Orientation, for_size: Option<i32>) -> SizeRequest {
        let key = (index, orientation, for_size);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return *hit;
        }
        let request = self.inner.measure(index, orientation, for_size);
        self.cache.borrow_mut().insert(key, request);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl FlowItems for Counting {
        fn len(&self) -> usize {
            2
        }

        fn measure(&self, index: usize, _: Orientation, _: Option<i32>) -> SizeRequest {
            self.calls.set(self.calls.get() + 1);
            SizeRequest::fixed(index as i32 * 10)
        }
    }

    #[test]
    fn repeated_queries_hit_cache() {
        let items = Counting { calls: Cell::new(0) };
        let cached = CachedItems::new(&items);
        for _ in 0..5 {
            assert_eq!(
                cached.measure(1, Orientation::Horizontal, None),
                SizeRequest::fixed(10)
            );
        }
        assert_eq!(items.calls.get(), 1);

        cached.measure(1, Orientation::Vertical, Some(10));
        cached.measure(1, Orientation::Vertical, Some(11));
        assert_eq!(items.calls.get(), 3);
        assert_eq!(cached.cached_len(), 3);
    }
}
