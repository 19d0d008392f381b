#![forbid(unsafe_code)]

//! Sort and filter callbacks with caller-supplied teardown.

use std::cmp::Ordering;

/// Orders two children. Equal children keep their relative order.
pub type SortFunc<W> = dyn Fn(&W, &W) -> Ordering;

/// Decides whether a child passes the filter.
pub type FilterFunc<W> = dyn Fn(&W) -> bool;

/// A boxed callback whose teardown runs exactly once, when the hook is
/// replaced, unset, or its flow box is dropped.
pub(crate) struct Hook<F: ?Sized> {
    func: Box<F>,
    teardown: Option<Box<dyn FnOnce()>>,
}

impl<F: ?Sized> Hook<F> {
    pub(crate) fn new(func: Box<F>, teardown: Option<Box<dyn FnOnce()>>) -> Self {
        Self { func, teardown }
    }

    #[inline]
    pub(crate) fn func(&self) -> &F {
        &self.func
    }
}

impl<F: ?Sized> Drop for Hook<F> {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn teardown_runs_once_on_replace() {
        let torn = Rc::new(Cell::new(0));
        let counter = Rc::clone(&torn);
        let first: Box<FilterFunc<i32>> = Box::new(|v| *v > 0);
        let mut slot = Some(Hook::new(
            first,
            Some(Box::new(move || counter.set(counter.get() + 1)) as Box<dyn FnOnce()>),
        ));
        assert!(slot.as_ref().is_some_and(|h| (h.func())(&3)));

        let second: Box<FilterFunc<i32>> = Box::new(|_| true);
        slot = Some(Hook::new(second, None));
        assert_eq!(torn.get(), 1);
        drop(slot);
        assert_eq!(torn.get(), 1);
    }
}
