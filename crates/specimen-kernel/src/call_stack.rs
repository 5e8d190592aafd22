//! Per-thread resolution state owned by a builder
//!
//! A configured graph is shared by every thread resolving through it, but
//! the bookkeeping of one resolution (the in-flight request stack, the
//! trace depth) belongs to the call path that created it. [`ThreadScoped`]
//! keys that state by thread so concurrent read-only resolutions do not
//! see each other.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread::{self, ThreadId};

/// State of type `T` kept separately for every thread
#[derive(Debug, Default)]
pub struct ThreadScoped<T> {
    slots: Mutex<HashMap<ThreadId, T>>,
}

impl<T: Default> ThreadScoped<T> {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` on the calling thread's state
    ///
    /// The lock is held for the whole call to `f`, so `f` must not re-enter
    /// the graph.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut slots = self.slots.lock();
        f(slots.entry(thread::current().id()).or_default())
    }

    /// Drop the calling thread's state
    pub fn clear(&self) {
        self.slots.lock().remove(&thread::current().id());
    }

    /// True when no thread holds state
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

/// Stack of in-flight items for the calling thread
#[derive(Debug)]
pub struct CallStack<T> {
    frames: ThreadScoped<Vec<T>>,
}

impl<T> Default for CallStack<T> {
    fn default() -> Self {
        Self {
            frames: ThreadScoped::new(),
        }
    }
}

impl<T: Clone> CallStack<T> {
    /// Create empty stack
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an item; it is popped when the returned frame drops
    #[must_use = "the item is popped as soon as the frame is dropped"]
    pub fn push(&self, item: T) -> Frame<'_, T> {
        self.frames.with(|stack| stack.push(item));
        Frame { stack: self }
    }

    /// Snapshot of the calling thread's stack, outermost first
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.frames.with(|stack| stack.clone())
    }

    /// Number of in-flight items satisfying `predicate`
    pub fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.frames.with(|stack| stack.iter().filter(|item| predicate(item)).count())
    }

    /// Number of in-flight items on the calling thread
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.with(|stack| stack.len())
    }

    fn pop(&self) {
        let now_empty = self.frames.with(|stack| {
            stack.pop();
            stack.is_empty()
        });
        if now_empty {
            self.frames.clear();
        }
    }
}

/// Scope of one pushed item
///
/// Pops on drop, including while unwinding or returning early through `?`.
#[derive(Debug)]
pub struct Frame<'a, T: Clone> {
    stack: &'a CallStack<T>,
}

impl<T: Clone> Drop for Frame<'_, T> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn frames_pop_on_drop() {
        let stack = CallStack::new();
        {
            let _outer = stack.push(1);
            {
                let _inner = stack.push(2);
                assert_eq!(stack.snapshot(), vec![1, 2]);
                assert_eq!(stack.count(|&n| n > 1), 1);
            }
            assert_eq!(stack.snapshot(), vec![1]);
        }
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn early_return_pops() {
        fn fails(stack: &CallStack<&'static str>) -> Result<(), ()> {
            let _frame = stack.push("x");
            Err(())
        }
        let stack = CallStack::new();
        assert!(fails(&stack).is_err());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn threads_do_not_share_frames() {
        let stack = Arc::new(CallStack::new());
        let _frame = stack.push("main");

        let other = stack.clone();
        let seen = std::thread::spawn(move || {
            let _f = other.push("worker");
            other.snapshot()
        })
        .join()
        .unwrap();

        assert_eq!(seen, vec!["worker"]);
        assert_eq!(stack.snapshot(), vec!["main"]);
    }

    #[test]
    fn thread_scoped_state() {
        let counter: ThreadScoped<usize> = ThreadScoped::new();
        counter.with(|n| *n += 2);
        assert_eq!(counter.with(|n| *n), 2);
        counter.clear();
        assert!(counter.is_empty());
        assert_eq!(counter.with(|n| *n), 0);
    }

    #[test]
    fn popping_last_frame_releases_thread_slot() {
        let stack = CallStack::new();
        drop(stack.push(1));
        assert!(stack.frames.is_empty());
    }
}
