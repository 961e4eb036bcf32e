//! Memoizing, restartable iteration.
//!
//! A [`CachedSeq`] wraps a single-pass iterator and buffers every element it
//! produces. Any number of [`Cursor`]s can walk the sequence independently;
//! each reads from the shared buffer and only drives the source when it asks
//! for an element past the buffered end. The source therefore produces each
//! element at most once over the lifetime of the sequence, no matter how many
//! cursors exist or how they interleave.
//!
//! The handle is `Rc`-based and therefore `!Send`: a sequence belongs to one
//! thread.

use std::cell::RefCell;
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

use tracing::trace;

enum Source<T> {
    Pending(Box<dyn Iterator<Item = T>>),
    Producing,
    Exhausted,
    Poisoned,
}

struct Inner<T> {
    buffer: Vec<T>,
    source: Source<T>,
    label: Rc<str>,
}

/// Poisons the sequence if its source unwinds.
struct PoisonGuard<'a, T> {
    inner: &'a RefCell<Inner<T>>,
    armed: bool,
}

impl<T> Drop for PoisonGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.borrow_mut().source = Source::Poisoned;
        }
    }
}

/// A shared, memoized view over a single-pass iterator.
///
/// Cloning the handle shares the buffer and the source.
///
/// # Panics
///
/// Element production must not request an unproduced element of the same
/// sequence; doing so is a cycle and panics. If the source panics, the
/// sequence is poisoned: buffered elements stay readable, and asking for
/// anything past them panics.
pub struct CachedSeq<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for CachedSeq<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> CachedSeq<T> {
    /// Wraps `source`, producing nothing until a cursor asks.
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::labelled(source, "cached")
    }

    /// Like [`CachedSeq::new`], tagging trace events with `label`.
    pub fn labelled<I>(source: I, label: &str) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                buffer: Vec::new(),
                source: Source::Pending(Box::new(source.into_iter())),
                label: Rc::from(label),
            })),
        }
    }

    /// Returns a new cursor positioned at the first element.
    pub fn cursor(&self) -> Cursor<T> {
        Cursor {
            seq: self.clone(),
            index: 0,
        }
    }

    /// Returns element `index`, producing up to it if needed.
    pub fn get(&self, index: usize) -> Option<T> {
        loop {
            {
                let inner = self.inner.borrow();
                if let Some(item) = inner.buffer.get(index) {
                    return Some(item.clone());
                }
                if matches!(inner.source, Source::Exhausted) {
                    return None;
                }
            }
            if !self.produce_next() {
                return None;
            }
        }
    }

    /// Number of elements produced so far.
    pub fn buffered(&self) -> usize {
        self.inner.borrow().buffer.len()
    }

    /// Returns true once the source has reported its end.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.inner.borrow().source, Source::Exhausted)
    }

    /// Drives the source by one element. Returns false at the end.
    fn produce_next(&self) -> bool {
        let taken = std::mem::replace(&mut self.inner.borrow_mut().source, Source::Producing);
        let mut source = match taken {
            Source::Pending(source) => source,
            Source::Exhausted => {
                self.inner.borrow_mut().source = Source::Exhausted;
                return false;
            }
            Source::Producing => {
                panic!("cached sequence re-entered while producing its next element (cycle)")
            }
            Source::Poisoned => {
                self.inner.borrow_mut().source = Source::Poisoned;
                panic!("cached sequence poisoned: its source panicked on an earlier read")
            }
        };

        // The borrow is released here so the source may read other sequences,
        // or already-buffered elements of this one.
        let mut guard = PoisonGuard {
            inner: &self.inner,
            armed: true,
        };
        let next = source.next();
        guard.armed = false;
        drop(guard);

        let mut inner = self.inner.borrow_mut();
        match next {
            Some(item) => {
                inner.buffer.push(item);
                inner.source = Source::Pending(source);
                trace!(label = %inner.label, index = inner.buffer.len() - 1, "produced element");
                true
            }
            None => {
                inner.source = Source::Exhausted;
                trace!(label = %inner.label, len = inner.buffer.len(), "source exhausted");
                false
            }
        }
    }
}

impl<T> fmt::Debug for CachedSeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CachedSeq")
            .field("label", &inner.label)
            .field("buffered", &inner.buffer.len())
            .field("exhausted", &matches!(inner.source, Source::Exhausted))
            .finish()
    }
}

/// An independent position in a [`CachedSeq`].
pub struct Cursor<T> {
    seq: CachedSeq<T>,
    index: usize,
}

impl<T: Clone + 'static> Cursor<T> {
    /// Index of the next element this cursor yields.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq.clone(),
            index: self.index,
        }
    }
}

impl<T: Clone + 'static> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.seq.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let ahead = self.seq.buffered().saturating_sub(self.index);
        if self.seq.is_exhausted() {
            (ahead, Some(ahead))
        } else {
            (ahead, None)
        }
    }
}

impl<T: Clone + 'static> FusedIterator for Cursor<T> {}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("seq", &self.seq)
            .field("index", &self.index)
            .finish()
    }
}
