//! Merge-join iterators over ascending, date-keyed sequences.
//!
//! Both iterators walk their inputs in a single forward pass and never
//! materialize them. Inputs must be ascending; the outputs are then ascending
//! and date-unique.

use std::cmp::Ordering;
use std::iter::{FusedIterator, Peekable};
use std::marker::PhantomData;

use cadence_core::{Date, Deferred};

use crate::entry::Entry;
use crate::kind::Kind;

/// Ascending, duplicate-free union of two ascending date sequences.
///
/// # Example
///
/// ```rust
/// use cadence_core::Date;
/// use cadence_series::merge::merge_distinct;
///
/// let d = |s| Date::parse(s).unwrap();
/// let merged: Vec<_> = merge_distinct(
///     vec![d("2020-01-01"), d("2020-03-01")],
///     vec![d("2020-01-01"), d("2020-02-01")],
/// )
/// .collect();
/// assert_eq!(merged, vec![d("2020-01-01"), d("2020-02-01"), d("2020-03-01")]);
/// ```
pub fn merge_distinct<A, B>(a: A, b: B) -> MergeDistinct<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = Date>,
    B: IntoIterator<Item = Date>,
{
    MergeDistinct {
        a: a.into_iter().peekable(),
        b: b.into_iter().peekable(),
        last: None,
    }
}

/// Iterator returned by [`merge_distinct`].
#[derive(Debug)]
pub struct MergeDistinct<A: Iterator<Item = Date>, B: Iterator<Item = Date>> {
    a: Peekable<A>,
    b: Peekable<B>,
    last: Option<Date>,
}

impl<A, B> Iterator for MergeDistinct<A, B>
where
    A: Iterator<Item = Date>,
    B: Iterator<Item = Date>,
{
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        loop {
            let next = match (self.a.peek().copied(), self.b.peek().copied()) {
                (None, None) => return None,
                (Some(_), None) => self.a.next(),
                (None, Some(_)) => self.b.next(),
                (Some(a), Some(b)) => {
                    if a <= b {
                        self.a.next()
                    } else {
                        self.b.next()
                    }
                }
            }?;
            if self.last != Some(next) {
                self.last = Some(next);
                return Some(next);
            }
        }
    }
}

impl<A, B> FusedIterator for MergeDistinct<A, B>
where
    A: FusedIterator<Item = Date>,
    B: FusedIterator<Item = Date>,
{
}

/// Date-wise sum of two ascending entry sequences of the same kind.
///
/// Where both sides have an entry the values are added. Where only one side
/// does, the kind's fill policy decides what the other side contributes:
/// its last value for [`Stock`](crate::kind::Stock), nothing for
/// [`Flow`](crate::kind::Flow). A side that runs out keeps contributing its
/// last value under the same rule. No value is forced, and each input is
/// pulled only as far as the next output requires.
pub struct MergeJoin<K, L, R>
where
    L: Iterator<Item = Entry<K>>,
    R: Iterator<Item = Entry<K>>,
{
    left: Peekable<L>,
    right: Peekable<R>,
    last_left: Option<Deferred>,
    last_right: Option<Deferred>,
    kind: PhantomData<K>,
}

impl<K, L, R> MergeJoin<K, L, R>
where
    K: Kind,
    L: Iterator<Item = Entry<K>>,
    R: Iterator<Item = Entry<K>>,
{
    /// Creates the merge. Neither input is touched until the first `next`.
    pub fn new(left: L, right: R) -> Self {
        Self {
            left: left.peekable(),
            right: right.peekable(),
            last_left: None,
            last_right: None,
            kind: PhantomData,
        }
    }
}

impl<K, L, R> Iterator for MergeJoin<K, L, R>
where
    K: Kind,
    L: Iterator<Item = Entry<K>>,
    R: Iterator<Item = Entry<K>>,
{
    type Item = Entry<K>;

    fn next(&mut self) -> Option<Entry<K>> {
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(left), Some(right)) => left.date().cmp(&right.date()),
        };

        match order {
            Ordering::Less => {
                let left = self.left.next()?;
                let value = K::fill(left.as_deferred(), self.last_right.as_ref());
                self.last_left = Some(left.as_deferred().clone());
                Some(Entry::deferred(left.date(), value))
            }
            Ordering::Greater => {
                let right = self.right.next()?;
                let value = K::fill(right.as_deferred(), self.last_left.as_ref());
                self.last_right = Some(right.as_deferred().clone());
                Some(Entry::deferred(right.date(), value))
            }
            Ordering::Equal => {
                let left = self.left.next()?;
                let right = self.right.next()?;
                let value = left.as_deferred() + right.as_deferred();
                self.last_left = Some(left.as_deferred().clone());
                self.last_right = Some(right.as_deferred().clone());
                Some(Entry::deferred(left.date(), value))
            }
        }
    }
}
