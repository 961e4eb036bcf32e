//! Lazy dated series and their algebra.
//!
//! A [`DatedSeries`] is an ascending, date-unique sequence of entries backed
//! by a [`CachedSeq`]: entries are produced on demand, once, and shared by
//! every traversal. Lookups, windows, truncation, negation and merge-addition
//! all build on that single traversal primitive.
//!
//! Entries must arrive in strictly ascending date order. The series trusts
//! its producer; [`SeriesConfig::order_check`] decides whether violations are
//! reported.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use approx::AbsDiffEq;
use cadence_core::config::{OrderCheck, SeriesConfig};
use cadence_core::{Date, Deferred};
use tracing::{debug, warn};

use crate::cached::{CachedSeq, Cursor};
use crate::entry::{Balance, Entry};
use crate::kind::{Flow, Kind, Stock};
use crate::merge::{merge_distinct, MergeJoin};
use crate::node::{Node, NodeId};

/// An external generator of ascending entries, e.g. an amortization schedule.
///
/// Implementors only promise ascending, date-unique output.
pub trait Schedule<K: Kind> {
    /// Iterator over the generated entries.
    type Entries: Iterator<Item = Entry<K>> + 'static;

    /// Consumes the generator, returning its entries.
    fn entries(self) -> Self::Entries;
}

/// A lazily produced, restartable series of dated entries.
///
/// Cloning is cheap and shares produced entries.
#[derive(Clone)]
pub struct DatedSeries<K: Kind> {
    entries: CachedSeq<Entry<K>>,
    parent: Option<NodeId>,
}

/// Series of balances: gaps carry the last value forward.
pub type BalanceSeries = DatedSeries<Stock>;

/// Series of payments: gaps are zero.
pub type PaymentSeries = DatedSeries<Flow>;

impl<K: Kind> DatedSeries<K> {
    /// Creates a series over `entries` with the default configuration.
    ///
    /// `entries` must be in strictly ascending date order. Nothing is pulled
    /// from it until the series is traversed.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<K>>,
        I::IntoIter: 'static,
    {
        Self::with_config(entries, &SeriesConfig::default())
    }

    /// Creates a series over `entries` using `config`.
    pub fn with_config<I>(entries: I, config: &SeriesConfig) -> Self
    where
        I: IntoIterator<Item = Entry<K>>,
        I::IntoIter: 'static,
    {
        let label = config.label_or_default();
        let entries = if config.order_check.is_enabled() {
            CachedSeq::labelled(
                OrderChecked {
                    inner: entries.into_iter(),
                    last: None,
                    policy: config.order_check,
                    label: Rc::from(label),
                },
                label,
            )
        } else {
            CachedSeq::labelled(entries, label)
        };
        Self {
            entries,
            parent: None,
        }
    }

    /// Creates a series from `(date, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Date, f64)>,
        I::IntoIter: 'static,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Entry::new(date, value)),
        )
    }

    /// Creates a series from an external generator.
    pub fn from_schedule<S: Schedule<K>>(schedule: S) -> Self {
        Self::new(schedule.entries())
    }

    /// A series with no entries.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Binds the series under `parent` in a composition tree.
    #[must_use]
    pub fn bound_to(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns a cursor over the entries, starting from the first.
    pub fn iter(&self) -> Cursor<Entry<K>> {
        self.entries.cursor()
    }

    /// Dates of all entries, in order.
    pub fn dates(&self) -> impl Iterator<Item = Date> {
        self.iter().map(|e| e.date())
    }

    /// First entry, if any. Produces at most one entry.
    pub fn first(&self) -> Option<Entry<K>> {
        self.entries.get(0)
    }

    /// Returns true if the series has no entries. Produces at most one entry.
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    /// Number of entries. Produces every entry but forces no value.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Number of entries produced so far.
    pub fn produced(&self) -> usize {
        self.entries.buffered()
    }

    /// All entries, produced and cloned into a vector.
    pub fn to_vec(&self) -> Vec<Entry<K>> {
        self.iter().collect()
    }

    /// Entries strictly after `date`.
    ///
    /// A pure filter: no entry is synthesized at `date` itself.
    pub fn after(&self, date: Date) -> Self {
        debug!(kind = K::SERIES, %date, "truncating series");
        Self::derived(
            self.iter().filter(move |e| e.date() > date),
            "after",
        )
    }

    /// Every value negated, dates preserved.
    pub fn negate(&self) -> Self {
        debug!(kind = K::SERIES, "negating series");
        Self::derived(self.iter().map(|e| -e), "negate")
    }

    /// Every value multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.map_values(move |v| v * factor)
    }

    /// Every value multiplied by a deferred factor, forced only when an
    /// entry's value is read.
    pub fn scale_by(&self, factor: &Deferred) -> Self {
        let factor = factor.clone();
        self.map_values(move |v| v * &factor)
    }

    /// Every value transformed by `f`, dates preserved.
    ///
    /// `f` runs as entries are produced and should compose lazily rather
    /// than force its argument.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(&Deferred) -> Deferred + 'static,
    {
        Self::derived(self.iter().map(move |e| e.map_value(&f)), "map")
    }

    /// Date-wise sum with `other` using this kind's fill policy.
    ///
    /// Neither input is traversed until the result is.
    pub fn merge_add(&self, other: &Self) -> Self {
        debug!(kind = K::SERIES, "merging series");
        Self::derived(MergeJoin::new(self.iter(), other.iter()), "merge")
    }

    /// Date-wise difference, `self + (-other)`.
    pub fn merge_sub(&self, other: &Self) -> Self {
        self.merge_add(&other.negate())
    }

    fn derived<I>(entries: I, label: &str) -> Self
    where
        I: Iterator<Item = Entry<K>> + 'static,
    {
        Self {
            entries: CachedSeq::labelled(entries, label),
            parent: None,
        }
    }
}

impl DatedSeries<Stock> {
    /// Balance as of `date`, carrying the last value forward.
    ///
    /// Zero before the first entry. Forces only the value returned.
    pub fn at(&self, date: Date) -> f64 {
        self.deferred_at(date).value()
    }

    /// Like [`at`](Self::at) without forcing the value.
    pub fn deferred_at(&self, date: Date) -> Deferred {
        let mut last = None;
        for balance in self.iter() {
            if balance.date() > date {
                break;
            }
            if balance.date() == date {
                return balance.as_deferred().clone();
            }
            last = Some(balance);
        }
        last.map_or_else(Deferred::zero, |b| b.as_deferred().clone())
    }

    /// Resamples the series on the union of its own dates and `dates`.
    ///
    /// Each value is this series' carried-forward balance at that date, zero
    /// before the first entry. `dates` must be ascending.
    pub fn rebase<I>(&self, dates: I) -> Self
    where
        I: IntoIterator<Item = Date>,
        I::IntoIter: 'static,
    {
        debug!(kind = Stock::SERIES, "rebasing series");
        let source = self.clone();
        Self::derived(
            merge_distinct(self.dates(), dates)
                .map(move |date| Balance::deferred(date, source.deferred_at(date))),
            "rebase",
        )
    }
}

impl DatedSeries<Flow> {
    /// Payment occurring exactly on `date`, zero if none.
    pub fn on(&self, date: Date) -> f64 {
        self.iter()
            .take_while(|p| p.date() <= date)
            .find(|p| p.date() == date)
            .map_or(0.0, |p| p.value())
    }

    /// Sum of payments in `(from, to]`. Zero if none fall in the window.
    ///
    /// Stops at the first payment after `to`.
    pub fn over(&self, from: Date, to: Date) -> f64 {
        self.iter()
            .take_while(|p| p.date() <= to)
            .filter(|p| p.date() > from)
            .map(|p| p.value())
            .sum()
    }

    /// Sum of every payment in the series.
    pub fn total(&self) -> f64 {
        self.iter().map(|p| p.value()).sum()
    }
}

impl<K: Kind> Node for DatedSeries<K> {
    fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl<K: Kind> Default for DatedSeries<K> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collecting drains the iterator up front: every entry is produced
/// immediately, though no value is forced. Use [`DatedSeries::new`] to keep
/// production lazy.
impl<K: Kind> FromIterator<Entry<K>> for DatedSeries<K> {
    fn from_iter<I: IntoIterator<Item = Entry<K>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, K: Kind> IntoIterator for &'a DatedSeries<K> {
    type Item = Entry<K>;
    type IntoIter = Cursor<Entry<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Kind> fmt::Debug for DatedSeries<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::SERIES)
            .field("parent", &self.parent)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Same dates and equal values entry by entry. Produces both series and
/// forces every value.
impl<K: Kind> PartialEq for DatedSeries<K> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<K: Kind> AbsDiffEq for DatedSeries<K> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if a.date() != b.date() || !a.value().abs_diff_eq(&b.value(), epsilon) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

macro_rules! impl_series_binary_op {
    ($trait:ident, $method:ident, $combine:ident) => {
        impl<K: Kind> $trait<&DatedSeries<K>> for &DatedSeries<K> {
            type Output = DatedSeries<K>;

            fn $method(self, rhs: &DatedSeries<K>) -> DatedSeries<K> {
                self.$combine(rhs)
            }
        }

        impl<K: Kind> $trait<DatedSeries<K>> for DatedSeries<K> {
            type Output = DatedSeries<K>;

            fn $method(self, rhs: DatedSeries<K>) -> DatedSeries<K> {
                self.$combine(&rhs)
            }
        }

        impl<K: Kind> $trait<&DatedSeries<K>> for DatedSeries<K> {
            type Output = DatedSeries<K>;

            fn $method(self, rhs: &DatedSeries<K>) -> DatedSeries<K> {
                self.$combine(rhs)
            }
        }
    };
}

impl_series_binary_op!(Add, add, merge_add);
impl_series_binary_op!(Sub, sub, merge_sub);

impl<K: Kind> Neg for &DatedSeries<K> {
    type Output = DatedSeries<K>;

    fn neg(self) -> DatedSeries<K> {
        self.negate()
    }
}

impl<K: Kind> Neg for DatedSeries<K> {
    type Output = DatedSeries<K>;

    fn neg(self) -> DatedSeries<K> {
        self.negate()
    }
}

impl<K: Kind> Mul<f64> for &DatedSeries<K> {
    type Output = DatedSeries<K>;

    fn mul(self, rhs: f64) -> DatedSeries<K> {
        self.scale(rhs)
    }
}

impl<K: Kind> Mul<f64> for DatedSeries<K> {
    type Output = DatedSeries<K>;

    fn mul(self, rhs: f64) -> DatedSeries<K> {
        self.scale(rhs)
    }
}

/// Reports entries that break ascending date order.
struct OrderChecked<I> {
    inner: I,
    last: Option<Date>,
    policy: OrderCheck,
    label: Rc<str>,
}

impl<K, I> Iterator for OrderChecked<I>
where
    K: Kind,
    I: Iterator<Item = Entry<K>>,
{
    type Item = Entry<K>;

    fn next(&mut self) -> Option<Entry<K>> {
        let entry = self.inner.next()?;
        let date = entry.date();
        if let Some(last) = self.last {
            if date <= last {
                match self.policy {
                    OrderCheck::Trust => {}
                    OrderCheck::Warn => {
                        warn!(label = %self.label, %date, %last, "series entry out of order");
                    }
                    OrderCheck::Assert => {
                        debug_assert!(
                            date > last,
                            "{}: entry dated {date} does not follow {last}",
                            self.label
                        );
                        warn!(label = %self.label, %date, %last, "series entry out of order");
                    }
                }
            }
        }
        self.last = Some(date);
        Some(entry)
    }
}
