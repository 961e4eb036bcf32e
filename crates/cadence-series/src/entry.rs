//! Dated entries.
//!
//! An [`Entry`] pairs a [`Date`] with a [`Deferred`] value. The kind marker
//! distinguishes a [`Balance`] (state as of the date) from a [`Payment`]
//! (amount occurring on the date); both have the same shape.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

use cadence_core::{Date, Deferred};

use crate::kind::{Flow, Kind, Stock};

/// A value of kind `K` keyed by date.
///
/// # Example
///
/// ```rust
/// use cadence_core::Date;
/// use cadence_series::Payment;
///
/// let date = Date::from_ymd(2020, 1, 1).unwrap();
/// let coupon = Payment::lazy(date, || 2.5);
/// let doubled = coupon * 2.0;
/// assert_eq!(doubled.value(), 5.0);
/// ```
pub struct Entry<K> {
    date: Date,
    value: Deferred,
    kind: PhantomData<K>,
}

/// State of a cumulative quantity as of a date.
pub type Balance = Entry<Stock>;

/// Amount occurring exactly on a date.
pub type Payment = Entry<Flow>;

impl<K: Kind> Entry<K> {
    /// Creates an entry with a known value.
    #[must_use]
    pub fn new(date: Date, value: f64) -> Self {
        Self::deferred(date, Deferred::new(value))
    }

    /// Creates an entry whose value is computed on first read.
    #[must_use]
    pub fn lazy<F>(date: Date, thunk: F) -> Self
    where
        F: FnOnce() -> f64 + 'static,
    {
        Self::deferred(date, Deferred::lazy(thunk))
    }

    /// Creates an entry from an existing deferred value.
    #[must_use]
    pub fn deferred(date: Date, value: Deferred) -> Self {
        Self {
            date,
            value,
            kind: PhantomData,
        }
    }

    /// The entry date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The value, forcing it if needed.
    pub fn value(&self) -> f64 {
        self.value.value()
    }

    /// The underlying deferred value, unforced.
    pub fn as_deferred(&self) -> &Deferred {
        &self.value
    }

    /// Same date, value transformed lazily.
    #[must_use]
    pub fn map_value(&self, f: impl FnOnce(&Deferred) -> Deferred) -> Self {
        Self::deferred(self.date, f(&self.value))
    }
}

impl<K> Clone for Entry<K> {
    fn clone(&self) -> Self {
        Self {
            date: self.date,
            value: self.value.clone(),
            kind: PhantomData,
        }
    }
}

impl<K: Kind> fmt::Debug for Entry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::ENTRY)
            .field("date", &self.date)
            .field("value", &self.value)
            .finish()
    }
}

impl<K: Kind> fmt::Display for Entry<K> {
    /// Formats as `date: value`, forcing the value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.value())
    }
}

/// Equal dates and equal values. Forces both values.
impl<K: Kind> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date && self.value == other.value
    }
}

macro_rules! impl_entry_number_op {
    ($trait:ident, $method:ident) => {
        impl<K: Kind> $trait<f64> for Entry<K> {
            type Output = Entry<K>;

            fn $method(self, rhs: f64) -> Entry<K> {
                self.map_value(|v| v.$method(rhs))
            }
        }

        impl<K: Kind> $trait<f64> for &Entry<K> {
            type Output = Entry<K>;

            fn $method(self, rhs: f64) -> Entry<K> {
                self.map_value(|v| v.$method(rhs))
            }
        }

        impl<K: Kind> $trait<Entry<K>> for f64 {
            type Output = Entry<K>;

            fn $method(self, rhs: Entry<K>) -> Entry<K> {
                rhs.map_value(|v| self.$method(v))
            }
        }
    };
}

impl_entry_number_op!(Add, add);
impl_entry_number_op!(Sub, sub);
impl_entry_number_op!(Mul, mul);
impl_entry_number_op!(Div, div);

impl<K: Kind> Neg for Entry<K> {
    type Output = Entry<K>;

    fn neg(self) -> Entry<K> {
        self.map_value(|v| -v)
    }
}

impl<K: Kind> Neg for &Entry<K> {
    type Output = Entry<K>;

    fn neg(self) -> Entry<K> {
        self.map_value(|v| -v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_construction() {
        let bal = Balance::new(d("2020-01-01"), 100.0);
        assert_eq!(bal.date(), d("2020-01-01"));
        assert_eq!(bal.value(), 100.0);
        assert!(bal.as_deferred().is_evaluated());
    }

    #[test]
    fn test_number_arithmetic_keeps_date() {
        let pmt = Payment::new(d("2020-02-01"), 20.0);
        let results = [
            (&pmt + 5.0, 25.0),
            (&pmt - 5.0, 15.0),
            (&pmt * 2.0, 40.0),
            (&pmt / 4.0, 5.0),
            (-&pmt, -20.0),
            (5.0 - pmt.clone(), -15.0),
            (3.0 * pmt.clone(), 60.0),
        ];
        for (entry, expected) in results {
            assert_eq!(entry.date(), d("2020-02-01"));
            assert_relative_eq!(entry.value(), expected);
        }
    }

    #[test]
    fn test_arithmetic_does_not_force() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let pmt = Payment::lazy(d("2020-01-01"), move || {
            counter.set(counter.get() + 1);
            7.0
        });
        let scaled = -(&pmt * 3.0);
        assert_eq!(calls.get(), 0);
        assert_relative_eq!(scaled.value(), -21.0);
        assert_relative_eq!(pmt.value(), 7.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_equality_and_formatting() {
        let a = Balance::lazy(d("2020-06-01"), || 150.0);
        let b = Balance::new(d("2020-06-01"), 150.0);
        assert_eq!(format!("{a:?}"), "Balance { date: Date(2020-06-01), value: Deferred(<unevaluated>) }");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2020-06-01: 150");
        assert_ne!(a, Balance::new(d("2020-06-02"), 150.0));
    }
}
