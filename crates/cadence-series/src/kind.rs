//! Series kinds and their fill policies.
//!
//! A kind decides what a series contributes on a date where it has no entry
//! of its own. [`Stock`] quantities (balances) carry their last value
//! forward. [`Flow`] quantities (payments) contribute nothing.

use std::fmt;

use cadence_core::Deferred;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Stock {}
    impl Sealed for super::Flow {}
}

/// Marker trait for the two series kinds.
pub trait Kind: sealed::Sealed + Copy + Default + fmt::Debug + PartialEq + 'static {
    /// Entry name, e.g. `"Balance"`.
    const ENTRY: &'static str;
    /// Series name, e.g. `"BalanceSeries"`.
    const SERIES: &'static str;

    /// Value emitted at a date where only one side of a merge has an entry.
    ///
    /// `lead` is that entry's value; `other_last` is the last value the other
    /// side produced before this date, if any.
    fn fill(lead: &Deferred, other_last: Option<&Deferred>) -> Deferred;
}

/// A cumulative quantity sampled at points in time. Gaps carry forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stock;

/// A discrete amount occurring on a date. Gaps are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flow;

impl Kind for Stock {
    const ENTRY: &'static str = "Balance";
    const SERIES: &'static str = "BalanceSeries";

    fn fill(lead: &Deferred, other_last: Option<&Deferred>) -> Deferred {
        match other_last {
            Some(carried) => lead + carried,
            None => lead.clone(),
        }
    }
}

impl Kind for Flow {
    const ENTRY: &'static str = "Payment";
    const SERIES: &'static str = "PaymentSeries";

    fn fill(lead: &Deferred, _other_last: Option<&Deferred>) -> Deferred {
        lead.clone()
    }
}
