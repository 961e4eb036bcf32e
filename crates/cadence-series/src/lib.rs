//! # Cadence Series
//!
//! Lazy, composable financial time series.
//!
//! Two kinds of series exist:
//!
//! - [`BalanceSeries`]: a stock quantity sampled at dates. Between dates the
//!   last value carries forward.
//! - [`PaymentSeries`]: a flow of amounts occurring on dates. Between dates
//!   nothing happens.
//!
//! Series are produced on demand and buffered, so lookups, windows and merges
//! can traverse the same series repeatedly while each entry is produced once.
//! Values are [`Deferred`](cadence_core::Deferred) scalars; combining series
//! composes values without forcing them.
//!
//! ## Architecture
//!
//! ```text
//! Schedule ─> DatedSeries::new ─> CachedSeq ─┬─> at / on / over
//!                                            ├─> after / negate / scale
//!                                            └─> MergeJoin (+, -) ─> DatedSeries
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cadence_core::Date;
//! use cadence_series::{Balance, BalanceSeries};
//!
//! let d = |s| Date::parse(s).unwrap();
//! let checking = BalanceSeries::new(vec![
//!     Balance::new(d("2020-01-01"), 100.0),
//!     Balance::new(d("2020-03-01"), 80.0),
//! ]);
//! let savings = BalanceSeries::new(vec![Balance::new(d("2020-02-01"), 50.0)]);
//!
//! let total = &checking + &savings;
//! assert_eq!(total.at(d("2020-02-15")), 150.0);
//! assert_eq!(total.at(d("2020-03-01")), 130.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]
#![allow(clippy::return_self_not_must_use)]

pub mod cached;
pub mod entry;
pub mod kind;
pub mod merge;
pub mod node;
pub mod operand;
pub mod series;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::entry::{Balance, Entry, Payment};
    pub use crate::kind::{Flow, Kind, Stock};
    pub use crate::node::{Node, NodeId, NodeRegistry};
    pub use crate::operand::Operand;
    pub use crate::series::{BalanceSeries, DatedSeries, PaymentSeries, Schedule};
    pub use cadence_core::prelude::*;
}

// Re-export commonly used types at crate root
pub use entry::{Balance, Entry, Payment};
pub use kind::{Flow, Kind, Stock};
pub use operand::Operand;
pub use series::{BalanceSeries, DatedSeries, PaymentSeries, Schedule};
