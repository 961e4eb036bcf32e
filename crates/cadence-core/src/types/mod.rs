//! Value types shared across Cadence.
//!
//! - [`Date`]: Calendar date keying series entries
//! - [`Deferred`]: Lazily computed, memoized number

mod date;
mod deferred;

pub use date::Date;
pub use deferred::Deferred;
