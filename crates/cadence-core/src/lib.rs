//! # Cadence Core
//!
//! Core types for the Cadence lazy financial time series library.
//!
//! - **Types**: [`Date`] and the memoized [`Deferred`] scalar
//! - **Errors**: [`CadenceError`] for operand and kind mistakes
//! - **Configuration**: [`config::SeriesConfig`] for per-series checks and labels
//!
//! ## Example
//!
//! ```rust
//! use cadence_core::prelude::*;
//!
//! let rate = Deferred::lazy(|| 0.05);
//! let interest = &rate * 1_000.0;
//! assert_eq!(interest.value(), 50.0);
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

pub mod config;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{OrderCheck, SeriesConfig};
    pub use crate::error::{CadenceError, CadenceResult};
    pub use crate::types::{Date, Deferred};
}

// Re-export commonly used types at crate root
pub use error::{CadenceError, CadenceResult};
pub use types::{Date, Deferred};
