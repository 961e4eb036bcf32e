//! Deferred, memoized scalar values.
//!
//! A [`Deferred`] is either a known number or a thunk producing one. The thunk
//! runs at most once, on the first read, and every clone of the handle sees the
//! cached result. Arithmetic builds new thunks over the operands without
//! forcing them.

use std::cell::RefCell;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use approx::{AbsDiffEq, RelativeEq};

enum State {
    Evaluated(f64),
    Unevaluated(Box<dyn FnOnce() -> f64>),
    Forcing,
    Poisoned,
}

/// Poisons the value if its thunk unwinds.
struct PoisonGuard<'a> {
    state: &'a RefCell<State>,
    armed: bool,
}

impl Drop for PoisonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.borrow_mut() = State::Poisoned;
        }
    }
}

/// A lazily computed number, evaluated once and cached.
///
/// Cloning is cheap and shares the memo cell.
///
/// # Example
///
/// ```rust
/// use cadence_core::types::Deferred;
///
/// let base = Deferred::lazy(|| 40.0);
/// let total = &base + 2.0;
/// assert!(!base.is_evaluated());
/// assert_eq!(total.value(), 42.0);
/// assert!(base.is_evaluated());
/// ```
///
/// # Panics
///
/// Forcing a value whose thunk (directly or transitively) forces the same
/// value again panics. No other cycle detection exists; a deep chain of
/// compositions recurses once per level on first evaluation. A thunk that
/// panics poisons the value, and every later read panics too.
#[derive(Clone)]
pub struct Deferred(Rc<RefCell<State>>);

impl Deferred {
    /// Creates an already-evaluated value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(Rc::new(RefCell::new(State::Evaluated(value))))
    }

    /// Creates a value computed by `thunk` on first read.
    #[must_use]
    pub fn lazy<F>(thunk: F) -> Self
    where
        F: FnOnce() -> f64 + 'static,
    {
        Self(Rc::new(RefCell::new(State::Unevaluated(Box::new(thunk)))))
    }

    /// Zero, already evaluated.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(0.0)
    }

    /// Returns the value, running the thunk if this is the first read.
    ///
    /// # Panics
    ///
    /// Panics on a cycle, or if the thunk panicked on an earlier read.
    pub fn value(&self) -> f64 {
        if let State::Evaluated(value) = *self.0.borrow() {
            return value;
        }

        let previous = std::mem::replace(&mut *self.0.borrow_mut(), State::Forcing);
        let thunk = match previous {
            State::Unevaluated(thunk) => thunk,
            State::Evaluated(value) => {
                *self.0.borrow_mut() = State::Evaluated(value);
                return value;
            }
            State::Forcing => panic!("deferred value forced while it is being computed (cycle)"),
            State::Poisoned => {
                *self.0.borrow_mut() = State::Poisoned;
                panic!("deferred value poisoned: its computation panicked on an earlier read")
            }
        };

        let mut guard = PoisonGuard {
            state: &self.0,
            armed: true,
        };
        let value = thunk();
        guard.armed = false;
        *self.0.borrow_mut() = State::Evaluated(value);
        value
    }

    /// Returns the cached value without forcing, if already evaluated.
    pub fn peek(&self) -> Option<f64> {
        match *self.0.borrow() {
            State::Evaluated(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true once the value has been computed.
    pub fn is_evaluated(&self) -> bool {
        self.peek().is_some()
    }

    /// Returns true if both handles share the same memo cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Combines two values lazily. Known operands fold immediately.
    fn combine(&self, other: &Self, f: fn(f64, f64) -> f64) -> Self {
        if let (Some(a), Some(b)) = (self.peek(), other.peek()) {
            return Self::new(f(a, b));
        }
        let (lhs, rhs) = (self.clone(), other.clone());
        Self::lazy(move || f(lhs.value(), rhs.value()))
    }

    fn combine_number(&self, number: f64, f: fn(f64, f64) -> f64) -> Self {
        if let Some(a) = self.peek() {
            return Self::new(f(a, number));
        }
        let lhs = self.clone();
        Self::lazy(move || f(lhs.value(), number))
    }

    /// Sums `terms` with a single thunk, so forcing the total recurses one
    /// level no matter how many terms there are.
    fn sum_terms(terms: impl Iterator<Item = Deferred>) -> Self {
        let mut known = 0.0;
        let mut pending = Vec::new();
        for term in terms {
            match term.peek() {
                Some(value) => known += value,
                None => pending.push(term),
            }
        }
        if pending.is_empty() {
            return Self::new(known);
        }
        Self::lazy(move || pending.iter().fold(known, |acc, term| acc + term.value()))
    }

    fn number_combine(number: f64, rhs: &Self, f: fn(f64, f64) -> f64) -> Self {
        if let Some(b) = rhs.peek() {
            return Self::new(f(number, b));
        }
        let rhs = rhs.clone();
        Self::lazy(move || f(number, rhs.value()))
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<f64> for Deferred {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0.borrow() {
            State::Evaluated(value) => write!(f, "Deferred({value})"),
            State::Poisoned => write!(f, "Deferred(<poisoned>)"),
            State::Unevaluated(_) | State::Forcing => write!(f, "Deferred(<unevaluated>)"),
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Deferred> for &Deferred {
            type Output = Deferred;

            fn $method(self, rhs: &Deferred) -> Deferred {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $trait<Deferred> for Deferred {
            type Output = Deferred;

            fn $method(self, rhs: Deferred) -> Deferred {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Deferred> for Deferred {
            type Output = Deferred;

            fn $method(self, rhs: &Deferred) -> Deferred {
                (&self).$method(rhs)
            }
        }

        impl $trait<f64> for &Deferred {
            type Output = Deferred;

            fn $method(self, rhs: f64) -> Deferred {
                self.combine_number(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for Deferred {
            type Output = Deferred;

            fn $method(self, rhs: f64) -> Deferred {
                (&self).$method(rhs)
            }
        }

        impl $trait<&Deferred> for f64 {
            type Output = Deferred;

            fn $method(self, rhs: &Deferred) -> Deferred {
                Deferred::number_combine(self, rhs, |a, b| a $op b)
            }
        }

        impl $trait<Deferred> for f64 {
            type Output = Deferred;

            fn $method(self, rhs: Deferred) -> Deferred {
                self.$method(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl Neg for &Deferred {
    type Output = Deferred;

    fn neg(self) -> Deferred {
        if let Some(value) = self.peek() {
            return Deferred::new(-value);
        }
        let inner = self.clone();
        Deferred::lazy(move || -inner.value())
    }
}

impl Neg for Deferred {
    type Output = Deferred;

    fn neg(self) -> Deferred {
        -&self
    }
}

impl Sum for Deferred {
    fn sum<I: Iterator<Item = Deferred>>(iter: I) -> Self {
        Deferred::sum_terms(iter)
    }
}

impl<'a> Sum<&'a Deferred> for Deferred {
    fn sum<I: Iterator<Item = &'a Deferred>>(iter: I) -> Self {
        Deferred::sum_terms(iter.cloned())
    }
}

/// Equality forces both sides.
impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl PartialEq<f64> for Deferred {
    fn eq(&self, other: &f64) -> bool {
        self.value() == *other
    }
}

impl AbsDiffEq for Deferred {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.value().abs_diff_eq(&other.value(), epsilon)
    }
}

impl RelativeEq for Deferred {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.value()
            .relative_eq(&other.value(), epsilon, max_relative)
    }
}
