//! Dynamically typed arithmetic over numbers, scalars and series.
//!
//! Statically typed code should use the operators on [`Deferred`] and
//! [`DatedSeries`](crate::DatedSeries) directly; mismatched kinds then fail to compile. When
//! operands are only known at runtime (say, a forecast assembled from
//! configuration), [`Operand`] resolves the combination and returns a typed
//! error for the ones that make no sense. Every check happens before any
//! series is traversed or any value forced.

use std::fmt;

use cadence_core::{CadenceError, CadenceResult, Deferred};

use crate::kind::{Flow, Kind, Stock};
use crate::series::{BalanceSeries, PaymentSeries};

/// A runtime-typed arithmetic operand.
#[derive(Clone)]
pub enum Operand {
    /// A plain number.
    Number(f64),
    /// A deferred scalar.
    Scalar(Deferred),
    /// A balance series.
    Balance(BalanceSeries),
    /// A payment series.
    Payment(PaymentSeries),
}

impl Operand {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Number(_) => "number",
            Operand::Scalar(_) => "Deferred",
            Operand::Balance(_) => Stock::SERIES,
            Operand::Payment(_) => Flow::SERIES,
        }
    }

    /// Returns true for series operands.
    pub fn is_series(&self) -> bool {
        matches!(self, Operand::Balance(_) | Operand::Payment(_))
    }

    /// Numeric operands as a deferred value; `None` for series.
    fn as_scalar(&self) -> Option<Deferred> {
        match self {
            Operand::Number(n) => Some(Deferred::new(*n)),
            Operand::Scalar(d) => Some(d.clone()),
            _ => None,
        }
    }

    /// Adds two operands.
    ///
    /// Series only add to series of the same kind.
    pub fn try_add(&self, rhs: &Operand) -> CadenceResult<Operand> {
        self.additive("+", rhs, |a, b| a + b, |a, b| a + b, |a, b| a + b, |a, b| a + b)
    }

    /// Subtracts `rhs` from `self`.
    ///
    /// Series only subtract from series of the same kind.
    pub fn try_sub(&self, rhs: &Operand) -> CadenceResult<Operand> {
        self.additive("-", rhs, |a, b| a - b, |a, b| a - b, |a, b| a - b, |a, b| a - b)
    }

    /// Multiplies two operands. A series times a number or scalar scales
    /// every entry.
    pub fn try_mul(&self, rhs: &Operand) -> CadenceResult<Operand> {
        let unsupported = || CadenceError::unsupported_operand("*", self.type_name(), rhs.type_name());
        match (self, rhs) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a * b)),
            (Operand::Balance(s), factor) | (factor, Operand::Balance(s)) => {
                let factor = factor.as_scalar().ok_or_else(unsupported)?;
                Ok(Operand::Balance(s.scale_by(&factor)))
            }
            (Operand::Payment(s), factor) | (factor, Operand::Payment(s)) => {
                let factor = factor.as_scalar().ok_or_else(unsupported)?;
                Ok(Operand::Payment(s.scale_by(&factor)))
            }
            _ => self.scalar_op("*", rhs, |a, b| a * b),
        }
    }

    /// Divides `self` by `rhs`. A series divided by a number or scalar
    /// divides every entry.
    pub fn try_div(&self, rhs: &Operand) -> CadenceResult<Operand> {
        let unsupported = || CadenceError::unsupported_operand("/", self.type_name(), rhs.type_name());
        match (self, rhs) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(a / b)),
            (Operand::Balance(s), divisor) => {
                let divisor = divisor.as_scalar().ok_or_else(unsupported)?;
                Ok(Operand::Balance(s.map_values(move |v| v / &divisor)))
            }
            (Operand::Payment(s), divisor) => {
                let divisor = divisor.as_scalar().ok_or_else(unsupported)?;
                Ok(Operand::Payment(s.map_values(move |v| v / &divisor)))
            }
            _ => self.scalar_op("/", rhs, |a, b| a / b),
        }
    }

    /// Negates the operand. Never fails.
    #[must_use]
    pub fn negate(&self) -> Operand {
        match self {
            Operand::Number(n) => Operand::Number(-n),
            Operand::Scalar(d) => Operand::Scalar(-d),
            Operand::Balance(s) => Operand::Balance(s.negate()),
            Operand::Payment(s) => Operand::Payment(s.negate()),
        }
    }

    fn additive(
        &self,
        op: &'static str,
        rhs: &Operand,
        numbers: fn(f64, f64) -> f64,
        scalars: fn(&Deferred, &Deferred) -> Deferred,
        balances: fn(&BalanceSeries, &BalanceSeries) -> BalanceSeries,
        payments: fn(&PaymentSeries, &PaymentSeries) -> PaymentSeries,
    ) -> CadenceResult<Operand> {
        match (self, rhs) {
            (Operand::Number(a), Operand::Number(b)) => Ok(Operand::Number(numbers(*a, *b))),
            (Operand::Balance(a), Operand::Balance(b)) => Ok(Operand::Balance(balances(a, b))),
            (Operand::Payment(a), Operand::Payment(b)) => Ok(Operand::Payment(payments(a, b))),
            (lhs, rhs) if lhs.is_series() || rhs.is_series() => Err(CadenceError::kind_mismatch(
                op,
                lhs.type_name(),
                rhs.type_name(),
            )),
            _ => self.scalar_op(op, rhs, |a, b| scalars(&a, &b)),
        }
    }

    fn scalar_op(
        &self,
        op: &'static str,
        rhs: &Operand,
        f: impl FnOnce(Deferred, Deferred) -> Deferred,
    ) -> CadenceResult<Operand> {
        match (self.as_scalar(), rhs.as_scalar()) {
            (Some(a), Some(b)) => Ok(Operand::Scalar(f(a, b))),
            _ => Err(CadenceError::unsupported_operand(
                op,
                self.type_name(),
                rhs.type_name(),
            )),
        }
    }

    /// Forces a numeric operand; `None` for series.
    pub fn value(&self) -> Option<f64> {
        self.as_scalar().map(|d| d.value())
    }

    /// The balance series, if this is one.
    pub fn as_balance(&self) -> Option<&BalanceSeries> {
        match self {
            Operand::Balance(s) => Some(s),
            _ => None,
        }
    }

    /// The payment series, if this is one.
    pub fn as_payment(&self) -> Option<&PaymentSeries> {
        match self {
            Operand::Payment(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Operand::Scalar(d) => f.debug_tuple("Scalar").field(d).finish(),
            Operand::Balance(s) => f.debug_tuple("Balance").field(s).finish(),
            Operand::Payment(s) => f.debug_tuple("Payment").field(s).finish(),
        }
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<Deferred> for Operand {
    fn from(d: Deferred) -> Self {
        Operand::Scalar(d)
    }
}

impl From<BalanceSeries> for Operand {
    fn from(s: BalanceSeries) -> Self {
        Operand::Balance(s)
    }
}

impl From<PaymentSeries> for Operand {
    fn from(s: PaymentSeries) -> Self {
        Operand::Payment(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Balance, Payment};
    use cadence_core::Date;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn balance() -> Operand {
        BalanceSeries::new(vec![Balance::new(d("2020-01-01"), 100.0)]).into()
    }

    fn payment() -> Operand {
        PaymentSeries::new(vec![Payment::new(d("2020-01-01"), 10.0)]).into()
    }

    #[test]
    fn test_numbers_stay_numbers() {
        let sum = Operand::from(2.0).try_add(&3.0.into()).unwrap();
        assert!(matches!(sum, Operand::Number(n) if n == 5.0));
        let quot = Operand::from(1.0).try_div(&4.0.into()).unwrap();
        assert_eq!(quot.value(), Some(0.25));
    }

    #[test]
    fn test_scalars_compose_lazily() {
        let lazy = Deferred::lazy(|| 6.0);
        let result = Operand::from(lazy.clone()).try_mul(&2.0.into()).unwrap();
        let result = Operand::from(10.0).try_sub(&result).unwrap();
        assert!(!lazy.is_evaluated());
        assert_eq!(result.value(), Some(-2.0));
        assert_eq!(Operand::from(lazy).negate().value(), Some(-6.0));
    }

    #[test]
    fn test_same_kind_series_add() {
        let sum = payment().try_add(&payment()).unwrap();
        assert_eq!(sum.as_payment().unwrap().on(d("2020-01-01")), 20.0);
        let diff = balance().try_sub(&balance()).unwrap();
        assert_eq!(diff.as_balance().unwrap().at(d("2020-06-01")), 0.0);
    }

    #[test]
    fn test_kind_mismatch() {
        let err = balance().try_add(&payment()).unwrap_err();
        assert_eq!(
            err,
            CadenceError::kind_mismatch("+", "BalanceSeries", "PaymentSeries")
        );
        assert!(matches!(
            payment().try_sub(&Operand::from(1.0)),
            Err(CadenceError::KindMismatch { op: "-", .. })
        ));
        assert!(matches!(
            Operand::from(Deferred::new(1.0)).try_add(&balance()),
            Err(CadenceError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_series_scaling() {
        let factor = Deferred::lazy(|| 0.5);
        let scaled = Operand::from(factor.clone()).try_mul(&payment()).unwrap();
        let series = scaled.as_payment().unwrap();
        assert_eq!(series.len(), 1);
        assert!(!factor.is_evaluated());
        assert_eq!(series.total(), 5.0);

        let halved = balance().try_div(&Operand::from(4.0)).unwrap();
        assert_eq!(halved.as_balance().unwrap().at(d("2020-01-01")), 25.0);
    }

    #[test]
    fn test_unsupported_operands() {
        assert!(matches!(
            payment().try_mul(&payment()),
            Err(CadenceError::UnsupportedOperand { op: "*", .. })
        ));
        assert!(matches!(
            Operand::from(1.0).try_div(&balance()),
            Err(CadenceError::UnsupportedOperand { op: "/", .. })
        ));
        assert!(matches!(
            balance().try_div(&payment()),
            Err(CadenceError::UnsupportedOperand { .. })
        ));
    }

    #[test]
    fn test_neg_series() {
        let neg = payment().negate();
        assert_eq!(neg.as_payment().unwrap().total(), -10.0);
        assert_eq!(neg.type_name(), "PaymentSeries");
        assert_eq!(neg.value(), None);
    }
}
