//! End-to-end scenarios: schedules feeding series, series feeding each other.

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use cadence_core::config::{OrderCheck, SeriesConfig};
use cadence_core::{Date, Deferred};
use cadence_series::node::{Node, NodeRegistry};
use cadence_series::{Balance, BalanceSeries, Payment, PaymentSeries, Schedule};

fn d(s: &str) -> Date {
    Date::parse(s).unwrap()
}

/// Level-payment loan: monthly payments and the outstanding balance after each.
struct Amortization {
    start: Date,
    principal: f64,
    monthly_rate: f64,
    months: u32,
}

impl Amortization {
    fn payment(&self) -> f64 {
        let r = self.monthly_rate;
        let n = f64::from(self.months);
        self.principal * r / (1.0 - (1.0 + r).powf(-n))
    }

    fn dates(&self) -> Vec<Date> {
        (1..=self.months)
            .map(|m| self.start.add_months(i32::try_from(m).unwrap()).unwrap())
            .collect()
    }
}

struct LoanPayments(Amortization);

impl Schedule<cadence_series::Flow> for LoanPayments {
    type Entries = std::vec::IntoIter<Payment>;

    fn entries(self) -> Self::Entries {
        let amount = self.0.payment();
        self.0
            .dates()
            .into_iter()
            .map(|date| Payment::new(date, amount))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

struct LoanBalance(Amortization);

impl Schedule<cadence_series::Stock> for LoanBalance {
    type Entries = std::vec::IntoIter<Balance>;

    fn entries(self) -> Self::Entries {
        let payment = self.0.payment();
        let mut outstanding = self.0.principal;
        let mut entries = vec![Balance::new(self.0.start, outstanding)];
        for date in self.0.dates() {
            outstanding = outstanding * (1.0 + self.0.monthly_rate) - payment;
            entries.push(Balance::new(date, outstanding));
        }
        entries.into_iter()
    }
}

fn loan() -> Amortization {
    Amortization {
        start: d("2024-01-15"),
        principal: 12_000.0,
        monthly_rate: 0.01,
        months: 12,
    }
}

#[test]
fn amortization_schedule_pays_down_to_zero() {
    let payments = PaymentSeries::from_schedule(LoanPayments(loan()));
    let balance = BalanceSeries::from_schedule(LoanBalance(loan()));

    assert_eq!(payments.len(), 12);
    assert_relative_eq!(balance.at(d("2024-01-01")), 0.0);
    assert_relative_eq!(balance.at(d("2024-02-01")), 12_000.0);
    assert_relative_eq!(balance.at(d("2025-06-01")), 0.0, epsilon = 1e-6);

    let first_half = payments.over(d("2024-01-15"), d("2024-07-15"));
    assert_relative_eq!(first_half, 6.0 * loan().payment(), max_relative = 1e-12);
}

#[test]
fn two_accounts_combine_with_carry_forward() {
    let checking = BalanceSeries::new(vec![
        Balance::new(d("2020-01-01"), 100.0),
        Balance::new(d("2020-03-01"), 80.0),
    ]);
    let savings = BalanceSeries::new(vec![Balance::new(d("2020-02-01"), 50.0)]);
    let total = &checking + &savings;

    let observed: Vec<_> = total.iter().map(|b| (b.date(), b.value())).collect();
    assert_eq!(
        observed,
        vec![(d("2020-01-01"), 100.0), (d("2020-02-01"), 150.0), (d("2020-03-01"), 130.0)]
    );
    assert_eq!(total.at(d("2020-12-31")), 130.0);
}

#[test]
fn payment_streams_do_not_fabricate_events() {
    let rent = PaymentSeries::new(vec![
        Payment::new(d("2020-01-01"), 10.0),
        Payment::new(d("2020-02-01"), 20.0),
    ]);
    let fees = PaymentSeries::new(vec![
        Payment::new(d("2020-02-01"), 5.0),
        Payment::new(d("2020-03-01"), 7.0),
    ]);
    let combined = &rent + &fees;
    assert_eq!(combined.on(d("2020-01-01")), 10.0);
    assert_eq!(combined.on(d("2020-02-01")), 25.0);
    assert_eq!(combined.on(d("2020-03-01")), 7.0);
    assert_eq!(combined.over(d("2020-01-15"), d("2020-02-15")), 25.0);
}

#[test]
fn derived_values_read_other_series_lazily() {
    // Interest accrues on the balance carried into each payment date. The
    // values are thunks that read the balance series only when forced.
    let balance = BalanceSeries::new(vec![
        Balance::new(d("2020-01-01"), 1_000.0),
        Balance::new(d("2020-02-01"), 2_000.0),
    ]);
    let reads = Rc::new(Cell::new(0));
    let interest_dates = vec![d("2020-01-31"), d("2020-02-29"), d("2020-03-31")];
    let interest = {
        let balance = balance.clone();
        let reads = Rc::clone(&reads);
        PaymentSeries::new(interest_dates.into_iter().map(move |date| {
            let balance = balance.clone();
            let reads = Rc::clone(&reads);
            Payment::lazy(date, move || {
                reads.set(reads.get() + 1);
                balance.at(date) * 0.01
            })
        }))
    };

    let with_fees = &interest + &PaymentSeries::new(vec![Payment::new(d("2020-02-29"), 1.0)]);
    assert_eq!(with_fees.len(), 3);
    assert_eq!(reads.get(), 0);

    assert_relative_eq!(with_fees.on(d("2020-02-29")), 21.0);
    assert_eq!(reads.get(), 1);
    assert_relative_eq!(with_fees.total(), 10.0 + 21.0 + 20.0);
    assert_eq!(reads.get(), 3);

    // Every value is memoized; a second pass reads nothing new.
    with_fees.total();
    interest.total();
    assert_eq!(reads.get(), 3);
}

#[test]
fn nested_traversal_inside_forcing_shares_the_buffer() {
    let produced = Rc::new(Cell::new(0));
    let counter = Rc::clone(&produced);
    let base = PaymentSeries::new((1..=4).map(move |m| {
        counter.set(counter.get() + 1);
        Payment::new(Date::from_ymd(2021, m, 1).unwrap(), f64::from(m))
    }));

    // Each cumulative value traverses `base` again while the outer traversal
    // of `base` that produced its date is paused.
    let running = {
        let source = base.clone();
        PaymentSeries::new(base.iter().map(move |p| {
            let source = source.clone();
            let date = p.date();
            Payment::lazy(date, move || source.over(d("2020-12-31"), date))
        }))
    };

    let totals: Vec<_> = running.iter().map(|p| p.value()).collect();
    assert_eq!(totals, vec![1.0, 3.0, 6.0, 10.0]);
    assert_eq!(produced.get(), 4);
}

#[test]
fn series_hang_under_composition_nodes() {
    let mut registry = NodeRegistry::new();
    let portfolio = registry.root("portfolio");
    let loan_node = registry.child(portfolio, "loan");

    let payments = PaymentSeries::from_schedule(LoanPayments(loan())).bound_to(loan_node);
    assert_eq!(payments.parent(), Some(loan_node));
    assert_eq!(
        payments
            .parent()
            .map(|p| registry.ancestors(p).collect::<Vec<_>>()),
        Some(vec![portfolio])
    );
}

#[test]
fn rebased_balance_samples_requested_dates() {
    let balance = BalanceSeries::new(vec![
        Balance::new(d("2020-01-10"), 10.0),
        Balance::new(d("2020-01-20"), 20.0),
    ]);
    let month_ends = vec![d("2019-12-31"), d("2020-01-31")];
    let rebased = balance.rebase(month_ends);
    let observed: Vec<_> = rebased.iter().map(|b| (b.date(), b.value())).collect();
    assert_eq!(
        observed,
        vec![
            (d("2019-12-31"), 0.0),
            (d("2020-01-10"), 10.0),
            (d("2020-01-20"), 20.0),
            (d("2020-01-31"), 20.0),
        ]
    );
}

#[test]
fn out_of_order_entries_warn_when_configured() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("cadence_series=trace"))
        .with_test_writer()
        .try_init();

    let config = SeriesConfig::new()
        .with_order_check(OrderCheck::Warn)
        .with_label("unsorted");
    let series = PaymentSeries::with_config(
        vec![
            Payment::new(d("2020-03-01"), 1.0),
            Payment::new(d("2020-01-01"), 2.0),
        ],
        &config,
    );
    // Trusted, not repaired: the entries pass through in producer order.
    let dates: Vec<_> = series.dates().collect();
    assert_eq!(dates, vec![d("2020-03-01"), d("2020-01-01")]);
}

#[test]
fn deferred_scale_tracks_late_inputs() {
    let rate = Deferred::lazy(|| 0.5);
    let payments = PaymentSeries::new(vec![
        Payment::new(d("2020-01-01"), 100.0),
        Payment::new(d("2020-02-01"), 200.0),
    ]);
    let scaled = payments.scale_by(&rate);
    let net = &payments - &scaled;
    assert_eq!(net.len(), 2);
    assert!(!rate.is_evaluated());
    assert_relative_eq!(net.total(), 150.0);
}
