//! # Client-side aggregation of fetched rows
//!
//! The backend hands back flat row sets; every total shown in the portal is
//! reduced here with [`sum_by`], the one shared reducer.
//!
//! | Function | Produces |
//! |----------|----------|
//! | [`sum_by`] | sum of a numeric field over any row slice |
//! | [`net_balance`] | income minus expenses |
//! | [`monthly_dues_total`] | paid dues of one [`MonthKey`] |
//! | [`monthly_series`] | twelve paid-dues totals for a year |
//! | [`FinanceSummary::from_rows`] | the finance card figures |
//!
//! Only dues with status `paid` count as income.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{ExpenseRecord, IncomeRecord, MonthlyDue};

/// Sum `field` over `rows`. An empty slice sums to zero.
pub fn sum_by<T>(rows: &[T], field: impl Fn(&T) -> f64) -> f64 {
    rows.iter().map(field).sum()
}

pub fn net_balance(income: f64, expenses: f64) -> f64 {
    income - expenses
}

/// A calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn previous(&self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn contains(&self, due: &MonthlyDue) -> bool {
        due.year == self.year && due.month == self.month
    }

    /// Short English month name, "Jan" .. "Dec".
    pub fn short_name(&self) -> &'static str {
        month_short_name(self.month)
    }
}

pub fn month_short_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "?",
    }
}

fn paid(dues: &[MonthlyDue]) -> Vec<MonthlyDue> {
    dues.iter().filter(|d| d.is_paid()).cloned().collect()
}

/// Paid dues recorded against `key`.
pub fn monthly_dues_total(dues: &[MonthlyDue], key: MonthKey) -> f64 {
    let in_month: Vec<MonthlyDue> = paid(dues).into_iter().filter(|d| key.contains(d)).collect();
    sum_by(&in_month, |d| d.amount)
}

/// Paid dues per month of `year`, index 0 is January.
pub fn monthly_series(dues: &[MonthlyDue], year: i32) -> [f64; 12] {
    let mut series = [0.0; 12];
    for (idx, slot) in series.iter_mut().enumerate() {
        *slot = monthly_dues_total(dues, MonthKey::new(year, idx as u32 + 1));
    }
    series
}

/// The figures behind the finance card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub dues_total: f64,
    pub other_income: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

impl FinanceSummary {
    pub fn from_rows(
        dues: &[MonthlyDue],
        income: &[IncomeRecord],
        expenses: &[ExpenseRecord],
    ) -> Self {
        let dues_total = sum_by(&paid(dues), |d| d.amount);
        let other_income = sum_by(income, |i| i.amount);
        let total_income = dues_total + other_income;
        let total_expenses = sum_by(expenses, |e| e.amount);
        Self {
            dues_total,
            other_income,
            total_income,
            total_expenses,
            balance: net_balance(total_income, total_expenses),
        }
    }
}
