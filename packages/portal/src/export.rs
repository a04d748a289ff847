//! # CSV report export
//!
//! Reports are produced entirely on the client and handed to the browser as a
//! download; nothing is written back to the backend.
//!
//! ## Format
//!
//! ```text
//! Member No,Full Name,House No,Phone,Email,Status
//! "RW-001","Budi Santoso","A-3","-","-","Active"
//! ```
//!
//! - one plain header line, then exactly one line per row
//! - every data field is wrapped in double quotes, embedded quotes are doubled
//! - a missing or empty value is written as `-`
//!
//! Row types opt in through [`CsvRow`]; [`Report`] names the downloadable reports
//! and their filenames.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::models::{Activity, ExpenseRecord, IncomeRecord, MonthlyDue, Profile};

/// Placeholder written for empty cells.
pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("row {row} has {found} fields, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A row that can be written to a CSV report.
pub trait CsvRow {
    fn headers() -> &'static [&'static str];
    fn fields(&self) -> Vec<Option<String>>;
}

/// Blank values become [`EMPTY_CELL`]; anything else is written as stored.
fn cell(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => EMPTY_CELL,
    }
}

/// Render `headers` and `rows` as CSV text.
pub fn to_csv(headers: &[&str], rows: &[Vec<Option<String>>]) -> Result<String, ExportError> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(headers)?;
    let buf = header.into_inner().map_err(|e| e.into_error())?;

    let mut body = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            return Err(ExportError::RowLength {
                row: idx,
                expected: headers.len(),
                found: row.len(),
            });
        }
        body.write_record(row.iter().map(cell))?;
    }
    let buf = body.into_inner().map_err(|e| e.into_error())?;

    Ok(String::from_utf8(buf)?)
}

/// Render typed rows using their [`CsvRow`] headers.
pub fn export_rows<R: CsvRow>(rows: &[R]) -> Result<String, ExportError> {
    let fields: Vec<Vec<Option<String>>> = rows.iter().map(CsvRow::fields).collect();
    to_csv(R::headers(), &fields)
}

fn amount(value: f64) -> Option<String> {
    Some(format!("{value}"))
}

fn date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%Y-%m-%d").to_string())
}

impl CsvRow for Profile {
    fn headers() -> &'static [&'static str] {
        &["Member No", "Full Name", "House No", "Phone", "Email", "Status"]
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![
            self.member_number.clone(),
            Some(self.full_name.clone()),
            self.house_number.clone(),
            self.phone.clone(),
            self.email.clone(),
            Some(self.status.label().to_string()),
        ]
    }
}

/// A dues row joined with the paying member's name.
#[derive(Clone, Debug, PartialEq)]
pub struct DueLine {
    pub due: MonthlyDue,
    pub member_name: Option<String>,
}

impl CsvRow for DueLine {
    fn headers() -> &'static [&'static str] {
        &["Member", "Period", "Amount", "Payment Date", "Status"]
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![
            self.member_name.clone(),
            Some(format!(
                "{} {}",
                crate::aggregate::month_short_name(self.due.month),
                self.due.year
            )),
            amount(self.due.amount),
            date(self.due.payment_date),
            Some(self.due.status.label().to_string()),
        ]
    }
}

/// One line of the combined income/expense ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct FinanceLine {
    pub date: NaiveDate,
    pub kind: &'static str,
    pub description: String,
    pub amount: f64,
}

impl From<&IncomeRecord> for FinanceLine {
    fn from(record: &IncomeRecord) -> Self {
        Self {
            date: record.date,
            kind: "Income",
            description: record.title.clone(),
            amount: record.amount,
        }
    }
}

impl From<&ExpenseRecord> for FinanceLine {
    fn from(record: &ExpenseRecord) -> Self {
        let description = match &record.description {
            Some(d) if !d.trim().is_empty() => format!("{}: {}", record.category, d.trim()),
            _ => record.category.clone(),
        };
        Self {
            date: record.date,
            kind: "Expense",
            description,
            amount: record.amount,
        }
    }
}

/// Merge income and expenses into one ledger ordered by date.
pub fn finance_ledger(income: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Vec<FinanceLine> {
    let mut lines: Vec<FinanceLine> = income
        .iter()
        .map(FinanceLine::from)
        .chain(expenses.iter().map(FinanceLine::from))
        .collect();
    lines.sort_by_key(|l| l.date);
    lines
}

impl CsvRow for FinanceLine {
    fn headers() -> &'static [&'static str] {
        &["Date", "Type", "Description", "Amount"]
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![
            date(Some(self.date)),
            Some(self.kind.to_string()),
            Some(self.description.clone()),
            amount(self.amount),
        ]
    }
}

impl CsvRow for Activity {
    fn headers() -> &'static [&'static str] {
        &["Title", "Location", "Start", "End", "Capacity", "Fee"]
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![
            Some(self.title.clone()),
            self.location.clone(),
            Some(self.start_time.format("%Y-%m-%d %H:%M").to_string()),
            self.end_time.map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            self.capacity.map(|c| c.to_string()),
            self.fee.and_then(amount),
        ]
    }
}

/// The downloadable reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    Members,
    Dues,
    Finance,
    Activities,
}

impl Report {
    pub const ALL: [Report; 4] = [
        Report::Members,
        Report::Dues,
        Report::Finance,
        Report::Activities,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Report::Members => "members",
            Report::Dues => "dues",
            Report::Finance => "finance",
            Report::Activities => "activities",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Report::Members => "Member list",
            Report::Dues => "Dues payments",
            Report::Finance => "Income & expenses",
            Report::Activities => "Activities",
        }
    }

    /// `members-2026-10-16.csv`
    pub fn filename(&self, on: NaiveDate) -> String {
        format!("{}-{}.csv", self.slug(), on.format("%Y-%m-%d"))
    }
}
