use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::io::Write;

use crate::money::Cents;

/// One normalized ledger row. Immutable once ingested; reporting-day
/// assignment and totals are derived downstream.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Transaction {
    /// Run-unique id: `{reference}-{batch counter}`.
    pub id: String,
    pub reference: String,
    pub timestamp: NaiveDateTime,
    pub customer: String,
    pub amount: Cents,
    pub fee: Cents,
    pub net: Cents,
    pub status: String,
    pub instrument: String,
    pub currency: String,
    pub source_file: String,
}

/// All transactions of one reporting day, newest first, with subtotals kept
/// incrementally as rows are appended.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct DailyGroup {
    pub date: NaiveDate,
    pub label: String,
    pub transactions: Vec<Transaction>,
    pub amount_total: Cents,
    pub fee_total: Cents,
    pub net_total: Cents,
}

impl DailyGroup {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            label: format_report_date(date),
            transactions: Vec::new(),
            amount_total: Cents::ZERO,
            fee_total: Cents::ZERO,
            net_total: Cents::ZERO,
        }
    }

    fn push(&mut self, transaction: Transaction) {
        self.amount_total += transaction.amount;
        self.fee_total += transaction.fee;
        self.net_total += transaction.net;
        self.transactions.push(transaction);
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

#[derive(Clone, Debug)]
pub struct ReportSummary {
    /// Single date, or `{oldest} - {newest}`.
    pub date_range: String,
    pub amount_total: Cents,
    pub fee_total: Cents,
    pub net_total: Cents,
    pub transaction_count: usize,
    /// Newest reporting day first.
    pub groups: Vec<DailyGroup>,
}

impl ReportSummary {
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.groups.iter().flat_map(|group| group.transactions.iter())
    }
}

/// The business day closes at 16:00. Anything at or after the cutoff counts
/// toward the next calendar date.
pub fn reporting_date(timestamp: NaiveDateTime) -> NaiveDate {
    let date = timestamp.date();
    if timestamp.time().hour() >= 16 {
        date.succ_opt().unwrap_or(date)
    } else {
        date
    }
}

fn format_report_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Partitions an already newest-first-sorted list into daily groups in one
/// walk. A new group opens whenever the reporting date changes.
fn group_by_reporting_day(transactions: Vec<Transaction>) -> Vec<DailyGroup> {
    let mut groups: Vec<DailyGroup> = Vec::new();
    for transaction in transactions {
        let date = reporting_date(transaction.timestamp);
        match groups.last_mut() {
            Some(group) if group.date == date => group.push(transaction),
            _ => {
                let mut group = DailyGroup::new(date);
                group.push(transaction);
                groups.push(group);
            }
        }
    }
    groups
}

pub fn summarize(transactions: Vec<Transaction>) -> ReportSummary {
    let groups = group_by_reporting_day(transactions);
    let date_range = match (groups.last(), groups.first()) {
        (Some(oldest), Some(newest)) if oldest.date != newest.date => {
            format!("{} - {}", oldest.label, newest.label)
        }
        (Some(single), _) => single.label.clone(),
        _ => String::new(),
    };
    let mut summary = ReportSummary {
        date_range,
        amount_total: Cents::ZERO,
        fee_total: Cents::ZERO,
        net_total: Cents::ZERO,
        transaction_count: 0,
        groups,
    };
    for group in &summary.groups {
        summary.amount_total += group.amount_total;
        summary.fee_total += group.fee_total;
        summary.net_total += group.net_total;
        summary.transaction_count += group.count();
    }
    summary
}

const REPORT_HEADER: [&str; 9] = [
    "Reporting Day",
    "Date/Time",
    "Transaction ID",
    "Customer",
    "Status",
    "Instrument",
    "Amount",
    "Fee",
    "Net",
];

/// Writes the normalized ledger as CSV, one row per transaction in report
/// order (newest day first).
pub fn write_report_csv<W: Write>(summary: &ReportSummary, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    writer
        .write_record(REPORT_HEADER)
        .context("Failed to write report header")?;
    for group in &summary.groups {
        for transaction in &group.transactions {
            writer
                .write_record([
                    group.label.as_str(),
                    &transaction.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    &transaction.id,
                    &transaction.customer,
                    &transaction.status,
                    &transaction.instrument,
                    &transaction.amount.to_string(),
                    &transaction.fee.to_string(),
                    &transaction.net.to_string(),
                ])
                .context("Failed to write report row")?;
        }
    }
    writer.flush().context("Failed to flush report output")?;
    Ok(())
}
