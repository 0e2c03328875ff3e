mod bills;
mod journal;
mod layout;
mod output;
mod overrides;
mod rows;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;

pub use output::write_rows_csv;
pub use rows::{BillRow, ConvertedRow, JournalRow};

/// What the legacy document should be converted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConvertMode {
    /// General-ledger journal lines, one per `SPL` detail line.
    Journal,
    /// Vendor bills built from `TRNS` headers and their `SPL` detail lines.
    Bills,
}

pub fn convert(document: &str, mode: ConvertMode) -> Result<Vec<ConvertedRow>> {
    match mode {
        ConvertMode::Journal => journal::convert(document),
        ConvertMode::Bills => bills::convert(document),
    }
}

/// Parses the legacy `M/D/YY[YY]` date shape. Two-digit years are taken as
/// 2000-based.
pub fn parse_mdy_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let year_raw = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    let mut year: i32 = year_raw.parse().ok()?;
    if year_raw.len() <= 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
