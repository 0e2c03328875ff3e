use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use futures::future;
use std::path::{Path, PathBuf};

use super::columns::ColumnResolver;
use super::report::{summarize, ReportSummary, Transaction};
use super::source::SourceKind;
use crate::money::Cents;

// Two-digit-year formats must come first: `%y` consumes exactly two digits,
// so four-digit years fail it and fall through, while `%Y` happily parses
// "24" as the year 24.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Parses every export file concurrently, merges the accepted rows in input
/// order, assigns batch-wide ids, sorts newest first and groups by reporting
/// day. A file that cannot be read or parsed only loses its own rows; the
/// batch fails only when no file contributed anything usable.
pub async fn ingest(files: &[PathBuf], kind: SourceKind) -> Result<ReportSummary> {
    log::info!("Parsing {} export file(s)...", files.len());
    let tasks: Vec<_> = files
        .iter()
        .map(|file| tokio::spawn(parse_file(file.clone(), kind)))
        .collect();

    let mut transactions = Vec::new();
    for (file, joined) in files.iter().zip(future::join_all(tasks).await) {
        match joined.context("Parser task failed")? {
            Ok(rows) => transactions.extend(rows),
            Err(err) => log::warn!("Skipping {}: {:#}", file.display(), err),
        }
    }
    if transactions.is_empty() {
        bail!("None of the {} file(s) contained usable rows", files.len());
    }

    // One counter for the whole batch, assigned in emission order before the
    // sort so ids stay stable across identical inputs.
    for (n, transaction) in transactions.iter_mut().enumerate() {
        transaction.id = format!("{}-{}", transaction.reference, n + 1);
    }
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    log::info!("Parsing {} export file(s)...done", files.len());
    Ok(summarize(transactions))
}

async fn parse_file(file: PathBuf, kind: SourceKind) -> Result<Vec<Transaction>> {
    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    parse_export(&content, kind, &file)
}

fn parse_export(content: &str, kind: SourceKind, file: &Path) -> Result<Vec<Transaction>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();
    let resolver = ColumnResolver::new(&headers);
    let fields = kind.fields();
    let source_file = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;

        let timestamp_raw = resolver.resolve(&record, fields.timestamp);
        let Some(timestamp) = parse_timestamp(timestamp_raw) else {
            log::debug!("Dropping row with unusable timestamp {:?}", timestamp_raw);
            continue;
        };
        let Some(amount) = Cents::parse(resolver.resolve(&record, fields.amount)) else {
            log::debug!("Dropping row with unusable amount");
            continue;
        };
        let fee = Cents::parse(resolver.resolve(&record, fields.fee)).unwrap_or_default();
        let source_net = Cents::parse(resolver.resolve(&record, fields.net)).unwrap_or_default();
        // Exports that leave the net column empty (or zeroed) still imply it.
        let net = if source_net.is_zero() && !(amount.is_zero() && fee.is_zero()) {
            amount + fee
        } else {
            source_net
        };

        let status = resolver.resolve(&record, fields.status).to_string();
        if kind.excludes(&status, amount, fee, net) {
            continue;
        }

        let currency = resolver.resolve(&record, fields.currency);
        rows.push(Transaction {
            id: String::new(),
            reference: resolver.resolve(&record, fields.reference).to_string(),
            timestamp,
            customer: resolver.resolve(&record, fields.customer).to_string(),
            amount,
            fee,
            net,
            status,
            instrument: resolver.resolve(&record, fields.instrument).to_string(),
            currency: if currency.is_empty() {
                "USD".to_string()
            } else {
                currency.to_string()
            },
            source_file: source_file.clone(),
        });
    }
    Ok(rows)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }
    None
}
