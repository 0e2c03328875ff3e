use anyhow::{Context, Result};

use super::client::LedgerClient;
use super::maps::LedgerMaps;
use super::payload::{
    BillLine, BillPayload, EntityRef, JournalEntryPayload, JournalLine, PostingType,
};
use crate::convert::{parse_mdy_date, BillRow, ConvertedRow, JournalRow};
use crate::money::Cents;

/// Tally of one submission run. Errors are accumulated per document and
/// reported next to the counts; they never abort the batch.
#[derive(Debug, Default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct SyncOutcome {
    pub submitted: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Submits converted rows to the ledger, one document at a time. A document
/// whose names cannot be resolved, or that the API rejects, fails alone.
pub async fn submit(
    rows: &[ConvertedRow],
    client: &LedgerClient,
    maps: &LedgerMaps,
) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();
    for (document, members) in group_by_document(rows) {
        match submit_document(&document, &members, client, maps).await {
            Ok(()) => outcome.submitted += 1,
            Err(err) => {
                log::warn!("Failed to submit {}: {:#}", document, err);
                outcome.failed += 1;
                outcome.errors.push(format!("{}: {:#}", document, err));
            }
        }
    }
    outcome
}

/// Groups rows by document key in first-appearance order, so submission
/// follows the converted output order.
fn group_by_document(rows: &[ConvertedRow]) -> Vec<(String, Vec<&ConvertedRow>)> {
    let mut groups: Vec<(String, Vec<&ConvertedRow>)> = Vec::new();
    for row in rows {
        let key = row.document_key();
        match groups
            .iter_mut()
            .find(|(existing, _)| existing.as_str() == key)
        {
            Some((_, members)) => members.push(row),
            None => groups.push((key.to_string(), vec![row])),
        }
    }
    groups
}

async fn submit_document(
    document: &str,
    members: &[&ConvertedRow],
    client: &LedgerClient,
    maps: &LedgerMaps,
) -> Result<()> {
    match members.first() {
        Some(ConvertedRow::Journal(_)) => submit_journal(document, members, client, maps).await,
        Some(ConvertedRow::Bill(_)) => submit_bill(document, members, client, maps).await,
        None => Ok(()),
    }
}

async fn submit_journal(
    document: &str,
    members: &[&ConvertedRow],
    client: &LedgerClient,
    maps: &LedgerMaps,
) -> Result<()> {
    let mut txn_date = None;
    let mut lines = Vec::new();
    for row in members {
        let ConvertedRow::Journal(journal) = row else {
            continue;
        };
        let account_id = maps
            .accounts
            .resolve(&journal.account)
            .with_context(|| format!("account {:?} is not in the account map", journal.account))?;
        let (posting_type, amount) = posting_side(journal);
        lines.push(JournalLine::new(
            journal.description.clone(),
            amount,
            posting_type,
            account_id.to_string(),
        ));
        if txn_date.is_none() {
            txn_date = Some(iso_date(&journal.date)?);
        }
    }
    let payload = JournalEntryPayload {
        doc_number: document.to_string(),
        txn_date: txn_date.unwrap_or_default(),
        line: lines,
    };
    client
        .create("journalentry", &serde_json::to_value(&payload)?)
        .await?;
    Ok(())
}

async fn submit_bill(
    document: &str,
    members: &[&ConvertedRow],
    client: &LedgerClient,
    maps: &LedgerMaps,
) -> Result<()> {
    let mut header: Option<&BillRow> = None;
    let mut lines = Vec::new();
    for row in members {
        let ConvertedRow::Bill(bill) = row else {
            continue;
        };
        header.get_or_insert(bill);
        let account_id = maps
            .accounts
            .resolve(&bill.account)
            .with_context(|| format!("account {:?} is not in the account map", bill.account))?;
        lines.push(BillLine::new(
            bill.description.clone(),
            Cents::parse(&bill.amount).unwrap_or_default().to_f64(),
            account_id.to_string(),
        ));
    }
    let Some(header) = header else {
        return Ok(());
    };
    let vendor_id = maps
        .vendors
        .resolve(&header.vendor)
        .with_context(|| format!("vendor {:?} is not in the vendor map", header.vendor))?;
    let payload = BillPayload {
        doc_number: document.to_string(),
        txn_date: iso_date(&header.date)?,
        due_date: if header.due_date.is_empty() {
            None
        } else {
            Some(iso_date(&header.due_date)?)
        },
        vendor_ref: EntityRef {
            value: vendor_id.to_string(),
        },
        line: lines,
    };
    client.create("bill", &serde_json::to_value(&payload)?).await?;
    Ok(())
}

/// Posting side follows whichever of debit/credit carries a non-zero value.
fn posting_side(journal: &JournalRow) -> (PostingType, f64) {
    match Cents::parse(&journal.debit) {
        Some(debit) if !debit.is_zero() => (PostingType::Debit, debit.to_f64()),
        _ => (
            PostingType::Credit,
            Cents::parse(&journal.credit).unwrap_or_default().to_f64(),
        ),
    }
}

fn iso_date(raw: &str) -> Result<String> {
    parse_mdy_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .with_context(|| format!("date {:?} is not in M/D/Y form", raw))
}

#[cfg(test)]
mod tests {
    use super::super::maps::NameMap;
    use super::*;
    use crate::config::ApiCredentials;
    use httpmock::prelude::*;
    use serde_json::json;

    fn journal_row(doc: &str, account: &str, debit: &str, credit: &str) -> ConvertedRow {
        ConvertedRow::Journal(JournalRow {
            doc_number: doc.to_string(),
            date: "1/5/2024".to_string(),
            due_date: String::new(),
            description: format!("(Ref: {doc})"),
            account: account.to_string(),
            debit: debit.to_string(),
            credit: credit.to_string(),
            name: String::new(),
        })
    }

    fn bill_row(doc: &str, vendor: &str, account: &str, amount: &str) -> ConvertedRow {
        ConvertedRow::Bill(BillRow {
            bill_number: doc.to_string(),
            vendor: vendor.to_string(),
            date: "1/5/24".to_string(),
            due_date: "2/4/24".to_string(),
            account: account.to_string(),
            description: "parts".to_string(),
            amount: amount.to_string(),
            debit: if amount.starts_with('-') { "0" } else { amount }.to_string(),
            credit: "0".to_string(),
        })
    }

    fn test_maps() -> LedgerMaps {
        let mut accounts = NameMap::default();
        accounts.insert("0-115-0 INVENTORY - PARTS", "42");
        accounts.insert("1-050-0 UNDEPOSITED FUNDS", "7");
        let mut vendors = NameMap::default();
        vendors.insert("NAPA Auto Parts", "63");
        LedgerMaps { accounts, vendors }
    }

    fn test_client(server: &MockServer) -> LedgerClient {
        LedgerClient::new(&ApiCredentials {
            base_url: server.base_url(),
            company_id: "test-co".to_string(),
            access_token: "token-123".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn grouping_preserves_first_appearance_order() {
        let rows = vec![
            journal_row("B", "x", "1.00", ""),
            journal_row("A", "x", "1.00", ""),
            journal_row("B", "x", "", "1.00"),
        ];
        let groups = group_by_document(&rows);
        assert_eq!(2, groups.len());
        assert_eq!("B", groups[0].0);
        assert_eq!(2, groups[0].1.len());
        assert_eq!("A", groups[1].0);
    }

    #[test]
    fn zero_amount_lines_post_as_credit() {
        let ConvertedRow::Journal(journal) = journal_row("CPIIF-010524", "x", "0.00", "") else {
            panic!("expected journal row");
        };
        let (posting_type, amount) = posting_side(&journal);
        assert_eq!(PostingType::Credit, posting_type);
        assert_eq!(0.0, amount);
    }

    #[tokio::test]
    async fn one_unresolved_document_fails_alone() {
        let server = MockServer::start_async().await;
        let created = server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/company/test-co/journalentry");
                then.status(200).json_body(json!({"JournalEntry": {"Id": "1"}}));
            })
            .await;

        let rows = vec![
            journal_row("CPIIF-010424", "0-115-0 INVENTORY - PARTS", "10.00", ""),
            journal_row("CPIIF-010524", "9-999-9 MYSTERY", "10.00", ""),
            journal_row("CPIIF-010624", "1-050-0 UNDEPOSITED FUNDS", "", "10.00"),
        ];
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(2, outcome.submitted);
        assert_eq!(1, outcome.failed);
        assert_eq!(1, outcome.errors.len());
        assert!(outcome.errors[0].contains("CPIIF-010524"));
        assert!(outcome.errors[0].contains("9-999-9 MYSTERY"));
        created.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn journal_lines_of_one_document_submit_together() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v3/company/test-co/journalentry")
                    .json_body(json!({
                        "DocNumber": "CPIIF-010524",
                        "TxnDate": "2024-01-05",
                        "Line": [
                            {
                                "Description": "(Ref: CPIIF-010524)",
                                "Amount": 150.0,
                                "DetailType": "JournalEntryLineDetail",
                                "JournalEntryLineDetail": {
                                    "PostingType": "Debit",
                                    "AccountRef": {"value": "42"}
                                }
                            },
                            {
                                "Description": "(Ref: CPIIF-010524)",
                                "Amount": 150.0,
                                "DetailType": "JournalEntryLineDetail",
                                "JournalEntryLineDetail": {
                                    "PostingType": "Credit",
                                    "AccountRef": {"value": "7"}
                                }
                            }
                        ]
                    }));
                then.status(200).json_body(json!({}));
            })
            .await;

        let rows = vec![
            journal_row("CPIIF-010524", "0-115-0 INVENTORY - PARTS", "150.00", ""),
            journal_row("CPIIF-010524", "1-050-0 UNDEPOSITED FUNDS", "", "150.00"),
        ];
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(1, outcome.submitted);
        assert_eq!(0, outcome.failed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bills_resolve_vendor_and_normalize_dates() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/company/test-co/bill").json_body(json!({
                    "DocNumber": "77123",
                    "TxnDate": "2024-01-05",
                    "DueDate": "2024-02-04",
                    "VendorRef": {"value": "63"},
                    "Line": [{
                        "Description": "parts",
                        "Amount": -25.0,
                        "DetailType": "AccountBasedExpenseLineDetail",
                        "AccountBasedExpenseLineDetail": {"AccountRef": {"value": "42"}}
                    }]
                }));
                then.status(200).json_body(json!({}));
            })
            .await;

        // Credit memo: the negative amount goes through unchanged.
        let rows = vec![bill_row(
            "77123",
            "NAPA Auto Parts",
            "0-115-0 INVENTORY - PARTS",
            "-25.00",
        )];
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(1, outcome.submitted);
        assert_eq!(0, outcome.failed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_vendor_fails_the_bill() {
        let server = MockServer::start_async().await;
        let rows = vec![bill_row(
            "77124",
            "Unknown Vendor Co",
            "0-115-0 INVENTORY - PARTS",
            "10.00",
        )];
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(0, outcome.submitted);
        assert_eq!(1, outcome.failed);
        assert!(outcome.errors[0].contains("77124"));
        assert!(outcome.errors[0].contains("Unknown Vendor Co"));
    }

    #[tokio::test]
    async fn api_rejection_counts_as_failure_with_fault_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/company/test-co/journalentry");
                then.status(400).json_body(json!({
                    "Fault": {"Error": [{"Detail": "Duplicate Document Number Error"}]}
                }));
            })
            .await;

        let rows = vec![journal_row(
            "CPIIF-010524",
            "0-115-0 INVENTORY - PARTS",
            "10.00",
            "",
        )];
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(0, outcome.submitted);
        assert_eq!(1, outcome.failed);
        assert!(outcome.errors[0].contains("Duplicate Document Number Error"));
    }

    #[tokio::test]
    async fn unnormalizable_date_fails_the_document() {
        let server = MockServer::start_async().await;
        let mut rows = vec![journal_row(
            "CPIIF-BAD",
            "0-115-0 INVENTORY - PARTS",
            "10.00",
            "",
        )];
        if let ConvertedRow::Journal(journal) = &mut rows[0] {
            journal.date = "January 5th".to_string();
        }
        let outcome = submit(&rows, &test_client(&server), &test_maps()).await;

        assert_eq!(1, outcome.failed);
        assert!(outcome.errors[0].contains("January 5th"));
    }
}
