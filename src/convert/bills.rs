use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::layout::{classify, Line, RecordKind, RecordLayout};
use super::overrides::{self, PAYABLE_CLEARING_ACCOUNT};
use super::parse_mdy_date;
use super::rows::{BillRow, ConvertedRow};
use crate::money::Cents;

/// Document context carried from a `TRNS` header to the `SPL` lines under
/// it. Replaced wholesale by the next `TRNS` line, never global.
#[derive(Default)]
struct TxnContext {
    doc_number: String,
    date: String,
    due_date: String,
    vendor: String,
}

/// Accounts-payable pass: a single forward scan where `TRNS` headers refresh
/// the context and emit nothing, and `SPL` lines emit one bill row each.
pub(super) fn convert(document: &str) -> Result<Vec<ConvertedRow>> {
    let account_overrides = overrides::accounts_payable();
    let mut txn_layout = RecordLayout::default();
    let mut split_layout = RecordLayout::default();
    let mut txn_declared = false;
    let mut context = TxnContext::default();
    let mut rows: Vec<BillRow> = Vec::new();

    for line in document.lines() {
        match classify(line) {
            Line::Declaration(RecordKind::Txn, cells) => {
                txn_layout = RecordLayout::new(&cells);
                txn_declared = true;
            }
            Line::Declaration(RecordKind::Split, cells) => {
                split_layout = RecordLayout::new(&cells);
            }
            Line::Data(RecordKind::Txn, cells) => {
                context = TxnContext {
                    doc_number: txn_layout.value(&cells, "DOCNUM").to_string(),
                    date: txn_layout.value(&cells, "DATE").to_string(),
                    due_date: txn_layout
                        .first_value(&cells, &["DUEDATE", "DUE DATE"])
                        .to_string(),
                    vendor: txn_layout.value(&cells, "NAME").to_string(),
                };
            }
            Line::Data(RecordKind::Split, cells) => {
                let account = split_layout.value(&cells, "ACCNT");
                if account == PAYABLE_CLEARING_ACCOUNT {
                    continue;
                }
                let amount = Cents::parse(split_layout.value(&cells, "AMOUNT")).unwrap_or_default();
                let (debit, credit) = legacy_split(amount);
                rows.push(BillRow {
                    bill_number: context.doc_number.clone(),
                    vendor: context.vendor.clone(),
                    date: context.date.clone(),
                    due_date: context.due_date.clone(),
                    account: account_overrides
                        .get(account)
                        .copied()
                        .unwrap_or(account)
                        .to_string(),
                    description: split_layout.value(&cells, "MEMO").to_string(),
                    amount: amount.to_string(),
                    debit,
                    credit,
                });
            }
            Line::Other => {}
        }
    }
    if !txn_declared {
        bail!("No !TRNS column declaration found in document");
    }

    rows.sort_by(|a, b| {
        let key_a = (sortable_date(&a.date), a.bill_number.as_str());
        let key_b = (sortable_date(&b.date), b.bill_number.as_str());
        key_a.cmp(&key_b)
    });
    Ok(rows.into_iter().map(ConvertedRow::Bill).collect())
}

fn sortable_date(date: &str) -> NaiveDate {
    parse_mdy_date(date).unwrap_or(NaiveDate::MAX)
}

/// Journal-style debit/credit mirror of the signed amount, with "0" instead
/// of blanks.
fn legacy_split(amount: Cents) -> (String, String) {
    if amount.0 > 0 {
        (amount.to_string(), "0".to_string())
    } else if amount.0 < 0 {
        ("0".to_string(), (-amount).to_string())
    } else {
        ("0".to_string(), "0".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{convert, ConvertMode};
    use super::*;

    const DECLARATIONS: &str =
        "!TRNS\tTRNSTYPE\tDATE\tACCNT\tNAME\tAMOUNT\tDOCNUM\tDUEDATE\tTERMS\n\
         !SPL\tTRNSTYPE\tDATE\tACCNT\tNAME\tAMOUNT\tMEMO\n";

    fn bill_rows(document: &str) -> Vec<BillRow> {
        convert(document, ConvertMode::Bills)
            .unwrap()
            .into_iter()
            .map(|row| match row {
                ConvertedRow::Bill(bill) => bill,
                ConvertedRow::Journal(_) => panic!("expected bill row"),
            })
            .collect()
    }

    #[test]
    fn header_context_flows_onto_detail_lines() {
        let document = format!(
            "{DECLARATIONS}\
             TRNS\tBILL\t1/5/2024\tAccounts Payable\tNAPA Auto Parts\t-162.50\t77123\t2/4/2024\tNet 30\n\
             SPL\tBILL\t1/5/2024\tParts\t\t150.00\tOil filters\n\
             SPL\tBILL\t1/5/2024\tFreight\t\t12.50\t\n\
             ENDTRNS\n"
        );
        let rows = bill_rows(&document);
        assert_eq!(2, rows.len());
        assert_eq!("77123", rows[0].bill_number);
        assert_eq!("NAPA Auto Parts", rows[0].vendor);
        assert_eq!("1/5/2024", rows[0].date);
        assert_eq!("2/4/2024", rows[0].due_date);
        assert_eq!("0-115-0 INVENTORY - PARTS", rows[0].account);
        assert_eq!("Oil filters", rows[0].description);
        assert_eq!("150.00", rows[0].amount);
        assert_eq!("150.00", rows[0].debit);
        assert_eq!("0", rows[0].credit);
        assert_eq!("5-060-0 FREIGHT & DELIVERY", rows[1].account);
    }

    #[test]
    fn clearing_account_lines_are_skipped() {
        let document = format!(
            "{DECLARATIONS}\
             TRNS\tBILL\t1/5/2024\tAccounts Payable\tVendor A\t-10.00\tB1\t\t\n\
             SPL\tBILL\t1/5/2024\tAccounts Payable\t\t-10.00\toffset\n\
             SPL\tBILL\t1/5/2024\tFreight\t\t10.00\tshipping\n"
        );
        let rows = bill_rows(&document);
        assert_eq!(1, rows.len());
        assert_eq!("shipping", rows[0].description);
    }

    #[test]
    fn credit_memos_keep_their_negative_amount() {
        let document = format!(
            "{DECLARATIONS}\
             TRNS\tBILL\t1/8/2024\tAccounts Payable\tVendor A\t25.00\tCM-9\t\t\n\
             SPL\tBILL\t1/8/2024\tParts\t\t-25.00\treturned core\n"
        );
        let rows = bill_rows(&document);
        assert_eq!("-25.00", rows[0].amount);
        assert_eq!("0", rows[0].debit);
        assert_eq!("25.00", rows[0].credit);
    }

    #[test]
    fn context_resets_on_each_header() {
        let document = format!(
            "{DECLARATIONS}\
             TRNS\tBILL\t1/5/2024\tAccounts Payable\tVendor A\t-10.00\tB1\t2/4/2024\t\n\
             SPL\tBILL\t1/5/2024\tFreight\t\t10.00\t\n\
             TRNS\tBILL\t1/6/2024\tAccounts Payable\tVendor B\t-20.00\tB2\t\t\n\
             SPL\tBILL\t1/6/2024\tFreight\t\t20.00\t\n"
        );
        let rows = bill_rows(&document);
        assert_eq!("Vendor A", rows[0].vendor);
        assert_eq!("2/4/2024", rows[0].due_date);
        assert_eq!("Vendor B", rows[1].vendor);
        assert_eq!("", rows[1].due_date);
    }

    #[test]
    fn alternate_due_date_spelling_is_accepted() {
        let document = "!TRNS\tDATE\tNAME\tDOCNUM\tDUE DATE\n\
                        !SPL\tACCNT\tAMOUNT\tMEMO\n\
                        TRNS\t1/5/2024\tVendor A\tB1\t2/4/2024\n\
                        SPL\tFreight\t10.00\t\n";
        let rows = bill_rows(document);
        assert_eq!("2/4/2024", rows[0].due_date);
    }

    #[test]
    fn rows_sort_by_date_then_bill_number() {
        let document = format!(
            "{DECLARATIONS}\
             TRNS\tBILL\t2/1/2024\tAccounts Payable\tVendor A\t-10.00\tB9\t\t\n\
             SPL\tBILL\t2/1/2024\tFreight\t\t10.00\t\n\
             TRNS\tBILL\t1/5/2024\tAccounts Payable\tVendor B\t-20.00\tB2\t\t\n\
             SPL\tBILL\t1/5/2024\tFreight\t\t20.00\t\n\
             TRNS\tBILL\t1/5/2024\tAccounts Payable\tVendor C\t-30.00\tB1\t\t\n\
             SPL\tBILL\t1/5/2024\tFreight\t\t30.00\t\n"
        );
        let rows = bill_rows(&document);
        let numbers: Vec<&str> = rows.iter().map(|row| row.bill_number.as_str()).collect();
        assert_eq!(vec!["B1", "B2", "B9"], numbers);
    }

    #[test]
    fn missing_txn_declaration_is_an_error() {
        let document = "!SPL\tACCNT\tAMOUNT\nSPL\tFreight\t10.00\n";
        let err = convert(document, ConvertMode::Bills).unwrap_err();
        assert!(err.to_string().contains("!TRNS"));
    }
}
