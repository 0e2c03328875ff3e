use anyhow::{bail, Result};

use super::layout::{classify, Line, RecordKind, RecordLayout};
use super::overrides;
use super::rows::{ConvertedRow, JournalRow};
use crate::money::Cents;

/// General-ledger pass: every `SPL` line becomes one journal row; `TRNS`
/// lines are ignored entirely.
pub(super) fn convert(document: &str) -> Result<Vec<ConvertedRow>> {
    let account_overrides = overrides::general_ledger();
    let mut layout = RecordLayout::default();
    let mut declared = false;
    let mut rows: Vec<JournalRow> = Vec::new();

    for line in document.lines() {
        match classify(line) {
            Line::Declaration(RecordKind::Split, cells) => {
                layout = RecordLayout::new(&cells);
                declared = true;
            }
            Line::Data(RecordKind::Split, cells) => {
                let date = layout.value(&cells, "DATE");
                let memo = layout.value(&cells, "MEMO");
                let source_doc = layout.value(&cells, "DOCNUM");
                let description = if memo.is_empty() {
                    format!("(Ref: {})", source_doc)
                } else {
                    format!("{} (Ref: {})", memo, source_doc)
                };
                let account = layout.value(&cells, "ACCNT");
                let amount = Cents::parse(layout.value(&cells, "AMOUNT")).unwrap_or_default();
                let (debit, credit) = split_amount(amount);
                rows.push(JournalRow {
                    doc_number: derive_doc_number(date),
                    date: date.to_string(),
                    due_date: String::new(),
                    description,
                    account: account_overrides
                        .get(account)
                        .copied()
                        .unwrap_or(account)
                        .to_string(),
                    debit,
                    credit,
                    name: layout.value(&cells, "NAME").to_string(),
                });
            }
            _ => {}
        }
    }
    if !declared {
        bail!("No !SPL column declaration found in document");
    }

    rows.sort_by(|a, b| a.doc_number.cmp(&b.doc_number));
    Ok(rows.into_iter().map(ConvertedRow::Journal).collect())
}

/// `CPIIF-MMDDYY` from a M/D/Y date. Dates in any other shape keep their
/// characters with separators stripped, so the derived number still sorts.
fn derive_doc_number(date: &str) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() == 3 {
        let month = parts[0].trim().parse::<u32>();
        let day = parts[1].trim().parse::<u32>();
        let year = parts[2].trim().parse::<u32>();
        if let (Ok(month), Ok(day), Ok(year)) = (month, day, year) {
            return format!("CPIIF-{:02}{:02}{:02}", month, day, year % 100);
        }
    }
    let stripped: String = date
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | ' '))
        .collect();
    format!("CPIIF-{}", stripped)
}

/// Positive amounts post as debits, negative as credits; the other side
/// stays empty. Zero lands on the debit side.
fn split_amount(amount: Cents) -> (String, String) {
    if amount.0 < 0 {
        (String::new(), (-amount).to_string())
    } else {
        (amount.to_string(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{convert, ConvertMode};
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1/5/2024", "CPIIF-010524")]
    #[case("01/05/2024", "CPIIF-010524")]
    #[case("12/31/99", "CPIIF-123199")]
    #[case("2024-01-05", "CPIIF-20240105")]
    #[case("1/5", "CPIIF-15")]
    #[case("Jan 5 2024", "CPIIF-Jan52024")]
    fn doc_numbers_derive_from_dates(#[case] date: &str, #[case] expected: &str) {
        assert_eq!(expected, derive_doc_number(date));
    }

    #[test]
    fn missing_declaration_is_an_error() {
        let document = "TRNS\t1/5/2024\nSPL\t1/5/2024\n";
        let err = convert(document, ConvertMode::Journal).unwrap_err();
        assert!(err.to_string().contains("!SPL"));
    }

    #[test]
    fn splits_sign_into_debit_or_credit_never_both() {
        let document = "!SPL\tDATE\tACCNT\tMEMO\tAMOUNT\tDOCNUM\tNAME\n\
                        SPL\t1/5/2024\tLabor\tBrake job\t450.00\tINV-12\tJane Doe\n\
                        SPL\t1/5/2024\tSales Tax Payable\t\t-36.00\tINV-12\t\n";
        let rows = convert(document, ConvertMode::Journal).unwrap();
        assert_eq!(2, rows.len());
        let ConvertedRow::Journal(debit_row) = &rows[0] else {
            panic!("expected journal row");
        };
        assert_eq!("4-020-0 LABOR SALES", debit_row.account);
        assert_eq!("450.00", debit_row.debit);
        assert_eq!("", debit_row.credit);
        assert_eq!("Brake job (Ref: INV-12)", debit_row.description);
        let ConvertedRow::Journal(credit_row) = &rows[1] else {
            panic!("expected journal row");
        };
        assert_eq!("", credit_row.debit);
        assert_eq!("36.00", credit_row.credit);
        assert_eq!("(Ref: INV-12)", credit_row.description);
    }

    #[test]
    fn zero_amounts_land_on_the_debit_side() {
        let document = "!SPL\tDATE\tACCNT\tMEMO\tAMOUNT\tDOCNUM\tNAME\n\
                        SPL\t1/5/2024\tParts\tPrice adjustment\t0.00\tINV-14\t\n";
        let rows = convert(document, ConvertMode::Journal).unwrap();
        let ConvertedRow::Journal(row) = &rows[0] else {
            panic!("expected journal row");
        };
        assert_eq!("0.00", row.debit);
        assert_eq!("", row.credit);
    }

    #[test]
    fn rows_sort_by_derived_doc_number() {
        let document = "!SPL\tDATE\tACCNT\tAMOUNT\n\
                        SPL\t2/1/2024\tParts\t10.00\n\
                        SPL\t1/5/2024\tParts\t20.00\n\
                        SPL\t1/20/2024\tParts\t30.00\n";
        let rows = convert(document, ConvertMode::Journal).unwrap();
        let numbers: Vec<&str> = rows.iter().map(|row| row.document_key()).collect();
        assert_eq!(vec!["CPIIF-010524", "CPIIF-012024", "CPIIF-020124"], numbers);
    }

    #[test]
    fn redeclaration_replaces_the_layout() {
        let document = "!SPL\tDATE\tAMOUNT\n\
                        SPL\t1/5/2024\t10.00\n\
                        !SPL\tAMOUNT\tDATE\n\
                        SPL\t20.00\t1/6/2024\n";
        let rows = convert(document, ConvertMode::Journal).unwrap();
        let ConvertedRow::Journal(second) = &rows[1] else {
            panic!("expected journal row");
        };
        assert_eq!("1/6/2024", second.date);
        assert_eq!("20.00", second.debit);
    }

    #[test]
    fn unlisted_accounts_pass_through() {
        let document = "!SPL\tDATE\tACCNT\tAMOUNT\n\
                        SPL\t1/5/2024\tCustom Account\t10.00\n";
        let rows = convert(document, ConvertMode::Journal).unwrap();
        let ConvertedRow::Journal(row) = &rows[0] else {
            panic!("expected journal row");
        };
        assert_eq!("Custom Account", row.account);
    }
}
