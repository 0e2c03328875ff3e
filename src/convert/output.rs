use anyhow::{Context, Result};
use std::io::Write;

use super::rows::ConvertedRow;
use super::ConvertMode;

const JOURNAL_HEADER: [&str; 8] = [
    "JournalNo",
    "JournalDate",
    "DueDate",
    "Description",
    "Account",
    "Debit",
    "Credit",
    "Name",
];

const BILL_HEADER: [&str; 7] = [
    "Bill no",
    "Supplier",
    "Bill Date",
    "Due Date",
    "Account",
    "Line Amount",
    "Line Description",
];

/// Writes converted rows as import-ready CSV. Fields are quoted only when
/// they contain a comma, quote or line break.
pub fn write_rows_csv<W: Write>(mode: ConvertMode, rows: &[ConvertedRow], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    match mode {
        ConvertMode::Journal => {
            writer
                .write_record(JOURNAL_HEADER)
                .context("Failed to write journal header")?;
            for row in rows {
                if let ConvertedRow::Journal(journal) = row {
                    writer
                        .write_record([
                            journal.doc_number.as_str(),
                            &journal.date,
                            &journal.due_date,
                            &journal.description,
                            &journal.account,
                            &journal.debit,
                            &journal.credit,
                            &journal.name,
                        ])
                        .context("Failed to write journal row")?;
                }
            }
        }
        ConvertMode::Bills => {
            writer
                .write_record(BILL_HEADER)
                .context("Failed to write bill header")?;
            for row in rows {
                if let ConvertedRow::Bill(bill) = row {
                    writer
                        .write_record([
                            bill.bill_number.as_str(),
                            &bill.vendor,
                            &bill.date,
                            &bill.due_date,
                            &bill.account,
                            &bill.amount,
                            &bill.description,
                        ])
                        .context("Failed to write bill row")?;
                }
            }
        }
    }
    writer.flush().context("Failed to flush converted rows")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::convert;
    use super::*;

    fn render(mode: ConvertMode, document: &str) -> String {
        let rows = convert(document, mode).unwrap();
        let mut out = Vec::new();
        write_rows_csv(mode, &rows, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn journal_csv_matches_import_layout_exactly() {
        let document = "!SPL\tDATE\tACCNT\tMEMO\tAMOUNT\tDOCNUM\tNAME\n\
                        SPL\t1/5/2024\tParts\tOil filters\t150.00\tINV-88\tNAPA Auto Parts\n\
                        SPL\t1/4/2024\tSales Tax Payable\t\t-12.50\tINV-87\tState Board\n";
        assert_eq!(
            "JournalNo,JournalDate,DueDate,Description,Account,Debit,Credit,Name\n\
             CPIIF-010424,1/4/2024,,(Ref: INV-87),2-220-0 SALES TAX PAYABLE,,12.50,State Board\n\
             CPIIF-010524,1/5/2024,,Oil filters (Ref: INV-88),0-115-0 INVENTORY - PARTS,150.00,,NAPA Auto Parts\n",
            render(ConvertMode::Journal, document)
        );
    }

    #[test]
    fn fields_with_commas_or_quotes_are_escaped() {
        let document = "!SPL\tDATE\tACCNT\tMEMO\tAMOUNT\tDOCNUM\tNAME\n\
                        SPL\t1/5/2024\tParts\tfilters, 12\" hoses\t10.00\tINV-1\tDoe, Jane\n";
        let rendered = render(ConvertMode::Journal, document);
        assert!(rendered
            .contains("\"filters, 12\"\" hoses (Ref: INV-1)\",0-115-0 INVENTORY - PARTS"));
        assert!(rendered.ends_with(",\"Doe, Jane\"\n"));
    }

    #[test]
    fn bill_csv_uses_the_bill_layout() {
        let document = "!TRNS\tDATE\tNAME\tDOCNUM\tDUEDATE\n\
                        !SPL\tACCNT\tAMOUNT\tMEMO\n\
                        TRNS\t1/5/2024\tNAPA Auto Parts\t77123\t2/4/2024\n\
                        SPL\tFreight\t12.50\tshipping\n";
        assert_eq!(
            "Bill no,Supplier,Bill Date,Due Date,Account,Line Amount,Line Description\n\
             77123,NAPA Auto Parts,1/5/2024,2/4/2024,5-060-0 FREIGHT & DELIVERY,12.50,shipping\n",
            render(ConvertMode::Bills, document)
        );
    }
}
