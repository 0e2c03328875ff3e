/// One general-ledger journal line ready for import.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct JournalRow {
    pub doc_number: String,
    pub date: String,
    pub due_date: String,
    pub description: String,
    pub account: String,
    /// Exactly one of debit/credit is non-empty.
    pub debit: String,
    pub credit: String,
    pub name: String,
}

/// One vendor-bill expense line. Keeps journal-style debit/credit strings
/// ("0" when inapplicable) so bill and journal rows can share rendering.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct BillRow {
    pub bill_number: String,
    pub vendor: String,
    pub date: String,
    pub due_date: String,
    pub account: String,
    pub description: String,
    /// Signed; negative values are credit memos.
    pub amount: String,
    pub debit: String,
    pub credit: String,
}

#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum ConvertedRow {
    Journal(JournalRow),
    Bill(BillRow),
}

impl ConvertedRow {
    /// Key that groups lines into one logical document.
    pub fn document_key(&self) -> &str {
        match self {
            ConvertedRow::Journal(journal) => &journal.doc_number,
            ConvertedRow::Bill(bill) => &bill.bill_number,
        }
    }
}
