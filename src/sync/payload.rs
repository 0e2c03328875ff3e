use serde::Serialize;

/// Entity reference in the API's `{"value": "<id>"}` shape.
#[derive(Serialize, Debug)]
pub struct EntityRef {
    pub value: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingType {
    Debit,
    Credit,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEntryPayload {
    pub doc_number: String,
    pub txn_date: String,
    pub line: Vec<JournalLine>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JournalLine {
    pub description: String,
    pub amount: f64,
    pub detail_type: String,
    pub journal_entry_line_detail: JournalLineDetail,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JournalLineDetail {
    pub posting_type: PostingType,
    pub account_ref: EntityRef,
}

impl JournalLine {
    pub fn new(
        description: String,
        amount: f64,
        posting_type: PostingType,
        account_id: String,
    ) -> Self {
        Self {
            description,
            amount,
            detail_type: "JournalEntryLineDetail".to_string(),
            journal_entry_line_detail: JournalLineDetail {
                posting_type,
                account_ref: EntityRef { value: account_id },
            },
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct BillPayload {
    pub doc_number: String,
    pub txn_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub vendor_ref: EntityRef,
    pub line: Vec<BillLine>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct BillLine {
    pub description: String,
    pub amount: f64,
    pub detail_type: String,
    pub account_based_expense_line_detail: ExpenseLineDetail,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseLineDetail {
    pub account_ref: EntityRef,
}

impl BillLine {
    pub fn new(description: String, amount: f64, account_id: String) -> Self {
        Self {
            description,
            amount,
            detail_type: "AccountBasedExpenseLineDetail".to_string(),
            account_based_expense_line_detail: ExpenseLineDetail {
                account_ref: EntityRef { value: account_id },
            },
        }
    }
}
