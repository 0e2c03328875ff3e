use common_macros::hash_map;
use std::collections::HashMap;

/// Detail lines posted against this account are the payable side of a bill
/// and must not be re-imported as expense lines.
pub const PAYABLE_CLEARING_ACCOUNT: &str = "Accounts Payable";

/// Source ledger account names that map onto a different account in the
/// target chart. Anything not listed passes through unchanged.
pub fn general_ledger() -> HashMap<&'static str, &'static str> {
    hash_map! {
        "Parts" => "0-115-0 INVENTORY - PARTS",
        "Labor" => "4-020-0 LABOR SALES",
        "Shop Supplies" => "5-250-0 SHOP SUPPLIES",
        "Sales Tax Payable" => "2-220-0 SALES TAX PAYABLE",
        "Undeposited Funds" => "1-050-0 UNDEPOSITED FUNDS",
    }
}

pub fn accounts_payable() -> HashMap<&'static str, &'static str> {
    hash_map! {
        "Parts" => "0-115-0 INVENTORY - PARTS",
        "Freight" => "5-060-0 FREIGHT & DELIVERY",
        "Office Supplies" => "6-210-0 OFFICE SUPPLIES",
        "Uncategorized Expense" => "6-999-0 UNCATEGORIZED EXPENSE",
    }
}
