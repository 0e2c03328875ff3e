use clap::ValueEnum;

use crate::money::Cents;

/// Which payment processor produced an export file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Card-gateway settlement ledger.
    Gateway,
    /// Point-of-sale export, interleaving sales with cash-drawer events.
    Pos,
}

/// Candidate column names for one logical field, in priority order.
pub struct FieldCandidates {
    pub reference: &'static [&'static str],
    pub timestamp: &'static [&'static str],
    pub customer: &'static [&'static str],
    pub amount: &'static [&'static str],
    pub fee: &'static [&'static str],
    pub net: &'static [&'static str],
    pub status: &'static [&'static str],
    pub instrument: &'static [&'static str],
    pub currency: &'static [&'static str],
}

const GATEWAY_FIELDS: FieldCandidates = FieldCandidates {
    reference: &["Transaction ID", "Reference", "Order ID"],
    timestamp: &["Date/Time", "Date", "Submitted"],
    customer: &["Customer Name", "Customer", "Cardholder Name"],
    amount: &["Amount", "Total", "Gross"],
    fee: &["Fee", "Fees", "Processing Fee"],
    net: &["Net", "Net Amount"],
    status: &["Status", "Type", "Transaction Type"],
    instrument: &["Card Brand", "Payment Method", "Brand"],
    currency: &["Currency", "Currency Code"],
};

const POS_FIELDS: FieldCandidates = FieldCandidates {
    reference: &["Transaction ID", "Payment ID", "Receipt Number"],
    timestamp: &["Datetime", "Date", "Payment Date"],
    customer: &["Customer Name", "Name", "Payer"],
    amount: &["Gross Sales", "Amount", "Total Collected"],
    fee: &["Fees", "Fee", "Processing Fees"],
    net: &["Net Total", "Net Sales", "Net"],
    status: &["Event Type", "Type", "Status"],
    instrument: &["Source", "Payment Method", "Card Brand"],
    currency: &["Currency", "Currency Code"],
};

impl SourceKind {
    pub fn fields(self) -> &'static FieldCandidates {
        match self {
            SourceKind::Gateway => &GATEWAY_FIELDS,
            SourceKind::Pos => &POS_FIELDS,
        }
    }

    /// Rows the processor reports but the ledger must not count. POS exports
    /// list cash withdrawals (they would double-count against end-of-day
    /// balancing) and emit all-zero summary artifact rows.
    pub fn excludes(self, status: &str, amount: Cents, fee: Cents, net: Cents) -> bool {
        match self {
            SourceKind::Gateway => false,
            SourceKind::Pos => {
                is_cash_withdrawal(status)
                    || (amount.is_zero() && fee.is_zero() && net.is_zero())
            }
        }
    }
}

fn is_cash_withdrawal(status: &str) -> bool {
    let status = status.trim();
    status.eq_ignore_ascii_case("cash withdrawal") || status.eq_ignore_ascii_case("withdrawal")
}
