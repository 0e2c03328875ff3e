mod columns;
mod ingest;
mod report;
mod source;

pub use columns::ColumnResolver;
pub use ingest::ingest;
pub use report::{
    reporting_date, summarize, write_report_csv, DailyGroup, ReportSummary, Transaction,
};
pub use source::SourceKind;
