use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CREDENTIALS_PATH;
use crate::convert::ConvertMode;
use crate::ledger::SourceKind;

/// Turn payment-processor exports and legacy ledger files into reports,
/// import-ready CSV and documents in the online accounting ledger.
#[derive(Parser, Debug)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the credentials file used by the API commands
    Init {
        /// Where to store the credentials file
        #[clap(long, default_value = DEFAULT_CREDENTIALS_PATH)]
        credentials: PathBuf,
    },

    /// Summarize processor export files into a daily report
    Report {
        /// Which processor produced the export files
        #[clap(long, value_enum)]
        source: SourceKind,

        /// Also write the normalized ledger as CSV to this path
        #[clap(long)]
        out: Option<PathBuf>,

        /// Export files to ingest
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },

    /// Convert a legacy tab-delimited ledger file into import-ready CSV
    Convert {
        /// What to build from the document
        #[clap(long, value_enum)]
        mode: ConvertMode,

        /// Output file; stdout when omitted
        #[clap(long)]
        out: Option<PathBuf>,

        /// The legacy document
        file: PathBuf,
    },

    /// Convert a legacy file and submit its documents to the ledger API
    Sync {
        /// What to build from the document
        #[clap(long, value_enum)]
        mode: ConvertMode,

        /// Credentials file written by `init`
        #[clap(long, default_value = DEFAULT_CREDENTIALS_PATH)]
        credentials: PathBuf,

        /// The legacy document
        file: PathBuf,
    },

    /// Refresh and list the remote account and vendor maps
    Accounts {
        /// Credentials file written by `init`
        #[clap(long, default_value = DEFAULT_CREDENTIALS_PATH)]
        credentials: PathBuf,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
