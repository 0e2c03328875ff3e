use anyhow::{bail, Context as _, Result};
use chrono::NaiveDateTime;
use console::{pad_str, style, Alignment, StyledObject};
use std::path::{Path, PathBuf};

use crate::args::{Args, Command};
use crate::config::ApiCredentials;
use crate::convert::{self, ConvertMode, ConvertedRow};
use crate::ledger::{self, ReportSummary, SourceKind, Transaction};
use crate::money::Cents;
use crate::sync::{self, LedgerClient, NameMap, SyncOutcome};
use crate::terminal::{self, BulletPointPrinter, StdoutLineWriter};

pub async fn main(args: Args) -> Result<()> {
    match args.command {
        Command::Init { credentials } => main_init(&credentials).await,
        Command::Report { source, out, files } => main_report(source, out, files).await,
        Command::Convert { mode, out, file } => main_convert(mode, out, file).await,
        Command::Sync {
            mode,
            credentials,
            file,
        } => {
            let cli = Cli::connect(&credentials).await?;
            cli.main_sync(mode, &file).await
        }
        Command::Accounts { credentials } => {
            let cli = Cli::connect(&credentials).await?;
            cli.main_accounts().await
        }
    }
}

async fn main_init(credentials_path: &Path) -> Result<()> {
    if tokio::fs::try_exists(credentials_path).await? {
        bail!(
            "Credentials file {} already exists",
            credentials_path.display()
        );
    }
    let base_url = terminal::prompt_with_default(
        "API base URL",
        ApiCredentials::default_base_url().to_string(),
    )?;
    let company_id = terminal::prompt("Company ID")?;
    let access_token = terminal::prompt("Access token")?;
    let credentials = ApiCredentials {
        base_url,
        company_id,
        access_token,
    };

    // Verify before writing anything so a typo does not leave a broken file.
    let client = LedgerClient::new(&credentials)?;
    client
        .check_connection()
        .await
        .context("API connection failed")?;
    credentials.save(credentials_path).await?;
    println!("Credentials written to {}", credentials_path.display());
    Ok(())
}

async fn main_report(source: SourceKind, out: Option<PathBuf>, files: Vec<PathBuf>) -> Result<()> {
    let summary = ledger::ingest(&files, source).await?;
    print_summary(&summary);
    if let Some(out) = out {
        let mut buffer = Vec::new();
        ledger::write_report_csv(&summary, &mut buffer)?;
        tokio::fs::write(&out, buffer)
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        println!();
        println!("Report written to {}", out.display());
    }
    Ok(())
}

async fn main_convert(mode: ConvertMode, out: Option<PathBuf>, file: PathBuf) -> Result<()> {
    let rows = convert_file(mode, &file).await?;
    match out {
        Some(out) => {
            let mut buffer = Vec::new();
            convert::write_rows_csv(mode, &rows, &mut buffer)?;
            tokio::fs::write(&out, buffer)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{} row(s) written to {}", rows.len(), out.display());
        }
        None => convert::write_rows_csv(mode, &rows, std::io::stdout().lock())?,
    }
    Ok(())
}

async fn convert_file(mode: ConvertMode, file: &Path) -> Result<Vec<ConvertedRow>> {
    let document = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    convert::convert(&document, mode)
}

struct Cli {
    client: LedgerClient,
}

impl Cli {
    async fn connect(credentials_path: &Path) -> Result<Self> {
        let credentials = ApiCredentials::load(credentials_path).await?;
        Ok(Self {
            client: LedgerClient::new(&credentials)?,
        })
    }

    async fn main_sync(&self, mode: ConvertMode, file: &Path) -> Result<()> {
        let rows = convert_file(mode, file).await?;
        self.client
            .check_connection()
            .await
            .context("API connection failed")?;
        let maps = sync::refresh_maps(&self.client).await?;
        let outcome = sync::submit(&rows, &self.client, &maps).await;
        print_outcome(&outcome);
        Ok(())
    }

    async fn main_accounts(&self) -> Result<()> {
        let maps = sync::refresh_maps(&self.client).await?;
        println!("{}", style_header("Accounts:"));
        print_map(&maps.accounts);
        println!();
        println!("{}", style_header("Vendors:"));
        print_map(&maps.vendors);
        Ok(())
    }
}

fn print_summary(summary: &ReportSummary) {
    println!("{}", style_header(&format!("Report {}:", summary.date_range)));
    let printer = BulletPointPrinter::new_stdout();
    for group in &summary.groups {
        printer.print_item(style_day(&group.label));
        let printer = printer.indent();
        for transaction in &group.transactions {
            print_transaction(&printer, transaction);
        }
        printer.print_item(style_subtotal(&format!(
            "{} transaction(s), amount {}, fees {}, net {}",
            group.count(),
            group.amount_total,
            group.fee_total,
            group.net_total
        )));
    }
    printer.print_empty_line();
    printer.print_item(style_header(&format!(
        "Total: {} transaction(s), amount {}, fees {}, net {}",
        summary.transaction_count, summary.amount_total, summary.fee_total, summary.net_total
    )));
}

fn print_transaction(printer: &BulletPointPrinter<StdoutLineWriter>, transaction: &Transaction) {
    let customer = if transaction.customer.is_empty() {
        String::new()
    } else {
        format!(" {}", transaction.customer)
    };
    let instrument = if transaction.instrument.is_empty() {
        String::new()
    } else {
        format!(" [{}]", transaction.instrument)
    };
    printer.print_item(format!(
        "{} {}{}{}",
        pad_str(
            &style_date(&transaction.timestamp).to_string(),
            19,
            Alignment::Left,
            None
        ),
        pad_str(
            &style_amount(transaction.net, &transaction.currency).to_string(),
            15,
            Alignment::Right,
            None
        ),
        style_customer(&customer),
        style_instrument(&instrument),
    ));
}

fn print_map(map: &NameMap) {
    if map.is_empty() {
        println!("(none)");
        return;
    }
    let printer = BulletPointPrinter::new_stdout();
    for (name, id) in map.entries() {
        printer.print_item(format!(
            "{} {}",
            pad_str(&style_map_id(id).to_string(), 6, Alignment::Right, None),
            style_map_name(name),
        ));
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    println!();
    println!("{}", style_header("Sync result:"));
    let printer = BulletPointPrinter::new_stdout();
    printer.print_item(format!("{} document(s) submitted", outcome.submitted));
    printer.print_item(format!("{} document(s) failed", outcome.failed));
    let printer = printer.indent();
    for error in &outcome.errors {
        printer.print_item(style_error(error));
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_day(label: &str) -> StyledObject<&str> {
    style(label).cyan().bold()
}

fn style_date(timestamp: &NaiveDateTime) -> StyledObject<String> {
    style(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn style_amount(amount: Cents, currency: &str) -> StyledObject<String> {
    let result = style(format!("{} {}", amount, currency)).bold();
    if amount.0 < 0 {
        result.red()
    } else {
        result.green()
    }
}

fn style_customer(customer: &str) -> StyledObject<&str> {
    style(customer).yellow()
}

fn style_instrument(instrument: &str) -> StyledObject<&str> {
    style(instrument).magenta()
}

fn style_subtotal(subtotal: &str) -> StyledObject<&str> {
    style(subtotal).italic()
}

fn style_map_id(id: &str) -> StyledObject<&str> {
    style(id).cyan()
}

fn style_map_name(name: &str) -> StyledObject<&str> {
    style(name).magenta()
}

fn style_error(error: &str) -> StyledObject<&str> {
    style(error).red()
}
