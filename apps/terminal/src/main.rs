//! # Kasir Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        kasir (command line)                             │
//! │                                                                         │
//! │  kasir catalog [--low-stock] [--search rice]                            │
//! │  kasir sell RICE-005:2 TEA-006 --method cash --cash 200000 [--confirm]  │
//! │  kasir import payroll.csv [--commit]                                    │
//! │  kasir scan receipt.jpg [--commit]                                      │
//! │  kasir ask "Which products should I reorder?"                           │
//! │  kasir recommend COFF-004                                               │
//! │  kasir summary | kasir config                                           │
//! │                                                                         │
//! │  Every run starts from the seed catalog; nothing is persisted.          │
//! │  --json prints command responses as JSON.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kasir_core::{PaymentMethod, Product, StagedRecord};
use serde::Serialize;

use kasir_terminal::commands::{advisor, cart, catalog, checkout, config, import, report};
use kasir_terminal::error::{ApiError, ErrorCode};
use kasir_terminal::{init_tracing, Terminal};

#[derive(Debug, Parser)]
#[command(name = "kasir", version, about = "Kasir POS counter terminal")]
struct Cli {
    /// Advisor config file (defaults to advisor.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List products
    Catalog {
        /// Only products at or below their reorder point
        #[arg(long)]
        low_stock: bool,

        /// Filter by name, SKU or category
        #[arg(long)]
        search: Option<String>,
    },

    /// Ring up and pay for a sale
    Sell {
        /// Items as SKU or SKU:QTY
        #[arg(required = true, value_parser = parse_item)]
        items: Vec<SaleItem>,

        /// cash, qris or debit
        #[arg(long, default_value = "cash")]
        method: PaymentMethod,

        /// Cash handed over, in whole rupiah
        #[arg(long)]
        cash: Option<i64>,

        /// Confirm a sale above the anomaly threshold
        #[arg(long)]
        confirm: bool,
    },

    /// Stage a CSV file of expenses
    Import {
        file: PathBuf,

        /// Post the valid rows to the ledger
        #[arg(long)]
        commit: bool,
    },

    /// Read a receipt or invoice image
    Scan {
        image: PathBuf,

        /// Post the record to the ledger if it is valid
        #[arg(long)]
        commit: bool,
    },

    /// Ask the analyst a question
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Suggest products to go with a cart
    Recommend {
        #[arg(required = true, value_parser = parse_item)]
        items: Vec<SaleItem>,
    },

    /// Financial summary
    Summary,

    /// Show the store configuration
    Config,
}

#[derive(Debug, Clone)]
struct SaleItem {
    sku: String,
    quantity: i64,
}

fn parse_item(raw: &str) -> Result<SaleItem, String> {
    let (sku, quantity) = match raw.split_once(':') {
        Some((sku, qty)) => {
            let qty = qty
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid quantity in '{}'", raw))?;
            (sku, qty)
        }
        None => (raw, 1),
    };
    if sku.trim().is_empty() {
        return Err(format!("missing SKU in '{}'", raw));
    }
    Ok(SaleItem {
        sku: sku.trim().to_string(),
        quantity,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let terminal = Terminal::start(cli.config)?;
    let json = cli.json;

    match cli.command {
        Command::Catalog { low_stock, search } => {
            let products = match (low_stock, search) {
                (true, _) => catalog::low_stock(&terminal.store),
                (false, Some(query)) => catalog::search_products(&terminal.store, &query)?,
                (false, None) => catalog::list_products(&terminal.store),
            };
            if json {
                return print_json(&products);
            }
            print_products(&terminal, &products);
        }

        Command::Sell {
            items,
            method,
            cash,
            confirm,
        } => {
            ring_up(&terminal, &items)?;
            checkout::set_payment(&terminal.register, method, cash)?;

            let mut response =
                checkout::checkout(&terminal.config, &terminal.store, &terminal.register).await?;
            if let checkout::CheckoutResponse::NeedsConfirmation { quote } = &response {
                if !confirm {
                    return Err(ApiError::new(
                        ErrorCode::ConfirmationRequired,
                        format!(
                            "total {} is above {}; rerun with --confirm",
                            terminal.config.format_currency(quote.totals.total),
                            terminal.config.format_currency(terminal.config.anomaly_threshold)
                        ),
                    ));
                }
                response = checkout::confirm_checkout(
                    &terminal.config,
                    &terminal.store,
                    &terminal.register,
                )
                .await?;
            }

            if json {
                return print_json(&response);
            }
            if let checkout::CheckoutResponse::Completed { receipt } = &response {
                print_receipt(&terminal, receipt);
            }
        }

        Command::Import { file, commit } => {
            let staged = import::import_csv_file(&terminal.import, &file)?;
            let outcome = commit_if(&terminal, commit)?;
            if json {
                return print_json(&(staged, outcome));
            }
            for record in &staged.records {
                print_record(&terminal, record);
            }
            println!(
                "\n{} staged: {} valid, {} with errors",
                staged.staged, staged.valid_count, staged.error_count
            );
            if let Some(outcome) = &outcome {
                print_commit(&terminal, outcome);
            }
        }

        Command::Scan { image, commit } => {
            let record = import::scan_document(&terminal.advisor, &terminal.import, &image).await?;
            let outcome = commit_if(&terminal, commit)?;
            if json {
                return print_json(&(record, outcome));
            }
            print_record(&terminal, &record);
            if let Some(outcome) = &outcome {
                print_commit(&terminal, outcome);
            }
        }

        Command::Ask { question } => {
            let answer =
                advisor::ask(&terminal.advisor, &terminal.store, &question.join(" ")).await;
            if json {
                return print_json(&answer);
            }
            println!("{}", answer.answer);
        }

        Command::Recommend { items } => {
            ring_up(&terminal, &items)?;
            advisor::refresh_recommendations(&terminal.advisor, &terminal.store, &terminal.register)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
            let response = advisor::latest_recommendations(&terminal.advisor, &terminal.register);
            if json {
                return print_json(&response);
            }
            if response.products.is_empty() {
                println!("No suggestions");
            } else {
                print_products(&terminal, &response.products);
            }
        }

        Command::Summary => {
            let summary = report::financial_summary(&terminal.store);
            if json {
                return print_json(&summary);
            }
            let money = |m| terminal.config.format_currency(m);
            println!("Revenue        {:>16}", money(summary.summary.revenue));
            println!("COGS           {:>16}", money(summary.summary.cogs));
            println!("Gross profit   {:>16}", money(summary.summary.gross_profit));
            println!("Expenses       {:>16}", money(summary.summary.expenses));
            println!("Net profit     {:>16}", money(summary.summary.net_profit));
            println!("Tax collected  {:>16}", money(summary.summary.tax_collected));
            println!("Gross margin   {:>15.1}%", summary.gross_margin_pct);
            println!("Inventory      {:>16}", money(summary.inventory_value));
            println!("Low stock      {:>16}", summary.low_stock_count);
        }

        Command::Config => {
            let config = config::get_config(&terminal.config);
            if json {
                return print_json(&config);
            }
            println!("Store      {}", config.store_name);
            println!("Currency   {} ({})", config.currency_code, config.currency_symbol);
            println!("Tax rate   {:.2}%", f64::from(config.tax_rate_bps) / 100.0);
            println!("Threshold  {}", config.format_currency(config.anomaly_threshold));
        }
    }

    Ok(())
}

fn ring_up(terminal: &Terminal, items: &[SaleItem]) -> Result<(), ApiError> {
    for item in items {
        cart::add_sku_to_cart(&terminal.store, &terminal.register, &item.sku, item.quantity)?;
    }
    Ok(())
}

fn commit_if(terminal: &Terminal, commit: bool) -> Result<Option<import::CommitResponse>, ApiError> {
    if !commit {
        return Ok(None);
    }
    import::request_commit(&terminal.store, &terminal.import).map(Some)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_products(terminal: &Terminal, products: &[Product]) {
    println!("{:<10} {:<24} {:<11} {:>12} {:>6}", "SKU", "NAME", "CATEGORY", "PRICE", "STOCK");
    for p in products {
        println!(
            "{:<10} {:<24} {:<11} {:>12} {:>6}{}",
            p.sku,
            p.name,
            p.category,
            terminal.config.format_currency(p.price),
            p.stock,
            if p.is_low_stock() { "  LOW" } else { "" }
        );
    }
}

fn print_receipt(terminal: &Terminal, receipt: &checkout::ReceiptResponse) {
    let money = |m| terminal.config.format_currency(m);
    println!("{}", receipt.store_name);
    println!("{}", receipt.timestamp);
    println!("{}", "-".repeat(44));
    for line in &receipt.lines {
        println!("{:<24} x{:<4} {:>13}", line.name, line.quantity, money(line.line_total));
    }
    println!("{}", "-".repeat(44));
    println!("{:<30} {:>13}", "Subtotal", money(receipt.subtotal));
    println!("{:<30} {:>13}", "Tax", money(receipt.tax));
    println!("{:<30} {:>13}", "TOTAL", money(receipt.total));
    println!("Paid by {}", receipt.payment_method);
    if let Some(cash) = receipt.cash_received {
        println!("{:<30} {:>13}", "Cash", money(cash));
        println!("{:<30} {:>13}", "Change", money(receipt.change));
    }
    println!("Ref {}", receipt.transaction_id);
}

fn print_commit(terminal: &Terminal, outcome: &import::CommitResponse) {
    match outcome {
        import::CommitResponse::Committed { report } => println!(
            "Committed {} records ({}), {} left for review",
            report.committed,
            terminal.config.format_currency(report.amount),
            report.remaining
        ),
        import::CommitResponse::NothingToCommit { message } => {
            println!("{}; nothing was posted", message)
        }
    }
}

fn print_record(terminal: &Terminal, record: &StagedRecord) {
    let status = if record.is_valid() { "VALID" } else { "ERROR" };
    println!(
        "{:<6} {} {:<20} {:>14}  {}",
        status,
        record.date.format("%Y-%m-%d"),
        record.counterparty,
        terminal.config.format_currency(record.total_amount),
        record.error.as_deref().unwrap_or(&record.item_summary)
    );
}
