use clap::{Args, Parser, Subcommand};
use edcpay::application::session::PaymentSession;
use edcpay::config::FlowConfig;
use edcpay::domain::currency::parse_amount_input;
use edcpay::domain::flow::FlowState;
use edcpay::domain::payment::PaymentDraft;
use edcpay::domain::wallet::{Balance, CardId, WalletLedger};
use edcpay::error::PaymentError;
use edcpay::infrastructure::mock::{FixedPinVerifier, MockCardScanner};
use edcpay::infrastructure::share::WriterSharer;
use edcpay::interfaces::csv::wallet_reader::WalletReader;
use edcpay::interfaces::csv::wallet_writer::WalletWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file overriding flow settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one payment through card scan, PIN entry and receipt
    Pay(PayArgs),
    /// Ask someone else to pay, printing a shareable message with a link
    Request(RequestArgs),
    /// List wallet cards and the total balance of the active ones
    Wallet(WalletArgs),
}

#[derive(Args)]
struct PayArgs {
    /// Amount as typed, e.g. "150000" or "Rp 150.000"
    #[arg(long)]
    amount: String,

    #[arg(long, default_value = "Walle Stores")]
    merchant: String,

    #[arg(long)]
    description: Option<String>,

    /// PIN to try; repeat for further attempts
    #[arg(long = "pin")]
    pins: Vec<String>,

    /// PIN the mock issuer accepts
    #[arg(long, default_value = "123456")]
    secret: String,

    /// Number of card reads that fail before one succeeds
    #[arg(long, default_value_t = 0)]
    scan_failures: u32,

    /// Simulated PIN verification time in milliseconds
    #[arg(long, default_value_t = 0)]
    verify_delay_ms: u64,
}

#[derive(Args)]
struct RequestArgs {
    /// Amount as typed, e.g. "50000" or "Rp 50.000"
    #[arg(long)]
    amount: String,

    /// Name of the person asked to pay
    #[arg(long)]
    to: String,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct WalletArgs {
    /// CSV file of cards to load instead of the demo wallet
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Flip the active flag of a card
    #[arg(long)]
    toggle: Vec<u64>,

    /// Remove a card
    #[arg(long)]
    remove: Vec<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FlowConfig::load(path).into_diagnostic()?,
        None => FlowConfig::default(),
    };

    match cli.command {
        Command::Pay(args) => pay(config, args).await,
        Command::Request(args) => request(config, args).await,
        Command::Wallet(args) => wallet(args),
    }
}

async fn pay(config: FlowConfig, args: PayArgs) -> Result<()> {
    let scanner = MockCardScanner::demo().with_failures(args.scan_failures);
    let verifier = FixedPinVerifier::new(args.secret)
        .with_delay(Duration::from_millis(args.verify_delay_ms));
    let session = PaymentSession::new(
        config,
        Arc::new(scanner),
        Arc::new(verifier),
        Arc::new(WriterSharer::new(io::stdout())),
    );

    let mut draft = PaymentDraft::from_input(&args.amount, args.merchant);
    if let Some(description) = args.description {
        draft = draft.with_description(description);
    }

    let mut outcome = session.confirm(draft).await;
    while let Err(PaymentError::ScanFailure(failure)) = &outcome {
        eprintln!("Failed to read card ({failure}). Please try again.");
        outcome = session.scan_card().await;
    }
    let mut state = outcome.into_diagnostic()?;

    for pin in &args.pins {
        if !matches!(state, FlowState::PinEntry { .. }) {
            break;
        }
        match session.submit_pin(pin).await {
            Ok(next) => state = next,
            Err(PaymentError::ValidationError(msg)) => {
                eprintln!("{msg}");
                continue;
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
        if let (FlowState::PinEntry { .. }, Some(notice)) = (&state, session.notice().await) {
            eprintln!("{notice}");
        }
    }

    match state {
        FlowState::Success(_) => session.share_receipt().await.into_diagnostic()?,
        FlowState::PinEntry { .. } => {
            session.cancel().await.into_diagnostic()?;
            if let Some(notice) = session.notice().await {
                println!("{notice}");
            }
        }
        _ => {
            if let Some(notice) = session.notice().await {
                println!("{notice}");
            }
        }
    }

    Ok(())
}

async fn request(config: FlowConfig, args: RequestArgs) -> Result<()> {
    let session = PaymentSession::new(
        config,
        Arc::new(MockCardScanner::demo()),
        Arc::new(FixedPinVerifier::new("")),
        Arc::new(WriterSharer::new(io::stdout())),
    );
    session
        .share_request(parse_amount_input(&args.amount), &args.to, args.description)
        .await
        .into_diagnostic()?;
    Ok(())
}

fn wallet(args: WalletArgs) -> Result<()> {
    let mut ledger = match args.cards {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            let cards = WalletReader::new(file)
                .cards()
                .collect::<Result<Vec<_>, _>>()
                .into_diagnostic()?;
            WalletLedger::seeded(cards)
        }
        None => WalletLedger::demo(),
    };

    for id in args.toggle {
        if ledger.toggle_active(CardId(id)).is_none() {
            eprintln!("No card with id {id}");
        }
    }
    for id in args.remove {
        if ledger.remove_card(CardId(id)).is_none() {
            eprintln!("No card with id {id}");
        }
    }

    let stdout = io::stdout();
    let mut writer = WalletWriter::new(stdout.lock());
    writer.write_cards(ledger.cards()).into_diagnostic()?;
    drop(writer);

    println!(
        "Total active balance: {}",
        Balance::new(ledger.total_active_balance())
    );
    Ok(())
}
