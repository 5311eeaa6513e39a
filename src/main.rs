use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fraud_review::analysis::RandomScorer;
use fraud_review::csv::{read_commands, write_accounts};
use fraud_review::payment::{Payment, PaymentService, ProcessorRegistry, RetryingProcessor};
use fraud_review::service::MemoryStore;
use fraud_review::{Amount, ReviewService};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fraud-review", about = "Review account applications for fraud risk")]
struct Cli {
    /// Seed for placeholder risk scores and simulated gateways
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply operator commands from a csv file and print the resulting accounts
    Review { commands: PathBuf },
    /// Process a payment through a regional processor
    Pay {
        /// Region code of the processor, e.g. IL or VA
        #[arg(long)]
        state: String,
        #[arg(long)]
        amount: Amount,
        #[arg(long, default_value_t = fraud_review::payment::MAX_ATTEMPTS)]
        max_attempts: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Review { commands } => review(commands, cli.seed).await,
        Commands::Pay {
            state,
            amount,
            max_attempts,
        } => pay(&state, amount, max_attempts, cli.seed),
    }
}

async fn review(path: PathBuf, seed: Option<u64>) -> ExitCode {
    if path.extension().is_none_or(|ext| ext != "csv") {
        warn!(path = %path.display(), "input file seems to not be a csv file");
    }

    let commands = match read_commands(&path) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let scorer = seed.map_or_else(RandomScorer::new, RandomScorer::seeded);
    let mut service = ReviewService::with_parts(MemoryStore::new(), scorer);
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    let reader = tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!("{e}");
                    return false;
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
        true
    });

    service.run(ReceiverStream::new(cmd_receiver)).await;

    let completed = reader.await.unwrap_or(false);
    if let Err(e) = write_accounts(service.accounts()) {
        error!("failed to write accounts: {e}");
        return ExitCode::FAILURE;
    }

    if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn pay(state: &str, amount: Amount, max_attempts: u32, seed: Option<u64>) -> ExitCode {
    let registry = ProcessorRegistry::with_state_processors();
    let processor = match registry
        .processor(state, seed)
        .and_then(|processor| RetryingProcessor::with_max_attempts(processor, max_attempts))
    {
        Ok(processor) => processor,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let payment = PaymentService::new(processor).process(Payment::new(amount));
    match &payment.transaction {
        Some(transaction) => {
            println!("Payment Transaction ID: {}", transaction.transaction_id);
            println!("Payment Transaction Amount: {}", transaction.amount);
            ExitCode::SUCCESS
        }
        None => {
            println!("Payment Transaction Failed.");
            println!("Payment Attempt Count: {}", payment.attempt_count);
            println!("Payment Attempt Errors: {}", payment.errors.join("; "));
            ExitCode::FAILURE
        }
    }
}
