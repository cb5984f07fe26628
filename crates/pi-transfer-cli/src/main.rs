mod logging;
mod setup;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pi_transfer::interaction::prompt;
use pi_transfer::{ConsoleInteraction, PaymentClient, PiConfig, SeedPhrase, TransferOutcome};

#[derive(Parser)]
#[command(name = "pi-transfer", version, about = "Transfer your available Pi balance to another wallet")]
struct Cli {
    /// Destination wallet address (prompted for when omitted)
    #[arg(long, env = "PI_DESTINATION_WALLET")]
    destination: Option<String>,

    /// Env file holding OAuth credentials and refreshed access tokens
    #[arg(long, env = "PI_ENV_FILE", default_value = pi_transfer::constants::DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Directory for rotated log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Do not ask for a seed phrase
    #[arg(long)]
    no_seed: bool,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match logging::init_logging(&cli.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging in {}: {e}", cli.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting Pi Network transfer");

    if let Err(e) = setup::ensure_env_file(&cli.env_file) {
        tracing::error!(error = %e, path = %cli.env_file.display(), "Failed to create env file");
        return ExitCode::FAILURE;
    }
    if let Err(e) = dotenvy::from_path(&cli.env_file) {
        tracing::warn!(error = %e, "Could not load env file");
    }

    let env_file = cli.env_file.to_string_lossy().into_owned();
    let load = || {
        PiConfig::from_lookup(|key| match key {
            "PI_ENV_FILE" => Some(env_file.clone()),
            _ => std::env::var(key).ok(),
        })
    };

    let mut config = match load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if !config.has_client_credentials() {
        match setup::prompt_for_credentials(&cli.env_file) {
            Ok(true) => match load() {
                Ok(c) => config = c,
                Err(e) => {
                    tracing::error!(error = %e, "Invalid configuration");
                    return ExitCode::FAILURE;
                }
            },
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to save credentials");
                return ExitCode::FAILURE;
            }
        }
    }

    let destination = match cli.destination {
        Some(d) => Some(d),
        None => prompt("Enter destination wallet address: ").await,
    };
    let seed = if cli.no_seed {
        None
    } else {
        prompt("Enter your seed phrase (or press Enter to skip): ")
            .await
            .and_then(SeedPhrase::new)
    };

    let interaction = ConsoleInteraction::new(!cli.no_browser);
    let mut client = match PaymentClient::new(&config, destination, seed, interaction) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create payment client");
            return ExitCode::FAILURE;
        }
    };

    match client.transfer_full_balance().await {
        Ok(TransferOutcome::Completed(transfer)) => {
            println!(
                "Transfer complete: payment {} at {}",
                transfer.prepared.payment_id, transfer.result.timestamp
            );
            ExitCode::SUCCESS
        }
        Ok(TransferOutcome::NoFunds) => {
            println!("No coins available for transfer");
            ExitCode::FAILURE
        }
        Ok(TransferOutcome::Declined) => {
            println!("Transfer cancelled");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Transfer failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
