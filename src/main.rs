//! Read-only command line front end for the web3 client.
//!
//! Queries the selected network's node; signing and submission need a
//! wallet session and are left to embedding applications.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use algo_web3::config::{load_config, Web3Config};
use algo_web3::format::{ellipse_address, format_amount};
use algo_web3::observability::logging::init_logging;
use algo_web3::Web3Client;

/// Base-unit decimals of the native asset.
const NATIVE_DECIMALS: usize = 6;

#[derive(Parser)]
#[command(name = "algo-web3")]
#[command(about = "Inspect Algorand networks, accounts and transactions", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in MainNet/TestNet when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index of the network to use.
    #[arg(short, long, default_value_t = 0)]
    network: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured networks
    Networks,
    /// Show node status
    Status,
    /// Show suggested transaction parameters
    Params,
    /// Show account information
    Account { address: String },
    /// Wait for a submitted transaction to be confirmed
    Wait {
        tx_id: String,
        #[arg(short, long)]
        rounds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Web3Config::default(),
    };
    init_logging(&config.observability)?;

    let client = Web3Client::new(&config, None)?;
    if cli.network != 0 {
        client.switch_network(cli.network)?;
    }

    match cli.command {
        Commands::Networks => {
            let networks: Vec<_> = client
                .networks()
                .iter()
                .enumerate()
                .map(|(index, network)| {
                    json!({
                        "index": index,
                        "name": network.name,
                        "url": network.url,
                        "port": network.port,
                        "active": index == client.current_index(),
                    })
                })
                .collect();
            print_json(&networks)?;
        }
        Commands::Status => {
            let status = client.node().status().await?;
            print_json(&status)?;
        }
        Commands::Params => {
            let params = client.suggested_params().await?;
            print_json(&params)?;
        }
        Commands::Account { address } => {
            let info = client.fetch_account_info(Some(&address)).await?;
            print_json(&info)?;
            println!(
                "{}: {}",
                ellipse_address(&info.address, 6),
                format_amount(info.amount, NATIVE_DECIMALS)
            );
        }
        Commands::Wait { tx_id, rounds } => {
            let info = client.wait_for_confirmation(&tx_id, rounds).await?;
            print_json(&info)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
