//! Election client CLI.
//!
//! Without a subcommand, lists the manager's elections and prints the
//! ranked result of the first one.

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use election_client::blockchain::{load_account, load_accounts, ChainId, RpcLedgerClient};
use election_client::config;
use election_client::election::{ElectionClient, ElectionRef};
use election_client::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "election-cli")]
#[command(about = "Query and manage on-chain elections", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address.
    #[arg(long, global = true)]
    metrics_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List elections created through the manager
    List,
    /// Show the ranked result of an election
    Show { election: Address },
    /// Show a balance (defaults to the first account)
    Balance { address: Option<Address> },
    /// List configured account addresses
    Accounts,
    /// Create a new election
    Create {
        #[arg(long)]
        name: String,
        /// Seconds from now until the election ends
        #[arg(long, default_value_t = 3600)]
        ends_in_secs: u64,
        /// Index of the signing account
        #[arg(long, default_value_t = 0)]
        account: usize,
    },
    /// Register as a candidate, paying the fixed stake
    Run {
        #[arg(long)]
        election: Address,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        account: usize,
    },
    /// Withdraw accrued election revenue
    Withdraw {
        #[arg(long)]
        election: Address,
        #[arg(long, default_value_t = 0)]
        account: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(logging::DEFAULT_FILTER);

    let config = config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "Configuration resolved");

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    let ledger = Arc::new(RpcLedgerClient::new(&config)?);
    let client = ElectionClient::new(ledger.clone(), &config);

    match cli.command {
        None => {
            if config.private_keys.is_empty() {
                tracing::warn!("No accounts configured; only read operations are available");
            }
            let elections = client.list_elections().await?;
            for election in &elections {
                println!("Election: {}", election);
            }
            if let Some(first) = elections.first() {
                let result = client.election_result(first).await?;
                print_json(&result)?;
            }
        }
        Some(Commands::List) => {
            print_json(&client.list_elections().await?)?;
        }
        Some(Commands::Show { election }) => {
            print_json(&client.election_result_at(election).await?)?;
        }
        Some(Commands::Balance { address }) => {
            let address = match address {
                Some(address) => address,
                None => load_account(&config, 0)?.address(),
            };
            let balance = client.balance(address).await?;
            println!("{} {} ETH", address, format_ether(balance));
        }
        Some(Commands::Accounts) => {
            for (index, account) in load_accounts(&config)?.iter().enumerate() {
                println!("{index}: {account}");
            }
        }
        Some(Commands::Create {
            name,
            ends_in_secs,
            account,
        }) => {
            let from = load_account(&config, account)?;
            let end_time = end_time_after(ends_in_secs)?;
            ledger.verify_chain_id(ChainId(config.chain_id)).await?;
            print_json(&client.create_election(&from, &name, end_time).await?)?;
        }
        Some(Commands::Run {
            election,
            name,
            account,
        }) => {
            let from = load_account(&config, account)?;
            let election = find_election(&client, election).await?;
            ledger.verify_chain_id(ChainId(config.chain_id)).await?;
            print_json(&client.run_for_election(&from, &election, &name).await?)?;
        }
        Some(Commands::Withdraw { election, account }) => {
            let from = load_account(&config, account)?;
            let election = find_election(&client, election).await?;
            ledger.verify_chain_id(ChainId(config.chain_id)).await?;
            print_json(&client.withdraw_revenue(&from, &election).await?)?;
        }
    }

    Ok(())
}

/// Unix timestamp `secs` seconds from now.
fn end_time_after(secs: u64) -> Result<u64, Box<dyn std::error::Error>> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    now.checked_add(secs)
        .ok_or_else(|| format!("--ends-in-secs {secs} overflows the end timestamp").into())
}

async fn find_election(
    client: &ElectionClient<RpcLedgerClient>,
    address: Address,
) -> Result<ElectionRef, Box<dyn std::error::Error>> {
    client
        .list_elections()
        .await?
        .into_iter()
        .find(|election| election.address == address)
        .ok_or_else(|| format!("{address} is not an election of manager {}", client.manager_address()).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
