//! Prize vault event sync CLI.
//!
//! Keeps per-user event caches (share transfers, flash swaps, claimed
//! prizes) up to date as JSON snapshots and prints promotions, reward
//! claims and token balances.
//!
//! # Usage
//!
//! ```bash
//! # Refresh every cache of a user
//! prize-vault-events --config config.toml sync --user 0xabc... --data-dir ./data
//!
//! # Use a custom RPC endpoint instead of the configured list
//! prize-vault-events --rpc https://my-rpc.example.com sync --user 0xabc...
//!
//! # Balances of two tokens plus the native asset
//! prize-vault-events balances --user 0xabc... --token 0x... --token 0x... --native
//! ```

use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::Result;
use clap::{Parser, Subcommand};
use prize_vault::{NATIVE_TOKEN, Promotion, RewardsClaim, format::format_all};
use prize_vault_events::config::Config;
use prize_vault_events::sync::{connect, sync_user, with_fallback};

/// Prize vault event sync CLI.
#[derive(Debug, Parser)]
#[command(name = "prize-vault-events", version, about)]
struct Cli {
    /// Configuration file with the deployment and RPC endpoints.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Use this RPC endpoint instead of the configured list.
    #[arg(long, global = true)]
    rpc: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch new events for a user and update the JSON snapshots.
    Sync {
        /// Account whose caches are refreshed.
        #[arg(long)]
        user: Address,

        /// Output directory for snapshots (e.g. `./data`).
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// List reward promotions created for the vault.
    Promotions,

    /// List rewards claimed by a user.
    Rewards {
        /// Claiming account.
        #[arg(long)]
        user: Address,
    },

    /// Print token balances of a user.
    Balances {
        /// Account whose balances are read.
        #[arg(long)]
        user: Address,

        /// Token contract to read; repeat for several.
        #[arg(long = "token")]
        tokens: Vec<Address>,

        /// Also read the native asset balance.
        #[arg(long)]
        native: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let rpcs = config.rpcs(cli.rpc.as_deref())?;

    match cli.command {
        Command::Sync { user, data_dir } => cmd_sync(&config, &rpcs, user, data_dir).await,
        Command::Promotions => cmd_promotions(&config, &rpcs).await,
        Command::Rewards { user } => cmd_rewards(&config, &rpcs, user).await,
        Command::Balances {
            user,
            mut tokens,
            native,
        } => {
            if native {
                tokens.push(NATIVE_TOKEN);
            }
            cmd_balances(&config, &rpcs, user, &tokens).await
        }
    }
}

/// Execute the `sync` subcommand.
async fn cmd_sync(config: &Config, rpcs: &[String], user: Address, data_dir: PathBuf) -> Result<()> {
    tracing::info!(
        chain_id = config.deployment.chain_id,
        %user,
        data_dir = %data_dir.display(),
        "starting sync"
    );

    let summary = sync_user(&config.deployment, &data_dir, rpcs, user).await?;
    tracing::info!(
        transfers = summary.transfers,
        flashes = summary.flashes,
        claimed_prizes = summary.claimed_prizes,
        "sync finished"
    );
    Ok(())
}

/// Execute the `promotions` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
async fn cmd_promotions(config: &Config, rpcs: &[String]) -> Result<()> {
    let promotions: Vec<Promotion> = with_fallback(rpcs, |rpc_url| async move {
        let client = connect(&config.deployment, &rpc_url)?;
        let logs = client.get_promotion_created_events().await?;
        Ok(format_all(&logs)?)
    })
    .await?;

    println!(
        "{:<8} {:<44} {:<12} {:<10} {:<8} Tokens/epoch",
        "ID", "Token", "Start", "Epoch (s)", "Epochs"
    );
    println!("{}", "-".repeat(100));

    for p in &promotions {
        println!(
            "{:<8} {:<44} {:<12} {:<10} {:<8} {}",
            p.promotion_id,
            format!("{:#x}", p.token),
            p.start_timestamp,
            p.epoch_duration,
            p.initial_number_of_epochs,
            p.tokens_per_epoch,
        );
    }
    Ok(())
}

/// Execute the `rewards` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
async fn cmd_rewards(config: &Config, rpcs: &[String], user: Address) -> Result<()> {
    let claims: Vec<RewardsClaim> = with_fallback(rpcs, |rpc_url| async move {
        let client = connect(&config.deployment, &rpc_url)?;
        let logs = client.get_rewards_claimed_events(user).await?;
        Ok(format_all(&logs)?)
    })
    .await?;

    println!("{:<12} {:<8} {:<24} Amount", "Block", "ID", "Epochs");
    println!("{}", "-".repeat(70));

    for c in &claims {
        println!(
            "{:<12} {:<8} {:<24} {}",
            c.position.block_number,
            c.promotion_id,
            format!("{:?}", c.epoch_ids),
            c.amount,
        );
    }
    Ok(())
}

/// Execute the `balances` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
async fn cmd_balances(
    config: &Config,
    rpcs: &[String],
    user: Address,
    tokens: &[Address],
) -> Result<()> {
    let balances = with_fallback(rpcs, |rpc_url| async move {
        let client = connect(&config.deployment, &rpc_url)?;
        Ok(client.get_token_balances(user, tokens).await?)
    })
    .await?;

    println!("{:<44} Balance", "Token");
    println!("{}", "-".repeat(70));

    for (token, balance) in &balances {
        let name = if *token == NATIVE_TOKEN {
            "native".to_owned()
        } else {
            format!("{token:#x}")
        };
        println!("{name:<44} {balance}");
    }
    Ok(())
}
