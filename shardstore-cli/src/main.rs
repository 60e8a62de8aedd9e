//! Shard Store CLI
//!
//! Operator tool for the shard ownership table:
//! - applies schema migrations
//! - prints shard records
//! - runs the fenced renew / ownership-check sequences by hand
//!
//! Connection settings come from `SHARDSTORE_*` environment variables; see
//! `StoreConfig::from_env`.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Parser;
use serde::Serialize;
use shardstore_core::{ShardRecord, ShardStore, StoreConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

/// JSON view of a shard record; `data` is base64.
#[derive(Debug, Serialize)]
struct ShardView {
    shard_id: i32,
    range_id: i64,
    data: String,
    data_encoding: String,
}

impl From<&ShardRecord> for ShardView {
    fn from(record: &ShardRecord) -> Self {
        Self {
            shard_id: record.shard_id,
            range_id: record.range_id,
            data: BASE64.encode(&record.data),
            data_encoding: record.data_encoding.clone(),
        }
    }
}

fn decode_data(data: &str) -> Result<Vec<u8>> {
    BASE64.decode(data.trim()).context("--data must be base64")
}

fn print_record(record: &ShardRecord) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&ShardView::from(record))?);
    Ok(())
}

/// Environment config with `--database-url` taking precedence.
fn load_config(database_url: Option<String>, run_migrations: bool) -> Result<StoreConfig> {
    let mut config = StoreConfig::from_lookup(|key| match key {
        "SHARDSTORE_DATABASE_URL" => database_url.clone().or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })
    .context("invalid store configuration")?;
    if run_migrations {
        config.run_migrations = true;
    }
    Ok(config)
}

async fn run(command: Commands, store: Arc<dyn ShardStore>) -> Result<()> {
    match command {
        Commands::Migrate => {
            info!("Schema is up to date ({})", store.backend_name());
        },
        Commands::Get { shard_id } => {
            let record = store.select_shard(shard_id).await?;
            print_record(&record)?;
        },
        Commands::Create { shard_id, range_id, data, encoding } => {
            let initial = ShardRecord::new(shard_id, range_id, decode_data(&data)?, encoding);
            let record = shardstore_core::get_or_create_shard(store.as_ref(), &initial).await?;
            print_record(&record)?;
        },
        Commands::Update { shard_id, range_id, data, encoding } => {
            let record = ShardRecord::new(shard_id, range_id, decode_data(&data)?, encoding);
            let affected = store.update_shard(&record).await?;
            if affected == 0 {
                anyhow::bail!("shard {shard_id} has no record; nothing updated");
            }
            info!("Shard {shard_id} overwritten at range {range_id}");
        },
        Commands::Lock { shard_id, write } => {
            let mut tx = store.begin().await?;
            let range_id = if write {
                tx.write_lock_shard(shard_id).await?
            } else {
                tx.read_lock_shard(shard_id).await?
            };
            tx.commit().await?;
            println!("{range_id}");
        },
        Commands::Renew { shard_id, expected_range_id, data, encoding } => {
            let record = shardstore_core::renew_range(
                store.as_ref(),
                shard_id,
                expected_range_id,
                decode_data(&data)?,
                encoding,
            )
            .await?;
            print_record(&record)?;
        },
        Commands::Check { shard_id, range_id } => {
            shardstore_core::assert_shard_ownership(store.as_ref(), shard_id, range_id).await?;
            info!("Shard {shard_id} is held at range {range_id}");
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))?;

    let config = load_config(cli.database_url, matches!(cli.command, Commands::Migrate))?;
    let store = shardstore_core::connect(&config).await.context("connecting to shard store")?;
    info!("Connected to {} shard store", store.backend_name());

    run(cli.command, store).await
}
