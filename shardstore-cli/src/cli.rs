use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shardstore",
    about = "Inspect and repair shard ownership records",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, env = "SHARDSTORE_DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Apply schema migrations and exit")]
    Migrate,

    #[command(about = "Print a shard record as JSON")]
    Get {
        #[arg(help = "Shard ID")]
        shard_id: i32,
    },

    #[command(about = "Create a shard record unless one exists, then print it")]
    Create {
        #[arg(help = "Shard ID")]
        shard_id: i32,

        #[arg(long, default_value_t = 1, help = "Initial range ID")]
        range_id: i64,

        #[arg(long, default_value = "", help = "Ownership data, base64")]
        data: String,

        #[arg(long, default_value = "json", help = "Encoding tag for the data")]
        encoding: String,
    },

    #[command(about = "Overwrite a shard record without a fencing check")]
    Update {
        #[arg(help = "Shard ID")]
        shard_id: i32,

        #[arg(long, help = "New range ID")]
        range_id: i64,

        #[arg(long, default_value = "", help = "Ownership data, base64")]
        data: String,

        #[arg(long, default_value = "json", help = "Encoding tag for the data")]
        encoding: String,
    },

    #[command(about = "Read the range ID under a row lock")]
    Lock {
        #[arg(help = "Shard ID")]
        shard_id: i32,

        #[arg(long, help = "Take an exclusive lock instead of a shared one")]
        write: bool,
    },

    #[command(about = "Advance the range ID if it still equals the expected value")]
    Renew {
        #[arg(help = "Shard ID")]
        shard_id: i32,

        #[arg(long, help = "Range ID the caller believes is current")]
        expected_range_id: i64,

        #[arg(long, default_value = "", help = "Ownership data, base64")]
        data: String,

        #[arg(long, default_value = "json", help = "Encoding tag for the data")]
        encoding: String,
    },

    #[command(about = "Fail unless the shard is still at the given range ID")]
    Check {
        #[arg(help = "Shard ID")]
        shard_id: i32,

        #[arg(long, help = "Range ID to verify")]
        range_id: i64,
    },
}
