use anyhow::Result;
use apwg_feed::config::{self, ClientConfig};
use apwg_feed::format::{json_lines, table_lines, TABLE_COLUMNS};
use apwg_feed::{ApwgClient, FileStateStore, Poller};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "apwg",
    about = "Poll the APWG eCrimeX phishing feed for new indicators",
    version,
    after_help = "\
EXAMPLES:
    apwg -d
    apwg --limit 20 --no-last-run
    APWG_TOKEN=... apwg --past-hours 48 --format json"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// API token
    #[arg(long, env = "APWG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Limit the number of records processed (0 = no limit)
    #[arg(long, default_value_t = 500)]
    limit: usize,

    /// Directory holding the last-run timestamp
    #[arg(long, env = "APWG_LAST_RUN_CACHE", default_value = config::DEFAULT_LAST_RUN_CACHE)]
    last_run_cache: PathBuf,

    /// Number of hours to go back when there is no last run
    #[arg(
        long,
        default_value_t = config::DEFAULT_HOURS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(config::MAX_HOURS))
    )]
    past_hours: u32,

    /// Do not modify the lastrun file
    #[arg(long)]
    no_last_run: bool,

    #[arg(long, env = "APWG_REMOTE", default_value = config::DEFAULT_REMOTE)]
    remote: String,

    #[arg(long, env = "APWG_PROXY")]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            remote: self.remote.clone(),
            token: self.token.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.timeout),
            proxy: self.proxy.clone(),
            hours: self.past_hours,
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env has to be loaded before clap reads env defaults
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = cli.client_config();
    config.validate()?;

    let client = ApwgClient::new(&config)?;
    let state = FileStateStore::new(&cli.last_run_cache).await?;
    let poller = Poller::new(&config, Arc::new(client), Arc::new(state));

    let limit = (cli.limit > 0).then_some(cli.limit);
    let indicators = poller.poll(limit, cli.no_last_run).await?;
    info!("received {} indicators", indicators.len());

    // newest first
    let lines = match cli.format {
        OutputFormat::Table => table_lines(indicators.iter().rev(), &TABLE_COLUMNS),
        OutputFormat::Json => json_lines(indicators.iter().rev())?,
    };
    for line in lines {
        println!("{}", line);
    }

    Ok(())
}
