use anyhow::Result;
use assetscope::core::error::SchemaViolation;
use assetscope::core::log::init_logging;
use assetscope::core::model::Frequency;
use clap::{CommandFactory, Parser, Subcommand};
use console::style;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List assets with prices, 24h change and 7-day sparklines
    Assets {
        /// Keep refreshing until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },
    /// Show technical indicators and signals for an asset
    Analyze {
        /// Asset id, e.g. bitcoin
        asset: String,
        /// Lookback in days (30-3650)
        #[arg(short, long)]
        days: Option<u32>,
        /// Number of most recent rows to show
        #[arg(short, long, default_value_t = assetscope::DEFAULT_ROWS)]
        rows: usize,
    },
    /// Show closing prices for an asset
    History {
        /// Asset id, e.g. ethereum
        asset: String,
        /// Lookback in days (1-3650)
        #[arg(short, long)]
        days: Option<u32>,
        /// Number of most recent rows to show
        #[arg(short, long, default_value_t = assetscope::DEFAULT_ROWS)]
        rows: usize,
    },
    /// Project a dollar-cost-averaging plan
    Project {
        /// Asset id, e.g. solana
        asset: String,
        /// Amount invested each period
        #[arg(short, long)]
        amount: f64,
        /// daily, weekly, biweekly or monthly
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,
        /// Duration in years (1, 2, 3, 5, 10, 15 or 20)
        #[arg(short, long, default_value_t = 5)]
        years: u32,
    },
    /// Show the all-time-high prediction for an asset
    Ath {
        /// Asset id, e.g. sp500
        asset: String,
    },
}

impl From<Commands> for assetscope::AppCommand {
    fn from(cmd: Commands) -> assetscope::AppCommand {
        match cmd {
            Commands::Assets { watch } => assetscope::AppCommand::Assets { watch },
            Commands::Analyze { asset, days, rows } => {
                assetscope::AppCommand::Analyze { asset, days, rows }
            }
            Commands::History { asset, days, rows } => {
                assetscope::AppCommand::History { asset, days, rows }
            }
            Commands::Project {
                asset,
                amount,
                frequency,
                years,
            } => assetscope::AppCommand::Project {
                asset,
                amount,
                frequency,
                years,
            },
            Commands::Ath { asset } => assetscope::AppCommand::Ath { asset },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => assetscope::cli::setup::setup(cli.config_path.as_deref()),
        Some(cmd) => assetscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        if let Some(violation) = e.chain().find_map(|c| c.downcast_ref::<SchemaViolation>()) {
            tracing::error!(error = %violation, "Analytics service contract violated");
            eprintln!(
                "{} the analytics service returned data that breaks its own contract ({violation}). \
                 This is not a temporary failure; retrying will not help.",
                style("Upstream contract violation:").magenta().bold()
            );
        } else {
            tracing::error!(error = %e, "Application failed");
        }
    }
    result
}
