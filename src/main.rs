mod cli;
mod core;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::core::config::ReportConfig;

#[derive(Parser)]
#[command(
    name = "costbot",
    about = "Post yesterday's AWS cost breakdown to a chat webhook",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cost report and deliver it (default)
    Report {
        /// Report on this UTC day instead of yesterday (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Log the message instead of posting it, even if a webhook is set
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate configuration from the environment
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            match cli.format.as_deref() {
                Some("json") => cli::output::OutputFormat::Json,
                _ => cli::output::OutputFormat::Text,
            }
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    match cli.command {
        None | Some(Commands::Report { .. }) => {
            let (date, dry_run) = match cli.command {
                Some(Commands::Report { date, dry_run }) => (date, dry_run),
                _ => (None, false),
            };
            let config = ReportConfig::from_env().context("Invalid configuration")?;
            crate::core::logging::init(config.log_format, output_opts.verbose);
            cli::report_cmd::run(config, date, dry_run, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
        },
    }

    Ok(())
}
