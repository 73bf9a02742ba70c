use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

mod commands;
mod config;
mod gestures;
mod logging;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "veil-redact",
    about = "Page-scoped PDF region redaction",
    version
)]
struct Cli {
    /// Configuration file (JSON); defaults to $VEIL_CONFIG or ./veil.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the effective configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the detector and print its suggestions as JSON
    Detect {
        /// Input PDF file
        input: PathBuf,
    },

    /// Apply redactions and write the redacted copy
    Redact {
        /// Input PDF file
        input: PathBuf,

        /// Recorded drag gestures to replay (JSON)
        #[arg(short, long)]
        gestures: Option<PathBuf>,

        /// Accept detector suggestions of these categories (e.g. "email,ssn")
        #[arg(short, long, value_delimiter = ',')]
        accept: Vec<String>,

        /// Output directory; defaults to the input's directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Write PNG previews of redacted pages into this directory
        #[arg(short, long)]
        preview: Option<PathBuf>,

        /// Do not run the detector
        #[arg(long)]
        no_detect: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = config::resolve_path(cli.config.as_deref());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    logging::init(level, config.log_file.as_deref())?;
    log::info!("[Main] veil-redact v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::InitConfig { force } => commands::init_config(&config, &config_path, force),
        Commands::Detect { input } => commands::detect(&config, &input).await,
        Commands::Redact {
            input,
            gestures,
            accept,
            out_dir,
            preview,
            no_detect,
        } => {
            commands::redact(
                &config,
                commands::RedactArgs {
                    input,
                    gestures,
                    accept,
                    out_dir,
                    preview,
                    skip_detection: no_detect,
                },
            )
            .await
        }
    }
}
