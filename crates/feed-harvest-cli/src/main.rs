//! FeedHarvest entry point.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use feed_harvest::Harvester;
use feed_harvest_cli::config::{load_harvest_config, resolve_out_dir, resolve_targets};
use feed_harvest_cli::renderer::{find_chromium, BrowserOptions, ChromiumPage, CHROMIUM_PATH_ENV};
use feed_harvest_cli::sink::{write_card_dump, JsonFileSink};

#[derive(Parser)]
#[command(
    name = "feed-harvest",
    about = "Harvest structured post records from profile activity feeds",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest the activity feed of one or more profiles.
    Harvest {
        /// Profile handles to harvest.
        targets: Vec<String>,

        /// File with one handle per line (`#` comments allowed).
        #[arg(long)]
        targets_file: Option<PathBuf>,

        /// Directory for `{handle}.json` files.
        /// Also reads from FEED_HARVEST_OUT env var.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// JSON run configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many scroll rounds without new cards.
        #[arg(long)]
        max_idle_rounds: Option<u32>,

        /// Hard cap on scroll rounds.
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Also write `{handle}.cards.html` with the raw card markup.
        #[arg(long)]
        dump_cards: bool,

        /// Run the browser without a window.
        #[arg(long)]
        headless: bool,

        /// Browser profile directory to reuse an existing session.
        #[arg(long)]
        user_data_dir: Option<PathBuf>,

        /// Chromium binary to use instead of discovering one.
        #[arg(long)]
        chromium: Option<PathBuf>,
    },

    /// Check that a Chromium binary can be found.
    Doctor,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   feed-harvest completions bash > ~/.local/share/bash-completion/completions/feed-harvest
    ///   feed-harvest completions zsh > ~/.zfunc/_feed-harvest
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Harvest {
            targets,
            targets_file,
            out,
            config,
            max_idle_rounds,
            max_rounds,
            dump_cards,
            headless,
            user_data_dir,
            chromium,
        } => {
            let mut harvest_config = load_harvest_config(config.as_deref())?;
            if let Some(n) = max_idle_rounds {
                harvest_config.scroll.max_idle_rounds = n;
            }
            if let Some(n) = max_rounds {
                harvest_config.scroll.max_rounds = n;
            }
            harvest_config.capture_card_html |= dump_cards;
            let harvester = Harvester::new(harvest_config)?;

            let targets = resolve_targets(&targets, targets_file.as_deref())?;
            let out_dir = resolve_out_dir(out.as_deref());
            let mut sink = JsonFileSink::new(&out_dir);

            let options = BrowserOptions {
                headless,
                user_data_dir,
                chrome_path: chromium,
                ..BrowserOptions::default()
            };
            let mut page = ChromiumPage::launch(&options).await?;

            let mut failed = Vec::new();
            for target in &targets {
                tracing::info!("scraping {} ...", target.handle());
                match harvester.harvest_into(&mut page, target, &mut sink).await {
                    Ok(report) => {
                        if harvester.config().capture_card_html {
                            let path = write_card_dump(&out_dir, target, &report.card_html)
                                .context("failed to write card dump")?;
                            tracing::info!("saved card markup to {}", path.display());
                        }
                    }
                    Err(e) => {
                        tracing::error!("{}: {e}", target.handle());
                        failed.push(target.handle().to_string());
                    }
                }
            }

            page.close().await?;

            if !failed.is_empty() {
                bail!("harvest failed for: {}", failed.join(", "));
            }
        }

        Commands::Doctor => match find_chromium() {
            Some(path) => println!("Chromium: {}", path.display()),
            None => {
                eprintln!("Chromium not found. Set {CHROMIUM_PATH_ENV} or install Chromium.");
                std::process::exit(1);
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "feed-harvest", &mut std::io::stdout());
        }
    }

    Ok(())
}
