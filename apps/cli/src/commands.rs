//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tomoscrape_core::{ProgressReporter, RunSummary};
use tomoscrape_shared::{AppConfig, ScrapeConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tomoscrape: manga catalog scraper.
#[derive(Parser)]
#[command(
    name = "tomoscrape",
    version,
    about = "Scrape manga and volume records from listadomanga.es.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape every manga in a catalog file.
    Scrape {
        /// Catalog JSON: an array of `{"url", "tipo"}` objects.
        #[arg(default_value = "mangas_combined.json")]
        catalog: PathBuf,

        /// Process only the first N catalog entries.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output directory (overrides `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip cover and volume image downloads.
        #[arg(long)]
        no_images: bool,

        /// Pause between manga fetches in milliseconds (overrides `scrape.delay_ms`).
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Re-normalize the titles of an existing volumes.json.
    Clean {
        /// Raw volume list written by `scrape`.
        #[arg(default_value = "volumes.json")]
        volumes: PathBuf,

        /// Destination file.
        #[arg(short, long, default_value = "volumes_fixed.json")]
        out: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. `RUST_LOG` takes precedence.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tomoscrape=info",
        1 => "tomoscrape=debug",
        _ => "tomoscrape=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            catalog,
            limit,
            out,
            no_images,
            delay_ms,
        } => {
            let overrides = ScrapeOverrides {
                limit,
                out,
                no_images,
                delay_ms,
            };
            cmd_scrape(&catalog, overrides).await
        }
        Command::Clean { volumes, out } => cmd_clean(&volumes, &out),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Flags of `scrape` that override the config file.
struct ScrapeOverrides {
    limit: Option<usize>,
    out: Option<PathBuf>,
    no_images: bool,
    delay_ms: Option<u64>,
}

fn scrape_config(config: &AppConfig, overrides: ScrapeOverrides) -> Result<ScrapeConfig> {
    let mut scrape = ScrapeConfig::try_from(config)?;
    scrape.limit = overrides.limit;
    if let Some(out) = overrides.out {
        scrape.output_dir = out;
    }
    if overrides.no_images {
        scrape.download_images = false;
    }
    if let Some(delay_ms) = overrides.delay_ms {
        scrape.delay_ms = delay_ms;
    }
    Ok(scrape)
}

async fn cmd_scrape(catalog: &Path, overrides: ScrapeOverrides) -> Result<()> {
    let config = load_config()?;
    let scrape = scrape_config(&config, overrides)?;

    let entries = tomoscrape_core::load_catalog(catalog, scrape.limit)?;

    info!(
        catalog = %catalog.display(),
        entries = entries.len(),
        out = %scrape.output_dir.display(),
        images = scrape.download_images,
        "starting scrape"
    );

    let reporter = CliProgress::new();
    let result = tomoscrape_core::scrape_catalog(&scrape, &entries, &reporter).await?;
    let summary = &result.summary;

    println!();
    println!("  Scrape finished.");
    println!("  Mangas:   {}", summary.mangas);
    println!("  Volumes:  {}", summary.volumes);
    println!("  Skipped:  {}", summary.skipped.len());
    println!("  Images:   {}", summary.images_downloaded);
    println!("  Failed:   {}", summary.failed_downloads.len());
    println!("  Output:   {}", scrape.output_dir.display());
    println!(
        "  Time:     {:.1}s",
        (summary.finished_at - summary.started_at).num_milliseconds() as f64 / 1000.0
    );
    println!();

    Ok(())
}

fn cmd_clean(volumes: &Path, out: &Path) -> Result<()> {
    let count = tomoscrape_core::clean_volume_titles(volumes, out)?;
    println!("Cleaned {count} volume titles into {}", out.display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn manga_started(&self, id: u32, total: usize, url: &str) {
        self.spinner
            .set_message(format!("Scraping [{id}/{total}] {url}"));
    }

    fn manga_done(&self, id: u32, volumes: Option<usize>) {
        match volumes {
            Some(n) => self.spinner.set_message(format!("Manga {id}: {n} volumes")),
            None => self.spinner.set_message(format!("Manga {id}: skipped")),
        }
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_scrape_defaults() {
        let cli = Cli::parse_from(["tomoscrape", "scrape"]);
        match cli.command {
            Command::Scrape {
                catalog,
                limit,
                no_images,
                ..
            } => {
                assert_eq!(catalog, PathBuf::from("mangas_combined.json"));
                assert!(limit.is_none());
                assert!(!no_images);
            }
            _ => panic!("expected scrape"),
        }
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tomoscrape", "clean", "-vv", "--log-format", "json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Clean { .. }));
    }

    #[test]
    fn flags_override_config_file() {
        let overrides = ScrapeOverrides {
            limit: Some(5),
            out: Some(PathBuf::from("/tmp/out")),
            no_images: true,
            delay_ms: Some(0),
        };
        let scrape = scrape_config(&AppConfig::default(), overrides).unwrap();
        assert_eq!(scrape.limit, Some(5));
        assert_eq!(scrape.output_dir, PathBuf::from("/tmp/out"));
        assert!(!scrape.download_images);
        assert_eq!(scrape.delay_ms, 0);
        assert!(scrape.local_image_refs);
    }
}
