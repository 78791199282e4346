use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::sync::Arc;

use komal_cli::config::{self, AppConfig, ConfigManager, get_config};
use komal_cli::error::{CliError, ErrorContext};
use komal_cli::orchestrators::{EntryOutcome, ReconcileOptions, ReconcileOrchestrator};
use komal_cli::output::{self, OutputFormat};
use komal_cli::prompter::TerminalPrompter;
use komal_core::{
    FileCache, FileProcessedLog, HttpCoverSource, IdentifierCache, JikanClient, JikanConfig,
    KomgaClient, KomgaConfig, MemoryCache, MetadataResolver, NoOpProcessedLog, ProcessedLog,
    ResolverOptions,
};

#[derive(Parser)]
#[command(name = "komal")]
#[command(author, version, about = "Fill Komga series metadata from MyAnimeList", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every Komga series with MyAnimeList metadata
    Run {
        /// Only process the series with this exact name (repeatable)
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,

        /// Skip series recorded as processed by earlier runs
        #[arg(long, conflicts_with = "no_resume")]
        resume: bool,

        /// Ignore the processed log even if run.keep_progress is set
        #[arg(long)]
        no_resume: bool,

        /// Pause between series in milliseconds
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Keep chosen links for this run only
        #[arg(long)]
        no_cache: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Inspect or edit the name to MAL link cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// List cached links
    List,

    /// Forget the cached link for a series
    Forget {
        /// Series name as shown in Komga
        name: String,
    },

    /// Pin a series to a MAL link
    Set {
        /// Series name as shown in Komga
        name: String,

        /// MAL manga URL, e.g. https://myanimelist.net/manga/2/Berserk
        locator: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Interactive setup for the Komga connection
    Init {
        /// Reconfigure even if already set up
        #[arg(short, long)]
        force: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (e.g., komga.url)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., run.entry_delay_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    // Initialize logging based on debug flag
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("komal_core", log::LevelFilter::Debug)
            .filter_module("komal_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(e) = execute(cli).await {
        let error = CliError::from(e);
        eprint!("{}", error.format_for_user(debug));
        std::process::exit(error.exit_code() as i32);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            only,
            resume,
            no_resume,
            delay_ms,
            no_cache,
            format,
        } => {
            let config = get_config().context("Failed to load configuration")?;
            let resume = if no_resume {
                false
            } else {
                resume || config.run.keep_progress
            };
            let mut only = only;
            if only.is_empty() {
                only = config.run.mangas.clone();
            }
            let options = ReconcileOptions {
                only,
                resume,
                entry_delay: delay_ms
                    .map(std::time::Duration::from_millis)
                    .unwrap_or_else(|| config.entry_delay()),
            };
            run_command(config, options, no_cache, format).await
        }
        Commands::Cache { command } => {
            let config = get_config().context("Failed to load configuration")?;
            cache_command(config, command).await
        }
        Commands::Config { command } => config_command(command).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

async fn run_command(
    config: AppConfig,
    options: ReconcileOptions,
    no_cache: bool,
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;

    log::debug!("Komga server: {}", config.komga.url);
    log::debug!("Name filter: {:?}", options.only);
    log::debug!("Resume: {}", options.resume);
    log::debug!("No cache: {no_cache}");

    let catalog = Arc::new(KomgaClient::new(KomgaConfig::new(
        config.komga.url.clone(),
        config.komga.email.clone(),
        config.komga.password.clone(),
    ))?);

    let provider = Arc::new(JikanClient::new(JikanConfig {
        base_url: config.jikan.base_url.clone(),
        timeout: config.jikan_timeout(),
    })?);

    let cache: Arc<dyn IdentifierCache> = if no_cache {
        Arc::new(MemoryCache::new())
    } else {
        Arc::new(FileCache::open(config.cache_file())?)
    };

    let processed: Arc<dyn ProcessedLog> = if options.resume || config.run.keep_progress {
        Arc::new(FileProcessedLog::open(config.progress_file())?)
    } else {
        Arc::new(NoOpProcessedLog)
    };

    let covers = Arc::new(HttpCoverSource::new(config.jikan_timeout())?);

    let prompter = TerminalPrompter::new();
    if !prompter.is_interactive() {
        eprintln!(
            "{}",
            "Not running in a terminal: uncached series will be skipped.".yellow()
        );
    }

    let resolver = MetadataResolver::new(provider, cache, Arc::new(prompter)).with_options(
        ResolverOptions {
            search_limit: config.jikan.search_limit,
            offered: config.jikan.offered_candidates,
        },
    );

    let orchestrator = ReconcileOrchestrator::new(resolver, catalog, covers, processed, options);
    let report = orchestrator.run().await?;

    output::print_report(&report, format)?;

    if report.has_failures() {
        log::warn!(
            "{} series could not be updated",
            report.count(EntryOutcome::Failed)
        );
    }

    Ok(())
}

async fn cache_command(config: AppConfig, command: CacheCommand) -> Result<()> {
    let cache = FileCache::open(config.cache_file())?;

    match command {
        CacheCommand::List => {
            let entries = cache.entries().await?;
            if entries.is_empty() {
                eprintln!("No cached links.");
                eprintln!("Cache file: {}", cache.path().display());
            } else {
                eprintln!("{}", "Cached links:".bold().blue());
                eprintln!("Cache file: {}", cache.path().display());
                eprintln!();
                for (name, locator) in entries {
                    println!("{} = {}", name.cyan(), locator);
                }
            }
        }
        CacheCommand::Forget { name } => {
            if cache.remove(&name).await? {
                eprintln!("{}", format!("Forgot {name}").green());
            } else {
                eprintln!("{}", format!("No cached link for {name}").yellow());
            }
        }
        CacheCommand::Set { name, locator } => {
            let locator = locator.trim();
            komal_core::extract_id(locator).map_err(|e| {
                CliError::misuse(&e.to_string()).with_context("locator", locator)
            })?;
            cache.store(&name, locator).await?;
            eprintln!("{}", format!("Set {name} = {locator}").green());
        }
    }

    Ok(())
}

async fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Init { force } => {
            config::interactive_init(force).await?;
        }
        ConfigCommand::Get { key } => {
            let value = manager
                .get(&key)
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            manager
                .set(&key, &value)
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            if items.is_empty() {
                eprintln!("No configuration values set. Using defaults.");
                eprintln!("Config file: {}", manager.get_config_path().display());
                return Ok(());
            }

            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            eprintln!();

            // Group items by section
            let mut sections: std::collections::BTreeMap<String, Vec<(String, String)>> =
                std::collections::BTreeMap::new();
            for (key, value) in items {
                let section = key.split('.').next().unwrap_or("general").to_string();
                sections.entry(section).or_default().push((key, value));
            }

            for (section, mut items) in sections {
                println!("[{}]", section.yellow());
                items.sort_by(|a, b| a.0.cmp(&b.0));

                for (key, value) in items {
                    let display_key = key.split_once('.').map_or(key.as_str(), |(_, rest)| rest);
                    println!("  {} = {}", display_key.cyan(), value);
                }
                println!();
            }
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
