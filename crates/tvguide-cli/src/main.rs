//! tvguide - XMLTV schedule viewer CLI.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

use crate::config::{AppConfig, resolve_config_path};
use tvguide_db::{StoredChannel, load_schedule, open_db, replace_channels, replace_schedule};
use tvguide_xmltv::{ChannelDirectory, ScheduleEntry, TvDocument, build_schedule};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the upcoming schedule from an XMLTV file.
    Schedule(ScheduleArgs),
    /// List the channels declared in an XMLTV file.
    Channels(ChannelsArgs),
    /// Local database operations.
    Db(DbCommand),
}

/// Arguments for the `schedule` subcommand.
#[derive(clap::Args)]
struct ScheduleArgs {
    /// XMLTV guide file. Falls back to config `guide.file`, then `tv.xml`.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Show only this channel id. Falls back to config selected channels.
    #[arg(long)]
    channel: Option<String>,
}

/// Arguments for the `channels` subcommand.
#[derive(clap::Args)]
struct ChannelsArgs {
    /// XMLTV guide file. Falls back to config `guide.file`, then `tv.xml`.
    #[arg(long)]
    file: Option<PathBuf>,
}

/// Arguments for the `db` subcommand.
#[derive(clap::Args)]
struct DbCommand {
    /// Db subcommand to run.
    #[command(subcommand)]
    command: DbSubcommands,
}

/// Available database subcommands.
#[derive(Subcommand)]
enum DbSubcommands {
    /// Normalize an XMLTV file and store the result in the local database.
    Sync(DbSyncArgs),
    /// Show the stored schedule.
    List(DbListArgs),
}

/// Arguments for the `db sync` subcommand.
#[derive(clap::Args)]
struct DbSyncArgs {
    /// XMLTV guide file. Falls back to config `guide.file`, then `tv.xml`.
    #[arg(long)]
    file: Option<PathBuf>,
}

/// Arguments for the `db list` subcommand.
#[derive(clap::Args)]
struct DbListArgs {
    /// Show only this channel id.
    #[arg(long)]
    channel: Option<String>,
}

/// Resolves the guide file from CLI arg, config, or the `tv.xml` default.
fn resolve_guide_file(file: Option<PathBuf>, dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(f) = file {
        return Ok(f);
    }

    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok(config
        .guide
        .file
        .unwrap_or_else(|| PathBuf::from("tv.xml")))
}

/// Loads selected channel ids from config (empty when unconfigured).
fn load_selected_channels(dir: Option<&PathBuf>) -> Result<Vec<String>> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok(config.channels.selected)
}

/// Reads and parses an XMLTV document from disk.
fn load_document(path: &Path) -> Result<TvDocument> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document = xml
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

/// Prints one schedule table to the log output.
fn print_schedule<'a>(entries: impl IntoIterator<Item = &'a ScheduleEntry>) -> usize {
    tracing::info!("Start (UTC)\t\tLength\tChannel\t\tTitle");
    let mut total: usize = 0;
    for entry in entries {
        tracing::info!(
            "{}\t{:>4}min\t{}\t{}",
            entry.start.format("%Y-%m-%d %H:%M"),
            entry.duration().num_minutes(),
            entry.channel_name,
            entry.title,
        );
        total = total.saturating_add(1);
    }
    total
}

/// Runs the `schedule` subcommand.
///
/// # Errors
///
/// Returns an error if the guide file cannot be read or parsed, the
/// channel directory or schedule build fails, or `--channel` names an
/// unknown id.
#[instrument(skip_all)]
fn run_schedule(args: ScheduleArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_guide_file(args.file, dir)?;
    let document = load_document(&path)?;
    let directory = ChannelDirectory::build(&document)?;
    let index = build_schedule(&document, &directory, Utc::now())?;

    let entries: Vec<&ScheduleEntry> = if let Some(id) = args.channel.as_deref() {
        // Fail on unknown ids instead of printing an empty table.
        directory.display_name(id)?;
        index.by_channel(id)
    } else {
        let selected = load_selected_channels(dir)?;
        if selected.is_empty() {
            index.all().iter().collect()
        } else {
            index
                .all()
                .iter()
                .filter(|entry| selected.contains(&entry.channel_id))
                .collect()
        }
    };

    let total = print_schedule(entries.iter().copied());
    tracing::info!("Total: {} upcoming programmes", total);
    Ok(())
}

/// Runs the `channels` subcommand.
///
/// # Errors
///
/// Returns an error if the guide file cannot be read or parsed, or the
/// directory build fails.
#[instrument(skip_all)]
fn run_channels(args: ChannelsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_guide_file(args.file, dir)?;
    let document = load_document(&path)?;
    let directory = ChannelDirectory::build(&document)?;

    let mut channels: Vec<(&str, &str)> = directory.entries().collect();
    channels.sort_unstable_by_key(|&(id, _)| id);

    tracing::info!("ID\t\t\tName");
    for (id, name) in channels {
        tracing::info!("{id}\t{name}");
    }
    tracing::info!("Total: {} channels", directory.len());
    Ok(())
}

/// Runs the `db sync` subcommand.
///
/// # Errors
///
/// Returns an error if normalization or any database operation fails; on
/// failure the previously stored schedule is left untouched.
#[instrument(skip_all)]
fn run_db_sync(args: DbSyncArgs, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_guide_file(args.file, dir)?;
    let document = load_document(&path)?;
    let directory = ChannelDirectory::build(&document)?;
    let index = build_schedule(&document, &directory, Utc::now())?;

    let conn = open_db(dir).context("failed to open database")?;

    let mut stored: Vec<StoredChannel> = directory
        .entries()
        .map(|(id, name)| StoredChannel {
            channel_id: String::from(id),
            display_name: String::from(name),
        })
        .collect();
    stored.sort_unstable_by(|a, b| a.channel_id.cmp(&b.channel_id));
    replace_channels(&conn, &stored).context("failed to store channels")?;
    replace_schedule(&conn, index.all()).context("failed to store schedule")?;

    tracing::info!(
        "Synced {} channels and {} upcoming programmes from {}",
        stored.len(),
        index.len(),
        path.display(),
    );
    Ok(())
}

/// Runs the `db list` subcommand.
///
/// # Errors
///
/// Returns an error if database operations fail.
#[instrument(skip_all)]
fn run_db_list(args: DbListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let conn = open_db(dir).context("failed to open database")?;
    let entries = load_schedule(&conn).context("failed to load schedule")?;

    if entries.is_empty() {
        tracing::info!("No stored schedule. Run `db sync` first.");
        return Ok(());
    }

    let total = match args.channel.as_deref() {
        Some(id) => print_schedule(entries.iter().filter(|entry| entry.channel_id == id)),
        None => print_schedule(&entries),
    };
    tracing::info!("Total: {} stored programmes", total);
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Schedule(args) => run_schedule(args, cli.dir.as_ref()),
        Commands::Channels(args) => run_channels(args, cli.dir.as_ref()),
        Commands::Db(db) => match db.command {
            DbSubcommands::Sync(args) => run_db_sync(args, cli.dir.as_ref()),
            DbSubcommands::List(args) => run_db_list(args, cli.dir.as_ref()),
        },
    }
}
