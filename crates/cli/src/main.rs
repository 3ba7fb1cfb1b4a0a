use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackmend_core::{
    load_config, validate_config, Config, Decision, DirectoryScanner, IntegrityChecker,
    IntegrityVerdict, LoftyMetadataReader, QuarantineConfig, QuarantineRecord, QuarantineRouter,
    ScanOptions, ScanReport, ScoredCandidate, SearchIndex, TrackDescriptor, TrackMatcher,
};

/// Config file used when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "trackmend.toml";

#[derive(Debug, Parser)]
#[command(name = "trackmend", version, about = "Find replacement audio files and verify library integrity")]
struct Cli {
    /// Configuration file
    #[arg(long, short, global = true, env = "TRACKMEND_CONFIG")]
    config: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build or refresh the search index cache
    Index {
        /// Directories to index (defaults to [index].roots)
        roots: Vec<PathBuf>,
    },
    /// Search the index for a track and score the candidates
    Find {
        #[arg(long)]
        name: String,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        album: Option<String>,
        /// Expected size in bytes
        #[arg(long)]
        size: Option<u64>,
        /// Expected duration in seconds
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        track_number: Option<u32>,
        #[arg(long)]
        year: Option<u32>,
        /// Directories to search (defaults to [index].roots)
        roots: Vec<PathBuf>,
    },
    /// Run the integrity checks on individual files
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Move failing files under this quarantine root
        #[arg(long)]
        quarantine_root: Option<PathBuf>,
    },
    /// Check every audio file under a directory
    Scan {
        dir: PathBuf,
        /// Move failing files into quarantine buckets
        #[arg(long)]
        quarantine: bool,
        /// Report moves without touching any file
        #[arg(long)]
        dry_run: bool,
        /// Stop after this many files
        #[arg(long)]
        limit: Option<usize>,
        /// Skip files recorded in the scan checkpoint
        #[arg(long)]
        resume: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    match cli.command {
        Command::Index { roots } => run_index(&config, roots, cli.json).await,
        Command::Find {
            name,
            artist,
            album,
            size,
            duration,
            track_number,
            year,
            roots,
        } => {
            let mut track = TrackDescriptor::new(name);
            track.artist = artist;
            track.album = album;
            track.size_bytes = size;
            track.duration_secs = duration;
            track.track_number = track_number;
            track.year = year;
            run_find(&config, track, roots, cli.json).await
        }
        Command::Check {
            paths,
            quarantine_root,
        } => run_check(&config, paths, quarantine_root, cli.json).await,
        Command::Scan {
            dir,
            quarantine,
            dry_run,
            limit,
            resume,
        } => {
            let mut options = ScanOptions::default()
                .with_quarantine(quarantine)
                .with_dry_run(dry_run)
                .with_resume(resume);
            if let Some(limit) = limit {
                options = options.with_limit(limit);
            }
            run_scan(&config, &dir, &options, cli.json).await
        }
    }
}

/// Loads the given config file, or the default one if it exists.
fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                return Ok(Config::default());
            }
            default
        }
    };

    info!("Loading configuration from {:?}", path);
    load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
}

fn search_roots(config: &Config, roots: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let roots = if roots.is_empty() {
        config.index.roots.clone()
    } else {
        roots
    };
    if roots.is_empty() {
        bail!("No search roots given and none configured under [index].roots");
    }
    Ok(roots)
}

/// Builds or loads the index off the async runtime.
async fn load_index(config: &Config, roots: Vec<PathBuf>) -> Result<SearchIndex> {
    let index_config = config.index.clone();
    tokio::task::spawn_blocking(move || {
        let reader = LoftyMetadataReader::new();
        SearchIndex::load_or_build(&roots, &index_config, &reader)
    })
    .await
    .context("Index task panicked")?
    .context("Failed to build search index")
}

#[derive(Serialize)]
struct IndexSummary {
    roots: Vec<PathBuf>,
    keys: usize,
    files: usize,
}

async fn run_index(config: &Config, roots: Vec<PathBuf>, json: bool) -> Result<()> {
    let roots = search_roots(config, roots)?;
    let index = load_index(config, roots).await?;

    let summary = IndexSummary {
        roots: index.roots().to_vec(),
        keys: index.key_count(),
        files: index.file_count(),
    };
    if json {
        print_json(&summary)?;
    } else {
        println!("Indexed {} files under {} keys", summary.files, summary.keys);
        for root in &summary.roots {
            println!("  {}", root.display());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FindOutput<'a> {
    track: &'a TrackDescriptor,
    ranked: &'a [ScoredCandidate],
    decision: &'a Decision,
}

async fn run_find(
    config: &Config,
    track: TrackDescriptor,
    roots: Vec<PathBuf>,
    json: bool,
) -> Result<()> {
    let roots = search_roots(config, roots)?;
    let index = load_index(config, roots).await?;

    let candidates =
        index.find_by_name_and_size(&track.name, track.size_bytes, track.artist.as_deref());
    info!("Found {} candidate(s) for '{}'", candidates.len(), track.name);

    let matcher = TrackMatcher::with_config(config.matcher.clone());
    let ranked = matcher.rank(&track, &candidates);
    let decision = matcher.decide(&track, &candidates, config.matcher.auto_accept_threshold);

    if json {
        return print_json(&FindOutput {
            track: &track,
            ranked: &ranked,
            decision: &decision,
        });
    }

    if ranked.is_empty() {
        println!("No candidates for '{}'", track.name);
        return Ok(());
    }
    for (i, scored) in ranked.iter().enumerate() {
        let marker = if matcher.is_auto_replace_candidate(&scored.breakdown) {
            "*"
        } else {
            " "
        };
        println!(
            "{}{:>3}. [{:>3}] {}",
            marker,
            i + 1,
            scored.score(),
            scored.candidate.path.display()
        );
        println!("        {}", scored.breakdown.summary());
    }
    match &decision {
        Decision::AutoAccept { candidate, reason } => println!(
            "Accepted ({:?}): {}",
            reason,
            candidate.candidate.path.display()
        ),
        Decision::NeedsReview { ranked } => {
            println!("Needs review: {} candidate(s)", ranked.len())
        }
        Decision::NoCandidates => println!("No candidates"),
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckOutput {
    verdicts: Vec<IntegrityVerdict>,
    quarantined: Vec<QuarantineRecord>,
}

async fn run_check(
    config: &Config,
    paths: Vec<PathBuf>,
    quarantine_root: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let checker = IntegrityChecker::with_system_tools(config.integrity.clone());
    let router = match quarantine_root {
        Some(root) => Some(
            QuarantineRouter::new(&QuarantineConfig::default().with_root(root))
                .context("Invalid quarantine root")?,
        ),
        None => None,
    };

    let mut output = CheckOutput {
        verdicts: Vec::with_capacity(paths.len()),
        quarantined: Vec::new(),
    };
    for path in paths {
        let verdict = checker.check(&path).await;
        if let (Some(router), Some(bucket)) = (&router, verdict.quarantine_bucket()) {
            match router.quarantine(&verdict.path, bucket).await {
                Ok(record) => output.quarantined.push(record),
                Err(e) => warn!("Failed to quarantine {}: {}", verdict.path.display(), e),
            }
        }
        output.verdicts.push(verdict);
    }

    if json {
        return print_json(&output);
    }
    for verdict in &output.verdicts {
        print_verdict(verdict);
    }
    for record in &output.quarantined {
        println!(
            "Moved {} -> {}",
            record.original.display(),
            record.destination.display()
        );
    }
    Ok(())
}

async fn run_scan(config: &Config, dir: &Path, options: &ScanOptions, json: bool) -> Result<()> {
    let checker = Arc::new(IntegrityChecker::with_system_tools(
        config.integrity.clone(),
    ));
    let mut scanner = DirectoryScanner::new(config.scanner.clone(), checker);
    if options.quarantine {
        let router = QuarantineRouter::new(&config.quarantine)
            .context("Invalid quarantine configuration")?;
        scanner = scanner.with_quarantine(Arc::new(router));
    }

    let report = scanner
        .scan(dir, options)
        .await
        .with_context(|| format!("Scan of {} failed", dir.display()))?;

    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

fn print_verdict(verdict: &IntegrityVerdict) {
    match (verdict.ok, verdict.failure) {
        (true, _) => println!("OK    {}", verdict.path.display()),
        (false, Some(reason)) => println!(
            "FAIL  {} [{}] {}",
            verdict.path.display(),
            reason.code(),
            verdict.detail.as_deref().unwrap_or_default()
        ),
        (false, None) => println!("FAIL  {}", verdict.path.display()),
    }
}

fn print_report(report: &ScanReport) {
    let stats = &report.stats;
    for verdict in &report.failures {
        print_verdict(verdict);
    }
    let verb = if report.dry_run { "Would move" } else { "Moved" };
    for record in &report.quarantined {
        println!(
            "{} {} -> {}",
            verb,
            record.original.display(),
            record.destination.display()
        );
    }
    println!(
        "Checked {} file(s): {} good, {} corrupted, {} quarantined, {} quarantine error(s), {} error(s)",
        stats.total,
        stats.good,
        stats.corrupted,
        stats.quarantined,
        stats.quarantine_errors,
        stats.errors
    );
    if report.skipped > 0 {
        println!("Skipped {} file(s) from the checkpoint", report.skipped);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
