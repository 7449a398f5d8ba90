//! cloudtrim - storage optimization recommendations for cloud drives.
//!
//! Works on metadata listings already exported from the storage provider
//! (JSON arrays of file objects, or raw listing pages).
//!
//! Usage:
//!   cloudtrim analyze FEED...      Full report with recommendations
//!   cloudtrim duplicates FEED...   Duplicate clusters only
//!   cloudtrim types FEED...        Storage by file type
//!   cloudtrim --help               Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use cloudtrim_analyze::{
    AnalysisConfig, AnalysisResult, DuplicateCluster, DuplicateDetector, StorageAnalyzer,
    StorageQuota, categorize, feed, normalize,
};
use cloudtrim_core::{FileTypeClass, TypeTotals};

#[derive(Parser)]
#[command(
    name = "cloudtrim",
    version,
    about = "Storage optimization recommendations for cloud drives",
    long_about = "cloudtrim reads file metadata exported from a cloud drive listing \
                  and reports where the space goes: type breakdown, largest and \
                  oldest files, duplicates, and suggested cleanup actions."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct FeedArgs {
    /// Metadata feed files (JSON); pages are concatenated in order
    #[arg(required = true)]
    feeds: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Full analysis with recommendations
    Analyze {
        #[command(flatten)]
        feed: FeedArgs,

        /// JSON config file (any subset of the analysis options)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Account quota document (`about` response with `storageQuota`)
        #[arg(short, long)]
        quota: Option<PathBuf>,

        /// Number of largest files to list
        #[arg(long)]
        largest: Option<usize>,

        /// Number of oldest files to list
        #[arg(long)]
        oldest: Option<usize>,

        /// Fail if the feed has no usable records
        #[arg(long)]
        strict: bool,
    },

    /// Find duplicate files
    Duplicates {
        #[command(flatten)]
        feed: FeedArgs,

        /// Only match by checksum (skip the name+size heuristic)
        #[arg(long)]
        exact_only: bool,
    },

    /// Show storage by file type
    Types {
        #[command(flatten)]
        feed: FeedArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Analyze {
            feed,
            config,
            quota,
            largest,
            oldest,
            strict,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => AnalysisConfig::default(),
            };
            if let Some(n) = largest {
                config.largest_n = n;
            }
            if let Some(n) = oldest {
                config.oldest_n = n;
            }
            config.strict_nonempty |= strict;
            run_analyze(&feed, config, quota.as_deref())?;
        }
        Command::Duplicates { feed, exact_only } => run_duplicates(&feed, exact_only)?,
        Command::Types { feed } => run_types(&feed)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    AnalysisConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_quota(path: &Path) -> Result<Option<StorageQuota>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read quota {}", path.display()))?;
    let about: serde_json::Value = serde_json::from_str(&json).context("Invalid quota JSON")?;
    Ok(StorageQuota::from_about(&about))
}

/// Run the full analysis and print the report.
fn run_analyze(args: &FeedArgs, config: AnalysisConfig, quota: Option<&Path>) -> Result<()> {
    let raw = feed::read_feeds(&args.feeds).context("Failed to load feed")?;

    let mut analyzer = StorageAnalyzer::with_config(config);
    if let Some(path) = quota {
        match load_quota(path)? {
            Some(q) => analyzer = analyzer.with_quota(q),
            None => tracing::warn!(path = %path.display(), "quota document has no usage figure"),
        }
    }

    let result = analyzer.analyze(&raw).context("Analysis failed")?;

    match args.format {
        OutputFormat::Text => print_report(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

/// Run duplicate detection only.
fn run_duplicates(args: &FeedArgs, exact_only: bool) -> Result<()> {
    let raw = feed::read_feeds(&args.feeds).context("Failed to load feed")?;
    let records = normalize(&raw).records;
    let report = DuplicateDetector::new()
        .with_heuristic(!exact_only)
        .detect(&records);

    match args.format {
        OutputFormat::Text => {
            print_header("Duplicate File Report");
            if report.clusters.is_empty() {
                println!(" No duplicate files found.");
            } else {
                println!(
                    " Found {} clusters ({} files, {} exact / {} probable)",
                    report.clusters.len(),
                    report.clustered_files(),
                    report.exact_clusters,
                    report.probable_clusters
                );
                println!(
                    " Total reclaimable space: {}",
                    format_size(report.total_reclaimable())
                );
                println!();
                print_clusters(&report.clusters);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.clusters)?);
        }
    }

    Ok(())
}

/// Show per-type storage totals.
fn run_types(args: &FeedArgs) -> Result<()> {
    let raw = feed::read_feeds(&args.feeds).context("Failed to load feed")?;
    let breakdown = categorize(&normalize(&raw).records);

    match args.format {
        OutputFormat::Text => {
            print_header("Storage by File Type");
            print_types(&breakdown.totals, breakdown.total_bytes);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&breakdown.totals)?);
        }
    }

    Ok(())
}

fn print_report(result: &AnalysisResult) {
    let summary = &result.summary;
    print_header("Storage Report");
    println!(
        " {} files, {} total",
        summary.total_files,
        format_size(summary.total_bytes)
    );
    if summary.skipped_records > 0 {
        println!(" {} malformed record(s) skipped", summary.skipped_records);
    }
    if let Some(quota) = &result.quota {
        match (quota.limit_bytes, quota.used_fraction) {
            (Some(limit), Some(fraction)) => println!(
                " Quota: {} of {} used ({:.1}%) {}",
                format_size(quota.used_bytes),
                format_size(limit),
                fraction * 100.0,
                make_bar(fraction, 20)
            ),
            _ => println!(" Quota: {} used (unlimited)", format_size(quota.used_bytes)),
        }
    }
    println!();

    println!(" Storage by type:");
    print_types(&result.file_types, summary.total_bytes);

    if !result.largest_files.is_empty() {
        println!(" Largest files:");
        for record in &result.largest_files {
            println!(
                "   {:<44} {:>10}",
                truncate(display_name(&record.name, &record.id), 44),
                format_size(record.size_bytes)
            );
        }
        println!();
    }

    if !result.oldest_files.is_empty() {
        println!(" Oldest files:");
        for record in &result.oldest_files {
            println!(
                "   {:<44} {:>10}  {}",
                truncate(display_name(&record.name, &record.id), 44),
                format_size(record.size_bytes),
                record.modified_time.date_naive()
            );
        }
        println!();
    }

    if !result.duplicates.is_empty() {
        println!(
            " Duplicates ({} reclaimable):",
            format_size(summary.reclaimable_bytes)
        );
        print_clusters(&result.duplicates);
    }

    if result.recommendations.is_empty() {
        println!(" No recommendations.");
    } else {
        println!(
            " Recommendations (up to {} freed):",
            format_size(result.total_estimated_savings())
        );
        for (i, rec) in result.recommendations.iter().enumerate() {
            println!("   {:>2}. [p{}] {}", i + 1, rec.priority, rec.rationale);
        }
    }
    println!();
}

fn print_types<'a>(
    totals: impl IntoIterator<Item = (&'a FileTypeClass, &'a TypeTotals)>,
    total_bytes: u64,
) {
    for (class, t) in totals {
        let ratio = if total_bytes > 0 {
            t.total_bytes as f64 / total_bytes as f64
        } else {
            0.0
        };
        println!(
            "   {:<10} {:>10} {:>8} files {:>5.1}% {}",
            class.to_string(),
            format_size(t.total_bytes),
            t.count,
            ratio * 100.0,
            make_bar(ratio, 20)
        );
    }
    println!();
}

fn print_clusters(clusters: &[DuplicateCluster]) {
    for (i, cluster) in clusters.iter().enumerate() {
        println!(
            " Cluster {} ({}, {} files, {} each, {} reclaimable)",
            i + 1,
            cluster.confidence,
            cluster.count(),
            format_size(cluster.size_bytes),
            format_size(cluster.reclaimable_bytes)
        );
        for id in &cluster.member_ids {
            let marker = if *id == cluster.keeper_id { "keep" } else { "    " };
            println!("   {marker} {id}");
        }
        println!();
    }
}

fn print_header(title: &str) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" {title}");
    println!("{}", "─".repeat(70));
    println!();
}

fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() { id } else { name }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}
