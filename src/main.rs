//! CLI entrypoint for `hashhound`.
//!
//! Parses command-line arguments, validates input files, loads hash lists
//! into the store, runs adaptive resolution against a dictionary attempter
//! built from the given wordlists and known-pair files, prints a terminal
//! summary, and optionally writes CSV/TXT exports when an output directory
//! is provided.
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use hashhound::{
    attempt::DictionaryAttempter,
    coordinator::{AttemptCoordinator, CancelFlag, Resolution},
    export::{save_entries_csv, save_recovered_txt, save_stats_csv},
    ingest::{generate_from_wordlists, load_hash_files, load_known_pairs},
    io::{DEFAULT_MMAP_THRESHOLD_BYTES, collect_words},
    ledger::{DEFAULT_ALPHA, StatsLedger},
    report::render_summary_with_top,
    store::EntryStore,
};
use log::{LevelFilter, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hashhound",
    version,
    about = "Adaptive hash-type ranking and password recovery"
)]
struct Args {
    /// Path to hash list file(s), one `hash[:source]` per line
    #[arg(short = 'H', long = "hashfiles", required = true)]
    hashfiles: Vec<PathBuf>,

    /// Path to wordlist file(s) feeding the dictionary attempter
    #[arg(short = 'w', long = "wordlists")]
    wordlists: Vec<PathBuf>,

    /// Path to known-pair file(s), one `hash:plaintext` per line
    #[arg(short = 'p', long = "known")]
    known: Vec<PathBuf>,

    /// Plaintext list(s) to hash under every type and store as entries
    #[arg(short = 'g', long = "generate")]
    generate: Vec<PathBuf>,

    /// Path to the output directory for CSV/TXT exports
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// EMA decay factor for the stats ledger
    #[arg(long = "alpha", default_value_t = DEFAULT_ALPHA)]
    alpha: f64,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Resolve entries in parallel across the thread pool
    #[arg(long = "parallel")]
    parallel: bool,

    /// Limit number of entries in "Top Recovered Passwords"
    #[arg(long = "top", default_value_t = 10)]
    top_limit: usize,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress summary output (still writes exports if -o is provided)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

const ASCII_TITLE: &str = r#"
 _   _           _     _   _                       _
| | | | __ _ ___| |__ | | | | ___  _   _ _ __   __| |
| |_| |/ _` / __| '_ \| |_| |/ _ \| | | | '_ \ / _` |
|  _  | (_| \__ \ | | |  _  | (_) | |_| | | | | (_| |
|_| |_|\__,_|___/_| |_|_| |_|\___/ \__,_|_| |_|\__,_|
"#;

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    if args.hashfiles.is_empty() {
        bail!("no hash files provided (-H/--hashfiles)");
    }
    for p in &args.hashfiles {
        if !p.exists() {
            bail!("hash file not found: {}", p.display());
        }
    }
    if !(0.0..=1.0).contains(&args.alpha) {
        bail!("--alpha must be within [0, 1], got {}", args.alpha);
    }
    for p in args.wordlists.iter().chain(&args.known).chain(&args.generate) {
        if !p.exists() {
            warn!("input file not found: {} (continuing)", p.display());
        }
    }
    Ok(())
}

fn existing(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().filter(|p| p.exists()).cloned().collect()
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }

    let store = EntryStore::new();
    let ledger = StatsLedger::new(args.alpha);
    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };

    match load_hash_files(&store, &args.hashfiles, threshold) {
        Ok(count) => info!("loaded {count} entries"),
        Err(e) => {
            error!("failed to load hash files: {}", e);
            std::process::exit(3);
        }
    }
    if !args.generate.is_empty() {
        match generate_from_wordlists(&store, &existing(&args.generate), threshold) {
            Ok(count) => info!("generated {count} entries"),
            Err(e) => {
                error!("failed to generate entries: {}", e);
                std::process::exit(3);
            }
        }
    }

    // dictionary = wordlist words + plaintexts from known-pair files
    let mut words = match collect_words(&existing(&args.wordlists), threshold) {
        Ok(words) => words,
        Err(e) => {
            error!("failed to load wordlists: {}", e);
            std::process::exit(3);
        }
    };
    match load_known_pairs(&existing(&args.known), threshold) {
        Ok(pairs) => words.extend(pairs.into_values()),
        Err(e) => {
            error!("failed to load known pairs: {}", e);
            std::process::exit(3);
        }
    }
    let attempter = DictionaryAttempter::new(words);
    info!("dictionary holds {} candidate plaintexts", attempter.word_count());

    let coordinator = AttemptCoordinator::new(&store, &ledger, &attempter);
    let cancel = CancelFlag::new();
    let pending: Vec<u64> = store
        .list()
        .into_iter()
        .filter(|e| !e.is_resolved())
        .map(|e| e.id)
        .collect();
    let raw_results = if args.parallel {
        coordinator.resolve_all_parallel(&pending, &cancel)
    } else {
        coordinator.resolve_all(&pending, &cancel)
    };
    let mut results: Vec<(u64, Resolution)> = Vec::with_capacity(raw_results.len());
    for (id, outcome) in raw_results {
        match outcome {
            Ok(resolution) => results.push((id, resolution)),
            Err(e) => warn!("resolution of entry {id} failed: {e}"),
        }
    }

    if !args.quiet {
        println!("{}", ASCII_TITLE.bold().green());
        println!(
            "{}",
            render_summary_with_top(&store, &ledger, &results, args.top_limit)
        );
    }

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(4);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let entries_csv = outdir.join(format!("hashhound_entries_{}.csv", ts));
        let stats_csv = outdir.join(format!("hashhound_stats_{}.csv", ts));
        let recovered_txt = outdir.join(format!("hashhound_recovered_{}.txt", ts));
        if let Err(e) = save_entries_csv(&store, &entries_csv) {
            error!("failed to write {}: {}", entries_csv.display(), e);
            std::process::exit(5);
        }
        if let Err(e) = save_stats_csv(&ledger, &stats_csv) {
            error!("failed to write {}: {}", stats_csv.display(), e);
            std::process::exit(6);
        }
        if let Err(e) = save_recovered_txt(&store, &recovered_txt) {
            error!("failed to write {}: {}", recovered_txt.display(), e);
            std::process::exit(7);
        }
    }
}
