//! scopemap CLI.
//!
//! Orchestrates the full pipeline: discover source files, load tags (from
//! the cache where fresh, parsing in parallel otherwise), build the
//! dependency and call graphs, rank with PageRank, apply any focused
//! query, and print the TOON map.
//!
//! Per-file problems (unreadable, oversized, unparseable) are warnings;
//! the run only fails when nothing at all can be mapped.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use scopemap::cache::{TagCache, CACHE_DIR_NAME};
use scopemap::discovery::{self, FileEntry};
use scopemap::types::FileInfo;
use scopemap::{languages, pipeline, render, MapOptions};

mod init;

/// Generate a ranked repository map for coding agents.
///
/// scopemap analyzes source files with tree-sitter and produces a ranked
/// list of files, exported symbols, cross-file dependencies, and call
/// graph edges in compact TOON text.
///
/// Examples:
///   scopemap                          current directory, all languages
///   scopemap -l go,python             filter by language
///   scopemap -n 20                    top 20 files (large repos)
///   scopemap --symbol BuildGraph      focused: a symbol plus its callers/callees
///   scopemap --file internal/auth     focused: symbols and deps for a path
#[derive(Parser, Debug)]
#[command(name = "scopemap")]
#[command(version)]
#[command(about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository root
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Maximum number of files to include (0 = no limit)
    #[arg(short = 'n', long = "max-files", default_value_t = 0)]
    max_files: usize,

    /// Comma-separated languages to include
    #[arg(short = 'l', long = "langs")]
    langs: Option<String>,

    /// Filter output to symbols matching this substring (case-insensitive)
    #[arg(long)]
    symbol: Option<String>,

    /// Filter output to files matching this substring (case-insensitive)
    #[arg(long)]
    file: Option<String>,

    /// Surface class fields in a members table (with --symbol)
    #[arg(long)]
    members: bool,

    /// Include test files (excluded by default)
    #[arg(long = "with-tests")]
    with_tests: bool,

    /// Skip files larger than this many bytes
    #[arg(long = "max-file-size", default_value_t = 1_000_000)]
    max_file_size: u64,

    /// Disable the persistent tag cache
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// Re-parse all files, ignoring cached tags
    #[arg(long)]
    refresh: bool,

    /// Output raw TOON without the agent context header
    #[arg(long)]
    raw: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a scopemap usage section to a CLAUDE.md file
    Init(init::InitArgs),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Init(args)) = cli.command {
        return init::run(&args);
    }

    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("resolving {}", cli.path.display()))?;
    anyhow::ensure!(root.is_dir(), "{}: not a directory", root.display());

    let langs = parse_langs(cli.langs.as_deref())?;

    let mut entries = discovery::discover_files(&root, &langs)?;
    if !cli.with_tests {
        entries.retain(|e| !discovery::is_test_file(&e.path));
    }
    anyhow::ensure!(!entries.is_empty(), "no parseable files found");

    let cache = if cli.no_cache {
        None
    } else {
        match TagCache::open(&root.join(CACHE_DIR_NAME)) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("Warning: tag cache disabled: {:#}", e);
                None
            }
        }
    };

    let file_infos = load_file_infos(
        &root,
        &entries,
        cache.as_ref(),
        cli.refresh,
        cli.max_file_size,
    );
    anyhow::ensure!(!file_infos.is_empty(), "no files could be parsed");

    let repo_name = root
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let opts = MapOptions {
        max_files: cli.max_files,
        symbol: cli.symbol.clone(),
        file: cli.file.clone(),
        with_members: cli.members,
    };
    let focused = opts.symbol.is_some() || opts.file.is_some();

    let rm = pipeline::assemble(&repo_name, &repo_name, file_infos, &opts)?;
    let output = render::encode(&rm, focused);

    if cli.raw {
        println!("{}", output);
    } else {
        println!("{}", with_header(&output));
    }
    Ok(())
}

/// Validate a comma-separated language list against the registry.
fn parse_langs(langs: Option<&str>) -> Result<Vec<String>> {
    let Some(langs) = langs else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for name in langs.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if languages::get(name).is_none() {
            eprintln!("supported languages: {}", languages::names().join(", "));
            return Err(scopemap::MapError::UnknownLanguage(name.to_string()).into());
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Load per-file tags: fresh cache entries are reused, everything else is
/// read and parsed in parallel. Results come back in discovery order.
fn load_file_infos(
    root: &std::path::Path,
    entries: &[FileEntry],
    cache: Option<&TagCache>,
    refresh: bool,
    max_file_size: u64,
) -> Vec<FileInfo> {
    let mut infos: Vec<Option<FileInfo>> = Vec::with_capacity(entries.len());
    infos.resize_with(entries.len(), || None);

    struct Pending {
        index: usize,
        mtime: Option<SystemTime>,
        path: String,
        language: &'static str,
        source: Vec<u8>,
    }

    let mut pending: Vec<Pending> = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let abs = root.join(&entry.path);
        let meta = match fs::metadata(&abs) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Warning: failed to stat {}: {}", entry.path, e);
                continue;
            }
        };
        if meta.len() > max_file_size {
            eprintln!(
                "Warning: {}: skipped (>{} bytes)",
                entry.path, max_file_size
            );
            continue;
        }

        let mtime = meta.modified().ok();
        if !refresh {
            if let (Some(cache), Some(mtime)) = (cache, mtime) {
                if let Some(tags) = cache.get(&entry.path, mtime) {
                    infos[index] = Some(FileInfo {
                        path: entry.path.clone(),
                        language: entry.language.to_string(),
                        tags,
                        rank: 0.0,
                    });
                    continue;
                }
            }
        }

        match fs::read(&abs) {
            Ok(source) => pending.push(Pending {
                index,
                mtime,
                path: entry.path.clone(),
                language: entry.language,
                source,
            }),
            Err(e) => eprintln!("Warning: failed to read {}: {}", entry.path, e),
        }
    }

    let parsed: Vec<(usize, Option<SystemTime>, Option<FileInfo>)> = pending
        .par_iter()
        .map(|p| {
            (
                p.index,
                p.mtime,
                pipeline::extract_file(&p.path, p.language, &p.source),
            )
        })
        .collect();

    for (index, mtime, fi) in parsed {
        let Some(fi) = fi else { continue };
        if let (Some(cache), Some(mtime)) = (cache, mtime) {
            if let Err(e) = cache.put(&fi.path, mtime, fi.tags.clone()) {
                eprintln!("Warning: cache write for {}: {:#}", fi.path, e);
            }
        }
        infos[index] = Some(fi);
    }

    infos.into_iter().flatten().collect()
}

fn with_header(output: &str) -> String {
    format!(
        "# Repository Map\n\n\
         Ranked map of this repository: files sorted by PageRank importance,\n\
         exported symbols with locations, cross-file dependencies, and call\n\
         graph edges. Read files in ranked order; check the symbols table\n\
         before searching for definitions.\n\n{}",
        output
    )
}
