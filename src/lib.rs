//! `umake`: a dependency scanner and topological build-order planner
//! for C++ projects mixing classical headers and C++20 modules.
//!
//! The crate is organized as a small pipeline, one module per
//! component:
//!
//! - [`scan`] — the lexical scanner (component A): parses one file
//!   into a [`record::DirectDependencyRecord`].
//! - [`cache`] — the scan cache (component B).
//! - [`walker`] — the file-tree walker (component C).
//! - [`driver`] — the scan driver (component D): decides per file
//!   whether to trust the cache or rescan.
//! - [`index`] — the module index (component E).
//! - [`resolver`] — the transitive closure resolver (component F).
//! - [`emitter`] — the topological emitter (component G).
//! - [`extmap`] — the extension mapper (component H).
//! - [`config`] — CLI parsing and `umakeConfig.json` persistence.
//! - [`error`] — the shared error type.
//!
//! [`run`] wires every component together into the single pipeline the
//! binary drives: walk, scan, resolve, emit.

pub mod cache;
pub mod config;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod extmap;
pub mod index;
pub mod ordered;
pub mod record;
pub mod relpath;
pub mod resolver;
pub mod scan;
pub mod walker;

use cache::Cache;
use config::Config;
use emitter::Target;
use error::{Result, UmakeError};
use extmap::ExtensionMap;
use ordered::OrderedMap;
use resolver::{Closure, Resolver};
use walker::Walker;

/// Everything a single `run` produced, so the binary can decide what
/// to do with each piece (print, write to disk, persist the cache)
/// without re-deriving any of it.
pub struct RunOutcome {
    pub manifest: String,
    /// `(importer, missing module name)` pairs, collected rather than
    /// raised so every gap is reported in one run.
    pub missing: Vec<(String, String)>,
    /// The scan cache, updated with every record produced or reused
    /// this run. The caller decides whether to persist it.
    pub cache: Cache,
    /// One line per cache-freshness decision, ready for `umakeLog.txt`.
    pub log_lines: Vec<String>,
}

fn with_leading_dot(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

fn build_extension_map(config: &Config) -> ExtensionMap {
    ExtensionMap::new(
        config.module_exts.iter().map(|e| with_leading_dot(e)).collect(),
        config.ext_header.iter().map(|e| with_leading_dot(e)).collect(),
        config.ext_source.iter().map(|e| with_leading_dot(e)).collect(),
        config
            .ext_header_source
            .iter()
            .map(|(h, s)| (with_leading_dot(h), with_leading_dot(s)))
            .collect(),
    )
}

fn check_encoding(config: &Config) -> Result<()> {
    if config.encoding.eq_ignore_ascii_case("UTF-8") || config.encoding.eq_ignore_ascii_case("UTF8")
    {
        Ok(())
    } else {
        Err(UmakeError::UnsupportedEncoding(config.encoding.clone()))
    }
}

/// Enumerates every candidate file under `config.folders`, expressed
/// root-relative, in deterministic (folder order, then file-name)
/// order, with duplicates across overlapping folders collapsed.
fn collect_candidates(config: &Config, ext_map: &ExtensionMap) -> Vec<String> {
    let walker = Walker::new(
        &config.root,
        ext_map,
        config.exclude_dirs.clone(),
        config.exclude_files.clone(),
    );

    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();
    for folder in &config.folders {
        let start = if folder.is_absolute() {
            folder.clone()
        } else {
            config.root.join(folder)
        };
        for path in walker.walk_in(&start) {
            let rel = relpath::relative_to(&config.root, &path);
            if seen.insert(rel.clone()) {
                candidates.push(rel);
            }
        }
    }
    candidates
}

/// Runs the full scan → resolve → emit pipeline for `config`. Does not
/// touch `umakeGenerated.txt`, `umakeConfig.json`, or `umakeLog.txt` —
/// the binary decides what to do with [`RunOutcome`], since those are
/// presentation concerns, not pipeline concerns.
pub fn run(config: &Config) -> Result<RunOutcome> {
    check_encoding(config)?;
    let ext_map = build_extension_map(config);
    let targets = config.target_pairs()?;

    let cache_path = config.root.join(cache::CACHE_FILE_NAME);
    let cache = if config.no_cache {
        Cache::new()
    } else {
        Cache::load(&cache_path)
    };

    let mut candidates = collect_candidates(config, &ext_map);
    let mut seen: std::collections::HashSet<String> = candidates.iter().cloned().collect();
    for (_, source) in &targets {
        if seen.insert(source.clone()) {
            candidates.push(source.clone());
        }
    }

    let scan_outcome = driver::scan_all(&config.root, &candidates, &ext_map, &cache)?;

    let mut closures: OrderedMap<Closure> = OrderedMap::new();
    let mut resolver = Resolver::new(&scan_outcome.records, &scan_outcome.index);
    for path in scan_outcome.records.keys() {
        let closure = resolver.closure_of(path)?;
        closures.insert(path.clone(), closure);
    }

    let emit_targets: Vec<Target> = targets
        .into_iter()
        .map(|(name, source)| Target { name, source })
        .collect();

    let manifest = emitter::emit(
        &emit_targets,
        &scan_outcome.records,
        &scan_outcome.index,
        &closures,
        !config.no_auto_obj,
    )?;
    let missing = resolver.missing;
    drop(resolver);

    Ok(RunOutcome {
        manifest,
        missing,
        cache: Cache::from(scan_outcome.records),
        log_lines: scan_outcome.log_lines,
    })
}
