//! Component D: the Scan Driver.
//!
//! Decides, per candidate file, whether the cached record is still
//! trustworthy or whether the Lexical Scanner must run again, and
//! keeps the Module Index in sync with whichever record wins.

use crate::cache::Cache;
use crate::error::Result;
use crate::extmap::ExtensionMap;
use crate::index::ModuleIndex;
use crate::ordered::OrderedMap;
use crate::record::DirectDependencyRecord;
use crate::scan;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct ScanOutcome {
    pub records: OrderedMap<DirectDependencyRecord>,
    pub index: ModuleIndex,
    /// One line per decision, ready to append to `umakeLog.txt`.
    pub log_lines: Vec<String>,
}

/// Runs the driver over every candidate path, consulting (and
/// extending) `cache` as it goes. `cache` is left holding only the
/// records actually produced or reused this run.
pub fn scan_all(
    root: &Path,
    rel_paths: &[String],
    ext_map: &ExtensionMap,
    cache: &Cache,
) -> Result<ScanOutcome> {
    let mut records = OrderedMap::new();
    let mut index = ModuleIndex::new();
    let mut log_lines = Vec::new();

    for rel_path in rel_paths {
        let mtime = file_mtime_secs(&root.join(rel_path))?;
        let record = match cache.get(rel_path) {
            Some(cached) if cached.time > mtime => cached.clone(),
            Some(cached) => {
                log_lines.push(format!("{} < {mtime}, \"{rel_path}\"", cached.time));
                scan::scan_file(root, rel_path, ext_map, now_secs())?
            }
            None => {
                log_lines.push(format!("Missed, \"{rel_path}\""));
                scan::scan_file(root, rel_path, ext_map, now_secs())?
            }
        };

        index.register_record(Path::new(rel_path.as_str()), &record)?;
        records.insert(rel_path.clone(), record);
    }

    Ok(ScanOutcome {
        records,
        index,
        log_lines,
    })
}

fn file_mtime_secs(path: &Path) -> Result<f64> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;
    Ok(duration_since_epoch(mtime))
}

fn now_secs() -> f64 {
    duration_since_epoch(SystemTime::now())
}

fn duration_since_epoch(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
