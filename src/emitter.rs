//! Component G: the Topological Emitter.
//!
//! Emits one manifest record per required file, in an order where
//! every dependency precedes its dependents, detecting any remaining
//! cycle as a batch rather than one file at a time.

use crate::error::{Result, UmakeError};
use crate::index::ModuleIndex;
use crate::ordered::{OrderedMap, OrderedSet};
use crate::record::DirectDependencyRecord;
use crate::relpath;
use crate::resolver::Closure;
use std::path::PathBuf;

pub struct Target {
    pub name: String,
    pub source: String,
}

pub fn build_pending_set(
    targets: &[Target],
    index: &ModuleIndex,
    closures: &OrderedMap<Closure>,
    auto_object: bool,
) -> OrderedSet {
    let mut pending = OrderedSet::new();
    for target in targets {
        pending.insert(target.source.clone());
    }
    for name in index.provided_names() {
        if let Some(file) = index.file_providing(name) {
            pending.insert(relpath::normalize(file));
        }
    }
    for name in index.implemented_names() {
        if let Some(file) = index.file_implementing(name) {
            pending.insert(relpath::normalize(file));
        }
    }

    if auto_object {
        let mut frontier: Vec<String> = pending.iter().cloned().collect();
        let mut i = 0;
        while i < frontier.len() {
            let file = frontier[i].clone();
            i += 1;
            let Some(closure) = closures.get(&file) else {
                continue;
            };
            for src in closure.sources.iter() {
                if pending.insert(src.clone()) {
                    frontier.push(src.clone());
                }
            }
        }
    }

    pending
}

fn is_ready(
    file: &str,
    records: &OrderedMap<DirectDependencyRecord>,
    index: &ModuleIndex,
    built: &OrderedSet,
) -> bool {
    let Some(record) = records.get(file) else {
        return true;
    };
    let depends_built = |name: &str| -> bool {
        match index.file_providing(name) {
            Some(provider) => {
                let provider_rel = relpath::normalize(provider);
                provider_rel == file || built.contains(&provider_rel)
            }
            None => true,
        }
    };
    if !record.modules.module.iter().all(|name| depends_built(name)) {
        return false;
    }
    if let Some(implemented) = &record.implement {
        if !depends_built(implemented) {
            return false;
        }
    }
    true
}

fn format_record(
    file: &str,
    records: &OrderedMap<DirectDependencyRecord>,
    index: &ModuleIndex,
    closures: &OrderedMap<Closure>,
    targets_by_source: &OrderedMap<String>,
) -> String {
    let path = std::path::Path::new(file);

    let mut tokens: Vec<String> = if let Some(name) = index.name_provided_by(path) {
        let mut tokens = vec!["MODULE".to_string(), name.to_string(), "SOURCE".to_string(), file.to_string()];
        if index.partitions_of(name).map(|p| !p.is_empty()).unwrap_or(false) {
            tokens.push("IMPLEMENT".to_string());
        }
        tokens
    } else if let Some(target_name) = targets_by_source.get(file) {
        vec!["TARGET".to_string(), target_name.clone(), "SOURCE".to_string(), file.to_string()]
    } else if let Some(name) = index.name_implemented_by(path) {
        vec!["IMPLEMENT".to_string(), name.to_string(), "SOURCE".to_string(), file.to_string()]
    } else {
        vec![
            "OBJECT".to_string(),
            relpath::escape_object_name(file),
            "SOURCE".to_string(),
            file.to_string(),
        ]
    };

    if let Some(closure) = closures.get(file) {
        let depend: Vec<String> = closure
            .sources
            .iter()
            .filter(|src| src.as_str() != file)
            .map(|src| relpath::escape_object_name(src))
            .collect();
        if !depend.is_empty() {
            tokens.push("DEPEND".to_string());
            tokens.extend(depend);
        }
    }

    if let Some(record) = records.get(file) {
        let mut reference = Vec::new();
        for name in record.modules.module.iter() {
            if index.file_providing(name).is_none() {
                continue;
            }
            reference.push(name.clone());
            if let Some(partitions) = index.partitions_of(name) {
                for suffix in partitions.iter() {
                    reference.push(format!("{name}{suffix}"));
                }
            }
        }
        if !reference.is_empty() {
            tokens.push("REFERENCE".to_string());
            tokens.extend(reference);
        }
    }

    tokens.join(" ")
}

/// Emits the full manifest, or a `CyclicImports` error naming every
/// file that could not be placed.
pub fn emit(
    targets: &[Target],
    records: &OrderedMap<DirectDependencyRecord>,
    index: &ModuleIndex,
    closures: &OrderedMap<Closure>,
    auto_object: bool,
) -> Result<String> {
    let pending = build_pending_set(targets, index, closures, auto_object);
    let mut targets_by_source = OrderedMap::new();
    for target in targets {
        targets_by_source.insert(target.source.clone(), target.name.clone());
    }

    let mut built = OrderedSet::new();
    let mut remaining: Vec<String> = pending.iter().cloned().collect();
    let mut lines = Vec::new();

    while !remaining.is_empty() {
        let mut still_pending = Vec::new();
        let mut emitted_any = false;

        for file in &remaining {
            if is_ready(file, records, index, &built) {
                lines.push(format_record(file, records, index, closures, &targets_by_source));
                built.insert(file.clone());
                emitted_any = true;
            } else {
                still_pending.push(file.clone());
            }
        }

        if !emitted_any {
            let stuck: Vec<PathBuf> = still_pending.iter().map(PathBuf::from).collect();
            return Err(UmakeError::cyclic_imports(&stuck));
        }
        remaining = still_pending;
    }

    Ok(lines.join(";\n"))
}
