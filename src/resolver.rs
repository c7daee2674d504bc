//! Component F: the Transitive Resolver.
//!
//! Computes, per file, the union of every module name and auxiliary
//! source file reachable by following local header includes, module
//! imports, and implementation-to-interface links.

use crate::error::{Result, UmakeError};
use crate::index::ModuleIndex;
use crate::ordered::{OrderedMap, OrderedSet};
use crate::record::DirectDependencyRecord;
use crate::relpath;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Closure {
    pub modules: OrderedSet,
    pub sources: OrderedSet,
}

pub struct Resolver<'a> {
    records: &'a OrderedMap<DirectDependencyRecord>,
    index: &'a ModuleIndex,
    memo: OrderedMap<Closure>,
    stack: Vec<String>,
    pub missing: Vec<(String, String)>,
}

impl<'a> Resolver<'a> {
    pub fn new(records: &'a OrderedMap<DirectDependencyRecord>, index: &'a ModuleIndex) -> Self {
        Self {
            records,
            index,
            memo: OrderedMap::new(),
            stack: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// The transitive closure of `rel_path`, memoized across calls.
    pub fn closure_of(&mut self, rel_path: &str) -> Result<Closure> {
        if let Some(cached) = self.memo.get(rel_path) {
            return Ok(cached.clone());
        }
        if self.stack.iter().any(|p| p == rel_path) {
            return Err(UmakeError::CyclicDependency(PathBuf::from(rel_path)));
        }
        self.stack.push(rel_path.to_string());
        let result = self.compute_closure(rel_path);
        self.stack.pop();

        let acc = result?;
        self.memo.insert(rel_path.to_string(), acc.clone());
        Ok(acc)
    }

    fn compute_closure(&mut self, rel_path: &str) -> Result<Closure> {
        let mut acc = Closure::default();
        let Some(record) = self.records.get(rel_path).cloned() else {
            return Ok(acc);
        };

        acc.modules.union_from(&record.modules.module);

        // 1. local headers, resolved relative to this file's directory.
        let base_dir = relpath::parent_of(rel_path).to_string();
        for header in record.headers.local.iter() {
            let child_path = relpath::join_relative(&base_dir, header);
            if self.records.contains_key(&child_path) {
                let child = self.closure_of(&child_path)?;
                acc.modules.union_from(&child.modules);
                acc.sources.union_from(&child.sources);
            }
        }

        // 2. partition-qualified imports, in declaration order.
        let mut visited = OrderedSet::new();
        for name in record.modules.module.iter() {
            if !name.contains(':') {
                continue;
            }
            visited.insert(name.clone());
            self.merge_module(name, rel_path, &mut acc)?;
        }

        // 3. an implementation unit depends on its own interface.
        if let Some(implemented) = &record.implement {
            self.merge_module(implemented, rel_path, &mut acc)?;
        }

        // 4. remaining non-partition imports.
        for name in record.modules.module.iter() {
            if visited.contains(name) {
                continue;
            }
            self.merge_module(name, rel_path, &mut acc)?;
        }

        acc.sources.union_from(&record.sources.sources);
        Ok(acc)
    }

    fn merge_module(&mut self, name: &str, importer: &str, acc: &mut Closure) -> Result<()> {
        match self.index.file_providing(name) {
            Some(file) => {
                let child_rel = relpath::normalize(file);
                let child = self.closure_of(&child_rel)?;
                acc.modules.union_from(&child.modules);
                acc.sources.union_from(&child.sources);
                Ok(())
            }
            None => {
                self.missing.push((importer.to_string(), name.to_string()));
                Ok(())
            }
        }
    }
}
