//! Component E: the Module Index.
//!
//! Owns the bidirectional `module name -> declaring file` maps that
//! make the interface/implementation split and partition expansion
//! possible, and enforces that `provide`/`implement` are injective: no
//! two files may provide (or implement) the same name.

use crate::error::{Result, UmakeError};
use crate::ordered::{OrderedMap, OrderedSet};
use crate::record::{primary_of, DirectDependencyRecord};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ModuleIndex {
    provided_by: OrderedMap<PathBuf>,
    implemented_by: OrderedMap<PathBuf>,
    partitions_by_primary: OrderedMap<OrderedSet>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_provide(&mut self, name: &str, file: &Path) -> Result<()> {
        if let Some(existing) = self.provided_by.get(name) {
            if existing != file {
                return Err(UmakeError::DuplicateProvide {
                    name: name.to_string(),
                    existing: existing.clone(),
                    duplicate: file.to_path_buf(),
                });
            }
            return Ok(());
        }
        self.provided_by.insert(name, file.to_path_buf());
        Ok(())
    }

    pub fn register_implement(&mut self, name: &str, file: &Path) -> Result<()> {
        if let Some(existing) = self.implemented_by.get(name) {
            if existing != file {
                return Err(UmakeError::DuplicateImplement {
                    name: name.to_string(),
                    existing: existing.clone(),
                    duplicate: file.to_path_buf(),
                });
            }
            return Ok(());
        }
        self.implemented_by.insert(name, file.to_path_buf());
        Ok(())
    }

    /// Registers `record`'s own declaration (if any) and, for
    /// declaring files, derives any partitions it exposes by scanning
    /// its own `modules.module` set for entries of the shape
    /// `primary:suffix`. The cache schema has no dedicated field for
    /// declared partitions, so this is how the index recovers them
    /// uniformly for freshly-scanned and cache-loaded records alike.
    pub fn register_record(&mut self, file: &Path, record: &DirectDependencyRecord) -> Result<()> {
        if let Some(name) = &record.provide {
            self.register_provide(name, file)?;
        }
        if let Some(name) = &record.implement {
            self.register_implement(name, file)?;
        }
        if let Some(primary) = record.own_primary_name().map(primary_of) {
            let prefix = format!("{primary}:");
            // Suffixes retain their leading `:`, per the normative
            // `partitionsByPrimary` shape.
            let suffixes: Vec<String> = record
                .modules
                .module
                .iter()
                .filter(|module| module.starts_with(&prefix))
                .map(|module| module[primary.len()..].to_string())
                .collect();
            for suffix in suffixes {
                self.partitions_by_primary_mut(primary).insert(suffix);
            }
        }
        Ok(())
    }

    fn partitions_by_primary_mut(&mut self, primary: &str) -> &mut OrderedSet {
        if !self.partitions_by_primary.contains_key(primary) {
            self.partitions_by_primary.insert(primary, OrderedSet::new());
        }
        self.partitions_by_primary
            .get_mut(primary)
            .expect("just inserted")
    }

    pub fn file_providing(&self, name: &str) -> Option<&Path> {
        self.provided_by.get(name).map(PathBuf::as_path)
    }

    pub fn file_implementing(&self, name: &str) -> Option<&Path> {
        self.implemented_by.get(name).map(PathBuf::as_path)
    }

    pub fn is_declared(&self, file: &Path) -> bool {
        self.provided_by.iter().any(|(_, f)| f == file)
            || self.implemented_by.iter().any(|(_, f)| f == file)
    }

    /// Every declared partition suffix of `primary`, in discovery order.
    pub fn partitions_of(&self, primary: &str) -> Option<&OrderedSet> {
        self.partitions_by_primary.get(primary)
    }

    /// Module names in registration order, for the emitter's provider pass.
    pub fn provided_names(&self) -> impl Iterator<Item = &String> {
        self.provided_by.keys()
    }

    /// Module names in registration order, for the emitter's implementer pass.
    pub fn implemented_names(&self) -> impl Iterator<Item = &String> {
        self.implemented_by.keys()
    }

    /// The name `file` provides, if it provides one.
    pub fn name_provided_by(&self, file: &Path) -> Option<&str> {
        self.provided_by
            .iter()
            .find(|(_, f)| f.as_path() == file)
            .map(|(name, _)| name.as_str())
    }

    /// The name `file` implements, if it implements one.
    pub fn name_implemented_by(&self, file: &Path) -> Option<&str> {
        self.implemented_by
            .iter()
            .find(|(_, f)| f.as_path() == file)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DirectDependencyRecord;
    use std::path::PathBuf;

    #[test]
    fn duplicate_provide_is_rejected_unless_same_file() {
        let mut index = ModuleIndex::new();
        index
            .register_provide("a", Path::new("a.ixx"))
            .unwrap();
        assert!(index.register_provide("a", Path::new("a.ixx")).is_ok());
        let err = index
            .register_provide("a", Path::new("other.ixx"))
            .unwrap_err();
        assert!(matches!(err, UmakeError::DuplicateProvide { .. }));
    }

    #[test]
    fn partitions_are_derived_from_modules_set() {
        let mut record = DirectDependencyRecord::new(0.0);
        record.provide = Some("a".into());
        record.modules.module.insert("a:p");
        record.modules.module.insert("a:q");
        record.modules.module.insert("other");

        let mut index = ModuleIndex::new();
        index
            .register_record(Path::new("a.ixx"), &record)
            .unwrap();

        let partitions = index.partitions_of("a").unwrap();
        assert_eq!(
            partitions.iter().collect::<Vec<_>>(),
            vec![":p", ":q"]
        );
        assert_eq!(
            index.file_providing("a"),
            Some(PathBuf::from("a.ixx").as_path())
        );
    }
}
