//! Component H: the Extension Mapper.
//!
//! Holds the three extension sets the walker and scanner both consult:
//! module interface extensions, standalone header/source extensions,
//! and header→source pairs used for auto-object inference.

use std::path::Path;

#[derive(Debug, Clone)]
pub struct ExtensionMap {
    module_exts: Vec<String>,
    header_only_exts: Vec<String>,
    source_only_exts: Vec<String>,
    header_to_source: Vec<(String, String)>,
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self {
            module_exts: vec![".ixx".into(), ".mpp".into(), ".cppm".into()],
            header_only_exts: Vec::new(),
            source_only_exts: Vec::new(),
            header_to_source: vec![
                (".hh".into(), ".cc".into()),
                (".hpp".into(), ".cpp".into()),
                (".h".into(), ".c".into()),
            ],
        }
    }
}

impl ExtensionMap {
    pub fn new(
        module_exts: Vec<String>,
        header_only_exts: Vec<String>,
        source_only_exts: Vec<String>,
        header_to_source: Vec<(String, String)>,
    ) -> Self {
        Self {
            module_exts,
            header_only_exts,
            source_only_exts,
            header_to_source,
        }
    }

    pub fn is_module_interface_ext(&self, ext: &str) -> bool {
        self.module_exts.iter().any(|e| e == ext)
    }

    /// A file is a walk candidate when its extension is a module
    /// interface extension, a header/source-only extension, or either
    /// side of a header↔source pair.
    pub fn is_candidate_ext(&self, ext: &str) -> bool {
        self.is_module_interface_ext(ext)
            || self.header_only_exts.iter().any(|e| e == ext)
            || self.source_only_exts.iter().any(|e| e == ext)
            || self
                .header_to_source
                .iter()
                .any(|(h, s)| h == ext || s == ext)
    }

    /// If `rel_path`'s extension is the header side of a known pair,
    /// returns the root-relative path of its sibling source file, but
    /// only if that sibling is a candidate that actually needs to
    /// exist on disk — existence is checked by the caller, since this
    /// mapper has no filesystem access.
    pub fn sibling_source_candidate(&self, rel_path: &str) -> Option<String> {
        let path = Path::new(rel_path);
        let ext = format!(".{}", path.extension()?.to_str()?);
        let source_ext = self
            .header_to_source
            .iter()
            .find(|(h, _)| h == &ext)
            .map(|(_, s)| s.clone())?;
        let stem = path.with_extension(source_ext.trim_start_matches('.'));
        Some(stem.to_string_lossy().replace('\\', "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pairs_match_the_reference_cli() {
        let map = ExtensionMap::default();
        assert!(map.is_module_interface_ext(".ixx"));
        assert!(map.is_candidate_ext(".hpp"));
        assert!(map.is_candidate_ext(".cpp"));
        assert!(!map.is_candidate_ext(".rs"));
    }

    #[test]
    fn sibling_source_candidate_swaps_extension() {
        let map = ExtensionMap::default();
        assert_eq!(
            map.sibling_source_candidate("src/foo.hpp").as_deref(),
            Some("src/foo.cpp")
        );
        assert_eq!(map.sibling_source_candidate("src/foo.ixx"), None);
    }
}
