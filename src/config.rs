//! Components I/J: the CLI surface and `umakeConfig.json` persistence.
//!
//! The pipeline itself (`lib.rs`) only ever sees a plain [`Config`]
//! value; clap and serde are confined to this module, the way the
//! reference CLI keeps argument parsing and manifest construction in
//! separate layers.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "umakeConfig.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TargetMode {
    /// Print the resolved dependency graph; write nothing durable.
    #[default]
    InfoOnly,
    /// Emit a manifest for the downstream generator.
    Cmake,
    /// Emit a manifest and persist the scan cache alongside it.
    CmakeStore,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "umake", about = "Dependency scanner and build-order planner for C++ headers and modules")]
pub struct Cli {
    /// Alternating `<targetName> <sourcePath>` pairs.
    pub sources: Vec<String>,

    /// Root directory that all relative paths are taken against.
    #[arg(short = 'r', long, default_value = ".")]
    pub root: PathBuf,

    /// Folders to walk (default: root).
    #[arg(short = 'f', long = "folders")]
    pub folders: Vec<PathBuf>,

    /// Output mode.
    #[arg(short = 't', long = "target", value_enum, default_value_t = TargetMode::InfoOnly)]
    pub target: TargetMode,

    /// Module interface extensions.
    #[arg(short = 'M', long = "module", num_args = 1..)]
    pub module_exts: Option<Vec<String>>,

    /// Source text encoding.
    #[arg(short = 'e', long = "encoding", default_value = "UTF-8")]
    pub encoding: String,

    /// Directory exclusions (root-relative, no regex despite the name).
    #[arg(short = 'E', long = "exclude-dirs", visible_alias = "Ed")]
    pub exclude_dirs: Vec<String>,

    /// File exclusions (root-relative, no regex despite the name).
    #[arg(long = "exclude-files", visible_alias = "Ef")]
    pub exclude_files: Vec<String>,

    /// Header-only extensions.
    #[arg(long = "ext-header", visible_alias = "eh")]
    pub ext_header: Vec<String>,

    /// Source-only extensions.
    #[arg(long = "ext-source", visible_alias = "es")]
    pub ext_source: Vec<String>,

    /// Header/source extension pairs, each as `hdr:src`.
    #[arg(long = "ext-header-source", visible_alias = "ehs")]
    pub ext_header_source: Vec<String>,

    /// Disable auto-object inference from header-to-source pairs.
    #[arg(long)]
    pub no_auto_obj: bool,

    /// Disable the cache store.
    #[arg(long)]
    pub no_cache: bool,

    /// Append cache-refresh reasons to `umakeLog.txt`.
    #[arg(long)]
    pub log_update: bool,

    /// Persist the full argument set as JSON at `umakeConfig.json`.
    #[arg(long)]
    pub save_config: bool,

    /// Load the argument set from `umakeConfig.json` before applying overrides.
    #[arg(long)]
    pub load_config: bool,

    /// Increase log verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored terminal output.
    #[arg(long)]
    pub no_color: bool,

    /// Manifest output path for `cmake`/`cmake-store` modes (default `umakeGenerated.txt`, root-relative).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// The pipeline's own view of the argument set, independent of how it
/// was produced (CLI flags, a loaded JSON file, or both merged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: Vec<String>,
    pub root: PathBuf,
    pub folders: Vec<PathBuf>,
    pub target: TargetMode,
    pub module_exts: Vec<String>,
    pub encoding: String,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub ext_header: Vec<String>,
    pub ext_source: Vec<String>,
    pub ext_header_source: Vec<(String, String)>,
    pub no_auto_obj: bool,
    pub no_cache: bool,
    pub log_update: bool,
    pub output: Option<PathBuf>,
}

pub const DEFAULT_MANIFEST_NAME: &str = "umakeGenerated.txt";

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            root: PathBuf::from("."),
            folders: Vec::new(),
            target: TargetMode::InfoOnly,
            module_exts: vec!["ixx".into(), "mpp".into(), "cppm".into()],
            encoding: "UTF-8".into(),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            ext_header: Vec::new(),
            ext_source: Vec::new(),
            ext_header_source: vec![
                ("hh".into(), "cc".into()),
                ("hpp".into(), "cpp".into()),
                ("h".into(), "c".into()),
            ],
            no_auto_obj: false,
            no_cache: false,
            log_update: false,
            output: None,
        }
    }
}

impl Config {
    /// Builds a config from parsed CLI flags, overlaying them on a
    /// config loaded from disk when `--load-config` was given. Only
    /// fields whose CLI value differs from the flag's own default are
    /// considered explicit overrides, mirroring the reference CLI's
    /// "only overlay fields still at default" merge.
    pub fn from_cli(cli: &Cli) -> crate::error::Result<Self> {
        let mut config = if cli.load_config {
            Self::load(&cli.root.join(CONFIG_FILE_NAME)).unwrap_or_default()
        } else {
            Self::default()
        };

        if !cli.sources.is_empty() {
            config.sources = cli.sources.clone();
        }
        if cli.root != PathBuf::from(".") {
            config.root = cli.root.clone();
        }
        if !cli.folders.is_empty() {
            config.folders = cli.folders.clone();
        }
        if cli.target != TargetMode::InfoOnly {
            config.target = cli.target;
        }
        if let Some(exts) = &cli.module_exts {
            config.module_exts = exts.clone();
        }
        if cli.encoding != "UTF-8" {
            config.encoding = cli.encoding.clone();
        }
        if !cli.exclude_dirs.is_empty() {
            config.exclude_dirs = cli.exclude_dirs.clone();
        }
        if !cli.exclude_files.is_empty() {
            config.exclude_files = cli.exclude_files.clone();
        }
        if !cli.ext_header.is_empty() {
            config.ext_header = cli.ext_header.clone();
        }
        if !cli.ext_source.is_empty() {
            config.ext_source = cli.ext_source.clone();
        }
        if !cli.ext_header_source.is_empty() {
            config.ext_header_source = cli
                .ext_header_source
                .iter()
                .filter_map(|pair| pair.split_once(':'))
                .map(|(h, s)| (h.to_string(), s.to_string()))
                .collect();
        }
        config.no_auto_obj |= cli.no_auto_obj;
        config.no_cache |= cli.no_cache;
        config.log_update |= cli.log_update;
        if cli.output.is_some() {
            config.output = cli.output.clone();
        }

        if config.folders.is_empty() {
            config.folders.push(config.root.clone());
        }

        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Target/source pairs parsed from the alternating `sources` list.
    pub fn target_pairs(&self) -> crate::error::Result<Vec<(String, String)>> {
        if self.sources.len() % 2 != 0 {
            return Err(crate::error::UmakeError::OddTargetCount);
        }
        Ok(self
            .sources
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.module_exts, vec!["ixx", "mpp", "cppm"]);
        assert_eq!(
            config.ext_header_source,
            vec![
                ("hh".to_string(), "cc".to_string()),
                ("hpp".to_string(), "cpp".to_string()),
                ("h".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = Config::default();
        config.no_cache = true;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.no_cache);
    }

    #[test]
    fn target_pairs_rejects_odd_count() {
        let mut config = Config::default();
        config.sources = vec!["onlyTarget".to_string()];
        assert!(config.target_pairs().is_err());
    }
}
