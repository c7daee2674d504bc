//! Error types shared by every component of the pipeline.
//!
//! There is no per-component exception hierarchy: every fallible
//! function returns `Result<T, UmakeError>`, and the binary is the one
//! place that decides whether a given variant is fatal (print, delete
//! the cache, exit non-zero) or merely collected and reported in bulk
//! (`MissingModule`).

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, UmakeError>;

/// Failures the lexical scanner can report for a single file, before
/// the offending file's path is folded in by the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ScanError {
    #[error("malformed #include directive")]
    MalformedInclude,

    #[error("unterminated {kind} literal")]
    UnterminatedLiteral { kind: &'static str },

    #[error("{kind} literal contains an unescaped newline")]
    MultilineLiteral { kind: &'static str },

    #[error("malformed import spelling '{spelling}'")]
    MalformedImport { spelling: String },

    #[error("partition import ':{suffix}' outside a module interface or implementation unit")]
    PartitionWithoutUnit { suffix: String },

    #[error("'{keyword}' directive has no terminating ';'")]
    UnterminatedDirective { keyword: &'static str },

    #[error("module '{name}' declared more than once in the same file")]
    DuplicateModuleDeclaration { name: String },

    #[error("two markers matched at the same position")]
    AmbiguousMarker,
}

/// The unified error type for the whole pipeline.
#[derive(Debug, thiserror::Error)]
pub enum UmakeError {
    #[error("{path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("referenced file does not exist: {}", .0.display())]
    FileMissing(PathBuf),

    #[error(
        "module '{name}' is already provided by {}; duplicate declaration in {}",
        .existing.display(), .duplicate.display()
    )]
    DuplicateProvide {
        name: String,
        existing: PathBuf,
        duplicate: PathBuf,
    },

    #[error(
        "module '{name}' is already implemented by {}; duplicate declaration in {}",
        .existing.display(), .duplicate.display()
    )]
    DuplicateImplement {
        name: String,
        existing: PathBuf,
        duplicate: PathBuf,
    },

    #[error("cyclic dependency: re-entered {} while still resolving it", .0.display())]
    CyclicDependency(PathBuf),

    #[error("cyclic imports detected among: {cycle}")]
    CyclicImports { cycle: String },

    #[error("unsupported source encoding '{0}' (only UTF-8 is supported)")]
    UnsupportedEncoding(String),

    #[error("target list must contain an even number of entries (alternating name/source pairs)")]
    OddTargetCount,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl UmakeError {
    pub fn scan(path: impl Into<PathBuf>, source: ScanError) -> Self {
        Self::Scan {
            path: path.into(),
            source,
        }
    }

    pub fn cyclic_imports(files: &[PathBuf]) -> Self {
        let cycle = files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::CyclicImports { cycle }
    }
}
