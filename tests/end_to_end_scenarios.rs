//! End-to-end scenarios exercising the full scan -> resolve -> emit
//! pipeline against small C++-like fixtures on disk, built the way
//! `tests/module_dependency_test.rs` builds dependency-graph fixtures
//! in the sibling crate, but via `tempfile::TempDir` for filesystem
//! realism since this crate's pipeline is I/O-driven end to end.

use tempfile::tempdir;
use umake::config::{Config, TargetMode};
use umake::error::UmakeError;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn base_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.root = root.to_path_buf();
    config.folders = vec![root.to_path_buf()];
    config
}

/// S1: a primary module importing its own partition emits the
/// partition first, and the primary's record carries a REFERENCE to
/// it.
#[test]
fn s1_partition_precedes_its_primary_and_is_referenced() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ixx", "export module a; import :p;");
    write(dir.path(), "a_p.ixx", "export module a:p;");

    let config = base_config(dir.path());
    let outcome = umake::run(&config).unwrap();

    let records: Vec<&str> = outcome.manifest.split(";\n").collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].starts_with("MODULE a:p SOURCE a_p.ixx"));
    assert!(records[1].starts_with("MODULE a SOURCE a.ixx"));
    assert!(records[1].contains("REFERENCE a:p"));
}

/// S2: a target including a local header and importing a module
/// produces a MODULE record for the interface, then a TARGET record
/// referencing it.
#[test]
fn s2_target_references_its_imported_module() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.cpp", "#include \"h.hpp\"\nimport m;\n");
    write(dir.path(), "h.hpp", "");
    write(dir.path(), "m.ixx", "export module m;");

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "main.cpp".to_string()];

    let outcome = umake::run(&config).unwrap();
    let records: Vec<&str> = outcome.manifest.split(";\n").collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], "MODULE m SOURCE m.ixx");
    assert_eq!(records[1], "TARGET app SOURCE main.cpp REFERENCE m");
}

/// S3: two module interfaces importing each other are reported as a
/// cyclic-imports error naming exactly the two files.
#[test]
fn s3_mutual_module_imports_are_a_cyclic_imports_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ixx", "export module a; import b;");
    write(dir.path(), "b.ixx", "export module b; import a;");

    let config = base_config(dir.path());
    let err = umake::run(&config).unwrap_err();

    match err {
        UmakeError::CyclicImports { cycle } => {
            assert!(cycle.contains("a.ixx"));
            assert!(cycle.contains("b.ixx"));
        }
        UmakeError::CyclicDependency(path) => {
            // The resolver may also catch this cycle during closure
            // computation, depending on traversal order; either
            // diagnostic is a correct report of the same cycle.
            let name = path.to_string_lossy();
            assert!(name == "a.ixx" || name == "b.ixx");
        }
        other => panic!("expected a cyclic-dependency report, got {other:?}"),
    }
}

/// S4: an `import` spelling inside a string literal is not a real
/// import.
#[test]
fn s4_import_inside_string_literal_is_ignored() {
    let dir = tempdir().unwrap();
    write(dir.path(), "x.cpp", "const char* s = \"import evil;\";");

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "x.cpp".to_string()];

    let outcome = umake::run(&config).unwrap();
    assert!(!outcome.manifest.contains("evil"));
}

/// S5: the same, for a raw string literal with a custom delimiter.
#[test]
fn s5_import_inside_raw_string_literal_is_ignored() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "r.cpp",
        "const char* s = R\"xx(import evil;)xx\";",
    );

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "r.cpp".to_string()];

    let outcome = umake::run(&config).unwrap();
    assert!(!outcome.manifest.contains("evil"));
}

/// S6: an implementation unit is emitted after its interface, as an
/// IMPLEMENT record.
#[test]
fn s6_implementation_unit_follows_its_interface() {
    let dir = tempdir().unwrap();
    write(dir.path(), "impl.cpp", "module m;");
    write(dir.path(), "m.ixx", "export module m;");

    let config = base_config(dir.path());
    let outcome = umake::run(&config).unwrap();
    let records: Vec<&str> = outcome.manifest.split(";\n").collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], "MODULE m SOURCE m.ixx");
    assert_eq!(records[1], "IMPLEMENT m SOURCE impl.cpp");
}

#[test]
fn auto_object_inference_pulls_in_companion_source_and_depends_on_it() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.cpp", "#include \"foo.hpp\"\n");
    write(dir.path(), "foo.hpp", "");
    write(dir.path(), "foo.cpp", "");

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "main.cpp".to_string()];

    let outcome = umake::run(&config).unwrap();
    assert!(outcome.manifest.contains("OBJECT foo.cpp SOURCE foo.cpp"));
    assert!(outcome.manifest.contains("DEPEND foo.cpp"));
}

#[test]
fn disabling_auto_object_drops_the_inferred_source() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.cpp", "#include \"foo.hpp\"\n");
    write(dir.path(), "foo.hpp", "");
    write(dir.path(), "foo.cpp", "");

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "main.cpp".to_string()];
    config.no_auto_obj = true;

    let outcome = umake::run(&config).unwrap();
    assert!(!outcome.manifest.contains("OBJECT"));
}

#[test]
fn missing_module_import_is_collected_not_fatal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.cpp", "import ghost;\n");

    let mut config = base_config(dir.path());
    config.sources = vec!["app".to_string(), "main.cpp".to_string()];

    let outcome = umake::run(&config).unwrap();
    assert_eq!(outcome.missing, vec![("main.cpp".to_string(), "ghost".to_string())]);
}

#[test]
fn info_only_is_the_default_target_mode() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ixx", "export module a;");
    let config = base_config(dir.path());
    assert_eq!(config.target, TargetMode::InfoOnly);
    assert!(umake::run(&config).is_ok());
}

#[test]
fn cache_store_round_trip_reuses_scan_results_on_the_second_run() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ixx", "export module a;");

    let mut config = base_config(dir.path());
    config.target = TargetMode::CmakeStore;

    let first = umake::run(&config).unwrap();
    first
        .cache
        .save(&config.root.join(umake::cache::CACHE_FILE_NAME))
        .unwrap();

    let cache_path = config.root.join(umake::cache::CACHE_FILE_NAME);
    let persisted = std::fs::read_to_string(&cache_path).unwrap();
    assert!(persisted.contains("\"a.ixx\""));

    let second = umake::run(&config).unwrap();
    assert_eq!(second.manifest, first.manifest);
}
