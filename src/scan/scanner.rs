//! The marker-search loop at the heart of the scanner.
//!
//! The buffer is scanned for the next occurrence of any of eight
//! marker strings; whichever occurs earliest determines the next
//! action, and the cursor is advanced past whatever that action
//! consumed. Two markers matching at the exact same position is
//! treated as ambiguous rather than silently picking one.

use crate::error::{Result, ScanError, UmakeError};
use crate::extmap::ExtensionMap;
use crate::record::{is_word_char, primary_of, DirectDependencyRecord};
use std::path::Path;

const MARKERS: [&str; 8] = ["#include", "\"", "'", "//", "/*", "import", "export", "module"];

/// Reads `root.join(rel_path)`, scans it, and seeds `sources` from the
/// Extension Mapper's sibling-source lookup.
pub fn scan_file(
    root: &Path,
    rel_path: &str,
    ext_map: &ExtensionMap,
    time: f64,
) -> Result<DirectDependencyRecord> {
    let full_path = root.join(rel_path);
    let content = std::fs::read_to_string(&full_path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            UmakeError::FileMissing(full_path.clone())
        } else {
            UmakeError::Io(err)
        }
    })?;

    let mut record =
        scan_str(&content).map_err(|source| UmakeError::scan(rel_path, source))?;
    record.time = time;

    if let Some(sibling) = ext_map.sibling_source_candidate(rel_path) {
        if root.join(&sibling).is_file() {
            record.sources.sources.insert(sibling);
        }
    }

    Ok(record)
}

/// Scans already-loaded text into a direct dependency record. `time`
/// is left at `0.0`; callers that care about freshness set it.
pub fn scan_str(text: &str) -> std::result::Result<DirectDependencyRecord, ScanError> {
    let mut record = DirectDependencyRecord::new(0.0);
    let mut pos = 0usize;

    while pos < text.len() {
        match find_next_marker(text, pos)? {
            None => break,
            Some((marker_pos, marker)) => {
                pos = apply_marker(text, marker_pos, marker, &mut record)?;
            }
        }
    }

    Ok(record)
}

fn find_next_marker(
    text: &str,
    pos: usize,
) -> std::result::Result<Option<(usize, &'static str)>, ScanError> {
    let mut best: Option<(usize, &'static str)> = None;
    let mut tie = false;

    for marker in MARKERS {
        if let Some(rel) = text[pos..].find(marker) {
            let abs = pos + rel;
            match best {
                None => best = Some((abs, marker)),
                Some((best_pos, _)) if abs < best_pos => {
                    best = Some((abs, marker));
                    tie = false;
                }
                Some((best_pos, _)) if abs == best_pos => tie = true,
                _ => {}
            }
        }
    }

    if tie {
        return Err(ScanError::AmbiguousMarker);
    }
    Ok(best)
}

fn apply_marker(
    text: &str,
    pos: usize,
    marker: &'static str,
    record: &mut DirectDependencyRecord,
) -> std::result::Result<usize, ScanError> {
    match marker {
        "#include" => handle_include(text, pos + marker.len(), record),
        "\"" => handle_string_literal(text, pos),
        "'" => scan_escaped_literal(text, pos, '\'', "character"),
        "//" => Ok(skip_line_comment(text, pos + 2)),
        "/*" => Ok(skip_block_comment(text, pos + 2)),
        "import" => handle_import(text, pos, marker.len(), record),
        "export" => handle_export(text, pos, marker.len(), record),
        "module" => handle_module(text, pos, marker.len(), record),
        _ => unreachable!("exhaustive over MARKERS"),
    }
}

fn skip_ws(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < text.len() && matches!(bytes[pos], b' ' | b'\t' | b'\r' | b'\n') {
        pos += 1;
    }
    pos
}

fn word_boundary_ok(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map(|c| !is_word_char(c))
        .unwrap_or(true);
    let after_ok = text[end..]
        .chars()
        .next()
        .map(|c| !is_word_char(c))
        .unwrap_or(true);
    before_ok && after_ok
}

/// True if `text[pos..]` starts with the whole word `word` (i.e. the
/// match is not itself the prefix of a longer identifier).
fn starts_with_word(text: &str, pos: usize, word: &str) -> bool {
    text[pos..].starts_with(word)
        && text[pos + word.len()..]
            .chars()
            .next()
            .map(|c| !is_word_char(c))
            .unwrap_or(true)
}

fn read_until_semicolon<'a>(
    text: &'a str,
    start: usize,
    keyword: &'static str,
) -> std::result::Result<(&'a str, usize), ScanError> {
    let rel = text[start..]
        .find(';')
        .ok_or(ScanError::UnterminatedDirective { keyword })?;
    Ok((&text[start..start + rel], start + rel + 1))
}

fn handle_include(
    text: &str,
    after_marker: usize,
    record: &mut DirectDependencyRecord,
) -> std::result::Result<usize, ScanError> {
    let start = skip_ws(text, after_marker);
    let opener = text[start..]
        .chars()
        .next()
        .ok_or(ScanError::MalformedInclude)?;
    let closer = match opener {
        '<' => '>',
        '"' => '"',
        _ => return Err(ScanError::MalformedInclude),
    };
    let content_start = start + opener.len_utf8();
    let rel = text[content_start..]
        .find(closer)
        .ok_or(ScanError::MalformedInclude)?;
    let spelling = &text[content_start..content_start + rel];
    if opener == '<' {
        record.headers.library.insert(spelling.to_string());
    } else {
        record.headers.local.insert(spelling.to_string());
    }
    Ok(content_start + rel + closer.len_utf8())
}

fn handle_string_literal(
    text: &str,
    quote_pos: usize,
) -> std::result::Result<usize, ScanError> {
    let is_raw = text[..quote_pos].chars().next_back() == Some('R');
    if is_raw {
        scan_raw_string(text, quote_pos)
    } else {
        scan_escaped_literal(text, quote_pos, '"', "string")
    }
}

fn scan_escaped_literal(
    text: &str,
    quote_pos: usize,
    closer: char,
    kind: &'static str,
) -> std::result::Result<usize, ScanError> {
    let start = quote_pos + 1;
    let mut escape = false;
    for (idx, c) in text[start..].char_indices() {
        if c == '\n' || c == '\r' {
            return Err(ScanError::MultilineLiteral { kind });
        }
        if escape {
            escape = false;
            continue;
        }
        if c == '\\' {
            escape = true;
            continue;
        }
        if c == closer {
            return Ok(start + idx + c.len_utf8());
        }
    }
    Err(ScanError::UnterminatedLiteral { kind })
}

fn scan_raw_string(text: &str, quote_pos: usize) -> std::result::Result<usize, ScanError> {
    let start = quote_pos + 1;
    let paren_rel = text[start..]
        .find('(')
        .ok_or(ScanError::UnterminatedLiteral { kind: "raw string" })?;
    let paren_idx = start + paren_rel;
    let delim = &text[start..paren_idx];
    let closer = format!("){delim}\"");
    let content_start = paren_idx + 1;
    let rel = text[content_start..]
        .find(closer.as_str())
        .ok_or(ScanError::UnterminatedLiteral { kind: "raw string" })?;
    Ok(content_start + rel + closer.len())
}

fn skip_line_comment(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < text.len() {
        let b = bytes[i];
        if b == b'\n' || b == b'\r' {
            let pair = if b == b'\n' { b'\r' } else { b'\n' };
            if i + 1 < text.len() && bytes[i + 1] == pair {
                return i + 2;
            }
            return i + 1;
        }
        i += 1;
    }
    text.len()
}

fn skip_block_comment(text: &str, start: usize) -> usize {
    match text[start..].find("*/") {
        Some(rel) => start + rel + 2,
        None => text.len(),
    }
}

fn is_module_name(spelling: &str) -> bool {
    !spelling.is_empty()
        && spelling
            .chars()
            .all(|c| is_word_char(c) || c == '.' || c == ':')
}

fn handle_import(
    text: &str,
    marker_start: usize,
    marker_len: usize,
    record: &mut DirectDependencyRecord,
) -> std::result::Result<usize, ScanError> {
    let marker_end = marker_start + marker_len;
    if !word_boundary_ok(text, marker_start, marker_end) {
        return Ok(marker_end);
    }
    let ws_end = skip_ws(text, marker_end);
    let (raw, after) = read_until_semicolon(text, ws_end, "import")?;
    let spelling = raw.trim();

    if spelling.len() >= 2 && spelling.starts_with('<') && spelling.ends_with('>') {
        record
            .modules
            .library
            .insert(spelling[1..spelling.len() - 1].to_string());
    } else if spelling.len() >= 2 && spelling.starts_with('"') && spelling.ends_with('"') {
        record
            .modules
            .local
            .insert(spelling[1..spelling.len() - 1].to_string());
    } else if let Some(suffix) = spelling.strip_prefix(':') {
        let owner = record
            .provide
            .as_deref()
            .or(record.implement.as_deref())
            .ok_or_else(|| ScanError::PartitionWithoutUnit {
                suffix: suffix.to_string(),
            })?;
        let primary = primary_of(owner).to_string();
        record.modules.module.insert(format!("{primary}:{suffix}"));
    } else if is_module_name(spelling) {
        record.modules.module.insert(spelling.to_string());
    } else {
        return Err(ScanError::MalformedImport {
            spelling: spelling.to_string(),
        });
    }

    Ok(after)
}

fn handle_export(
    text: &str,
    marker_start: usize,
    marker_len: usize,
    record: &mut DirectDependencyRecord,
) -> std::result::Result<usize, ScanError> {
    let marker_end = marker_start + marker_len;
    if !word_boundary_ok(text, marker_start, marker_end) {
        return Ok(marker_end);
    }
    let ws_end = skip_ws(text, marker_end);

    if starts_with_word(text, ws_end, "module") {
        let after_kw = skip_ws(text, ws_end + "module".len());
        let (raw, after) = read_until_semicolon(text, after_kw, "module")?;
        let name = raw.trim().to_string();
        if let Some(existing) = &record.provide {
            if existing != &name {
                return Err(ScanError::DuplicateModuleDeclaration { name });
            }
        }
        record.provide = Some(name);
        return Ok(after);
    }

    if starts_with_word(text, ws_end, "import") {
        let after_kw = skip_ws(text, ws_end + "import".len());
        let (raw, after) = read_until_semicolon(text, after_kw, "import")?;
        let spelling = raw.trim();
        let suffix = spelling
            .strip_prefix(':')
            .ok_or_else(|| ScanError::MalformedImport {
                spelling: spelling.to_string(),
            })?;
        let provide = record.provide.clone().ok_or_else(|| ScanError::PartitionWithoutUnit {
            suffix: suffix.to_string(),
        })?;
        let primary = primary_of(&provide).to_string();
        record.modules.module.insert(format!("{primary}:{suffix}"));
        return Ok(after);
    }

    // Qualifies a following declaration (e.g. `export class`); nothing
    // to record here.
    Ok(marker_end)
}

fn handle_module(
    text: &str,
    marker_start: usize,
    marker_len: usize,
    record: &mut DirectDependencyRecord,
) -> std::result::Result<usize, ScanError> {
    let marker_end = marker_start + marker_len;
    if !word_boundary_ok(text, marker_start, marker_end) {
        return Ok(marker_end);
    }
    let ws_end = skip_ws(text, marker_end);
    if text[ws_end..].starts_with(';') {
        // Global module fragment opener: `module;`.
        return Ok(ws_end + 1);
    }
    let (raw, after) = read_until_semicolon(text, ws_end, "module")?;
    let name = raw.trim().to_string();
    if name.is_empty() {
        return Ok(after);
    }
    if let Some(existing) = &record.implement {
        if existing != &name {
            return Err(ScanError::DuplicateModuleDeclaration { name });
        }
    }
    record.implement = Some(name);
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_include_directives_are_recorded() {
        let record = scan_str("#include <vector>\n#include \"local.hpp\"\n").unwrap();
        assert!(record.headers.library.contains("vector"));
        assert!(record.headers.local.contains("local.hpp"));
    }

    #[test]
    fn string_and_char_literals_hide_their_contents() {
        let record = scan_str(r#"const char* s = "import evil;"; char c = '"';"#).unwrap();
        assert!(record.modules.module.is_empty());
    }

    #[test]
    fn raw_string_literal_hides_its_contents() {
        let record = scan_str(r#"const char* s = R"xx(import evil;)xx";"#).unwrap();
        assert!(record.modules.module.is_empty());
    }

    #[test]
    fn line_comment_hides_rest_of_line_only() {
        let record = scan_str("// import evil;\nimport real;\n").unwrap();
        assert!(record.modules.module.contains("real"));
        assert!(!record.modules.module.contains("evil"));
    }

    #[test]
    fn block_comment_hides_enclosed_directive() {
        let record = scan_str("/* import evil; */ import real;").unwrap();
        assert!(record.modules.module.contains("real"));
        assert_eq!(record.modules.module.len(), 1);
    }

    #[test]
    fn export_module_sets_provide() {
        let record = scan_str("export module a;").unwrap();
        assert_eq!(record.provide.as_deref(), Some("a"));
    }

    #[test]
    fn bare_module_sets_implement() {
        let record = scan_str("module m;").unwrap();
        assert_eq!(record.implement.as_deref(), Some("m"));
    }

    #[test]
    fn global_module_fragment_opener_is_ignored() {
        let record = scan_str("module;\n#include <cstdio>\nexport module a;").unwrap();
        assert_eq!(record.provide.as_deref(), Some("a"));
        assert_eq!(record.implement, None);
    }

    #[test]
    fn partition_import_is_qualified_by_primary() {
        let record = scan_str("export module a; import :p;").unwrap();
        assert!(record.modules.module.contains("a:p"));
    }

    #[test]
    fn export_import_partition_is_qualified_by_primary() {
        let record = scan_str("export module a; export import :p;").unwrap();
        assert!(record.modules.module.contains("a:p"));
    }

    #[test]
    fn partition_import_without_unit_is_an_error() {
        let err = scan_str("import :p;").unwrap_err();
        assert!(matches!(err, ScanError::PartitionWithoutUnit { .. }));
    }

    #[test]
    fn unterminated_string_literal_is_an_error() {
        let err = scan_str("const char* s = \"oops").unwrap_err();
        assert!(matches!(err, ScanError::UnterminatedLiteral { kind: "string" }));
    }

    #[test]
    fn newline_in_string_literal_is_an_error() {
        let err = scan_str("const char* s = \"oops\n\";").unwrap_err();
        assert!(matches!(err, ScanError::MultilineLiteral { kind: "string" }));
    }

    #[test]
    fn identifier_containing_import_is_not_a_directive() {
        let record = scan_str("int myimportant = 1;").unwrap();
        assert!(record.modules.module.is_empty());
    }

    #[test]
    fn library_and_local_module_imports_are_recorded_but_unrouted() {
        let record = scan_str("import <h>;\nimport \"h2\";\n").unwrap();
        assert!(record.modules.library.contains("h"));
        assert!(record.modules.local.contains("h2"));
    }
}
