// Static scan of every tracing:: call in src/ for user-supplied text.
// Query text, triage slots, prompts and replies may contain health details;
// only intent names, dispatch paths, categories and error kinds are logged.

use std::fs;
use std::path::Path;

/// Field names or interpolations that MUST NOT appear in tracing macro arguments.
const QUERY_PATTERNS: &[&str] = &[
    "query_text",
    "%query",
    "?query",
    "query =",
    "req.symptom",
    "req.severity",
    "req.duration",
    "%symptom",
    "symptom =",
    "%severity",
    "%duration",
    "knowledge_answer",
    "%answer",
    "?answer",
    "%prompt",
    "?prompt",
    "prompt =",
    "%response",
    "%text",
    "?text",
    "fulfillment_text",
];

const MACROS: &[&str] = &[
    "tracing::info!",
    "tracing::warn!",
    "tracing::error!",
    "tracing::debug!",
    "tracing::trace!",
];

/// (file, 1-based line, joined call text, matched pattern)
type Violation = (String, usize, String, String);

#[test]
fn no_query_text_in_tracing_calls() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    assert!(src_dir.exists(), "Source directory not found: {}", src_dir.display());

    let mut violations = Vec::new();
    scan_directory(&src_dir, &src_dir, &mut violations);

    if !violations.is_empty() {
        let report = violations
            .iter()
            .map(|(file, line_num, call, pattern)| {
                format!("  {file}:{line_num}: found '{pattern}' in: {call}")
            })
            .collect::<Vec<_>>()
            .join("\n");
        panic!(
            "Query audit failed: {} violation(s) in tracing calls:\n{report}\n\n\
             Log the intent name or dispatch path instead of user text.",
            violations.len()
        );
    }
}

#[test]
fn scanner_detects_known_violation() {
    let source = r#"
        if x {
            tracing::info!(
                intent = %req.intent_name,
                query = %req.query_text,
                "handled"
            );
        }
    "#;
    let found = scan_source("synthetic.rs", source);
    assert!(!found.is_empty());
    assert_eq!(found[0].1, 3);
}

#[test]
fn scanner_finds_calls_mid_line() {
    let source = r#"Ok(Err(e)) => tracing::warn!(symptom = %s, "x"),"#;
    assert_eq!(scan_source("synthetic.rs", source).len(), 1);
}

#[test]
fn scanner_passes_clean_tracing() {
    let source = r#"tracing::info!(intent = %req.intent_name, path = %out.path, "Webhook fulfilled");"#;
    assert!(scan_source("synthetic.rs", source).is_empty());
}

fn scan_directory(root: &Path, dir: &Path, violations: &mut Vec<Violation>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_directory(root, &path, violations);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            // This file lists the patterns themselves.
            if path.file_name().is_some_and(|n| n == "query_audit.rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let relative = path.strip_prefix(root).unwrap_or(&path).display().to_string();
            violations.extend(scan_source(&relative, &content));
        }
    }
}

fn scan_source(file: &str, content: &str) -> Vec<Violation> {
    let lines: Vec<&str> = content.lines().collect();
    let mut violations = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(start) = MACROS.iter().filter_map(|m| lines[i].find(m)).min() else {
            i += 1;
            continue;
        };

        // Join the call until its parentheses balance.
        let mut call = lines[i][start..].trim().to_string();
        let mut depth = paren_delta(&call);
        let mut j = i + 1;
        while depth > 0 && j < lines.len() {
            let next = lines[j].trim();
            call.push(' ');
            call.push_str(next);
            depth += paren_delta(next);
            j += 1;
        }

        for pattern in QUERY_PATTERNS {
            if call.contains(pattern) {
                violations.push((file.to_string(), i + 1, call.clone(), pattern.to_string()));
            }
        }
        i = j;
    }

    violations
}

fn paren_delta(s: &str) -> i32 {
    s.chars().fold(0, |d, ch| match ch {
        '(' => d + 1,
        ')' => d - 1,
        _ => d,
    })
}
