//! Architectural Enforcement Integration Tests
//!
//! Source scanners used by the tests in `tests/` to keep `calc-core` a pure
//! library:
//! - No filesystem, network or process I/O outside configuration loading
//! - No printing to the terminal
//! - No environment access outside configuration loading
//!
//! Scanning is line based. Comments are skipped, and everything from the first
//! `#[cfg(test)]` line of a file onward is treated as test code.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden source pattern
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Substring that must not appear in production code
    pub pattern: &'static str,
    /// What the pattern means
    pub description: &'static str,
    /// File names where the pattern is allowed
    pub allowed_in: &'static [&'static str],
}

/// One line that breaks a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Rule description
    pub rule: &'static str,
    /// Offending source line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Rules keeping the calculator core free of side effects
pub const CORE_PURITY_RULES: &[Rule] = &[
    Rule {
        pattern: "std::fs",
        description: "Filesystem I/O",
        allowed_in: &["config.rs"],
    },
    Rule {
        pattern: "std::net",
        description: "Network I/O",
        allowed_in: &[],
    },
    Rule {
        pattern: "std::process",
        description: "Process control",
        allowed_in: &[],
    },
    Rule {
        pattern: "std::env",
        description: "Environment access",
        allowed_in: &["config.rs"],
    },
    PRINT_RULES[0],
    PRINT_RULES[1],
    PRINT_RULES[2],
    PRINT_RULES[3],
    PRINT_RULES[4],
    Rule {
        pattern: "std::io::stdin",
        description: "Terminal input",
        allowed_in: &[],
    },
];

/// Macros that write to the terminal
pub const PRINT_RULES: &[Rule] = &[
    Rule {
        pattern: "println!",
        description: "Printing to stdout",
        allowed_in: &[],
    },
    Rule {
        pattern: "eprintln!",
        description: "Printing to stderr",
        allowed_in: &[],
    },
    Rule {
        pattern: "print!",
        description: "Printing to stdout",
        allowed_in: &[],
    },
    Rule {
        pattern: "eprint!",
        description: "Printing to stderr",
        allowed_in: &[],
    },
    Rule {
        pattern: "dbg!",
        description: "Debug printing",
        allowed_in: &[],
    },
];

/// Path of a workspace directory, relative to this crate's manifest
#[must_use]
pub fn workspace_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

/// Scan every `.rs` file under `dir` against `rules`
#[must_use]
pub fn scan_directory(dir: &Path, rules: &[Rule]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(path) {
            violations.extend(scan_source(path, &content, rules));
        }
    }

    violations
}

/// Scan one file's source text
#[must_use]
pub fn scan_source(path: &Path, content: &str, rules: &[Rule]) -> Vec<Violation> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut violations = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        let code_part = line.split("//").next().unwrap_or(line);

        for rule in rules {
            if contains_token(code_part, rule.pattern) && !rule.allowed_in.contains(&file_name) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    rule: rule.description,
                    text: trimmed.to_string(),
                });
            }
        }
    }

    violations
}

/// Whether `pattern` occurs in `code` without an identifier character
/// directly before it, so `println!` does not match inside `eprintln!`
fn contains_token(code: &str, pattern: &str) -> bool {
    code.match_indices(pattern).any(|(idx, _)| {
        !matches!(code[..idx].chars().next_back(), Some(c) if c.is_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_source_flags_forbidden_calls() {
        let source = "fn f() {\n    println!(\"hi\");\n}\n";
        let violations = scan_source(Path::new("state.rs"), source, CORE_PURITY_RULES);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].rule, "Printing to stdout");
    }

    #[test]
    fn test_scan_source_respects_allow_list() {
        let source = "let s = std::fs::read_to_string(p);\n";
        assert!(scan_source(Path::new("config.rs"), source, CORE_PURITY_RULES).is_empty());
        assert_eq!(
            scan_source(Path::new("chat.rs"), source, CORE_PURITY_RULES).len(),
            1
        );
    }

    #[test]
    fn test_scan_source_skips_comments_and_tests() {
        let source = "\
// println! in a comment
let x = 1; // std::process here too
#[cfg(test)]
mod tests { fn t() { println!(\"ok\"); } }
";
        assert!(scan_source(Path::new("state.rs"), source, CORE_PURITY_RULES).is_empty());
    }

    #[test]
    fn test_print_macros_reported_once() {
        let source = "\
fn f() {
    eprintln!(\"a\");
    println!(\"b\");
    print!(\"c\");
    writeln!(out, \"d\");
}
";
        let rules: Vec<_> = scan_source(Path::new("state.rs"), source, PRINT_RULES)
            .into_iter()
            .map(|v| (v.line, v.rule))
            .collect();
        assert_eq!(
            rules,
            vec![
                (2, "Printing to stderr"),
                (3, "Printing to stdout"),
                (4, "Printing to stdout"),
            ]
        );
    }

    #[test]
    fn test_contains_token_needs_boundary() {
        assert!(contains_token("x; println!(\"\")", "println!"));
        assert!(!contains_token("eprintln!(\"\")", "println!"));
        assert!(!contains_token("my_dbg!(x)", "dbg!"));
        assert!(contains_token("use std::fs;", "std::fs"));
    }
}
