//! Integration Test: Calculator Core Purity
//!
//! **Policy**: `calc-core` is a library of pure state transitions. Only the
//! configuration loader may read files or the environment, and nothing may
//! print. Front ends own all terminal and network I/O.

use architectural_enforcement::{
    scan_directory, workspace_path, Rule, CORE_PURITY_RULES, PRINT_RULES,
};

#[test]
fn test_core_has_no_side_effects() {
    let core_src = workspace_path("calc/core/src");
    assert!(
        core_src.exists(),
        "calc-core sources not found at {}",
        core_src.display()
    );

    let violations = scan_directory(&core_src, CORE_PURITY_RULES);

    if !violations.is_empty() {
        eprintln!("\n❌ Side effects found in calc-core production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ALLOWED:");
        eprintln!("  - std::fs and std::env in config.rs");
        eprintln!("  - Anything inside #[cfg(test)] modules");
        eprintln!("  - tracing macros for diagnostics");

        panic!(
            "\nFound {} side-effect violation(s) in calc-core.\nMove I/O to a front end.",
            violations.len()
        );
    }
}

#[test]
fn test_repl_is_the_only_printer() {
    let terminal_rules: Vec<Rule> = PRINT_RULES
        .iter()
        .copied()
        .chain([
            Rule {
                pattern: "io::stdout",
                description: "Stdout handle",
                allowed_in: &[],
            },
            Rule {
                pattern: "io::stderr",
                description: "Stderr handle",
                allowed_in: &[],
            },
        ])
        .collect();

    let repl_src = workspace_path("calc/repl/src");
    let (in_repl, elsewhere): (Vec<_>, Vec<_>) =
        scan_directory(&workspace_path("calc"), &terminal_rules)
            .into_iter()
            .partition(|v| v.path.starts_with(&repl_src));

    assert!(
        !in_repl.is_empty(),
        "expected calc-repl to write to the terminal"
    );
    if !elsewhere.is_empty() {
        for violation in &elsewhere {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} terminal write(s) outside calc-repl.",
            elsewhere.len()
        );
    }
}
