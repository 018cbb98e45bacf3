//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Waiting is done on
//! I/O, on a cancellation token, or with `tokio::time::timeout`.
//! **Exceptions**: test code

use architectural_enforcement::scan;

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(&["professor/core/src", "professor/cli/src"], |_, code| {
        code.contains("::sleep(") || code.contains(".sleep(")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE waiting:");
        eprintln!("  - tokio::time::timeout around network calls");
        eprintln!("  - CancelToken::cancelled().await");
        eprintln!("  - Test code (#[cfg(test)] modules)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}
