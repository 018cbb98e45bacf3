//! Integration Test: Frame Clock Is The Only Time Source
//!
//! **Policy**: Animation, avatar, scene and app code derive every time-based
//! value from the `FrameTick` they are handed. Reading the wall clock there
//! makes frames irreproducible and ties motion to the host's frame rate.
//! **Exceptions**: `FrameClock::advance_to` accepts an `Instant` from the host
//! but never reads one itself; test code.

use architectural_enforcement::scan;

const FRAME_DRIVEN: &[&str] = &[
    "professor/core/src/animation",
    "professor/core/src/avatar",
    "professor/core/src/scene",
];

#[test]
fn test_no_wall_clock_in_frame_driven_code() {
    let mut violations = scan(FRAME_DRIVEN, |_, code| {
        code.contains("Instant::now") || code.contains("SystemTime::now") || code.contains("Utc::now")
    });
    violations.extend(scan(&["professor/core/src"], |path, code| {
        path.ends_with("app.rs") && (code.contains("Instant::now") || code.contains("SystemTime::now"))
    }));

    if !violations.is_empty() {
        eprintln!("\n❌ Wall-clock reads found in frame-driven code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use FrameTick::elapsed / FrameTick::scale instead.");
        panic!("\nFound {} wall-clock violation(s).", violations.len());
    }
}

#[test]
fn test_no_unseeded_randomness_in_frame_driven_code() {
    let violations = scan(FRAME_DRIVEN, |_, code| {
        code.contains("thread_rng") || code.contains("from_entropy") || code.contains("rand::random")
    });

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} unseeded RNG use(s); take an `Rng` or a seed instead.",
            violations.len()
        );
    }
}
