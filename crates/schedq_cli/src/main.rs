//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `schedq_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("schedq_core ping={}", schedq_core::ping());
    println!("schedq_core version={}", schedq_core::core_version());
}
