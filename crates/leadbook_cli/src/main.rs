//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `leadbook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("leadbook_core ping={}", leadbook_core::ping());
    println!("leadbook_core version={}", leadbook_core::core_version());
}
