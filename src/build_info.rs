//! Version and build stamp, as written by `build.rs`

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUILD_TIMESTAMP: &str = match option_env!("DIETCARE_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Build counter; 0 when the stamp is missing or garbled
pub fn build_number() -> u64 {
    parse_build_number(option_env!("DIETCARE_BUILD_NUMBER"))
}

fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

pub fn print_startup_banner() {
    eprintln!(
        "dietcare {} (build {}, {})",
        VERSION,
        build_number(),
        BUILD_TIMESTAMP
    );
}
