//! Build script for dietcare
//!
//! Bumps a local build counter and embeds it, with a UTC timestamp, for
//! the status tool and startup banner.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

fn next_build_number(path: &Path) -> u64 {
    let current = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    current + 1
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let path = Path::new(BUILD_NUMBER_FILE);
    let build_number = next_build_number(path);
    fs::write(path, build_number.to_string()).expect("Failed to write build number file");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=DIETCARE_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=DIETCARE_BUILD_TIMESTAMP={}", timestamp);
}
