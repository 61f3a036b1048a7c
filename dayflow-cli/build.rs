use std::path::PathBuf;
use std::process::Command;

/// Stamp the short git revision into `DAYFLOW_BUILD_SHA` for `dayflow --version`.
fn main() {
    let workspace = std::env::var("CARGO_MANIFEST_DIR")
        .map(|d| PathBuf::from(d).join(".."))
        .unwrap_or_else(|_| PathBuf::from(".."));

    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());

    let sha = Command::new("git")
        .arg("-C")
        .arg(&workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty());

    println!(
        "cargo:rustc-env=DAYFLOW_BUILD_SHA={}",
        sha.as_deref().unwrap_or("unknown")
    );
}
