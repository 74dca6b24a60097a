use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=TELEMDASH_BUILD_DATE");

    let commit = env::var("GITHUB_SHA")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| run_git(&["rev-parse", "HEAD"]))
        .map(|full| full.chars().take(7).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = env::var("TELEMDASH_BUILD_DATE")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| run_git(&["log", "-1", "--format=%cI"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=TELEMDASH_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=TELEMDASH_BUILD_DATE={build_date}");
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}
