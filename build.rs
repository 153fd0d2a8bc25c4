//! Build script for lamco-gaze-cursor
//!
//! Stamps the build date and git commit into the binary's startup banner.

use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        command_output("date", &["+%Y-%m-%d %H:%M:%S"])
    );
    println!(
        "cargo:rustc-env=GIT_HASH={}",
        command_output("git", &["rev-parse", "--short", "HEAD"])
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
}
