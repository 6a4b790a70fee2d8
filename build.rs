// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

/// Version string for `--version`
///
/// `QUICKSHOT_VERSION` wins when packaging sets it. Otherwise `git describe`
/// gives `0.1.0` on a tag, `0.1.0-3-gabc1234` past one, and a `-dirty`
/// suffix for uncommitted changes. Outside a checkout the crate version is
/// used.
fn version() -> String {
    if let Ok(version) = std::env::var("QUICKSHOT_VERSION") {
        return version;
    }

    Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty", "--match", "v*"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|described| !described.is_empty())
        .map(|described| described.trim_start_matches('v').to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}

fn main() {
    println!("cargo::rerun-if-env-changed=QUICKSHOT_VERSION");
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");

    println!("cargo::rustc-env=GIT_VERSION={}", version());
}
