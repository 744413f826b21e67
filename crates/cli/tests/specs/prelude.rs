//! Shared helpers for CLI specs

use assert_cmd::Command;
use std::path::PathBuf;

/// The berth binary with logging silenced
pub fn berth() -> Command {
    let mut cmd = Command::cargo_bin("berth").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

/// Path to a bundled scenario file
pub fn scenario(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name)
}

/// Stdout of a finished command as a string
pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}
