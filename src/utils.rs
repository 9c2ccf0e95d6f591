use std::io::{self, Write};

use anyhow::Context;
use git_version::git_version;
use serde::Serialize;

pub fn version() -> String {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        git_version!(fallback = "unknown commit"),
    )
}

/// Writes `value` to stdout as a single line of JSON.
pub fn print_json_line(value: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).context("error serializing to JSON")?;
    writeln!(stdout).context("error writing to stdout")?;
    Ok(())
}
