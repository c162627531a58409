//! Identifier list loading

use std::path::Path;

use anyhow::Context;

/// Load newline-separated identifiers, dropping blank lines
pub fn load_pids(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let pids = parse_pids(&content);
    log::info!("{}: {} identifiers loaded", path.display(), pids.len());
    Ok(pids)
}

fn parse_pids(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
