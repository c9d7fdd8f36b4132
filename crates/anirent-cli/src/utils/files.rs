//! Reading search results from arguments and moving finished downloads.

use std::io::Read;
use std::path::Path;

use anirent_core::StructuredResult;
use anyhow::{Context, Result};

/// Parse one search result from `source`, or from stdin when it is `-`.
pub fn read_result(source: &str) -> Result<StructuredResult> {
    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read search result from stdin")?;
        buf
    } else {
        source.to_string()
    };
    parse_result(&json)
}

fn parse_result(json: &str) -> Result<StructuredResult> {
    serde_json::from_str(json.trim()).context("invalid search result JSON")
}

/// Move downloaded content from `from` to `to`, creating parent directories.
///
/// Falls back to copy-then-remove for files when a rename crosses devices.
pub async fn move_content(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    tracing::debug!(old = %from.display(), new = %to.display(), "Moving download");
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    let meta = tokio::fs::metadata(from)
        .await
        .with_context(|| format!("downloaded content missing at {}", from.display()))?;
    anyhow::ensure!(
        meta.is_file(),
        "cannot move directory {} across devices",
        from.display()
    );
    tokio::fs::copy(from, to)
        .await
        .with_context(|| format!("failed to copy to {}", to.display()))?;
    tokio::fs::remove_file(from)
        .await
        .with_context(|| format!("failed to remove {}", from.display()))?;
    Ok(())
}
