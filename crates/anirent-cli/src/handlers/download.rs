//! `anirent download` - admit one result, follow its events, move the file.

use std::path::{Path, PathBuf};

use anirent_core::{EventPayload, StructuredResult, plex_file_name};
use anyhow::{Result, bail};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::bootstrap::CliContext;
use crate::presentation::DownloadBar;
use crate::utils::{move_content, read_result};

/// Download the result given in `source` into `dir`.
pub async fn execute(ctx: &CliContext, source: &str, dir: &Path, plex: bool) -> Result<()> {
    let target = read_result(source)?;

    let interrupted = CancellationToken::new();
    tokio::spawn({
        let interrupted = interrupted.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.cancel();
            }
        }
    });

    let ticket = ctx.service.download(target.clone(), &interrupted).await?;
    tracing::info!(
        target: "anirent.download",
        subscription_id = %ticket.id,
        "download submitted and subscribing to events"
    );
    let mut events = ctx.service.subscribe(&ticket.id)?;

    let bar = DownloadBar::new();
    loop {
        let event = tokio::select! {
            biased;

            () = interrupted.cancelled() => {
                bar.abandon("interrupted");
                bail!("download interrupted");
            }
            event = events.next() => event,
        };

        let Some(event) = event else {
            bar.abandon("stopped");
            bail!("event stream ended before the download finished");
        };

        match event.payload {
            EventPayload::Started {
                total_bytes,
                location,
                ..
            } => bar.start(total_bytes, &location),
            EventPayload::Progress {
                downloaded_bytes,
                total_bytes,
                ..
            } => bar.update(downloaded_bytes, total_bytes),
            EventPayload::Completed { location, .. } => {
                bar.finish();
                let from = PathBuf::from(location);
                let to = destination(dir, &from, &target, plex);
                move_content(&from, &to).await?;
                println!("{}", to.display());
                return Ok(());
            }
            EventPayload::Failure { message } => {
                bar.abandon("failed");
                bail!("download failed: {message}");
            }
        }
    }
}

/// Final path of the content: the Plex name, or the original file name.
fn destination(dir: &Path, downloaded: &Path, target: &StructuredResult, plex: bool) -> PathBuf {
    if plex {
        return dir.join(plex_file_name(target));
    }
    match downloaded.file_name() {
        Some(name) => dir.join(name),
        None => dir.join(plex_file_name(target)),
    }
}
