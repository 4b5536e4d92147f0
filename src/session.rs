use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};
use tracing::info;

use crate::{
    clip::{run_clip, ClipArtifact, ClipRequest},
    history::{History, HistoryEntry},
    io::find_unused_path,
    outside::{ClipTransformer, SourceFetcher},
    progress::ProgressSink,
    result::{Error, Result},
    types::Metadata,
};

/// Per-session state: adapter handles, the bounded clip history, and the
/// explicit one-request-in-flight gate.
///
/// Nothing here persists past the process.
pub struct Session {
    fetcher: Box<dyn SourceFetcher>,
    transformer: Box<dyn ClipTransformer>,
    out_dir: PathBuf,
    history: History,
    in_flight: bool,
}

impl Session {
    pub fn new(
        fetcher: Box<dyn SourceFetcher>,
        transformer: Box<dyn ClipTransformer>,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            out_dir,
            history: History::new(),
            in_flight: false,
        }
    }

    /// Metadata preview for the given URL. Best-effort: a failure here is
    /// reported but never blocks the clip itself.
    pub fn preview(&self, url: &str) -> Result<Metadata> {
        self.fetcher.probe(url.trim())
    }

    /// Run one clip request. A second trigger while one is in flight is
    /// rejected deterministically instead of being queued.
    pub fn clip(
        &mut self,
        request: &ClipRequest,
        on_progress: ProgressSink<'_>,
    ) -> Result<ClipArtifact> {
        if self.in_flight {
            return Err(Error::Validation(
                "A clip is already being processed".to_owned(),
            ));
        }

        self.in_flight = true;
        let res = run_clip(
            request,
            self.fetcher.as_ref(),
            self.transformer.as_ref(),
            on_progress,
        );
        self.in_flight = false;

        let artifact = res?;
        let label = format!(
            "{} ({} to {})",
            artifact.file_name, request.start, request.end
        );
        self.history.push(HistoryEntry::new(label, &artifact));
        Ok(artifact)
    }

    /// Write the artifact into the session's output directory, never
    /// overwriting an existing file.
    pub fn deliver(&self, artifact: &ClipArtifact) -> Result<PathBuf> {
        self.write_bytes(&artifact.bytes, &artifact.file_name)
    }

    /// Re-deliver a past clip from the history, most-recent-first indexing.
    pub fn deliver_from_history(&self, index: usize) -> Result<PathBuf> {
        let entry = self
            .history
            .get(index)
            .ok_or_else(|| Error::Validation(format!("No history entry {}", index + 1)))?;
        self.write_bytes(&entry.bytes, &entry.file_name)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn write_bytes(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf> {
        let path = find_unused_path(&self.out_dir, file_name)?;
        std::fs::write(&path, bytes)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not write '{}'", path.display()))?;
        info!("Saved '{}'", path.display());
        Ok(path)
    }
}
