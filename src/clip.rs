use std::path::Path;

use miette::{Context, IntoDiagnostic};
use tracing::{debug, info};

use crate::{
    outside::{ClipTransformer, SourceFetcher, SourceMedia},
    progress::ProgressSink,
    result::{Error, Result},
    sanitize::sanitize,
    types::{OutputMode, Timestamp},
};

/// One user action, owned by the orchestrator for the duration of one run.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub url: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub mode: OutputMode,
    /// Raw user label; sanitized by the orchestrator before use.
    pub name: String,
}

impl ClipRequest {
    /// Default base name when the user left the label empty,
    /// e.g. `clip_00-00-10_00-00-20`.
    pub fn default_base_name(&self) -> String {
        format!("clip_{}_{}", self.start.dashed(), self.end.dashed())
    }

    /// Sanitized output file name, extension included.
    pub fn file_name(&self) -> String {
        let base = sanitize(&self.name, &self.default_base_name());
        format!("{base}{}", self.mode.with_dot())
    }
}

/// The produced clip, fully read into memory so the workspace can go away.
#[derive(Debug, Clone)]
pub struct ClipArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Run one clip request to completion.
///
/// Sequences validation, acquisition, container normalization, trimming and
/// artifact read-back. The whole run happens inside a request-scoped
/// temporary directory which is removed on every exit path, success or
/// failure, when the `TempDir` handle drops.
///
/// No retries, no cancellation: once acquisition starts, the request runs
/// to completion or failure.
pub fn run_clip(
    request: &ClipRequest,
    fetcher: &dyn SourceFetcher,
    transformer: &dyn ClipTransformer,
    on_progress: ProgressSink<'_>,
) -> Result<ClipArtifact> {
    if request.url.trim().is_empty() {
        return Err(Error::Validation("Please paste a URL first".to_owned()));
    }
    // End <= start is deliberately not rejected here; the trim tool's
    // degenerate output is the error signal in that case

    let workspace = tempfile::tempdir()
        .into_diagnostic()
        .wrap_err("Could not create the request workspace")?;

    info!("Fetching source media from '{}'", request.url.trim());
    let source = fetcher.fetch(request.url.trim(), workspace.path(), on_progress)?;
    debug!("Fetched source file: {}", source.path.display());

    let source = normalize_container(&source, transformer, workspace.path())?;

    let file_name = request.file_name();

    // The output name is user-controlled: keep it in its own subdirectory
    // so a label like `source` cannot name the input file itself
    let out_dir = workspace.path().join("out");
    std::fs::create_dir(&out_dir)
        .into_diagnostic()
        .wrap_err("Could not create the clip output directory")?;
    let out_path = out_dir.join(&file_name);

    info!(
        "Trimming from {} to {} into '{file_name}'",
        request.start, request.end
    );
    match request.mode {
        OutputMode::VideoMp4 => {
            transformer.trim_video_copy(&source.path, &out_path, request.start, request.end)?
        }
        OutputMode::AudioMp3 => {
            transformer.trim_audio_mp3(&source.path, &out_path, request.start, request.end)?
        }
    }

    let bytes = std::fs::read(&out_path)
        .into_diagnostic()
        .wrap_err("Could not read the produced clip")?;

    // Workspace dropped here, removing the source and the on-disk clip
    Ok(ClipArtifact {
        bytes,
        mime: request.mode.mime(),
        file_name,
    })
}

/// Remux the source into MP4 when the fetch yielded another container
/// (e.g. a WebM-only source), so the trim always starts from MP4.
fn normalize_container(
    source: &SourceMedia,
    transformer: &dyn ClipTransformer,
    workspace: &Path,
) -> Result<SourceMedia> {
    if source.is_mp4() {
        return Ok(SourceMedia {
            path: source.path.clone(),
        });
    }

    info!(
        "Source is in a {} container, remuxing to MP4",
        source.container().as_deref().unwrap_or("unknown")
    );
    let normalized = workspace.join("source_normalized.mp4");
    transformer.remux_copy(&source.path, &normalized)?;
    Ok(SourceMedia { path: normalized })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, mode: OutputMode) -> ClipRequest {
        ClipRequest {
            url: "https://example.com/v".to_owned(),
            start: Timestamp::new(0, 0, 10).unwrap(),
            end: Timestamp::new(0, 0, 20).unwrap(),
            mode,
            name: name.to_owned(),
        }
    }

    #[test]
    fn default_file_name_from_time_range() {
        let req = request("", OutputMode::VideoMp4);
        assert_eq!(req.file_name(), "clip_00-00-10_00-00-20.mp4");
    }

    #[test]
    fn user_label_is_sanitized() {
        let req = request("my: clip/take 2", OutputMode::AudioMp3);
        assert_eq!(req.file_name(), "my clip take 2.mp3");
    }
}
