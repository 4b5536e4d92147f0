use std::{ffi::OsStr, fmt::Debug, path::Path};

use super::command::{
    assert_success_command, run_command, stderr_tail, Capture, FFMPEG, FFMPEG_DEFAULT_ARGS,
};
use crate::{
    result::{Error, Result},
    types::Timestamp,
};

/// How many diagnostic lines a failed trim or remux keeps.
const STDERR_TAIL_LINES: usize = 20;

/// Interface for trimming and remuxing a fetched source file.
pub trait ClipTransformer: Debug {
    /// Trim `[start, end]` out of the source into an MP4 container by
    /// stream copy, no re-encode.
    ///
    /// Cut points snap to the nearest keyframe; that precision loss is the
    /// accepted cost of a lossless, fast trim.
    fn trim_video_copy(
        &self,
        input: &Path,
        output: &Path,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<()>;

    /// Trim `[start, end]` keeping only the audio stream, re-encoded
    /// to MP3 at 192 kb/s.
    fn trim_audio_mp3(
        &self,
        input: &Path,
        output: &Path,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<()>;

    /// Rewrite the source into the container implied by `output`'s
    /// extension, copying every stream as-is.
    fn remux_copy(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(FFMPEG, |cmd| cmd.arg("-version"))?;

        Ok(Self)
    }

    /// Run a trim, mapping a non-zero exit to the given error constructor
    /// with the tool's diagnostic output attached.
    fn run_trim<F>(&self, f: F, on_failure: fn(String) -> Error) -> Result<()>
    where
        F: FnOnce(&mut std::process::Command) -> &mut std::process::Command,
    {
        let res = run_command(FFMPEG, f, Capture::STDERR)?;
        if res.status.success() {
            Ok(())
        } else {
            Err(on_failure(stderr_tail(&res.stderr, STDERR_TAIL_LINES)))
        }
    }
}

impl ClipTransformer for Ffmpeg {
    fn trim_video_copy(
        &self,
        input: &Path,
        output: &Path,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<()> {
        self.run_trim(
            |cmd| {
                cmd.args(FFMPEG_DEFAULT_ARGS)
                    .arg("-y")
                    .args(["-ss", &start.to_string()])
                    .args(["-to", &end.to_string()])
                    .args([OsStr::new("-i"), input.as_os_str()])
                    .args(["-c", "copy"])
                    .arg(output)
            },
            |stderr| Error::Transcode { stderr },
        )
    }

    fn trim_audio_mp3(
        &self,
        input: &Path,
        output: &Path,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<()> {
        self.run_trim(
            |cmd| {
                cmd.args(FFMPEG_DEFAULT_ARGS)
                    .arg("-y")
                    .args(["-ss", &start.to_string()])
                    .args(["-to", &end.to_string()])
                    .args([OsStr::new("-i"), input.as_os_str()])
                    .arg("-vn")
                    .args(["-c:a", "libmp3lame"])
                    .args(["-b:a", "192k"])
                    .arg(output)
            },
            |stderr| Error::Transcode { stderr },
        )
    }

    fn remux_copy(&self, input: &Path, output: &Path) -> Result<()> {
        self.run_trim(
            |cmd| {
                cmd.args(FFMPEG_DEFAULT_ARGS)
                    .arg("-y")
                    .args([OsStr::new("-i"), input.as_os_str()])
                    .args(["-c", "copy"])
                    .arg(output)
            },
            |stderr| Error::Normalization(stderr),
        )
    }
}
