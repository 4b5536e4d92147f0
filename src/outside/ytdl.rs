use std::{
    ffi::{OsStr, OsString},
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use miette::{miette, Context, IntoDiagnostic};
use tracing::debug;

use super::command::{assert_success_command, run_command, stderr_tail, Capture, YT_DL, YT_DLP};
use crate::{
    progress::{parse_progress_line, ProgressSink, DOWNLOAD_TEMPLATE, POSTPROCESS_TEMPLATE},
    result::{bail, Error, Result},
    types::Metadata,
};

/// Format selection policy: prefer an MP4-native video+audio pair, then the
/// best combined MP4, then best video + best audio merged, then best overall.
const FORMAT_POLICY: &str = "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/bv*+ba/b";

/// File stem the fetch writes into the workspace. The extension is chosen
/// by the tool, so callers locate the result by the `source.*` pattern.
const SOURCE_STEM: &str = "source";

/// How many diagnostic lines an acquisition failure keeps.
const STDERR_TAIL_LINES: usize = 8;

/// The file a fetch produced, alive only as long as the request workspace.
#[derive(Debug)]
pub struct SourceMedia {
    pub path: PathBuf,
}

impl SourceMedia {
    /// Container of the fetched file, from its extension, lowercased.
    pub fn container(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
    }

    pub fn is_mp4(&self) -> bool {
        self.container().as_deref() == Some("mp4")
    }
}

/// Interface for resolving a URL to metadata and to a downloaded file.
pub trait SourceFetcher {
    /// Resolve the URL and return its metadata without downloading anything.
    ///
    /// Used purely for the preview display; failures are reported to the
    /// caller and never block a clip from proceeding.
    fn probe(&self, url: &str) -> Result<Metadata>;

    /// Download the best combined video+audio stream into `workspace`,
    /// merged into a single MP4 where possible. A playlist URL is treated
    /// as its single entry only.
    ///
    /// `on_progress` is invoked synchronously while the transfer runs.
    fn fetch(
        &self,
        url: &str,
        workspace: &Path,
        on_progress: ProgressSink<'_>,
    ) -> Result<SourceMedia>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
/// (or its `youtube-dl` predecessor).
pub struct Ytdl {
    program: &'static str,
}

impl Ytdl {
    /// Verify that the `yt-dlp` or `youtube-dl` binaries are reachable
    pub fn new() -> Result<Self> {
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DLP })
        } else if assert_success_command(YT_DL, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DL })
        } else {
            bail("Neither yt-dlp nor youtube-dl found")
        }
    }
}

impl SourceFetcher for Ytdl {
    fn probe(&self, url: &str) -> Result<Metadata> {
        let res = run_command(
            self.program,
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .arg("--no-playlist")
                    .arg("-j")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT | Capture::STDERR,
        )?;

        if !res.status.success() {
            return Err(Error::Acquisition(stderr_tail(
                &res.stderr,
                STDERR_TAIL_LINES,
            )));
        }

        let output = String::from_utf8_lossy(&res.stdout);
        let metadata = serde_json::from_str::<Metadata>(&output)
            .into_diagnostic()
            .wrap_err("Could not parse metadata JSON")?;
        Ok(metadata)
    }

    fn fetch(
        &self,
        url: &str,
        workspace: &Path,
        on_progress: ProgressSink<'_>,
    ) -> Result<SourceMedia> {
        let template = workspace.join(format!("{SOURCE_STEM}.%(ext)s"));

        let mut cmd = Command::new(self.program);
        cmd.args(fetch_args(self.program, &template, url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing command: {cmd:?}");
        let mut child = cmd.spawn()?;

        // Drain stderr on its own thread so neither pipe can fill up and
        // stall the transfer
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| miette!("Could not capture fetcher stderr"))?;
        let stderr_thread = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| miette!("Could not capture fetcher stdout"))?;
        for line in BufReader::new(stdout).lines() {
            let line = line?;
            if let Some(event) = parse_progress_line(&line) {
                on_progress(event);
            }
        }

        let status = child.wait()?;
        let stderr = stderr_thread
            .join()
            .map_err(|_| miette!("Fetcher stderr thread panicked"))?;

        if !status.success() {
            return Err(Error::Acquisition(stderr_tail(&stderr, STDERR_TAIL_LINES)));
        }

        find_fetched_file(workspace).map(|path| SourceMedia { path })
    }
}

/// Arguments for a fetch run.
///
/// `--progress` and `--progress-template` are yt-dlp extensions that
/// youtube-dl's option parser rejects outright, so the fallback program
/// fetches without progress events instead of failing every request.
fn fetch_args(program: &str, template: &Path, url: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["--no-playlist", "--no-warnings", "--no-continue"]
        .map(OsString::from)
        .into();

    if program == YT_DLP {
        args.extend(
            [
                "--newline",
                "--progress",
                "--progress-template",
                DOWNLOAD_TEMPLATE,
                "--progress-template",
                POSTPROCESS_TEMPLATE,
            ]
            .map(OsString::from),
        );
    }

    args.extend(["-f", FORMAT_POLICY, "--merge-output-format", "mp4"].map(OsString::from));
    args.push("-o".into());
    args.push(template.as_os_str().to_owned());
    args.push("--".into());
    args.push(url.into());
    args
}

/// Locate the file the fetch produced.
///
/// The tool may have written any extension; when several candidates exist
/// (e.g. leftover fragment files), the shortest name is the merged result.
fn find_fetched_file(workspace: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = workspace
        .read_dir()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|name| name.starts_with(&format!("{SOURCE_STEM}.")))
                && path.is_file()
        })
        .collect();

    candidates.sort_by_key(|path| path.as_os_str().len());
    candidates.into_iter().next().ok_or(Error::NoFileProduced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_media_container() {
        let media = SourceMedia {
            path: PathBuf::from("/tmp/w/source.MP4"),
        };
        assert_eq!(media.container().as_deref(), Some("mp4"));
        assert!(media.is_mp4());

        let media = SourceMedia {
            path: PathBuf::from("/tmp/w/source.webm"),
        };
        assert!(!media.is_mp4());
    }

    #[test]
    fn progress_flags_are_reserved_for_ytdlp() {
        let template = Path::new("/tmp/w/source.%(ext)s");

        let args = fetch_args(YT_DLP, template, "https://example.com/v");
        assert!(args.iter().any(|a| a == "--progress-template"));

        // youtube-dl rejects unknown long options before doing anything,
        // so the fallback must not get the progress flags
        let args = fetch_args(YT_DL, template, "https://example.com/v");
        assert!(!args.iter().any(|a| a == "--progress-template"));
        assert!(!args.iter().any(|a| a == "--progress"));
        assert!(args.iter().any(|a| a == "--no-playlist"));
        assert!(args.iter().any(|a| a == "--merge-output-format"));
    }

    #[test]
    fn find_fetched_file_prefers_shortest_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("source.f137.mp4"), b"frag").unwrap();
        std::fs::write(dir.path().join("source.mp4"), b"merged").unwrap();
        std::fs::write(dir.path().join("other.mp4"), b"unrelated").unwrap();

        let found = find_fetched_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("source.mp4"));
    }

    #[test]
    fn find_fetched_file_empty_workspace() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_fetched_file(dir.path()),
            Err(Error::NoFileProduced)
        ));
    }
}
