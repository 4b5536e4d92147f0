use std::path::PathBuf;

use clap::Parser;

use crate::types::{OutputMode, Timestamp};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("CLIPCUT_", $v)
    };
}

/// Cut a clip out of a web video: paste a URL, pick a start and end time,
/// and get a trimmed MP4 or MP3 back.
///
/// Without a URL argument, an interactive session is started where several
/// clips can be cut in a row and past ones re-saved from the history.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The URL of the video to clip. When given, cut a single clip and
    /// exit instead of starting an interactive session
    pub url: Option<String>,

    /// Start of the clip, as HH:MM:SS
    #[clap(long, default_value = "00:00:00", env = arg_env!("START"))]
    pub start: Timestamp,

    /// End of the clip, as HH:MM:SS
    #[clap(long, default_value = "00:03:00", env = arg_env!("END"))]
    pub end: Timestamp,

    /// Whether to produce a trimmed MP4 video or an MP3 audio extract
    #[clap(long, value_enum, default_value_t = OutputMode::VideoMp4, env = arg_env!("MODE"))]
    pub mode: OutputMode,

    /// Base name of the output file. Unsafe characters are replaced and
    /// an empty name falls back to one derived from the time range
    #[clap(long, default_value = "", env = arg_env!("NAME"))]
    pub name: String,

    /// The directory where finished clips are saved
    #[clap(long, default_value = ".", env = arg_env!("OUT"))]
    pub out: PathBuf,

    /// Show debug logs
    #[clap(short, long)]
    pub verbose: bool,
}
