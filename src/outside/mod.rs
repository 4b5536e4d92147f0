mod command;
mod ffmpeg;
mod ytdl;

pub use ffmpeg::{ClipTransformer, Ffmpeg};
pub use ytdl::{SourceFetcher, SourceMedia, Ytdl};
