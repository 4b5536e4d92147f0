use clap::ValueEnum;

/// What kind of artifact a clip request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Stream-copy trim into an MP4 container, no re-encode.
    VideoMp4,
    /// Audio stream only, re-encoded to MP3.
    AudioMp3,
}

impl OutputMode {
    /// Return the extension with the leading dot.
    /// e.g. ".ext"
    pub fn with_dot(self) -> &'static str {
        match self {
            OutputMode::VideoMp4 => ".mp4",
            OutputMode::AudioMp3 => ".mp3",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputMode::VideoMp4 => "video/mp4",
            OutputMode::AudioMp3 => "audio/mpeg",
        }
    }
}
