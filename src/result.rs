use std::fmt::Display;

use miette::miette;

/// Everything that can end a clip request, classified so the presentation
/// layer can decide how much detail to show for each kind.
#[derive(Debug)]
pub enum Error {
    /// The request was rejected before any external call was made.
    Validation(String),

    /// The source fetch failed to resolve or transfer the stream.
    Acquisition(String),

    /// The fetch reported success but nothing matched the expected
    /// output pattern in the workspace.
    NoFileProduced,

    /// The copy-only remux into the target container failed.
    Normalization(String),

    /// The trim process exited non-zero. Carries the raw diagnostic text
    /// captured from the tool's stderr.
    Transcode { stderr: String },

    /// Catch-all for faults outside the clip lifecycle (filesystem, ...).
    Miette(miette::Report),
}

impl Error {
    /// The message shown to the user. Only [`Error::Transcode`] exposes the
    /// underlying tool output; the other kinds keep their cause internal.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Acquisition(_) => "Could not fetch the source media. \
                 The URL may be private, region-locked, or deleted."
                .to_owned(),
            Error::NoFileProduced => "Download finished but no media file was produced".to_owned(),
            Error::Normalization(_) => "Could not convert the source to MP4".to_owned(),
            Error::Transcode { stderr } => {
                format!("Trimming failed. Tool output:\n{stderr}")
            }
            Error::Miette(report) => format!("Error: {report}"),
        }
    }

    /// Diagnostic payload not included in [`Self::user_message`], if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Error::Acquisition(detail) | Error::Normalization(detail) => Some(detail),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for Error {}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Miette(miette!("{err}"))
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::Miette(report) => report,
            err => miette!("{}", err.user_message()),
        }
    }
}

/// Build an [`Error::Miette`] from a message.
pub fn err_msg<D: Display + Send + Sync + 'static>(msg: D) -> Error {
    Error::Miette(miette!("{msg}"))
}

/// Return an [`Error::Miette`] built from a message.
pub fn bail<T, D: Display + Send + Sync + 'static>(msg: D) -> Result<T> {
    Err(err_msg(msg))
}

pub type Result<T> = std::result::Result<T, Error>;
