use std::sync::OnceLock;

use regex::Regex;

/// Marker prefixing every line the fetcher's progress templates emit,
/// so they can be told apart from the rest of the tool's output.
pub const PROGRESS_MARKER: &str = "clipcut-progress";

/// Template handed to the fetcher for the transfer phase.
/// Unavailable fields render as `NA`.
pub const DOWNLOAD_TEMPLATE: &str = "download:clipcut-progress|\
    %(progress.downloaded_bytes)s|\
    %(progress.total_bytes)s|\
    %(progress.total_bytes_estimate)s|\
    %(progress.speed)s|\
    %(progress.eta)s";

/// Template handed to the fetcher for the merge/remux phase.
pub const POSTPROCESS_TEMPLATE: &str = "postprocess:clipcut-progress|postprocess";

/// What the acquisition adapter reports while a fetch is in flight.
///
/// Events are delivered synchronously from inside the blocking fetch call;
/// handlers must be quick and must not panic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// Bytes are being transferred. `total_bytes` may be an estimate,
    /// and may be unknown entirely.
    Transferring {
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
        rate: Option<f64>,
        eta_seconds: Option<u64>,
    },
    /// Transfer done, the tool is merging/remuxing the streams.
    PostProcessing,
}

impl ProgressEvent {
    /// Fractional completion in `[0, 1]`, when the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            ProgressEvent::Transferring {
                downloaded_bytes,
                total_bytes: Some(total),
                ..
            } if *total > 0 => Some((*downloaded_bytes as f64 / *total as f64).min(1.0)),
            _ => None,
        }
    }
}

/// Handler invoked for each progress event.
pub type ProgressSink<'a> = &'a mut dyn FnMut(ProgressEvent);

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^clipcut-progress\|(?P<dl>[^|]+)\|(?P<total>[^|]+)\|(?P<est>[^|]+)\|(?P<rate>[^|]+)\|(?P<eta>[^|]+)$",
        )
        .unwrap()
    })
}

/// Parse one output line into a progress event.
/// Lines not produced by the progress templates yield `None`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();

    if line == POSTPROCESS_TEMPLATE.trim_start_matches("postprocess:") {
        return Some(ProgressEvent::PostProcessing);
    }

    let captures = line_regex().captures(line)?;

    // Numeric fields can be integers or floats depending on the tool version
    let field = |name: &str| -> Option<u64> {
        captures
            .name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|v| v as u64)
    };

    let downloaded_bytes = field("dl")?;
    // Fall back to the estimate when the exact total is not known
    let total_bytes = field("total").or_else(|| field("est"));
    let rate = captures
        .name("rate")
        .and_then(|m| m.as_str().parse::<f64>().ok());
    let eta_seconds = field("eta");

    Some(ProgressEvent::Transferring {
        downloaded_bytes,
        total_bytes,
        rate,
        eta_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_line_with_all_fields() {
        let event = parse_progress_line("clipcut-progress|1024|4096|NA|512.5|6").unwrap();
        assert_eq!(
            event,
            ProgressEvent::Transferring {
                downloaded_bytes: 1024,
                total_bytes: Some(4096),
                rate: Some(512.5),
                eta_seconds: Some(6),
            }
        );
        assert_eq!(event.fraction(), Some(0.25));
    }

    #[test]
    fn estimate_used_when_total_unknown() {
        let event = parse_progress_line("clipcut-progress|10|NA|200.0|NA|NA").unwrap();
        assert_eq!(
            event,
            ProgressEvent::Transferring {
                downloaded_bytes: 10,
                total_bytes: Some(200),
                rate: None,
                eta_seconds: None,
            }
        );
    }

    #[test]
    fn fully_unknown_total() {
        let event = parse_progress_line("clipcut-progress|10|NA|NA|NA|NA").unwrap();
        assert_eq!(event.fraction(), None);
    }

    #[test]
    fn postprocess_marker() {
        assert_eq!(
            parse_progress_line("clipcut-progress|postprocess"),
            Some(ProgressEvent::PostProcessing)
        );
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        assert_eq!(parse_progress_line("[download] Destination: x.mp4"), None);
        assert_eq!(parse_progress_line(""), None);
        assert_eq!(parse_progress_line("clipcut-progress|oops"), None);
    }
}
