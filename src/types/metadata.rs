use std::fmt::Display;

use serde::Deserialize;

use super::format_duration;

/// The fields of the source metadata used by the preview display.
///
/// Deserialized from the fetcher's JSON dump; every field except the title
/// is optional since not all sources expose them.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(uploader) = &self.uploader {
            writeln!(f, "  by {uploader}")?;
        }
        write!(f, "  duration {}", format_duration(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_partial_json() {
        let metadata: Metadata = serde_json::from_str(r#"{"title": "A video"}"#).unwrap();
        assert_eq!(metadata.title, "A video");
        assert!(metadata.uploader.is_none());
        assert!(metadata.duration.is_none());

        let metadata: Metadata = serde_json::from_str(
            r#"{"title": "T", "uploader": "U", "duration": 125, "thumbnail": "https://x/y.jpg"}"#,
        )
        .unwrap();
        assert_eq!(metadata.duration, Some(125));
    }

    #[test]
    fn preview_handles_unknown_duration() {
        let metadata = Metadata {
            title: "T".to_owned(),
            uploader: None,
            duration: None,
            thumbnail: None,
        };
        assert!(metadata.to_string().contains('–'));
    }
}
