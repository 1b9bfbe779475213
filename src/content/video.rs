use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use super::ContentValidationError;

// watch?v=<id>, youtu.be/<id> and /embed/<id>
static VIDEO_ID_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]v=|youtu\.be/|/embed/)([A-Za-z0-9_-]+)").expect("video id pattern compiles")
});

/// Bounded window of an external video played on the Video screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSegment {
    source_id: String,
    start_offset_secs: u32,
    end_offset_secs: u32,
}

impl VideoSegment {
    /// `source` is either a bare source id or a video URL carrying one.
    pub fn new(source: &str, start: u32, end: u32) -> Result<Self, ContentValidationError> {
        if end <= start {
            return Err(ContentValidationError::InvalidSegment { start, end });
        }

        Ok(Self {
            source_id: source_id_from(source)?,
            start_offset_secs: start,
            end_offset_secs: end,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn start_offset_secs(&self) -> u32 {
        self.start_offset_secs
    }

    pub fn end_offset_secs(&self) -> u32 {
        self.end_offset_secs
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.end_offset_secs - self.start_offset_secs))
    }
}

fn source_id_from(source: &str) -> Result<String, ContentValidationError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(ContentValidationError::EmptyField {
            field: String::from("video source"),
        });
    }

    if !source.contains("://") {
        return Ok(source.to_string());
    }

    VIDEO_ID_IN_URL
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| ContentValidationError::InvalidVideoSource {
            given: source.to_string(),
        })
}
