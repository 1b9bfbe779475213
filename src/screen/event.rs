use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::VideoSegment;

/// Inputs to the screen controller, raised by the presentation layer, the
/// video surface or the fallback timer.
///
/// Serialized with a `type` tag so a remote presentation layer can send them
/// as JSON, e.g. `{"type": "answer_submitted", "index": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StartLesson,
    SelectLockedLesson,
    SegmentFinished,
    SkipRequested,
    AnswerSubmitted { index: usize },
    RetryRequested,
    AdvanceRequested,
    ContinueRequested,
    SetMuted { muted: bool },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StartLesson => "StartLesson",
            Event::SelectLockedLesson => "SelectLockedLesson",
            Event::SegmentFinished => "SegmentFinished",
            Event::SkipRequested => "SkipRequested",
            Event::AnswerSubmitted { .. } => "AnswerSubmitted",
            Event::RetryRequested => "RetryRequested",
            Event::AdvanceRequested => "AdvanceRequested",
            Event::ContinueRequested => "ContinueRequested",
            Event::SetMuted { .. } => "SetMuted",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::AnswerSubmitted { index } => write!(f, "AnswerSubmitted({})", index),
            Event::SetMuted { muted } => write!(f, "SetMuted({})", muted),
            other => f.write_str(other.name()),
        }
    }
}

/// Side effects a transition asks the surrounding runtime to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// play the segment and arm the fallback timer
    StartVideo { segment: VideoSegment, muted: bool },
    SkipVideo,
    SetMuted(bool),
}
