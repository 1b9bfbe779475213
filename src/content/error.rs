use thiserror::Error;

/// Reasons a lesson is rejected at construction time.
///
/// Question positions are 1-based so messages match what a learner would see.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    #[error("video segment must end after it starts (start {start}s, end {end}s)")]
    InvalidSegment { start: u32, end: u32 },

    #[error("video source '{given}' does not name a video")]
    InvalidVideoSource { given: String },

    #[error("lesson '{lesson}' has no questions")]
    NoQuestions { lesson: String },

    #[error("question {question} has {count} option(s), at least 2 are required")]
    TooFewOptions { question: usize, count: usize },

    #[error("question {question} lists option '{option}' more than once")]
    DuplicateOption { question: usize, option: String },

    #[error("question {question} points at answer {answer} but only has {options} options")]
    AnswerOutOfRange {
        question: usize,
        answer: usize,
        options: usize,
    },

    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("lesson id '{id}' is used more than once in the catalog")]
    DuplicateLessonId { id: String },
}
