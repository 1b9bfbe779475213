use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::{ContentValidationError, VideoSegment};

/// Reward granted on the Victory screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,

    /// opaque reference handed to the presentation layer
    pub image_ref: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_ref: image_ref.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One multiple-choice question.
///
/// A `Question` on its own is not checked; it is validated when it becomes
/// part of a [`LessonContent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    answer_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl Question {
    pub fn new<S: Into<String>>(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        answer_index: usize,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer_index,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    fn validate(&self, position: usize) -> Result<(), ContentValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ContentValidationError::EmptyField {
                field: format!("prompt of question {}", position),
            });
        }

        if self.options.len() < 2 {
            return Err(ContentValidationError::TooFewOptions {
                question: position,
                count: self.options.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if !seen.insert(option.as_str()) {
                return Err(ContentValidationError::DuplicateOption {
                    question: position,
                    option: option.clone(),
                });
            }
        }

        if self.answer_index >= self.options.len() {
            return Err(ContentValidationError::AnswerOutOfRange {
                question: position,
                answer: self.answer_index,
                options: self.options.len(),
            });
        }

        Ok(())
    }
}

/// Immutable description of one playable lesson.
///
/// Only obtainable through [`LessonContent::new`], so every instance holds a
/// valid segment and at least one well-formed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonContent {
    id: String,
    title: String,
    video: VideoSegment,
    questions: Vec<Question>,
    artifact: Artifact,
}

impl LessonContent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        video: VideoSegment,
        questions: Vec<Question>,
        artifact: Artifact,
    ) -> Result<Self, ContentValidationError> {
        let id = id.into();
        let title = title.into();

        if id.trim().is_empty() {
            return Err(ContentValidationError::EmptyField {
                field: String::from("lesson id"),
            });
        }
        if title.trim().is_empty() {
            return Err(ContentValidationError::EmptyField {
                field: format!("title of lesson '{}'", id),
            });
        }
        if questions.is_empty() {
            return Err(ContentValidationError::NoQuestions { lesson: id });
        }
        for (index, question) in questions.iter().enumerate() {
            question.validate(index + 1)?;
        }
        if artifact.name.trim().is_empty() {
            return Err(ContentValidationError::EmptyField {
                field: format!("artifact name of lesson '{}'", id),
            });
        }

        Ok(Self {
            id,
            title,
            video,
            questions,
            artifact,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn video(&self) -> &VideoSegment {
        &self.video
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}

/// A map node that cannot be played in this build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedLesson {
    pub id: String,
    pub title: String,
}

/// Everything shown on the lesson map: the playable lesson and its locked
/// neighbours.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    lesson: Arc<LessonContent>,
    locked: Vec<LockedLesson>,
}

impl LessonCatalog {
    pub fn new(
        lesson: LessonContent,
        locked: Vec<LockedLesson>,
    ) -> Result<Self, ContentValidationError> {
        let mut ids = HashSet::with_capacity(locked.len() + 1);
        ids.insert(lesson.id().to_string());

        for node in &locked {
            if node.id.trim().is_empty() {
                return Err(ContentValidationError::EmptyField {
                    field: format!("id of locked lesson '{}'", node.title),
                });
            }
            if node.title.trim().is_empty() {
                return Err(ContentValidationError::EmptyField {
                    field: format!("title of locked lesson '{}'", node.id),
                });
            }
            if !ids.insert(node.id.clone()) {
                return Err(ContentValidationError::DuplicateLessonId {
                    id: node.id.clone(),
                });
            }
        }

        Ok(Self {
            lesson: Arc::new(lesson),
            locked,
        })
    }

    pub fn lesson(&self) -> &Arc<LessonContent> {
        &self.lesson
    }

    pub fn locked(&self) -> &[LockedLesson] {
        &self.locked
    }
}
