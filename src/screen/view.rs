use serde::Serialize;

use super::{ScreenController, ScreenKind, ScreenState};
use crate::content::{Artifact, VideoSegment};
use crate::quiz::{AnswerStatus, QuizSession};

/// What the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Map {
        lesson_id: String,
        title: String,
    },
    Video {
        title: String,
        segment: VideoSegment,
        muted: bool,
    },
    Quiz(QuizView),
    Victory {
        title: String,
        artifact: Artifact,
        correct_count: usize,
        total: usize,
    },
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView {
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub selection: Option<usize>,
    pub status: AnswerStatus,
    /// 1-based
    pub question_number: usize,
    pub total: usize,
    pub progress: f64,
    pub progress_percent: u8,
    pub correct_count: usize,
    pub attempts: usize,
}

impl ScreenView {
    pub fn kind(&self) -> ScreenKind {
        match self {
            ScreenView::Map { .. } => ScreenKind::Map,
            ScreenView::Video { .. } => ScreenKind::Video,
            ScreenView::Quiz(_) => ScreenKind::Quiz,
            ScreenView::Victory { .. } => ScreenKind::Victory,
            ScreenView::End => ScreenKind::End,
        }
    }

    pub(super) fn of(controller: &ScreenController) -> Self {
        let lesson = controller.lesson();
        match controller.state() {
            ScreenState::Map => ScreenView::Map {
                lesson_id: lesson.id().to_string(),
                title: lesson.title().to_string(),
            },
            ScreenState::Video => ScreenView::Video {
                title: lesson.title().to_string(),
                segment: lesson.video().clone(),
                muted: controller.is_muted(),
            },
            ScreenState::Quiz(session) => ScreenView::Quiz(quiz_view(controller, session)),
            ScreenState::Victory(outcome) => ScreenView::Victory {
                title: lesson.title().to_string(),
                artifact: lesson.artifact().clone(),
                correct_count: outcome.correct_count,
                total: outcome.total,
            },
            ScreenState::End => ScreenView::End,
        }
    }
}

fn quiz_view(controller: &ScreenController, session: &QuizSession) -> QuizView {
    let question = &controller.lesson().questions()[session.question_index()];
    let progress = session.progress();

    QuizView {
        prompt: question.prompt().to_string(),
        options: question.options().to_vec(),
        hint: question.hint().map(str::to_string),
        selection: session.selection(),
        status: session.status(),
        question_number: session.question_index() + 1,
        total: session.total(),
        progress,
        progress_percent: (progress * 100.0).round() as u8,
        correct_count: session.correct_count(),
        attempts: session.attempts(),
    }
}
