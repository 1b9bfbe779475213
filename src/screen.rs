//! The screen state machine: Map → Video → Quiz → Victory → (Map | End).
//!
//! [`ScreenController::apply`] is the single entry point. It is synchronous and
//! has no I/O; anything the outside world has to do (play a video, arm a timer)
//! comes back as an [`Effect`] in the returned [`Transition`].

mod event;
mod view;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::content::{LessonContent, Question};
use crate::quiz::{QuizOutcome, QuizRejection, QuizSession, Step};

pub use event::{Effect, Event};
pub use view::{QuizView, ScreenView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Map,
    Video,
    Quiz,
    Victory,
    End,
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenKind::Map => "map",
            ScreenKind::Video => "video",
            ScreenKind::Quiz => "quiz",
            ScreenKind::Victory => "victory",
            ScreenKind::End => "end",
        };
        f.write_str(name)
    }
}

/// Current screen. The quiz session only exists inside the `Quiz` variant,
/// so leaving the quiz in either direction drops it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    Map,
    Video,
    Quiz(QuizSession),
    Victory(QuizOutcome),
    End,
}

impl ScreenState {
    pub fn kind(&self) -> ScreenKind {
        match self {
            ScreenState::Map => ScreenKind::Map,
            ScreenState::Video => ScreenKind::Video,
            ScreenState::Quiz(_) => ScreenKind::Quiz,
            ScreenState::Victory(_) => ScreenKind::Victory,
            ScreenState::End => ScreenKind::End,
        }
    }
}

/// An event that the current screen or answer status does not allow.
/// Rejections never change controller state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransition {
    #[error("{event} is not accepted on the {screen} screen")]
    NotHandled {
        screen: ScreenKind,
        event: &'static str,
    },

    #[error(transparent)]
    Quiz(#[from] QuizRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ScreenKind,
    pub to: ScreenKind,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn changed_screen(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone)]
pub struct ScreenController {
    lesson: Arc<LessonContent>,
    state: ScreenState,
    muted: bool,
}

impl ScreenController {
    pub fn new(lesson: Arc<LessonContent>) -> Self {
        Self {
            lesson,
            state: ScreenState::Map,
            muted: false,
        }
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn lesson(&self) -> &LessonContent {
        &self.lesson
    }

    pub fn current(&self) -> ScreenKind {
        self.state.kind()
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            ScreenState::Quiz(session) => Some(session),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session()
            .map(|session| &self.lesson.questions()[session.question_index()])
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn view(&self) -> ScreenView {
        ScreenView::of(self)
    }

    pub fn apply(&mut self, event: Event) -> Result<Transition, InvalidTransition> {
        let from = self.state.kind();
        let mut effects = Vec::new();

        let next = match (&mut self.state, event) {
            (_, Event::SetMuted { muted }) => {
                self.muted = muted;
                if from == ScreenKind::Video {
                    effects.push(Effect::SetMuted(muted));
                }
                None
            }

            (ScreenState::Map, Event::StartLesson) => {
                effects.push(Effect::StartVideo {
                    segment: self.lesson.video().clone(),
                    muted: self.muted,
                });
                Some(ScreenState::Video)
            }
            (ScreenState::Map, Event::SelectLockedLesson) => Some(ScreenState::End),

            (ScreenState::Video, Event::SegmentFinished) => {
                Some(ScreenState::Quiz(QuizSession::new(self.lesson.questions().len())))
            }
            (ScreenState::Video, Event::SkipRequested) => {
                effects.push(Effect::SkipVideo);
                Some(ScreenState::Quiz(QuizSession::new(self.lesson.questions().len())))
            }
            // the losing side of the natural-end / fallback race
            (_, Event::SegmentFinished) => {
                debug!(screen = %from, "late SegmentFinished ignored");
                None
            }

            (ScreenState::Quiz(session), Event::AnswerSubmitted { index }) => {
                let question = &self.lesson.questions()[session.question_index()];
                let verdict = session.submit(question, index)?;
                debug!(question = session.question_index() + 1, index, ?verdict, "answer evaluated");
                None
            }
            (ScreenState::Quiz(session), Event::RetryRequested) => {
                session.retry()?;
                None
            }
            (ScreenState::Quiz(session), Event::AdvanceRequested) => match session.advance()? {
                Step::Next => None,
                Step::Finished(outcome) => Some(ScreenState::Victory(outcome)),
            },

            (ScreenState::Victory(_), Event::ContinueRequested) => Some(ScreenState::Map),

            (state, event) => {
                return Err(InvalidTransition::NotHandled {
                    screen: state.kind(),
                    event: event.name(),
                })
            }
        };

        if let Some(next) = next {
            self.state = next;
        }

        let to = self.state.kind();
        if from != to {
            info!(%from, %to, %event, "screen transition");
        }

        Ok(Transition { from, to, effects })
    }
}
