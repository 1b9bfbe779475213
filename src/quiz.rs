//! Answer evaluation and the per-visit quiz session.
//!
//! A [`QuizSession`] only tracks positions and counters; the questions
//! themselves stay in the shared [`LessonContent`](crate::content::LessonContent)
//! and are passed in on every submission.

use serde::Serialize;
use thiserror::Error;

use crate::content::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Pure check of one selected option against the question's answer.
pub fn evaluate(question: &Question, selected: usize) -> Verdict {
    if selected == question.answer_index() {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    #[default]
    Unanswered,
    AnsweredCorrect,
    AnsweredWrong,
}

/// Why a quiz action was refused. The session is never modified when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizRejection {
    #[error("question {question} already has an answer, retry or advance first")]
    AlreadyAnswered { question: usize },

    #[error("option {selected} does not exist, question {question} has {options} options")]
    OptionOutOfRange {
        question: usize,
        selected: usize,
        options: usize,
    },

    #[error("retry is only possible after a wrong answer")]
    NothingToRetry,

    #[error("the current question must be answered correctly before advancing")]
    NotYetCorrect,
}

/// Final score carried onto the Victory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub correct_count: usize,
    pub total: usize,
}

/// Result of a successful advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// moved on to the next question
    Next,
    /// the last question was done
    Finished(QuizOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    question_index: usize,
    correct_count: usize,
    selection: Option<usize>,
    status: AnswerStatus,
    attempts: usize,
    // per question index, whether it already contributed to correct_count
    scored: Vec<bool>,
}

impl QuizSession {
    /// `total` is the number of questions in the lesson, at least one.
    pub fn new(total: usize) -> Self {
        assert!(total > 0, "a quiz needs at least one question");
        Self {
            question_index: 0,
            correct_count: 0,
            selection: None,
            status: AnswerStatus::Unanswered,
            attempts: 0,
            scored: vec![false; total],
        }
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn total(&self) -> usize {
        self.scored.len()
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    /// Answers submitted for the current question, including wrong ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_last_question(&self) -> bool {
        self.question_index + 1 == self.total()
    }

    /// Fraction of the quiz reached, counting the current question.
    pub fn progress(&self) -> f64 {
        (self.question_index + 1) as f64 / self.total() as f64
    }

    pub fn outcome(&self) -> QuizOutcome {
        QuizOutcome {
            correct_count: self.correct_count,
            total: self.total(),
        }
    }

    /// Records an answer for the current question.
    ///
    /// `question` must be the lesson question at [`Self::question_index`].
    pub fn submit(&mut self, question: &Question, selected: usize) -> Result<Verdict, QuizRejection> {
        if self.status != AnswerStatus::Unanswered {
            return Err(QuizRejection::AlreadyAnswered {
                question: self.question_index + 1,
            });
        }

        let options = question.options().len();
        if selected >= options {
            return Err(QuizRejection::OptionOutOfRange {
                question: self.question_index + 1,
                selected,
                options,
            });
        }

        let verdict = evaluate(question, selected);
        self.selection = Some(selected);
        self.attempts += 1;
        self.status = match verdict {
            Verdict::Correct => AnswerStatus::AnsweredCorrect,
            Verdict::Incorrect => AnswerStatus::AnsweredWrong,
        };

        if verdict == Verdict::Correct && !self.scored[self.question_index] {
            self.scored[self.question_index] = true;
            self.correct_count += 1;
        }

        Ok(verdict)
    }

    /// Clears a wrong answer so the same question can be attempted again.
    pub fn retry(&mut self) -> Result<(), QuizRejection> {
        if self.status != AnswerStatus::AnsweredWrong {
            return Err(QuizRejection::NothingToRetry);
        }

        self.selection = None;
        self.status = AnswerStatus::Unanswered;
        Ok(())
    }

    /// Moves past a correctly answered question. On the last question the
    /// session is left as is and the outcome is returned instead.
    pub fn advance(&mut self) -> Result<Step, QuizRejection> {
        if self.status != AnswerStatus::AnsweredCorrect {
            return Err(QuizRejection::NotYetCorrect);
        }

        if self.is_last_question() {
            return Ok(Step::Finished(self.outcome()));
        }

        self.question_index += 1;
        self.selection = None;
        self.status = AnswerStatus::Unanswered;
        self.attempts = 0;
        Ok(Step::Next)
    }
}
