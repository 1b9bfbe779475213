//! End-to-end walks through the screen controller using the demo lesson.

use lessonflow::content::{load_catalog, ContentValidationError, LessonCatalog};
use lessonflow::quiz::{AnswerStatus, QuizOutcome, QuizRejection};
use lessonflow::screen::{
    Event, InvalidTransition, ScreenController, ScreenKind, ScreenState, ScreenView,
};

const DEMO_LESSON: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/lessons/peste-negra.yaml");

fn demo() -> LessonCatalog {
    load_catalog(DEMO_LESSON).expect("demo lesson loads")
}

fn apply_all(controller: &mut ScreenController, events: &[Event]) -> Vec<ScreenKind> {
    events
        .iter()
        .map(|event| {
            controller
                .apply(*event)
                .unwrap_or_else(|err| panic!("{event} rejected: {err}"))
                .to
        })
        .collect()
}

#[test]
fn demo_lesson_is_playable() {
    let catalog = demo();
    let lesson = catalog.lesson();

    assert_eq!(lesson.id(), "leccion-1");
    assert_eq!(lesson.questions().len(), 3);
    assert_eq!(lesson.video().source_id(), "uZKUthKdKKY");
    assert_eq!(lesson.video().duration().as_secs(), 73);
    assert_eq!(catalog.locked().len(), 1);
    assert_eq!(catalog.locked()[0].id, "leccion-2");
}

#[test]
fn three_questions_with_one_retry_scores_three() {
    let mut controller = ScreenController::new(demo().lesson().clone());

    let screens = apply_all(
        &mut controller,
        &[
            Event::StartLesson,
            Event::SegmentFinished,
            // Q1 correct
            Event::AnswerSubmitted { index: 0 },
            Event::AdvanceRequested,
            // Q2 wrong, retry, correct
            Event::AnswerSubmitted { index: 0 },
            Event::RetryRequested,
            Event::AnswerSubmitted { index: 1 },
            Event::AdvanceRequested,
            // Q3 correct
            Event::AnswerSubmitted { index: 1 },
            Event::AdvanceRequested,
        ],
    );

    assert_eq!(screens.first(), Some(&ScreenKind::Video));
    assert_eq!(screens.last(), Some(&ScreenKind::Victory));
    assert_eq!(
        controller.state(),
        &ScreenState::Victory(QuizOutcome {
            correct_count: 3,
            total: 3
        })
    );

    let ScreenView::Victory { artifact, correct_count, .. } = controller.view() else {
        panic!("expected the victory screen");
    };
    assert_eq!(artifact.name, "Máscara de Doctor de la Peste");
    assert_eq!(correct_count, 3);

    controller.apply(Event::ContinueRequested).unwrap();
    assert_eq!(controller.current(), ScreenKind::Map);
}

#[test]
fn out_of_range_answer_is_rejected() {
    let mut controller = ScreenController::new(demo().lesson().clone());
    apply_all(&mut controller, &[Event::StartLesson, Event::SkipRequested]);

    let err = controller.apply(Event::AnswerSubmitted { index: 4 }).unwrap_err();
    assert_eq!(
        err,
        InvalidTransition::Quiz(QuizRejection::OptionOutOfRange {
            question: 1,
            selected: 4,
            options: 4
        })
    );
    assert_eq!(controller.session().unwrap().status(), AnswerStatus::Unanswered);
    assert_eq!(controller.session().unwrap().selection(), None);
}

#[test]
fn resubmitting_does_not_double_score() {
    let mut controller = ScreenController::new(demo().lesson().clone());
    apply_all(
        &mut controller,
        &[Event::StartLesson, Event::SegmentFinished, Event::AnswerSubmitted { index: 0 }],
    );
    let before = controller.state().clone();

    assert!(controller.apply(Event::AnswerSubmitted { index: 0 }).is_err());
    assert!(controller.apply(Event::AnswerSubmitted { index: 2 }).is_err());
    assert_eq!(controller.state(), &before);
    assert_eq!(controller.session().unwrap().correct_count(), 1);
}

#[test]
fn late_segment_finished_keeps_the_session() {
    let mut controller = ScreenController::new(demo().lesson().clone());
    apply_all(
        &mut controller,
        &[
            Event::StartLesson,
            Event::SkipRequested,
            Event::AnswerSubmitted { index: 0 },
            Event::AdvanceRequested,
        ],
    );

    let transition = controller.apply(Event::SegmentFinished).unwrap();
    assert_eq!(transition.to, ScreenKind::Quiz);

    let session = controller.session().unwrap();
    assert_eq!(session.question_index(), 1);
    assert_eq!(session.correct_count(), 1);
}

#[test]
fn quiz_view_progress_for_first_of_three() {
    let mut controller = ScreenController::new(demo().lesson().clone());
    apply_all(&mut controller, &[Event::StartLesson, Event::SegmentFinished]);

    let ScreenView::Quiz(view) = controller.view() else {
        panic!("expected the quiz screen");
    };
    assert_eq!(view.question_number, 1);
    assert_eq!(view.total, 3);
    assert_eq!(view.progress_percent, 33);
    assert_eq!(view.hint.as_deref(), Some("Piensa en rutas comerciales medievales."));
}

#[test]
fn locked_node_ends_the_demo() {
    let mut controller = ScreenController::new(demo().lesson().clone());
    controller.apply(Event::SelectLockedLesson).unwrap();

    assert_eq!(controller.view(), ScreenView::End);
    for event in [Event::StartLesson, Event::ContinueRequested, Event::SkipRequested] {
        assert!(controller.apply(event).is_err());
        assert_eq!(controller.current(), ScreenKind::End);
    }
}

#[test]
fn invalid_answer_index_makes_the_lesson_unplayable() {
    let yaml = std::fs::read_to_string(DEMO_LESSON)
        .unwrap()
        .replace("      answer: 0\n", "      answer: 4\n");

    let err = LessonCatalog::from_yaml_str(&yaml).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ContentValidationError>(),
        Some(&ContentValidationError::AnswerOutOfRange {
            question: 1,
            answer: 4,
            options: 4
        })
    );
}

#[test]
fn view_serializes_with_screen_tag() {
    let controller = ScreenController::new(demo().lesson().clone());
    let json = serde_json::to_value(controller.view()).unwrap();

    assert_eq!(json["screen"], "map");
    assert_eq!(json["lesson_id"], "leccion-1");
}
