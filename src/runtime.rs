//! Async driver for a [`ScreenController`].
//!
//! One task owns the controller and consumes events from every producer: the
//! presentation layer and video surface via [`FlowHandle::submit`], and the
//! fallback timer armed while the Video screen is shown. Views are published
//! on a `watch` channel after every event.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::content::VideoSegment;
use crate::screen::{Effect, Event, ScreenController, ScreenKind, ScreenView};

pub const DEFAULT_FALLBACK_MARGIN: Duration = Duration::from_secs(1);

const EVENT_QUEUE_DEPTH: usize = 32;

/// Playback collaborator. Natural completion is reported back with
/// `FlowHandle::submit(Event::SegmentFinished)`.
pub trait VideoSurface: Send + 'static {
    fn play(&mut self, segment: &VideoSegment, muted: bool);
    fn skip(&mut self);
    fn set_muted(&mut self, muted: bool);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSnapshot {
    pub view: ScreenView,
    /// message of the last rejected event, cleared by the next accepted one
    pub diagnostic: Option<String>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("the lesson flow is no longer running")]
pub struct FlowClosed;

#[derive(Debug, Clone)]
pub struct FlowHandle {
    events: mpsc::Sender<Event>,
    snapshots: watch::Receiver<FlowSnapshot>,
}

impl FlowHandle {
    pub async fn submit(&self, event: Event) -> Result<(), FlowClosed> {
        self.events.send(event).await.map_err(|_| FlowClosed)
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshots.clone()
    }
}

/// Time after which the fallback timer reports the segment as finished.
///
/// The margin is only taken off when the segment is longer than it, so the
/// delay is never zero for a valid segment.
pub fn fallback_delay(segment: &VideoSegment, margin: Duration) -> Duration {
    let duration = segment.duration();
    if duration > margin {
        duration - margin
    } else {
        duration
    }
}

struct FallbackTimer {
    generation: u64,
    task: JoinHandle<()>,
}

impl Drop for FallbackTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct FlowRuntime<V> {
    controller: ScreenController,
    surface: V,
    margin: Duration,
    events: mpsc::Receiver<Event>,
    fired_tx: mpsc::UnboundedSender<u64>,
    fired_rx: mpsc::UnboundedReceiver<u64>,
    snapshots: watch::Sender<FlowSnapshot>,
    fallback: Option<FallbackTimer>,
    generation: u64,
}

impl<V: VideoSurface> FlowRuntime<V> {
    pub fn new(controller: ScreenController, surface: V, margin: Duration) -> (Self, FlowHandle) {
        let (events_tx, events) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(FlowSnapshot {
            view: controller.view(),
            diagnostic: None,
        });

        let runtime = Self {
            controller,
            surface,
            margin,
            events,
            fired_tx,
            fired_rx,
            snapshots,
            fallback: None,
            generation: 0,
        };
        let handle = FlowHandle {
            events: events_tx,
            snapshots: snapshots_rx,
        };

        (runtime, handle)
    }

    /// Consumes events until the flow reaches End or every handle is dropped.
    /// Returns the screen the flow stopped on.
    pub async fn run(mut self) -> ScreenKind {
        while self.controller.current() != ScreenKind::End {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        debug!("all flow handles dropped");
                        break;
                    }
                },
                Some(generation) = self.fired_rx.recv() => self.on_fallback(generation),
            }
        }

        self.cancel_fallback();
        self.controller.current()
    }

    fn dispatch(&mut self, event: Event) {
        match self.controller.apply(event) {
            Ok(transition) => {
                if transition.from == ScreenKind::Video && transition.to != ScreenKind::Video {
                    self.cancel_fallback();
                }
                for effect in transition.effects {
                    self.perform(effect);
                }
                self.publish(None);
            }
            Err(err) => {
                debug!(%event, error = %err, "event rejected");
                self.publish(Some(err.to_string()));
            }
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::StartVideo { segment, muted } => {
                self.surface.play(&segment, muted);
                self.arm_fallback(&segment);
            }
            Effect::SkipVideo => self.surface.skip(),
            Effect::SetMuted(muted) => self.surface.set_muted(muted),
        }
    }

    fn arm_fallback(&mut self, segment: &VideoSegment) {
        self.generation += 1;
        let generation = self.generation;
        let delay = fallback_delay(segment, self.margin);
        let fired = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(generation);
        });

        debug!(generation, delay_secs = delay.as_secs(), "fallback timer armed");
        // replacing an armed timer drops, and so aborts, the old one
        self.fallback = Some(FallbackTimer { generation, task });
    }

    fn cancel_fallback(&mut self) {
        if let Some(timer) = self.fallback.take() {
            debug!(generation = timer.generation, "fallback timer cancelled");
        }
    }

    fn on_fallback(&mut self, generation: u64) {
        let armed = self.fallback.as_ref().map(|timer| timer.generation);
        if armed != Some(generation) {
            debug!(generation, "stale fallback firing dropped");
            return;
        }

        self.fallback = None;
        warn!(generation, "no completion signal from the video surface, advancing on fallback timer");
        self.dispatch(Event::SegmentFinished);
    }

    fn publish(&self, diagnostic: Option<String>) {
        self.snapshots.send_replace(FlowSnapshot {
            view: self.controller.view(),
            diagnostic,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;
    use crate::content::{Artifact, LessonContent, Question};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum SurfaceCall {
        Play { muted: bool },
        Skip,
        SetMuted(bool),
    }

    #[derive(Clone, Default)]
    struct RecordingSurface {
        calls: Arc<Mutex<Vec<SurfaceCall>>>,
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl VideoSurface for RecordingSurface {
        fn play(&mut self, _segment: &VideoSegment, muted: bool) {
            self.calls.lock().unwrap().push(SurfaceCall::Play { muted });
        }

        fn skip(&mut self) {
            self.calls.lock().unwrap().push(SurfaceCall::Skip);
        }

        fn set_muted(&mut self, muted: bool) {
            self.calls.lock().unwrap().push(SurfaceCall::SetMuted(muted));
        }
    }

    fn controller() -> ScreenController {
        let lesson = LessonContent::new(
            "leccion-1",
            "La Peste Negra",
            VideoSegment::new("uZKUthKdKKY", 194, 267).unwrap(),
            vec![Question::new("Q1", ["Europa", "Oceanía"], 0)],
            Artifact::new("Máscara", "plague-mask.png"),
        )
        .unwrap();
        ScreenController::new(Arc::new(lesson))
    }

    async fn wait_for(handle: &FlowHandle, kind: ScreenKind) {
        handle
            .subscribe()
            .wait_for(|snapshot| snapshot.view.kind() == kind)
            .await
            .unwrap();
    }

    #[test]
    fn fallback_delay_subtracts_margin() {
        let segment = VideoSegment::new("abc", 194, 267).unwrap();
        assert_eq!(
            fallback_delay(&segment, DEFAULT_FALLBACK_MARGIN),
            Duration::from_secs(72)
        );

        let short = VideoSegment::new("abc", 0, 1).unwrap();
        assert_eq!(fallback_delay(&short, DEFAULT_FALLBACK_MARGIN), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_timer_advances_to_quiz() {
        let surface = RecordingSurface::default();
        let (runtime, handle) = FlowRuntime::new(controller(), surface.clone(), DEFAULT_FALLBACK_MARGIN);
        tokio::spawn(runtime.run());

        handle.submit(Event::StartLesson).await.unwrap();
        wait_for(&handle, ScreenKind::Video).await;
        let started = Instant::now();

        wait_for(&handle, ScreenKind::Quiz).await;
        let elapsed = started.elapsed();
        assert!(elapsed <= Duration::from_secs(73), "{elapsed:?}");
        assert!(elapsed >= Duration::from_secs(72), "{elapsed:?}");
        assert_eq!(surface.calls(), vec![SurfaceCall::Play { muted: false }]);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_cancels_the_fallback_timer() {
        let surface = RecordingSurface::default();
        let (runtime, handle) = FlowRuntime::new(controller(), surface.clone(), DEFAULT_FALLBACK_MARGIN);
        tokio::spawn(runtime.run());

        handle.submit(Event::StartLesson).await.unwrap();
        handle.submit(Event::SkipRequested).await.unwrap();
        handle.submit(Event::AnswerSubmitted { index: 1 }).await.unwrap();
        handle
            .subscribe()
            .wait_for(|s| matches!(&s.view, ScreenView::Quiz(q) if q.attempts == 1))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;

        let ScreenView::Quiz(view) = handle.snapshot().view else {
            panic!("expected to still be on the quiz");
        };
        assert_eq!(view.attempts, 1);
        assert_eq!(view.selection, Some(1));
        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Play { muted: false }, SurfaceCall::Skip]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_video_cancels_the_fallback_callback() {
        for exit in [Event::SkipRequested, Event::SegmentFinished] {
            let (mut runtime, _handle) =
                FlowRuntime::new(controller(), RecordingSurface::default(), DEFAULT_FALLBACK_MARGIN);

            runtime.dispatch(Event::StartLesson);
            assert!(runtime.fallback.is_some());

            runtime.dispatch(exit);
            assert_eq!(runtime.controller.current(), ScreenKind::Quiz);
            assert!(runtime.fallback.is_none(), "{exit} left the timer armed");

            // well past the 72s deadline
            tokio::time::sleep(Duration::from_secs(120)).await;
            assert!(
                runtime.fired_rx.try_recv().is_err(),
                "fallback fired after {exit}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_events_surface_a_diagnostic() {
        let (runtime, handle) =
            FlowRuntime::new(controller(), RecordingSurface::default(), DEFAULT_FALLBACK_MARGIN);
        tokio::spawn(runtime.run());

        handle.submit(Event::AdvanceRequested).await.unwrap();
        let snapshot = handle
            .subscribe()
            .wait_for(|s| s.diagnostic.is_some())
            .await
            .unwrap()
            .clone();

        assert_eq!(snapshot.view.kind(), ScreenKind::Map);
        assert_eq!(
            snapshot.diagnostic.as_deref(),
            Some("AdvanceRequested is not accepted on the map screen")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mute_is_forwarded_to_the_surface() {
        let surface = RecordingSurface::default();
        let (runtime, handle) = FlowRuntime::new(controller(), surface.clone(), DEFAULT_FALLBACK_MARGIN);
        tokio::spawn(runtime.run());

        handle.submit(Event::StartLesson).await.unwrap();
        handle.submit(Event::SetMuted { muted: true }).await.unwrap();
        handle
            .subscribe()
            .wait_for(|s| matches!(s.view, ScreenView::Video { muted: true, .. }))
            .await
            .unwrap();

        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Play { muted: false }, SurfaceCall::SetMuted(true)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_on_the_end_screen() {
        let (runtime, handle) =
            FlowRuntime::new(controller(), RecordingSurface::default(), DEFAULT_FALLBACK_MARGIN);
        let flow = tokio::spawn(runtime.run());

        handle.submit(Event::SelectLockedLesson).await.unwrap();
        assert_eq!(flow.await.unwrap(), ScreenKind::End);
        assert_eq!(handle.snapshot().view, ScreenView::End);
        assert_eq!(handle.submit(Event::StartLesson).await, Err(FlowClosed));
    }
}
