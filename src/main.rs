use std::env;
use std::io::{self, Write};

use anyhow::Context;
use lessonflow::config::Config;
use lessonflow::content::{load_catalog, LessonCatalog, VideoSegment};
use lessonflow::quiz::AnswerStatus;
use lessonflow::runtime::{FlowRuntime, FlowSnapshot, VideoSurface};
use lessonflow::screen::{Event, ScreenController, ScreenKind, ScreenView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Announces playback in the terminal. It never reports completion itself,
/// so the fallback timer (or `s`) moves the flow on.
struct TerminalSurface;

impl VideoSurface for TerminalSurface {
    fn play(&mut self, segment: &VideoSegment, muted: bool) {
        println!(
            "▶ playing {} from {}s to {}s{}",
            segment.source_id(),
            segment.start_offset_secs(),
            segment.end_offset_secs(),
            if muted { " (muted)" } else { "" }
        );
    }

    fn skip(&mut self) {
        println!("⏭ segment skipped");
    }

    fn set_muted(&mut self, muted: bool) {
        println!("{}", if muted { "🔇 muted" } else { "🔊 unmuted" });
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Usage: lessonflow [lesson_file]");
            return Err(e);
        }
    };

    let catalog = load_catalog(&config.lesson_path).context(format!(
        "could not load lesson from {}",
        config.lesson_path.display()
    ))?;

    let controller = ScreenController::new(catalog.lesson().clone()).with_muted(config.muted);
    let (runtime, handle) = FlowRuntime::new(controller, TerminalSurface, config.fallback_margin);
    let flow = tokio::spawn(runtime.run());

    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    render(&mut stdout, &snapshots.borrow_and_update(), &catalog)?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&mut stdout, &snapshot, &catalog)?;
                if snapshot.view.kind() == ScreenKind::End {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                let input = line.trim();
                if input == "q" {
                    break;
                }

                match parse_command(&handle.snapshot().view, input, catalog.locked().len()) {
                    Some(event) => {
                        if handle.submit(event).await.is_err() {
                            break;
                        }
                    }
                    None => println!("unknown command '{}'", input),
                }
            }
        }
    }

    drop(handle);
    drop(snapshots);
    let last = flow.await.context("lesson flow task failed")?;
    info!(screen = %last, "lesson flow stopped");

    Ok(())
}

/// Maps a line typed by the user to an event for the screen being shown.
fn parse_command(view: &ScreenView, input: &str, locked: usize) -> Option<Event> {
    match view {
        ScreenView::Map { .. } => match input.parse::<usize>().ok()? {
            1 => Some(Event::StartLesson),
            n if (2..=locked + 1).contains(&n) => Some(Event::SelectLockedLesson),
            _ => None,
        },
        ScreenView::Video { muted, .. } => match input {
            "s" => Some(Event::SkipRequested),
            "m" => Some(Event::SetMuted { muted: !muted }),
            _ => None,
        },
        ScreenView::Quiz(_) => match input {
            "r" => Some(Event::RetryRequested),
            "n" => Some(Event::AdvanceRequested),
            number => {
                let index = number.parse::<usize>().ok()?.checked_sub(1)?;
                Some(Event::AnswerSubmitted { index })
            }
        },
        ScreenView::Victory { .. } => match input {
            "c" | "" => Some(Event::ContinueRequested),
            _ => None,
        },
        ScreenView::End => None,
    }
}

/// Draws the current screen. Rejected-event diagnostics only go to the log.
fn render(out: &mut impl Write, snapshot: &FlowSnapshot, catalog: &LessonCatalog) -> io::Result<()> {
    writeln!(out)?;
    match &snapshot.view {
        ScreenView::Map { title, .. } => {
            writeln!(out, "{BOLD}Lesson map{RESET}")?;
            writeln!(out, "  1. {} (unlocked)", title)?;
            for (i, node) in catalog.locked().iter().enumerate() {
                writeln!(out, "  {}. {} (locked)", i + 2, node.title)?;
            }
            writeln!(out, "choose a lesson number")?;
        }
        ScreenView::Video { title, segment, .. } => {
            writeln!(out, "{BOLD}{}{RESET}", title)?;
            writeln!(
                out,
                "watching a {}s segment, the challenge starts when it ends",
                segment.duration().as_secs()
            )?;
            writeln!(out, "s = skip to the challenge, m = toggle mute")?;
        }
        ScreenView::Quiz(quiz) => {
            writeln!(
                out,
                "{BOLD}Challenge{RESET} {}/{} [{}%]",
                quiz.question_number, quiz.total, quiz.progress_percent
            )?;
            writeln!(out, "{}", quiz.prompt)?;
            if let Some(hint) = &quiz.hint {
                writeln!(out, "  hint: {}", hint)?;
            }
            for (i, option) in quiz.options.iter().enumerate() {
                let marker = if quiz.selection == Some(i) { ">" } else { " " };
                writeln!(out, "  {marker} {}. {}", i + 1, option)?;
            }
            match quiz.status {
                AnswerStatus::Unanswered => writeln!(out, "type an option number")?,
                AnswerStatus::AnsweredCorrect => writeln!(out, "✅ correct! n = next")?,
                AnswerStatus::AnsweredWrong => writeln!(out, "❌ not quite. r = try again")?,
            }
        }
        ScreenView::Victory {
            title,
            artifact,
            correct_count,
            total,
        } => {
            writeln!(out, "{BOLD}You made it!{RESET} ({})", title)?;
            writeln!(out, "score: {correct_count}/{total}")?;
            writeln!(out, "artifact earned: {BOLD}{}{RESET}", artifact.name)?;
            if let Some(description) = &artifact.description {
                writeln!(out, "  {}", description)?;
            }
            writeln!(out, "c = back to the lesson map")?;
        }
        ScreenView::End => {
            writeln!(out, "{BOLD}End of the demo{RESET}")?;
            writeln!(out, "more lessons are on the way.")?;
        }
    }

    if let Some(diagnostic) = &snapshot.diagnostic {
        debug!(%diagnostic, "rejected event not shown to the learner");
    }
    out.flush()
}
