use std::collections::BTreeMap;
use std::env;

use anyhow::Context;
use lessonflow::content::{load_catalog, LessonCatalog};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn parse_paths(args: impl Iterator<Item = String>) -> anyhow::Result<Vec<String>> {
    let paths: Vec<String> = args.collect();
    if paths.is_empty() {
        return Err(anyhow::anyhow!("at least one lesson file is required"));
    }
    Ok(paths)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let paths = match parse_paths(env::args().skip(1)) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Usage: check_lesson <lesson_file>...");
            return Err(e);
        }
    };

    for path in &paths {
        let catalog = load_catalog(path).context(format!("{} failed validation", path))?;
        let summary = summarize(&catalog).context("failed to serialize lesson summary")?;

        println!("{BOLD}{}{RESET}", path);
        println!("---");
        print!("{}", summary);
        println!("---\n");
    }

    println!("checked {BOLD}{}{RESET} lesson file(s)", paths.len());

    Ok(())
}

fn summarize(catalog: &LessonCatalog) -> anyhow::Result<String> {
    let lesson = catalog.lesson();
    let video = lesson.video();

    let mut map = BTreeMap::<&str, SummaryField>::new();
    map.insert("id", SummaryField::Text(lesson.id()));
    map.insert("title", SummaryField::Text(lesson.title()));
    map.insert(
        "video",
        SummaryField::Segment {
            source: video.source_id(),
            start: video.start_offset_secs(),
            end: video.end_offset_secs(),
            seconds: video.duration().as_secs(),
        },
    );
    map.insert("questions", SummaryField::Count(lesson.questions().len()));
    map.insert("artifact", SummaryField::Text(lesson.artifact().name.as_str()));
    map.insert(
        "locked",
        SummaryField::Ids(catalog.locked().iter().map(|node| node.id.as_str()).collect()),
    );

    Ok(serde_yaml_ng::to_string(&map)?)
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum SummaryField<'a> {
    Text(&'a str),
    Count(usize),
    Segment {
        source: &'a str,
        start: u32,
        end: u32,
        seconds: u64,
    },
    Ids(Vec<&'a str>),
}
