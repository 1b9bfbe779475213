use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::{
    Artifact, ContentValidationError, LessonCatalog, LessonContent, LockedLesson, Question,
    VideoSegment,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    lesson: LessonDocument,
    #[serde(default)]
    locked: Vec<LockedDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LessonDocument {
    id: Option<String>,
    title: String,
    video: VideoDocument,
    #[serde(default)]
    questions: Vec<QuestionDocument>,
    artifact: ArtifactDocument,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VideoDocument {
    /// source id or URL
    source: String,
    start: u32,
    end: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionDocument {
    prompt: String,
    options: Vec<String>,
    answer: usize,
    hint: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactDocument {
    name: String,
    image: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LockedDocument {
    id: Option<String>,
    title: String,
}

// ids default to the GitHub-style slug of the title
fn id_or_slug(id: Option<String>, title: &str) -> String {
    id.unwrap_or_else(|| github_slugger::Slugger::default().slug(title))
}

impl CatalogDocument {
    fn into_catalog(self) -> Result<LessonCatalog, ContentValidationError> {
        let lesson = self.lesson.into_content()?;
        let locked = self
            .locked
            .into_iter()
            .map(|node| LockedLesson {
                id: id_or_slug(node.id, &node.title),
                title: node.title,
            })
            .collect();

        LessonCatalog::new(lesson, locked)
    }
}

impl LessonDocument {
    fn into_content(self) -> Result<LessonContent, ContentValidationError> {
        let video = VideoSegment::new(&self.video.source, self.video.start, self.video.end)?;

        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                let question = Question::new(q.prompt, q.options, q.answer);
                match q.hint {
                    Some(hint) => question.with_hint(hint),
                    None => question,
                }
            })
            .collect();

        let artifact = Artifact {
            name: self.artifact.name,
            image_ref: self.artifact.image,
            description: self.artifact.description,
        };

        LessonContent::new(
            id_or_slug(self.id, &self.title),
            self.title,
            video,
            questions,
            artifact,
        )
    }
}

impl LessonCatalog {
    pub fn from_yaml_str(document: &str) -> anyhow::Result<Self> {
        let document: CatalogDocument =
            serde_yaml_ng::from_str(document).context("lesson document is not valid YAML")?;
        Ok(document.into_catalog()?)
    }

    pub fn from_json_str(document: &str) -> anyhow::Result<Self> {
        let document: CatalogDocument =
            serde_json::from_str(document).context("lesson document is not valid JSON")?;
        Ok(document.into_catalog()?)
    }
}

/// Reads and validates a lesson file. `.json` files are parsed as JSON,
/// anything else as YAML.
pub fn load_catalog(path: impl AsRef<Path>) -> anyhow::Result<LessonCatalog> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read lesson file {}", path.display()))?;

    let catalog = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => LessonCatalog::from_json_str(&text),
        _ => LessonCatalog::from_yaml_str(&text),
    };

    catalog.with_context(|| format!("lesson file {} is not playable", path.display()))
}
