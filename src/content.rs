//! Static lesson content: the validated lesson model and its file loader.

mod error;
mod lesson;
mod load;
mod video;

pub use error::ContentValidationError;
pub use lesson::{Artifact, LessonCatalog, LessonContent, LockedLesson, Question};
pub use load::load_catalog;
pub use video::VideoSegment;
