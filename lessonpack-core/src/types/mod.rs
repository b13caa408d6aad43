//! Core content model types

mod course;
mod image;
mod quiz;
mod resources;
mod slices;

pub use course::{Chapter, ChapterId, Course, KeyPoint, VisualType};
pub use image::{extension_for_mime, mime_for_extension, DataUrl, ImageRef};
pub use quiz::{QuestionDefect, Quiz, QuizQuestion, OPTION_COUNT};
pub use resources::{ChapterResources, ResourceLink};
pub use slices::{
    ChapterContent, ContentKind, ContentSlices, HtmlMap, ImageMap, QuizMap, ResourceMap,
};
