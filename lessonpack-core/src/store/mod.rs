//! In-memory content store.
//!
//! The store holds the live [`ContentSlices`] and applies [`Mutation`]s
//! through the pure functions in [`ops`]. Each slice is replaced wholesale,
//! never edited in place, and `apply` reports which kinds changed so the
//! caller can schedule persistence for exactly those kinds.

pub mod ops;

use crate::types::{ChapterId, ChapterResources, ContentKind, ContentSlices, ImageRef, Quiz};

/// A single teacher edit
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append one or more images to the gallery
    AddImages {
        chapter: ChapterId,
        images: Vec<ImageRef>,
    },

    /// Replace the gallery with a reordered sequence
    ReorderImages {
        chapter: ChapterId,
        images: Vec<ImageRef>,
    },

    /// Remove one gallery image by index
    RemoveImage { chapter: ChapterId, index: usize },

    /// Remove several gallery images by index
    BulkRemoveImages {
        chapter: ChapterId,
        indices: Vec<usize>,
    },

    /// Move gallery images to the visual-aid track
    MoveToVisual {
        chapter: ChapterId,
        indices: Vec<usize>,
    },

    AddDiagrams {
        chapter: ChapterId,
        diagrams: Vec<ImageRef>,
    },

    ReorderDiagrams {
        chapter: ChapterId,
        diagrams: Vec<ImageRef>,
    },

    RemoveDiagram { chapter: ChapterId, index: usize },

    /// Drop every diagram of a chapter
    ClearDiagrams { chapter: ChapterId },

    /// Set the lecture notes
    SetHtml { chapter: ChapterId, html: String },

    RemoveHtml { chapter: ChapterId },

    /// Replace the chapter's resources
    UpdateResources {
        chapter: ChapterId,
        resources: ChapterResources,
    },

    /// Upsert a quiz under its own chapter id
    SaveQuiz(Quiz),
}

impl Mutation {
    /// Chapter the mutation targets
    pub fn chapter(&self) -> ChapterId {
        match self {
            Mutation::AddImages { chapter, .. }
            | Mutation::ReorderImages { chapter, .. }
            | Mutation::RemoveImage { chapter, .. }
            | Mutation::BulkRemoveImages { chapter, .. }
            | Mutation::MoveToVisual { chapter, .. }
            | Mutation::AddDiagrams { chapter, .. }
            | Mutation::ReorderDiagrams { chapter, .. }
            | Mutation::RemoveDiagram { chapter, .. }
            | Mutation::ClearDiagrams { chapter }
            | Mutation::SetHtml { chapter, .. }
            | Mutation::RemoveHtml { chapter }
            | Mutation::UpdateResources { chapter, .. } => *chapter,
            Mutation::SaveQuiz(quiz) => quiz.chapter_id,
        }
    }
}

/// Owner of the live content
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    slices: ContentSlices,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slices(slices: ContentSlices) -> Self {
        Self { slices }
    }

    pub fn slices(&self) -> &ContentSlices {
        &self.slices
    }

    /// Owned copy of the current content, for work that outlives a borrow
    pub fn snapshot(&self) -> ContentSlices {
        self.slices.clone()
    }

    /// Apply a mutation, returning the kinds whose mapping changed.
    ///
    /// Mutations that would not change anything (out-of-bounds removal,
    /// empty selections, identical values) return an empty list.
    pub fn apply(&mut self, mutation: Mutation) -> Vec<ContentKind> {
        let s = &mut self.slices;
        match mutation {
            Mutation::AddImages { chapter, images } => {
                let next = ops::append_images(&s.images, chapter, &images);
                let changed = replace(&mut s.images, next);
                touched(ContentKind::Images, changed)
            }
            Mutation::ReorderImages { chapter, images } => {
                let next = ops::replace_images(&s.images, chapter, images);
                let changed = replace(&mut s.images, next);
                touched(ContentKind::Images, changed)
            }
            Mutation::RemoveImage { chapter, index } => {
                let next = ops::remove_image_at(&s.images, chapter, index);
                let changed = replace(&mut s.images, next);
                touched(ContentKind::Images, changed)
            }
            Mutation::BulkRemoveImages { chapter, indices } => {
                let next = ops::remove_images_at(&s.images, chapter, &indices);
                let changed = replace(&mut s.images, next);
                touched(ContentKind::Images, changed)
            }
            Mutation::MoveToVisual { chapter, indices } => {
                match ops::move_images(&s.images, &s.diagrams, chapter, &indices) {
                    Some((images, diagrams)) => {
                        s.images = images;
                        s.diagrams = diagrams;
                        vec![ContentKind::Images, ContentKind::Diagrams]
                    }
                    None => Vec::new(),
                }
            }
            Mutation::AddDiagrams { chapter, diagrams } => {
                let next = ops::append_images(&s.diagrams, chapter, &diagrams);
                let changed = replace(&mut s.diagrams, next);
                touched(ContentKind::Diagrams, changed)
            }
            Mutation::ReorderDiagrams { chapter, diagrams } => {
                let next = ops::replace_images(&s.diagrams, chapter, diagrams);
                let changed = replace(&mut s.diagrams, next);
                touched(ContentKind::Diagrams, changed)
            }
            Mutation::RemoveDiagram { chapter, index } => {
                let next = ops::remove_image_at(&s.diagrams, chapter, index);
                let changed = replace(&mut s.diagrams, next);
                touched(ContentKind::Diagrams, changed)
            }
            Mutation::ClearDiagrams { chapter } => {
                let next = ops::clear_images(&s.diagrams, chapter);
                let changed = replace(&mut s.diagrams, next);
                touched(ContentKind::Diagrams, changed)
            }
            Mutation::SetHtml { chapter, html } => {
                let next = ops::set_html(&s.html, chapter, html);
                let changed = replace(&mut s.html, next);
                touched(ContentKind::Html, changed)
            }
            Mutation::RemoveHtml { chapter } => {
                let next = ops::remove_html(&s.html, chapter);
                let changed = replace(&mut s.html, next);
                touched(ContentKind::Html, changed)
            }
            Mutation::UpdateResources { chapter, resources } => {
                let next = ops::set_resources(&s.resources, chapter, resources);
                let changed = replace(&mut s.resources, next);
                touched(ContentKind::Resources, changed)
            }
            Mutation::SaveQuiz(quiz) => {
                let next = ops::upsert_quiz(&s.quizzes, quiz);
                let changed = replace(&mut s.quizzes, next);
                touched(ContentKind::Quizzes, changed)
            }
        }
    }

    /// Swap in a complete set of slices (package import)
    pub fn replace_all(&mut self, slices: ContentSlices) -> Vec<ContentKind> {
        self.slices = slices;
        ContentKind::ALL.to_vec()
    }

    /// Empty every slice (factory reset)
    pub fn clear(&mut self) {
        self.slices = ContentSlices::default();
    }
}

fn touched(kind: ContentKind, changed: bool) -> Vec<ContentKind> {
    if changed {
        vec![kind]
    } else {
        Vec::new()
    }
}

fn replace<T>(slot: &mut T, next: Option<T>) -> bool {
    match next {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}
