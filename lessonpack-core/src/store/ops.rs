//! Pure copy-on-write mutations over content mappings.
//!
//! Every function takes the current mapping and returns a new one, leaving
//! the input untouched. `None` means the mutation would not change anything,
//! which callers use to skip persistence.

use crate::types::{
    ChapterId, ChapterResources, HtmlMap, ImageMap, ImageRef, Quiz, QuizMap, ResourceMap,
};
use std::collections::BTreeSet;

/// Append images to a chapter's sequence
pub fn append_images(
    map: &ImageMap,
    chapter: ChapterId,
    images: &[ImageRef],
) -> Option<ImageMap> {
    if images.is_empty() {
        return None;
    }
    let mut next = map.clone();
    next.entry(chapter).or_default().extend_from_slice(images);
    Some(next)
}

/// Replace a chapter's sequence (reordering)
pub fn replace_images(
    map: &ImageMap,
    chapter: ChapterId,
    images: Vec<ImageRef>,
) -> Option<ImageMap> {
    if map.get(&chapter) == Some(&images) {
        return None;
    }
    let mut next = map.clone();
    next.insert(chapter, images);
    Some(next)
}

/// Remove the image at `index`. Out-of-bounds indices are a no-op.
pub fn remove_image_at(map: &ImageMap, chapter: ChapterId, index: usize) -> Option<ImageMap> {
    let current = map.get(&chapter)?;
    if index >= current.len() {
        return None;
    }
    let mut next = map.clone();
    if let Some(images) = next.get_mut(&chapter) {
        images.remove(index);
    }
    Some(next)
}

/// Remove every listed index. Unknown indices are ignored.
pub fn remove_images_at(
    map: &ImageMap,
    chapter: ChapterId,
    indices: &[usize],
) -> Option<ImageMap> {
    let current = map.get(&chapter)?;
    let (_, kept) = partition(current, indices);
    if kept.len() == current.len() {
        return None;
    }
    let mut next = map.clone();
    next.insert(chapter, kept);
    Some(next)
}

/// Move the selected gallery images to the end of the chapter's diagrams.
///
/// Moved images keep their gallery order. Both mappings are computed from
/// the same snapshot, so an image ends up in exactly one of them.
pub fn move_images(
    images: &ImageMap,
    diagrams: &ImageMap,
    chapter: ChapterId,
    indices: &[usize],
) -> Option<(ImageMap, ImageMap)> {
    let current = images.get(&chapter)?;
    let (moved, kept) = partition(current, indices);
    if moved.is_empty() {
        return None;
    }

    let mut next_images = images.clone();
    next_images.insert(chapter, kept);

    let mut next_diagrams = diagrams.clone();
    next_diagrams.entry(chapter).or_default().extend(moved);

    Some((next_images, next_diagrams))
}

/// Drop a chapter's sequence entirely
pub fn clear_images(map: &ImageMap, chapter: ChapterId) -> Option<ImageMap> {
    if !map.contains_key(&chapter) {
        return None;
    }
    let mut next = map.clone();
    next.remove(&chapter);
    Some(next)
}

pub fn set_html(map: &HtmlMap, chapter: ChapterId, html: String) -> Option<HtmlMap> {
    if map.get(&chapter) == Some(&html) {
        return None;
    }
    let mut next = map.clone();
    next.insert(chapter, html);
    Some(next)
}

pub fn remove_html(map: &HtmlMap, chapter: ChapterId) -> Option<HtmlMap> {
    if !map.contains_key(&chapter) {
        return None;
    }
    let mut next = map.clone();
    next.remove(&chapter);
    Some(next)
}

pub fn set_resources(
    map: &ResourceMap,
    chapter: ChapterId,
    resources: ChapterResources,
) -> Option<ResourceMap> {
    if map.get(&chapter) == Some(&resources) {
        return None;
    }
    let mut next = map.clone();
    next.insert(chapter, resources);
    Some(next)
}

/// Upsert a quiz keyed by its own chapter id. No validation happens here.
pub fn upsert_quiz(map: &QuizMap, quiz: Quiz) -> Option<QuizMap> {
    if map.get(&quiz.chapter_id) == Some(&quiz) {
        return None;
    }
    let mut next = map.clone();
    next.insert(quiz.chapter_id, quiz);
    Some(next)
}

/// Split a sequence into (selected, remaining), both in original order
fn partition(images: &[ImageRef], indices: &[usize]) -> (Vec<ImageRef>, Vec<ImageRef>) {
    let selected: BTreeSet<usize> = indices.iter().copied().collect();
    let mut picked = Vec::new();
    let mut kept = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        if selected.contains(&i) {
            picked.push(image.clone());
        } else {
            kept.push(image.clone());
        }
    }
    (picked, kept)
}
