//! Supplementary chapter resources (media and discussion material)

use serde::{Deserialize, Serialize};

/// A titled external link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
}

impl ResourceLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Audio, video and discussion material attached to a chapter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterResources {
    /// Audio reference (URL or data URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    /// Video reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,

    /// Discussion questions, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,

    /// Further reading links, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ResourceLink>>,
}

impl ChapterResources {
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.youtube = Some(video.into());
        self
    }

    pub fn with_questions(mut self, questions: Vec<String>) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_link(mut self, link: ResourceLink) -> Self {
        self.links.get_or_insert_with(Vec::new).push(link);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none()
            && self.youtube.is_none()
            && self.questions.is_none()
            && self.links.is_none()
    }
}
