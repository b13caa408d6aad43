//! Teaching package encoder

use super::manifest::{
    html_path, quiz_path, resources_path, ChapterEntry, ImageEntry, PackageManifest, QuizEntry,
    ASSET_DIR, MANIFEST_PATH,
};
use crate::error::PackageError;
use crate::types::{ChapterId, ContentKind, ContentSlices, ImageMap, ImageRef};
use std::collections::BTreeMap;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Serializes [`ContentSlices`] into a zip teaching package
#[derive(Debug, Clone, Default)]
pub struct PackageEncoder;

/// Payloads collected while building the manifest, keyed by entry path
#[derive(Default)]
struct Payloads {
    entries: BTreeMap<String, Vec<u8>>,
    assets: usize,
}

impl PackageEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode all content into archive bytes
    pub fn encode(&self, slices: &ContentSlices) -> Result<Vec<u8>, PackageError> {
        let mut manifest = PackageManifest::new();
        manifest.kinds = ContentKind::ALL
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();

        let mut payloads = Payloads::default();
        collect_images(&mut manifest, &mut payloads, &slices.images, Track::Gallery);
        collect_images(&mut manifest, &mut payloads, &slices.diagrams, Track::Visual);

        for (&chapter, html) in &slices.html {
            let path = html_path(chapter);
            payloads.entries.insert(path.clone(), html.as_bytes().to_vec());
            entry(&mut manifest, chapter).html = Some(path);
        }

        for (&chapter, resources) in &slices.resources {
            let path = resources_path(chapter);
            payloads.entries.insert(path.clone(), to_json(resources)?);
            entry(&mut manifest, chapter).resources = Some(path);
        }

        for (&chapter, quiz) in &slices.quizzes {
            let path = quiz_path(chapter);
            payloads.entries.insert(path.clone(), to_json(quiz)?);
            manifest.stats.questions += quiz.questions.len();
            entry(&mut manifest, chapter).quiz = Some(QuizEntry {
                path,
                questions: quiz.questions.len(),
            });
        }

        manifest.stats.chapters = manifest.chapters.len();
        manifest.stats.images = slices.images.values().map(Vec::len).sum();
        manifest.stats.diagrams = slices.diagrams.values().map(Vec::len).sum();
        manifest.stats.assets = payloads.assets;

        let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            PackageError::EncodingFailed(format!("Failed to write manifest: {}", e))
        })?;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        self.write_entry(&mut writer, MANIFEST_PATH, &manifest_json)?;
        for (path, data) in &payloads.entries {
            self.write_entry(&mut writer, path, data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| PackageError::EncodingFailed(e.to_string()))?;

        tracing::info!(
            "Exported package {} ({} chapters, {} assets, {} questions)",
            manifest.package_id,
            manifest.stats.chapters,
            manifest.stats.assets,
            manifest.stats.questions
        );

        Ok(cursor.into_inner())
    }

    fn write_entry<W: Write + Seek>(
        &self,
        writer: &mut ZipWriter<W>,
        path: &str,
        data: &[u8],
    ) -> Result<(), PackageError> {
        // Image assets are already compressed; deflating them again only costs time
        let method = if path.starts_with(ASSET_DIR) {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default().compression_method(method);

        writer
            .start_file(path, options)
            .map_err(|e| PackageError::EncodingFailed(format!("{}: {}", path, e)))?;
        writer
            .write_all(data)
            .map_err(|e| PackageError::EncodingFailed(format!("{}: {}", path, e)))
    }
}

/// Which image sequence of a chapter is being written
#[derive(Clone, Copy)]
enum Track {
    Gallery,
    Visual,
}

/// Record an image sequence in the manifest, moving decodable data URLs
/// into content-addressed asset entries
fn collect_images(
    manifest: &mut PackageManifest,
    payloads: &mut Payloads,
    map: &ImageMap,
    track: Track,
) {
    for (&chapter, images) in map {
        let entries: Vec<ImageEntry> = images
            .iter()
            .map(|image| image_entry(image, payloads))
            .collect();

        let chapter_entry = entry(manifest, chapter);
        match track {
            Track::Gallery => chapter_entry.images = Some(entries),
            Track::Visual => chapter_entry.diagrams = Some(entries),
        }
    }
}

fn entry(manifest: &mut PackageManifest, chapter: ChapterId) -> &mut ChapterEntry {
    manifest.chapters.entry(chapter).or_default()
}

fn image_entry(image: &ImageRef, payloads: &mut Payloads) -> ImageEntry {
    use sha2::{Digest, Sha256};

    let Some(data_url) = image.as_data_url() else {
        return ImageEntry::Inline {
            inline: image.as_str().to_string(),
        };
    };

    let digest = hex::encode(Sha256::digest(&data_url.data));
    let path = format!("{}/{}.{}", ASSET_DIR, digest, data_url.extension());
    if !payloads.entries.contains_key(&path) {
        payloads.assets += 1;
        payloads.entries.insert(path.clone(), data_url.data);
    }

    ImageEntry::Asset {
        asset: path,
        mime: data_url.mime_type,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, PackageError> {
    serde_json::to_vec_pretty(value).map_err(|e| PackageError::EncodingFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn test_empty_store_still_declares_every_kind() {
        let bytes = PackageEncoder::new().encode(&ContentSlices::new()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut json = String::new();
        archive
            .by_name(MANIFEST_PATH)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let manifest: PackageManifest = serde_json::from_str(&json).unwrap();
        for kind in ContentKind::ALL {
            assert!(manifest.declares(kind), "{} not declared", kind);
        }
        assert!(manifest.chapters.is_empty());
    }

    #[test]
    fn test_identical_images_share_one_asset() {
        let png = ImageRef::from_bytes("image/png", b"png bytes");
        let mut slices = ContentSlices::new();
        slices.images.insert(1, vec![png.clone(), png.clone()]);
        slices.diagrams.insert(2, vec![png]);

        let bytes = PackageEncoder::new().encode(&slices).unwrap();
        let assets: Vec<_> = entry_names(bytes)
            .into_iter()
            .filter(|n| n.starts_with("assets/"))
            .collect();
        assert_eq!(assets.len(), 1);
        assert!(assets[0].ends_with(".png"));
    }

    #[test]
    fn test_manifest_is_first_entry() {
        let mut slices = ContentSlices::new();
        slices.html.insert(1, "<p>x</p>".to_string());

        let names = entry_names(PackageEncoder::new().encode(&slices).unwrap());
        assert_eq!(names.len(), 2);

        let bytes = PackageEncoder::new().encode(&slices).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), MANIFEST_PATH);
    }

    #[test]
    fn test_remote_images_stay_inline() {
        let mut slices = ContentSlices::new();
        slices
            .images
            .insert(1, vec![ImageRef::new("https://example.com/a.png")]);

        let bytes = PackageEncoder::new().encode(&slices).unwrap();
        assert!(!entry_names(bytes).iter().any(|n| n.starts_with("assets/")));
    }

    #[test]
    fn test_gallery_and_visual_keep_their_fields() {
        let mut slices = ContentSlices::new();
        slices.images.insert(3, vec![ImageRef::new("gallery")]);
        slices
            .diagrams
            .insert(3, vec![ImageRef::new("one"), ImageRef::new("two")]);

        let bytes = PackageEncoder::new().encode(&slices).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let manifest: PackageManifest =
            serde_json::from_reader(archive.by_name(MANIFEST_PATH).unwrap()).unwrap();

        let chapter = &manifest.chapters[&3];
        assert_eq!(chapter.images.as_ref().map(Vec::len), Some(1));
        assert_eq!(chapter.diagrams.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_assets_are_stored_uncompressed() {
        let mut slices = ContentSlices::new();
        slices
            .images
            .insert(1, vec![ImageRef::from_bytes("image/png", &[0u8; 512])]);

        let bytes = PackageEncoder::new().encode(&slices).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let asset = archive
            .file_names()
            .find(|n| n.starts_with(ASSET_DIR))
            .map(String::from)
            .unwrap();
        let file = archive.by_name(&asset).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
        assert_eq!(file.compressed_size(), 512);
    }
}
