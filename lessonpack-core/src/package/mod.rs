//! Portable teaching packages
//!
//! A package is a zip archive holding a `manifest.json` plus one entry per
//! payload. Images that are canonical data URLs are stored as binary assets
//! under `assets/`, named by content hash, so repeated images are stored once.

mod decoder;
mod encoder;
mod manifest;

pub use decoder::{DecodeOptions, ImportedPackage, PackageDecoder};
pub use encoder::PackageEncoder;
pub use manifest::{
    ChapterEntry, ImageEntry, PackageManifest, PackageStats, QuizEntry, FORMAT_NAME,
    FORMAT_VERSION, MANIFEST_PATH,
};

use crate::error::PackageError;
use crate::types::{ContentSlices, Course};

/// Serialize all content into package bytes
pub fn export_package(slices: &ContentSlices) -> Result<Vec<u8>, PackageError> {
    PackageEncoder::new().encode(slices)
}

/// Decode package bytes into staged content. Nothing is persisted.
pub fn import_package(bytes: &[u8], course: &Course) -> Result<ImportedPackage, PackageError> {
    PackageDecoder::new().decode(bytes, course)
}

/// Read only the manifest of a package
pub fn inspect_package(bytes: &[u8]) -> Result<PackageManifest, PackageError> {
    PackageDecoder::new().read_manifest(bytes)
}
