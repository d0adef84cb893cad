use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// File extensions recognized as gallery images (compared lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// An image shown in the dashboard header strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub path: PathBuf,
    pub caption: String,
}

/// Find images in `dir` whose names start with `prefix`, sorted by name
///
/// Matching is case-insensitive on both prefix and extension. Captions are
/// numbered from 1 in sorted order.
pub fn discover_images(dir: &Path, prefix: &str) -> Result<Vec<GalleryImage>> {
    let prefix = prefix.to_lowercase();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let lower = name.to_lowercase();
        if lower.starts_with(&prefix) && IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(i, name)| GalleryImage {
            path: dir.join(name),
            caption: format!("귀요미 {}호", i + 1),
        })
        .collect())
}
