//! Candidate file discovery.
//!
//! Walks the directory tree and classifies every regular file by its
//! lowercase extension. With `media_only`, files outside the image/video
//! allow-list (plus any extra extensions) are left out of the scan.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ScannerConfig;
use crate::db::MediaKind;

pub struct Discovery {
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
    extra_extensions: Vec<String>,
    media_only: bool,
}

impl Discovery {
    pub fn new(config: &ScannerConfig, extra_extensions: &[String], media_only: bool) -> Self {
        let normalize = |exts: &[String]| -> Vec<String> {
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect()
        };
        Self {
            image_extensions: normalize(&config.image_extensions),
            video_extensions: normalize(&config.video_extensions),
            extra_extensions: normalize(extra_extensions),
            media_only,
        }
    }

    pub fn classify(&self, extension: &str) -> MediaKind {
        if self.image_extensions.iter().any(|e| e == extension) {
            MediaKind::Image
        } else if self.video_extensions.iter().any(|e| e == extension) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    fn accepts(&self, extension: &str) -> bool {
        if !self.media_only {
            return true;
        }
        self.classify(extension) != MediaKind::Other
            || self.extra_extensions.iter().any(|e| e == extension)
    }

    /// All candidate files under `directory`, sorted by path for a
    /// deterministic dispatch order.
    pub fn discover(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(directory)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if self.accepts(&ext) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn discovers_all_files_by_default() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("photo1.jpg")).unwrap();
        File::create(dir.path().join("clip.mp4")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        File::create(dir.path().join("subdir/photo2.jpeg")).unwrap();

        let discovery = Discovery::new(&ScannerConfig::default(), &[], false);
        let files = discovery.discover(&dir.path().to_path_buf()).unwrap();
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn media_only_filters_by_extension() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("photo.jpg")).unwrap();
        File::create(dir.path().join("clip.mov")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let discovery = Discovery::new(&ScannerConfig::default(), &[], true);
        let files = discovery.discover(&dir.path().to_path_buf()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn extra_extensions_extend_the_allow_list() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("raw1.cr2")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let extra = vec!["cr2".to_string()];
        let discovery = Discovery::new(&ScannerConfig::default(), &extra, true);
        let files = discovery.discover(&dir.path().to_path_buf()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().ends_with("raw1.cr2"));
    }

    #[test]
    fn classify_uses_configured_sets() {
        let discovery = Discovery::new(&ScannerConfig::default(), &[], false);
        assert_eq!(discovery.classify("jpg"), MediaKind::Image);
        assert_eq!(discovery.classify("mp4"), MediaKind::Video);
        assert_eq!(discovery.classify("txt"), MediaKind::Other);
    }
}
