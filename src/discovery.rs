use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::types::FileFormat;

/// Expands input paths to the VCF files they name or contain
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Files are kept as given; directories are searched for `.vcf` files.
    /// Duplicates are dropped, first occurrence order is kept.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                let mut dir_files = self.discover_in_directory(path)?;
                dir_files.sort();
                files.extend(dir_files);
            } else {
                files.push(path.clone());
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        debug!("Discovered {} input files", files.len());
        Ok(files)
    }

    fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_vcf(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in: {}", dir.display())
                })?;
                let path = entry.path();

                if path.is_file() && is_vcf(&path) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}

fn is_vcf(path: &Path) -> bool {
    path.extension()
        .map(|ext| FileFormat::from_extension(&ext.to_string_lossy()).is_supported())
        .unwrap_or(false)
}
