use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::types::*;

pub mod vcf;

pub use vcf::{extract, ExtractionFault, ExtractionStats, LineOutcome, SkipReason, VcfExtractor};

/// Extraction result for one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileExtraction {
    pub sample_id: String,
    pub source_file: String,
    #[serde(flatten)]
    pub result: ExtractionResult,
}

/// Read the raw bytes of an input file.
///
/// Decoding is left to the extractor so that undecodable content shows up
/// as an unsuccessful extraction rather than an I/O error.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads VCF files from disk and runs the variant extractor over them
#[derive(Debug, Default)]
pub struct FileParser {
    extractor: VcfExtractor,
}

impl FileParser {
    pub fn new() -> Self {
        Self {
            extractor: VcfExtractor::new(),
        }
    }

    pub fn parse(&self, path: &Path) -> Result<FileExtraction> {
        let format = path
            .extension()
            .map(|ext| FileFormat::from_extension(&ext.to_string_lossy()))
            .unwrap_or(FileFormat::Unknown);
        if !format.is_supported() {
            warn!("{} does not have a .vcf extension", path.display());
        }

        let raw = read_input(path)?;
        let (result, stats) = self.extractor.extract_with_stats(&raw);

        if result.success {
            info!(
                "{}: {} pharmacogenomic variants from {} lines",
                path.display(),
                result.len(),
                stats.lines
            );
        } else {
            warn!(
                "{}: extraction aborted after {} lines ({} variants kept)",
                path.display(),
                stats.lines,
                result.len()
            );
        }

        Ok(FileExtraction {
            sample_id: sample_id(path),
            source_file: path.to_string_lossy().to_string(),
            result,
        })
    }
}

fn sample_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
