use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::str::Utf8Error;
use tracing::{debug, error, trace};

use crate::types::*;

/// Zero-based column of the VCF ID field
const ID_COLUMN: usize = 2;
/// Zero-based column of the VCF INFO field
const INFO_COLUMN: usize = 7;
/// CHROM through INFO
const MIN_COLUMNS: usize = 8;

lazy_static! {
    static ref GENE_MARKER: Regex =
        Regex::new(r"(?i:GENE)=([A-Za-z0-9]+)").expect("valid gene marker pattern");
    static ref RSID_MARKER: Regex =
        Regex::new(r"(?i:RS=|rs)([0-9]+)").expect("valid rsID marker pattern");
}

/// Why a single line contributed nothing. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Header,
    TooFewFields,
    NoGeneAnnotation,
    UntargetedGene,
    NoIdentifier,
}

/// Result of inspecting one data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Accepted(DetectedVariant),
    /// The resolved rsID was already reported by an earlier line.
    Duplicate(String),
    Skip(SkipReason),
}

/// A fault that stops extraction of the whole input
#[derive(Debug, thiserror::Error)]
pub enum ExtractionFault {
    #[error("line {line} is not valid UTF-8")]
    InvalidUtf8 {
        line: usize,
        #[source]
        source: Utf8Error,
    },
}

/// Per-call counters, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub lines: usize,
    pub headers: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub too_few_fields: usize,
    pub no_gene_annotation: usize,
    pub untargeted_gene: usize,
    pub no_identifier: usize,
}

impl ExtractionStats {
    fn record(&mut self, outcome: &LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Accepted(_) => self.accepted += 1,
            LineOutcome::Duplicate(_) => self.duplicates += 1,
            LineOutcome::Skip(SkipReason::Header) => self.headers += 1,
            LineOutcome::Skip(SkipReason::TooFewFields) => self.too_few_fields += 1,
            LineOutcome::Skip(SkipReason::NoGeneAnnotation) => self.no_gene_annotation += 1,
            LineOutcome::Skip(SkipReason::UntargetedGene) => self.untargeted_gene += 1,
            LineOutcome::Skip(SkipReason::NoIdentifier) => self.no_identifier += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.headers
            + self.too_few_fields
            + self.no_gene_annotation
            + self.untargeted_gene
            + self.no_identifier
    }
}

/// Ordered, rsID-deduplicated variant list
#[derive(Debug, Default)]
struct VariantAccumulator {
    seen: HashSet<String>,
    variants: Vec<DetectedVariant>,
}

impl VariantAccumulator {
    fn offer(&mut self, gene: Gene, rsid: String) -> LineOutcome {
        if self.seen.contains(&rsid) {
            return LineOutcome::Duplicate(rsid);
        }
        self.seen.insert(rsid.clone());
        let variant = DetectedVariant::new(gene, rsid);
        self.variants.push(variant.clone());
        LineOutcome::Accepted(variant)
    }

    fn into_variants(self) -> Vec<DetectedVariant> {
        self.variants
    }
}

/// Extracts allow-listed pharmacogenomic variants from VCF text
///
/// Each data line is inspected on its own: the gene comes from a `GENE=`
/// tag in INFO, the rsID from the ID column when it starts with `rs`, else
/// from the first `RS=<digits>` or `rs<digits>` in INFO. Lines failing any
/// step are skipped silently. Only input that cannot be read as text aborts
/// the extraction, in which case the variants found so far are returned
/// with `success = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VcfExtractor;

impl VcfExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.extract_bytes(text.as_bytes())
    }

    pub fn extract_bytes(&self, raw: &[u8]) -> ExtractionResult {
        self.extract_with_stats(raw).0
    }

    pub fn extract_with_stats(&self, raw: &[u8]) -> (ExtractionResult, ExtractionStats) {
        let mut accumulator = VariantAccumulator::default();
        let mut stats = ExtractionStats::default();

        let result = match self.scan(raw, &mut accumulator, &mut stats) {
            Ok(()) => ExtractionResult::completed(accumulator.into_variants()),
            Err(fault) => {
                error!("Failed to parse VCF input: {}", fault);
                ExtractionResult::aborted(accumulator.into_variants())
            }
        };

        debug!(
            "Scanned {} lines: {} variants, {} duplicates, {} skipped",
            stats.lines,
            stats.accepted,
            stats.duplicates,
            stats.skipped()
        );
        (result, stats)
    }

    fn scan(
        &self,
        raw: &[u8],
        accumulator: &mut VariantAccumulator,
        stats: &mut ExtractionStats,
    ) -> Result<(), ExtractionFault> {
        for (index, raw_line) in split_lines(raw).into_iter().enumerate() {
            let line_number = index + 1;
            let line = std::str::from_utf8(raw_line).map_err(|source| {
                ExtractionFault::InvalidUtf8 {
                    line: line_number,
                    source,
                }
            })?;

            let outcome = match self.inspect_line(line) {
                Ok((gene, rsid)) => accumulator.offer(gene, rsid),
                Err(reason) => LineOutcome::Skip(reason),
            };
            trace!("line {}: {:?}", line_number, outcome);
            stats.record(&outcome);
        }

        Ok(())
    }

    /// Resolve one line to a (gene, rsID) candidate, or say why it is skipped
    pub fn inspect_line(&self, line: &str) -> Result<(Gene, String), SkipReason> {
        if line.starts_with('#') {
            return Err(SkipReason::Header);
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_COLUMNS {
            return Err(SkipReason::TooFewFields);
        }

        let id_field = fields[ID_COLUMN];
        let info_field = fields[INFO_COLUMN];

        let token = gene_token(info_field).ok_or(SkipReason::NoGeneAnnotation)?;
        let gene = Gene::from_symbol(token).ok_or(SkipReason::UntargetedGene)?;
        let rsid = resolve_rsid(id_field, info_field).ok_or(SkipReason::NoIdentifier)?;

        Ok((gene, rsid))
    }
}

/// Split on `\n`, `\r\n` or a lone `\r`. A final terminator does not start a
/// new line, and a single trailing blank line is dropped.
fn split_lines(raw: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'\n' => {
                lines.push(&raw[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&raw[start..i]);
                i += if raw.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < raw.len() {
        lines.push(&raw[start..]);
    }
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
}

/// Convenience wrapper around [`VcfExtractor::extract`]
pub fn extract(text: &str) -> ExtractionResult {
    VcfExtractor::new().extract(text)
}

fn gene_token(info: &str) -> Option<&str> {
    GENE_MARKER
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// The INFO pattern matches its first occurrence anywhere, including inside
// other tokens such as `chrs12`.
fn resolve_rsid(id_field: &str, info: &str) -> Option<String> {
    if id_field.starts_with("rs") {
        return Some(id_field.to_string());
    }

    RSID_MARKER
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|digits| format!("rs{}", digits.as_str()))
}
