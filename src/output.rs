use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::parsers::FileExtraction;

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Tsv,
    Table,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Table => "txt",
        }
    }
}

/// Renders extraction results to stdout or to files in an output directory
pub struct ReportGenerator {
    output_dir: Option<PathBuf>,
}

impl ReportGenerator {
    pub fn stdout() -> Self {
        Self { output_dir: None }
    }

    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: Some(output_dir.to_path_buf()),
        })
    }

    /// Write the report and return the file it went to, if any
    pub fn generate(
        &self,
        results: &[FileExtraction],
        format: ReportFormat,
    ) -> Result<Option<PathBuf>> {
        match &self.output_dir {
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                render(&mut handle, results, format)?;
                Ok(None)
            }
            Some(dir) => {
                let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
                let filename = dir.join(format!("pgx_variants_{}.{}", timestamp, format.extension()));
                let mut file = fs::File::create(&filename)
                    .with_context(|| format!("Failed to create report {}", filename.display()))?;
                render(&mut file, results, format)
                    .with_context(|| format!("Failed to write report to {}", filename.display()))?;
                Ok(Some(filename))
            }
        }
    }
}

pub fn render<W: Write>(out: &mut W, results: &[FileExtraction], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => render_json(out, results),
        ReportFormat::Csv => render_delimited(out, results, b','),
        ReportFormat::Tsv => render_delimited(out, results, b'\t'),
        ReportFormat::Table => render_table(out, results),
    }
}

fn render_json<W: Write>(out: &mut W, results: &[FileExtraction]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)
        .with_context(|| "Failed to serialize results to JSON")?;
    writeln!(out)?;
    Ok(())
}

fn render_delimited<W: Write>(out: &mut W, results: &[FileExtraction], delimiter: u8) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(out);

    wtr.write_record(["sample_id", "success", "gene", "rsid"])?;
    for extraction in results {
        let success = extraction.result.success.to_string();
        for variant in &extraction.result.variants {
            wtr.write_record([
                extraction.sample_id.as_str(),
                success.as_str(),
                variant.gene.symbol(),
                variant.rsid.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn render_table<W: Write>(out: &mut W, results: &[FileExtraction]) -> Result<()> {
    for extraction in results {
        let status = if extraction.result.success {
            style("parsed").green()
        } else {
            style("could not parse file").red().bold()
        };
        writeln!(
            out,
            "{} ({}) - {}",
            style(&extraction.sample_id).bold().cyan(),
            extraction.source_file,
            status
        )?;

        if extraction.result.is_empty() {
            writeln!(out, "    {}", style("no pharmacogenomic variants found").dim())?;
        }
        for variant in &extraction.result.variants {
            writeln!(
                out,
                "    {:<8} {}",
                style(variant.gene.symbol()).green(),
                style(&variant.rsid).yellow()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Vec<FileExtraction> {
        vec![
            FileExtraction {
                sample_id: "p1".to_string(),
                source_file: "p1.vcf".to_string(),
                result: ExtractionResult::completed(vec![
                    DetectedVariant::new(Gene::Cyp2d6, "rs3892097"),
                    DetectedVariant::new(Gene::Tpmt, "rs1142345"),
                ]),
            },
            FileExtraction {
                sample_id: "p2".to_string(),
                source_file: "p2.vcf".to_string(),
                result: ExtractionResult::completed(vec![]),
            },
        ]
    }

    #[test]
    fn test_tsv_rows() -> Result<()> {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), ReportFormat::Tsv)?;
        let text = String::from_utf8(buf)?;
        assert_eq!(
            text,
            "sample_id\tsuccess\tgene\trsid\n\
             p1\ttrue\tCYP2D6\trs3892097\n\
             p1\ttrue\tTPMT\trs1142345\n"
        );
        Ok(())
    }

    #[test]
    fn test_json_round_trips_results() -> Result<()> {
        let mut buf = Vec::new();
        render(&mut buf, &sample(), ReportFormat::Json)?;
        let value: serde_json::Value = serde_json::from_slice(&buf)?;
        assert_eq!(value[0]["variants"][1]["rsid"], "rs1142345");
        assert_eq!(value[1]["success"], true);
        assert_eq!(value[1]["variants"].as_array().map(|v| v.len()), Some(0));
        Ok(())
    }

    #[test]
    fn test_report_file_written() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out_dir = temp_dir.path().join("reports");
        let generator = ReportGenerator::new(&out_dir)?;
        let path = generator.generate(&sample(), ReportFormat::Csv)?;

        let path = path.expect("report path");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));
        let content = fs::read_to_string(path)?;
        assert!(content.starts_with("sample_id,success,gene,rsid"));
        Ok(())
    }
}
