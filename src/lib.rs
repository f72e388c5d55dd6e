//! # pgx-extract
//!
//! Extraction of pharmacogenomically relevant variants from VCF files.
//!
//! Data lines are scanned for a `GENE=` annotation naming one of six
//! pharmacogenes (CYP2D6, CYP2C19, CYP2C9, SLCO1B1, TPMT, DPYD) and an rsID
//! taken from the ID column or the INFO field. The result is an ordered list
//! of (gene, rsID) pairs, deduplicated by rsID, plus a flag telling whether
//! the file could be parsed at all.
//!
//! ```
//! use pgx_extract::{extract, Gene};
//!
//! let result = extract("22\t42128945\trs3892097\tC\tT\t.\tPASS\tGENE=CYP2D6\n");
//! assert!(result.success);
//! assert_eq!(result.variants[0].gene, Gene::Cyp2d6);
//! assert_eq!(result.variants[0].rsid, "rs3892097");
//! ```

pub mod config;
pub mod discovery;
pub mod output;
pub mod parsers;
pub mod types;

// Re-export key types
pub use config::{AppConfig, CliOverrides, FileConfig};
pub use discovery::FileDiscovery;
pub use output::{ReportFormat, ReportGenerator};
pub use parsers::{extract, FileExtraction, FileParser, VcfExtractor};
pub use types::*;
