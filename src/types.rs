use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pharmacogenes whose annotations are reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gene {
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[serde(rename = "CYP2C9")]
    Cyp2c9,
    #[serde(rename = "SLCO1B1")]
    Slco1b1,
    #[serde(rename = "TPMT")]
    Tpmt,
    #[serde(rename = "DPYD")]
    Dpyd,
}

/// The gene allow-list. Nothing outside this set is ever reported.
pub const TARGET_GENES: [Gene; 6] = [
    Gene::Cyp2d6,
    Gene::Cyp2c19,
    Gene::Cyp2c9,
    Gene::Slco1b1,
    Gene::Tpmt,
    Gene::Dpyd,
];

impl Gene {
    pub fn symbol(&self) -> &'static str {
        match self {
            Gene::Cyp2d6 => "CYP2D6",
            Gene::Cyp2c19 => "CYP2C19",
            Gene::Cyp2c9 => "CYP2C9",
            Gene::Slco1b1 => "SLCO1B1",
            Gene::Tpmt => "TPMT",
            Gene::Dpyd => "DPYD",
        }
    }

    /// Look up an allow-listed gene by symbol, ignoring case
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let upper = symbol.to_ascii_uppercase();
        TARGET_GENES.into_iter().find(|g| g.symbol() == upper)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Gene::Cyp2d6 => "Cytochrome P450 2D6 (codeine, tamoxifen, many antidepressants)",
            Gene::Cyp2c19 => "Cytochrome P450 2C19 (clopidogrel, PPIs, SSRIs)",
            Gene::Cyp2c9 => "Cytochrome P450 2C9 (warfarin, NSAIDs, phenytoin)",
            Gene::Slco1b1 => "Hepatic OATP1B1 transporter (statins)",
            Gene::Tpmt => "Thiopurine S-methyltransferase (azathioprine, mercaptopurine)",
            Gene::Dpyd => "Dihydropyrimidine dehydrogenase (fluorouracil, capecitabine)",
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a targeted pharmacogene")]
pub struct UnknownGene(pub String);

impl FromStr for Gene {
    type Err = UnknownGene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gene::from_symbol(s).ok_or_else(|| UnknownGene(s.to_string()))
    }
}

/// A (gene, rsID) pair that survived every filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectedVariant {
    pub gene: Gene,
    pub rsid: String,
}

impl DetectedVariant {
    pub fn new(gene: Gene, rsid: impl Into<String>) -> Self {
        Self {
            gene,
            rsid: rsid.into(),
        }
    }
}

/// Outcome of one extraction call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionResult {
    pub success: bool,
    pub variants: Vec<DetectedVariant>,
}

/// How a caller should read an [`ExtractionResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The file was scanned to the end; the list may be empty.
    Parsed(Vec<DetectedVariant>),
    /// The file could not be meaningfully parsed; carries what was found before the fault.
    Unparseable(Vec<DetectedVariant>),
}

impl ExtractionResult {
    pub fn completed(variants: Vec<DetectedVariant>) -> Self {
        Self {
            success: true,
            variants,
        }
    }

    pub fn aborted(variants: Vec<DetectedVariant>) -> Self {
        Self {
            success: false,
            variants,
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn into_outcome(self) -> ExtractionOutcome {
        if self.success {
            ExtractionOutcome::Parsed(self.variants)
        } else {
            ExtractionOutcome::Unparseable(self.variants)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileFormat {
    VCF,
    Unknown,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "vcf" => FileFormat::VCF,
            _ => FileFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, FileFormat::VCF)
    }
}
