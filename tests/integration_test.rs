use pgx_extract::{
    output::{render, ReportFormat},
    parsers::*,
    types::*,
    FileDiscovery,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;
use std::path::PathBuf;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn line(id: &str, info: &str) -> String {
    format!("1\t1000\t{}\tA\tG\t.\tPASS\t{}", id, info)
}

#[test]
fn test_panel_file() -> anyhow::Result<()> {
    let extraction = FileParser::new().parse(&data_path("panel.vcf"))?;

    assert_eq!(extraction.sample_id, "panel");
    assert!(extraction.result.success);
    assert_eq!(
        extraction.result.variants,
        vec![
            DetectedVariant::new(Gene::Cyp2d6, "rs3892097"),
            DetectedVariant::new(Gene::Cyp2c19, "rs4244285"),
            DetectedVariant::new(Gene::Cyp2c9, "rs1057910"),
            DetectedVariant::new(Gene::Slco1b1, "rs4149056"),
            DetectedVariant::new(Gene::Tpmt, "rs1142345"),
            DetectedVariant::new(Gene::Dpyd, "rs3918290"),
        ]
    );
    Ok(())
}

#[test]
fn test_panel_stats() -> anyhow::Result<()> {
    let raw = read_input(&data_path("panel.vcf"))?;
    let (_, stats) = VcfExtractor::new().extract_with_stats(&raw);

    assert_eq!(stats.lines, 16);
    assert_eq!(stats.headers, 5);
    assert_eq!(stats.accepted, 6);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.too_few_fields, 1);
    assert_eq!(stats.no_gene_annotation, 1);
    assert_eq!(stats.untargeted_gene, 1);
    assert_eq!(stats.no_identifier, 1);
    Ok(())
}

#[test]
fn test_file_without_target_genes_is_empty_success() -> anyhow::Result<()> {
    let extraction = FileParser::new().parse(&data_path("no_pgx.vcf"))?;
    assert_eq!(extraction.result.clone().into_outcome(), ExtractionOutcome::Parsed(vec![]));
    Ok(())
}

#[test]
fn test_unreadable_text_is_unsuccessful() {
    let mut raw = line("rs1799853", "GENE=CYP2C9").into_bytes();
    raw.push(b'\n');
    raw.extend_from_slice(b"\xc3\x28\tgarbage\n");

    let result = VcfExtractor::new().extract_bytes(&raw);
    assert_eq!(
        result.into_outcome(),
        ExtractionOutcome::Unparseable(vec![DetectedVariant::new(Gene::Cyp2c9, "rs1799853")])
    );
}

#[rstest]
#[case::single_line(line("rs12345", "GENE=CYP2D6"), vec![(Gene::Cyp2d6, "rs12345")])]
#[case::info_fallback(line(".", "GENE=TPMT;RS=778;OTHER=x"), vec![(Gene::Tpmt, "rs778")])]
#[case::untargeted(line("rs1", "GENE=ABCB1"), vec![])]
#[case::duplicate_same_gene(
    [line("rs999", "GENE=CYP2D6"), line("rs999", "GENE=CYP2D6")].join("\n"),
    vec![(Gene::Cyp2d6, "rs999")]
)]
#[case::duplicate_other_gene(
    [line("rs999", "GENE=CYP2C19"), line(".", "GENE=DPYD;RS=999")].join("\n"),
    vec![(Gene::Cyp2c19, "rs999")]
)]
#[case::five_fields("1\t1000\trs5\tA\tG".to_string(), vec![])]
#[case::empty(String::new(), vec![])]
fn test_scenarios(#[case] input: String, #[case] expected: Vec<(Gene, &str)>) {
    let result = extract(&input);
    assert!(result.success);
    let expected: Vec<DetectedVariant> = expected
        .into_iter()
        .map(|(gene, rsid)| DetectedVariant::new(gene, rsid))
        .collect();
    assert_eq!(result.variants, expected);
}

#[test]
fn test_result_invariants_over_mixed_input() {
    let genes = ["CYP2D6", "cyp2c19", "ABCB1", "TPMT", "VKORC1", "DPYD", "slco1b1", "CYP2C9"];
    let mut lines = vec!["##fileformat=VCFv4.2".to_string()];
    for i in 0..200 {
        let gene = genes[i % genes.len()];
        let rsid = 1000 + (i * 7) % 37;
        if i % 3 == 0 {
            lines.push(line(".", &format!("GENE={};RS={}", gene, rsid)));
        } else {
            lines.push(line(&format!("rs{}", rsid), &format!("GENE={}", gene)));
        }
        if i % 11 == 0 {
            lines.push(format!("#{}", line("rs1", "GENE=CYP2D6")));
        }
    }
    let text = lines.join("\n");

    let result = extract(&text);
    assert!(result.success);
    assert_eq!(result, extract(&text));

    let mut seen = HashSet::new();
    for variant in &result.variants {
        assert!(seen.insert(variant.rsid.clone()), "duplicate {}", variant.rsid);
        assert!(TARGET_GENES.contains(&variant.gene));
        assert_ne!(variant.rsid, "rs1");
    }

    // First-seen order: each rsID's first accepted line comes before the next one's.
    let extractor = VcfExtractor::new();
    let mut first_seen = Vec::new();
    for l in &lines {
        if let Ok((_, rsid)) = extractor.inspect_line(l) {
            if !first_seen.contains(&rsid) {
                first_seen.push(rsid);
            }
        }
    }
    let rsids: Vec<String> = result.variants.iter().map(|v| v.rsid.clone()).collect();
    assert_eq!(rsids, first_seen);
}

#[test]
fn test_discover_and_render() -> anyhow::Result<()> {
    let files = FileDiscovery::new(false).discover(&[data_path("")])?;
    assert_eq!(files, vec![data_path("no_pgx.vcf"), data_path("panel.vcf")]);

    let parser = FileParser::new();
    let results = files
        .iter()
        .map(|f| parser.parse(f))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut buf = Vec::new();
    render(&mut buf, &results, ReportFormat::Csv)?;
    let text = String::from_utf8(buf)?;
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows[0], "sample_id,success,gene,rsid");
    assert_eq!(rows[1], "panel,true,CYP2D6,rs3892097");
    assert_eq!(rows.len(), 7);
    Ok(())
}
