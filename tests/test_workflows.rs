extern crate gpcr;

mod util;

use std::collections::HashSet;

use gpcr::analysis::comparison::{comparison_table, load_comparison};
use gpcr::analysis::orthologs::load_combined_orthologs;
use gpcr::analysis::residue_map::{filter_reference_residues, load_residue_map, residue_table};
use gpcr::bio::classify::Category;
use gpcr::bio::reproject::ReprojectionMode;
use gpcr::bio::snake::{category_fills, conservation_fill_table, fill_boundary_offset, Side};
use gpcr::config::{CategoryColours, Config};
use gpcr::error::GpcrError;
use gpcr::export::{format_fasta_records, write_delimited, Delimiter};
use gpcr::fetch::{FileKind, SourceCache};
use gpcr::types::{GeneName, ResidueNumber};

use util::{alignment_dir, data_path, get_test_catalog};

#[tokio::test]
async fn test_compare_receptors() {
    let catalog = get_test_catalog();

    let comparison = load_comparison(&catalog, &alignment_dir(), "htr1a", "HTR1B").await.unwrap();
    assert_eq!(comparison.gene1.as_str(), "HTR1A");

    let entries = comparison.recompute(50.0).unwrap();
    let table = comparison_table(&entries, &comparison.gene1, &comparison.gene2);

    assert_eq!(table.len(), 10);
    assert_eq!(table.rows[0], vec!["1", "M", "95.00", "1", "M", "98.00", "Common Residues"]);
    assert_eq!(table.rows[5], vec!["2", "D", "80.00", "2", "E", "85.00",
                                   "Specifically Conserved for Both"]);

    // HTR1A has a gap opposite HTR1B residue 7
    let gap_row = &table.rows[8];
    assert_eq!(gap_row[..3], ["-", "-", "-"]);
    assert_eq!(gap_row[3..6], ["7", "A", "65.00"]);
    assert_eq!(gap_row[6], "Specifically Conserved for Receptor 2");

    let mut out: Vec<u8> = vec![];
    write_delimited(&mut out, &table, Delimiter::Tab).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTR1A Residue #\tHTR1A Conserved AA\t"));
    assert_eq!(text.lines().count(), 11);

    // raising the threshold never adds rows
    let strict = comparison.recompute(90.0).unwrap();
    assert!(strict.len() < entries.len());
    assert!(strict.iter().all(|entry| entry.category != Category::SpecificBoth));

    let fills = category_fills(&entries, Side::Second, &CategoryColours::default());
    // every entry but the one where HTR1B has a gap
    assert_eq!(fills.len(), 9);
    assert!(fills.iter().all(|fill| !fill.colour.is_empty()));
}

#[tokio::test]
async fn test_compare_conservation_gradient() {
    let catalog = get_test_catalog();
    let config = Config::from_json(r##"{"conservation_fill_colour": "#2A9D8F"}"##).unwrap();

    let comparison = load_comparison(&catalog, &alignment_dir(), "HTR1A", "HTR1B").await.unwrap();

    let fills = comparison.conservation_fills(Side::Second, &config.conservation_fill_colour);
    assert_eq!(fills.len(), comparison.conservation_b.len());
    assert!(fills.iter().all(|fill| fill.colour.as_str() == "#2A9D8F"));

    let first_row = &comparison.conservation_b[&1];
    assert_eq!(fills[0].offset, fill_boundary_offset(first_row.conservation_percent));

    let mut out: Vec<u8> = vec![];
    write_delimited(&mut out, &conservation_fill_table(&fills), Delimiter::Comma).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("Residue #,Offset %,Colour\n"));
    assert_eq!(text.lines().count(), fills.len() + 1);
    assert!(text.lines().skip(1).all(|line| line.ends_with(",#2A9D8F")));
}

#[tokio::test]
async fn test_compare_errors() {
    let catalog = get_test_catalog();

    let result = load_comparison(&catalog, &alignment_dir(), "HTR1A", "GABBR1").await;
    assert!(matches!(result, Err(GpcrError::ClassMismatch { .. })));

    let result = load_comparison(&catalog, &alignment_dir(), "HTR1A", "htr1a").await;
    assert!(matches!(result, Err(GpcrError::SameReceptor(_))));

    let result = load_comparison(&catalog, "/nonexistent/alignments", "HTR1A", "HTR1B").await;
    assert!(matches!(result, Err(GpcrError::Transport { .. })));

    assert!(load_comparison(&catalog, &alignment_dir(), "HTR1A", "HTR9Z").await.is_err());
}

#[tokio::test]
async fn test_combine_orthologs() {
    let catalog = get_test_catalog();

    let combined =
        load_combined_orthologs(&catalog, &alignment_dir(), &["HTR1A", "htr1b", "HTR1A"],
                                ReprojectionMode::Sequential).await.unwrap();

    assert_eq!(combined.file_name, "HTR1A-HTR1B_orthologs_combined.fasta");

    let residues: Vec<_> = combined.records.iter().map(|seq| seq.residues.as_str()).collect();
    assert_eq!(residues, vec!["MDVLSP-GQNT", "MDVLSP-GQNS", "MEVLTP-GQ-T",
                              "MEELSPAGQ-T", "MEELSPAGH-T", "-EELSPSGQ-T"]);

    let fasta = format_fasta_records(&combined.records);
    assert!(fasta.starts_with(">sp|P08908|HTR1A_HUMAN\nMDVLSP-GQNT\n>HTR1A_MOUSE Mus musculus\n"));
}

#[tokio::test]
async fn test_combine_orthologs_skips_missing_alignment() {
    let catalog = get_test_catalog();

    // there's no ortholog alignment for ADRB2
    let combined =
        load_combined_orthologs(&catalog, &alignment_dir(), &["ADRB2", "HTR1B"],
                                ReprojectionMode::Sequential).await.unwrap();

    assert_eq!(combined.gene_names.len(), 2);
    assert_eq!(combined.records.len(), 3);
    assert!(combined.records.iter().all(|seq| seq.len() == combined.records[0].len()));

    let result = load_combined_orthologs(&catalog, &alignment_dir(), &["HTR1A", "GABBR1"],
                                         ReprojectionMode::Overlay).await;
    assert!(matches!(result, Err(GpcrError::ClassMismatch { .. })));
}

#[tokio::test]
async fn test_residue_map() {
    let catalog = get_test_catalog();

    let residue_map =
        load_residue_map(&catalog, &alignment_dir(), "HTR1A", &["HTR1B", "ADRB2"], true)
            .await.unwrap();

    assert_eq!(residue_map.rows.len(), 10);

    let numbers: HashSet<ResidueNumber> = [6, 10].into_iter().collect();
    let rows = filter_reference_residues(residue_map.rows, &numbers);
    assert_eq!(rows.len(), 2);

    let table = residue_table(&rows, &residue_map.gene_names, true);

    assert_eq!(table.column("HTR1A_Region").unwrap(), vec!["TM1", "ICL1"]);
    assert_eq!(table.column("HTR1A_GPCRdb").unwrap(), vec!["1.30", "12.49"]);
    assert_eq!(table.column("HTR1B_resNum").unwrap(), vec!["6", "10"]);
    assert_eq!(table.column("ADRB2_resNum").unwrap(), vec!["4", "9"]);
    assert_eq!(table.column("ADRB2_AA").unwrap(), vec!["P", "A"]);
    assert_eq!(table.column("ADRB2_Conservation (%)").unwrap(), vec!["82.50%", "64.00%"]);
    assert_eq!(table.column("ADRB2_Conserved_AA").unwrap(), vec!["P", "A/S"]);
}

#[tokio::test]
async fn test_residue_map_missing_files() {
    let mut catalog = get_test_catalog();

    // unreadable conservation files leave the conservation columns empty
    for receptor in catalog.receptors.iter_mut() {
        receptor.conservation_file = data_path("conservation/none.txt").into();
    }

    let residue_map =
        load_residue_map(&catalog, &alignment_dir(), "HTR1A", &["HTR1B"], true).await.unwrap();
    assert_eq!(residue_map.rows.len(), 10);

    let table = residue_table(&residue_map.rows, &residue_map.gene_names, true);
    assert!(table.column("HTR1B_Conservation (%)").unwrap().iter().all(|value| *value == "-"));

    // but the class alignment is required
    let result =
        load_residue_map(&catalog, "/nonexistent/alignments", "HTR1A", &["HTR1B"], true).await;
    assert!(matches!(result, Err(GpcrError::Transport { .. })));
}

#[tokio::test]
async fn test_residue_map_without_conservation() {
    let catalog = get_test_catalog();

    let residue_map =
        load_residue_map(&catalog, &alignment_dir(), "ADRB2", &["HTR1A"], false).await.unwrap();

    // ADRB2 has 9 residues
    assert_eq!(residue_map.rows.len(), 9);

    let table = residue_table(&residue_map.rows, &residue_map.gene_names, false);
    assert_eq!(table.headers[0], "ADRB2_resNum");
    assert!(table.column("ADRB2_Conservation (%)").unwrap().iter().all(|value| *value == "-"));

    // ADRB2 residue 8 (S) is opposite a gap in HTR1A
    assert_eq!(table.rows[7][4..6], ["-", "-"]);
}

#[tokio::test]
async fn test_source_cache_with_fixtures() {
    let catalog = get_test_catalog();
    let receptor = catalog.find("HTR1A").unwrap();
    let gene_name: GeneName = receptor.gene_name.clone();

    let mut cache = SourceCache::new();

    let first = cache.fetch(&gene_name, FileKind::Conservation, &receptor.conservation_file)
        .await.unwrap();
    let second = cache.fetch(&gene_name, FileKind::Conservation, "/nonexistent/path")
        .await.unwrap();
    assert_eq!(first, second);

    let missing = cache.fetch(&gene_name, FileKind::OrthologAlignment,
                              &data_path("orthologs/none.fasta")).await;
    assert!(missing.is_err());
    assert_eq!(cache.len(), 1);
}
