extern crate gpcr;

mod util;

use gpcr::bio::classify::{classify_residues, Category};
use gpcr::bio::conservation::parse_conservation;
use gpcr::bio::fasta::{parse_alignment, parse_ortholog_alignment, SequenceRecord};
use gpcr::bio::mapping::{map_coordinates, Position};
use gpcr::bio::snake::{conservation_fills, fill_boundary_offset};
use gpcr::bio::trim::trim_all_gap_columns;
use gpcr::export::format_fasta_records;

use util::read_data;

fn class_a_records(identifiers: &[&str]) -> Vec<SequenceRecord> {
    let alignment = parse_alignment(&read_data("alignments/classA_humans_MSA.fasta"),
                                    Some(identifiers));
    identifiers.iter()
        .map(|identifier| alignment[*identifier].clone())
        .collect()
}

#[test]
fn test_parse_class_alignment() {
    let alignment = parse_alignment(&read_data("alignments/classA_humans_MSA.fasta"), None);

    let identifiers: Vec<_> = alignment.keys().map(|id| id.as_str()).collect();
    assert_eq!(identifiers, vec!["HTR1A", "HTR1B", "ADRB2"]);

    let htr1a = &alignment["HTR1A"];
    assert_eq!(htr1a.residues, "MDVLSP-GQ-NT");
    assert_eq!(htr1a.header.as_str(), "sp|P08908|HTR1A_HUMAN");
    assert_eq!(htr1a.ungapped_len(), 10);

    assert!(alignment.values().all(|record| record.len() == 12));
}

#[test]
fn test_fasta_round_trip() {
    let text = read_data("orthologs/HTR1B_orthologs.fasta");
    let records = parse_ortholog_alignment(&text);

    assert_eq!(records.len(), 3);
    assert_eq!(records[2].identifier.as_str(), "HTR1B_XENLA");

    let rebuilt = format_fasta_records(&records);
    assert_eq!(parse_ortholog_alignment(&rebuilt), records);
    assert_eq!(rebuilt, text.trim_end());
}

#[test]
fn test_class_alignment_round_trip() {
    let text = "\
>sp|P08908|HTR1A_HUMAN/1-10 5-hydroxytryptamine receptor 1A
MDVLSP
-GQ-NT
>sp|P28222|HTR1B_HUMAN/3-12
mEELsp
AGQ--T
";
    let alignment = parse_alignment(text, None);
    let records: Vec<SequenceRecord> = alignment.values().cloned().collect();

    let rebuilt = format_fasta_records(&records);
    assert!(rebuilt.starts_with(">sp|P08908|HTR1A_HUMAN\nMDVLSP-GQ-NT\n"));

    let reparsed = parse_alignment(&rebuilt, None);
    assert_eq!(reparsed, alignment);
    assert_eq!(reparsed["HTR1B"].residues, "MEELSPAGQ--T");

    // the fixture alignment wraps its sequences too
    let fixture = parse_alignment(&read_data("alignments/classA_humans_MSA.fasta"), None);
    let records: Vec<SequenceRecord> = fixture.values().cloned().collect();
    assert_eq!(parse_alignment(&format_fasta_records(&records), None), fixture);
}

#[test]
fn test_map_fixture_pair() {
    let records = class_a_records(&["HTR1A", "HTR1B"]);
    let map = map_coordinates(&records).unwrap();

    // column 9 is a gap in both and is skipped
    assert_eq!(map.len(), 11);
    assert!(map.entries.iter().all(|entry| entry.column != 9));

    let last = map.entries.last().unwrap();
    assert_eq!(last.positions, vec![Position::Residue(10), Position::Residue(10)]);

    let htr1b_positions = map.positions_of("HTR1B").unwrap();
    assert_eq!(htr1b_positions[6], Position::Residue(7));
    assert_eq!(map.positions_of("HTR1A").unwrap()[6], Position::Gap);
}

#[test]
fn test_trim_fixture_alignment() {
    let records = class_a_records(&["HTR1A", "HTR1B", "ADRB2"]);

    let trimmed = trim_all_gap_columns(&records).unwrap();
    assert_eq!(trimmed.sequences.len(), 3);
    assert_eq!(trimmed.retained_columns.len(), 12);

    let pair = trim_all_gap_columns(&records[..2]).unwrap();
    let residues: Vec<_> = pair.sequences.iter().map(|seq| seq.residues.as_str()).collect();
    assert_eq!(residues, vec!["MDVLSP-GQNT", "MEELSPAGQ-T"]);

    for (original, trimmed) in records.iter().zip(pair.sequences.iter()) {
        assert_eq!(original.ungapped_len(), trimmed.ungapped_len());
    }
}

#[test]
fn test_classify_fixture_pair() {
    let records = class_a_records(&["HTR1A", "HTR1B"]);
    let map = map_coordinates(&records).unwrap();

    let conservation_a = parse_conservation(&read_data("conservation/HTR1A_conservation.txt"));
    let conservation_b = parse_conservation(&read_data("conservation/HTR1B_conservation.txt"));

    assert_eq!(conservation_a.len(), 10);

    let entries = classify_residues(&map, &conservation_a, &conservation_b, 50.0).unwrap();

    let count = |category: Category| {
        entries.iter().filter(|entry| entry.category == category).count()
    };

    assert_eq!(entries.len(), 10);
    assert_eq!(count(Category::Common), 5);
    assert_eq!(count(Category::SpecificBoth), 1);
    assert_eq!(count(Category::Specific1), 2);
    assert_eq!(count(Category::Specific2), 2);

    // D vs E isn't a high scoring pair
    let specific_both = entries.iter()
        .find(|entry| entry.category == Category::SpecificBoth)
        .unwrap();
    assert_eq!(specific_both.a.residue.as_str(), "D");
    assert_eq!(specific_both.b.residue.as_str(), "E");

    // HTR1B residue 8 is exactly at the threshold
    assert!(entries.iter().any(|entry| {
        entry.category == Category::Specific2 && entry.b.position == Position::Residue(8)
    }));

    let everything = classify_residues(&map, &conservation_a, &conservation_b, 0.0).unwrap();
    assert_eq!(everything.len(), map.len());
    assert!(everything.iter()
            .filter(|entry| !entry.a.is_gap() && !entry.b.is_gap())
            .all(|entry| matches!(entry.category, Category::Common | Category::SpecificBoth)));
}

#[test]
fn test_fixture_conservation_fills() {
    let table = parse_conservation(&read_data("conservation/HTR1A_conservation.txt"));
    let fills = conservation_fills(&table, &"#B7B7EB".into());

    assert_eq!(fills.len(), 10);
    assert_eq!(fills[9].residue_number, 10);
    assert_eq!(fills[9].offset, fill_boundary_offset(99.0));
    assert!(fills[9].offset < fills[0].offset);
}
