use std::collections::BTreeMap;

use tracing::warn;

use crate::constants::{CONSERVATION_HEADER_SENTINEL, CONSERVATION_MIN_COLUMNS};
use crate::types::{AminoAcid, RegionName, ResidueNumber, TopologyLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationRow {
    pub residue_number: ResidueNumber,
    // percentage of orthologs that share the conserved residue, 0-100
    pub conservation_percent: f64,
    // may hold variants like "K/R"
    pub conserved_residue: AminoAcid,
    pub observed_residue: AminoAcid,
    pub region: RegionName,
    // GPCRdb numbering
    pub topology_label: TopologyLabel,
}

pub type ConservationTable = BTreeMap<ResidueNumber, ConservationRow>;

fn is_header_row(first_field: &str) -> bool {
    first_field.to_lowercase().starts_with(CONSERVATION_HEADER_SENTINEL)
}

/// Parse a per-receptor conservation file.  Columns are residue number,
/// conservation percentage, conserved residue, observed residue, region and
/// GPCRdb number, separated by tabs or spaces.  Short or unparsable rows,
/// and rows with a percentage that isn't between 0 and 100, are skipped.
pub fn parse_conservation(text: &str) -> ConservationTable {
    let mut table = BTreeMap::new();

    for (line_index, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();

        let Some(first_field) = fields.first() else {
            continue;
        };

        if is_header_row(first_field) {
            continue;
        }

        if fields.len() < CONSERVATION_MIN_COLUMNS {
            warn!("skipping conservation line {} with only {} columns",
                  line_index + 1, fields.len());
            continue;
        }

        let Ok(residue_number) = fields[0].parse::<ResidueNumber>() else {
            warn!("skipping conservation line {}, bad residue number: {}",
                  line_index + 1, fields[0]);
            continue;
        };

        let Ok(conservation_percent) = fields[1].parse::<f64>() else {
            warn!("skipping conservation line {}, bad conservation value: {}",
                  line_index + 1, fields[1]);
            continue;
        };

        if !(0.0..=100.0).contains(&conservation_percent) {
            warn!("skipping conservation line {}, value out of range: {}",
                  line_index + 1, fields[1]);
            continue;
        }

        let field = |index: usize| fields.get(index).copied().unwrap_or("");

        table.insert(residue_number, ConservationRow {
            residue_number,
            conservation_percent,
            conserved_residue: field(2).into(),
            observed_residue: field(3).into(),
            region: field(4).into(),
            topology_label: field(5).into(),
        });
    }

    table
}

#[test]
fn test_parse_conservation() {
    let text = "\
residue_number\tconservation\tconserved_aa\taa\tregion\tgpcrdb
1\t45.5\tM\tM\tN-term\t-
2\t100\tD\tD\tN-term\t-
3  88.25  K/R  K  TM1  1.30
4\t12
5\tabc\tA\tA\tTM1\t1.31
x\t50\tA\tA\tTM1\t1.32

";
    let table = parse_conservation(text);

    assert_eq!(table.len(), 3);

    let row = &table[&1];
    assert_eq!(row.conservation_percent, 45.5);
    assert_eq!(row.conserved_residue.as_str(), "M");
    assert_eq!(row.region.as_str(), "N-term");

    let row = &table[&3];
    assert_eq!(row.conservation_percent, 88.25);
    assert_eq!(row.conserved_residue.as_str(), "K/R");
    assert_eq!(row.observed_residue.as_str(), "K");
    assert_eq!(row.topology_label.as_str(), "1.30");
}

#[test]
fn test_parse_conservation_short_rows() {
    let table = parse_conservation("Residue\tcons\n7\t90.0\tW\n");

    assert_eq!(table.len(), 1);
    let row = &table[&7];
    assert_eq!(row.conserved_residue.as_str(), "W");
    assert_eq!(row.observed_residue.as_str(), "");
    assert_eq!(row.topology_label.as_str(), "");
}

#[test]
fn test_parse_conservation_out_of_range() {
    let table = parse_conservation("1\tNaN\tM\n2\t250\tK\n3\t-40\tW\n4\tinf\tA\n5\t0\tG\n6\t100\tC\n");

    let numbers: Vec<_> = table.keys().copied().collect();
    assert_eq!(numbers, vec![5, 6]);
    assert_eq!(table[&5].conservation_percent, 0.0);
}
