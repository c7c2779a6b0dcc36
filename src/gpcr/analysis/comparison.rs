use tracing::info;

use crate::bio::classify::{classify_paired, join_conservation, Category, ClassificationEntry,
                           PairedColumn, ResidueSide};
use crate::bio::conservation::{parse_conservation, ConservationTable};
use crate::bio::fasta::parse_alignment;
use crate::bio::mapping::map_coordinates;
use crate::bio::snake::{conservation_fills, ConservationFill, Side};
use crate::catalog::{human_alignment_path, Catalog, Receptor};
use crate::constants::MISSING_VALUE;
use crate::error::{GpcrError, Result};
use crate::export::Table;
use crate::fetch::read_source_triple;
use crate::types::{Colour, GeneName};

/// Look up two receptors for a comparison.  They must both be in the
/// catalog, must be different and must belong to the same class.
pub fn select_pair<'a>(catalog: &'a Catalog, gene1: &str, gene2: &str)
    -> Result<(&'a Receptor, &'a Receptor)>
{
    let gene1 = gene1.trim();
    let gene2 = gene2.trim();

    if !gene1.is_empty() && gene1.eq_ignore_ascii_case(gene2) {
        return Err(GpcrError::SameReceptor(gene1.into()));
    }

    let find = |gene_name: &str| {
        catalog.find(gene_name)
            .ok_or_else(|| GpcrError::ReceptorNotFound(gene_name.to_owned()))
    };

    let first = find(gene1)?;
    let second = find(gene2)?;

    if first.class != second.class {
        return Err(GpcrError::ClassMismatch {
            first: first.class.clone(),
            second: second.class.clone(),
        });
    }

    Ok((first, second))
}

pub fn validate_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_nan() || !(0.0..=100.0).contains(&threshold) {
        Err(GpcrError::InvalidThreshold(threshold))
    } else {
        Ok(threshold)
    }
}

// A mapped and conservation-joined pair of receptors.  Changing the
// threshold only needs recompute(), not another parse.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseComparison {
    pub gene1: GeneName,
    pub gene2: GeneName,
    pub columns: Vec<PairedColumn>,
    pub conservation_a: ConservationTable,
    pub conservation_b: ConservationTable,
}

impl PairwiseComparison {
    pub fn build(alignment_text: &str, conservation_text_a: &str, conservation_text_b: &str,
                 gene1: &GeneName, gene2: &GeneName)
        -> Result<PairwiseComparison>
    {
        let alignment = parse_alignment(alignment_text, None);

        let get_sequence = |gene_name: &GeneName| {
            alignment.get(gene_name.as_str())
                .filter(|record| !record.is_empty())
                .cloned()
                .ok_or_else(|| GpcrError::SequenceNotFound(gene_name.clone()))
        };

        let sequences = vec![get_sequence(gene1)?, get_sequence(gene2)?];
        let map = map_coordinates(&sequences)?;

        let conservation_a = parse_conservation(conservation_text_a);
        let conservation_b = parse_conservation(conservation_text_b);

        let columns = join_conservation(&map, &conservation_a, &conservation_b)?;

        info!("mapped {} alignment columns for {} and {}", columns.len(), gene1, gene2);

        Ok(PairwiseComparison {
            gene1: gene1.clone(),
            gene2: gene2.clone(),
            columns,
            conservation_a,
            conservation_b,
        })
    }

    pub fn recompute(&self, threshold: f64) -> Result<Vec<ClassificationEntry>> {
        let threshold = validate_threshold(threshold)?;
        Ok(classify_paired(&self.columns, threshold))
    }

    pub fn conservation_of(&self, side: Side) -> &ConservationTable {
        match side {
            Side::First => &self.conservation_a,
            Side::Second => &self.conservation_b,
        }
    }

    // snake plot conservation gradient for one of the receptors
    pub fn conservation_fills(&self, side: Side, colour: &Colour) -> Vec<ConservationFill> {
        conservation_fills(self.conservation_of(side), colour)
    }
}

/// Read the class alignment and both conservation files concurrently and
/// build the comparison.
pub async fn load_comparison(catalog: &Catalog, alignment_dir: &str, gene1: &str, gene2: &str)
    -> Result<PairwiseComparison>
{
    let (first, second) = select_pair(catalog, gene1, gene2)?;

    let alignment_path = human_alignment_path(alignment_dir, &first.class);

    let (alignment_text, conservation_text_a, conservation_text_b) =
        read_source_triple(&alignment_path, &first.conservation_file,
                           &second.conservation_file).await?;

    PairwiseComparison::build(&alignment_text, &conservation_text_a, &conservation_text_b,
                              &first.gene_name, &second.gene_name)
}

fn format_side(side: &ResidueSide) -> [String; 3] {
    let residue_number =
        side.position.number()
            .map(|number| number.to_string())
            .unwrap_or_else(|| MISSING_VALUE.to_owned());

    let residue =
        if side.residue.is_empty() {
            MISSING_VALUE.to_owned()
        } else {
            side.residue.to_string()
        };

    let conservation =
        if side.conservation == 0.0 {
            MISSING_VALUE.to_owned()
        } else {
            format!("{:.2}", side.conservation)
        };

    [residue_number, residue, conservation]
}

/// Make the result table: rows grouped by category, alignment order
/// within each group.
pub fn comparison_table(entries: &[ClassificationEntry], gene1: &str, gene2: &str) -> Table {
    let mut headers = vec![];

    for gene_name in [gene1, gene2] {
        headers.push(format!("{} Residue #", gene_name));
        headers.push(format!("{} Conserved AA", gene_name));
        headers.push(format!("{} Conservation %", gene_name));
    }

    headers.push("Category".to_owned());

    let mut table = Table::new(headers);

    for category in Category::ALL {
        for entry in entries.iter().filter(|entry| entry.category == category) {
            let mut row = vec![];
            row.extend(format_side(&entry.a));
            row.extend(format_side(&entry.b));
            row.push(category.display_name().to_owned());

            table.rows.push(row);
        }
    }

    table
}

#[cfg(test)]
const TEST_CATALOG: &str = r#"[
  {"geneName": "RECA", "class": "A", "alignment": "a.fasta", "conservationFile": "a.txt"},
  {"geneName": "RECB", "class": "A", "alignment": "b.fasta", "conservationFile": "b.txt"},
  {"geneName": "RECC", "class": "B1", "alignment": "c.fasta", "conservationFile": "c.txt"}
]"#;

#[test]
fn test_select_pair() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

    let (first, second) = select_pair(&catalog, "reca", "RECB").unwrap();
    assert_eq!(first.gene_name.as_str(), "RECA");
    assert_eq!(second.gene_name.as_str(), "RECB");

    assert!(matches!(select_pair(&catalog, "RECA", "reca"),
                     Err(GpcrError::SameReceptor(_))));
    assert!(matches!(select_pair(&catalog, "RECA", "RECZ"),
                     Err(GpcrError::ReceptorNotFound(ref name)) if name == "RECZ"));
    assert!(matches!(select_pair(&catalog, "", "RECA"),
                     Err(GpcrError::ReceptorNotFound(_))));
    assert!(matches!(select_pair(&catalog, "RECA", "RECC"),
                     Err(GpcrError::ClassMismatch { .. })));
}

#[test]
fn test_validate_threshold() {
    assert_eq!(validate_threshold(0.0).unwrap(), 0.0);
    assert_eq!(validate_threshold(100.0).unwrap(), 100.0);
    assert!(validate_threshold(-0.5).is_err());
    assert!(validate_threshold(100.1).is_err());
    assert!(validate_threshold(f64::NAN).is_err());
}

#[cfg(test)]
const TEST_ALIGNMENT: &str = "\
>sp|P1|RECA_HUMAN/1-6
MKW-LD
>sp|P2|RECB_HUMAN
MRWQ-E
>sp|P3|RECD_HUMAN
------
";

#[test]
fn test_pairwise_comparison() {
    let conservation_a = "1\t90\tM\n2\t80\tK\n3\t20\tW\n4\t70\tL\n5\t60\tD\n";
    let conservation_b = "1\t95\tM\n2\t85\tR\n3\t75\tW\n4\t55\tQ\n5\t10\tE\n";

    let comparison =
        PairwiseComparison::build(TEST_ALIGNMENT, conservation_a, conservation_b,
                                  &"RECA".into(), &"RECB".into()).unwrap();

    assert_eq!(comparison.columns.len(), 6);

    let entries = comparison.recompute(50.0).unwrap();
    let summary: Vec<_> = entries.iter().map(|e| (e.column, e.category)).collect();
    assert_eq!(summary, vec![(0, Category::Common), (1, Category::Common),
                             (2, Category::Specific2), (3, Category::Specific2),
                             (4, Category::Specific1), (5, Category::Specific1)]);

    let strict = comparison.recompute(90.0).unwrap();
    let summary: Vec<_> = strict.iter().map(|e| (e.column, e.category)).collect();
    assert_eq!(summary, vec![(0, Category::Common)]);

    assert!(comparison.recompute(101.0).is_err());
}

#[test]
fn test_pairwise_comparison_missing_sequence() {
    let result = PairwiseComparison::build(TEST_ALIGNMENT, "", "",
                                           &"RECA".into(), &"RECX".into());
    assert!(matches!(result, Err(GpcrError::SequenceNotFound(ref name)) if name.as_str() == "RECX"));

    let result = PairwiseComparison::build(TEST_ALIGNMENT, "", "",
                                           &"RECA".into(), &"RECD".into());
    assert!(result.is_ok());
}

#[test]
fn test_comparison_table() {
    let conservation_a = "1\t90\tM\n2\t80\tK\n3\t20\tW\n4\t70\tL\n5\t60\tD\n";
    let conservation_b = "1\t95\tM\n2\t85\tR\n3\t75\tW\n4\t55\tQ\n";

    let comparison =
        PairwiseComparison::build(TEST_ALIGNMENT, conservation_a, conservation_b,
                                  &"RECA".into(), &"RECB".into()).unwrap();
    let mut entries = comparison.recompute(50.0).unwrap();

    // put a specific entry first to check the grouping
    entries.rotate_left(2);

    let table = comparison_table(&entries, "RECA", "RECB");

    assert_eq!(table.headers,
               vec!["RECA Residue #", "RECA Conserved AA", "RECA Conservation %",
                    "RECB Residue #", "RECB Conserved AA", "RECB Conservation %",
                    "Category"]);

    let categories = table.column("Category").unwrap();
    assert_eq!(categories, vec!["Common Residues", "Common Residues",
                                "Specifically Conserved for Receptor 1",
                                "Specifically Conserved for Receptor 1",
                                "Specifically Conserved for Receptor 2",
                                "Specifically Conserved for Receptor 2"]);

    assert_eq!(table.rows[0], vec!["1", "M", "90.00", "1", "M", "95.00", "Common Residues"]);
    // RECA has a gap in column 3
    assert_eq!(table.rows[5][..3], ["-", "-", "-"]);
    assert_eq!(table.rows[5][3..6], ["4", "Q", "55.00"]);
    // residue 5 of RECB has no conservation data
    assert_eq!(table.rows[3], vec!["5", "D", "60.00", "5", "-", "-",
                                   "Specifically Conserved for Receptor 1"]);
}
