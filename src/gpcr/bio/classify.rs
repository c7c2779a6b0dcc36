use std::fmt;

use tracing::debug;

use flexstr::SharedStr as FlexStr;

use crate::bio::conservation::ConservationTable;
use crate::bio::mapping::{CoordinateMap, Position};
use crate::bio::similarity::{blosum80_score, DISSIMILAR_SCORE};
use crate::constants::MISSING_VALUE;
use crate::error::{GpcrError, Result};
use crate::types::{AminoAcid, ColumnIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    // conserved in both receptors with identical or similar residues
    #[serde(rename = "common")]
    Common,
    // conserved in both but the residues differ
    #[serde(rename = "specific_both")]
    SpecificBoth,
    #[serde(rename = "specific1")]
    Specific1,
    #[serde(rename = "specific2")]
    Specific2,
}

impl Category {
    // display and grouping order
    pub const ALL: [Category; 4] =
        [Category::Common, Category::SpecificBoth, Category::Specific1, Category::Specific2];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Common => "common",
            Category::SpecificBoth => "specific_both",
            Category::Specific1 => "specific1",
            Category::Specific2 => "specific2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Common => "Common Residues",
            Category::SpecificBoth => "Specifically Conserved for Both",
            Category::Specific1 => "Specifically Conserved for Receptor 1",
            Category::Specific2 => "Specifically Conserved for Receptor 2",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// One receptor's view of an alignment column after joining with its
// conservation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueSide {
    pub position: Position,
    pub residue: AminoAcid,
    pub conservation: f64,
}

impl ResidueSide {
    pub fn gap() -> ResidueSide {
        ResidueSide {
            position: Position::Gap,
            residue: FlexStr::from(MISSING_VALUE),
            conservation: 0.0,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.position.is_gap()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedColumn {
    pub column: ColumnIndex,
    pub a: ResidueSide,
    pub b: ResidueSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub category: Category,
    pub column: ColumnIndex,
    pub a: ResidueSide,
    pub b: ResidueSide,
}

fn join_side(position: Position, table: &ConservationTable) -> ResidueSide {
    let Position::Residue(number) = position else {
        return ResidueSide::gap();
    };

    if let Some(row) = table.get(&number) {
        ResidueSide {
            position,
            residue: row.conserved_residue.clone(),
            conservation: row.conservation_percent,
        }
    } else {
        debug!("no conservation data for residue {}", number);
        ResidueSide {
            position,
            residue: FlexStr::from(MISSING_VALUE),
            conservation: 0.0,
        }
    }
}

/// Attach conservation data to both sides of a two sequence mapping.
/// Residues missing from a table get conservation 0 and residue "-".
pub fn join_conservation(map: &CoordinateMap,
                         conservation_a: &ConservationTable,
                         conservation_b: &ConservationTable)
    -> Result<Vec<PairedColumn>>
{
    if map.identifiers.len() != 2 {
        return Err(GpcrError::PairRequired {
            found: map.identifiers.len(),
        });
    }

    Ok(map.entries.iter()
       .map(|entry| PairedColumn {
           column: entry.column,
           a: join_side(entry.positions[0], conservation_a),
           b: join_side(entry.positions[1], conservation_b),
       })
       .collect())
}

fn classify_column(column: &PairedColumn, threshold: f64) -> Option<Category> {
    let conserved_a = column.a.conservation >= threshold;
    let conserved_b = column.b.conservation >= threshold;

    match (column.a.is_gap(), column.b.is_gap()) {
        (true, true) => None,
        (false, false) => match (conserved_a, conserved_b) {
            (true, true) => {
                let score = blosum80_score(&column.a.residue, &column.b.residue);
                if score > DISSIMILAR_SCORE {
                    Some(Category::Common)
                } else {
                    Some(Category::SpecificBoth)
                }
            },
            (true, false) => Some(Category::Specific1),
            (false, true) => Some(Category::Specific2),
            (false, false) => None,
        },
        (false, true) => conserved_a.then_some(Category::Specific1),
        (true, false) => conserved_b.then_some(Category::Specific2),
    }
}

/// Sort every column into a category for the given threshold, dropping
/// columns that don't qualify.  Column order is preserved.
pub fn classify_paired(columns: &[PairedColumn], threshold: f64) -> Vec<ClassificationEntry> {
    columns.iter()
        .filter_map(|column| {
            let category = classify_column(column, threshold)?;

            let (a, b) =
                match (column.a.is_gap(), column.b.is_gap()) {
                    (false, true) => (column.a.clone(), ResidueSide::gap()),
                    (true, false) => (ResidueSide::gap(), column.b.clone()),
                    _ => (column.a.clone(), column.b.clone()),
                };

            Some(ClassificationEntry {
                category,
                column: column.column,
                a,
                b,
            })
        })
        .collect()
}

pub fn classify_residues(map: &CoordinateMap,
                         conservation_a: &ConservationTable,
                         conservation_b: &ConservationTable,
                         threshold: f64)
    -> Result<Vec<ClassificationEntry>>
{
    let columns = join_conservation(map, conservation_a, conservation_b)?;
    Ok(classify_paired(&columns, threshold))
}

#[cfg(test)]
fn make_side(number: Option<usize>, residue: &str, conservation: f64) -> ResidueSide {
    match number {
        Some(number) => ResidueSide {
            position: Position::Residue(number),
            residue: residue.into(),
            conservation,
        },
        None => ResidueSide::gap(),
    }
}

#[cfg(test)]
fn make_column(column: usize, a: ResidueSide, b: ResidueSide) -> PairedColumn {
    PairedColumn { column, a, b }
}

#[test]
fn test_classify_common() {
    let columns = vec![make_column(0, make_side(Some(1), "K", 80.0),
                                   make_side(Some(1), "K", 90.0))];
    let entries = classify_paired(&columns, 50.0);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, Category::Common);
}

#[test]
fn test_classify_rules() {
    let columns = vec![
        // similar residues, both conserved
        make_column(0, make_side(Some(1), "K", 80.0), make_side(Some(1), "R", 60.0)),
        // dissimilar, both conserved
        make_column(1, make_side(Some(2), "K", 80.0), make_side(Some(2), "D", 60.0)),
        // only A conserved
        make_column(2, make_side(Some(3), "W", 80.0), make_side(Some(3), "W", 10.0)),
        // only B conserved
        make_column(3, make_side(Some(4), "W", 10.0), make_side(Some(4), "W", 75.0)),
        // neither conserved
        make_column(4, make_side(Some(5), "W", 10.0), make_side(Some(5), "W", 20.0)),
        // B gap, A conserved
        make_column(5, make_side(Some(6), "C", 99.0), make_side(None, "-", 0.0)),
        // A gap, B below threshold
        make_column(6, make_side(None, "-", 0.0), make_side(Some(6), "C", 49.9)),
        // A gap, B conserved
        make_column(7, make_side(None, "-", 0.0), make_side(Some(7), "P", 50.0)),
    ];

    let entries = classify_paired(&columns, 50.0);
    let summary: Vec<_> = entries.iter().map(|e| (e.column, e.category)).collect();

    assert_eq!(summary, vec![(0, Category::Common), (1, Category::SpecificBoth),
                             (2, Category::Specific1), (3, Category::Specific2),
                             (5, Category::Specific1), (7, Category::Specific2)]);

    assert_eq!(entries[4].b, ResidueSide::gap());
    assert_eq!(entries[5].a.position, Position::Gap);
    assert_eq!(entries[5].a.conservation, 0.0);
}

#[test]
fn test_classify_threshold_monotonic() {
    let columns = vec![
        make_column(0, make_side(Some(1), "K", 80.0), make_side(Some(1), "R", 60.0)),
        make_column(1, make_side(Some(2), "K", 30.0), make_side(Some(2), "D", 95.0)),
        make_column(2, make_side(Some(3), "W", 70.0), make_side(None, "-", 0.0)),
        make_column(3, make_side(Some(4), "A", 55.0), make_side(Some(4), "G", 55.0)),
    ];

    let rank = |category: Option<Category>| match category {
        Some(Category::Common) | Some(Category::SpecificBoth) => 2,
        Some(Category::Specific1) | Some(Category::Specific2) => 1,
        None => 0,
    };

    let mut previous: Option<Vec<Option<Category>>> = None;

    for threshold in [0.0, 25.0, 50.0, 56.0, 65.0, 75.0, 90.0, 100.0] {
        let entries = classify_paired(&columns, threshold);
        let by_column: Vec<Option<Category>> = (0..columns.len())
            .map(|column| {
                entries.iter().find(|e| e.column == column).map(|e| e.category)
            })
            .collect();

        if let Some(previous) = previous {
            for (before, after) in previous.iter().zip(by_column.iter()) {
                assert!(rank(*after) <= rank(*before));
            }
        }

        previous = Some(by_column);
    }
}

#[test]
fn test_classify_residues_joins_conservation() {
    use crate::bio::conservation::parse_conservation;
    use crate::bio::fasta::SequenceRecord;
    use crate::bio::mapping::map_coordinates;

    let sequences = vec![SequenceRecord::new("A", "a", "MK-W"),
                         SequenceRecord::new("B", "b", "MRPW")];
    let map = map_coordinates(&sequences).unwrap();
    let conservation_a = parse_conservation("1\t90\tM\n2\t80\tK\n");
    let conservation_b = parse_conservation("1\t95\tM\n2\t85\tR\n3\t70\tP\n4\t99\tW\n");

    let entries = classify_residues(&map, &conservation_a, &conservation_b, 60.0).unwrap();
    let summary: Vec<_> = entries.iter().map(|e| (e.column, e.category)).collect();

    // residue 3 of A (W) has no conservation data so counts as 0
    assert_eq!(summary, vec![(0, Category::Common), (1, Category::Common),
                             (2, Category::Specific2), (3, Category::Specific2)]);
    assert_eq!(entries[3].a.residue.as_str(), "-");
    assert_eq!(entries[3].a.position, Position::Residue(3));

    let single = map_coordinates(&[sequences[0].clone()]).unwrap();
    assert!(matches!(classify_residues(&single, &conservation_a, &conservation_b, 60.0),
                     Err(GpcrError::PairRequired { found: 1 })));
}
