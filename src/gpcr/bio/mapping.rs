use std::fmt;

use crate::bio::fasta::SequenceRecord;
use crate::constants::{GAP_BYTE, GAP_CHAR};
use crate::error::{GpcrError, Result};
use crate::types::{ColumnIndex, ResidueNumber, SeqIdentifier};

// the residue number of one sequence at one alignment column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Residue(ResidueNumber),
    Gap,
}

impl Position {
    pub fn is_gap(&self) -> bool {
        *self == Position::Gap
    }

    pub fn number(&self) -> Option<ResidueNumber> {
        match self {
            Position::Residue(number) => Some(*number),
            Position::Gap => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Residue(number) => write!(f, "{}", number),
            Position::Gap => write!(f, "gap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub column: ColumnIndex,
    // one per mapped sequence, in the order the sequences were given
    pub positions: Vec<Position>,
    pub residues: Vec<char>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateMap {
    pub identifiers: Vec<SeqIdentifier>,
    pub entries: Vec<MappingEntry>,
}

impl CoordinateMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sequence_index(&self, identifier: &str) -> Option<usize> {
        self.identifiers.iter().position(|id| id.as_str() == identifier)
    }

    // the positions of one sequence in every entry, in column order
    pub fn positions_of(&self, identifier: &str) -> Option<Vec<Position>> {
        let index = self.sequence_index(identifier)?;
        Some(self.entries.iter().map(|entry| entry.positions[index]).collect())
    }
}

/// Return the shared width of the sequences, or an error naming the first
/// sequence whose length differs from the first one.
pub fn alignment_width(sequences: &[SequenceRecord]) -> Result<usize> {
    let Some(first) = sequences.first() else {
        return Err(GpcrError::NoSequences);
    };

    let width = first.len();

    if let Some(mismatch) = sequences.iter().find(|seq| seq.len() != width) {
        return Err(GpcrError::LengthMismatch {
            identifier: mismatch.identifier.to_string(),
        });
    }

    Ok(width)
}

/// Walk the alignment column by column giving each sequence its own
/// residue counter.  Columns that are gaps in every sequence are left out;
/// all others produce one entry, in column order.
pub fn map_coordinates(sequences: &[SequenceRecord]) -> Result<CoordinateMap> {
    let width = alignment_width(sequences)?;

    let mut counters: Vec<ResidueNumber> = vec![0; sequences.len()];
    let mut entries = vec![];

    for column in 0..width {
        let mut positions = Vec::with_capacity(sequences.len());
        let mut residues = Vec::with_capacity(sequences.len());

        for (seq_index, seq) in sequences.iter().enumerate() {
            let residue = seq.residues.as_bytes()[column];

            if residue == GAP_BYTE {
                positions.push(Position::Gap);
                residues.push(GAP_CHAR);
            } else {
                counters[seq_index] += 1;
                positions.push(Position::Residue(counters[seq_index]));
                residues.push(residue as char);
            }
        }

        if positions.iter().all(Position::is_gap) {
            continue;
        }

        entries.push(MappingEntry {
            column,
            positions,
            residues,
        });
    }

    Ok(CoordinateMap {
        identifiers: sequences.iter().map(|seq| seq.identifier.clone()).collect(),
        entries,
    })
}

#[cfg(test)]
fn make_record(identifier: &str, residues: &str) -> SequenceRecord {
    SequenceRecord::new(identifier, identifier, residues)
}

#[test]
fn test_map_coordinates_pair() {
    let sequences = vec![make_record("A", "AC-GGT"), make_record("B", "ACTG-T")];
    let map = map_coordinates(&sequences).unwrap();

    use Position::{Gap, Residue};

    let expected = vec![
        (0, Residue(1), Residue(1)),
        (1, Residue(2), Residue(2)),
        (2, Gap, Residue(3)),
        (3, Residue(3), Residue(4)),
        (4, Residue(4), Gap),
        (5, Residue(5), Residue(5)),
    ];

    assert_eq!(map.len(), expected.len());

    for (entry, (column, a, b)) in map.entries.iter().zip(expected) {
        assert_eq!(entry.column, column);
        assert_eq!(entry.positions, vec![a, b]);
    }

    assert_eq!(map.entries[2].residues, vec!['-', 'T']);
}

#[test]
fn test_map_coordinates_drops_all_gap_columns() {
    let sequences = vec![make_record("A", "A--C"), make_record("B", "G-TC")];
    let map = map_coordinates(&sequences).unwrap();

    let columns: Vec<_> = map.entries.iter().map(|e| e.column).collect();
    assert_eq!(columns, vec![0, 2, 3]);
    assert_eq!(map.positions_of("A").unwrap(),
               vec![Position::Residue(1), Position::Gap, Position::Residue(2)]);
    assert_eq!(map.positions_of("B").unwrap(),
               vec![Position::Residue(1), Position::Residue(2), Position::Residue(3)]);
    assert!(map.positions_of("C").is_none());
}

#[test]
fn test_map_coordinates_single_ungapped() {
    let map = map_coordinates(&[make_record("A", "MDVLSP")]).unwrap();

    assert_eq!(map.len(), 6);
    for (i, entry) in map.entries.iter().enumerate() {
        assert_eq!(entry.positions, vec![Position::Residue(i + 1)]);
    }
}

#[test]
fn test_map_coordinates_matches_independent_numbering() {
    let sequences = vec![make_record("A", "-MK--LV-W"),
                         make_record("B", "QM-R-L--W"),
                         make_record("C", "---RS-VYW")];
    let map = map_coordinates(&sequences).unwrap();

    for (seq_index, seq) in sequences.iter().enumerate() {
        for entry in &map.entries {
            let prefix = &seq.residues[..=entry.column];
            let expected = prefix.chars().filter(|c| *c != '-').count();
            match entry.positions[seq_index] {
                Position::Residue(number) => assert_eq!(number, expected),
                Position::Gap => assert_eq!(seq.residues.as_bytes()[entry.column], b'-'),
            }
        }
    }
}

#[test]
fn test_map_coordinates_errors() {
    let sequences = vec![make_record("A", "ACGT"), make_record("B", "ACG")];

    match map_coordinates(&sequences) {
        Err(GpcrError::LengthMismatch { identifier }) => assert_eq!(identifier, "B"),
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(matches!(map_coordinates(&[]), Err(GpcrError::NoSequences)));
}

#[test]
fn test_position_display() {
    assert_eq!(Position::Residue(12).to_string(), "12");
    assert_eq!(Position::Gap.to_string(), "gap");
}
