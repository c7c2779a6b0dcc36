use tracing::debug;

use crate::bio::fasta::SequenceRecord;
use crate::bio::mapping::alignment_width;
use crate::constants::{GAP_BYTE, GAP_CHAR};
use crate::error::Result;
use crate::types::ColumnIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedAlignment {
    pub sequences: Vec<SequenceRecord>,
    // indices into the untrimmed alignment, in order
    pub retained_columns: Vec<ColumnIndex>,
}

fn select_columns(sequences: &[SequenceRecord], columns: &[ColumnIndex])
    -> Vec<SequenceRecord>
{
    sequences.iter()
        .map(|seq| {
            let bytes = seq.residues.as_bytes();
            let residues = columns.iter()
                .map(|column| bytes.get(*column).map(|b| *b as char).unwrap_or(GAP_CHAR))
                .collect();
            seq.with_residues(residues)
        })
        .collect()
}

/// Remove the columns that are a gap in every sequence.  A lone sequence
/// is returned unchanged.
pub fn trim_all_gap_columns(sequences: &[SequenceRecord]) -> Result<TrimmedAlignment> {
    if sequences.is_empty() {
        return Ok(TrimmedAlignment {
            sequences: vec![],
            retained_columns: vec![],
        });
    }

    let width = alignment_width(sequences)?;

    if sequences.len() == 1 {
        return Ok(TrimmedAlignment {
            sequences: sequences.to_vec(),
            retained_columns: (0..width).collect(),
        });
    }

    let retained_columns: Vec<ColumnIndex> = (0..width)
        .filter(|column| {
            !sequences.iter().all(|seq| seq.residues.as_bytes()[*column] == GAP_BYTE)
        })
        .collect();

    debug!("keeping {} of {} alignment columns", retained_columns.len(), width);

    Ok(TrimmedAlignment {
        sequences: select_columns(sequences, &retained_columns),
        retained_columns,
    })
}

/// Keep only the columns where the reference sequence has a residue.
/// Sequences shorter than the reference are padded with gaps.
pub fn keep_reference_columns(sequences: &[SequenceRecord], reference: &SequenceRecord)
    -> TrimmedAlignment
{
    let retained_columns: Vec<ColumnIndex> = reference.residues.bytes()
        .enumerate()
        .filter(|(_, residue)| *residue != GAP_BYTE)
        .map(|(column, _)| column)
        .collect();

    TrimmedAlignment {
        sequences: select_columns(sequences, &retained_columns),
        retained_columns,
    }
}

#[cfg(test)]
fn residues_of(trimmed: &TrimmedAlignment) -> Vec<&str> {
    trimmed.sequences.iter().map(|seq| seq.residues.as_str()).collect()
}

#[test]
fn test_trim_all_gap_columns() {
    let sequences = vec![SequenceRecord::new("A", "a", "-A--C-"),
                         SequenceRecord::new("B", "b", "-G-TC-")];
    let trimmed = trim_all_gap_columns(&sequences).unwrap();

    assert_eq!(residues_of(&trimmed), vec!["A-C", "GTC"]);
    assert_eq!(trimmed.retained_columns, vec![1, 3, 4]);
    assert_eq!(trimmed.sequences[1].header.as_str(), "b");

    let again = trim_all_gap_columns(&trimmed.sequences).unwrap();
    assert_eq!(again.sequences, trimmed.sequences);
}

#[test]
fn test_trim_single_sequence() {
    let sequences = vec![SequenceRecord::new("A", "a", "--AC--")];
    let trimmed = trim_all_gap_columns(&sequences).unwrap();

    assert_eq!(residues_of(&trimmed), vec!["--AC--"]);
    assert_eq!(trimmed.retained_columns, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_trim_length_mismatch() {
    let sequences = vec![SequenceRecord::new("A", "a", "AC"),
                         SequenceRecord::new("B", "b", "A")];
    assert!(trim_all_gap_columns(&sequences).is_err());
}

#[test]
fn test_keep_reference_columns() {
    let reference = SequenceRecord::new("H", "h", "-MK-V");
    let sequences = vec![reference.clone(),
                         SequenceRecord::new("O", "o", "QM-RV"),
                         SequenceRecord::new("S", "s", "QM")];
    let kept = keep_reference_columns(&sequences, &reference);

    assert_eq!(kept.retained_columns, vec![1, 2, 4]);
    assert_eq!(residues_of(&kept), vec!["MKV", "M-V", "M--"]);
}
