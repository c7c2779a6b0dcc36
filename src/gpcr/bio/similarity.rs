use std::collections::HashSet;

use crate::constants::{MISSING_VALUE, RESIDUE_VARIANT_SEPARATOR};

lazy_static! {
    // high scoring substitutions from BLOSUM80, looked up in both orders
    static ref HIGH_SCORE_PAIRS: HashSet<&'static str> = {
        ["R-K", "N-B", "D-B", "Q-E", "Q-Z", "E-Z", "H-Y", "I-V", "I-J", "L-M",
         "L-J", "M-J", "F-Y", "W-Y", "V-J"]
            .into_iter()
            .collect()
    };
}

pub const IDENTICAL_SCORE: i32 = 3;
pub const SIMILAR_SCORE: i32 = 2;
pub const DISSIMILAR_SCORE: i32 = 1;
pub const GAP_SCORE: i32 = -1;

fn first_variant(residue: &str) -> &str {
    residue.split(RESIDUE_VARIANT_SEPARATOR).next().unwrap_or(residue)
}

fn is_gap_or_missing(residue: &str) -> bool {
    residue.is_empty() || residue == MISSING_VALUE
}

/// Score two residue codes: 3 if identical, 2 for a high scoring BLOSUM80
/// pair, 1 otherwise and -1 if either is a gap.  For codes like "K/R" only
/// the first variant is used.
pub fn blosum80_score(residue1: &str, residue2: &str) -> i32 {
    if is_gap_or_missing(residue1) || is_gap_or_missing(residue2) {
        return GAP_SCORE;
    }

    let residue1 = first_variant(residue1);
    let residue2 = first_variant(residue2);

    if residue1 == residue2 {
        return IDENTICAL_SCORE;
    }

    let pair = format!("{}-{}", residue1, residue2);
    let reverse_pair = format!("{}-{}", residue2, residue1);

    if HIGH_SCORE_PAIRS.contains(pair.as_str()) ||
        HIGH_SCORE_PAIRS.contains(reverse_pair.as_str())
    {
        SIMILAR_SCORE
    } else {
        DISSIMILAR_SCORE
    }
}

#[test]
fn test_blosum80_score() {
    assert_eq!(blosum80_score("K", "R"), 2);
    assert_eq!(blosum80_score("R", "K"), 2);
    assert_eq!(blosum80_score("K", "K"), 3);
    assert_eq!(blosum80_score("K", "D"), 1);
    assert_eq!(blosum80_score("K", "-"), -1);
    assert_eq!(blosum80_score("-", "-"), -1);
    assert_eq!(blosum80_score("", "A"), -1);
    assert_eq!(blosum80_score("Y", "W"), 2);
}

#[test]
fn test_blosum80_score_variants() {
    assert_eq!(blosum80_score("K/R", "K"), 3);
    assert_eq!(blosum80_score("I/L", "V"), 2);
    assert_eq!(blosum80_score("A/K", "K/A"), 1);
}
