use std::io;

use thiserror::Error;

use crate::types::{GeneName, ReceptorClass};

#[derive(Error, Debug)]
pub enum GpcrError {
    #[error("Failed to fetch {path}: {source}")]
    Transport {
        path: String,
        source: io::Error,
    },

    #[error("Sequence length mismatch for {identifier}")]
    LengthMismatch {
        identifier: String,
    },

    #[error("no sequences to process")]
    NoSequences,

    #[error("a pairwise comparison needs exactly two sequences, found {found}")]
    PairRequired {
        found: usize,
    },

    #[error("receptor not found: {0}")]
    ReceptorNotFound(String),

    #[error("sequence for {0} not found in the alignment")]
    SequenceNotFound(GeneName),

    #[error("please select two different receptors (got {0} twice)")]
    SameReceptor(GeneName),

    #[error("receptors must belong to the same class: {first} and {second}")]
    ClassMismatch {
        first: ReceptorClass,
        second: ReceptorClass,
    },

    #[error("conservation threshold must be between 0 and 100, not {0}")]
    InvalidThreshold(f64),

    #[error("all positions have been trimmed, no alignment data remains")]
    AllPositionsTrimmed,

    #[error("unknown re-projection mode \"{0}\", expected \"overlay\" or \"sequential\"")]
    InvalidMode(String),

    #[error("unknown receptor side \"{0}\", expected 1 or 2")]
    InvalidSide(String),

    #[error("failed to parse catalog {path}: {source}")]
    Catalog {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    Config {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write table: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GpcrError>;
