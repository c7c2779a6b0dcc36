use std::fmt;
use std::str::FromStr;

use crate::constants::{GAP_BYTE, GAP_CHAR};
use crate::error::GpcrError;

// How ortholog residues are placed against a trimmed reference sequence.
// The caller chooses based on where the reference came from; it can't be
// worked out from the sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprojectionMode {
    // the ortholog is column-aligned with the reference: copy the residue
    // at the same index
    Overlay,
    // the ortholog is gapped independently: consume its characters left
    // to right, one per reference residue
    Sequential,
}

impl FromStr for ReprojectionMode {
    type Err = GpcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlay" => Ok(ReprojectionMode::Overlay),
            "sequential" => Ok(ReprojectionMode::Sequential),
            _ => Err(GpcrError::InvalidMode(s.to_owned())),
        }
    }
}

impl fmt::Display for ReprojectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReprojectionMode::Overlay => write!(f, "overlay"),
            ReprojectionMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Lay an ortholog sequence out against a trimmed reference sequence.
/// The result is as long as the reference and has a gap wherever the
/// reference does.  When the ortholog runs out a gap is written.  In
/// sequential mode gaps in the ortholog are consumed like residues, so
/// several orthologs trimmed to the same columns stay in register.
pub fn reproject_ortholog(trimmed_reference: &str, ortholog: &str, mode: ReprojectionMode)
    -> String
{
    let ortholog = ortholog.as_bytes();
    let mut ortholog_index = 0;

    trimmed_reference.bytes()
        .enumerate()
        .map(|(column, reference_residue)| {
            if reference_residue == GAP_BYTE {
                return GAP_CHAR;
            }

            let source_index =
                match mode {
                    ReprojectionMode::Overlay => column,
                    ReprojectionMode::Sequential => {
                        ortholog_index += 1;
                        ortholog_index - 1
                    },
                };

            ortholog.get(source_index).map(|b| *b as char).unwrap_or(GAP_CHAR)
        })
        .collect()
}

#[test]
fn test_reproject_overlay() {
    assert_eq!(reproject_ortholog("MK-V-", "QRSTU", ReprojectionMode::Overlay), "QR-T-");
    assert_eq!(reproject_ortholog("MKVW", "QR", ReprojectionMode::Overlay), "QR--");
}

#[test]
fn test_reproject_sequential() {
    assert_eq!(reproject_ortholog("MK-V-", "QRSTU", ReprojectionMode::Sequential), "QR-S-");
    assert_eq!(reproject_ortholog("-M-KV", "Q-R", ReprojectionMode::Sequential), "-Q--R");
    assert_eq!(reproject_ortholog("", "QR", ReprojectionMode::Sequential), "");
}

#[test]
fn test_reprojection_mode_from_str() {
    assert_eq!("overlay".parse::<ReprojectionMode>().unwrap(), ReprojectionMode::Overlay);
    assert_eq!("Sequential".parse::<ReprojectionMode>().unwrap(),
               ReprojectionMode::Sequential);
    assert!("nearest".parse::<ReprojectionMode>().is_err());
}
