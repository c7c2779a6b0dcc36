use indexmap::IndexMap;
use tracing::{debug, warn};

use flexstr::SharedStr as FlexStr;

use crate::constants::{GAP_CHAR, HEADER_FIELD_SEPARATOR, HEADER_IDENTIFIER_FIELD,
                       HEADER_IDENTIFIER_SEPARATOR, HEADER_SUFFIX_SEPARATOR};
use crate::types::{Header, SeqIdentifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub identifier: SeqIdentifier,
    pub header: Header,
    // upper case residue codes and '-' only
    pub residues: String,
}

impl SequenceRecord {
    pub fn new(identifier: &str, header: &str, residues: &str) -> SequenceRecord {
        SequenceRecord {
            identifier: identifier.into(),
            header: header.into(),
            residues: clean_residues(residues).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn ungapped_len(&self) -> usize {
        self.residues.chars().filter(|c| *c != GAP_CHAR).count()
    }

    pub fn with_residues(&self, residues: String) -> SequenceRecord {
        SequenceRecord {
            identifier: self.identifier.clone(),
            header: self.header.clone(),
            residues,
        }
    }
}

// records from a class alignment, keyed by the short identifier and
// kept in file order
pub type AlignmentMap = IndexMap<SeqIdentifier, SequenceRecord>;

// Upper-case the text and drop everything that isn't A-Z or a gap.
pub fn clean_residues(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || *c == GAP_CHAR)
}

// The identifier is the first '_' token of the third '|' field, eg.
// "sp|P08908|5HT1A_HUMAN" -> "5HT1A".  Returns None when the header has
// fewer than three fields.
pub fn identifier_from_header(header: &str) -> Option<&str> {
    let field = header.split(HEADER_FIELD_SEPARATOR).nth(HEADER_IDENTIFIER_FIELD)?;
    field.split(HEADER_IDENTIFIER_SEPARATOR).next()
}

// header text used for matching against ortholog alignments: everything
// before the first '/', eg. a "/1-420" range suffix is removed
pub fn stored_header(header: &str) -> &str {
    header.split(HEADER_SUFFIX_SEPARATOR).next().unwrap_or(header)
}

/// Parse a class alignment in multi-FASTA format.
///
/// If `keep_identifiers` is given, records whose identifier isn't in the
/// list are skipped.  Sequence lines following a malformed header are
/// dropped.
pub fn parse_alignment(text: &str, keep_identifiers: Option<&[&str]>) -> AlignmentMap {
    let mut sequences: AlignmentMap = IndexMap::new();
    let mut current_identifier: Option<SeqIdentifier> = None;

    for line in text.lines() {
        if let Some(header_line) = line.strip_prefix('>') {
            let full_header = header_line.trim();

            let Some(identifier) = identifier_from_header(full_header) else {
                warn!("unexpected FASTA header format: {}", line);
                current_identifier = None;
                continue;
            };

            if let Some(keep_identifiers) = keep_identifiers {
                if !keep_identifiers.contains(&identifier) {
                    current_identifier = None;
                    continue;
                }
            }

            let identifier: SeqIdentifier = identifier.into();

            if sequences.contains_key(&identifier) {
                warn!("identifier {} appears more than once, keeping the last record",
                      identifier);
            }

            debug!("parsed header: {} ({})", identifier, full_header);

            sequences.insert(identifier.clone(), SequenceRecord {
                identifier: identifier.clone(),
                header: stored_header(full_header).into(),
                residues: String::new(),
            });

            current_identifier = Some(identifier);
        } else if let Some(ref identifier) = current_identifier {
            if let Some(record) = sequences.get_mut(identifier) {
                record.residues.extend(clean_residues(line));
            }
        }
    }

    sequences
}

/// Parse an ortholog alignment.  The identifier of each record is the
/// first word of its header and the full header is kept for matching.
/// Records are returned in file order.
pub fn parse_ortholog_alignment(text: &str) -> Vec<SequenceRecord> {
    let mut records = vec![];
    let mut current: Option<SequenceRecord> = None;

    for line in text.lines() {
        if let Some(header_line) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }

            let header = header_line.trim();

            let Some(identifier) = header.split_whitespace().next() else {
                warn!("ortholog alignment record with an empty header, skipping");
                continue;
            };

            current = Some(SequenceRecord {
                identifier: identifier.into(),
                header: FlexStr::from(header),
                residues: String::new(),
            });
        } else if let Some(ref mut record) = current {
            record.residues.extend(clean_residues(line));
        }
    }

    if let Some(record) = current {
        records.push(record);
    }

    records
}

#[test]
fn test_identifier_from_header() {
    assert_eq!(identifier_from_header("sp|P08908|5HT1A_HUMAN Serotonin receptor"),
               Some("5HT1A"));
    assert_eq!(identifier_from_header("tr|X|ADRB2"), Some("ADRB2"));
    assert_eq!(identifier_from_header("sp|P08908"), None);
    assert_eq!(identifier_from_header("a|b||c"), Some(""));
}

#[test]
fn test_parse_alignment() {
    let text = "\
>sp|P08908|5HT1A_HUMAN/1-422
mdv-sp
GQ g1*
>badheader
AAAA
>sp|P07550|ADRB2_HUMAN
--MGQ
PG
";
    let sequences = parse_alignment(text, None);

    assert_eq!(sequences.len(), 2);

    let first = &sequences["5HT1A"];
    assert_eq!(first.residues, "MDV-SPGQG");
    assert_eq!(first.header.as_str(), "sp|P08908|5HT1A_HUMAN");

    let second = &sequences["ADRB2"];
    assert_eq!(second.residues, "--MGQPG");

    let keys: Vec<_> = sequences.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["5HT1A", "ADRB2"]);
}

#[test]
fn test_parse_alignment_keep() {
    let text = ">sp|A|ONE_HUMAN\nAC-\n>sp|B|TWO_HUMAN\nA-C\n>sp|C|THREE_HUMAN\n--C\n";
    let sequences = parse_alignment(text, Some(&["TWO", "THREE"][..]));

    assert_eq!(sequences.len(), 2);
    assert!(!sequences.contains_key("ONE"));
    assert_eq!(sequences["TWO"].residues, "A-C");
}

#[test]
fn test_parse_alignment_empty() {
    assert!(parse_alignment("", None).is_empty());
    assert!(parse_alignment("no header here\nACGT\n", None).is_empty());
}

#[test]
fn test_parse_ortholog_alignment() {
    let text = "\
stray line
>sp|P08908|5HT1A_HUMAN human
AC-D
>XP_001 Pan troglodytes
ACED
>
KKKK
";
    let records = parse_ortholog_alignment(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].identifier.as_str(), "sp|P08908|5HT1A_HUMAN");
    assert_eq!(records[0].header.as_str(), "sp|P08908|5HT1A_HUMAN human");
    assert_eq!(records[0].residues, "AC-D");
    assert_eq!(records[1].identifier.as_str(), "XP_001");
    assert_eq!(records[1].residues, "ACED");
}
