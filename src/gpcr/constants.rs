pub const GAP_CHAR: char = '-';
pub const GAP_BYTE: u8 = b'-';

// written in place of a residue number, residue or percentage that
// doesn't exist for a row
pub const MISSING_VALUE: &str = "-";

// first field of the optional conservation file header row, compared
// case-insensitively against the start of the field
pub const CONSERVATION_HEADER_SENTINEL: &str = "residue";

// residue number, conservation percentage, conserved residue
pub const CONSERVATION_MIN_COLUMNS: usize = 3;

pub const HEADER_FIELD_SEPARATOR: char = '|';
pub const HEADER_IDENTIFIER_FIELD: usize = 2;
pub const HEADER_IDENTIFIER_SEPARATOR: char = '_';
pub const HEADER_SUFFIX_SEPARATOR: char = '/';

pub const RESIDUE_VARIANT_SEPARATOR: char = '/';

pub const DEFAULT_ALIGNMENT_DIR: &str = "alignments";
pub const DEFAULT_CATALOG_FILE: &str = "receptors.json";
pub const DEFAULT_THRESHOLD: f64 = 50.0;

pub const DEFAULT_COMMON_COLOUR: &str = "#E6E6FA";
pub const DEFAULT_SPECIFIC_BOTH_COLOUR: &str = "#A85638";
pub const DEFAULT_SPECIFIC1_COLOUR: &str = "#FFF9C2";
pub const DEFAULT_SPECIFIC2_COLOUR: &str = "#8F9871";
pub const DEFAULT_CONSERVATION_FILL_COLOUR: &str = "#B7B7EB";

pub const COMBINED_ORTHOLOGS_FILE_SUFFIX: &str = "_orthologs_combined.fasta";

// rounds of bisection when placing the snake plot gradient boundary
pub const FILL_BISECTION_ROUNDS: usize = 20;
