use flexstr::SharedStr as FlexStr;

pub type GeneName = FlexStr;
pub type ReceptorClass = FlexStr;
pub type SeqIdentifier = FlexStr;
pub type Header = FlexStr;
pub type AminoAcid = FlexStr;
pub type RegionName = FlexStr;
pub type TopologyLabel = FlexStr;
pub type FilePath = FlexStr;
pub type Colour = FlexStr;

// 1-based position of a residue within its own ungapped sequence
pub type ResidueNumber = usize;

// 0-based index into the gapped residue strings of an alignment
pub type ColumnIndex = usize;
