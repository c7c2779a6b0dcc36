pub mod comparison;
pub mod orthologs;
pub mod residue_map;
