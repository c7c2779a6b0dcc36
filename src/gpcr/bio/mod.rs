pub mod fasta;
pub mod conservation;
pub mod mapping;
pub mod trim;
pub mod similarity;
pub mod classify;
pub mod reproject;
pub mod snake;
