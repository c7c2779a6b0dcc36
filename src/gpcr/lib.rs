#[macro_use] extern crate lazy_static;
#[macro_use] extern crate serde_derive;

pub mod types;
pub mod constants;
pub mod error;
pub mod config;
pub mod catalog;
pub mod fetch;
pub mod export;
pub mod bio;
pub mod analysis;
pub mod cli;
