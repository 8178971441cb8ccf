pub mod backend;
pub mod config;
pub mod discovery;
pub mod features;
pub mod resolution;
pub mod scoring;
pub mod selectors;
pub mod similarity;

pub use loci_common::protocol;
pub use loci_common::{bundle, snapshot, target};
