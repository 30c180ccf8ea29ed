//! Batch orchestration and record assembly for tomoscrape.
//!
//! Ties the extractor, normalizer and HTTP collaborators together into the
//! `scrape` pipeline, and owns catalog loading and output persistence.

pub mod assembler;
pub mod catalog;
pub mod output;
pub mod pipeline;

pub use assembler::{assemble, publish_date};
pub use catalog::load_catalog;
pub use output::{OutputLayout, clean_volume_titles};
pub use pipeline::{ProgressReporter, RunSummary, ScrapeResult, SilentProgress, scrape_catalog};
