//! Shared types, error model, and configuration for tomoscrape.
//!
//! This crate is the foundation depended on by all other tomoscrape crates.
//! It provides:
//! - [`TomoError`], the unified error type
//! - Domain types ([`RawVolumeFragment`], [`CleanVolume`], [`MangaRecord`], [`CatalogEntry`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, ScrapeConfig, ScrapeSection, SiteConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, TomoError};
pub use types::{CatalogEntry, CleanVolume, MangaMeta, MangaRecord, RawVolumeFragment};
