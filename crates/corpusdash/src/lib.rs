//! corpusdash - Selection engine for browsing corpus statistics
//!
//! Keeps a navigational selection (page, corpus, dataset, group,
//! collection, stat, sample, token) consistent with an
//! [`AggregationStore`](corpusdash_core::AggregationStore), reports which
//! display fragments each change invalidates, and mirrors the selection to
//! an external [`Location`] as a route.
//!
//! ```ignore
//! use corpusdash::{Controller, MemoryLocation, load_config_or_default};
//! use corpusdash_core::{AggregationStore, BuildOptions, RawData};
//!
//! let config = load_config_or_default(&"corpusdash.yaml".into());
//! let options = BuildOptions { statcodes: config.statcodes() };
//! let store = AggregationStore::build(RawData::load("data/corpus.json")?, &options);
//!
//! let mut ctrl = Controller::new(&store, config, MemoryLocation::default(), None)?;
//! ctrl.toggle_point("fiction");
//! for row in ctrl.query().tokens().iter().take(10) {
//!     println!("{} {}", row.shortlabel, row.tokencount);
//! }
//! ```

pub mod config;
pub mod controller;
pub mod fields;
pub mod location;
pub mod query;
pub mod repair;

pub use config::Config;
pub use controller::{Changes, Controller};
pub use fields::{FieldRule, FieldTable, REPAIR_ORDER};
pub use location::{Location, LocationChange, MemoryLocation, Origin};
pub use query::{Finding, Marker, PlotPoint, Query, TokenRow};
pub use repair::repair;

use eyre::{Result, WrapErr};
use std::path::PathBuf;

/// Load configuration from a YAML file.
pub fn load_config(path: &PathBuf) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Every setting is optional, for example:\n\n\
             statcodes: [type-word, hapax-word]\n\
             fdr_threshold: 0.05",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load configuration, falling back to defaults when the file is missing
/// or unreadable.
pub fn load_config_or_default(path: &PathBuf) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => facet_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
