//! Common test utilities.

#![allow(dead_code)]

use corpusdash::{Config, Controller, MemoryLocation};
use corpusdash_core::{AggregationStore, BuildOptions, RawData};
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Build a store from the fixture dataset.
pub fn fixture_store() -> AggregationStore {
    let raw = RawData::load(fixtures_dir().join("dataset.json")).expect("Failed to load fixture");
    AggregationStore::build(raw, &BuildOptions::default())
}

/// A controller over `store` with default config, starting from `route`.
pub fn controller<'s>(
    store: &'s AggregationStore,
    route: Option<&str>,
) -> Controller<'s, MemoryLocation> {
    let location = MemoryLocation::new(route.unwrap_or_default());
    let mut ctrl =
        Controller::new(store, Config::default(), location, route).expect("Failed to create controller");
    // drop the echo of the initial write
    ctrl.process_notifications();
    ctrl
}
