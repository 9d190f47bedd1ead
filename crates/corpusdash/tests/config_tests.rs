//! Integration tests for configuration loading.

use corpusdash::{Controller, MemoryLocation, load_config, load_config_or_default};
use corpusdash_core::{AggregationStore, BuildOptions, RawData};

mod common;

#[test]
fn test_load_config_reads_yaml() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp.path().join("corpusdash.yaml");
    std::fs::write(
        &path,
        "statcodes:\n  - hapax-word\n  - type-word\npages: [tokens, plot]\nfdr_threshold: 0.5\n",
    )
    .expect("Failed to write config");

    let config = load_config(&path).expect("config loads");
    assert_eq!(config.statcodes(), vec!["hapax-word", "type-word"]);
    assert_eq!(config.fdr_threshold(), 0.5);
    assert_eq!(config.p_threshold(), 0.1);

    let raw = RawData::load(common::fixtures_dir().join("dataset.json")).expect("fixture");
    let store = AggregationStore::build(
        raw,
        &BuildOptions {
            statcodes: config.statcodes(),
        },
    );
    let ctrl = Controller::new(&store, config, MemoryLocation::default(), None)
        .expect("controller");
    assert_eq!(ctrl.selection().pagecode.as_deref(), Some("tokens"));
    assert_eq!(ctrl.selection().statcode.as_deref(), Some("hapax-word"));
}

#[test]
fn test_missing_config_is_an_error() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp.path().join("missing.yaml");
    let err = load_config(&path).expect_err("missing file");
    assert!(err.to_string().contains("not found"), "{err}");

    let config = load_config_or_default(&path);
    assert_eq!(config.pages(), vec!["plot", "samples", "tokens", "context"]);
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp.path().join("bad.yaml");
    std::fs::write(&path, "fdr_threshold: [not, a, number]\n").expect("Failed to write config");

    assert!(load_config(&path).is_err());
    assert_eq!(load_config_or_default(&path).fdr_threshold(), 0.1);
}
