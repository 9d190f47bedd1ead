//! corpusdash-core - Aggregation indexes over precomputed corpus statistics
//!
//! This crate turns the raw statistics export (a JSON document of nested
//! tables keyed by corpus, dataset, sample, collection and token codes) into
//! the read-only indexes a dashboard queries:
//! - collection group buckets per corpus ([`HierarchyIndex`])
//! - the significance ranking with FDR ceilings ([`Ranking`])
//! - token, type and hapax counts per sample, collection and dataset ([`DatasetAggregate`])
//! - merged confidence bands ([`CurveSet`])
//! - in-context occurrences with sort keys ([`ContextIndex`])
//!
//! All of them are composed into one [`AggregationStore`], built once per
//! load:
//!
//! ```ignore
//! use corpusdash_core::{AggregationStore, BuildOptions, RawData};
//!
//! let raw = RawData::load("data/corpus.json")?;
//! let store = AggregationStore::build(raw, &BuildOptions::default());
//! for result in store.ranking().results().iter().take(10) {
//!     println!("{} {} fdr={:.3}", result.collectioncode, result.statcode, result.fdr);
//! }
//! ```
//!
//! Lookups never fail: unknown codes give `None` or an empty slice.

pub mod context;
pub mod curves;
pub mod groups;
pub mod ranking;
pub mod raw;
pub mod store;
pub mod tokens;

pub use context::{ContextIndex, ContextRow};
pub use curves::{Band, BandPoint, CurveSet, merge_band};
pub use groups::{ALL_GROUP, CorpusGroups, HierarchyIndex, OTHER_GROUP, group_label};
pub use ranking::{RankedResult, Ranking, ResultKey, side_fraction};
pub use raw::{CodeMap, RawData, RawResultP, Side};
pub use store::{
    AggregationStore, BuildOptions, CorpusSummary, DEFAULT_STATCODES, DatasetSummary, StatInfo,
};
pub use tokens::{DatasetAggregate, SampleRow, TokenTotals, calc_score};
