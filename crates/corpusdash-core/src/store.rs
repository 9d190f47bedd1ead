//! The aggregation store
//!
//! Built once per raw dataset load and read-only afterwards. Every lookup
//! takes plain codes and answers `None` or an empty slice for anything that
//! does not exist, so callers holding a half-complete selection get empty
//! results instead of errors.

use crate::context::ContextIndex;
use crate::curves::CurveSet;
use crate::groups::HierarchyIndex;
use crate::ranking::Ranking;
use crate::raw::{RawCollection, RawData, RawResultP, sorted_keys};
use crate::tokens::DatasetAggregate;
use facet::Facet;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Statistics offered when the configuration does not say otherwise.
pub const DEFAULT_STATCODES: &[&str] = &[
    "type-word",
    "type-token",
    "hapax-word",
    "hapax-token",
    "token-word",
];

/// (corpus, dataset)
type DatasetKey = (String, String);

/// (corpus, dataset, stat)
type CurveKey = (String, String, String);

fn dataset_key(corpus: &str, dataset: &str) -> DatasetKey {
    (corpus.to_string(), dataset.to_string())
}

/// Options for [`AggregationStore::build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Statistic codes in menu order; codes missing from the dataset are dropped
    pub statcodes: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            statcodes: DEFAULT_STATCODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A statistic: what is plotted against what.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct StatInfo {
    pub code: String,
    pub x: String,
    pub y: String,
    pub xlabel: String,
    pub ylabel: String,
    /// "<ylabel> / <xlabel>"
    pub label: String,
    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Facet)]
pub struct CorpusSummary {
    pub corpuscode: String,
    #[facet(default)]
    pub description: Option<String>,
    /// Sum of sample word counts
    pub wordcount: u64,
    pub samplecount: u64,
}

#[derive(Debug, Clone, PartialEq, Facet)]
pub struct DatasetSummary {
    pub corpuscode: String,
    pub datasetcode: String,
    #[facet(default)]
    pub description: Option<String>,
    pub tokens: u64,
    pub types: u64,
    pub hapaxes: u64,
}

/// Read-only indexes over one raw dataset.
pub struct AggregationStore {
    raw: RawData,
    corpuscodes: Vec<String>,
    datasetcodes: BTreeMap<String, Vec<String>>,
    stats: Vec<StatInfo>,
    corpora: BTreeMap<String, CorpusSummary>,
    datasets: BTreeMap<DatasetKey, DatasetSummary>,
    groups: HierarchyIndex,
    ranking: Ranking,
    aggregates: BTreeMap<DatasetKey, DatasetAggregate>,
    contexts: BTreeMap<DatasetKey, ContextIndex>,
    curves: BTreeMap<CurveKey, CurveSet>,
}

impl AggregationStore {
    /// Build every index from a raw dataset.
    pub fn build(raw: RawData, options: &BuildOptions) -> Self {
        let start = Instant::now();

        let corpuscodes: Vec<String> = sorted_keys(&raw.corpus)
            .into_iter()
            .map(str::to_string)
            .collect();
        let datasetcodes: BTreeMap<String, Vec<String>> = raw
            .dataset
            .iter()
            .map(|(corpus, datasets)| {
                let codes = sorted_keys(datasets)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (corpus.clone(), codes)
            })
            .collect();

        let stats = build_stats(&raw, &options.statcodes);
        let corpora = build_corpora(&raw);
        let groups = HierarchyIndex::build(&raw.collection);
        let ranking = Ranking::build(&raw.result_q, &raw.result_p, &groups);

        let mut aggregates = BTreeMap::new();
        let mut datasets = BTreeMap::new();
        let mut contexts = BTreeMap::new();
        for (corpus, codes) in &datasetcodes {
            for dataset in codes {
                let agg = DatasetAggregate::build(&raw, corpus, dataset);
                let info = raw.dataset.get(corpus).and_then(|d| d.get(dataset));
                datasets.insert(
                    dataset_key(corpus, dataset),
                    DatasetSummary {
                        corpuscode: corpus.clone(),
                        datasetcode: dataset.clone(),
                        description: info.and_then(|i| i.description.clone()),
                        tokens: agg.tokens,
                        types: agg.types,
                        hapaxes: agg.hapaxes,
                    },
                );
                aggregates.insert(dataset_key(corpus, dataset), agg);

                if let Some(by_sample) = raw.context.get(corpus).and_then(|c| c.get(dataset)) {
                    let index = ContextIndex::build(&raw, corpus, dataset, by_sample);
                    contexts.insert(dataset_key(corpus, dataset), index);
                }
            }
        }

        let mut curves = BTreeMap::new();
        for (corpus, by_dataset) in &raw.result_curve {
            for (dataset, by_stat) in by_dataset {
                for (stat, levels) in by_stat {
                    let set = CurveSet::build(levels, &raw.result_curve_point);
                    curves.insert((corpus.clone(), dataset.clone(), stat.clone()), set);
                }
            }
        }

        info!(
            corpora = corpuscodes.len(),
            datasets = aggregates.len(),
            stats = stats.len(),
            ranked = ranking.results().len(),
            tests = ranking.num_tests(),
            curves = curves.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built aggregation store"
        );

        Self {
            raw,
            corpuscodes,
            datasetcodes,
            stats,
            corpora,
            datasets,
            groups,
            ranking,
            aggregates,
            contexts,
            curves,
        }
    }

    pub fn raw(&self) -> &RawData {
        &self.raw
    }

    /// Corpus codes, sorted.
    pub fn corpuscodes(&self) -> &[String] {
        &self.corpuscodes
    }

    pub fn has_corpus(&self, corpus: &str) -> bool {
        self.raw.corpus.contains_key(corpus)
    }

    pub fn corpus(&self, corpus: &str) -> Option<&CorpusSummary> {
        self.corpora.get(corpus)
    }

    /// Dataset codes of a corpus, sorted.
    pub fn datasetcodes(&self, corpus: &str) -> &[String] {
        self.datasetcodes
            .get(corpus)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_dataset(&self, corpus: &str, dataset: &str) -> bool {
        self.raw
            .dataset
            .get(corpus)
            .is_some_and(|d| d.contains_key(dataset))
    }

    pub fn dataset(&self, corpus: &str, dataset: &str) -> Option<&DatasetSummary> {
        self.datasets.get(&dataset_key(corpus, dataset))
    }

    /// Statistics in configured order.
    pub fn stats(&self) -> &[StatInfo] {
        &self.stats
    }

    pub fn stat(&self, code: &str) -> Option<&StatInfo> {
        self.stats.iter().find(|s| s.code == code)
    }

    pub fn groups(&self) -> &HierarchyIndex {
        &self.groups
    }

    pub fn collection(&self, corpus: &str, collection: &str) -> Option<&RawCollection> {
        self.raw.collection.get(corpus)?.get(collection)
    }

    /// Member samples of a collection, in listed order.
    pub fn collection_samples(&self, corpus: &str, collection: &str) -> &[String] {
        self.raw
            .sample_collection
            .get(corpus)
            .and_then(|c| c.get(collection))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_sample(&self, corpus: &str, sample: &str) -> bool {
        self.raw
            .sample
            .get(corpus)
            .is_some_and(|s| s.contains_key(sample))
    }

    pub fn collection_has_sample(&self, corpus: &str, collection: &str, sample: &str) -> bool {
        self.collection_samples(corpus, collection)
            .iter()
            .any(|s| s == sample)
    }

    pub fn has_token(&self, corpus: &str, dataset: &str, token: &str) -> bool {
        self.aggregate(corpus, dataset)
            .is_some_and(|a| a.has_token(token))
    }

    pub fn ranking(&self) -> &Ranking {
        &self.ranking
    }

    /// Raw test counts of one collection.
    pub fn result(
        &self,
        corpus: &str,
        dataset: &str,
        collection: &str,
        stat: &str,
    ) -> Option<&RawResultP> {
        self.raw
            .result_p
            .get(corpus)?
            .get(dataset)?
            .get(collection)?
            .get(stat)
    }

    pub fn aggregate(&self, corpus: &str, dataset: &str) -> Option<&DatasetAggregate> {
        self.aggregates.get(&dataset_key(corpus, dataset))
    }

    pub fn contexts(&self, corpus: &str, dataset: &str) -> Option<&ContextIndex> {
        self.contexts.get(&dataset_key(corpus, dataset))
    }

    pub fn curves(&self, corpus: &str, dataset: &str, stat: &str) -> Option<&CurveSet> {
        self.curves
            .get(&(corpus.to_string(), dataset.to_string(), stat.to_string()))
    }
}

fn build_stats(raw: &RawData, statcodes: &[String]) -> Vec<StatInfo> {
    statcodes
        .iter()
        .filter_map(|code| {
            let stat = raw.stat.get(code)?;
            let xlabel = raw.label_text(&stat.x).to_string();
            let ylabel = raw.label_text(&stat.y).to_string();
            Some(StatInfo {
                code: code.clone(),
                x: stat.x.clone(),
                y: stat.y.clone(),
                label: format!("{ylabel} / {xlabel}"),
                xlabel,
                ylabel,
                description: stat.description.clone(),
            })
        })
        .collect()
}

fn build_corpora(raw: &RawData) -> BTreeMap<String, CorpusSummary> {
    raw.corpus
        .iter()
        .map(|(code, corpus)| {
            let samples = raw.sample.get(code);
            let summary = CorpusSummary {
                corpuscode: code.clone(),
                description: corpus.description.clone(),
                wordcount: samples.map_or(0, |s| s.values().map(|s| s.wordcount).sum()),
                samplecount: samples.map_or(0, |s| s.len() as u64),
            };
            (code.clone(), summary)
        })
        .collect()
}
