//! Token, type and hapax counts per sample, collection and dataset

use crate::raw::{CodeMap, RawData, sorted_keys};
use facet::Facet;
use std::collections::BTreeMap;
use tracing::debug;

/// Corpus-wide or collection-wide totals of one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct TokenTotals {
    /// Occurrences
    pub tokencount: u64,
    /// Samples containing the token
    pub samplecount: u64,
}

impl TokenTotals {
    fn add(&mut self, count: u64) {
        self.tokencount += count;
        if count > 0 {
            self.samplecount += 1;
        }
    }
}

/// Per-sample figures of one dataset.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct SampleRow {
    pub corpuscode: String,
    pub datasetcode: String,
    pub samplecode: String,
    #[facet(default)]
    pub description: Option<String>,
    #[facet(default)]
    pub link: Option<String>,
    pub wordcount: u64,
    pub tokens: u64,
    pub types: u64,
    pub hapaxes: u64,
    /// Labels of the tokens that occur in this sample only
    pub unique: Vec<String>,
}

#[derive(Debug, Clone)]
struct SampleAggregate {
    row: SampleRow,
    tokenmap: BTreeMap<String, u64>,
}

/// Three-point smoothed estimate of a collection's share of a token.
///
/// With `a` occurrences in the collection out of `b` overall, returns
/// `[a/(b+2), (a+1)/(b+2), (a+2)/(b+2)]`: a lower bound, a point estimate
/// and an upper bound that stay inside `[0, 1]` even for `a == 0` or `a == b`.
pub fn calc_score(a: u64, b: u64) -> [f64; 3] {
    let n = (b + 2) as f64;
    let a = a as f64;
    [a / n, (a + 1.0) / n, (a + 2.0) / n]
}

/// Aggregates of one (corpus, dataset).
#[derive(Debug, Clone, Default)]
pub struct DatasetAggregate {
    pub tokens: u64,
    pub types: u64,
    pub hapaxes: u64,
    samples: BTreeMap<String, SampleAggregate>,
    global: BTreeMap<String, TokenTotals>,
    collections: BTreeMap<String, BTreeMap<String, TokenTotals>>,
}

impl DatasetAggregate {
    /// Aggregate one dataset of one corpus.
    ///
    /// Sample classification reads the dataset-wide counts, so every sample
    /// is summed before any sample is classified.
    pub fn build(raw: &RawData, corpus: &str, dataset: &str) -> Self {
        let mut agg = DatasetAggregate::default();
        agg.sum_samples(raw, corpus, dataset);
        agg.classify_samples(raw, corpus, dataset);
        agg.roll_up_collections(raw.sample_collection.get(corpus));
        agg.roll_up_dataset();
        debug!(
            corpus,
            dataset,
            samples = agg.samples.len(),
            types = agg.types,
            tokens = agg.tokens,
            hapaxes = agg.hapaxes,
            "Aggregated dataset"
        );
        agg
    }

    fn sum_samples(&mut self, raw: &RawData, corpus: &str, dataset: &str) {
        let Some(samples) = raw.sample.get(corpus) else {
            return;
        };
        let counts = raw.token.get(corpus).and_then(|d| d.get(dataset));

        for samplecode in sorted_keys(samples) {
            let sample = &samples[samplecode];
            let mut tokenmap: BTreeMap<String, u64> = BTreeMap::new();
            if let Some(tokens) = counts.and_then(|c| c.get(samplecode)) {
                for (tokencode, count) in tokens {
                    *tokenmap.entry(tokencode.clone()).or_default() += count.tokencount;
                }
            }
            for (tokencode, &count) in &tokenmap {
                self.global.entry(tokencode.clone()).or_default().add(count);
            }
            let row = SampleRow {
                corpuscode: corpus.to_string(),
                datasetcode: dataset.to_string(),
                samplecode: samplecode.to_string(),
                description: sample.description.clone(),
                link: sample.link.clone(),
                wordcount: sample.wordcount,
                tokens: 0,
                types: 0,
                hapaxes: 0,
                unique: Vec::new(),
            };
            self.samples
                .insert(samplecode.to_string(), SampleAggregate { row, tokenmap });
        }
    }

    fn classify_samples(&mut self, raw: &RawData, corpus: &str, dataset: &str) {
        for sample in self.samples.values_mut() {
            let row = &mut sample.row;
            for (tokencode, &sc) in &sample.tokenmap {
                let gc = self.global.get(tokencode).map_or(0, |t| t.tokencount);
                row.tokens += sc;
                row.types += 1;
                if gc == 1 {
                    row.hapaxes += 1;
                }
                if gc == sc {
                    row.unique
                        .push(raw.short_label(corpus, dataset, tokencode).to_string());
                }
            }
        }
    }

    fn roll_up_collections(&mut self, members: Option<&CodeMap<Vec<String>>>) {
        let Some(members) = members else {
            return;
        };
        for collectioncode in sorted_keys(members) {
            let mut totals: BTreeMap<String, TokenTotals> = BTreeMap::new();
            for samplecode in &members[collectioncode] {
                let Some(sample) = self.samples.get(samplecode) else {
                    continue;
                };
                for (tokencode, &count) in &sample.tokenmap {
                    totals.entry(tokencode.clone()).or_default().add(count);
                }
            }
            self.collections.insert(collectioncode.to_string(), totals);
        }
    }

    fn roll_up_dataset(&mut self) {
        for totals in self.global.values() {
            self.tokens += totals.tokencount;
            self.types += 1;
            if totals.tokencount == 1 {
                self.hapaxes += 1;
            }
        }
    }

    pub fn sample(&self, samplecode: &str) -> Option<&SampleRow> {
        self.samples.get(samplecode).map(|s| &s.row)
    }

    /// Sample rows in sample code order.
    pub fn samples(&self) -> impl Iterator<Item = &SampleRow> {
        self.samples.values().map(|s| &s.row)
    }

    /// Occurrences of a token in one sample.
    pub fn sample_count(&self, samplecode: &str, tokencode: &str) -> u64 {
        self.samples
            .get(samplecode)
            .and_then(|s| s.tokenmap.get(tokencode))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_token(&self, tokencode: &str) -> bool {
        self.global.contains_key(tokencode)
    }

    /// Dataset-wide totals in token code order.
    pub fn token_totals(&self) -> &BTreeMap<String, TokenTotals> {
        &self.global
    }

    /// Collection-wide totals, empty for unknown collections.
    pub fn collection_totals(&self, collectioncode: &str) -> Option<&BTreeMap<String, TokenTotals>> {
        self.collections.get(collectioncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawSample, RawTokenCount, RawTokenInfo};

    /// Three samples: `the` everywhere, `cat` only in s1 (twice), `dog` once in s2,
    /// `owl` once in s3.
    fn raw() -> RawData {
        let mut raw = RawData::default();
        let mut samples = CodeMap::new();
        for (code, wc) in [("s1", 100), ("s2", 200), ("s3", 50)] {
            samples.insert(
                code.to_string(),
                RawSample {
                    wordcount: wc,
                    description: None,
                    link: None,
                },
            );
        }
        raw.sample.insert("C1".to_string(), samples);

        let mut by_sample = CodeMap::new();
        for (sample, tokens) in [
            ("s1", vec![("the", 3), ("cat", 2)]),
            ("s2", vec![("the", 1), ("dog", 1)]),
            ("s3", vec![("the", 1), ("owl", 1)]),
        ] {
            let map: CodeMap<RawTokenCount> = tokens
                .into_iter()
                .map(|(t, c)| (t.to_string(), RawTokenCount { tokencount: c }))
                .collect();
            by_sample.insert(sample.to_string(), map);
        }
        let mut by_dataset = CodeMap::new();
        by_dataset.insert("d".to_string(), by_sample);
        raw.token.insert("C1".to_string(), by_dataset);

        let mut info = CodeMap::new();
        info.insert(
            "dog".to_string(),
            RawTokenInfo {
                shortlabel: Some("DOG".to_string()),
                longlabel: None,
            },
        );
        let mut info_by_dataset = CodeMap::new();
        info_by_dataset.insert("d".to_string(), info);
        raw.tokeninfo.insert("C1".to_string(), info_by_dataset);

        let mut members = CodeMap::new();
        members.insert(
            "pets".to_string(),
            vec!["s1".to_string(), "s2".to_string()],
        );
        members.insert("ghost".to_string(), vec!["missing".to_string()]);
        raw.sample_collection.insert("C1".to_string(), members);
        raw
    }

    #[test]
    fn sample_figures_use_dataset_wide_counts() {
        let agg = DatasetAggregate::build(&raw(), "C1", "d");

        let s1 = agg.sample("s1").expect("s1");
        assert_eq!((s1.tokens, s1.types, s1.hapaxes), (5, 2, 0));
        assert_eq!(s1.unique, vec!["cat"]);

        let s2 = agg.sample("s2").expect("s2");
        assert_eq!((s2.tokens, s2.types, s2.hapaxes), (2, 2, 1));
        assert_eq!(s2.unique, vec!["DOG"]);
        assert_eq!(s2.wordcount, 200);
    }

    #[test]
    fn dataset_rollup_counts_types_and_hapaxes() {
        let agg = DatasetAggregate::build(&raw(), "C1", "d");
        assert_eq!(agg.tokens, 9);
        assert_eq!(agg.types, 4);
        assert_eq!(agg.hapaxes, 2);
        assert_eq!(
            agg.token_totals()["the"],
            TokenTotals {
                tokencount: 5,
                samplecount: 3
            }
        );
    }

    #[test]
    fn collection_rollup_sums_member_samples() {
        let agg = DatasetAggregate::build(&raw(), "C1", "d");
        let pets = agg.collection_totals("pets").expect("pets");
        assert_eq!(
            pets["the"],
            TokenTotals {
                tokencount: 4,
                samplecount: 2
            }
        );
        assert!(!pets.contains_key("owl"));
        assert!(agg.collection_totals("ghost").expect("ghost").is_empty());
        assert!(agg.collection_totals("nope").is_none());
    }

    #[test]
    fn dataset_without_token_table_has_empty_samples() {
        let agg = DatasetAggregate::build(&raw(), "C1", "other");
        let s1 = agg.sample("s1").expect("samples still listed");
        assert_eq!((s1.tokens, s1.types), (0, 0));
        assert_eq!(agg.types, 0);
    }

    #[test]
    fn score_handles_edges() {
        assert_eq!(calc_score(0, 0), [0.0, 0.5, 1.0]);
        assert_eq!(calc_score(3, 3), [0.6, 0.8, 1.0]);
        for (a, b) in [(0, 10), (5, 10), (10, 10), (1, 1)] {
            let [lo, mid, hi] = calc_score(a, b);
            assert!(lo <= mid && mid <= hi);
            assert!(lo >= 0.0 && hi <= 1.0);
        }
    }
}
