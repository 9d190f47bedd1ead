//! Read-only queries for the current selection
//!
//! A [`Query`] pairs the store with one selection. Everything it returns
//! is computed on demand; a selection that is still incomplete (no
//! dataset yet, no collection chosen) gives empty results.

use crate::config::Config;
use corpusdash_api::Selection;
use corpusdash_core::raw::RawCollection;
use corpusdash_core::{
    AggregationStore, ContextRow, CorpusSummary, CurveSet, DatasetSummary, RankedResult,
    SampleRow, Side, StatInfo, calc_score, side_fraction,
};
use facet::Facet;

/// Plot marker of a collection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Marker {
    /// Unusually high
    Up,
    /// Unusually low
    Down,
    Square,
}

/// How a selected result reads against the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Finding {
    /// Not significant on its side
    Typical,
    /// Significant and within the FDR threshold
    Interesting,
    /// Significant, but too far down the ranking
    NotInteresting,
}

/// One collection in the plot.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct PlotPoint {
    pub collectioncode: String,
    pub x: u64,
    pub y: u64,
    /// Share of random collections above the observed value
    pub above: f64,
    /// Share of random collections below the observed value
    pub below: f64,
    pub selected: bool,
    pub marker: Marker,
}

/// One token of the token table.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct TokenRow {
    pub tokencode: String,
    pub shortlabel: String,
    pub longlabel: String,
    pub tokencount: u64,
    pub samplecount: u64,
    /// Counts within the chosen collection
    #[facet(default)]
    pub tokencount_collection: Option<u64>,
    #[facet(default)]
    pub samplecount_collection: Option<u64>,
    /// Smoothed share of the token's occurrences in the chosen collection
    #[facet(default)]
    pub score: Option<[f64; 3]>,
}

pub struct Query<'a> {
    store: &'a AggregationStore,
    config: &'a Config,
    sel: &'a Selection,
}

impl<'a> Query<'a> {
    pub fn new(store: &'a AggregationStore, config: &'a Config, sel: &'a Selection) -> Self {
        Self { store, config, sel }
    }

    pub fn selection(&self) -> &'a Selection {
        self.sel
    }

    fn corpus_code(&self) -> Option<&'a str> {
        self.sel.corpuscode.as_deref()
    }

    fn corpus_dataset(&self) -> Option<(&'a str, &'a str)> {
        Some((
            self.sel.corpuscode.as_deref()?,
            self.sel.datasetcode.as_deref()?,
        ))
    }

    // Choice lists

    pub fn pages(&self) -> Vec<String> {
        self.config.pages()
    }

    pub fn corpora(&self) -> &'a [String] {
        self.store.corpuscodes()
    }

    pub fn datasets(&self) -> &'a [String] {
        match self.corpus_code() {
            Some(corpus) => self.store.datasetcodes(corpus),
            None => &[],
        }
    }

    /// Group bucket codes in menu order.
    pub fn groups(&self) -> &'a [String] {
        match self.corpus_code() {
            Some(corpus) => self.store.groups().groups(corpus),
            None => &[],
        }
    }

    /// Collections of the chosen group bucket.
    pub fn collections(&self) -> &'a [String] {
        match self.corpus_code() {
            Some(corpus) => self
                .store
                .groups()
                .collections(corpus, self.sel.groupcode.as_deref()),
            None => &[],
        }
    }

    pub fn stats(&self) -> &'a [StatInfo] {
        self.store.stats()
    }

    // Results

    /// Every ranked result, most significant first.
    pub fn ranked_results(&self) -> &'a [RankedResult] {
        self.store.ranking().results()
    }

    pub fn num_tests(&self) -> usize {
        self.store.ranking().num_tests()
    }

    pub fn curves(&self) -> Option<&'a CurveSet> {
        let (corpus, dataset) = self.corpus_dataset()?;
        self.store
            .curves(corpus, dataset, self.sel.statcode.as_deref()?)
    }

    /// Points of the chosen group bucket, in bucket order.
    pub fn points(&self) -> Vec<PlotPoint> {
        let Some((corpus, dataset)) = self.corpus_dataset() else {
            return Vec::new();
        };
        let Some(stat) = self.sel.statcode.as_deref() else {
            return Vec::new();
        };
        self.collections()
            .iter()
            .filter_map(|collection| self.plot_point(corpus, dataset, collection, stat))
            .collect()
    }

    /// Point of the chosen collection.
    pub fn point(&self) -> Option<PlotPoint> {
        let (corpus, dataset) = self.corpus_dataset()?;
        self.plot_point(
            corpus,
            dataset,
            self.sel.collectioncode.as_deref()?,
            self.sel.statcode.as_deref()?,
        )
    }

    fn plot_point(
        &self,
        corpus: &str,
        dataset: &str,
        collection: &str,
        stat: &str,
    ) -> Option<PlotPoint> {
        let body = self.store.result(corpus, dataset, collection, stat)?;
        let above = side_fraction(body, Side::Above);
        let below = side_fraction(body, Side::Below);
        let threshold = self.config.triangle_threshold();
        let marker = if above < threshold {
            Marker::Up
        } else if below < threshold {
            Marker::Down
        } else {
            Marker::Square
        };
        Some(PlotPoint {
            collectioncode: collection.to_string(),
            x: body.x,
            y: body.y,
            above,
            below,
            selected: self.sel.collectioncode.as_deref() == Some(collection),
            marker,
        })
    }

    /// The ranked result behind the chosen point.
    pub fn result(&self) -> Option<&'a RankedResult> {
        let (corpus, dataset) = self.corpus_dataset()?;
        self.store.ranking().get(
            corpus,
            dataset,
            self.sel.collectioncode.as_deref()?,
            self.sel.statcode.as_deref()?,
        )
    }

    pub fn finding(&self) -> Option<Finding> {
        let result = self.result()?;
        let finding = if result.fraction > self.config.p_threshold() {
            Finding::Typical
        } else if result.fdr <= self.config.fdr_threshold() {
            Finding::Interesting
        } else {
            Finding::NotInteresting
        };
        Some(finding)
    }

    // Descriptions

    pub fn stat(&self) -> Option<&'a StatInfo> {
        self.store.stat(self.sel.statcode.as_deref()?)
    }

    pub fn corpus(&self) -> Option<&'a CorpusSummary> {
        self.store.corpus(self.corpus_code()?)
    }

    pub fn dataset(&self) -> Option<&'a DatasetSummary> {
        let (corpus, dataset) = self.corpus_dataset()?;
        self.store.dataset(corpus, dataset)
    }

    pub fn collection(&self) -> Option<&'a RawCollection> {
        self.store
            .collection(self.corpus_code()?, self.sel.collectioncode.as_deref()?)
    }

    // Tables

    /// Samples of the chosen collection in listed order, or of the whole
    /// corpus when no collection is chosen.
    pub fn samples(&self) -> Vec<&'a SampleRow> {
        let Some((corpus, dataset)) = self.corpus_dataset() else {
            return Vec::new();
        };
        let Some(agg) = self.store.aggregate(corpus, dataset) else {
            return Vec::new();
        };
        match self.sel.collectioncode.as_deref() {
            Some(collection) => self
                .store
                .collection_samples(corpus, collection)
                .iter()
                .filter_map(|s| agg.sample(s))
                .collect(),
            None => agg.samples().collect(),
        }
    }

    /// Tokens of the chosen dataset, most frequent first. With a
    /// collection chosen, only tokens occurring in it, with its counts.
    pub fn tokens(&self) -> Vec<TokenRow> {
        let Some((corpus, dataset)) = self.corpus_dataset() else {
            return Vec::new();
        };
        let Some(agg) = self.store.aggregate(corpus, dataset) else {
            return Vec::new();
        };
        let raw = self.store.raw();
        let in_collection = match self.sel.collectioncode.as_deref() {
            Some(collection) => match agg.collection_totals(collection) {
                Some(totals) => Some(totals),
                None => return Vec::new(),
            },
            None => None,
        };

        let mut rows: Vec<TokenRow> = agg
            .token_totals()
            .iter()
            .filter_map(|(tokencode, global)| {
                let info = raw.token_info(corpus, dataset, tokencode);
                let mut row = TokenRow {
                    tokencode: tokencode.clone(),
                    shortlabel: info
                        .and_then(|i| i.shortlabel.clone())
                        .unwrap_or_else(|| tokencode.clone()),
                    longlabel: info
                        .and_then(|i| i.longlabel.clone())
                        .unwrap_or_else(|| tokencode.clone()),
                    tokencount: global.tokencount,
                    samplecount: global.samplecount,
                    tokencount_collection: None,
                    samplecount_collection: None,
                    score: None,
                };
                if let Some(totals) = in_collection {
                    let local = totals.get(tokencode)?;
                    row.tokencount_collection = Some(local.tokencount);
                    row.samplecount_collection = Some(local.samplecount);
                    row.score = Some(calc_score(local.tokencount, global.tokencount));
                }
                Some(row)
            })
            .collect();
        rows.sort_by(|a, b| {
            b.tokencount
                .cmp(&a.tokencount)
                .then_with(|| a.tokencode.cmp(&b.tokencode))
        });
        rows
    }

    /// Occurrences for the chosen sample, or for the chosen token.
    pub fn context(&self) -> Vec<&'a ContextRow> {
        let Some((corpus, dataset)) = self.corpus_dataset() else {
            return Vec::new();
        };
        let Some(index) = self.store.contexts(corpus, dataset) else {
            return Vec::new();
        };
        if let Some(sample) = self.sel.samplecode.as_deref() {
            return index.for_sample(sample);
        }
        let Some(token) = self.sel.tokencode.as_deref() else {
            return Vec::new();
        };
        let rows = index.for_token(token);
        match self.sel.collectioncode.as_deref() {
            Some(collection) => {
                let members = self.store.collection_samples(corpus, collection);
                rows.into_iter()
                    .filter(|r| members.contains(&r.samplecode))
                    .collect()
            }
            None => rows,
        }
    }
}
