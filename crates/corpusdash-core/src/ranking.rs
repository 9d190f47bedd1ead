//! Significance ranking and false discovery rate assignment

use crate::groups::HierarchyIndex;
use crate::raw::{CodeMap, RawResultP, RawResultQ, Side};
use facet::Facet;
use std::collections::HashMap;
use tracing::warn;

/// (corpus, dataset, collection, stat)
pub type ResultKey = (String, String, String, String);

/// A test result stamped with its rank and FDR ceiling.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct RankedResult {
    pub corpuscode: String,
    pub datasetcode: String,
    pub collectioncode: String,
    pub statcode: String,
    /// Most specific group bucket of the collection
    #[facet(default)]
    pub groupcode: Option<String>,
    /// Rank of the most significant reference to this result
    pub rank: u64,
    pub x: u64,
    pub y: u64,
    pub total: u64,
    pub above: u64,
    pub below: u64,
    pub side: Side,
    /// Share of random collections at least as extreme on `side`
    pub fraction: f64,
    /// False discovery rate ceiling at this rank
    pub fdr: f64,
}

impl RankedResult {
    pub fn key(&self) -> ResultKey {
        (
            self.corpuscode.clone(),
            self.datasetcode.clone(),
            self.collectioncode.clone(),
            self.statcode.clone(),
        )
    }
}

/// Share of random collections at least as extreme as the observed one on
/// `side`. A test without iterations carries no evidence and counts as 1.
pub fn side_fraction(body: &RawResultP, side: Side) -> f64 {
    if body.total == 0 {
        return 1.0;
    }
    let count = match side {
        Side::Above => body.above,
        Side::Below => body.below,
    };
    count as f64 / body.total as f64
}

/// Results in significance order, each result stamped once.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    results: Vec<RankedResult>,
    index: HashMap<ResultKey, usize>,
    num_tests: usize,
}

impl Ranking {
    /// Walk the ranking rows by ascending rank and stamp each referenced
    /// result the first time it is seen.
    ///
    /// The FDR ceiling is the running maximum of `q`, so a less significant
    /// row never lowers the ceiling of a more significant one.
    pub fn build(
        rows: &CodeMap<RawResultQ>,
        bodies: &CodeMap<CodeMap<CodeMap<CodeMap<RawResultP>>>>,
        groups: &HierarchyIndex,
    ) -> Self {
        let mut ranked: Vec<(u64, &RawResultQ)> = Vec::with_capacity(rows.len());
        for (rank, row) in rows {
            match rank.parse::<u64>() {
                Ok(rank) => ranked.push((rank, row)),
                Err(_) => warn!(rank = %rank, "Skipping ranking row with non-numeric rank"),
            }
        }
        ranked.sort_by_key(|(rank, _)| *rank);

        let mut ranking = Ranking {
            num_tests: ranked.len(),
            ..Default::default()
        };
        let mut running_max_q: Option<f64> = None;

        for (rank, row) in ranked {
            let fdr = match running_max_q {
                Some(q) if q >= row.q => q,
                _ => row.q,
            };
            running_max_q = Some(fdr);

            let key = (
                row.corpuscode.clone(),
                row.datasetcode.clone(),
                row.collectioncode.clone(),
                row.statcode.clone(),
            );
            if ranking.index.contains_key(&key) {
                continue;
            }
            let Some(body) = lookup_body(bodies, &key) else {
                warn!(
                    rank,
                    corpus = %row.corpuscode,
                    dataset = %row.datasetcode,
                    collection = %row.collectioncode,
                    stat = %row.statcode,
                    "Ranking row references a missing result"
                );
                continue;
            };

            ranking.index.insert(key, ranking.results.len());
            ranking.results.push(RankedResult {
                corpuscode: row.corpuscode.clone(),
                datasetcode: row.datasetcode.clone(),
                collectioncode: row.collectioncode.clone(),
                statcode: row.statcode.clone(),
                groupcode: groups
                    .group_of(&row.corpuscode, &row.collectioncode)
                    .map(str::to_string),
                rank,
                x: body.x,
                y: body.y,
                total: body.total,
                above: body.above,
                below: body.below,
                side: row.side,
                fraction: side_fraction(body, row.side),
                fdr,
            });
        }

        ranking
    }

    /// Stamped results, most significant first.
    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn get(
        &self,
        corpus: &str,
        dataset: &str,
        collection: &str,
        stat: &str,
    ) -> Option<&RankedResult> {
        let key = (
            corpus.to_string(),
            dataset.to_string(),
            collection.to_string(),
            stat.to_string(),
        );
        self.index.get(&key).map(|&i| &self.results[i])
    }

    /// Number of ranking rows, duplicates included.
    pub fn num_tests(&self) -> usize {
        self.num_tests
    }
}

fn lookup_body<'a>(
    bodies: &'a CodeMap<CodeMap<CodeMap<CodeMap<RawResultP>>>>,
    (corpus, dataset, collection, stat): &ResultKey,
) -> Option<&'a RawResultP> {
    bodies.get(corpus)?.get(dataset)?.get(collection)?.get(stat)
}
