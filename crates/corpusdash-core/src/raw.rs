//! Raw dataset loading
//!
//! The raw dataset is the JSON export of the statistics database: a set of
//! tables, each a nested map keyed by entity codes. Only the key hierarchy
//! and the numeric fields are interpreted here; everything else is carried
//! through for display.

use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::HashMap;
use std::path::Path;

/// Map keyed by an entity code.
pub type CodeMap<V> = HashMap<String, V>;

/// Which tail of the null distribution a test result is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[facet(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Collection has more than expected
    Above,
    /// Collection has fewer than expected
    Below,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Above => "above",
            Side::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Facet)]
pub struct RawLabel {
    pub labeltext: String,
}

#[derive(Debug, Clone, Facet)]
pub struct RawStat {
    /// Label code of the x axis
    pub x: String,
    /// Label code of the y axis
    pub y: String,
    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct RawCorpus {
    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct RawDatasetInfo {
    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Facet)]
pub struct RawSample {
    pub wordcount: u64,
    #[facet(default)]
    pub description: Option<String>,
    #[facet(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct RawCollection {
    #[facet(default)]
    pub groupcode: Option<String>,
    #[facet(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Facet)]
pub struct RawTokenCount {
    pub tokencount: u64,
}

#[derive(Debug, Clone, Default, Facet)]
pub struct RawTokenInfo {
    #[facet(default)]
    pub shortlabel: Option<String>,
    #[facet(default)]
    pub longlabel: Option<String>,
}

/// One in-text occurrence of a token.
#[derive(Debug, Clone, Default, Facet)]
pub struct RawContext {
    #[facet(default)]
    pub before: Option<String>,
    #[facet(default)]
    pub word: Option<String>,
    #[facet(default)]
    pub after: Option<String>,
    #[facet(default)]
    pub link: Option<String>,
}

/// Raw counts of a collection-vs-corpus test.
#[derive(Debug, Clone, Facet)]
pub struct RawResultP {
    pub x: u64,
    pub y: u64,
    /// Number of random collections drawn
    pub total: u64,
    /// Random collections with fewer than `y`
    pub below: u64,
    /// Random collections with more than `y`
    pub above: u64,
}

/// One row of the significance ranking.
#[derive(Debug, Clone, Facet)]
pub struct RawResultQ {
    pub corpuscode: String,
    pub datasetcode: String,
    pub collectioncode: String,
    pub statcode: String,
    pub side: Side,
    #[facet(default)]
    pub p: Option<f64>,
    pub q: f64,
}

#[derive(Debug, Clone, Facet)]
pub struct RawCurveRef {
    pub id: u64,
}

#[derive(Debug, Clone, Facet)]
pub struct RawCurvePair {
    pub lower: RawCurveRef,
    pub upper: RawCurveRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct RawCurvePoint {
    pub x: u64,
    pub y: u64,
}

/// The whole raw dataset.
#[derive(Debug, Clone, Default, Facet)]
pub struct RawData {
    /// labelcode -> label
    #[facet(default)]
    pub label: CodeMap<RawLabel>,
    /// statcode -> stat
    #[facet(default)]
    pub stat: CodeMap<RawStat>,
    /// corpus -> info
    #[facet(default)]
    pub corpus: CodeMap<RawCorpus>,
    /// corpus -> dataset -> info
    #[facet(default)]
    pub dataset: CodeMap<CodeMap<RawDatasetInfo>>,
    /// corpus -> sample -> info
    #[facet(default)]
    pub sample: CodeMap<CodeMap<RawSample>>,
    /// corpus -> collection -> info
    #[facet(default)]
    pub collection: CodeMap<CodeMap<RawCollection>>,
    /// corpus -> collection -> member samples
    #[facet(default)]
    pub sample_collection: CodeMap<CodeMap<Vec<String>>>,
    /// corpus -> dataset -> sample -> token -> count
    #[facet(default)]
    pub token: CodeMap<CodeMap<CodeMap<CodeMap<RawTokenCount>>>>,
    /// corpus -> dataset -> token -> labels
    #[facet(default)]
    pub tokeninfo: CodeMap<CodeMap<CodeMap<RawTokenInfo>>>,
    /// corpus -> dataset -> sample -> token -> occurrences
    #[facet(default)]
    pub context: CodeMap<CodeMap<CodeMap<CodeMap<Vec<RawContext>>>>>,
    /// corpus -> dataset -> collection -> stat -> counts
    #[facet(default)]
    pub result_p: CodeMap<CodeMap<CodeMap<CodeMap<RawResultP>>>>,
    /// rank (decimal) -> ranking row
    #[facet(default)]
    pub result_q: CodeMap<RawResultQ>,
    /// corpus -> dataset -> stat -> level (decimal) -> curve ids
    #[facet(default)]
    pub result_curve: CodeMap<CodeMap<CodeMap<CodeMap<RawCurvePair>>>>,
    /// curve id (decimal) -> points sorted by x
    #[facet(default)]
    pub result_curve_point: CodeMap<Vec<RawCurvePoint>>,
}

impl RawData {
    /// Parse a raw dataset from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse raw dataset JSON")
    }

    /// Load a raw dataset from a local file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read raw dataset from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse raw dataset from {}", path.display()))
    }

    /// Display labels of a token, if any are configured.
    pub fn token_info(&self, corpus: &str, dataset: &str, token: &str) -> Option<&RawTokenInfo> {
        self.tokeninfo.get(corpus)?.get(dataset)?.get(token)
    }

    /// Short display label of a token, falling back to its code.
    pub fn short_label<'a>(&'a self, corpus: &str, dataset: &str, token: &'a str) -> &'a str {
        self.token_info(corpus, dataset, token)
            .and_then(|info| info.shortlabel.as_deref())
            .unwrap_or(token)
    }

    /// Label text for a label code, falling back to the code.
    pub fn label_text<'a>(&'a self, code: &'a str) -> &'a str {
        self.label
            .get(code)
            .map(|l| l.labeltext.as_str())
            .unwrap_or(code)
    }
}

/// Keys of a code map in lexicographic order.
pub(crate) fn sorted_keys<V>(map: &CodeMap<V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
