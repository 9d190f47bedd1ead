//! In-context occurrences with display labels and sort keys

use crate::raw::{CodeMap, RawContext, RawData, sorted_keys};
use facet::Facet;
use std::collections::BTreeMap;

/// One occurrence of a token, ready for display.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct ContextRow {
    pub corpuscode: String,
    pub datasetcode: String,
    pub samplecode: String,
    pub tokencode: String,
    pub shortlabel: String,
    pub longlabel: String,
    #[facet(default)]
    pub before: Option<String>,
    #[facet(default)]
    pub word: Option<String>,
    #[facet(default)]
    pub after: Option<String>,
    #[facet(default)]
    pub link: Option<String>,
    /// Preceding words nearest-first, folded
    pub before_sort: String,
    pub word_sort: String,
    pub after_sort: String,
}

/// Sort key of the preceding context: words in reverse order, so that rows
/// sort by the word next to the match.
pub fn before_sort_key(before: &str) -> String {
    let mut words: Vec<&str> = before.split_whitespace().collect();
    words.reverse();
    words.join(" ").to_lowercase()
}

/// Sort key of the matched word or the following context.
pub fn plain_sort_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Occurrences of one (corpus, dataset).
#[derive(Debug, Clone, Default)]
pub struct ContextIndex {
    rows: Vec<ContextRow>,
    by_sample: BTreeMap<String, Vec<usize>>,
    by_token: BTreeMap<String, Vec<usize>>,
}

impl ContextIndex {
    pub fn build(
        raw: &RawData,
        corpus: &str,
        dataset: &str,
        by_sample: &CodeMap<CodeMap<Vec<RawContext>>>,
    ) -> Self {
        let mut index = ContextIndex::default();
        for samplecode in sorted_keys(by_sample) {
            let tokens = &by_sample[samplecode];
            for tokencode in sorted_keys(tokens) {
                let info = raw.token_info(corpus, dataset, tokencode);
                let shortlabel = info
                    .and_then(|i| i.shortlabel.clone())
                    .unwrap_or_else(|| tokencode.to_string());
                let longlabel = info
                    .and_then(|i| i.longlabel.clone())
                    .unwrap_or_else(|| tokencode.to_string());

                for occurrence in &tokens[tokencode] {
                    let row = ContextRow {
                        corpuscode: corpus.to_string(),
                        datasetcode: dataset.to_string(),
                        samplecode: samplecode.to_string(),
                        tokencode: tokencode.to_string(),
                        shortlabel: shortlabel.clone(),
                        longlabel: longlabel.clone(),
                        before_sort: occurrence
                            .before
                            .as_deref()
                            .map(before_sort_key)
                            .unwrap_or_default(),
                        word_sort: occurrence
                            .word
                            .as_deref()
                            .map(plain_sort_key)
                            .unwrap_or_default(),
                        after_sort: occurrence
                            .after
                            .as_deref()
                            .map(plain_sort_key)
                            .unwrap_or_default(),
                        before: occurrence.before.clone(),
                        word: occurrence.word.clone(),
                        after: occurrence.after.clone(),
                        link: occurrence.link.clone(),
                    };
                    index.push(row);
                }
            }
        }
        index
    }

    fn push(&mut self, row: ContextRow) {
        let at = self.rows.len();
        self.by_sample
            .entry(row.samplecode.clone())
            .or_default()
            .push(at);
        self.by_token
            .entry(row.tokencode.clone())
            .or_default()
            .push(at);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Occurrences in one sample.
    pub fn for_sample(&self, samplecode: &str) -> Vec<&ContextRow> {
        self.pick(self.by_sample.get(samplecode))
    }

    /// Occurrences of one token across samples.
    pub fn for_token(&self, tokencode: &str) -> Vec<&ContextRow> {
        self.pick(self.by_token.get(tokencode))
    }

    fn pick(&self, at: Option<&Vec<usize>>) -> Vec<&ContextRow> {
        at.map(|at| at.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawTokenInfo;

    fn occurrence(before: &str, word: &str, after: &str) -> RawContext {
        RawContext {
            before: Some(before.to_string()),
            word: Some(word.to_string()),
            after: Some(after.to_string()),
            link: None,
        }
    }

    #[test]
    fn sort_keys_fold_case_and_whitespace() {
        assert_eq!(before_sort_key("  The  quick\tBrown "), "brown quick the");
        assert_eq!(plain_sort_key("  Fox Jumps "), "fox jumps");
        assert_eq!(before_sort_key(""), "");
    }

    #[test]
    fn build_labels_and_indexes_occurrences() {
        let mut raw = RawData::default();
        let mut info = CodeMap::new();
        info.insert(
            "fox".to_string(),
            RawTokenInfo {
                shortlabel: Some("Fox".to_string()),
                longlabel: Some("Fox (noun)".to_string()),
            },
        );
        let mut info_by_dataset = CodeMap::new();
        info_by_dataset.insert("d".to_string(), info);
        raw.tokeninfo.insert("C1".to_string(), info_by_dataset);

        let mut s1 = CodeMap::new();
        s1.insert(
            "fox".to_string(),
            vec![
                occurrence("the quick brown", "Fox", "jumps"),
                occurrence("a", "fox", "ran"),
            ],
        );
        s1.insert("dog".to_string(), vec![occurrence("lazy", "Dog", "")]);
        let mut s2 = CodeMap::new();
        s2.insert("fox".to_string(), vec![RawContext::default()]);
        let mut by_sample = CodeMap::new();
        by_sample.insert("s2".to_string(), s2);
        by_sample.insert("s1".to_string(), s1);

        let index = ContextIndex::build(&raw, "C1", "d", &by_sample);
        assert_eq!(index.len(), 4);

        let s1_rows = index.for_sample("s1");
        let tokens: Vec<&str> = s1_rows.iter().map(|r| r.tokencode.as_str()).collect();
        assert_eq!(tokens, vec!["dog", "fox", "fox"]);
        assert_eq!(s1_rows[0].shortlabel, "dog");
        assert_eq!(s1_rows[1].longlabel, "Fox (noun)");
        assert_eq!(s1_rows[1].before_sort, "brown quick the");
        assert_eq!(s1_rows[1].word_sort, "fox");

        let fox: Vec<&str> = index
            .for_token("fox")
            .iter()
            .map(|r| r.samplecode.as_str())
            .collect();
        assert_eq!(fox, vec!["s1", "s1", "s2"]);
        assert_eq!(index.for_token("fox")[2].before_sort, "");
        assert!(index.for_sample("nope").is_empty());
    }
}
