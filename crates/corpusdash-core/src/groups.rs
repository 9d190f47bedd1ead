//! Collection groups
//!
//! Collections of a corpus are partitioned into group buckets. The bucket
//! codes share one namespace: the synthetic buckets are `all` and `other`,
//! explicit group tags are prefixed with `.` so a tag can never shadow a
//! synthetic bucket.

use crate::raw::{CodeMap, RawCollection};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Bucket holding every collection of the corpus.
pub const ALL_GROUP: &str = "all";

/// Bucket holding the collections without a group tag.
pub const OTHER_GROUP: &str = "other";

/// Bucket code of an explicit group tag.
pub fn tagged_group_code(tag: &str) -> String {
    format!(".{tag}")
}

/// Display label of a bucket code (the tag itself for explicit groups).
pub fn group_label(code: &str) -> &str {
    code.strip_prefix('.').unwrap_or(code)
}

/// Group buckets of a single corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusGroups {
    /// Bucket codes in menu order: `all`, tagged groups, `other`
    order: Vec<String>,
    /// Bucket code -> member collections, sorted
    members: HashMap<String, Vec<String>>,
    /// Bucket code -> member collections, for membership tests
    membership: HashMap<String, HashSet<String>>,
    /// Collection -> the most specific bucket containing it
    group_of: HashMap<String, String>,
}

impl CorpusGroups {
    /// Partition the collections of one corpus.
    ///
    /// `other` is only added when some, but not all, collections are untagged.
    pub fn build(collections: &CodeMap<RawCollection>) -> Self {
        let mut all = Vec::new();
        let mut other = Vec::new();
        let mut tagged: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for (code, collection) in collections {
            match collection.groupcode.as_deref() {
                Some(tag) if !tag.is_empty() => {
                    tagged.entry(tag).or_default().push(code.clone());
                }
                _ => other.push(code.clone()),
            }
            all.push(code.clone());
        }

        let mut groups = CorpusGroups::default();
        let total = all.len();
        groups.add(ALL_GROUP.to_string(), all);
        for (tag, members) in tagged {
            groups.add(tagged_group_code(tag), members);
        }
        if !other.is_empty() && other.len() < total {
            groups.add(OTHER_GROUP.to_string(), other);
        }
        groups
    }

    fn add(&mut self, code: String, mut collections: Vec<String>) {
        collections.sort();
        for collection in &collections {
            // Later buckets are more specific, so they win.
            self.group_of.insert(collection.clone(), code.clone());
        }
        self.membership
            .insert(code.clone(), collections.iter().cloned().collect());
        self.members.insert(code.clone(), collections);
        self.order.push(code);
    }

    /// Bucket codes in menu order.
    pub fn groups(&self) -> &[String] {
        &self.order
    }

    pub fn is_group(&self, code: &str) -> bool {
        self.members.contains_key(code)
    }

    /// Collections of a bucket, sorted. `None` stands for `all`.
    pub fn collections(&self, group: Option<&str>) -> &[String] {
        self.members
            .get(group.unwrap_or(ALL_GROUP))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `collection` belongs to `group` (`None` stands for `all`).
    pub fn contains(&self, group: Option<&str>, collection: &str) -> bool {
        self.membership
            .get(group.unwrap_or(ALL_GROUP))
            .is_some_and(|m| m.contains(collection))
    }

    /// The most specific bucket a collection belongs to.
    pub fn group_of(&self, collection: &str) -> Option<&str> {
        self.group_of.get(collection).map(String::as_str)
    }
}

/// Group buckets of every corpus.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    by_corpus: BTreeMap<String, CorpusGroups>,
}

impl HierarchyIndex {
    pub fn build(collections: &CodeMap<CodeMap<RawCollection>>) -> Self {
        let by_corpus = collections
            .iter()
            .map(|(corpus, collections)| (corpus.clone(), CorpusGroups::build(collections)))
            .collect();
        Self { by_corpus }
    }

    pub fn corpus(&self, corpus: &str) -> Option<&CorpusGroups> {
        self.by_corpus.get(corpus)
    }

    /// Bucket codes of a corpus in menu order, empty for unknown corpora.
    pub fn groups(&self, corpus: &str) -> &[String] {
        self.corpus(corpus).map(CorpusGroups::groups).unwrap_or(&[])
    }

    pub fn collections(&self, corpus: &str, group: Option<&str>) -> &[String] {
        self.corpus(corpus)
            .map(|g| g.collections(group))
            .unwrap_or(&[])
    }

    pub fn is_group(&self, corpus: &str, group: &str) -> bool {
        self.corpus(corpus).is_some_and(|g| g.is_group(group))
    }

    pub fn contains(&self, corpus: &str, group: Option<&str>, collection: &str) -> bool {
        self.corpus(corpus)
            .is_some_and(|g| g.contains(group, collection))
    }

    pub fn group_of(&self, corpus: &str, collection: &str) -> Option<&str> {
        self.corpus(corpus)?.group_of(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collections(entries: &[(&str, Option<&str>)]) -> CodeMap<RawCollection> {
        entries
            .iter()
            .map(|(code, tag)| {
                (
                    code.to_string(),
                    RawCollection {
                        groupcode: tag.map(str::to_string),
                        description: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn partially_tagged_corpus_gets_other_bucket() {
        let groups = CorpusGroups::build(&collections(&[
            ("c", None),
            ("b", Some("G1")),
            ("a", Some("G1")),
        ]));
        assert_eq!(groups.groups(), ["all", ".G1", "other"]);
        assert_eq!(groups.collections(Some("all")), ["a", "b", "c"]);
        assert_eq!(groups.collections(Some(".G1")), ["a", "b"]);
        assert_eq!(groups.collections(Some("other")), ["c"]);
        assert_eq!(groups.collections(None), ["a", "b", "c"]);
        assert!(groups.contains(Some(".G1"), "a"));
        assert!(!groups.contains(Some(".G1"), "c"));
        assert!(groups.contains(None, "c"));
        assert_eq!(groups.group_of("a"), Some(".G1"));
        assert_eq!(groups.group_of("c"), Some("other"));
    }

    #[test]
    fn fully_tagged_corpus_has_no_other_bucket() {
        let groups = CorpusGroups::build(&collections(&[
            ("a", Some("Z")),
            ("b", Some("A")),
        ]));
        assert_eq!(groups.groups(), ["all", ".A", ".Z"]);
        assert!(!groups.is_group("other"));
    }

    #[test]
    fn untagged_corpus_has_only_all_bucket() {
        let groups = CorpusGroups::build(&collections(&[("a", None), ("b", Some(""))]));
        assert_eq!(groups.groups(), ["all"]);
        assert_eq!(groups.group_of("a"), Some("all"));
    }

    #[test]
    fn all_bucket_is_union_of_other_buckets() {
        let groups = CorpusGroups::build(&collections(&[
            ("x", Some("all")),
            ("y", Some("other")),
            ("z", None),
            ("w", Some("other")),
        ]));
        assert_eq!(groups.groups(), ["all", ".all", ".other", "other"]);
        let mut union: Vec<String> = groups.groups()[1..]
            .iter()
            .flat_map(|g| groups.collections(Some(g.as_str())).iter().cloned())
            .collect();
        union.sort();
        assert_eq!(groups.collections(Some("all")), union.as_slice());
    }

    #[test]
    fn unknown_corpus_lookups_are_empty() {
        let index = HierarchyIndex::default();
        assert!(index.groups("nope").is_empty());
        assert!(index.collections("nope", None).is_empty());
        assert!(!index.contains("nope", None, "a"));
        assert_eq!(index.group_of("nope", "a"), None);
    }

    #[test]
    fn group_labels_strip_tag_prefix() {
        assert_eq!(group_label(".G1"), "G1");
        assert_eq!(group_label("all"), "all");
    }
}
