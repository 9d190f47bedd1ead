//! Selection repair
//!
//! [`repair`] turns any candidate selection into a consistent one. Fields are
//! visited in [`REPAIR_ORDER`](crate::fields::REPAIR_ORDER) and each is
//! checked only against fields already visited, so a second pass never
//! changes anything.

use corpusdash_api::Selection;
use corpusdash_core::AggregationStore;

/// Repair a candidate selection.
///
/// Page, corpus, dataset and stat fall back to the first valid choice.
/// Group, collection, sample and token are cleared when they do not fit
/// their ancestors. A null group stands for the `all` bucket.
pub fn repair(store: &AggregationStore, pages: &[String], candidate: &Selection) -> Selection {
    let mut sel = candidate.clone();

    sel.pagecode = pick_or_first(sel.pagecode.take(), pages);

    sel.corpuscode = pick_or_first(sel.corpuscode.take(), store.corpuscodes());
    let Some(corpus) = sel.corpuscode.clone() else {
        sel.datasetcode = None;
        sel.groupcode = None;
        sel.collectioncode = None;
        sel.samplecode = None;
        sel.tokencode = None;
        sel.statcode = first_stat(store, sel.statcode.take());
        return sel;
    };

    sel.datasetcode = pick_or_first(sel.datasetcode.take(), store.datasetcodes(&corpus));

    let groups = store.groups();
    if let Some(group) = sel.groupcode.as_deref()
        && !groups.is_group(&corpus, group)
    {
        sel.groupcode = None;
    }

    if let Some(collection) = sel.collectioncode.as_deref()
        && !groups.contains(&corpus, sel.groupcode.as_deref(), collection)
    {
        sel.collectioncode = None;
    }

    if let Some(sample) = sel.samplecode.as_deref() {
        let member = match sel.collectioncode.as_deref() {
            Some(collection) => store.collection_has_sample(&corpus, collection, sample),
            None => store.has_sample(&corpus, sample),
        };
        if !member {
            sel.samplecode = None;
        }
    }

    if sel.samplecode.is_some() {
        sel.tokencode = None;
    } else if let Some(token) = sel.tokencode.as_deref() {
        let known = sel
            .datasetcode
            .as_deref()
            .is_some_and(|dataset| store.has_token(&corpus, dataset, token));
        if !known {
            sel.tokencode = None;
        }
    }

    sel.statcode = first_stat(store, sel.statcode.take());
    sel
}

fn pick_or_first(value: Option<String>, choices: &[String]) -> Option<String> {
    match value {
        Some(v) if choices.contains(&v) => Some(v),
        _ => choices.first().cloned(),
    }
}

fn first_stat(store: &AggregationStore, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if store.stat(&v).is_some() => Some(v),
        _ => store.stats().first().map(|s| s.code.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpusdash_core::{BuildOptions, RawData};

    fn store() -> AggregationStore {
        let raw = RawData::from_json(include_str!("../tests/fixtures/dataset.json"))
            .expect("fixture parses");
        AggregationStore::build(raw, &BuildOptions::default())
    }

    fn pages() -> Vec<String> {
        vec!["plot".to_string(), "samples".to_string()]
    }

    fn sel(pairs: &[(&str, &str)]) -> Selection {
        let mut sel = Selection::default();
        for (key, value) in pairs {
            let field = corpusdash_api::Field::from_key(key).expect("known field");
            sel.set(field, Some(value.to_string()));
        }
        sel
    }

    #[test]
    fn empty_selection_gets_defaults() {
        let store = store();
        let fixed = repair(&store, &pages(), &Selection::default());
        assert_eq!(fixed.pagecode.as_deref(), Some("plot"));
        assert_eq!(fixed.corpuscode.as_deref(), Some("C1"));
        assert_eq!(fixed.datasetcode.as_deref(), Some("lemma"));
        assert_eq!(fixed.statcode.as_deref(), Some("type-word"));
        assert_eq!(fixed.groupcode, None);
        assert_eq!(fixed.collectioncode, None);
    }

    #[test]
    fn untagged_collection_survives_without_group() {
        let store = store();
        let fixed = repair(&store, &pages(), &sel(&[("collectioncode", "c")]));
        assert_eq!(fixed.collectioncode.as_deref(), Some("c"));

        let fixed = repair(
            &store,
            &pages(),
            &sel(&[("groupcode", ".G1"), ("collectioncode", "c")]),
        );
        assert_eq!(fixed.groupcode.as_deref(), Some(".G1"));
        assert_eq!(fixed.collectioncode, None);
    }

    #[test]
    fn invalid_codes_are_replaced_or_cleared() {
        let store = store();
        let fixed = repair(
            &store,
            &pages(),
            &sel(&[
                ("pagecode", "nope"),
                ("corpuscode", "C2"),
                ("datasetcode", "lemma"),
                ("groupcode", ".G1"),
                ("collectioncode", "a"),
                ("statcode", "bogus"),
            ]),
        );
        assert_eq!(fixed.pagecode.as_deref(), Some("plot"));
        assert_eq!(fixed.corpuscode.as_deref(), Some("C2"));
        assert_eq!(fixed.datasetcode.as_deref(), Some("word"));
        assert_eq!(fixed.groupcode, None);
        assert_eq!(fixed.collectioncode, None);
        assert_eq!(fixed.statcode.as_deref(), Some("type-word"));
    }

    #[test]
    fn sample_must_belong_to_collection_and_excludes_token() {
        let store = store();
        let fixed = repair(
            &store,
            &pages(),
            &sel(&[("collectioncode", "a"), ("samplecode", "s3")]),
        );
        assert_eq!(fixed.samplecode, None);

        let fixed = repair(
            &store,
            &pages(),
            &sel(&[("samplecode", "s3"), ("tokencode", "cat")]),
        );
        assert_eq!(fixed.samplecode.as_deref(), Some("s3"));
        assert_eq!(fixed.tokencode, None);
    }

    #[test]
    fn token_must_exist_in_dataset() {
        let store = store();
        let fixed = repair(&store, &pages(), &sel(&[("tokencode", "cat")]));
        assert_eq!(fixed.tokencode.as_deref(), Some("cat"));
        let fixed = repair(&store, &pages(), &sel(&[("tokencode", "zebra")]));
        assert_eq!(fixed.tokencode, None);
    }

    #[test]
    fn repair_is_idempotent() {
        let store = store();
        let candidates = [
            Selection::default(),
            sel(&[("corpuscode", "C2"), ("samplecode", "s1")]),
            sel(&[("groupcode", "other"), ("collectioncode", "a")]),
            sel(&[("groupcode", "other"), ("collectioncode", "c"), ("samplecode", "s4")]),
            sel(&[("corpuscode", "missing"), ("tokencode", "the")]),
            sel(&[("datasetcode", "word"), ("tokencode", "cat")]),
        ];
        for candidate in candidates {
            let once = repair(&store, &pages(), &candidate);
            assert_eq!(repair(&store, &pages(), &once), once, "{candidate:?}");
        }
    }

    #[test]
    fn empty_store_repairs_to_nulls() {
        let store = AggregationStore::build(RawData::default(), &BuildOptions::default());
        let fixed = repair(&store, &[], &sel(&[("corpuscode", "C1"), ("tokencode", "x")]));
        assert_eq!(fixed, Selection::default());
    }
}
