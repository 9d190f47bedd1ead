//! Selection types for the corpusdash browser
//!
//! This crate contains the navigation state shared between the selection
//! engine and the renderers that display it: the field list, the
//! invalidation fragments renderers redraw, and the route codec used for
//! deep links.
//!
//! A route is one percent-escaped segment per field, joined with `/`, in
//! field declaration order. Null fields are empty segments:
//!
//! ```
//! use corpusdash_api::{Field, Selection, decode_selection, encode_selection};
//!
//! let mut sel = Selection::default();
//! sel.set(Field::Corpus, Some("news/2019".to_string()));
//! sel.set(Field::Stat, Some("type-word".to_string()));
//!
//! let route = encode_selection(&sel);
//! assert_eq!(route, "/news%2F2019////type-word//");
//! assert_eq!(decode_selection(&route), sel);
//! ```

use facet::Facet;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// One navigational field of a [`Selection`], in declaration order.
///
/// The order is part of the route format and of the repair order's
/// dependency table, so new fields go at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Page,
    Corpus,
    Dataset,
    Group,
    Collection,
    Stat,
    Sample,
    Token,
}

impl Field {
    /// Every field in declaration order.
    pub const ALL: [Field; 8] = [
        Field::Page,
        Field::Corpus,
        Field::Dataset,
        Field::Group,
        Field::Collection,
        Field::Stat,
        Field::Sample,
        Field::Token,
    ];

    /// The field's key as renderers see it.
    pub fn key(self) -> &'static str {
        match self {
            Field::Page => "pagecode",
            Field::Corpus => "corpuscode",
            Field::Dataset => "datasetcode",
            Field::Group => "groupcode",
            Field::Collection => "collectioncode",
            Field::Stat => "statcode",
            Field::Sample => "samplecode",
            Field::Token => "tokencode",
        }
    }

    /// Look a field up by its key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A part of the display that must be recomputed after a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Fragment {
    /// Which page is shown
    Page,
    /// Choices offered for the dataset field
    DatasetMenu,
    /// Choices offered for the group field
    GroupMenu,
    /// Choices offered for the collection field
    CollectionMenu,
    /// Confidence band curves of the plot
    Curves,
    /// Collection points of the plot
    Points,
    SampleTable,
    TokenTable,
    ContextTable,
    /// Descriptive text about the current corpus, dataset, or point
    Info,
}

impl Fragment {
    pub const ALL: [Fragment; 10] = [
        Fragment::Page,
        Fragment::DatasetMenu,
        Fragment::GroupMenu,
        Fragment::CollectionMenu,
        Fragment::Curves,
        Fragment::Points,
        Fragment::SampleTable,
        Fragment::TokenTable,
        Fragment::ContextTable,
        Fragment::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Fragment::Page => "page",
            Fragment::DatasetMenu => "dataset_menu",
            Fragment::GroupMenu => "group_menu",
            Fragment::CollectionMenu => "collection_menu",
            Fragment::Curves => "curves",
            Fragment::Points => "points",
            Fragment::SampleTable => "sample_table",
            Fragment::TokenTable => "token_table",
            Fragment::ContextTable => "context_table",
            Fragment::Info => "info",
        }
    }
}

/// The current navigational state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Facet)]
pub struct Selection {
    #[facet(default)]
    pub pagecode: Option<String>,
    #[facet(default)]
    pub corpuscode: Option<String>,
    #[facet(default)]
    pub datasetcode: Option<String>,
    #[facet(default)]
    pub groupcode: Option<String>,
    #[facet(default)]
    pub collectioncode: Option<String>,
    #[facet(default)]
    pub statcode: Option<String>,
    #[facet(default)]
    pub samplecode: Option<String>,
    #[facet(default)]
    pub tokencode: Option<String>,
}

impl Selection {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Clear a field.
    pub fn clear(&mut self, field: Field) {
        *self.slot_mut(field) = None;
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Page => &self.pagecode,
            Field::Corpus => &self.corpuscode,
            Field::Dataset => &self.datasetcode,
            Field::Group => &self.groupcode,
            Field::Collection => &self.collectioncode,
            Field::Stat => &self.statcode,
            Field::Sample => &self.samplecode,
            Field::Token => &self.tokencode,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Page => &mut self.pagecode,
            Field::Corpus => &mut self.corpuscode,
            Field::Dataset => &mut self.datasetcode,
            Field::Group => &mut self.groupcode,
            Field::Collection => &mut self.collectioncode,
            Field::Stat => &mut self.statcode,
            Field::Sample => &mut self.samplecode,
            Field::Token => &mut self.tokencode,
        }
    }

    /// Fields whose values differ between `self` and `other`, in declaration order.
    pub fn changed_fields(&self, other: &Selection) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f) != other.get(*f))
            .collect()
    }
}

/// A partial update to a [`Selection`].
///
/// Fields absent from the override keep their previous value; fields
/// present are replaced, `None` meaning "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOverride {
    values: BTreeMap<Field, Option<String>>,
}

impl SelectionOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// An override that supplies every field, taking values from `sel`.
    pub fn full(sel: &Selection) -> Self {
        let values = Field::ALL
            .into_iter()
            .map(|f| (f, sel.get(f).map(str::to_string)))
            .collect();
        Self { values }
    }

    /// Set a field. Empty strings count as null.
    pub fn set(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = value.into();
        self.values
            .insert(field, if value.is_empty() { None } else { Some(value) });
        self
    }

    pub fn clear(mut self, field: Field) -> Self {
        self.values.insert(field, None);
        self
    }

    /// Whether the override supplies `field` at all.
    pub fn supplies(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// The supplied value for `field`: `None` if not supplied, `Some(None)` if cleared.
    pub fn value(&self, field: Field) -> Option<Option<&str>> {
        self.values.get(&field).map(|v| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay this override on top of `base`.
    pub fn overlay(&self, base: &Selection) -> Selection {
        let mut sel = base.clone();
        for (field, value) in &self.values {
            sel.set(*field, value.clone());
        }
        sel
    }
}

/// Encode a selection as a route.
pub fn encode_selection(sel: &Selection) -> String {
    Field::ALL
        .into_iter()
        .map(|f| sel.get(f).map(urlencoding::encode).unwrap_or_default())
        .collect::<Vec<Cow<'_, str>>>()
        .join("/")
}

/// Decode a route. Missing or empty segments decode to `None`, extra
/// segments are ignored.
pub fn decode_selection(route: &str) -> Selection {
    let mut segments = route.split('/');
    let mut sel = Selection::default();
    for field in Field::ALL {
        let value = segments
            .next()
            .map(decode_segment)
            .filter(|v| !v.is_empty());
        sel.set(field, value);
    }
    sel
}

fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(s) => s.into_owned(),
        Err(_) => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_selection() -> Selection {
        Selection {
            pagecode: Some("plot".to_string()),
            corpuscode: Some("C1".to_string()),
            datasetcode: Some("lemma".to_string()),
            groupcode: Some(".G1".to_string()),
            collectioncode: Some("a b/c".to_string()),
            statcode: Some("type-word".to_string()),
            samplecode: Some("s%1".to_string()),
            tokencode: None,
        }
    }

    #[test]
    fn route_round_trips_escaped_values() {
        let sel = full_selection();
        let route = encode_selection(&sel);
        assert_eq!(route, "plot/C1/lemma/.G1/a%20b%2Fc/type-word/s%251/");
        assert_eq!(decode_selection(&route), sel);
    }

    #[test]
    fn empty_selection_encodes_to_empty_segments() {
        let sel = Selection::default();
        let route = encode_selection(&sel);
        assert_eq!(route, "///////");
        assert_eq!(decode_selection(&route), sel);
    }

    #[test]
    fn short_route_leaves_trailing_fields_null() {
        let sel = decode_selection("samples/C1");
        assert_eq!(sel.pagecode.as_deref(), Some("samples"));
        assert_eq!(sel.corpuscode.as_deref(), Some("C1"));
        assert_eq!(sel.datasetcode, None);
        assert_eq!(sel.tokencode, None);
        assert_eq!(decode_selection(""), Selection::default());
    }

    #[test]
    fn malformed_escape_is_kept_verbatim() {
        let sel = decode_selection("/C%ZZ");
        assert_eq!(sel.corpuscode.as_deref(), Some("C%ZZ"));
    }

    #[test]
    fn override_overlays_supplied_fields_only() {
        let base = full_selection();
        let over = SelectionOverride::new()
            .set(Field::Corpus, "C2")
            .clear(Field::Collection)
            .set(Field::Sample, "");
        let sel = over.overlay(&base);
        assert_eq!(sel.corpuscode.as_deref(), Some("C2"));
        assert_eq!(sel.collectioncode, None);
        assert_eq!(sel.samplecode, None);
        assert_eq!(sel.datasetcode.as_deref(), Some("lemma"));
        assert_eq!(over.value(Field::Sample), Some(None));
        assert_eq!(over.value(Field::Dataset), None);
    }

    #[test]
    fn changed_fields_follow_declaration_order() {
        let a = full_selection();
        let mut b = a.clone();
        b.set(Field::Token, Some("t".to_string()));
        b.clear(Field::Corpus);
        assert_eq!(a.changed_fields(&b), vec![Field::Corpus, Field::Token]);
    }

    #[test]
    fn field_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("nope"), None);
    }
}
