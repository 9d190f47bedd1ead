//! The selection controller
//!
//! All selection changes go through [`Controller::apply`]: overlay the
//! update, repair, diff against the previous selection, and mirror the
//! result to the location. Renderers read [`Controller::last_changes`] to
//! learn what to redraw and [`Controller::query`] to get the data.

use crate::config::Config;
use crate::fields::FieldTable;
use crate::location::{Location, LocationChange, MemoryLocation, Origin};
use crate::query::Query;
use crate::repair::repair;
use corpusdash_api::{
    Field, Fragment, Selection, SelectionOverride, decode_selection, encode_selection,
};
use corpusdash_core::{AggregationStore, RankedResult};
use eyre::{Result, WrapErr};
use tracing::{debug, trace};

/// What one [`Controller::apply`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Fields whose value changed, in declaration order
    pub changed: Vec<Field>,
    /// Fragments to redraw
    pub fragments: Vec<Fragment>,
    /// Whether the apply was forced; forced applies redraw everything
    pub forced: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && !self.forced
    }

    pub fn invalidates(&self, fragment: Fragment) -> bool {
        self.fragments.contains(&fragment)
    }
}

pub struct Controller<'s, L: Location> {
    store: &'s AggregationStore,
    config: Config,
    pages: Vec<String>,
    table: FieldTable,
    location: L,
    selection: Selection,
    last_changes: Changes,
}

impl<'s, L: Location> Controller<'s, L> {
    /// Create a controller and bring it to the selection named by
    /// `initial_route`, or to the defaults when there is none.
    pub fn new(
        store: &'s AggregationStore,
        config: Config,
        location: L,
        initial_route: Option<&str>,
    ) -> Result<Self> {
        let table = FieldTable::standard();
        table
            .validate()
            .wrap_err("Invalid field dependency table")?;

        let mut controller = Self {
            store,
            pages: config.pages(),
            config,
            table,
            location,
            selection: Selection::default(),
            last_changes: Changes::default(),
        };
        let update = match initial_route {
            Some(route) => SelectionOverride::full(&decode_selection(route)),
            None => SelectionOverride::new(),
        };
        controller.apply(&update, true);
        Ok(controller)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Changes of the last apply that did anything.
    pub fn last_changes(&self) -> &Changes {
        &self.last_changes
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn query(&self) -> Query<'_> {
        Query::new(self.store, &self.config, &self.selection)
    }

    /// Overlay `update` on the current selection and repair the result.
    ///
    /// Returns empty changes, and touches nothing, when no field changed
    /// and `force` is off.
    pub fn apply(&mut self, update: &SelectionOverride, force: bool) -> Changes {
        let mut candidate = update.overlay(&self.selection);
        if matches!(update.value(Field::Sample), Some(Some(_))) {
            candidate.tokencode = None;
        } else if matches!(update.value(Field::Token), Some(Some(_))) {
            candidate.samplecode = None;
        }

        let repaired = repair(self.store, &self.pages, &candidate);
        let changed = repaired.changed_fields(&self.selection);
        if changed.is_empty() && !force {
            trace!("Selection unchanged");
            return Changes::default();
        }

        let fragments = if force {
            Fragment::ALL.to_vec()
        } else {
            self.table.fragments(&changed)
        };
        debug!(
            changed = ?changed.iter().map(|f| f.key()).collect::<Vec<_>>(),
            fragments = fragments.len(),
            force,
            "Applied selection"
        );

        self.selection = repaired;
        self.location.write(&encode_selection(&self.selection));
        self.last_changes = Changes {
            changed,
            fragments,
            forced: force,
        };
        self.last_changes.clone()
    }

    /// React to a location change. Echoes of our own writes are ignored;
    /// outside navigation replaces the whole selection.
    pub fn observe(&mut self, change: &LocationChange) -> Option<Changes> {
        match change.origin {
            Origin::Internal => {
                trace!(route = %change.route, "Ignoring location echo");
                None
            }
            Origin::External => {
                let update = SelectionOverride::full(&decode_selection(&change.route));
                Some(self.apply(&update, false))
            }
        }
    }

    /// Select the clicked result, or deselect its collection when it is
    /// already selected.
    pub fn toggle_result(&mut self, result: &RankedResult) -> Changes {
        let mut row = SelectionOverride::new()
            .set(Field::Corpus, result.corpuscode.as_str())
            .set(Field::Dataset, result.datasetcode.as_str())
            .set(Field::Collection, result.collectioncode.as_str())
            .set(Field::Stat, result.statcode.as_str());
        if let Some(group) = &result.groupcode {
            row = row.set(Field::Group, group.as_str());
        }
        self.toggle(row, Field::Collection)
    }

    /// Select the clicked plot point, or deselect it.
    pub fn toggle_point(&mut self, collection: &str) -> Changes {
        let row = SelectionOverride::new().set(Field::Collection, collection);
        self.toggle(row, Field::Collection)
    }

    /// Select the clicked sample, or deselect it.
    pub fn toggle_sample(&mut self, corpus: &str, dataset: &str, sample: &str) -> Changes {
        let row = SelectionOverride::new()
            .set(Field::Corpus, corpus)
            .set(Field::Dataset, dataset)
            .set(Field::Sample, sample);
        self.toggle(row, Field::Sample)
    }

    fn toggle(&mut self, row: SelectionOverride, deselect: Field) -> Changes {
        let all_set = Field::ALL.into_iter().all(|field| match row.value(field) {
            Some(value) => self.selection.get(field) == value,
            None => true,
        });
        if all_set {
            self.apply(&SelectionOverride::new().clear(deselect), false)
        } else {
            self.apply(&row, false)
        }
    }
}

impl<'s> Controller<'s, MemoryLocation> {
    /// Deliver every pending location notification. Returns how many
    /// outside navigations changed the selection.
    pub fn process_notifications(&mut self) -> usize {
        let mut applied = 0;
        while let Some(change) = self.location.poll() {
            if self.observe(&change).is_some_and(|c| !c.is_empty()) {
                applied += 1;
            }
        }
        applied
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

    fn controller(store: &AggregationStore) -> Controller<'_, MemoryLocation> {
        Controller::new(store, Config::default(), MemoryLocation::default(), None)
            .expect("controller")
    }

    #[test]
    fn construction_forces_a_full_redraw() {
        let store = store();
        let ctrl = controller(&store);
        let changes = ctrl.last_changes();
        assert!(changes.forced);
        assert_eq!(changes.fragments, Fragment::ALL.to_vec());
        assert_eq!(ctrl.selection().corpuscode.as_deref(), Some("C1"));
        assert_eq!(ctrl.location().route(), "plot/C1/lemma///type-word//");
    }

    #[test]
    fn noop_apply_touches_nothing() {
        let store = store();
        let mut ctrl = controller(&store);
        while ctrl.location_mut().poll().is_some() {}
        let before = ctrl.last_changes().clone();

        let changes = ctrl.apply(&SelectionOverride::new().set(Field::Corpus, "C1"), false);
        assert!(changes.is_empty());
        assert_eq!(ctrl.last_changes(), &before);
        assert_eq!(ctrl.location().pending(), 0);
    }

    #[test]
    fn stat_change_invalidates_its_fragments_only() {
        let store = store();
        let mut ctrl = controller(&store);
        let changes = ctrl.apply(
            &SelectionOverride::new().set(Field::Stat, "hapax-word"),
            false,
        );
        assert_eq!(changes.changed, vec![Field::Stat]);
        assert_eq!(
            changes.fragments,
            vec![Fragment::Curves, Fragment::Points, Fragment::Info]
        );
        assert!(!changes.invalidates(Fragment::SampleTable));
    }

    #[test]
    fn toggle_sample_twice_deselects() {
        let store = store();
        let mut ctrl = controller(&store);
        ctrl.toggle_sample("C1", "lemma", "s2");
        assert_eq!(ctrl.selection().samplecode.as_deref(), Some("s2"));
        let changes = ctrl.toggle_sample("C1", "lemma", "s2");
        assert_eq!(changes.changed, vec![Field::Sample]);
        assert_eq!(ctrl.selection().samplecode, None);
    }

    #[test]
    fn toggle_point_selects_then_clears() {
        let store = store();
        let mut ctrl = controller(&store);
        ctrl.toggle_point("b");
        assert_eq!(ctrl.selection().collectioncode.as_deref(), Some("b"));
        ctrl.toggle_point("b");
        assert_eq!(ctrl.selection().collectioncode, None);
    }
}
