//! Field dependency table
//!
//! Each field lists the fields whose validity depends on it and the display
//! fragments that go stale when it changes. Repair walks the fields in
//! [`REPAIR_ORDER`]; [`FieldTable::validate`] checks that this order is a
//! topological order of the dependency edges.

use corpusdash_api::{Field, Fragment};
use eyre::{Result, bail};
use std::collections::{BTreeMap, BTreeSet};

/// The order in which repair validates fields.
pub const REPAIR_ORDER: [Field; 8] = [
    Field::Page,
    Field::Corpus,
    Field::Dataset,
    Field::Group,
    Field::Collection,
    Field::Sample,
    Field::Token,
    Field::Stat,
];

/// Dependency row of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    /// Fields repaired against this one
    pub dependents: Vec<Field>,
    /// Fragments to redraw when this field changes
    pub fragments: Vec<Fragment>,
}

impl FieldRule {
    pub fn new(field: Field, dependents: &[Field], fragments: &[Fragment]) -> Self {
        Self {
            field,
            dependents: dependents.to_vec(),
            fragments: fragments.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldTable {
    rules: BTreeMap<Field, FieldRule>,
    repair_order: Vec<Field>,
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldTable {
    pub fn new(rules: Vec<FieldRule>, repair_order: &[Field]) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.field, r)).collect(),
            repair_order: repair_order.to_vec(),
        }
    }

    /// The table the selection engine runs with.
    pub fn standard() -> Self {
        use Fragment::*;

        let data_views = [Curves, Points, SampleTable, TokenTable, ContextTable, Info];
        let mut corpus_fragments = vec![DatasetMenu, GroupMenu, CollectionMenu];
        corpus_fragments.extend(data_views);

        Self::new(
            vec![
                FieldRule::new(Field::Page, &[], &[Page]),
                FieldRule {
                    field: Field::Corpus,
                    dependents: vec![
                        Field::Dataset,
                        Field::Group,
                        Field::Collection,
                        Field::Sample,
                        Field::Token,
                    ],
                    fragments: corpus_fragments,
                },
                FieldRule::new(Field::Dataset, &[Field::Token], &data_views),
                FieldRule::new(
                    Field::Group,
                    &[Field::Collection, Field::Sample, Field::Token],
                    &[CollectionMenu, Points],
                ),
                FieldRule::new(
                    Field::Collection,
                    &[Field::Sample, Field::Token],
                    &[Points, SampleTable, TokenTable, ContextTable, Info],
                ),
                FieldRule::new(Field::Stat, &[], &[Curves, Points, Info]),
                FieldRule::new(
                    Field::Sample,
                    &[Field::Token],
                    &[SampleTable, ContextTable, Info],
                ),
                FieldRule::new(Field::Token, &[], &[TokenTable, ContextTable, Info]),
            ],
            &REPAIR_ORDER,
        )
    }

    pub fn rule(&self, field: Field) -> Option<&FieldRule> {
        self.rules.get(&field)
    }

    pub fn repair_order(&self) -> &[Field] {
        &self.repair_order
    }

    /// Union of the fragments of `changed`, in fragment declaration order.
    pub fn fragments(&self, changed: &[Field]) -> Vec<Fragment> {
        let stale: BTreeSet<Fragment> = changed
            .iter()
            .filter_map(|f| self.rules.get(f))
            .flat_map(|r| r.fragments.iter().copied())
            .collect();
        stale.into_iter().collect()
    }

    /// Check that every field has a row, that the repair order lists each
    /// field once, and that every dependent is repaired after its parent.
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            if !self.rules.contains_key(&field) {
                bail!("Field table has no row for {field}");
            }
            let listed = self.repair_order.iter().filter(|f| **f == field).count();
            if listed != 1 {
                bail!("Repair order lists {field} {listed} times, expected once");
            }
        }

        self.topological_order()?;

        let position: BTreeMap<Field, usize> = self
            .repair_order
            .iter()
            .enumerate()
            .map(|(i, f)| (*f, i))
            .collect();
        for rule in self.rules.values() {
            for dependent in &rule.dependents {
                if position[dependent] <= position[&rule.field] {
                    bail!(
                        "Dependency {} -> {} is repaired out of order: {} comes before {}",
                        rule.field,
                        dependent,
                        dependent,
                        rule.field
                    );
                }
            }
        }
        Ok(())
    }

    /// Kahn's algorithm over the dependency edges.
    fn topological_order(&self) -> Result<Vec<Field>> {
        let mut indegree: BTreeMap<Field, usize> = self.rules.keys().map(|f| (*f, 0)).collect();
        for rule in self.rules.values() {
            for dependent in &rule.dependents {
                match indegree.get_mut(dependent) {
                    Some(n) => *n += 1,
                    None => bail!(
                        "Dependency {} -> {} names a field without a row",
                        rule.field,
                        dependent
                    ),
                }
            }
        }

        let mut ready: Vec<Field> = indegree
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(f, _)| *f)
            .collect();
        let mut sorted = Vec::with_capacity(indegree.len());
        while let Some(field) = ready.pop() {
            sorted.push(field);
            for dependent in &self.rules[&field].dependents {
                if let Some(n) = indegree.get_mut(dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.push(*dependent);
                    }
                }
            }
        }

        if sorted.len() < indegree.len() {
            let stuck = self
                .rules
                .values()
                .flat_map(|r| r.dependents.iter().map(move |d| (r.field, *d)))
                .find(|(parent, dependent)| {
                    !sorted.contains(parent) && !sorted.contains(dependent)
                });
            match stuck {
                Some((parent, dependent)) => {
                    bail!("Field dependencies contain a cycle through {parent} -> {dependent}")
                }
                None => bail!("Field dependencies contain a cycle"),
            }
        }
        Ok(sorted)
    }
}
