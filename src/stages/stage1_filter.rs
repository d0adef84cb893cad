use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::models::NormalizedTable;

/// Which districts a view should include
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictSelection {
    /// Every district (the default view)
    #[default]
    All,
    /// Only the named districts; an empty set selects nothing
    Only(BTreeSet<String>),
}

impl DistrictSelection {
    /// Build a selection from CLI-style names, where no names means all
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            DistrictSelection::All
        } else {
            DistrictSelection::Only(names)
        }
    }

    pub fn contains(&self, district: &str) -> bool {
        match self {
            DistrictSelection::All => true,
            DistrictSelection::Only(names) => names.contains(district),
        }
    }
}

/// Distinct districts in first-appearance order
pub fn districts(table: &NormalizedTable) -> Vec<String> {
    let mut seen = BTreeSet::new();
    (0..table.len())
        .filter_map(|i| table.district(i))
        .filter(|d| seen.insert(d.to_string()))
        .map(str::to_string)
        .collect()
}

/// Perform Stage 1: derive a view limited to the selected districts
///
/// The source table is left untouched. Selecting nothing yields an empty
/// view rather than an error.
pub fn filter_districts(table: &NormalizedTable, selection: &DistrictSelection) -> NormalizedTable {
    let rows = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(i, _)| table.district(*i).is_some_and(|d| selection.contains(d)))
        .map(|(_, row)| row.clone())
        .collect::<Vec<_>>();

    debug!("District filter kept {} of {} rows", rows.len(), table.len());
    table.with_rows(rows)
}
