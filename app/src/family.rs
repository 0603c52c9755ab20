// ==============================================================================
// family.rs - Family Filter
// ==============================================================================
// Description: Selects the focal individual's parents, mates and children
// Author: Matt Barham
// Created: 2026-10-13
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Selection:
//   - focal individual
//   - father and mother (when present and not "0")
//   - mates (co-parents of any recorded child)
//   - children of the focal individual or any mate, optionally restricted
//     to an exact hatch year
// ==============================================================================

use indexmap::IndexSet;
use tracing::debug;

use crate::models::{RecordStore, UNKNOWN_PARENT};

/// Ids sharing at least one recorded child with `individual_id`.
///
/// Returned in discovery order. Empty when the individual is unknown.
pub fn find_mates<'a>(store: &'a RecordStore, individual_id: &str) -> IndexSet<&'a str> {
    let mut mates = IndexSet::new();
    if !store.contains(individual_id) {
        return mates;
    }

    for (_, record) in store.iter() {
        let father = record.father_id.as_str();
        let mother = record.mother_id.as_str();

        if father == individual_id && mother != UNKNOWN_PARENT && store.contains(mother) {
            mates.insert(mother);
        }
        if mother == individual_id && father != UNKNOWN_PARENT && store.contains(father) {
            mates.insert(father);
        }
    }

    mates
}

/// Restrict `store` to the family around `individual_id`.
///
/// An empty or unknown id returns a copy of the whole store. When
/// `hatch_year` is given, only children whose hatch year equals it exactly
/// are kept; the focal individual, parents and mates are always kept.
pub fn filter_family(store: &RecordStore, individual_id: &str, hatch_year: Option<&str>) -> RecordStore {
    let focal = match store.get(individual_id) {
        Some(record) if !individual_id.is_empty() => record,
        _ => {
            debug!("Focus {:?} not in store; returning all {} individuals", individual_id, store.len());
            return store.clone();
        }
    };

    let mut selected: IndexSet<&str> = IndexSet::new();
    selected.insert(individual_id);

    for parent_id in [focal.father_id.as_str(), focal.mother_id.as_str()] {
        if store.is_linkable(parent_id) {
            selected.insert(parent_id);
        }
    }

    let mates = find_mates(store, individual_id);
    selected.extend(mates.iter().copied());

    let is_family_parent = |id: &str| id == individual_id || mates.contains(id);
    for (child_id, child) in store.iter() {
        if !(is_family_parent(child.father_id.as_str()) || is_family_parent(child.mother_id.as_str())) {
            continue;
        }
        if hatch_year.map_or(true, |year| child.hatch_year == year) {
            selected.insert(child_id);
        }
    }

    debug!(
        "Family of {}: {} individuals ({} mates, year filter {:?})",
        individual_id,
        selected.len(),
        mates.len(),
        hatch_year
    );

    selected
        .into_iter()
        .filter_map(|id| store.get(id).map(|record| (id.to_string(), record.clone())))
        .collect()
}
