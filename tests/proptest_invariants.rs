//! Property-based invariants of the access layer
//!
//! ## Consistency
//! - Round trip: every cell written is readable with its last value
//! - Deletes are idempotent and hide exactly what they name
//!
//! ## Scan ordering
//! - Row keys come back strictly increasing
//! - `[start, stop)` is honored: no row below start, none at or above stop
//! - The batch size never changes which rows come back
//!
//! ## Schema
//! - Dropping a family removes its cells from every row
//!
//! Keys and qualifiers are arbitrary bytes; a `BTreeMap` keyed by
//! `(row, family, qualifier)` is the reference model.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::Fixture;
use proptest::prelude::*;
use widecolumn::{Put, Scan, Slice};

const FAMILIES: [&str; 2] = ["a", "b"];

type Model = BTreeMap<(Vec<u8>, String, Vec<u8>), Vec<u8>>;

// ============================================================================
// Helper Functions
// ============================================================================

fn arbitrary_row() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=12)
}

fn arbitrary_cell() -> impl Strategy<Value = (Vec<u8>, String, Vec<u8>, Vec<u8>)> {
    (
        arbitrary_row(),
        prop::sample::select(FAMILIES.to_vec()).prop_map(str::to_string),
        prop::collection::vec(any::<u8>(), 0..=6),
        prop::collection::vec(any::<u8>(), 0..=32),
    )
}

fn arbitrary_cells() -> impl Strategy<Value = Vec<(Vec<u8>, String, Vec<u8>, Vec<u8>)>> {
    prop::collection::vec(arbitrary_cell(), 1..=60)
}

fn fixture() -> Fixture {
    let fx = Fixture::new();
    fx.admin.create_table("t", FAMILIES).unwrap();
    fx
}

fn write_all(fx: &Fixture, cells: &[(Vec<u8>, String, Vec<u8>, Vec<u8>)]) -> Model {
    let mut model = Model::new();
    for (row, family, qualifier, value) in cells {
        fx.mutator
            .put("t", row.as_slice(), family, qualifier.as_slice(), value)
            .unwrap();
        model.insert((row.clone(), family.clone(), qualifier.clone()), value.clone());
    }
    model
}

fn model_rows(model: &Model) -> BTreeSet<Vec<u8>> {
    model.keys().map(|(row, _, _)| row.clone()).collect()
}

fn scan_rows(fx: &Fixture, scan: Scan) -> Vec<Vec<u8>> {
    fx.reader
        .scan("t", Some(scan))
        .unwrap()
        .map(|row| row.unwrap().key().data().to_vec())
        .collect()
}

// ============================================================================
// Property 1: Round Trip
// ============================================================================

proptest! {
    #[test]
    fn prop_put_then_get_returns_last_value(cells in arbitrary_cells()) {
        let fx = fixture();
        let model = write_all(&fx, &cells);

        for ((row, family, qualifier), value) in &model {
            let got = fx.reader.get("t", row.as_slice(), None).unwrap();
            let stored = got.value(family, qualifier);
            prop_assert!(stored.is_some(), "missing cell {:?}/{}/{:?}", row, family, qualifier);
            prop_assert_eq!(stored.unwrap().as_ref(), value.as_slice());
        }
        prop_assert_eq!(fx.active_handles(), 0);
    }
}

// ============================================================================
// Property 2: Ordering and Range Exclusivity
// ============================================================================

proptest! {
    #[test]
    fn prop_scan_is_ordered_and_bounded(
        cells in arbitrary_cells(),
        start in arbitrary_row(),
        stop in arbitrary_row(),
    ) {
        let fx = fixture();
        let model = write_all(&fx, &cells);

        let all = scan_rows(&fx, Scan::new());
        prop_assert!(all.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(all, model_rows(&model).into_iter().collect::<Vec<_>>());

        let ranged = scan_rows(&fx, Scan::range(start.as_slice(), stop.as_slice()));
        for row in &ranged {
            prop_assert!(row.as_slice() >= start.as_slice());
            prop_assert!(row.as_slice() < stop.as_slice());
        }
        let expected: Vec<Vec<u8>> = model_rows(&model)
            .into_iter()
            .filter(|row| row.as_slice() >= start.as_slice() && row.as_slice() < stop.as_slice())
            .collect();
        prop_assert_eq!(ranged, expected);
    }
}

// ============================================================================
// Property 3: Batch Size Invariance
// ============================================================================

proptest! {
    #[test]
    fn prop_batch_size_does_not_change_results(
        cells in arbitrary_cells(),
        batch_size in 1usize..=20,
    ) {
        let fx = fixture();
        write_all(&fx, &cells);

        let reference = scan_rows(&fx, Scan::new());
        let batched = scan_rows(&fx, Scan::new().with_batch_size(batch_size));
        prop_assert_eq!(batched, reference);
        prop_assert_eq!(fx.cluster.open_scanner_count(), 0);
    }
}

// ============================================================================
// Property 4: Batched Puts Match Sequential Puts
// ============================================================================

proptest! {
    #[test]
    fn prop_put_batch_last_write_wins(cells in arbitrary_cells()) {
        let fx = fixture();
        let puts: Vec<Put> = cells
            .iter()
            .map(|(row, family, qualifier, value)| {
                Put::new(row.as_slice()).add_column(family, qualifier.as_slice(), value)
            })
            .collect();

        let report = fx.mutator.put_batch("t", puts);
        prop_assert_eq!(report.count(), cells.len());
        prop_assert!(report.all_succeeded());

        let mut model = Model::new();
        for (row, family, qualifier, value) in &cells {
            model.insert((row.clone(), family.clone(), qualifier.clone()), value.clone());
        }
        for ((row, family, qualifier), value) in &model {
            let got = fx.reader.get("t", row.as_slice(), None).unwrap();
            prop_assert_eq!(got.value(family, qualifier).unwrap().as_ref(), value.as_slice());
        }
    }
}

// ============================================================================
// Property 5: Family Drop and Idempotent Deletes
// ============================================================================

proptest! {
    #[test]
    fn prop_drop_family_removes_all_its_cells(cells in arbitrary_cells()) {
        let fx = fixture();
        let model = write_all(&fx, &cells);

        fx.admin.drop_column_family("t", "a").unwrap();

        let remaining = fx
            .reader
            .scan("t", None)
            .unwrap()
            .map(|row| row.unwrap())
            .collect::<Vec<_>>();
        prop_assert!(remaining.iter().all(|row| !row.has_family("a")));

        let expected: usize = model.keys().filter(|(_, family, _)| family == "b").count();
        let cells_left: usize = remaining.iter().map(|row| row.len()).sum();
        prop_assert_eq!(cells_left, expected);
    }

    #[test]
    fn prop_delete_row_twice(cells in arbitrary_cells(), victim in any::<prop::sample::Index>()) {
        let fx = fixture();
        let model = write_all(&fx, &cells);
        let rows: Vec<Vec<u8>> = model_rows(&model).into_iter().collect();
        let row = Slice::from(rows[victim.index(rows.len())].as_slice());

        fx.mutator.delete_row("t", row.clone()).unwrap();
        fx.mutator.delete_row("t", row.clone()).unwrap();

        prop_assert!(fx.reader.get("t", row.clone(), None).unwrap_err().is_not_found());
        let left = scan_rows(&fx, Scan::new());
        prop_assert_eq!(left.len(), rows.len() - 1);
        prop_assert!(!left.contains(&row.into_vec()));
    }
}
