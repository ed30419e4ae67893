use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    connection::{ConnectionManager, TableHandle},
    mutation::{BatchReport, Delete, Mutation, Put},
    options::WriteOptions,
    util::{Result, Slice, Status},
};

/// Single and batched writes and deletes
///
/// Every call acquires a table sub-handle and releases it before returning.
/// Writes are visible to subsequent reads of the same client.
#[derive(Clone)]
pub struct Mutator {
    manager: Arc<ConnectionManager>,
}

impl Mutator {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Mutator { manager }
    }

    /// Upserts one cell
    pub fn put(
        &self,
        table: &str,
        row: impl Into<Slice>,
        family: &str,
        qualifier: impl Into<Slice>,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        let put = Put::new(row).add_column(family, qualifier, value);
        self.mutate(&WriteOptions::default(), table, put)
    }

    /// Applies a prebuilt [`Put`] or [`Delete`]
    pub fn mutate(
        &self,
        options: &WriteOptions,
        table: &str,
        mutation: impl Into<Mutation>,
    ) -> Result<()> {
        let mutation = mutation.into();
        options.check_cancelled()?;
        let handle = self.manager.table_handle(table)?;
        Self::apply(&handle, options, &mutation)
    }

    /// Applies every put and reports each outcome in submission order.
    ///
    /// There is no atomicity across entries. Puts to the same row are applied
    /// in submission order, so the last one wins for a given column.
    pub fn put_batch(&self, table: &str, puts: impl IntoIterator<Item = Put>) -> BatchReport {
        self.put_batch_with(&WriteOptions::default(), table, puts)
    }

    /// Puts are grouped by row key. Groups are applied in parallel, each
    /// through its own sub-handle; the puts within a group run in order.
    pub fn put_batch_with(
        &self,
        options: &WriteOptions,
        table: &str,
        puts: impl IntoIterator<Item = Put>,
    ) -> BatchReport {
        let mutations: Vec<Mutation> = puts.into_iter().map(Mutation::from).collect();

        let mut group_of_row: HashMap<&Slice, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (index, mutation) in mutations.iter().enumerate() {
            let group = *group_of_row.entry(mutation.row()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(index);
        }

        let run_group = |indices: &Vec<usize>| -> Vec<(usize, Result<()>)> {
            let handle = self.manager.table_handle(table);
            indices
                .iter()
                .map(|&index| {
                    let result = match &handle {
                        Ok(handle) => Self::apply(handle, options, &mutations[index]),
                        Err(e) => Err(e.clone()),
                    };
                    (index, result)
                })
                .collect()
        };

        // A single row needs no fan-out
        let mut outcomes: Vec<(usize, Result<()>)> = if groups.len() > 1 {
            groups.par_iter().flat_map_iter(run_group).collect()
        } else {
            groups.iter().flat_map(run_group).collect()
        };
        outcomes.sort_by_key(|(index, _)| *index);

        let report = BatchReport::new(outcomes.into_iter().map(|(_, r)| r).collect());
        self.manager.statistics().record_batch();
        debug!(
            table,
            entries = report.count(),
            rows = groups.len(),
            failed = report.failed().len(),
            "applied put batch"
        );
        report
    }

    /// Removes every cell of `row`; succeeds if the row does not exist
    pub fn delete_row(&self, table: &str, row: impl Into<Slice>) -> Result<()> {
        self.mutate(&WriteOptions::default(), table, Delete::row(row))
    }

    /// Removes one cell; succeeds if the cell does not exist
    pub fn delete_qualifier(
        &self,
        table: &str,
        row: impl Into<Slice>,
        family: &str,
        qualifier: impl Into<Slice>,
    ) -> Result<()> {
        self.mutate(
            &WriteOptions::default(),
            table,
            Delete::qualifier(row, family, qualifier),
        )
    }

    /// Removes every cell of `family` in `row`
    pub fn delete_family(&self, table: &str, row: impl Into<Slice>, family: &str) -> Result<()> {
        self.mutate(&WriteOptions::default(), table, Delete::family(row, family))
    }

    fn apply(handle: &TableHandle, options: &WriteOptions, mutation: &Mutation) -> Result<()> {
        options.check_cancelled()?;
        if let Mutation::Put(put) = mutation
            && put.is_empty()
        {
            return Err(Status::invalid_argument(format!(
                "put for row '{}' has no columns",
                put.row()
            )));
        }

        handle.mutate(mutation)?;

        let statistics = handle.statistics();
        match mutation {
            Mutation::Put(put) => {
                statistics.record_put(put.columns().len() as u64, put.data_size() as u64)
            }
            Mutation::Delete(_) => statistics.record_delete(),
        }
        debug!(table = handle.table(), row = %mutation.row(), "applied mutation");
        Ok(())
    }
}
