//! Timeline insertion.
//!
//! [`TimelineInserter`] writes each table's rows with timestamps walking
//! backwards from a reference time: row `i` of a child table lands at
//! `reference - i * step`, row `i` of a normal table at
//! `reference - i * (step * 12 / 10)`. The stretch is intentional: it
//! produces overlapping but distinct timelines across table classes in
//! the same run, so TTL cutoff boundaries are exercised independently
//! per class.

use tracing::{debug, trace};

use ebb_common::constants::{NORMAL_STRETCH_DEN, NORMAL_STRETCH_NUM};
use ebb_common::{ExecutionError, SchemaDescriptor, SqlExecutor, TableClass};
use ebb_datagen::{DataSet, RowAssembler};

use crate::error::{HarnessError, HarnessResult};
use crate::statement;

/// The timestamp assigned to row `index` of a table of `class`.
///
/// Strictly decreasing in `index` for any positive `step_ms`.
#[must_use]
pub fn timestamp_for(class: TableClass, reference_ms: i64, index: usize, step_ms: i64) -> i64 {
    let step = match class {
        TableClass::Normal => step_ms * NORMAL_STRETCH_NUM / NORMAL_STRETCH_DEN,
        TableClass::Child | TableClass::Super => step_ms,
    };
    reference_ms - index as i64 * step
}

/// Submits assembled rows to a set of target tables.
pub struct TimelineInserter<'a> {
    executor: &'a dyn SqlExecutor,
    database: &'a str,
}

impl<'a> TimelineInserter<'a> {
    /// Binds an inserter to an executor and database name.
    #[must_use]
    pub fn new(executor: &'a dyn SqlExecutor, database: &'a str) -> Self {
        Self { executor, database }
    }

    /// Inserts every dataset row into every target table.
    ///
    /// Rows go out in increasing index order per table; no ordering is
    /// guaranteed across tables. The first failed row aborts that
    /// table's remaining rows and the whole call; rows already committed
    /// to other tables stay.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Insert`] naming the table and row index on the
    /// first failure, including a super table appearing as a target.
    pub fn insert(
        &self,
        targets: &[(String, TableClass)],
        schema: &SchemaDescriptor,
        dataset: &DataSet,
        reference_ms: i64,
        step_ms: i64,
    ) -> HarnessResult<u64> {
        schema.validate_for_insert()?;
        if let Some((table, _)) = targets.iter().find(|(_, c)| *c == TableClass::Super) {
            return Err(HarnessError::Insert {
                table: table.clone(),
                row_index: 0,
                source: ExecutionError::new("", "super tables are not insert targets"),
            });
        }

        let assembler = RowAssembler::new(schema, dataset);
        let rows = dataset.rows();
        let mut inserted = 0u64;
        for (table, class) in targets {
            debug!(table, %class, rows, "inserting timeline");
            for i in 0..rows {
                let row = assembler.assemble(i)?;
                let ts = timestamp_for(*class, reference_ms, i, step_ms);
                let sql = statement::insert_row(self.database, table, ts, &row);
                trace!(table, row_index = i, ts, "inserting row");
                self.executor.execute(&sql).map_err(|source| HarnessError::Insert {
                    table: table.clone(),
                    row_index: i,
                    source,
                })?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
