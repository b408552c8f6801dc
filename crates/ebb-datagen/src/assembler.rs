//! Row assembly.
//!
//! A [`RowAssembler`] binds a schema descriptor to a dataset and produces
//! one insert-ready [`Row`] per row index: one value per payload column,
//! in declaration order. The primary timestamp is deliberately absent;
//! the insertion timeline supplies it.

use ebb_common::{SchemaDescriptor, Value};

use crate::dataset::DataSet;
use crate::error::DatagenResult;

/// One assembled row: values for every payload column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// The row's values in schema order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Renders the row as a comma-separated literal list, in the exact
    /// form the SQL layer expects for a VALUES clause tail.
    #[must_use]
    pub fn render(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Assembles rows from a dataset against one schema.
#[derive(Debug, Clone, Copy)]
pub struct RowAssembler<'a> {
    schema: &'a SchemaDescriptor,
    dataset: &'a DataSet,
}

impl<'a> RowAssembler<'a> {
    /// Binds a schema and dataset.
    #[must_use]
    pub fn new(schema: &'a SchemaDescriptor, dataset: &'a DataSet) -> Self {
        Self { schema, dataset }
    }

    /// Assembles the row at `row_index`.
    ///
    /// # Errors
    ///
    /// [`crate::DatagenError::IndexOutOfRange`] when `row_index` exceeds
    /// the dataset's rows, [`crate::DatagenError::MissingSequence`] when a
    /// payload column's type was not generated.
    pub fn assemble(&self, row_index: usize) -> DatagenResult<Row> {
        let mut values = Vec::with_capacity(self.schema.data_columns.len().saturating_sub(1));
        for col in self.schema.payload_columns() {
            values.push(self.dataset.value(col.ty, row_index)?.clone());
        }
        Ok(Row { values })
    }
}
