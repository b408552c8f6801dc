//! Immutable per-run datasets.
//!
//! A [`DataSet`] holds one generated sequence per column type, each
//! exactly `rows` long, and is indexed by row number during insertion.
//! It is generated once per run and never mutated afterwards.

use std::collections::HashMap;

use ebb_common::{ColumnType, SchemaDescriptor, Value, ValueOrder};

use crate::error::{DatagenError, DatagenResult};
use crate::generator::TypedValueGenerator;

/// Mapping from column type to its generated value sequence.
#[derive(Debug, Clone)]
pub struct DataSet {
    rows: usize,
    sequences: HashMap<ColumnType, Vec<Value>>,
}

impl DataSet {
    /// Generates a dataset covering `types`, `rows` values each.
    ///
    /// # Errors
    ///
    /// Propagates [`DatagenError::OutOfDomain`] from the generator.
    pub fn generate(
        generator: &TypedValueGenerator,
        types: &[ColumnType],
        rows: usize,
        order: ValueOrder,
    ) -> DatagenResult<Self> {
        let mut sequences = HashMap::with_capacity(types.len());
        for &ty in types {
            let values = generator.generate(ty, rows, order)?;
            sequences.insert(ty, values);
        }
        Ok(Self { rows, sequences })
    }

    /// Generates a dataset covering every payload column type of `schema`
    /// (the primary timestamp is excluded; its values come from the
    /// insertion timeline, not from the dataset).
    ///
    /// # Errors
    ///
    /// Propagates [`DatagenError::OutOfDomain`] from the generator.
    pub fn for_schema(
        generator: &TypedValueGenerator,
        schema: &SchemaDescriptor,
        rows: usize,
        order: ValueOrder,
    ) -> DatagenResult<Self> {
        Self::generate(generator, &schema.payload_types(), rows, order)
    }

    /// Number of rows each sequence holds.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The full sequence for `ty`, if present.
    #[must_use]
    pub fn sequence(&self, ty: ColumnType) -> Option<&[Value]> {
        self.sequences.get(&ty).map(Vec::as_slice)
    }

    /// The value for `ty` at `index`.
    ///
    /// # Errors
    ///
    /// [`DatagenError::IndexOutOfRange`] when `index >= rows`,
    /// [`DatagenError::MissingSequence`] when `ty` was not generated.
    pub fn value(&self, ty: ColumnType, index: usize) -> DatagenResult<&Value> {
        if index >= self.rows {
            return Err(DatagenError::IndexOutOfRange { index, rows: self.rows });
        }
        self.sequences
            .get(&ty)
            .and_then(|seq| seq.get(index))
            .ok_or_else(|| DatagenError::MissingSequence { ty: ty.sql_name() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_common::constants::DEFAULT_SEED;

    fn wide_dataset(rows: usize) -> DataSet {
        let generator = TypedValueGenerator::new(DEFAULT_SEED);
        DataSet::for_schema(
            &generator,
            &SchemaDescriptor::wide(),
            rows,
            ValueOrder::Ordered,
        )
        .unwrap()
    }

    #[test]
    fn test_every_sequence_has_exactly_rows_values() {
        let dataset = wide_dataset(25);
        assert_eq!(dataset.rows(), 25);
        for ty in SchemaDescriptor::wide().payload_types() {
            assert_eq!(dataset.sequence(ty).unwrap().len(), 25, "{ty}");
        }
    }

    #[test]
    fn test_value_lookup_contract() {
        let dataset = wide_dataset(10);
        assert!(dataset.value(ColumnType::Int, 9).is_ok());
        assert!(matches!(
            dataset.value(ColumnType::Int, 10),
            Err(DatagenError::IndexOutOfRange { index: 10, rows: 10 })
        ));
        assert!(matches!(
            dataset.value(ColumnType::Binary(99), 0),
            Err(DatagenError::MissingSequence { .. })
        ));
    }
}
