//! Schema descriptors.
//!
//! A [`SchemaDescriptor`] is the explicit, validated description of one
//! table shape: an ordered list of data columns (the first of which is
//! always the primary timestamp) plus an ordered list of tag columns that
//! only super/child tables use. Components receive descriptors as values;
//! no table shape is implied by module-level state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::PRIMARY_COL;
use crate::error::{SchemaError, SchemaResult};
use crate::types::ColumnType;

/// One declared column: name plus type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name, unique within its table.
    pub name: String,
    /// Column type, including any text bound.
    pub ty: ColumnType,
}

impl ColumnDef {
    /// Creates a column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self { name: name.into(), ty }
    }

    /// Renders the column as it appears in DDL: `name TYPE`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {}", self.name, self.ty.sql_name())
    }
}

/// Ordered data columns plus ordered tag columns for one table shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Data columns; index 0 is the primary timestamp.
    pub data_columns: Vec<ColumnDef>,
    /// Tag columns; empty for normal tables.
    pub tag_columns: Vec<ColumnDef>,
}

impl SchemaDescriptor {
    /// Builds a descriptor and validates it.
    ///
    /// # Errors
    ///
    /// Fails if the descriptor is empty, the first data column is not the
    /// primary timestamp, any name repeats, or a text bound is illegal.
    pub fn new(
        data_columns: Vec<ColumnDef>,
        tag_columns: Vec<ColumnDef>,
    ) -> SchemaResult<Self> {
        let descriptor = Self { data_columns, tag_columns };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// The canonical wide schema exercising every supported column type:
    /// signed and unsigned integers of all widths, both floats, bool,
    /// bounded binary and nchar text, and a secondary timestamp, tagged
    /// by a single `t_int`.
    #[must_use]
    pub fn wide() -> Self {
        Self {
            data_columns: vec![
                ColumnDef::new(PRIMARY_COL, ColumnType::Timestamp),
                ColumnDef::new("c_int", ColumnType::Int),
                ColumnDef::new("c_bint", ColumnType::BigInt),
                ColumnDef::new("c_sint", ColumnType::SmallInt),
                ColumnDef::new("c_tint", ColumnType::TinyInt),
                ColumnDef::new("c_float", ColumnType::Float),
                ColumnDef::new("c_double", ColumnType::Double),
                ColumnDef::new("c_bool", ColumnType::Bool),
                ColumnDef::new("c_binary", ColumnType::Binary(16)),
                ColumnDef::new("c_nchar", ColumnType::NChar(32)),
                ColumnDef::new("c_ts", ColumnType::Timestamp),
                ColumnDef::new("c_utint", ColumnType::UTinyInt),
                ColumnDef::new("c_usint", ColumnType::USmallInt),
                ColumnDef::new("c_uint", ColumnType::UInt),
                ColumnDef::new("c_ubint", ColumnType::UBigInt),
            ],
            tag_columns: vec![ColumnDef::new("t_int", ColumnType::Int)],
        }
    }

    /// Validates the descriptor's structural invariants.
    ///
    /// # Errors
    ///
    /// See [`SchemaError`] for the cases.
    pub fn validate(&self) -> SchemaResult<()> {
        let Some(first) = self.data_columns.first() else {
            return Err(SchemaError::Empty);
        };
        if first.name != PRIMARY_COL || first.ty != ColumnType::Timestamp {
            return Err(SchemaError::BadPrimary {
                expected: PRIMARY_COL.to_string(),
                found: first.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for col in self.data_columns.iter().chain(&self.tag_columns) {
            if !seen.insert(col.name.as_str()) {
                return Err(SchemaError::DuplicateColumn { name: col.name.clone() });
            }
            if !col.ty.bound_is_legal() {
                return Err(SchemaError::IllegalBound {
                    name: col.name.clone(),
                    ty: col.ty.sql_name(),
                });
            }
        }
        Ok(())
    }

    /// Validates that the descriptor can back a super table (tags present).
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingTags`] when no tag columns are declared.
    pub fn validate_for_super(&self) -> SchemaResult<()> {
        self.validate()?;
        if self.tag_columns.is_empty() {
            return Err(SchemaError::MissingTags);
        }
        Ok(())
    }

    /// Validates that the descriptor has payload columns to insert into.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OnlyPrimary`] when only the primary is declared.
    pub fn validate_for_insert(&self) -> SchemaResult<()> {
        self.validate()?;
        if self.data_columns.len() < 2 {
            return Err(SchemaError::OnlyPrimary);
        }
        Ok(())
    }

    /// Data columns after the primary timestamp, in declaration order.
    pub fn payload_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.data_columns.iter().skip(1)
    }

    /// Distinct types among the payload columns, in first-seen order.
    #[must_use]
    pub fn payload_types(&self) -> Vec<ColumnType> {
        let mut seen = Vec::new();
        for col in self.payload_columns() {
            if !seen.contains(&col.ty) {
                seen.push(col.ty);
            }
        }
        seen
    }
}
