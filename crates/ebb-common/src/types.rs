//! Core vocabulary: column types, runtime values, table classes.
//!
//! `ColumnType` enumerates every column type EbbDB supports together with
//! its legal value domain, and `Value` carries one runtime value plus the
//! single point of truth for rendering it as a SQL literal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BINARY_BYTES, MAX_NCHAR_CHARS};

/// A column type supported by EbbDB.
///
/// The text variants carry their declared bound: `Binary(n)` is limited to
/// `n` bytes of single-byte payload, `NChar(n)` to `n` characters of
/// multibyte payload.
///
/// Legal value domains exclude the engine's reserved null sentinels (the
/// minimum signed value and the maximum unsigned value), so e.g. a legal
/// `TinyInt` lies in `[-127, 127]` and a legal `UTinyInt` in `[0, 254]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Millisecond epoch timestamp.
    Timestamp,
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 8-bit unsigned integer.
    UTinyInt,
    /// 16-bit unsigned integer.
    USmallInt,
    /// 32-bit unsigned integer.
    UInt,
    /// 64-bit unsigned integer.
    UBigInt,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Fixed-bound binary text, at most `n` bytes.
    Binary(u32),
    /// Variable-length multibyte text, at most `n` characters.
    NChar(u32),
}

impl ColumnType {
    /// Returns the DDL spelling of this type.
    #[must_use]
    pub fn sql_name(&self) -> String {
        match self {
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Bool => "BOOL".to_string(),
            ColumnType::TinyInt => "TINYINT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Int => "INT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::UTinyInt => "TINYINT UNSIGNED".to_string(),
            ColumnType::USmallInt => "SMALLINT UNSIGNED".to_string(),
            ColumnType::UInt => "INT UNSIGNED".to_string(),
            ColumnType::UBigInt => "BIGINT UNSIGNED".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Binary(n) => format!("BINARY({n})"),
            ColumnType::NChar(n) => format!("NCHAR({n})"),
        }
    }

    /// Returns true for the text variants.
    #[inline]
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, ColumnType::Binary(_) | ColumnType::NChar(_))
    }

    /// Returns the declared text bound, if this is a text type.
    #[inline]
    #[must_use]
    pub const fn text_bound(&self) -> Option<u32> {
        match self {
            ColumnType::Binary(n) | ColumnType::NChar(n) => Some(*n),
            _ => None,
        }
    }

    /// Checks that a text bound lies within the engine's limits.
    ///
    /// Non-text types are always valid.
    #[must_use]
    pub const fn bound_is_legal(&self) -> bool {
        match self {
            ColumnType::Binary(n) => *n >= 1 && *n <= MAX_BINARY_BYTES,
            ColumnType::NChar(n) => *n >= 1 && *n <= MAX_NCHAR_CHARS,
            _ => true,
        }
    }

    /// Returns the inclusive integer domain `[min, max]` for the integer
    /// and timestamp types, with the reserved null sentinel excluded.
    #[must_use]
    pub const fn integer_domain(&self) -> Option<(i128, i128)> {
        match self {
            ColumnType::TinyInt => Some((i8::MIN as i128 + 1, i8::MAX as i128)),
            ColumnType::SmallInt => Some((i16::MIN as i128 + 1, i16::MAX as i128)),
            ColumnType::Int => Some((i32::MIN as i128 + 1, i32::MAX as i128)),
            ColumnType::BigInt => Some((i64::MIN as i128 + 1, i64::MAX as i128)),
            ColumnType::UTinyInt => Some((0, u8::MAX as i128 - 1)),
            ColumnType::USmallInt => Some((0, u16::MAX as i128 - 1)),
            ColumnType::UInt => Some((0, u32::MAX as i128 - 1)),
            ColumnType::UBigInt => Some((0, u64::MAX as i128 - 1)),
            ColumnType::Timestamp => Some((0, i64::MAX as i128)),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// A runtime value for one column of one row.
///
/// The `Display` impl renders the exact literal form the SQL layer
/// expects: bare numerics, bare `true`/`false`, and single-quoted text
/// with embedded quotes doubled. All statement construction goes through
/// this impl so the rendering rules live in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 8-bit signed integer.
    TinyInt(i8),
    /// 16-bit signed integer.
    SmallInt(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    BigInt(i64),
    /// 8-bit unsigned integer.
    UTinyInt(u8),
    /// 16-bit unsigned integer.
    USmallInt(u16),
    /// 32-bit unsigned integer.
    UInt(u32),
    /// 64-bit unsigned integer.
    UBigInt(u64),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// Millisecond epoch timestamp.
    Timestamp(i64),
    /// Single-byte text payload.
    Binary(String),
    /// Multibyte text payload.
    NChar(String),
}

impl Value {
    /// Returns true if this value is an instance of `ty`.
    ///
    /// Text bounds are checked too: a 20-byte string is not an instance
    /// of `Binary(16)`.
    #[must_use]
    pub fn matches(&self, ty: &ColumnType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ColumnType::Bool)
            | (Value::TinyInt(_), ColumnType::TinyInt)
            | (Value::SmallInt(_), ColumnType::SmallInt)
            | (Value::Int(_), ColumnType::Int)
            | (Value::BigInt(_), ColumnType::BigInt)
            | (Value::UTinyInt(_), ColumnType::UTinyInt)
            | (Value::USmallInt(_), ColumnType::USmallInt)
            | (Value::UInt(_), ColumnType::UInt)
            | (Value::UBigInt(_), ColumnType::UBigInt)
            | (Value::Float(_), ColumnType::Float)
            | (Value::Double(_), ColumnType::Double)
            | (Value::Timestamp(_), ColumnType::Timestamp) => true,
            (Value::Binary(s), ColumnType::Binary(n)) => s.len() <= *n as usize,
            (Value::NChar(s), ColumnType::NChar(n)) => s.chars().count() <= *n as usize,
            _ => false,
        }
    }

    /// Converts a numeric or timestamp value to `i64`, if representable.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) | Value::Timestamp(v) => Some(*v),
            Value::UTinyInt(v) => Some(i64::from(*v)),
            Value::USmallInt(v) => Some(i64::from(*v)),
            Value::UInt(v) => Some(i64::from(*v)),
            Value::UBigInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the text payload, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Binary(s) | Value::NChar(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) | Value::Timestamp(v) => write!(f, "{v}"),
            Value::UTinyInt(v) => write!(f, "{v}"),
            Value::USmallInt(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::UBigInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Binary(s) | Value::NChar(s) => {
                write!(f, "'{}'", s.replace('\'', "''"))
            }
        }
    }
}

/// The class a table belongs to.
///
/// The class determines both the DDL shape at creation time and the
/// timeline stretch applied when rows are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableClass {
    /// Standalone table with its own schema, no tags, no parent.
    Normal,
    /// Schema template; children inherit columns and carry tag values.
    Super,
    /// Bound to exactly one super table via concrete tag values.
    Child,
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableClass::Normal => write!(f, "normal"),
            TableClass::Super => write!(f, "super"),
            TableClass::Child => write!(f, "child"),
        }
    }
}

/// Ordering requested from the value generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueOrder {
    /// Monotonically non-decreasing, covering both domain extremes.
    Ordered,
    /// Uniform draws over the legal domain.
    Random,
}
