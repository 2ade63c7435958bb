//! Column type classification and the capability gate.
//!
//! A column's declared type is resolved once into a [`TypeCategory`]. Metrics
//! and validators never inspect the raw type again; they ask
//! [`supports`] whether the category allows the [`Capability`] they need.

use arrow::datatypes::{DataType, Field};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// String-like types whose values have a character length.
    Concatenable,
    /// List-like types whose values have an element count.
    Collection,
    /// Integer, floating point and decimal types.
    Numeric,
    /// Dates, times, timestamps, durations and intervals.
    Temporal,
    /// Boolean values.
    Boolean,
    /// Raw bytes.
    Binary,
    /// Anything the registry does not recognize.
    Other,
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Concatenable => "concatenable",
            TypeCategory::Collection => "collection",
            TypeCategory::Numeric => "numeric",
            TypeCategory::Temporal => "temporal",
            TypeCategory::Boolean => "boolean",
            TypeCategory::Binary => "binary",
            TypeCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// A family of operations a metric or validator may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Length-like operations: characters of a string, elements of a list.
    Length,
    /// Arithmetic aggregation such as mean.
    Arithmetic,
    /// Counting rows or nulls; every type supports it.
    Counting,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Length => "length",
            Capability::Arithmetic => "arithmetic",
            Capability::Counting => "counting",
        };
        f.write_str(name)
    }
}

/// Returns whether columns of `category` support `capability`.
///
/// Pure and total. This is the single gate every type-sensitive check
/// consults, so both backends agree on what is supported.
pub fn supports(category: TypeCategory, capability: Capability) -> bool {
    match capability {
        Capability::Counting => true,
        Capability::Length => matches!(
            category,
            TypeCategory::Concatenable | TypeCategory::Collection
        ),
        Capability::Arithmetic => category == TypeCategory::Numeric,
    }
}

/// Classifies declared column types into [`TypeCategory`] values.
pub struct TypeRegistry;

impl TypeRegistry {
    /// Classifies an Arrow data type.
    pub fn classify(data_type: &DataType) -> TypeCategory {
        match data_type {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                TypeCategory::Concatenable
            }
            DataType::Dictionary(_, value) => Self::classify(value),
            DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => {
                TypeCategory::Collection
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => TypeCategory::Numeric,
            DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
            | DataType::Time32(_)
            | DataType::Time64(_)
            | DataType::Duration(_)
            | DataType::Interval(_) => TypeCategory::Temporal,
            DataType::Boolean => TypeCategory::Boolean,
            DataType::Binary
            | DataType::LargeBinary
            | DataType::BinaryView
            | DataType::FixedSizeBinary(_) => TypeCategory::Binary,
            _ => TypeCategory::Other,
        }
    }

    /// Classifies a SQL type name as reported by a catalog, e.g.
    /// `VARCHAR(255)`, `array<string>` or `BIGINT`.
    pub fn classify_name(type_name: &str) -> TypeCategory {
        let normalized = type_name.trim().to_ascii_uppercase();
        if normalized.ends_with("[]") {
            return TypeCategory::Collection;
        }
        let base = normalized
            .split(|c: char| c == '(' || c == '<' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "VARCHAR" | "CHAR" | "CHARACTER" | "NVARCHAR" | "NCHAR" | "TEXT" | "STRING"
            | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "CLOB" | "NTEXT" | "UTF8" => {
                TypeCategory::Concatenable
            }
            "ARRAY" | "LIST" => TypeCategory::Collection,
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "FLOAT" | "DOUBLE"
            | "REAL" | "DECIMAL" | "NUMERIC" | "NUMBER" => TypeCategory::Numeric,
            "DATE" | "TIME" | "TIMESTAMP" | "DATETIME" | "INTERVAL" => TypeCategory::Temporal,
            "BOOLEAN" | "BOOL" => TypeCategory::Boolean,
            "BINARY" | "VARBINARY" | "BLOB" | "BYTEA" | "BYTES" => TypeCategory::Binary,
            _ => TypeCategory::Other,
        }
    }
}

/// A column with its declared type, classified once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data_type: DataType,
    category: TypeCategory,
}

impl Column {
    /// Creates a column and resolves its category through the registry.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let category = TypeRegistry::classify(&data_type);
        Self {
            name: name.into(),
            data_type,
            category,
        }
    }

    /// Creates a column from an Arrow schema field.
    pub fn from_field(field: &Field) -> Self {
        Self::new(field.name(), field.data_type().clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    /// Returns whether this column's type supports `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        supports(self.category, capability)
    }
}
