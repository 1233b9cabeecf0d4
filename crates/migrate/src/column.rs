//! Column definitions and type mapping
//!
//! Logical column types and their pure mapping into PostgreSQL type and
//! default-literal fragments. Mapping is total over the combinations listed
//! here and rejects everything else before any SQL is sent.

use std::fmt;

use crate::error::{MigrationError, MigrationResult};

/// Logical column types understood by the DDL builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Variable-length text (`character varying`)
    Text,
    /// Date and time without time zone (`timestamp`)
    Timestamp,
    /// 32-bit integer (`integer`)
    Int32,
    /// 64-bit integer (`bigint`)
    Int64,
    /// Boolean (`boolean`)
    Boolean,
    /// Floating point (`double precision`)
    Float,
}

impl ColumnType {
    fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Text => "character varying",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Int32 => "integer",
            ColumnType::Int64 => "bigint",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "double precision",
        }
    }

    /// Mark the column as nullable, suppressing the `NOT NULL` fragment
    pub fn nullable(self) -> ColumnSpec {
        ColumnSpec::from(self).nullable()
    }

    /// Constrain a text column to a maximum length
    pub fn length(self, length: u32) -> ColumnSpec {
        ColumnSpec::from(self).length(length)
    }

    /// Render a float column as exact numeric with precision and scale
    pub fn precision(self, precision: u32, scale: u32) -> ColumnSpec {
        ColumnSpec::from(self).precision(precision, scale)
    }

    /// Attach a default value, emitted as a `DEFAULT` clause
    pub fn default_value(self, value: impl Into<DefaultValue>) -> ColumnSpec {
        ColumnSpec::from(self).default_value(value)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Type-specific refinement of a logical type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeModifier {
    /// Maximum length; valid for [`ColumnType::Text`] only
    Length(u32),
    /// Exact precision and scale; valid for [`ColumnType::Float`] only
    Precision { precision: u32, scale: u32 },
}

impl fmt::Display for TypeModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeModifier::Length(n) => write!(f, "length({})", n),
            TypeModifier::Precision { precision, scale } => {
                write!(f, "precision({}, {})", precision, scale)
            }
        }
    }
}

/// A column default, rendered as a type-checked SQL literal
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Text literal; single quotes are doubled on render
    Text(String),
    /// Integer literal
    Int(i64),
    /// Floating-point literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
    /// `CURRENT_TIMESTAMP`; valid for timestamp columns only
    CurrentTimestamp,
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Text(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Int(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Int(value as i64)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            DefaultValue::Int(i) => write!(f, "{}", i),
            DefaultValue::Float(x) => write!(f, "{}", x),
            DefaultValue::Bool(true) => f.write_str("TRUE"),
            DefaultValue::Bool(false) => f.write_str("FALSE"),
            DefaultValue::CurrentTimestamp => f.write_str("CURRENT_TIMESTAMP"),
        }
    }
}

/// Full column declaration: logical type plus nullability, refinement and default
///
/// A bare [`ColumnType`] converts into a required column with no modifier and
/// no default, so builder callers can pass either form.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub kind: ColumnType,
    pub nullable: bool,
    pub modifier: Option<TypeModifier>,
    pub default: Option<DefaultValue>,
}

impl From<ColumnType> for ColumnSpec {
    fn from(kind: ColumnType) -> Self {
        Self {
            kind,
            nullable: false,
            modifier: None,
            default: None,
        }
    }
}

impl ColumnSpec {
    /// Suppress the `NOT NULL` fragment
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Constrain a text column to a maximum length
    pub fn length(mut self, length: u32) -> Self {
        self.modifier = Some(TypeModifier::Length(length));
        self
    }

    /// Render a float column as exact numeric with precision and scale
    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.modifier = Some(TypeModifier::Precision { precision, scale });
        self
    }

    /// Attach a default value, emitted as a `DEFAULT` clause
    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Map the logical type and modifier to a SQL type fragment
    pub(crate) fn render_type(&self, column: &str) -> MigrationResult<String> {
        match (self.kind, self.modifier) {
            (_, None) => Ok(self.kind.sql_name().to_string()),
            (ColumnType::Text, Some(TypeModifier::Length(n))) => {
                Ok(format!("character varying({})", n))
            }
            (ColumnType::Float, Some(TypeModifier::Precision { precision, scale })) => {
                Ok(format!("numeric({}, {})", precision, scale))
            }
            (kind, Some(modifier)) => Err(MigrationError::UnsupportedModifier {
                column: column.to_string(),
                column_type: kind.to_string(),
                modifier: modifier.to_string(),
            }),
        }
    }

    /// Map the default value to a SQL literal, if one was declared
    ///
    /// Presence decides emission: zero, empty string and `false` all render.
    pub(crate) fn render_default(&self, column: &str) -> MigrationResult<Option<String>> {
        let Some(default) = &self.default else {
            return Ok(None);
        };

        let valid = matches!(
            (self.kind, default),
            (ColumnType::Text, DefaultValue::Text(_))
                | (ColumnType::Int32, DefaultValue::Int(_))
                | (ColumnType::Int64, DefaultValue::Int(_))
                | (ColumnType::Float, DefaultValue::Float(_))
                | (ColumnType::Float, DefaultValue::Int(_))
                | (ColumnType::Boolean, DefaultValue::Bool(_))
                | (ColumnType::Timestamp, DefaultValue::CurrentTimestamp)
        );

        // NaN and infinities have no SQL literal form.
        let valid = valid
            && match default {
                DefaultValue::Float(x) => x.is_finite(),
                _ => true,
            };

        if !valid {
            return Err(MigrationError::UnsupportedDefault {
                column: column.to_string(),
                column_type: self.kind.to_string(),
                value: default.to_string(),
            });
        }

        Ok(Some(default.to_string()))
    }
}
