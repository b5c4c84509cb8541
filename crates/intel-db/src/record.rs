//! Backend-independent view of a stored-procedure row.
//!
//! Rows are converted into a [`Record`] of named [`Cell`]s as soon as they
//! leave the driver. Mapping into DTOs then goes through explicit
//! [`ColumnSpec`] tables, so every expected column, its kind and its default
//! are enumerable and testable without a connection.

use thiserror::Error;
use tiberius::{ColumnData, Row};

/// A single column value, reduced to the shapes the mappers care about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// A driver type the mappers never read (binary, GUID, temporal, XML).
    Unsupported(&'static str),
}

impl Cell {
    fn describe(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Int(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Text(_) => "text",
            Cell::Bool(_) => "bool",
            Cell::Unsupported(kind) => kind,
        }
    }
}

impl From<ColumnData<'static>> for Cell {
    fn from(data: ColumnData<'static>) -> Self {
        match data {
            ColumnData::U8(v) => v.map_or(Cell::Null, |v| Cell::Int(i64::from(v))),
            ColumnData::I16(v) => v.map_or(Cell::Null, |v| Cell::Int(i64::from(v))),
            ColumnData::I32(v) => v.map_or(Cell::Null, |v| Cell::Int(i64::from(v))),
            ColumnData::I64(v) => v.map_or(Cell::Null, Cell::Int),
            ColumnData::F32(v) => v.map_or(Cell::Null, |v| Cell::Float(f64::from(v))),
            ColumnData::F64(v) => v.map_or(Cell::Null, Cell::Float),
            ColumnData::Bit(v) => v.map_or(Cell::Null, Cell::Bool),
            ColumnData::String(v) => v.map_or(Cell::Null, |s| Cell::Text(s.into_owned())),
            ColumnData::Numeric(v) => v.map_or(Cell::Null, |n| {
                if n.scale() == 0 {
                    if let Ok(int) = i64::try_from(n.value()) {
                        return Cell::Int(int);
                    }
                }
                #[allow(clippy::cast_precision_loss)]
                let float = n.value() as f64 / 10f64.powi(i32::from(n.scale()));
                Cell::Float(float)
            }),
            ColumnData::Guid(_) => Cell::Unsupported("guid"),
            ColumnData::Binary(_) => Cell::Unsupported("binary"),
            _ => Cell::Unsupported("temporal or xml"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Defaults to `""` when absent or NULL.
    Text,
    /// Defaults to `0` when absent or NULL.
    Integer,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Text => f.write_str("text"),
            ColumnKind::Integer => f.write_str("integer"),
        }
    }
}

/// An expected result-set column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    #[must_use]
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("column {column} expected {expected}, found {found}")]
    WrongKind {
        column: &'static str,
        expected: ColumnKind,
        found: &'static str,
    },
}

/// One row as ordered `(column name, cell)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: Vec<(String, Cell)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, cell: Cell) -> Self {
        self.cells.push((name.into(), cell));
        self
    }

    #[must_use]
    pub fn from_row(row: Row) -> Self {
        let names: Vec<String> = row
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();
        let cells = names.into_iter().zip(row.into_iter().map(Cell::from)).collect();
        Self { cells }
    }

    /// Column lookup; exact name first, then case-insensitive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.cells.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, cell)| cell)
    }

    fn wrong_kind(spec: ColumnSpec, cell: &Cell) -> RowError {
        RowError::WrongKind {
            column: spec.name,
            expected: spec.kind,
            found: cell.describe(),
        }
    }

    /// Reads a text column, defaulting to `""`.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::WrongKind`] if the column holds a non-text value.
    pub fn text(&self, spec: ColumnSpec) -> Result<String, RowError> {
        match self.get(spec.name) {
            None | Some(Cell::Null) => Ok(String::new()),
            Some(Cell::Text(s)) => Ok(s.clone()),
            Some(other) => Err(Self::wrong_kind(spec, other)),
        }
    }

    /// Reads an integer column, defaulting to `0`.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::WrongKind`] if the column holds a non-integer value.
    pub fn integer(&self, spec: ColumnSpec) -> Result<i64, RowError> {
        match self.get(spec.name) {
            None | Some(Cell::Null) => Ok(0),
            Some(Cell::Int(v)) => Ok(*v),
            Some(other) => Err(Self::wrong_kind(spec, other)),
        }
    }
}

/// Maps every record with `map`, skipping and logging rows that fail.
pub fn map_records<T, F>(procedure: &str, records: Vec<Record>, map: F) -> Vec<T>
where
    F: Fn(&Record) -> Result<T, RowError>,
{
    records
        .iter()
        .enumerate()
        .filter_map(|(row, record)| match map(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(procedure, row, error = %e, "skipping unreadable row");
                None
            }
        })
        .collect()
}
