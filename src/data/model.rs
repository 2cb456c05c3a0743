use std::collections::BTreeMap;

use thiserror::Error;

use crate::selection::event::DatasetId;

// ---------------------------------------------------------------------------
// Table – numeric columns of one dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{column}' has {got} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
    #[error("neighbor structure has {got} rows, table has {expected}")]
    NeighborLength { expected: usize, got: usize },
}

/// Named `f64` columns sharing one row count, plus the neighbor lists that
/// the external weights library produced for the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: DatasetId,
    num_rows: usize,
    columns: BTreeMap<String, Vec<f64>>,
    neighbors: Vec<Vec<usize>>,
}

impl Table {
    pub fn new(id: DatasetId, num_rows: usize) -> Self {
        Self {
            id,
            num_rows,
            columns: BTreeMap::new(),
            neighbors: vec![Vec::new(); num_rows],
        }
    }

    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self, TableError> {
        if values.len() != self.num_rows {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                expected: self.num_rows,
                got: values.len(),
            });
        }
        self.columns.insert(name.to_string(), values);
        Ok(self)
    }

    pub fn with_neighbors(mut self, neighbors: Vec<Vec<usize>>) -> Result<Self, TableError> {
        if neighbors.len() != self.num_rows {
            return Err(TableError::NeighborLength {
                expected: self.num_rows,
                got: neighbors.len(),
            });
        }
        self.neighbors = neighbors;
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn neighbors(&self) -> &[Vec<usize>] {
        &self.neighbors
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}
