// src/storage/tabular.rs
//! Flat-row view of record collections, shared by the CSV and workbook writers.

/// Text stand-in for floats JSON and spreadsheets cannot hold as numbers.
pub fn non_finite_token(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

/// One cell of a flat row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Integer(u64),
    Number(f64),
    Flag(bool),
    Text(String),
}

impl Cell {
    /// Text used in delimited files. Missing values become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Integer(n) => n.to_string(),
            Cell::Number(x) => match non_finite_token(*x) {
                Some(token) => token.to_string(),
                // Debug keeps the fractional part (`1.0`, not `1`)
                None => format!("{:?}", x),
            },
            Cell::Flag(b) => b.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<Option<u64>> for Cell {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Cell::Empty, Cell::Integer)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Empty, Cell::Text)
    }
}

/// A record that can be laid out as one row under a fixed header.
pub trait TabularRecord {
    /// Column names, in field declaration order.
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

/// A named collection ready to be written as a file or a sheet.
#[derive(Debug, Clone)]
pub struct Table {
    /// Collection name, used as the CSV file suffix.
    pub name: &'static str,
    /// Human-readable sheet title.
    pub sheet_name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_records<R: TabularRecord>(
        name: &'static str,
        sheet_name: &'static str,
        records: &[R],
    ) -> Self {
        Self {
            name,
            sheet_name,
            columns: R::COLUMNS,
            rows: records.iter().map(R::cells).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_render_like_the_structured_file() {
        assert_eq!(Cell::Empty.to_field(), "");
        assert_eq!(Cell::Integer(30).to_field(), "30");
        assert_eq!(Cell::Number(1.0).to_field(), "1.0");
        assert_eq!(Cell::Number(0.5).to_field(), "0.5");
        assert_eq!(Cell::Number(f64::INFINITY).to_field(), "Infinity");
        assert_eq!(Cell::Number(f64::NAN).to_field(), "NaN");
        assert_eq!(Cell::Flag(true).to_field(), "true");
        assert_eq!(Cell::from(None::<f64>), Cell::Empty);
    }
}
