use crate::{
    annotation::{CLASS_COLUMN, FILE_PATH_COLUMN},
    error::Error,
};
use ndarray::{Array1, Array2, ArrayView1};
use std::{
    borrow::Cow,
    collections::HashSet,
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    fn to_field(&self) -> Cow<'_, str> {
        match self {
            Self::Number(value) if value.is_nan() => Cow::Borrowed(""),
            // Display for f64 is the shortest representation that parses back exactly
            Self::Number(value) => Cow::Owned(value.to_string()),
            Self::Text(text) => Cow::Borrowed(text),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

pub type Row = Vec<Value>;

/// Whether a column is stored as text when loaded from delimited text.
fn is_text_column(name: &str) -> bool {
    name == FILE_PATH_COLUMN || name == CLASS_COLUMN
}

/// Ordered rows under a fixed, named column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table. Column names must be unique.
    pub fn new<I, S>(columns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(duplicate) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(Error::DuplicateColumn(duplicate.clone()));
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Row>) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        rows.into_iter().try_for_each(|row| table.append(row))?;
        Ok(table)
    }

    /// Add one row at the end of the table.
    pub fn append(&mut self, row: Row) -> Result<(), Error> {
        if row.len() != self.columns.len() {
            return Err(Error::RowLength(self.columns.len(), row.len()));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| Error::MissingColumn(name.to_owned()))
    }

    /// Copy of the table restricted to the columns at `indices`, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    fn numeric_column_at(&self, index: usize) -> Result<Array1<f64>, Error> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                row[index]
                    .as_number()
                    .ok_or_else(|| Error::NonNumericCell(self.columns[index].clone(), row_index))
            })
            .collect()
    }

    pub fn numeric_column(&self, name: &str) -> Result<Array1<f64>, Error> {
        self.numeric_column_at(self.column_index(name)?)
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<&str>, Error> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                row[index]
                    .as_text()
                    .ok_or_else(|| Error::NonTextCell(name.to_owned(), row_index))
            })
            .collect()
    }

    /// Overwrite the column at `index` with `values`, one per row.
    pub(crate) fn set_numeric_column(&mut self, index: usize, values: ArrayView1<'_, f64>) {
        for (row, &value) in self.rows.iter_mut().zip(values.iter()) {
            row[index] = Value::Number(value);
        }
    }

    /// The columns at `indices` as a rows × indices matrix.
    pub(crate) fn numeric_columns(&self, indices: &[usize]) -> Result<Array2<f64>, Error> {
        let mut matrix = Array2::zeros((self.rows.len(), indices.len()));
        for (&index, mut column) in indices.iter().zip(matrix.columns_mut()) {
            column.assign(&self.numeric_column_at(index)?);
        }
        Ok(matrix)
    }

    /// The whole table as a rows × columns matrix. Every cell must be numeric.
    pub fn to_matrix(&self) -> Result<Array2<f64>, Error> {
        let indices: Vec<usize> = (0..self.columns.len()).collect();
        self.numeric_columns(&indices)
    }

    /// Read a table from delimited text whose first line is the header.
    ///
    /// `file_path` and `class` are read as text, every other column as a
    /// number; empty numeric fields become NaN. A leading unnamed header
    /// cell marks a row-index column and is dropped.
    pub fn load<R>(reader: R) -> Result<Self, Error>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let skip = usize::from(headers.get(0).map_or(false, str::is_empty));
        let mut table = Self::new(headers.iter().skip(skip))?;
        let text_columns: Vec<bool> = table.columns.iter().map(|name| is_text_column(name)).collect();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            let row = record
                .iter()
                .skip(skip)
                .zip(table.columns.iter().zip(&text_columns))
                .map(|(field, (name, &is_text))| {
                    if is_text {
                        Ok(Value::Text(field.to_owned()))
                    } else {
                        parse_number(field)
                            .map(Value::Number)
                            .map_err(|e| Error::ParseNumber(name.clone(), line, field.to_owned(), e))
                    }
                })
                .collect::<Result<Row, Error>>()?;
            table.append(row)?;
        }

        Ok(table)
    }

    /// Write the table as delimited text, header first.
    pub fn save<W>(&self, writer: W) -> Result<(), Error>
    where
        W: io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|value| value.to_field().into_owned()))?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn read_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Io(e, path.to_path_buf()))?;
        Self::load(file)
    }

    pub fn write_path<P>(&self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Io(e, path.to_path_buf()))?;
        self.save(BufWriter::new(file))
    }
}

fn parse_number(field: &str) -> Result<f64, std::num::ParseFloatError> {
    let field = field.trim();
    if field.is_empty() {
        Ok(f64::NAN)
    } else {
        field.parse()
    }
}
