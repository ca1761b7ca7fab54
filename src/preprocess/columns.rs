use crate::{error::Error, preprocess::PreProcessingStep, table::Table};
use std::collections::HashSet;

/// Keeps the listed columns that exist in the input, in input order.
///
/// Names missing from the input are ignored, so a broad candidate list can
/// be applied to narrower tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepColumns {
    names: HashSet<String>,
}

impl KeepColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PreProcessingStep for KeepColumns {
    fn run(&self, table: &Table) -> Result<Table, Error> {
        let indices: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| self.names.contains(name.as_str()))
            .map(|(index, _)| index)
            .collect();
        Ok(table.select(&indices))
    }
}

/// Drops the listed columns. Every listed column must exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveColumns {
    names: Vec<String>,
}

impl RemoveColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PreProcessingStep for RemoveColumns {
    fn run(&self, table: &Table) -> Result<Table, Error> {
        let removed = self
            .names
            .iter()
            .map(|name| table.column_index(name))
            .collect::<Result<HashSet<_>, _>>()?;
        let indices: Vec<usize> = (0..table.columns().len())
            .filter(|index| !removed.contains(index))
            .collect();
        Ok(table.select(&indices))
    }
}
