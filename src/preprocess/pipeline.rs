use crate::{
    error::Error,
    preprocess::{PreProcessingStep, Step},
    table::Table,
};
use tracing::debug;

/// Steps applied in order, each one consuming the previous step's output.
///
/// Steps are neither reordered nor checked for compatibility; a step that
/// needs a column an earlier step dropped fails with that step's error.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn run(&self, table: &Table) -> Result<Table, Error> {
        self.steps
            .iter()
            .try_fold(table.clone(), |table, step| {
                let output = step.run(&table)?;
                debug!(
                    message = "ran preprocessing step",
                    step = step.name(),
                    rows = output.len(),
                    columns = output.columns().len()
                );
                Ok(output)
            })
    }
}
