use crate::{error::Error, table::Table};

pub trait PreProcessingStep {
    /// Transform `table` into a new table. The input is never modified.
    fn run(&self, table: &Table) -> Result<Table, Error>;
}

mod columns;
mod normalize;
mod pipeline;
mod vectors;

pub use columns::{KeepColumns, RemoveColumns};
pub use normalize::{NormalizationFrame, NormalizeToBoundingBox};
pub use pipeline::Pipeline;
pub use vectors::{PointsToVectors, ReferencePoint, ReferencePoints};

#[derive(Debug, Clone)]
pub enum Step {
    /// Drop every column not in the list
    KeepColumns(KeepColumns),
    /// Drop the listed columns, all of which must exist
    RemoveColumns(RemoveColumns),
    /// Rescale joint coordinates to the per-row pose extent
    NormalizeToBoundingBox(NormalizeToBoundingBox),
    /// Turn joint positions into vectors from a reference point
    PointsToVectors(PointsToVectors),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeepColumns(_) => "keep_columns",
            Self::RemoveColumns(_) => "remove_columns",
            Self::NormalizeToBoundingBox(_) => "normalize_to_bounding_box",
            Self::PointsToVectors(_) => "points_to_vectors",
        }
    }
}

impl PreProcessingStep for Step {
    fn run(&self, table: &Table) -> Result<Table, Error> {
        match self {
            Self::KeepColumns(s) => s.run(table),
            Self::RemoveColumns(s) => s.run(table),
            Self::NormalizeToBoundingBox(s) => s.run(table),
            Self::PointsToVectors(s) => s.run(table),
        }
    }
}

impl From<KeepColumns> for Step {
    fn from(step: KeepColumns) -> Self {
        Self::KeepColumns(step)
    }
}

impl From<RemoveColumns> for Step {
    fn from(step: RemoveColumns) -> Self {
        Self::RemoveColumns(step)
    }
}

impl From<NormalizeToBoundingBox> for Step {
    fn from(step: NormalizeToBoundingBox) -> Self {
        Self::NormalizeToBoundingBox(step)
    }
}

impl From<PointsToVectors> for Step {
    fn from(step: PointsToVectors) -> Self {
        Self::PointsToVectors(step)
    }
}

/// Use `computed` unless it is NaN or infinite, in which case keep `original`.
pub(crate) fn merge(original: f64, computed: f64) -> f64 {
    if computed.is_finite() {
        computed
    } else {
        original
    }
}


#[cfg(test)]
mod tests {
    use super::merge;

    #[test]
    fn merge_keeps_original_for_undefined_values() {
        assert_eq!(merge(3.0, 0.25), 0.25);
        assert_eq!(merge(3.0, f64::NAN), 3.0);
        assert_eq!(merge(3.0, f64::INFINITY), 3.0);
        assert_eq!(merge(3.0, f64::NEG_INFINITY), 3.0);
        assert!(merge(f64::NAN, f64::NAN).is_nan());
    }
}
