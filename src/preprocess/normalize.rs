use crate::{
    error::Error,
    pose::Coordinate,
    preprocess::{merge, PreProcessingStep},
    table::Table,
};
use ndarray::{Array1, ArrayView2, Axis, Zip};
use std::{fmt, str::FromStr};

/// Which coordinates of a row span the normalization extent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NormalizationFrame {
    /// Joints together with both bounding-box corners.
    JointsAndBox,
    /// Joints only.
    Joints,
}

impl Default for NormalizationFrame {
    fn default() -> Self {
        Self::JointsAndBox
    }
}

impl FromStr for NormalizationFrame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joints-and-box" => Ok(Self::JointsAndBox),
            "joints" => Ok(Self::Joints),
            _ => Err(Error::InvalidArgument(format!(
                "unknown normalization frame {:?}, expected joints-and-box or joints",
                s
            ))),
        }
    }
}

impl fmt::Display for NormalizationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JointsAndBox => "joints-and-box",
            Self::Joints => "joints",
        })
    }
}

/// Rescales joint coordinates by the pose's own extent on each axis.
///
/// For every row and axis, `(value - bounding_box_lu) / (max - min)` where
/// `max` and `min` are taken over that row's frame coordinates. Points can
/// sit slightly outside the detector's box, so the extent comes from the
/// points rather than from the box alone. Cells whose result is not finite
/// keep their original value. Only joint columns are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeToBoundingBox {
    frame: NormalizationFrame,
}

impl NormalizeToBoundingBox {
    pub fn new(frame: NormalizationFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> NormalizationFrame {
        self.frame
    }
}

/// `max - min` of each row, reduced across the row's entries.
fn row_extent(frame: ArrayView2<'_, f64>) -> Array1<f64> {
    let max = frame.fold_axis(Axis(1), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
    let min = frame.fold_axis(Axis(1), f64::INFINITY, |&acc, &v| acc.min(v));
    max - min
}

impl PreProcessingStep for NormalizeToBoundingBox {
    fn run(&self, table: &Table) -> Result<Table, Error> {
        let mut output = table.clone();

        for coordinate in Coordinate::BOTH {
            let joint_indices = coordinate
                .joint_columns()
                .map(|name| table.column_index(name))
                .collect::<Result<Vec<_>, _>>()?;
            let origin = table.numeric_column(coordinate.top_left_column())?;

            let mut frame_indices = joint_indices.clone();
            if self.frame == NormalizationFrame::JointsAndBox {
                frame_indices.push(table.column_index(coordinate.top_left_column())?);
                frame_indices.push(table.column_index(coordinate.bottom_right_column())?);
            }

            let values = table.numeric_columns(&joint_indices)?;
            let extent = row_extent(table.numeric_columns(&frame_indices)?.view());

            let mut normalized =
                (&values - &origin.insert_axis(Axis(1))) / &extent.insert_axis(Axis(1));
            Zip::from(&mut normalized)
                .and(&values)
                .for_each(|computed, &original| *computed = merge(original, *computed));

            for (&index, column) in joint_indices.iter().zip(normalized.columns()) {
                output.set_numeric_column(index, column);
            }
        }

        Ok(output)
    }
}
