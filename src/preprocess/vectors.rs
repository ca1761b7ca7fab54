use crate::{
    error::Error,
    pose::Coordinate,
    preprocess::{merge, PreProcessingStep},
    table::Table,
};
use ordered_float::NotNan;
use std::collections::BTreeMap;

pub const CENTER: &str = "center";

/// A named origin in the normalized `[0, 1]` frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ReferencePoint {
    x: NotNan<f64>,
    y: NotNan<f64>,
}

impl ReferencePoint {
    pub fn new(x: f64, y: f64) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x).map_err(|e| Error::ConstructNotNan(e, x))?,
            y: NotNan::new(y).map_err(|e| Error::ConstructNotNan(e, y))?,
        })
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.x.into_inner()
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.y.into_inner()
    }

    fn get(self, coordinate: Coordinate) -> f64 {
        match coordinate {
            Coordinate::X => self.x(),
            Coordinate::Y => self.y(),
        }
    }
}

/// Registry of reference points by name. The default registry knows `center`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePoints(BTreeMap<String, ReferencePoint>);

impl Default for ReferencePoints {
    fn default() -> Self {
        Self(
            ReferencePoint::new(0.5, 0.5)
                .map(|center| (CENTER.to_owned(), center))
                .into_iter()
                .collect(),
        )
    }
}

impl ReferencePoints {
    /// Add or replace a reference point, returning the previous one.
    pub fn register<S>(&mut self, name: S, point: ReferencePoint) -> Option<ReferencePoint>
    where
        S: Into<String>,
    {
        self.0.insert(name.into(), point)
    }

    pub fn get(&self, name: &str) -> Result<ReferencePoint, Error> {
        self.0.get(name).copied().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown reference point {:?}, expected one of {:?}",
                name,
                self.names().collect::<Vec<_>>()
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Replaces every joint coordinate with its offset from a reference point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsToVectors {
    reference_name: String,
    reference: ReferencePoint,
}

impl PointsToVectors {
    /// Look `name` up in the default registry.
    pub fn new(name: &str) -> Result<Self, Error> {
        Self::with_registry(name, &ReferencePoints::default())
    }

    pub fn with_registry(name: &str, registry: &ReferencePoints) -> Result<Self, Error> {
        Ok(Self {
            reference_name: name.to_owned(),
            reference: registry.get(name)?,
        })
    }

    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    pub fn reference(&self) -> ReferencePoint {
        self.reference
    }
}

impl PreProcessingStep for PointsToVectors {
    fn run(&self, table: &Table) -> Result<Table, Error> {
        let mut output = table.clone();

        for coordinate in Coordinate::BOTH {
            let origin = self.reference.get(coordinate);
            for name in coordinate.joint_columns() {
                let index = table.column_index(name)?;
                let shifted = table
                    .numeric_column(name)?
                    .mapv_into(|value| merge(value, value - origin));
                output.set_numeric_column(index, shifted.view());
            }
        }

        Ok(output)
    }
}
