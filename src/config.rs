use crate::{
    error::Error,
    pose::{JOINT_COLUMNS, KEYPOINT_COLUMNS},
    preprocess::{
        KeepColumns, NormalizationFrame, NormalizeToBoundingBox, Pipeline, PointsToVectors,
        ReferencePoints,
    },
};

/// Settings for the posture feature pipeline.
#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct PipelineConfig {
    /// Name of the reference point joint vectors start from.
    #[structopt(short, long, default_value = "center")]
    pub reference_point: String,

    /// Coordinates spanning the normalization extent: joints-and-box or joints.
    #[structopt(short, long, default_value = "joints-and-box")]
    pub frame: NormalizationFrame,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_point: "center".to_owned(),
            frame: NormalizationFrame::default(),
        }
    }
}

impl PipelineConfig {
    /// Build the feature pipeline using the default reference points.
    pub fn build(&self) -> Result<Pipeline, Error> {
        self.build_with(&ReferencePoints::default())
    }

    /// Keep the keypoint columns, normalize them, keep the joints, then
    /// express each joint relative to the reference point.
    pub fn build_with(&self, reference_points: &ReferencePoints) -> Result<Pipeline, Error> {
        Ok(Pipeline::new(vec![
            KeepColumns::new(KEYPOINT_COLUMNS.iter().copied()).into(),
            NormalizeToBoundingBox::new(self.frame).into(),
            KeepColumns::new(JOINT_COLUMNS.iter().copied()).into(),
            PointsToVectors::with_registry(&self.reference_point, reference_points)?.into(),
        ]))
    }
}
