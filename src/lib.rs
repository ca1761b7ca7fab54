pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod pose;
pub mod preprocess;
pub mod table;

pub use annotation::{
    ImageAnnotation, ImageSize, LabeledAnnotation, PostureClass, Unlabeled, UnlabeledAnnotation,
};
pub use config::PipelineConfig;
pub use dataset::{build_dataset, KeypointDetector};
pub use error::Error;
pub use evaluate::ConfusionMatrix;
pub use model::{PostureClassifier, PostureModel, TrainingSet};
pub use pose::{Joint, Keypoints};
pub use preprocess::{Pipeline, PreProcessingStep, Step};
pub use table::{Row, Table, Value};
