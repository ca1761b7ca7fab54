use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected joint array of shape ({0}, 2), got {1:?}")]
    Shape(usize, Vec<usize>),

    #[error("expected keypoint row of {0} values, got {1}")]
    KeypointRowLength(usize, usize),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to construct NotNan from f64: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f64),

    #[error("duplicate entry: {0:?}")]
    DuplicateEntry(PathBuf),

    #[error("row {0} is out of range for a table of {1} rows")]
    RowIndex(usize, usize),

    #[error("row has {1} cells but the table has {0} columns")]
    RowLength(usize, usize),

    #[error("column {0} holds a non-numeric value in row {1}")]
    NonNumericCell(String, usize),

    #[error("column {0} holds a non-text value in row {1}")]
    NonTextCell(String, usize),

    #[error("failed to parse {2:?} as a number in column {0} on line {1}")]
    ParseNumber(String, u64, String, #[source] std::num::ParseFloatError),

    #[error("unknown posture class: {0:?}")]
    UnknownClass(String),

    #[error("unknown posture class code: {0}")]
    UnknownClassCode(i64),

    #[error("failed to convert image size value {0} to u32")]
    ConvertSize(f64),

    #[error("failed to read or write delimited text")]
    Csv(#[from] csv::Error),

    #[error("io error on {1:?}")]
    Io(#[source] std::io::Error, PathBuf),

    #[error("failed to read image dimensions of {1:?}")]
    ImageDimensions(#[source] image::ImageError, PathBuf),

    #[error("keypoint detector failed on {1:?}")]
    Detector(
        #[source] Box<dyn std::error::Error + Send + Sync + 'static>,
        PathBuf,
    ),

    #[error("posture classifier failed")]
    Classifier(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("features must be the joint vector columns, got {0:?}")]
    FeatureColumns(Vec<String>),

    #[error("classifier returned {1} predictions for {0} rows")]
    PredictionCount(usize, usize),

    #[error("invalid directory structure: {0:?} is not a directory")]
    InvalidDirectoryStructure(PathBuf),
}
