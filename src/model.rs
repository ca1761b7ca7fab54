use crate::{
    annotation::{LabeledAnnotation, PostureClass, UnlabeledAnnotation, CLASS_COLUMN},
    error::Error,
    pose::JOINT_COLUMNS,
    preprocess::Pipeline,
    table::Table,
};
use ndarray::{Array1, Array2, ArrayView2};
use tracing::debug;

/// A binary posture classifier over pipeline features.
pub trait PostureClassifier {
    type Error: std::error::Error + Send + Sync + 'static;

    /// One label code per feature row: 0 for not_correct, 1 for correct.
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<i64>, Self::Error>;
}

/// Label codes of the `class` column, one per row.
pub fn labels(table: &Table) -> Result<Array1<u8>, Error> {
    table
        .text_column(CLASS_COLUMN)?
        .into_iter()
        .map(|class| class.parse::<PostureClass>().map(PostureClass::code))
        .collect()
}

/// Run `pipeline` and return its output as a feature matrix. The output must
/// hold exactly the joint vector columns, in joint order.
pub fn features(pipeline: &Pipeline, annotations: &Table) -> Result<Array2<f64>, Error> {
    let output = pipeline.run(annotations)?;
    if output.columns() != JOINT_COLUMNS {
        return Err(Error::FeatureColumns(output.columns().to_vec()));
    }
    output.to_matrix()
}

/// Features and labels ready for a classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub features: Array2<f64>,
    pub labels: Array1<u8>,
}

impl TrainingSet {
    /// Run `pipeline` over a labelled annotation table. Labels are read from
    /// the input table since the pipeline drops the class column.
    pub fn prepare(pipeline: &Pipeline, annotations: &Table) -> Result<Self, Error> {
        let labels = labels(annotations)?;
        let features = features(pipeline, annotations)?;
        Ok(Self { features, labels })
    }
}

/// A feature pipeline paired with the classifier trained on its output.
#[derive(Debug)]
pub struct PostureModel<C> {
    pipeline: Pipeline,
    classifier: C,
}

impl<C> PostureModel<C>
where
    C: PostureClassifier,
{
    pub fn new(pipeline: Pipeline, classifier: C) -> Self {
        Self {
            pipeline,
            classifier,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn predict(&self, annotations: &Table) -> Result<Vec<PostureClass>, Error> {
        let features = features(&self.pipeline, annotations)?;
        let codes = self
            .classifier
            .predict(features.view())
            .map_err(|e| Error::Classifier(Box::new(e)))?;
        if codes.len() != features.nrows() {
            return Err(Error::PredictionCount(features.nrows(), codes.len()));
        }
        debug!(message = "classified rows", rows = codes.len());
        codes.into_iter().map(PostureClass::from_code).collect()
    }

    /// Classify a single annotation and attach the predicted class.
    pub fn classify(&self, annotation: UnlabeledAnnotation) -> Result<LabeledAnnotation, Error> {
        let table = Table::from_annotations(std::iter::once(&annotation))?;
        let class = self
            .predict(&table)?
            .into_iter()
            .next()
            .ok_or(Error::PredictionCount(1, 0))?;
        Ok(annotation.label(class))
    }
}
