use crate::{annotation::PostureClass, error::Error};
use ndarray::Array2;
use num_traits::ToPrimitive;
use std::fmt;

/// Counts of (true class, predicted class) pairs. Rows are the true class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Array2<usize>,
    misclassified: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(labels: &[PostureClass], predictions: &[PostureClass]) -> Result<Self, Error> {
        if labels.len() != predictions.len() {
            return Err(Error::PredictionCount(labels.len(), predictions.len()));
        }

        let n = PostureClass::ALL.len();
        let mut counts = Array2::zeros((n, n));
        let mut misclassified = Vec::new();
        for (index, (&label, &prediction)) in labels.iter().zip(predictions).enumerate() {
            counts[(usize::from(label.code()), usize::from(prediction.code()))] += 1;
            if label != prediction {
                misclassified.push(index);
            }
        }

        Ok(Self {
            counts,
            misclassified,
        })
    }

    pub fn count(&self, label: PostureClass, prediction: PostureClass) -> usize {
        self.counts[(usize::from(label.code()), usize::from(prediction.code()))]
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Fraction of rows predicted correctly, `None` for an empty matrix.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.counts.diag().sum().to_f64()? / total.to_f64()?)
    }

    /// Row indices where the prediction differs from the label.
    pub fn misclassified(&self) -> &[usize] {
        &self.misclassified
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", "")?;
        for prediction in PostureClass::ALL {
            write!(f, " {:>12}", prediction.as_str())?;
        }
        for label in PostureClass::ALL {
            write!(f, "\n{:>12}", label.as_str())?;
            for prediction in PostureClass::ALL {
                write!(f, " {:>12}", self.count(label, prediction))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ConfusionMatrix;
    use crate::{
        annotation::PostureClass::{self, Correct, NotCorrect},
        error::Error,
    };
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn counts_and_accuracy() {
        let labels = [Correct, Correct, NotCorrect, NotCorrect, Correct];
        let predictions = [Correct, NotCorrect, NotCorrect, Correct, Correct];
        let matrix = ConfusionMatrix::new(&labels, &predictions).unwrap();

        assert_eq!(matrix.count(Correct, Correct), 2);
        assert_eq!(matrix.count(Correct, NotCorrect), 1);
        assert_eq!(matrix.count(NotCorrect, Correct), 1);
        assert_eq!(matrix.count(NotCorrect, NotCorrect), 1);
        assert_eq!(matrix.total(), 5);
        assert_approx_eq!(matrix.accuracy().unwrap(), 0.6);
        assert_eq!(matrix.misclassified(), &[1, 3]);

        let text = matrix.to_string();
        assert!(text.contains("not_correct"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_matrix_has_no_accuracy() {
        let empty: [PostureClass; 0] = [];
        assert_eq!(ConfusionMatrix::new(&empty, &empty).unwrap().accuracy(), None);
    }

    #[test]
    fn lengths_must_match() {
        assert!(matches!(
            ConfusionMatrix::new(&[Correct], &[]),
            Err(Error::PredictionCount(1, 0))
        ));
    }
}
