use crate::{
    error::Error,
    pose::{Keypoints, KEYPOINT_COLUMNS, NUM_KEYPOINT_COLUMNS},
    table::{Row, Table, Value},
};
use num_traits::{FromPrimitive, ToPrimitive};
use std::{fmt, str::FromStr};

pub const FILE_PATH_COLUMN: &str = "file_path";
pub const CLASS_COLUMN: &str = "class";

pub const METADATA_COLUMNS: [&str; 4] = [
    FILE_PATH_COLUMN,
    "original_size_h",
    "original_size_w",
    CLASS_COLUMN,
];

pub const NUM_ANNOTATION_COLUMNS: usize = METADATA_COLUMNS.len() + NUM_KEYPOINT_COLUMNS;

/// Full annotation table schema: metadata followed by keypoint columns.
pub fn annotation_columns() -> impl Iterator<Item = &'static str> {
    METADATA_COLUMNS.iter().chain(KEYPOINT_COLUMNS.iter()).copied()
}

/// Posture classes. The discriminant is the label code the classifier uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub enum PostureClass {
    NotCorrect = 0,
    Correct = 1,
}

impl PostureClass {
    pub const ALL: [Self; 2] = [Self::NotCorrect, Self::Correct];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotCorrect => "not_correct",
            Self::Correct => "correct",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: i64) -> Result<Self, Error> {
        Self::from_i64(code).ok_or(Error::UnknownClassCode(code))
    }
}

impl FromStr for PostureClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| Error::UnknownClass(s.to_owned()))
    }
}

impl fmt::Display for PostureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker for an annotation whose class is not known yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Unlabeled;

/// What an annotation stores in the `class` column.
pub trait Label: Sized {
    fn as_column(&self) -> &str;

    fn from_column(value: &str) -> Result<Self, Error>;
}

impl Label for PostureClass {
    fn as_column(&self) -> &str {
        self.as_str()
    }

    fn from_column(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

impl Label for Unlabeled {
    fn as_column(&self) -> &str {
        ""
    }

    fn from_column(value: &str) -> Result<Self, Error> {
        if value.is_empty() {
            Ok(Self)
        } else {
            Err(Error::InvalidArgument(format!(
                "expected an unlabeled row, got class {:?}",
                value
            )))
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

/// One image with its detected pose and, once known, its posture class.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnnotation<L = PostureClass> {
    file_path: String,
    original_size: ImageSize,
    label: L,
    keypoints: Keypoints,
}

pub type LabeledAnnotation = ImageAnnotation<PostureClass>;
pub type UnlabeledAnnotation = ImageAnnotation<Unlabeled>;

impl<L> ImageAnnotation<L>
where
    L: Label,
{
    pub fn new<S>(file_path: S, original_size: ImageSize, label: L, keypoints: Keypoints) -> Self
    where
        S: Into<String>,
    {
        Self {
            file_path: file_path.into(),
            original_size,
            label,
            keypoints,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn original_size(&self) -> ImageSize {
        self.original_size
    }

    pub fn keypoints(&self) -> &Keypoints {
        &self.keypoints
    }

    /// The annotation as one table row in [`annotation_columns`] order.
    pub fn to_row(&self) -> Row {
        let mut row = Vec::with_capacity(NUM_ANNOTATION_COLUMNS);
        row.push(Value::from(self.file_path.as_str()));
        row.push(Value::Number(f64::from(self.original_size.height)));
        row.push(Value::Number(f64::from(self.original_size.width)));
        row.push(Value::from(self.label.as_column()));
        row.extend(self.keypoints.to_row().iter().copied().map(Value::Number));
        row
    }

    /// Rebuild an annotation from row `index` of `table`, locating the
    /// annotation columns by name.
    pub fn from_table_row(table: &Table, index: usize) -> Result<Self, Error> {
        let row = table
            .rows()
            .get(index)
            .ok_or_else(|| Error::RowIndex(index, table.len()))?;
        let cells = Cells { table, index, row };

        let size = |name: &str| -> Result<u32, Error> {
            let value = cells.number(name)?;
            value.to_u32().ok_or(Error::ConvertSize(value))
        };

        let keypoints = KEYPOINT_COLUMNS
            .iter()
            .map(|&name| cells.number(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            file_path: cells.text(FILE_PATH_COLUMN)?.to_owned(),
            original_size: ImageSize::new(size("original_size_h")?, size("original_size_w")?),
            label: L::from_column(cells.text(CLASS_COLUMN)?)?,
            keypoints: Keypoints::from_row(&keypoints)?,
        })
    }
}

/// One table row with its position, for typed cell lookups by column name.
struct Cells<'t> {
    table: &'t Table,
    index: usize,
    row: &'t [Value],
}

impl<'t> Cells<'t> {
    fn text(&self, name: &str) -> Result<&'t str, Error> {
        self.row[self.table.column_index(name)?]
            .as_text()
            .ok_or_else(|| Error::NonTextCell(name.to_owned(), self.index))
    }

    fn number(&self, name: &str) -> Result<f64, Error> {
        self.row[self.table.column_index(name)?]
            .as_number()
            .ok_or_else(|| Error::NonNumericCell(name.to_owned(), self.index))
    }
}

impl ImageAnnotation<PostureClass> {
    pub fn class(&self) -> PostureClass {
        self.label
    }
}

impl ImageAnnotation<Unlabeled> {
    /// Attach the class once it is known, e.g. after classifying the pose.
    pub fn label(self, class: PostureClass) -> LabeledAnnotation {
        ImageAnnotation {
            file_path: self.file_path,
            original_size: self.original_size,
            label: class,
            keypoints: self.keypoints,
        }
    }
}

impl Table {
    /// An empty table with the annotation schema.
    pub fn annotations() -> Result<Self, Error> {
        Self::new(annotation_columns())
    }

    pub fn from_annotations<'a, L, I>(annotations: I) -> Result<Self, Error>
    where
        L: Label + 'a,
        I: IntoIterator<Item = &'a ImageAnnotation<L>>,
    {
        let mut table = Self::annotations()?;
        annotations
            .into_iter()
            .try_for_each(|annotation| table.append(annotation.to_row()))?;
        Ok(table)
    }

    pub fn to_annotations<L>(&self) -> Result<Vec<ImageAnnotation<L>>, Error>
    where
        L: Label,
    {
        (0..self.len())
            .map(|index| ImageAnnotation::from_table_row(self, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        annotation_columns, ImageSize, LabeledAnnotation, PostureClass, Unlabeled,
        UnlabeledAnnotation, NUM_ANNOTATION_COLUMNS,
    };
    use crate::{
        error::Error,
        pose::Keypoints,
        table::{Table, Value},
    };
    use ndarray::Array;

    fn keypoints() -> Keypoints {
        let points = Array::from_shape_fn((17, 2), |(i, j)| (i * 2 + j) as f64 + 0.25);
        Keypoints::from_detection([0.0, 0.0, 100.0, 200.0], 0.9, points.view()).unwrap()
    }

    #[test]
    fn row_has_metadata_then_keypoints() {
        let annotation = LabeledAnnotation::new(
            "images/correct/a.jpg",
            ImageSize::new(480, 640),
            PostureClass::Correct,
            keypoints(),
        );
        let row = annotation.to_row();

        assert_eq!(row.len(), NUM_ANNOTATION_COLUMNS);
        assert_eq!(annotation_columns().count(), 43);
        assert_eq!(row[0], Value::from("images/correct/a.jpg"));
        assert_eq!(row[1], Value::Number(480.0));
        assert_eq!(row[2], Value::Number(640.0));
        assert_eq!(row[3], Value::from("correct"));
        assert_eq!(row[4], Value::Number(0.0));
        assert_eq!(row[8], Value::Number(0.9));
        assert_eq!(row[9], Value::Number(0.25));
    }

    #[test]
    fn annotations_round_trip_through_a_table() {
        let annotations = vec![
            LabeledAnnotation::new("a.jpg", ImageSize::new(1, 2), PostureClass::Correct, keypoints()),
            LabeledAnnotation::new("b.jpg", ImageSize::new(3, 4), PostureClass::NotCorrect, keypoints()),
        ];
        let table = Table::from_annotations(&annotations).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 43);
        assert_eq!(table.to_annotations::<PostureClass>().unwrap(), annotations);
    }

    #[test]
    fn unlabeled_annotations_are_promoted_once() {
        let annotation = UnlabeledAnnotation::new("", ImageSize::new(10, 20), Unlabeled, keypoints());
        assert_eq!(annotation.to_row()[3], Value::from(""));

        let labeled = annotation.label(PostureClass::NotCorrect);
        assert_eq!(labeled.class(), PostureClass::NotCorrect);
        assert_eq!(labeled.to_row()[3], Value::from("not_correct"));
    }

    #[test]
    fn labels_must_match_the_row_state() {
        let unlabeled = UnlabeledAnnotation::new("x.jpg", ImageSize::new(1, 1), Unlabeled, keypoints());
        let table = Table::from_annotations(&[unlabeled]).unwrap();

        assert!(matches!(
            table.to_annotations::<PostureClass>(),
            Err(Error::UnknownClass(class)) if class.is_empty()
        ));
        assert_eq!(table.to_annotations::<Unlabeled>().unwrap().len(), 1);
    }

    #[test]
    fn rows_are_read_by_index_with_typed_cells() {
        let annotation = LabeledAnnotation::new("a.jpg", ImageSize::new(4, 3), PostureClass::Correct, keypoints());
        let table = Table::from_annotations(&[annotation.clone()]).unwrap();

        assert_eq!(LabeledAnnotation::from_table_row(&table, 0).unwrap(), annotation);
        assert!(matches!(
            LabeledAnnotation::from_table_row(&table, 1),
            Err(Error::RowIndex(1, 1))
        ));

        let mut row = annotation.to_row();
        row[1] = Value::from("tall");
        let table = Table::from_rows(annotation_columns(), vec![row]).unwrap();
        assert!(matches!(
            LabeledAnnotation::from_table_row(&table, 0),
            Err(Error::NonNumericCell(name, 0)) if name == "original_size_h"
        ));

        let mut row = annotation.to_row();
        row[0] = Value::Number(1.0);
        let table = Table::from_rows(annotation_columns(), vec![row]).unwrap();
        assert!(matches!(
            table.to_annotations::<PostureClass>(),
            Err(Error::NonTextCell(name, 0)) if name == "file_path"
        ));
    }

    #[test]
    fn annotation_tables_survive_save_and_load() {
        let points = Array::from_shape_fn((17, 2), |(i, j)| i as f64 / 3.0 + j as f64 * 0.1);
        let odd = Keypoints::from_detection([-1.5, 0.1, 1e-7, 640.0], 0.123_456_789, points.view()).unwrap();

        let labeled = vec![
            LabeledAnnotation::new("images/correct/a, b.jpg", ImageSize::new(480, 640), PostureClass::Correct, odd.clone()),
            LabeledAnnotation::new("images/not_correct/\"c\".jpg", ImageSize::new(1, 2), PostureClass::NotCorrect, keypoints()),
        ];
        let unlabeled = vec![UnlabeledAnnotation::new("frame-0001", ImageSize::new(720, 1280), Unlabeled, odd)];

        let mut buffer = Vec::new();
        Table::from_annotations(&labeled).unwrap().save(&mut buffer).unwrap();
        let loaded = Table::load(buffer.as_slice()).unwrap();
        assert_eq!(loaded.columns().len(), NUM_ANNOTATION_COLUMNS);
        assert_eq!(loaded.to_annotations::<PostureClass>().unwrap(), labeled);

        let mut buffer = Vec::new();
        Table::from_annotations(&unlabeled).unwrap().save(&mut buffer).unwrap();
        let loaded = Table::load(buffer.as_slice()).unwrap();
        assert_eq!(loaded.text_column("class").unwrap(), vec![""]);
        assert_eq!(loaded.to_annotations::<Unlabeled>().unwrap(), unlabeled);
    }

    #[test]
    fn class_codes() {
        assert_eq!(PostureClass::NotCorrect.code(), 0);
        assert_eq!(PostureClass::Correct.code(), 1);
        assert_eq!(PostureClass::from_code(1).unwrap(), PostureClass::Correct);
        assert!(matches!(PostureClass::from_code(2), Err(Error::UnknownClassCode(2))));
        assert_eq!("correct".parse::<PostureClass>().unwrap(), PostureClass::Correct);
        for class in PostureClass::ALL {
            assert_eq!(PostureClass::from_code(i64::from(class.code())).unwrap(), class);
        }

        let empty = Table::annotations().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.columns().len(), NUM_ANNOTATION_COLUMNS);
    }
}
