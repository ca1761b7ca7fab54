use crate::error::Error;
use ndarray::ArrayView2;
use num_traits::FromPrimitive;

/// The joints a keypoint detector reports, in detector output order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub enum Joint {
    Nose,
    RightEye,
    LeftEye,
    RightEar,
    LeftEar,
    RightShoulder,
    LeftShoulder,
    RightElbow,
    LeftElbow,
    RightHand,
    LeftHand,
    RightHip,
    LeftHip,
    RightKnee,
    LeftKnee,
    RightFoot,
    LeftFoot,
}

pub const NUM_JOINTS: usize = 17;

/// Number of values in a flattened [`Keypoints`] row.
pub const NUM_KEYPOINT_COLUMNS: usize = 5 + 2 * NUM_JOINTS;

impl Joint {
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn from_idx(idx: usize) -> Option<Self> {
        Self::from_usize(idx)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_JOINTS).filter_map(Self::from_idx)
    }

    /// Column name prefix used in annotation tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::RightEye => "r_eye",
            Self::LeftEye => "l_eye",
            Self::RightEar => "r_ear",
            Self::LeftEar => "l_ear",
            Self::RightShoulder => "r_shoulder",
            Self::LeftShoulder => "l_shoulder",
            Self::RightElbow => "r_elbow",
            Self::LeftElbow => "l_elbow",
            Self::RightHand => "r_hand",
            Self::LeftHand => "l_hand",
            Self::RightHip => "r_hip",
            Self::LeftHip => "l_hip",
            Self::RightKnee => "r_knee",
            Self::LeftKnee => "l_knee",
            Self::RightFoot => "r_feet",
            Self::LeftFoot => "l_feet",
        }
    }

    pub fn column(self, coordinate: Coordinate) -> &'static str {
        JOINT_COLUMNS[2 * self.idx() + coordinate.offset()]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Coordinate {
    X,
    Y,
}

impl Coordinate {
    pub const BOTH: [Self; 2] = [Self::X, Self::Y];

    fn offset(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }

    /// Joint columns holding this coordinate, in joint order.
    pub fn joint_columns(self) -> impl Iterator<Item = &'static str> {
        Joint::all().map(move |joint| joint.column(self))
    }

    pub fn top_left_column(self) -> &'static str {
        KEYPOINT_COLUMNS[self.offset()]
    }

    pub fn bottom_right_column(self) -> &'static str {
        KEYPOINT_COLUMNS[2 + self.offset()]
    }
}

pub const JOINT_COLUMNS: [&str; 2 * NUM_JOINTS] = [
    "nose_x",
    "nose_y",
    "r_eye_x",
    "r_eye_y",
    "l_eye_x",
    "l_eye_y",
    "r_ear_x",
    "r_ear_y",
    "l_ear_x",
    "l_ear_y",
    "r_shoulder_x",
    "r_shoulder_y",
    "l_shoulder_x",
    "l_shoulder_y",
    "r_elbow_x",
    "r_elbow_y",
    "l_elbow_x",
    "l_elbow_y",
    "r_hand_x",
    "r_hand_y",
    "l_hand_x",
    "l_hand_y",
    "r_hip_x",
    "r_hip_y",
    "l_hip_x",
    "l_hip_y",
    "r_knee_x",
    "r_knee_y",
    "l_knee_x",
    "l_knee_y",
    "r_feet_x",
    "r_feet_y",
    "l_feet_x",
    "l_feet_y",
];

pub const KEYPOINT_COLUMNS: [&str; NUM_KEYPOINT_COLUMNS] = [
    "bounding_box_lu_x",
    "bounding_box_lu_y",
    "bounding_box_rd_x",
    "bounding_box_rd_y",
    "confidence",
    "nose_x",
    "nose_y",
    "r_eye_x",
    "r_eye_y",
    "l_eye_x",
    "l_eye_y",
    "r_ear_x",
    "r_ear_y",
    "l_ear_x",
    "l_ear_y",
    "r_shoulder_x",
    "r_shoulder_y",
    "l_shoulder_x",
    "l_shoulder_y",
    "r_elbow_x",
    "r_elbow_y",
    "l_elbow_x",
    "l_elbow_y",
    "r_hand_x",
    "r_hand_y",
    "l_hand_x",
    "l_hand_y",
    "r_hip_x",
    "r_hip_y",
    "l_hip_x",
    "l_hip_y",
    "r_knee_x",
    "r_knee_y",
    "l_knee_x",
    "l_knee_y",
    "r_feet_x",
    "r_feet_y",
    "l_feet_x",
    "l_feet_y",
];

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn get(self, coordinate: Coordinate) -> f64 {
        match coordinate {
            Coordinate::X => self.x,
            Coordinate::Y => self.y,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
    pub confidence: f64,
}

/// One detected pose. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoints {
    bounding_box: BoundingBox,
    joints: [Point; NUM_JOINTS],
}

impl Keypoints {
    /// Build keypoints from raw detector output.
    ///
    /// `bounding_box` is `[lu_x, lu_y, rd_x, rd_y]` and `points` holds one
    /// `(x, y)` row per joint in [`Joint`] order.
    pub fn from_detection(
        bounding_box: [f64; 4],
        confidence: f64,
        points: ArrayView2<'_, f64>,
    ) -> Result<Self, Error> {
        if points.dim() != (NUM_JOINTS, 2) {
            return Err(Error::Shape(NUM_JOINTS, points.shape().to_vec()));
        }

        let mut joints = [Point::default(); NUM_JOINTS];
        for (joint, row) in joints.iter_mut().zip(points.outer_iter()) {
            *joint = Point::new(row[0], row[1]);
        }

        let [lu_x, lu_y, rd_x, rd_y] = bounding_box;
        Ok(Self {
            bounding_box: BoundingBox {
                top_left: Point::new(lu_x, lu_y),
                bottom_right: Point::new(rd_x, rd_y),
                confidence,
            },
            joints,
        })
    }

    /// Inverse of [`Keypoints::to_row`].
    pub fn from_row(row: &[f64]) -> Result<Self, Error> {
        if row.len() != NUM_KEYPOINT_COLUMNS {
            return Err(Error::KeypointRowLength(NUM_KEYPOINT_COLUMNS, row.len()));
        }
        let points = ArrayView2::from_shape((NUM_JOINTS, 2), &row[5..])
            .map_err(|_| Error::Shape(NUM_JOINTS, vec![row.len() - 5]))?;
        Self::from_detection([row[0], row[1], row[2], row[3]], row[4], points)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn joint(&self, joint: Joint) -> Point {
        self.joints[joint.idx()]
    }

    pub fn joints(&self) -> impl Iterator<Item = (Joint, Point)> + '_ {
        Joint::all().zip(self.joints.iter().copied())
    }

    pub fn to_row(&self) -> [f64; NUM_KEYPOINT_COLUMNS] {
        let BoundingBox {
            top_left,
            bottom_right,
            confidence,
        } = self.bounding_box;
        let mut row = [0.0; NUM_KEYPOINT_COLUMNS];
        row[..5].copy_from_slice(&[
            top_left.x,
            top_left.y,
            bottom_right.x,
            bottom_right.y,
            confidence,
        ]);
        for (i, point) in self.joints.iter().enumerate() {
            row[5 + 2 * i] = point.x;
            row[6 + 2 * i] = point.y;
        }
        row
    }
}
