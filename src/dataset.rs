use crate::{
    annotation::{ImageSize, LabeledAnnotation, PostureClass},
    error::Error,
    pose::Keypoints,
    table::Table,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg"];

/// Finds poses in an image.
pub trait KeypointDetector {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every pose found in the image, most relevant first. May be empty.
    fn detect(&self, image: &Path) -> Result<Vec<Keypoints>, Self::Error>;
}

fn read_dir(path: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = fs::read_dir(path)
        .map_err(|e| Error::Io(e, path.to_path_buf()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Io(e, path.to_path_buf()))?;
    entries.sort();
    Ok(entries)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| IMAGE_EXTENSIONS.contains(&extension))
}

/// Collect the images below `root`, keyed by path, labelled by the name of
/// the class directory holding them.
///
/// Directories not named after a posture class are skipped. An image that
/// resolves to a file already collected is logged and skipped.
pub fn scan_image_directory(root: &Path) -> Result<BTreeMap<PathBuf, PostureClass>, Error> {
    if !root.is_dir() {
        return Err(Error::InvalidDirectoryStructure(root.to_path_buf()));
    }

    let mut images = BTreeMap::new();
    let mut seen = BTreeMap::new();

    for directory in read_dir(root)?.into_iter().filter(|path| path.is_dir()) {
        let class = match directory
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::parse::<PostureClass>)
        {
            Some(Ok(class)) => class,
            _ => {
                debug!(message = "skipping directory", directory = ?directory);
                continue;
            }
        };

        for image in read_dir(&directory)?
            .into_iter()
            .filter(|path| path.is_file() && has_image_extension(path))
        {
            let canonical = fs::canonicalize(&image).map_err(|e| Error::Io(e, image.clone()))?;
            if let Some(first) = seen.get(&canonical) {
                let error = Error::DuplicateEntry(image.clone());
                warn!(message = "skipping image", error = %error, first = ?first);
                continue;
            }
            seen.insert(canonical, image.clone());
            images.insert(image, class);
        }
    }

    Ok(images)
}

fn progress_bar(len: usize, show_progress: bool) -> ProgressBar {
    if !show_progress {
        return ProgressBar::hidden();
    }
    ProgressBar::new(len as u64).with_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40}] {pos}/{len} {wide_msg}")
            .progress_chars("=> "),
    )
}

/// Run `detector` over every image of a class-labelled directory and
/// collect one annotation row per image with at least one detection.
pub fn build_dataset<D>(root: &Path, detector: &D, show_progress: bool) -> Result<Table, Error>
where
    D: KeypointDetector,
{
    let images = scan_image_directory(root)?;
    info!(message = "found images", count = images.len(), root = ?root);

    let pb = progress_bar(images.len(), show_progress);
    let mut table = Table::annotations()?;

    for (image, class) in images {
        pb.set_message(image.display().to_string());
        if let Some(annotation) = annotate_image(&image, class, detector)? {
            table.append(annotation.to_row())?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(message = "built dataset", rows = table.len());
    Ok(table)
}

/// Annotate one image with the first detected pose, or `None` when the
/// detector finds nothing. Images whose path is not valid UTF-8 are skipped,
/// since the stored `file_path` has to resolve back to the image.
pub fn annotate_image<D>(
    image: &Path,
    class: PostureClass,
    detector: &D,
) -> Result<Option<LabeledAnnotation>, Error>
where
    D: KeypointDetector,
{
    let file_path = match image.to_str() {
        Some(file_path) => file_path,
        None => {
            warn!(message = "skipping image with a non UTF-8 path", image = ?image);
            return Ok(None);
        }
    };

    let keypoints = match detector
        .detect(image)
        .map_err(|e| Error::Detector(Box::new(e), image.to_path_buf()))?
        .into_iter()
        .next()
    {
        Some(keypoints) => keypoints,
        None => {
            debug!(message = "no pose detected", image = ?image);
            return Ok(None);
        }
    };

    let (width, height) =
        image::image_dimensions(image).map_err(|e| Error::ImageDimensions(e, image.to_path_buf()))?;

    Ok(Some(LabeledAnnotation::new(
        file_path,
        ImageSize::new(height, width),
        class,
        keypoints,
    )))
}

#[cfg(test)]
mod tests {
    use super::{annotate_image, build_dataset, scan_image_directory, KeypointDetector};
    use crate::{
        annotation::PostureClass,
        error::Error,
        pose::{Keypoints, NUM_JOINTS},
        table::Value,
    };
    use ndarray::Array2;
    use std::{fs, path::Path};

    #[derive(Debug, thiserror::Error)]
    #[error("detector unavailable")]
    struct Unavailable;

    /// Finds one pose in every image except those with "empty" in the name.
    struct FixedDetector;

    impl KeypointDetector for FixedDetector {
        type Error = Unavailable;

        fn detect(&self, image: &Path) -> Result<Vec<Keypoints>, Self::Error> {
            if image.to_string_lossy().contains("empty") {
                return Ok(vec![]);
            }
            let points = Array2::from_elem((NUM_JOINTS, 2), 3.0);
            let first = Keypoints::from_detection([1.0, 2.0, 5.0, 6.0], 0.8, points.view()).unwrap();
            let second = Keypoints::from_detection([0.0; 4], 0.1, points.view()).unwrap();
            Ok(vec![first, second])
        }
    }

    struct BrokenDetector;

    impl KeypointDetector for BrokenDetector {
        type Error = Unavailable;

        fn detect(&self, _image: &Path) -> Result<Vec<Keypoints>, Self::Error> {
            Err(Unavailable)
        }
    }

    fn write_image(path: &Path, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    fn dataset_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let correct = dir.path().join("correct");
        let not_correct = dir.path().join("not_correct");
        let other = dir.path().join("unsure");
        for d in &[&correct, &not_correct, &other] {
            fs::create_dir(d).unwrap();
        }
        write_image(&correct.join("a.jpg"), 8, 6);
        write_image(&correct.join("empty.jpg"), 8, 6);
        write_image(&not_correct.join("b.jpg"), 4, 2);
        write_image(&other.join("c.jpg"), 4, 2);
        fs::write(correct.join("notes.txt"), "not an image").unwrap();
        dir
    }

    #[test]
    fn scan_collects_images_by_class_directory() {
        let dir = dataset_dir();
        let images = scan_image_directory(dir.path()).unwrap();

        let found: Vec<_> = images
            .iter()
            .map(|(path, &class)| (path.file_name().unwrap().to_str().unwrap().to_owned(), class))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a.jpg".to_owned(), PostureClass::Correct),
                ("empty.jpg".to_owned(), PostureClass::Correct),
                ("b.jpg".to_owned(), PostureClass::NotCorrect),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn duplicate_files_are_skipped() {
        let dir = dataset_dir();
        std::os::unix::fs::symlink(
            dir.path().join("correct").join("a.jpg"),
            dir.path().join("not_correct").join("link.jpg"),
        )
        .unwrap();

        let images = scan_image_directory(dir.path()).unwrap();
        assert_eq!(images.len(), 3);
        assert!(images.keys().all(|path| !path.ends_with("link.jpg")));
    }

    #[test]
    fn scan_requires_a_directory() {
        let dir = dataset_dir();
        let file = dir.path().join("correct").join("a.jpg");
        assert!(matches!(
            scan_image_directory(&file),
            Err(Error::InvalidDirectoryStructure(_))
        ));
    }

    #[test]
    fn dataset_has_one_row_per_detected_image() {
        let dir = dataset_dir();
        let table = build_dataset(dir.path(), &FixedDetector, false).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 43);

        let first = &table.rows()[0];
        assert!(first[0].as_text().unwrap().ends_with("a.jpg"));
        assert_eq!(first[1], Value::Number(6.0));
        assert_eq!(first[2], Value::Number(8.0));
        assert_eq!(first[3], Value::from("correct"));
        assert_eq!(first[8], Value::Number(0.8));

        let second = &table.rows()[1];
        assert_eq!(second[1], Value::Number(2.0));
        assert_eq!(second[3], Value::from("not_correct"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_skipped() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = dataset_dir();
        let image = dir.path().join("correct").join(OsStr::from_bytes(b"bad\xff.jpg"));

        assert!(annotate_image(&image, PostureClass::Correct, &BrokenDetector)
            .unwrap()
            .is_none());

        let good = dir.path().join("correct").join("a.jpg");
        let annotation = annotate_image(&good, PostureClass::Correct, &FixedDetector)
            .unwrap()
            .unwrap();
        assert_eq!(annotation.file_path(), good.to_str().unwrap());
    }

    #[test]
    fn detector_errors_propagate() {
        let dir = dataset_dir();
        assert!(matches!(
            build_dataset(dir.path(), &BrokenDetector, false),
            Err(Error::Detector(_, _))
        ));
    }
}
