/// Folder upload pipeline
///
/// This module handles everything between "the user picked a folder" and
/// "the viewer has a dataset":
/// - Scanning the folder for exactly one CSV plus its images
/// - Parsing the CSV off the UI thread (parse.rs)
/// - Assembling the Dataset handed to the application

pub mod parse;

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::state::dataset::Dataset;
use crate::state::image_index::ImageIndex;

/// Image extensions accepted during the folder scan
pub const IMAGE_EXTENSIONS: [&str; 8] =
    ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "tif"];

/// Everything that can go wrong while loading a folder
///
/// All variants are recoverable: the viewer reports them and keeps the
/// previously loaded dataset, if any.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("no CSV file found in the folder")]
    NoCsv,
    #[error("multiple CSV files found: {}", .0.join(", "))]
    MultipleCsv(Vec<String>),
    #[error("no image files found in the folder")]
    NoImages,
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("could not parse {path}: {message}")]
    Csv { path: String, message: String },
}

/// Result of classifying the files under an uploaded folder
#[derive(Debug, Clone, PartialEq)]
pub struct FolderScan {
    pub csv_file: PathBuf,
    pub image_files: Vec<PathBuf>,
}

/// Walk the folder and classify its files by extension
///
/// Exactly one CSV is required; zero or multiple is an input-shape error.
/// At least one image is required. Anything else is ignored.
pub fn scan_folder(root: &Path) -> Result<FolderScan, UploadError> {
    let mut csv_files: Vec<PathBuf> = Vec::new();
    let mut image_files: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(extension) = path.extension() else {
            continue;
        };
        let extension = extension.to_string_lossy().to_lowercase();

        if extension == "csv" {
            csv_files.push(path.to_path_buf());
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            image_files.push(path.to_path_buf());
        }
    }

    let csv_file = match csv_files.len() {
        0 => return Err(UploadError::NoCsv),
        1 => csv_files.remove(0),
        _ => {
            let names = csv_files
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| p.display().to_string())
                })
                .collect();
            return Err(UploadError::MultipleCsv(names));
        }
    };

    if image_files.is_empty() {
        return Err(UploadError::NoImages);
    }
    image_files.sort();

    Ok(FolderScan {
        csv_file,
        image_files,
    })
}

/// Load a dataset from a folder
///
/// Runs the scan and parse on a blocking thread; the UI receives the
/// result as a message and decides whether it is still current.
pub async fn load_dataset(root: PathBuf) -> Result<Dataset, UploadError> {
    tokio::task::spawn_blocking(move || load_dataset_blocking(&root))
        .await
        .map_err(|e| UploadError::Io {
            path: String::new(),
            message: format!("task join error: {}", e),
        })?
}

fn load_dataset_blocking(root: &Path) -> Result<Dataset, UploadError> {
    let scan = scan_folder(root)?;

    let bytes = std::fs::read(&scan.csv_file).map_err(|e| UploadError::Io {
        path: scan.csv_file.display().to_string(),
        message: e.to_string(),
    })?;

    let table = parse::parse_csv(&bytes).map_err(|e| UploadError::Csv {
        path: scan.csv_file.display().to_string(),
        message: e.to_string(),
    })?;

    let images = ImageIndex::build(root, &scan.image_files);

    log::info!(
        "loaded {}: {} columns, {} rows, {} images",
        root.display(),
        table.column_count(),
        table.row_count(),
        scan.image_files.len()
    );

    Ok(Dataset {
        table,
        images,
        root: root.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    /// A unique scratch folder for one test, removed on drop
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new() -> Self {
            let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!(
                "featurescope-test-{}-{}",
                std::process::id(),
                id
            ));
            fs::create_dir_all(&path).unwrap();
            ScratchDir(path)
        }

        fn write(&self, name: &str, contents: &[u8]) {
            let path = self.0.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_scan_happy_path() {
        let dir = ScratchDir::new();
        dir.write("features.csv", b"id,f1\n1,0.5\n");
        dir.write("a.png", b"x");
        dir.write("sub/b.JPG", b"x");
        dir.write("notes.txt", b"ignored");

        let scan = scan_folder(&dir.0).unwrap();
        assert_eq!(scan.csv_file, dir.0.join("features.csv"));
        assert_eq!(scan.image_files.len(), 2);
    }

    #[test]
    fn test_scan_requires_a_csv() {
        let dir = ScratchDir::new();
        dir.write("a.png", b"x");

        assert_eq!(scan_folder(&dir.0), Err(UploadError::NoCsv));
    }

    #[test]
    fn test_scan_rejects_multiple_csvs_naming_both() {
        let dir = ScratchDir::new();
        dir.write("one.csv", b"a\n1\n");
        dir.write("two.csv", b"a\n1\n");
        dir.write("a.png", b"x");

        match scan_folder(&dir.0) {
            Err(UploadError::MultipleCsv(names)) => {
                assert_eq!(names.len(), 2);
                assert!(names.contains(&"one.csv".to_string()));
                assert!(names.contains(&"two.csv".to_string()));
            }
            other => panic!("expected MultipleCsv, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_images() {
        let dir = ScratchDir::new();
        dir.write("features.csv", b"a\n1\n");

        assert_eq!(scan_folder(&dir.0), Err(UploadError::NoImages));
    }

    #[test]
    fn test_error_messages_are_user_readable() {
        let error = UploadError::MultipleCsv(vec!["one.csv".into(), "two.csv".into()]);
        assert_eq!(
            error.to_string(),
            "multiple CSV files found: one.csv, two.csv"
        );
    }
}
