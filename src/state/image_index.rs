/// Index from CSV-addressable keys to image files on disk
///
/// Built once when a folder is uploaded and read-only afterwards. Every
/// image is registered under two keys: its path relative to the uploaded
/// folder root (with separators normalized to forward slashes) and its bare
/// file name. Both alias the same file, which tolerates CSVs whose
/// `image_file` column stores either form.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Convert all path separators to forward slashes
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageIndex {
    entries: HashMap<String, PathBuf>,
}

impl ImageIndex {
    /// Index a list of image files found under `root`
    ///
    /// Files with duplicate bare names keep the last one scanned under the
    /// basename key; their relative-path keys stay distinct.
    pub fn build(root: &Path, files: &[PathBuf]) -> Self {
        let mut entries = HashMap::new();

        for file in files {
            let relative = file.strip_prefix(root).unwrap_or(file);
            let key = normalize_separators(&relative.to_string_lossy());
            entries.insert(key, file.clone());

            if let Some(name) = file.file_name() {
                entries.insert(name.to_string_lossy().to_string(), file.clone());
            }
        }

        ImageIndex { entries }
    }

    /// Exact-key lookup; callers normalize and fall back to basenames
    pub fn get(&self, key: &str) -> Option<&PathBuf> {
        self.entries.get(key)
    }

    /// Number of distinct keys (not files)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
