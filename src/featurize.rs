/// Dataset preparation
///
/// The counterpart of the viewer's upload side: walks a folder of images,
/// computes per-image numeric features, min-max normalizes them into the
/// margin-inset unit range the plot expects, letterboxes a square thumbnail
/// per image, and writes everything as `features.csv` next to the images.
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, RgbImage};
use thiserror::Error;
use walkdir::WalkDir;

use crate::upload::IMAGE_EXTENSIONS;

/// Fraction of the unit range kept free around the plotted values, so
/// points never sit exactly on the canvas border
pub const DEFAULT_MARGIN: f64 = 0.2;

/// Square thumbnail edge in pixels
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;

#[derive(Debug, Error)]
pub enum FeaturizeError {
    #[error("no image files found in {0}")]
    NoImages(PathBuf),
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("could not decode {path}: {message}")]
    Image { path: String, message: String },
    #[error("could not write {path}: {message}")]
    Csv { path: String, message: String },
}

#[derive(Debug, Clone)]
pub struct FeaturizeOptions {
    pub margin: f64,
    pub thumbnail_size: u32,
}

impl Default for FeaturizeOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

/// One image's worth of output rows
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// File name relative to the images folder, as written to `image_file`
    pub file_name: String,
    /// Feature name/value pairs, same names and order for every record
    pub features: Vec<(String, f64)>,
    /// Base64-encoded PNG thumbnail
    pub thumbnail: String,
}

/// Intensity and geometry features of a single image
pub fn intensity_features(image: &DynamicImage) -> Vec<(String, f64)> {
    let gray = image.to_luma8();
    let pixels = gray.as_raw();
    let count = pixels.len().max(1) as f64;

    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum = 0.0f64;
    for &p in pixels {
        min = min.min(p);
        max = max.max(p);
        sum += p as f64;
    }
    if pixels.is_empty() {
        min = 0;
        max = 0;
    }

    let mean = sum / count;
    let variance = pixels
        .iter()
        .map(|&p| {
            let d = p as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count;

    let width = image.width() as f64;
    let height = image.height() as f64;

    vec![
        ("mean_intensity".into(), mean),
        ("min_intensity".into(), min as f64),
        ("max_intensity".into(), max as f64),
        ("std_intensity".into(), variance.sqrt()),
        ("width".into(), width),
        ("height".into(), height),
        ("aspect_ratio".into(), width / height.max(1.0)),
    ]
}

/// Square thumbnail in letterbox style, padded with black
pub fn letterbox_thumbnail(image: &DynamicImage, size: u32) -> RgbImage {
    let scaled = image.thumbnail(size, size).to_rgb8();
    let mut canvas = RgbImage::new(size, size);

    let x = (size.saturating_sub(scaled.width())) / 2;
    let y = (size.saturating_sub(scaled.height())) / 2;
    image::imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);

    canvas
}

/// Encode a thumbnail as base64 PNG for storage inside the CSV
pub fn encode_thumbnail(thumbnail: &RgbImage) -> Result<String, FeaturizeError> {
    let mut bytes = Vec::new();
    thumbnail
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| FeaturizeError::Image {
            path: "<thumbnail>".into(),
            message: e.to_string(),
        })?;
    Ok(BASE64.encode(bytes))
}

/// Min-max normalize every feature column into [margin/2, 1 - margin/2]
///
/// A constant column has zero range; its range is treated as 1, which
/// parks the column at the low edge of the output interval instead of
/// dividing by zero.
pub fn normalize_features(records: &mut [ImageRecord], margin: f64) {
    if records.is_empty() {
        return;
    }

    let feature_count = records[0].features.len();
    for index in 0..feature_count {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for record in records.iter() {
            let value = record.features[index].1;
            min = min.min(value);
            max = max.max(value);
        }

        let range = if max - min == 0.0 { 1.0 } else { max - min };
        for record in records.iter_mut() {
            let value = &mut record.features[index].1;
            *value = (*value - min) / range * (1.0 - margin) + margin / 2.0;
        }
    }
}

/// List the images directly inside the folder, sorted by name
fn collect_images(images_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(images_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| {
                    IMAGE_EXTENSIONS.contains(&ext.to_string_lossy().to_lowercase().as_str())
                })
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Featurize every image in a folder and write `features.csv` next to them
///
/// Returns the path of the written CSV. Images that fail to decode abort
/// the run; a half-written dataset is worse than an error.
pub fn featurize_folder(
    images_dir: &Path,
    options: &FeaturizeOptions,
) -> Result<PathBuf, FeaturizeError> {
    let image_files = collect_images(images_dir);
    if image_files.is_empty() {
        return Err(FeaturizeError::NoImages(images_dir.to_path_buf()));
    }

    let mut records = Vec::with_capacity(image_files.len());
    for (index, file) in image_files.iter().enumerate() {
        let image = image::open(file).map_err(|e| FeaturizeError::Image {
            path: file.display().to_string(),
            message: e.to_string(),
        })?;

        let thumbnail = encode_thumbnail(&letterbox_thumbnail(&image, options.thumbnail_size))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());

        records.push(ImageRecord {
            file_name,
            features: intensity_features(&image),
            thumbnail,
        });

        if (index + 1) % 100 == 0 {
            log::info!("featurized {} of {} images", index + 1, image_files.len());
        }
    }

    normalize_features(&mut records, options.margin);

    let csv_path = images_dir.join("features.csv");
    write_csv(&csv_path, &records)?;
    Ok(csv_path)
}

fn write_csv(csv_path: &Path, records: &[ImageRecord]) -> Result<(), FeaturizeError> {
    let to_csv_error = |e: csv::Error| FeaturizeError::Csv {
        path: csv_path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(csv_path).map_err(to_csv_error)?;

    let mut header = vec!["id".to_string()];
    header.extend(records[0].features.iter().map(|(name, _)| name.clone()));
    header.push("thumbnail".into());
    header.push("image_file".into());
    writer.write_record(&header).map_err(to_csv_error)?;

    for (id, record) in records.iter().enumerate() {
        let mut row = vec![id.to_string()];
        row.extend(record.features.iter().map(|(_, value)| value.to_string()));
        row.push(record.thumbnail.clone());
        row.push(record.file_name.clone());
        writer.write_record(&row).map_err(to_csv_error)?;
    }

    writer.flush().map_err(|e| FeaturizeError::Csv {
        path: csv_path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn record(values: &[f64]) -> ImageRecord {
        ImageRecord {
            file_name: "x.png".into(),
            features: values
                .iter()
                .enumerate()
                .map(|(i, &v)| (format!("f{}", i), v))
                .collect(),
            thumbnail: String::new(),
        }
    }

    #[test]
    fn test_normalize_maps_into_margin_inset_range() {
        let mut records = vec![record(&[0.0]), record(&[5.0]), record(&[10.0])];
        normalize_features(&mut records, 0.2);

        assert!(approx_eq(records[0].features[0].1, 0.1));
        assert!(approx_eq(records[1].features[0].1, 0.5));
        assert!(approx_eq(records[2].features[0].1, 0.9));
    }

    #[test]
    fn test_normalize_bounds_hold_for_any_margin() {
        for margin in [0.0, 0.2, 0.5] {
            let mut records = vec![record(&[-3.0]), record(&[7.5]), record(&[100.0])];
            normalize_features(&mut records, margin);
            for r in &records {
                let v = r.features[0].1;
                assert!(v >= margin / 2.0 - EPSILON);
                assert!(v <= 1.0 - margin / 2.0 + EPSILON);
            }
        }
    }

    #[test]
    fn test_constant_column_parks_at_low_edge() {
        let mut records = vec![record(&[4.0]), record(&[4.0])];
        normalize_features(&mut records, 0.2);
        assert!(approx_eq(records[0].features[0].1, 0.1));
        assert!(approx_eq(records[1].features[0].1, 0.1));
    }

    #[test]
    fn test_letterbox_is_square_and_centered() {
        let wide = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            100,
            50,
            image::Rgb([255, 255, 255]),
        ));
        let thumb = letterbox_thumbnail(&wide, 64);

        assert_eq!(thumb.dimensions(), (64, 64));
        // top rows are padding, the middle row is image
        assert_eq!(thumb.get_pixel(32, 2), &image::Rgb([0, 0, 0]));
        assert_eq!(thumb.get_pixel(32, 32), &image::Rgb([255, 255, 255]));
    }

    #[test]
    fn test_intensity_features_of_flat_image() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            10,
            20,
            image::Rgb([128, 128, 128]),
        ));
        let features = intensity_features(&flat);
        let get = |name: &str| {
            features
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .unwrap()
        };

        assert!(approx_eq(get("mean_intensity"), 128.0));
        assert!(approx_eq(get("min_intensity"), 128.0));
        assert!(approx_eq(get("max_intensity"), 128.0));
        assert!(approx_eq(get("std_intensity"), 0.0));
        assert!(approx_eq(get("width"), 10.0));
        assert!(approx_eq(get("height"), 20.0));
        assert!(approx_eq(get("aspect_ratio"), 0.5));
    }

    #[test]
    fn test_encode_thumbnail_is_decodable_png() {
        let thumb = RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let encoded = encode_thumbnail(&thumb).unwrap();

        let bytes = BASE64.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }
}
