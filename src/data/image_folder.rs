//! Image datasets laid out as one sub-directory per class.
//!
//! ```text
//! root/cat/001.png
//! root/cat/002.jpg
//! root/dog/001.png
//! ```
//! Class indices follow the sorted directory names.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::data::in_memory::Dataset;
use crate::error::{Result, TrainError};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Decodes image bytes, resizes to `width × height`, converts to grayscale
/// and scales pixels to [0, 1]. Returns `width * height` values.
pub fn image_bytes_to_grayscale(bytes: &[u8], width: u32, height: u32) -> Result<Vec<f64>> {
    let img = image::load_from_memory(bytes)?;
    let gray = img.resize_exact(width, height, FilterType::Triangle).to_luma8();
    Ok(gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads every image under `root`. Returns the dataset and the class names
/// in index order.
pub fn load_image_folder(root: &Path, width: u32, height: u32) -> Result<(Dataset, Vec<String>)> {
    let class_dirs: Vec<PathBuf> = sorted_entries(root)?.into_iter().filter(|p| p.is_dir()).collect();
    if class_dirs.is_empty() {
        return Err(TrainError::InvalidInput(format!(
            "{} contains no class directories",
            root.display()
        )));
    }

    let mut dataset = Dataset::default();
    let mut class_names = Vec::with_capacity(class_dirs.len());
    for (class, dir) in class_dirs.iter().enumerate() {
        class_names.push(dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        let mut count = 0usize;
        for path in sorted_entries(dir)?.into_iter().filter(|p| is_image(p)) {
            let bytes = std::fs::read(&path)?;
            dataset.inputs.push(image_bytes_to_grayscale(&bytes, width, height)?);
            dataset.labels.push(class);
            count += 1;
        }
        log::debug!("Class {} ({}): {} images", class, class_names[class], count);
    }

    log::info!(
        "Loaded {} images in {} classes from {}",
        dataset.len(),
        class_names.len(),
        root.display()
    );
    Ok((dataset, class_names))
}
