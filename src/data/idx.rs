//! MNIST-style IDX files (IDX3 uint8 images + IDX1 uint8 labels).
//!
//! ```text
//! images: 00 00 08 03 | N (u32 BE) | rows (u32 BE) | cols (u32 BE) | N*rows*cols bytes
//! labels: 00 00 08 01 | N (u32 BE) | N bytes
//! ```

use std::path::Path;

use crate::data::in_memory::Dataset;
use crate::error::{Result, TrainError};

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn check_magic(bytes: &[u8], dims: u8, what: &str) -> Result<()> {
    let header_len = 4 + 4 * dims as usize;
    if bytes.len() < header_len {
        return Err(TrainError::InvalidInput(format!(
            "IDX {} file too short: expected at least {} header bytes, got {}",
            what,
            header_len,
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(TrainError::InvalidInput(format!(
            "IDX {} file: bytes 0-1 must be 0x00 0x00, got 0x{:02X} 0x{:02X}",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(TrainError::InvalidInput(format!(
            "IDX {} file: dtype must be 0x08 (uint8), got 0x{:02X}",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(TrainError::InvalidInput(format!(
            "IDX {} file: expected {} dimensions, got {}",
            what, dims, bytes[3]
        )));
    }
    Ok(())
}

/// Parses an image/label pair. Pixels are scaled from [0, 255] to [0, 1].
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Dataset> {
    check_magic(image_bytes, 3, "image")?;
    check_magic(label_bytes, 1, "label")?;

    let n_items = be_u32(image_bytes, 4);
    let rows = be_u32(image_bytes, 8);
    let cols = be_u32(image_bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        TrainError::InvalidInput(format!("IDX image file: {}x{} overflows usize", rows, cols))
    })?;
    let required = n_items
        .checked_mul(n_pixels)
        .and_then(|n| n.checked_add(16))
        .ok_or_else(|| TrainError::InvalidInput("IDX image file: data length overflows usize".to_owned()))?;
    if image_bytes.len() < required {
        return Err(TrainError::InvalidInput(format!(
            "IDX image file truncated: header declares {} images of {}x{} ({} bytes), file has {}",
            n_items,
            rows,
            cols,
            required,
            image_bytes.len()
        )));
    }

    let label_count = be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(TrainError::InvalidInput(format!(
            "IDX mismatch: {} images but {} labels",
            n_items, label_count
        )));
    }
    if label_bytes.len() < 8 + n_items {
        return Err(TrainError::InvalidInput(format!(
            "IDX label file truncated: need {} bytes, file has {}",
            8 + n_items,
            label_bytes.len()
        )));
    }

    let inputs = image_bytes[16..required]
        .chunks_exact(n_pixels.max(1))
        .take(n_items)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect();
    let labels = label_bytes[8..8 + n_items].iter().map(|&l| l as usize).collect();

    Dataset::new(inputs, labels)
}

/// Reads and parses an IDX image/label file pair.
pub fn load_idx_pair(images: &Path, labels: &Path) -> Result<Dataset> {
    let image_bytes = std::fs::read(images)?;
    let label_bytes = std::fs::read(labels)?;
    let ds = parse_idx_pair(&image_bytes, &label_bytes)?;
    log::debug!(
        "Loaded {} samples ({} features) from {}",
        ds.len(),
        ds.input_size(),
        images.display()
    );
    Ok(ds)
}
