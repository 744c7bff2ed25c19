//! I/O helpers for debug images and JSON.
//!
//! - `save_grayscale_f32`: write an `ImageF32` to a grayscale PNG, scaled to its maximum.
//! - `read_json_file`: deserialize a value from a JSON file.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageF32;
use image::{GrayImage, Luma};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Save a float image to a grayscale PNG. Values are scaled so the maximum
/// maps to 255; `log_scale` compresses the dynamic range of spectra first.
pub fn save_grayscale_f32(image: &ImageF32, path: &Path, log_scale: bool) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let map = |v: f32| if log_scale { v.max(0.0).ln_1p() } else { v };
    let max = image
        .data
        .iter()
        .map(|&v| map(v))
        .fold(0.0f32, f32::max)
        .max(f32::MIN_POSITIVE);
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        for (x, &px) in image.row(y).iter().enumerate() {
            let v = (map(px) / max * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Deserialize a JSON file into `T`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&data).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
