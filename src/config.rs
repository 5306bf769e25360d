use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use fast_image_resize as fir;
use serde::Deserialize;

/// Convolution kernel used when scaling sources onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Box,
    Bilinear,
    Hamming,
    CatmullRom,
    Mitchell,
    Lanczos3,
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self::CatmullRom
    }
}

impl ResizeFilter {
    pub fn to_fir(self) -> fir::FilterType {
        match self {
            Self::Box => fir::FilterType::Box,
            Self::Bilinear => fir::FilterType::Bilinear,
            Self::Hamming => fir::FilterType::Hamming,
            Self::CatmullRom => fir::FilterType::CatmullRom,
            Self::Mitchell => fir::FilterType::Mitchell,
            Self::Lanczos3 => fir::FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory the merged JPEG is written into.
    pub output_dir: PathBuf,
    /// Leading part of the output file name.
    pub file_prefix: String,
    /// JPEG quality in (0, 1].
    pub jpeg_quality: f32,
    /// RGB fill painted before the images.
    pub background: [u8; 3],
    pub resize_filter: ResizeFilter,
    /// Longest edge of slot preview thumbnails, in pixels.
    pub preview_max_edge: u32,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0,
            "jpeg-quality must be in (0, 1], got {}",
            self.jpeg_quality
        );
        ensure!(
            !self.file_prefix.trim().is_empty(),
            "file-prefix must not be empty"
        );
        ensure!(
            !self
                .file_prefix
                .contains(|c: char| std::path::is_separator(c) || c.is_control()),
            "file-prefix must not contain path separators"
        );
        ensure!(
            self.preview_max_edge > 0,
            "preview-max-edge must be greater than zero"
        );
        Ok(self)
    }

    /// Quality on the encoder's 1..=100 scale.
    pub fn encoder_quality(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: String::from("POP"),
            jpeg_quality: 0.92,
            background: [255, 255, 255],
            resize_filter: ResizeFilter::default(),
            preview_max_edge: 320,
        }
    }
}
