//! Canvas serialization and the output file.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

use crate::error::MergeError;

/// Turns a painted canvas into the bytes that get written out.
pub trait Encoder: Send + Sync + 'static {
    fn encode(&self, canvas: &RgbaImage) -> Result<Vec<u8>, MergeError>;

    fn extension(&self) -> &'static str {
        "jpg"
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JpegExporter {
    /// 1..=100
    pub quality: u8,
}

impl Encoder for JpegExporter {
    fn encode(&self, canvas: &RgbaImage) -> Result<Vec<u8>, MergeError> {
        encode_jpeg(canvas, self.quality)
    }
}

/// Encodes an opaque canvas as baseline JPEG.
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, MergeError> {
    // JPEG has no alpha; the canvas is already opaque so dropping it is lossless.
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut buf = Vec::with_capacity(rgb.as_raw().len() / 8);
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(MergeError::from_encode)?;
    debug!(bytes = buf.len(), quality, "encoded jpeg");
    Ok(buf)
}

/// `PREFIX_A3縦_YYYYMMDD_HHMMSS.<ext>` for the given local wall-clock time.
pub fn output_file_name(prefix: &str, at: NaiveDateTime, extension: &str) -> String {
    format!("{prefix}_A3縦_{}.{extension}", at.format("%Y%m%d_%H%M%S"))
}

const MAX_NAME_SUFFIX: u32 = 999;

/// Picks a path in `dir` for `name` that does not exist yet.
async fn unused_path(dir: &Path, name: &str) -> Result<PathBuf, MergeError> {
    let candidate = dir.join(name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    for n in 1..=MAX_NAME_SUFFIX {
        let candidate = if ext.is_empty() {
            dir.join(format!("{stem}_{n}"))
        } else {
            dir.join(format!("{stem}_{n}.{ext}"))
        };
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for {name} in {}", dir.display()),
    )
    .into())
}

/// Writes `bytes` under `dir`, creating it if needed.
///
/// The data lands in a hidden temp file first and is renamed into place, so a
/// partially written JPEG is never visible under the final name.
pub async fn write_output(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, MergeError> {
    tokio::fs::create_dir_all(dir).await?;
    let dest = unused_path(dir, name).await?;
    let tmp = dir.join(format!(".{name}.partial"));
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(err) = tokio::fs::rename(&tmp, &dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    info!(bytes = bytes.len(), "wrote {}", dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use image::Rgba;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn file_name_is_zero_padded() {
        assert_eq!(
            output_file_name("POP", at(9, 5, 3), "jpg"),
            "POP_A3縦_20260307_090503.jpg"
        );
    }

    #[test]
    fn minutes_are_not_shifted() {
        assert_eq!(
            output_file_name("POP", at(23, 59, 59), "jpg"),
            "POP_A3縦_20260307_235959.jpg"
        );
    }

    #[test]
    fn jpeg_round_trips_dimensions() {
        let canvas = RgbaImage::from_pixel(16, 24, Rgba([255, 255, 255, 255]));
        let bytes = encode_jpeg(&canvas, 92).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg)
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 24));
    }

    #[tokio::test]
    async fn second_write_in_same_second_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let name = output_file_name("POP", at(1, 2, 3), "jpg");
        let first = write_output(dir.path(), &name, b"one").await.unwrap();
        let second = write_output(dir.path(), &name, b"two").await.unwrap();
        assert_eq!(first.file_name().unwrap(), "POP_A3縦_20260307_010203.jpg");
        assert_eq!(second.file_name().unwrap(), "POP_A3縦_20260307_010203_1.jpg");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert!(!dir.path().join(format!(".{name}.partial")).exists());
    }
}
