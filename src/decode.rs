//! Turning a selected file into a decoded RGBA bitmap.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, ImageReader, RgbaImage, imageops};
use tracing::{debug, info};

use crate::error::{MergeError, Slot};
use crate::processing::layout::fit_scale;

/// What a slot currently shows before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    NotAnImage,
    Unreadable(String),
    Ready {
        width: u32,
        height: u32,
        format: ImageFormat,
    },
}

impl SlotStatus {
    pub fn message(&self) -> String {
        match self {
            SlotStatus::Empty => "No image selected".to_string(),
            SlotStatus::NotAnImage => "Please select an image file".to_string(),
            SlotStatus::Unreadable(reason) => format!("Cannot read image: {reason}"),
            SlotStatus::Ready {
                width,
                height,
                format,
            } => format!("{width}x{height} {}", format.extensions_str()[0]),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SlotStatus::Ready { .. })
    }
}

/// Declared type of `path`, judged from its extension only.
fn declared_format(slot: Slot, path: &Path) -> Result<ImageFormat, MergeError> {
    ImageFormat::from_path(path).map_err(|_| MergeError::NotAnImage {
        slot,
        path: path.to_path_buf(),
    })
}

/// Reads the header of a selected file without decoding pixels.
pub fn inspect_slot(path: Option<&Path>) -> SlotStatus {
    let Some(path) = path else {
        return SlotStatus::Empty;
    };
    if ImageFormat::from_path(path).is_err() {
        return SlotStatus::NotAnImage;
    }
    let probe = || -> Result<(u32, u32, Option<ImageFormat>), ImageError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let (w, h) = reader.into_dimensions()?;
        Ok((w, h, format))
    };
    match probe() {
        Ok((width, height, Some(format))) => SlotStatus::Ready {
            width,
            height,
            format,
        },
        Ok((_, _, None)) => SlotStatus::Unreadable("unknown format".to_string()),
        Err(err) => SlotStatus::Unreadable(err.to_string()),
    }
}

// Decodes an image to RGBA8 and applies EXIF orientation if available.
fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage, ImageError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let img = img.to_rgba8();
    let orientation = read_orientation(path).unwrap_or(1);
    Ok(apply_orientation(img, orientation))
}

fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        // transpose
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        // transverse
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = field.value.get_uint(0)? as u16;
    debug!("exif orientation {} for {}", o, path.display());
    Some(o)
}

/// Decodes the file selected for `slot` on a blocking worker.
pub async fn decode_image(slot: Slot, path: PathBuf) -> Result<RgbaImage, MergeError> {
    declared_format(slot, &path)?;
    let worker_path = path.clone();
    let decoded = tokio::task::spawn_blocking(move || decode_rgba8_apply_exif(&worker_path)).await?;
    match decoded {
        Ok(img) => {
            debug!(
                slot = %slot,
                width = img.width(),
                height = img.height(),
                "decoded {}",
                path.display()
            );
            Ok(img)
        }
        Err(source) => Err(MergeError::Decode { slot, path, source }),
    }
}

/// Downscaled copy of `img` whose longest edge is at most `max_edge`.
pub fn thumbnail(img: &RgbaImage, max_edge: u32) -> RgbaImage {
    let edge = f64::from(max_edge.max(1));
    let scale = fit_scale(
        f64::from(img.width().max(1)),
        f64::from(img.height().max(1)),
        edge,
        edge,
    )
    .min(1.0);
    let w = ((f64::from(img.width()) * scale).round() as u32).max(1);
    let h = ((f64::from(img.height()) * scale).round() as u32).max(1);
    imageops::thumbnail(img, w, h)
}

/// Decodes the slot's file and writes a PNG thumbnail of it into `dir`.
pub async fn write_preview(
    slot: Slot,
    path: PathBuf,
    max_edge: u32,
    dir: &Path,
) -> Result<PathBuf, MergeError> {
    let img = decode_image(slot, path).await?;
    tokio::fs::create_dir_all(dir).await?;
    let dest = dir.join(format!("{slot}-preview.png"));
    let out = dest.clone();
    tokio::task::spawn_blocking(move || {
        thumbnail(&img, max_edge)
            .save_with_format(&out, ImageFormat::Png)
            .map_err(MergeError::Export)
    })
    .await??;
    info!(slot = %slot, "wrote preview {}", dest.display());
    Ok(dest)
}
