use fast_image_resize as fir;
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use crate::config::ResizeFilter;
use crate::error::MergeError;
use crate::processing::layout::{PixelRect, SplitLayout};

#[derive(Debug, Clone, Copy)]
pub struct PaintOptions {
    pub background: [u8; 3],
    pub filter: ResizeFilter,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            filter: ResizeFilter::default(),
        }
    }
}

/// Paints both images onto a fresh opaque canvas at their layout rects.
pub fn paint(
    layout: &SplitLayout,
    top: &RgbaImage,
    bottom: &RgbaImage,
    opts: PaintOptions,
) -> Result<RgbaImage, MergeError> {
    let [r, g, b] = opts.background;
    let mut canvas = RgbaImage::from_pixel(
        layout.canvas.width,
        layout.canvas.height,
        Rgba([r, g, b, 255]),
    );

    let (top_rect, bottom_rect) = layout.pixel_rects();
    draw(&mut canvas, top, top_rect, opts.filter)?;
    draw(&mut canvas, bottom, bottom_rect, opts.filter)?;
    Ok(canvas)
}

fn draw(
    canvas: &mut RgbaImage,
    source: &RgbaImage,
    rect: PixelRect,
    filter: ResizeFilter,
) -> Result<(), MergeError> {
    if rect.is_empty() {
        debug!(?rect, "skipping image with empty footprint");
        return Ok(());
    }
    let scaled = resize_rgba(source, rect.width, rect.height, filter)?;
    imageops::overlay(canvas, &scaled, i64::from(rect.x), i64::from(rect.y));
    debug!(
        src_w = source.width(),
        src_h = source.height(),
        ?rect,
        "painted image"
    );
    Ok(())
}

fn resize_rgba(
    source: &RgbaImage,
    target_w: u32,
    target_h: u32,
    filter: ResizeFilter,
) -> Result<RgbaImage, MergeError> {
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| MergeError::Render(format!("failed to create source view: {err}")))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(filter.to_fir()));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| MergeError::Render(format!("resize failed: {err}")))?;
    let buffer = dst_image.into_vec();
    RgbaImage::from_raw(target_w, target_h, buffer)
        .ok_or_else(|| MergeError::Render("failed to construct resized RGBA image".into()))
}
