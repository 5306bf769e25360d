/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// A3 portrait at roughly 300 DPI.
pub const A3_PORTRAIT: CanvasSize = CanvasSize {
    width: 3508,
    height: 4961,
};

impl CanvasSize {
    /// Height of each half; fractional when the canvas height is odd.
    pub fn half_height(&self) -> f64 {
        f64::from(self.height) / 2.0
    }

    pub fn midline(&self) -> f64 {
        self.half_height()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSize {
    pub width: f64,
    pub height: f64,
}

/// A fitted size plus its origin on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel footprint of a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    pub canvas: CanvasSize,
    pub top: Placement,
    pub bottom: Placement,
}

/// Scale factor that makes `src` as large as possible inside `max`.
///
/// Can exceed 1.0: sources smaller than the bounds are enlarged.
pub fn fit_scale(src_w: f64, src_h: f64, max_w: f64, max_h: f64) -> f64 {
    (max_w / src_w).min(max_h / src_h)
}

/// Largest aspect-preserving size of `src` within `max`.
///
/// All inputs must be strictly positive; other inputs give non-finite output.
pub fn fit_within(src_w: f64, src_h: f64, max_w: f64, max_h: f64) -> FitSize {
    let scale = fit_scale(src_w, src_h, max_w, max_h);
    FitSize {
        width: src_w * scale,
        height: src_h * scale,
    }
}

/// Places `top` above and `bottom` below the canvas midline.
///
/// Each image is fitted into full width by half height with its own scale and
/// centered horizontally. The top image's bottom edge and the bottom image's
/// top edge both sit exactly on the midline, so any slack ends up at the outer
/// canvas edges rather than being split around each image.
pub fn vertical_split(canvas: CanvasSize, top: (u32, u32), bottom: (u32, u32)) -> SplitLayout {
    let canvas_w = f64::from(canvas.width);
    let half_h = canvas.half_height();

    let top_fit = fit_within(f64::from(top.0), f64::from(top.1), canvas_w, half_h);
    let bottom_fit = fit_within(f64::from(bottom.0), f64::from(bottom.1), canvas_w, half_h);

    let top = Placement {
        x: (canvas_w - top_fit.width) / 2.0,
        y: half_h - top_fit.height,
        width: top_fit.width,
        height: top_fit.height,
    };
    let bottom = Placement {
        x: (canvas_w - bottom_fit.width) / 2.0,
        y: half_h,
        width: bottom_fit.width,
        height: bottom_fit.height,
    };

    SplitLayout {
        canvas,
        top,
        bottom,
    }
}

impl Placement {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Rounds each edge independently and clamps to the canvas.
    pub fn to_pixels(&self, canvas: CanvasSize) -> PixelRect {
        let x0 = snap(self.x, canvas.width);
        let x1 = snap(self.right(), canvas.width);
        let y0 = snap(self.y, canvas.height);
        let y1 = snap(self.bottom(), canvas.height);
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

impl SplitLayout {
    /// Pixel footprints of the top and bottom images.
    ///
    /// The shared edge is snapped from the midline itself rather than from
    /// each placement's own sum, so the two rects meet on one row.
    pub fn pixel_rects(&self) -> (PixelRect, PixelRect) {
        let mid = snap(self.canvas.midline(), self.canvas.height);
        let mut top = self.top.to_pixels(self.canvas);
        top.height = mid.saturating_sub(top.y);
        let mut bottom = self.bottom.to_pixels(self.canvas);
        let bottom_edge = bottom.y + bottom.height;
        bottom.y = mid;
        bottom.height = bottom_edge.saturating_sub(mid);
        (top, bottom)
    }
}

fn snap(v: f64, max: u32) -> u32 {
    if v.is_finite() {
        v.round().clamp(0.0, f64::from(max)) as u32
    } else {
        0
    }
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn half_height_keeps_fraction() {
        assert_eq!(A3_PORTRAIT.half_height(), 2480.5);
    }

    #[test]
    fn width_bound_fit() {
        // 4000x1000 in 3508x2480.5 -> width is the tighter bound
        let fit = fit_within(4000.0, 1000.0, 3508.0, 2480.5);
        assert!(close(fit.width, 3508.0, 1e-9));
        assert!(close(fit.height, 877.0, 1e-9));
    }

    #[test]
    fn small_source_is_upscaled() {
        let scale = fit_scale(100.0, 50.0, 3508.0, 2480.5);
        assert!(scale > 1.0);
        let fit = fit_within(100.0, 50.0, 3508.0, 2480.5);
        assert!(close(fit.width, 3508.0, 1e-9));
        assert!(close(fit.height, 1754.0, 1e-9));
    }

    #[test]
    fn shared_midline_rounds_to_same_row() {
        let layout = vertical_split(A3_PORTRAIT, (800, 600), (600, 800));
        let (top, bottom) = layout.pixel_rects();
        assert_eq!(top.y, 0);
        assert_eq!(top.y + top.height, bottom.y);
        assert_eq!(bottom.y, 2481);
        assert!(bottom.y + bottom.height <= A3_PORTRAIT.height);
    }

    #[test]
    fn pixel_rect_clamps_to_canvas() {
        let canvas = CanvasSize {
            width: 10,
            height: 10,
        };
        let p = Placement {
            x: -2.0,
            y: 8.0,
            width: 14.0,
            height: 5.0,
        };
        let r = p.to_pixels(canvas);
        assert_eq!(
            r,
            PixelRect {
                x: 0,
                y: 8,
                width: 10,
                height: 2
            }
        );
    }
}
