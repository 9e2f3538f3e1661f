//! Image sizing policy.
//!
//! Requested image sizes are given in inches.  Oversized requests are clamped by a fixed
//! threshold table and the decoded image is then shrunk, keeping its aspect ratio, until it fits
//! within the clamped bounds.  Images are never enlarged.

/// Requests wider than this are clamped to [`CLAMPED_WIDTH_IN`].
pub const WIDTH_THRESHOLD_IN: f64 = 8.0;
/// Requests taller than this are clamped to [`CLAMPED_HEIGHT_IN`].
pub const HEIGHT_THRESHOLD_IN: f64 = 9.0;
/// Width used when a request exceeds [`WIDTH_THRESHOLD_IN`].
pub const CLAMPED_WIDTH_IN: f64 = 7.0;
/// Height used when a request exceeds [`HEIGHT_THRESHOLD_IN`].
pub const CLAMPED_HEIGHT_IN: f64 = 8.0;

/// Resolution used to derive the natural size of a decoded image.
pub const NATURAL_DPI: f64 = 72.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// A width/height pair measured in inches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Inches {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Inches {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Natural size of an image with the given pixel dimensions at `dpi`.
    pub fn from_pixels(width_px: u32, height_px: u32, dpi: f64) -> Self {
        Self::new(width_px as f64 / dpi, height_px as f64 / dpi)
    }

    /// Whether both extents are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width in millimetres.
    pub fn width_mm(&self) -> f64 {
        self.width * MM_PER_INCH
    }

    /// Height in millimetres.
    pub fn height_mm(&self) -> f64 {
        self.height * MM_PER_INCH
    }
}

/// Applies the threshold table to a requested size.
///
/// The clamped width of 7 in exceeds the 6.5 in content width of Letter paper with the default
/// one inch margins, so a clamped image overlaps the right margin.  Use
/// [`DocumentBuilder::with_margins`](crate::DocumentBuilder::with_margins) with at most 0.75 in
/// to keep it inside.
///
/// The comparisons are strict on both sides, so a request that sits exactly on a threshold
/// (`width == 8` or `height == 9`) is returned unchanged even when the other extent is oversized.
pub fn image_bounds(requested: Inches) -> Inches {
    let Inches { width, height } = requested;
    if width > WIDTH_THRESHOLD_IN && height > HEIGHT_THRESHOLD_IN {
        Inches::new(CLAMPED_WIDTH_IN, CLAMPED_HEIGHT_IN)
    } else if width > WIDTH_THRESHOLD_IN && height < HEIGHT_THRESHOLD_IN {
        Inches::new(CLAMPED_WIDTH_IN, height)
    } else if width < WIDTH_THRESHOLD_IN && height > HEIGHT_THRESHOLD_IN {
        Inches::new(width, CLAMPED_HEIGHT_IN)
    } else {
        requested
    }
}

/// Shrinks `natural` uniformly so that it fits within `bounds`.
///
/// Sizes that already fit are returned as-is.
pub fn fit_within(natural: Inches, bounds: Inches) -> Inches {
    if natural.width <= bounds.width && natural.height <= bounds.height {
        return natural;
    }

    let factor = (bounds.width / natural.width).min(bounds.height / natural.height);
    Inches::new(natural.width * factor, natural.height * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Inches, expected: Inches) {
        assert!(
            (actual.width - expected.width).abs() < 1e-9
                && (actual.height - expected.height).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn oversized_in_both_directions_clamps_to_seven_by_eight() {
        assert_eq!(image_bounds(Inches::new(10.0, 10.0)), Inches::new(7.0, 8.0));
    }

    #[test]
    fn only_width_oversized_keeps_height() {
        assert_eq!(image_bounds(Inches::new(10.0, 5.0)), Inches::new(7.0, 5.0));
    }

    #[test]
    fn only_height_oversized_keeps_width() {
        assert_eq!(image_bounds(Inches::new(5.0, 10.0)), Inches::new(5.0, 8.0));
    }

    #[test]
    fn small_request_is_unchanged() {
        assert_eq!(image_bounds(Inches::new(5.0, 5.0)), Inches::new(5.0, 5.0));
    }

    #[test]
    fn exact_thresholds_fall_through_unchanged() {
        assert_eq!(image_bounds(Inches::new(10.0, 9.0)), Inches::new(10.0, 9.0));
        assert_eq!(image_bounds(Inches::new(8.0, 10.0)), Inches::new(8.0, 10.0));
        assert_eq!(image_bounds(Inches::new(8.0, 9.0)), Inches::new(8.0, 9.0));
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let fitted = fit_within(Inches::new(14.0, 7.0), Inches::new(7.0, 8.0));
        assert_close(fitted, Inches::new(7.0, 3.5));

        let fitted = fit_within(Inches::new(4.0, 16.0), Inches::new(7.0, 8.0));
        assert_close(fitted, Inches::new(2.0, 8.0));
    }

    #[test]
    fn fit_within_never_enlarges() {
        let natural = Inches::new(1.0, 2.0);
        assert_eq!(fit_within(natural, Inches::new(7.0, 8.0)), natural);
    }

    #[test]
    fn natural_size_uses_dpi() {
        assert_close(
            Inches::from_pixels(144, 72, NATURAL_DPI),
            Inches::new(2.0, 1.0),
        );
    }

    #[test]
    fn drawable_rejects_degenerate_sizes() {
        assert!(Inches::new(1.0, 1.0).is_drawable());
        assert!(!Inches::new(0.0, 1.0).is_drawable());
        assert!(!Inches::new(1.0, -2.0).is_drawable());
        assert!(!Inches::new(f64::NAN, 1.0).is_drawable());
        assert!(!Inches::new(1.0, f64::INFINITY).is_drawable());
    }
}
