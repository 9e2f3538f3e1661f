//! Conversion of story flowables into `genpdf` elements.
//!
//! Also hosts the image decoding helpers used when images are appended, and a fixed-height
//! spacer element that `genpdf` does not ship with.

use std::path::Path;

use image::GenericImageView;
use log::warn;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Element, Mm, RenderResult, Scale, Size};

use crate::sizing::{Inches, MM_PER_INCH};
use crate::story::{Flowable, ImageFlowable};

/// Resolution `genpdf` assumes for images without an explicit DPI.
const GENPDF_IMAGE_DPI: f64 = 300.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Converts a length in inches to the layout engine's unit.
pub fn inches(value: f64) -> Mm {
    mm_from_f64(value * MM_PER_INCH)
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Loads an image from the given path, guessing the format from its contents.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Loads an image from in-memory bytes.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Drops any alpha channel so the PDF backend can embed the pixels.
pub(crate) fn flatten_to_rgb(image: image::DynamicImage) -> image::DynamicImage {
    match image {
        image::DynamicImage::ImageRgb8(_) => image,
        other => image::DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Pixel dimensions of a decoded image.
pub(crate) fn pixel_dimensions(image: &image::DynamicImage) -> (u32, u32) {
    image.dimensions()
}

/// Vertical whitespace of a fixed height.
///
/// Near the bottom of a page the space is truncated to what is left rather than pushed to the
/// next page.
#[derive(Clone, Copy, Debug)]
pub struct VerticalSpace {
    height: Mm,
}

impl VerticalSpace {
    /// Creates a spacer of the given height.
    pub fn new(height: impl Into<Mm>) -> Self {
        Self {
            height: height.into(),
        }
    }

    /// Creates a spacer measured in inches.
    pub fn inches(height: f64) -> Self {
        Self::new(inches(height))
    }
}

impl Element for VerticalSpace {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let available = area.size().height;
        let height = if self.height > available {
            available
        } else {
            self.height
        };

        let mut result = RenderResult::default();
        result.size = Size::new(0, height);
        Ok(result)
    }
}

/// Builds the `genpdf` image for an image flowable, scaled to its resolved size.
pub fn image_element(flowable: &ImageFlowable) -> Result<Image, Error> {
    let (width_px, _) = pixel_dimensions(flowable.image());
    let mut image = Image::from_dynamic_image(flowable.image().clone())?;

    let native = Inches::from_pixels(width_px, 1, GENPDF_IMAGE_DPI);
    let scale = if native.width > f64::EPSILON {
        flowable.size().width / native.width
    } else {
        1.0
    };

    image.set_scale(Scale::new(scale, scale));
    Ok(image)
}

/// An image that moves to the next page when it does not fit below the current content.
///
/// `genpdf` images draw wherever they are placed, so the remaining height is checked here.  An
/// image is deferred at most once; if it still does not fit on the following page it is drawn
/// anyway.
pub struct PagedImage {
    image: Image,
    height: Mm,
    deferred: bool,
}

impl PagedImage {
    /// Wraps an image flowable.
    pub fn new(flowable: &ImageFlowable) -> Result<Self, Error> {
        Ok(Self {
            image: image_element(flowable)?,
            height: inches(flowable.size().height),
            deferred: false,
        })
    }
}

impl Element for PagedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        if self.height > area.size().height {
            if !self.deferred {
                self.deferred = true;
                let mut result = RenderResult::default();
                result.has_more = true;
                return Ok(result);
            }
            warn!("Image is taller than a full page and will be clipped");
        }
        self.image.render(context, area, style)
    }
}

/// A story flowable converted into a `genpdf` element.
pub enum StoryElement {
    /// A text paragraph.
    Paragraph(Paragraph),
    /// Fixed vertical whitespace.
    Space(VerticalSpace),
    /// An image that moves to the next page when needed.
    Image(PagedImage),
}

impl StoryElement {
    /// Converts a flowable into the element that lays it out.
    pub fn from_flowable(flowable: &Flowable) -> Result<Self, Error> {
        Ok(match flowable {
            Flowable::Paragraph(spans) => {
                let mut paragraph = Paragraph::default();
                for span in spans {
                    paragraph.push(span.to_styled_string());
                }
                Self::Paragraph(paragraph)
            }
            Flowable::Spacer(height) => Self::Space(VerticalSpace::inches(*height)),
            Flowable::Image(image) => Self::Image(PagedImage::new(image)?),
        })
    }
}

impl Element for StoryElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        match self {
            Self::Paragraph(paragraph) => paragraph.render(context, area, style),
            Self::Space(space) => space.render(context, area, style),
            Self::Image(image) => image.render(context, area, style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetre_conversions_round_trip() {
        assert!((mm_to_f64(mm_from_f64(2.54)) - 2.54).abs() < 1e-9);
    }

    #[test]
    fn spacer_height_is_in_inches() {
        let spacer = VerticalSpace::inches(0.1);
        assert!((mm_to_f64(spacer.height) - 2.54).abs() < 1e-9);
    }

    #[test]
    fn alpha_is_flattened() {
        let rgba = image::DynamicImage::ImageRgba8(image::RgbaImage::new(3, 2));
        let flattened = flatten_to_rgb(rgba);
        assert!(matches!(flattened, image::DynamicImage::ImageRgb8(_)));
        assert_eq!(pixel_dimensions(&flattened), (3, 2));
    }

    #[test]
    fn paragraphs_and_spacers_convert_without_fonts() {
        assert!(matches!(
            StoryElement::from_flowable(&Flowable::paragraph("text")),
            Ok(StoryElement::Paragraph(_))
        ));
        assert!(matches!(
            StoryElement::from_flowable(&Flowable::Spacer(0.1)),
            Ok(StoryElement::Space(_))
        ));
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        assert!(decode_image_from_bytes(b"definitely not an image").is_err());
    }
}
