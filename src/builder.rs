//! Document construction: page settings and the page decorator used during generation.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::style;
use genpdf::{self, Margins, PageDecorator, Size};

#[cfg(feature = "hyphenation")]
use genpdf::hyphenation;

use crate::elements::{inches, mm_to_f64};
use crate::fonts;
use crate::sizing::MM_PER_INCH;
use crate::page::{self, AreaSurface, PageDecoration, PageInfo};

const LETTER_WIDTH_IN: f64 = 8.5;
const LETTER_HEIGHT_IN: f64 = 11.0;
const DEFAULT_MARGIN_IN: f64 = 1.0;
const DEFAULT_FONT_SIZE: u8 = 10;
const DEFAULT_LINE_SPACING: f64 = 1.2;

/// Page and typography settings for generated reports.
///
/// Defaults to US Letter paper, one inch margins and 10 pt body text, which leaves a 6.5 in
/// wide content area.  Images clamped to 7 in (see [`crate::sizing::image_bounds`]) are wider
/// than that and run into the right margin unless the margins are narrowed.
pub struct DocumentBuilder {
    paper_size: Size,
    margin_in: f64,
    font_size: u8,
    line_spacing: f64,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<hyphenation::Standard>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            paper_size: Size::new(inches(LETTER_WIDTH_IN), inches(LETTER_HEIGHT_IN)),
            margin_in: DEFAULT_MARGIN_IN,
            font_size: DEFAULT_FONT_SIZE,
            line_spacing: DEFAULT_LINE_SPACING,
            #[cfg(feature = "hyphenation")]
            hyphenator: None,
        }
    }
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Sets the margin on every side of the story, in inches.
    pub fn with_margins(mut self, margin_in: f64) -> Self {
        self.margin_in = margin_in;
        self
    }

    /// Width left for the story between the left and right margins, in inches.
    pub fn content_width_in(&self) -> f64 {
        mm_to_f64(self.paper_size.width) / MM_PER_INCH - 2.0 * self.margin_in
    }

    fn margins(&self) -> Margins {
        let margin = inches(self.margin_in);
        Margins::trbl(margin, margin, margin, margin)
    }

    /// Sets the body font size in points.
    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the line spacing factor for body text.
    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Enables hyphenation using the provided dictionary.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: hyphenation::Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Builds a `genpdf::Document` with the default fonts and the given decorator installed.
    pub fn build(
        self,
        title: &str,
        decorator: ReportDecorator,
    ) -> Result<genpdf::Document, Error> {
        let font_family = fonts::default_font_family()?;
        let mut document = genpdf::Document::new(font_family);

        document.set_title(title);
        document.set_paper_size(self.paper_size);
        document.set_font_size(self.font_size);
        document.set_line_spacing(self.line_spacing);
        document.set_page_decorator(decorator.with_margins(self.margins()));

        #[cfg(feature = "hyphenation")]
        if let Some(hyphenator) = self.hyphenator {
            document.set_hyphenator(hyphenator);
        }

        Ok(document)
    }
}

/// Page decorator that dispatches to the first-page and later-page decorations.
///
/// The number of decorated pages is shared through a counter handle so it can be read after the
/// document has been rendered.
pub struct ReportDecorator {
    page: usize,
    title: String,
    secondary_title: String,
    first: PageDecoration,
    later: PageDecoration,
    margins: Option<Margins>,
    pages: Rc<Cell<usize>>,
}

impl ReportDecorator {
    /// Creates a decorator drawing the given titles with the supplied decorations.
    pub fn new(
        title: impl Into<String>,
        secondary_title: impl Into<String>,
        first: PageDecoration,
        later: PageDecoration,
    ) -> Self {
        Self {
            page: 0,
            title: title.into(),
            secondary_title: secondary_title.into(),
            first,
            later,
            margins: None,
            pages: Rc::new(Cell::new(0)),
        }
    }

    /// Creates a decorator with the standard title page and page labels.
    pub fn standard(title: impl Into<String>, secondary_title: impl Into<String>) -> Self {
        Self::new(title, secondary_title, page::first_page, page::later_page)
    }

    fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = Some(margins);
        self
    }

    /// Handle reporting how many pages have been decorated so far.
    pub fn page_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.pages)
    }
}

impl PageDecorator for ReportDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        self.pages.set(self.page);

        let info = PageInfo {
            number: self.page,
            title: &self.title,
            secondary_title: &self.secondary_title,
        };
        let decoration = if self.page == 1 { self.first } else { self.later };
        decoration(&mut AreaSurface::new(context, &area), &info)?;

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_letter_with_inch_margins() {
        let builder = DocumentBuilder::new();
        assert!((mm_to_f64(builder.paper_size.width) - 215.9).abs() < 1e-9);
        assert!((mm_to_f64(builder.paper_size.height) - 279.4).abs() < 1e-9);
        assert!((builder.margin_in - 1.0).abs() < f64::EPSILON);
        assert!((builder.content_width_in() - 6.5).abs() < 1e-9);
        assert_eq!(builder.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn settings_are_overridable() {
        let builder = DocumentBuilder::new()
            .with_paper_size(genpdf::PaperSize::A4)
            .with_margins(0.5)
            .with_font_size(12)
            .with_line_spacing(1.5);
        assert!((mm_to_f64(builder.paper_size.width) - 210.0).abs() < 0.5);
        assert!((builder.margin_in - 0.5).abs() < f64::EPSILON);
        assert_eq!(builder.font_size, 12);
        assert!((builder.line_spacing - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn narrow_margins_make_room_for_clamped_images() {
        let default_width = DocumentBuilder::new().content_width_in();
        assert!(default_width < crate::sizing::CLAMPED_WIDTH_IN);

        let narrow = DocumentBuilder::new().with_margins(0.75);
        assert!(narrow.content_width_in() >= crate::sizing::CLAMPED_WIDTH_IN - 1e-9);
    }

    #[test]
    fn page_counter_starts_at_zero() {
        let decorator = ReportDecorator::standard("T", "S");
        assert_eq!(decorator.page_counter().get(), 0);
    }
}
