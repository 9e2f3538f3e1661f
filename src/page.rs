//! Page decorations: the fixed chrome drawn on every page independently of the story.
//!
//! A decoration is a plain function receiving a [`PageSurface`] and the [`PageInfo`] of the page
//! being decorated.  The first page carries the centered titles; every page carries a
//! `Page {N}` label in the bottom-left margin.

use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{render, Mm, Position, Size};
use log::warn;

use crate::elements::inches;

const TITLE_TOP_IN: f64 = 0.3;
const SECONDARY_TITLE_TOP_IN: f64 = 0.7;
const LABEL_LEFT_IN: f64 = 1.0;
const LABEL_BASELINE_IN: f64 = 0.75;

const TITLE_FONT_SIZE: u8 = 18;
const SECONDARY_TITLE_FONT_SIZE: u8 = 16;
const FIRST_PAGE_LABEL_FONT_SIZE: u8 = 9;
const LATER_PAGE_LABEL_FONT_SIZE: u8 = 8;

/// Signature shared by the first-page and later-page decorations.
pub type PageDecoration = fn(&mut dyn PageSurface, &PageInfo<'_>) -> Result<(), Error>;

/// What a decoration knows about the page it draws on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo<'a> {
    /// 1-based page number.
    pub number: usize,
    /// Report title.
    pub title: &'a str,
    /// Report secondary title.
    pub secondary_title: &'a str,
}

/// Minimal drawing interface handed to page decorations.
pub trait PageSurface {
    /// Full page size, margins included.
    fn size(&self) -> Size;

    /// Height of one line of text in `style`.
    fn line_height(&self, style: Style) -> Mm;

    /// Width of `text` in `style`.
    fn text_width(&self, style: Style, text: &str) -> Mm;

    /// Draws `text` with its line box's top-left corner at `position`.
    fn draw_text(&mut self, position: Position, style: Style, text: &str) -> Result<(), Error>;
}

fn text_style(font_size: u8, bold: bool) -> Style {
    let mut style = Style::new();
    style.set_font_size(font_size);
    if bold {
        style.set_bold();
    }
    style
}

/// Draws `text` horizontally centered on the page with its line box starting at `top`.
pub fn draw_centered(
    surface: &mut dyn PageSurface,
    top: Mm,
    style: Style,
    text: &str,
) -> Result<(), Error> {
    if text.is_empty() {
        return Ok(());
    }
    let width = surface.text_width(style, text);
    let x = (surface.size().width - width) / 2.0;
    surface.draw_text(Position::new(x, top), style, text)
}

/// Draws `text` in the bottom-left margin.
pub fn draw_page_label(
    surface: &mut dyn PageSurface,
    style: Style,
    text: &str,
) -> Result<(), Error> {
    let top = surface.size().height - inches(LABEL_BASELINE_IN) - surface.line_height(style);
    surface.draw_text(Position::new(inches(LABEL_LEFT_IN), top), style, text)
}

/// Decoration for the first page: title, secondary title and a `Page 1` label.
pub fn first_page(surface: &mut dyn PageSurface, page: &PageInfo<'_>) -> Result<(), Error> {
    draw_centered(
        surface,
        inches(TITLE_TOP_IN),
        text_style(TITLE_FONT_SIZE, true),
        page.title,
    )?;
    draw_centered(
        surface,
        inches(SECONDARY_TITLE_TOP_IN),
        text_style(SECONDARY_TITLE_FONT_SIZE, true),
        page.secondary_title,
    )?;
    draw_page_label(
        surface,
        text_style(FIRST_PAGE_LABEL_FONT_SIZE, false),
        "Page 1",
    )
}

/// Decoration for every page after the first: a `Page {N}` label.
pub fn later_page(surface: &mut dyn PageSurface, page: &PageInfo<'_>) -> Result<(), Error> {
    draw_page_label(
        surface,
        text_style(LATER_PAGE_LABEL_FONT_SIZE, true),
        &format!("Page {}", page.number),
    )
}

/// [`PageSurface`] backed by a `genpdf` render area.
pub(crate) struct AreaSurface<'c, 'a, 'p> {
    context: &'c genpdf::Context,
    area: &'a render::Area<'p>,
}

impl<'c, 'a, 'p> AreaSurface<'c, 'a, 'p> {
    pub(crate) fn new(context: &'c genpdf::Context, area: &'a render::Area<'p>) -> Self {
        Self { context, area }
    }
}

impl PageSurface for AreaSurface<'_, '_, '_> {
    fn size(&self) -> Size {
        self.area.size()
    }

    fn line_height(&self, style: Style) -> Mm {
        style.line_height(&self.context.font_cache)
    }

    fn text_width(&self, style: Style, text: &str) -> Mm {
        style.str_width(&self.context.font_cache, text)
    }

    fn draw_text(&mut self, position: Position, style: Style, text: &str) -> Result<(), Error> {
        let printed = self
            .area
            .print_str(&self.context.font_cache, position, style, text)?;
        if !printed {
            warn!("Page decoration text {:?} does not fit on the page", text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{mm_from_f64, mm_to_f64};

    const LINE_HEIGHT_MM: f64 = 5.0;
    const CHAR_WIDTH_MM: f64 = 2.0;

    #[derive(Default)]
    struct RecordingSurface {
        drawn: Vec<(f64, f64, Style, String)>,
    }

    impl RecordingSurface {
        fn texts(&self) -> Vec<&str> {
            self.drawn.iter().map(|(_, _, _, text)| text.as_str()).collect()
        }
    }

    impl PageSurface for RecordingSurface {
        fn size(&self) -> Size {
            Size::new(mm_from_f64(215.9), mm_from_f64(279.4))
        }

        fn line_height(&self, _style: Style) -> Mm {
            mm_from_f64(LINE_HEIGHT_MM)
        }

        fn text_width(&self, _style: Style, text: &str) -> Mm {
            mm_from_f64(CHAR_WIDTH_MM * text.chars().count() as f64)
        }

        fn draw_text(&mut self, position: Position, style: Style, text: &str) -> Result<(), Error> {
            self.drawn.push((
                mm_to_f64(position.x),
                mm_to_f64(position.y),
                style,
                text.to_owned(),
            ));
            Ok(())
        }
    }

    fn page(number: usize) -> PageInfo<'static> {
        PageInfo {
            number,
            title: "T",
            secondary_title: "S",
        }
    }

    #[test]
    fn first_page_draws_titles_and_label() {
        let mut surface = RecordingSurface::default();
        first_page(&mut surface, &page(1)).expect("decoration succeeds");

        assert_eq!(surface.texts(), vec!["T", "S", "Page 1"]);

        let (title_x, title_y, title_style, _) = &surface.drawn[0];
        assert!((title_x - (215.9 - CHAR_WIDTH_MM) / 2.0).abs() < 1e-9);
        assert!(title_style.is_bold());
        assert_eq!(title_style.font_size(), TITLE_FONT_SIZE);

        let (_, secondary_y, secondary_style, _) = &surface.drawn[1];
        assert!(secondary_y > title_y);
        assert_eq!(secondary_style.font_size(), SECONDARY_TITLE_FONT_SIZE);
    }

    #[test]
    fn page_label_sits_in_bottom_left_margin() {
        let mut surface = RecordingSurface::default();
        first_page(&mut surface, &page(1)).expect("decoration succeeds");

        let (x, y, style, _) = &surface.drawn[2];
        assert!((x - 25.4).abs() < 1e-9);
        assert!((y - (279.4 - 0.75 * 25.4 - LINE_HEIGHT_MM)).abs() < 1e-9);
        assert!(!style.is_bold());
    }

    #[test]
    fn later_pages_only_draw_their_number() {
        for number in 2..=5 {
            let mut surface = RecordingSurface::default();
            later_page(&mut surface, &page(number)).expect("decoration succeeds");
            assert_eq!(surface.texts(), vec![format!("Page {number}").as_str()]);
            assert_eq!(surface.drawn[0].2.font_size(), LATER_PAGE_LABEL_FONT_SIZE);
        }
    }

    #[test]
    fn empty_titles_are_left_blank() {
        let mut surface = RecordingSurface::default();
        let info = PageInfo {
            number: 1,
            title: "",
            secondary_title: "",
        };
        first_page(&mut surface, &info).expect("decoration succeeds");
        assert_eq!(surface.texts(), vec!["Page 1"]);
    }
}
