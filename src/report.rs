//! The report builder: an append-only story rendered into a paginated PDF.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use image::DynamicImage;
use log::{debug, info, warn};

use crate::builder::{DocumentBuilder, ReportDecorator};
use crate::elements::{self, flatten_to_rgb, pixel_dimensions, StoryElement};
use crate::error::ReportError;
use crate::page::{self, PageDecoration};
use crate::richtext::parse_markup;
use crate::sizing::{fit_within, image_bounds, Inches, NATURAL_DPI};
use crate::story::{Flowable, ImageFlowable, ListValue, Story};

/// Line appended by [`ReportBuilder::print_list`] when the input is not a list of rows.
pub const LIST_DIAGNOSTIC: &str = "Object needs to be of type list";

/// Line appended by [`ReportBuilder::print_image`] when the image cannot be used.
pub const IMAGE_DIAGNOSTIC: &str = "The image did not print";

/// Height of each blank region around the spacer rule, in inches.
pub const SPACER_HEIGHT_IN: f64 = 0.1;

const RULE_LENGTH: usize = 122;

/// The dash rule drawn between the two blank regions of a spacer.
pub fn rule_text() -> String {
    "-".repeat(RULE_LENGTH)
}

/// A rendered report held in memory.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    /// The encoded PDF document.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// Accumulates flowables and renders them into a PDF with a title page and page numbers.
///
/// Every `print_*` method appends to the story and never removes or reorders what is already
/// there.  `print_list` and `print_image` do not fail: malformed input is replaced by a
/// diagnostic line so a report is still produced.
///
/// Rendering consumes the builder, so a report is generated at most once and nothing can be
/// appended afterwards.
///
/// ```no_run
/// use flowable_report::ReportBuilder;
///
/// let mut report = ReportBuilder::new("weekly.pdf", "Weekly Report", "Build Farm");
/// report
///     .print_line("All agents healthy.")
///     .print_spacer()
///     .print_list(vec![vec!["agent-01", "ok"], vec!["agent-02", "ok"]])
///     .print_image("load.png", 6.0, 4.0);
/// report.generate()?;
/// # Ok::<(), flowable_report::ReportError>(())
/// ```
pub struct ReportBuilder {
    path: PathBuf,
    title: String,
    secondary_title: String,
    story: Story,
    document: DocumentBuilder,
    first_page: PageDecoration,
    later_pages: PageDecoration,
}

impl ReportBuilder {
    /// Creates a builder that will write to `path` with the given cover titles.
    pub fn new(
        path: impl Into<PathBuf>,
        title: impl Into<String>,
        secondary_title: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            secondary_title: secondary_title.into(),
            story: Story::new(),
            document: DocumentBuilder::default(),
            first_page: page::first_page,
            later_pages: page::later_page,
        }
    }

    /// Replaces the page and typography settings.
    pub fn with_document(mut self, document: DocumentBuilder) -> Self {
        self.document = document;
        self
    }

    /// Replaces the decorations drawn on the first page and on every later page.
    pub fn with_page_decorations(mut self, first: PageDecoration, later: PageDecoration) -> Self {
        self.first_page = first;
        self.later_pages = later;
        self
    }

    /// Output path used by [`generate`](Self::generate).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Title drawn on the first page.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Secondary title drawn below the title on the first page.
    pub fn secondary_title(&self) -> &str {
        &self.secondary_title
    }

    /// The flowables appended so far.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Appends a blank region, a dash rule and another blank region.
    pub fn print_spacer(&mut self) -> &mut Self {
        self.story.push(Flowable::Spacer(SPACER_HEIGHT_IN));
        self.story.push(Flowable::paragraph(rule_text()));
        self.story.push(Flowable::Spacer(SPACER_HEIGHT_IN));
        self
    }

    /// Appends one paragraph of plain text.
    pub fn print_line(&mut self, text: impl Into<String>) -> &mut Self {
        self.story.push(Flowable::paragraph(text));
        self
    }

    /// Appends one paragraph parsed from inline markup.
    ///
    /// See [`crate::richtext`] for the supported tags.  Malformed markup is rejected and nothing
    /// is appended.
    pub fn print_markup(&mut self, text: &str) -> Result<&mut Self, ReportError> {
        let spans = parse_markup(text)?;
        self.story.push(Flowable::Paragraph(spans));
        Ok(self)
    }

    /// Appends the first entry of every row as its own paragraph.
    ///
    /// If `rows` is not a list of rows the call appends [`LIST_DIAGNOSTIC`] instead of any
    /// row.  Empty rows are skipped.
    pub fn print_list(&mut self, rows: impl Into<ListValue>) -> &mut Self {
        match rows.into().first_entries() {
            Ok(rows) => {
                for index in &rows.empty_rows {
                    warn!("Skipping empty list row {}", index);
                }
                debug!("Appending {} list rows", rows.lines.len());
                self.story
                    .extend(rows.lines.into_iter().map(Flowable::paragraph));
            }
            Err(err) => {
                warn!("List could not be printed: {}", err);
                self.story.push(Flowable::paragraph(LIST_DIAGNOSTIC));
            }
        }
        self
    }

    /// Appends the image at `path`, sized from the requested `width` and `height` in inches.
    ///
    /// Requests wider than 8 in or taller than 9 in are clamped (see [`crate::sizing`]) and the
    /// image is shrunk to fit the result.  Unreadable images and non-positive sizes append
    /// [`IMAGE_DIAGNOSTIC`] instead.
    pub fn print_image(&mut self, path: impl AsRef<Path>, width: f64, height: f64) -> &mut Self {
        let path = path.as_ref();
        let decoded = elements::decode_image_from_path(path);
        self.push_image(decoded, Inches::new(width, height), &path.display().to_string())
    }

    /// Same as [`print_image`](Self::print_image) for encoded image data held in memory.
    pub fn print_image_bytes(
        &mut self,
        bytes: impl AsRef<[u8]>,
        width: f64,
        height: f64,
    ) -> &mut Self {
        let decoded = elements::decode_image_from_bytes(bytes);
        self.push_image(decoded, Inches::new(width, height), "in-memory image")
    }

    fn push_image(
        &mut self,
        decoded: Result<DynamicImage, Error>,
        requested: Inches,
        source: &str,
    ) -> &mut Self {
        match decoded.and_then(|image| resolve_image(image, requested)) {
            Ok(image) => {
                debug!(
                    "Appending image {} at {:.2}x{:.2} in",
                    source,
                    image.size().width,
                    image.size().height
                );
                self.story.push(Flowable::Image(image));
            }
            Err(err) => {
                warn!("Image {} did not print: {}", source, err);
                self.story.push(Flowable::paragraph(IMAGE_DIAGNOSTIC));
            }
        }
        self
    }

    /// Lays out the story and returns the encoded document without touching the file system.
    pub fn render(self) -> Result<RenderedReport, ReportError> {
        let Self {
            title,
            secondary_title,
            story,
            document,
            first_page,
            later_pages,
            ..
        } = self;

        let decorator = ReportDecorator::new(title.as_str(), secondary_title, first_page, later_pages);
        let pages = decorator.page_counter();
        let mut document = document
            .build(&title, decorator)
            .map_err(ReportError::FontLoad)?;

        for flowable in &story {
            document.push(StoryElement::from_flowable(flowable).map_err(ReportError::Render)?);
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(ReportError::Render)?;

        Ok(RenderedReport {
            bytes,
            page_count: pages.get(),
        })
    }

    /// Renders the report and writes it to `writer`.
    pub fn generate_to<W: Write>(self, mut writer: W) -> Result<RenderedReport, ReportError> {
        let rendered = self.render()?;
        writer
            .write_all(&rendered.bytes)
            .and_then(|_| writer.flush())
            .map_err(|err| ReportError::io(None, err))?;
        Ok(rendered)
    }

    /// Renders the report and writes it to the configured path.
    pub fn generate(self) -> Result<(), ReportError> {
        let path = self.path.clone();
        let rendered = self.render()?;
        fs::write(&path, &rendered.bytes).map_err(|err| ReportError::io(Some(path.clone()), err))?;
        info!(
            "Generated {} ({} pages, {} bytes)",
            path.display(),
            rendered.page_count,
            rendered.bytes.len()
        );
        Ok(())
    }
}

fn resolve_image(image: DynamicImage, requested: Inches) -> Result<ImageFlowable, Error> {
    if !requested.is_drawable() {
        return Err(Error::new(
            format!(
                "Requested size {}x{} in is not drawable",
                requested.width, requested.height
            ),
            ErrorKind::InvalidData,
        ));
    }

    let image = flatten_to_rgb(image);
    let (width_px, height_px) = pixel_dimensions(&image);
    if width_px == 0 || height_px == 0 {
        return Err(Error::new("Image has no pixels", ErrorKind::InvalidData));
    }

    let bounds = image_bounds(requested);
    let natural = Inches::from_pixels(width_px, height_px, NATURAL_DPI);
    let size = fit_within(natural, bounds);
    Ok(ImageFlowable::new(image, requested, bounds, size))
}
