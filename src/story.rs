//! The story: the ordered sequence of flowables making up a report body.
//!
//! Flowables are plain values.  They only turn into `genpdf` elements when the report is
//! generated, which keeps the story inspectable and lets every append be checked without fonts.

use image::{DynamicImage, GenericImageView};

use crate::richtext::{self, Span};
use crate::sizing::Inches;

/// One renderable unit of report content.
#[derive(Clone, Debug)]
pub enum Flowable {
    /// A paragraph of styled text in the body style.
    Paragraph(Vec<Span>),
    /// Fixed vertical whitespace, in inches.
    Spacer(f64),
    /// A decoded image with its resolved size.
    Image(ImageFlowable),
}

impl Flowable {
    /// Creates an unstyled paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![Span::new(text)])
    }

    /// Returns the paragraph text with styling removed, or `None` for other flowables.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Paragraph(spans) => Some(richtext::plain_text(spans)),
            Self::Spacer(_) | Self::Image(_) => None,
        }
    }

    /// Returns `true` for paragraphs.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph(_))
    }

    /// Returns `true` for spacers.
    pub fn is_spacer(&self) -> bool {
        matches!(self, Self::Spacer(_))
    }

    /// Returns the image payload, if this is an image.
    pub fn as_image(&self) -> Option<&ImageFlowable> {
        match self {
            Self::Image(image) => Some(image),
            Self::Paragraph(_) | Self::Spacer(_) => None,
        }
    }
}

/// An image ready for layout.
#[derive(Clone)]
pub struct ImageFlowable {
    image: DynamicImage,
    requested: Inches,
    bounds: Inches,
    size: Inches,
}

impl ImageFlowable {
    pub(crate) fn new(image: DynamicImage, requested: Inches, bounds: Inches, size: Inches) -> Self {
        Self {
            image,
            requested,
            bounds,
            size,
        }
    }

    /// The decoded pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The size the caller asked for.
    pub fn requested(&self) -> Inches {
        self.requested
    }

    /// The bounds after applying the clamping table.
    pub fn bounds(&self) -> Inches {
        self.bounds
    }

    /// The size the image is drawn at.
    pub fn size(&self) -> Inches {
        self.size
    }
}

impl std::fmt::Debug for ImageFlowable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.image.dimensions();
        f.debug_struct("ImageFlowable")
            .field("pixels", &format_args!("{width}x{height}"))
            .field("requested", &self.requested)
            .field("bounds", &self.bounds)
            .field("size", &self.size)
            .finish()
    }
}

/// Ordered, append-only sequence of flowables.
#[derive(Clone, Debug, Default)]
pub struct Story {
    flowables: Vec<Flowable>,
}

impl Story {
    /// Creates an empty story.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a flowable at the end.
    pub fn push(&mut self, flowable: Flowable) {
        self.flowables.push(flowable);
    }

    /// Number of flowables.
    pub fn len(&self) -> usize {
        self.flowables.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.flowables.is_empty()
    }

    /// Flowables in append order.
    pub fn flowables(&self) -> &[Flowable] {
        &self.flowables
    }

    /// Iterates over the flowables in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Flowable> {
        self.flowables.iter()
    }
}

impl Extend<Flowable> for Story {
    fn extend<I: IntoIterator<Item = Flowable>>(&mut self, iter: I) {
        self.flowables.extend(iter);
    }
}

impl IntoIterator for Story {
    type Item = Flowable;
    type IntoIter = std::vec::IntoIter<Flowable>;

    fn into_iter(self) -> Self::IntoIter {
        self.flowables.into_iter()
    }
}

impl<'a> IntoIterator for &'a Story {
    type Item = &'a Flowable;
    type IntoIter = std::slice::Iter<'a, Flowable>;

    fn into_iter(self) -> Self::IntoIter {
        self.flowables.iter()
    }
}

/// Loosely shaped input accepted by [`ReportBuilder::print_list`](crate::report::ReportBuilder::print_list).
///
/// Lists are expected to be a list of rows, each row a list whose first entry is text.  Other
/// shapes are representable so that the caller can hand over whatever it has and let the report
/// degrade gracefully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListValue {
    /// A scalar text value.
    Text(String),
    /// A list of values.
    Items(Vec<ListValue>),
}

/// Why a [`ListValue`] could not be read as rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShapeError {
    NotAList,
    RowNotAList(usize),
    NestedFirstEntry(usize),
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAList => write!(f, "value is not a list"),
            Self::RowNotAList(row) => write!(f, "row {row} is not a list"),
            Self::NestedFirstEntry(row) => write!(f, "first entry of row {row} is not text"),
        }
    }
}

/// Result of reading a [`ListValue`] as rows.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Rows {
    pub(crate) lines: Vec<String>,
    pub(crate) empty_rows: Vec<usize>,
}

impl ListValue {
    /// Reads the first entry of every row, validating the whole value before anything is used.
    pub(crate) fn first_entries(&self) -> Result<Rows, ShapeError> {
        let Self::Items(rows) = self else {
            return Err(ShapeError::NotAList);
        };

        let mut result = Rows::default();
        for (index, row) in rows.iter().enumerate() {
            let Self::Items(cells) = row else {
                return Err(ShapeError::RowNotAList(index));
            };
            match cells.first() {
                Some(Self::Text(text)) => result.lines.push(text.clone()),
                Some(Self::Items(_)) => return Err(ShapeError::NestedFirstEntry(index)),
                None => result.empty_rows.push(index),
            }
        }
        Ok(result)
    }
}

impl From<&str> for ListValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ListValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ListValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl<T: Into<ListValue>> From<Vec<T>> for ListValue {
    fn from(values: Vec<T>) -> Self {
        Self::Items(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ListValue>, const N: usize> From<[T; N]> for ListValue {
    fn from(values: [T; N]) -> Self {
        Self::Items(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ListValue>> FromIterator<T> for ListValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Items(iter.into_iter().map(Into::into).collect())
    }
}
