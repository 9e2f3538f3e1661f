//! Flowable reports: append text, lists, spacers and images to a story and render it into a
//! paginated PDF with a title page and running page numbers.

pub mod builder;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod page;
pub mod report;
pub mod richtext;
pub mod sizing;
pub mod story;

pub use builder::DocumentBuilder;
pub use error::ReportError;
pub use report::{RenderedReport, ReportBuilder};
pub use story::{Flowable, ListValue, Story};
