//! Error type returned by report operations that can fail.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::richtext::ParseError;

/// Errors surfaced to callers of [`ReportBuilder`](crate::report::ReportBuilder).
///
/// Content problems in `print_list` and `print_image` never show up here; those
/// operations degrade to a diagnostic line in the story instead.
#[derive(Debug)]
pub enum ReportError {
    /// No usable font family could be loaded.
    FontLoad(genpdf::error::Error),
    /// The layout engine failed while paginating or encoding the document.
    Render(genpdf::error::Error),
    /// The rendered document could not be written to its destination.
    Io {
        /// Destination that failed, if the output went to a file.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Caller supplied text that could not be interpreted.
    InvalidInput(ParseError),
}

impl ReportError {
    pub(crate) fn io(path: Option<PathBuf>, source: io::Error) -> Self {
        Self::Io { path, source }
    }
}

impl From<ParseError> for ReportError {
    fn from(err: ParseError) -> Self {
        Self::InvalidInput(err)
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(err) => write!(f, "Failed to load report fonts: {err}"),
            Self::Render(err) => write!(f, "Failed to render report: {err}"),
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "Failed to write report to {}: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "Failed to write report: {source}"),
            Self::InvalidInput(err) => write!(f, "Invalid report input: {err}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::InvalidInput(err) => Some(err),
        }
    }
}
