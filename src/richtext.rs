//! Inline markup for report paragraphs.
//!
//! Paragraph text may carry a small tag vocabulary:
//!
//! - `<b>bold</b>` and `<i>italic</i>`
//! - `<font color="#RRGGBB">colored</font>`
//! - the entities `&amp;`, `&lt;`, `&gt;` and `&quot;`
//!
//! [`parse_markup`] turns such text into [`Span`]s, which convert into `genpdf`
//! [`StyledString`]s when the story is laid out.

use std::fmt;

use genpdf::style::{Color, Style, StyledString};

/// A run of text sharing one set of inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Assigns a color to the span.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span into a styled string for `genpdf` paragraphs.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// Concatenates the text of all spans, dropping style information.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Error produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte offset in the input where the problem was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl StyleState {
    fn to_span(self, text: String) -> Span {
        Span {
            text,
            bold: self.bold,
            italic: self.italic,
            color: self.color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Font,
}

impl Tag {
    fn closing(self) -> &'static str {
        match self {
            Tag::Bold => "</b>",
            Tag::Italic => "</i>",
            Tag::Font => "</font>",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Bold => "<b>",
            Tag::Italic => "<i>",
            Tag::Font => "<font>",
        }
    }
}

/// Parses paragraph markup into styled spans.
///
/// Tags must be properly nested.  Unknown tags, unknown entities, stray closing tags and
/// unterminated tags are rejected with the byte offset of the offending input.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    let (spans, _) = parse_inner(input, 0, StyleState::default(), None)?;
    Ok(spans)
}

fn parse_inner(
    input: &str,
    mut index: usize,
    state: StyleState,
    open: Option<Tag>,
) -> Result<(Vec<Span>, usize), ParseError> {
    let mut spans = Vec::new();
    let mut buffer = String::new();

    while let Some(ch) = input[index..].chars().next() {
        let rest = &input[index..];

        if let Some(tag) = open {
            if rest.starts_with(tag.closing()) {
                flush(&mut buffer, &mut spans, state);
                return Ok((spans, index + tag.closing().len()));
            }
        }

        let nested = if rest.starts_with("<b>") {
            Some((Tag::Bold, StyleState { bold: true, ..state }, index + 3))
        } else if rest.starts_with("<i>") {
            Some((Tag::Italic, StyleState { italic: true, ..state }, index + 3))
        } else if rest.starts_with("<font") {
            let (color, after) = parse_font_tag(input, index)?;
            let nested_state = StyleState {
                color: Some(color),
                ..state
            };
            Some((Tag::Font, nested_state, after))
        } else {
            None
        };

        if let Some((tag, nested_state, after)) = nested {
            flush(&mut buffer, &mut spans, state);
            let (inner, next) = parse_inner(input, after, nested_state, Some(tag))?;
            spans.extend(inner);
            index = next;
            continue;
        }

        if rest.starts_with("</") {
            return Err(ParseError::new(index, "unexpected closing tag"));
        }
        if ch == '<' {
            return Err(ParseError::new(
                index,
                "unsupported tag; expected <b>, <i> or <font color=\"#RRGGBB\">",
            ));
        }
        if ch == '&' {
            let (decoded, after) = parse_entity(input, index)?;
            buffer.push(decoded);
            index = after;
            continue;
        }

        buffer.push(ch);
        index += ch.len_utf8();
    }

    match open {
        Some(tag) => Err(ParseError::new(
            index,
            format!("unterminated {} tag", tag.name()),
        )),
        None => {
            flush(&mut buffer, &mut spans, state);
            Ok((spans, index))
        }
    }
}

fn flush(buffer: &mut String, spans: &mut Vec<Span>, state: StyleState) {
    if !buffer.is_empty() {
        spans.push(state.to_span(std::mem::take(buffer)));
    }
}

fn parse_entity(input: &str, index: usize) -> Result<(char, usize), ParseError> {
    const ENTITIES: &[(&str, char)] = &[("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>'), ("&quot;", '"')];

    ENTITIES
        .iter()
        .find(|(name, _)| input[index..].starts_with(name))
        .map(|(name, ch)| (*ch, index + name.len()))
        .ok_or_else(|| ParseError::new(index, "unknown entity; escape a literal `&` as `&amp;`"))
}

fn parse_font_tag(input: &str, index: usize) -> Result<(Color, usize), ParseError> {
    let close = input[index..]
        .find('>')
        .map(|offset| index + offset)
        .ok_or_else(|| ParseError::new(index, "unterminated <font> tag"))?;

    let attributes = input[index + "<font".len()..close].trim();
    let value = attributes
        .strip_prefix("color=")
        .ok_or_else(|| ParseError::new(index, "<font> requires a color attribute"))?;

    let hex = value
        .strip_prefix("\"#")
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix("'#").and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(|| ParseError::new(index, "expected a quoted color such as \"#RRGGBB\""))?;

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::new(
            index,
            "invalid RGB colour; use 6 hexadecimal digits",
        ));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| ParseError::new(index, "invalid RGB colour"))
    };

    Ok((
        Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?),
        close + 1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_style_reflects_flags() {
        let styled = Span::new("Hello")
            .bold()
            .italic()
            .colored(Color::Rgb(10, 20, 30))
            .to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn plain_text_is_a_single_span() {
        let spans = parse_markup("Quarterly totals").expect("parse succeeds");
        assert_eq!(spans, vec![Span::new("Quarterly totals")]);
    }

    #[test]
    fn nested_tags_combine_styles() {
        let spans = parse_markup("Status: <b>all <i>green</i></b>.").expect("parse succeeds");
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].text(), "Status: ");
        assert!(!spans[0].is_bold());
        assert_eq!(spans[1].text(), "all ");
        assert!(spans[1].is_bold() && !spans[1].is_italic());
        assert_eq!(spans[2].text(), "green");
        assert!(spans[2].is_bold() && spans[2].is_italic());
        assert_eq!(spans[3].text(), ".");
    }

    #[test]
    fn font_color_is_parsed() {
        let spans = parse_markup("<font color=\"#ff8000\">warn</font> ok").expect("parse succeeds");
        assert_eq!(spans[0].color(), Some(Color::Rgb(0xff, 0x80, 0x00)));
        assert_eq!(spans[1].text(), " ok");
        assert_eq!(spans[1].color(), None);
    }

    #[test]
    fn entities_are_decoded() {
        let spans = parse_markup("a &lt; b &amp;&amp; c &gt; d").expect("parse succeeds");
        assert_eq!(plain_text(&spans), "a < b && c > d");
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        let err = parse_markup("<b>oops").unwrap_err();
        assert!(err.message().contains("unterminated <b>"));
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn stray_closing_tag_is_rejected() {
        let err = parse_markup("text</i>").unwrap_err();
        assert_eq!(err.index(), 4);
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = parse_markup("<font color=\"#12FG34\">x</font>").unwrap_err();
        assert!(err.message().contains("invalid RGB"));
    }

    #[test]
    fn bare_ampersand_is_rejected() {
        assert!(parse_markup("R&D").is_err());
    }
}
