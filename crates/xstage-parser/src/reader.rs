//! XML reader producing a [`Document`].
//!
//! The reader drives a [`quick_xml::Reader`] over the source text and feeds
//! every event into a [`DocumentBuilder`], recording the byte span of each
//! element. Leading and trailing whitespace of text nodes is trimmed; comments,
//! processing instructions and declarations are skipped.

use std::str;

use log::trace;
use quick_xml::{
    Reader,
    events::{BytesStart, Event, attributes::AttrError},
};
use thiserror::Error;

use xstage_core::document::{Attributes, BuildError, Document, DocumentBuilder};

use crate::{
    Span,
    error::{Diagnostic, ErrorCode, ParseError},
};

/// Failures while turning XML events into a document.
#[derive(Debug, Error)]
enum ReadError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("name is not valid UTF-8: {0}")]
    Encoding(#[from] str::Utf8Error),

    #[error(transparent)]
    Structure(#[from] BuildError),
}

impl ReadError {
    fn code(&self) -> ErrorCode {
        match self {
            ReadError::Xml(_) | ReadError::Structure(BuildError::UnbalancedClose) => ErrorCode::E001,
            ReadError::Structure(BuildError::Unclosed { .. }) => ErrorCode::E002,
            ReadError::Structure(BuildError::NoRoot | BuildError::MultipleRoots { .. }) => {
                ErrorCode::E003
            }
            ReadError::Attribute(_) | ReadError::Encoding(_) => ErrorCode::E004,
        }
    }

    fn into_diagnostic(self, span: Span) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string()).with_code(self.code());
        match self {
            ReadError::Structure(BuildError::Unclosed { tag, start }) => diagnostic
                .with_label(Span::new(start..start + tag.len() + 1), "opened here")
                .with_help(format!("add the matching `</{tag}>`")),
            ReadError::Structure(BuildError::NoRoot) => {
                diagnostic.with_help("a scene document starts with a `<project>` element")
            }
            _ => diagnostic.with_label(span, "here"),
        }
    }
}

/// Reads `source` into a [`Document`].
///
/// # Errors
///
/// Returns a [`ParseError`] holding a single syntax diagnostic when the
/// source is not a well-formed XML document with exactly one root element.
pub(crate) fn read_document(source: &str) -> Result<Document, ParseError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut builder = DocumentBuilder::new();
    loop {
        let start = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let position = reader.error_position() as usize;
                let span = Span::new(position..reader.buffer_position() as usize);
                return Err(ReadError::from(err).into_diagnostic(span).into());
            }
        };
        let span = Span::new(start..reader.buffer_position() as usize);

        match apply_event(&mut builder, event, span) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return Err(err.into_diagnostic(span).into()),
        }
    }

    let end = Span::new(source.len()..source.len());
    builder
        .finish(source)
        .map_err(|err| ReadError::from(err).into_diagnostic(end).into())
}

/// Applies one event to the builder. Returns `false` at the end of input.
fn apply_event(
    builder: &mut DocumentBuilder,
    event: Event<'_>,
    span: Span,
) -> Result<bool, ReadError> {
    match event {
        Event::Start(start) => {
            let (tag, attributes) = read_start(&start)?;
            trace!(tag, start = span.start(); "Open element");
            builder.open(tag, attributes, span.start())?;
        }
        Event::Empty(start) => {
            let (tag, attributes) = read_start(&start)?;
            builder.leaf(tag, attributes, span)?;
        }
        Event::End(_) => {
            builder.close(span.end())?;
        }
        Event::Text(text) => {
            let text = text.unescape()?;
            builder.append_text(&text);
        }
        Event::CData(data) => {
            builder.append_text(&String::from_utf8_lossy(&data));
        }
        Event::Eof => return Ok(false),
        _ => {}
    }
    Ok(true)
}

/// Decodes the tag name and attributes of a start tag.
fn read_start(start: &BytesStart<'_>) -> Result<(String, Attributes), ReadError> {
    let tag = str::from_utf8(start.name().as_ref())?.to_string();

    let mut attributes = Attributes::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }

    Ok((tag, attributes))
}
