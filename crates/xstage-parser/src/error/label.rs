//! Labeled source spans for diagnostic messages.
//!
//! A label associates a message with a span of the document source,
//! pointing at the fragment an error or warning is about.

use crate::Span;

/// A labeled span in the document source.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the fragment the diagnostic is about.
/// - **Secondary labels** add context, such as "first defined here".
///
/// # Example
///
/// ```text
/// warning[E200]: node `Peg` is defined multiple times in group `Top`
///    |
/// 12 |       <module type="PEG" name="Peg"/>
///    |       ------------------------------- first defined here
/// 14 |       <module type="PEG" name="Peg"/>
///    |       ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ duplicate definition
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
