//! Error and diagnostic system for the xstage parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating errors and warnings
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Fatal diagnostics are wrapped in [`ParseError`];
//! warnings travel next to successful results so callers can judge how
//! complete the data is.
//!
//! # Example
//!
//! ```
//! # use xstage_parser::error::{Diagnostic, ErrorCode};
//! # use xstage_parser::Span;
//!
//! let span = Span::new(100..120);
//! let original_span = Span::new(50..70);
//!
//! let diag = Diagnostic::warning("element id `1` is defined multiple times")
//!     .with_code(ErrorCode::E200)
//!     .with_label(span, "ignored duplicate")
//!     .with_secondary_label(original_span, "first defined here");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::{ErrorCategory, ErrorCode};
pub use label::Label;
pub use parse_error::{ParseError, Result};
pub use severity::Severity;
