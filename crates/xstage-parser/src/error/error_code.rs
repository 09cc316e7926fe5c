//! Error codes for the xstage diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - XML syntax errors
//! - `E1xx` - Document structure errors
//! - `E2xx` - Reference resolution warnings

use std::fmt;

/// Broad class of a diagnostic, independent of the exact code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input is not well-formed XML.
    Syntax,
    /// A structural expectation of the scene format is violated.
    MalformedDocument,
    /// An identifier is declared twice within one namespace.
    DuplicateIdentifier,
    /// A reference names something that does not exist.
    UnresolvedReference,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::MalformedDocument => "malformed document",
            ErrorCategory::DuplicateIdentifier => "duplicate identifier",
            ErrorCategory::UnresolvedReference => "unresolved reference",
        };
        f.write_str(name)
    }
}

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E0xx)
    // =========================================================================
    /// Malformed XML.
    ///
    /// The reader could not tokenize the input, or an end tag does not match
    /// the element it closes.
    E001,

    /// Unclosed element.
    ///
    /// The input ended while an element was still open.
    E002,

    /// Missing or repeated root element.
    ///
    /// A document must contain exactly one root element.
    E003,

    /// Invalid attribute.
    ///
    /// An attribute is malformed or its value cannot be unescaped.
    E004,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Missing fragment.
    ///
    /// A fragment the scene format requires (scene, root group, node list) is absent.
    E100,

    /// Missing attribute.
    ///
    /// A fragment lacks an attribute needed to identify it.
    E101,

    // =========================================================================
    // Reference Warnings (E2xx)
    // =========================================================================
    /// Duplicate identifier.
    ///
    /// The same identifier is declared twice in one namespace. The first
    /// declaration wins.
    E200,

    /// Unresolved link node.
    ///
    /// A link names a node that does not exist at the link's level.
    E201,

    /// Unresolved link port.
    ///
    /// A link names a port that the node does not declare.
    E202,

    /// Unresolved element.
    ///
    /// A column references an element id that is not declared.
    E203,

    /// Incomplete link.
    ///
    /// A link lacks its source or destination attribute.
    E204,

    /// Unresolved column.
    ///
    /// A node references a column name that is not declared.
    E205,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Structure errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Reference warnings
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed xml",
            ErrorCode::E002 => "unclosed element",
            ErrorCode::E003 => "invalid root element",
            ErrorCode::E004 => "invalid attribute",
            ErrorCode::E100 => "missing fragment",
            ErrorCode::E101 => "missing attribute",
            ErrorCode::E200 => "duplicate identifier",
            ErrorCode::E201 => "unresolved link node",
            ErrorCode::E202 => "unresolved link port",
            ErrorCode::E203 => "unresolved element",
            ErrorCode::E204 => "incomplete link",
            ErrorCode::E205 => "unresolved column",
        }
    }

    /// Returns the category this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::E001 | ErrorCode::E002 | ErrorCode::E003 | ErrorCode::E004 => {
                ErrorCategory::Syntax
            }
            ErrorCode::E100 | ErrorCode::E101 => ErrorCategory::MalformedDocument,
            ErrorCode::E200 => ErrorCategory::DuplicateIdentifier,
            ErrorCode::E201
            | ErrorCode::E202
            | ErrorCode::E203
            | ErrorCode::E204
            | ErrorCode::E205 => ErrorCategory::UnresolvedReference,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
