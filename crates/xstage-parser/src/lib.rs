//! # xstage Parser
//!
//! Reader and lookup tables for Harmony scene documents. This crate turns
//! `.xstage` source text into a read-only [`Document`] and builds the
//! identifier tables the graph model resolves references against.
//!
//! ## Usage
//!
//! ```
//! # use xstage_parser::{parse, ReferenceIndex, ResourceRegistry, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <project>
//!           <elements>
//!             <element id="1" elementName="Drawing"/>
//!           </elements>
//!         </project>
//!     "#;
//!
//!     let document = parse(source)?;
//!     let (index, warnings) = ReferenceIndex::build(&document);
//!     let (resources, _) = ResourceRegistry::new(&document, &index);
//!
//!     assert!(warnings.is_empty());
//!     assert_eq!(resources.iter_elements().count(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod index;
mod reader;
pub mod registry;

pub use index::{Namespace, ReferenceIndex};
pub use registry::{ResourceRegistry, UsageRegistry};
pub use xstage_core::span::Span;

use log::{debug, info};

use xstage_core::document::Document;

use error::ParseError;

/// Parse source text into a read-only document tree.
///
/// # Arguments
///
/// * `source` - The `.xstage` XML text
///
/// # Returns
///
/// Returns the [`Document`] on success, or a [`ParseError`] carrying a
/// syntax diagnostic with the offending span on failure.
///
/// # Example
///
/// ```
/// # use xstage_parser::{parse, error::ParseError};
///
/// fn main() -> Result<(), ParseError> {
///     let document = parse("<project><scenes/></project>")?;
///     assert_eq!(document.root().tag(), "project");
///     Ok(())
/// }
/// ```
pub fn parse(source: &str) -> Result<Document, ParseError> {
    info!(bytes = source.len(); "Reading document");

    let document = reader::read_document(source)?;

    debug!(fragments = document.fragments_count(); "Document read");
    Ok(document)
}
