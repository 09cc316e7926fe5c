//! Read-only element tree of a scene document.
//!
//! A [`Document`] is an arena of fragments. Each fragment is one XML element
//! with a tag, an ordered attribute map, ordered children, text content and
//! the byte [`Span`] it was read from. Everything built on top of the tree
//! refers to fragments through [`FragmentId`] handles or [`Fragment`] views;
//! nothing outside this module owns any part of the tree.
//!
//! Documents are assembled with a [`DocumentBuilder`], which the reader drives
//! from XML events:
//!
//! ```
//! use indexmap::IndexMap;
//! use xstage_core::{document::DocumentBuilder, span::Span};
//!
//! let mut builder = DocumentBuilder::new();
//! builder.open("project", IndexMap::new(), 0).unwrap();
//! builder
//!     .leaf("elements", IndexMap::new(), Span::new(9..21))
//!     .unwrap();
//! builder.close(31).unwrap();
//!
//! let document = builder.finish("<project><elements/></project>").unwrap();
//! let root = document.root();
//! assert_eq!(root.tag(), "project");
//! assert_eq!(root.children().count(), 1);
//! ```

use std::{fmt, ptr};

use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

use crate::span::Span;

/// Attribute map of a fragment, in document order.
pub type Attributes = IndexMap<String, String>;

/// Handle to one fragment of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(usize);

impl FragmentId {
    /// Position of the fragment in document (pre-)order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct FragmentData {
    tag: String,
    attributes: Attributes,
    children: Vec<FragmentId>,
    parent: Option<FragmentId>,
    text: String,
    span: Span,
}

/// A parsed, immutable scene document.
///
/// The document keeps the source text it was read from so that spans stay
/// meaningful for error reporting.
pub struct Document {
    source: String,
    fragments: Vec<FragmentData>,
    root: FragmentId,
}

impl Document {
    /// The source text the document was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root fragment.
    pub fn root(&self) -> Fragment<'_> {
        Fragment::new(self, self.root)
    }

    /// Handle of the root fragment.
    pub fn root_id(&self) -> FragmentId {
        self.root
    }

    /// Returns a view of the fragment with the given handle.
    ///
    /// Returns `None` if the handle does not belong to this document.
    pub fn fragment(&self, id: FragmentId) -> Option<Fragment<'_>> {
        (id.0 < self.fragments.len()).then(|| Fragment::new(self, id))
    }

    /// Total number of fragments in the document.
    pub fn fragments_count(&self) -> usize {
        self.fragments.len()
    }

    /// Ordered children of a fragment.
    pub fn children_of(&self, id: FragmentId) -> &[FragmentId] {
        &self.data(id).children
    }

    /// Attribute map of a fragment.
    pub fn attributes_of(&self, id: FragmentId) -> &Attributes {
        &self.data(id).attributes
    }

    /// Tag name of a fragment.
    pub fn tag_of(&self, id: FragmentId) -> &str {
        &self.data(id).tag
    }

    /// Text and CDATA content directly inside a fragment.
    pub fn text_of(&self, id: FragmentId) -> &str {
        &self.data(id).text
    }

    /// Source span of a fragment, from its start tag to its end tag.
    pub fn span_of(&self, id: FragmentId) -> Span {
        self.data(id).span
    }

    /// Parent of a fragment; `None` for the root.
    pub fn parent_of(&self, id: FragmentId) -> Option<FragmentId> {
        self.data(id).parent
    }

    fn data(&self, id: FragmentId) -> &FragmentData {
        &self.fragments[id.0]
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root().tag())
            .field("fragments", &self.fragments.len())
            .field("source_len", &self.source.len())
            .finish()
    }
}

/// A borrowed view of one fragment.
///
/// `Fragment` is `Copy` and cheap to pass around; two views are equal when
/// they point at the same fragment of the same document.
#[derive(Clone, Copy)]
pub struct Fragment<'doc> {
    document: &'doc Document,
    id: FragmentId,
}

impl<'doc> Fragment<'doc> {
    fn new(document: &'doc Document, id: FragmentId) -> Self {
        Self { document, id }
    }

    /// Handle of this fragment.
    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// The document this fragment belongs to.
    pub fn document(&self) -> &'doc Document {
        self.document
    }

    pub fn tag(&self) -> &'doc str {
        self.document.tag_of(self.id)
    }

    pub fn attributes(&self) -> &'doc Attributes {
        self.document.attributes_of(self.id)
    }

    /// Value of a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&'doc str> {
        self.attributes().get(name).map(String::as_str)
    }

    pub fn text(&self) -> &'doc str {
        self.document.text_of(self.id)
    }

    pub fn span(&self) -> Span {
        self.document.span_of(self.id)
    }

    pub fn parent(&self) -> Option<Fragment<'doc>> {
        self.document
            .parent_of(self.id)
            .map(|id| Fragment::new(self.document, id))
    }

    /// Ordered children of this fragment.
    pub fn children(&self) -> impl Iterator<Item = Fragment<'doc>> + use<'doc> {
        let document = self.document;
        document
            .children_of(self.id)
            .iter()
            .map(move |&id| Fragment::new(document, id))
    }

    /// Children with the given tag, in document order.
    pub fn children_with_tag<'t>(
        &self,
        tag: &'t str,
    ) -> impl Iterator<Item = Fragment<'doc>> + use<'doc, 't> {
        self.children().filter(move |child| child.tag() == tag)
    }

    /// First child with the given tag.
    pub fn child(&self, tag: &str) -> Option<Fragment<'doc>> {
        self.children().find(|child| child.tag() == tag)
    }

    /// Follows a `/`-separated chain of child tags and returns the first match.
    ///
    /// `fragment.find("scenes/scene")` is the first `scene` child of the first
    /// `scenes` child that has one.
    pub fn find(&self, path: &str) -> Option<Fragment<'doc>> {
        self.find_all(path).into_iter().next()
    }

    /// Follows a `/`-separated chain of child tags and returns every match in
    /// document order.
    pub fn find_all(&self, path: &str) -> Vec<Fragment<'doc>> {
        let mut current = vec![*self];
        for tag in path.split('/').filter(|tag| !tag.is_empty()) {
            current = current
                .iter()
                .flat_map(|fragment| fragment.children_with_tag(tag))
                .collect();
        }
        current
    }

    /// All fragments below this one, in pre-order, excluding itself.
    pub fn descendants(&self) -> Descendants<'doc> {
        let mut stack: Vec<FragmentId> = self.document.children_of(self.id).to_vec();
        stack.reverse();
        Descendants {
            document: self.document,
            stack,
        }
    }
}

impl PartialEq for Fragment<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for Fragment<'_> {}

impl fmt::Debug for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("id", &self.id.0)
            .field("tag", &self.tag())
            .field("span", &self.span())
            .finish()
    }
}

/// Pre-order iterator over the descendants of a fragment.
pub struct Descendants<'doc> {
    document: &'doc Document,
    stack: Vec<FragmentId>,
}

impl<'doc> Iterator for Descendants<'doc> {
    type Item = Fragment<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children_of(id).iter().rev().copied());
        Some(Fragment::new(self.document, id))
    }
}

/// Structural errors raised while assembling a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("document has no root element")]
    NoRoot,

    #[error("element `{tag}` appears after the root element")]
    MultipleRoots { tag: String },

    #[error("closing tag without a matching open element")]
    UnbalancedClose,

    #[error("element `{tag}` is never closed")]
    Unclosed { tag: String, start: usize },
}

/// Incremental builder for a [`Document`].
///
/// Fragments are appended in document order; `open` and `close` calls must
/// nest properly.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    fragments: Vec<FragmentData>,
    open: Vec<FragmentId>,
    root: Option<FragmentId>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new element starting at byte `start`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MultipleRoots`] if the root element was already
    /// closed.
    pub fn open(
        &mut self,
        tag: impl Into<String>,
        attributes: Attributes,
        start: usize,
    ) -> Result<FragmentId, BuildError> {
        let tag = tag.into();
        let parent = self.open.last().copied();
        if parent.is_none() && self.root.is_some() {
            return Err(BuildError::MultipleRoots { tag });
        }

        let id = FragmentId(self.fragments.len());
        self.fragments.push(FragmentData {
            tag,
            attributes,
            children: Vec::new(),
            parent,
            text: String::new(),
            span: Span::new(start..start),
        });

        match parent {
            Some(parent) => self.fragments[parent.0].children.push(id),
            None => self.root = Some(id),
        }
        self.open.push(id);
        Ok(id)
    }

    /// Closes the innermost open element; its span ends at byte `end`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnbalancedClose`] when no element is open.
    pub fn close(&mut self, end: usize) -> Result<FragmentId, BuildError> {
        let id = self.open.pop().ok_or(BuildError::UnbalancedClose)?;
        let data = &mut self.fragments[id.0];
        data.span = Span::new(data.span.start()..end);
        Ok(id)
    }

    /// Adds an element without content (`<tag/>`).
    pub fn leaf(
        &mut self,
        tag: impl Into<String>,
        attributes: Attributes,
        span: Span,
    ) -> Result<FragmentId, BuildError> {
        self.open(tag, attributes, span.start())?;
        self.close(span.end())
    }

    /// Appends text to the innermost open element.
    ///
    /// Text outside of the root element is ignored.
    pub fn append_text(&mut self, text: &str) {
        if let Some(&id) = self.open.last() {
            self.fragments[id.0].text.push_str(text);
        }
    }

    /// Name of the innermost open element, if any.
    pub fn current_tag(&self) -> Option<&str> {
        self.open
            .last()
            .map(|id| self.fragments[id.0].tag.as_str())
    }

    /// Finishes the document.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Unclosed`] if an element is still open and
    /// [`BuildError::NoRoot`] if no element was added.
    pub fn finish(self, source: impl Into<String>) -> Result<Document, BuildError> {
        if let Some(&id) = self.open.first() {
            let data = &self.fragments[id.0];
            return Err(BuildError::Unclosed {
                tag: data.tag.clone(),
                start: data.span.start(),
            });
        }
        let root = self.root.ok_or(BuildError::NoRoot)?;

        trace!(fragments = self.fragments.len(); "Document assembled");

        Ok(Document {
            source: source.into(),
            fragments: self.fragments,
            root,
        })
    }
}
