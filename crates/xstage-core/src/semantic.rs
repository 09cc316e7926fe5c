//! Resource and usage entities of a scene.
//!
//! - [`Element`] - a resource declared under `project/elements`
//! - [`Column`] - a usage record under `scene/columns`, bound to at most one element
//!
//! Both types are thin, `Copy` views over the document: they store a
//! [`Fragment`] handle plus the identifiers that were validated when the
//! registries were built.

use std::fmt;

use crate::{
    document::{Attributes, Fragment},
    identifier::Id,
};

/// A resource entity (drawing, media, ...) declared by the project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element<'doc> {
    fragment: Fragment<'doc>,
    id: Id,
}

impl<'doc> Element<'doc> {
    /// Creates an element view for a fragment whose `id` attribute is `id`.
    pub fn new(fragment: Fragment<'doc>, id: Id) -> Self {
        Self { fragment, id }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Tag of the underlying fragment.
    pub fn kind(&self) -> &'doc str {
        self.fragment.tag()
    }

    /// Value of the `elementName` attribute.
    pub fn name(&self) -> Option<&'doc str> {
        self.fragment.attribute("elementName")
    }

    /// Value of the `elementFolder` attribute.
    pub fn folder(&self) -> Option<&'doc str> {
        self.fragment.attribute("elementFolder")
    }

    /// Value of the `rootFolder` attribute.
    pub fn root_folder(&self) -> Option<&'doc str> {
        self.fragment.attribute("rootFolder")
    }

    /// Names of the drawings listed under `drawings/dwg`.
    pub fn drawings(&self) -> impl Iterator<Item = &'doc str> + use<'doc> {
        self.fragment
            .find_all("drawings/dwg")
            .into_iter()
            .filter_map(|dwg| dwg.attribute("name"))
    }

    pub fn attributes(&self) -> &'doc Attributes {
        self.fragment.attributes()
    }

    /// The underlying document fragment.
    pub fn fragment(&self) -> Fragment<'doc> {
        self.fragment
    }
}

/// Decoded value of a column's integer `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// `type="0"`: exposure of drawing elements.
    Drawing,
    /// Any other integer code.
    Other(i64),
    /// The attribute is absent or not an integer.
    Unspecified,
}

impl ColumnKind {
    /// Decodes a raw `type` attribute value.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().parse::<i64>()) {
            Some(Ok(0)) => ColumnKind::Drawing,
            Some(Ok(code)) => ColumnKind::Other(code),
            Some(Err(_)) | None => ColumnKind::Unspecified,
        }
    }

    /// The integer code, when known.
    pub fn code(&self) -> Option<i64> {
        match self {
            ColumnKind::Drawing => Some(0),
            ColumnKind::Other(code) => Some(*code),
            ColumnKind::Unspecified => None,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Drawing => write!(f, "drawing"),
            ColumnKind::Other(code) => write!(f, "type {code}"),
            ColumnKind::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// A usage record describing how the scene applies an element over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column<'doc> {
    fragment: Fragment<'doc>,
    id: Id,
    element: Option<Element<'doc>>,
}

impl<'doc> Column<'doc> {
    /// Creates a column view; `element` is the already resolved reference.
    pub fn new(fragment: Fragment<'doc>, id: Id, element: Option<Element<'doc>>) -> Self {
        Self {
            fragment,
            id,
            element,
        }
    }

    /// Raw element id a column fragment refers to.
    ///
    /// This is the `id` of the column's `elementSeq` child, or the column's own
    /// `id` when it has no `elementSeq`.
    pub fn reference_of(fragment: Fragment<'doc>) -> Option<&'doc str> {
        match fragment.child("elementSeq") {
            Some(sequence) => sequence.attribute("id"),
            None => fragment.attribute("id"),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Value of the `name` attribute.
    pub fn name(&self) -> Option<&'doc str> {
        self.fragment.attribute("name")
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::from_attribute(self.fragment.attribute("type"))
    }

    /// The referenced element id, whether or not it resolved.
    pub fn element_ref(&self) -> Option<&'doc str> {
        Self::reference_of(self.fragment)
    }

    /// The backing element; `None` when the reference did not resolve.
    pub fn element(&self) -> Option<Element<'doc>> {
        self.element
    }

    pub fn attributes(&self) -> &'doc Attributes {
        self.fragment.attributes()
    }

    pub fn fragment(&self) -> Fragment<'doc> {
        self.fragment
    }
}
