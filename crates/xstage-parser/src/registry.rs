//! Flat registries of elements and columns.
//!
//! [`ResourceRegistry`] enumerates the `elements/element` declarations of a
//! document and [`UsageRegistry`] the `columns/column` declarations of one
//! scene. Both
//! store fragment handles in document order and hand out borrowed views
//! lazily, so iterating twice yields the same sequence.
//!
//! Column to element references are bound once, while the usage registry is
//! built, against a completed [`ReferenceIndex`].

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use xstage_core::{
    document::{Document, Fragment, FragmentId},
    identifier::Id,
    semantic::{Column, ColumnKind, Element},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    index::{Namespace, ReferenceIndex},
};

/// `elements/element` fragments anywhere in the document, in document order.
fn element_declarations(document: &Document) -> impl Iterator<Item = Fragment<'_>> {
    document.root().descendants().filter(|fragment| {
        fragment.tag() == "element"
            && fragment
                .parent()
                .is_some_and(|parent| parent.tag() == "elements")
    })
}

fn missing_id(fragment: Fragment<'_>, what: &str) -> Diagnostic {
    Diagnostic::warning(format!("{what} without an `id` attribute is ignored"))
        .with_code(ErrorCode::E101)
        .with_label(fragment.span(), format!("{what} declared here"))
}

/// Every element declared by a document.
#[derive(Debug)]
pub struct ResourceRegistry<'doc> {
    document: &'doc Document,
    elements: IndexMap<FragmentId, Id>,
    by_id: HashMap<Id, FragmentId>,
    by_name: HashMap<Id, FragmentId>,
}

impl<'doc> ResourceRegistry<'doc> {
    /// Collects the elements of `document`.
    ///
    /// Elements without an `id` are skipped with an `E101` warning. Lookups by
    /// id and name follow `index`, so duplicates resolve to their first
    /// declaration.
    pub fn new(document: &'doc Document, index: &ReferenceIndex) -> (Self, Vec<Diagnostic>) {
        let mut warnings = Vec::new();
        let mut elements = IndexMap::new();
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for fragment in element_declarations(document) {
            let Some(value) = fragment.attribute("id") else {
                warnings.push(missing_id(fragment, "element"));
                continue;
            };
            let id = Id::new(value);
            elements.insert(fragment.id(), id);

            if let Some(winner) = index.resolve_id(Namespace::Element, id) {
                by_id.insert(id, winner);
            }
            if let Some(name) = fragment.attribute("elementName") {
                let name = Id::new(name);
                if let Some(winner) = index.resolve_id(Namespace::ElementName, name) {
                    by_name.insert(name, winner);
                }
            }
        }

        debug!(elements = elements.len(); "Resource registry built");
        let registry = Self {
            document,
            elements,
            by_id,
            by_name,
        };
        (registry, warnings)
    }

    /// Elements in document order.
    pub fn iter_elements(&self) -> impl Iterator<Item = Element<'doc>> + '_ {
        self.elements
            .keys()
            .filter_map(|&fragment| self.element_by_fragment(fragment))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_by_id(&self, id: &str) -> Option<Element<'doc>> {
        let fragment = *self.by_id.get(&Id::lookup(id)?)?;
        self.element_by_fragment(fragment)
    }

    /// Element whose `elementName` is `name`.
    pub fn element_by_name(&self, name: &str) -> Option<Element<'doc>> {
        let fragment = *self.by_name.get(&Id::lookup(name)?)?;
        self.element_by_fragment(fragment)
    }

    /// Element declared by `fragment`, if it is a registered element.
    pub fn element_by_fragment(&self, fragment: FragmentId) -> Option<Element<'doc>> {
        let id = *self.elements.get(&fragment)?;
        let fragment = self.document.fragment(fragment)?;
        Some(Element::new(fragment, id))
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnRecord {
    id: Id,
    element: Option<(FragmentId, Id)>,
}

/// Every column declared by one scene, with its element bound.
#[derive(Debug)]
pub struct UsageRegistry<'doc> {
    document: &'doc Document,
    columns: IndexMap<FragmentId, ColumnRecord>,
    by_id: HashMap<Id, FragmentId>,
    by_name: HashMap<Id, FragmentId>,
}

impl<'doc> UsageRegistry<'doc> {
    /// Collects the `columns/column` children of `scene` and binds their
    /// element references.
    ///
    /// A column whose reference matches no element keeps `element() == None`.
    /// Drawing columns and columns naming an explicit `elementSeq` produce
    /// exactly one `E203` warning in that case; other columns are expected to
    /// have no backing element.
    pub fn new(
        scene: Fragment<'doc>,
        index: &ReferenceIndex,
        resources: &ResourceRegistry<'doc>,
    ) -> (Self, Vec<Diagnostic>) {
        let document = scene.document();
        let mut warnings = Vec::new();
        let mut columns = IndexMap::new();
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for fragment in scene.find_all("columns/column") {
            let Some(value) = fragment.attribute("id") else {
                warnings.push(missing_id(fragment, "column"));
                continue;
            };
            let id = Id::new(value);

            let reference = Column::reference_of(fragment);
            let element = reference.and_then(|reference| {
                let element = index.resolve(Namespace::Element, reference)?;
                let element = resources.element_by_fragment(element)?;
                Some((element.fragment().id(), element.id()))
            });
            let expects_element = ColumnKind::from_attribute(fragment.attribute("type"))
                == ColumnKind::Drawing
                || fragment.child("elementSeq").is_some();
            if element.is_none() && expects_element {
                let reference = reference.unwrap_or(value);
                warnings.push(
                    Diagnostic::warning(format!(
                        "column `{value}` references element `{reference}` which is not declared"
                    ))
                    .with_code(ErrorCode::E203)
                    .with_label(fragment.span(), "column has no backing element"),
                );
            }

            columns.insert(fragment.id(), ColumnRecord { id, element });
            if let Some(winner) = index.resolve_id(Namespace::Column(scene.id()), id) {
                by_id.insert(id, winner);
            }
            if let Some(name) = fragment.attribute("name") {
                let name = Id::new(name);
                if let Some(winner) = index.resolve_id(Namespace::ColumnName(scene.id()), name) {
                    by_name.insert(name, winner);
                }
            }
        }

        debug!(
            scene = scene.attribute("name").unwrap_or_default(),
            columns = columns.len(),
            unresolved = warnings.len();
            "Usage registry built"
        );
        let registry = Self {
            document,
            columns,
            by_id,
            by_name,
        };
        (registry, warnings)
    }

    /// Columns in document order.
    pub fn iter_columns(&self) -> impl Iterator<Item = Column<'doc>> + '_ {
        self.columns
            .keys()
            .filter_map(|&fragment| self.column_by_fragment(fragment))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_by_id(&self, id: &str) -> Option<Column<'doc>> {
        let fragment = *self.by_id.get(&Id::lookup(id)?)?;
        self.column_by_fragment(fragment)
    }

    pub fn column_by_name(&self, name: &str) -> Option<Column<'doc>> {
        let fragment = *self.by_name.get(&Id::lookup(name)?)?;
        self.column_by_fragment(fragment)
    }

    /// Column declared by `fragment`, if it is a registered column.
    pub fn column_by_fragment(&self, fragment: FragmentId) -> Option<Column<'doc>> {
        let record = *self.columns.get(&fragment)?;
        let view = self.document.fragment(fragment)?;
        let element = record.element.and_then(|(element, id)| {
            self.document
                .fragment(element)
                .map(|fragment| Element::new(fragment, id))
        });
        Some(Column::new(view, record.id, element))
    }
}
