//! Identifier tables over a [`Document`].
//!
//! The [`ReferenceIndex`] maps every declared identifier to the fragment that
//! declares it. Identifiers live in separate [`Namespace`]s: element ids and
//! node names may collide freely, while two declarations in the same
//! namespace are reported as duplicates and the first one wins.
//!
//! Column, node and port namespaces are scoped. Columns are unique per scene
//! (the fragment that owns the `columns`), node names per level (the fragment
//! that owns the `nodeslist`), port names per node.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use xstage_core::{
    document::{Document, Fragment, FragmentId},
    identifier::Id,
};

use crate::error::{Diagnostic, ErrorCode};

/// A family of identifiers that must be unique among themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `elements/element@id`
    Element,
    /// `elements/element@elementName`
    ElementName,
    /// `columns/column@id` of one scene, keyed by the fragment owning the
    /// `columns`.
    Column(FragmentId),
    /// `columns/column@name` of one scene.
    ColumnName(FragmentId),
    /// Names of the nodes of one level, keyed by the fragment owning the
    /// `nodeslist`.
    Node(FragmentId),
    /// `ports/inport@name` of one node.
    InPort(FragmentId),
    /// `ports/outport@name` of one node.
    OutPort(FragmentId),
}

impl Namespace {
    fn describe(self) -> &'static str {
        match self {
            Namespace::Element => "element id",
            Namespace::ElementName => "element name",
            Namespace::Column(_) => "column id",
            Namespace::ColumnName(_) => "column name",
            Namespace::Node(_) => "node",
            Namespace::InPort(_) => "input port",
            Namespace::OutPort(_) => "output port",
        }
    }
}

/// Lookup table from `(namespace, identifier)` to the declaring fragment.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: HashMap<(Namespace, Id), FragmentId>,
    namespaces: HashSet<Namespace>,
}

impl ReferenceIndex {
    /// Scans `document` once and collects every declared identifier.
    ///
    /// Returns the index together with one `E200` warning per duplicate
    /// declaration. The first declaration in document order is the one that
    /// resolves.
    pub fn build(document: &Document) -> (Self, Vec<Diagnostic>) {
        let mut index = Self::default();
        let mut warnings = Vec::new();

        for fragment in document.root().descendants() {
            let Some(parent) = fragment.parent() else {
                continue;
            };

            let declarations: &[(Namespace, &str)] = match (parent.tag(), fragment.tag()) {
                ("elements", "element") => &[
                    (Namespace::Element, "id"),
                    (Namespace::ElementName, "elementName"),
                ],
                ("columns", "column") => {
                    let Some(scene) = parent.parent() else {
                        continue;
                    };
                    index.declare(Namespace::Column(scene.id()), fragment, "id", &mut warnings);
                    index.declare(
                        Namespace::ColumnName(scene.id()),
                        fragment,
                        "name",
                        &mut warnings,
                    );
                    continue;
                }
                ("ports", "inport") | ("ports", "outport") => {
                    let Some(node) = parent.parent() else {
                        continue;
                    };
                    let namespace = if fragment.tag() == "inport" {
                        Namespace::InPort(node.id())
                    } else {
                        Namespace::OutPort(node.id())
                    };
                    index.declare(namespace, fragment, "name", &mut warnings);
                    continue;
                }
                ("nodeslist", _) => {
                    let Some(level) = parent.parent() else {
                        continue;
                    };
                    index.declare(Namespace::Node(level.id()), fragment, "name", &mut warnings);
                    continue;
                }
                _ => continue,
            };

            for &(namespace, attribute) in declarations {
                index.declare(namespace, fragment, attribute, &mut warnings);
            }
        }

        debug!(
            entries = index.entries.len(),
            duplicates = warnings.len();
            "Reference index built"
        );
        (index, warnings)
    }

    /// Resolves an identifier within a namespace.
    ///
    /// Identifiers that were never declared anywhere resolve to `None`
    /// without being interned.
    pub fn resolve(&self, namespace: Namespace, id: &str) -> Option<FragmentId> {
        Id::lookup(id).and_then(|id| self.resolve_id(namespace, id))
    }

    /// Resolves an already interned identifier within a namespace.
    pub fn resolve_id(&self, namespace: Namespace, id: Id) -> Option<FragmentId> {
        self.entries.get(&(namespace, id)).copied()
    }

    /// Returns `true` if at least one identifier was declared in `namespace`.
    pub fn declares(&self, namespace: Namespace) -> bool {
        self.namespaces.contains(&namespace)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn declare(
        &mut self,
        namespace: Namespace,
        fragment: Fragment<'_>,
        attribute: &str,
        warnings: &mut Vec<Diagnostic>,
    ) {
        let Some(value) = fragment.attribute(attribute) else {
            return;
        };
        let key = (namespace, Id::new(value));
        self.namespaces.insert(namespace);

        match self.entries.get(&key) {
            None => {
                trace!(namespace:?, value; "Declared identifier");
                self.entries.insert(key, fragment.id());
            }
            Some(&first) => {
                let document = fragment.document();
                let mut message = format!(
                    "{} `{value}` is defined multiple times",
                    namespace.describe()
                );
                let (owner, what) = match namespace {
                    Namespace::Node(level) => (Some(level), "group"),
                    Namespace::Column(scene) | Namespace::ColumnName(scene) => {
                        (Some(scene), "scene")
                    }
                    _ => (None, ""),
                };
                let owner_name = owner.and_then(|owner| document.attributes_of(owner).get("name"));
                if let Some(name) = owner_name {
                    message.push_str(&format!(" in {what} `{name}`"));
                }
                warnings.push(
                    Diagnostic::warning(message)
                        .with_code(ErrorCode::E200)
                        .with_label(fragment.span(), "duplicate definition")
                        .with_secondary_label(document.span_of(first), "first defined here")
                        .with_help("the first definition is used for lookups"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const SOURCE: &str = r#"<project>
  <elements>
    <element id="1" elementName="Drawing"/>
    <element id="2" elementName="Background"/>
  </elements>
  <scenes>
    <scene name="Top">
      <columns>
        <column id="1" name="Drawing" type="0"/>
      </columns>
      <rootgroup name="Top">
        <nodeslist>
          <module type="READ" name="Drawing">
            <ports><inport name="0"/><outport name="0"/><outport name="matte"/></ports>
          </module>
          <module type="GROUP" name="Group">
            <nodeslist>
              <module type="PEG" name="Drawing"/>
            </nodeslist>
          </module>
        </nodeslist>
      </rootgroup>
    </scene>
  </scenes>
</project>"#;

    #[test]
    fn test_namespaces_are_separate() {
        let document = parse(SOURCE).unwrap();
        let (index, warnings) = ReferenceIndex::build(&document);

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        let scene = document.root().find("scenes/scene").unwrap();
        let element = index.resolve(Namespace::Element, "1").unwrap();
        let column = index.resolve(Namespace::Column(scene.id()), "1").unwrap();
        assert_ne!(element, column);
        assert_eq!(document.tag_of(element), "element");
        assert_eq!(document.tag_of(column), "column");

        let by_name = index.resolve(Namespace::ElementName, "Background").unwrap();
        assert_eq!(document.attributes_of(by_name)["id"], "2");
    }

    #[test]
    fn test_node_names_are_scoped_per_level() {
        let document = parse(SOURCE).unwrap();
        let (index, warnings) = ReferenceIndex::build(&document);
        assert!(warnings.is_empty());

        let root_group = document.root().find("scenes/scene/rootgroup").unwrap();
        let group = root_group
            .find_all("nodeslist/module")
            .into_iter()
            .find(|module| module.attribute("name") == Some("Group"))
            .unwrap();

        let top = index
            .resolve(Namespace::Node(root_group.id()), "Drawing")
            .unwrap();
        let nested = index.resolve(Namespace::Node(group.id()), "Drawing").unwrap();

        assert_ne!(top, nested);
        assert_eq!(document.attributes_of(top)["type"], "READ");
        assert_eq!(document.attributes_of(nested)["type"], "PEG");
    }

    #[test]
    fn test_ports_are_scoped_per_node() {
        let document = parse(SOURCE).unwrap();
        let (index, _) = ReferenceIndex::build(&document);

        let read = document
            .root()
            .find("scenes/scene/rootgroup/nodeslist/module")
            .unwrap();

        assert!(index.declares(Namespace::InPort(read.id())));
        assert!(index.declares(Namespace::OutPort(read.id())));
        assert!(index.resolve(Namespace::OutPort(read.id()), "matte").is_some());
        assert!(index.resolve(Namespace::InPort(read.id()), "matte").is_none());
    }

    #[test]
    fn test_duplicates_keep_first_and_warn() {
        let source = r#"<project>
  <elements>
    <element id="7" elementName="A"/>
    <element id="7" elementName="B"/>
  </elements>
</project>"#;
        let document = parse(source).unwrap();
        let (index, warnings) = ReferenceIndex::build(&document);

        assert_eq!(warnings.len(), 1);
        let warning = &warnings[0];
        assert_eq!(warning.code(), Some(ErrorCode::E200));
        assert!(warning.severity().is_warning());
        assert_eq!(warning.labels().len(), 2);

        let first = index.resolve(Namespace::Element, "7").unwrap();
        assert_eq!(document.attributes_of(first)["elementName"], "A");
        assert!(index.resolve(Namespace::ElementName, "B").is_some());
    }

    #[test]
    fn test_duplicate_node_names_mention_group() {
        let source = r#"<project><scenes><scene name="Top"><rootgroup name="Top">
  <nodeslist>
    <module type="PEG" name="Peg"/>
    <module type="PEG" name="Peg"/>
  </nodeslist>
</rootgroup></scene></scenes></project>"#;
        let document = parse(source).unwrap();
        let (_, warnings) = ReferenceIndex::build(&document);

        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message(),
            "node `Peg` is defined multiple times in group `Top`"
        );
    }

    #[test]
    fn test_unknown_identifiers_do_not_resolve() {
        let document = parse(SOURCE).unwrap();
        let (index, _) = ReferenceIndex::build(&document);

        assert!(index.resolve(Namespace::Element, "never-declared-anywhere").is_none());
        let scene = document.root().find("scenes/scene").unwrap();
        assert!(index.resolve(Namespace::Column(scene.id()), "2").is_none());
        assert!(!index.is_empty());
    }

    #[test]
    fn test_columns_are_scoped_per_scene() {
        let source = r#"<project><scenes>
  <scene name="Other">
    <columns><column id="1" name="Drawing"/></columns>
  </scene>
  <scene name="Top">
    <columns>
      <column id="1" name="Drawing"/>
      <column id="1" name="Drawing"/>
    </columns>
  </scene>
</scenes></project>"#;
        let document = parse(source).unwrap();
        let (index, warnings) = ReferenceIndex::build(&document);

        let scenes = document.root().find_all("scenes/scene");
        let (other, top) = (scenes[0], scenes[1]);

        let in_other = index.resolve(Namespace::ColumnName(other.id()), "Drawing").unwrap();
        let in_top = index.resolve(Namespace::ColumnName(top.id()), "Drawing").unwrap();
        assert_ne!(in_other, in_top);
        assert_eq!(document.parent_of(in_top), top.child("columns").map(|c| c.id()));

        // Only the repeat inside `Top` is a duplicate
        let messages: Vec<_> = warnings.iter().map(|warning| warning.message()).collect();
        assert_eq!(
            messages,
            [
                "column id `1` is defined multiple times in scene `Top`",
                "column name `Drawing` is defined multiple times in scene `Top`",
            ]
        );
    }
}
