//! The scene facade.
//!
//! A [`Scene`] composes everything read from one document: the scene's
//! metadata, its element and column registries, and its node graph. It is
//! built once by [`crate::SceneBuilder::build`] and borrows the document it
//! was built from.

use log::{debug, info};

use xstage_core::{
    document::{Document, Fragment},
    semantic::{Column, Element},
};
use xstage_parser::{
    ReferenceIndex, ResourceRegistry, UsageRegistry,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
};

use crate::{
    config::AppConfig,
    structure::{Graph, GraphBuilder, Node},
};

/// One scene of a Harmony project.
#[derive(Debug)]
pub struct Scene<'doc> {
    fragment: Fragment<'doc>,
    index: ReferenceIndex,
    resources: ResourceRegistry<'doc>,
    usages: UsageRegistry<'doc>,
    graph: Graph<'doc>,
    warnings: Vec<Diagnostic>,
}

impl<'doc> Scene<'doc> {
    /// Reads the scene selected by `config` from `document`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the scene or its `rootgroup` is missing,
    /// or when the graph cannot be built.
    pub fn build(document: &'doc Document, config: &AppConfig) -> Result<Self, ParseError> {
        let name = config.scene().name();
        info!(scene = name; "Building scene");

        let fragment = find_scene(document, name)?;
        let root = fragment.child("rootgroup").ok_or_else(|| {
            ParseError::from(
                Diagnostic::error(format!("scene `{name}` has no `rootgroup`"))
                    .with_code(ErrorCode::E100)
                    .with_label(fragment.span(), "scene declared here"),
            )
        })?;

        let mut warnings = DiagnosticCollector::new();

        let (index, duplicates) = ReferenceIndex::build(document);
        warnings.extend(duplicates);

        let (resources, unnamed) = ResourceRegistry::new(document, &index);
        warnings.extend(unnamed);

        let (usages, unresolved) = UsageRegistry::new(fragment, &index, &resources);
        warnings.extend(unresolved);

        let (graph, dropped) =
            GraphBuilder::new(config.graph()).build(document, root.id(), &index)?;
        warnings.extend(dropped);

        let warnings = warnings.finish()?;
        debug!(
            elements = resources.len(),
            columns = usages.len(),
            nodes = graph.nodes_count(),
            warnings = warnings.len();
            "Scene built"
        );

        Ok(Self {
            fragment,
            index,
            resources,
            usages,
            graph,
            warnings,
        })
    }

    /// Value of the scene's `id` attribute.
    pub fn id(&self) -> Option<&'doc str> {
        self.fragment.attribute("id")
    }

    pub fn name(&self) -> Option<&'doc str> {
        self.fragment.attribute("name")
    }

    /// First frame, from the `startFrame` attribute.
    pub fn start_frame(&self) -> Option<i64> {
        self.frame_attribute("startFrame")
    }

    /// Last frame, from the `stopFrame` attribute.
    pub fn end_frame(&self) -> Option<i64> {
        self.frame_attribute("stopFrame")
    }

    /// Number of frames from the start frame to the end frame, both included.
    ///
    /// `None` when either bound is missing, the range is empty, or the count
    /// does not fit a `u64`.
    pub fn frame_count(&self) -> Option<u64> {
        let (start, end) = (self.start_frame()?, self.end_frame()?);
        let count = i128::from(end) - i128::from(start) + 1;
        if count <= 0 {
            return None;
        }
        u64::try_from(count).ok()
    }

    fn frame_attribute(&self, name: &str) -> Option<i64> {
        self.fragment.attribute(name)?.trim().parse().ok()
    }

    /// The `scene` fragment.
    pub fn fragment(&self) -> Fragment<'doc> {
        self.fragment
    }

    pub fn document(&self) -> &'doc Document {
        self.fragment.document()
    }

    /// Elements of the project, in document order.
    pub fn elements(&self) -> impl Iterator<Item = Element<'doc>> + '_ {
        self.resources.iter_elements()
    }

    /// Columns of the scene, in document order.
    pub fn columns(&self) -> impl Iterator<Item = Column<'doc>> + '_ {
        self.usages.iter_columns()
    }

    pub fn resources(&self) -> &ResourceRegistry<'doc> {
        &self.resources
    }

    pub fn usages(&self) -> &UsageRegistry<'doc> {
        &self.usages
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn element_by_id(&self, id: &str) -> Option<Element<'doc>> {
        self.resources.element_by_id(id)
    }

    pub fn element_by_name(&self, name: &str) -> Option<Element<'doc>> {
        self.resources.element_by_name(name)
    }

    pub fn column_by_id(&self, id: &str) -> Option<Column<'doc>> {
        self.usages.column_by_id(id)
    }

    pub fn column_by_name(&self, name: &str) -> Option<Column<'doc>> {
        self.usages.column_by_name(name)
    }

    /// The node graph of the scene's `rootgroup`.
    pub fn graph(&self) -> &Graph<'doc> {
        &self.graph
    }

    /// Column a node draws from, through its `attrs/element@col` reference.
    pub fn node_column(&self, node: Node<'_>) -> Option<Column<'doc>> {
        self.usages.column_by_fragment(node.column_fragment()?)
    }

    /// Every warning raised while reading the scene.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

fn find_scene<'doc>(document: &'doc Document, name: &str) -> Result<Fragment<'doc>, ParseError> {
    let root = document.root();
    let scenes = root.find_all("scenes/scene");

    scenes
        .iter()
        .copied()
        .find(|scene| scene.attribute("name") == Some(name))
        .ok_or_else(|| {
            let mut diagnostic = Diagnostic::error(format!("document has no scene named `{name}`"))
                .with_code(ErrorCode::E100)
                .with_label(root.span(), "project declared here");
            let available: Vec<&str> = scenes
                .iter()
                .filter_map(|scene| scene.attribute("name"))
                .collect();
            if !available.is_empty() {
                diagnostic = diagnostic.with_help(format!("available scenes: {}", available.join(", ")));
            }
            ParseError::from(diagnostic)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use xstage_parser::parse;

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project source="Harmony Premium" version="2200">
  <elements>
    <element id="1" elementName="Drawing" elementFolder="Drawing" rootFolder="elements"/>
  </elements>
  <scenes>
    <scene name="Top" id="0a1b" startFrame="1" stopFrame="24">
      <columns>
        <column type="0" name="Drawing" id="1"><elementSeq id="1"/></column>
        <column type="0" name="col1" id="7"><elementSeq id="el1"/></column>
      </columns>
      <rootgroup name="Top">
        <nodeslist>
          <module type="READ" name="Drawing">
            <attrs><element col="Drawing"/></attrs>
          </module>
          <module type="WRITE" name="Write"/>
        </nodeslist>
        <linkedlist>
          <link out="Drawing" in="Write"/>
        </linkedlist>
      </rootgroup>
    </scene>
  </scenes>
</project>"#;

    #[test]
    fn test_scene_metadata() {
        let document = parse(SOURCE).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();

        assert_eq!(scene.id(), Some("0a1b"));
        assert_eq!(scene.name(), Some("Top"));
        assert_eq!(scene.start_frame(), Some(1));
        assert_eq!(scene.end_frame(), Some(24));
        assert_eq!(scene.frame_count(), Some(24));
    }

    #[test]
    fn test_scene_registries_and_graph() {
        let document = parse(SOURCE).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();

        assert_eq!(scene.elements().count(), 1);
        assert_eq!(scene.columns().count(), 2);
        assert_eq!(scene.graph().nodes_count(), 2);
        assert_eq!(scene.graph().links_count(), 1);

        let drawing = scene.graph().child("Drawing").unwrap();
        let column = scene.node_column(drawing).unwrap();
        assert_eq!(column.name(), Some("Drawing"));
        assert_eq!(column.element().unwrap().name(), Some("Drawing"));

        let write = scene.graph().child("Write").unwrap();
        assert!(scene.node_column(write).is_none());
    }

    #[test]
    fn test_unresolved_column_is_a_single_warning() {
        let document = parse(SOURCE).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();

        assert!(scene.column_by_name("col1").unwrap().element().is_none());
        assert_eq!(scene.warnings().len(), 1);
        assert_eq!(scene.warnings()[0].code(), Some(ErrorCode::E203));
    }

    #[test]
    fn test_missing_scene_is_malformed() {
        let document = parse(SOURCE).unwrap();
        let config = AppConfig::new(SceneConfig::new("Shot_010"), Default::default());
        let err = Scene::build(&document, &config).unwrap_err();

        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E100));
        assert_eq!(diagnostic.help(), Some("available scenes: Top"));
    }

    #[test]
    fn test_missing_rootgroup_is_malformed() {
        let document = parse(r#"<project><scenes><scene name="Top"/></scenes></project>"#).unwrap();
        let err = Scene::build(&document, &AppConfig::default()).unwrap_err();

        assert_eq!(err.diagnostics()[0].message(), "scene `Top` has no `rootgroup`");
    }

    #[test]
    fn test_frames_are_optional() {
        let document = parse(
            r#"<project><scenes><scene name="Top"><rootgroup><nodeslist/></rootgroup></scene></scenes></project>"#,
        )
        .unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();

        assert_eq!(scene.id(), None);
        assert_eq!(scene.start_frame(), None);
        assert_eq!(scene.frame_count(), None);
        assert!(scene.graph().root().is_empty());
    }

    fn scene_with_frames(start: &str, stop: &str) -> String {
        format!(
            r#"<project><scenes><scene name="Top" startFrame="{start}" stopFrame="{stop}"><rootgroup><nodeslist/></rootgroup></scene></scenes></project>"#
        )
    }

    #[test]
    fn test_frame_count_of_extreme_ranges() {
        let source = scene_with_frames("-9223372036854775808", "9223372036854775807");
        let document = parse(&source).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();
        assert_eq!(scene.start_frame(), Some(i64::MIN));
        assert_eq!(scene.frame_count(), None);

        let source = scene_with_frames("0", "9223372036854775807");
        let document = parse(&source).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();
        assert_eq!(scene.frame_count(), Some(1 << 63));

        let source = scene_with_frames("12", "1");
        let document = parse(&source).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();
        assert_eq!(scene.frame_count(), None);
    }

    #[test]
    fn test_columns_come_from_the_selected_scene() {
        let source = r#"<project>
  <elements>
    <element id="1" elementName="Ink"/>
    <element id="2" elementName="Paint"/>
  </elements>
  <scenes>
    <scene name="Other">
      <columns><column type="0" name="Drawing" id="1"><elementSeq id="1"/></column></columns>
      <rootgroup name="Other"><nodeslist/></rootgroup>
    </scene>
    <scene name="Top">
      <columns><column type="0" name="Drawing" id="1"><elementSeq id="2"/></column></columns>
      <rootgroup name="Top">
        <nodeslist>
          <module type="READ" name="Drawing"><attrs><element col="Drawing"/></attrs></module>
        </nodeslist>
      </rootgroup>
    </scene>
  </scenes>
</project>"#;
        let document = parse(source).unwrap();
        let scene = Scene::build(&document, &AppConfig::default()).unwrap();

        assert!(scene.warnings().is_empty());
        assert_eq!(scene.columns().count(), 1);
        assert_eq!(
            scene.column_by_id("1").unwrap().element().unwrap().name(),
            Some("Paint")
        );

        let drawing = scene.graph().child("Drawing").unwrap();
        let column = scene.node_column(drawing).unwrap();
        assert_eq!(column.element().unwrap().name(), Some("Paint"));
    }
}
