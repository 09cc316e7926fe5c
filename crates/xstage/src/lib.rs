//! xstage - structured access to Toon Boom Harmony scene documents.
//!
//! Reads `.xstage` projects into a read-only object model: the elements a
//! project declares, the columns that use them, and the node graph of a scene
//! with nested groups, resolved links and stable hierarchical node paths.

pub mod config;
pub mod scene;
pub mod structure;

mod error;

pub use xstage_core::{document, identifier, semantic};
pub use xstage_parser::error as diagnostics;

pub use error::XstageError;
pub use scene::Scene;
pub use structure::{ContainmentScope, Graph, GraphBuilder, Link, Node};

use std::{fs, path::Path};

use log::{debug, info, trace};

use xstage_core::document::{Document, Fragment};
use xstage_parser::{
    ReferenceIndex,
    error::{Diagnostic, ParseError},
};

use config::{AppConfig, GraphConfig};

/// Builder for reading Harmony scenes.
///
/// This provides an API for processing scene documents through reading and
/// model construction.
///
/// # Examples
///
/// ```rust
/// use xstage::{SceneBuilder, config::AppConfig};
///
/// let source = r#"
///     <project>
///       <scenes>
///         <scene name="Top" startFrame="1" stopFrame="12">
///           <rootgroup name="Top"><nodeslist/></rootgroup>
///         </scene>
///       </scenes>
///     </project>
/// "#;
///
/// let builder = SceneBuilder::new(AppConfig::default());
///
/// // Read source text into a document
/// let document = builder.parse(source).expect("Failed to parse");
///
/// // Build the scene model over the document
/// let scene = builder.build(&document).expect("Failed to build");
/// assert_eq!(scene.frame_count(), Some(12));
/// ```
#[derive(Debug, Default)]
pub struct SceneBuilder {
    config: AppConfig,
}

impl SceneBuilder {
    /// Create a new scene builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including scene and graph settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a document.
    ///
    /// # Errors
    ///
    /// Returns `XstageError::Parse` when the source is not a well-formed XML
    /// document.
    pub fn parse(&self, source: &str) -> Result<Document, XstageError> {
        info!("Parsing document");

        let document =
            xstage_parser::parse(source).map_err(|err| XstageError::new_parse_error(err, source))?;

        debug!("Document parsed successfully");
        trace!(document:?; "Parsed document");

        Ok(document)
    }

    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `XstageError::Io` when the file cannot be read, or
    /// `XstageError::Parse` when its content is not well-formed.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, XstageError> {
        let path = path.as_ref();
        info!(path:? = path; "Loading document");

        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Build the scene model over a parsed document.
    ///
    /// # Errors
    ///
    /// Returns `XstageError::Parse` when the configured scene, its root group,
    /// or a group's node list is missing, or a node has no name.
    pub fn build<'doc>(&self, document: &'doc Document) -> Result<Scene<'doc>, XstageError> {
        let scene = Scene::build(document, &self.config)
            .map_err(|err| XstageError::new_parse_error(err, document.source()))?;

        info!(
            nodes = scene.graph().nodes_count(),
            warnings = scene.warnings().len();
            "Scene built successfully"
        );
        Ok(scene)
    }
}

/// Build the node graph rooted at `root`.
///
/// `root` is the fragment holding the top-level `nodeslist`. Returns the graph
/// together with every warning raised while indexing and linking.
///
/// # Errors
///
/// Returns a [`ParseError`] when a level has no `nodeslist` or a node has no
/// `name`.
///
/// # Examples
///
/// ```rust
/// use xstage::{build_graph, config::GraphConfig};
///
/// let document = xstage_parser::parse(r#"
///     <rootgroup name="Top">
///       <nodeslist>
///         <module type="TRANSFORM" name="A"/>
///         <module type="GROUP" name="B">
///           <nodeslist><module type="TRANSFORM" name="C"/></nodeslist>
///         </module>
///       </nodeslist>
///       <linkedlist><link out="A" in="B"/></linkedlist>
///     </rootgroup>
/// "#).unwrap();
///
/// let (graph, warnings) = build_graph(document.root(), &GraphConfig::default()).unwrap();
/// assert!(warnings.is_empty());
///
/// let paths: Vec<_> = graph.iter_children(true).map(|node| node.path()).collect();
/// assert_eq!(paths, ["A", "B", "B/C"]);
/// ```
pub fn build_graph<'doc>(
    root: Fragment<'doc>,
    config: &GraphConfig,
) -> Result<(Graph<'doc>, Vec<Diagnostic>), ParseError> {
    let document = root.document();
    let (index, mut warnings) = ReferenceIndex::build(document);

    let (graph, dropped) = GraphBuilder::new(config).build(document, root.id(), &index)?;
    warnings.extend(dropped);

    Ok((graph, warnings))
}
