//! Builds the node graph from a scene document.
//!
//! Construction runs in two phases per level. First every node of the level's
//! `nodeslist` is created in document order; container nodes recurse into
//! their own fragment right away, so nested levels are numbered depth-first.
//! Then the level's `linkedlist` is resolved against the nodes of that level
//! only. Reference misses never abort the build: the link is dropped and a
//! warning is recorded. A level without `nodeslist` or a node without a name
//! leaves the containment tree unusable and fails the build.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use log::{debug, info, trace};

use xstage_core::{
    document::{Document, Fragment, FragmentId},
    identifier::Id,
};
use xstage_parser::{
    Namespace, ReferenceIndex,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
};

use crate::config::GraphConfig;

use super::model::{Graph, LinkData, NodeIndex, NodeRecord, ScopeIndex};

/// Builder of [`Graph`]s.
///
/// # Example
///
/// ```
/// # use xstage::{config::GraphConfig, structure::GraphBuilder};
/// # use xstage_parser::{parse, ReferenceIndex};
/// let document = parse(r#"
///     <rootgroup name="Top">
///       <nodeslist>
///         <module type="READ" name="Drawing"/>
///         <module type="WRITE" name="Write"/>
///       </nodeslist>
///       <linkedlist><link out="Drawing" in="Write"/></linkedlist>
///     </rootgroup>
/// "#).unwrap();
/// let (index, _) = ReferenceIndex::build(&document);
///
/// let config = GraphConfig::default();
/// let (graph, warnings) = GraphBuilder::new(&config)
///     .build(&document, document.root_id(), &index)
///     .unwrap();
///
/// assert!(warnings.is_empty());
/// assert_eq!(graph.links_count(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'cfg> {
    config: &'cfg GraphConfig,
}

/// Per-build state shared by every level.
struct BuildContext<'doc, 'idx> {
    graph: Graph<'doc>,
    index: &'idx ReferenceIndex,
    /// Fragment owning the `columns` that node `col` references resolve in.
    column_scope: Option<FragmentId>,
    diagnostics: DiagnosticCollector,
    default_port: Id,
}

impl<'cfg> GraphBuilder<'cfg> {
    pub fn new(config: &'cfg GraphConfig) -> Self {
        Self { config }
    }

    /// Builds the graph rooted at `root`.
    ///
    /// `root` is the fragment holding the top-level `nodeslist` (the scene's
    /// `rootgroup`). Returns the graph and the warnings raised while linking.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with every `MalformedDocument` diagnostic when
    /// a level has no `nodeslist` or a node has no `name`.
    pub fn build<'doc>(
        &self,
        document: &'doc Document,
        root: FragmentId,
        index: &ReferenceIndex,
    ) -> Result<(Graph<'doc>, Vec<Diagnostic>), ParseError> {
        let root = document.fragment(root).ok_or_else(|| {
            ParseError::from(
                Diagnostic::error("graph root is not a fragment of the document")
                    .with_code(ErrorCode::E100),
            )
        })?;
        info!(root = root.tag(); "Building node graph");

        let column_scope = std::iter::successors(Some(root), |fragment| fragment.parent())
            .find(|fragment| fragment.child("columns").is_some())
            .map(|fragment| fragment.id());

        let mut context = BuildContext {
            graph: Graph::new(document, self.config.path_separator()),
            index,
            column_scope,
            diagnostics: DiagnosticCollector::new(),
            default_port: Id::new(self.config.default_port()),
        };
        self.build_scope(&mut context, root, None);

        let BuildContext {
            graph, diagnostics, ..
        } = context;
        let warnings = diagnostics.finish()?;

        info!(
            scopes = graph.scopes.len(),
            nodes = graph.nodes_count(),
            links = graph.links_count(),
            warnings = warnings.len();
            "Node graph built"
        );
        Ok((graph, warnings))
    }

    fn build_scope<'doc>(
        &self,
        context: &mut BuildContext<'doc, '_>,
        fragment: Fragment<'doc>,
        parent: Option<NodeIndex>,
    ) -> ScopeIndex {
        let scope = context.graph.push_scope(parent, fragment.id());

        let Some(nodeslist) = fragment.child("nodeslist") else {
            let name = fragment.attribute("name").unwrap_or(fragment.tag());
            context.diagnostics.emit(
                Diagnostic::error(format!("group `{name}` has no `nodeslist`"))
                    .with_code(ErrorCode::E100)
                    .with_label(fragment.span(), "group declared here")
                    .with_help("every group lists its nodes in a `<nodeslist>` child"),
            );
            return scope;
        };

        let mut members: HashMap<FragmentId, NodeIndex> = HashMap::new();
        let mut seen: HashMap<Id, usize> = HashMap::new();
        let mut segments =
            LevelSegments::new(nodeslist.children().filter_map(|child| child.attribute("name")));
        for child in nodeslist.children() {
            let Some(name) = child.attribute("name") else {
                context.diagnostics.emit(
                    Diagnostic::error(format!("`{}` node without a `name` attribute", child.tag()))
                        .with_code(ErrorCode::E101)
                        .with_label(child.span(), "node declared here"),
                );
                continue;
            };
            let name = Id::new(name);
            let kind = Id::new(child.attribute("type").unwrap_or(child.tag()));

            let occurrences = seen.entry(name).or_insert(0);
            let rank = *occurrences;
            *occurrences += 1;
            let suffix = if rank == 0 {
                0
            } else {
                segments.suffix_for(name)
            };

            let column = self.resolve_column(context, child);
            let node = context.graph.push_node(NodeRecord {
                fragment: child.id(),
                name,
                kind,
                scope,
                rank,
                suffix,
                subgraph: None,
                column,
                path: OnceLock::new(),
            });
            members.insert(child.id(), node);
            trace!(name:%, kind:%, rank, suffix; "Built node");

            if kind.with_str(|kind| self.config.is_container_kind(kind)) {
                let subgraph = self.build_scope(context, child, Some(node));
                context.graph.nodes[node.index()].subgraph = Some(subgraph);
            }
        }

        self.link_scope(context, scope, fragment, &members);

        let record = context.graph.scope_record(scope);
        debug!(
            scope = scope.index(),
            nodes = record.links.nodes_count(),
            links = record.links.edges_count();
            "Level built"
        );
        scope
    }

    fn link_scope(
        &self,
        context: &mut BuildContext<'_, '_>,
        scope: ScopeIndex,
        fragment: Fragment<'_>,
        members: &HashMap<FragmentId, NodeIndex>,
    ) {
        let Some(linkedlist) = fragment.child("linkedlist") else {
            return;
        };
        let group = fragment.attribute("name").unwrap_or(fragment.tag());

        for link in linkedlist.children() {
            let (Some(out), Some(into)) = (link.attribute("out"), link.attribute("in")) else {
                context.diagnostics.emit(
                    Diagnostic::warning(format!(
                        "link in group `{group}` is missing its `out` or `in` attribute"
                    ))
                    .with_code(ErrorCode::E204)
                    .with_label(link.span(), "link dropped"),
                );
                continue;
            };

            let source = self.resolve_endpoint(context, fragment, members, link, out, "source");
            let target = self.resolve_endpoint(context, fragment, members, link, into, "target");
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };

            let source_port =
                self.resolve_port(context, link, source, "outport", Namespace::OutPort);
            let target_port = self.resolve_port(context, link, target, "inport", Namespace::InPort);
            let (Some(source_port), Some(target_port)) = (source_port, target_port) else {
                continue;
            };

            context.graph.scopes[scope.index()].links.add_edge(
                source,
                target,
                LinkData {
                    fragment: link.id(),
                    source_port,
                    target_port,
                },
            );
            trace!(source = out, target = into; "Linked nodes");
        }
    }

    /// Resolves a link endpoint against the nodes of the level only.
    fn resolve_endpoint(
        &self,
        context: &mut BuildContext<'_, '_>,
        level: Fragment<'_>,
        members: &HashMap<FragmentId, NodeIndex>,
        link: Fragment<'_>,
        name: &str,
        role: &str,
    ) -> Option<NodeIndex> {
        let node = context
            .index
            .resolve(Namespace::Node(level.id()), name)
            .and_then(|fragment| members.get(&fragment).copied());

        if node.is_none() {
            let group = level.attribute("name").unwrap_or(level.tag());
            context.diagnostics.emit(
                Diagnostic::warning(format!(
                    "link {role} `{name}` is not a node of group `{group}`"
                ))
                .with_code(ErrorCode::E201)
                .with_label(link.span(), "link dropped")
                .with_help("link endpoints must name nodes of the same group"),
            );
        }
        node
    }

    /// Reads the port of one link endpoint.
    ///
    /// Ports are checked only when the node declares ports of that direction.
    fn resolve_port(
        &self,
        context: &mut BuildContext<'_, '_>,
        link: Fragment<'_>,
        node: NodeIndex,
        attribute: &str,
        namespace: fn(FragmentId) -> Namespace,
    ) -> Option<Id> {
        let Some(port) = link.attribute(attribute) else {
            return Some(context.default_port);
        };

        let node_fragment = context.graph.nodes[node.index()].fragment;
        let namespace = namespace(node_fragment);
        if context.index.declares(namespace) && context.index.resolve(namespace, port).is_none() {
            let node_name = context.graph.nodes[node.index()].name;
            context.diagnostics.emit(
                Diagnostic::warning(format!("node `{node_name}` declares no {attribute} `{port}`"))
                    .with_code(ErrorCode::E202)
                    .with_label(link.span(), "link dropped"),
            );
            return None;
        }
        Some(Id::new(port))
    }

    /// Resolves `attrs/element@col` against the column names of the scene.
    fn resolve_column(
        &self,
        context: &mut BuildContext<'_, '_>,
        node: Fragment<'_>,
    ) -> Option<FragmentId> {
        let column = node
            .find("attrs/element")
            .and_then(|element| element.attribute("col"))?;

        let resolved = context
            .column_scope
            .and_then(|scene| context.index.resolve(Namespace::ColumnName(scene), column));
        if resolved.is_none() {
            let name = node.attribute("name").unwrap_or(node.tag());
            context.diagnostics.emit(
                Diagnostic::warning(format!(
                    "node `{name}` references column `{column}` which is not declared"
                ))
                .with_code(ErrorCode::E205)
                .with_label(node.span(), "node declared here"),
            );
        }
        resolved
    }
}

/// Path segments handed out within one level.
struct LevelSegments {
    taken: HashSet<String>,
    next: HashMap<Id, usize>,
}

impl LevelSegments {
    /// Reserves every node name of the level.
    fn new<'a>(names: impl Iterator<Item = &'a str>) -> Self {
        Self {
            taken: names.map(str::to_string).collect(),
            next: HashMap::new(),
        }
    }

    /// Smallest `k >= 1` such that `name#k` is neither a node name of the
    /// level nor a segment already handed out.
    fn suffix_for(&mut self, name: Id) -> usize {
        let next = self.next.entry(name).or_insert(1);
        loop {
            let suffix = *next;
            *next += 1;
            if self.taken.insert(format!("{name}#{suffix}")) {
                return suffix;
            }
        }
    }
}
