//! Arena of graph levels and nodes, and the borrowed views over it.
//!
//! A [`Graph`] stores every containment level and every node of a scene in two
//! flat arenas. Containment is a tree of levels: each level except the top one
//! is owned by exactly one container node. Links live inside a level and only
//! join nodes of that level, so the containment tree and the link edges never
//! share storage.
//!
//! Callers work with copyable views: [`Node`], [`ContainmentScope`] and
//! [`Link`]. All of them borrow the graph and hand out data borrowed from the
//! underlying [`Document`].

use std::{
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
    sync::OnceLock,
};

use xstage_core::{
    document::{Attributes, Document, Fragment, FragmentId},
    identifier::Id,
};

use super::graph_base::{EdgeIndex, GraphInternal};

/// Handle of a node in its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in construction order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of a containment level in its [`Graph`]. The top level is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeIndex(usize);

impl ScopeIndex {
    pub(crate) const ROOT: ScopeIndex = ScopeIndex(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Data carried by a link edge.
#[derive(Debug, Clone, Copy)]
pub(super) struct LinkData {
    pub(super) fragment: FragmentId,
    pub(super) source_port: Id,
    pub(super) target_port: Id,
}

#[derive(Debug)]
pub(super) struct ScopeRecord {
    pub(super) parent: Option<NodeIndex>,
    pub(super) fragment: FragmentId,
    pub(super) links: GraphInternal<LinkData>,
}

#[derive(Debug)]
pub(super) struct NodeRecord {
    pub(super) fragment: FragmentId,
    pub(super) name: Id,
    pub(super) kind: Id,
    pub(super) scope: ScopeIndex,
    /// Number of earlier nodes of the same level with the same name.
    pub(super) rank: usize,
    /// `k` of the `name#k` path segment, `0` for a plain name.
    pub(super) suffix: usize,
    pub(super) subgraph: Option<ScopeIndex>,
    pub(super) column: Option<FragmentId>,
    pub(super) path: OnceLock<String>,
}

/// The node graph of a scene.
///
/// Built once by [`super::GraphBuilder`] and immutable afterwards; the only
/// lazily filled state is the per-node path cache, which is thread-safe.
pub struct Graph<'doc> {
    document: &'doc Document,
    separator: String,
    pub(super) scopes: Vec<ScopeRecord>,
    pub(super) nodes: Vec<NodeRecord>,
}

impl<'doc> Graph<'doc> {
    pub(super) fn new(document: &'doc Document, separator: impl Into<String>) -> Self {
        Self {
            document,
            separator: separator.into(),
            scopes: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub(super) fn push_scope(&mut self, parent: Option<NodeIndex>, fragment: FragmentId) -> ScopeIndex {
        self.scopes.push(ScopeRecord {
            parent,
            fragment,
            links: GraphInternal::new(),
        });
        ScopeIndex(self.scopes.len() - 1)
    }

    pub(super) fn push_node(&mut self, record: NodeRecord) -> NodeIndex {
        let scope = record.scope;
        self.nodes.push(record);
        let index = NodeIndex(self.nodes.len() - 1);
        self.scopes[scope.0].links.add_node(index);
        index
    }

    /// The document this graph was built from.
    pub fn document(&self) -> &'doc Document {
        self.document
    }

    /// Separator placed between path segments.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The top level of the graph.
    pub fn root(&self) -> ContainmentScope<'_> {
        ContainmentScope {
            graph: self,
            index: ScopeIndex::ROOT,
        }
    }

    pub fn scope(&self, index: ScopeIndex) -> Option<ContainmentScope<'_>> {
        (index.0 < self.scopes.len()).then_some(ContainmentScope { graph: self, index })
    }

    /// Every level, the top level first and nested levels in construction order.
    pub fn scopes(&self) -> impl Iterator<Item = ContainmentScope<'_>> {
        (0..self.scopes.len()).map(move |index| ContainmentScope {
            graph: self,
            index: ScopeIndex(index),
        })
    }

    pub fn node(&self, index: NodeIndex) -> Option<Node<'_>> {
        (index.0 < self.nodes.len()).then_some(Node { graph: self, index })
    }

    /// Node wrapping the given document fragment.
    pub fn node_by_fragment(&self, fragment: FragmentId) -> Option<Node<'_>> {
        self.nodes
            .iter()
            .position(|record| record.fragment == fragment)
            .map(|index| Node {
                graph: self,
                index: NodeIndex(index),
            })
    }

    /// Total number of nodes across all levels.
    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of resolved links across all levels.
    pub fn links_count(&self) -> usize {
        self.scopes
            .iter()
            .map(|scope| scope.links.edges_count())
            .sum()
    }

    /// Direct child of the top level with the given name.
    pub fn child(&self, name: &str) -> Option<Node<'_>> {
        self.root().child(name)
    }

    pub(super) fn record(&self, index: NodeIndex) -> &NodeRecord {
        &self.nodes[index.0]
    }

    pub(super) fn scope_record(&self, index: ScopeIndex) -> &ScopeRecord {
        &self.scopes[index.0]
    }
}

impl fmt::Debug for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("scopes", &self.scopes.len())
            .field("nodes", &self.nodes.len())
            .field("links", &self.links_count())
            .finish()
    }
}

/// One level of the graph: its nodes and the links between them.
#[derive(Clone, Copy)]
pub struct ContainmentScope<'g> {
    pub(super) graph: &'g Graph<'g>,
    pub(super) index: ScopeIndex,
}

impl<'g> ContainmentScope<'g> {
    pub fn index(&self) -> ScopeIndex {
        self.index
    }

    pub fn graph(&self) -> &'g Graph<'g> {
        self.graph
    }

    /// The container node owning this level; `None` for the top level.
    pub fn parent(&self) -> Option<Node<'g>> {
        self.record().parent.map(|index| Node {
            graph: self.graph,
            index,
        })
    }

    /// Fragment holding the level's `nodeslist` and `linkedlist`.
    pub fn fragment(&self) -> Fragment<'g> {
        self.fragment_of(self.record().fragment)
    }

    /// Direct nodes in construction order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'g>> + use<'g> {
        let graph = self.graph;
        self.graph
            .scope_record(self.index)
            .links
            .nodes()
            .iter()
            .map(move |&index| Node { graph, index })
    }

    pub fn len(&self) -> usize {
        self.record().links.nodes_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First direct node named `name`.
    pub fn child(&self, name: &str) -> Option<Node<'g>> {
        let name = Id::lookup(name)?;
        self.nodes().find(|node| node.name_id() == name)
    }

    /// Resolved links of this level in document order.
    pub fn links(&self) -> impl Iterator<Item = Link<'g>> + use<'g> {
        let graph = self.graph;
        let scope = self.index;
        self.graph
            .scope_record(scope)
            .links
            .edge_indices()
            .map(move |edge| Link { graph, scope, edge })
    }

    pub fn links_count(&self) -> usize {
        self.record().links.edges_count()
    }

    /// Nodes without incoming links, in construction order.
    pub fn roots(&self) -> impl Iterator<Item = Node<'g>> + use<'g> {
        let graph = self.graph;
        self.graph
            .scope_record(self.index)
            .links
            .roots()
            .map(move |index| Node { graph, index })
    }

    fn record(&self) -> &'g ScopeRecord {
        self.graph.scope_record(self.index)
    }

    fn fragment_of(&self, id: FragmentId) -> Fragment<'g> {
        fragment(self.graph, id)
    }
}

impl PartialEq for ContainmentScope<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl Eq for ContainmentScope<'_> {}

impl fmt::Debug for ContainmentScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainmentScope")
            .field("index", &self.index.0)
            .field("parent", &self.parent())
            .field("nodes", &self.len())
            .field("links", &self.links_count())
            .finish()
    }
}

/// Resolves a fragment handle that the graph recorded while building.
fn fragment<'g>(graph: &'g Graph<'g>, id: FragmentId) -> Fragment<'g> {
    match graph.document().fragment(id) {
        Some(fragment) => fragment,
        None => unreachable!("graph refers to fragment {id:?} outside its document"),
    }
}

/// A vertex of the graph.
///
/// Two nodes are equal when they wrap the same fragment of the same document.
#[derive(Clone, Copy)]
pub struct Node<'g> {
    pub(super) graph: &'g Graph<'g>,
    pub(super) index: NodeIndex,
}

impl<'g> Node<'g> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn graph(&self) -> &'g Graph<'g> {
        self.graph
    }

    /// Value of the `name` attribute.
    pub fn name(&self) -> &'g str {
        self.fragment().attribute("name").unwrap_or_default()
    }

    pub fn name_id(&self) -> Id {
        self.record().name
    }

    /// The `type` attribute, or the fragment tag when it has none.
    pub fn kind(&self) -> &'g str {
        let fragment = self.fragment();
        fragment.attribute("type").unwrap_or(fragment.tag())
    }

    pub fn kind_id(&self) -> Id {
        self.record().kind
    }

    pub fn attributes(&self) -> &'g Attributes {
        self.fragment().attributes()
    }

    pub fn attribute(&self, name: &str) -> Option<&'g str> {
        self.fragment().attribute(name)
    }

    /// The underlying document fragment.
    pub fn fragment(&self) -> Fragment<'g> {
        fragment(self.graph, self.record().fragment)
    }

    /// Number of earlier nodes of the same level sharing this node's name.
    pub fn rank(&self) -> usize {
        self.record().rank
    }

    /// The path segment of this node: its name, or `name#k` for a repeated
    /// name of its level.
    pub fn segment(&self) -> Cow<'g, str> {
        match self.record().suffix {
            0 => Cow::Borrowed(self.name()),
            suffix => Cow::Owned(format!("{}#{suffix}", self.name())),
        }
    }

    /// The level this node belongs to.
    pub fn scope(&self) -> ContainmentScope<'g> {
        ContainmentScope {
            graph: self.graph,
            index: self.record().scope,
        }
    }

    /// The container node owning this node's level; `None` at the top level.
    pub fn parent(&self) -> Option<Node<'g>> {
        self.scope().parent()
    }

    pub fn is_container(&self) -> bool {
        self.record().subgraph.is_some()
    }

    /// The nested level owned by this node, if it is a container.
    pub fn subgraph(&self) -> Option<ContainmentScope<'g>> {
        self.record().subgraph.map(|index| ContainmentScope {
            graph: self.graph,
            index,
        })
    }

    /// First direct child of this container named `name`.
    pub fn child(&self, name: &str) -> Option<Node<'g>> {
        self.subgraph()?.child(name)
    }

    /// Raw column name from `attrs/element@col`.
    pub fn column_ref(&self) -> Option<&'g str> {
        self.fragment()
            .find("attrs/element")
            .and_then(|element| element.attribute("col"))
    }

    /// Fragment of the column this node draws from, when it resolved.
    pub fn column_fragment(&self) -> Option<FragmentId> {
        self.record().column
    }

    fn record(&self) -> &'g NodeRecord {
        self.graph.record(self.index)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.fragment() == other.fragment()
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record().fragment.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}('{}')", self.kind(), self.path())
    }
}

/// A resolved, directed link between two ports of nodes of the same level.
#[derive(Clone, Copy)]
pub struct Link<'g> {
    graph: &'g Graph<'g>,
    scope: ScopeIndex,
    edge: EdgeIndex,
}

impl<'g> Link<'g> {
    pub(super) fn new(graph: &'g Graph<'g>, scope: ScopeIndex, edge: EdgeIndex) -> Self {
        Self { graph, scope, edge }
    }

    fn parts(&self) -> (NodeIndex, NodeIndex, LinkData) {
        match self.graph.scope_record(self.scope).links.edge(self.edge) {
            Some(parts) => parts,
            None => unreachable!("link {:?} outside its level", self.edge),
        }
    }

    pub fn source(&self) -> Node<'g> {
        Node {
            graph: self.graph,
            index: self.parts().0,
        }
    }

    pub fn source_port(&self) -> Id {
        self.parts().2.source_port
    }

    pub fn target(&self) -> Node<'g> {
        Node {
            graph: self.graph,
            index: self.parts().1,
        }
    }

    pub fn target_port(&self) -> Id {
        self.parts().2.target_port
    }

    pub fn is_self_loop(&self) -> bool {
        let (source, target, _) = self.parts();
        source == target
    }

    /// The level the link belongs to.
    pub fn scope(&self) -> ContainmentScope<'g> {
        ContainmentScope {
            graph: self.graph,
            index: self.scope,
        }
    }

    /// The `linkedlist` entry the link was read from.
    pub fn fragment(&self) -> Fragment<'g> {
        fragment(self.graph, self.parts().2.fragment)
    }
}

impl PartialEq for Link<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.fragment() == other.fragment()
    }
}

impl Eq for Link<'_> {}

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source().segment(),
            self.source_port(),
            self.target().segment(),
            self.target_port()
        )
    }
}
