//! Low-level link storage for one graph level.
//!
//! This module provides the adjacency structure each containment level keeps
//! for its links. Node data lives in the graph arena; this table only records
//! which member nodes are joined by which edges.
//!
//! # Architecture
//!
//! The module provides:
//! - [`EdgeIndex`]: Index of an edge within its table
//! - [`Edge`]: Edge structure storing source, target, and associated data
//! - [`GraphInternal`]: Member nodes, edges and per-node incoming/outgoing lists
//!
//! The table is directed and allows self-loops and multiple edges between the
//! same pair of nodes. This is an internal module; its types are used by the
//! level records of [`super::Graph`].

use std::{collections::HashMap, fmt::Debug};

use super::model::NodeIndex;

// =============================================================================
// Low-level primitive types and internal data structures
// =============================================================================

/// Index of an edge within its [`GraphInternal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct EdgeIndex(usize);

impl EdgeIndex {
    fn new(index: usize) -> Self {
        EdgeIndex(index)
    }
}

/// A directed edge in the table.
#[derive(Debug)]
struct Edge<E>
where
    E: Copy + Debug,
{
    source: NodeIndex,
    target: NodeIndex,
    value: E,
}

impl<E> Edge<E>
where
    E: Copy + Debug,
{
    fn new(source: NodeIndex, target: NodeIndex, value: E) -> Self {
        Edge {
            source,
            target,
            value,
        }
    }
}

// =============================================================================
// Core internal graph structure
// =============================================================================

/// Adjacency table of one level.
///
/// Member nodes keep their insertion order. Edge data of type `E` is stored
/// once and referenced from the incoming and outgoing lists of its endpoints.
#[derive(Debug)]
pub(super) struct GraphInternal<E>
where
    E: Copy + Debug,
{
    nodes: Vec<NodeIndex>,
    edges: Vec<Edge<E>>,
    income_edges: HashMap<NodeIndex, Vec<EdgeIndex>>,
    outgoing_edges: HashMap<NodeIndex, Vec<EdgeIndex>>,
}

impl<E> GraphInternal<E>
where
    E: Copy + Debug,
{
    /// Creates a new empty table.
    pub(super) fn new() -> Self {
        GraphInternal {
            nodes: Vec::new(),
            edges: Vec::new(),
            income_edges: HashMap::new(),
            outgoing_edges: HashMap::new(),
        }
    }

    /// Member nodes in insertion order.
    pub(super) fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub(super) fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(&node)
    }

    pub(super) fn edges_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the endpoints and data of an edge, if it exists.
    pub(super) fn edge(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex, E)> {
        self.edges
            .get(idx.0)
            .map(|edge| (edge.source, edge.target, edge.value))
    }

    /// Returns an iterator over all edge indices in insertion order.
    pub(super) fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        (0..self.edges.len()).map(EdgeIndex::new)
    }

    /// Returns an iterator over `(source, target)` pairs of all edges.
    pub(super) fn endpoints(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.edges.iter().map(|edge| (edge.source, edge.target))
    }

    /// Edges arriving at `node`, in insertion order.
    pub(super) fn incoming(&self, node: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.income_edges.get(&node).into_iter().flatten().copied()
    }

    /// Edges leaving `node`, in insertion order.
    pub(super) fn outgoing(&self, node: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.outgoing_edges
            .get(&node)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Returns an iterator over root nodes (nodes with no incoming edges).
    pub(super) fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .iter()
            .copied()
            .filter(|node| !self.income_edges.contains_key(node))
    }

    /// Sources of the edges arriving at `node`; repeated once per edge.
    pub(super) fn incoming_nodes(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.incoming(node).map(|idx| self.edges[idx.0].source)
    }

    /// Targets of the edges leaving `node`; repeated once per edge.
    pub(super) fn outgoing_nodes(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.outgoing(node).map(|idx| self.edges[idx.0].target)
    }

    /// Adds a member node.
    pub(super) fn add_node(&mut self, node: NodeIndex) {
        debug_assert!(!self.contains_node(node), "Node {node:?} added twice");
        self.nodes.push(node);
    }

    /// Adds a directed edge between two member nodes.
    ///
    /// # Panics
    /// Panics in debug mode if either endpoint is not a member node. This check
    /// is for internal developer testing; release builds skip it.
    pub(super) fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, edge: E) -> EdgeIndex {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.contains_node(source),
                "Adding edge: Source node {source:?} does not exist for {edge:?}",
            );
            assert!(
                self.contains_node(target),
                "Adding edge: Target node {target:?} does not exist for {edge:?}",
            );
        }

        self.edges.push(Edge::new(source, target, edge));

        let idx = EdgeIndex::new(self.edges.len() - 1);
        self.outgoing_edges.entry(source).or_default().push(idx);
        self.income_edges.entry(target).or_default().push(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct TestEdge {
        weight: i32,
    }

    fn table(count: usize) -> (GraphInternal<TestEdge>, Vec<NodeIndex>) {
        let mut graph = GraphInternal::new();
        let nodes: Vec<_> = (0..count).map(NodeIndex::new).collect();
        for &node in &nodes {
            graph.add_node(node);
        }
        (graph, nodes)
    }

    #[test]
    fn test_graph_new() {
        let graph: GraphInternal<TestEdge> = GraphInternal::new();

        assert_eq!(graph.nodes_count(), 0);
        assert_eq!(graph.edges_count(), 0);
        assert_eq!(graph.roots().count(), 0);
    }

    #[test]
    fn test_add_node_keeps_order() {
        let (graph, nodes) = table(3);

        assert_eq!(graph.nodes(), nodes.as_slice());
        assert!(graph.contains_node(nodes[2]));
        assert!(!graph.contains_node(NodeIndex::new(9)));
    }

    #[test]
    fn test_add_edge() {
        let (mut graph, nodes) = table(2);
        let edge = TestEdge { weight: 5 };

        let idx = graph.add_edge(nodes[0], nodes[1], edge);

        assert_eq!(graph.edge(idx), Some((nodes[0], nodes[1], edge)));
        assert_eq!(graph.edges_count(), 1);
        assert_eq!(graph.edge_indices().collect::<Vec<_>>(), vec![idx]);
    }

    #[test]
    fn test_roots() {
        let (mut graph, nodes) = table(3);
        graph.add_edge(nodes[0], nodes[2], TestEdge { weight: 1 });

        let roots: Vec<_> = graph.roots().collect();
        assert_eq!(roots, vec![nodes[0], nodes[1]]);
    }

    #[test]
    fn test_incoming_and_outgoing_nodes() {
        let (mut graph, nodes) = table(4);
        graph.add_edge(nodes[0], nodes[1], TestEdge { weight: 1 });
        graph.add_edge(nodes[0], nodes[2], TestEdge { weight: 2 });

        assert_eq!(
            graph.outgoing_nodes(nodes[0]).collect::<Vec<_>>(),
            vec![nodes[1], nodes[2]]
        );
        assert_eq!(
            graph.incoming_nodes(nodes[2]).collect::<Vec<_>>(),
            vec![nodes[0]]
        );
        assert_eq!(graph.outgoing_nodes(nodes[3]).count(), 0);
    }

    #[test]
    fn test_self_loop() {
        let (mut graph, nodes) = table(1);
        let edge = TestEdge { weight: 1 };

        let idx = graph.add_edge(nodes[0], nodes[0], edge);

        assert_eq!(graph.edge(idx), Some((nodes[0], nodes[0], edge)));
        // A self-loop is an incoming edge: the node is no longer a root.
        assert_eq!(graph.roots().count(), 0);
        assert_eq!(
            graph.outgoing_nodes(nodes[0]).collect::<Vec<_>>(),
            vec![nodes[0]]
        );
    }

    #[test]
    fn test_multiple_edges_between_same_nodes() {
        let (mut graph, nodes) = table(2);

        graph.add_edge(nodes[0], nodes[1], TestEdge { weight: 1 });
        graph.add_edge(nodes[0], nodes[1], TestEdge { weight: 2 });
        graph.add_edge(nodes[1], nodes[0], TestEdge { weight: 3 });

        assert_eq!(graph.edges_count(), 3);
        assert_eq!(graph.outgoing_nodes(nodes[0]).count(), 2);
        assert_eq!(graph.outgoing_nodes(nodes[1]).count(), 1);
        assert_eq!(
            graph.endpoints().collect::<Vec<_>>(),
            vec![
                (nodes[0], nodes[1]),
                (nodes[0], nodes[1]),
                (nodes[1], nodes[0])
            ]
        );
    }

    #[test]
    fn test_diamond() {
        //     top
        //    /   \
        //  left  right
        //    \   /
        //    bottom
        let (mut graph, nodes) = table(4);
        let [top, left, right, bottom] = [nodes[0], nodes[1], nodes[2], nodes[3]];

        graph.add_edge(top, left, TestEdge { weight: 1 });
        graph.add_edge(top, right, TestEdge { weight: 2 });
        graph.add_edge(left, bottom, TestEdge { weight: 3 });
        graph.add_edge(right, bottom, TestEdge { weight: 4 });

        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![top]);
        assert_eq!(graph.incoming(bottom).count(), 2);
        assert_eq!(graph.outgoing(bottom).count(), 0);
    }

    #[test]
    fn test_missing_edge() {
        let graph: GraphInternal<TestEdge> = GraphInternal::new();
        assert_eq!(graph.edge(EdgeIndex::new(0)), None);
    }
}
