//! Lazy traversal of the graph.
//!
//! Two edge kinds are kept apart here. [`Children`] follows containment only:
//! it yields the nodes of a level and, when recursive, descends into the
//! sub-graph of each container right after yielding it. Containment is a tree,
//! so no visited set is needed and links can never make it loop.
//!
//! [`Walk`] follows links within one level. Links may form cycles, so a walk
//! remembers every node it has reached and yields each one once.

use std::collections::{HashSet, VecDeque};

use super::model::{ContainmentScope, Graph, Link, Node, NodeIndex, ScopeIndex};

/// Pre-order iterator over the nodes below a level.
///
/// Created by [`Graph::iter_children`], [`ContainmentScope::iter_children`]
/// and [`Node::iter_children`].
#[derive(Debug, Clone)]
pub struct Children<'g> {
    graph: &'g Graph<'g>,
    stack: Vec<NodeIndex>,
    recursive: bool,
}

impl<'g> Children<'g> {
    fn new(graph: &'g Graph<'g>, scope: Option<ScopeIndex>, recursive: bool) -> Self {
        let mut stack = Vec::new();
        if let Some(scope) = scope {
            stack.extend(graph.scope_record(scope).links.nodes().iter().rev());
        }
        Self {
            graph,
            stack,
            recursive,
        }
    }
}

impl<'g> Iterator for Children<'g> {
    type Item = Node<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = Node {
            graph: self.graph,
            index,
        };
        if self.recursive {
            if let Some(subgraph) = node.subgraph() {
                let nodes = self.graph.scope_record(subgraph.index()).links.nodes();
                self.stack.extend(nodes.iter().rev());
            }
        }
        Some(node)
    }
}

impl<'doc> Graph<'doc> {
    /// Nodes of the top level; with `recursive`, every node in pre-order.
    pub fn iter_children(&self, recursive: bool) -> Children<'_> {
        Children::new(self, Some(ScopeIndex::ROOT), recursive)
    }
}

impl<'g> ContainmentScope<'g> {
    /// Nodes of this level; with `recursive`, every node below it in pre-order.
    pub fn iter_children(&self, recursive: bool) -> Children<'g> {
        Children::new(self.graph, Some(self.index), recursive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

/// Breadth-first walk along the links of one level.
///
/// Yields every node reachable from the start node once, in order of
/// discovery. The start node itself is not yielded, even when a cycle leads
/// back to it.
#[derive(Debug, Clone)]
pub struct Walk<'g> {
    graph: &'g Graph<'g>,
    scope: ScopeIndex,
    direction: Direction,
    queue: VecDeque<NodeIndex>,
    visited: HashSet<NodeIndex>,
}

impl<'g> Walk<'g> {
    fn new(node: Node<'g>, direction: Direction) -> Self {
        let mut walk = Self {
            graph: node.graph,
            scope: node.scope().index(),
            direction,
            queue: VecDeque::new(),
            visited: HashSet::from([node.index]),
        };
        walk.enqueue_neighbours(node.index);
        walk
    }

    fn enqueue_neighbours(&mut self, index: NodeIndex) {
        let links = &self.graph.scope_record(self.scope).links;
        let neighbours: Vec<NodeIndex> = match self.direction {
            Direction::Upstream => links.incoming_nodes(index).collect(),
            Direction::Downstream => links.outgoing_nodes(index).collect(),
        };
        for neighbour in neighbours {
            if self.visited.insert(neighbour) {
                self.queue.push_back(neighbour);
            }
        }
    }
}

impl<'g> Iterator for Walk<'g> {
    type Item = Node<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.queue.pop_front()?;
        self.enqueue_neighbours(index);
        Some(Node {
            graph: self.graph,
            index,
        })
    }
}

impl<'g> Node<'g> {
    /// Nodes of this container's sub-graph; with `recursive`, every node below
    /// it in pre-order. Empty for nodes that are not containers.
    pub fn iter_children(&self, recursive: bool) -> Children<'g> {
        Children::new(self.graph, self.subgraph().map(|scope| scope.index()), recursive)
    }

    /// Links arriving at this node, in document order.
    pub fn links_in(&self) -> impl Iterator<Item = Link<'g>> + use<'g> {
        let graph = self.graph;
        let scope = self.scope().index();
        graph
            .scope_record(scope)
            .links
            .incoming(self.index)
            .map(move |edge| Link::new(graph, scope, edge))
    }

    /// Links leaving this node, in document order.
    pub fn links_out(&self) -> impl Iterator<Item = Link<'g>> + use<'g> {
        let graph = self.graph;
        let scope = self.scope().index();
        graph
            .scope_record(scope)
            .links
            .outgoing(self.index)
            .map(move |edge| Link::new(graph, scope, edge))
    }

    /// Sources of the links arriving at this node; once per link.
    pub fn inputs(&self) -> impl Iterator<Item = Node<'g>> + use<'g> {
        self.links_in().map(|link| link.source())
    }

    /// Targets of the links leaving this node; once per link.
    pub fn outputs(&self) -> impl Iterator<Item = Node<'g>> + use<'g> {
        self.links_out().map(|link| link.target())
    }

    /// Every node this node transitively reads from.
    pub fn upstream(&self) -> Walk<'g> {
        Walk::new(*self, Direction::Upstream)
    }

    /// Every node that transitively reads from this node.
    pub fn downstream(&self) -> Walk<'g> {
        Walk::new(*self, Direction::Downstream)
    }
}
