//! Hierarchical node paths.
//!
//! A node's path joins the segments of its container chain, from the top level
//! down to the node, with the graph's separator. The segment of a node is its
//! name. Later nodes of the same level sharing that name get `name#k`, with
//! the smallest `k >= 1` that is not already a name or segment of the level,
//! so segments of one level never collide. Paths depend only on the
//! containment tree, so they are identical whatever traversal first asked for
//! them.
//!
//! Paths are computed on first request and cached per node.

use log::trace;

use super::model::{Graph, Node, NodeIndex};

impl<'doc> Graph<'doc> {
    /// Canonical path of a node, or `None` for a handle of another graph.
    pub fn path_of(&self, index: NodeIndex) -> Option<&str> {
        let record = self.nodes.get(index.index())?;
        Some(record.path.get_or_init(|| self.compute_path(index)))
    }

    fn compute_path(&self, index: NodeIndex) -> String {
        let node = Node { graph: self, index };
        let segment = node.segment();

        let path = match node.parent() {
            Some(parent) => {
                let prefix = self.path_of(parent.index()).unwrap_or_default();
                format!("{prefix}{}{segment}", self.separator())
            }
            None => segment.into_owned(),
        };
        trace!(path; "Resolved node path");
        path
    }

    /// Node whose [`path`](Node::path) is `path`.
    ///
    /// Segments are matched level by level, so the lookup costs one scan of
    /// each level on the way down.
    pub fn node_at_path(&self, path: &str) -> Option<Node<'_>> {
        self.root().node_at_path(path)
    }
}

impl<'g> super::model::ContainmentScope<'g> {
    /// Node at `path`, relative to this level.
    pub fn node_at_path(&self, path: &str) -> Option<Node<'g>> {
        let separator = self.graph().separator();
        let mut segments = path.split(separator).filter(|segment| !segment.is_empty());

        let first = segments.next()?;
        let mut node = self.nodes().find(|node| node.segment() == first)?;
        for segment in segments {
            node = node.subgraph()?.nodes().find(|child| child.segment() == segment)?;
        }
        Some(node)
    }
}

impl<'g> Node<'g> {
    /// Canonical path of the node, e.g. `"Group/Peg"`.
    pub fn path(&self) -> &'g str {
        self.graph.path_of(self.index).unwrap_or_default()
    }

    /// Descendant at `path`, relative to this container.
    pub fn child_at_path(&self, path: &str) -> Option<Node<'g>> {
        self.subgraph()?.node_at_path(path)
    }

    /// Ancestor containers of the node, the outermost first.
    pub fn ancestors(&self) -> Vec<Node<'g>> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            chain.push(node);
            current = node.parent();
        }
        chain.reverse();
        chain
    }
}
