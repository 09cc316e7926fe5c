//! Link analysis of one level.
//!
//! The link table of a level is projected onto a [`petgraph`] graph to find
//! feedback loops and an evaluation order. Results are reported in node
//! construction order so they do not depend on petgraph's internal ordering.

use std::collections::HashMap;

use log::debug;
use petgraph::{
    algo::{tarjan_scc, toposort},
    graph::{DiGraph, NodeIndex as PetIndex},
};

use super::model::{ContainmentScope, Node, NodeIndex};

impl<'g> ContainmentScope<'g> {
    fn project(&self) -> (DiGraph<NodeIndex, ()>, Vec<(NodeIndex, NodeIndex)>) {
        let table = &self.graph.scope_record(self.index).links;

        let mut graph = DiGraph::with_capacity(table.nodes_count(), table.edges_count());
        let positions: HashMap<NodeIndex, PetIndex> = table
            .nodes()
            .iter()
            .map(|&node| (node, graph.add_node(node)))
            .collect();

        let endpoints: Vec<_> = table.endpoints().collect();
        for &(source, target) in &endpoints {
            graph.add_edge(positions[&source], positions[&target], ());
        }
        (graph, endpoints)
    }

    fn node_at(&self, index: NodeIndex) -> Node<'g> {
        Node {
            graph: self.graph,
            index,
        }
    }

    /// Groups of nodes that feed back into themselves through links.
    ///
    /// Each loop is a strongly connected component with more than one node, or
    /// a single node linked to itself. Nodes within a loop, and the loops
    /// themselves, are listed in construction order.
    pub fn feedback_loops(&self) -> Vec<Vec<Node<'g>>> {
        let (graph, endpoints) = self.project();

        let mut loops: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
            .into_iter()
            .map(|component| {
                let mut members: Vec<NodeIndex> =
                    component.into_iter().map(|index| graph[index]).collect();
                members.sort();
                members
            })
            .filter(|members| match members.as_slice() {
                [single] => endpoints.contains(&(*single, *single)),
                _ => true,
            })
            .collect();
        loops.sort();

        debug!(scope = self.index.index(), loops = loops.len(); "Feedback loops found");
        loops
            .into_iter()
            .map(|members| members.into_iter().map(|index| self.node_at(index)).collect())
            .collect()
    }

    /// Nodes ordered so that every link points forward.
    ///
    /// # Errors
    ///
    /// Returns a node that lies on a cycle when the level has a feedback loop.
    pub fn evaluation_order(&self) -> Result<Vec<Node<'g>>, Node<'g>> {
        let (graph, _) = self.project();

        match toposort(&graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|index| self.node_at(graph[index]))
                .collect()),
            Err(cycle) => Err(self.node_at(graph[cycle.node_id()])),
        }
    }
}
