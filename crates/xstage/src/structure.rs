//! Node graph of a scene.
//!
//! This module rebuilds the typed graph a scene document describes: nodes,
//! ports and links, with group nodes owning nested levels of the same shape.
//!
//! - [`GraphBuilder`] constructs a [`Graph`] from a document.
//! - [`Graph`], [`ContainmentScope`], [`Node`] and [`Link`] are the read-only
//!   model over the result.
//! - Paths are derived from the containment tree and cached per node.
//! - [`Children`] walks containment; [`Walk`] follows links within a level.

mod builder;
mod graph_base;
mod model;
mod path;
mod topology;
mod traverse;

pub use builder::GraphBuilder;
pub use model::{ContainmentScope, Graph, Link, Node, NodeIndex, ScopeIndex};
pub use traverse::{Children, Walk};

#[cfg(test)]
mod graph_tests;
