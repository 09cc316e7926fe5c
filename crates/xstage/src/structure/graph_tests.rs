use std::collections::HashSet;

use xstage_core::document::Document;
use xstage_parser::{ReferenceIndex, error::Diagnostic, parse};

use crate::config::GraphConfig;

use super::*;

fn build(document: &Document) -> (Graph<'_>, Vec<Diagnostic>) {
    let (index, _) = ReferenceIndex::build(document);
    GraphBuilder::new(&GraphConfig::default())
        .build(document, document.root_id(), &index)
        .expect("graph should build")
}

fn names<'g>(nodes: impl Iterator<Item = Node<'g>>) -> Vec<&'g str> {
    nodes.map(|node| node.name()).collect()
}

const SCENARIO: &str = r#"
<rootgroup name="Top">
  <nodeslist>
    <module type="TRANSFORM" name="A"/>
    <module type="GROUP" name="B">
      <nodeslist>
        <module type="TRANSFORM" name="C"/>
      </nodeslist>
    </module>
  </nodeslist>
  <linkedlist>
    <link out="A" in="B"/>
  </linkedlist>
</rootgroup>"#;

#[test]
fn test_scenario_traversal_and_path() {
    let document = parse(SCENARIO).unwrap();
    let (graph, warnings) = build(&document);
    assert!(warnings.is_empty());

    assert_eq!(names(graph.iter_children(true)), vec!["A", "B", "C"]);
    assert_eq!(names(graph.iter_children(false)), vec!["A", "B"]);

    let c = graph.iter_children(true).nth(2).unwrap();
    assert_eq!(c.path(), "B/C");
    assert_eq!(graph.path_of(c.index()), Some("B/C"));
    assert_eq!(c.parent().unwrap().name(), "B");

    let link = graph.root().links().next().unwrap();
    assert_eq!(link.source().name(), "A");
    assert_eq!(link.target().name(), "B");
    assert_eq!(link.source_port(), "0");
    assert_eq!(link.target_port(), "0");
}

#[test]
fn test_node_children_and_lookup() {
    let document = parse(SCENARIO).unwrap();
    let (graph, _) = build(&document);

    let b = graph.child("B").unwrap();
    assert!(b.is_container());
    assert_eq!(names(b.iter_children(false)), vec!["C"]);
    assert_eq!(b.child("C").unwrap().path(), "B/C");

    let a = graph.child("A").unwrap();
    assert!(!a.is_container());
    assert_eq!(a.iter_children(true).count(), 0);
    assert!(a.child("C").is_none());

    assert_eq!(graph.node_at_path("B/C"), b.child("C"));
    assert_eq!(b.child_at_path("C"), b.child("C"));
    assert!(graph.node_at_path("A/C").is_none());
    assert!(graph.node_at_path("").is_none());
}

#[test]
fn test_node_identity_follows_fragment() {
    let document = parse(SCENARIO).unwrap();
    let (graph, _) = build(&document);

    let first = graph.child("A").unwrap();
    let second = graph.node(first.index()).unwrap();
    assert_eq!(first, second);
    assert_eq!(graph.node_by_fragment(first.fragment().id()), Some(first));
    assert_ne!(first, graph.child("B").unwrap());
    assert_eq!(format!("{first:?}"), "TRANSFORM('A')");
}

#[test]
fn test_inputs_and_outputs() {
    let document = parse(SCENARIO).unwrap();
    let (graph, _) = build(&document);

    let a = graph.child("A").unwrap();
    let b = graph.child("B").unwrap();

    assert_eq!(a.outputs().collect::<Vec<_>>(), vec![b]);
    assert_eq!(b.inputs().collect::<Vec<_>>(), vec![a]);
    assert_eq!(a.inputs().count(), 0);
    assert_eq!(graph.root().roots().collect::<Vec<_>>(), vec![a]);
}

#[test]
fn test_self_loop_builds_and_terminates() {
    let document = parse(
        r#"<rootgroup name="Top">
             <nodeslist><module type="PEG" name="Loop"/></nodeslist>
             <linkedlist><link out="Loop" in="Loop"/></linkedlist>
           </rootgroup>"#,
    )
    .unwrap();
    let (graph, warnings) = build(&document);
    assert!(warnings.is_empty());

    assert_eq!(names(graph.iter_children(true)), vec!["Loop"]);

    let node = graph.child("Loop").unwrap();
    assert!(graph.root().links().next().unwrap().is_self_loop());
    assert_eq!(node.outputs().collect::<Vec<_>>(), vec![node]);
    assert_eq!(node.downstream().count(), 0);
    assert_eq!(node.upstream().count(), 0);

    assert_eq!(graph.root().feedback_loops(), vec![vec![node]]);
    assert_eq!(graph.root().evaluation_order(), Err(node));
}

#[test]
fn test_walks_terminate_on_cycles() {
    let document = parse(
        r#"<rootgroup name="Top">
             <nodeslist>
               <module type="PEG" name="A"/>
               <module type="PEG" name="B"/>
               <module type="PEG" name="C"/>
               <module type="PEG" name="D"/>
             </nodeslist>
             <linkedlist>
               <link out="A" in="B"/>
               <link out="B" in="C"/>
               <link out="C" in="A"/>
               <link out="C" in="D"/>
             </linkedlist>
           </rootgroup>"#,
    )
    .unwrap();
    let (graph, _) = build(&document);
    let a = graph.child("A").unwrap();
    let d = graph.child("D").unwrap();

    assert_eq!(names(a.downstream()), vec!["B", "C", "D"]);
    assert_eq!(names(a.upstream()), vec!["C", "B"]);
    assert_eq!(names(d.upstream()), vec!["C", "B", "A"]);
    assert_eq!(d.downstream().count(), 0);

    let loops = graph.root().feedback_loops();
    assert_eq!(loops.len(), 1);
    assert_eq!(names(loops[0].iter().copied()), vec!["A", "B", "C"]);
    assert!(graph.root().evaluation_order().is_err());
}

#[test]
fn test_evaluation_order_of_acyclic_level() {
    let document = parse(
        r#"<rootgroup name="Top">
             <nodeslist>
               <module type="WRITE" name="Write"/>
               <module type="COMPOSITE" name="Comp"/>
               <module type="READ" name="Read"/>
             </nodeslist>
             <linkedlist>
               <link out="Read" in="Comp"/>
               <link out="Comp" in="Write"/>
             </linkedlist>
           </rootgroup>"#,
    )
    .unwrap();
    let (graph, _) = build(&document);

    let order = graph.root().evaluation_order().unwrap();
    assert_eq!(names(order.into_iter()), vec!["Read", "Comp", "Write"]);
    assert!(graph.root().feedback_loops().is_empty());
}

#[test]
fn test_duplicate_names_get_distinct_stable_paths() {
    let source = r#"<rootgroup name="Top">
         <nodeslist>
           <module type="PEG" name="Peg"/>
           <module type="GROUP" name="Peg">
             <nodeslist><module type="PEG" name="Peg"/></nodeslist>
           </module>
           <module type="PEG" name="Peg"/>
         </nodeslist>
       </rootgroup>"#;

    let paths = |document: &Document| -> Vec<String> {
        let (graph, _) = build(document);
        graph
            .iter_children(true)
            .map(|node| node.path().to_string())
            .collect()
    };

    let first = parse(source).unwrap();
    let second = parse(source).unwrap();
    assert_eq!(paths(&first), vec!["Peg", "Peg#1", "Peg#1/Peg", "Peg#2"]);
    assert_eq!(paths(&first), paths(&second));

    let (graph, _) = build(&first);
    let group = graph.node_at_path("Peg#1").unwrap();
    assert!(group.is_container());
    assert_eq!(group.rank(), 1);
    assert_eq!(graph.child("Peg").unwrap().rank(), 0);
}

#[test]
fn test_generated_segments_skip_literal_names() {
    let source = r##"<rootgroup name="Top">
         <nodeslist>
           <module type="PEG" name="A"/>
           <module type="PEG" name="A"/>
           <module type="PEG" name="A#1"/>
           <module type="PEG" name="A"/>
         </nodeslist>
       </rootgroup>"##;
    let document = parse(source).unwrap();
    let (graph, _) = build(&document);

    let nodes: Vec<Node<'_>> = graph.iter_children(false).collect();
    let paths: Vec<&str> = nodes.iter().map(|node| node.path()).collect();
    assert_eq!(paths, vec!["A", "A#2", "A#1", "A#3"]);

    for node in nodes {
        assert_eq!(graph.node_at_path(node.path()), Some(node));
    }
    assert_eq!(graph.node_at_path("A#1").unwrap().name(), "A#1");
    assert_eq!(graph.node_at_path("A#2").unwrap().rank(), 1);
}

#[test]
fn test_paths_do_not_depend_on_request_order() {
    let document = parse(SCENARIO).unwrap();

    let (forward, _) = build(&document);
    let forward: Vec<String> = forward
        .iter_children(true)
        .map(|node| node.path().to_string())
        .collect();

    let (backward, _) = build(&document);
    let nodes: Vec<Node<'_>> = backward.iter_children(true).collect();
    for node in nodes.iter().rev() {
        node.path();
    }
    let backward: Vec<String> = nodes.iter().map(|node| node.path().to_string()).collect();

    assert_eq!(forward, backward);
}

#[test]
fn test_custom_separator() {
    let document = parse(SCENARIO).unwrap();
    let (index, _) = ReferenceIndex::build(&document);
    let config = GraphConfig::new(vec!["group".to_string()], "::", "out");
    let (graph, _) = GraphBuilder::new(&config)
        .build(&document, document.root_id(), &index)
        .unwrap();

    assert_eq!(graph.child("B").unwrap().child("C").unwrap().path(), "B::C");
    assert!(graph.node_at_path("B::C").is_some());
    assert_eq!(graph.root().links().next().unwrap().source_port(), "out");
}

#[test]
fn test_graph_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Graph<'static>>();
    assert_send_sync::<Node<'static>>();
}

mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    #[derive(Debug, Clone)]
    enum Tree {
        Leaf(String),
        Group(String, Vec<Tree>),
    }

    impl Tree {
        fn count(&self) -> usize {
            match self {
                Tree::Leaf(_) => 1,
                Tree::Group(_, children) => 1 + children.iter().map(Tree::count).sum::<usize>(),
            }
        }
    }

    /// Names from a tiny alphabet, so repeated names are common, some of them
    /// spelled like a generated `name#k` segment.
    const NAME: &str = "[a-c]{1,2}(#[12])?";

    /// Nested levels of generated nodes.
    fn tree_strategy() -> impl Strategy<Value = Vec<Tree>> {
        let leaf = NAME.prop_map(Tree::Leaf);
        let tree = leaf.prop_recursive(4, 48, 5, |inner| {
            (NAME, prop::collection::vec(inner, 0..5))
                .prop_map(|(name, children)| Tree::Group(name, children))
        });
        prop::collection::vec(tree, 0..6)
    }

    fn render(trees: &[Tree], out: &mut String) {
        out.push_str("<nodeslist>");
        for tree in trees {
            match tree {
                Tree::Leaf(name) => {
                    out.push_str(&format!(r#"<module type="PEG" name="{name}"/>"#));
                }
                Tree::Group(name, children) => {
                    out.push_str(&format!(r#"<module type="GROUP" name="{name}">"#));
                    render(children, out);
                    out.push_str("</module>");
                }
            }
        }
        out.push_str("</nodeslist>");
    }

    fn document_of(trees: &[Tree]) -> Document {
        let mut source = String::from(r#"<rootgroup name="Top">"#);
        render(trees, &mut source);
        source.push_str("</rootgroup>");
        parse(&source).expect("generated document is well formed")
    }

    fn expand<'g>(nodes: Children<'g>, out: &mut Vec<Node<'g>>) {
        for node in nodes {
            out.push(node);
            expand(node.iter_children(false), out);
        }
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Recursive traversal visits every node once and matches level-by-level expansion.
    fn check_traversal_strategies_agree(trees: &[Tree]) -> Result<(), TestCaseError> {
        let document = document_of(trees);
        let (graph, _) = build(&document);

        let recursive: Vec<Node<'_>> = graph.iter_children(true).collect();
        let expected: usize = trees.iter().map(Tree::count).sum();
        prop_assert_eq!(recursive.len(), expected);

        let unique: HashSet<Node<'_>> = recursive.iter().copied().collect();
        prop_assert_eq!(unique.len(), recursive.len());

        let mut expanded = Vec::new();
        expand(graph.iter_children(false), &mut expanded);
        prop_assert_eq!(recursive, expanded);
        Ok(())
    }

    /// Paths are unique, resolve back to their node and spell the ancestor chain.
    fn check_paths(trees: &[Tree]) -> Result<(), TestCaseError> {
        let document = document_of(trees);
        let (graph, _) = build(&document);

        let mut seen = HashSet::new();
        for node in graph.iter_children(true) {
            let path = node.path();
            prop_assert!(seen.insert(path), "path `{}` assigned twice", path);
            prop_assert_eq!(graph.node_at_path(path), Some(node));

            let mut chain: Vec<String> = node
                .ancestors()
                .iter()
                .map(|ancestor| ancestor.segment().into_owned())
                .collect();
            chain.push(node.segment().into_owned());
            prop_assert_eq!(chain.join("/"), path);
        }
        Ok(())
    }

    /// Independent builds of the same document assign the same paths.
    fn check_paths_are_deterministic(trees: &[Tree]) -> Result<(), TestCaseError> {
        let first = document_of(trees);
        let second = document_of(trees);
        let (first, _) = build(&first);
        let (second, _) = build(&second);

        let first: Vec<&str> = first.iter_children(true).map(|node| node.path()).collect();
        let second: Vec<&str> = second.iter_children(true).map(|node| node.path()).collect();
        prop_assert_eq!(first, second);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn traversal_strategies_agree(trees in tree_strategy()) {
            check_traversal_strategies_agree(&trees)?;
        }

        #[test]
        fn paths_resolve_and_match_ancestors(trees in tree_strategy()) {
            check_paths(&trees)?;
        }

        #[test]
        fn paths_are_deterministic(trees in tree_strategy()) {
            check_paths_are_deterministic(&trees)?;
        }
    }
}
