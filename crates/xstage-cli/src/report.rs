//! Plain-text reports over a built [`Scene`].

use std::fmt::{self, Write};

use xstage::Scene;

use crate::args::View;

/// Render the sections selected by `view`.
pub fn render(scene: &Scene<'_>, view: View) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, scene, view);
    out
}

fn write_report(out: &mut String, scene: &Scene<'_>, view: View) -> fmt::Result {
    let sections: &[fn(&mut String, &Scene<'_>) -> fmt::Result] = match view {
        View::Summary => &[write_summary],
        View::Tree => &[write_tree],
        View::Links => &[write_links],
        View::Elements => &[write_elements],
        View::Columns => &[write_columns],
        View::All => &[
            write_summary,
            write_tree,
            write_links,
            write_elements,
            write_columns,
        ],
    };

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        section(out, scene)?;
    }
    Ok(())
}

fn write_summary(out: &mut String, scene: &Scene<'_>) -> fmt::Result {
    let graph = scene.graph();

    write!(out, "scene: {}", scene.name().unwrap_or("<unnamed>"))?;
    if let Some(id) = scene.id() {
        write!(out, " (id {id})")?;
    }
    writeln!(out)?;

    match (scene.start_frame(), scene.end_frame()) {
        (Some(start), Some(end)) => writeln!(
            out,
            "frames: {start}..{end} ({})",
            scene.frame_count().unwrap_or(0)
        )?,
        _ => writeln!(out, "frames: unknown")?,
    }

    writeln!(out, "elements: {}", scene.elements().count())?;
    writeln!(out, "columns: {}", scene.columns().count())?;
    writeln!(
        out,
        "nodes: {} in {} levels",
        graph.nodes_count(),
        graph.scopes().count()
    )?;
    writeln!(out, "links: {}", graph.links_count())?;
    writeln!(out, "warnings: {}", scene.warnings().len())
}

fn write_tree(out: &mut String, scene: &Scene<'_>) -> fmt::Result {
    writeln!(out, "nodes:")?;
    for node in scene.graph().iter_children(true) {
        let depth = node.ancestors().len() + 1;
        writeln!(
            out,
            "{:indent$}{} [{}] {}",
            "",
            node.segment(),
            node.kind(),
            node.path(),
            indent = depth * 2
        )?;
    }
    Ok(())
}

fn write_links(out: &mut String, scene: &Scene<'_>) -> fmt::Result {
    writeln!(out, "links:")?;
    for scope in scene.graph().scopes() {
        let level = scope.parent().map_or("<root>", |parent| parent.path());
        writeln!(out, "  {level}")?;

        for link in scope.links() {
            writeln!(
                out,
                "    {}.{} -> {}.{}",
                link.source().path(),
                link.source_port(),
                link.target().path(),
                link.target_port()
            )?;
        }

        for cycle in scope.feedback_loops() {
            let members: Vec<&str> = cycle.iter().map(|node| node.path()).collect();
            writeln!(out, "    feedback loop: {}", members.join(", "))?;
        }
    }
    Ok(())
}

fn write_elements(out: &mut String, scene: &Scene<'_>) -> fmt::Result {
    writeln!(out, "elements:")?;
    for element in scene.elements() {
        writeln!(
            out,
            "  {} {} folder={} drawings={}",
            element.id(),
            element.name().unwrap_or("<unnamed>"),
            element.folder().unwrap_or("-"),
            element.drawings().count()
        )?;
    }
    Ok(())
}

fn write_columns(out: &mut String, scene: &Scene<'_>) -> fmt::Result {
    writeln!(out, "columns:")?;
    for column in scene.columns() {
        let element = match column.element() {
            Some(element) => element.name().unwrap_or("<unnamed>").to_string(),
            None => format!("<unresolved {}>", column.element_ref().unwrap_or("-")),
        };
        writeln!(
            out,
            "  {} {} kind={} element={}",
            column.id(),
            column.name().unwrap_or("<unnamed>"),
            column.kind(),
            element
        )?;
    }
    Ok(())
}
