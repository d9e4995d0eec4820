use std::fmt::Write;

use timeline_core::accordion::{AccordionNode, SectionView};

/// Render a built section as a box-drawn tree, one line per entry:
///
/// ```text
/// Ancient India [ancient]
/// ├─ Maurya Empire [maurya]
/// │  ├─ Chandragupta Maurya [maurya-chandragupta] king-color-1
/// │  └─ Ashoka [maurya-ashoka] king-color-last +profile
/// └─ Gandhara Art [gandhara]
/// ```
pub fn render_outline(view: &SectionView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", view.title, view.id);
    if let Some(bar) = &view.bar {
        let _ = writeln!(
            out,
            "   timeline {}..{}: {} block(s), {:.1}% covered",
            bar.start,
            bar.end,
            bar.blocks.len(),
            bar.total_width_pct()
        );
    }
    render_children(&mut out, &view.entries, "");
    out
}

fn render_children(out: &mut String, nodes: &[AccordionNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == nodes.len();
        let connector = if is_last { "└─ " } else { "├─ " };
        let continuation = if is_last { "   " } else { "│  " };
        let _ = writeln!(out, "{prefix}{connector}{}", node_line(node));
        render_children(out, &node.children, &format!("{prefix}{continuation}"));
    }
}

fn node_line(node: &AccordionNode) -> String {
    let mut line = format!("{} [{}]", node.summary.title, node.id);
    if let Some(color) = node.color {
        line.push(' ');
        line.push_str(&color.class_name());
    }
    if node.enhanced {
        line.push_str(" +profile");
    }
    if !node.connections.is_empty() {
        let _ = write!(line, " ->{}", node.connections.len());
    }
    if !node.resolved {
        line.push_str(" (unresolved)");
    }
    line
}
