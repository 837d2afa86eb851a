//! Text outline of the visual tree.
//!
//! One line per element, indented two spaces per level. Text children are
//! folded into their parent's line; controls show their value and flags.
//!
//! ```text
//! section.trip-events
//!   form.trip-events__trip-sort [trip-sort]
//!     input [sort-day] = "sort-day" (checked)
//! ```

use std::fmt::Write;

use crate::engine::node::TEXT_TAG;
use crate::engine::{NodeFlags, NodeId, VisualTree};

/// Outline of every root in mount order.
pub fn outline(tree: &VisualTree) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        write_node(tree, root, 0, &mut out);
    }
    out
}

/// Outline of one subtree.
pub fn outline_from(tree: &VisualTree, root: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, root, 0, &mut out);
    out
}

fn write_node(tree: &VisualTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    if node.tag == TEXT_TAG {
        return;
    }

    let _ = write!(out, "{:indent$}{}", "", node.tag, indent = depth * 2);
    for class in node.classes.iter().take(1) {
        let _ = write!(out, ".{class}");
    }
    if let Some(role) = &node.role {
        let _ = write!(out, " [{role}]");
    }
    if let Some(value) = &node.value {
        let _ = write!(out, " = {value:?}");
    }
    if node.flags.contains(NodeFlags::CHECKED) {
        out.push_str(" (checked)");
    }
    if node.flags.contains(NodeFlags::DISABLED) {
        out.push_str(" (disabled)");
    }
    if tree.focused() == Some(id) {
        out.push_str(" *");
    }

    let text: String = node
        .children()
        .iter()
        .filter_map(|child| tree.get(*child))
        .filter(|child| child.tag == TEXT_TAG)
        .filter_map(|child| child.text.as_deref())
        .collect();
    if !text.trim().is_empty() {
        let _ = write!(out, " {:?}", text.trim());
    }
    out.push('\n');

    for child in node.children() {
        write_node(tree, *child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RenderPosition, VNode};

    #[test]
    fn test_outline_shape() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("section", "trip-events");
        let list = tree.build(
            &VNode::element("ul")
                .class("trip-events__list")
                .role("points-list")
                .child(VNode::element("li").child(VNode::text("Amsterdam")))
                .child(VNode::element("button").role("new-event").disabled(true)),
        );
        tree.insert(root, list, RenderPosition::BeforeEnd).expect("insert");

        assert_eq!(
            outline(&tree),
            "section.trip-events\n\
             \x20 ul.trip-events__list [points-list]\n\
             \x20   li \"Amsterdam\"\n\
             \x20   button [new-event] (disabled)\n"
        );
    }

    #[test]
    fn test_outline_marks_focus() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("form", "event");
        let input = tree.build(&VNode::element("input").role("event-price").value("20"));
        tree.insert(root, input, RenderPosition::BeforeEnd).expect("insert");
        tree.focus(input, None);

        assert_eq!(outline_from(&tree, input), "input [event-price] = \"20\" *\n");
    }
}
