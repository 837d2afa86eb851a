//! Node descriptions - the immutable output of a view template.
//!
//! A [`VNode`] says what a view should look like for a given state. It carries
//! no identity; the [`VisualTree`](super::VisualTree) turns it into mounted
//! nodes when a view is mounted or reconciled.

use bitflags::bitflags;

bitflags! {
    /// Per-node boolean attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Can receive keyboard focus (inputs and buttons).
        const FOCUSABLE = 1 << 0;
        const DISABLED = 1 << 1;
        const CHECKED = 1 << 2;
    }
}

/// Tag used for text nodes.
pub const TEXT_TAG: &str = "#text";

const FOCUSABLE_TAGS: [&str; 4] = ["input", "button", "select", "textarea"];

/// Immutable description of a visual subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VNode {
    pub tag: &'static str,
    /// Stable field role. Controls with equal roles are equivalent across renders.
    pub role: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub flags: NodeFlags,
    pub children: Vec<VNode>,
}

impl VNode {
    pub fn element(tag: &'static str) -> Self {
        let flags = if FOCUSABLE_TAGS.contains(&tag) {
            NodeFlags::FOCUSABLE
        } else {
            NodeFlags::empty()
        };
        Self {
            tag,
            flags,
            ..Default::default()
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG,
            text: Some(content.into()),
            ..Default::default()
        }
    }

    /// Space separated class list, like an HTML `class` attribute.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn class_if(self, condition: bool, classes: &str) -> Self {
        if condition { self.class(classes) } else { self }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.flags.set(NodeFlags::CHECKED, checked);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.flags.set(NodeFlags::DISABLED, disabled);
        self
    }

    pub fn child(mut self, child: VNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn maybe_child(self, child: Option<VNode>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Depth-first search by role.
    pub fn find_role(&self, role: &str) -> Option<&VNode> {
        if self.role.as_deref() == Some(role) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_role(role))
    }
}
