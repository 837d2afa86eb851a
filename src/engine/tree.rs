//! Visual Tree - Arena of mounted nodes.
//!
//! Manages the lifecycle of mounted nodes:
//! - Generational ids so a stale id never aliases a recycled slot
//! - Free slot pool for O(1) reuse
//! - Insertion relative to a target node (`BeforeBegin` .. `AfterEnd`)
//! - Per-node event handlers, dropped together with the node
//! - Keyboard focus and caret selection
//! - Bindings of transient widgets to the nodes they decorate

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use super::events::{EventKind, Handler};
use super::node::{NodeFlags, TEXT_TAG, VNode};
use super::widget::{PickHandler, WidgetId};
use crate::error::{Result, TripError};

/// Shared handle to the tree. Views and event helpers hold clones of it.
pub type SharedTree = Rc<RefCell<VisualTree>>;

// =============================================================================
// Ids & positions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Where to insert a node relative to a target, as in `insertAdjacentElement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPosition {
    /// Before the target, as its previous sibling.
    BeforeBegin,
    /// Inside the target, as its first child.
    AfterBegin,
    /// Inside the target, as its last child.
    BeforeEnd,
    /// After the target, as its next sibling.
    AfterEnd,
}

/// Caret/selection range inside a text control, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

/// Focus captured before a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSnapshot {
    pub role: String,
    pub selection: Option<Selection>,
}

// =============================================================================
// Mounted node
// =============================================================================

pub struct MountedNode {
    pub tag: &'static str,
    pub role: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub flags: NodeFlags,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handlers: Vec<(EventKind, Handler)>,
    is_root: bool,
}

impl MountedNode {
    fn from_description(desc: &VNode) -> Self {
        Self {
            tag: desc.tag,
            role: desc.role.clone(),
            classes: desc.classes.clone(),
            attrs: desc.attrs.clone(),
            text: desc.text.clone(),
            value: desc.value.clone(),
            flags: desc.flags,
            parent: None,
            children: Vec::new(),
            handlers: Vec::new(),
            is_root: false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

struct WidgetBinding {
    name: String,
    node: NodeId,
    on_pick: PickHandler,
}

struct Slot {
    generation: u32,
    node: Option<MountedNode>,
}

// =============================================================================
// Visual tree
// =============================================================================

pub struct VisualTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    focused: Signal<Option<NodeId>>,
    selection: Option<Selection>,
    widgets: BTreeMap<WidgetId, WidgetBinding>,
    next_widget: u64,
}

impl Default for VisualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VisualTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualTree")
            .field("live", &self.live_count())
            .field("roots", &self.roots)
            .field("focused", &self.focused())
            .field("widgets", &self.widgets.len())
            .finish()
    }
}

impl VisualTree {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            focused: signal(None),
            selection: None,
            widgets: BTreeMap::new(),
            next_widget: 0,
        }
    }

    pub fn shared() -> SharedTree {
        Rc::new(RefCell::new(Self::new()))
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    fn allocate(&mut self, node: MountedNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    /// Create a top-level container. Roots are always attached.
    pub fn create_root(&mut self, tag: &'static str, classes: &str) -> NodeId {
        let mut node = MountedNode::from_description(&VNode::element(tag).class(classes));
        node.is_root = true;
        let id = self.allocate(node);
        self.roots.push(id);
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Build a detached subtree from a description.
    pub fn build(&mut self, desc: &VNode) -> NodeId {
        let id = self.allocate(MountedNode::from_description(desc));
        for child in &desc.children {
            let child_id = self.build(child);
            if let Some(node) = self.get_mut(child_id) {
                node.parent = Some(id);
            }
            if let Some(node) = self.get_mut(id) {
                node.children.push(child_id);
            }
        }
        id
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&MountedNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MountedNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// True when the node is live and reachable from a root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.get(current) {
                None => return false,
                Some(node) if node.is_root => return true,
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return false,
                },
            }
        }
    }

    pub fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order walk of a subtree, `root` included.
    pub fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn query(&self, root: NodeId, role: &str) -> Option<NodeId> {
        self.walk(root)
            .into_iter()
            .find(|id| self.role(*id) == Some(role))
    }

    pub fn query_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.query_all_class(root, class).into_iter().next()
    }

    pub fn query_all_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.walk(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|node| node.has_class(class)))
            .collect()
    }

    pub fn role(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|node| node.role.as_deref())
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|node| node.value.as_deref())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|node| node.attr(name))
    }

    pub fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
        self.get(id).is_some_and(|node| node.flags.contains(flag))
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::CHECKED)
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_flag(id, NodeFlags::DISABLED)
    }

    /// Text of all text nodes below `id`, whitespace-normalised.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk(id)
            .into_iter()
            .filter_map(|node| self.get(node))
            .filter(|node| node.tag == TEXT_TAG)
            .filter_map(|node| node.text.as_deref())
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Insert a detached node relative to `target`.
    pub fn insert(&mut self, target: NodeId, id: NodeId, position: RenderPosition) -> Result<()> {
        if !self.contains(target) || !self.contains(id) {
            return Err(TripError::DetachedNode);
        }
        self.detach(id);

        let (parent, index) = match position {
            RenderPosition::AfterBegin => (target, 0),
            RenderPosition::BeforeEnd => (target, self.children(target).len()),
            RenderPosition::BeforeBegin | RenderPosition::AfterEnd => {
                let parent = self.parent(target).ok_or(TripError::DetachedNode)?;
                let at = self
                    .children(parent)
                    .iter()
                    .position(|child| *child == target)
                    .ok_or(TripError::DetachedNode)?;
                let at = if position == RenderPosition::AfterEnd { at + 1 } else { at };
                (parent, at)
            }
        };

        if let Some(node) = self.get_mut(parent) {
            node.children.insert(index, id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Put `new` in the tree position of `old`, then free `old`'s subtree.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self.parent(old).ok_or(TripError::DetachedNode)?;
        if !self.contains(new) {
            return Err(TripError::DetachedNode);
        }
        self.detach(new);
        if let Some(node) = self.get_mut(parent) {
            if let Some(slot) = node.children.iter_mut().find(|child| **child == old) {
                *slot = new;
            }
        }
        if let Some(node) = self.get_mut(new) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(old) {
            node.parent = None;
        }
        self.free_subtree(old);
        Ok(())
    }

    /// Remove a node and its subtree. Returns false for stale ids.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        self.free_subtree(id);
        true
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else { return };
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    fn free_subtree(&mut self, root: NodeId) {
        let focused = self.focused.get();
        for id in self.walk(root) {
            if focused == Some(id) {
                self.blur();
            }
            self.release(id);
        }
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.flags.set(NodeFlags::CHECKED, checked);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    pub fn attach_handler(&mut self, id: NodeId, kind: EventKind, handler: Handler) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.handlers.push((kind, handler));
                true
            }
            None => false,
        }
    }

    pub fn handler_count(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |node| node.handlers.len())
    }

    /// Handlers for `kind` on the target and then on each ancestor.
    pub fn handler_chain(&self, target: NodeId, kind: EventKind) -> Vec<Handler> {
        let mut chain = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            let Some(node) = self.get(id) else { break };
            chain.extend(
                node.handlers
                    .iter()
                    .filter(|(handler_kind, _)| *handler_kind == kind)
                    .map(|(_, handler)| Rc::clone(handler)),
            );
            current = node.parent;
        }
        chain
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    /// Focus a control. Without an explicit selection the caret goes to the end.
    pub fn focus(&mut self, id: NodeId, selection: Option<Selection>) -> bool {
        let Some(node) = self.get(id) else { return false };
        if !node.flags.contains(NodeFlags::FOCUSABLE) || node.flags.contains(NodeFlags::DISABLED) {
            return false;
        }
        if !self.is_attached(id) {
            return false;
        }
        let len = node.value.as_deref().map_or(0, |value| value.chars().count());
        let selection = selection.unwrap_or(Selection::caret(len)).clamp(len);
        self.selection = Some(selection);
        self.focused.set(Some(id));
        true
    }

    pub fn blur(&mut self) {
        self.selection = None;
        self.focused.set(None);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get().filter(|id| self.contains(*id))
    }

    /// Reactive view of the focused node, for effects outside the tree.
    pub fn focus_signal(&self) -> Signal<Option<NodeId>> {
        self.focused.clone()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.focused().and(self.selection)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if let Some(id) = self.focused() {
            let len = self.value(id).map_or(0, |value| value.chars().count());
            self.selection = Some(selection.clamp(len));
        }
    }

    /// Capture focus if it sits on a control with a role inside `within`.
    pub fn focus_snapshot(&self, within: NodeId) -> Option<FocusSnapshot> {
        let focused = self.focused()?;
        if !self.is_descendant(focused, within) {
            return None;
        }
        Some(FocusSnapshot {
            role: self.role(focused)?.to_string(),
            selection: self.selection,
        })
    }

    /// Move focus to the control with the snapshot's role inside `within`.
    pub fn restore_focus(&mut self, within: NodeId, snapshot: &FocusSnapshot) -> bool {
        match self.query(within, &snapshot.role) {
            Some(id) => self.focus(id, snapshot.selection),
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Widget bindings
    // -------------------------------------------------------------------------

    pub fn bind_widget(&mut self, id: NodeId, name: &str, on_pick: PickHandler) -> Result<WidgetId> {
        if !self.contains(id) {
            return Err(TripError::DetachedNode);
        }
        let widget = WidgetId::new(self.next_widget);
        self.next_widget += 1;
        self.widgets.insert(
            widget,
            WidgetBinding {
                name: name.to_string(),
                node: id,
                on_pick,
            },
        );
        Ok(widget)
    }

    pub fn unbind_widget(&mut self, widget: WidgetId) -> bool {
        self.widgets.remove(&widget).is_some()
    }

    /// Pick handler of the widget decorating `id`, if any.
    pub fn widget_handler(&self, id: NodeId) -> Option<PickHandler> {
        self.widgets
            .values()
            .find(|binding| binding.node == id)
            .map(|binding| Rc::clone(&binding.on_pick))
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn widget_names(&self) -> Vec<&str> {
        self.widgets.values().map(|binding| binding.name.as_str()).collect()
    }

    /// Bindings whose node is gone or no longer attached. Always empty when
    /// every view disposes its widgets before discarding markup.
    pub fn leaked_widgets(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|(_, binding)| !self.is_attached(binding.node))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with_items(tree: &mut VisualTree, root: NodeId, count: usize) -> Vec<NodeId> {
        (0..count)
            .map(|i| {
                let item = tree.build(&VNode::element("li").role(format!("item-{i}")));
                tree.insert(root, item, RenderPosition::BeforeEnd).expect("root is live");
                item
            })
            .collect()
    }

    #[test]
    fn test_build_and_query() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("main", "trip-events");
        let form = tree.build(
            &VNode::element("form")
                .child(VNode::element("input").role("event-price").value("5"))
                .child(VNode::text("  Price  ")),
        );
        tree.insert(root, form, RenderPosition::BeforeEnd).expect("insert");

        let price = tree.query(root, "event-price").expect("price input");
        assert_eq!(tree.value(price), Some("5"));
        assert_eq!(tree.text_content(form), "Price");
        assert!(tree.is_attached(price));
    }

    #[test]
    fn test_insert_positions() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("ul", "");
        let items = list_with_items(&mut tree, root, 2);

        let head = tree.build(&VNode::element("li").role("head"));
        tree.insert(root, head, RenderPosition::AfterBegin).expect("insert");
        let before = tree.build(&VNode::element("li").role("before"));
        tree.insert(items[1], before, RenderPosition::BeforeBegin).expect("insert");
        let after = tree.build(&VNode::element("li").role("after"));
        tree.insert(items[0], after, RenderPosition::AfterEnd).expect("insert");

        let roles: Vec<_> = tree
            .children(root)
            .iter()
            .map(|id| tree.role(*id).unwrap_or_default().to_string())
            .collect();
        assert_eq!(roles, ["head", "item-0", "after", "before", "item-1"]);
    }

    #[test]
    fn test_sibling_insert_needs_parent() {
        let mut tree = VisualTree::new();
        let detached = tree.build(&VNode::element("li"));
        let node = tree.build(&VNode::element("li"));
        let result = tree.insert(detached, node, RenderPosition::BeforeBegin);
        assert_eq!(result, Err(TripError::DetachedNode));
    }

    #[test]
    fn test_replace_keeps_position_and_frees_old() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("ul", "");
        let items = list_with_items(&mut tree, root, 3);
        let live_before = tree.live_count();

        let replacement = tree.build(&VNode::element("li").role("new"));
        tree.replace(items[1], replacement).expect("replace");

        assert_eq!(tree.children(root), &[items[0], replacement, items[2]]);
        assert!(!tree.contains(items[1]), "old node should be freed");
        assert_eq!(tree.live_count(), live_before);
    }

    #[test]
    fn test_stale_id_never_aliases_recycled_slot() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("ul", "");
        let items = list_with_items(&mut tree, root, 1);
        assert!(tree.remove(items[0]));

        let recycled = tree.build(&VNode::element("li"));
        assert!(tree.contains(recycled));
        assert!(!tree.contains(items[0]), "old generation must stay dead");
        assert!(!tree.remove(items[0]), "removing a stale id is a no-op");
        assert!(tree.contains(recycled));
    }

    #[test]
    fn test_focus_rules() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("form", "");
        let form = tree.build(
            &VNode::element("div")
                .child(VNode::element("input").role("price").value("1234"))
                .child(VNode::element("button").role("save").disabled(true))
                .child(VNode::element("p").role("text")),
        );
        tree.insert(root, form, RenderPosition::BeforeEnd).expect("insert");
        let price = tree.query(root, "price").expect("price");
        let save = tree.query(root, "save").expect("save");
        let text = tree.query(root, "text").expect("text");

        assert!(!tree.focus(save, None), "disabled controls refuse focus");
        assert!(!tree.focus(text, None), "plain elements refuse focus");
        assert!(tree.focus(price, Some(Selection { start: 1, end: 99 })));
        assert_eq!(tree.selection(), Some(Selection { start: 1, end: 4 }));

        tree.remove(form);
        assert_eq!(tree.focused(), None, "removing the focused node blurs");
    }

    #[test]
    fn test_focus_snapshot_and_restore() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("div", "");
        let old = tree.build(&VNode::element("li").child(VNode::element("input").role("event-price").value("42")));
        tree.insert(root, old, RenderPosition::BeforeEnd).expect("insert");
        let input = tree.query(old, "event-price").expect("input");
        tree.focus(input, Some(Selection::caret(1)));

        let snapshot = tree.focus_snapshot(old).expect("focus inside old");
        let new = tree.build(&VNode::element("li").child(VNode::element("input").role("event-price").value("4")));
        tree.replace(old, new).expect("replace");
        assert!(tree.restore_focus(new, &snapshot));

        let focused = tree.focused().expect("focus restored");
        assert!(tree.is_descendant(focused, new));
        assert_eq!(tree.selection(), Some(Selection::caret(1)));
    }

    #[test]
    fn test_handler_chain_bubbles() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("div", "");
        let form = tree.build(&VNode::element("form").child(VNode::element("input").role("x")));
        tree.insert(root, form, RenderPosition::BeforeEnd).expect("insert");
        let input = tree.query(form, "x").expect("input");

        let noop: Handler = Rc::new(|_| Ok(()));
        tree.attach_handler(input, EventKind::Change, Rc::clone(&noop));
        tree.attach_handler(form, EventKind::Change, Rc::clone(&noop));
        tree.attach_handler(form, EventKind::Submit, noop);

        assert_eq!(tree.handler_chain(input, EventKind::Change).len(), 2);
        assert_eq!(tree.handler_chain(input, EventKind::Submit).len(), 1);
        assert_eq!(tree.handler_chain(input, EventKind::Click).len(), 0);
    }

    #[test]
    fn test_leaked_widgets_reported() {
        let mut tree = VisualTree::new();
        let root = tree.create_root("div", "");
        let input = tree.build(&VNode::element("input"));
        tree.insert(root, input, RenderPosition::BeforeEnd).expect("insert");
        let widget = tree
            .bind_widget(input, "dateFrom", Rc::new(|_| Ok(())))
            .expect("live node");

        assert!(tree.leaked_widgets().is_empty());
        tree.remove(input);
        assert_eq!(tree.leaked_widgets(), vec![widget]);
        assert!(tree.unbind_widget(widget));
        assert!(tree.leaked_widgets().is_empty());
    }
}
