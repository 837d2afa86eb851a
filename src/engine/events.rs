//! Event delivery - user interaction entering the tree.
//!
//! Events bubble from the target to its ancestors, like DOM events. The
//! handler chain is collected and the tree borrow released before any handler
//! runs, so handlers are free to re-render, remount or unmount views
//! (including the one that owns them).
//!
//! ```ignore
//! use trip_board::engine::events;
//!
//! events::type_text(&tree, price_input, "120")?;
//! events::blur(&tree, price_input)?;
//! events::submit(&tree, form)?;
//! ```

use std::rc::Rc;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::tree::{NodeId, Selection, SharedTree, VisualTree};
use crate::error::{Result, TripError};

/// Handler attached to a node. Errors abort the dispatch and reach the caller.
pub type Handler = Rc<dyn Fn(&Event) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Change,
    Blur,
    Submit,
    KeyDown,
}

/// Snapshot of the target taken when the event was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    pub role: Option<String>,
    pub value: Option<String>,
    pub checked: bool,
    pub key: Option<KeyEvent>,
}

impl Event {
    fn capture(tree: &VisualTree, target: NodeId, kind: EventKind, key: Option<KeyEvent>) -> Self {
        Self {
            kind,
            target,
            role: tree.role(target).map(str::to_string),
            value: tree.value(target).map(str::to_string),
            checked: tree.is_checked(target),
            key,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key.as_ref().is_some_and(|key| key.code == KeyCode::Esc)
    }
}

/// Deliver an event. Returns whether any handler ran.
pub fn dispatch(tree: &SharedTree, target: NodeId, kind: EventKind) -> Result<bool> {
    dispatch_with(tree, target, kind, None)
}

fn dispatch_with(
    tree: &SharedTree,
    target: NodeId,
    kind: EventKind,
    key: Option<KeyEvent>,
) -> Result<bool> {
    let (event, chain) = {
        let tree = tree.borrow();
        if !tree.contains(target) {
            return Err(TripError::DetachedNode);
        }
        if tree.is_disabled(target) && kind == EventKind::Click {
            return Ok(false);
        }
        (
            Event::capture(&tree, target, kind, key),
            tree.handler_chain(target, kind),
        )
    };

    for handler in &chain {
        handler(&event)?;
    }
    Ok(!chain.is_empty())
}

pub fn click(tree: &SharedTree, target: NodeId) -> Result<bool> {
    dispatch(tree, target, EventKind::Click)
}

pub fn submit(tree: &SharedTree, form: NodeId) -> Result<bool> {
    dispatch(tree, form, EventKind::Submit)
}

/// Move focus away from `target` (if it had it) and deliver `Blur`.
pub fn blur(tree: &SharedTree, target: NodeId) -> Result<bool> {
    {
        let mut tree = tree.borrow_mut();
        if tree.focused() == Some(target) {
            tree.blur();
        }
    }
    dispatch(tree, target, EventKind::Blur)
}

pub fn key_down(tree: &SharedTree, target: NodeId, key: KeyEvent) -> Result<bool> {
    dispatch_with(tree, target, EventKind::KeyDown, Some(key))
}

pub fn escape() -> KeyEvent {
    KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
}

/// Focus `target`, replace its value with `text`, put the caret at the end
/// and deliver `Input`.
pub fn type_text(tree: &SharedTree, target: NodeId, text: &str) -> Result<bool> {
    {
        let mut tree = tree.borrow_mut();
        if !tree.set_value(target, text) {
            return Err(TripError::DetachedNode);
        }
        tree.focus(target, Some(Selection::caret(text.chars().count())));
    }
    dispatch(tree, target, EventKind::Input)
}

/// Flip a checkbox and deliver `Change`.
pub fn toggle(tree: &SharedTree, target: NodeId) -> Result<bool> {
    {
        let mut tree = tree.borrow_mut();
        if tree.is_disabled(target) {
            return Ok(false);
        }
        let checked = tree.is_checked(target);
        tree.set_checked(target, !checked);
    }
    dispatch(tree, target, EventKind::Change)
}

/// Check a radio, uncheck the others with the same `name` in its group and
/// deliver `Change`. The group is the nearest `form` or `fieldset` ancestor.
pub fn choose(tree: &SharedTree, target: NodeId) -> Result<bool> {
    {
        let mut tree = tree.borrow_mut();
        if !tree.contains(target) {
            return Err(TripError::DetachedNode);
        }
        if tree.is_disabled(target) {
            return Ok(false);
        }
        let name = tree.attr(target, "name").map(str::to_string);
        let group = group_root(&tree, target);
        if let (Some(name), Some(group)) = (name, group) {
            let peers: Vec<NodeId> = tree
                .walk(group)
                .into_iter()
                .filter(|id| tree.attr(*id, "name") == Some(name.as_str()))
                .collect();
            for peer in peers {
                tree.set_checked(peer, false);
            }
        }
        tree.set_checked(target, true);
    }
    dispatch(tree, target, EventKind::Change)
}

fn group_root(tree: &VisualTree, target: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(target);
    while let Some(id) = current {
        let tag = tree.get(id)?.tag;
        if tag == "form" || tag == "fieldset" {
            return Some(id);
        }
        current = tree.parent(id);
    }
    None
}

/// Pick a date in the widget decorating `target`. Returns false when no
/// widget is bound to the node.
pub fn pick_date(tree: &SharedTree, target: NodeId, date: DateTime<Utc>) -> Result<bool> {
    let handler = tree.borrow().widget_handler(target);
    match handler {
        Some(on_pick) => {
            on_pick(date)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
