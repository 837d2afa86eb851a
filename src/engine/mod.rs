//! Engine - Visual tree, node descriptions, events and transient widgets.
//!
//! Views never touch each other's nodes: they describe their markup as a
//! [`VNode`], the [`VisualTree`] mounts it, and user interaction enters through
//! [`events`].

pub mod events;
pub mod node;
pub mod tree;
pub mod widget;

pub use events::{Event, EventKind, Handler};
pub use node::{NodeFlags, VNode};
pub use tree::{FocusSnapshot, NodeId, RenderPosition, Selection, SharedTree, VisualTree};
pub use widget::{DatePicker, PickHandler, PickerOptions, TransientWidget, WidgetId, WidgetRegistry};
