//! Transient widgets - interactive decorations owned by a view.
//!
//! A transient widget binds itself to a node of its owner's markup when the
//! owner renders, and must be disposed before that markup is discarded. The
//! [`WidgetRegistry`] keeps them by logical name (one per date field, say) so
//! the owner can dispose the whole set before every re-render and unmount.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use super::tree::{NodeId, VisualTree};
use crate::error::Result;

/// Callback invoked when the user picks a date.
pub type PickHandler = Rc<dyn Fn(DateTime<Utc>) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

pub trait TransientWidget {
    fn name(&self) -> &str;

    /// Node the widget decorates.
    fn node(&self) -> NodeId;

    /// Release every binding the widget holds in the tree. Must be idempotent.
    fn dispose(&mut self, tree: &mut VisualTree);

    fn is_disposed(&self) -> bool;
}

// =============================================================================
// Date picker
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    /// `chrono` format written into the decorated input.
    pub date_format: String,
    pub enable_time: bool,
    pub default_date: DateTime<Utc>,
}

/// Minimal date picker bound to a text input.
#[derive(Debug)]
pub struct DatePicker {
    name: String,
    id: WidgetId,
    node: NodeId,
    options: PickerOptions,
    disposed: bool,
}

impl DatePicker {
    /// Bind a picker to `node` and show the default date in it.
    pub fn attach(
        tree: &mut VisualTree,
        name: &str,
        node: NodeId,
        options: PickerOptions,
        on_change: PickHandler,
    ) -> Result<Self> {
        let enable_time = options.enable_time;
        let on_pick: PickHandler = Rc::new(move |date: DateTime<Utc>| {
            let date = if enable_time { date } else { start_of_day(date) };
            on_change(date)
        });
        let id = tree.bind_widget(node, name, on_pick)?;
        tree.set_value(node, options.default_date.format(&options.date_format).to_string());
        Ok(Self {
            name: name.to_string(),
            id,
            node,
            options,
            disposed: false,
        })
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }
}

fn start_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(date)
}

impl TransientWidget for DatePicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn dispose(&mut self, tree: &mut VisualTree) {
        if self.disposed {
            return;
        }
        tree.unbind_widget(self.id);
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
pub struct WidgetRegistry {
    widgets: BTreeMap<String, Box<dyn TransientWidget>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget, disposing any previous one with the same name.
    pub fn insert(&mut self, tree: &mut VisualTree, widget: Box<dyn TransientWidget>) {
        if let Some(mut previous) = self.widgets.insert(widget.name().to_string(), widget) {
            previous.dispose(tree);
        }
    }

    pub fn dispose_all(&mut self, tree: &mut VisualTree) {
        for (_, mut widget) in std::mem::take(&mut self.widgets) {
            widget.dispose(tree);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn TransientWidget> {
        self.widgets.get(name).map(|widget| widget.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.widgets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
