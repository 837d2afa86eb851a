//! Filter bar - Radio group over [`FilterKind`].

use crate::engine::{EventKind, VNode};
use crate::error::Result;
use crate::types::FilterKind;
use crate::view::{HandlerBinder, StatefulTemplate, ValueCallback};

pub fn filter_role(kind: FilterKind) -> String {
    format!("filter-{}", kind.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltersState {
    pub active: FilterKind,
    /// Filters that would show an empty list.
    pub disabled: Vec<FilterKind>,
}

pub struct FiltersTemplate {
    on_filter_change: ValueCallback<FilterKind>,
}

impl FiltersTemplate {
    pub fn new(on_filter_change: ValueCallback<FilterKind>) -> Self {
        Self { on_filter_change }
    }
}

impl StatefulTemplate for FiltersTemplate {
    type State = FiltersState;

    fn template(&self, state: &FiltersState) -> Result<VNode> {
        let items = FilterKind::ALL.into_iter().map(|kind| {
            VNode::element("div")
                .class("trip-filters__filter")
                .child(
                    VNode::element("input")
                        .class("trip-filters__filter-input visually-hidden")
                        .role(filter_role(kind))
                        .attr("type", "radio")
                        .attr("name", "trip-filter")
                        .value(kind.as_str())
                        .checked(kind == state.active)
                        .disabled(state.disabled.contains(&kind)),
                )
                .child(
                    VNode::element("label")
                        .class("trip-filters__filter-label")
                        .child(VNode::text(kind.as_str())),
                )
        });
        Ok(VNode::element("form")
            .class("trip-filters")
            .role("filters")
            .children(items))
    }

    fn restore_handlers(&self, binder: &mut HandlerBinder<Self>) {
        let on_filter_change = self.on_filter_change.clone();
        binder.on_root(EventKind::Change, move |_, event| {
            match event.value.as_deref().and_then(FilterKind::parse) {
                Some(kind) => on_filter_change(kind),
                None => Ok(()),
            }
        });
    }
}
