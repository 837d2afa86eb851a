//! Sort bar - Radio group over [`SortKind`].

use crate::engine::{EventKind, VNode};
use crate::error::Result;
use crate::types::SortKind;
use crate::view::{HandlerBinder, StatefulTemplate, ValueCallback};

pub fn sort_role(kind: SortKind) -> String {
    format!("sort-{}", kind.as_str())
}

pub struct SortTemplate {
    on_sort_change: ValueCallback<SortKind>,
}

impl SortTemplate {
    pub fn new(on_sort_change: ValueCallback<SortKind>) -> Self {
        Self { on_sort_change }
    }
}

impl StatefulTemplate for SortTemplate {
    /// Active key.
    type State = SortKind;

    fn template(&self, active: &SortKind) -> Result<VNode> {
        let items = SortKind::ALL.into_iter().map(|kind| {
            VNode::element("div")
                .class(&format!("trip-sort__item trip-sort__item--{}", kind.as_str()))
                .child(
                    VNode::element("input")
                        .class("trip-sort__input visually-hidden")
                        .role(sort_role(kind))
                        .attr("type", "radio")
                        .attr("name", "trip-sort")
                        .value(kind.as_str())
                        .checked(kind == *active)
                        .disabled(!kind.is_enabled()),
                )
                .child(
                    VNode::element("label")
                        .class("trip-sort__btn")
                        .child(VNode::text(kind.as_str())),
                )
        });
        Ok(VNode::element("form")
            .class("trip-events__trip-sort trip-sort")
            .role("sort")
            .children(items))
    }

    fn restore_handlers(&self, binder: &mut HandlerBinder<Self>) {
        let on_sort_change = self.on_sort_change.clone();
        binder.on_root(EventKind::Change, move |_, event| {
            match event.value.as_deref().and_then(SortKind::parse) {
                Some(kind) => on_sort_change(kind),
                None => Ok(()),
            }
        });
    }
}
