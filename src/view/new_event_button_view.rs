//! "New event" button in the header.

use crate::engine::{EventKind, VNode};
use crate::error::Result;
use crate::view::{Callback, HandlerBinder, StatefulTemplate};

pub const NEW_EVENT_ROLE: &str = "new-event";

pub struct NewEventButtonTemplate {
    on_click: Callback,
}

impl NewEventButtonTemplate {
    pub fn new(on_click: Callback) -> Self {
        Self { on_click }
    }
}

impl StatefulTemplate for NewEventButtonTemplate {
    /// Disabled while a new-point form is open.
    type State = bool;

    fn template(&self, disabled: &bool) -> Result<VNode> {
        Ok(VNode::element("button")
            .class("trip-main__event-add-btn btn btn--big btn--yellow")
            .role(NEW_EVENT_ROLE)
            .attr("type", "button")
            .disabled(*disabled)
            .child(VNode::text("New event")))
    }

    fn restore_handlers(&self, binder: &mut HandlerBinder<Self>) {
        let on_click = self.on_click.clone();
        binder.on_root(EventKind::Click, move |_, _| on_click());
    }
}
