//! Stateful views - Views that own private state and reconcile in place.
//!
//! A view is a [`StatefulTemplate`] (markup, handlers and widgets for a given
//! state) wrapped in a [`StatefulView`] that owns the mounted node.
//!
//! # Reconciliation
//!
//! `update_element` computes the new description first. A failing template
//! leaves state and markup untouched. Otherwise it:
//!
//! 1. captures focus if it sits inside the view
//! 2. disposes every transient widget
//! 3. builds the new subtree and swaps it in at the old position
//! 4. re-attaches handlers and re-creates widgets
//! 5. moves focus to the control with the same role, selection clamped
//!
//! Handlers and widget callbacks receive a [`ViewHandle`], a weak reference
//! to the view. They may re-render, unmount or drop the view that owns them.
//!
//! ```ignore
//! let view = StatefulView::new(tree.clone(), PointFormTemplate::new(..), draft);
//! view.mount(list, RenderPosition::AfterBegin)?;
//! view.update_element(|draft| draft.kind = PointType::Taxi)?;
//! view.unmount();
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

use crate::engine::{
    DatePicker, Event, EventKind, Handler, NodeId, PickHandler, PickerOptions, RenderPosition,
    SharedTree, VNode, WidgetRegistry,
};
use crate::error::Result;

// =============================================================================
// Template trait
// =============================================================================

pub trait StatefulTemplate: Sized + 'static {
    type State: Clone + fmt::Debug + 'static;

    /// Markup for `state`. Must not touch the tree.
    fn template(&self, state: &Self::State) -> Result<VNode>;

    /// Declare event handlers. Called after every (re-)render.
    fn restore_handlers(&self, _binder: &mut HandlerBinder<Self>) {}

    /// Declare transient widgets for `state`. Called after every (re-)render.
    fn create_widgets(&self, _state: &Self::State, _widgets: &mut WidgetCx<Self>) {}
}

/// Handler bound to a view node.
pub type ViewHandler<T> = Rc<dyn Fn(&ViewHandle<T>, &Event) -> Result<()>>;

/// Date pick callback bound to a view.
pub type ViewPickHandler<T> = Rc<dyn Fn(&ViewHandle<T>, DateTime<Utc>) -> Result<()>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Root,
    Role(String),
    Class(&'static str),
}

struct Binding<T: StatefulTemplate> {
    selector: Selector,
    kind: EventKind,
    handler: ViewHandler<T>,
}

/// Collects handler declarations during `restore_handlers`.
pub struct HandlerBinder<T: StatefulTemplate> {
    bindings: Vec<Binding<T>>,
}

impl<T: StatefulTemplate> HandlerBinder<T> {
    fn new() -> Self {
        Self { bindings: Vec::new() }
    }

    fn push(&mut self, selector: Selector, kind: EventKind, handler: ViewHandler<T>) {
        self.bindings.push(Binding {
            selector,
            kind,
            handler,
        });
    }

    /// Handle `kind` on the control with `role`. Skipped when the markup has
    /// no such control.
    pub fn on(
        &mut self,
        role: impl Into<String>,
        kind: EventKind,
        handler: impl Fn(&ViewHandle<T>, &Event) -> Result<()> + 'static,
    ) {
        self.push(Selector::Role(role.into()), kind, Rc::new(handler));
    }

    /// Handle `kind` on the first node with `class`.
    pub fn on_class(
        &mut self,
        class: &'static str,
        kind: EventKind,
        handler: impl Fn(&ViewHandle<T>, &Event) -> Result<()> + 'static,
    ) {
        self.push(Selector::Class(class), kind, Rc::new(handler));
    }

    pub fn on_root(
        &mut self,
        kind: EventKind,
        handler: impl Fn(&ViewHandle<T>, &Event) -> Result<()> + 'static,
    ) {
        self.push(Selector::Root, kind, Rc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

struct WidgetRequest<T: StatefulTemplate> {
    name: String,
    role: String,
    options: PickerOptions,
    on_pick: ViewPickHandler<T>,
}

/// Collects widget declarations during `create_widgets`.
pub struct WidgetCx<T: StatefulTemplate> {
    requests: Vec<WidgetRequest<T>>,
}

impl<T: StatefulTemplate> WidgetCx<T> {
    fn new() -> Self {
        Self { requests: Vec::new() }
    }

    /// Decorate the control with `role` with a date picker named `name`.
    pub fn date_picker(
        &mut self,
        name: impl Into<String>,
        role: impl Into<String>,
        options: PickerOptions,
        on_pick: impl Fn(&ViewHandle<T>, DateTime<Utc>) -> Result<()> + 'static,
    ) {
        self.requests.push(WidgetRequest {
            name: name.into(),
            role: role.into(),
            options,
            on_pick: Rc::new(on_pick),
        });
    }
}

// =============================================================================
// View core
// =============================================================================

struct ViewCore<T: StatefulTemplate> {
    tree: SharedTree,
    template: T,
    state: T::State,
    element: Option<NodeId>,
    widgets: WidgetRegistry,
    renders: usize,
}

type CoreRef<T> = Rc<RefCell<ViewCore<T>>>;

fn mount<T: StatefulTemplate>(core: &CoreRef<T>, target: NodeId, position: RenderPosition) -> Result<()> {
    let (tree, desc) = {
        let view = core.borrow();
        if view.element.is_some() {
            tracing::trace!("mount on a mounted view ignored");
            return Ok(());
        }
        (Rc::clone(&view.tree), view.template.template(&view.state)?)
    };

    let node = {
        let mut tree = tree.borrow_mut();
        let node = tree.build(&desc);
        if let Err(err) = tree.insert(target, node, position) {
            tree.remove(node);
            return Err(err);
        }
        node
    };
    {
        let mut view = core.borrow_mut();
        view.element = Some(node);
        view.renders += 1;
    }
    bind(core, &tree, node)
}

fn unmount<T: StatefulTemplate>(core: &CoreRef<T>) {
    let mut view = core.borrow_mut();
    let Some(node) = view.element.take() else {
        tracing::trace!("unmount on an unmounted view ignored");
        return;
    };
    let tree = Rc::clone(&view.tree);
    let mut tree = tree.borrow_mut();
    view.widgets.dispose_all(&mut tree);
    tree.remove(node);
}

fn set_state<T: StatefulTemplate>(core: &CoreRef<T>, update: impl FnOnce(&mut T::State)) {
    update(&mut core.borrow_mut().state);
}

fn update_element<T: StatefulTemplate>(core: &CoreRef<T>, update: impl FnOnce(&mut T::State)) -> Result<()> {
    let (tree, state, desc, old) = {
        let view = core.borrow();
        let mut state = view.state.clone();
        update(&mut state);
        let desc = match view.element {
            Some(_) => Some(view.template.template(&state)?),
            None => None,
        };
        (Rc::clone(&view.tree), state, desc, view.element)
    };

    let (Some(old), Some(desc)) = (old, desc) else {
        core.borrow_mut().state = state;
        return Ok(());
    };

    let (node, snapshot) = {
        let mut view = core.borrow_mut();
        let mut tree = tree.borrow_mut();
        let snapshot = tree.focus_snapshot(old);
        view.widgets.dispose_all(&mut tree);
        let node = tree.build(&desc);
        if let Err(err) = tree.replace(old, node) {
            tree.remove(node);
            return Err(err);
        }
        view.state = state;
        view.element = Some(node);
        view.renders += 1;
        (node, snapshot)
    };

    bind(core, &tree, node)?;

    if let Some(snapshot) = snapshot {
        let restored = tree.borrow_mut().restore_focus(node, &snapshot);
        tracing::trace!(role = %snapshot.role, restored, "focus restore");
    }
    Ok(())
}

/// Attach declared handlers and create declared widgets on `node`.
fn bind<T: StatefulTemplate>(core: &CoreRef<T>, tree: &SharedTree, node: NodeId) -> Result<()> {
    let (bindings, requests) = {
        let view = core.borrow();
        let mut binder = HandlerBinder::new();
        view.template.restore_handlers(&mut binder);
        let mut widgets = WidgetCx::new();
        view.template.create_widgets(&view.state, &mut widgets);
        (binder.bindings, widgets.requests)
    };
    let handle = ViewHandle {
        core: Rc::downgrade(core),
    };

    {
        let mut tree = tree.borrow_mut();
        for binding in bindings {
            let target = match &binding.selector {
                Selector::Root => Some(node),
                Selector::Role(role) => tree.query(node, role),
                Selector::Class(class) => tree.query_class(node, class),
            };
            let Some(target) = target else {
                tracing::trace!(selector = ?binding.selector, "handler target absent");
                continue;
            };
            let handle = handle.clone();
            let handler = binding.handler;
            let wrapped: Handler = Rc::new(move |event: &Event| handler(&handle, event));
            tree.attach_handler(target, binding.kind, wrapped);
        }
    }

    for request in requests {
        let mut view = core.borrow_mut();
        let mut tree = tree.borrow_mut();
        let Some(target) = tree.query(node, &request.role) else {
            tracing::trace!(role = %request.role, "widget target absent");
            continue;
        };
        let handle = handle.clone();
        let on_pick = request.on_pick;
        let callback: PickHandler = Rc::new(move |date| on_pick(&handle, date));
        let picker = DatePicker::attach(&mut tree, &request.name, target, request.options, callback)?;
        view.widgets.insert(&mut tree, Box::new(picker));
    }
    Ok(())
}

// =============================================================================
// Public handles
// =============================================================================

/// Owning handle. Dropping a mounted view unmounts it.
pub struct StatefulView<T: StatefulTemplate> {
    core: CoreRef<T>,
}

impl<T: StatefulTemplate> StatefulView<T> {
    pub fn new(tree: SharedTree, template: T, state: T::State) -> Self {
        Self {
            core: Rc::new(RefCell::new(ViewCore {
                tree,
                template,
                state,
                element: None,
                widgets: WidgetRegistry::new(),
                renders: 0,
            })),
        }
    }

    /// Build, insert relative to `target`, attach handlers, create widgets.
    /// No-op when already mounted.
    pub fn mount(&self, target: NodeId, position: RenderPosition) -> Result<()> {
        mount(&self.core, target, position)
    }

    /// Dispose widgets and remove the markup. No-op when not mounted.
    pub fn unmount(&self) {
        unmount(&self.core);
    }

    /// Merge into state without touching the markup.
    pub fn set_state(&self, update: impl FnOnce(&mut T::State)) {
        set_state(&self.core, update);
    }

    /// Merge into state and reconcile the markup.
    pub fn update_element(&self, update: impl FnOnce(&mut T::State)) -> Result<()> {
        update_element(&self.core, update)
    }

    pub fn state(&self) -> T::State {
        self.core.borrow().state.clone()
    }

    pub fn template(&self) -> Ref<'_, T> {
        Ref::map(self.core.borrow(), |view| &view.template)
    }

    pub fn element(&self) -> Option<NodeId> {
        self.core.borrow().element
    }

    pub fn is_mounted(&self) -> bool {
        self.element().is_some()
    }

    /// Number of times markup was built for this view.
    pub fn render_count(&self) -> usize {
        self.core.borrow().renders
    }

    pub fn widget_names(&self) -> Vec<String> {
        self.core
            .borrow()
            .widgets
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn handle(&self) -> ViewHandle<T> {
        ViewHandle {
            core: Rc::downgrade(&self.core),
        }
    }
}

impl<T: StatefulTemplate> Drop for StatefulView<T> {
    fn drop(&mut self) {
        if self.core.try_borrow().is_ok_and(|view| view.element.is_some()) {
            unmount(&self.core);
        }
    }
}

impl<T: StatefulTemplate> fmt::Debug for StatefulView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(view) => f
                .debug_struct("StatefulView")
                .field("state", &view.state)
                .field("element", &view.element)
                .field("renders", &view.renders)
                .finish(),
            Err(_) => f.write_str("StatefulView { <borrowed> }"),
        }
    }
}

/// Weak handle given to handlers. Every operation on a dropped view is a
/// no-op.
pub struct ViewHandle<T: StatefulTemplate> {
    core: Weak<RefCell<ViewCore<T>>>,
}

impl<T: StatefulTemplate> Clone for ViewHandle<T> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<T: StatefulTemplate> ViewHandle<T> {
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }

    pub fn state(&self) -> Option<T::State> {
        self.core.upgrade().map(|core| core.borrow().state.clone())
    }

    pub fn element(&self) -> Option<NodeId> {
        self.core.upgrade().and_then(|core| core.borrow().element)
    }

    pub fn tree(&self) -> Option<SharedTree> {
        self.core.upgrade().map(|core| Rc::clone(&core.borrow().tree))
    }

    pub fn set_state(&self, update: impl FnOnce(&mut T::State)) {
        if let Some(core) = self.core.upgrade() {
            set_state(&core, update);
        }
    }

    pub fn update_element(&self, update: impl FnOnce(&mut T::State)) -> Result<()> {
        match self.core.upgrade() {
            Some(core) => update_element(&core, update),
            None => Ok(()),
        }
    }
}
