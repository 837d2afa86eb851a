//! Filter presenter - Filter bar bound to the filter store.
//!
//! Choices go to the store with MAJOR severity. The bar follows both stores:
//! the checked radio tracks the active filter, and filters that would show
//! nothing are disabled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::{NodeId, RenderPosition, SharedTree};
use crate::error::Result;
use crate::model::{FilterModel, ObserverId, PointsModel};
use crate::types::{FilterKind, Severity};
use crate::utils::{Clock, has_points};
use crate::view::{FiltersState, FiltersTemplate, StatefulView};

pub struct FilterPresenter {
    tree: SharedTree,
    container: NodeId,
    filter_model: Rc<FilterModel>,
    points_model: Rc<PointsModel>,
    clock: Rc<dyn Clock>,
    view: RefCell<Option<StatefulView<FiltersTemplate>>>,
    observers: RefCell<Option<(ObserverId, ObserverId)>>,
    this: Weak<FilterPresenter>,
}

impl FilterPresenter {
    pub fn new(
        tree: SharedTree,
        container: NodeId,
        filter_model: Rc<FilterModel>,
        points_model: Rc<PointsModel>,
        clock: Rc<dyn Clock>,
    ) -> Rc<Self> {
        let presenter = Rc::new_cyclic(|this| Self {
            tree,
            container,
            filter_model,
            points_model,
            clock,
            view: RefCell::new(None),
            observers: RefCell::new(None),
            this: Weak::clone(this),
        });

        let this = Weak::clone(&presenter.this);
        let on_points = presenter.points_model.add_observer(move |_, _| match this.upgrade() {
            Some(presenter) => presenter.init(),
            None => Ok(()),
        });
        let this = Weak::clone(&presenter.this);
        let on_filter = presenter.filter_model.add_observer(move |_, _| match this.upgrade() {
            Some(presenter) => presenter.init(),
            None => Ok(()),
        });
        *presenter.observers.borrow_mut() = Some((on_points, on_filter));
        presenter
    }

    pub fn state(&self) -> FiltersState {
        let points = self.points_model.points();
        let now = self.clock.now();
        FiltersState {
            active: self.filter_model.filter(),
            disabled: FilterKind::ALL
                .into_iter()
                .filter(|kind| !has_points(&points, *kind, now))
                .collect(),
        }
    }

    /// Mount the bar, or reconcile it when its state changed.
    pub fn init(&self) -> Result<()> {
        let state = self.state();
        let existing = self.view.borrow().as_ref().map(|view| (view.handle(), view.state()));
        match existing {
            Some((_, current)) if current == state => Ok(()),
            Some((handle, _)) => handle.update_element(|current| *current = state),
            None => {
                let view = StatefulView::new(Rc::clone(&self.tree), self.template(), state);
                view.mount(self.container, RenderPosition::BeforeEnd)?;
                *self.view.borrow_mut() = Some(view);
                Ok(())
            }
        }
    }

    pub fn element(&self) -> Option<NodeId> {
        self.view.borrow().as_ref().and_then(StatefulView::element)
    }

    pub fn handle_filter_change(&self, filter: FilterKind) -> Result<()> {
        tracing::debug!(filter = filter.as_str(), "filter chosen");
        self.filter_model.set_filter(Severity::Major, filter)
    }

    pub fn shutdown(&self) {
        if let Some((on_points, on_filter)) = self.observers.borrow_mut().take() {
            self.points_model.remove_observer(on_points);
            self.filter_model.remove_observer(on_filter);
        }
        if let Some(view) = self.view.borrow_mut().take() {
            view.unmount();
        }
    }

    fn template(&self) -> FiltersTemplate {
        let this = Weak::clone(&self.this);
        FiltersTemplate::new(Rc::new(move |filter| match this.upgrade() {
            Some(presenter) => presenter.handle_filter_change(filter),
            None => Ok(()),
        }))
    }
}
