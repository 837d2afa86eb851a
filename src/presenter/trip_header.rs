//! Trip header presenter - Route, dates and cost over all points.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Settings;
use crate::engine::{NodeId, RenderPosition, SharedTree};
use crate::error::Result;
use crate::model::Catalog;
use crate::types::{Point, SortKind};
use crate::utils::{format, sort};
use crate::view::{StatefulView, TripInfo, TripInfoTemplate};

pub struct TripHeaderPresenter {
    tree: SharedTree,
    container: NodeId,
    catalog: Rc<Catalog>,
    settings: Rc<Settings>,
    view: RefCell<Option<StatefulView<TripInfoTemplate>>>,
}

impl TripHeaderPresenter {
    pub fn new(tree: SharedTree, container: NodeId, catalog: Rc<Catalog>, settings: Rc<Settings>) -> Self {
        Self {
            tree,
            container,
            catalog,
            settings,
            view: RefCell::new(None),
        }
    }

    pub fn summarize(&self, points: &[Point]) -> Result<TripInfo> {
        let points = sort(points, SortKind::Day);
        Ok(TripInfo {
            title: format::route_title(&self.catalog, &points, self.settings.route_title_limit)?,
            dates: format::trip_dates(&points).unwrap_or_default(),
            cost: format::total_cost(&self.catalog, &points)?,
        })
    }

    /// Mount the summary as the first child of the header, or reconcile it
    /// when the numbers changed.
    pub fn init(&self, points: &[Point]) -> Result<()> {
        let info = self.summarize(points)?;
        let existing = self.view.borrow().as_ref().map(|view| (view.handle(), view.state()));
        match existing {
            Some((_, current)) if current == info => Ok(()),
            Some((handle, _)) => handle.update_element(|state| *state = info),
            None => {
                let view = StatefulView::new(Rc::clone(&self.tree), TripInfoTemplate, info);
                view.mount(self.container, RenderPosition::AfterBegin)?;
                *self.view.borrow_mut() = Some(view);
                Ok(())
            }
        }
    }

    pub fn destroy(&self) {
        if let Some(view) = self.view.borrow_mut().take() {
            view.unmount();
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.view.borrow().is_some()
    }

    pub fn element(&self) -> Option<NodeId> {
        self.view.borrow().as_ref().and_then(StatefulView::element)
    }

    pub fn render_count(&self) -> usize {
        self.view.borrow().as_ref().map_or(0, StatefulView::render_count)
    }

    pub fn info(&self) -> Option<TripInfo> {
        self.view.borrow().as_ref().map(StatefulView::state)
    }
}
