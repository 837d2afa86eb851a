//! Point presenter - One list item, in display or edit mode.
//!
//! ```text
//!            open            (reports Edit first)
//!   DISPLAY ------> EDIT
//!      ^              |
//!      +--------------+  submit / close / ESC / reset_view
//! ```
//!
//! The presenter reports `Edit` before swapping views so the list can close
//! whatever editor was open; it reports `Display` when it closes itself.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::Settings;
use crate::engine::{NodeId, RenderPosition, SharedTree};
use crate::error::{Result, TripError};
use crate::model::Catalog;
use crate::presenter::{DataUpdate, Mode, ModeChange};
use crate::types::{Point, PointId, Severity, UserAction};
use crate::view::{PointDraft, PointFormTemplate, PointTemplate, StatefulView};

pub struct PointPresenter {
    tree: SharedTree,
    container: NodeId,
    catalog: Rc<Catalog>,
    settings: Rc<Settings>,
    on_data_update: DataUpdate,
    on_mode_change: ModeChange,
    point: RefCell<Option<Point>>,
    mode: Cell<Mode>,
    point_view: RefCell<Option<StatefulView<PointTemplate>>>,
    form_view: RefCell<Option<StatefulView<PointFormTemplate>>>,
    this: Weak<PointPresenter>,
}

impl PointPresenter {
    pub fn new(
        tree: SharedTree,
        container: NodeId,
        catalog: Rc<Catalog>,
        settings: Rc<Settings>,
        on_data_update: DataUpdate,
        on_mode_change: ModeChange,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            tree,
            container,
            catalog,
            settings,
            on_data_update,
            on_mode_change,
            point: RefCell::new(None),
            mode: Cell::new(Mode::Display),
            point_view: RefCell::new(None),
            form_view: RefCell::new(None),
            this: Weak::clone(this),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    pub fn point(&self) -> Option<Point> {
        self.point.borrow().clone()
    }

    pub fn point_id(&self) -> Option<PointId> {
        self.point.borrow().as_ref().map(|point| point.id.clone())
    }

    /// Node of whichever view is showing.
    pub fn element(&self) -> Option<NodeId> {
        match self.mode.get() {
            Mode::Display => self.point_view.borrow().as_ref().and_then(StatefulView::element),
            Mode::Edit => self.form_view.borrow().as_ref().and_then(StatefulView::element),
        }
    }

    /// Times the display view was built.
    pub fn render_count(&self) -> usize {
        self.point_view.borrow().as_ref().map_or(0, StatefulView::render_count)
    }

    /// Render `point`. First call mounts the display view at the end of the
    /// container; later calls reconcile it in place. An open form is reset
    /// to the new data.
    pub fn init(&self, point: Point) -> Result<()> {
        *self.point.borrow_mut() = Some(point.clone());

        let existing = self.point_view.borrow().as_ref().map(StatefulView::handle);
        match existing {
            Some(handle) => {
                let snapshot = point.clone();
                handle.update_element(move |state| *state = snapshot)?;
            }
            None => {
                let view = StatefulView::new(Rc::clone(&self.tree), self.point_template(), point.clone());
                view.mount(self.container, RenderPosition::BeforeEnd)?;
                *self.point_view.borrow_mut() = Some(view);
            }
        }

        let form = self.form_view.borrow().as_ref().map(StatefulView::handle);
        if let Some(form) = form {
            form.update_element(|draft| *draft = PointDraft::from(&point))?;
        }
        Ok(())
    }

    /// Switch to the edit form. No-op when already editing.
    pub fn open(&self) -> Result<()> {
        if self.mode.get() == Mode::Edit {
            tracing::trace!("open on an open point ignored");
            return Ok(());
        }
        let point = self.point().ok_or(TripError::DetachedNode)?;
        (self.on_mode_change)(&point.id, Mode::Edit)?;

        let anchor = self.element().ok_or(TripError::DetachedNode)?;
        let form = StatefulView::new(
            Rc::clone(&self.tree),
            self.form_template(),
            PointDraft::from(&point),
        );
        form.mount(anchor, RenderPosition::BeforeBegin)?;
        if let Some(view) = self.point_view.borrow().as_ref() {
            view.unmount();
        }
        *self.form_view.borrow_mut() = Some(form);
        self.mode.set(Mode::Edit);
        tracing::debug!(id = %point.id, "point opened");
        Ok(())
    }

    /// Back to display mode, dropping unsaved edits. No-op in display mode.
    pub fn reset_view(&self) -> Result<()> {
        if self.mode.get() == Mode::Display {
            return Ok(());
        }
        let form = self.form_view.borrow_mut().take();
        if let Some(form) = form {
            if let (Some(anchor), Some(view)) = (form.element(), self.point_view.borrow().as_ref()) {
                let point = self.point();
                if let Some(point) = point {
                    view.set_state(|state| *state = point);
                }
                view.mount(anchor, RenderPosition::BeforeBegin)?;
            }
            form.unmount();
        }
        self.mode.set(Mode::Display);
        tracing::debug!(id = ?self.point_id(), "point closed");
        Ok(())
    }

    /// `reset_view` initiated by the user: also tells the list.
    fn close(&self) -> Result<()> {
        if self.mode.get() == Mode::Display {
            return Ok(());
        }
        self.reset_view()?;
        match self.point_id() {
            Some(id) => (self.on_mode_change)(&id, Mode::Display),
            None => Ok(()),
        }
    }

    /// Remove both views. The presenter is unusable afterwards.
    pub fn destroy(&self) {
        let form = self.form_view.borrow_mut().take();
        let view = self.point_view.borrow_mut().take();
        if let Some(form) = form {
            form.unmount();
        }
        if let Some(view) = view {
            view.unmount();
        }
        self.mode.set(Mode::Display);
    }

    // -------------------------------------------------------------------------
    // View callbacks
    // -------------------------------------------------------------------------

    fn toggle_favorite(&self) -> Result<()> {
        let mut point = self.point().ok_or(TripError::DetachedNode)?;
        point.is_favorite = !point.is_favorite;
        (self.on_data_update)(UserAction::UpdatePoint, Severity::Patch, point)
    }

    fn submit(&self, draft: PointDraft) -> Result<()> {
        let id = self.point_id().ok_or(TripError::DetachedNode)?;
        let point = draft.into_point(id)?;
        (self.on_data_update)(UserAction::UpdatePoint, Severity::Medium, point)?;
        self.close()
    }

    fn delete(&self) -> Result<()> {
        let point = self.point().ok_or(TripError::DetachedNode)?;
        (self.on_data_update)(UserAction::DeletePoint, Severity::Medium, point)
    }

    fn point_template(&self) -> PointTemplate {
        PointTemplate::new(
            Rc::clone(&self.catalog),
            callback(&self.this, |presenter| presenter.open()),
            callback(&self.this, |presenter| presenter.toggle_favorite()),
        )
    }

    fn form_template(&self) -> PointFormTemplate {
        let this = Weak::clone(&self.this);
        PointFormTemplate::new(
            Rc::clone(&self.catalog),
            self.settings.form_date_format.clone(),
            Rc::new(move |draft| match this.upgrade() {
                Some(presenter) => presenter.submit(draft),
                None => Ok(()),
            }),
            callback(&self.this, |presenter| presenter.delete()),
            callback(&self.this, |presenter| presenter.close()),
        )
    }
}

/// View callback bound to a weak presenter.
fn callback(
    this: &Weak<PointPresenter>,
    action: impl Fn(&PointPresenter) -> Result<()> + 'static,
) -> crate::view::Callback {
    let this = Weak::clone(this);
    Rc::new(move || match this.upgrade() {
        Some(presenter) => action(&presenter),
        None => Ok(()),
    })
}
