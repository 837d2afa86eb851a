//! New point presenter - The blank form at the head of the list.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::Settings;
use crate::engine::{NodeId, RenderPosition, SharedTree};
use crate::error::Result;
use crate::model::PointsModel;
use crate::presenter::DataUpdate;
use crate::types::{Severity, UserAction};
use crate::utils::Clock;
use crate::view::{Callback, PointDraft, PointFormTemplate, StatefulView};

pub struct NewPointPresenter {
    tree: SharedTree,
    points_model: Rc<PointsModel>,
    settings: Rc<Settings>,
    clock: Rc<dyn Clock>,
    on_data_update: DataUpdate,
    on_destroy: Callback,
    form_view: RefCell<Option<StatefulView<PointFormTemplate>>>,
    this: Weak<NewPointPresenter>,
}

impl NewPointPresenter {
    pub fn new(
        tree: SharedTree,
        points_model: Rc<PointsModel>,
        settings: Rc<Settings>,
        clock: Rc<dyn Clock>,
        on_data_update: DataUpdate,
        on_destroy: Callback,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            tree,
            points_model,
            settings,
            clock,
            on_data_update,
            on_destroy,
            form_view: RefCell::new(None),
            this: Weak::clone(this),
        })
    }

    pub fn is_open(&self) -> bool {
        self.form_view.borrow().is_some()
    }

    pub fn element(&self) -> Option<NodeId> {
        self.form_view.borrow().as_ref().and_then(StatefulView::element)
    }

    /// Mount a blank form as the first child of `container`. No-op when a
    /// form is already open.
    pub fn init(&self, container: NodeId) -> Result<()> {
        if self.is_open() {
            tracing::trace!("new point form already open");
            return Ok(());
        }
        let draft = PointDraft::blank(self.settings.blank_point_type, self.clock.now());
        let form = StatefulView::new(Rc::clone(&self.tree), self.form_template(), draft);
        form.mount(container, RenderPosition::AfterBegin)?;
        *self.form_view.borrow_mut() = Some(form);
        tracing::debug!("new point form opened");
        Ok(())
    }

    /// Remove the form and run the destroy hook. No-op when no form is open.
    pub fn destroy(&self) -> Result<()> {
        let form = self.form_view.borrow_mut().take();
        let Some(form) = form else {
            tracing::trace!("new point form already closed");
            return Ok(());
        };
        form.unmount();
        drop(form);
        tracing::debug!("new point form closed");
        (self.on_destroy)()
    }

    fn submit(&self, draft: PointDraft) -> Result<()> {
        let point = draft.into_point(self.points_model.generate_id())?;
        (self.on_data_update)(UserAction::AddPoint, Severity::Medium, point)?;
        self.destroy()
    }

    fn form_template(&self) -> PointFormTemplate {
        let submit = Weak::clone(&self.this);
        let cancel = Weak::clone(&self.this);
        let close = Weak::clone(&self.this);
        PointFormTemplate::new(
            Rc::clone(self.points_model.catalog()),
            self.settings.form_date_format.clone(),
            Rc::new(move |draft| match submit.upgrade() {
                Some(presenter) => presenter.submit(draft),
                None => Ok(()),
            }),
            Rc::new(move || match cancel.upgrade() {
                Some(presenter) => presenter.destroy(),
                None => Ok(()),
            }),
            Rc::new(move || match close.upgrade() {
                Some(presenter) => presenter.destroy(),
                None => Ok(()),
            }),
        )
    }
}
