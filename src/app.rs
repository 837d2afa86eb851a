//! Application shell - Roots, stores and presenters wired together.
//!
//! ```ignore
//! let catalog = Catalog::from_json_str(&catalog_json)?;
//! let points = points_from_json_str(&points_json)?;
//! let app = TripApp::new(Settings::default(), catalog, points, Rc::new(SystemClock))?;
//! app.init()?;
//!
//! app.handle_key(key)?;        // ESC closes the open editor
//! println!("{}", renderer::outline(&app.tree().borrow()));
//!
//! app.shutdown()?;
//! ```
//!
//! # Roots
//!
//! | Root                              | Content                            |
//! |-----------------------------------|------------------------------------|
//! | `div.trip-main`                   | trip header, "new event" button    |
//! | `div.trip-controls__filters`      | filter bar                         |
//! | `section.trip-events`             | sort bar, list or placeholder      |

use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

use crate::config::Settings;
use crate::engine::{NodeId, RenderPosition, SharedTree, VisualTree};
use crate::error::Result;
use crate::model::{Catalog, FilterModel, PointsModel};
use crate::presenter::{Containers, FilterPresenter, ListPresenter};
use crate::types::Point;
use crate::utils::Clock;
use crate::view::{NewEventButtonTemplate, StatefulView, ViewHandle};

type ButtonSlot = Rc<OnceCell<ViewHandle<NewEventButtonTemplate>>>;

pub struct TripApp {
    tree: SharedTree,
    filters_root: NodeId,
    containers: Containers,
    points_model: Rc<PointsModel>,
    filter_model: Rc<FilterModel>,
    filter_presenter: Rc<FilterPresenter>,
    list: Rc<ListPresenter>,
    button: StatefulView<NewEventButtonTemplate>,
}

impl TripApp {
    pub fn new(settings: Settings, catalog: Catalog, points: Vec<Point>, clock: Rc<dyn Clock>) -> Result<Self> {
        settings.validate()?;
        let settings = Rc::new(settings);
        let tree = VisualTree::shared();
        let (containers, filters_root) = {
            let mut t = tree.borrow_mut();
            let header = t.create_root("div", "trip-main");
            let filters = t.create_root("div", "trip-controls__filters");
            let main = t.create_root("section", "trip-events");
            (Containers { header, main }, filters)
        };

        let points_model = Rc::new(PointsModel::new(Rc::new(catalog), points)?);
        let filter_model = Rc::new(FilterModel::new());
        let filter_presenter = FilterPresenter::new(
            Rc::clone(&tree),
            filters_root,
            Rc::clone(&filter_model),
            Rc::clone(&points_model),
            Rc::clone(&clock),
        );

        let slot: ButtonSlot = Rc::new(OnceCell::new());
        let list = ListPresenter::new(
            Rc::clone(&tree),
            containers,
            settings,
            clock,
            Rc::clone(&points_model),
            Rc::clone(&filter_model),
            {
                let slot = Rc::clone(&slot);
                Rc::new(move || set_button_disabled(&slot, false))
            },
        );

        let button = {
            let slot = Rc::clone(&slot);
            let list = Rc::downgrade(&list);
            StatefulView::new(
                Rc::clone(&tree),
                NewEventButtonTemplate::new(Rc::new(move || create_point(&list, &slot))),
                false,
            )
        };
        slot.get_or_init(|| button.handle());

        Ok(Self {
            tree,
            filters_root,
            containers,
            points_model,
            filter_model,
            filter_presenter,
            list,
            button,
        })
    }

    /// Render the filter bar, the "new event" button and the board.
    pub fn init(&self) -> Result<()> {
        self.filter_presenter.init()?;
        self.button.mount(self.containers.header, RenderPosition::BeforeEnd)?;
        self.list.init()?;
        tracing::info!(points = self.points_model.len(), "trip board ready");
        Ok(())
    }

    /// Same as clicking "new event".
    pub fn create_point(&self) -> Result<()> {
        self.button.update_element(|disabled| *disabled = true)?;
        self.list.create_point()
    }

    /// Returns whether the key was consumed.
    pub fn handle_key(&self, key: KeyEvent) -> Result<bool> {
        self.list.handle_key(key)
    }

    /// Detach every presenter and clear both stores' observers.
    pub fn shutdown(&self) -> Result<()> {
        self.list.shutdown()?;
        self.filter_presenter.shutdown();
        self.button.unmount();
        self.points_model.clear_observers();
        self.filter_model.clear_observers();
        tracing::info!("trip board shut down");
        Ok(())
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn containers(&self) -> Containers {
        self.containers
    }

    pub fn filters_root(&self) -> NodeId {
        self.filters_root
    }

    pub fn points_model(&self) -> &Rc<PointsModel> {
        &self.points_model
    }

    pub fn filter_model(&self) -> &Rc<FilterModel> {
        &self.filter_model
    }

    pub fn filter_presenter(&self) -> &Rc<FilterPresenter> {
        &self.filter_presenter
    }

    pub fn list(&self) -> &Rc<ListPresenter> {
        &self.list
    }

    pub fn button_element(&self) -> Option<NodeId> {
        self.button.element()
    }

    pub fn is_button_disabled(&self) -> bool {
        self.button.state()
    }
}

fn set_button_disabled(slot: &ButtonSlot, disabled: bool) -> Result<()> {
    match slot.get() {
        Some(handle) => handle.update_element(|state| *state = disabled),
        None => Ok(()),
    }
}

fn create_point(list: &Weak<ListPresenter>, slot: &ButtonSlot) -> Result<()> {
    let Some(list) = list.upgrade() else {
        return Ok(());
    };
    set_button_disabled(slot, true)?;
    list.create_point()
}
