//! List presenter - Severity-driven rendering of the point list.
//!
//! The list presenter is the only subscriber that re-renders points. Each
//! notification is mapped to a [`RenderScope`]:
//!
//! | Severity | Scope        | Work                                              |
//! |----------|--------------|---------------------------------------------------|
//! | Patch    | ITEM         | reconcile the named item                          |
//! | Minor    | ITEM, HEADER | reconcile the named item and the trip header      |
//! | Medium   | LIST         | drop every item, the new form and the placeholder, render again |
//! | Major    | LIST, SORT   | as Medium, plus default sort and a fresh sort bar |
//!
//! At most one editor is open across the list. The [`Editor`] slot names it;
//! opening another one closes the previous one first.
//!
//! # Board layout
//!
//! ```text
//! main
//! ├── sort bar          (only while the visible list is non-empty)
//! ├── ul.trip-events__list
//! │   ├── new point form (when open)
//! │   └── items, in sort order
//! └── placeholder       (instead of sort bar and list when empty)
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crossterm::event::{KeyCode, KeyEvent};

use crate::config::Settings;
use crate::engine::{NodeId, RenderPosition, SharedTree};
use crate::error::{Result, TripError};
use crate::model::{FilterModel, ObserverId, PointsModel};
use crate::presenter::{DataUpdate, Mode, ModeChange, NewPointPresenter, PointPresenter, TripHeaderPresenter};
use crate::types::{FilterKind, Point, PointId, RenderScope, Severity, SortKind, UserAction};
use crate::utils::{Clock, filter, sort};
use crate::view::{Callback, ListTemplate, NoPointsTemplate, SortTemplate, StatefulView};

/// The one open editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Point(PointId),
    NewPoint,
}

/// Containers the list presenter renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Containers {
    /// Trip header; the summary goes first.
    pub header: NodeId,
    /// Board: sort bar, list and placeholder.
    pub main: NodeId,
}

pub struct ListPresenter {
    tree: SharedTree,
    containers: Containers,
    settings: Rc<Settings>,
    clock: Rc<dyn Clock>,
    points_model: Rc<PointsModel>,
    filter_model: Rc<FilterModel>,
    header: TripHeaderPresenter,
    new_point: Rc<NewPointPresenter>,
    list_view: StatefulView<ListTemplate>,
    sort_view: RefCell<Option<StatefulView<SortTemplate>>>,
    no_points_view: RefCell<Option<StatefulView<NoPointsTemplate>>>,
    presenters: RefCell<HashMap<PointId, Rc<PointPresenter>>>,
    order: RefCell<Vec<PointId>>,
    sort: Cell<SortKind>,
    editor: RefCell<Option<Editor>>,
    observers: RefCell<Option<(ObserverId, ObserverId)>>,
    on_new_point_destroy: Callback,
    this: Weak<ListPresenter>,
}

impl ListPresenter {
    pub fn new(
        tree: SharedTree,
        containers: Containers,
        settings: Rc<Settings>,
        clock: Rc<dyn Clock>,
        points_model: Rc<PointsModel>,
        filter_model: Rc<FilterModel>,
        on_new_point_destroy: Callback,
    ) -> Rc<Self> {
        let presenter = Rc::new_cyclic(|this: &Weak<ListPresenter>| {
            let catalog = Rc::clone(points_model.catalog());
            let new_point = NewPointPresenter::new(
                Rc::clone(&tree),
                Rc::clone(&points_model),
                Rc::clone(&settings),
                Rc::clone(&clock),
                data_update(this),
                {
                    let this = Weak::clone(this);
                    Rc::new(move || match this.upgrade() {
                        Some(list) => list.handle_new_point_destroy(),
                        None => Ok(()),
                    })
                },
            );
            Self {
                header: TripHeaderPresenter::new(
                    Rc::clone(&tree),
                    containers.header,
                    catalog,
                    Rc::clone(&settings),
                ),
                list_view: StatefulView::new(Rc::clone(&tree), ListTemplate, ()),
                tree,
                containers,
                sort: Cell::new(settings.default_sort),
                settings,
                clock,
                points_model,
                filter_model,
                new_point,
                sort_view: RefCell::new(None),
                no_points_view: RefCell::new(None),
                presenters: RefCell::new(HashMap::new()),
                order: RefCell::new(Vec::new()),
                editor: RefCell::new(None),
                observers: RefCell::new(None),
                on_new_point_destroy,
                this: Weak::clone(this),
            }
        });

        let this = Weak::clone(&presenter.this);
        let on_points = presenter.points_model.add_observer(move |severity, point| match this.upgrade() {
            Some(list) => list.handle_model_event(severity, Some(point)),
            None => Ok(()),
        });
        let this = Weak::clone(&presenter.this);
        let on_filter = presenter.filter_model.add_observer(move |severity, _| match this.upgrade() {
            Some(list) => list.handle_model_event(severity, None),
            None => Ok(()),
        });
        *presenter.observers.borrow_mut() = Some((on_points, on_filter));
        presenter
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Store points through the active filter and sort, computed fresh.
    pub fn points(&self) -> Vec<Point> {
        let filtered = filter(
            &self.points_model.points(),
            self.filter_model.filter(),
            self.clock.now(),
        );
        sort(&filtered, self.sort.get())
    }

    pub fn sort_kind(&self) -> SortKind {
        self.sort.get()
    }

    pub fn editor(&self) -> Option<Editor> {
        self.editor.borrow().clone()
    }

    /// Ids of the rendered items, top to bottom.
    pub fn visible_ids(&self) -> Vec<PointId> {
        self.order.borrow().clone()
    }

    pub fn presenter(&self, id: &PointId) -> Option<Rc<PointPresenter>> {
        self.presenters.borrow().get(id).cloned()
    }

    pub fn header(&self) -> &TripHeaderPresenter {
        &self.header
    }

    pub fn new_point(&self) -> &Rc<NewPointPresenter> {
        &self.new_point
    }

    pub fn list_element(&self) -> Option<NodeId> {
        self.list_view.element()
    }

    pub fn sort_element(&self) -> Option<NodeId> {
        self.sort_view.borrow().as_ref().and_then(StatefulView::element)
    }

    pub fn placeholder_element(&self) -> Option<NodeId> {
        self.no_points_view.borrow().as_ref().and_then(StatefulView::element)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub fn init(&self) -> Result<()> {
        self.render_board()
    }

    /// Detach from both stores and remove everything this presenter rendered.
    pub fn shutdown(&self) -> Result<()> {
        if let Some((on_points, on_filter)) = self.observers.borrow_mut().take() {
            self.points_model.remove_observer(on_points);
            self.filter_model.remove_observer(on_filter);
        }
        self.clear_board(true)?;
        self.remove_sort();
        self.list_view.unmount();
        self.header.destroy();
        tracing::debug!("list presenter shut down");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Store notifications
    // -------------------------------------------------------------------------

    pub fn handle_model_event(&self, severity: Severity, point: Option<&Point>) -> Result<()> {
        let scope = severity.scope();
        tracing::debug!(?severity, ?scope, id = ?point.map(|point| &point.id), "list model event");

        if scope.contains(RenderScope::ITEM) {
            if let Some(point) = point {
                match self.presenter(&point.id) {
                    Some(presenter) => presenter.init(point.clone())?,
                    None => tracing::trace!(id = %point.id, "no rendered item for update"),
                }
            }
        }
        if scope.contains(RenderScope::HEADER) {
            self.render_header()?;
        }
        if scope.contains(RenderScope::LIST) {
            let reset_sort = scope.contains(RenderScope::SORT);
            self.clear_board(reset_sort)?;
            self.render_board()?;
        }
        Ok(())
    }

    /// Route a view request to the store.
    pub fn handle_view_action(&self, action: UserAction, severity: Severity, point: Point) -> Result<()> {
        tracing::debug!(?action, ?severity, id = %point.id, "view action");
        match action {
            UserAction::AddPoint => self.points_model.add_point(severity, point),
            UserAction::UpdatePoint => self.points_model.update_point(severity, point),
            UserAction::DeletePoint => self.points_model.delete_point(severity, &point.id),
        }
    }

    // -------------------------------------------------------------------------
    // Editor coordination
    // -------------------------------------------------------------------------

    fn handle_mode_change(&self, id: &PointId, mode: Mode) -> Result<()> {
        match mode {
            Mode::Edit => {
                let previous = self.editor.borrow_mut().replace(Editor::Point(id.clone()));
                match previous {
                    Some(Editor::Point(previous)) if &previous == id => Ok(()),
                    Some(previous) => self.close(previous),
                    None => Ok(()),
                }
            }
            Mode::Display => {
                let mut editor = self.editor.borrow_mut();
                if editor.as_ref() == Some(&Editor::Point(id.clone())) {
                    *editor = None;
                }
                Ok(())
            }
        }
    }

    fn close(&self, editor: Editor) -> Result<()> {
        match editor {
            Editor::Point(id) => match self.presenter(&id) {
                Some(presenter) => presenter.reset_view(),
                None => Ok(()),
            },
            Editor::NewPoint => self.new_point.destroy(),
        }
    }

    /// Close whichever editor is open. Returns whether one was.
    pub fn close_editor(&self) -> Result<bool> {
        let editor = self.editor.borrow_mut().take();
        match editor {
            Some(editor) => {
                self.close(editor)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// ESC closes the open editor. Returns whether the key was consumed.
    pub fn handle_key(&self, key: KeyEvent) -> Result<bool> {
        if key.code != KeyCode::Esc {
            return Ok(false);
        }
        self.close_editor()
    }

    fn handle_new_point_destroy(&self) -> Result<()> {
        {
            let mut editor = self.editor.borrow_mut();
            if editor.as_ref() == Some(&Editor::NewPoint) {
                *editor = None;
            }
        }
        if self.points().is_empty() && self.list_view.is_mounted() {
            self.remove_sort();
            self.list_view.unmount();
            self.render_no_points()?;
        }
        (self.on_new_point_destroy)()
    }

    // -------------------------------------------------------------------------
    // Sort & creation
    // -------------------------------------------------------------------------

    /// Re-render under `kind`. No-op for the active key or a disabled one.
    pub fn handle_sort_change(&self, kind: SortKind) -> Result<()> {
        if kind == self.sort.get() || !kind.is_enabled() {
            tracing::trace!(sort = kind.as_str(), "sort unchanged");
            return Ok(());
        }
        tracing::debug!(sort = kind.as_str(), "sort changed");
        self.sort.set(kind);
        self.clear_board(false)?;
        self.render_board()
    }

    /// Open a blank form at the head of the list under default sort and the
    /// `everything` filter.
    /// A draft that is already open is left as typed.
    pub fn create_point(&self) -> Result<()> {
        if self.editor() == Some(Editor::NewPoint) && self.new_point.is_open() {
            tracing::trace!("new point form already open");
            return Ok(());
        }
        self.close_editor()?;

        let sort_changed = self.sort.get() != self.settings.default_sort;
        if self.filter_model.filter() != FilterKind::Everything {
            self.filter_model.set_filter(Severity::Major, FilterKind::Everything)?;
        } else if sort_changed {
            self.clear_board(true)?;
            self.render_board()?;
        }

        if !self.list_view.is_mounted() {
            self.remove_no_points();
            self.list_view.mount(self.containers.main, RenderPosition::BeforeEnd)?;
        }
        let container = self.list_view.element().ok_or(TripError::DetachedNode)?;
        *self.editor.borrow_mut() = Some(Editor::NewPoint);
        self.new_point.init(container)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn render_header(&self) -> Result<()> {
        let all = self.points_model.points();
        if all.is_empty() {
            self.header.destroy();
            Ok(())
        } else {
            self.header.init(&all)
        }
    }

    fn render_board(&self) -> Result<()> {
        self.render_header()?;
        let points = self.points();
        if points.is_empty() {
            self.remove_sort();
            self.list_view.unmount();
            return self.render_no_points();
        }

        self.remove_no_points();
        self.render_sort()?;
        self.list_view.mount(self.containers.main, RenderPosition::BeforeEnd)?;
        let container = self.list_view.element().ok_or(TripError::DetachedNode)?;
        for point in points {
            self.render_point(container, point)?;
        }
        Ok(())
    }

    fn render_point(&self, container: NodeId, point: Point) -> Result<()> {
        let presenter = PointPresenter::new(
            Rc::clone(&self.tree),
            container,
            Rc::clone(self.points_model.catalog()),
            Rc::clone(&self.settings),
            data_update(&self.this),
            mode_change(&self.this),
        );
        let id = point.id.clone();
        presenter.init(point)?;
        self.presenters.borrow_mut().insert(id.clone(), presenter);
        self.order.borrow_mut().push(id);
        Ok(())
    }

    fn render_sort(&self) -> Result<()> {
        let active = self.sort.get();
        let existing = self.sort_view.borrow().as_ref().map(|view| (view.handle(), view.state()));
        match existing {
            Some((_, current)) if current == active => Ok(()),
            Some((handle, _)) => handle.update_element(|current| *current = active),
            None => {
                let this = Weak::clone(&self.this);
                let view = StatefulView::new(
                    Rc::clone(&self.tree),
                    SortTemplate::new(Rc::new(move |kind| match this.upgrade() {
                        Some(list) => list.handle_sort_change(kind),
                        None => Ok(()),
                    })),
                    active,
                );
                view.mount(self.containers.main, RenderPosition::AfterBegin)?;
                *self.sort_view.borrow_mut() = Some(view);
                Ok(())
            }
        }
    }

    fn render_no_points(&self) -> Result<()> {
        self.remove_no_points();
        let view = StatefulView::new(Rc::clone(&self.tree), NoPointsTemplate, self.filter_model.filter());
        view.mount(self.containers.main, RenderPosition::BeforeEnd)?;
        *self.no_points_view.borrow_mut() = Some(view);
        Ok(())
    }

    fn remove_sort(&self) {
        if let Some(view) = self.sort_view.borrow_mut().take() {
            view.unmount();
        }
    }

    fn remove_no_points(&self) {
        if let Some(view) = self.no_points_view.borrow_mut().take() {
            view.unmount();
        }
    }

    /// Drop the new form, every item and the placeholder. With `reset_sort`
    /// the sort key goes back to default and the sort bar is discarded.
    fn clear_board(&self, reset_sort: bool) -> Result<()> {
        self.new_point.destroy()?;
        *self.editor.borrow_mut() = None;

        let presenters: Vec<Rc<PointPresenter>> =
            self.presenters.borrow_mut().drain().map(|(_, presenter)| presenter).collect();
        for presenter in presenters {
            presenter.destroy();
        }
        self.order.borrow_mut().clear();
        self.remove_no_points();

        if reset_sort {
            self.sort.set(self.settings.default_sort);
            self.remove_sort();
        }
        Ok(())
    }
}

fn data_update(this: &Weak<ListPresenter>) -> DataUpdate {
    let this = Weak::clone(this);
    Rc::new(move |action, severity, point| match this.upgrade() {
        Some(list) => list.handle_view_action(action, severity, point),
        None => Ok(()),
    })
}

fn mode_change(this: &Weak<ListPresenter>) -> ModeChange {
    let this = Weak::clone(this);
    Rc::new(move |id: &PointId, mode: Mode| match this.upgrade() {
        Some(list) => list.handle_mode_change(id, mode),
        None => Ok(()),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::engine::{VisualTree, events};
    use crate::model::catalog::fixtures::catalog;
    use crate::model::points::fixtures::three_points;
    use crate::utils::FixedClock;
    use crate::view::point_form_view::DESTINATION_ROLE;
    use crate::view::sort_view::sort_role;

    struct Board {
        tree: SharedTree,
        containers: Containers,
        list: Rc<ListPresenter>,
        points_model: Rc<PointsModel>,
        filter_model: Rc<FilterModel>,
    }

    fn board(points: Vec<Point>) -> Board {
        let tree = VisualTree::shared();
        let containers = {
            let mut t = tree.borrow_mut();
            Containers {
                header: t.create_root("div", "trip-main"),
                main: t.create_root("section", "trip-events"),
            }
        };
        let points_model = Rc::new(PointsModel::new(Rc::new(catalog()), points).expect("model"));
        let filter_model = Rc::new(FilterModel::new());
        // Mar 4: p1 is past, p2 and p3 are future.
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
        let list = ListPresenter::new(
            Rc::clone(&tree),
            containers,
            Rc::new(Settings::default()),
            Rc::new(clock),
            Rc::clone(&points_model),
            Rc::clone(&filter_model),
            Rc::new(|| Ok(())),
        );
        list.init().expect("init");
        Board {
            tree,
            containers,
            list,
            points_model,
            filter_model,
        }
    }

    fn ids(list: &ListPresenter) -> Vec<String> {
        list.visible_ids().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_init_renders_sorted_list_with_sort_bar() {
        let b = board(three_points());
        assert_eq!(ids(&b.list), ["p1", "p2", "p3"]);
        let main = b.tree.borrow().children(b.containers.main).to_vec();
        assert_eq!(main, [b.list.sort_element().expect("sort"), b.list.list_element().expect("list")]);
        assert!(b.list.header().is_rendered());
    }

    #[test]
    fn test_rendered_order_matches_tree_order() {
        let b = board(three_points());
        let list = b.list.list_element().expect("list");
        let rows = b.tree.borrow().children(list).to_vec();
        let expected: Vec<NodeId> = b
            .list
            .visible_ids()
            .iter()
            .filter_map(|id| b.list.presenter(id).and_then(|p| p.element()))
            .collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_sort_change_rerenders_without_store() {
        let b = board(three_points());
        let sort = b.list.sort_element().expect("sort");
        let price = b.tree.borrow().query(sort, &sort_role(SortKind::Price)).expect("price radio");
        events::choose(&b.tree, price).expect("choose");

        assert_eq!(b.list.sort_kind(), SortKind::Price);
        assert_eq!(ids(&b.list), ["p2", "p3", "p1"]);
        let sort = b.list.sort_element().expect("sort");
        let price = b.tree.borrow().query(sort, &sort_role(SortKind::Price)).expect("price radio");
        assert!(b.tree.borrow().is_checked(price));
    }

    #[test]
    fn test_same_sort_is_noop() {
        let b = board(three_points());
        let before: Vec<_> = b.list.visible_ids().iter().filter_map(|id| b.list.presenter(id)).collect();
        b.list.handle_sort_change(SortKind::Day).expect("same key");
        b.list.handle_sort_change(SortKind::Offers).expect("disabled key");
        for presenter in before {
            let id = presenter.point_id().expect("id");
            let current = b.list.presenter(&id).expect("still rendered");
            assert!(Rc::ptr_eq(&presenter, &current), "item presenters must survive");
        }
    }

    #[test]
    fn test_minor_updates_item_and_header() {
        let b = board(three_points());
        let mut p3 = b.points_model.point(&PointId::new("p3")).expect("p3");
        p3.base_price = 1000;
        b.points_model.update_point(Severity::Minor, p3).expect("update");

        assert_eq!(b.list.header().info().map(|info| info.cost), Some(1490));
        assert_eq!(ids(&b.list), ["p1", "p2", "p3"], "minor keeps the list");
        let presenter = b.list.presenter(&PointId::new("p3")).expect("p3");
        assert_eq!(presenter.render_count(), 2);
    }

    #[test]
    fn test_patch_for_filtered_out_point_renders_nothing() {
        let b = board(three_points());
        b.filter_model.set_filter(Severity::Major, FilterKind::Future).expect("filter");
        assert_eq!(ids(&b.list), ["p2", "p3"]);

        let mut p1 = b.points_model.point(&PointId::new("p1")).expect("p1");
        p1.is_favorite = true;
        b.points_model.update_point(Severity::Patch, p1).expect("update");
        assert_eq!(ids(&b.list), ["p2", "p3"]);
    }

    #[test]
    fn test_opening_second_item_closes_first() {
        let b = board(three_points());
        let p1 = b.list.presenter(&PointId::new("p1")).expect("p1");
        let p2 = b.list.presenter(&PointId::new("p2")).expect("p2");

        p1.open().expect("open p1");
        p2.open().expect("open p2");
        assert_eq!(p1.mode(), Mode::Display);
        assert_eq!(p2.mode(), Mode::Edit);
        assert_eq!(b.list.editor(), Some(Editor::Point(PointId::new("p2"))));
        assert_eq!(b.tree.borrow().widget_count(), 2, "only one form's pickers live");
    }

    #[test]
    fn test_escape_closes_editor() {
        let b = board(three_points());
        let p1 = b.list.presenter(&PointId::new("p1")).expect("p1");
        p1.open().expect("open");

        assert_eq!(b.list.handle_key(events::escape()), Ok(true));
        assert_eq!(p1.mode(), Mode::Display);
        assert_eq!(b.list.editor(), None);
        assert_eq!(b.list.handle_key(events::escape()), Ok(false));
    }

    #[test]
    fn test_empty_store_shows_placeholder_without_header() {
        let b = board(Vec::new());
        assert!(b.list.placeholder_element().is_some());
        assert!(b.list.list_element().is_none());
        assert!(b.list.sort_element().is_none());
        assert!(!b.list.header().is_rendered());
    }

    #[test]
    fn test_create_point_on_empty_store_swaps_placeholder() {
        let b = board(Vec::new());
        b.list.create_point().expect("create");
        assert!(b.list.placeholder_element().is_none());
        assert!(b.list.new_point().is_open());
        assert_eq!(b.list.editor(), Some(Editor::NewPoint));

        assert_eq!(b.list.handle_key(events::escape()), Ok(true));
        assert!(b.list.placeholder_element().is_some(), "closing restores the placeholder");
        assert!(b.list.list_element().is_none());
    }

    #[test]
    fn test_new_form_and_item_editor_are_exclusive() {
        let b = board(three_points());
        b.list.create_point().expect("create");
        let p2 = b.list.presenter(&PointId::new("p2")).expect("p2");
        p2.open().expect("open");
        assert!(!b.list.new_point().is_open());

        b.list.create_point().expect("create again");
        assert_eq!(p2.mode(), Mode::Display);
        assert!(b.list.new_point().is_open());
    }

    #[test]
    fn test_create_point_twice_keeps_the_open_draft() {
        let b = board(three_points());
        b.list.create_point().expect("create");
        let draft = b.list.new_point().element().expect("draft");
        let destination = b.tree.borrow().query(draft, DESTINATION_ROLE).expect("destination");
        events::type_text(&b.tree, destination, "Geneva").expect("typing");
        let form = b.list.new_point().element().expect("draft");

        b.list.create_point().expect("create again");

        assert_eq!(b.list.new_point().element(), Some(form), "same draft");
        let tree = b.tree.borrow();
        let destination = tree.query(form, DESTINATION_ROLE).expect("destination");
        assert_eq!(tree.value(destination), Some("Geneva"));
        assert_eq!(b.list.editor(), Some(Editor::NewPoint));
    }

    #[test]
    fn test_shutdown_clears_observers_and_markup() {
        let b = board(three_points());
        b.list.shutdown().expect("shutdown");
        assert_eq!(b.points_model.observer_count(), 0);
        assert_eq!(b.filter_model.observer_count(), 0);
        assert!(b.tree.borrow().children(b.containers.main).is_empty());
        assert!(b.tree.borrow().children(b.containers.header).is_empty());
    }
}
