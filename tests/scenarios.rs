//! End-to-end scenarios through the application shell.
//!
//! Clock is fixed at 2026-03-04 00:00 UTC: p1 (Mar 2) is past, p2 (Mar 5)
//! and p3 (Mar 8) are future.

use std::rc::Rc;

use chrono::{TimeZone, Utc};
use trip_board::engine::Selection;
use trip_board::view::filters_view::filter_role;
use trip_board::view::new_event_button_view::NEW_EVENT_ROLE;
use trip_board::view::point_form_view::{DESTINATION_ROLE, RESET_ROLE};
use trip_board::view::point_view::{FAVORITE_ROLE, ROLLUP_ROLE};
use trip_board::view::sort_view::sort_role;
use trip_board::{
    Catalog, Editor, FilterKind, FixedClock, Mode, NodeId, Point, PointId, Settings, Severity,
    SortKind, TripApp, events, points_from_json_str,
};

const CATALOG: &str = r#"{
    "destinations": [
        { "id": "ams", "name": "Amsterdam", "description": "Canals.", "pictures": [] },
        { "id": "gva", "name": "Geneva", "description": "Lake.", "pictures": [] },
        { "id": "cham", "name": "Chamonix", "description": "Mountains.", "pictures": [] }
    ],
    "offers": [
        { "type": "taxi", "offers": [] },
        { "type": "bus", "offers": [] },
        { "type": "train", "offers": [] },
        { "type": "ship", "offers": [] },
        { "type": "drive", "offers": [] },
        { "type": "flight", "offers": [{ "id": "luggage", "title": "Add luggage", "price": 30 }] },
        { "type": "check-in", "offers": [] },
        { "type": "sightseeing", "offers": [] },
        { "type": "restaurant", "offers": [] }
    ]
}"#;

const POINTS: &str = r#"[
    { "id": "p2", "type": "flight", "destination": "gva", "offers": ["luggage"],
      "dateFrom": "2026-03-05T09:00:00Z", "dateTo": "2026-03-05T12:00:00Z", "basePrice": 300 },
    { "id": "p1", "type": "flight", "destination": "ams", "offers": ["luggage"],
      "dateFrom": "2026-03-02T09:00:00Z", "dateTo": "2026-03-02T18:00:00Z", "basePrice": 100 },
    { "id": "p3", "type": "flight", "destination": "cham", "offers": [],
      "dateFrom": "2026-03-08T09:00:00Z", "dateTo": "2026-03-09T09:00:00Z", "basePrice": 200,
      "isFavorite": true }
]"#;

fn points() -> Vec<Point> {
    points_from_json_str(POINTS).expect("points json")
}

fn app_with(points: Vec<Point>) -> TripApp {
    let catalog = Catalog::from_json_str(CATALOG).expect("catalog json");
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
    let app = TripApp::new(Settings::default(), catalog, points, Rc::new(clock)).expect("app");
    app.init().expect("init");
    app
}

fn id(raw: &str) -> PointId {
    PointId::new(raw)
}

fn visible(app: &TripApp) -> Vec<String> {
    app.list().visible_ids().iter().map(ToString::to_string).collect()
}

fn row_control(app: &TripApp, point: &str, role: &str) -> NodeId {
    let row = app
        .list()
        .presenter(&id(point))
        .and_then(|presenter| presenter.element())
        .expect("rendered row");
    app.tree().borrow().query(row, role).expect("control in row")
}

// =============================================================================
// Severity scenarios
// =============================================================================

#[test]
fn test_patch_rerenders_only_the_named_item() {
    let app = app_with(points());
    let list = app.list();
    let header_element = list.header().element();
    let p2_element = list.presenter(&id("p2")).and_then(|p| p.element());

    let favorite = row_control(&app, "p1", FAVORITE_ROLE);
    events::click(app.tree(), favorite).expect("toggle favorite");

    assert!(app.points_model().point(&id("p1")).is_some_and(|p| p.is_favorite));
    let render_counts: Vec<usize> = ["p1", "p2", "p3"]
        .iter()
        .map(|raw| list.presenter(&id(raw)).map_or(0, |p| p.render_count()))
        .collect();
    assert_eq!(render_counts, [2, 1, 1], "only p1 re-renders");
    assert_eq!(list.header().render_count(), 1, "header untouched");
    assert_eq!(list.header().element(), header_element);
    assert_eq!(list.presenter(&id("p2")).and_then(|p| p.element()), p2_element);
}

#[test]
fn test_medium_delete_keeps_order_and_disposes_presenter() {
    let app = app_with(points());
    let p2 = app.list().presenter(&id("p2")).expect("p2");
    p2.open().expect("open p2");
    assert_eq!(app.tree().borrow().widget_count(), 2, "form pickers bound");

    let form = p2.element().expect("form");
    let delete = app.tree().borrow().query(form, RESET_ROLE).expect("delete button");
    events::click(app.tree(), delete).expect("delete");

    assert_eq!(visible(&app), ["p1", "p3"]);
    assert_eq!(p2.element(), None, "removed presenter is destroyed");
    assert!(app.list().presenter(&id("p2")).is_none());
    assert_eq!(app.tree().borrow().widget_count(), 0);
    assert!(app.tree().borrow().leaked_widgets().is_empty());
    assert_eq!(app.list().editor(), None);
}

#[test]
fn test_deleting_last_point_shows_placeholder_for_active_filter() {
    let single: Vec<Point> = points().into_iter().filter(|p| p.id == id("p1")).collect();
    let app = app_with(single);
    app.filter_model().set_filter(Severity::Major, FilterKind::Past).expect("past filter");
    assert_eq!(visible(&app), ["p1"]);

    app.points_model().delete_point(Severity::Medium, &id("p1")).expect("delete");

    let list = app.list();
    assert!(list.list_element().is_none(), "list replaced");
    assert!(list.sort_element().is_none());
    let placeholder = list.placeholder_element().expect("placeholder");
    let tree = app.tree().borrow();
    assert_eq!(tree.attr(placeholder, "data-filter"), Some("past"));
    assert_eq!(tree.text_content(placeholder), "There are no past events now");
}

#[test]
fn test_create_resets_sort_and_filter_and_opens_form_at_head() {
    let app = app_with(points());

    let future = app
        .tree()
        .borrow()
        .query(app.filters_root(), &filter_role(FilterKind::Future))
        .expect("future radio");
    events::choose(app.tree(), future).expect("choose future");
    let sort = app.list().sort_element().expect("sort bar");
    let price = app.tree().borrow().query(sort, &sort_role(SortKind::Price)).expect("price radio");
    events::choose(app.tree(), price).expect("choose price");
    assert_eq!(visible(&app), ["p2", "p3"]);
    assert_eq!(app.list().sort_kind(), SortKind::Price);

    let button = app
        .tree()
        .borrow()
        .query(app.containers().header, NEW_EVENT_ROLE)
        .expect("new event button");
    events::click(app.tree(), button).expect("create");

    assert_eq!(app.filter_model().filter(), FilterKind::Everything);
    assert_eq!(app.list().sort_kind(), SortKind::Day);
    assert_eq!(visible(&app), ["p1", "p2", "p3"]);
    assert_eq!(app.list().editor(), Some(Editor::NewPoint));

    let list = app.list().list_element().expect("list");
    let first = app.tree().borrow().children(list).first().copied();
    assert_eq!(first, app.list().new_point().element(), "draft heads the list");
    assert!(app.is_button_disabled());

    let sort = app.list().sort_element().expect("sort bar");
    let day = app.tree().borrow().query(sort, &sort_role(SortKind::Day)).expect("day radio");
    assert!(app.tree().borrow().is_checked(day), "sort bar shows the default key");
}

#[test]
fn test_second_create_keeps_draft_and_button_disabled() {
    let app = app_with(points());
    app.create_point().expect("create");
    let draft = app.list().new_point().element().expect("draft");
    let destination = app.tree().borrow().query(draft, DESTINATION_ROLE).expect("destination");
    events::type_text(app.tree(), destination, "Chamonix").expect("typing");
    let form = app.list().new_point().element();

    app.create_point().expect("create again");

    assert!(app.list().new_point().is_open());
    assert!(app.is_button_disabled(), "button stays disabled while the draft is open");
    assert_eq!(app.list().new_point().element(), form, "draft not rebuilt");
    let tree = app.tree().borrow();
    let destination = form.and_then(|form| tree.query(form, DESTINATION_ROLE)).expect("destination");
    assert_eq!(tree.value(destination), Some("Chamonix"));
}

// =============================================================================
// Editor exclusivity & idempotence
// =============================================================================

#[test]
fn test_at_most_one_editor() {
    let app = app_with(points());
    let presenter = |raw: &str| app.list().presenter(&id(raw)).expect("presenter");

    events::click(app.tree(), row_control(&app, "p1", ROLLUP_ROLE)).expect("open p1");
    events::click(app.tree(), row_control(&app, "p2", ROLLUP_ROLE)).expect("open p2");
    assert_eq!(presenter("p1").mode(), Mode::Display);
    assert_eq!(presenter("p2").mode(), Mode::Edit);

    app.create_point().expect("new point");
    assert_eq!(presenter("p2").mode(), Mode::Display);
    assert!(app.list().new_point().is_open());

    events::click(app.tree(), row_control(&app, "p3", ROLLUP_ROLE)).expect("open p3");
    assert!(!app.list().new_point().is_open());
    assert!(!app.is_button_disabled(), "closing the draft enables the button");
    let editing: Vec<&str> = ["p1", "p2", "p3"]
        .into_iter()
        .filter(|raw| presenter(*raw).mode() == Mode::Edit)
        .collect();
    assert_eq!(editing, ["p3"]);
    assert_eq!(app.tree().borrow().widget_count(), 2);
}

#[test]
fn test_active_filter_and_sort_are_idempotent() {
    let app = app_with(points());
    let before: Vec<_> = app
        .list()
        .visible_ids()
        .iter()
        .filter_map(|raw| app.list().presenter(raw))
        .collect();
    let live = app.tree().borrow().live_count();

    app.filter_model().set_filter(Severity::Major, FilterKind::Everything).expect("same filter");
    app.list().handle_sort_change(SortKind::Day).expect("same sort");

    for presenter in &before {
        let current = presenter.point_id().and_then(|raw| app.list().presenter(&raw)).expect("kept");
        assert!(Rc::ptr_eq(presenter, &current), "item presenters untouched");
        assert_eq!(presenter.render_count(), 1);
    }
    assert_eq!(app.tree().borrow().live_count(), live, "no node churn");
}

#[test]
fn test_focus_survives_form_reconciliation() {
    let app = app_with(points());
    let p1 = app.list().presenter(&id("p1")).expect("p1");
    p1.open().expect("open");
    let form = p1.element().expect("form");
    let destination = app.tree().borrow().query(form, DESTINATION_ROLE).expect("destination");

    events::type_text(app.tree(), destination, "Geneva").expect("typing");

    let tree = app.tree().borrow();
    let focused = tree.focused().expect("focus kept");
    assert_eq!(tree.role(focused), Some(DESTINATION_ROLE));
    assert_eq!(tree.value(focused), Some("Geneva"));
    assert_eq!(tree.selection(), Some(Selection::caret(6)));
}

#[test]
fn test_escape_without_editor_is_ignored() {
    let app = app_with(points());
    assert_eq!(app.handle_key(events::escape()), Ok(false));
}

#[test]
fn test_shutdown_leaves_only_roots() {
    let app = app_with(points());
    app.create_point().expect("new point");
    app.shutdown().expect("shutdown");

    assert_eq!(app.points_model().observer_count(), 0);
    assert_eq!(app.filter_model().observer_count(), 0);
    assert_eq!(app.tree().borrow().live_count(), 3);
    assert!(app.tree().borrow().leaked_widgets().is_empty());
}
