//! Views - Templates for every part of the screen.
//!
//! Every view is a [`StatefulTemplate`] wrapped in a [`StatefulView`]; views
//! without interesting state use a plain snapshot (or `()`) as state.
//! Callbacks into presenters are injected at construction.

pub mod filters_view;
pub mod list_view;
pub mod new_event_button_view;
pub mod no_points_view;
pub mod point_form_view;
pub mod point_view;
pub mod sort_view;
pub mod stateful;
pub mod trip_info_view;

use std::rc::Rc;

use crate::error::Result;

pub use filters_view::{FiltersState, FiltersTemplate};
pub use list_view::ListTemplate;
pub use new_event_button_view::NewEventButtonTemplate;
pub use no_points_view::NoPointsTemplate;
pub use point_form_view::{PointDraft, PointFormTemplate};
pub use point_view::PointTemplate;
pub use sort_view::SortTemplate;
pub use stateful::{HandlerBinder, StatefulTemplate, StatefulView, ViewHandle, WidgetCx};
pub use trip_info_view::{TripInfo, TripInfoTemplate};

/// Argument-less view callback (`on_open`, `on_close`, `on_delete`, ...).
pub type Callback = Rc<dyn Fn() -> Result<()>>;

/// Callback carrying a value chosen in the view.
pub type ValueCallback<V> = Rc<dyn Fn(V) -> Result<()>>;
