//! # trip-board
//!
//! Reactive trip planner core.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for focus and filter state.
//!
//! ## Architecture
//!
//! Two observable stores (points and the active filter) notify their observers
//! synchronously after every mutation. Each mutation carries a [`Severity`]
//! chosen by the caller, and the list presenter maps it to the smallest part
//! of the screen that has to be rebuilt:
//! ```text
//! view callback → presenter → store mutation (severity) → observers → StatefulView::update_element
//! ```
//!
//! Views are [`StatefulView`]s: state plus a template producing a [`VNode`].
//! Reconciliation swaps the whole view subtree, re-attaches handlers,
//! re-creates date pickers and keeps keyboard focus and caret position.
//!
//! ## Modules
//!
//! - [`types`] - Points, catalog entries, severity and sort/filter keys
//! - [`engine`] - Visual tree, node descriptions, events, date pickers
//! - [`model`] - Observable stores and reference data
//! - [`utils`] - Filter, sort, formatting and clocks
//! - [`view`] - Stateful view engine and every view template
//! - [`presenter`] - List, item, new point, header and filter presenters
//! - [`app`] - Application shell
//! - [`renderer`] - Text outline and terminal output
//! - [`config`] / [`logging`] - Settings and tracing setup

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod renderer;
pub mod types;
pub mod utils;
pub mod view;

// Re-export commonly used items
pub use types::*;

pub use app::TripApp;
pub use config::Settings;
pub use error::{ErrorKind, Result, TripError};
pub use logging::{LogConfig, LogFormat, init_logging};

pub use engine::{
    DatePicker, Event, EventKind, NodeId, RenderPosition, SharedTree, VNode, VisualTree, events,
};

pub use model::{Catalog, FilterModel, Observable, ObserverId, PointsModel, points_from_json_str};

pub use utils::{Clock, FixedClock, SystemClock, filter, sort};

pub use view::{HandlerBinder, StatefulTemplate, StatefulView, ViewHandle, WidgetCx};

pub use presenter::{
    Containers, Editor, FilterPresenter, ListPresenter, Mode, NewPointPresenter, PointPresenter,
    TripHeaderPresenter,
};

pub use renderer::{TerminalRenderer, outline};
