//! Presenters - Glue between stores and views.
//!
//! Presenters own views, listen to store notifications and turn view
//! callbacks into store mutations. They never mutate the collections
//! themselves.
//!
//! Every presenter that hands callbacks to its views is built with
//! `Rc::new_cyclic` and gives them a `Weak` to itself, so a callback can run
//! while the presenter is being torn down by the very mutation it triggered.

pub mod filter;
pub mod list;
pub mod new_point;
pub mod point;
pub mod trip_header;

use std::rc::Rc;

use crate::error::Result;
use crate::types::{Point, PointId, Severity, UserAction};

pub use filter::FilterPresenter;
pub use list::{Containers, Editor, ListPresenter};
pub use new_point::NewPointPresenter;
pub use point::PointPresenter;
pub use trip_header::TripHeaderPresenter;

/// Item presenter modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Display,
    Edit,
}

/// Mutation request sent from an item or new-point presenter to the list.
pub type DataUpdate = Rc<dyn Fn(UserAction, Severity, Point) -> Result<()>>;

/// Mode transition reported by an item presenter.
pub type ModeChange = Rc<dyn Fn(&PointId, Mode) -> Result<()>>;
