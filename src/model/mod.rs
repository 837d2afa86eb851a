//! Model - Observable stores and reference data.
//!
//! Stores own their collections. Presenters read through them and mutate only
//! through their typed operations, which notify observers synchronously.

pub mod catalog;
pub mod filters;
pub mod observable;
pub mod points;

pub use catalog::Catalog;
pub use filters::FilterModel;
pub use observable::{Observable, Observer, ObserverId};
pub use points::{PointsModel, points_from_json_str};
