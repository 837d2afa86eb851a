//! Utils - Pure helpers over point collections.
//!
//! Nothing in here touches a store or a view: filter and sort return new
//! vectors, format returns strings.

pub mod clock;
pub mod filter;
pub mod format;
pub mod sort;

pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::{filter, has_points};
pub use sort::sort;
