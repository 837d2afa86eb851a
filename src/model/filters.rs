//! Filter model - The active filter selection.
//!
//! The selection lives in a signal so effects outside the presenters (a status
//! line, say) can follow it; presenters subscribe through the observer list
//! like they do for points.

use spark_signals::{Signal, signal};

use super::observable::{Observable, ObserverId};
use crate::error::Result;
use crate::types::{FilterKind, Severity};

pub struct FilterModel {
    filter: Signal<FilterKind>,
    observers: Observable<FilterKind>,
}

impl Default for FilterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterModel {
    pub fn new() -> Self {
        Self {
            filter: signal(FilterKind::default()),
            observers: Observable::new(),
        }
    }

    pub fn filter(&self) -> FilterKind {
        self.filter.get()
    }

    pub fn filter_signal(&self) -> Signal<FilterKind> {
        self.filter.clone()
    }

    pub fn add_observer(&self, observer: impl Fn(Severity, &FilterKind) -> Result<()> + 'static) -> ObserverId {
        self.observers.add_observer(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove_observer(id)
    }

    pub fn clear_observers(&self) {
        self.observers.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Store and broadcast a new filter. Selecting the active filter again is
    /// a no-op and notifies nobody.
    pub fn set_filter(&self, severity: Severity, filter: FilterKind) -> Result<()> {
        if self.filter.get() == filter {
            tracing::trace!(filter = filter.as_str(), "filter unchanged");
            return Ok(());
        }
        self.filter.set(filter);
        tracing::debug!(filter = filter.as_str(), ?severity, "filter changed");
        self.observers.notify(severity, &filter)
    }
}
